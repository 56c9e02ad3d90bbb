use fieldbook_formatting::StyleMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::cell::CellValue;
use crate::error::{Result, SheetError};

/// Number of raw rows kept as the header band of every sheet.
pub const HEADER_ROW_COUNT: usize = 4;

/// A merged-cell rectangle, 0-based and inclusive at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRegion {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl MergeRegion {
    /// True when the region covers more than one cell.
    #[must_use]
    pub fn is_real(&self) -> bool {
        self.end_row > self.start_row || self.end_col > self.start_col
    }

    /// True when the 0-based cell lies inside the region.
    #[must_use]
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.start_row && row <= self.end_row && col >= self.start_col && col <= self.end_col
    }
}

/// One sheet, normalized for editing.
///
/// The first [`HEADER_ROW_COUNT`] raw rows are kept verbatim as
/// `header_rows` (padded when the sheet is shorter). Sheets with five or
/// more raw rows keep their last row as `footer_row`. The body rows in
/// between are re-keyed by the deduplicated `columns`, with every key
/// present in every row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetRecord {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<IndexMap<String, CellValue>>,
    pub header_rows: Vec<Vec<CellValue>>,
    #[serde(default)]
    pub footer_row: Vec<CellValue>,
    #[serde(default)]
    pub merges: Vec<MergeRegion>,
    #[serde(default)]
    pub col_widths: Vec<Option<f64>>,
    #[serde(default)]
    pub row_heights: Vec<Option<f64>>,
    #[serde(default)]
    pub styles: StyleMap,
}

impl SheetRecord {
    /// Empty record with the header band padded to its fixed height.
    #[must_use]
    pub fn new(name: &str) -> Self {
        SheetRecord {
            name: name.to_string(),
            header_rows: vec![Vec::new(); HEADER_ROW_COUNT],
            ..Default::default()
        }
    }

    /// Deduplicate raw header names into unique column keys.
    ///
    /// A blank name at index `i` becomes `Column{i+1}`. A name that was
    /// already taken gets a `_2`, `_3`, ... suffix, counting from the
    /// second occurrence.
    #[must_use]
    pub fn unique_columns(raw: &[String]) -> Vec<String> {
        let mut taken: Vec<String> = Vec::with_capacity(raw.len());
        for (i, name) in raw.iter().enumerate() {
            let base = name.trim();
            let base = if base.is_empty() {
                format!("Column{}", i + 1)
            } else {
                base.to_string()
            };
            taken.push(dedupe_name(&base, &taken));
        }
        taken
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Append an empty body row keyed by every column.
    pub fn push_row(&mut self) {
        let row = self
            .columns
            .iter()
            .map(|col| (col.clone(), CellValue::Null))
            .collect();
        self.rows.push(row);
    }

    /// Remove a body row. Merge regions reference absolute positions and
    /// are not renumbered; they are cleared instead.
    pub fn delete_row(&mut self, index: usize) -> Result<()> {
        if index >= self.rows.len() {
            return Err(SheetError::RowIndexOutOfBounds {
                index,
                count: self.rows.len(),
            });
        }
        self.rows.remove(index);
        self.merges.clear();
        Ok(())
    }

    /// Append a column, deduplicating the requested name against the
    /// existing ones, and backfill every row with an empty value. Returns
    /// the name actually used.
    pub fn add_column(&mut self, name: &str) -> String {
        let base = name.trim();
        let base = if base.is_empty() {
            format!("Column{}", self.columns.len() + 1)
        } else {
            base.to_string()
        };
        let unique = dedupe_name(&base, &self.columns);
        self.columns.push(unique.clone());
        for row in &mut self.rows {
            row.insert(unique.clone(), CellValue::Null);
        }
        unique
    }

    /// Write one body cell.
    pub fn set_cell(&mut self, row: usize, column: &str, value: CellValue) -> Result<()> {
        if row >= self.rows.len() {
            return Err(SheetError::RowIndexOutOfBounds {
                index: row,
                count: self.rows.len(),
            });
        }
        if !self.columns.iter().any(|c| c == column) {
            return Err(SheetError::ColumnNotFound {
                name: column.to_string(),
            });
        }
        self.rows[row].insert(column.to_string(), value);
        Ok(())
    }

    #[must_use]
    pub fn get_cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        self.rows.get(row)?.get(column)
    }

    /// Reassemble the raw grid: header band, body rows in column order,
    /// then the footer row when present. This is what both exporters write.
    #[must_use]
    pub fn to_aoa(&self) -> Vec<Vec<CellValue>> {
        let mut aoa: Vec<Vec<CellValue>> = self.header_rows.clone();
        for row in &self.rows {
            aoa.push(
                self.columns
                    .iter()
                    .map(|col| row.get(col).cloned().unwrap_or(CellValue::Null))
                    .collect(),
            );
        }
        if !self.footer_row.is_empty() {
            aoa.push(self.footer_row.clone());
        }
        aoa
    }
}

fn dedupe_name(base: &str, taken: &[String]) -> String {
    if !taken.iter().any(|t| t == base) {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}_{n}");
        if !taken.iter().any(|t| t == &candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_columns(columns: &[&str]) -> SheetRecord {
        let mut record = SheetRecord::new("Sheet1");
        record.columns = columns.iter().map(ToString::to_string).collect();
        record
    }

    #[test]
    fn test_unique_columns_blanks_and_duplicates() {
        let raw: Vec<String> = ["Name", "Name", ""].iter().map(ToString::to_string).collect();
        assert_eq!(
            SheetRecord::unique_columns(&raw),
            vec!["Name", "Name_2", "Column3"]
        );
    }

    #[test]
    fn test_unique_columns_triple() {
        let raw: Vec<String> = ["A", "A", "A"].iter().map(ToString::to_string).collect();
        assert_eq!(SheetRecord::unique_columns(&raw), vec!["A", "A_2", "A_3"]);
    }

    #[test]
    fn test_push_row_keys_every_column() {
        let mut record = record_with_columns(&["Name", "Age"]);
        record.push_row();
        assert_eq!(record.rows.len(), 1);
        assert_eq!(record.rows[0].len(), 2);
        assert!(record.rows[0]["Name"].is_null());
    }

    #[test]
    fn test_delete_row_clears_merges() {
        let mut record = record_with_columns(&["A"]);
        record.push_row();
        record.push_row();
        record.merges.push(MergeRegion {
            start_row: 0,
            start_col: 0,
            end_row: 0,
            end_col: 1,
        });
        record.delete_row(0).unwrap();
        assert_eq!(record.rows.len(), 1);
        assert!(record.merges.is_empty());
    }

    #[test]
    fn test_delete_row_out_of_bounds() {
        let mut record = record_with_columns(&["A"]);
        assert!(matches!(
            record.delete_row(0),
            Err(SheetError::RowIndexOutOfBounds { index: 0, count: 0 })
        ));
    }

    #[test]
    fn test_add_column_backfills_and_dedupes() {
        let mut record = record_with_columns(&["Name"]);
        record.push_row();
        record
            .set_cell(0, "Name", CellValue::from("Alice"))
            .unwrap();

        let added = record.add_column("Notes");
        assert_eq!(added, "Notes");
        assert!(record.rows[0]["Notes"].is_null());

        let clash = record.add_column("Name");
        assert_eq!(clash, "Name_2");
    }

    #[test]
    fn test_set_cell_unknown_column() {
        let mut record = record_with_columns(&["Name"]);
        record.push_row();
        assert!(matches!(
            record.set_cell(0, "Missing", CellValue::Null),
            Err(SheetError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let mut record = record_with_columns(&["Name"]);
        record.header_rows = vec![Vec::new(); HEADER_ROW_COUNT];
        record.push_row();
        record.set_cell(0, "Name", CellValue::from("Alice")).unwrap();
        record.merges.push(MergeRegion {
            start_row: 0,
            start_col: 0,
            end_row: 0,
            end_col: 1,
        });

        let json = serde_json::to_string(&record).unwrap();
        let back: SheetRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_to_aoa_envelope() {
        let mut record = record_with_columns(&["Name"]);
        record.header_rows = vec![Vec::new(); HEADER_ROW_COUNT];
        record.header_rows[3] = vec![CellValue::from("Name")];
        record.push_row();
        record.set_cell(0, "Name", CellValue::from("Alice")).unwrap();
        record.footer_row = vec![CellValue::from("Total")];

        let aoa = record.to_aoa();
        assert_eq!(aoa.len(), HEADER_ROW_COUNT + 2);
        assert_eq!(aoa[4], vec![CellValue::from("Alice")]);
        assert_eq!(aoa[5], vec![CellValue::from("Total")]);
    }
}
