use fieldbook_sheet::{CellValue, Result, SheetRecord};

/// One in-flight cell edit.
///
/// The draft only reaches the sheet on `commit` (blur, in UI terms), and
/// only when it differs from the stored value. The returned flag tells the
/// caller whether anything changed, which is what drives autosave.
#[derive(Debug, Clone)]
pub struct EditBuffer {
    row: usize,
    column: String,
    draft: String,
}

impl EditBuffer {
    /// Start editing a cell, seeding the draft with its current text.
    #[must_use]
    pub fn begin(record: &SheetRecord, row: usize, column: &str) -> Self {
        let draft = record
            .get_cell(row, column)
            .map(CellValue::as_str)
            .unwrap_or_default();
        EditBuffer {
            row,
            column: column.to_string(),
            draft,
        }
    }

    #[must_use]
    pub fn row(&self) -> usize {
        self.row
    }

    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Replace the draft text. Nothing is written until `commit`.
    pub fn set_draft(&mut self, text: &str) {
        self.draft = text.to_string();
    }

    /// Write the draft into the sheet when it changed. Returns whether a
    /// write happened.
    pub fn commit(self, record: &mut SheetRecord) -> Result<bool> {
        let current = record
            .get_cell(self.row, &self.column)
            .map(CellValue::as_str)
            .unwrap_or_default();
        if current == self.draft {
            return Ok(false);
        }
        record.set_cell(self.row, &self.column, CellValue::parse(&self.draft))?;
        Ok(true)
    }

    /// Drop the draft without touching the sheet.
    pub fn cancel(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SheetRecord {
        let mut record = SheetRecord::new("Sheet1");
        record.columns = vec!["Name".to_string(), "Age".to_string()];
        record.push_row();
        record
            .set_cell(0, "Name", CellValue::from("Alice"))
            .unwrap();
        record
    }

    #[test]
    fn test_commit_writes_changed_draft() {
        let mut record = record();
        let mut edit = EditBuffer::begin(&record, 0, "Name");
        assert_eq!(edit.draft(), "Alice");

        edit.set_draft("Asha");
        assert!(edit.commit(&mut record).unwrap());
        assert_eq!(record.rows[0]["Name"], CellValue::from("Asha"));
    }

    #[test]
    fn test_commit_skips_unchanged_draft() {
        let mut record = record();
        let edit = EditBuffer::begin(&record, 0, "Name");
        assert!(!edit.commit(&mut record).unwrap());
    }

    #[test]
    fn test_commit_infers_types() {
        let mut record = record();
        let mut edit = EditBuffer::begin(&record, 0, "Age");
        edit.set_draft("30");
        assert!(edit.commit(&mut record).unwrap());
        assert_eq!(record.rows[0]["Age"], CellValue::Int(30));
    }

    #[test]
    fn test_cancel_leaves_sheet_alone() {
        let record = record();
        let mut edit = EditBuffer::begin(&record, 0, "Name");
        edit.set_draft("scratch");
        edit.cancel();
        assert_eq!(record.rows[0]["Name"], CellValue::from("Alice"));
    }

    #[test]
    fn test_commit_out_of_bounds_errors() {
        let mut record = record();
        let mut edit = EditBuffer::begin(&record, 5, "Name");
        edit.set_draft("x");
        assert!(edit.commit(&mut record).is_err());
    }
}
