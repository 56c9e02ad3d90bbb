use fieldbook_sheet::{CellValue, SheetRecord};
use fieldbook_types::LocationMeta;
use indexmap::IndexMap;

/// Scrape location tags from the header band of an imported workbook.
///
/// This is a heuristic, best-effort by contract. Header rows 3 and 4 of
/// each sheet are scanned in sheet order for cells whose text contains
/// "district", "constituency", "mandal" or "panchayat" (case-insensitive).
/// The value is the trimmed text after a `:` in the same cell, else the
/// next cell in the row. The first sheet that yields any non-empty field
/// supplies the whole meta; a workbook with no match gets an empty meta,
/// never an error.
#[must_use]
pub fn scrape_location_meta(sheets: &IndexMap<String, SheetRecord>) -> LocationMeta {
    for record in sheets.values() {
        let meta = scrape_sheet(record);
        if !meta.is_empty() {
            return meta;
        }
    }
    LocationMeta::default()
}

fn scrape_sheet(record: &SheetRecord) -> LocationMeta {
    let mut meta = LocationMeta::default();
    for row_idx in [2, 3] {
        let Some(row) = record.header_rows.get(row_idx) else {
            continue;
        };
        for (i, cell) in row.iter().enumerate() {
            let text = cell.as_str();
            if text.trim().is_empty() {
                continue;
            }
            let lower = text.to_lowercase();

            if lower.contains("district") && meta.district.is_empty() {
                meta.district = cell_value(&text, row, i);
            }
            if lower.contains("constituency") && meta.constituency.is_empty() {
                meta.constituency = cell_value(&text, row, i);
            }
            if lower.contains("mandal") && meta.mandal.is_empty() {
                meta.mandal = cell_value(&text, row, i);
            }
            if lower.contains("panchayat") && meta.panchayat.is_empty() {
                meta.panchayat = cell_value(&text, row, i);
            }
        }
    }
    meta
}

/// Text after the colon in the labelled cell, else the next cell over.
fn cell_value(text: &str, row: &[CellValue], idx: usize) -> String {
    if let Some((_, after)) = text.split_once(':') {
        let after = after.trim();
        if !after.is_empty() {
            return after.to_string();
        }
    }
    row.get(idx + 1)
        .map(|cell| cell.as_str().trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldbook_sheet::HEADER_ROW_COUNT;

    fn sheet_with_header(row2: Vec<&str>, row3: Vec<&str>) -> IndexMap<String, SheetRecord> {
        let mut record = SheetRecord::new("Sheet1");
        record.header_rows = vec![Vec::new(); HEADER_ROW_COUNT];
        record.header_rows[2] = row2.into_iter().map(CellValue::from).collect();
        record.header_rows[3] = row3.into_iter().map(CellValue::from).collect();
        let mut sheets = IndexMap::new();
        sheets.insert("Sheet1".to_string(), record);
        sheets
    }

    #[test]
    fn test_colon_in_same_cell() {
        let sheets = sheet_with_header(vec!["District: Chittoor"], vec![]);
        let meta = scrape_location_meta(&sheets);
        assert_eq!(meta.district, "Chittoor");
    }

    #[test]
    fn test_value_in_next_cell() {
        let sheets = sheet_with_header(vec!["Mandal", "Kalikiri"], vec![]);
        let meta = scrape_location_meta(&sheets);
        assert_eq!(meta.mandal, "Kalikiri");
    }

    #[test]
    fn test_case_insensitive_and_both_rows() {
        let sheets = sheet_with_header(
            vec!["CONSTITUENCY : Pileru"],
            vec!["Gram Panchayat", "Gollapalli"],
        );
        let meta = scrape_location_meta(&sheets);
        assert_eq!(meta.constituency, "Pileru");
        assert_eq!(meta.panchayat, "Gollapalli");
    }

    #[test]
    fn test_first_sheet_with_hit_wins() {
        let mut sheets = sheet_with_header(vec!["no tags here"], vec![]);
        let mut second = SheetRecord::new("Second");
        second.header_rows = vec![Vec::new(); HEADER_ROW_COUNT];
        second.header_rows[2] = vec![CellValue::from("District: Chittoor")];
        sheets.insert("Second".to_string(), second);

        let mut third = SheetRecord::new("Third");
        third.header_rows = vec![Vec::new(); HEADER_ROW_COUNT];
        third.header_rows[2] = vec![CellValue::from("District: Kadapa")];
        sheets.insert("Third".to_string(), third);

        let meta = scrape_location_meta(&sheets);
        assert_eq!(meta.district, "Chittoor");
    }

    #[test]
    fn test_no_match_yields_empty_meta() {
        let sheets = sheet_with_header(vec!["Village roster"], vec!["Name", "Age"]);
        assert!(scrape_location_meta(&sheets).is_empty());
    }

    #[test]
    fn test_trailing_colon_falls_through_to_next_cell() {
        let sheets = sheet_with_header(vec!["District:", "Chittoor"], vec![]);
        let meta = scrape_location_meta(&sheets);
        assert_eq!(meta.district, "Chittoor");
    }
}
