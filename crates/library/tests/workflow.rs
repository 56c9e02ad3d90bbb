//! End-to-end exercise of the import / edit / export path: styled bytes in,
//! library entry with scraped metadata and captured styles, a cell edit,
//! styled bytes back out, and a persistence round trip.

use fieldbook_formatting::{extract_layouts, WorkbookStyleEngine};
use fieldbook_library::{LibraryStorage, WorkbookLibrary};
use fieldbook_sheet::{export_styled, parse_workbook, CellValue};
use fieldbook_types::LibraryFilter;
use rust_xlsxwriter::{Format, Workbook};
use tempfile::tempdir;

fn styled_roster() -> Vec<u8> {
    let mut book = Workbook::new();
    let sheet = book.add_worksheet();
    let bold = Format::new().set_bold();
    sheet.write_string(0, 0, "Village roster").unwrap();
    sheet.write_string(2, 0, "District: Chittoor").unwrap();
    sheet.write_string_with_format(3, 0, "Name", &bold).unwrap();
    sheet.write_string_with_format(3, 1, "Age", &bold).unwrap();
    sheet.write_string(4, 0, "Alice").unwrap();
    sheet.write_number(4, 1, 30.0).unwrap();
    sheet.write_string(5, 0, "Bob").unwrap();
    sheet.write_number(5, 1, 25.0).unwrap();
    sheet.write_string(6, 0, "Total").unwrap();
    sheet.set_column_width(0, 24.0).unwrap();
    book.save_to_buffer().unwrap()
}

#[test]
fn test_import_edit_export_styled() {
    let mut library = WorkbookLibrary::new();
    let id = library
        .add_workbook(&styled_roster(), "roster", "xlsx", &WorkbookStyleEngine)
        .unwrap();

    let entry = library.get(&id).unwrap();
    assert_eq!(entry.location_meta.district, "Chittoor");
    let record = &entry.sheets["Sheet1"];
    assert_eq!(record.columns, vec!["Name", "Age"]);
    assert_eq!(record.rows.len(), 2);
    assert_eq!(record.footer_row[0], CellValue::from("Total"));
    // bold header captured by the style pass, width carried over
    assert!(record
        .styles
        .get(4, 1)
        .is_some_and(|s| s.font.as_ref().is_some_and(|f| f.bold)));
    assert!(record.col_widths[0].is_some());

    library
        .mutate_active_sheet("Sheet1", |record| {
            record
                .set_cell(0, "Name", CellValue::from("Alice B"))
                .unwrap();
        })
        .unwrap();

    let sheets: Vec<_> = library.get(&id).unwrap().sheets.values().cloned().collect();
    let bytes = export_styled(&sheets).unwrap();

    // the edit and the captured bold both survive the round trip
    let reparsed = parse_workbook(&bytes, "xlsx").unwrap();
    assert_eq!(
        reparsed["Sheet1"].rows[0]["Name"],
        CellValue::from("Alice B")
    );
    let layouts = extract_layouts(&bytes).unwrap();
    assert!(layouts["Sheet1"]
        .styles
        .get(4, 1)
        .is_some_and(|s| s.font.as_ref().is_some_and(|f| f.bold)));
    assert!(layouts["Sheet1"].col_widths.get(&1).copied().unwrap_or_default() > 20.0);
}

#[test]
fn test_persistence_and_filtering_round_trip() {
    let dir = tempdir().unwrap();
    let storage = LibraryStorage::new(dir.path());

    let mut library = WorkbookLibrary::new();
    let id = library
        .add_workbook(&styled_roster(), "roster", "xlsx", &WorkbookStyleEngine)
        .unwrap();
    storage.save(&library).unwrap();

    let loaded = storage.load().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.active_id(), Some(id.as_str()));
    let entry = loaded.get(&id).unwrap();
    // styles survive the JSON round trip
    assert!(entry.sheets["Sheet1"].styles.get(4, 1).is_some());

    let filter = LibraryFilter {
        district: "Chittoor".to_string(),
        ..Default::default()
    };
    assert_eq!(loaded.filter(&filter).len(), 1);
    assert!(loaded.filter(&LibraryFilter::constituency("Pileru")).is_empty());
}
