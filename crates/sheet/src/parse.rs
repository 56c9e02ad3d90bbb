use std::io::Cursor;

use calamine::{Data, Range, Reader, Xls, Xlsx};
use indexmap::IndexMap;

use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::record::{MergeRegion, SheetRecord, HEADER_ROW_COUNT};

/// Decode a workbook from raw bytes into sheet records, keyed by sheet
/// name in workbook order.
///
/// `ext` selects the container format ("xlsx", "xlsm" or "xls"). Merge
/// regions are only available for the xlsx family; legacy xls sheets come
/// back with none. An empty sheet yields an empty record, not an error.
pub fn parse_workbook(data: &[u8], ext: &str) -> Result<IndexMap<String, SheetRecord>> {
    match ext.trim_start_matches('.').to_lowercase().as_str() {
        "xlsx" | "xlsm" => parse_xlsx(data),
        "xls" => parse_xls(data),
        other => Err(SheetError::UnsupportedExtension(other.to_string())),
    }
}

fn parse_xlsx(data: &[u8]) -> Result<IndexMap<String, SheetRecord>> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(data))
        .map_err(|e| SheetError::Decode(e.to_string()))?;
    workbook
        .load_merged_regions()
        .map_err(|e| SheetError::Decode(e.to_string()))?;

    let mut records = IndexMap::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| SheetError::Decode(e.to_string()))?;
        let merges: Vec<MergeRegion> = workbook
            .merged_regions_by_sheet(&name)
            .iter()
            .map(|(_, _, dims)| MergeRegion {
                start_row: dims.start.0 as usize,
                start_col: dims.start.1 as usize,
                end_row: dims.end.0 as usize,
                end_col: dims.end.1 as usize,
            })
            .collect();
        records.insert(name.clone(), record_from_range(&name, &range, merges));
    }
    Ok(records)
}

fn parse_xls(data: &[u8]) -> Result<IndexMap<String, SheetRecord>> {
    let mut workbook: Xls<_> =
        Xls::new(Cursor::new(data)).map_err(|e| SheetError::Decode(e.to_string()))?;

    let mut records = IndexMap::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| SheetError::Decode(e.to_string()))?;
        records.insert(name.clone(), record_from_range(&name, &range, Vec::new()));
    }
    Ok(records)
}

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::DateTime(dt) => {
            // Excel stores dates as serial days since 1899-12-30
            CellValue::Float(dt.as_f64())
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(format!("#ERROR: {e:?}")),
    }
}

/// Expand a calamine range to an absolute array-of-arrays. Ranges start at
/// the first occupied cell, so leading rows and columns are padded back in
/// to keep positions absolute; fully blank trailing rows are dropped.
fn range_to_aoa(range: &Range<Data>) -> Vec<Vec<CellValue>> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };

    let mut aoa: Vec<Vec<CellValue>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![CellValue::Null; start_col as usize];
        cells.extend(row.iter().map(data_to_cell_value));
        aoa.push(cells);
    }

    while aoa
        .last()
        .is_some_and(|row| row.iter().all(CellValue::is_null))
    {
        aoa.pop();
    }
    aoa
}

fn record_from_range(name: &str, range: &Range<Data>, merges: Vec<MergeRegion>) -> SheetRecord {
    let aoa = range_to_aoa(range);
    let mut record = SheetRecord::new(name);
    record.merges = merges;

    if aoa.is_empty() {
        return record;
    }

    for (i, row) in aoa.iter().take(HEADER_ROW_COUNT).enumerate() {
        record.header_rows[i] = row.clone();
    }

    let has_footer = aoa.len() > HEADER_ROW_COUNT;
    let body_end = if has_footer { aoa.len() - 1 } else { aoa.len() };
    if has_footer {
        record.footer_row = aoa[aoa.len() - 1].clone();
    }

    record.columns = derive_columns(&aoa);

    for row in aoa.iter().take(body_end).skip(HEADER_ROW_COUNT) {
        let keyed = record
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| (col.clone(), row.get(i).cloned().unwrap_or(CellValue::Null)))
            .collect();
        record.rows.push(keyed);
    }

    record
}

/// Column names come from the last header row when it has content, else
/// from the first non-empty row anywhere in the sheet.
fn derive_columns(aoa: &[Vec<CellValue>]) -> Vec<String> {
    let label_row = aoa
        .get(HEADER_ROW_COUNT - 1)
        .filter(|row| row.iter().any(|c| !c.is_null()))
        .or_else(|| aoa.iter().find(|row| row.iter().any(|c| !c.is_null())));

    match label_row {
        Some(row) => {
            let raw: Vec<String> = row.iter().map(CellValue::as_str).collect();
            SheetRecord::unique_columns(&raw)
        }
        None => Vec::new(),
    }
}
