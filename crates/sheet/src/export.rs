use std::collections::HashSet;

use fieldbook_formatting::{BorderEdge, StyleSnapshot};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatUnderline, Workbook, Worksheet};

use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use crate::record::{SheetRecord, HEADER_ROW_COUNT};

/// Serialize records to xlsx bytes, values only. Column widths, row
/// heights and merge regions are re-applied; styles are not.
pub fn export_plain(sheets: &[SheetRecord]) -> Result<Vec<u8>> {
    export(sheets, false)
}

/// Serialize records to xlsx bytes with formatting. Cells with a recorded
/// style snapshot get a format built from it; everything else falls back
/// to the house defaults (bold label and footer rows, thin light borders
/// on the body).
pub fn export_styled(sheets: &[SheetRecord]) -> Result<Vec<u8>> {
    export(sheets, true)
}

fn export(sheets: &[SheetRecord], styled: bool) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    for record in sheets {
        let worksheet = workbook.add_worksheet();
        write_record(worksheet, record, styled)?;
    }
    workbook
        .save_to_buffer()
        .map_err(|e| SheetError::Serialize(e.to_string()))
}

fn write_record(worksheet: &mut Worksheet, record: &SheetRecord, styled: bool) -> Result<()> {
    // xlsx caps sheet names at 31 chars
    let name: String = record.name.chars().take(31).collect();
    worksheet
        .set_name(&name)
        .map_err(|e| SheetError::Serialize(e.to_string()))?;

    for (col, width) in record.col_widths.iter().enumerate() {
        if let Some(width) = width {
            let col = u16::try_from(col).map_err(|_| overflow("column"))?;
            worksheet
                .set_column_width(col, *width)
                .map_err(|e| SheetError::Serialize(e.to_string()))?;
        }
    }
    for (row, height) in record.row_heights.iter().enumerate() {
        if let Some(height) = height {
            let row = u32::try_from(row).map_err(|_| overflow("row"))?;
            worksheet
                .set_row_height(row, *height)
                .map_err(|e| SheetError::Serialize(e.to_string()))?;
        }
    }

    let aoa = record.to_aoa();
    let footer_index = if record.footer_row.is_empty() {
        None
    } else {
        Some(aoa.len() - 1)
    };

    // Cells covered by a merge are written once, through the merge itself.
    let mut covered: HashSet<(usize, usize)> = HashSet::new();
    for merge in &record.merges {
        if !merge.is_real() {
            continue;
        }
        for row in merge.start_row..=merge.end_row {
            for col in merge.start_col..=merge.end_col {
                covered.insert((row, col));
            }
        }
    }

    for merge in record.merges.iter().filter(|m| m.is_real()) {
        let value = aoa
            .get(merge.start_row)
            .and_then(|row| row.get(merge.start_col))
            .cloned()
            .unwrap_or(CellValue::Null);
        let format = if styled {
            cell_format(record, merge.start_row, merge.start_col, footer_index)
        } else {
            Format::new()
        };
        worksheet
            .merge_range(
                u32::try_from(merge.start_row).map_err(|_| overflow("row"))?,
                u16::try_from(merge.start_col).map_err(|_| overflow("column"))?,
                u32::try_from(merge.end_row).map_err(|_| overflow("row"))?,
                u16::try_from(merge.end_col).map_err(|_| overflow("column"))?,
                &value.as_str(),
                &format,
            )
            .map_err(|e| SheetError::Serialize(e.to_string()))?;
    }

    for (row_idx, row) in aoa.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            if covered.contains(&(row_idx, col_idx)) {
                continue;
            }
            let row_num = u32::try_from(row_idx).map_err(|_| overflow("row"))?;
            let col_num = u16::try_from(col_idx).map_err(|_| overflow("column"))?;

            if styled {
                let format = cell_format(record, row_idx, col_idx, footer_index);
                write_cell_with_format(worksheet, row_num, col_num, cell, &format)?;
            } else {
                write_cell(worksheet, row_num, col_num, cell)?;
            }
        }
    }

    Ok(())
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, cell: &CellValue) -> Result<()> {
    let result = match cell {
        CellValue::Null => return Ok(()),
        CellValue::Bool(b) => worksheet.write_boolean(row, col, *b),
        // Excel stores all numbers as f64; integers past 2^53 lose precision
        CellValue::Int(i) => worksheet.write_number(row, col, *i as f64),
        CellValue::Float(f) => worksheet.write_number(row, col, *f),
        CellValue::String(s) => worksheet.write_string(row, col, s),
    };
    result.map_err(|e| SheetError::Serialize(e.to_string()))?;
    Ok(())
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    format: &Format,
) -> Result<()> {
    let result = match cell {
        CellValue::Null => worksheet.write_blank(row, col, format),
        CellValue::Bool(b) => worksheet.write_boolean_with_format(row, col, *b, format),
        CellValue::Int(i) => worksheet.write_number_with_format(row, col, *i as f64, format),
        CellValue::Float(f) => worksheet.write_number_with_format(row, col, *f, format),
        CellValue::String(s) => worksheet.write_string_with_format(row, col, s, format),
    };
    result.map_err(|e| SheetError::Serialize(e.to_string()))?;
    Ok(())
}

/// Format for one cell of the styled export: the recorded snapshot when
/// there is one, else positional defaults.
fn cell_format(record: &SheetRecord, row: usize, col: usize, footer: Option<usize>) -> Format {
    if let Some(snapshot) = record
        .styles
        .get(row as u32 + 1, col as u32 + 1)
    {
        return snapshot_to_format(snapshot);
    }

    if row == HEADER_ROW_COUNT - 1 || footer == Some(row) {
        Format::new().set_bold()
    } else if row >= HEADER_ROW_COUNT && footer != Some(row) {
        Format::new()
            .set_border(FormatBorder::Thin)
            .set_border_color(Color::RGB(0x00EE_EEEE))
    } else {
        Format::new()
    }
}

fn snapshot_to_format(snapshot: &StyleSnapshot) -> Format {
    let mut format = Format::new();

    if let Some(font) = &snapshot.font {
        if font.bold {
            format = format.set_bold();
        }
        if font.italic {
            format = format.set_italic();
        }
        if font.underline {
            format = format.set_underline(FormatUnderline::Single);
        }
        if let Some(size) = font.size {
            format = format.set_font_size(size);
        }
        if let Some(name) = &font.name {
            format = format.set_font_name(name);
        }
        if let Some(color) = &font.color {
            format = format.set_font_color(Color::RGB(argb_to_rgb(color)));
        }
    }

    if let Some(align) = &snapshot.alignment {
        if let Some(h) = align.horizontal.as_deref() {
            format = match h {
                "left" => format.set_align(FormatAlign::Left),
                "center" => format.set_align(FormatAlign::Center),
                "right" => format.set_align(FormatAlign::Right),
                "justify" => format.set_align(FormatAlign::Justify),
                _ => format,
            };
        }
        if let Some(v) = align.vertical.as_deref() {
            format = match v {
                "top" => format.set_align(FormatAlign::Top),
                "center" | "middle" => format.set_align(FormatAlign::VerticalCenter),
                "bottom" => format.set_align(FormatAlign::Bottom),
                _ => format,
            };
        }
        if align.wrap_text {
            format = format.set_text_wrap();
        }
    }

    if let Some(fill) = &snapshot.fill {
        format = format.set_background_color(Color::RGB(argb_to_rgb(&fill.color)));
    }

    if let Some(border) = &snapshot.border {
        if let Some(edge) = &border.top {
            format = format.set_border_top(edge_style(edge));
            if let Some(color) = &edge.color {
                format = format.set_border_top_color(Color::RGB(argb_to_rgb(color)));
            }
        }
        if let Some(edge) = &border.right {
            format = format.set_border_right(edge_style(edge));
            if let Some(color) = &edge.color {
                format = format.set_border_right_color(Color::RGB(argb_to_rgb(color)));
            }
        }
        if let Some(edge) = &border.bottom {
            format = format.set_border_bottom(edge_style(edge));
            if let Some(color) = &edge.color {
                format = format.set_border_bottom_color(Color::RGB(argb_to_rgb(color)));
            }
        }
        if let Some(edge) = &border.left {
            format = format.set_border_left(edge_style(edge));
            if let Some(color) = &edge.color {
                format = format.set_border_left_color(Color::RGB(argb_to_rgb(color)));
            }
        }
    }

    if let Some(num_fmt) = &snapshot.number_format {
        format = format.set_num_format(num_fmt);
    }

    format
}

fn edge_style(edge: &BorderEdge) -> FormatBorder {
    match edge.style.as_str() {
        "medium" => FormatBorder::Medium,
        "thick" => FormatBorder::Thick,
        "double" => FormatBorder::Double,
        "dashed" => FormatBorder::Dashed,
        "dotted" => FormatBorder::Dotted,
        "hair" => FormatBorder::Hair,
        _ => FormatBorder::Thin,
    }
}

/// Last six hex digits of an ARGB string as an RGB word; black on garbage.
fn argb_to_rgb(argb: &str) -> u32 {
    let hex = argb.trim_start_matches('#');
    let rgb = if hex.len() > 6 { &hex[hex.len() - 6..] } else { hex };
    u32::from_str_radix(rgb, 16).unwrap_or(0)
}

fn overflow(what: &str) -> SheetError {
    SheetError::Serialize(format!("{what} index exceeds the xlsx limit"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_workbook;
    use crate::record::MergeRegion;
    use fieldbook_formatting::{extract_layouts, FontStyle};

    fn sample_record() -> SheetRecord {
        let mut record = SheetRecord::new("Roster");
        record.columns = vec!["Name".to_string(), "Age".to_string()];
        record.header_rows[0] = vec![CellValue::from("Village roster")];
        record.header_rows[3] = vec![CellValue::from("Name"), CellValue::from("Age")];
        record.push_row();
        record.set_cell(0, "Name", CellValue::from("Alice")).unwrap();
        record.set_cell(0, "Age", CellValue::Int(30)).unwrap();
        record.push_row();
        record.set_cell(1, "Name", CellValue::from("Bob")).unwrap();
        record.set_cell(1, "Age", CellValue::Int(25)).unwrap();
        record.footer_row = vec![CellValue::from("Total"), CellValue::Int(2)];
        record
    }

    #[test]
    fn test_plain_round_trip() {
        let record = sample_record();
        let bytes = export_plain(std::slice::from_ref(&record)).unwrap();
        let reloaded = parse_workbook(&bytes, "xlsx").unwrap();
        let back = &reloaded["Roster"];

        assert_eq!(back.columns, record.columns);
        assert_eq!(back.rows.len(), record.rows.len());
        assert_eq!(back.footer_row[0], CellValue::String("Total".to_string()));
        assert_eq!(
            back.header_rows[0][0],
            CellValue::String("Village roster".to_string())
        );
    }

    #[test]
    fn test_header_only_round_trip() {
        let mut record = SheetRecord::new("Sheet1");
        record.header_rows[0] = vec![CellValue::from("A")];
        record.header_rows[1] = vec![CellValue::from("B")];
        record.header_rows[2] = vec![CellValue::from("C")];
        record.header_rows[3] = vec![CellValue::from("Name"), CellValue::from("Age")];
        record.columns = vec!["Name".to_string(), "Age".to_string()];

        let bytes = export_plain(std::slice::from_ref(&record)).unwrap();
        let back = parse_workbook(&bytes, "xlsx").unwrap();
        let back = &back["Sheet1"];
        assert_eq!(back.header_rows[0][0], CellValue::from("A"));
        assert_eq!(back.columns, record.columns);
        assert!(back.rows.is_empty());
        assert!(back.footer_row.is_empty());
    }

    #[test]
    fn test_merges_round_trip() {
        let mut record = sample_record();
        record.merges.push(MergeRegion {
            start_row: 0,
            start_col: 0,
            end_row: 0,
            end_col: 1,
        });
        let bytes = export_plain(std::slice::from_ref(&record)).unwrap();
        let back = parse_workbook(&bytes, "xlsx").unwrap();
        assert_eq!(back["Roster"].merges, record.merges);
    }

    #[test]
    fn test_long_sheet_name_truncated() {
        let mut record = sample_record();
        record.name = "x".repeat(40);
        let bytes = export_plain(std::slice::from_ref(&record)).unwrap();
        let back = parse_workbook(&bytes, "xlsx").unwrap();
        assert_eq!(back[0].name.len(), 31);
    }

    #[test]
    fn test_styled_defaults() {
        let record = sample_record();
        let bytes = export_styled(std::slice::from_ref(&record)).unwrap();
        let layouts = extract_layouts(&bytes).unwrap();
        let layout = &layouts["Roster"];

        // label row (raw row 4) and footer come back bold
        let label = layout.styles.get(4, 1).expect("label cell styled");
        assert!(label.font.as_ref().is_some_and(|f| f.bold));
        let footer = layout.styles.get(7, 1).expect("footer cell styled");
        assert!(footer.font.as_ref().is_some_and(|f| f.bold));

        // body cells get the thin light border fallback
        let body = layout.styles.get(5, 1).expect("body cell styled");
        let border = body.border.as_ref().expect("body border");
        assert_eq!(border.top.as_ref().map(|e| e.style.as_str()), Some("thin"));
    }

    #[test]
    fn test_styled_snapshot_wins_over_defaults() {
        let mut record = sample_record();
        record.styles.insert(
            5,
            1,
            StyleSnapshot {
                font: Some(FontStyle {
                    bold: true,
                    italic: true,
                    ..Default::default()
                }),
                ..Default::default()
            },
        );
        let bytes = export_styled(std::slice::from_ref(&record)).unwrap();
        let layouts = extract_layouts(&bytes).unwrap();
        let cell = layouts["Roster"].styles.get(5, 1).expect("styled cell");
        assert!(cell.font.as_ref().is_some_and(|f| f.bold && f.italic));
    }

    #[test]
    fn test_widths_and_heights_reapplied() {
        let mut record = sample_record();
        record.col_widths = vec![Some(24.0), None];
        record.row_heights = vec![Some(30.0)];
        let bytes = export_plain(std::slice::from_ref(&record)).unwrap();
        let layouts = extract_layouts(&bytes).unwrap();
        let layout = &layouts["Roster"];
        assert!(layout.col_widths.get(&1).copied().unwrap_or_default() > 20.0);
        assert!(layout.row_heights.get(&1).copied().unwrap_or_default() > 20.0);
    }

    #[test]
    fn test_empty_record_exports() {
        let record = SheetRecord::new("Empty");
        assert!(export_plain(std::slice::from_ref(&record)).is_ok());
    }
}
