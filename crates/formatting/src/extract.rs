use std::io::Cursor;

use indexmap::IndexMap;
use umya_spreadsheet::{Border, Style, Worksheet};

use crate::error::{FormattingError, Result};
use crate::style::{
    AlignmentStyle, BorderEdge, BorderSet, FillStyle, FontStyle, SheetLayout, StyleSnapshot,
};

/// Run the style pass over raw xlsx bytes and return a layout per sheet,
/// keyed by sheet name in workbook order.
///
/// This is a second decode of the same bytes the tabular parser sees. The
/// tabular decoder is authoritative for values; this pass only ever reads
/// the visual layer, so a failure here loses styles, never data.
pub fn extract_layouts(data: &[u8]) -> Result<IndexMap<String, SheetLayout>> {
    let book = umya_spreadsheet::reader::xlsx::read_reader(Cursor::new(data), true)
        .map_err(|err| FormattingError::Read(err.to_string()))?;

    let mut layouts = IndexMap::new();
    for sheet in book.get_sheet_collection() {
        layouts.insert(sheet.get_name().to_string(), sheet_layout(sheet));
    }
    Ok(layouts)
}

fn sheet_layout(sheet: &Worksheet) -> SheetLayout {
    let max_row = sheet.get_highest_row();
    let max_col = sheet.get_highest_column();
    let mut layout = SheetLayout::default();

    for col in 1..=max_col {
        if let Some(dim) = sheet.get_column_dimension_by_number(&col) {
            let width = *dim.get_width();
            if width > 0.0 {
                layout.col_widths.insert(col, width);
            }
        }
    }
    for row in 1..=max_row {
        if let Some(dim) = sheet.get_row_dimension(&row) {
            let height = *dim.get_height();
            if height > 0.0 {
                layout.row_heights.insert(row, height);
            }
        }
    }

    for row in 1..=max_row {
        for col in 1..=max_col {
            let Some(cell) = sheet.get_cell((col, row)) else {
                continue;
            };
            let snapshot = snapshot_style(cell.get_style());
            if !snapshot.is_plain() {
                layout.styles.insert(row, col, snapshot);
            }
        }
    }

    layout
}

fn snapshot_style(style: &Style) -> StyleSnapshot {
    StyleSnapshot {
        font: style.get_font().and_then(capture_font),
        alignment: style.get_alignment().and_then(|align| {
            let horizontal = normalize_align(&format!("{:?}", align.get_horizontal()), "general");
            let vertical = normalize_align(&format!("{:?}", align.get_vertical()), "bottom");
            let wrap_text = *align.get_wrap_text();
            if horizontal.is_none() && vertical.is_none() && !wrap_text {
                None
            } else {
                Some(AlignmentStyle {
                    horizontal,
                    vertical,
                    wrap_text,
                })
            }
        }),
        fill: style
            .get_fill()
            .and_then(|fill| fill.get_pattern_fill())
            .and_then(|pattern| pattern.get_foreground_color())
            .and_then(|color| {
                let argb = color.get_argb();
                if argb.is_empty() {
                    None
                } else {
                    Some(FillStyle {
                        color: argb.to_string(),
                    })
                }
            }),
        border: style.get_borders().and_then(|borders| {
            let set = BorderSet {
                top: capture_border(borders.get_top()),
                right: capture_border(borders.get_right()),
                bottom: capture_border(borders.get_bottom()),
                left: capture_border(borders.get_left()),
            };
            if set.is_empty() {
                None
            } else {
                Some(set)
            }
        }),
        number_format: style.get_number_format().and_then(|nf| {
            let code = nf.get_format_code();
            if code.is_empty() || code.eq_ignore_ascii_case("general") {
                None
            } else {
                Some(code.to_string())
            }
        }),
    }
}

fn capture_font(font: &umya_spreadsheet::Font) -> Option<FontStyle> {
    let name = font.get_name();
    let size = *font.get_size();
    let argb = font.get_color().get_argb();

    let captured = FontStyle {
        name: (!name.is_empty() && name != "Calibri").then(|| name.to_string()),
        size: (size > 0.0 && (size - 11.0).abs() > f64::EPSILON).then_some(size),
        bold: *font.get_bold(),
        italic: *font.get_italic(),
        underline: font.get_underline() != "none",
        color: (!argb.is_empty()).then(|| argb.to_string()),
    };

    let plain = !captured.bold
        && !captured.italic
        && !captured.underline
        && captured.color.is_none()
        && captured.name.is_none()
        && captured.size.is_none();
    if plain {
        None
    } else {
        Some(captured)
    }
}

fn capture_border(border: &Border) -> Option<BorderEdge> {
    let style = border.get_border_style();
    if style.is_empty() || style == "none" {
        return None;
    }
    let argb = border.get_color().get_argb();
    Some(BorderEdge {
        style: style.to_string(),
        color: (!argb.is_empty()).then(|| argb.to_string()),
    })
}

/// Debug names of the alignment enums lowercase to the xlsx keyword.
/// The given default keyword means "not set" and maps to `None`.
fn normalize_align(debug_name: &str, default: &str) -> Option<String> {
    let keyword = debug_name.to_lowercase();
    if keyword == default || keyword == "none" {
        None
    } else {
        Some(keyword)
    }
}
