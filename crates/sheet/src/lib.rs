//! # fieldbook-sheet
//!
//! The tabular core: typed cell values, the `SheetRecord` shape every
//! imported sheet is normalized into, the workbook parser, and the plain
//! and styled xlsx exporters.
//!
//! A sheet record keeps the first four raw rows as a header band and, for
//! sheets of five or more rows, the last raw row as a footer. Everything
//! between is the body, re-keyed by deduplicated column names. Merges,
//! explicit column widths and row heights, and cell styles ride along so a
//! record can be exported close to how it looked on import.

mod cell;
mod error;
mod export;
mod parse;
mod record;

pub use cell::CellValue;
pub use error::{Result, SheetError};
pub use export::{export_plain, export_styled};
pub use parse::parse_workbook;
pub use record::{MergeRegion, SheetRecord, HEADER_ROW_COUNT};
