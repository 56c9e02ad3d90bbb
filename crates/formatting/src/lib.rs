//! # fieldbook-formatting
//!
//! Style capture for xlsx workbooks. The tabular decoder only sees cell
//! values; this crate runs a second pass over the raw bytes and records the
//! visual layer: per-cell fonts, fills, alignment, borders and number
//! formats, plus explicit column widths and row heights. Everything is
//! sparse, so an unstyled workbook costs nothing to carry around.

mod engine;
mod error;
mod extract;
mod style;

pub use engine::{extract_or_empty, DisabledStyleEngine, StyleEngine, WorkbookStyleEngine};
pub use error::{FormattingError, Result};
pub use extract::extract_layouts;
pub use style::{
    AlignmentStyle, BorderEdge, BorderSet, FillStyle, FontStyle, SheetLayout, StyleMap,
    StyleSnapshot,
};
