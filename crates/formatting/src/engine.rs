use indexmap::IndexMap;

use crate::error::Result;
use crate::extract::extract_layouts;
use crate::style::SheetLayout;

/// Pluggable source of per-sheet layouts. Import and styled export take an
/// engine instead of calling the xlsx reader directly, so callers can swap
/// in a stub when the visual layer is not wanted.
pub trait StyleEngine: Send + Sync {
    fn extract(&self, data: &[u8]) -> Result<IndexMap<String, SheetLayout>>;
}

/// The real engine, backed by the xlsx style reader.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkbookStyleEngine;

impl StyleEngine for WorkbookStyleEngine {
    fn extract(&self, data: &[u8]) -> Result<IndexMap<String, SheetLayout>> {
        extract_layouts(data)
    }
}

/// Engine that never captures anything. Imports still work, just unstyled.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledStyleEngine;

impl StyleEngine for DisabledStyleEngine {
    fn extract(&self, _data: &[u8]) -> Result<IndexMap<String, SheetLayout>> {
        Ok(IndexMap::new())
    }
}

/// Extract layouts, degrading to an empty map on failure. Style capture is
/// best-effort by contract; the tabular import must not fail because the
/// visual pass could not read the file.
pub fn extract_or_empty(engine: &dyn StyleEngine, data: &[u8]) -> IndexMap<String, SheetLayout> {
    match engine.extract(data) {
        Ok(layouts) => layouts,
        Err(err) => {
            tracing::warn!(
                error = %err,
                "style extraction failed, importing without styles or column/row sizing hints"
            );
            IndexMap::new()
        }
    }
}
