use chrono::{DateTime, Utc};
use fieldbook_sheet::SheetRecord;
use fieldbook_types::LocationMeta;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One imported workbook. Sheet order is the map order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkbookEntry {
    pub id: String,
    pub display_name: String,
    pub sheets: IndexMap<String, SheetRecord>,
    /// Scraped once at import time, never recomputed.
    #[serde(default)]
    pub location_meta: LocationMeta,
    pub uploaded_at: DateTime<Utc>,
}

impl WorkbookEntry {
    #[must_use]
    pub fn new(display_name: &str, sheets: IndexMap<String, SheetRecord>) -> Self {
        WorkbookEntry {
            id: fieldbook_types::new_id(),
            display_name: display_name.to_string(),
            location_meta: LocationMeta::default(),
            sheets,
            uploaded_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.keys().map(String::as_str).collect()
    }
}
