use std::path::{Path, PathBuf};

use fieldbook_formatting::{extract_or_empty, SheetLayout, StyleEngine};
use fieldbook_sheet::{parse_workbook, SheetRecord};
use fieldbook_types::{LibraryFilter, LocationMeta};
use serde::{Deserialize, Serialize};

use crate::entry::WorkbookEntry;
use crate::error::{LibraryError, Result};
use crate::meta::scrape_location_meta;

/// The workbook library: newest entry first, at most one active.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkbookLibrary {
    entries: Vec<WorkbookEntry>,
    active_id: Option<String>,
    /// 0-based index of the sheet tab shown for the active entry.
    #[serde(default)]
    active_sheet_tab: usize,
}

/// Distinct non-empty metadata values across the library, sorted. Feeds
/// the filter dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaOptions {
    pub districts: Vec<String>,
    pub constituencies: Vec<String>,
    pub mandals: Vec<String>,
    pub panchayats: Vec<String>,
}

/// Outcome of a multi-file import. One failed file never aborts the rest.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub imported: Vec<String>,
    pub failures: Vec<ImportFailure>,
}

#[derive(Debug, Clone)]
pub struct ImportFailure {
    pub path: PathBuf,
    pub reason: String,
}

impl WorkbookLibrary {
    #[must_use]
    pub fn new() -> Self {
        WorkbookLibrary::default()
    }

    pub(crate) fn from_parts(entries: Vec<WorkbookEntry>, active_id: Option<String>) -> Self {
        let active_id = active_id.filter(|id| entries.iter().any(|e| &e.id == id));
        WorkbookLibrary {
            entries,
            active_id,
            active_sheet_tab: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[WorkbookEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&WorkbookEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    #[must_use]
    pub fn active(&self) -> Option<&WorkbookEntry> {
        let id = self.active_id.as_deref()?;
        self.entries.iter().find(|e| e.id == id)
    }

    #[must_use]
    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    #[must_use]
    pub fn active_sheet_tab(&self) -> usize {
        self.active_sheet_tab
    }

    pub fn set_active_sheet_tab(&mut self, tab: usize) {
        self.active_sheet_tab = tab;
    }

    /// Import one workbook from raw bytes: tabular pass, style pass,
    /// metadata scrape. The new entry is prepended and made active.
    /// Returns its id.
    pub fn add_workbook(
        &mut self,
        data: &[u8],
        display_name: &str,
        ext: &str,
        engine: &dyn StyleEngine,
    ) -> Result<String> {
        let mut sheets = parse_workbook(data, ext)?;

        let mut layouts = extract_or_empty(engine, data);
        for (name, record) in &mut sheets {
            if let Some(layout) = layouts.swap_remove(name) {
                apply_layout(record, layout);
            }
        }

        let mut entry = WorkbookEntry::new(display_name, sheets);
        entry.location_meta = scrape_location_meta(&entry.sheets);

        let id = entry.id.clone();
        self.entries.insert(0, entry);
        self.active_id = Some(id.clone());
        self.active_sheet_tab = 0;
        Ok(id)
    }

    /// Import several files in order. Each failure is recorded against its
    /// path; entries imported before a failure stay imported.
    pub fn import_files(&mut self, paths: &[PathBuf], engine: &dyn StyleEngine) -> ImportReport {
        let mut report = ImportReport::default();
        for path in paths {
            match self.import_file(path, engine) {
                Ok(id) => report.imported.push(id),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping file");
                    report.failures.push(ImportFailure {
                        path: path.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        report
    }

    fn import_file(&mut self, path: &Path, engine: &dyn StyleEngine) -> Result<String> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_string();
        let display_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("workbook")
            .to_string();
        let data = std::fs::read(path)?;
        self.add_workbook(&data, &display_name, &ext, engine)
    }

    /// Make an entry active. Unknown ids are ignored; a successful select
    /// resets the sheet tab.
    pub fn select(&mut self, id: &str) {
        if self.entries.iter().any(|e| e.id == id) {
            self.active_id = Some(id.to_string());
            self.active_sheet_tab = 0;
        }
    }

    /// Delete an entry. When the active entry is deleted, the first
    /// remaining entry in library order becomes active.
    pub fn delete(&mut self, id: &str) {
        let was_active = self.active_id.as_deref() == Some(id);
        self.entries.retain(|e| e.id != id);
        if was_active {
            self.active_id = self.entries.first().map(|e| e.id.clone());
            self.active_sheet_tab = 0;
        }
    }

    /// Drop every entry and the active selection.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.active_id = None;
        self.active_sheet_tab = 0;
    }

    /// Apply `f` to one sheet of the active entry, in place.
    pub fn mutate_active_sheet<F>(&mut self, sheet_name: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut SheetRecord),
    {
        let entry = self.active_entry_mut()?;
        let record = entry
            .sheets
            .get_mut(sheet_name)
            .ok_or_else(|| LibraryError::SheetNotFound {
                name: sheet_name.to_string(),
            })?;
        f(record);
        Ok(())
    }

    /// Add a sheet to the active entry. With no requested name, `SheetN`
    /// names are tried until one is free; an explicit name that collides
    /// is an error. Returns the name used.
    pub fn add_sheet(&mut self, name: Option<&str>) -> Result<String> {
        let entry = self.active_entry_mut()?;
        let name = match name {
            Some(name) => {
                if entry.sheets.contains_key(name) {
                    return Err(LibraryError::SheetAlreadyExists {
                        name: name.to_string(),
                    });
                }
                name.to_string()
            }
            None => {
                let mut n = entry.sheets.len() + 1;
                loop {
                    let candidate = format!("Sheet{n}");
                    if !entry.sheets.contains_key(&candidate) {
                        break candidate;
                    }
                    n += 1;
                }
            }
        };
        entry
            .sheets
            .insert(name.clone(), SheetRecord::new(&name));
        Ok(name)
    }

    /// Remove a sheet from the active entry.
    pub fn delete_sheet(&mut self, name: &str) -> Result<()> {
        let entry = self.active_entry_mut()?;
        entry
            .sheets
            .shift_remove(name)
            .ok_or_else(|| LibraryError::SheetNotFound {
                name: name.to_string(),
            })?;
        self.active_sheet_tab = 0;
        Ok(())
    }

    /// Rename a sheet on the active entry, preserving its position.
    pub fn rename_sheet(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        let entry = self.active_entry_mut()?;
        if entry.sheets.contains_key(new_name) {
            return Err(LibraryError::SheetAlreadyExists {
                name: new_name.to_string(),
            });
        }
        let index =
            entry
                .sheets
                .get_index_of(old_name)
                .ok_or_else(|| LibraryError::SheetNotFound {
                    name: old_name.to_string(),
                })?;
        if let Some((_, mut record)) = entry.sheets.shift_remove_index(index) {
            record.name = new_name.to_string();
            entry
                .sheets
                .shift_insert(index, new_name.to_string(), record);
        }
        Ok(())
    }

    /// Entries whose metadata matches every provided criterion.
    #[must_use]
    pub fn filter(&self, filter: &LibraryFilter) -> Vec<&WorkbookEntry> {
        self.entries
            .iter()
            .filter(|e| e.location_meta.matches(filter))
            .collect()
    }

    /// Sorted distinct values per metadata field.
    #[must_use]
    pub fn distinct_meta(&self) -> MetaOptions {
        let mut options = MetaOptions::default();
        for entry in &self.entries {
            let LocationMeta {
                district,
                constituency,
                mandal,
                panchayat,
            } = &entry.location_meta;
            push_distinct(&mut options.districts, district);
            push_distinct(&mut options.constituencies, constituency);
            push_distinct(&mut options.mandals, mandal);
            push_distinct(&mut options.panchayats, panchayat);
        }
        options.districts.sort();
        options.constituencies.sort();
        options.mandals.sort();
        options.panchayats.sort();
        options
    }

    fn active_entry_mut(&mut self) -> Result<&mut WorkbookEntry> {
        let id = self
            .active_id
            .clone()
            .ok_or(LibraryError::NoActiveWorkbook)?;
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(LibraryError::WorkbookNotFound { id })
    }
}

/// Merge the style pass output into a parsed record. Sparse 1-based width
/// and height maps become dense option vectors, which is what the grid and
/// the exporters consume.
fn apply_layout(record: &mut SheetRecord, layout: SheetLayout) {
    let max_col = layout.col_widths.keys().max().copied().unwrap_or(0) as usize;
    let mut widths = vec![None; max_col];
    for (col, width) in &layout.col_widths {
        widths[*col as usize - 1] = Some(*width);
    }

    let max_row = layout.row_heights.keys().max().copied().unwrap_or(0) as usize;
    let mut heights = vec![None; max_row];
    for (row, height) in &layout.row_heights {
        heights[*row as usize - 1] = Some(*height);
    }

    record.styles = layout.styles;
    record.col_widths = widths;
    record.row_heights = heights;
}

fn push_distinct(values: &mut Vec<String>, value: &str) {
    let value = value.trim();
    if !value.is_empty() && !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}
