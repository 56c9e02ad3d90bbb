use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::entry::WorkbookEntry;
use crate::error::Result;
use crate::store::WorkbookLibrary;

const LIBRARY_FILE: &str = "library.json";
const ACTIVE_FILE: &str = "active.json";

/// JSON persistence for the library: two documents under one directory,
/// the serialized entries and the active id. In-memory state stays
/// authoritative; a failed save is the caller's to log, not a reason to
/// roll anything back.
#[derive(Debug, Clone)]
pub struct LibraryStorage {
    dir: PathBuf,
}

impl LibraryStorage {
    #[must_use]
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        LibraryStorage {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write both documents.
    pub fn save(&self, library: &WorkbookLibrary) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let entries = serde_json::to_vec_pretty(library.entries())?;
        std::fs::write(self.dir.join(LIBRARY_FILE), entries)?;
        let active = serde_json::to_vec(&library.active_id())?;
        std::fs::write(self.dir.join(ACTIVE_FILE), active)?;
        Ok(())
    }

    /// Save, logging instead of failing. Used on the autosave path where
    /// a full disk must not take the session down.
    pub fn save_or_log(&self, library: &WorkbookLibrary) {
        if let Err(err) = self.save(library) {
            tracing::warn!(dir = %self.dir.display(), error = %err, "library save failed");
        }
    }

    /// Rehydrate the library. Missing files mean a fresh start, not an
    /// error; an active id that no longer matches any entry is dropped.
    pub fn load(&self) -> Result<WorkbookLibrary> {
        let library_path = self.dir.join(LIBRARY_FILE);
        if !library_path.exists() {
            return Ok(WorkbookLibrary::new());
        }
        let entries: Vec<WorkbookEntry> =
            serde_json::from_slice(&std::fs::read(&library_path)?)?;

        let active_path = self.dir.join(ACTIVE_FILE);
        let active_id: Option<String> = if active_path.exists() {
            serde_json::from_slice(&std::fs::read(&active_path)?)?
        } else {
            None
        };

        Ok(WorkbookLibrary::from_parts(entries, active_id))
    }
}

/// Coalesces bursts of mutations into one save. Every mutation calls
/// `mark_dirty`; the driver polls `flush_if_settled`, which fires only
/// once no new mutation has arrived for the settle window.
#[derive(Debug)]
pub struct DebouncedSaver {
    settle: Duration,
    dirty_since: Option<Instant>,
}

impl DebouncedSaver {
    #[must_use]
    pub fn new(settle: Duration) -> Self {
        DebouncedSaver {
            settle,
            dirty_since: None,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty_since = Some(Instant::now());
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty_since.is_some()
    }

    /// Save when the last mutation is older than the settle window.
    /// Returns whether a save ran.
    pub fn flush_if_settled(&mut self, storage: &LibraryStorage, library: &WorkbookLibrary) -> bool {
        match self.dirty_since {
            Some(since) if since.elapsed() >= self.settle => {
                storage.save_or_log(library);
                self.dirty_since = None;
                true
            }
            _ => false,
        }
    }

    /// Save now if anything is pending, settle window or not.
    pub fn flush(&mut self, storage: &LibraryStorage, library: &WorkbookLibrary) -> bool {
        if self.dirty_since.is_some() {
            storage.save_or_log(library);
            self.dirty_since = None;
            true
        } else {
            false
        }
    }
}

impl Default for DebouncedSaver {
    /// The interactive autosave window.
    fn default() -> Self {
        DebouncedSaver::new(Duration::from_millis(600))
    }
}
