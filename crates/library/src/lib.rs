//! # fieldbook-library
//!
//! The workbook library: a stack of imported workbooks with one active
//! entry, location metadata scraped from header rows, filtering over that
//! metadata, and debounced JSON persistence. All mutation goes through
//! `&mut WorkbookLibrary`, so partial updates are never observable.

mod entry;
mod error;
mod meta;
mod persist;
mod store;

pub use entry::WorkbookEntry;
pub use error::{LibraryError, Result};
pub use meta::scrape_location_meta;
pub use persist::{DebouncedSaver, LibraryStorage};
pub use store::{ImportFailure, ImportReport, MetaOptions, WorkbookLibrary};
