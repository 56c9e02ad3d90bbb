//! # fieldbook-store
//!
//! The directory side of the tool: typed repositories for the location
//! hierarchy and members, pluggable state persistence, bulk record import
//! from CSV and spreadsheet files, roster export with unit names joined
//! in, and the interface to an external document/blob store.

mod directory;
mod docstore;
mod error;
mod export;
mod import;
mod repo;

pub use directory::Directory;
pub use docstore::{DocumentStore, MemoryDocumentStore};
pub use error::{Result, StoreError};
pub use export::{
    export_members_csv, export_members_xlsx, resolve_unit_names, MEMBER_EXPORT_HEADERS,
};
pub use import::{
    import_constituencies, import_mandals, import_members, import_panchayats,
    normalize_constituency_row, normalize_mandal_row, normalize_member_row,
    normalize_panchayat_row, read_records, ImportOutcome,
};
pub use repo::{Entity, FileStore, MemoryStore, Repository, StateStore};
