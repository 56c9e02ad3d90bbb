//! # fieldbook-types
//!
//! Shared record types for the fieldbook ecosystem: the location hierarchy
//! (constituency -> mandal -> panchayat), member records, and the location
//! metadata tags used to filter the workbook library. No dependencies on the
//! sheet or library crates.

mod location;
mod member;

pub use location::{Constituency, LibraryFilter, LocationMeta, Mandal, Panchayat};
pub use member::{Member, UnitType};

/// Generate a fresh unique record id.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
