use serde::{Deserialize, Serialize};

/// Location tags scraped from a workbook's header rows at import time.
///
/// All fields are free text; an empty string means the value was not found.
/// The scrape is best-effort and the tags are never recomputed after import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationMeta {
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub constituency: String,
    #[serde(default)]
    pub mandal: String,
    #[serde(default)]
    pub panchayat: String,
}

impl LocationMeta {
    /// True when no field was resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.district.is_empty()
            && self.constituency.is_empty()
            && self.mandal.is_empty()
            && self.panchayat.is_empty()
    }

    /// Check this meta against a filter. Every non-empty criterion must
    /// trim-equal the corresponding field; unset (or whitespace-only)
    /// criteria never exclude.
    #[must_use]
    pub fn matches(&self, filter: &LibraryFilter) -> bool {
        fn check(criterion: &str, value: &str) -> bool {
            let criterion = criterion.trim();
            criterion.is_empty() || value.trim() == criterion
        }
        check(&filter.district, &self.district)
            && check(&filter.constituency, &self.constituency)
            && check(&filter.mandal, &self.mandal)
            && check(&filter.panchayat, &self.panchayat)
    }
}

/// Filter criteria over the workbook library. Empty string = not filtered on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryFilter {
    pub district: String,
    pub constituency: String,
    pub mandal: String,
    pub panchayat: String,
}

impl LibraryFilter {
    /// Filter on a single constituency value.
    #[must_use]
    pub fn constituency(name: &str) -> Self {
        LibraryFilter {
            constituency: name.to_string(),
            ..Default::default()
        }
    }
}

/// An assembly constituency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constituency {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub district: String,
}

/// A mandal within a constituency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mandal {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub constituency_id: String,
}

/// A gram panchayat within a mandal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panchayat {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mandal_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(constituency: &str, mandal: &str) -> LocationMeta {
        LocationMeta {
            constituency: constituency.to_string(),
            mandal: mandal.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_unset_criteria_do_not_exclude() {
        let m = meta("Pileru", "Kalikiri");
        assert!(m.matches(&LibraryFilter::default()));
        assert!(m.matches(&LibraryFilter::constituency("Pileru")));
    }

    #[test]
    fn test_mismatch_excludes() {
        let m = meta("Pileru", "Kalikiri");
        assert!(!m.matches(&LibraryFilter::constituency("Punganur")));
    }

    #[test]
    fn test_trimmed_equality() {
        let m = meta(" Pileru ", "");
        assert!(m.matches(&LibraryFilter::constituency("Pileru")));
    }

    #[test]
    fn test_criterion_is_trimmed_too() {
        let m = meta("Pileru", "Kalikiri");
        assert!(m.matches(&LibraryFilter::constituency(" Pileru")));
        // whitespace-only criterion counts as unset
        assert!(m.matches(&LibraryFilter::constituency("   ")));
    }

    #[test]
    fn test_is_empty() {
        assert!(LocationMeta::default().is_empty());
        assert!(!meta("Pileru", "").is_empty());
    }
}
