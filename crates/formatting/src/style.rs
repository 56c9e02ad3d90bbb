use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Font attributes captured from a cell. Colors are ARGB hex without a
/// leading `#`, as stored in the workbook (`FF0000FF` = opaque blue).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Horizontal/vertical alignment plus text wrapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<String>,
    #[serde(default)]
    pub wrap_text: bool,
}

/// Solid background fill, ARGB hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillStyle {
    pub color: String,
}

/// One border edge: an xlsx border style name ("thin", "medium", ...) and
/// an optional ARGB color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorderEdge {
    pub style: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// The four border edges of a cell; absent edges are unstyled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorderSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<BorderEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<BorderEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<BorderEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<BorderEdge>,
}

impl BorderSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.top.is_none() && self.right.is_none() && self.bottom.is_none() && self.left.is_none()
    }
}

/// Everything captured for one styled cell. A snapshot with all fields
/// unset is never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<FontStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<AlignmentStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<FillStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<BorderSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_format: Option<String>,
}

impl StyleSnapshot {
    /// True when nothing was captured and the snapshot should be dropped.
    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.font.is_none()
            && self.alignment.is_none()
            && self.fill.is_none()
            && self.border.is_none()
            && self.number_format.is_none()
    }
}

/// Sparse cell-style map keyed by `"row,col"` with 1-based coordinates, so
/// `"1,1"` is the top-left cell. The string key keeps the JSON form flat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleMap(IndexMap<String, StyleSnapshot>);

impl StyleMap {
    #[must_use]
    pub fn new() -> Self {
        StyleMap(IndexMap::new())
    }

    fn key(row: u32, col: u32) -> String {
        format!("{row},{col}")
    }

    pub fn insert(&mut self, row: u32, col: u32, snapshot: StyleSnapshot) {
        self.0.insert(Self::key(row, col), snapshot);
    }

    #[must_use]
    pub fn get(&self, row: u32, col: u32) -> Option<&StyleSnapshot> {
        self.0.get(&Self::key(row, col))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate as `((row, col), snapshot)`. Keys that do not parse as a
    /// coordinate pair are skipped.
    pub fn iter(&self) -> impl Iterator<Item = ((u32, u32), &StyleSnapshot)> {
        self.0.iter().filter_map(|(key, snapshot)| {
            let (row, col) = key.split_once(',')?;
            Some(((row.parse().ok()?, col.parse().ok()?), snapshot))
        })
    }
}

/// Per-sheet visual layout: cell styles plus explicit column widths
/// (character units) and row heights (points), both 1-based and sparse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetLayout {
    #[serde(default)]
    pub styles: StyleMap,
    #[serde(default)]
    pub col_widths: BTreeMap<u32, f64>,
    #[serde(default)]
    pub row_heights: BTreeMap<u32, f64>,
}

impl SheetLayout {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty() && self.col_widths.is_empty() && self.row_heights.is_empty()
    }
}
