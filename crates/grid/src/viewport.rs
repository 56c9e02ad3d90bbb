/// Fixed-row-height virtualization: only the rows intersecting the
/// viewport, plus an overscan margin, are rendered.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    /// Height of one row in pixels.
    pub row_height: f64,
    /// Height of the scrollable area in pixels.
    pub viewport_height: f64,
    /// Extra rows rendered past the visible edge to hide scroll pop-in.
    pub overscan: usize,
}

/// A half-open row range `[start, end)` to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowWindow {
    pub start: usize,
    pub end: usize,
}

impl RowWindow {
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            row_height: 44.0,
            viewport_height: 480.0,
            overscan: 6,
        }
    }
}

impl Viewport {
    /// Rows to render for a scroll position.
    #[must_use]
    pub fn window(&self, scroll_top: f64, total_rows: usize) -> RowWindow {
        let start = (scroll_top.max(0.0) / self.row_height).floor() as usize;
        let start = start.min(total_rows);
        let visible = (self.viewport_height / self.row_height).ceil() as usize;
        let end = (start + visible + self.overscan).min(total_rows);
        RowWindow { start, end }
    }

    /// Total scrollable height for the row count.
    #[must_use]
    pub fn content_height(&self, total_rows: usize) -> f64 {
        self.row_height * total_rows as f64
    }

    /// Pixel offset of a row from the top of the content.
    #[must_use]
    pub fn row_offset(&self, index: usize) -> f64 {
        self.row_height * index as f64
    }
}
