//! # fieldbook-grid
//!
//! The presentation-independent half of the grid editor: which row window
//! a scrolled viewport should render, and the commit-on-blur edit buffer
//! that turns keystrokes into at most one sheet mutation.

mod editor;
mod viewport;

pub use editor::EditBuffer;
pub use viewport::{RowWindow, Viewport};
