//! Text editing for the editor pane.
//!
//! A rope-backed buffer with cursor and scroll management, one per open
//! document, driven by the TEA update function.

mod buffer;

pub use buffer::{Cursor, Direction, EditorBuffer, TAB_WIDTH};
