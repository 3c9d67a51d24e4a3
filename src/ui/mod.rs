//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - [`render`]: Frame layout, tab bar, editor and preview panes
//! - [`style`]: Theming and colors
//!
//! Screen rows from top to bottom: tab bar, editor | preview panes, prompt
//! line, status bar.

pub mod style;

mod overlays;
mod render;
mod status;

pub use overlays::centered_popup_rect;
pub use render::{line_number_width, render};

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use unicode_width::UnicodeWidthStr;

use crate::app::Model;

pub const EDITOR_WIDTH_PERCENT: u16 = 50;
pub const PREVIEW_WIDTH_PERCENT: u16 = 50;

/// Rows taken by everything except the pane contents: tab bar, pane
/// borders, prompt line and status bar.
const CHROME_ROWS: u16 = 5;

/// Areas of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub tabs: Rect,
    pub main: Rect,
    pub prompt: Rect,
    pub status: Rect,
}

pub fn screen_layout(area: Rect) -> ScreenLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);
    ScreenLayout {
        tabs: rows[0],
        main: rows[1],
        prompt: rows[2],
        status: rows[3],
    }
}

/// Editor pane and, when shown, the preview pane beside it.
pub fn split_panes(area: Rect, preview_visible: bool) -> (Rect, Option<Rect>) {
    if !preview_visible {
        return (area, None);
    }
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(EDITOR_WIDTH_PERCENT),
            Constraint::Percentage(PREVIEW_WIDTH_PERCENT),
        ])
        .split(area);
    (chunks[0], Some(chunks[1]))
}

/// Text rows inside a pane for a terminal `height` rows tall.
pub const fn pane_inner_height(height: u16) -> u16 {
    height.saturating_sub(CHROME_ROWS)
}

/// Label shown for each tab, in tab order.
pub fn tab_labels(model: &Model) -> Vec<String> {
    model
        .session
        .documents()
        .iter()
        .map(|doc| format!(" {} ", doc.display_title()))
        .collect()
}

/// Tab under terminal column `column` of the tab bar.
pub fn tab_at_column(model: &Model, column: u16) -> Option<usize> {
    let column = usize::from(column);
    let mut start = 0;
    for (index, label) in tab_labels(model).iter().enumerate() {
        let end = start + label.width();
        if (start..end).contains(&column) {
            return Some(index);
        }
        // one column for the separator
        start = end + 1;
    }
    None
}
