//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering
//!
//! Session operations that may touch storage run after `update` in the
//! side-effect handler, which answers the session's questions with the
//! replies gathered through modal [`Prompt`]s.

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Model, Prompt, SavePurpose, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;
use std::time::Duration;

use crate::config::DEFAULT_PREVIEW_DELAY_MS;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    files: Vec<PathBuf>,
    app_dir: PathBuf,
    cheatsheet_enabled: bool,
    preview_visible: bool,
    preview_delay: Duration,
}

impl App {
    /// Create a new application opening `files` in order.
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self {
            files,
            app_dir: crate::config::app_dir(),
            cheatsheet_enabled: true,
            preview_visible: true,
            preview_delay: Duration::from_millis(DEFAULT_PREVIEW_DELAY_MS),
        }
    }

    /// Open the bundled cheatsheet as the first tab.
    pub fn with_cheatsheet(mut self, enabled: bool) -> Self {
        self.cheatsheet_enabled = enabled;
        self
    }

    /// Directory the cheatsheet is seeded into.
    pub fn with_app_dir(mut self, dir: PathBuf) -> Self {
        self.app_dir = dir;
        self
    }

    /// Set initial preview pane visibility.
    pub fn with_preview_visible(mut self, visible: bool) -> Self {
        self.preview_visible = visible;
        self
    }

    /// How long typing must pause before the preview re-renders.
    pub const fn with_preview_delay(mut self, delay: Duration) -> Self {
        self.preview_delay = delay;
        self
    }
}
