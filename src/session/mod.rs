//! Document session management.
//!
//! The [`Session`] is the single source of truth for which documents are
//! open, which one is active, and whether each is safe to discard:
//! - [`Document`]: one open unit of markdown text, optionally file-backed
//! - [`Session`]: open/new/edit/save/close/exit operations
//! - [`Prompter`]: how the session asks Presentation for save paths and
//!   confirmations
//! - [`SessionEvent`]: what changed, queued for Presentation to pick up

mod document;
mod error;
mod manager;
mod prompt;

pub use document::{DIRTY_MARKER, Document, DocumentId, UNTITLED};
pub use error::{LoadError, SaveError, SessionError};
pub use manager::Session;
pub use prompt::{PromptAnswers, Prompter, SaveChoice};

use std::path::PathBuf;

/// Notifications queued for Presentation by session operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new tab was added.
    Opened(DocumentId),
    /// The active tab changed.
    Activated(DocumentId),
    /// The tab title (name or dirty marker) changed.
    TitleChanged(DocumentId),
    /// Content changed through an edit; the preview is stale.
    ContentChanged(DocumentId),
    /// Content was replaced by the session itself; editors must reload it.
    ContentReplaced(DocumentId),
    /// The tab was removed.
    Closed(DocumentId),
}

/// Result of [`Session::save_document`].
#[derive(Debug)]
pub enum SaveOutcome {
    /// Nothing to save; no storage call was made.
    Unchanged,
    /// Written to the given path.
    Saved(PathBuf),
    /// The user cancelled the destination prompt. Nothing changed.
    Cancelled,
    Failed(SaveError),
}

impl SaveOutcome {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Unchanged | Self::Saved(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed,
    /// The user cancelled or saving did not go through; the tab stays open.
    Kept,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Exit,
    Stay,
}

#[cfg(test)]
mod tests;
