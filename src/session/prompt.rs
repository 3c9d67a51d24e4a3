use std::collections::HashMap;
use std::path::PathBuf;

use super::{Document, DocumentId};

/// Answer to a "save these files?" confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveChoice {
    /// Save every listed document, then continue.
    SaveAll,
    /// Continue without saving.
    Discard,
    /// Abort the close/exit.
    Cancel,
}

/// Presentation-side answers to the questions the session asks.
pub trait Prompter {
    /// Pick a destination for an unbound document. `None` cancels.
    fn choose_save_path(&mut self, document: &Document) -> Option<PathBuf>;

    /// One batched confirmation for all listed dirty documents.
    fn confirm_save(&mut self, dirty: &[&Document]) -> SaveChoice;
}

/// A [`Prompter`] replaying answers collected ahead of time.
///
/// The TUI gathers paths and confirmations through its own modal prompts and
/// hands them over in one of these. Unanswered questions count as cancelled.
#[derive(Debug, Clone)]
pub struct PromptAnswers {
    choice: SaveChoice,
    paths: HashMap<DocumentId, PathBuf>,
}

impl PromptAnswers {
    /// No paths, and every confirmation is cancelled.
    pub fn none() -> Self {
        Self::confirming(SaveChoice::Cancel)
    }

    pub fn confirming(choice: SaveChoice) -> Self {
        Self {
            choice,
            paths: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_path(mut self, id: DocumentId, path: impl Into<PathBuf>) -> Self {
        self.paths.insert(id, path.into());
        self
    }

    pub fn insert_path(&mut self, id: DocumentId, path: impl Into<PathBuf>) {
        self.paths.insert(id, path.into());
    }

    pub fn set_choice(&mut self, choice: SaveChoice) {
        self.choice = choice;
    }

    pub const fn choice(&self) -> SaveChoice {
        self.choice
    }
}

impl Default for PromptAnswers {
    fn default() -> Self {
        Self::none()
    }
}

impl Prompter for PromptAnswers {
    fn choose_save_path(&mut self, document: &Document) -> Option<PathBuf> {
        self.paths.get(&document.id()).cloned()
    }

    fn confirm_save(&mut self, _dirty: &[&Document]) -> SaveChoice {
        self.choice
    }
}
