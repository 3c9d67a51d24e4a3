use std::path::{Path, PathBuf};

use super::{
    CloseOutcome, Document, DocumentId, ExitOutcome, LoadError, Prompter, SaveChoice, SaveError,
    SaveOutcome, SessionError, SessionEvent,
};
use crate::storage::Storage;

/// The ordered set of open documents plus the active selection.
pub struct Session {
    storage: Box<dyn Storage>,
    documents: Vec<Document>,
    active: Option<DocumentId>,
    next_id: u64,
    events: Vec<SessionEvent>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("documents", &self.documents.len())
            .field("active", &self.active)
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(storage: impl Storage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
            documents: Vec::new(),
            active: None,
            next_id: 1,
            events: Vec::new(),
        }
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// Open documents in tab order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub const fn len(&self) -> usize {
        self.documents.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.id() == id)
    }

    pub fn index_of(&self, id: DocumentId) -> Option<usize> {
        self.documents.iter().position(|doc| doc.id() == id)
    }

    pub const fn active_id(&self) -> Option<DocumentId> {
        self.active
    }

    pub fn active(&self) -> Option<&Document> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active.and_then(|id| self.index_of(id))
    }

    pub fn dirty_documents(&self) -> Vec<&Document> {
        self.documents.iter().filter(|doc| doc.is_dirty()).collect()
    }

    /// The document bound to `path`, compared after resolution.
    pub fn find_by_path(&self, path: &Path) -> Option<DocumentId> {
        let resolved = self.storage.resolve(path);
        self.documents
            .iter()
            .find(|doc| doc.path() == Some(resolved.as_path()))
            .map(Document::id)
    }

    /// Take all events queued since the last call.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Add an untitled, empty, dirty document and make it active.
    pub fn create_document(&mut self) -> DocumentId {
        let id = self.allocate_id();
        self.push(Document::untitled(id));
        tracing::debug!(%id, "created untitled document");
        id
    }

    /// Open `path`, or re-select the tab that already shows it.
    ///
    /// A failed read still produces a tab: its content describes the error,
    /// it is not bound to `path`, and it counts as saved.
    pub fn open_document(&mut self, path: impl AsRef<Path>) -> DocumentId {
        let path = path.as_ref();
        if let Some(existing) = self.find_by_path(path) {
            tracing::debug!(id = %existing, path = %path.display(), "already open, activating");
            self.set_active(existing);
            return existing;
        }

        let resolved = self.storage.resolve(path);
        let id = self.allocate_id();
        let document = match self.storage.read(&resolved) {
            Ok(content) => {
                tracing::info!(%id, path = %resolved.display(), bytes = content.len(), "opened");
                Document::loaded(id, resolved, content)
            }
            Err(source) => {
                let err = LoadError {
                    path: resolved,
                    source,
                };
                tracing::warn!(%id, error = %err, "load failed");
                Document::load_failed(id, path, format!("Error loading file\n{err}"))
            }
        };
        self.push(document);
        id
    }

    /// Replace the content of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownDocument`] if `id` is not open.
    pub fn edit_document(
        &mut self,
        id: DocumentId,
        content: impl Into<String>,
    ) -> Result<(), SessionError> {
        let document = self.get_mut(id)?;
        if document.set_content(content.into()) {
            self.events.push(SessionEvent::TitleChanged(id));
        }
        self.events.push(SessionEvent::ContentChanged(id));
        Ok(())
    }

    /// Persist `id`, asking `prompter` for a destination when it has none.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownDocument`] if `id` is not open. Storage
    /// failures are reported through [`SaveOutcome::Failed`].
    pub fn save_document(
        &mut self,
        id: DocumentId,
        prompter: &mut impl Prompter,
    ) -> Result<SaveOutcome, SessionError> {
        let index = self.require_index(id)?;
        let document = &self.documents[index];
        if !document.is_dirty() {
            return Ok(SaveOutcome::Unchanged);
        }

        let target = if let Some(path) = document.path() {
            path.to_path_buf()
        } else {
            let Some(chosen) = prompter.choose_save_path(document) else {
                tracing::debug!(%id, "save cancelled");
                return Ok(SaveOutcome::Cancelled);
            };
            let resolved = self.storage.resolve(&chosen);
            if self
                .documents
                .iter()
                .any(|doc| doc.id() != id && doc.path() == Some(resolved.as_path()))
            {
                tracing::warn!(%id, path = %resolved.display(), "save target already open");
                return Ok(SaveOutcome::Failed(SaveError::AlreadyOpen(resolved)));
            }
            resolved
        };

        let result = self.storage.write(&target, self.documents[index].content());
        let document = &mut self.documents[index];
        match result {
            Ok(()) => {
                tracing::info!(%id, path = %target.display(), "saved");
                document.mark_saved(target.clone());
                self.events.push(SessionEvent::TitleChanged(id));
                Ok(SaveOutcome::Saved(target))
            }
            Err(source) => {
                let err = SaveError::Write {
                    path: target,
                    source,
                };
                tracing::warn!(%id, error = %err, "save failed");
                document.replace_content(format!("Error writing file\n{err}"));
                self.events.push(SessionEvent::ContentReplaced(id));
                self.events.push(SessionEvent::ContentChanged(id));
                Ok(SaveOutcome::Failed(err))
            }
        }
    }

    /// Close `id`, confirming first if it has unsaved changes.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownDocument`] if `id` is not open.
    pub fn close_document(
        &mut self,
        id: DocumentId,
        prompter: &mut impl Prompter,
    ) -> Result<CloseOutcome, SessionError> {
        let index = self.require_index(id)?;
        let document = &self.documents[index];
        if document.is_dirty() {
            match prompter.confirm_save(&[document]) {
                SaveChoice::Cancel => return Ok(CloseOutcome::Kept),
                SaveChoice::Discard => {}
                SaveChoice::SaveAll => {
                    let outcome = self.save_document(id, prompter)?;
                    if !outcome.is_success() {
                        tracing::debug!(%id, ?outcome, "close aborted, save did not complete");
                        return Ok(CloseOutcome::Kept);
                    }
                }
            }
        }
        self.remove(id);
        Ok(CloseOutcome::Closed)
    }

    /// Decide whether the process may exit.
    ///
    /// All dirty documents are confirmed in one batch. When the user picks
    /// [`SaveChoice::SaveAll`] each one is saved and the exit proceeds even if
    /// some of those saves fail or are cancelled.
    pub fn request_exit(&mut self, prompter: &mut impl Prompter) -> ExitOutcome {
        let dirty: Vec<DocumentId> = self
            .documents
            .iter()
            .filter(|doc| doc.is_dirty())
            .map(Document::id)
            .collect();
        if dirty.is_empty() {
            return ExitOutcome::Exit;
        }

        let choice = prompter.confirm_save(&self.dirty_documents());
        match choice {
            SaveChoice::Cancel => ExitOutcome::Stay,
            SaveChoice::Discard => {
                tracing::info!(count = dirty.len(), "exiting without saving");
                ExitOutcome::Exit
            }
            SaveChoice::SaveAll => {
                for id in dirty {
                    match self.save_document(id, prompter) {
                        Ok(outcome) if outcome.is_success() => {}
                        Ok(outcome) => tracing::warn!(%id, ?outcome, "unsaved at exit"),
                        Err(err) => tracing::warn!(%id, error = %err, "unsaved at exit"),
                    }
                }
                ExitOutcome::Exit
            }
        }
    }

    /// Make `id` the active tab.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownDocument`] if `id` is not open.
    pub fn activate(&mut self, id: DocumentId) -> Result<(), SessionError> {
        self.require_index(id)?;
        self.set_active(id);
        Ok(())
    }

    pub fn activate_index(&mut self, index: usize) -> Option<DocumentId> {
        let id = self.documents.get(index)?.id();
        self.set_active(id);
        Some(id)
    }

    /// Activate the next tab, wrapping around.
    pub fn activate_next(&mut self) -> Option<DocumentId> {
        let len = self.documents.len();
        let next = self.active_index().map_or(0, |i| (i + 1) % len.max(1));
        self.activate_index(next)
    }

    /// Activate the previous tab, wrapping around.
    pub fn activate_previous(&mut self) -> Option<DocumentId> {
        let len = self.documents.len();
        let prev = self
            .active_index()
            .map_or(0, |i| if i == 0 { len.saturating_sub(1) } else { i - 1 });
        self.activate_index(prev)
    }

    /// Where the HTML export of `id` goes: the backing file with an `.html`
    /// extension, or `<stem>.export.html` when the file already is `.html`.
    /// `None` for unbound documents.
    pub fn export_path(&self, id: DocumentId) -> Option<PathBuf> {
        let path = self.get(id)?.path()?;
        let is_html = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html"));
        Some(if is_html {
            path.with_extension("export.html")
        } else {
            path.with_extension("html")
        })
    }

    fn allocate_id(&mut self) -> DocumentId {
        let id = DocumentId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn push(&mut self, document: Document) {
        let id = document.id();
        self.documents.push(document);
        self.events.push(SessionEvent::Opened(id));
        self.set_active(id);
    }

    fn set_active(&mut self, id: DocumentId) {
        self.active = Some(id);
        self.events.push(SessionEvent::Activated(id));
    }

    fn remove(&mut self, id: DocumentId) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        self.documents.remove(index);
        self.events.push(SessionEvent::Closed(id));
        tracing::debug!(%id, "closed");
        if self.active == Some(id) {
            self.active = None;
            let neighbour = self
                .documents
                .get(index)
                .or_else(|| index.checked_sub(1).and_then(|i| self.documents.get(i)))
                .map(Document::id);
            if let Some(next) = neighbour {
                self.set_active(next);
            }
        }
    }

    fn require_index(&self, id: DocumentId) -> Result<usize, SessionError> {
        self.index_of(id).ok_or(SessionError::UnknownDocument(id))
    }

    fn get_mut(&mut self, id: DocumentId) -> Result<&mut Document, SessionError> {
        self.documents
            .iter_mut()
            .find(|doc| doc.id() == id)
            .ok_or(SessionError::UnknownDocument(id))
    }
}
