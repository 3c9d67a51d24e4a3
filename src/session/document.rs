use std::fmt;
use std::path::{Path, PathBuf};

/// Placeholder title for documents that have never been saved.
pub const UNTITLED: &str = "New File";

/// Prefix shown in front of the title while a document has unsaved changes.
pub const DIRTY_MARKER: &str = "* ";

/// Stable identifier of an open document. Never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl DocumentId {
    pub(super) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One open, editable unit of markdown text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    id: DocumentId,
    path: Option<PathBuf>,
    label: Option<String>,
    content: String,
    dirty: bool,
}

impl Document {
    pub(super) const fn untitled(id: DocumentId) -> Self {
        Self {
            id,
            path: None,
            label: None,
            content: String::new(),
            dirty: true,
        }
    }

    pub(super) const fn loaded(id: DocumentId, path: PathBuf, content: String) -> Self {
        Self {
            id,
            path: Some(path),
            label: None,
            content,
            dirty: false,
        }
    }

    /// A document showing why `path` could not be loaded. It is not bound to
    /// `path` and counts as saved.
    pub(super) fn load_failed(id: DocumentId, path: &Path, message: String) -> Self {
        Self {
            id,
            path: None,
            label: file_name(path),
            content: message,
            dirty: false,
        }
    }

    pub const fn id(&self) -> DocumentId {
        self.id
    }

    /// The resolved backing file, if the document has one.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Saving this document has to ask for a destination first.
    pub const fn needs_save_as(&self) -> bool {
        self.dirty && self.path.is_none()
    }

    /// File name, remembered label, or the untitled placeholder.
    pub fn name(&self) -> String {
        self.path
            .as_deref()
            .and_then(file_name)
            .or_else(|| self.label.clone())
            .unwrap_or_else(|| UNTITLED.to_string())
    }

    /// Tab title: [`name`](Self::name) with the dirty marker when modified.
    pub fn display_title(&self) -> String {
        if self.dirty {
            format!("{DIRTY_MARKER}{}", self.name())
        } else {
            self.name()
        }
    }

    /// Replace the content. Returns `true` when this edit started a dirty streak.
    pub(super) fn set_content(&mut self, content: String) -> bool {
        self.content = content;
        let became_dirty = !self.dirty;
        self.dirty = true;
        became_dirty
    }

    /// Replace the content without touching the dirty flag.
    pub(super) fn replace_content(&mut self, content: String) {
        self.content = content;
    }

    pub(super) fn mark_saved(&mut self, path: PathBuf) {
        self.path = Some(path);
        self.label = None;
        self.dirty = false;
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untitled_title_carries_dirty_marker() {
        let doc = Document::untitled(DocumentId::new(1));
        assert_eq!(doc.display_title(), "* New File");
        assert!(doc.needs_save_as());
    }

    #[test]
    fn test_loaded_title_is_file_name() {
        let doc = Document::loaded(
            DocumentId::new(2),
            PathBuf::from("/notes/todo.md"),
            "- [ ] a".to_string(),
        );
        assert_eq!(doc.display_title(), "todo.md");
        assert!(!doc.needs_save_as());
    }

    #[test]
    fn test_load_failed_keeps_file_name_but_no_path() {
        let doc = Document::load_failed(
            DocumentId::new(3),
            Path::new("/gone/readme.md"),
            "Error loading file\nnope".to_string(),
        );
        assert_eq!(doc.display_title(), "readme.md");
        assert!(doc.path().is_none());
        assert!(!doc.is_dirty());
    }

    #[test]
    fn test_set_content_reports_only_first_transition() {
        let mut doc = Document::loaded(DocumentId::new(4), PathBuf::from("/a.md"), String::new());
        assert!(doc.set_content("a".to_string()));
        assert!(!doc.set_content("ab".to_string()));
        assert_eq!(doc.display_title(), "* a.md");
    }

    #[test]
    fn test_document_id_display() {
        assert_eq!(DocumentId::new(7).to_string(), "#7");
    }
}
