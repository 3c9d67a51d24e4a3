use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

use crate::editor::EditorBuffer;
use crate::render::{Preview, Renderer, TerminalRenderer};
use crate::session::{DocumentId, PromptAnswers, SaveChoice, Session, SessionEvent};

const TOAST_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Why a save-as prompt was opened; decides what happens after the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePurpose {
    Save,
    Close,
    Exit,
}

/// Modal prompt shown on the prompt line. While one is open all keys go to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Path to open.
    Open { input: String },
    /// Destination for an unbound document.
    SaveAs {
        id: DocumentId,
        input: String,
        purpose: SavePurpose,
    },
    /// Save the dirty tab before closing it?
    ConfirmClose { id: DocumentId },
    /// Save the dirty documents before exiting?
    ConfirmExit { dirty: usize },
}

impl Prompt {
    /// Editable text of input prompts.
    pub fn input(&self) -> Option<&str> {
        match self {
            Self::Open { input } | Self::SaveAs { input, .. } => Some(input.as_str()),
            Self::ConfirmClose { .. } | Self::ConfirmExit { .. } => None,
        }
    }

    const fn input_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::Open { input } | Self::SaveAs { input, .. } => Some(input),
            Self::ConfirmClose { .. } | Self::ConfirmExit { .. } => None,
        }
    }
}

/// Answers gathered for a pending exit: the batched choice plus save paths
/// for unbound documents, asked one at a time.
#[derive(Debug, Clone)]
pub(super) struct ExitPlan {
    pub(super) answers: PromptAnswers,
    pub(super) queue: VecDeque<DocumentId>,
}

/// The complete application state.
pub struct Model {
    /// Open documents; the source of truth for content, paths and dirty state
    pub session: Session,
    /// Editing state per open document
    editors: HashMap<DocumentId, EditorBuffer>,
    /// Rendered previews per open document
    previews: HashMap<DocumentId, Preview>,
    /// Documents whose preview lags behind their content
    stale_previews: HashSet<DocumentId>,
    /// New content arrived since the event loop last asked
    preview_requested: bool,
    renderer: TerminalRenderer,
    /// Whether the preview pane is shown next to the editor
    pub preview_visible: bool,
    /// Active modal prompt, if any
    pub prompt: Option<Prompt>,
    pub(super) exit_plan: Option<ExitPlan>,
    /// Whether the help overlay is visible
    pub help_visible: bool,
    toast: Option<Toast>,
    /// Terminal size (columns, rows)
    pub size: (u16, u16),
    /// Whether the app should quit
    pub should_quit: bool,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("session", &self.session)
            .field("preview_visible", &self.preview_visible)
            .field("prompt", &self.prompt)
            .field("should_quit", &self.should_quit)
            .finish_non_exhaustive()
    }
}

impl Model {
    pub fn new(session: Session, size: (u16, u16)) -> Self {
        let mut model = Self {
            session,
            editors: HashMap::new(),
            previews: HashMap::new(),
            stale_previews: HashSet::new(),
            preview_requested: false,
            renderer: TerminalRenderer::new(),
            preview_visible: true,
            prompt: None,
            exit_plan: None,
            help_visible: false,
            toast: None,
            size,
            should_quit: false,
        };
        model.apply_session_events();
        model
    }

    /// Number of text rows inside the editor pane.
    pub fn editor_height(&self) -> usize {
        usize::from(crate::ui::pane_inner_height(self.size.1))
    }

    pub fn active_id(&self) -> Option<DocumentId> {
        self.session.active_id()
    }

    pub fn editor(&self, id: DocumentId) -> Option<&EditorBuffer> {
        self.editors.get(&id)
    }

    pub fn active_editor(&self) -> Option<&EditorBuffer> {
        self.active_id().and_then(|id| self.editors.get(&id))
    }

    pub(super) fn active_editor_mut(&mut self) -> Option<(DocumentId, &mut EditorBuffer)> {
        let id = self.active_id()?;
        self.editors.get_mut(&id).map(|editor| (id, editor))
    }

    pub fn preview(&self, id: DocumentId) -> Option<&Preview> {
        self.previews.get(&id)
    }

    pub fn active_preview(&self) -> Option<&Preview> {
        self.active_id().and_then(|id| self.previews.get(&id))
    }

    pub fn is_preview_stale(&self, id: DocumentId) -> bool {
        self.stale_previews.contains(&id)
    }

    /// Whether new content arrived since the last call.
    pub fn take_preview_request(&mut self) -> bool {
        std::mem::take(&mut self.preview_requested)
    }

    /// Re-render the active document's preview if it is stale and shown.
    pub fn refresh_active_preview(&mut self) {
        if !self.preview_visible {
            return;
        }
        if let Some(id) = self.active_id()
            && self.stale_previews.contains(&id)
        {
            self.render_preview(id);
        }
    }

    fn render_preview(&mut self, id: DocumentId) {
        let Some(document) = self.session.get(id) else {
            return;
        };
        let _scope = crate::perf::scope("preview.render");
        let preview = self.renderer.render(document.content());
        self.previews.insert(id, preview);
        self.stale_previews.remove(&id);
    }

    fn mark_stale(&mut self, id: DocumentId) {
        self.stale_previews.insert(id);
        self.preview_requested = true;
    }

    /// Bring editors and previews in line with what the session reported.
    pub fn apply_session_events(&mut self) {
        for event in self.session.drain_events() {
            tracing::trace!(?event, "session event");
            match event {
                SessionEvent::Opened(id) => {
                    let text = self.session.get(id).map(|doc| doc.content().to_string());
                    self.editors
                        .insert(id, EditorBuffer::from_text(text.as_deref().unwrap_or_default()));
                    self.render_preview(id);
                }
                SessionEvent::ContentReplaced(id) => {
                    if let (Some(editor), Some(doc)) = (self.editors.get_mut(&id), self.session.get(id)) {
                        editor.set_text(doc.content());
                    }
                    self.render_preview(id);
                }
                SessionEvent::ContentChanged(id) => {
                    if self.previews.contains_key(&id) {
                        self.mark_stale(id);
                    }
                }
                SessionEvent::Activated(id) => {
                    if self.stale_previews.contains(&id) {
                        self.preview_requested = true;
                    }
                }
                SessionEvent::TitleChanged(_) => {}
                SessionEvent::Closed(id) => {
                    self.editors.remove(&id);
                    self.previews.remove(&id);
                    self.stale_previews.remove(&id);
                }
            }
        }
    }

    /// Push the active editor's text into the session.
    pub(super) fn commit_active_edit(&mut self) {
        let Some(id) = self.active_id() else {
            return;
        };
        let Some(text) = self.editors.get(&id).map(EditorBuffer::text) else {
            return;
        };
        if let Err(err) = self.session.edit_document(id, text) {
            tracing::warn!(error = %err, "edit dropped");
        }
        self.apply_session_events();
    }

    pub(super) fn prompt_input_mut(&mut self) -> Option<&mut String> {
        self.prompt.as_mut().and_then(Prompt::input_mut)
    }

    /// Start the exit flow after the user answered the batched confirmation.
    pub(super) fn begin_exit(&mut self, choice: SaveChoice) {
        let queue = if choice == SaveChoice::SaveAll {
            self.session
                .dirty_documents()
                .into_iter()
                .filter(|doc| doc.needs_save_as())
                .map(crate::session::Document::id)
                .collect()
        } else {
            VecDeque::new()
        };
        self.exit_plan = Some(ExitPlan {
            answers: PromptAnswers::confirming(choice),
            queue,
        });
        self.advance_exit_plan();
    }

    /// Ask for the next missing save path, if any.
    pub(super) fn advance_exit_plan(&mut self) {
        let Some(plan) = self.exit_plan.as_mut() else {
            return;
        };
        if let Some(id) = plan.queue.pop_front() {
            self.session.activate(id).ok();
            self.apply_session_events();
            self.prompt = Some(Prompt::SaveAs {
                id,
                input: String::new(),
                purpose: SavePurpose::Exit,
            });
        }
    }

    /// The exit plan once every question has been answered.
    pub(super) fn take_ready_exit_plan(&mut self) -> Option<ExitPlan> {
        if self.prompt.is_some() || self.exit_plan.as_ref().is_some_and(|plan| !plan.queue.is_empty()) {
            return None;
        }
        self.exit_plan.take()
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + TOAST_DURATION,
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}
