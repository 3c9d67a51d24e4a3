use std::path::PathBuf;

use crate::app::Model;
use crate::app::model::{Prompt, SavePurpose};
use crate::editor::{Direction, EditorBuffer};
use crate::session::{DocumentId, SaveChoice};

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Editing
    /// Insert a character at the cursor
    InsertChar(char),
    /// Insert spaces up to the next tab stop
    InsertTab,
    /// Split line at cursor (Enter)
    SplitLine,
    /// Delete character before cursor (Backspace)
    DeleteBack,
    /// Delete character at cursor (Delete)
    DeleteForward,
    /// Bracketed paste; goes to the open prompt if there is one
    Paste(String),

    // Cursor
    MoveCursor(Direction),
    MoveHome,
    MoveEnd,
    MoveWordLeft,
    MoveWordRight,
    MoveToStart,
    MoveToEnd,
    PageUp,
    PageDown,

    // Tabs
    /// Create an untitled document
    NewDocument,
    NextTab,
    PrevTab,
    /// Select tab by zero-based index
    SelectTab(usize),

    // Files
    /// Ask for a path to open
    StartOpen,
    /// Open the given path
    OpenPath(PathBuf),
    /// Save the active document
    Save,
    /// Close the active tab
    CloseTab,
    /// Write the active document as HTML next to its file
    ExportHtml,
    /// Answer to a save-as prompt; `None` cancels
    SaveAs {
        id: DocumentId,
        path: Option<PathBuf>,
        purpose: SavePurpose,
    },
    /// Answer to the close confirmation
    ConfirmClose(DocumentId, SaveChoice),
    /// Answer to the exit confirmation
    ConfirmExit(SaveChoice),

    // Prompt line
    PromptInput(char),
    PromptBackspace,
    /// Dismiss the open-file prompt
    CancelPrompt,

    // View
    TogglePreview,
    ToggleHelp,
    HideHelp,
    /// Re-render the active preview (debounced by the event loop)
    RefreshPreview,
    /// Terminal resized
    Resize(u16, u16),

    // Application
    /// Quit the application
    Quit,
}

/// Pure function that updates the model based on a message.
///
/// Everything here is in-memory; storage-touching intents (open, save,
/// close, exit, export) are carried out by the side-effect handler after
/// this returns.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        // Editing
        Message::InsertChar(ch) => edit(&mut model, |buf| buf.insert_char(ch)),
        Message::InsertTab => edit(&mut model, EditorBuffer::insert_tab),
        Message::SplitLine => edit(&mut model, EditorBuffer::split_line),
        Message::DeleteBack => {
            let changed = with_editor(&mut model, EditorBuffer::delete_back).unwrap_or(false);
            if changed {
                model.commit_active_edit();
            }
        }
        Message::DeleteForward => {
            let changed = with_editor(&mut model, EditorBuffer::delete_forward).unwrap_or(false);
            if changed {
                model.commit_active_edit();
            }
        }
        Message::Paste(text) => {
            if let Some(input) = model.prompt_input_mut() {
                let line = text.split(['\n', '\r']).next().unwrap_or_default();
                input.push_str(line);
            } else if model.prompt.is_none() {
                edit(&mut model, |buf| buf.insert_str(&text));
            }
        }

        // Cursor
        Message::MoveCursor(direction) => {
            with_editor(&mut model, |buf| buf.move_cursor(direction));
        }
        Message::MoveHome => {
            with_editor(&mut model, EditorBuffer::move_home);
        }
        Message::MoveEnd => {
            with_editor(&mut model, EditorBuffer::move_end);
        }
        Message::MoveWordLeft => {
            with_editor(&mut model, EditorBuffer::move_word_left);
        }
        Message::MoveWordRight => {
            with_editor(&mut model, EditorBuffer::move_word_right);
        }
        Message::MoveToStart => {
            with_editor(&mut model, EditorBuffer::move_to_start);
        }
        Message::MoveToEnd => {
            with_editor(&mut model, EditorBuffer::move_to_end);
        }
        Message::PageUp => {
            let rows = model.editor_height();
            with_editor(&mut model, |buf| buf.page_up(rows));
        }
        Message::PageDown => {
            let rows = model.editor_height();
            with_editor(&mut model, |buf| buf.page_down(rows));
        }

        // Tabs
        Message::NewDocument => {
            model.session.create_document();
        }
        Message::NextTab => {
            model.session.activate_next();
        }
        Message::PrevTab => {
            model.session.activate_previous();
        }
        Message::SelectTab(index) => {
            model.session.activate_index(index);
        }

        // Files
        Message::StartOpen => {
            model.prompt = Some(Prompt::Open {
                input: String::new(),
            });
        }
        Message::OpenPath(_) | Message::CancelPrompt => {
            model.prompt = None;
        }
        Message::Save => {
            if let Some(doc) = model.session.active()
                && doc.needs_save_as()
            {
                model.prompt = Some(Prompt::SaveAs {
                    id: doc.id(),
                    input: String::new(),
                    purpose: SavePurpose::Save,
                });
            }
        }
        Message::CloseTab => {
            if let Some(doc) = model.session.active()
                && doc.is_dirty()
            {
                model.prompt = Some(Prompt::ConfirmClose { id: doc.id() });
            }
        }
        Message::ConfirmClose(id, choice) => {
            model.prompt = None;
            if choice == SaveChoice::SaveAll
                && model.session.get(id).is_some_and(|doc| doc.needs_save_as())
            {
                model.prompt = Some(Prompt::SaveAs {
                    id,
                    input: String::new(),
                    purpose: SavePurpose::Close,
                });
            }
        }
        Message::SaveAs { id, path, purpose } => {
            model.prompt = None;
            if purpose == SavePurpose::Exit {
                if let (Some(plan), Some(path)) = (model.exit_plan.as_mut(), path) {
                    plan.answers.insert_path(id, path);
                }
                model.advance_exit_plan();
            }
        }
        Message::Quit => {
            let dirty = model.session.dirty_documents().len();
            if dirty > 0 {
                model.prompt = Some(Prompt::ConfirmExit { dirty });
            }
        }
        Message::ConfirmExit(choice) => {
            model.prompt = None;
            if choice != SaveChoice::Cancel {
                model.begin_exit(choice);
            }
        }
        Message::ExportHtml => {}

        // Prompt line
        Message::PromptInput(ch) => {
            if let Some(input) = model.prompt_input_mut() {
                input.push(ch);
            }
        }
        Message::PromptBackspace => {
            if let Some(input) = model.prompt_input_mut() {
                input.pop();
            }
        }

        // View
        Message::TogglePreview => {
            model.preview_visible = !model.preview_visible;
            model.refresh_active_preview();
        }
        Message::ToggleHelp => {
            model.help_visible = !model.help_visible;
        }
        Message::HideHelp => {
            model.help_visible = false;
        }
        Message::RefreshPreview => {
            model.refresh_active_preview();
        }
        Message::Resize(width, height) => {
            model.size = (width, height);
        }
    }

    model.apply_session_events();
    let height = model.editor_height();
    if let Some((_, buf)) = model.active_editor_mut() {
        buf.ensure_cursor_visible(height);
    }
    model
}

fn with_editor<T>(model: &mut Model, f: impl FnOnce(&mut EditorBuffer) -> T) -> Option<T> {
    model.active_editor_mut().map(|(_, buf)| f(buf))
}

/// Apply a text change to the active editor and report it to the session.
fn edit(model: &mut Model, f: impl FnOnce(&mut EditorBuffer)) {
    if with_editor(model, f).is_some() {
        model.commit_active_edit();
    }
}
