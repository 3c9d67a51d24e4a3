use std::path::Path;

use crate::app::model::SavePurpose;
use crate::app::{App, Message, Model, ToastLevel};
use crate::render::HtmlRenderer;
use crate::session::{
    CloseOutcome, Document, DocumentId, ExitOutcome, PromptAnswers, SaveChoice, SaveOutcome,
};

impl App {
    /// Carry out the storage-touching part of `msg` after [`update`] ran.
    ///
    /// [`update`]: crate::app::update
    pub(super) fn handle_message_side_effects(model: &mut Model, msg: &Message) {
        match msg {
            Message::OpenPath(path) => {
                let id = model.session.open_document(path);
                if model
                    .session
                    .get(id)
                    .is_some_and(|doc| doc.path().is_none())
                {
                    model.show_toast(
                        ToastLevel::Error,
                        format!("Could not open {}", path.display()),
                    );
                }
            }
            Message::Save => {
                if let Some(doc) = model.session.active()
                    && !doc.needs_save_as()
                {
                    let id = doc.id();
                    Self::save(model, id, &mut PromptAnswers::none());
                }
            }
            Message::SaveAs {
                id,
                path,
                purpose: SavePurpose::Save,
            } => {
                let mut answers = PromptAnswers::none();
                if let Some(path) = path {
                    answers.insert_path(*id, path);
                }
                Self::save(model, *id, &mut answers);
            }
            Message::SaveAs {
                id,
                path,
                purpose: SavePurpose::Close,
            } => {
                let mut answers = PromptAnswers::confirming(SaveChoice::SaveAll);
                if let Some(path) = path {
                    answers.insert_path(*id, path);
                }
                Self::close(model, *id, &mut answers);
            }
            Message::CloseTab => {
                if model.prompt.is_none()
                    && let Some(id) = model.active_id()
                {
                    Self::close(model, id, &mut PromptAnswers::none());
                }
            }
            Message::ConfirmClose(id, choice) => {
                let needs_path = model
                    .session
                    .get(*id)
                    .is_some_and(|doc| doc.needs_save_as());
                match choice {
                    SaveChoice::Cancel => {}
                    SaveChoice::SaveAll if needs_path => {}
                    SaveChoice::SaveAll | SaveChoice::Discard => {
                        Self::close(model, *id, &mut PromptAnswers::confirming(*choice));
                    }
                }
            }
            Message::ConfirmExit(SaveChoice::Cancel) => {
                model.show_toast(ToastLevel::Info, "Exit cancelled");
            }
            Message::Quit => {
                if model.prompt.is_none()
                    && model.session.request_exit(&mut PromptAnswers::none()) == ExitOutcome::Exit
                {
                    model.should_quit = true;
                }
            }
            Message::ExportHtml => Self::export_html(model),
            _ => {}
        }

        if let Some(mut plan) = model.take_ready_exit_plan() {
            match model.session.request_exit(&mut plan.answers) {
                ExitOutcome::Exit => model.should_quit = true,
                ExitOutcome::Stay => model.show_toast(ToastLevel::Info, "Exit cancelled"),
            }
        }

        model.apply_session_events();
    }

    fn save(model: &mut Model, id: DocumentId, answers: &mut PromptAnswers) {
        let _scope = crate::perf::scope("app.save");
        match model.session.save_document(id, answers) {
            Ok(SaveOutcome::Unchanged) => model.show_toast(ToastLevel::Info, "No changes to save"),
            Ok(SaveOutcome::Saved(path)) => {
                model.show_toast(ToastLevel::Info, format!("Saved {}", file_label(&path)));
            }
            Ok(SaveOutcome::Cancelled) => model.show_toast(ToastLevel::Warning, "Save cancelled"),
            Ok(SaveOutcome::Failed(err)) => {
                model.show_toast(ToastLevel::Error, format!("Save failed: {err}"));
            }
            Err(err) => tracing::warn!(error = %err, "save request dropped"),
        }
    }

    fn close(model: &mut Model, id: DocumentId, answers: &mut PromptAnswers) {
        let name = model.session.get(id).map(crate::session::Document::name);
        match model.session.close_document(id, answers) {
            Ok(CloseOutcome::Closed) => {
                if let Some(name) = name {
                    model.show_toast(ToastLevel::Info, format!("Closed {name}"));
                }
            }
            Ok(CloseOutcome::Kept) => {
                model.show_toast(ToastLevel::Warning, "Tab kept: changes not saved");
            }
            Err(err) => tracing::warn!(error = %err, "close request dropped"),
        }
    }

    fn export_html(model: &mut Model) {
        let Some(id) = model.active_id() else {
            return;
        };
        let Some(target) = model.session.export_path(id) else {
            model.show_toast(ToastLevel::Warning, "Save the document before exporting");
            return;
        };
        if let Some(owner) = model.session.find_by_path(&target) {
            let name = model.session.get(owner).map(Document::name).unwrap_or_default();
            tracing::debug!(%id, path = %target.display(), "export target is an open document");
            model.show_toast(
                ToastLevel::Warning,
                format!("Not exported: {name} is open in a tab"),
            );
            return;
        }
        let Some(doc) = model.session.get(id) else {
            return;
        };
        let _scope = crate::perf::scope("app.export_html");
        let page = HtmlRenderer::new().render_page(&doc.name(), doc.content());
        match model.session.storage().write(&target, &page) {
            Ok(()) => {
                tracing::info!(%id, path = %target.display(), "exported html");
                model.show_toast(ToastLevel::Info, format!("Exported {}", file_label(&target)));
            }
            Err(err) => {
                tracing::warn!(%id, path = %target.display(), error = %err, "export failed");
                model.show_toast(ToastLevel::Error, format!("Export failed: {err}"));
            }
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
