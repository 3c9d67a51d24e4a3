use std::path::PathBuf;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::Frame;

use crate::app::model::Prompt;
use crate::app::{App, Message, Model};
use crate::editor::Direction;
use crate::session::SaveChoice;

use super::event_loop::ResizeDebouncer;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Paste(text) => Self::handle_paste(text, model),
            Event::Resize(w, h) => {
                crate::perf::log_event("event.resize.queue", format!("width={w} height={h}"));
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.help_visible || model.prompt.is_some() {
            return None;
        }
        match mouse.kind {
            MouseEventKind::Up(MouseButton::Left) if mouse.row == 0 => {
                crate::ui::tab_at_column(model, mouse.column).map(Message::SelectTab)
            }
            MouseEventKind::ScrollDown => Some(Message::MoveCursor(Direction::Down)),
            MouseEventKind::ScrollUp => Some(Message::MoveCursor(Direction::Up)),
            _ => None,
        }
    }

    fn handle_paste(text: &str, model: &Model) -> Option<Message> {
        if model.help_visible || text.is_empty() {
            return None;
        }
        Some(Message::Paste(text.to_string()))
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return Some(Message::HideHelp);
        }

        if let Some(prompt) = model.prompt.as_ref() {
            return Self::handle_prompt_key(key, prompt);
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            // Commands
            KeyCode::Char('n') if ctrl => Some(Message::NewDocument),
            KeyCode::Char('o') if ctrl => Some(Message::StartOpen),
            KeyCode::Char('s') if ctrl => Some(Message::Save),
            KeyCode::Char('w') if ctrl => Some(Message::CloseTab),
            KeyCode::Char('q' | 'c') if ctrl => Some(Message::Quit),
            KeyCode::Char('p') if ctrl => Some(Message::TogglePreview),
            KeyCode::Char('e') if ctrl => Some(Message::ExportHtml),
            KeyCode::F(1) => Some(Message::ToggleHelp),

            // Tabs
            KeyCode::Right if alt => Some(Message::NextTab),
            KeyCode::Left if alt => Some(Message::PrevTab),
            KeyCode::PageDown if ctrl => Some(Message::NextTab),
            KeyCode::PageUp if ctrl => Some(Message::PrevTab),
            KeyCode::Char(c @ '1'..='9') if alt => {
                Some(Message::SelectTab(c as usize - '1' as usize))
            }

            // Navigation
            KeyCode::Left if ctrl => Some(Message::MoveWordLeft),
            KeyCode::Right if ctrl => Some(Message::MoveWordRight),
            KeyCode::Home if ctrl => Some(Message::MoveToStart),
            KeyCode::End if ctrl => Some(Message::MoveToEnd),
            KeyCode::Left => Some(Message::MoveCursor(Direction::Left)),
            KeyCode::Right => Some(Message::MoveCursor(Direction::Right)),
            KeyCode::Up => Some(Message::MoveCursor(Direction::Up)),
            KeyCode::Down => Some(Message::MoveCursor(Direction::Down)),
            KeyCode::Home => Some(Message::MoveHome),
            KeyCode::End => Some(Message::MoveEnd),
            KeyCode::PageUp => Some(Message::PageUp),
            KeyCode::PageDown => Some(Message::PageDown),

            // Editing
            KeyCode::Enter => Some(Message::SplitLine),
            KeyCode::Tab => Some(Message::InsertTab),
            KeyCode::Backspace => Some(Message::DeleteBack),
            KeyCode::Delete => Some(Message::DeleteForward),
            KeyCode::Char(c) if !ctrl && !alt => Some(Message::InsertChar(c)),

            _ => None,
        }
    }

    fn handle_prompt_key(key: KeyEvent, prompt: &Prompt) -> Option<Message> {
        match prompt {
            Prompt::ConfirmClose { id } => {
                confirm_choice(key).map(|choice| Message::ConfirmClose(*id, choice))
            }
            Prompt::ConfirmExit { .. } => confirm_choice(key).map(Message::ConfirmExit),
            Prompt::Open { input } => match key.code {
                KeyCode::Esc => Some(Message::CancelPrompt),
                KeyCode::Enter => path_from_input(input).map(Message::OpenPath),
                _ => text_input(key),
            },
            Prompt::SaveAs { id, input, purpose } => {
                let answer = |path| Message::SaveAs {
                    id: *id,
                    path,
                    purpose: *purpose,
                };
                match key.code {
                    KeyCode::Esc => Some(answer(None)),
                    KeyCode::Enter => path_from_input(input).map(|path| answer(Some(path))),
                    _ => text_input(key),
                }
            }
        }
    }

    pub(super) fn view(model: &Model, frame: &mut Frame) {
        crate::ui::render(model, frame);
    }
}

/// y saves, n discards, Esc cancels.
fn confirm_choice(key: KeyEvent) -> Option<SaveChoice> {
    match key.code {
        KeyCode::Char('y' | 'Y') => Some(SaveChoice::SaveAll),
        KeyCode::Char('n' | 'N') => Some(SaveChoice::Discard),
        KeyCode::Esc => Some(SaveChoice::Cancel),
        _ => None,
    }
}

fn text_input(key: KeyEvent) -> Option<Message> {
    match key.code {
        KeyCode::Backspace => Some(Message::PromptBackspace),
        KeyCode::Char(c)
            if !key.modifiers.contains(KeyModifiers::CONTROL)
                && !key.modifiers.contains(KeyModifiers::ALT) =>
        {
            Some(Message::PromptInput(c))
        }
        _ => None,
    }
}

fn path_from_input(input: &str) -> Option<PathBuf> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}
