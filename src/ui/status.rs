use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, Prompt, SavePurpose};

use super::style::{prompt_style, status_bar_style, toast_style};

const HINTS: &str = "Ctrl+N new  Ctrl+O open  Ctrl+S save  Ctrl+W close  Ctrl+P preview  Ctrl+Q quit";

/// Prompt line: the open prompt, else the current toast, else key hints.
pub fn render_prompt_line(model: &Model, frame: &mut Frame, area: Rect) {
    if let Some(prompt) = model.prompt.as_ref() {
        let line = Line::from(vec![
            Span::raw(prompt_text(model, prompt)),
            Span::styled(
                " ",
                Style::default().bg(Color::White).fg(Color::Black),
            ),
        ]);
        frame.render_widget(Paragraph::new(line).style(prompt_style()), area);
        return;
    }

    if let Some((message, level)) = model.active_toast() {
        let (prefix, style) = toast_style(level);
        let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
        frame.render_widget(toast, area);
        return;
    }

    let hints = Paragraph::new(HINTS).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hints, area);
}

fn prompt_text(model: &Model, prompt: &Prompt) -> String {
    let name = |id| {
        model
            .session
            .get(id)
            .map_or_else(String::new, crate::session::Document::name)
    };
    match prompt {
        Prompt::Open { input } => format!("Open file: {input}"),
        Prompt::SaveAs { id, input, purpose } => {
            let verb = match purpose {
                SavePurpose::Save => "Save",
                SavePurpose::Close => "Save before closing",
                SavePurpose::Exit => "Save before exit",
            };
            format!("{verb} {} as: {input}", name(*id))
        }
        Prompt::ConfirmClose { id } => format!(
            "Save changes to {}? (y)es (n)o (Esc) cancel",
            name(*id)
        ),
        Prompt::ConfirmExit { dirty } => {
            let noun = if *dirty == 1 { "document has" } else { "documents have" };
            format!("{dirty} {noun} unsaved changes. Save all? (y)es (n)o (Esc) cancel")
        }
    }
}

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some(doc) = model.session.active() else {
        let status = Paragraph::new(" No document  F1:help").style(status_bar_style());
        frame.render_widget(status, area);
        return;
    };

    let dirty_indicator = if doc.is_dirty() { " [modified]" } else { "" };
    let cursor_info = model.active_editor().map_or_else(String::new, |b| {
        let c = b.cursor();
        format!("  Ln {}, Col {}", c.line + 1, c.col + 1)
    });
    let tab_info = model
        .session
        .active_index()
        .map_or_else(String::new, |i| format!("  [{}/{}]", i + 1, model.session.len()));
    let preview_indicator = if model.preview_visible { "" } else { "  [no preview]" };

    let status = format!(
        " {}{dirty_indicator}{cursor_info}{tab_info}{preview_indicator}  F1:help",
        doc.name()
    );
    frame.render_widget(Paragraph::new(status).style(status_bar_style()), area);
}
