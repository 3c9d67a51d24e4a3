use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use unicode_width::UnicodeWidthChar;

use crate::app::Model;
use crate::editor::EditorBuffer;

use super::style::{pane_border_style, tab_bar_style, tab_style};
use super::{overlays, screen_layout, split_panes, status, tab_labels};

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let layout = screen_layout(area);

    render_tab_bar(model, frame, layout.tabs);
    if model.session.is_empty() {
        render_empty(frame, layout.main);
    } else {
        let (editor_area, preview_area) = split_panes(layout.main, model.preview_visible);
        render_editor(model, frame, editor_area);
        if let Some(preview_area) = preview_area {
            render_preview(model, frame, preview_area);
        }
    }
    status::render_prompt_line(model, frame, layout.prompt);
    status::render_status_bar(model, frame, layout.status);

    if model.help_visible {
        overlays::render_help_overlay(frame, area);
    }
}

fn render_tab_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let active = model.session.active_index();
    let mut spans = Vec::new();
    for (index, label) in tab_labels(model).into_iter().enumerate() {
        if index > 0 {
            spans.push(Span::styled("│", tab_bar_style()));
        }
        spans.push(Span::styled(label, tab_style(active == Some(index))));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)).style(tab_bar_style()), area);
}

fn render_empty(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::raw(""),
        Line::styled("No open documents", Style::default().add_modifier(Modifier::BOLD)),
        Line::raw(""),
        Line::raw("Ctrl+N new file  Ctrl+O open file  Ctrl+Q quit"),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(pane_border_style(false));
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(block),
        area,
    );
}

fn render_editor(model: &Model, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title("Editor")
        .borders(Borders::ALL)
        .border_style(pane_border_style(true));
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let Some(buf) = model.active_editor() else {
        return;
    };

    // Line number gutter width
    let total_lines = buf.line_count();
    let gutter_width = line_number_width(total_lines);
    let text_width = usize::from(inner.width.saturating_sub(gutter_width + 1));

    let visible_height = usize::from(inner.height);
    let start = buf.scroll_offset();
    let end = (start + visible_height).min(total_lines);
    let cursor = buf.cursor();
    let hscroll = horizontal_scroll(buf, text_width);

    let mut content: Vec<Line> = Vec::with_capacity(end.saturating_sub(start));
    for line_idx in start..end {
        let line_text = buf.line_at(line_idx).unwrap_or_default();
        let line_num = format!("{:>width$} ", line_idx + 1, width = usize::from(gutter_width));

        let mut spans = vec![Span::styled(line_num, Style::default().fg(Color::DarkGray))];
        let cursor_col = (line_idx == cursor.line).then_some(cursor.col);
        spans.extend(editor_line_spans(&line_text, cursor_col, hscroll));
        content.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(content), inner);
}

/// Columns scrolled off to the left so the cursor stays inside `text_width`.
fn horizontal_scroll(buf: &EditorBuffer, text_width: usize) -> usize {
    let col = buf.display_col();
    if text_width == 0 || col < text_width {
        0
    } else {
        col + 1 - text_width
    }
}

/// Spans for one editor row, skipping `hscroll` display columns and drawing
/// the cursor as an inverted cell.
fn editor_line_spans(text: &str, cursor_col: Option<usize>, hscroll: usize) -> Vec<Span<'static>> {
    let mut before = String::new();
    let mut at_cursor = None;
    let mut after = String::new();
    let mut width = 0;

    for (idx, ch) in text.chars().enumerate() {
        let skipped = width < hscroll;
        width += ch.width().unwrap_or(0);
        if skipped {
            continue;
        }
        match cursor_col {
            Some(col) if idx < col => before.push(ch),
            Some(col) if idx == col => at_cursor = Some(ch),
            _ => after.push(ch),
        }
    }

    let mut spans = Vec::with_capacity(3);
    if !before.is_empty() {
        spans.push(Span::raw(before));
    }
    if cursor_col.is_some() {
        spans.push(Span::styled(
            at_cursor.unwrap_or(' ').to_string(),
            Style::default().bg(Color::White).fg(Color::Black),
        ));
    }
    if !after.is_empty() {
        spans.push(Span::raw(after));
    }
    spans
}

fn render_preview(model: &Model, frame: &mut Frame, area: Rect) {
    let title = if model
        .active_id()
        .is_some_and(|id| model.is_preview_stale(id))
    {
        "Preview (updating)"
    } else {
        "Preview"
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(pane_border_style(false));
    frame.render_widget(Clear, area);

    let (Some(preview), Some(buf)) = (model.active_preview(), model.active_editor()) else {
        frame.render_widget(block, area);
        return;
    };

    // Proportional to the editor scroll; wrapped rows are not counted.
    let offset = preview_scroll(buf.scroll_offset(), buf.line_count(), preview.len());
    let paragraph = Paragraph::new(preview.lines().to_vec())
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((offset, 0));
    frame.render_widget(paragraph, area);
}

fn preview_scroll(editor_scroll: usize, editor_lines: usize, preview_lines: usize) -> u16 {
    if editor_lines == 0 {
        return 0;
    }
    let offset = editor_scroll * preview_lines / editor_lines;
    u16::try_from(offset).unwrap_or(u16::MAX)
}

/// Calculate the width needed for line numbers.
pub const fn line_number_width(total_lines: usize) -> u16 {
    if total_lines < 10 {
        1
    } else if total_lines < 100 {
        2
    } else if total_lines < 1_000 {
        3
    } else if total_lines < 10_000 {
        4
    } else if total_lines < 100_000 {
        5
    } else {
        6
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_texts(spans: &[Span<'_>]) -> Vec<String> {
        spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_cursor_inside_line_splits_spans() {
        let spans = editor_line_spans("hello", Some(1), 0);
        assert_eq!(span_texts(&spans), vec!["h", "e", "llo"]);
        assert_eq!(spans[1].style.bg, Some(Color::White));
    }

    #[test]
    fn test_cursor_at_end_draws_blank_cell() {
        let spans = editor_line_spans("ab", Some(2), 0);
        assert_eq!(span_texts(&spans), vec!["ab", " "]);
    }

    #[test]
    fn test_cursor_on_multibyte_char() {
        let spans = editor_line_spans("äöü", Some(1), 0);
        assert_eq!(span_texts(&spans), vec!["ä", "ö", "ü"]);
    }

    #[test]
    fn test_horizontal_scroll_skips_columns() {
        let spans = editor_line_spans("abcdef", Some(5), 3);
        assert_eq!(span_texts(&spans), vec!["de", "f"]);
    }

    #[test]
    fn test_line_without_cursor_is_one_span() {
        let spans = editor_line_spans("plain", None, 0);
        assert_eq!(span_texts(&spans), vec!["plain"]);
    }

    #[test]
    fn test_preview_scroll_is_proportional() {
        assert_eq!(preview_scroll(0, 100, 40), 0);
        assert_eq!(preview_scroll(50, 100, 40), 20);
        assert_eq!(preview_scroll(3, 0, 40), 0);
    }

    #[test]
    fn test_line_number_width() {
        assert_eq!(line_number_width(1), 1);
        assert_eq!(line_number_width(10), 2);
        assert_eq!(line_number_width(999), 3);
        assert_eq!(line_number_width(10_000), 5);
    }
}
