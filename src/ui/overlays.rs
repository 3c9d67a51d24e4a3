use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

const HELP_SECTIONS: &[(&str, &[&str])] = &[
    (
        "Files",
        &[
            "  Ctrl+N              New file",
            "  Ctrl+O              Open file",
            "  Ctrl+S              Save (asks for a name if new)",
            "  Ctrl+W              Close tab",
            "  Ctrl+E              Export HTML next to the file",
            "  Ctrl+Q / Ctrl+C     Quit",
        ],
    ),
    (
        "View",
        &[
            "  Ctrl+P              Toggle preview",
            "  F1                  Toggle help",
        ],
    ),
    (
        "Tabs",
        &[
            "  Alt+Left/Right      Previous / next tab",
            "  Ctrl+PgUp/PgDn      Previous / next tab",
            "  Alt+1..9            Go to tab",
            "  Click               Select tab",
        ],
    ),
    (
        "Editor",
        &[
            "  Arrows, Home/End    Navigate",
            "  Ctrl+Left/Right     Word movement",
            "  Ctrl+Home/End       Buffer start / end",
            "  PageUp/PageDown     Page",
            "  Tab                 Indent",
        ],
    ),
    (
        "Prompts",
        &[
            "  Enter / Esc         Confirm / cancel",
            "  y / n / Esc         Save / discard / cancel",
        ],
    ),
];

pub fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(4).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(Color::Indexed(245));

    let mut lines: Vec<Line> = Vec::new();
    for (index, (title, rows)) in HELP_SECTIONS.iter().enumerate() {
        if index > 0 {
            lines.push(Line::raw(""));
        }
        lines.push(Line::styled(*title, section_style));
        lines.extend(rows.iter().map(|row| Line::raw(*row)));
    }
    lines.push(Line::raw(""));
    lines.push(Line::styled("Any key closes", dim_style));

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

/// A `width` x `height` rectangle centered in `area`, clamped to it.
pub fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
