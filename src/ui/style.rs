//! Theming and color definitions.
//!
//! Preview styles for rendered markdown plus the chrome around it (tab bar,
//! status line, prompts). Uses ANSI colors that adapt to the terminal's
//! palette, with darker variants when `COLORFGBG` reports a light background.

use std::sync::OnceLock;

use ratatui::style::{Color, Modifier, Style};

use crate::app::ToastLevel;
use crate::render::{BlockKind, InlineStyle};

static LIGHT_BACKGROUND: OnceLock<bool> = OnceLock::new();

/// Whether the terminal reports a light background.
pub fn is_light_background() -> bool {
    *LIGHT_BACKGROUND
        .get_or_init(|| light_background_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref()))
}

fn light_background_from_colorfgbg(colorfgbg: Option<&str>) -> bool {
    let Some(value) = colorfgbg else {
        return false;
    };
    let bg = value.rsplit(';').next().unwrap_or(value);
    bg.parse::<u8>().is_ok_and(|bg| bg >= 7)
}

const fn pick(light_bg: bool, light: Color, dark: Color) -> Color {
    if light_bg { light } else { dark }
}

/// Base style for a preview line.
pub fn style_for_block(kind: BlockKind) -> Style {
    let light_bg = is_light_background();
    match kind {
        BlockKind::Heading(1) => Style::default()
            .fg(pick(light_bg, Color::Indexed(24), Color::Cyan))
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        BlockKind::Heading(2) => Style::default()
            .fg(pick(light_bg, Color::Indexed(22), Color::Green))
            .add_modifier(Modifier::BOLD),
        BlockKind::Heading(3) => Style::default()
            .fg(pick(light_bg, Color::Indexed(58), Color::Yellow))
            .add_modifier(Modifier::BOLD),
        BlockKind::Heading(4) => Style::default()
            .fg(pick(light_bg, Color::Indexed(24), Color::Blue))
            .add_modifier(Modifier::BOLD),
        BlockKind::Heading(5) => Style::default()
            .fg(pick(light_bg, Color::Indexed(54), Color::Magenta))
            .add_modifier(Modifier::BOLD),
        BlockKind::Heading(_) => Style::default()
            .fg(pick(light_bg, Color::Indexed(24), Color::Cyan))
            .add_modifier(Modifier::BOLD),

        BlockKind::CodeBlock => Style::default().fg(pick(
            light_bg,
            Color::Indexed(238),
            Color::Indexed(245),
        )),
        BlockKind::CodeInfo => Style::default()
            .fg(pick(light_bg, Color::Indexed(241), Color::Indexed(240)))
            .add_modifier(Modifier::ITALIC),

        BlockKind::BlockQuote => Style::default()
            .fg(pick(light_bg, Color::Indexed(24), Color::Blue))
            .add_modifier(Modifier::ITALIC),

        BlockKind::Rule => Style::default()
            .fg(pick(light_bg, Color::Indexed(241), Color::Indexed(240)))
            .add_modifier(Modifier::DIM),

        BlockKind::TableHeader => Style::default().add_modifier(Modifier::BOLD),

        BlockKind::Html => Style::default()
            .fg(pick(light_bg, Color::Indexed(90), Color::Magenta))
            .add_modifier(Modifier::DIM),

        BlockKind::ListItem | BlockKind::Table | BlockKind::Paragraph => Style::default(),
    }
}

/// Style for an inline span, merged with its line's base style.
pub fn style_for_inline(base: Style, inline: InlineStyle) -> Style {
    let light_bg = is_light_background();
    let mut style = base;

    if inline.emphasis {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if inline.strong {
        style = style.add_modifier(Modifier::BOLD);
    }
    if inline.strikethrough {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    if inline.link {
        style = style
            .add_modifier(Modifier::UNDERLINED)
            .fg(pick(light_bg, Color::Blue, Color::LightBlue));
    }
    if inline.code {
        style = style
            .fg(pick(light_bg, Color::Indexed(88), Color::Red))
            .add_modifier(Modifier::BOLD)
            .remove_modifier(Modifier::DIM);
    }

    style
}

/// Quote bars and blank quoted lines.
pub fn quote_bar_style() -> Style {
    Style::default().fg(pick(
        is_light_background(),
        Color::Indexed(245),
        Color::Indexed(240),
    ))
}

pub fn tab_style(active: bool) -> Style {
    if active {
        Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().bg(Color::Indexed(236)).fg(Color::Indexed(250))
    }
}

pub fn tab_bar_style() -> Style {
    Style::default().bg(Color::Indexed(234))
}

pub fn status_bar_style() -> Style {
    Style::default().bg(Color::DarkGray).fg(Color::White)
}

pub fn prompt_style() -> Style {
    Style::default().bg(Color::Blue).fg(Color::White)
}

pub fn pane_border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

pub fn toast_style(level: ToastLevel) -> (&'static str, Style) {
    match level {
        ToastLevel::Info => ("[info]", Style::default().bg(Color::DarkGray).fg(Color::White)),
        ToastLevel::Warning => ("[warn]", Style::default().bg(Color::Yellow).fg(Color::Black)),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    }
}
