//! Markdown rendering.
//!
//! Both renderers parse with comrak and never fail; malformed markdown simply
//! renders as text.
//! - [`HtmlRenderer`]: markdown to an HTML fragment (and export pages)
//! - [`TerminalRenderer`]: markdown to styled lines for the preview pane

mod html;
mod terminal;

pub use html::HtmlRenderer;
pub use terminal::{BlockKind, InlineStyle, Preview, TerminalRenderer};

use comrak::Options;

/// Converts markdown text into some displayable form.
pub trait Renderer {
    type Output;

    /// Render `markdown`. Must be pure and must not panic on any input.
    fn render(&self, markdown: &str) -> Self::Output;
}

/// Enable the GitHub-flavoured extensions shared by both renderers.
fn enable_gfm(options: &mut Options) {
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;
    options.extension.header_ids = Some(String::new());
}
