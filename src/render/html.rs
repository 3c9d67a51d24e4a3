use comrak::{Options, markdown_to_html};

use super::{Renderer, enable_gfm};

/// Renders markdown to an HTML fragment.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub const fn new() -> Self {
        Self
    }

    /// Render a standalone page, used when exporting a document.
    pub fn render_page(&self, title: &str, markdown: &str) -> String {
        let body = self.render(markdown);
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{body}</body>\n</html>\n",
            escape_html(title)
        )
    }
}

impl Renderer for HtmlRenderer {
    type Output = String;

    fn render(&self, markdown: &str) -> String {
        let mut options = Options::default();
        enable_gfm(&mut options);
        markdown_to_html(markdown, &options)
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
