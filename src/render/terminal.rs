use comrak::nodes::{AstNode, ListDelimType, ListType, NodeValue};
use comrak::{Arena, Options, parse_document};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use super::{Renderer, enable_gfm};
use crate::ui::style::{quote_bar_style, style_for_block, style_for_inline};

const RULE_WIDTH: usize = 40;

/// Kind of block a preview line belongs to; selects its base style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Heading(u8),
    Paragraph,
    ListItem,
    CodeBlock,
    CodeInfo,
    BlockQuote,
    Rule,
    Table,
    TableHeader,
    Html,
}

/// Inline emphasis flags accumulated while walking inline nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub emphasis: bool,
    pub strong: bool,
    pub strikethrough: bool,
    pub code: bool,
    pub link: bool,
}

#[derive(Debug, Clone)]
struct InlineSpan {
    text: String,
    style: InlineStyle,
}

impl InlineSpan {
    fn new(text: impl Into<String>, style: InlineStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// Rendered preview of one document, ready for a ratatui `Paragraph`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preview {
    lines: Vec<Line<'static>>,
}

impl Preview {
    pub fn lines(&self) -> &[Line<'static>] {
        &self.lines
    }

    pub const fn len(&self) -> usize {
        self.lines.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The preview without styling, one row per line.
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Renders markdown to styled terminal lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalRenderer;

impl TerminalRenderer {
    pub const fn new() -> Self {
        Self
    }
}

impl Renderer for TerminalRenderer {
    type Output = Preview;

    fn render(&self, markdown: &str) -> Preview {
        let arena = Arena::new();
        let mut options = Options::default();
        enable_gfm(&mut options);
        let root = parse_document(&arena, markdown, &options);

        let mut builder = PreviewBuilder::default();
        builder.block(root, &Context::default());
        builder.finish()
    }
}

/// Per-block rendering state passed down the tree.
#[derive(Debug, Clone, Default)]
struct Context {
    /// Leading text for every line (quote bars, list indentation).
    prefix: String,
    quoted: bool,
    /// Inside a tight list: no blank line between paragraphs.
    tight: bool,
}

impl Context {
    fn nested(&self, extra: &str) -> Self {
        Self {
            prefix: format!("{}{extra}", self.prefix),
            ..self.clone()
        }
    }
}

#[derive(Debug, Default)]
struct PreviewBuilder {
    lines: Vec<Line<'static>>,
    /// One-shot prefix replacing `Context::prefix` on the next line (list markers).
    marker: Option<String>,
    /// The last line is a separator pushed by `blank`.
    blank_tail: bool,
}

impl PreviewBuilder {
    fn finish(mut self) -> Preview {
        if self.blank_tail {
            self.lines.pop();
        }
        Preview { lines: self.lines }
    }

    fn push_line(&mut self, line: Line<'static>) {
        self.lines.push(line);
        self.blank_tail = false;
    }

    fn children<'a>(&mut self, node: &'a AstNode<'a>, ctx: &Context) {
        for child in node.children() {
            self.block(child, ctx);
        }
    }

    fn block<'a>(&mut self, node: &'a AstNode<'a>, ctx: &Context) {
        match &node.data.borrow().value {
            NodeValue::Document => self.children(node, ctx),

            NodeValue::Heading(heading) => {
                let kind = BlockKind::Heading(heading.level);
                let mut spans = vec![InlineSpan::new(
                    format!("{} ", "#".repeat(usize::from(heading.level))),
                    InlineStyle::default(),
                )];
                collect_inline_spans(node, InlineStyle::default(), &mut spans);
                self.push_spans(ctx, spans, kind);
                self.blank(ctx);
            }

            NodeValue::Paragraph => {
                let kind = if ctx.quoted {
                    BlockKind::BlockQuote
                } else if ctx.tight || !ctx.prefix.is_empty() {
                    BlockKind::ListItem
                } else {
                    BlockKind::Paragraph
                };
                let mut spans = Vec::new();
                collect_inline_spans(node, InlineStyle::default(), &mut spans);
                self.push_spans(ctx, spans, kind);
                if !ctx.tight {
                    self.blank(ctx);
                }
            }

            NodeValue::CodeBlock(code_block) => {
                let info = code_block.info.trim();
                if !info.is_empty() {
                    self.push_text(ctx, format!("▌{info}"), BlockKind::CodeInfo);
                }
                let literal = code_block.literal.strip_suffix('\n').unwrap_or(&code_block.literal);
                for row in literal.split('\n') {
                    self.push_text(ctx, format!("│ {row}"), BlockKind::CodeBlock);
                }
                self.blank(ctx);
            }

            NodeValue::List(list) => {
                let delimiter = match list.delimiter {
                    ListDelimType::Paren => ')',
                    ListDelimType::Period => '.',
                };
                let count = node.children().count();
                let number_width = (list.start + count.saturating_sub(1)).to_string().len();
                let list_ctx = Context {
                    tight: list.tight,
                    ..ctx.clone()
                };

                for (index, item) in node.children().enumerate() {
                    let marker = match &item.data.borrow().value {
                        NodeValue::TaskItem(Some(_)) => "✓ ".to_string(),
                        NodeValue::TaskItem(None) => "□ ".to_string(),
                        _ => match list.list_type {
                            ListType::Bullet => "• ".to_string(),
                            ListType::Ordered => {
                                let number = list.start + index;
                                format!("{number:>number_width$}{delimiter} ")
                            }
                        },
                    };
                    let item_ctx = list_ctx.nested(&" ".repeat(marker.width()));
                    self.marker = Some(format!("{}{marker}", ctx.prefix));
                    self.children(item, &item_ctx);
                    // An empty item still shows its marker.
                    if let Some(marker) = self.marker.take() {
                        let style = style_for_block(BlockKind::ListItem);
                        self.push_line(Line::from(Span::styled(marker, style)));
                    }
                }
                if !ctx.tight {
                    self.blank(ctx);
                }
            }

            NodeValue::BlockQuote => {
                let quote_ctx = Context {
                    quoted: true,
                    ..ctx.nested("│ ")
                };
                self.children(node, &quote_ctx);
                self.blank(ctx);
            }

            NodeValue::ThematicBreak => {
                self.push_text(ctx, "─".repeat(RULE_WIDTH), BlockKind::Rule);
                self.blank(ctx);
            }

            NodeValue::Table(_) => {
                self.table(node, ctx);
                self.blank(ctx);
            }

            NodeValue::HtmlBlock(html) => {
                let literal = html.literal.strip_suffix('\n').unwrap_or(&html.literal);
                for row in literal.split('\n') {
                    self.push_text(ctx, row.to_string(), BlockKind::Html);
                }
                self.blank(ctx);
            }

            NodeValue::FootnoteDefinition(def) => {
                self.marker = Some(format!("{}[^{}]: ", ctx.prefix, def.name));
                let note_ctx = Context {
                    tight: true,
                    ..ctx.nested("    ")
                };
                self.children(node, &note_ctx);
                self.marker = None;
                self.blank(ctx);
            }

            _ => self.children(node, ctx),
        }
    }

    fn table<'a>(&mut self, node: &'a AstNode<'a>, ctx: &Context) {
        let mut rows: Vec<(bool, Vec<String>)> = Vec::new();
        for row in node.children() {
            let header = match &row.data.borrow().value {
                NodeValue::TableRow(header) => *header,
                _ => continue,
            };
            let cells = row
                .children()
                .map(|cell| {
                    let mut spans = Vec::new();
                    collect_inline_spans(cell, InlineStyle::default(), &mut spans);
                    spans.into_iter().map(|span| span.text).collect::<String>()
                })
                .collect();
            rows.push((header, cells));
        }

        let columns = rows.iter().map(|(_, cells)| cells.len()).max().unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for (_, cells) in &rows {
            for (col, cell) in cells.iter().enumerate() {
                widths[col] = widths[col].max(cell.width());
            }
        }

        for (header, cells) in &rows {
            let mut text = String::from("│");
            for (col, width) in widths.iter().enumerate() {
                let cell = cells.get(col).map_or("", String::as_str);
                let pad = width.saturating_sub(cell.width());
                text.push_str(&format!(" {cell}{} │", " ".repeat(pad)));
            }
            let kind = if *header {
                BlockKind::TableHeader
            } else {
                BlockKind::Table
            };
            self.push_text(ctx, text, kind);
            if *header {
                let rule = widths
                    .iter()
                    .map(|width| "─".repeat(width + 2))
                    .collect::<Vec<_>>()
                    .join("┼");
                self.push_text(ctx, format!("├{rule}┤"), BlockKind::Table);
            }
        }
    }

    fn take_prefix(&mut self, ctx: &Context) -> String {
        self.marker.take().unwrap_or_else(|| ctx.prefix.clone())
    }

    fn prefix_span(prefix: String, ctx: &Context) -> Option<Span<'static>> {
        if prefix.is_empty() {
            return None;
        }
        let style = if ctx.quoted {
            quote_bar_style()
        } else {
            style_for_block(BlockKind::ListItem)
        };
        Some(Span::styled(prefix, style))
    }

    fn push_text(&mut self, ctx: &Context, text: String, kind: BlockKind) {
        let prefix = self.take_prefix(ctx);
        let mut spans: Vec<Span<'static>> = Self::prefix_span(prefix, ctx).into_iter().collect();
        spans.push(Span::styled(text, style_for_block(kind)));
        self.push_line(Line::from(spans));
    }

    /// Emit inline spans, starting a new row at every hard line break.
    fn push_spans(&mut self, ctx: &Context, spans: Vec<InlineSpan>, kind: BlockKind) {
        let base = style_for_block(kind);
        let mut row: Vec<Span<'static>> = Vec::new();
        for span in spans {
            if span.text == "\n" {
                self.push_row(ctx, std::mem::take(&mut row));
                continue;
            }
            row.push(Span::styled(span.text, style_for_inline(base, span.style)));
        }
        self.push_row(ctx, row);
    }

    fn push_row(&mut self, ctx: &Context, row: Vec<Span<'static>>) {
        let prefix = self.take_prefix(ctx);
        let mut spans: Vec<Span<'static>> = Self::prefix_span(prefix, ctx).into_iter().collect();
        spans.extend(row);
        self.push_line(Line::from(spans));
    }

    fn blank(&mut self, ctx: &Context) {
        if self.lines.is_empty() || self.blank_tail {
            return;
        }
        let prefix = ctx.prefix.trim_end().to_string();
        let line = if prefix.is_empty() || !ctx.quoted {
            Line::default()
        } else {
            Line::from(Span::styled(prefix, quote_bar_style()))
        };
        self.lines.push(line);
        self.blank_tail = true;
    }
}

fn collect_inline_spans<'a>(node: &'a AstNode<'a>, style: InlineStyle, spans: &mut Vec<InlineSpan>) {
    for child in node.children() {
        collect_inline(child, style, spans);
    }
}

fn collect_inline<'a>(node: &'a AstNode<'a>, style: InlineStyle, spans: &mut Vec<InlineSpan>) {
    match &node.data.borrow().value {
        NodeValue::List(_) | NodeValue::Item(_) => {}
        NodeValue::Text(text) => spans.push(InlineSpan::new(text.to_string(), style)),
        NodeValue::Code(code) => {
            let code_style = InlineStyle {
                code: true,
                ..InlineStyle::default()
            };
            spans.push(InlineSpan::new(code.literal.clone(), code_style));
        }
        NodeValue::HtmlInline(html) => spans.push(InlineSpan::new(html.clone(), style)),
        NodeValue::Emph => collect_inline_spans(
            node,
            InlineStyle {
                emphasis: true,
                ..style
            },
            spans,
        ),
        NodeValue::Strong => collect_inline_spans(
            node,
            InlineStyle {
                strong: true,
                ..style
            },
            spans,
        ),
        NodeValue::Strikethrough => collect_inline_spans(
            node,
            InlineStyle {
                strikethrough: true,
                ..style
            },
            spans,
        ),
        NodeValue::Link(_) => collect_inline_spans(node, InlineStyle { link: true, ..style }, spans),
        NodeValue::Image(_) => {
            let mut alt = Vec::new();
            collect_inline_spans(node, InlineStyle::default(), &mut alt);
            let alt: String = alt.into_iter().map(|span| span.text).collect();
            spans.push(InlineSpan::new(
                format!("[image: {alt}]"),
                InlineStyle { link: true, ..style },
            ));
        }
        NodeValue::FootnoteReference(reference) => {
            spans.push(InlineSpan::new(format!("[^{}]", reference.name), style));
        }
        NodeValue::SoftBreak => spans.push(InlineSpan::new(" ", style)),
        NodeValue::LineBreak => spans.push(InlineSpan::new("\n", style)),
        _ => collect_inline_spans(node, style, spans),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Modifier;

    fn render(markdown: &str) -> Preview {
        TerminalRenderer::new().render(markdown)
    }

    fn find_span<'a>(preview: &'a Preview, text: &str) -> &'a Span<'static> {
        preview
            .lines()
            .iter()
            .flat_map(|line| line.spans.iter())
            .find(|span| span.content.contains(text))
            .unwrap_or_else(|| panic!("no span containing {text:?} in {preview:?}"))
    }

    #[test]
    fn test_empty_input_renders_nothing() {
        assert!(render("").is_empty());
    }

    #[test]
    fn test_heading_keeps_marker_and_is_bold() {
        let preview = render("# Hi");
        assert_eq!(preview.plain_text(), "# Hi");
        let span = find_span(&preview, "Hi");
        assert!(span.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_paragraphs_are_separated_by_blank_line() {
        let preview = render("one\n\ntwo");
        assert_eq!(preview.plain_text(), "one\n\ntwo");
    }

    #[test]
    fn test_soft_break_joins_and_hard_break_splits() {
        assert_eq!(render("a\nb").plain_text(), "a b");
        assert_eq!(render("a  \nb").plain_text(), "a\nb");
    }

    #[test]
    fn test_inline_styles() {
        let preview = render("*it* **bold** ~~gone~~ `code`");
        assert!(
            find_span(&preview, "it")
                .style
                .add_modifier
                .contains(Modifier::ITALIC)
        );
        assert!(
            find_span(&preview, "bold")
                .style
                .add_modifier
                .contains(Modifier::BOLD)
        );
        assert!(
            find_span(&preview, "gone")
                .style
                .add_modifier
                .contains(Modifier::CROSSED_OUT)
        );
        assert!(find_span(&preview, "code").style.fg.is_some());
    }

    #[test]
    fn test_link_is_underlined() {
        let preview = render("[site](https://example.com)");
        assert!(
            find_span(&preview, "site")
                .style
                .add_modifier
                .contains(Modifier::UNDERLINED)
        );
    }

    #[test]
    fn test_bullet_and_ordered_lists() {
        assert_eq!(render("- a\n- b").plain_text(), "• a\n• b");
        assert_eq!(render("3. x\n4. y").plain_text(), "3. x\n4. y");
    }

    #[test]
    fn test_ordered_list_numbers_are_right_aligned() {
        let md: String = (1..=10).map(|n| format!("{n}. item\n")).collect();
        let text = render(&md).plain_text();
        assert!(text.starts_with(" 1. item"), "got: {text}");
        assert!(text.ends_with("10. item"), "got: {text}");
    }

    #[test]
    fn test_nested_list_is_indented() {
        let text = render("- outer\n  - inner").plain_text();
        assert_eq!(text, "• outer\n  • inner");
    }

    #[test]
    fn test_task_list_markers() {
        let text = render("- [x] done\n- [ ] todo").plain_text();
        assert_eq!(text, "✓ done\n□ todo");
    }

    #[test]
    fn test_code_block_with_info() {
        let text = render("```rust\nfn main() {}\n```").plain_text();
        assert_eq!(text, "▌rust\n│ fn main() {}");
    }

    #[test]
    fn test_block_quote_has_bar_prefix() {
        let text = render("> quoted").plain_text();
        assert_eq!(text, "│ quoted");
    }

    #[test]
    fn test_table_columns_are_aligned() {
        let text = render("| a | bb |\n|---|---|\n| ccc | d |").plain_text();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows[0], "│ a   │ bb │");
        assert_eq!(rows[1], "├─────┼────┤");
        assert_eq!(rows[2], "│ ccc │ d  │");
    }

    #[test]
    fn test_thematic_break() {
        let text = render("a\n\n---\n\nb").plain_text();
        assert!(text.contains(&"─".repeat(RULE_WIDTH)));
    }

    #[test]
    fn test_raw_html_is_shown_verbatim() {
        let text = render("<div>raw</div>").plain_text();
        assert_eq!(text, "<div>raw</div>");
    }

    #[test]
    fn test_unclosed_markup_renders_as_text() {
        let text = render("**not closed").plain_text();
        assert_eq!(text, "**not closed");
    }
}
