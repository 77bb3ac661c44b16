use std::ops::Range;

use log::trace;
use pulldown_cmark::{CodeBlockKind, Event, Tag};

use super::types::{ListItem, TableCell, Token};

/// Folds a flat pulldown-cmark event stream into a [`Token`] tree.
///
/// # Event Flow
///
/// pulldown-cmark reports structure as balanced `Start`/`End` pairs with
/// leaves in between:
/// ```markdown
/// - Parent **bold**
///   - Child
/// ```
/// Events:
/// 1. `Start(List)`, `Start(Item)`
/// 2. `Text("Parent ")`, `Start(Strong)`, `Text("bold")`, `End(Strong)`
/// 3. `Start(List)`, `Start(Item)`, `Text("Child")`, `End(Item)`, `End(List)`
/// 4. `End(Item)`, `End(List)`
///
/// Every `Start` pushes a [`Frame`]; every `End` pops it, turns it into a
/// token and attaches that token to the frame below. The `End` payload is
/// never inspected, so the popped frame alone decides what gets built.
///
/// Tight list items carry their inline events directly (no paragraph), so
/// on close the builder wraps each inline run of an item in a block-level
/// [`Token::Text`].
pub struct TokenBuilder<'a> {
    source: &'a str,
    stack: Vec<Frame>,
}

struct Frame {
    kind: FrameKind,
    range: Range<usize>,
    children: Vec<Token>,
    /// End of the last block attached here, for inter-block whitespace.
    last_block: Option<BlockEnd>,
}

#[derive(Clone, Copy)]
struct BlockEnd {
    /// Byte offset just past the block's last non-whitespace character.
    end: usize,
    /// Headings and tables consume the blank lines that follow them.
    swallows_blank_lines: bool,
}

enum FrameKind {
    Document,
    Paragraph,
    Heading(u8),
    Blockquote,
    CodeBlock { lang: Option<String>, text: String },
    HtmlBlock { text: String },
    List { ordered: bool, start: Option<u64>, items: Vec<ListItem> },
    Item { task: bool, checked: Option<bool> },
    Table { header: Vec<TableCell>, rows: Vec<Vec<TableCell>> },
    TableHead { cells: Vec<TableCell> },
    TableRow { cells: Vec<TableCell> },
    TableCell,
    Emphasis,
    Strong,
    Strikethrough,
    Underline,
    Link { href: String, title: Option<String> },
    Image { href: String, title: Option<String> },
    /// Tags without a token of their own; children splice into the parent.
    Passthrough,
}

impl FrameKind {
    fn tracks_blocks(&self) -> bool {
        matches!(
            self,
            FrameKind::Document | FrameKind::Blockquote | FrameKind::Item { .. }
        )
    }
}

impl<'a> TokenBuilder<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            stack: vec![Frame::new(FrameKind::Document, 0..source.len())],
        }
    }

    /// Process a single event together with its source byte range.
    pub fn push(&mut self, event: Event<'_>, range: Range<usize>) {
        match event {
            Event::Start(tag) => self.start(tag, range),
            Event::End(_) => self.end(),
            Event::Text(text) => match &mut self.top().kind {
                FrameKind::CodeBlock { text: body, .. } | FrameKind::HtmlBlock { text: body } => {
                    body.push_str(&text)
                }
                _ => {
                    let raw = self.slice(&range).to_string();
                    self.push_inline(Token::Text {
                        raw,
                        text: text.into_string(),
                        tokens: vec![],
                    });
                }
            },
            Event::Code(text) => {
                let raw = self.slice(&range).to_string();
                self.push_inline(Token::Codespan {
                    raw,
                    text: text.into_string(),
                });
            }
            Event::Html(html) => {
                if let FrameKind::HtmlBlock { text } = &mut self.top().kind {
                    text.push_str(&html);
                }
            }
            Event::InlineHtml(html) => self.inline_html(&html, range),
            Event::SoftBreak => {
                let raw = self.slice(&range).to_string();
                self.push_inline(Token::Text {
                    raw,
                    text: "\n".to_string(),
                    tokens: vec![],
                });
            }
            Event::HardBreak => {
                let raw = self.slice(&range).to_string();
                self.push_inline(Token::Br { raw });
            }
            Event::Rule => {
                let raw = self.slice(&range).to_string();
                self.attach_block(Token::Hr { raw }, range, false);
            }
            Event::TaskListMarker(checked) => {
                if let Some(FrameKind::Item { task, checked: c }) = self
                    .stack
                    .iter_mut()
                    .rev()
                    .map(|f| &mut f.kind)
                    .find(|k| matches!(k, FrameKind::Item { .. }))
                {
                    *task = true;
                    *c = Some(checked);
                }
            }
            other => trace!("skipping unsupported markdown event: {other:?}"),
        }
    }

    /// Close any frames left open and return the document's tokens.
    pub fn finish(mut self) -> Vec<Token> {
        while self.stack.len() > 1 {
            self.end();
        }
        self.stack.pop().map(|f| f.children).unwrap_or_default()
    }

    fn start(&mut self, tag: Tag<'_>, range: Range<usize>) {
        let kind = match tag {
            Tag::Paragraph => FrameKind::Paragraph,
            Tag::Heading { level, .. } => FrameKind::Heading(level as u8),
            Tag::BlockQuote(_) => FrameKind::Blockquote,
            Tag::CodeBlock(kind) => FrameKind::CodeBlock {
                lang: match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                    _ => None,
                },
                text: String::new(),
            },
            Tag::HtmlBlock => FrameKind::HtmlBlock {
                text: String::new(),
            },
            Tag::List(start) => FrameKind::List {
                ordered: start.is_some(),
                start,
                items: vec![],
            },
            Tag::Item => FrameKind::Item {
                task: false,
                checked: None,
            },
            Tag::Table(_) => FrameKind::Table {
                header: vec![],
                rows: vec![],
            },
            Tag::TableHead => FrameKind::TableHead { cells: vec![] },
            Tag::TableRow => FrameKind::TableRow { cells: vec![] },
            Tag::TableCell => FrameKind::TableCell,
            Tag::Emphasis => FrameKind::Emphasis,
            Tag::Strong => FrameKind::Strong,
            Tag::Strikethrough => FrameKind::Strikethrough,
            Tag::Link {
                dest_url, title, ..
            } => FrameKind::Link {
                href: dest_url.into_string(),
                title: non_empty(title.into_string()),
            },
            Tag::Image {
                dest_url, title, ..
            } => FrameKind::Image {
                href: dest_url.into_string(),
                title: non_empty(title.into_string()),
            },
            other => {
                trace!("passing through unsupported markdown tag: {other:?}");
                FrameKind::Passthrough
            }
        };
        self.stack.push(Frame::new(kind, range));
    }

    fn end(&mut self) {
        // Unclosed `<u>` frames end with whatever closes around them.
        while matches!(self.top().kind, FrameKind::Underline) && self.stack.len() > 1 {
            if let Some(frame) = self.stack.pop() {
                self.push_inline(Token::Html {
                    raw: "<u>".to_string(),
                    text: "<u>".to_string(),
                });
                for child in frame.children {
                    self.push_inline(child);
                }
            }
        }
        if self.stack.len() > 1
            && let Some(frame) = self.stack.pop()
        {
            self.close(frame);
        }
    }

    fn close(&mut self, frame: Frame) {
        let raw = self.slice(&frame.range).to_string();
        let range = frame.range;
        let tokens = frame.children;
        match frame.kind {
            FrameKind::Document => {}
            FrameKind::Paragraph => {
                self.attach_block(Token::Paragraph { raw, tokens }, range, false)
            }
            FrameKind::Heading(depth) => self.attach_block(
                Token::Heading { raw, depth, tokens },
                range,
                true,
            ),
            FrameKind::Blockquote => {
                self.attach_block(Token::Blockquote { raw, tokens }, range, false)
            }
            FrameKind::CodeBlock { lang, mut text } => {
                if text.ends_with('\n') {
                    text.pop();
                }
                self.attach_block(Token::Code { raw, lang, text }, range, false)
            }
            FrameKind::HtmlBlock { text } => {
                self.attach_block(Token::Html { raw, text }, range, false)
            }
            FrameKind::List {
                ordered,
                start,
                items,
            } => self.attach_block(
                Token::List {
                    raw,
                    ordered,
                    start,
                    items,
                },
                range,
                false,
            ),
            FrameKind::Item { task, checked } => {
                let item = ListItem {
                    raw,
                    task,
                    checked,
                    tokens: wrap_inline_runs(tokens),
                };
                if let FrameKind::List { items, .. } = &mut self.top().kind {
                    items.push(item);
                }
            }
            FrameKind::Table { header, rows } => {
                self.attach_block(Token::Table { raw, header, rows }, range, true)
            }
            FrameKind::TableHead { cells } => {
                if let FrameKind::Table { header, .. } = &mut self.top().kind {
                    *header = cells;
                }
            }
            FrameKind::TableRow { cells } => {
                if let FrameKind::Table { rows, .. } = &mut self.top().kind {
                    rows.push(cells);
                }
            }
            FrameKind::TableCell => {
                let cell = TableCell {
                    text: tokens.iter().map(Token::plain_text).collect(),
                    tokens,
                };
                if let FrameKind::TableHead { cells } | FrameKind::TableRow { cells } =
                    &mut self.top().kind
                {
                    cells.push(cell);
                }
            }
            FrameKind::Emphasis => self.push_inline(Token::Em { raw, tokens }),
            FrameKind::Strong => self.push_inline(Token::Strong { raw, tokens }),
            FrameKind::Strikethrough => self.push_inline(Token::Del { raw, tokens }),
            FrameKind::Underline => self.push_inline(Token::Underline { raw, tokens }),
            FrameKind::Link { href, title } => self.push_inline(Token::Link {
                raw,
                href,
                title,
                tokens,
            }),
            FrameKind::Image { href, title } => self.push_inline(Token::Image {
                raw,
                href,
                title,
                text: tokens.iter().map(Token::plain_text).collect(),
            }),
            FrameKind::Passthrough => {
                for child in tokens {
                    self.top().children.push(child);
                }
            }
        }
    }

    fn inline_html(&mut self, html: &str, range: Range<usize>) {
        let tag = html.trim();
        if tag.eq_ignore_ascii_case("<u>") {
            self.stack.push(Frame::new(FrameKind::Underline, range));
            return;
        }
        if tag.eq_ignore_ascii_case("</u>") && matches!(self.top().kind, FrameKind::Underline) {
            if let Some(mut frame) = self.stack.pop() {
                frame.range = frame.range.start..range.end;
                self.close(frame);
            }
            return;
        }
        self.push_inline(Token::Html {
            raw: self.slice(&range).to_string(),
            text: html.to_string(),
        });
    }

    /// Append an inline token, merging adjacent plain text leaves.
    fn push_inline(&mut self, token: Token) {
        let children = &mut self.top().children;
        if let (
            Some(Token::Text {
                raw,
                text,
                tokens: prev_tokens,
            }),
            Token::Text {
                raw: next_raw,
                text: next_text,
                tokens: next_tokens,
            },
        ) = (children.last_mut(), &token)
            && prev_tokens.is_empty()
            && next_tokens.is_empty()
        {
            raw.push_str(next_raw);
            text.push_str(next_text);
            return;
        }
        children.push(token);
    }

    /// Append a block token, emitting a [`Token::Space`] for blank lines
    /// between it and the previous block.
    fn attach_block(&mut self, token: Token, range: Range<usize>, swallows_blank_lines: bool) {
        let source = self.source;
        let frame = self.top();
        if frame.kind.tracks_blocks() {
            let gap_start = match frame.last_block {
                Some(prev) if prev.swallows_blank_lines => None,
                Some(prev) => Some((prev.end, 2)),
                None if matches!(frame.kind, FrameKind::Document) => Some((frame.range.start, 1)),
                None => None,
            };
            if let Some((start, min_newlines)) = gap_start {
                let newlines = source
                    .get(start..range.start)
                    .map(|gap| gap.matches('\n').count())
                    .unwrap_or(0);
                if newlines >= min_newlines {
                    frame.children.push(Token::space("\n".repeat(newlines)));
                }
            }
            let content = source.get(range.clone()).unwrap_or_default();
            frame.last_block = Some(BlockEnd {
                end: range.start + content.trim_end().len(),
                swallows_blank_lines,
            });
        }
        frame.children.push(token);
    }

    fn top(&mut self) -> &mut Frame {
        // The document frame is never popped before `finish`.
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn slice(&self, range: &Range<usize>) -> &'a str {
        self.source.get(range.clone()).unwrap_or_default()
    }
}

impl Frame {
    fn new(kind: FrameKind, range: Range<usize>) -> Self {
        Self {
            kind,
            range,
            children: vec![],
            last_block: None,
        }
    }
}

/// Wrap every maximal run of inline tokens in a block-level text token.
fn wrap_inline_runs(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut run: Vec<Token> = vec![];
    for token in tokens {
        if token.is_inline() {
            run.push(token);
            continue;
        }
        flush_run(&mut run, &mut out);
        out.push(token);
    }
    flush_run(&mut run, &mut out);
    out
}

fn flush_run(run: &mut Vec<Token>, out: &mut Vec<Token>) {
    if run.is_empty() {
        return;
    }
    let tokens = std::mem::take(run);
    out.push(Token::Text {
        raw: tokens.iter().map(Token::raw).collect(),
        text: tokens.iter().map(Token::plain_text).collect(),
        tokens,
    });
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}
