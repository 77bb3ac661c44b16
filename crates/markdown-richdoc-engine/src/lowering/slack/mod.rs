//! Flat-message backend: lowers a token tree into Slack Block Kit blocks.
//!
//! Inline styling becomes mrkdwn markup inside a single `section` string.
//! Leaf text is re-escaped so a literal `<`, `>` or `&` is never read as
//! mrkdwn control syntax. Anything Slack has no block for degrades to its
//! raw source, which never survives to the top level.

pub mod blocks;

use html_escape::encode_text;
use log::{debug, trace};

use crate::options::ConversionOptions;
use crate::text::decode;
use crate::tokens::{ListItem, Token};

pub use blocks::{SlackBlock, TextObject, TextType, plain_text};

/// Indentation applied to the lines of a nested list.
const NESTED_INDENT: &str = "    ";

/// Lower `tokens` into a top-level Block Kit array.
pub fn lower(tokens: &[Token], options: &ConversionOptions) -> Vec<SlackBlock> {
    let lowering = SlackLowering { options };
    let blocks: Vec<SlackBlock> = lowering
        .lower_tokens(tokens)
        .into_iter()
        .filter_map(|piece| match piece {
            Piece::Block(block) => Some(block),
            Piece::Markup(raw) => {
                trace!("slack: dropping {} bytes of unrenderable source", raw.len());
                None
            }
        })
        .collect();
    debug!("slack: {} blocks", blocks.len());
    blocks
}

/// Output of lowering one token.
#[derive(Debug, Clone, PartialEq)]
enum Piece {
    /// Inline mrkdwn, or raw source for a token with no block form.
    Markup(String),
    Block(SlackBlock),
}

fn partition(pieces: Vec<Piece>) -> (String, Vec<SlackBlock>) {
    let mut markup = String::new();
    let mut blocks = vec![];
    for piece in pieces {
        match piece {
            Piece::Markup(text) => markup.push_str(&text),
            Piece::Block(block) => blocks.push(block),
        }
    }
    (markup, blocks)
}

struct SlackLowering<'o> {
    options: &'o ConversionOptions,
}

impl SlackLowering<'_> {
    fn lower_tokens(&self, tokens: &[Token]) -> Vec<Piece> {
        tokens.iter().flat_map(|t| self.lower_token(t)).collect()
    }

    fn lower_token(&self, token: &Token) -> Vec<Piece> {
        match token {
            Token::Hr { .. } => vec![Piece::Block(SlackBlock::Divider)],
            // Slack already separates blocks.
            Token::Space { .. } => vec![],
            Token::Image { href, text, .. } => vec![Piece::Block(SlackBlock::Image {
                image_url: href.clone(),
                alt_text: text.clone(),
            })],
            Token::Paragraph { tokens, .. } => self.section(tokens),
            Token::Text { tokens, .. } if !tokens.is_empty() => self.section(tokens),
            Token::Heading { .. } => {
                let text = token.plain_text();
                if text.is_empty() {
                    return vec![];
                }
                vec![Piece::Block(SlackBlock::header(text))]
            }
            Token::Blockquote { raw, .. } | Token::Code { raw, .. } => {
                vec![Piece::Block(SlackBlock::section(raw.trim_end()))]
            }
            Token::List {
                ordered,
                start,
                items,
                ..
            } => self.lower_list(*ordered, start.unwrap_or(1), items),
            Token::Strong { tokens, .. } => self.wrap(tokens, |s| format!("*{s}*")),
            Token::Em { tokens, .. } => self.wrap(tokens, |s| format!("_{s}_")),
            Token::Del { tokens, .. } => self.wrap(tokens, |s| format!("~{s}~")),
            Token::Underline { tokens, .. } => self.wrap(tokens, |s| s),
            Token::Link { href, tokens, .. } => self.wrap(tokens, |s| {
                if s.is_empty() {
                    format!("<{href}>")
                } else {
                    format!("<{href}|{s}>")
                }
            }),
            Token::Codespan { text, .. } => {
                vec![Piece::Markup(format!("`{}`", encode_text(text)))]
            }
            Token::Text { text, .. } | Token::Escape { text, .. } => {
                let text = decode(text, self.options.entity_decoding);
                vec![Piece::Markup(encode_text(&text).into_owned())]
            }
            Token::Html { text, .. } => vec![Piece::Markup(encode_text(text).into_owned())],
            Token::Br { .. } => vec![Piece::Markup("\n".into())],
            Token::Table { raw, .. } => vec![Piece::Markup(raw.clone())],
            Token::Unsupported => vec![],
        }
    }

    /// A `section` for the inline markup of `tokens`, followed by any
    /// blocks (images) found among them.
    fn section(&self, tokens: &[Token]) -> Vec<Piece> {
        let (markup, blocks) = partition(self.lower_tokens(tokens));
        let mut pieces = vec![];
        if !markup.is_empty() {
            pieces.push(Piece::Block(SlackBlock::section(markup)));
        }
        pieces.extend(blocks.into_iter().map(Piece::Block));
        pieces
    }

    fn wrap(&self, tokens: &[Token], markup: impl FnOnce(String) -> String) -> Vec<Piece> {
        let (inner, blocks) = partition(self.lower_tokens(tokens));
        let mut pieces = vec![Piece::Markup(markup(inner))];
        pieces.extend(blocks.into_iter().map(Piece::Block));
        pieces
    }

    /// One section for the whole list. Nested lists are indented beneath
    /// their item.
    fn lower_list(&self, ordered: bool, start: u64, items: &[ListItem]) -> Vec<Piece> {
        let mut lines = vec![];
        let mut others = vec![];
        for (i, item) in items.iter().enumerate() {
            let marker = if ordered {
                format!("{}.", start.saturating_add(i as u64))
            } else {
                "•".to_string()
            };
            let (stray, blocks) = partition(self.lower_tokens(&item.tokens));
            let mut texts: Vec<String> = vec![];
            if !stray.is_empty() {
                texts.push(stray);
            }
            for block in blocks {
                match block {
                    SlackBlock::Section { text } => texts.push(text.text),
                    other => others.push(other),
                }
            }
            let mut texts = texts.into_iter();
            let Some(first) = texts.next() else {
                continue;
            };
            lines.push(format!("{marker} {first}"));
            for nested in texts {
                lines.extend(nested.lines().map(|line| format!("{NESTED_INDENT}{line}")));
            }
        }

        let mut pieces = vec![];
        if !lines.is_empty() {
            pieces.push(Piece::Block(SlackBlock::section(lines.join("\n"))));
        }
        pieces.extend(others.into_iter().map(Piece::Block));
        pieces
    }
}
