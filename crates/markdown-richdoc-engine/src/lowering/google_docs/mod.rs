//! Offset-tracking backend: lowers a token tree into Google Docs
//! `batchUpdate` requests.
//!
//! Text is inserted strictly in document order, so a single running
//! cursor tells every insert where it lands. Styles are recorded as ranges
//! over that same cursor and applied after all text is in place.
//!
//! Two counters are threaded through the walk:
//! - `cursor`: the next document index an insert lands at. It only grows.
//!   Text advances it by its UTF-16 length; images and tables advance it
//!   by the fixed amount the Docs editor reserves for them.
//! - `offset`: indices spent on list indentation tabs. Creating bullets
//!   strips those tabs again, and bullets are applied before any other
//!   style, so every later range is shifted back by the offset
//!   accumulated at its two ends.

pub mod merge;
pub mod requests;

use log::{debug, trace};

use crate::options::ConversionOptions;
use crate::text::{chunk_text, decode, doc_len, interleave};
use crate::tokens::{ListItem, TableCell, Token};

pub use merge::merge_text_styles;
pub use requests::{
    BulletPreset, DocRange, GoogleDocsPayload, Link, Location, ParagraphStyle, Request, TextStyle,
};

/// Indices an `insertTable` reserves before the first cell's content.
pub const TABLE_SKELETON_ADVANCE: usize = 4;
/// Indices between the end of one cell's content and the next cell's.
pub const TABLE_CELL_ADVANCE: usize = 2;
/// Extra index consumed by each row boundary.
pub const TABLE_ROW_ADVANCE: usize = 1;
/// Indices an inline image occupies.
pub const INLINE_IMAGE_ADVANCE: usize = 1;

const ALL_FIELDS: &str = "*";

/// Lower `tokens` into a Google Docs request list.
///
/// Inserts come first, in index order, followed by the merged formatting
/// requests.
pub fn lower(tokens: &[Token], options: &ConversionOptions) -> GoogleDocsPayload {
    let mut lowering = DocsLowering::new(options);
    lowering.lower_tokens(tokens, 0);

    let DocsLowering {
        inserts, formats, ..
    } = lowering;
    let formats = merge_text_styles(formats);
    debug!(
        "google docs: {} inserts, {} formats",
        inserts.len(),
        formats.len()
    );

    let mut requests = inserts;
    requests.extend(formats);
    GoogleDocsPayload { requests }
}

/// Accumulator for one conversion call.
struct DocsLowering<'o> {
    options: &'o ConversionOptions,
    cursor: usize,
    offset: usize,
    inserts: Vec<Request>,
    formats: Vec<Request>,
}

impl<'o> DocsLowering<'o> {
    fn new(options: &'o ConversionOptions) -> Self {
        Self {
            options,
            cursor: options.start_index,
            offset: 0,
            inserts: vec![],
            formats: vec![],
        }
    }

    fn lower_tokens(&mut self, tokens: &[Token], level: usize) {
        for token in tokens {
            self.lower_token(token, level);
        }
    }

    fn lower_token(&mut self, token: &Token, level: usize) {
        match token {
            Token::Hr { .. } => self.insert_text("\n\n"),
            Token::Space { raw } => {
                let text = if raw.is_empty() { "\n" } else { raw.as_str() };
                self.insert_text(text);
            }
            Token::Image { href, .. } => {
                self.inserts.push(Request::InsertInlineImage {
                    uri: href.clone(),
                    location: self.location(),
                });
                self.cursor += INLINE_IMAGE_ADVANCE;
            }
            Token::Table { header, rows, .. } => self.lower_table(header, rows, level),
            Token::List { items, ordered, .. } => self.lower_list(items, *ordered, level),
            Token::Heading { tokens, .. }
            | Token::Paragraph { tokens, .. }
            | Token::Blockquote { tokens, .. }
            | Token::Em { tokens, .. }
            | Token::Strong { tokens, .. }
            | Token::Del { tokens, .. }
            | Token::Underline { tokens, .. }
            | Token::Link { tokens, .. }
                if !tokens.is_empty() =>
            {
                self.lower_container(token, tokens, level)
            }
            Token::Text { tokens, .. } if !tokens.is_empty() => {
                self.lower_container(token, tokens, level)
            }
            Token::Text { text, .. }
            | Token::Escape { text, .. }
            | Token::Codespan { text, .. }
            | Token::Code { text, .. }
            | Token::Html { text, .. } => self.lower_text(text),
            Token::Br { .. } => self.insert_text("\n"),
            Token::Heading { .. }
            | Token::Paragraph { .. }
            | Token::Blockquote { .. }
            | Token::Em { .. }
            | Token::Strong { .. }
            | Token::Del { .. }
            | Token::Underline { .. }
            | Token::Link { .. }
            | Token::Unsupported => trace!("google docs: nothing to lower for {token:?}"),
        }
    }

    /// Lower children, then style the range they produced.
    fn lower_container(&mut self, token: &Token, children: &[Token], level: usize) {
        let start = self.cursor;
        let offset_at_start = self.offset;
        self.lower_tokens(children, level);
        let range = DocRange {
            start_index: start.saturating_sub(offset_at_start),
            end_index: self.cursor.saturating_sub(self.offset),
        };

        match token {
            Token::Heading { depth, .. } => {
                self.push_format(Request::UpdateParagraphStyle {
                    paragraph_style: ParagraphStyle::heading(*depth),
                    fields: ALL_FIELDS.to_string(),
                    range,
                });
                self.insert_text("\n");
            }
            Token::Em { .. } => self.push_text_style(
                TextStyle {
                    italic: Some(true),
                    ..TextStyle::default()
                },
                range,
            ),
            Token::Strong { .. } => self.push_text_style(
                TextStyle {
                    bold: Some(true),
                    ..TextStyle::default()
                },
                range,
            ),
            Token::Del { .. } => self.push_text_style(
                TextStyle {
                    strikethrough: Some(true),
                    ..TextStyle::default()
                },
                range,
            ),
            Token::Underline { .. } => self.push_text_style(
                TextStyle {
                    underline: Some(true),
                    ..TextStyle::default()
                },
                range,
            ),
            Token::Link { href, .. } => {
                self.push_text_style(TextStyle::link(href, self.options.link_color), range)
            }
            _ => {}
        }
    }

    fn lower_list(&mut self, items: &[ListItem], ordered: bool, level: usize) {
        if items.is_empty() {
            return;
        }
        let start = self.cursor;
        // `None` marks the newline between two items.
        for entry in interleave(items.iter().map(Some).collect(), None) {
            match entry {
                Some(item) => self.lower_list_item(item, level + 1),
                None => self.insert_text("\n"),
            }
        }
        let end = self.cursor;

        if level == 0 {
            let bullet_preset = if ordered {
                BulletPreset::NumberedDecimalAlphaRoman
            } else {
                BulletPreset::BulletDiscCircleSquare
            };
            // Bullets go first: they strip indentation tabs and must not be
            // shadowed by styles recorded inside the list.
            self.formats.insert(
                0,
                Request::CreateParagraphBullets {
                    range: DocRange {
                        start_index: start,
                        end_index: end,
                    },
                    bullet_preset,
                },
            );
        }
    }

    fn lower_list_item(&mut self, item: &ListItem, level: usize) {
        if item.tokens.is_empty() {
            return;
        }
        if level > 1 {
            let tabs = "\t".repeat(level - 1);
            self.insert_text(&tabs);
            self.offset += level - 1;
        }
        let separator = Token::space("\n");
        for child in interleave(item.tokens.iter().collect(), &separator) {
            self.lower_token(child, level);
        }
    }

    fn lower_table(&mut self, header: &[TableCell], rows: &[Vec<TableCell>], level: usize) {
        if header.is_empty() {
            return;
        }
        self.inserts.push(Request::InsertTable {
            rows: rows.len() + 1,
            columns: header.len(),
            location: self.location(),
        });
        self.cursor += TABLE_SKELETON_ADVANCE;

        let all_rows: Vec<&[TableCell]> = std::iter::once(header)
            .chain(rows.iter().map(Vec::as_slice))
            .collect();
        let last_row = all_rows.len() - 1;
        for (i, row) in all_rows.into_iter().enumerate() {
            for cell in row {
                if cell.tokens.is_empty() {
                    self.lower_text(&cell.text);
                } else {
                    self.lower_tokens(&cell.tokens, level);
                }
                self.cursor += TABLE_CELL_ADVANCE;
            }
            if i != last_row {
                self.cursor += TABLE_ROW_ADVANCE;
            }
        }
        self.insert_text("\n");
    }

    /// Decode, chunk and insert leaf text.
    fn lower_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let decoded = decode(text, self.options.entity_decoding);
        for segment in chunk_text(&decoded, self.options.chunk_size) {
            self.insert_text(segment.as_str());
        }
    }

    fn insert_text(&mut self, text: &str) {
        self.inserts.push(Request::InsertText {
            text: text.to_string(),
            location: self.location(),
        });
        self.cursor += doc_len(text);
    }

    fn push_text_style(&mut self, text_style: TextStyle, range: DocRange) {
        self.push_format(Request::UpdateTextStyle {
            text_style,
            fields: ALL_FIELDS.to_string(),
            range,
        });
    }

    fn push_format(&mut self, request: Request) {
        if let Some(range) = request.range()
            && range.is_empty()
        {
            trace!("google docs: dropping format over empty range {range:?}");
            return;
        }
        self.formats.push(request);
    }

    fn location(&self) -> Location {
        Location { index: self.cursor }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::lex;
    use pretty_assertions::assert_eq;

    fn convert(markdown: &str) -> GoogleDocsPayload {
        lower(&lex(markdown), &ConversionOptions::default())
    }

    fn insert(text: &str, index: usize) -> Request {
        Request::InsertText {
            text: text.into(),
            location: Location { index },
        }
    }

    fn text_styles(payload: &GoogleDocsPayload) -> Vec<(TextStyle, DocRange)> {
        payload
            .requests
            .iter()
            .filter_map(|r| match r {
                Request::UpdateTextStyle {
                    text_style, range, ..
                } => Some((text_style.clone(), *range)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn plain_paragraph_is_one_insert() {
        assert_eq!(convert("Hello world").requests, vec![insert("Hello world", 1)]);
    }

    #[test]
    fn bold_and_italic_ranges_cover_only_their_text() {
        let payload = convert("**bold** and _italic_");
        let styles = text_styles(&payload);
        assert_eq!(styles.len(), 2);
        assert_eq!(styles[0].0.bold, Some(true));
        assert_eq!(
            styles[0].1,
            DocRange {
                start_index: 1,
                end_index: 5
            }
        );
        assert_eq!(styles[1].0.italic, Some(true));
        assert_eq!(
            styles[1].1,
            DocRange {
                start_index: 10,
                end_index: 16
            }
        );
    }

    #[test]
    fn heading_gets_paragraph_style_and_newline() {
        let payload = convert("# Title");
        assert_eq!(
            payload.requests,
            vec![
                insert("Title", 1),
                insert("\n", 6),
                Request::UpdateParagraphStyle {
                    paragraph_style: ParagraphStyle::heading(1),
                    fields: "*".into(),
                    range: DocRange {
                        start_index: 1,
                        end_index: 6
                    },
                },
            ]
        );
    }

    #[test]
    fn bold_link_merges_into_one_style() {
        let payload = convert("[**x**](https://example.com)");
        let styles = text_styles(&payload);
        assert_eq!(styles.len(), 1);
        let (style, range) = &styles[0];
        assert_eq!(style.bold, Some(true));
        assert_eq!(style.underline, Some(true));
        assert_eq!(
            style.link,
            Some(Link {
                url: "https://example.com".into()
            })
        );
        assert_eq!(
            *range,
            DocRange {
                start_index: 1,
                end_index: 2
            }
        );
    }

    #[test]
    fn image_consumes_one_index() {
        let payload = convert("a ![alt](https://example.com/i.png) b");
        assert_eq!(
            payload.requests,
            vec![
                insert("a ", 1),
                Request::InsertInlineImage {
                    uri: "https://example.com/i.png".into(),
                    location: Location { index: 3 },
                },
                insert(" b", 4),
            ]
        );
    }

    #[test]
    fn top_level_list_bullets_come_first() {
        let payload = convert("- a\n- **b**");
        assert_eq!(
            payload.requests,
            vec![
                insert("a", 1),
                insert("\n", 2),
                insert("b", 3),
                Request::CreateParagraphBullets {
                    range: DocRange {
                        start_index: 1,
                        end_index: 4
                    },
                    bullet_preset: BulletPreset::BulletDiscCircleSquare,
                },
                Request::UpdateTextStyle {
                    text_style: TextStyle {
                        bold: Some(true),
                        ..TextStyle::default()
                    },
                    fields: "*".into(),
                    range: DocRange {
                        start_index: 3,
                        end_index: 4
                    },
                },
            ]
        );
    }

    #[test]
    fn nested_item_tabs_are_excluded_from_ranges() {
        let payload = convert("1. a\n   1. **b**");
        assert_eq!(
            payload.requests,
            vec![
                insert("a", 1),
                insert("\n", 2),
                insert("\t", 3),
                insert("b", 4),
                Request::CreateParagraphBullets {
                    range: DocRange {
                        start_index: 1,
                        end_index: 5
                    },
                    bullet_preset: BulletPreset::NumberedDecimalAlphaRoman,
                },
                Request::UpdateTextStyle {
                    text_style: TextStyle {
                        bold: Some(true),
                        ..TextStyle::default()
                    },
                    fields: "*".into(),
                    range: DocRange {
                        start_index: 3,
                        end_index: 4
                    },
                },
            ]
        );
    }

    #[test]
    fn table_advances_by_protocol_constants() {
        let payload = convert("| H1 | H2 |\n| --- | --- |\n| a | b |");
        assert_eq!(
            payload.requests,
            vec![
                Request::InsertTable {
                    rows: 2,
                    columns: 2,
                    location: Location { index: 1 },
                },
                insert("H1", 5),
                insert("H2", 9),
                insert("a", 14),
                insert("b", 17),
                insert("\n", 20),
            ]
        );
    }

    #[test]
    fn long_text_is_chunked() {
        let options = ConversionOptions {
            chunk_size: 3,
            ..ConversionOptions::default()
        };
        let payload = lower(&lex("abcdefg"), &options);
        assert_eq!(
            payload.requests,
            vec![insert("abc", 1), insert("def", 4), insert("g", 7)]
        );
    }

    #[test]
    fn entities_are_decoded_before_insert() {
        let tokens = vec![Token::Paragraph {
            raw: String::new(),
            tokens: vec![Token::text("a &amp; b")],
        }];
        let payload = lower(&tokens, &ConversionOptions::default());
        assert_eq!(payload.requests, vec![insert("a & b", 1)]);
    }

    #[test]
    fn start_index_is_configurable() {
        let options = ConversionOptions {
            start_index: 42,
            ..ConversionOptions::default()
        };
        assert_eq!(
            lower(&lex("hi"), &options).requests,
            vec![insert("hi", 42)]
        );
    }

    #[test]
    fn malformed_tokens_are_skipped() {
        let tokens = vec![
            Token::Unsupported,
            Token::Strong {
                raw: String::new(),
                tokens: vec![],
            },
            Token::List {
                raw: String::new(),
                ordered: false,
                start: None,
                items: vec![],
            },
        ];
        assert!(lower(&tokens, &ConversionOptions::default()).requests.is_empty());
    }
}
