//! Nested-block backend: lowers a token tree into Notion blocks.
//!
//! Styling is stamped onto each rich-text run as it bubbles up from the
//! leaves, so no positional bookkeeping is needed. Two linear passes run
//! over the finished tree: list separators, then ordered-list numbering.

pub mod blocks;

use log::{debug, trace};

use crate::options::ConversionOptions;
use crate::text::{Segment, chunk_text, decode};
use crate::tokens::{ListItem, TableCell, Token};

pub use blocks::{
    Annotations, BlockKind, CodeBody, ContainerBody, NotionBlock, NotionPayload,
    PLAIN_TEXT_LANGUAGE, RichText, TableBody, TableRowBody, TextLink, ToDoBody,
};

/// Lower `tokens` into the children of a Notion page.
pub fn lower(tokens: &[Token], options: &ConversionOptions) -> NotionPayload {
    let lowering = NotionLowering { options };
    let mut children = into_blocks(lowering.lower_tokens(tokens));
    separate_lists(&mut children);
    number_lists(&mut children);
    debug!("notion: {} top-level blocks", children.len());
    NotionPayload { children }
}

/// Output of lowering one token: inline runs or whole blocks.
#[derive(Debug, Clone, PartialEq)]
enum Node {
    Run(RichText),
    Block(NotionBlock),
}

/// Split nodes into runs and blocks, keeping encounter order within each.
fn partition(nodes: Vec<Node>) -> (Vec<RichText>, Vec<NotionBlock>) {
    let mut runs = vec![];
    let mut blocks = vec![];
    for node in nodes {
        match node {
            Node::Run(run) => runs.push(run),
            Node::Block(block) => blocks.push(block),
        }
    }
    (runs, blocks)
}

/// Turn a node list into blocks, gathering stray runs into paragraphs.
fn into_blocks(nodes: Vec<Node>) -> Vec<NotionBlock> {
    let mut blocks = vec![];
    let mut runs = vec![];
    for node in nodes {
        match node {
            Node::Run(run) => runs.push(run),
            Node::Block(block) => {
                if !runs.is_empty() {
                    blocks.push(NotionBlock::paragraph(std::mem::take(&mut runs)));
                }
                blocks.push(block);
            }
        }
    }
    if !runs.is_empty() {
        blocks.push(NotionBlock::paragraph(runs));
    }
    blocks
}

fn annotate(nodes: &mut [Node], stamp: impl Fn(&mut RichText)) {
    for node in nodes {
        if let Node::Run(run) = node {
            stamp(run);
        }
    }
}

struct NotionLowering<'o> {
    options: &'o ConversionOptions,
}

impl NotionLowering<'_> {
    fn lower_tokens(&self, tokens: &[Token]) -> Vec<Node> {
        tokens.iter().flat_map(|t| self.lower_token(t)).collect()
    }

    fn lower_token(&self, token: &Token) -> Vec<Node> {
        match token {
            Token::Hr { .. } => vec![Node::Block(NotionBlock::new(BlockKind::Divider))],
            Token::Space { .. } => vec![Node::Block(NotionBlock::paragraph(vec![
                RichText::text("\n"),
            ]))],
            Token::Image { href, .. } => vec![Node::Block(NotionBlock::image(href))],
            Token::Paragraph { tokens, .. } => {
                let (runs, images) = partition(self.lower_tokens(tokens));
                let mut nodes = vec![];
                if !runs.is_empty() {
                    nodes.push(Node::Block(NotionBlock::paragraph(runs)));
                }
                nodes.extend(images.into_iter().map(Node::Block));
                nodes
            }
            Token::Heading { depth, tokens, .. } => {
                let (runs, blocks) = partition(self.lower_tokens(tokens));
                let mut nodes = vec![Node::Block(NotionBlock::heading(*depth, runs))];
                nodes.extend(blocks.into_iter().map(Node::Block));
                nodes
            }
            Token::Blockquote { tokens, .. } => {
                let (rich_text, children) = self.lead_and_children(tokens);
                vec![Node::Block(NotionBlock::new(BlockKind::Quote(
                    ContainerBody {
                        rich_text,
                        children,
                    },
                )))]
            }
            Token::Code { lang, text, .. } => {
                let language = lang
                    .as_deref()
                    .filter(|l| !l.is_empty())
                    .unwrap_or(PLAIN_TEXT_LANGUAGE)
                    .to_string();
                let rich_text = self.runs(text, false);
                vec![Node::Block(NotionBlock::new(BlockKind::Code(CodeBody {
                    rich_text,
                    language,
                })))]
            }
            Token::Table { header, rows, .. } => self.lower_table(header, rows),
            Token::List { ordered, items, .. } => self.lower_list(*ordered, items),
            Token::Em { tokens, .. } => {
                let mut nodes = self.lower_tokens(tokens);
                annotate(&mut nodes, |run| run.annotations.italic = true);
                nodes
            }
            Token::Strong { tokens, .. } => {
                let mut nodes = self.lower_tokens(tokens);
                annotate(&mut nodes, |run| run.annotations.bold = true);
                nodes
            }
            Token::Del { tokens, .. } => {
                let mut nodes = self.lower_tokens(tokens);
                annotate(&mut nodes, |run| run.annotations.strikethrough = true);
                nodes
            }
            Token::Underline { tokens, .. } => {
                let mut nodes = self.lower_tokens(tokens);
                annotate(&mut nodes, |run| run.annotations.underline = true);
                nodes
            }
            Token::Link { href, tokens, .. } => {
                let mut nodes = self.lower_tokens(tokens);
                annotate(&mut nodes, |run| {
                    run.text.link = Some(TextLink { url: href.clone() })
                });
                nodes
            }
            Token::Codespan { text, .. } => self
                .runs(text, true)
                .into_iter()
                .map(|mut run| {
                    run.annotations.code = true;
                    Node::Run(run)
                })
                .collect(),
            Token::Text { tokens, .. } if !tokens.is_empty() => self.lower_tokens(tokens),
            Token::Text { text, .. } | Token::Escape { text, .. } | Token::Html { text, .. } => {
                self.runs(text, true).into_iter().map(Node::Run).collect()
            }
            Token::Br { .. } => vec![Node::Run(RichText::text("\n"))],
            Token::Unsupported => {
                trace!("notion: skipping unsupported token");
                vec![]
            }
        }
    }

    /// Chunked runs for leaf text; `\n` separates source lines.
    fn runs(&self, text: &str, decode_entities: bool) -> Vec<RichText> {
        let text = if decode_entities {
            decode(text, self.options.entity_decoding)
        } else {
            text.into()
        };
        chunk_text(&text, self.options.chunk_size)
            .into_iter()
            .map(|segment| match segment {
                Segment::Text(chunk) => RichText::text(chunk),
                Segment::Newline => RichText::text("\n"),
            })
            .collect()
    }

    /// Rich text from a leading paragraph or inline run, plus the rest as
    /// nested blocks.
    fn lead_and_children(&self, tokens: &[Token]) -> (Vec<RichText>, Vec<NotionBlock>) {
        let (lead, rest) = match tokens.split_first() {
            Some((Token::Paragraph { tokens: inline, .. }, rest)) => {
                (self.lower_tokens(inline), rest)
            }
            Some((first, rest)) if !first.children().is_empty() || first.is_inline() => {
                (self.lower_token(first), rest)
            }
            _ => (vec![], tokens),
        };
        let (rich_text, mut children) = partition(lead);
        children.extend(into_blocks(self.lower_tokens(rest)));
        separate_lists(&mut children);
        (rich_text, children)
    }

    fn lower_list(&self, ordered: bool, items: &[ListItem]) -> Vec<Node> {
        let Some(first) = items.first() else {
            return vec![];
        };
        // The first item decides the kind for the whole list.
        let to_do = first.task;
        items
            .iter()
            .map(|item| {
                let (rich_text, children) = self.lead_and_children(&item.tokens);
                let kind = if to_do {
                    BlockKind::ToDo(ToDoBody {
                        rich_text,
                        checked: item.checked.unwrap_or(false),
                        children,
                    })
                } else {
                    let body = ContainerBody {
                        rich_text,
                        children,
                    };
                    if ordered {
                        BlockKind::NumberedListItem(body)
                    } else {
                        BlockKind::BulletedListItem(body)
                    }
                };
                Node::Block(NotionBlock::new(kind))
            })
            .collect()
    }

    fn lower_table(&self, header: &[TableCell], rows: &[Vec<TableCell>]) -> Vec<Node> {
        if header.is_empty() {
            return vec![];
        }
        let children = std::iter::once(header)
            .chain(rows.iter().map(Vec::as_slice))
            .map(|row| {
                let cells = row.iter().map(|cell| self.cell_runs(cell)).collect();
                NotionBlock::new(BlockKind::TableRow(TableRowBody { cells }))
            })
            .collect();
        vec![Node::Block(NotionBlock::new(BlockKind::Table(TableBody {
            table_width: header.len(),
            has_column_header: true,
            has_row_header: false,
            children,
        })))]
    }

    fn cell_runs(&self, cell: &TableCell) -> Vec<RichText> {
        if cell.tokens.is_empty() {
            return self.runs(&cell.text, true);
        }
        let (runs, blocks) = partition(self.lower_tokens(&cell.tokens));
        if !blocks.is_empty() {
            trace!("notion: dropping {} blocks from a table cell", blocks.len());
        }
        runs
    }
}

/// Insert an empty paragraph after each run of list-like blocks that is
/// followed by a non-list block.
///
/// This is narrower than separating before every non-list block: when the
/// next block is already a blank paragraph nothing is inserted, since lexed
/// Markdown nearly always has a `space` token there and a second blank line
/// would double the gap.
fn separate_lists(blocks: &mut Vec<NotionBlock>) {
    let mut i = 0;
    while i + 1 < blocks.len() {
        let next = &blocks[i + 1];
        if blocks[i].is_list_like() && !next.is_list_like() && !next.is_blank_paragraph() {
            blocks.insert(i + 1, NotionBlock::paragraph(vec![]));
            i += 1;
        }
        i += 1;
    }
}

/// Number consecutive numbered items from 1; any other block resets.
fn number_lists(blocks: &mut [NotionBlock]) {
    let mut counter = 0;
    for block in blocks.iter_mut() {
        if matches!(block.kind, BlockKind::NumberedListItem(_)) {
            counter += 1;
            block.number = Some(counter);
        } else {
            counter = 0;
        }
        if let Some(children) = block.children_mut() {
            number_lists(children);
        }
    }
}
