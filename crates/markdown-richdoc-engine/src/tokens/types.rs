use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// A node of the Markdown token tree.
///
/// The shape follows the widely used marked-style JSON token layout, so a
/// pre-lexed tree can be deserialized directly. Every field defaults when
/// absent: a token with missing children lowers to nothing rather than
/// failing. Scalar fields holding a value of the wrong type (marked writes
/// `"start": ""` on bullet lists) also fall back to their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Token {
    /// Whitespace between two blocks. `raw` holds the newlines.
    Space {
        #[serde(default)]
        raw: String,
    },
    /// Thematic break (`---`).
    Hr {
        #[serde(default)]
        raw: String,
    },
    Heading {
        #[serde(default)]
        raw: String,
        #[serde(default = "default_depth", deserialize_with = "lenient_depth")]
        depth: u8,
        #[serde(default)]
        tokens: Vec<Token>,
    },
    Paragraph {
        #[serde(default)]
        raw: String,
        #[serde(default)]
        tokens: Vec<Token>,
    },
    Blockquote {
        #[serde(default)]
        raw: String,
        #[serde(default)]
        tokens: Vec<Token>,
    },
    /// Fenced or indented code block. `text` is the literal body.
    Code {
        #[serde(default)]
        raw: String,
        #[serde(default)]
        lang: Option<String>,
        #[serde(default)]
        text: String,
    },
    List {
        #[serde(default)]
        raw: String,
        #[serde(default, deserialize_with = "lenient")]
        ordered: bool,
        #[serde(default, deserialize_with = "lenient")]
        start: Option<u64>,
        #[serde(default)]
        items: Vec<ListItem>,
    },
    Table {
        #[serde(default)]
        raw: String,
        #[serde(default)]
        header: Vec<TableCell>,
        #[serde(default)]
        rows: Vec<Vec<TableCell>>,
    },
    Html {
        #[serde(default)]
        raw: String,
        #[serde(default)]
        text: String,
    },
    /// Literal text. As a leaf `tokens` is empty; inside a tight list item
    /// it is a block wrapper whose `tokens` hold the inline run.
    Text {
        #[serde(default)]
        raw: String,
        #[serde(default)]
        text: String,
        #[serde(default)]
        tokens: Vec<Token>,
    },
    /// Backslash escape, e.g. `\*`. `text` is the escaped character.
    Escape {
        #[serde(default)]
        raw: String,
        #[serde(default)]
        text: String,
    },
    Em {
        #[serde(default)]
        raw: String,
        #[serde(default)]
        tokens: Vec<Token>,
    },
    Strong {
        #[serde(default)]
        raw: String,
        #[serde(default)]
        tokens: Vec<Token>,
    },
    /// Strikethrough (`~~x~~`).
    Del {
        #[serde(default)]
        raw: String,
        #[serde(default)]
        tokens: Vec<Token>,
    },
    /// Underline, lexed from `<u>...</u>`.
    Underline {
        #[serde(default)]
        raw: String,
        #[serde(default)]
        tokens: Vec<Token>,
    },
    Codespan {
        #[serde(default)]
        raw: String,
        #[serde(default)]
        text: String,
    },
    Link {
        #[serde(default)]
        raw: String,
        #[serde(default)]
        href: String,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        tokens: Vec<Token>,
    },
    Image {
        #[serde(default)]
        raw: String,
        #[serde(default)]
        href: String,
        #[serde(default)]
        title: Option<String>,
        /// Alt text.
        #[serde(default)]
        text: String,
    },
    /// Hard line break.
    Br {
        #[serde(default)]
        raw: String,
    },
    /// Any `type` tag this crate does not know.
    #[serde(other)]
    Unsupported,
}

/// One entry of a [`Token::List`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    #[serde(default)]
    pub raw: String,
    /// True for checkbox items (`- [ ]` / `- [x]`).
    #[serde(default, deserialize_with = "lenient")]
    pub task: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub checked: Option<bool>,
    #[serde(default)]
    pub tokens: Vec<Token>,
}

/// One cell of a [`Token::Table`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tokens: Vec<Token>,
}

fn default_depth() -> u8 {
    1
}

/// Keep a well-typed value, otherwise the field's default.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

fn lenient_depth<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(u8::deserialize(value).unwrap_or_else(|_| default_depth()))
}

impl Token {
    /// Shorthand for a leaf text token whose raw form equals its text.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        Token::Text {
            raw: text.clone(),
            text,
            tokens: vec![],
        }
    }

    /// Shorthand for a space token.
    pub fn space(raw: impl Into<String>) -> Self {
        Token::Space { raw: raw.into() }
    }

    /// Child tokens of an inline or block container, empty for leaves.
    pub fn children(&self) -> &[Token] {
        match self {
            Token::Heading { tokens, .. }
            | Token::Paragraph { tokens, .. }
            | Token::Blockquote { tokens, .. }
            | Token::Text { tokens, .. }
            | Token::Em { tokens, .. }
            | Token::Strong { tokens, .. }
            | Token::Del { tokens, .. }
            | Token::Underline { tokens, .. }
            | Token::Link { tokens, .. } => tokens,
            Token::Space { .. }
            | Token::Hr { .. }
            | Token::Code { .. }
            | Token::List { .. }
            | Token::Table { .. }
            | Token::Html { .. }
            | Token::Escape { .. }
            | Token::Codespan { .. }
            | Token::Image { .. }
            | Token::Br { .. }
            | Token::Unsupported => &[],
        }
    }

    /// The source text this token was lexed from.
    pub fn raw(&self) -> &str {
        match self {
            Token::Space { raw }
            | Token::Hr { raw }
            | Token::Heading { raw, .. }
            | Token::Paragraph { raw, .. }
            | Token::Blockquote { raw, .. }
            | Token::Code { raw, .. }
            | Token::List { raw, .. }
            | Token::Table { raw, .. }
            | Token::Html { raw, .. }
            | Token::Text { raw, .. }
            | Token::Escape { raw, .. }
            | Token::Em { raw, .. }
            | Token::Strong { raw, .. }
            | Token::Del { raw, .. }
            | Token::Underline { raw, .. }
            | Token::Codespan { raw, .. }
            | Token::Link { raw, .. }
            | Token::Image { raw, .. }
            | Token::Br { raw } => raw,
            Token::Unsupported => "",
        }
    }

    /// Whether this token lives inside a paragraph rather than between blocks.
    pub fn is_inline(&self) -> bool {
        match self {
            Token::Text { tokens, .. } => tokens.is_empty(),
            Token::Escape { .. }
            | Token::Em { .. }
            | Token::Strong { .. }
            | Token::Del { .. }
            | Token::Underline { .. }
            | Token::Codespan { .. }
            | Token::Link { .. }
            | Token::Image { .. }
            | Token::Html { .. }
            | Token::Br { .. } => true,
            Token::Space { .. }
            | Token::Hr { .. }
            | Token::Heading { .. }
            | Token::Paragraph { .. }
            | Token::Blockquote { .. }
            | Token::Code { .. }
            | Token::List { .. }
            | Token::Table { .. }
            | Token::Unsupported => false,
        }
    }

    /// Literal text of the subtree with all markup dropped.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.push_plain_text(&mut out);
        out
    }

    fn push_plain_text(&self, out: &mut String) {
        match self {
            Token::Text { text, tokens, .. } if tokens.is_empty() => out.push_str(text),
            Token::Escape { text, .. }
            | Token::Codespan { text, .. }
            | Token::Code { text, .. }
            | Token::Html { text, .. }
            | Token::Image { text, .. } => out.push_str(text),
            Token::Br { .. } => out.push('\n'),
            Token::List { items, .. } => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push('\n');
                    }
                    for child in &item.tokens {
                        child.push_plain_text(out);
                    }
                }
            }
            Token::Table { header, rows, .. } => {
                for (i, row) in std::iter::once(header).chain(rows).enumerate() {
                    if i > 0 {
                        out.push('\n');
                    }
                    for (j, cell) in row.iter().enumerate() {
                        if j > 0 {
                            out.push('\t');
                        }
                        for child in &cell.tokens {
                            child.push_plain_text(out);
                        }
                    }
                }
            }
            other => {
                for child in other.children() {
                    child.push_plain_text(out);
                }
            }
        }
    }
}
