//! Markdown token tree.
//!
//! The tree is produced from Markdown source by folding pulldown-cmark's
//! event stream ([`lex`]), or deserialized from an already lexed JSON token
//! array ([`tokens_from_json`]). Lowering backends only ever read it.

pub mod builder;
pub mod types;

use pulldown_cmark::{Options, Parser};

pub use builder::TokenBuilder;
pub use types::{ListItem, TableCell, Token};

use crate::error::ConvertError;

/// Markdown extensions the lowering backends know how to express.
fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Tokenize Markdown source into a token tree.
pub fn lex(markdown: &str) -> Vec<Token> {
    let mut builder = TokenBuilder::new(markdown);
    for (event, range) in Parser::new_ext(markdown, parser_options()).into_offset_iter() {
        builder.push(event, range);
    }
    builder.finish()
}

/// Parse a JSON array of tokens, e.g. the output of another Markdown lexer.
pub fn tokens_from_json(json: &str) -> Result<Vec<Token>, ConvertError> {
    serde_json::from_str(json).map_err(ConvertError::InvalidTokens)
}
