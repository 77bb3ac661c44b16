pub mod error;
pub mod lowering;
pub mod options;
pub mod text;
pub mod tokens;

// Re-export key types for easier usage
pub use error::ConvertError;
pub use lowering::Target;
pub use lowering::google_docs::GoogleDocsPayload;
pub use lowering::notion::NotionPayload;
pub use lowering::slack::SlackBlock;
pub use options::{ConversionOptions, EntityDecoding, RgbColor};
pub use tokens::{Token, lex, tokens_from_json};

/// Convert Markdown into a Google Docs `batchUpdate` body.
pub fn markdown_to_google_docs(markdown: &str, options: &ConversionOptions) -> GoogleDocsPayload {
    lowering::google_docs::lower(&lex(markdown), options)
}

/// Convert Markdown into the `children` of a Notion page.
pub fn markdown_to_notion(markdown: &str, options: &ConversionOptions) -> NotionPayload {
    lowering::notion::lower(&lex(markdown), options)
}

/// Convert Markdown into a Slack Block Kit array.
pub fn markdown_to_slack(markdown: &str, options: &ConversionOptions) -> Vec<SlackBlock> {
    lowering::slack::lower(&lex(markdown), options)
}

/// Lower an already lexed token tree for `target` and serialise the result.
pub fn lower_tokens(
    tokens: &[Token],
    target: Target,
    options: &ConversionOptions,
) -> serde_json::Result<serde_json::Value> {
    match target {
        Target::GoogleDocs => serde_json::to_value(lowering::google_docs::lower(tokens, options)),
        Target::Notion => serde_json::to_value(lowering::notion::lower(tokens, options)),
        Target::Slack => serde_json::to_value(lowering::slack::lower(tokens, options)),
    }
}

/// Convert Markdown for `target` and serialise the result.
pub fn convert(
    markdown: &str,
    target: Target,
    options: &ConversionOptions,
) -> serde_json::Result<serde_json::Value> {
    lower_tokens(&lex(markdown), target, options)
}
