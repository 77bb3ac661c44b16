#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Invalid token tree: {0}")]
    InvalidTokens(#[source] serde_json::Error),
    #[error("Unknown target format: {0}")]
    UnknownTarget(String),
}
