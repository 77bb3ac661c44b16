use serde::{Deserialize, Serialize};

/// Notion and Slack cap a single text object at 2000 characters.
pub const DEFAULT_CHUNK_SIZE: usize = 2000;

/// The first writable index of a Google Docs body.
pub const DEFAULT_START_INDEX: usize = 1;

/// Knobs shared by all lowering backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// Maximum characters per emitted text chunk.
    pub chunk_size: usize,
    /// Document index of the first Google Docs insertion.
    pub start_index: usize,
    pub entity_decoding: EntityDecoding,
    /// Foreground colour applied to Google Docs links.
    pub link_color: RgbColor,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            start_index: DEFAULT_START_INDEX,
            entity_decoding: EntityDecoding::default(),
            link_color: RgbColor::LINK_BLUE,
        }
    }
}

/// How HTML entities in leaf text are resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityDecoding {
    /// Only the nine entities a Markdown lexer emits when escaping text.
    #[default]
    AllowList,
    /// Every named and numeric HTML entity.
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RgbColor {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl RgbColor {
    pub const LINK_BLUE: RgbColor = RgbColor {
        red: 0.1,
        green: 0.33,
        blue: 0.8,
    };
}
