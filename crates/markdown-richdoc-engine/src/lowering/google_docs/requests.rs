use serde::Serialize;

use crate::options::RgbColor;

/// A single Google Docs `batchUpdate` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Request {
    InsertText {
        text: String,
        location: Location,
    },
    InsertInlineImage {
        uri: String,
        location: Location,
    },
    InsertTable {
        rows: usize,
        columns: usize,
        location: Location,
    },
    #[serde(rename_all = "camelCase")]
    UpdateTextStyle {
        text_style: TextStyle,
        fields: String,
        range: DocRange,
    },
    #[serde(rename_all = "camelCase")]
    UpdateParagraphStyle {
        paragraph_style: ParagraphStyle,
        fields: String,
        range: DocRange,
    },
    #[serde(rename_all = "camelCase")]
    CreateParagraphBullets {
        range: DocRange,
        bullet_preset: BulletPreset,
    },
}

impl Request {
    /// Whether this request adds content rather than styling it.
    pub fn is_insert(&self) -> bool {
        matches!(
            self,
            Request::InsertText { .. } | Request::InsertInlineImage { .. } | Request::InsertTable { .. }
        )
    }

    /// Document index an insert lands at.
    pub fn index(&self) -> Option<usize> {
        match self {
            Request::InsertText { location, .. }
            | Request::InsertInlineImage { location, .. }
            | Request::InsertTable { location, .. } => Some(location.index),
            _ => None,
        }
    }

    /// Range a formatting request applies to.
    pub fn range(&self) -> Option<DocRange> {
        match self {
            Request::UpdateTextStyle { range, .. }
            | Request::UpdateParagraphStyle { range, .. }
            | Request::CreateParagraphBullets { range, .. } => Some(*range),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub index: usize,
}

/// Half-open `[start_index, end_index)` range in final document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocRange {
    pub start_index: usize,
    pub end_index: usize,
}

impl DocRange {
    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Link>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground_color: Option<OptionalColor>,
}

impl TextStyle {
    /// Union `other` into `self`; fields set in `other` win.
    pub fn merge(&mut self, other: &TextStyle) {
        self.bold = other.bold.or(self.bold);
        self.italic = other.italic.or(self.italic);
        self.underline = other.underline.or(self.underline);
        self.strikethrough = other.strikethrough.or(self.strikethrough);
        if other.link.is_some() {
            self.link = other.link.clone();
        }
        if other.foreground_color.is_some() {
            self.foreground_color = other.foreground_color;
        }
    }

    pub fn link(url: &str, color: RgbColor) -> Self {
        Self {
            link: Some(Link {
                url: url.to_string(),
            }),
            underline: Some(true),
            foreground_color: Some(OptionalColor {
                color: Color { rgb_color: color },
            }),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptionalColor {
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Color {
    pub rgb_color: RgbColor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphStyle {
    pub named_style_type: String,
}

impl ParagraphStyle {
    pub fn heading(depth: u8) -> Self {
        Self {
            named_style_type: format!("HEADING_{}", depth.clamp(1, 6)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BulletPreset {
    BulletDiscCircleSquare,
    NumberedDecimalAlphaRoman,
}

/// The `{ requests }` body of a `documents.batchUpdate` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GoogleDocsPayload {
    pub requests: Vec<Request>,
}

impl GoogleDocsPayload {
    /// Text the inserts place into the document, in order.
    pub fn plain_text(&self) -> String {
        self.requests
            .iter()
            .filter_map(|r| match r {
                Request::InsertText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}
