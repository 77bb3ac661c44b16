use serde::Serialize;

/// A Slack Block Kit layout block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlackBlock {
    Section { text: TextObject },
    Header { text: TextObject },
    Divider,
    Image { image_url: String, alt_text: String },
}

impl SlackBlock {
    pub fn section(text: impl Into<String>) -> Self {
        SlackBlock::Section {
            text: TextObject::mrkdwn(text),
        }
    }

    pub fn header(text: impl Into<String>) -> Self {
        SlackBlock::Header {
            text: TextObject::plain(text),
        }
    }

    /// Text the block displays, markup included.
    pub fn text(&self) -> Option<&str> {
        match self {
            SlackBlock::Section { text } | SlackBlock::Header { text } => Some(&text.text),
            SlackBlock::Divider | SlackBlock::Image { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextType {
    Mrkdwn,
    PlainText,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextObject {
    #[serde(rename = "type")]
    pub kind: TextType,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<bool>,
}

impl TextObject {
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self {
            kind: TextType::Mrkdwn,
            text: text.into(),
            emoji: None,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: TextType::PlainText,
            text: text.into(),
            emoji: Some(true),
        }
    }
}

/// Displayed text of a block list, one block per line.
pub fn plain_text(blocks: &[SlackBlock]) -> String {
    blocks
        .iter()
        .filter_map(SlackBlock::text)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn section_wire_shape() {
        assert_eq!(
            serde_json::to_value(SlackBlock::section("*hi*")).unwrap(),
            json!({"type": "section", "text": {"type": "mrkdwn", "text": "*hi*"}})
        );
    }

    #[test]
    fn header_wire_shape() {
        assert_eq!(
            serde_json::to_value(SlackBlock::header("Title")).unwrap(),
            json!({"type": "header", "text": {"type": "plain_text", "text": "Title", "emoji": true}})
        );
    }

    #[test]
    fn divider_and_image_wire_shape() {
        let blocks = vec![
            SlackBlock::Divider,
            SlackBlock::Image {
                image_url: "https://x.test/a.png".into(),
                alt_text: "a".into(),
            },
        ];
        assert_eq!(
            serde_json::to_value(&blocks).unwrap(),
            json!([
                {"type": "divider"},
                {"type": "image", "image_url": "https://x.test/a.png", "alt_text": "a"}
            ])
        );
    }
}
