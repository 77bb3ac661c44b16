use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

/// Language Notion shows for a code block without an info string.
pub const PLAIN_TEXT_LANGUAGE: &str = "plain text";

/// A Notion block object, serialised as `{"type": name, name: payload}`.
#[derive(Debug, Clone, PartialEq)]
pub struct NotionBlock {
    pub kind: BlockKind,
    /// Position within a run of numbered list items, starting at 1.
    /// Notion renders numbering itself, so this is never serialised.
    pub number: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Paragraph(RichTextBody),
    /// Depth 1..=3; deeper Markdown headings are clamped.
    Heading(u8, RichTextBody),
    Quote(ContainerBody),
    Code(CodeBody),
    Divider,
    Image(ImageBody),
    Table(TableBody),
    TableRow(TableRowBody),
    BulletedListItem(ContainerBody),
    NumberedListItem(ContainerBody),
    ToDo(ToDoBody),
}

impl NotionBlock {
    pub fn new(kind: BlockKind) -> Self {
        Self { kind, number: None }
    }

    pub fn paragraph(rich_text: Vec<RichText>) -> Self {
        Self::new(BlockKind::Paragraph(RichTextBody { rich_text }))
    }

    pub fn heading(depth: u8, rich_text: Vec<RichText>) -> Self {
        Self::new(BlockKind::Heading(
            depth.clamp(1, 3),
            RichTextBody { rich_text },
        ))
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self::new(BlockKind::Image(ImageBody {
            kind: "external",
            external: ExternalFile { url: url.into() },
        }))
    }

    /// The `type` tag Notion expects.
    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            BlockKind::Paragraph(_) => "paragraph",
            BlockKind::Heading(1, _) => "heading_1",
            BlockKind::Heading(2, _) => "heading_2",
            BlockKind::Heading(..) => "heading_3",
            BlockKind::Quote(_) => "quote",
            BlockKind::Code(_) => "code",
            BlockKind::Divider => "divider",
            BlockKind::Image(_) => "image",
            BlockKind::Table(_) => "table",
            BlockKind::TableRow(_) => "table_row",
            BlockKind::BulletedListItem(_) => "bulleted_list_item",
            BlockKind::NumberedListItem(_) => "numbered_list_item",
            BlockKind::ToDo(_) => "to_do",
        }
    }

    /// Bulleted, numbered and to-do items.
    pub fn is_list_like(&self) -> bool {
        matches!(
            self.kind,
            BlockKind::BulletedListItem(_) | BlockKind::NumberedListItem(_) | BlockKind::ToDo(_)
        )
    }

    /// A paragraph holding nothing but whitespace.
    pub fn is_blank_paragraph(&self) -> bool {
        match &self.kind {
            BlockKind::Paragraph(body) => body
                .rich_text
                .iter()
                .all(|run| run.text.content.trim().is_empty()),
            _ => false,
        }
    }

    pub fn rich_text(&self) -> &[RichText] {
        match &self.kind {
            BlockKind::Paragraph(body) | BlockKind::Heading(_, body) => &body.rich_text,
            BlockKind::Quote(body)
            | BlockKind::BulletedListItem(body)
            | BlockKind::NumberedListItem(body) => &body.rich_text,
            BlockKind::ToDo(body) => &body.rich_text,
            BlockKind::Code(body) => &body.rich_text,
            BlockKind::Divider | BlockKind::Image(_) | BlockKind::Table(_) | BlockKind::TableRow(_) => {
                &[]
            }
        }
    }

    /// Nested blocks carried in the payload's `children`.
    pub fn children(&self) -> &[NotionBlock] {
        match &self.kind {
            BlockKind::Quote(body)
            | BlockKind::BulletedListItem(body)
            | BlockKind::NumberedListItem(body) => &body.children,
            BlockKind::ToDo(body) => &body.children,
            BlockKind::Table(body) => &body.children,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<NotionBlock>> {
        match &mut self.kind {
            BlockKind::Quote(body)
            | BlockKind::BulletedListItem(body)
            | BlockKind::NumberedListItem(body) => Some(&mut body.children),
            BlockKind::ToDo(body) => Some(&mut body.children),
            _ => None,
        }
    }

    fn push_plain_text(&self, out: &mut String) {
        match &self.kind {
            BlockKind::Image(body) => out.push_str(&body.external.url),
            BlockKind::TableRow(row) => {
                let cells: Vec<String> = row
                    .cells
                    .iter()
                    .map(|cell| cell.iter().map(|run| run.text.content.as_str()).collect())
                    .collect();
                out.push_str(&cells.join("\t"));
            }
            _ => out.extend(self.rich_text().iter().map(|run| run.text.content.as_str())),
        }
        for child in self.children() {
            out.push('\n');
            child.push_plain_text(out);
        }
    }
}

impl Serialize for NotionBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let name = self.type_name();
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", name)?;
        match &self.kind {
            BlockKind::Paragraph(body) | BlockKind::Heading(_, body) => {
                map.serialize_entry(name, body)?
            }
            BlockKind::Quote(body)
            | BlockKind::BulletedListItem(body)
            | BlockKind::NumberedListItem(body) => map.serialize_entry(name, body)?,
            BlockKind::Code(body) => map.serialize_entry(name, body)?,
            BlockKind::Divider => map.serialize_entry(name, &Empty {})?,
            BlockKind::Image(body) => map.serialize_entry(name, body)?,
            BlockKind::Table(body) => map.serialize_entry(name, body)?,
            BlockKind::TableRow(body) => map.serialize_entry(name, body)?,
            BlockKind::ToDo(body) => map.serialize_entry(name, body)?,
        }
        map.end()
    }
}

#[derive(Serialize)]
struct Empty {}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RichTextBody {
    pub rich_text: Vec<RichText>,
}

/// Rich text plus nested blocks; shared by quotes and list items.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContainerBody {
    pub rich_text: Vec<RichText>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NotionBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ToDoBody {
    pub rich_text: Vec<RichText>,
    pub checked: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NotionBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeBody {
    pub rich_text: Vec<RichText>,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageBody {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub external: ExternalFile,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalFile {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableBody {
    pub table_width: usize,
    pub has_column_header: bool,
    pub has_row_header: bool,
    pub children: Vec<NotionBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRowBody {
    /// One rich-text array per cell.
    pub cells: Vec<Vec<RichText>>,
}

/// One run of styled text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RichText {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: TextContent,
    #[serde(skip_serializing_if = "Annotations::is_plain")]
    pub annotations: Annotations,
}

impl RichText {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: "text",
            text: TextContent {
                content: content.into(),
                link: None,
            },
            annotations: Annotations::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextContent {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<TextLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLink {
    pub url: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Annotations {
    #[serde(skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub strikethrough: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub code: bool,
}

impl Annotations {
    pub fn is_plain(&self) -> bool {
        *self == Annotations::default()
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// The `{ children }` body of a Notion "append block children" call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NotionPayload {
    pub children: Vec<NotionBlock>,
}

impl NotionPayload {
    /// Text content of every block, one block per line.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for (i, block) in self.children.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            block.push_plain_text(&mut out);
        }
        out
    }
}
