use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value, json};

/// Subset of the platform's colour names, usable for text and block backgrounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    #[default]
    Default,
    Gray,
    Brown,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    Red,
    GrayBackground,
    BrownBackground,
    OrangeBackground,
    YellowBackground,
    GreenBackground,
    BlueBackground,
    PurpleBackground,
    PinkBackground,
    RedBackground,
}

/// Formatting flags shared by every character of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    pub color: Color,
}

impl Annotations {
    pub fn plain(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    /// True when no formatting flag is set (colour is ignored).
    pub fn is_plain(&self) -> bool {
        !(self.bold || self.italic || self.strikethrough || self.underline || self.code)
    }

    /// Union of two flag sets; `self` keeps its colour.
    pub fn merge(self, other: Annotations) -> Self {
        Self {
            bold: self.bold || other.bold,
            italic: self.italic || other.italic,
            strikethrough: self.strikethrough || other.strikethrough,
            underline: self.underline || other.underline,
            code: self.code || other.code,
            color: self.color,
        }
    }
}

/// One contiguous span of inline text with a single annotation set.
///
/// A run is either a text run (`equation` is `None`) or an equation run, in which
/// case `plain_text` holds the expression and `href` is always `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichTextRun {
    pub plain_text: String,
    pub annotations: Annotations,
    pub href: Option<String>,
    pub equation: Option<String>,
}

impl RichTextRun {
    pub fn text(content: impl Into<String>, annotations: Annotations) -> Self {
        Self {
            plain_text: content.into(),
            annotations,
            href: None,
            equation: None,
        }
    }

    pub fn link(
        content: impl Into<String>,
        href: impl Into<String>,
        annotations: Annotations,
    ) -> Self {
        Self {
            href: Some(href.into()),
            ..Self::text(content, annotations)
        }
    }

    pub fn equation(expression: impl Into<String>, annotations: Annotations) -> Self {
        let expression = expression.into();
        Self {
            plain_text: expression.clone(),
            annotations,
            href: None,
            equation: Some(expression),
        }
    }

    pub fn is_equation(&self) -> bool {
        self.equation.is_some()
    }

    pub fn to_value(&self) -> Value {
        match &self.equation {
            Some(expression) => json!({
                "type": "equation",
                "equation": { "expression": expression },
                "annotations": self.annotations,
            }),
            None => json!({
                "type": "text",
                "text": {
                    "content": self.plain_text,
                    "link": self.href.as_ref().map(|url| json!({ "url": url })),
                },
                "annotations": self.annotations,
            }),
        }
    }
}

impl Serialize for RichTextRun {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Visible text of a run sequence, equations included as their expression.
pub fn plain_text(runs: &[RichTextRun]) -> String {
    runs.iter().map(|run| run.plain_text.as_str()).collect()
}

/// Media flavours the platform can embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Pdf,
    File,
    Embed,
    Bookmark,
}

impl MediaKind {
    pub fn type_name(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Pdf => "pdf",
            MediaKind::File => "file",
            MediaKind::Embed => "embed",
            MediaKind::Bookmark => "bookmark",
        }
    }

    /// Hosted file blocks wrap their URL in an `external` file object.
    fn is_file_object(self) -> bool {
        matches!(
            self,
            MediaKind::Image
                | MediaKind::Video
                | MediaKind::Audio
                | MediaKind::Pdf
                | MediaKind::File
        )
    }
}

/// Output blocks, one variant per target block type.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph {
        rich_text: Vec<RichTextRun>,
        children: Vec<Block>,
    },
    Heading {
        /// Always within 1..=3.
        level: u8,
        rich_text: Vec<RichTextRun>,
    },
    BulletedListItem {
        rich_text: Vec<RichTextRun>,
        children: Vec<Block>,
    },
    NumberedListItem {
        /// Position among its siblings, starting at 1. Not sent to the API,
        /// which numbers items itself.
        number: u32,
        rich_text: Vec<RichTextRun>,
        children: Vec<Block>,
    },
    ToDo {
        checked: bool,
        rich_text: Vec<RichTextRun>,
        children: Vec<Block>,
    },
    Code {
        language: String,
        rich_text: Vec<RichTextRun>,
    },
    Table {
        width: usize,
        has_column_header: bool,
        rows: Vec<Vec<Vec<RichTextRun>>>,
    },
    Media {
        kind: MediaKind,
        url: String,
        caption: Vec<RichTextRun>,
    },
    Equation {
        expression: String,
    },
    Quote {
        rich_text: Vec<RichTextRun>,
        children: Vec<Block>,
    },
    Divider,
    Toggle {
        rich_text: Vec<RichTextRun>,
        children: Vec<Block>,
    },
    ColumnList {
        columns: Vec<Vec<Block>>,
    },
    SyncedBlock {
        children: Vec<Block>,
    },
    Callout {
        icon: Option<String>,
        color: Color,
        rich_text: Vec<RichTextRun>,
        children: Vec<Block>,
    },
    Breadcrumb,
    TableOfContents,
}

impl Block {
    pub fn paragraph(rich_text: Vec<RichTextRun>) -> Self {
        Block::Paragraph {
            rich_text,
            children: Vec::new(),
        }
    }

    /// The `type` discriminator used by the API.
    pub fn type_name(&self) -> &'static str {
        match self {
            Block::Paragraph { .. } => "paragraph",
            Block::Heading { level: 1, .. } => "heading_1",
            Block::Heading { level: 2, .. } => "heading_2",
            Block::Heading { .. } => "heading_3",
            Block::BulletedListItem { .. } => "bulleted_list_item",
            Block::NumberedListItem { .. } => "numbered_list_item",
            Block::ToDo { .. } => "to_do",
            Block::Code { .. } => "code",
            Block::Table { .. } => "table",
            Block::Media { kind, .. } => kind.type_name(),
            Block::Equation { .. } => "equation",
            Block::Quote { .. } => "quote",
            Block::Divider => "divider",
            Block::Toggle { .. } => "toggle",
            Block::ColumnList { .. } => "column_list",
            Block::SyncedBlock { .. } => "synced_block",
            Block::Callout { .. } => "callout",
            Block::Breadcrumb => "breadcrumb",
            Block::TableOfContents => "table_of_contents",
        }
    }

    /// Inline content of the block, empty for blocks without rich text.
    pub fn rich_text(&self) -> &[RichTextRun] {
        match self {
            Block::Paragraph { rich_text, .. }
            | Block::Heading { rich_text, .. }
            | Block::BulletedListItem { rich_text, .. }
            | Block::NumberedListItem { rich_text, .. }
            | Block::ToDo { rich_text, .. }
            | Block::Code { rich_text, .. }
            | Block::Quote { rich_text, .. }
            | Block::Toggle { rich_text, .. }
            | Block::Callout { rich_text, .. } => rich_text,
            _ => &[],
        }
    }

    /// Nested blocks (column contents are not children of the column list itself).
    pub fn children(&self) -> &[Block] {
        match self {
            Block::Paragraph { children, .. }
            | Block::BulletedListItem { children, .. }
            | Block::NumberedListItem { children, .. }
            | Block::ToDo { children, .. }
            | Block::Quote { children, .. }
            | Block::Toggle { children, .. }
            | Block::SyncedBlock { children }
            | Block::Callout { children, .. } => children,
            _ => &[],
        }
    }

    pub fn to_value(&self) -> Value {
        let body = match self {
            Block::Paragraph {
                rich_text,
                children,
            }
            | Block::BulletedListItem {
                rich_text,
                children,
            }
            | Block::NumberedListItem {
                rich_text,
                children,
                ..
            }
            | Block::Quote {
                rich_text,
                children,
            }
            | Block::Toggle {
                rich_text,
                children,
            } => text_body(rich_text, Color::Default, children),
            Block::Heading { rich_text, .. } => {
                let mut body = text_body(rich_text, Color::Default, &[]);
                body.insert("is_toggleable".into(), Value::Bool(false));
                body
            }
            Block::ToDo {
                checked,
                rich_text,
                children,
            } => {
                let mut body = text_body(rich_text, Color::Default, children);
                body.insert("checked".into(), Value::Bool(*checked));
                body
            }
            Block::Code {
                language,
                rich_text,
            } => object(json!({
                "rich_text": rich_text,
                "language": language,
                "caption": [],
            })),
            Block::Table {
                width,
                has_column_header,
                rows,
            } => {
                let rows: Vec<Value> = rows
                    .iter()
                    .map(|cells| {
                        json!({
                            "object": "block",
                            "type": "table_row",
                            "table_row": { "cells": cells },
                        })
                    })
                    .collect();
                object(json!({
                    "table_width": width,
                    "has_column_header": has_column_header,
                    "has_row_header": false,
                    "children": rows,
                }))
            }
            Block::Media { kind, url, caption } if kind.is_file_object() => object(json!({
                "type": "external",
                "external": { "url": url },
                "caption": caption,
            })),
            Block::Media {
                kind: MediaKind::Embed,
                url,
                ..
            } => object(json!({ "url": url })),
            Block::Media { url, caption, .. } => object(json!({
                "url": url,
                "caption": caption,
            })),
            Block::Equation { expression } => object(json!({ "expression": expression })),
            Block::Divider | Block::Breadcrumb => Map::new(),
            Block::TableOfContents => object(json!({ "color": Color::Default })),
            Block::ColumnList { columns } => {
                let columns: Vec<Value> = columns
                    .iter()
                    .map(|children| {
                        json!({
                            "object": "block",
                            "type": "column",
                            "column": { "children": children },
                        })
                    })
                    .collect();
                object(json!({ "children": columns }))
            }
            Block::SyncedBlock { children } => object(json!({
                "synced_from": null,
                "children": children,
            })),
            Block::Callout {
                icon,
                color,
                rich_text,
                children,
            } => {
                let mut body = text_body(rich_text, *color, children);
                if let Some(emoji) = icon {
                    body.insert("icon".into(), json!({ "type": "emoji", "emoji": emoji }));
                }
                body
            }
        };

        let type_name = self.type_name();
        let mut block = Map::new();
        block.insert("object".into(), Value::from("block"));
        block.insert("type".into(), Value::from(type_name));
        block.insert(type_name.into(), Value::Object(body));
        Value::Object(block)
    }
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

fn text_body(rich_text: &[RichTextRun], color: Color, children: &[Block]) -> Map<String, Value> {
    let mut body = object(json!({
        "rich_text": rich_text,
        "color": color,
    }));
    if !children.is_empty() {
        body.insert("children".into(), json!(children));
    }
    body
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_run_json() {
        let run = RichTextRun::link("docs", "https://example.com", Annotations::default());
        assert_eq!(
            run.to_value(),
            json!({
                "type": "text",
                "text": { "content": "docs", "link": { "url": "https://example.com" } },
                "annotations": {
                    "bold": false, "italic": false, "strikethrough": false,
                    "underline": false, "code": false, "color": "default"
                }
            })
        );
    }

    #[test]
    fn equation_run_json_has_no_text() {
        let value = RichTextRun::equation("E=mc^2", Annotations::default()).to_value();
        assert_eq!(value["type"], "equation");
        assert_eq!(value["equation"]["expression"], "E=mc^2");
        assert!(value.get("text").is_none());
    }

    #[test]
    fn paragraph_json_omits_empty_children() {
        let block = Block::paragraph(vec![RichTextRun::text("hi", Annotations::default())]);
        let value = block.to_value();
        assert_eq!(value["object"], "block");
        assert_eq!(value["type"], "paragraph");
        assert_eq!(value["paragraph"]["rich_text"][0]["text"]["content"], "hi");
        assert!(value["paragraph"].get("children").is_none());
    }

    #[test]
    fn numbered_item_does_not_leak_number() {
        let block = Block::NumberedListItem {
            number: 3,
            rich_text: vec![],
            children: vec![],
        };
        let value = block.to_value();
        assert!(value["numbered_list_item"].get("number").is_none());
    }

    #[test]
    fn table_rows_are_table_row_blocks() {
        let cell = |s: &str| vec![RichTextRun::text(s, Annotations::default())];
        let block = Block::Table {
            width: 2,
            has_column_header: true,
            rows: vec![vec![cell("a"), cell("b")]],
        };
        let value = block.to_value();
        assert_eq!(value["table"]["table_width"], 2);
        assert_eq!(value["table"]["children"][0]["type"], "table_row");
        assert_eq!(
            value["table"]["children"][0]["table_row"]["cells"][1][0]["text"]["content"],
            "b"
        );
    }

    #[test]
    fn media_shapes() {
        let image = Block::Media {
            kind: MediaKind::Image,
            url: "https://x/a.png".into(),
            caption: vec![],
        };
        assert_eq!(image.to_value()["image"]["external"]["url"], "https://x/a.png");

        let bookmark = Block::Media {
            kind: MediaKind::Bookmark,
            url: "https://x".into(),
            caption: vec![],
        };
        assert_eq!(bookmark.to_value()["bookmark"]["url"], "https://x");
    }

    #[test]
    fn callout_icon_and_colour() {
        let block = Block::Callout {
            icon: Some("💡".into()),
            color: Color::GreenBackground,
            rich_text: vec![],
            children: vec![],
        };
        let value = block.to_value();
        assert_eq!(value["callout"]["icon"]["emoji"], "💡");
        assert_eq!(value["callout"]["color"], "green_background");
    }
}
