//! Profile document model
//!
//! A [`Document`] is the editable state behind a profile page: a profile
//! header, an ordered grid of [`Item`]s, and a [`Background`]. Item content
//! is a closed [`ItemContent`] enum, so the renderer matches it
//! exhaustively and a new item kind cannot be added without teaching the
//! renderer about it.
//!
//! The editor hands documents over as loosely typed JSON snapshots;
//! [`Document::from_json`] converts those into the typed model and rejects
//! anything it does not recognize.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ArtifactError, ArtifactResult};

/// Smallest grid span an item may occupy
pub const MIN_SPAN: u8 = 1;

/// Largest grid span an item may occupy (the grid has four columns)
pub const MAX_SPAN: u8 = 4;

/// Default page background color
pub const DEFAULT_BACKGROUND_COLOR: &str = "#F3E8FF";

/// Corner style of a grid item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Square,
    #[default]
    Rounded,
    Circle,
}

impl Shape {
    /// CSS `border-radius` value for this shape
    pub fn border_radius(&self) -> &'static str {
        match self {
            Shape::Square => "0",
            Shape::Rounded => "0.5rem",
            Shape::Circle => "50%",
        }
    }

    fn parse(id: &str, raw: &str) -> ArtifactResult<Self> {
        match raw {
            "square" => Ok(Shape::Square),
            "rounded" => Ok(Shape::Rounded),
            "circle" => Ok(Shape::Circle),
            other => Err(ArtifactError::UnknownShape {
                id: id.to_string(),
                shape: other.to_string(),
            }),
        }
    }
}

/// Layout and color attributes of a grid item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStyle {
    pub bg_color: String,
    pub text_color: String,
    /// Column span, 1..=4
    pub width: u8,
    /// Row span, 1..=4
    pub height: u8,
    pub shape: Shape,
}

impl Default for ItemStyle {
    fn default() -> Self {
        Self {
            bg_color: "#F0F0F0".to_string(),
            text_color: "#000000".to_string(),
            width: 1,
            height: 1,
            shape: Shape::Rounded,
        }
    }
}

impl ItemStyle {
    pub fn with_colors(mut self, bg: impl Into<String>, text: impl Into<String>) -> Self {
        self.bg_color = bg.into();
        self.text_color = text.into();
        self
    }

    pub fn with_span(mut self, width: u8, height: u8) -> Self {
        self.width = width.clamp(MIN_SPAN, MAX_SPAN);
        self.height = height.clamp(MIN_SPAN, MAX_SPAN);
        self
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }
}

/// What a grid item shows
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemContent {
    /// Link to a social profile
    Social {
        platform: String,
        username: String,
        url: String,
    },
    /// A linked image
    Image { url: String },
    /// Embedded media (video, gif) or a link placeholder
    Embed { url: String },
    /// Free text
    Text { text: String },
}

impl ItemContent {
    /// The editor's type tag for this content
    pub fn tag(&self) -> &'static str {
        match self {
            ItemContent::Social { .. } => "social",
            ItemContent::Image { .. } => "image",
            ItemContent::Embed { .. } => "embed",
            ItemContent::Text { .. } => "text",
        }
    }
}

/// One cell of the profile grid
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub content: ItemContent,
    pub style: ItemStyle,
}

impl Item {
    pub fn new(id: impl Into<String>, content: ItemContent) -> Self {
        Self {
            id: id.into(),
            content,
            style: ItemStyle::default(),
        }
    }

    pub fn with_style(mut self, style: ItemStyle) -> Self {
        self.style = style;
        self
    }
}

/// Page background
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Background {
    /// Solid CSS color
    Color(String),
    /// Cover image url
    Image(String),
    /// Embed markup (e.g. a GIF embed) placed behind the page
    Embed(String),
}

impl Default for Background {
    fn default() -> Self {
        Background::Color(DEFAULT_BACKGROUND_COLOR.to_string())
    }
}

/// Profile header fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub bio: String,
    pub avatar_url: String,
}

/// The complete editable page state
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Document {
    pub profile: Profile,
    pub items: Vec<Item>,
    pub background: Background,
}

impl Document {
    /// The page a new user starts editing from
    pub fn starter(name: impl Into<String>) -> Self {
        let social = |platform: &str, host: &str| ItemContent::Social {
            platform: platform.to_string(),
            username: "@example".to_string(),
            url: format!("https://{}/example", host),
        };

        let items = vec![
            Item::new("1", social("Twitter", "twitter.com"))
                .with_style(ItemStyle::default().with_colors("#E6F3FF", "#000000")),
            Item::new("2", social("Instagram", "instagram.com"))
                .with_style(ItemStyle::default().with_colors("#FFEDF0", "#000000")),
            Item::new(
                "3",
                ItemContent::Image {
                    url: "https://source.unsplash.com/random/400x400".to_string(),
                },
            )
            .with_style(ItemStyle::default().with_span(2, 2)),
            Item::new(
                "4",
                ItemContent::Embed {
                    url: "https://www.youtube.com/embed/dQw4w9WgXcQ".to_string(),
                },
            )
            .with_style(
                ItemStyle::default()
                    .with_colors("#FFEEEE", "#000000")
                    .with_span(2, 1),
            ),
            Item::new(
                "5",
                ItemContent::Text {
                    text: "Welcome to my linkspace profile!".to_string(),
                },
            )
            .with_style(
                ItemStyle::default()
                    .with_colors("#E6FFE6", "#000000")
                    .with_span(2, 1),
            ),
        ];

        Self {
            profile: Profile {
                name: name.into(),
                bio: "Welcome to my linkspace profile!".to_string(),
                avatar_url: String::new(),
            },
            items,
            background: Background::default(),
        }
    }

    /// Parse an editor snapshot
    ///
    /// The snapshot uses the editor's field names (`profileImage`, `bgType`,
    /// `bgColor`, `bgImage`, `bgGif`, and per item `type`, `content`,
    /// `bgColor`, `textColor`, `width`, `height`, `shape`). Missing style
    /// fields take the editor defaults; missing content fields and unknown
    /// item types are errors.
    pub fn from_json(snapshot: &str) -> ArtifactResult<Self> {
        let value: Value = serde_json::from_str(snapshot)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> ArtifactResult<Self> {
        let root = value
            .as_object()
            .ok_or_else(|| ArtifactError::InvalidSnapshot("snapshot is not an object".into()))?;

        let profile = Profile {
            name: str_field(root, "name").unwrap_or_default().to_string(),
            bio: str_field(root, "bio").unwrap_or_default().to_string(),
            avatar_url: str_field(root, "profileImage")
                .unwrap_or_default()
                .to_string(),
        };

        let background = parse_background(root)?;

        let items = match root.get("items") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(raw)) => raw
                .iter()
                .enumerate()
                .map(|(index, raw)| parse_item(index, raw))
                .collect::<ArtifactResult<Vec<_>>>()?,
            Some(_) => {
                return Err(ArtifactError::InvalidSnapshot(
                    "items is not an array".into(),
                ));
            }
        };

        Ok(Self {
            profile,
            items,
            background,
        })
    }
}

fn str_field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

fn parse_background(root: &Map<String, Value>) -> ArtifactResult<Background> {
    let color = || {
        str_field(root, "bgColor")
            .unwrap_or(DEFAULT_BACKGROUND_COLOR)
            .to_string()
    };
    match str_field(root, "bgType") {
        None | Some("color") => Ok(Background::Color(color())),
        Some("image") => match str_field(root, "bgImage") {
            Some(url) if !url.is_empty() => Ok(Background::Image(url.to_string())),
            _ => Ok(Background::Color(color())),
        },
        // An empty gif selection renders like a plain page
        Some("gif") => match str_field(root, "bgGif") {
            Some(markup) if !markup.is_empty() => Ok(Background::Embed(markup.to_string())),
            _ => Ok(Background::Color("transparent".to_string())),
        },
        Some(other) => Err(ArtifactError::UnknownBackground(other.to_string())),
    }
}

fn parse_item(index: usize, raw: &Value) -> ArtifactResult<Item> {
    let placeholder_id = format!("#{}", index);
    let obj = raw.as_object().ok_or_else(|| {
        ArtifactError::InvalidSnapshot(format!("item {} is not an object", placeholder_id))
    })?;

    let id = match obj.get("id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => {
            return Err(ArtifactError::MissingField {
                id: placeholder_id,
                field: "id",
            });
        }
    };

    let tag = str_field(obj, "type").ok_or_else(|| ArtifactError::MissingField {
        id: id.clone(),
        field: "type",
    })?;

    let empty = Map::new();
    let content = obj
        .get("content")
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    let required = |field: &'static str| -> ArtifactResult<String> {
        str_field(content, field)
            .map(str::to_string)
            .ok_or_else(|| ArtifactError::MissingField {
                id: id.clone(),
                field,
            })
    };

    let content = match tag {
        "social" => ItemContent::Social {
            platform: required("platform")?,
            username: str_field(content, "username")
                .unwrap_or_default()
                .to_string(),
            url: required("url")?,
        },
        "image" => ItemContent::Image {
            url: required("imageUrl")?,
        },
        "embed" => ItemContent::Embed {
            url: required("url")?,
        },
        "text" => ItemContent::Text {
            text: required("text")?,
        },
        other => {
            return Err(ArtifactError::UnsupportedItem {
                id,
                tag: other.to_string(),
            });
        }
    };

    let defaults = ItemStyle::default();
    let style = ItemStyle {
        bg_color: str_field(obj, "bgColor")
            .map(str::to_string)
            .unwrap_or(defaults.bg_color),
        text_color: str_field(obj, "textColor")
            .map(str::to_string)
            .unwrap_or(defaults.text_color),
        width: parse_span(&id, obj, "width")?,
        height: parse_span(&id, obj, "height")?,
        shape: match str_field(obj, "shape") {
            Some(raw) => Shape::parse(&id, raw)?,
            None => defaults.shape,
        },
    };

    Ok(Item { id, content, style })
}

fn parse_span(id: &str, obj: &Map<String, Value>, dimension: &'static str) -> ArtifactResult<u8> {
    let Some(raw) = obj.get(dimension) else {
        return Ok(MIN_SPAN);
    };
    let invalid = |value: i64| ArtifactError::InvalidDimension {
        id: id.to_string(),
        dimension,
        value,
    };
    let value = raw.as_i64().ok_or_else(|| invalid(-1))?;
    if !(i64::from(MIN_SPAN)..=i64::from(MAX_SPAN)).contains(&value) {
        return Err(invalid(value));
    }
    u8::try_from(value).map_err(|_| invalid(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_document() {
        let doc = Document::starter("John Doe");
        assert_eq!(doc.profile.name, "John Doe");
        assert_eq!(doc.items.len(), 5);
        let tags: Vec<&str> = doc.items.iter().map(|i| i.content.tag()).collect();
        assert_eq!(tags, ["social", "social", "image", "embed", "text"]);
        assert_eq!(doc.items[2].style.width, 2);
        assert_eq!(doc.background, Background::Color("#F3E8FF".into()));
    }

    #[test]
    fn test_parse_snapshot() {
        let doc = Document::from_json(
            r##"{
                "name": "Ada",
                "bio": "hi",
                "profileImage": "https://img/ada.png",
                "bgType": "image",
                "bgImage": "https://img/bg.png",
                "items": [
                    {"id": "a", "type": "social",
                     "content": {"platform": "GitHub", "username": "@ada", "url": "https://github.com/ada"},
                     "bgColor": "#fff", "textColor": "#111", "width": 2, "height": 1, "shape": "circle"},
                    {"id": 17, "type": "text", "content": {"text": "hello"}}
                ]
            }"##,
        )
        .unwrap();

        assert_eq!(doc.profile.avatar_url, "https://img/ada.png");
        assert_eq!(doc.background, Background::Image("https://img/bg.png".into()));
        assert_eq!(doc.items[0].style.shape, Shape::Circle);
        assert_eq!(doc.items[0].style.width, 2);
        assert_eq!(doc.items[1].id, "17");
        assert_eq!(doc.items[1].style, ItemStyle::default());
    }

    #[test]
    fn test_unknown_item_type_is_rejected() {
        let err = Document::from_json(
            r#"{"items": [{"id": "x", "type": "carousel", "content": {}}]}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ArtifactError::UnsupportedItem {
                id: "x".into(),
                tag: "carousel".into()
            }
        );
    }

    #[test]
    fn test_missing_content_field() {
        let err = Document::from_json(r#"{"items": [{"id": "i", "type": "image", "content": {}}]}"#)
            .unwrap_err();
        assert_eq!(
            err,
            ArtifactError::MissingField {
                id: "i".into(),
                field: "imageUrl"
            }
        );
    }

    #[test]
    fn test_span_out_of_range() {
        let err = Document::from_json(
            r#"{"items": [{"id": "t", "type": "text", "content": {"text": "x"}, "width": 5}]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::InvalidDimension { value: 5, dimension: "width", .. }
        ));
    }

    #[test]
    fn test_gif_background() {
        let doc = Document::from_json(r#"{"bgType": "gif", "bgGif": "<div class=\"tenor\"></div>"}"#)
            .unwrap();
        assert!(matches!(doc.background, Background::Embed(ref m) if m.contains("tenor")));

        let doc = Document::from_json(r#"{"bgType": "gif"}"#).unwrap();
        assert_eq!(doc.background, Background::Color("transparent".into()));

        assert!(matches!(
            Document::from_json(r#"{"bgType": "video"}"#),
            Err(ArtifactError::UnknownBackground(_))
        ));
    }

    #[test]
    fn test_typed_document_serde() {
        let doc = Document::starter("Ada");
        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }
}
