//! Format types for PPTX presentations.
use serde::Deserialize;

/// Image format types supported by PPTX.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
}

impl ImageFormat {
    /// Get the MIME type for this image format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
        }
    }

    /// Get the file extension used for the media part.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    /// Detect image format from bytes (magic number detection).
    pub fn detect_from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47
        if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // GIF8
        if bytes.starts_with(b"GIF8") {
            return Some(Self::Gif);
        }

        // BM
        if bytes.starts_with(b"BM") {
            return Some(Self::Bmp);
        }

        // TIFF, little-endian or big-endian
        if bytes.starts_with(&[0x49, 0x49, 0x2A, 0x00])
            || bytes.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
        {
            return Some(Self::Tiff);
        }

        None
    }
}

/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlign {
    /// Value of the `algn` attribute on `a:pPr`.
    pub fn as_ooxml(&self) -> &'static str {
        match self {
            Self::Left => "l",
            Self::Center => "ctr",
            Self::Right => "r",
            Self::Justify => "just",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            "justify" => Some(Self::Justify),
            _ => None,
        }
    }
}

/// Vertical anchoring of text inside its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAnchor {
    Top,
    Middle,
    Bottom,
}

impl VerticalAnchor {
    /// Value of the `anchor` attribute on `a:bodyPr`.
    pub fn as_ooxml(&self) -> &'static str {
        match self {
            Self::Top => "t",
            Self::Middle => "ctr",
            Self::Bottom => "b",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "top" => Some(Self::Top),
            "middle" => Some(Self::Middle),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }
}

/// Paragraph marker for list items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulletKind {
    /// Plain paragraph without a marker
    None,
    /// Round bullet character
    #[default]
    Disc,
    /// Auto-numbered `1.`, `2.`, ...
    Number,
}

impl BulletKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "none" => Some(Self::None),
            "disc" => Some(Self::Disc),
            "number" => Some(Self::Number),
            _ => None,
        }
    }
}

/// Text box formatting shared by every paragraph in the box.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextFormat {
    /// Font family
    pub font: Option<String>,
    /// Font size in points
    pub size: Option<f64>,
    /// Bold text
    pub bold: bool,
    /// Italic text
    pub italic: bool,
    /// Text color in hex RGB (e.g., "FF0000" for red)
    pub color: Option<String>,
    /// Paragraph alignment
    pub align: Option<TextAlign>,
    /// Vertical anchor
    pub anchor: Option<VerticalAnchor>,
    /// Shape fill color in hex RGB
    pub fill: Option<String>,
}

/// A single paragraph of a text box.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub text: String,
    pub bullet: BulletKind,
    /// Overrides the box color for this paragraph only
    pub color: Option<String>,
}

impl Paragraph {
    /// A plain paragraph without a list marker.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bullet: BulletKind::None,
            color: None,
        }
    }

    pub fn bulleted(text: impl Into<String>, bullet: BulletKind) -> Self {
        Self {
            text: text.into(),
            bullet,
            color: None,
        }
    }

    pub fn is_list_item(&self) -> bool {
        self.bullet != BulletKind::None
    }
}

/// Normalize a hex RGB color such as `#1e3c72` to `1E3C72`.
///
/// Returns `None` unless the input is exactly six hex digits after an
/// optional leading `#`.
pub fn normalize_color(color: &str) -> Option<String> {
    let hex = color.strip_prefix('#').unwrap_or(color);
    if hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        Some(hex.to_ascii_uppercase())
    } else {
        None
    }
}
