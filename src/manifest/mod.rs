//! Content manifest.
//!
//! The manifest is a YAML document holding everything the deck needs: the
//! document metadata, the output location, preview settings and the ordered
//! slide specifications. Paths inside it are relative to the directory the
//! manifest lives in.
//!
//! ```yaml
//! metadata:
//!   title: Quarterly review
//!   author: Analytics
//! output: review.pptx
//! slides:
//!   - id: title
//!     background: "1e3c72"
//!     elements:
//!       - text:
//!           content: Quarterly review
//!           x: 0.5
//!           y: 2.0
//!           w: 9.0
//!           h: 1.0
//!           font_size: 40
//!   - id: chart
//!     fragment: fragments/chart.xml
//!     overlays:
//!       - path: images/chart.png
//!         x: 5.2
//!         y: 1.0
//!         w: 4.2
//!         h: 3.2
//! ```

pub mod fragment;

use crate::common::error::{DeckError, Result};
use crate::common::unit::{EMUS_PER_INCH, inch_to_emu};
use crate::pptx::{BulletKind, Frame, SlideLayout, TextAlign, VerticalAnchor};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// A parsed content manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub metadata: DeckMetadata,
    /// Deck output path, relative to the manifest directory
    pub output: PathBuf,
    #[serde(default)]
    pub previews: PreviewSettings,
    #[serde(default)]
    pub slides: Vec<SlideSpec>,
    /// Directory relative paths resolve against
    #[serde(skip)]
    base_dir: PathBuf,
}

/// Document-level metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct DeckMetadata {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default = "default_layout")]
    pub layout: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_layout() -> String {
    "LAYOUT_16x9".to_string()
}

fn default_language() -> String {
    "en-US".to_string()
}

impl DeckMetadata {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            subject: None,
            layout: default_layout(),
            language: default_language(),
        }
    }

    /// Resolve the named layout.
    pub fn slide_layout(&self) -> Result<SlideLayout> {
        SlideLayout::from_name(&self.layout).ok_or_else(|| {
            DeckError::Manifest(format!(
                "Unknown layout '{}' (expected one of {})",
                self.layout,
                SlideLayout::names().join(", ")
            ))
        })
    }
}

/// Thumbnail generation settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PreviewSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_preview_dir")]
    pub output_dir: PathBuf,
    /// Thumbnail width in pixels; the height follows the slide aspect ratio
    #[serde(default = "default_preview_width")]
    pub width: u32,
}

fn default_true() -> bool {
    true
}

fn default_preview_dir() -> PathBuf {
    PathBuf::from("thumbnails")
}

fn default_preview_width() -> u32 {
    960
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: default_preview_dir(),
            width: default_preview_width(),
        }
    }
}

/// Declarative description of one slide.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlideSpec {
    pub id: String,
    /// Markup fragment to expand into the slide's elements
    #[serde(default)]
    pub fragment: Option<PathBuf>,
    /// Solid background color in hex RGB
    #[serde(default)]
    pub background: Option<String>,
    /// Inline element directives
    #[serde(default)]
    pub elements: Option<Vec<ElementDirective>>,
    /// Images placed above the slide's other content
    #[serde(default)]
    pub overlays: Vec<ImageBlock>,
}

/// Where a slide's elements come from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContentSource<'a> {
    Fragment(&'a Path),
    Inline(&'a [ElementDirective]),
}

impl SlideSpec {
    /// A slide with inline elements only.
    pub fn inline(id: impl Into<String>, elements: Vec<ElementDirective>) -> Self {
        Self {
            id: id.into(),
            elements: Some(elements),
            ..Default::default()
        }
    }

    /// A slide whose elements come from a markup fragment.
    pub fn from_fragment(id: impl Into<String>, fragment: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            fragment: Some(fragment.into()),
            ..Default::default()
        }
    }

    pub fn with_overlay(mut self, overlay: ImageBlock) -> Self {
        self.overlays.push(overlay);
        self
    }

    pub fn with_background(mut self, color: impl Into<String>) -> Self {
        self.background = Some(color.into());
        self
    }

    /// The slide's content source.
    ///
    /// Declaring both a fragment and inline elements is malformed content. A
    /// slide with neither is an empty inline slide.
    pub fn content(&self) -> Result<ContentSource<'_>> {
        match (&self.fragment, &self.elements) {
            (Some(_), Some(_)) => Err(DeckError::Render(format!(
                "Slide '{}' declares both a fragment and inline elements",
                self.id
            ))),
            (Some(path), None) => Ok(ContentSource::Fragment(path)),
            (None, Some(elements)) => Ok(ContentSource::Inline(elements)),
            (None, None) => Ok(ContentSource::Inline(&[])),
        }
    }
}

/// One visual primitive on a slide.
///
/// In YAML a directive is a single-key map: `- text: {...}` or
/// `- image: {...}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementDirective {
    Text(TextBlock),
    Image(ImageBlock),
}

/// A positioned text box.
///
/// Content is either `content`, a string whose lines become plain
/// paragraphs, or `items`, a list of bulleted or numbered paragraphs.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<TextItem>>,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    /// Font size in points
    #[serde(default)]
    pub font_size: Option<f64>,
    #[serde(default)]
    pub font_face: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub align: Option<TextAlign>,
    #[serde(default)]
    pub valign: Option<VerticalAnchor>,
    /// Shape fill color
    #[serde(default)]
    pub fill: Option<String>,
}

impl TextBlock {
    /// A plain text block at the given position (inches).
    pub fn plain(content: impl Into<String>, x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            content: Some(content.into()),
            x,
            y,
            w,
            h,
            ..Default::default()
        }
    }

    /// A list text block at the given position (inches).
    pub fn list(items: Vec<TextItem>, x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            items: Some(items),
            x,
            y,
            w,
            h,
            ..Default::default()
        }
    }

    /// Position and size in EMUs.
    ///
    /// Fails with [`DeckError::Render`] when a value is negative, not finite
    /// or out of the DrawingML coordinate range.
    #[inline]
    pub fn frame(&self) -> Result<Frame> {
        frame_from_inches(self.x, self.y, self.w, self.h)
    }
}

/// One paragraph of a list text block.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TextItem {
    pub text: String,
    #[serde(default)]
    pub bullet: BulletKind,
    #[serde(default)]
    pub color: Option<String>,
}

impl TextItem {
    pub fn new(text: impl Into<String>, bullet: BulletKind) -> Self {
        Self {
            text: text.into(),
            bullet,
            color: None,
        }
    }
}

/// A positioned picture, used both as an element and as an overlay.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageBlock {
    pub path: PathBuf,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    /// Alternative text; defaults to the file name
    #[serde(default)]
    pub description: Option<String>,
}

impl ImageBlock {
    pub fn new(path: impl Into<PathBuf>, x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            path: path.into(),
            x,
            y,
            w,
            h,
            description: None,
        }
    }

    #[inline]
    pub fn frame(&self) -> Result<Frame> {
        frame_from_inches(self.x, self.y, self.w, self.h)
    }
}

/// Largest coordinate DrawingML accepts (ST_Coordinate), in EMUs.
const MAX_COORDINATE_EMU: f64 = 27_273_042_316_900.0;

fn frame_from_inches(x: f64, y: f64, w: f64, h: f64) -> Result<Frame> {
    Ok(Frame::new(
        geometry_emu("x", x)?,
        geometry_emu("y", y)?,
        geometry_emu("w", w)?,
        geometry_emu("h", h)?,
    ))
}

fn geometry_emu(name: &str, inches: f64) -> Result<i64> {
    if !inches.is_finite() || inches < 0.0 || inches * EMUS_PER_INCH as f64 > MAX_COORDINATE_EMU {
        return Err(DeckError::Render(format!("Invalid {} value {}", name, inches)));
    }
    Ok(inch_to_emu(inches))
}

impl Manifest {
    /// Load a manifest from a YAML file.
    ///
    /// Relative paths in the manifest resolve against the file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DeckError::MissingResource(path.to_path_buf()));
        }
        let yaml = std::fs::read_to_string(path)?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::from_yaml_str(&yaml, base_dir)
    }

    /// Parse a manifest from YAML text.
    pub fn from_yaml_str(yaml: &str, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut manifest: Manifest = serde_saphyr::from_str(yaml)?;
        manifest.base_dir = base_dir.into();
        manifest.metadata.slide_layout()?;
        Ok(manifest)
    }

    #[inline]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve a manifest-relative path.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }

    pub fn output_path(&self) -> PathBuf {
        self.resolve(&self.output)
    }

    pub fn preview_dir(&self) -> PathBuf {
        self.resolve(&self.previews.output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r##"
metadata:
  title: Demo
  author: Tester
output: out/demo.pptx
slides:
  - id: first
    background: "#1e3c72"
    elements:
      - text:
          content: "Hello\nWorld"
          x: 0.5
          y: 0.5
          w: 9
          h: 1
          font_size: 24
          align: center
      - image:
          path: images/plot.png
          x: 1
          y: 2
          w: 3
          h: 2
  - id: second
    fragment: fragments/second.xml
    overlays:
      - path: images/overlay.png
        x: 5.2
        y: 1.0
        w: 4.2
        h: 3.2
"##;

    #[test]
    fn test_parse_minimal_manifest() {
        let manifest = Manifest::from_yaml_str(MINIMAL, "/data").unwrap();
        assert_eq!(manifest.metadata.title, "Demo");
        assert_eq!(manifest.metadata.layout, "LAYOUT_16x9");
        assert_eq!(manifest.metadata.language, "en-US");
        assert_eq!(manifest.previews, PreviewSettings::default());
        assert_eq!(manifest.output_path(), PathBuf::from("/data/out/demo.pptx"));
        assert_eq!(manifest.preview_dir(), PathBuf::from("/data/thumbnails"));

        let ids: Vec<_> = manifest.slides.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["first", "second"]);

        let first = &manifest.slides[0];
        let ContentSource::Inline(elements) = first.content().unwrap() else {
            panic!("expected inline content");
        };
        assert_eq!(elements.len(), 2);
        match &elements[0] {
            ElementDirective::Text(block) => {
                assert_eq!(block.content.as_deref(), Some("Hello\nWorld"));
                assert_eq!(block.align, Some(TextAlign::Center));
                assert_eq!(block.font_size, Some(24.0));
            },
            other => panic!("unexpected directive {:?}", other),
        }
        assert!(matches!(elements[1], ElementDirective::Image(_)));

        let second = &manifest.slides[1];
        assert_eq!(
            second.content().unwrap(),
            ContentSource::Fragment(Path::new("fragments/second.xml"))
        );
        assert_eq!(second.overlays[0].frame().unwrap().x, inch_to_emu(5.2));
    }

    #[test]
    fn test_frame_rejects_bad_geometry() {
        assert!(TextBlock::plain("ok", 0.0, 0.0, 0.0, 1.0).frame().is_ok());
        for (x, w) in [(0.0, -2.0), (-0.5, 1.0), (f64::NAN, 1.0), (0.0, f64::INFINITY), (1e30, 1.0)] {
            let err = TextBlock::plain("x", x, 0.0, w, 1.0).frame().unwrap_err();
            assert!(matches!(err, DeckError::Render(_)), "x={} w={}", x, w);
        }
        let err = ImageBlock::new("a.png", 0.0, 0.0, 1.0, -1.0).frame().unwrap_err();
        assert!(matches!(err, DeckError::Render(_)));
    }

    #[test]
    fn test_unknown_layout_is_manifest_error() {
        let yaml = "metadata:\n  title: T\n  author: A\n  layout: LAYOUT_3x2\noutput: x.pptx\n";
        let err = Manifest::from_yaml_str(yaml, ".").unwrap_err();
        assert!(matches!(err, DeckError::Manifest(_)));
    }

    #[test]
    fn test_malformed_yaml_is_manifest_error() {
        let err = Manifest::from_yaml_str("metadata: [unclosed", ".").unwrap_err();
        assert!(matches!(err, DeckError::Manifest(_)));
    }

    #[test]
    fn test_missing_manifest_file() {
        let err = Manifest::load("/nonexistent/deck.yaml").unwrap_err();
        assert!(matches!(err, DeckError::MissingResource(_)));
    }

    #[test]
    fn test_both_content_sources_is_render_error() {
        let mut spec = SlideSpec::from_fragment("both", "a.xml");
        spec.elements = Some(Vec::new());
        assert!(matches!(spec.content(), Err(DeckError::Render(_))));
    }

    #[test]
    fn test_empty_slide_is_inline() {
        let spec = SlideSpec {
            id: "blank".to_string(),
            ..Default::default()
        };
        assert_eq!(spec.content().unwrap(), ContentSource::Inline(&[]));
    }

    #[test]
    fn test_list_items_default_to_disc() {
        let yaml = r#"
metadata: { title: T, author: A }
output: x.pptx
slides:
  - id: list
    elements:
      - text:
          items:
            - text: one
            - text: two
              bullet: number
              color: "e74c3c"
          x: 0
          y: 0
          w: 1
          h: 1
"#;
        let manifest = Manifest::from_yaml_str(yaml, ".").unwrap();
        let ContentSource::Inline(elements) = manifest.slides[0].content().unwrap() else {
            panic!("expected inline content");
        };
        let ElementDirective::Text(block) = &elements[0] else {
            panic!("expected text");
        };
        let items = block.items.as_ref().unwrap();
        assert_eq!(items[0].bullet, BulletKind::Disc);
        assert_eq!(items[1].bullet, BulletKind::Number);
        assert_eq!(items[1].color.as_deref(), Some("e74c3c"));
    }

    #[test]
    fn test_shipped_manifest() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("presentation/deck.yaml");
        let manifest = Manifest::load(&path).unwrap();

        assert_eq!(manifest.metadata.language, "ja-JP");
        assert_eq!(manifest.metadata.author, "FitGauss-PD Analysis");
        assert_eq!(manifest.slides.len(), 12);
        assert_eq!(manifest.slides[0].id, "title");
        assert_eq!(manifest.slides[11].id, "conclusion");
        assert!(manifest.output_path().ends_with("presentation/../gaussian-wake-model.pptx"));

        let overlays: Vec<_> = manifest
            .slides
            .iter()
            .filter(|s| !s.overlays.is_empty())
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(overlays, ["results-dataset", "results-performance", "analysis-residuals"]);
        for spec in &manifest.slides {
            assert!(spec.content().is_ok(), "slide {} has conflicting content", spec.id);
        }
    }
}
