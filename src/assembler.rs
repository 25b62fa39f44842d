//! Deck assembly.
//!
//! The [`DeckAssembler`] turns an ordered list of [`SlideSpec`]s into a
//! [`Deck`]. Each spec is rendered in declaration order. A slide whose content
//! cannot be rendered is logged and skipped, and the run continues with the
//! next spec. Overlays that cannot be resolved are dropped from their slide
//! with a warning.

use crate::common::error::{DeckError, Result};
use crate::common::xml::find_invalid_xml_char;
use crate::manifest::fragment::load_fragment;
use crate::manifest::{ContentSource, DeckMetadata, ElementDirective, ImageBlock, Manifest, SlideSpec, TextBlock};
use crate::pptx::{Deck, DeckProperties, PackageWriter, Paragraph, Slide, TextFormat, normalize_color};
use chrono::Utc;
use log::{error, info, warn};
use std::path::{Path, PathBuf};

/// A slide that was left out of the deck.
#[derive(Debug)]
pub struct SkippedSlide {
    /// Position of the spec in the input list
    pub index: usize,
    pub id: String,
    pub error: DeckError,
}

/// An overlay that was dropped from a rendered slide.
#[derive(Debug)]
pub struct DroppedOverlay {
    pub slide_id: String,
    pub path: PathBuf,
    pub error: DeckError,
}

/// Outcome of a deck build.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// IDs of the slides that made it into the deck, in order
    pub rendered: Vec<String>,
    pub skipped: Vec<SkippedSlide>,
    pub dropped_overlays: Vec<DroppedOverlay>,
}

impl BuildReport {
    /// True when every slide and overlay was rendered.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.dropped_overlays.is_empty()
    }
}

/// Builds decks from slide specifications.
///
/// Relative paths in specs (fragments, images, overlays) resolve against the
/// assembler's base directory.
#[derive(Debug, Clone, Default)]
pub struct DeckAssembler {
    base_dir: PathBuf,
}

impl DeckAssembler {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// An assembler resolving paths against the manifest's directory.
    pub fn for_manifest(manifest: &Manifest) -> Self {
        Self::new(manifest.base_dir())
    }

    #[inline]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Build a deck from the given specs.
    ///
    /// Per-slide failures never fail the build. The only errors come from
    /// `metadata`: an unknown layout, or text XML cannot carry.
    pub fn build_deck(&self, specs: &[SlideSpec], metadata: &DeckMetadata) -> Result<Deck> {
        self.build_deck_with_report(specs, metadata).map(|(deck, _)| deck)
    }

    /// Build a deck and report which slides and overlays were left out.
    pub fn build_deck_with_report(
        &self,
        specs: &[SlideSpec],
        metadata: &DeckMetadata,
    ) -> Result<(Deck, BuildReport)> {
        let mut deck = Deck::new(metadata.slide_layout()?, deck_properties(metadata)?);
        let mut report = BuildReport::default();
        let total = specs.len();

        for (index, spec) in specs.iter().enumerate() {
            info!("Processing slide {}/{}: {}", index + 1, total, spec.id);

            let slide = match self.render_slide(spec) {
                Ok(slide) => slide,
                Err(e) => {
                    error!("Skipping slide '{}': {}", spec.id, e);
                    report.skipped.push(SkippedSlide {
                        index,
                        id: spec.id.clone(),
                        error: e,
                    });
                    continue;
                },
            };

            let slide_index = deck.push_slide(slide);
            if let Some(slide) = deck.slide_mut(slide_index) {
                self.apply_overlays(slide, spec, &mut report);
            }
            report.rendered.push(spec.id.clone());
        }

        Ok((deck, report))
    }

    /// Serialize the deck to `path`.
    pub fn write_deck(&self, deck: &Deck, path: &Path) -> Result<()> {
        write_deck(deck, path)
    }

    /// Render a spec's content into a detached slide.
    fn render_slide(&self, spec: &SlideSpec) -> Result<Slide> {
        let mut slide = Slide::new();

        let (background, elements) = match spec.content()? {
            ContentSource::Inline(elements) => (spec.background.clone(), elements.to_vec()),
            ContentSource::Fragment(path) => {
                let fragment = load_fragment(&self.resolve(path))?;
                (spec.background.clone().or(fragment.background), fragment.elements)
            },
        };

        if let Some(color) = background {
            slide.set_background(color_value(&color)?);
        }

        for element in &elements {
            match element {
                ElementDirective::Text(block) => {
                    let (paragraphs, format) = text_content(block)?;
                    slide.add_text_box(block.frame()?, paragraphs, format);
                },
                ElementDirective::Image(image) => {
                    slide.add_picture(&self.resolve(&image.path), image.frame()?, image_description(image)?)?;
                },
            }
        }

        Ok(slide)
    }

    fn apply_overlays(&self, slide: &mut Slide, spec: &SlideSpec, report: &mut BuildReport) {
        for overlay in &spec.overlays {
            if let Err(e) = self.add_overlay(slide, overlay) {
                warn!(
                    "Slide '{}': dropping overlay {}: {}",
                    spec.id,
                    overlay.path.display(),
                    e
                );
                report.dropped_overlays.push(DroppedOverlay {
                    slide_id: spec.id.clone(),
                    path: overlay.path.clone(),
                    error: e,
                });
            }
        }
    }

    fn add_overlay(&self, slide: &mut Slide, overlay: &ImageBlock) -> Result<()> {
        slide.add_picture(&self.resolve(&overlay.path), overlay.frame()?, image_description(overlay)?)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }
}

/// Serialize a deck to `path`.
///
/// Fails with an I/O error when the path is not writable. Nothing is left
/// at `path` on failure.
pub fn write_deck(deck: &Deck, path: &Path) -> Result<()> {
    PackageWriter::write(path, deck)
}

fn deck_properties(metadata: &DeckMetadata) -> Result<DeckProperties> {
    let mut properties = DeckProperties::new()
        .title(xml_text(&metadata.title)?)
        .creator(xml_text(&metadata.author)?)
        .language(xml_text(&metadata.language)?)
        .timestamped(Utc::now());
    if let Some(ref subject) = metadata.subject {
        properties = properties.subject(xml_text(subject)?);
    }
    Ok(properties)
}

/// Text that is written into a part verbatim (after escaping).
fn xml_text(text: &str) -> Result<&str> {
    match find_invalid_xml_char(text) {
        Some(c) => Err(DeckError::Render(format!(
            "Text contains character U+{:04X} which XML cannot carry",
            c as u32
        ))),
        None => Ok(text),
    }
}

fn image_description(image: &ImageBlock) -> Result<Option<String>> {
    image
        .description
        .as_deref()
        .map(|description| xml_text(description).map(str::to_string))
        .transpose()
}

fn color_value(color: &str) -> Result<String> {
    normalize_color(color).ok_or_else(|| DeckError::Render(format!("Invalid color '{}'", color)))
}

fn optional_color(color: &Option<String>) -> Result<Option<String>> {
    color.as_deref().map(color_value).transpose()
}

/// Paragraphs and box formatting of a text directive.
fn text_content(block: &TextBlock) -> Result<(Vec<Paragraph>, TextFormat)> {
    let paragraphs = match (&block.content, &block.items) {
        (Some(_), Some(_)) => {
            return Err(DeckError::Render(
                "Text block declares both content and items".to_string(),
            ));
        },
        (Some(content), None) if content.is_empty() => Vec::new(),
        (Some(content), None) => xml_text(content)?.split('\n').map(Paragraph::plain).collect(),
        (None, Some(items)) => items
            .iter()
            .map(|item| {
                Ok(Paragraph {
                    text: xml_text(&item.text)?.to_string(),
                    bullet: item.bullet,
                    color: optional_color(&item.color)?,
                })
            })
            .collect::<Result<Vec<_>>>()?,
        (None, None) => Vec::new(),
    };

    // DrawingML font sizes run from 1 to 4000 points
    if let Some(size) = block.font_size
        && !(1.0..=4000.0).contains(&size)
    {
        return Err(DeckError::Render(format!("Invalid font size {}", size)));
    }

    let format = TextFormat {
        font: block.font_face.as_deref().map(xml_text).transpose()?.map(str::to_string),
        size: block.font_size,
        bold: block.bold,
        italic: block.italic,
        color: optional_color(&block.color)?,
        align: block.align,
        anchor: block.valign,
        fill: optional_color(&block.fill)?,
    };

    Ok((paragraphs, format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::unit::inch_to_emu;
    use crate::manifest::TextItem;
    use crate::pptx::{BulletKind, Frame, ShapeKind};
    use proptest::prelude::*;
    use std::io::Read;

    /// Smallest valid PNG: 1x1 transparent pixel.
    const TINY_PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    const PROFILE_PNG: &str = "velocity_deficit_profile_I0.05_C16.0.png";

    fn metadata() -> DeckMetadata {
        DeckMetadata::new("Wake model", "Tester")
    }

    fn workspace() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PROFILE_PNG), TINY_PNG).unwrap();
        dir
    }

    fn three_slide_specs() -> Vec<SlideSpec> {
        vec![
            SlideSpec::inline(
                "title",
                vec![ElementDirective::Text(TextBlock::plain("Wake model", 0.5, 2.0, 9.0, 1.0))],
            )
            .with_background("1e3c72"),
            SlideSpec::inline(
                "objective-with-two-bullets",
                vec![ElementDirective::Text(TextBlock::list(
                    vec![
                        TextItem::new("Model the velocity deficit", BulletKind::Disc),
                        TextItem::new("Relate C to turbulence intensity", BulletKind::Disc),
                    ],
                    0.5,
                    1.2,
                    9.0,
                    3.0,
                ))],
            ),
            SlideSpec::inline("results-with-one-image", Vec::new())
                .with_overlay(ImageBlock::new(PROFILE_PNG, 5.2, 1.0, 4.2, 3.2)),
        ]
    }

    #[test]
    fn test_three_slide_deck() {
        let dir = workspace();
        let assembler = DeckAssembler::new(dir.path());
        let (deck, report) = assembler
            .build_deck_with_report(&three_slide_specs(), &metadata())
            .unwrap();

        assert!(report.is_clean());
        assert_eq!(deck.slide_count(), 3);

        let objective = deck.slide(1).unwrap();
        let text: Vec<_> = objective.text_boxes().collect();
        assert_eq!(text.len(), 1);
        assert_eq!(text[0].list_item_count(), 2);

        let results = deck.slide(2).unwrap();
        let pictures: Vec<_> = results.pictures().collect();
        assert_eq!(pictures.len(), 1);
        assert_eq!(
            pictures[0].frame(),
            Frame::new(inch_to_emu(5.2), inch_to_emu(1.0), inch_to_emu(4.2), inch_to_emu(3.2))
        );
        assert_eq!(deck.slide(0).unwrap().background(), Some("1E3C72"));
    }

    #[test]
    fn test_missing_image_element_skips_only_that_slide() {
        let dir = workspace();
        let assembler = DeckAssembler::new(dir.path());
        let mut specs = three_slide_specs();
        specs.insert(
            1,
            SlideSpec::inline(
                "broken",
                vec![ElementDirective::Image(ImageBlock::new("missing.png", 1.0, 1.0, 2.0, 2.0))],
            ),
        );

        let (deck, report) = assembler.build_deck_with_report(&specs, &metadata()).unwrap();
        assert_eq!(deck.slide_count(), 3);
        assert_eq!(report.rendered, ["title", "objective-with-two-bullets", "results-with-one-image"]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].index, 1);
        assert!(matches!(report.skipped[0].error, DeckError::MissingResource(_)));

        let output = dir.path().join("deck.pptx");
        assembler.write_deck(&deck, &output).unwrap();
        assert!(output.is_file());
    }

    #[test]
    fn test_missing_overlay_keeps_slide() {
        let dir = workspace();
        let assembler = DeckAssembler::new(dir.path());
        let specs = vec![
            SlideSpec::inline(
                "chart",
                vec![ElementDirective::Text(TextBlock::plain("Chart", 0.5, 0.3, 9.0, 0.8))],
            )
            .with_overlay(ImageBlock::new("nowhere.png", 5.2, 1.0, 4.2, 3.2)),
        ];

        let (deck, report) = assembler.build_deck_with_report(&specs, &metadata()).unwrap();
        assert_eq!(deck.slide_count(), 1);
        assert_eq!(deck.slide(0).unwrap().shape_count(), 1);
        assert_eq!(report.dropped_overlays.len(), 1);
        assert_eq!(report.dropped_overlays[0].path, PathBuf::from("nowhere.png"));
    }

    #[test]
    fn test_render_failures_skip_slide() {
        let assembler = DeckAssembler::new("/nonexistent");
        let mut both = SlideSpec::from_fragment("both", "a.xml");
        both.elements = Some(Vec::new());
        let mut bad_color = TextBlock::plain("x", 0.0, 0.0, 1.0, 1.0);
        bad_color.color = Some("blue".to_string());
        let specs = vec![
            both,
            SlideSpec::inline("bad-color", vec![ElementDirective::Text(bad_color)]),
            SlideSpec::from_fragment("no-fragment", "missing.xml"),
            SlideSpec::inline("ok", Vec::new()),
        ];

        let (deck, report) = assembler.build_deck_with_report(&specs, &metadata()).unwrap();
        assert_eq!(deck.slide_count(), 1);
        assert_eq!(report.rendered, ["ok"]);
        assert!(matches!(report.skipped[0].error, DeckError::Render(_)));
        assert!(matches!(report.skipped[1].error, DeckError::Render(_)));
        assert!(matches!(report.skipped[2].error, DeckError::MissingResource(_)));
    }

    #[test]
    fn test_bad_geometry_skips_slide() {
        let dir = workspace();
        let assembler = DeckAssembler::new(dir.path());
        let mut tiny_font = TextBlock::plain("x", 0.0, 0.0, 1.0, 1.0);
        tiny_font.font_size = Some(0.0);
        std::fs::write(
            dir.path().join("nan.xml"),
            r#"<slide><text x="NaN" y="0" w="1" h="1">x</text></slide>"#,
        )
        .unwrap();
        let specs = vec![
            SlideSpec::inline(
                "negative-width",
                vec![ElementDirective::Text(TextBlock::plain("x", 0.0, 0.0, -2.0, 1.0))],
            ),
            SlideSpec::inline("zero-font", vec![ElementDirective::Text(tiny_font)]),
            SlideSpec::from_fragment("nan-x", "nan.xml"),
            SlideSpec::inline(
                "infinite-image",
                vec![ElementDirective::Image(ImageBlock::new(PROFILE_PNG, 0.0, f64::INFINITY, 1.0, 1.0))],
            ),
            SlideSpec::inline(
                "ok",
                vec![ElementDirective::Text(TextBlock::plain("fine", 0.5, 0.5, 9.0, 1.0))],
            )
            .with_overlay(ImageBlock::new(PROFILE_PNG, 1.0, 1.0, 2.0, -3.0)),
        ];

        let (deck, report) = assembler.build_deck_with_report(&specs, &metadata()).unwrap();
        assert_eq!(report.rendered, ["ok"]);
        assert_eq!(report.skipped.len(), 4);
        assert!(report.skipped.iter().all(|s| matches!(s.error, DeckError::Render(_))));
        assert_eq!(report.dropped_overlays.len(), 1);
        assert_eq!(deck.slide(0).unwrap().shape_count(), 1);

        let output = dir.path().join("deck.pptx");
        write_deck(&deck, &output).unwrap();
        assert!(!read_slide_xml(&output, 1).contains("cx=\"-"));
    }

    #[test]
    fn test_control_characters_skip_slide() {
        let dir = workspace();
        let assembler = DeckAssembler::new(dir.path());
        std::fs::write(
            dir.path().join("ctrl.xml"),
            "<slide><text x=\"0\" y=\"0\" w=\"1\" h=\"1\">bell\u{7}here</text></slide>",
        )
        .unwrap();
        let mut bad_item = TextItem::new("ok", BulletKind::Disc);
        bad_item.text = "form\u{C}feed".to_string();
        let specs = vec![
            SlideSpec::inline(
                "first",
                vec![ElementDirective::Text(TextBlock::plain("before", 0.5, 0.5, 9.0, 1.0))],
            ),
            SlideSpec::inline(
                "bad-content",
                vec![ElementDirective::Text(TextBlock::plain("bad\u{1}char", 0.5, 0.5, 9.0, 1.0))],
            ),
            SlideSpec::inline(
                "bad-item",
                vec![ElementDirective::Text(TextBlock::list(vec![bad_item], 0.5, 0.5, 9.0, 1.0))],
            ),
            SlideSpec::from_fragment("bad-fragment", "ctrl.xml"),
            SlideSpec::inline(
                "last",
                vec![ElementDirective::Text(TextBlock::plain("tab\tok", 0.5, 0.5, 9.0, 1.0))],
            ),
        ];

        let (deck, report) = assembler.build_deck_with_report(&specs, &metadata()).unwrap();
        assert_eq!(report.rendered, ["first", "last"]);
        let skipped: Vec<_> = report.skipped.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(skipped, ["bad-content", "bad-item", "bad-fragment"]);

        let output = dir.path().join("deck.pptx");
        write_deck(&deck, &output).unwrap();
        for number in 1..=2 {
            let xml = read_slide_xml(&output, number);
            assert!(xml.chars().all(crate::common::xml::is_xml_char));
        }
    }

    #[test]
    fn test_control_character_in_metadata_fails_build() {
        let meta = DeckMetadata::new("Wake\u{0}model", "Tester");
        let err = DeckAssembler::default().build_deck(&[], &meta).unwrap_err();
        assert!(matches!(err, DeckError::Render(_)));
    }

    #[test]
    fn test_fragment_slide() {
        let dir = workspace();
        std::fs::write(
            dir.path().join("slide.xml"),
            format!(
                r#"<slide background="2a5298">
  <text x="0.5" y="0.3" w="9" h="0.8" font-size="28" color="ffffff">Findings</text>
  <text x="0.5" y="1.2" w="4.5" h="3"><item>one</item><item>two</item><item>three</item></text>
  <image src="{}" x="5.2" y="0.9" w="4.2" h="3.4"/>
</slide>"#,
                PROFILE_PNG
            ),
        )
        .unwrap();

        let assembler = DeckAssembler::new(dir.path());
        let deck = assembler
            .build_deck(&[SlideSpec::from_fragment("findings", "slide.xml")], &metadata())
            .unwrap();
        let slide = deck.slide(0).unwrap();
        assert_eq!(slide.background(), Some("2A5298"));
        assert_eq!(slide.text_boxes().count(), 2);
        assert_eq!(slide.pictures().count(), 1);
        assert_eq!(slide.shapes()[1].list_item_count(), 3);
        match slide.shapes()[0].kind() {
            ShapeKind::TextBox { format, .. } => assert_eq!(format.color.as_deref(), Some("FFFFFF")),
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_write_to_missing_parent_is_io_error() {
        let dir = workspace();
        let assembler = DeckAssembler::new(dir.path());
        let deck = assembler.build_deck(&three_slide_specs(), &metadata()).unwrap();

        let target = dir.path().join("no-such-dir").join("deck.pptx");
        let err = write_deck(&deck, &target).unwrap_err();
        assert!(matches!(err, DeckError::Io(_)));
        assert!(!target.exists());
        assert!(!target.with_file_name("deck.pptx.partial").exists());
    }

    #[test]
    fn test_repeated_builds_match() {
        let dir = workspace();
        let assembler = DeckAssembler::new(dir.path());
        let first = assembler.build_deck(&three_slide_specs(), &metadata()).unwrap();
        let second = assembler.build_deck(&three_slide_specs(), &metadata()).unwrap();

        assert_eq!(first.slide_count(), second.slide_count());
        for (a, b) in first.slides().iter().zip(second.slides()) {
            assert_eq!(a.shape_count(), b.shape_count());
        }

        let out_a = dir.path().join("a.pptx");
        let out_b = dir.path().join("b.pptx");
        write_deck(&first, &out_a).unwrap();
        write_deck(&second, &out_b).unwrap();
        assert_eq!(read_slide_xml(&out_a, 3), read_slide_xml(&out_b, 3));
    }

    fn read_slide_xml(path: &Path, number: usize) -> String {
        let file = std::fs::File::open(path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut entry = archive.by_name(&format!("ppt/slides/slide{}.xml", number)).unwrap();
        let mut xml = String::new();
        entry.read_to_string(&mut xml).unwrap();
        xml
    }

    #[test]
    fn test_unknown_layout_fails_build() {
        let mut meta = metadata();
        meta.layout = "LAYOUT_PORTRAIT".to_string();
        let err = DeckAssembler::default().build_deck(&[], &meta).unwrap_err();
        assert!(matches!(err, DeckError::Manifest(_)));
    }

    #[test]
    fn test_shipped_manifest_builds() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("presentation/deck.yaml");
        let manifest = Manifest::load(&path).unwrap();
        let assembler = DeckAssembler::for_manifest(&manifest);
        let (deck, report) = assembler
            .build_deck_with_report(&manifest.slides, &manifest.metadata)
            .unwrap();

        assert!(report.skipped.is_empty(), "{:?}", report.skipped);
        assert_eq!(deck.slide_count(), 12);
        assert_eq!(deck.properties().run_language(), "ja-JP");

        let title = deck.slide(0).unwrap();
        assert_eq!(title.background(), Some("1E3C72"));
        assert_eq!(title.shapes()[0].paragraphs().unwrap().len(), 2);

        let fitting = deck.slide(4).unwrap();
        assert_eq!(fitting.shapes()[2].list_item_count(), 4);
    }

    proptest! {
        #[test]
        fn prop_rendered_slides_keep_declaration_order(
            broken in proptest::collection::vec(any::<bool>(), 0..12)
        ) {
            let dir = workspace();
            let assembler = DeckAssembler::new(dir.path());
            let specs: Vec<SlideSpec> = broken
                .iter()
                .enumerate()
                .map(|(i, &is_broken)| {
                    let id = format!("slide-{}", i);
                    if is_broken {
                        SlideSpec::inline(
                            id,
                            vec![ElementDirective::Image(ImageBlock::new("absent.png", 0.0, 0.0, 1.0, 1.0))],
                        )
                    } else {
                        SlideSpec::inline(
                            id.clone(),
                            vec![ElementDirective::Text(TextBlock::plain(id, 0.0, 0.0, 1.0, 1.0))],
                        )
                    }
                })
                .collect();

            let (deck, report) = assembler.build_deck_with_report(&specs, &metadata()).unwrap();
            let expected: Vec<String> = broken
                .iter()
                .enumerate()
                .filter(|&(_, &is_broken)| !is_broken)
                .map(|(i, _)| format!("slide-{}", i))
                .collect();

            prop_assert_eq!(deck.slide_count(), expected.len());
            prop_assert_eq!(&report.rendered, &expected);
            for (slide, id) in deck.slides().iter().zip(&expected) {
                let text = slide.shapes()[0].paragraphs().unwrap()[0].text.clone();
                prop_assert_eq!(&text, id);
            }
            prop_assert_eq!(report.skipped.len(), broken.len() - expected.len());
        }
    }
}
