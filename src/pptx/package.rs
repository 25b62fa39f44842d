//! Package writer for decks.
//!
//! Serializes a [`Deck`] into an OPC package: `[Content_Types].xml`, the
//! package relationships, document properties, the presentation part with its
//! master, layout and theme, one part per slide and the embedded media, all
//! inside a ZIP container.

use crate::common::error::{DeckError, Result};
use crate::pptx::constants::content_type as ct;
use crate::pptx::constants::relationship_type as rt;
use crate::pptx::rels::Relationships;
use crate::pptx::template;
use crate::pptx::writer::Deck;
use crate::pptx::writer::relmap::RelationshipMapper;
use log::debug;
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const PRESENTATION_PART: &str = "ppt/presentation.xml";
const SLIDE_MASTER_PART: &str = "ppt/slideMasters/slideMaster1.xml";
const SLIDE_LAYOUT_PART: &str = "ppt/slideLayouts/slideLayout1.xml";
const THEME_PART: &str = "ppt/theme/theme1.xml";

/// One part of the package, named without the leading slash.
struct PackagePart {
    partname: String,
    content_type: String,
    blob: Vec<u8>,
    rels: Option<Relationships>,
}

impl PackagePart {
    fn xml(partname: impl Into<String>, content_type: &str, xml: impl Into<String>) -> Self {
        Self {
            partname: partname.into(),
            content_type: content_type.to_string(),
            blob: xml.into().into_bytes(),
            rels: None,
        }
    }

    fn with_rels(mut self, rels: Relationships) -> Self {
        self.rels = Some(rels);
        self
    }

    /// Relationship part name, e.g. `ppt/slides/_rels/slide1.xml.rels`.
    fn rels_partname(&self) -> String {
        match self.partname.rsplit_once('/') {
            Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
            None => format!("_rels/{}.rels", self.partname),
        }
    }

    fn is_media(&self) -> bool {
        self.partname.starts_with("ppt/media/")
    }
}

/// Package writer that serializes a deck to a `.pptx` file.
///
/// # Example
///
/// ```no_run
/// use deckgen::pptx::{Deck, PackageWriter};
///
/// let deck = Deck::default();
/// PackageWriter::write("output.pptx", &deck)?;
/// # Ok::<(), deckgen::DeckError>(())
/// ```
pub struct PackageWriter;

impl PackageWriter {
    /// Write a deck to a file.
    ///
    /// The package is serialized completely before anything touches the
    /// filesystem, then written to a sibling `.partial` file that is renamed
    /// over `path`. On failure the partial file is removed.
    pub fn write<P: AsRef<Path>>(path: P, deck: &Deck) -> Result<()> {
        let path = path.as_ref();
        let bytes = Self::to_bytes(deck)?;
        let partial = partial_path(path)?;

        if let Err(e) = std::fs::write(&partial, &bytes) {
            let _ = std::fs::remove_file(&partial);
            return Err(e.into());
        }
        if let Err(e) = std::fs::rename(&partial, path) {
            let _ = std::fs::remove_file(&partial);
            return Err(e.into());
        }

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    /// Write a deck to a stream.
    pub fn write_to_stream<W: Write>(mut writer: W, deck: &Deck) -> Result<()> {
        let bytes = Self::to_bytes(deck)?;
        writer.write_all(&bytes)?;
        Ok(())
    }

    /// Serialize a deck to the bytes of a `.pptx` file.
    pub fn to_bytes(deck: &Deck) -> Result<Vec<u8>> {
        let parts = Self::build_parts(deck)?;
        let mut pkg_rels = Relationships::new();
        pkg_rels.get_or_add(rt::OFFICE_DOCUMENT, PRESENTATION_PART);
        pkg_rels.get_or_add(rt::CORE_PROPERTIES, "docProps/core.xml");
        pkg_rels.get_or_add(rt::EXTENDED_PROPERTIES, "docProps/app.xml");

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        // Media is already compressed
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        let content_types = ContentTypesItem::from_parts(&parts).to_xml();
        Self::write_entry(&mut zip, CONTENT_TYPES_PART, content_types.as_bytes(), deflated)?;
        Self::write_entry(&mut zip, "_rels/.rels", pkg_rels.to_xml().as_bytes(), deflated)?;

        for part in &parts {
            let options = if part.is_media() { stored } else { deflated };
            Self::write_entry(&mut zip, &part.partname, &part.blob, options)?;

            if let Some(ref rels) = part.rels
                && !rels.is_empty()
            {
                Self::write_entry(&mut zip, &part.rels_partname(), rels.to_xml().as_bytes(), deflated)?;
            }
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    fn write_entry(
        zip: &mut ZipWriter<Cursor<Vec<u8>>>,
        name: &str,
        blob: &[u8],
        options: SimpleFileOptions,
    ) -> Result<()> {
        debug!("Writing part {} ({} bytes)", name, blob.len());
        zip.start_file(name, options)?;
        zip.write_all(blob)?;
        Ok(())
    }

    /// Build every part of the package except the content types and the
    /// package relationships.
    fn build_parts(deck: &Deck) -> Result<Vec<PackagePart>> {
        let properties = deck.properties();
        let lang = properties.run_language();
        let mut parts = Vec::with_capacity(10 + deck.slide_count() * 2);

        parts.push(PackagePart::xml(
            "docProps/core.xml",
            ct::OPC_CORE_PROPERTIES,
            properties.to_core_xml(),
        ));
        parts.push(PackagePart::xml(
            "docProps/app.xml",
            ct::OFC_EXTENDED_PROPERTIES,
            properties.to_app_xml(deck.slide_count(), deck.layout().format_label),
        ));

        // Media parts first so slides can reference them by relationship ID
        let mut rel_mapper = RelationshipMapper::new();
        let mut slide_rels: Vec<Relationships> = (0..deck.slide_count())
            .map(|_| {
                let mut rels = Relationships::new();
                rels.get_or_add(rt::SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");
                rels
            })
            .collect();

        let mut per_slide_counter: HashMap<usize, usize> = HashMap::new();
        for (media_index, (slide_index, data, format)) in
            deck.collect_all_images().into_iter().enumerate()
        {
            let media_name = format!("image{}.{}", media_index + 1, format.extension());
            parts.push(PackagePart {
                partname: format!("ppt/media/{}", media_name),
                content_type: format.mime_type().to_string(),
                blob: data.to_vec(),
                rels: None,
            });

            let rel_id = slide_rels[slide_index].get_or_add(rt::IMAGE, &format!("../media/{}", media_name));
            let image_index = per_slide_counter.entry(slide_index).or_insert(0);
            rel_mapper.add_image(slide_index, *image_index, rel_id);
            *image_index += 1;
        }

        let mut pres_rels = Relationships::new();
        let master_rel_id = pres_rels.get_or_add(rt::SLIDE_MASTER, "slideMasters/slideMaster1.xml");

        let mut slide_rel_ids = Vec::with_capacity(deck.slide_count());
        for (slide_index, (slide, rels)) in deck.slides().iter().zip(slide_rels).enumerate() {
            let partname = format!("slides/slide{}.xml", slide_index + 1);
            slide_rel_ids.push(pres_rels.get_or_add(rt::SLIDE, &partname));

            let image_ids = rel_mapper.image_ids_for_slide(slide_index, slide.pictures().count());
            let xml = slide.to_xml(lang, &image_ids)?;
            parts.push(PackagePart::xml(format!("ppt/{}", partname), ct::PML_SLIDE, xml).with_rels(rels));
        }

        pres_rels.get_or_add(rt::PRES_PROPS, "presProps.xml");
        pres_rels.get_or_add(rt::VIEW_PROPS, "viewProps.xml");
        pres_rels.get_or_add(rt::THEME, "theme/theme1.xml");
        pres_rels.get_or_add(rt::TABLE_STYLES, "tableStyles.xml");

        let presentation_xml = deck.generate_presentation_xml(&master_rel_id, &slide_rel_ids)?;
        parts.push(
            PackagePart::xml(PRESENTATION_PART, ct::PML_PRESENTATION_MAIN, presentation_xml)
                .with_rels(pres_rels),
        );

        let mut master_rels = Relationships::new();
        master_rels.get_or_add(rt::SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");
        master_rels.get_or_add(rt::THEME, "../theme/theme1.xml");
        parts.push(
            PackagePart::xml(SLIDE_MASTER_PART, ct::PML_SLIDE_MASTER, template::default_slide_master_xml())
                .with_rels(master_rels),
        );

        let mut layout_rels = Relationships::new();
        layout_rels.get_or_add(rt::SLIDE_MASTER, "../slideMasters/slideMaster1.xml");
        parts.push(
            PackagePart::xml(SLIDE_LAYOUT_PART, ct::PML_SLIDE_LAYOUT, template::blank_slide_layout_xml())
                .with_rels(layout_rels),
        );

        parts.push(PackagePart::xml(THEME_PART, ct::OFC_THEME, template::default_theme_xml()));
        parts.push(PackagePart::xml(
            "ppt/presProps.xml",
            ct::PML_PRES_PROPS,
            template::default_pres_props_xml(),
        ));
        parts.push(PackagePart::xml(
            "ppt/viewProps.xml",
            ct::PML_VIEW_PROPS,
            template::default_view_props_xml(),
        ));
        parts.push(PackagePart::xml(
            "ppt/tableStyles.xml",
            ct::PML_TABLE_STYLES,
            template::default_table_styles_xml(),
        ));

        Ok(parts)
    }
}

/// `output.pptx` becomes `output.pptx.partial` in the same directory.
fn partial_path(path: &Path) -> Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        DeckError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("Output path has no file name: {}", path.display()),
        ))
    })?;
    let mut partial = file_name.to_os_string();
    partial.push(".partial");
    Ok(path.with_file_name(partial))
}

/// Helper for building [Content_Types].xml content.
///
/// Manages Default and Override elements for content type mapping.
struct ContentTypesItem {
    /// Default content types by extension
    defaults: HashMap<String, String>,
    /// Override content types by partname
    overrides: HashMap<String, String>,
}

impl ContentTypesItem {
    fn new() -> Self {
        let mut defaults = HashMap::new();
        defaults.insert("rels".to_string(), ct::OPC_RELATIONSHIPS.to_string());
        defaults.insert("xml".to_string(), ct::XML.to_string());

        Self {
            defaults,
            overrides: HashMap::new(),
        }
    }

    fn from_parts(parts: &[PackagePart]) -> Self {
        let mut cti = Self::new();
        for part in parts {
            cti.add_content_type(&part.partname, &part.content_type);
        }
        cti
    }

    /// Use a default mapping for media extensions, an override for
    /// everything else.
    fn add_content_type(&mut self, partname: &str, content_type: &str) {
        let ext = partname.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");

        if content_type.starts_with("image/") {
            self.defaults
                .insert(ext.to_string(), content_type.to_string());
        } else {
            self.overrides
                .insert(format!("/{}", partname), content_type.to_string());
        }
    }

    /// Generate the XML for [Content_Types].xml.
    fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(4096);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );

        // Sorted for stable output
        let mut exts: Vec<_> = self.defaults.keys().collect();
        exts.sort();
        for ext in exts {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                ext, self.defaults[ext]
            ));
        }

        let mut partnames: Vec<_> = self.overrides.keys().collect();
        partnames.sort();
        for partname in partnames {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                partname, self.overrides[partname]
            ));
        }

        xml.push_str("</Types>");
        xml
    }
}
