//! Reads the drawable content of a written deck back out of its package.
//!
//! Only what the thumbnail rasterizer needs is extracted: the slide size,
//! slide order, background colors, text box frames and colors, and picture
//! frames with their media bytes.

use crate::common::error::{DeckError, Result};
use crate::pptx::Frame;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::io::{Read, Seek};
use zip::ZipArchive;

/// RGB triple.
pub type Rgb = [u8; 3];

/// Drawable summary of a deck.
#[derive(Debug, Clone, Default)]
pub struct PreviewDeck {
    pub width_emu: i64,
    pub height_emu: i64,
    pub slides: Vec<PreviewSlide>,
}

#[derive(Debug, Clone, Default)]
pub struct PreviewSlide {
    pub background: Option<Rgb>,
    pub shapes: Vec<PreviewShape>,
}

#[derive(Debug, Clone)]
pub enum PreviewShape {
    Text {
        frame: Frame,
        fill: Option<Rgb>,
        /// One entry per paragraph: the first run color, if any
        paragraphs: Vec<Option<Rgb>>,
        /// Text color shared by the box
        color: Option<Rgb>,
    },
    Picture {
        frame: Frame,
        data: Vec<u8>,
    },
}

/// Read a deck package.
pub fn read_deck<R: Read + Seek>(reader: R) -> Result<PreviewDeck> {
    let mut archive = ZipArchive::new(reader)?;

    let presentation = read_entry(&mut archive, "ppt/presentation.xml")?;
    let (width_emu, height_emu, slide_rel_ids) = parse_presentation(&presentation)?;

    let pres_rels = parse_rels(&read_entry(&mut archive, "ppt/_rels/presentation.xml.rels")?)?;

    let mut slides = Vec::with_capacity(slide_rel_ids.len());
    for rel_id in &slide_rel_ids {
        let target = pres_rels
            .get(rel_id)
            .ok_or_else(|| DeckError::Xml(format!("Slide relationship {} not found", rel_id)))?;
        let partname = resolve_target("ppt", target);
        slides.push(read_slide(&mut archive, &partname)?);
    }

    Ok(PreviewDeck {
        width_emu,
        height_emu,
        slides,
    })
}

fn read_slide<R: Read + Seek>(archive: &mut ZipArchive<R>, partname: &str) -> Result<PreviewSlide> {
    let (dir, file) = partname.rsplit_once('/').unwrap_or(("", partname));
    let rels_name = format!("{}/_rels/{}.rels", dir, file);
    let has_rels = archive.by_name(&rels_name).is_ok();
    let rels = if has_rels {
        parse_rels(&read_entry(archive, &rels_name)?)?
    } else {
        HashMap::new()
    };

    let xml = read_entry(archive, partname)?;
    let parsed = parse_slide(&xml)?;

    let mut shapes = Vec::with_capacity(parsed.shapes.len());
    for shape in parsed.shapes {
        shapes.push(match shape {
            ParsedShape::Text(text) => text,
            ParsedShape::Picture { frame, embed } => {
                let target = rels
                    .get(&embed)
                    .ok_or_else(|| DeckError::Xml(format!("Image relationship {} not found", embed)))?;
                let media = resolve_target(dir, target);
                PreviewShape::Picture {
                    frame,
                    data: read_bytes(archive, &media)?,
                }
            },
        });
    }

    Ok(PreviewSlide {
        background: parsed.background,
        shapes,
    })
}

fn read_bytes<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Vec<u8>> {
    let mut file = archive.by_name(name)?;
    let mut data = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut data)?;
    Ok(data)
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    let data = read_bytes(archive, name)?;
    String::from_utf8(data).map_err(|e| DeckError::Xml(format!("{}: {}", name, e)))
}

/// Resolve a relationship target against the directory of its source part.
fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            ".." => {
                segments.pop();
            },
            "." | "" => {},
            other => segments.push(other),
        }
    }
    segments.join("/")
}

fn attr_value(e: &BytesStart, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn emu_attr(e: &BytesStart, key: &[u8]) -> Result<i64> {
    let value = attr_value(e, key)?.unwrap_or_default();
    value
        .parse::<i64>()
        .map_err(|_| DeckError::Xml(format!("Invalid coordinate '{}'", value)))
}

fn parse_hex(value: &str) -> Option<Rgb> {
    if value.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&value[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Slide size and ordered slide relationship IDs.
fn parse_presentation(xml: &str) -> Result<(i64, i64, Vec<String>)> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut size = None;
    let mut slide_ids = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"p:sldSz" => size = Some((emu_attr(e, b"cx")?, emu_attr(e, b"cy")?)),
                b"p:sldId" => {
                    if let Some(id) = attr_value(e, b"r:id")? {
                        slide_ids.push(id);
                    }
                },
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DeckError::Xml(format!("presentation.xml parse error: {}", e)));
            },
            _ => {},
        }
        buf.clear();
    }

    let (cx, cy) = size.ok_or_else(|| DeckError::Xml("presentation.xml has no slide size".to_string()))?;
    Ok((cx, cy, slide_ids))
}

/// Map of relationship ID to target.
fn parse_rels(xml: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut rels = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attr_value(e, b"Id")?, attr_value(e, b"Target")?) {
                    rels.insert(id, target);
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(DeckError::Xml(format!("Relationships parse error: {}", e))),
            _ => {},
        }
        buf.clear();
    }

    Ok(rels)
}

enum ParsedShape {
    Text(PreviewShape),
    Picture { frame: Frame, embed: String },
}

#[derive(Default)]
struct ParsedSlide {
    background: Option<Rgb>,
    shapes: Vec<ParsedShape>,
}

/// Where the parser is inside the slide tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Background,
    ShapeProperties,
    RunProperties,
    Other,
}

#[derive(Default)]
struct OpenShape {
    picture: bool,
    frame: Frame,
    fill: Option<Rgb>,
    color: Option<Rgb>,
    paragraphs: Vec<Option<Rgb>>,
    embed: Option<String>,
}

fn parse_slide(xml: &str) -> Result<ParsedSlide> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut slide = ParsedSlide::default();
    let mut scopes: Vec<Scope> = Vec::new();
    let mut shape: Option<OpenShape> = None;

    loop {
        let event = match reader.read_event_into(&mut buf) {
            Ok(event) => event,
            Err(e) => return Err(DeckError::Xml(format!("Slide parse error: {}", e))),
        };

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let scope = scopes.last().copied().unwrap_or(Scope::Other);
                let name = e.name();

                match name.as_ref() {
                    b"p:sp" | b"p:pic" => {
                        shape = Some(OpenShape {
                            picture: name.as_ref() == b"p:pic",
                            ..Default::default()
                        });
                    },
                    b"a:off" if scope == Scope::ShapeProperties => {
                        if let Some(ref mut open) = shape {
                            open.frame.x = emu_attr(e, b"x")?;
                            open.frame.y = emu_attr(e, b"y")?;
                        }
                    },
                    b"a:ext" if scope == Scope::ShapeProperties => {
                        if let Some(ref mut open) = shape {
                            open.frame.width = emu_attr(e, b"cx")?;
                            open.frame.height = emu_attr(e, b"cy")?;
                        }
                    },
                    b"a:p" => {
                        if let Some(ref mut open) = shape {
                            open.paragraphs.push(None);
                        }
                    },
                    b"a:blip" => {
                        if let Some(ref mut open) = shape {
                            open.embed = attr_value(e, b"r:embed")?;
                        }
                    },
                    b"a:srgbClr" => {
                        let color = attr_value(e, b"val")?.as_deref().and_then(parse_hex);
                        apply_color(scope, color, &mut slide, shape.as_mut());
                    },
                    _ => {},
                }

                if matches!(event, Event::Start(_)) {
                    // Children inherit the enclosing scope
                    scopes.push(match name.as_ref() {
                        b"p:bg" => Scope::Background,
                        b"p:spPr" => Scope::ShapeProperties,
                        b"a:rPr" => Scope::RunProperties,
                        b"p:sp" | b"p:pic" => Scope::Other,
                        _ => scope,
                    });
                }
            },
            Event::End(ref e) => {
                scopes.pop();
                if matches!(e.name().as_ref(), b"p:sp" | b"p:pic")
                    && let Some(open) = shape.take()
                {
                    slide.shapes.push(finish_shape(open)?);
                }
            },
            Event::Eof => break,
            _ => {},
        }
        buf.clear();
    }

    Ok(slide)
}

fn apply_color(scope: Scope, color: Option<Rgb>, slide: &mut ParsedSlide, shape: Option<&mut OpenShape>) {
    match (scope, shape) {
        (Scope::Background, _) => slide.background = color,
        (Scope::ShapeProperties, Some(open)) => open.fill = color,
        (Scope::RunProperties, Some(open)) => {
            if open.color.is_none() {
                open.color = color;
            }
            if let Some(last) = open.paragraphs.last_mut()
                && last.is_none()
            {
                *last = color;
            }
        },
        _ => {},
    }
}

fn finish_shape(open: OpenShape) -> Result<ParsedShape> {
    if open.picture {
        let embed = open
            .embed
            .ok_or_else(|| DeckError::Xml("Picture without an embedded image".to_string()))?;
        Ok(ParsedShape::Picture {
            frame: open.frame,
            embed,
        })
    } else {
        Ok(ParsedShape::Text(PreviewShape::Text {
            frame: open.frame,
            fill: open.fill,
            paragraphs: open.paragraphs,
            color: open.color,
        }))
    }
}
