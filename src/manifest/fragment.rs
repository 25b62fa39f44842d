//! Slide markup fragments.
//!
//! A fragment is a small XML document describing one slide:
//!
//! ```xml
//! <slide background="1e3c72">
//!   <text x="0.5" y="0.3" w="9" h="0.8" font-size="28" bold="true" color="FFFFFF">
//!     Title text
//!   </text>
//!   <text x="0.5" y="1.2" w="4.5" h="3">
//!     <item>First point</item>
//!     <item bullet="number" color="e74c3c">Second point</item>
//!     <p>Plain paragraph</p>
//!   </text>
//!   <image src="images/plot.png" x="5.2" y="1" w="4.2" h="3.2" alt="Plot"/>
//! </slide>
//! ```
//!
//! Fragments expand into the same [`ElementDirective`]s as inline manifest
//! content. Character content of a `<text>` element becomes one plain
//! paragraph per non-empty line.

use super::{ElementDirective, ImageBlock, TextBlock, TextItem};
use crate::common::error::{DeckError, Result};
use crate::common::xml::find_invalid_xml_char;
use crate::pptx::{BulletKind, TextAlign, VerticalAnchor};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::path::{Path, PathBuf};

/// A parsed fragment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub background: Option<String>,
    pub elements: Vec<ElementDirective>,
}

/// Read and parse a fragment file.
pub fn load_fragment(path: &Path) -> Result<Fragment> {
    if !path.is_file() {
        return Err(DeckError::MissingResource(path.to_path_buf()));
    }
    let xml = std::fs::read_to_string(path)?;
    parse_fragment(&xml).map_err(|e| match e {
        DeckError::Render(msg) => DeckError::Render(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

/// The text block currently being filled.
struct OpenText {
    block: TextBlock,
    content: String,
    items: Vec<TextItem>,
    item: Option<TextItem>,
}

impl OpenText {
    fn push_text(&mut self, text: &str) -> Result<()> {
        if let Some(c) = find_invalid_xml_char(text) {
            return Err(render_err(&format!("Text contains control character U+{:04X}", c as u32)));
        }
        match self.item {
            Some(ref mut item) => item.text.push_str(text),
            None => self.content.push_str(text),
        }
        Ok(())
    }

    fn finish(mut self) -> Result<TextBlock> {
        let content = self
            .content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        match (content.is_empty(), self.items.is_empty()) {
            (false, false) => {
                return Err(DeckError::Render(
                    "<text> mixes character content with <item>/<p> children".to_string(),
                ));
            },
            (false, true) => self.block.content = Some(content),
            (true, false) => self.block.items = Some(self.items),
            (true, true) => self.block.content = Some(String::new()),
        }
        Ok(self.block)
    }
}

/// Parse fragment markup into slide elements.
///
/// Malformed XML, unknown elements, missing or non-numeric coordinates and
/// invalid enumerated values are all render failures.
pub fn parse_fragment(xml: &str) -> Result<Fragment> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut fragment = Fragment::default();
    let mut in_slide = false;
    let mut closed = false;
    let mut text: Option<OpenText> = None;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            DeckError::Render(format!(
                "Malformed fragment at byte {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                let name = e.local_name();
                match name.as_ref() {
                    b"slide" => {
                        if in_slide || closed {
                            return Err(render_err("<slide> must be the single root element"));
                        }
                        fragment.background = attr(e, "background")?;
                        in_slide = !is_empty;
                        closed = is_empty;
                    },
                    b"text" => {
                        require_slide(in_slide, text.is_some(), "text")?;
                        let open = OpenText {
                            block: parse_text_attrs(e)?,
                            content: String::new(),
                            items: Vec::new(),
                            item: None,
                        };
                        if is_empty {
                            fragment.elements.push(ElementDirective::Text(open.finish()?));
                        } else {
                            text = Some(open);
                        }
                    },
                    b"item" | b"p" => {
                        let open = text
                            .as_mut()
                            .ok_or_else(|| render_err("<item> and <p> are only allowed inside <text>"))?;
                        if open.item.is_some() {
                            return Err(render_err("<item> elements cannot be nested"));
                        }
                        let default_bullet = if name.as_ref() == b"p" {
                            BulletKind::None
                        } else {
                            BulletKind::Disc
                        };
                        let bullet = match attr(e, "bullet")? {
                            Some(value) => BulletKind::from_name(&value)
                                .ok_or_else(|| render_err(&format!("Unknown bullet kind '{}'", value)))?,
                            None => default_bullet,
                        };
                        let item = TextItem {
                            text: String::new(),
                            bullet,
                            color: attr(e, "color")?,
                        };
                        if is_empty {
                            open.items.push(item);
                        } else {
                            open.item = Some(item);
                        }
                    },
                    b"image" => {
                        require_slide(in_slide, text.is_some(), "image")?;
                        let image = parse_image_attrs(e)?;
                        fragment.elements.push(ElementDirective::Image(image));
                        if !is_empty {
                            // Skip to the matching end tag; images carry no content
                            reader
                                .read_to_end_into(e.name(), &mut Vec::new())
                                .map_err(|err| render_err(&err.to_string()))?;
                        }
                    },
                    other => {
                        return Err(render_err(&format!(
                            "Unknown element <{}>",
                            String::from_utf8_lossy(other)
                        )));
                    },
                }
            },
            Event::End(ref e) => match e.local_name().as_ref() {
                b"slide" => {
                    in_slide = false;
                    closed = true;
                },
                b"text" => {
                    if let Some(open) = text.take() {
                        fragment.elements.push(ElementDirective::Text(open.finish()?));
                    }
                },
                b"item" | b"p" => {
                    if let Some(ref mut open) = text
                        && let Some(mut item) = open.item.take()
                    {
                        item.text = item.text.trim().to_string();
                        open.items.push(item);
                    }
                },
                _ => {},
            },
            Event::Text(ref t) => {
                let raw = String::from_utf8_lossy(t);
                match text {
                    Some(ref mut open) => open.push_text(&raw)?,
                    None if raw.trim().is_empty() => {},
                    None => return Err(render_err("Character content outside <text>")),
                }
            },
            Event::CData(ref t) => {
                let raw = String::from_utf8_lossy(t);
                match text {
                    Some(ref mut open) => open.push_text(&raw)?,
                    None => return Err(render_err("Character content outside <text>")),
                }
            },
            Event::GeneralRef(ref r) => {
                let resolved = match r.resolve_char_ref() {
                    Ok(Some(ch)) => ch.to_string(),
                    Ok(None) => {
                        let name = r.decode().map_err(|e| render_err(&e.to_string()))?;
                        quick_xml::escape::resolve_predefined_entity(&name)
                            .ok_or_else(|| render_err(&format!("Unknown entity &{};", name)))?
                            .to_string()
                    },
                    Err(e) => return Err(render_err(&e.to_string())),
                };
                match text {
                    Some(ref mut open) => open.push_text(&resolved)?,
                    None => return Err(render_err("Character content outside <text>")),
                }
            },
            Event::Eof => break,
            _ => {},
        }
        buf.clear();
    }

    if !closed {
        return Err(render_err("Fragment has no complete <slide> element"));
    }
    Ok(fragment)
}

fn render_err(msg: &str) -> DeckError {
    DeckError::Render(msg.to_string())
}

fn require_slide(in_slide: bool, in_text: bool, element: &str) -> Result<()> {
    if !in_slide {
        return Err(render_err(&format!("<{}> must be inside <slide>", element)));
    }
    if in_text {
        return Err(render_err(&format!("<{}> cannot be nested in <text>", element)));
    }
    Ok(())
}

fn attr(e: &BytesStart, key: &str) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| render_err(&err.to_string()))?;
        if attr.key.as_ref() == key.as_bytes() {
            let value = attr
                .unescape_value()
                .map_err(|err| render_err(&err.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn number_attr(e: &BytesStart, key: &str) -> Result<Option<f64>> {
    match attr(e, key)? {
        Some(value) => value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .map(Some)
            .ok_or_else(|| render_err(&format!("Attribute {}=\"{}\" is not a number", key, value))),
        None => Ok(None),
    }
}

fn required_number(e: &BytesStart, key: &str) -> Result<f64> {
    number_attr(e, key)?.ok_or_else(|| {
        render_err(&format!(
            "<{}> is missing the {} attribute",
            String::from_utf8_lossy(e.local_name().as_ref()),
            key
        ))
    })
}

fn bool_attr(e: &BytesStart, key: &str) -> Result<bool> {
    match attr(e, key)?.as_deref() {
        None | Some("false") | Some("0") => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some(other) => Err(render_err(&format!("Attribute {}=\"{}\" is not a boolean", key, other))),
    }
}

fn parse_text_attrs(e: &BytesStart) -> Result<TextBlock> {
    let align = match attr(e, "align")? {
        Some(value) => Some(
            TextAlign::from_name(&value).ok_or_else(|| render_err(&format!("Unknown alignment '{}'", value)))?,
        ),
        None => None,
    };
    let valign = match attr(e, "valign")? {
        Some(value) => Some(
            VerticalAnchor::from_name(&value)
                .ok_or_else(|| render_err(&format!("Unknown vertical anchor '{}'", value)))?,
        ),
        None => None,
    };

    Ok(TextBlock {
        content: None,
        items: None,
        x: required_number(e, "x")?,
        y: required_number(e, "y")?,
        w: required_number(e, "w")?,
        h: required_number(e, "h")?,
        font_size: number_attr(e, "font-size")?,
        font_face: attr(e, "font-face")?,
        color: attr(e, "color")?,
        bold: bool_attr(e, "bold")?,
        italic: bool_attr(e, "italic")?,
        align,
        valign,
        fill: attr(e, "fill")?,
    })
}

fn parse_image_attrs(e: &BytesStart) -> Result<ImageBlock> {
    let src = attr(e, "src")?.ok_or_else(|| render_err("<image> is missing the src attribute"))?;
    Ok(ImageBlock {
        path: PathBuf::from(src),
        x: required_number(e, "x")?,
        y: required_number(e, "y")?,
        w: required_number(e, "w")?,
        h: required_number(e, "h")?,
        description: attr(e, "alt")?,
    })
}
