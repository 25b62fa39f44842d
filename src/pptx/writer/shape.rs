/// Shape types and XML generation for slides.
use crate::common::error::Result;
use crate::common::unit::pt_to_centipoints;
use crate::common::xml::escape_xml;
use std::fmt::Write as FmtWrite;

pub use super::super::format::{BulletKind, ImageFormat, Paragraph, TextFormat};

// Left margin and hanging indent for list paragraphs, in EMUs
const LIST_MARGIN: i64 = 342_900;
const LIST_INDENT: i64 = -342_900;

/// Absolute position and size of a shape, in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Frame {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl Frame {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn write_xfrm(&self, xml: &mut String) -> Result<()> {
        xml.push_str("<a:xfrm>");
        write!(xml, r#"<a:off x="{}" y="{}"/>"#, self.x, self.y)?;
        write!(xml, r#"<a:ext cx="{}" cy="{}"/>"#, self.width, self.height)?;
        xml.push_str("</a:xfrm>");
        Ok(())
    }
}

/// A shape on a slide.
#[derive(Debug, Clone)]
pub struct Shape {
    /// Shape ID, unique within its slide
    pub(crate) shape_id: u32,
    pub(crate) frame: Frame,
    pub(crate) kind: ShapeKind,
}

#[derive(Debug, Clone)]
pub enum ShapeKind {
    TextBox {
        paragraphs: Vec<Paragraph>,
        format: TextFormat,
    },
    Picture {
        data: Vec<u8>,
        format: ImageFormat,
        description: String,
    },
}

impl Shape {
    pub(crate) fn new_text_box(
        shape_id: u32,
        frame: Frame,
        paragraphs: Vec<Paragraph>,
        format: TextFormat,
    ) -> Self {
        Self {
            shape_id,
            frame,
            kind: ShapeKind::TextBox { paragraphs, format },
        }
    }

    pub(crate) fn new_picture(
        shape_id: u32,
        frame: Frame,
        data: Vec<u8>,
        format: ImageFormat,
        description: String,
    ) -> Self {
        Self {
            shape_id,
            frame,
            kind: ShapeKind::Picture {
                data,
                format,
                description,
            },
        }
    }

    #[inline]
    pub fn shape_id(&self) -> u32 {
        self.shape_id
    }

    #[inline]
    pub fn frame(&self) -> Frame {
        self.frame
    }

    #[inline]
    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    pub fn is_picture(&self) -> bool {
        matches!(self.kind, ShapeKind::Picture { .. })
    }

    /// Paragraphs of a text box, `None` for pictures.
    pub fn paragraphs(&self) -> Option<&[Paragraph]> {
        match &self.kind {
            ShapeKind::TextBox { paragraphs, .. } => Some(paragraphs),
            ShapeKind::Picture { .. } => None,
        }
    }

    /// Number of bulleted or numbered paragraphs in a text box.
    pub fn list_item_count(&self) -> usize {
        self.paragraphs()
            .map(|p| p.iter().filter(|p| p.is_list_item()).count())
            .unwrap_or(0)
    }

    pub(crate) fn image_data(&self) -> Option<(&[u8], ImageFormat)> {
        match &self.kind {
            ShapeKind::Picture { data, format, .. } => Some((data.as_slice(), *format)),
            ShapeKind::TextBox { .. } => None,
        }
    }

    /// Generate XML for this shape.
    ///
    /// Pictures need the relationship ID of their media part.
    pub(crate) fn to_xml(&self, xml: &mut String, lang: &str, rel_id: Option<&str>) -> Result<()> {
        match &self.kind {
            ShapeKind::TextBox { paragraphs, format } => {
                xml.push_str("<p:sp>");
                xml.push_str("<p:nvSpPr>");
                write!(
                    xml,
                    r#"<p:cNvPr id="{}" name="Text {}"/>"#,
                    self.shape_id,
                    self.shape_id - 1
                )?;
                xml.push_str("<p:cNvSpPr txBox=\"1\"/>");
                xml.push_str("<p:nvPr/>");
                xml.push_str("</p:nvSpPr>");

                xml.push_str("<p:spPr>");
                self.frame.write_xfrm(xml)?;
                xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
                match format.fill {
                    Some(ref fill) => {
                        write!(xml, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, fill)?
                    },
                    None => xml.push_str("<a:noFill/>"),
                }
                xml.push_str("</p:spPr>");

                xml.push_str("<p:txBody>");
                xml.push_str(r#"<a:bodyPr wrap="square" lIns="91440" tIns="45720" rIns="91440" bIns="45720" rtlCol="0""#);
                if let Some(anchor) = format.anchor {
                    write!(xml, r#" anchor="{}""#, anchor.as_ooxml())?;
                }
                xml.push_str("><a:noAutofit/></a:bodyPr>");
                xml.push_str("<a:lstStyle/>");

                if paragraphs.is_empty() {
                    write!(xml, r#"<a:p><a:endParaRPr lang="{}" dirty="0"/></a:p>"#, lang)?;
                }
                for paragraph in paragraphs {
                    write_paragraph(xml, paragraph, format, lang)?;
                }

                xml.push_str("</p:txBody>");
                xml.push_str("</p:sp>");
            },
            ShapeKind::Picture { description, .. } => {
                xml.push_str("<p:pic>");
                xml.push_str("<p:nvPicPr>");
                write!(
                    xml,
                    r#"<p:cNvPr id="{}" name="Picture {}" descr="{}"/>"#,
                    self.shape_id,
                    self.shape_id - 1,
                    escape_xml(description)
                )?;
                xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr>"#);
                xml.push_str("<p:nvPr/>");
                xml.push_str("</p:nvPicPr>");

                xml.push_str("<p:blipFill>");
                let rid = rel_id.unwrap_or("rIdImagePlaceholder");
                write!(xml, r#"<a:blip r:embed="{}"/>"#, rid)?;
                xml.push_str("<a:stretch><a:fillRect/></a:stretch>");
                xml.push_str("</p:blipFill>");

                xml.push_str("<p:spPr>");
                self.frame.write_xfrm(xml)?;
                xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
                xml.push_str("</p:spPr>");
                xml.push_str("</p:pic>");
            },
        }

        Ok(())
    }
}

fn write_paragraph(
    xml: &mut String,
    paragraph: &Paragraph,
    format: &TextFormat,
    lang: &str,
) -> Result<()> {
    xml.push_str("<a:p>");

    xml.push_str("<a:pPr");
    if paragraph.is_list_item() {
        write!(xml, r#" marL="{}" indent="{}""#, LIST_MARGIN, LIST_INDENT)?;
    }
    if let Some(align) = format.align {
        write!(xml, r#" algn="{}""#, align.as_ooxml())?;
    }
    xml.push('>');
    match paragraph.bullet {
        BulletKind::None => xml.push_str("<a:buNone/>"),
        BulletKind::Disc => xml.push_str(r#"<a:buFont typeface="Arial"/><a:buChar char="&#8226;"/>"#),
        BulletKind::Number => {
            xml.push_str(r#"<a:buFont typeface="+mj-lt"/><a:buAutoNum type="arabicPeriod"/>"#)
        },
    }
    xml.push_str("</a:pPr>");

    // Empty paragraphs keep their height through endParaRPr alone
    if !paragraph.text.is_empty() {
        xml.push_str("<a:r>");
        write_run_properties(xml, "a:rPr", paragraph, format, lang)?;
        write!(xml, "<a:t>{}</a:t>", escape_xml(&paragraph.text))?;
        xml.push_str("</a:r>");
    }
    write_run_properties(xml, "a:endParaRPr", paragraph, format, lang)?;

    xml.push_str("</a:p>");
    Ok(())
}

fn write_run_properties(
    xml: &mut String,
    tag: &str,
    paragraph: &Paragraph,
    format: &TextFormat,
    lang: &str,
) -> Result<()> {
    write!(xml, r#"<{} lang="{}""#, tag, escape_xml(lang))?;
    if let Some(size) = format.size {
        write!(xml, r#" sz="{}""#, pt_to_centipoints(size))?;
    }
    if format.bold {
        xml.push_str(r#" b="1""#);
    }
    if format.italic {
        xml.push_str(r#" i="1""#);
    }
    xml.push_str(r#" dirty="0">"#);

    if let Some(color) = paragraph.color.as_ref().or(format.color.as_ref()) {
        write!(xml, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, color)?;
    }

    if let Some(ref font) = format.font {
        let font = escape_xml(font);
        write!(
            xml,
            r#"<a:latin typeface="{0}"/><a:ea typeface="{0}"/><a:cs typeface="{0}"/>"#,
            font
        )?;
    }

    write!(xml, "</{}>", tag)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pptx::format::TextAlign;

    fn render(shape: &Shape) -> String {
        let mut xml = String::new();
        shape.to_xml(&mut xml, "en-US", Some("rId2")).unwrap();
        xml
    }

    #[test]
    fn test_text_box_with_bullets() {
        let format = TextFormat {
            size: Some(18.0),
            color: Some("1E3C72".to_string()),
            ..Default::default()
        };
        let shape = Shape::new_text_box(
            2,
            Frame::new(457_200, 1_371_600, 8_229_600, 548_640),
            vec![
                Paragraph::bulleted("first", BulletKind::Disc),
                Paragraph::bulleted("second", BulletKind::Number),
            ],
            format,
        );

        assert_eq!(shape.list_item_count(), 2);
        let xml = render(&shape);
        assert!(xml.contains(r#"<a:off x="457200" y="1371600"/>"#));
        assert!(xml.contains(r#"<a:buChar char="&#8226;"/>"#));
        assert!(xml.contains(r#"<a:buAutoNum type="arabicPeriod"/>"#));
        assert!(xml.contains(r#"sz="1800""#));
        assert!(xml.contains(r#"<a:srgbClr val="1E3C72"/>"#));
        assert!(xml.contains("<a:noFill/>"));
    }

    #[test]
    fn test_text_box_fill_align_and_font() {
        let format = TextFormat {
            font: Some("Times New Roman".to_string()),
            italic: true,
            align: Some(TextAlign::Center),
            fill: Some("F0F4F8".to_string()),
            ..Default::default()
        };
        let shape = Shape::new_text_box(
            3,
            Frame::default(),
            vec![Paragraph::plain("C(x) = C₀ × (1 + c·x)^(-n)")],
            format,
        );

        let xml = render(&shape);
        assert!(xml.contains(r#"algn="ctr""#));
        assert!(xml.contains(r#"i="1""#));
        assert!(xml.contains(r#"<a:latin typeface="Times New Roman"/>"#));
        assert!(xml.contains(r#"<a:solidFill><a:srgbClr val="F0F4F8"/></a:solidFill></p:spPr>"#));
        assert!(xml.contains("<a:buNone/>"));
        assert!(xml.contains("C₀ × (1 + c·x)^(-n)"));
    }

    #[test]
    fn test_paragraph_color_overrides_box_color() {
        let format = TextFormat {
            color: Some("000000".to_string()),
            ..Default::default()
        };
        let mut highlighted = Paragraph::bulleted("31 cases", BulletKind::Disc);
        highlighted.color = Some("1E3C72".to_string());
        let shape = Shape::new_text_box(2, Frame::default(), vec![highlighted], format);

        let xml = render(&shape);
        assert!(xml.contains(r#"val="1E3C72""#));
        assert!(!xml.contains(r#"val="000000""#));
    }

    #[test]
    fn test_picture_xml() {
        let shape = Shape::new_picture(
            4,
            Frame::new(1, 2, 3, 4),
            vec![0x89, 0x50, 0x4E, 0x47],
            ImageFormat::Png,
            "chart <1>".to_string(),
        );
        assert!(shape.is_picture());
        assert_eq!(shape.list_item_count(), 0);

        let xml = render(&shape);
        assert!(xml.contains(r#"<a:blip r:embed="rId2"/>"#));
        assert!(xml.contains(r#"descr="chart &lt;1&gt;""#));
        assert!(xml.contains(r#"<a:ext cx="3" cy="4"/>"#));
    }
}
