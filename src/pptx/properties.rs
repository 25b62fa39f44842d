//! Document properties for the deck.
//!
//! Core properties end up in `docProps/core.xml`, extended properties in
//! `docProps/app.xml`.

use crate::common::xml::escape_xml;
use chrono::{DateTime, SecondsFormat, Utc};

/// Deck-level metadata.
#[derive(Debug, Clone, Default)]
pub struct DeckProperties {
    /// Deck title
    pub title: Option<String>,
    /// Deck subject
    pub subject: Option<String>,
    /// Deck author
    pub creator: Option<String>,
    /// Last modified by
    pub last_modified_by: Option<String>,
    /// Language tag for text runs, e.g. `ja-JP`
    pub language: Option<String>,
    /// Creation date
    pub created: Option<DateTime<Utc>>,
    /// Last modification date
    pub modified: Option<DateTime<Utc>>,
}

impl DeckProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the deck title.
    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Set the deck subject.
    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = Some(subject.to_string());
        self
    }

    /// Set the author. Also used as last-modified-by.
    pub fn creator(mut self, creator: &str) -> Self {
        self.creator = Some(creator.to_string());
        self.last_modified_by = Some(creator.to_string());
        self
    }

    pub fn language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }

    /// Stamp created/modified with the given instant.
    pub fn timestamped(mut self, at: DateTime<Utc>) -> Self {
        self.created = Some(at);
        self.modified = Some(at);
        self
    }

    /// Language tag for text runs, `en-US` when unset.
    pub fn run_language(&self) -> &str {
        self.language.as_deref().unwrap_or("en-US")
    }

    /// Generate core.xml content.
    pub fn to_core_xml(&self) -> String {
        let mut xml = String::with_capacity(1024);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#);

        push_element(&mut xml, "dc:title", self.title.as_deref());
        push_element(&mut xml, "dc:subject", self.subject.as_deref());
        push_element(&mut xml, "dc:creator", self.creator.as_deref());
        push_element(&mut xml, "cp:lastModifiedBy", self.last_modified_by.as_deref());
        push_element(&mut xml, "dc:language", self.language.as_deref());
        xml.push_str("<cp:revision>1</cp:revision>");

        if let Some(ref created) = self.created {
            xml.push_str("<dcterms:created xsi:type=\"dcterms:W3CDTF\">");
            xml.push_str(&created.to_rfc3339_opts(SecondsFormat::Secs, true));
            xml.push_str("</dcterms:created>");
        }

        if let Some(ref modified) = self.modified {
            xml.push_str("<dcterms:modified xsi:type=\"dcterms:W3CDTF\">");
            xml.push_str(&modified.to_rfc3339_opts(SecondsFormat::Secs, true));
            xml.push_str("</dcterms:modified>");
        }

        xml.push_str("</cp:coreProperties>");
        xml
    }

    /// Generate app.xml content.
    pub fn to_app_xml(&self, slide_count: usize, presentation_format: &str) -> String {
        let mut xml = String::with_capacity(512);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#);
        xml.push_str("<Application>deckgen</Application>");
        push_element(&mut xml, "PresentationFormat", Some(presentation_format));
        xml.push_str("<Slides>");
        xml.push_str(&slide_count.to_string());
        xml.push_str("</Slides>");
        xml.push_str("<Notes>0</Notes>");
        xml.push_str("<HiddenSlides>0</HiddenSlides>");
        xml.push_str("<AppVersion>16.0000</AppVersion>");
        xml.push_str("</Properties>");
        xml
    }
}

fn push_element(xml: &mut String, tag: &str, value: Option<&str>) {
    if let Some(value) = value {
        xml.push('<');
        xml.push_str(tag);
        xml.push('>');
        xml.push_str(&escape_xml(value));
        xml.push_str("</");
        xml.push_str(tag);
        xml.push('>');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_core_xml() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let props = DeckProperties::new()
            .title("CとIを用いたガウス型速度欠損モデル")
            .creator("FitGauss-PD Analysis")
            .timestamped(at);

        let xml = props.to_core_xml();
        assert!(xml.contains("<dc:title>CとIを用いたガウス型速度欠損モデル</dc:title>"));
        assert!(xml.contains("<dc:creator>FitGauss-PD Analysis</dc:creator>"));
        assert!(xml.contains("<cp:lastModifiedBy>FitGauss-PD Analysis</cp:lastModifiedBy>"));
        assert!(xml.contains("2026-01-02T03:04:05Z"));
        assert!(!xml.contains("<dc:subject>"));
    }

    #[test]
    fn test_xml_escaping() {
        let props = DeckProperties::new().title("R² & <RMSE>");
        let xml = props.to_core_xml();
        assert!(xml.contains("R² &amp; &lt;RMSE&gt;"));
    }

    #[test]
    fn test_app_xml() {
        let xml = DeckProperties::new().to_app_xml(12, "On-screen Show (16:9)");
        assert!(xml.contains("<Slides>12</Slides>"));
        assert!(xml.contains("<PresentationFormat>On-screen Show (16:9)</PresentationFormat>"));
    }

    #[test]
    fn test_default_language() {
        assert_eq!(DeckProperties::new().run_language(), "en-US");
        assert_eq!(DeckProperties::new().language("ja-JP").run_language(), "ja-JP");
    }
}
