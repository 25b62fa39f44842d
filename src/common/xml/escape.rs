use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;

// Built once and shared by every slide, shape and property writer
static XML_ESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .build(["&", "<", ">", "\"", "'"])
        .expect("Failed to build XML escaper")
});

/// Escape XML special characters for element text and attribute values.
///
/// # Examples
///
/// ```
/// use deckgen::common::xml::escape_xml;
/// assert_eq!(escape_xml("C₀ & c"), "C₀ &amp; c");
/// assert_eq!(escape_xml("<a \"b\">"), "&lt;a &quot;b&quot;&gt;");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> String {
    XML_ESCAPER.replace_all(s, &["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"])
}

/// Whether `c` is a legal XML 1.0 character.
#[inline]
pub fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..)
}

/// First character of `s` that cannot appear in an XML 1.0 document.
pub fn find_invalid_xml_char(s: &str) -> Option<char> {
    s.chars().find(|&c| !is_xml_char(c))
}
