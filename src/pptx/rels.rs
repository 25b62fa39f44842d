/// Relationship collections for the parts of a deck package.
///
/// Every `.rels` part the writer emits is built through [`Relationships`],
/// which hands out sequential `rIdN` identifiers in insertion order.
use crate::common::xml::escape_xml;

/// A single relationship from a source part to a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1", "rId2")
    r_id: String,
    /// Relationship type URI
    reltype: String,
    /// Target reference, relative to the source part's directory
    target_ref: String,
}

impl Relationship {
    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    #[inline]
    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }
}

/// Collection of relationships from a single source.
#[derive(Debug, Default)]
pub struct Relationships {
    rels: Vec<Relationship>,
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or add a relationship to a target part, returning its ID.
    ///
    /// If a relationship of the given type to the target already exists its
    /// ID is reused.
    pub fn get_or_add(&mut self, reltype: &str, target_ref: &str) -> String {
        if let Some(rel) = self
            .rels
            .iter()
            .find(|rel| rel.reltype == reltype && rel.target_ref == target_ref)
        {
            return rel.r_id.clone();
        }

        let r_id = format!("rId{}", self.rels.len() + 1);
        self.rels.push(Relationship {
            r_id: r_id.clone(),
            reltype: reltype.to_string(),
            target_ref: target_ref.to_string(),
        });
        r_id
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    /// Serialize relationships to the XML of a `.rels` part.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.rels.len() * 160);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );

        for rel in &self.rels {
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
                escape_xml(&rel.r_id),
                escape_xml(&rel.reltype),
                escape_xml(&rel.target_ref),
            ));
        }

        xml.push_str("</Relationships>");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let mut rels = Relationships::new();
        assert_eq!(rels.get_or_add("type1", "target1"), "rId1");
        assert_eq!(rels.get_or_add("type1", "target2"), "rId2");
        assert_eq!(rels.get_or_add("type1", "target1"), "rId1");
        assert_eq!(rels.len(), 2);
    }

    #[test]
    fn test_to_xml() {
        let mut rels = Relationships::new();
        rels.get_or_add("http://example.com/image", "../media/image1.png");
        let xml = rels.to_xml();
        assert!(xml.contains(
            r#"<Relationship Id="rId1" Type="http://example.com/image" Target="../media/image1.png"/>"#
        ));
    }
}
