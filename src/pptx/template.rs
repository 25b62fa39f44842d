//! Presentation template parts.
//!
//! The fixed parts every deck carries: one slide master, one blank layout, the
//! theme and the presentation-level property parts. They live as XML files
//! under `resources/` and are compiled into the binary.

/// Slide master with a single blank layout in its layout list.
pub fn default_slide_master_xml() -> &'static str {
    include_str!("../../resources/slideMasters/slideMaster1.xml")
}

/// Blank slide layout every generated slide is based on.
pub fn blank_slide_layout_xml() -> &'static str {
    include_str!("../../resources/slideLayouts/slideLayout1.xml")
}

/// Office theme (colors, fonts, format scheme).
pub fn default_theme_xml() -> &'static str {
    include_str!("../../resources/theme/theme1.xml")
}

pub fn default_pres_props_xml() -> &'static str {
    include_str!("../../resources/presProps.xml")
}

pub fn default_view_props_xml() -> &'static str {
    include_str!("../../resources/viewProps.xml")
}

pub fn default_table_styles_xml() -> &'static str {
    include_str!("../../resources/tableStyles.xml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_are_xml_documents() {
        for xml in [
            default_slide_master_xml(),
            blank_slide_layout_xml(),
            default_theme_xml(),
            default_pres_props_xml(),
            default_view_props_xml(),
            default_table_styles_xml(),
        ] {
            assert!(xml.starts_with("<?xml"));
        }
        assert!(default_slide_master_xml().contains(r#"r:id="rId1""#));
        assert!(blank_slide_layout_xml().contains(r#"type="blank""#));
    }
}
