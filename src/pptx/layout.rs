//! Named slide sizes.
//!
//! Decks are authored against one of a handful of well-known layouts. The
//! names match those presentation tooling conventionally exposes, so a manifest
//! written for one tool reads naturally here.
use phf::phf_map;

/// A named slide size in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideLayout {
    pub name: &'static str,
    pub width: i64,
    pub height: i64,
    /// `type` attribute of `p:sldSz`, absent for custom sizes
    pub size_type: Option<&'static str>,
    /// Human readable format written to `docProps/app.xml`
    pub format_label: &'static str,
}

/// Perfect hash map of layout names to slide sizes.
static LAYOUTS: phf::Map<&'static str, SlideLayout> = phf_map! {
    "LAYOUT_16x9" => SlideLayout {
        name: "LAYOUT_16x9",
        width: 9_144_000,
        height: 5_143_500,
        size_type: Some("screen16x9"),
        format_label: "On-screen Show (16:9)",
    },
    "LAYOUT_16x10" => SlideLayout {
        name: "LAYOUT_16x10",
        width: 9_144_000,
        height: 5_715_000,
        size_type: Some("screen16x10"),
        format_label: "On-screen Show (16:10)",
    },
    "LAYOUT_4x3" => SlideLayout {
        name: "LAYOUT_4x3",
        width: 9_144_000,
        height: 6_858_000,
        size_type: Some("screen4x3"),
        format_label: "On-screen Show (4:3)",
    },
    "LAYOUT_WIDE" => SlideLayout {
        name: "LAYOUT_WIDE",
        width: 12_192_000,
        height: 6_858_000,
        size_type: None,
        format_label: "Widescreen",
    },
};

impl SlideLayout {
    /// Look up a layout by name, e.g. `LAYOUT_16x9`.
    pub fn from_name(name: &str) -> Option<Self> {
        LAYOUTS.get(name).copied()
    }

    /// All known layout names, sorted.
    pub fn names() -> Vec<&'static str> {
        let mut names: Vec<_> = LAYOUTS.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for SlideLayout {
    fn default() -> Self {
        LAYOUTS["LAYOUT_16x9"]
    }
}
