/// Relationship ID mapper for tracking media relationships while a deck is serialized.
///
/// Relationships are created first so slide XML can be generated with the
/// actual IDs instead of placeholders.
use std::collections::HashMap;

/// Maps pictures to their relationship IDs, organized per slide.
#[derive(Debug, Default)]
pub struct RelationshipMapper {
    /// Maps (slide_index, image_index_in_slide) to relationship ID
    image_ids: HashMap<(usize, usize), String>,
}

impl RelationshipMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the relationship ID for an image in a specific slide.
    pub fn add_image(&mut self, slide_index: usize, image_index_in_slide: usize, rel_id: String) {
        self.image_ids
            .insert((slide_index, image_index_in_slide), rel_id);
    }

    pub fn get_image_id(&self, slide_index: usize, image_index_in_slide: usize) -> Option<&str> {
        self.image_ids
            .get(&(slide_index, image_index_in_slide))
            .map(|s| s.as_str())
    }

    /// All image relationship IDs of one slide, in picture order.
    pub fn image_ids_for_slide(&self, slide_index: usize, image_count: usize) -> Vec<String> {
        (0..image_count)
            .filter_map(|i| self.get_image_id(slide_index, i).map(str::to_string))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_per_slide() {
        let mut map = RelationshipMapper::new();
        map.add_image(0, 0, "rId2".to_string());
        map.add_image(1, 0, "rId2".to_string());
        map.add_image(1, 1, "rId3".to_string());

        assert_eq!(map.get_image_id(1, 1), Some("rId3"));
        assert_eq!(map.get_image_id(0, 1), None);
        assert_eq!(map.image_ids_for_slide(1, 2), vec!["rId2", "rId3"]);
    }
}
