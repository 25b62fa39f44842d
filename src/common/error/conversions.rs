//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert from third-party
//! error types to [`DeckError`].

use super::types::DeckError;

impl From<zip::result::ZipError> for DeckError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => DeckError::Io(e),
            other => DeckError::Zip(other.to_string()),
        }
    }
}

impl From<quick_xml::Error> for DeckError {
    fn from(err: quick_xml::Error) -> Self {
        DeckError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for DeckError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        DeckError::Xml(err.to_string())
    }
}

impl From<std::fmt::Error> for DeckError {
    fn from(err: std::fmt::Error) -> Self {
        DeckError::Xml(err.to_string())
    }
}

impl From<image::ImageError> for DeckError {
    fn from(err: image::ImageError) -> Self {
        DeckError::Thumbnail(err.to_string())
    }
}

impl From<serde_saphyr::Error> for DeckError {
    fn from(err: serde_saphyr::Error) -> Self {
        DeckError::Manifest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_zip_io_error_becomes_io() {
        let err: DeckError =
            zip::result::ZipError::Io(std::io::Error::other("disk full")).into();
        assert!(matches!(err, DeckError::Io(_)));
    }

    #[test]
    fn test_slide_local_classification() {
        assert!(DeckError::MissingResource(PathBuf::from("a.png")).is_slide_local());
        assert!(DeckError::Render("bad".to_string()).is_slide_local());
        assert!(!DeckError::Io(std::io::Error::other("x")).is_slide_local());
        assert!(!DeckError::Thumbnail("x".to_string()).is_slide_local());
    }

    #[test]
    fn test_missing_resource_message_names_path() {
        let err = DeckError::MissingResource(PathBuf::from("images/chart.png"));
        assert_eq!(err.to_string(), "Missing resource: images/chart.png");
    }
}
