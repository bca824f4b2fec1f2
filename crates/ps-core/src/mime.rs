//! Image format vocabulary.
//!
//! Maps between URL file extensions and the MIME types stored alongside
//! image rows. Direct-link serving compares the extension a client asked
//! for against the stored MIME type, so both directions live here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// MIME types the service stores and serves.
pub const SUPPORTED_MIME_TYPES: &[&str] =
    &["image/png", "image/jpeg", "image/gif", "image/bmp"];

/// Image formats the service can store and serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
}

impl ImageFormat {
    /// Look up a format from a URL file extension. Case-insensitive;
    /// `jpg` and `jpeg` both map to [`ImageFormat::Jpeg`].
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            _ => None,
        }
    }

    /// Look up a format from a stored MIME type.
    #[must_use]
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(Self::Png),
            "image/jpeg" => Some(Self::Jpeg),
            "image/gif" => Some(Self::Gif),
            "image/bmp" => Some(Self::Bmp),
            _ => None,
        }
    }

    /// The MIME type served for this format.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
        }
    }

    /// Canonical extension used when building image URLs.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Whether `mime` is one of the supported image MIME types.
#[must_use]
pub fn is_supported(mime: &str) -> bool {
    ImageFormat::from_mime_type(mime).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_lookup_is_case_insensitive() {
        assert_eq!(ImageFormat::from_extension("png"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("Gif"), Some(ImageFormat::Gif));
    }

    #[test]
    fn jpg_and_jpeg_are_aliases() {
        assert_eq!(ImageFormat::from_extension("jpg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::Jpeg.extension(), "jpg");
    }

    #[test]
    fn unknown_extension_is_none() {
        assert_eq!(ImageFormat::from_extension("webp"), None);
        assert_eq!(ImageFormat::from_extension("exe"), None);
        assert_eq!(ImageFormat::from_extension(""), None);
    }

    #[test]
    fn mime_type_roundtrip() {
        for mime in SUPPORTED_MIME_TYPES {
            let format = ImageFormat::from_mime_type(mime).unwrap();
            assert_eq!(format.mime_type(), *mime);
        }
    }

    #[test]
    fn extension_and_mime_agree() {
        let format = ImageFormat::from_extension("bmp").unwrap();
        assert_eq!(format.mime_type(), "image/bmp");
        assert_eq!(ImageFormat::from_mime_type("image/bmp"), Some(format));
    }

    #[test]
    fn display_uses_canonical_extension() {
        assert_eq!(ImageFormat::Jpeg.to_string(), "jpg");
        assert_eq!(ImageFormat::Png.to_string(), "png");
    }

    #[test]
    fn is_supported_matches_table() {
        assert!(is_supported("image/png"));
        assert!(is_supported("image/jpeg"));
        assert!(!is_supported("video/mp4"));
        assert!(!is_supported("text/html"));
    }
}
