//! MIME type detection utilities.
//!
//! Sniffs image MIME types from file extensions, the same way the bundler
//! resolves them for loader requests.

use std::path::Path;

/// Common image MIME type constants.
pub mod types {
    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const GIF: &str = "image/gif";
    pub const WEBP: &str = "image/webp";
    pub const AVIF: &str = "image/avif";
    pub const SVG: &str = "image/svg+xml";
    pub const ICO: &str = "image/x-icon";
    pub const BMP: &str = "image/bmp";
    pub const TIFF: &str = "image/tiff";
}

/// Guess the MIME type of an image path from its extension.
///
/// Returns `None` for unknown or missing extensions. A query string or
/// fragment glued to the extension makes it unknown.
pub fn from_path(path: &str) -> Option<&'static str> {
    let ext = Path::new(path).extension()?.to_str()?;
    from_extension(&ext.to_ascii_lowercase())
}

/// Guess the MIME type from a lower-case extension string.
pub fn from_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "png" => Some(types::PNG),
        "jpg" | "jpeg" | "jpe" => Some(types::JPEG),
        "gif" => Some(types::GIF),
        "webp" => Some(types::WEBP),
        "avif" => Some(types::AVIF),
        "svg" | "svgz" => Some(types::SVG),
        "ico" => Some(types::ICO),
        "bmp" => Some(types::BMP),
        "tif" | "tiff" => Some(types::TIFF),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(from_path("./logo.png"), Some(types::PNG));
        assert_eq!(from_path("photo.jpeg"), Some(types::JPEG));
        assert_eq!(from_path("photo.jpg"), Some(types::JPEG));
        assert_eq!(from_path("@/assets/hero.webp"), Some(types::WEBP));
        assert_eq!(from_path("icon.svg"), Some(types::SVG));
    }

    #[test]
    fn test_from_path_case_insensitive() {
        assert_eq!(from_path("./IMG_0001.JPG"), Some(types::JPEG));
        assert_eq!(from_path("Logo.PnG"), Some(types::PNG));
    }

    #[test]
    fn test_from_path_unknown() {
        assert_eq!(from_path("archive.zip"), None);
        assert_eq!(from_path("no-extension"), None);
        assert_eq!(from_path("./logo.png?inline"), None);
        assert_eq!(from_path(""), None);
    }
}
