//! Image format table.
//!
//! A closed set of short format names with a 1:1 MIME mapping. Lookups run
//! both ways: `FormatName::mime` is a direct match, `FormatName::from_mime`
//! scans the table.
//!
//! | Format | MIME         |
//! |--------|--------------|
//! | `jpeg` | `image/jpeg` |
//! | `png`  | `image/png`  |
//! | `webp` | `image/webp` |
//! | `avif` | `image/avif` |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::mime;

/// Short image format identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatName {
    Jpeg,
    Png,
    Webp,
    Avif,
}

impl FormatName {
    pub const ALL: [Self; 4] = [Self::Jpeg, Self::Png, Self::Webp, Self::Avif];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Avif => "avif",
        }
    }

    pub const fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => mime::types::JPEG,
            Self::Png => mime::types::PNG,
            Self::Webp => mime::types::WEBP,
            Self::Avif => mime::types::AVIF,
        }
    }

    /// Reverse lookup. A MIME type outside the table yields `None`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.mime() == mime)
    }
}

impl fmt::Display for FormatName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatName {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

/// Error for a format name outside the table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown image format `{0}` (expected one of: jpeg, png, webp, avif, original)")]
pub struct UnknownFormat(pub String);

/// One entry of `imageFormats`: a named format or the source's own format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum ImageFormat {
    Original,
    Named(FormatName),
}

impl ImageFormat {
    /// The explicit format, `None` for `original`.
    pub const fn named(self) -> Option<FormatName> {
        match self {
            Self::Original => None,
            Self::Named(format) => Some(format),
        }
    }
}

impl FromStr for ImageFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "original" {
            return Ok(Self::Original);
        }
        s.parse().map(Self::Named)
    }
}

impl TryFrom<String> for ImageFormat {
    type Error = UnknownFormat;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FormatName> for ImageFormat {
    fn from(format: FormatName) -> Self {
        Self::Named(format)
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Original => f.write_str("original"),
            Self::Named(format) => format.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_roundtrip() {
        for format in FormatName::ALL {
            assert_eq!(FormatName::from_mime(format.mime()), Some(format));
        }
    }

    #[test]
    fn test_from_mime_miss() {
        assert_eq!(FormatName::from_mime("image/gif"), None);
        assert_eq!(FormatName::from_mime("text/html; charset=utf-8"), None);
        assert_eq!(FormatName::from_mime(""), None);
    }

    #[test]
    fn test_parse_image_format() {
        assert_eq!("webp".parse::<ImageFormat>(), Ok(ImageFormat::Named(FormatName::Webp)));
        assert_eq!("original".parse::<ImageFormat>(), Ok(ImageFormat::Original));
        assert!("gif".parse::<ImageFormat>().is_err());
        // case-sensitive, like the JSON literals it is read from
        assert!("WEBP".parse::<ImageFormat>().is_err());
    }

    #[test]
    fn test_deserialize_image_formats() {
        let formats: Vec<ImageFormat> = serde_json::from_str(r#"["webp", "original", "avif"]"#).unwrap();
        assert_eq!(
            formats,
            vec![
                ImageFormat::Named(FormatName::Webp),
                ImageFormat::Original,
                ImageFormat::Named(FormatName::Avif),
            ]
        );

        let err = serde_json::from_str::<Vec<ImageFormat>>(r#"["tiff"]"#).unwrap_err();
        assert!(err.to_string().contains("tiff"));
    }

    #[test]
    fn test_format_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&FormatName::Jpeg).unwrap(), r#""jpeg""#);
    }
}
