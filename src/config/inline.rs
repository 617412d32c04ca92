//! Element-level options from the directive attribute value.
//!
//! ```text
//! <img src="./hero.jpg" modernize='onlyUseImg sizes=["640w","2x"] quality={"jpeg":70}'>
//! ```
//!
//! Flags (`compressOnly`, `onlyUseImg`, `noLazy`) are standalone tokens,
//! matched case-insensitively. Arrays and objects are `key=<JSON>`, with
//! optional spaces around `=`. Each payload runs up to the *last* closing
//! bracket or brace on the line, so the same key must not appear twice.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::validate_quality;
use crate::error::{ModernizeError, Result};
use crate::format::{FormatName, ImageFormat};

/// Options explicitly present in one directive value. Absent keys stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineOptions {
    pub compress_only: Option<bool>,
    pub only_use_img: Option<bool>,
    pub no_lazy: Option<bool>,
    pub image_formats: Option<Vec<ImageFormat>>,
    pub sizes: Option<Vec<String>>,
    pub quality: Option<BTreeMap<FormatName, u8>>,
    pub image_srcset_loader_options: Option<Map<String, Value>>,
    pub image_resize_loader_options: Option<Map<String, Value>>,
}

impl InlineOptions {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// =============================================================================
// Patterns
// =============================================================================

fn array_pattern(key: &str) -> Regex {
    Regex::new(&format!(r"(?i){key}\s*=\s*(\[.*\])")).unwrap()
}

fn object_pattern(key: &str) -> Regex {
    Regex::new(&format!(r"(?i){key}\s*=\s*(\{{.*\}})")).unwrap()
}

static IMAGE_FORMATS: LazyLock<Regex> = LazyLock::new(|| array_pattern("imageFormats"));
static SIZES: LazyLock<Regex> = LazyLock::new(|| array_pattern("sizes"));
static QUALITY: LazyLock<Regex> = LazyLock::new(|| object_pattern("quality"));
static SRCSET_LOADER_OPTIONS: LazyLock<Regex> =
    LazyLock::new(|| object_pattern("imageSrcsetLoaderOptions"));
static RESIZE_LOADER_OPTIONS: LazyLock<Regex> =
    LazyLock::new(|| object_pattern("imageResizeLoaderOptions"));

// =============================================================================
// Parsing
// =============================================================================

/// Parse a directive value.
///
/// An empty string gives empty options. A matched payload that is not valid
/// JSON for its key is an error naming the key.
pub fn parse(source: &str) -> Result<InlineOptions> {
    let lowered = source.to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().collect();
    let flag = |key: &str| tokens.contains(&key.to_lowercase().as_str()).then_some(true);

    let quality: Option<BTreeMap<FormatName, u8>> = extract(source, "quality", &QUALITY)?;
    if let Some(quality) = &quality {
        validate_quality(quality)?;
    }

    Ok(InlineOptions {
        compress_only: flag("compressOnly"),
        only_use_img: flag("onlyUseImg"),
        no_lazy: flag("noLazy"),
        image_formats: extract(source, "imageFormats", &IMAGE_FORMATS)?,
        sizes: extract(source, "sizes", &SIZES)?,
        quality,
        image_srcset_loader_options: extract(
            source,
            "imageSrcsetLoaderOptions",
            &SRCSET_LOADER_OPTIONS,
        )?,
        image_resize_loader_options: extract(
            source,
            "imageResizeLoaderOptions",
            &RESIZE_LOADER_OPTIONS,
        )?,
    })
}

/// Match `pattern` against the original (not lowered) source and decode the
/// captured JSON literal.
fn extract<T: DeserializeOwned>(
    source: &str,
    key: &'static str,
    pattern: &Regex,
) -> Result<Option<T>> {
    let Some(payload) = pattern.captures(source).and_then(|caps| caps.get(1)) else {
        return Ok(None);
    };

    serde_json::from_str(payload.as_str())
        .map(Some)
        .map_err(|source| ModernizeError::InvalidOption { key, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formats(names: &[&str]) -> Option<Vec<ImageFormat>> {
        Some(names.iter().map(|name| name.parse().unwrap()).collect())
    }

    fn strings(values: &[&str]) -> Option<Vec<String>> {
        Some(values.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_empty() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("   ").unwrap().is_empty());
    }

    #[test]
    fn test_single_flag() {
        let options = parse("compressOnly").unwrap();
        assert_eq!(
            options,
            InlineOptions {
                compress_only: Some(true),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_flags_case_insensitive() {
        let options = parse("COMPRESSONLY onlyuseimg  NoLazy").unwrap();
        assert_eq!(options.compress_only, Some(true));
        assert_eq!(options.only_use_img, Some(true));
        assert_eq!(options.no_lazy, Some(true));
    }

    #[test]
    fn test_flag_must_be_whole_token() {
        let options = parse("compressOnlyPlease noLazy=1").unwrap();
        assert!(options.is_empty());
    }

    #[test]
    fn test_image_formats_spacing() {
        for source in [
            r#"imageFormats=["webp", "original"]"#,
            r#"imageFormats =["webp", "original"]"#,
            r#"imageFormats = ["webp", "original"]"#,
            r#"imageFormats= ["webp", "original"]"#,
            r#"imageformats=["webp","original"]"#,
        ] {
            let options = parse(source).unwrap();
            assert_eq!(
                options,
                InlineOptions {
                    image_formats: formats(&["webp", "original"]),
                    ..Default::default()
                },
                "source: {source}"
            );
        }
    }

    #[test]
    fn test_sizes() {
        let options = parse(r#"sizes=["480w", "1024w", "1920w", "2560w", "original"]"#).unwrap();
        assert_eq!(
            options.sizes,
            strings(&["480w", "1024w", "1920w", "2560w", "original"])
        );
    }

    #[test]
    fn test_quality() {
        let options = parse(r#"quality={ "jpeg": 80, "webp": 80, "png": 100 }"#).unwrap();
        assert_eq!(
            options.quality,
            Some(BTreeMap::from([
                (FormatName::Jpeg, 80),
                (FormatName::Webp, 80),
                (FormatName::Png, 100),
            ]))
        );
    }

    #[test]
    fn test_combined() {
        let options = parse(
            r#"compressOnly quality={ "jpeg": 80, "webp": 80, "png": 100 } imageFormats = ["webp", "original"]"#,
        )
        .unwrap();
        assert_eq!(options.compress_only, Some(true));
        assert_eq!(options.image_formats, formats(&["webp", "original"]));
        assert_eq!(options.quality.map(|q| q.len()), Some(3));

        // one array key per directive; a second array would extend the first
        let options = parse(
            r#"sizes=["480w", "1024w"] imageSrcsetLoaderOptions={"placeholder": true} noLazy"#,
        )
        .unwrap();
        assert_eq!(options.sizes, strings(&["480w", "1024w"]));
        assert_eq!(
            options.image_srcset_loader_options.unwrap()["placeholder"],
            Value::Bool(true)
        );
        assert_eq!(options.no_lazy, Some(true));
    }

    #[test]
    fn test_loader_option_bags() {
        let options = parse(r#"imageResizeLoaderOptions={"esModule": false}"#).unwrap();
        let bag = options.image_resize_loader_options.unwrap();
        assert_eq!(bag["esModule"], Value::Bool(false));
        assert!(options.image_srcset_loader_options.is_none());
    }

    #[test]
    fn test_invalid_json_names_key() {
        let err = parse("quality={ jpeg: 80 }").unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Invalid value for quality: "), "{message}");
        assert!(message.contains("key must be a string"), "{message}");
        assert!(matches!(err, ModernizeError::InvalidOption { key: "quality", .. }));
    }

    #[test]
    fn test_unknown_format_is_error() {
        let err = parse(r#"imageFormats=["tiff"]"#).unwrap_err();
        assert!(err.to_string().contains("imageFormats"));
    }

    #[test]
    fn test_quality_out_of_range() {
        let err = parse(r#"quality={"png": 101}"#).unwrap_err();
        assert!(matches!(err, ModernizeError::InvalidQuality { value: 101, .. }));
    }

    #[test]
    fn test_greedy_payload_spans_to_last_bracket() {
        // the sizes payload swallows everything up to the final `]`
        let err = parse(r#"sizes=["1x"] imageFormats=["webp"]"#).unwrap_err();
        assert!(matches!(err, ModernizeError::InvalidOption { key: "sizes", .. }));
    }
}
