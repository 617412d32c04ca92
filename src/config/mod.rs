//! Configuration for the image modernizer.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── inline     # directive attribute mini-language → InlineOptions
//! ├── resolved   # defaults ← global ← inline → ResolvedConfig
//! └── mod.rs     # ModernizeConfig, the global layer (this file)
//! ```
//!
//! The global layer is built in code or loaded from `modernize.toml`. Keys
//! use the same camelCase names as the directive:
//!
//! ```toml
//! attributeName = "modernize"
//! imageFormats = ["avif", "webp", "original"]
//! sizes = ["640w", "1280w", "original"]
//! noLazy = false
//!
//! [quality]
//! avif = 60
//! webp = 75
//!
//! [imageResizeLoaderOptions]
//! esModule = true
//! ```
//!
//! Path transformers are code, so they can only be set programmatically.

pub mod inline;
mod resolved;

pub use inline::InlineOptions;
pub use resolved::{
    DEFAULT_ATTRIBUTE_NAME, DEFAULT_QUALITY, DEFAULT_SIZES, OutputMode, ResolvedConfig,
};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{ModernizeError, Result};
use crate::format::{FormatName, ImageFormat};
use crate::log;
use crate::transformer::PathTransformer;

/// Default config file name.
pub const CONFIG_FILE: &str = "modernize.toml";

// ============================================================================
// global configuration
// ============================================================================

/// Caller-supplied global options. Every field is optional; unset fields
/// fall through to the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModernizeConfig {
    pub compress_only: Option<bool>,
    pub only_use_img: Option<bool>,
    pub no_lazy: Option<bool>,
    pub attribute_name: Option<String>,
    pub image_formats: Option<Vec<ImageFormat>>,
    pub sizes: Option<Vec<String>>,
    pub quality: Option<BTreeMap<FormatName, u8>>,
    pub image_srcset_loader_options: Option<Map<String, Value>>,
    pub image_resize_loader_options: Option<Map<String, Value>>,

    #[serde(skip)]
    pub compress_file_path_transformer: Option<PathTransformer>,
    #[serde(skip)]
    pub src_set_file_path_transformer: Option<PathTransformer>,
}

impl ModernizeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compress_transformer<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &ResolvedConfig, Option<FormatName>) -> String + Send + Sync + 'static,
    {
        self.compress_file_path_transformer = Some(PathTransformer::new(f));
        self
    }

    pub fn with_srcset_transformer<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &ResolvedConfig, Option<FormatName>) -> String + Send + Sync + 'static,
    {
        self.src_set_file_path_transformer = Some(PathTransformer::new(f));
        self
    }

    /// Directive attribute name after applying defaults.
    pub fn attribute_name(&self) -> &str {
        self.attribute_name
            .as_deref()
            .unwrap_or(DEFAULT_ATTRIBUTE_NAME)
    }

    /// Parse configuration from a TOML string, warning about unknown fields.
    pub fn from_str(content: &str) -> Result<Self> {
        let (config, ignored) = Self::parse_with_ignored(content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, Path::new(CONFIG_FILE));
        }
        Ok(config)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ModernizeError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        log!("config"; "loaded {}", path.display());
        Ok(config)
    }

    /// Load the nearest `modernize.toml` walking up from `start`, or the
    /// defaults when there is none.
    pub fn discover(start: &Path) -> Result<Self> {
        match find_config_file(start, Path::new(CONFIG_FILE)) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config: Self = serde_ignored::deserialize(deserializer, |path| {
            ignored.push(path.to_string());
        })?;
        config.validate()?;
        Ok((config, ignored))
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(quality) = &self.quality {
            validate_quality(quality)?;
        }
        Ok(())
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }
}

/// Reject quality values above 100.
pub(crate) fn validate_quality(quality: &BTreeMap<FormatName, u8>) -> Result<()> {
    match quality.iter().find(|&(_, &value)| value > 100) {
        Some((format, &value)) => Err(ModernizeError::InvalidQuality {
            format: format.to_string(),
            value,
        }),
        None => Ok(()),
    }
}

/// Find `config_name` in `start` or any of its ancestors.
///
/// ```text
/// /home/user/app/src/components/  ← start
/// /home/user/app/modernize.toml   ← found!
/// ```
pub fn find_config_file(start: &Path, config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    start
        .ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_full() {
        let content = r#"
            compressOnly = false
            onlyUseImg = true
            noLazy = true
            attributeName = "responsive"
            imageFormats = ["avif", "original"]
            sizes = ["640w", "2x"]

            [quality]
            avif = 55

            [imageSrcsetLoaderOptions]
            placeholder = true
        "#;
        let config = ModernizeConfig::from_str(content).unwrap();

        assert_eq!(config.compress_only, Some(false));
        assert_eq!(config.only_use_img, Some(true));
        assert_eq!(config.no_lazy, Some(true));
        assert_eq!(config.attribute_name(), "responsive");
        assert_eq!(
            config.image_formats,
            Some(vec![ImageFormat::Named(FormatName::Avif), ImageFormat::Original])
        );
        assert_eq!(config.sizes, Some(vec!["640w".to_string(), "2x".to_string()]));
        assert_eq!(config.quality, Some(BTreeMap::from([(FormatName::Avif, 55)])));
        assert_eq!(
            config.image_srcset_loader_options.unwrap()["placeholder"],
            Value::Bool(true)
        );
        assert!(config.image_resize_loader_options.is_none());
    }

    #[test]
    fn test_from_str_empty_is_default() {
        let config = ModernizeConfig::from_str("").unwrap();
        assert!(config.compress_only.is_none());
        assert!(config.image_formats.is_none());
        assert_eq!(config.attribute_name(), DEFAULT_ATTRIBUTE_NAME);
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let result = ModernizeConfig::from_str("imageFormats = [\"webp\"");
        assert!(matches!(result, Err(ModernizeError::Toml(_))));
    }

    #[test]
    fn test_invalid_format_rejected() {
        let result = ModernizeConfig::from_str(r#"imageFormats = ["bmp"]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_quality_out_of_range_rejected() {
        let result = ModernizeConfig::from_str("[quality]\njpeg = 120");
        assert!(matches!(
            result,
            Err(ModernizeError::InvalidQuality { value: 120, .. })
        ));
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "noLazy = true\ncompress_only = true\n[extra]\nfield = 1";
        let (config, ignored) = ModernizeConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.no_lazy, Some(true));
        assert!(config.compress_only.is_none());
        assert!(ignored.iter().any(|f| f == "compress_only"));
        assert!(ignored.iter().any(|f| f.contains("extra")));
    }

    #[test]
    fn test_no_unknown_fields() {
        let (_, ignored) = ModernizeConfig::parse_with_ignored("sizes = [\"1x\"]").unwrap();
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_load_and_discover() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("src/components");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "noLazy = true").unwrap();

        let loaded = ModernizeConfig::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(loaded.no_lazy, Some(true));

        let discovered = ModernizeConfig::discover(&nested).unwrap();
        assert_eq!(discovered.no_lazy, Some(true));
    }

    #[test]
    fn test_discover_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ModernizeConfig::discover(dir.path()).unwrap();
        assert!(config.no_lazy.is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join(CONFIG_FILE);
        let err = ModernizeConfig::load(&missing).unwrap_err();
        assert!(matches!(err, ModernizeError::Io(ref path, _) if *path == missing));
    }
}
