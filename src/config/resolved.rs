//! Resolved per-element configuration.
//!
//! Built by layering, later layers winning field by field:
//!
//! ```text
//! built-in defaults  ←  ModernizeConfig (global)  ←  InlineOptions (element)
//! ```
//!
//! `quality` and the two loader option bags merge key by key instead of being
//! replaced wholesale.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::{InlineOptions, ModernizeConfig};
use crate::format::{FormatName, ImageFormat};
use crate::transformer::PathTransformer;

pub const DEFAULT_ATTRIBUTE_NAME: &str = "modernize";
pub const DEFAULT_SIZES: [&str; 5] = ["480w", "1024w", "1920w", "2560w", "original"];
pub const DEFAULT_QUALITY: [(FormatName, u8); 3] = [
    (FormatName::Jpeg, 80),
    (FormatName::Webp, 80),
    (FormatName::Png, 100),
];

/// What the engine emits for one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// `<img src>` with a compressed source only.
    CompressOnly,
    /// `<img src srcset>`, no `<picture>`.
    ImgWithSrcset,
    /// `<picture>` with `<source>` per format and a trailing `<img>`.
    Picture,
}

/// Fully populated configuration used by one element's transform.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub compress_only: bool,
    /// Ignored when `compress_only` is set.
    pub only_use_img: bool,
    pub no_lazy: bool,
    pub attribute_name: String,
    /// Only read in picture mode.
    pub image_formats: Vec<ImageFormat>,
    pub sizes: Vec<String>,
    pub quality: BTreeMap<FormatName, u8>,
    pub resize_loader_options: Map<String, Value>,
    pub srcset_loader_options: Map<String, Value>,
    pub compress_transformer: PathTransformer,
    pub srcset_transformer: PathTransformer,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            compress_only: false,
            only_use_img: false,
            no_lazy: false,
            attribute_name: DEFAULT_ATTRIBUTE_NAME.to_string(),
            image_formats: vec![ImageFormat::Named(FormatName::Webp), ImageFormat::Original],
            sizes: DEFAULT_SIZES.iter().map(|s| s.to_string()).collect(),
            quality: BTreeMap::from(DEFAULT_QUALITY),
            resize_loader_options: Map::new(),
            srcset_loader_options: Map::new(),
            compress_transformer: PathTransformer::compress_webpack(),
            srcset_transformer: PathTransformer::srcset_webpack(),
        }
    }
}

impl ResolvedConfig {
    /// Defaults with the global layer applied.
    pub fn from_global(global: &ModernizeConfig) -> Self {
        let mut config = Self::default();
        config.apply_global(global);
        config
    }

    /// Full resolution for one element.
    pub fn resolve(global: &ModernizeConfig, inline: InlineOptions) -> Self {
        let mut config = Self::from_global(global);
        config.apply_inline(inline);
        config
    }

    pub fn mode(&self) -> OutputMode {
        if self.compress_only {
            OutputMode::CompressOnly
        } else if self.only_use_img {
            OutputMode::ImgWithSrcset
        } else {
            OutputMode::Picture
        }
    }

    pub fn apply_global(&mut self, global: &ModernizeConfig) {
        overwrite(&mut self.compress_only, global.compress_only);
        overwrite(&mut self.only_use_img, global.only_use_img);
        overwrite(&mut self.no_lazy, global.no_lazy);
        overwrite(&mut self.attribute_name, global.attribute_name.clone());
        overwrite(&mut self.image_formats, global.image_formats.clone());
        overwrite(&mut self.sizes, global.sizes.clone());
        if let Some(quality) = &global.quality {
            self.quality.extend(quality);
        }
        if let Some(options) = &global.image_resize_loader_options {
            merge_bag(&mut self.resize_loader_options, options.clone());
        }
        if let Some(options) = &global.image_srcset_loader_options {
            merge_bag(&mut self.srcset_loader_options, options.clone());
        }
        overwrite(
            &mut self.compress_transformer,
            global.compress_file_path_transformer.clone(),
        );
        overwrite(
            &mut self.srcset_transformer,
            global.src_set_file_path_transformer.clone(),
        );
    }

    pub fn apply_inline(&mut self, inline: InlineOptions) {
        overwrite(&mut self.compress_only, inline.compress_only);
        overwrite(&mut self.only_use_img, inline.only_use_img);
        overwrite(&mut self.no_lazy, inline.no_lazy);
        overwrite(&mut self.image_formats, inline.image_formats);
        overwrite(&mut self.sizes, inline.sizes);
        if let Some(quality) = inline.quality {
            self.quality.extend(quality);
        }
        if let Some(options) = inline.image_resize_loader_options {
            merge_bag(&mut self.resize_loader_options, options);
        }
        if let Some(options) = inline.image_srcset_loader_options {
            merge_bag(&mut self.srcset_loader_options, options);
        }
    }
}

#[inline]
fn overwrite<T>(slot: &mut T, layer: Option<T>) {
    if let Some(value) = layer {
        *slot = value;
    }
}

fn merge_bag(base: &mut Map<String, Value>, layer: Map<String, Value>) {
    for (key, value) in layer {
        base.insert(key, value);
    }
}
