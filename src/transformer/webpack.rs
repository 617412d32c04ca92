//! Default transformers for webpack loader chains.
//!
//! ```text
//! compress: -!webpack-image-resize-loader?{resize}!./logo.png
//! srcset:   -!webpack-image-srcset-loader?{srcset}!webpack-image-resize-loader?{resize}!./logo.png
//! ```
//!
//! `{resize}` is `{"format":..,"quality":..}` followed by the configured
//! resize loader options, `{srcset}` is `{"sizes":[..]}` followed by the
//! srcset loader options. Key order is insertion order, so identical inputs
//! always give identical strings.

use serde_json::{Map, Value};

use crate::config::ResolvedConfig;
use crate::format::FormatName;
use crate::utils::mime;

const RESIZE_LOADER: &str = "webpack-image-resize-loader";
const SRCSET_LOADER: &str = "webpack-image-srcset-loader";

/// Compressed image in `format`, or in the image's own format when `None`.
pub fn compress(path: &str, config: &ResolvedConfig, format: Option<FormatName>) -> String {
    let resize = resize_options(path, config, format);
    format!("-!{RESIZE_LOADER}?{resize}!{path}")
}

/// Srcset over `config.sizes`, resized into `format` when given.
pub fn srcset(path: &str, config: &ResolvedConfig, format: Option<FormatName>) -> String {
    let resize = resize_options(path, config, format);

    let mut options = Map::new();
    options.insert("sizes".to_string(), Value::from(config.sizes.clone()));
    extend(&mut options, &config.srcset_loader_options);
    let srcset = Value::Object(options);

    format!("-!{SRCSET_LOADER}?{srcset}!{RESIZE_LOADER}?{resize}!{path}")
}

/// Resize loader options.
///
/// `format` is written unless the requested format already is the image's
/// native one. Without a requested format the native format is written, so
/// the loader re-encodes in place.
fn resize_options(path: &str, config: &ResolvedConfig, format: Option<FormatName>) -> Value {
    let native = mime::from_path(path);
    let requested = format.map(FormatName::mime);
    let target = requested.or(native).and_then(FormatName::from_mime);

    let mut options = Map::new();
    if (requested.is_none() || requested != native)
        && let Some(target) = target
    {
        options.insert("format".to_string(), Value::from(target.as_str()));
    }
    if let Some(quality) = target.and_then(|target| config.quality.get(&target)) {
        options.insert("quality".to_string(), Value::from(*quality));
    }
    extend(&mut options, &config.resize_loader_options);

    Value::Object(options)
}

fn extend(options: &mut Map<String, Value>, extra: &Map<String, Value>) {
    for (key, value) in extra {
        options.insert(key.clone(), value.clone());
    }
}
