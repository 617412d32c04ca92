//! Path transformer protocol.
//!
//! A path transformer maps `(image path, resolved config, optional target
//! format)` to an opaque string that the bundler resolves as a module. The
//! engine never looks inside it; it only registers it as an import.
//!
//! Two transformers are configured: one for the compressed `src`, one for
//! `srcset`. The defaults target webpack loader chains, see [`webpack`].

pub mod webpack;

use std::fmt;
use std::sync::Arc;

use crate::config::ResolvedConfig;
use crate::format::FormatName;

type TransformFn = dyn Fn(&str, &ResolvedConfig, Option<FormatName>) -> String + Send + Sync;

/// Shared, cloneable path transformer function.
#[derive(Clone)]
pub struct PathTransformer(Arc<TransformFn>);

impl PathTransformer {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str, &ResolvedConfig, Option<FormatName>) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Default compressed-image transformer.
    pub fn compress_webpack() -> Self {
        Self::new(webpack::compress)
    }

    /// Default srcset transformer.
    pub fn srcset_webpack() -> Self {
        Self::new(webpack::srcset)
    }

    /// `format` is `None` when the image keeps its native format.
    #[inline]
    pub fn apply(&self, path: &str, config: &ResolvedConfig, format: Option<FormatName>) -> String {
        (self.0)(path, config, format)
    }
}

impl fmt::Debug for PathTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PathTransformer(..)")
    }
}
