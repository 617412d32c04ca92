//! Template host adapter.
//!
//! Compiles a template fragment end to end:
//!
//! ```text
//! markup ── parse ──► Vec<Node> ── modernize_nodes ──► Vec<Node> ── render ──► markup
//!                                        │
//!                                 ImportRegistry ──► CompiledTemplate::imports
//! ```
//!
//! Rewritten values are printed according to [`ImportStyle`]:
//!
//! | Style | `src` | `srcset` |
//! |-------|-------|----------|
//! | `Require` | `require('<path>')` | `require('<path>').default` |
//! | `Hoisted` | `_imports_0` | `_imports_1.default` |
//!
//! With `Hoisted`, [`CompiledTemplate::preamble`] gives the matching
//! `import` statements.

mod parse;
mod render;

pub use parse::parse;
pub use render::{expression, render};

use std::fmt::Write;
use std::fs;
use std::path::Path;

use crate::config::ModernizeConfig;
use crate::debug;
use crate::dom::ImportRegistry;
use crate::error::{ModernizeError, Result};
use crate::pipeline::{Modernizer, Summary, modernize_nodes};

/// How bound imports are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportStyle {
    /// Inline `require(...)` calls, no preamble.
    Require,
    /// `_imports_N` bindings declared by a preamble.
    #[default]
    Hoisted,
}

/// Output of one compile.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    pub markup: String,
    /// Registered import paths, index `N` is `_imports_N`.
    pub imports: Vec<String>,
    pub style: ImportStyle,
    pub summary: Summary,
}

impl CompiledTemplate {
    /// One `import` line per registered path. Empty for `Require`.
    pub fn preamble(&self) -> String {
        if self.style == ImportStyle::Require {
            return String::new();
        }

        let mut out = String::new();
        for (index, path) in self.imports.iter().enumerate() {
            let _ = writeln!(out, "import _imports_{index} from {}", render::js_string(path));
        }
        out
    }
}

#[derive(Debug, Clone, Default)]
pub struct TemplateHost {
    modernizer: Modernizer,
    style: ImportStyle,
}

impl TemplateHost {
    pub fn new(config: &ModernizeConfig) -> Self {
        Self {
            modernizer: Modernizer::new(config),
            style: ImportStyle::default(),
        }
    }

    pub fn with_style(mut self, style: ImportStyle) -> Self {
        self.style = style;
        self
    }

    pub fn modernizer(&self) -> &Modernizer {
        &self.modernizer
    }

    /// Parse, modernize and print `source`.
    pub fn compile(&self, source: &str) -> Result<CompiledTemplate> {
        let mut nodes = parse(source)?;
        let mut registry = ImportRegistry::new();
        let summary = modernize_nodes(&mut nodes, &self.modernizer, &mut registry)?;

        if summary.total() > 0 {
            debug!(
                "modernize";
                "{} image(s) rewritten, {} import(s)",
                summary.total(),
                registry.len()
            );
        }

        Ok(CompiledTemplate {
            markup: render(&nodes, self.style),
            imports: registry.into_paths(),
            style: self.style,
            summary,
        })
    }

    /// Read and compile a template file.
    pub fn compile_file(&self, path: &Path) -> Result<CompiledTemplate> {
        let source =
            fs::read_to_string(path).map_err(|err| ModernizeError::Io(path.to_path_buf(), err))?;
        self.compile(&source)
    }
}
