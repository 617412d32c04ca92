//! Image modernizer - rewrites annotated `<img>` elements into responsive
//! `<picture>` markup backed by bundler loader chains.
//!
//! ```text
//! <img src="./hero.jpg" modernize>
//!
//! <picture>
//!   <source type="image/webp" :srcset="_imports_1.default">
//!   <source type="image/jpeg" :srcset="_imports_2.default">
//!   <img :src="_imports_0" loading="lazy">
//! </picture>
//! ```
//!
//! # Modules
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | global options, directive parsing, layered resolution |
//! | [`dom`] | neutral node model and the import registry |
//! | [`format`] | format names and their MIME types |
//! | [`transformer`] | image path → loader chain request |
//! | [`pipeline`] | element transform engine and tree walker |
//! | [`host`] | template parse / modernize / print |
//!
//! Most callers only need [`TemplateHost`]. Hosts with their own tree drive
//! [`Modernizer::begin`] and [`PendingSources::finalize`] directly.

pub mod logger;

pub mod config;
pub mod dom;
pub mod error;
pub mod format;
pub mod host;
pub mod pipeline;
pub mod transformer;
pub mod utils;

pub use config::{ModernizeConfig, OutputMode, ResolvedConfig};
pub use dom::{ImportHandle, ImportRegistry, ImportSink};
pub use error::{ModernizeError, Result};
pub use format::{FormatName, ImageFormat};
pub use host::{CompiledTemplate, ImportStyle, TemplateHost};
pub use pipeline::{Modernizer, Outcome, PendingSources, Step, Summary, modernize_nodes};
pub use transformer::PathTransformer;
