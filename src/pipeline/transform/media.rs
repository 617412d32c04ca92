//! `<img>` modernizer (phase one).
//!
//! An element is a candidate when it is an `<img>` (any case) carrying the
//! static directive attribute. Depending on the resolved [`OutputMode`]:
//!
//! | Mode | Result |
//! |------|--------|
//! | `CompressOnly` | `<img src=compressed>` |
//! | `ImgWithSrcset` | `<img src=compressed srcset=...>` |
//! | `Picture` | `<picture>` skeleton holding the rewritten `<img>` |
//!
//! Every mode adds `loading="lazy"` unless `noLazy` is set or the element
//! already has a static `loading` attribute, and drops every copy of the
//! directive.

use super::picture::PendingSources;
use crate::config::{InlineOptions, ModernizeConfig, OutputMode, ResolvedConfig, inline};
use crate::debug;
use crate::dom::{AttrValue, Attribute, Element, Expression, ImportSink, Node};
use crate::error::{ModernizeError, Result};

/// Result of phase one.
#[derive(Debug)]
pub enum Step {
    /// Not a candidate; the element is untouched.
    Unchanged,
    /// Rewritten in place, still an `<img>`.
    Rewritten,
    /// Replaced by a `<picture>` skeleton. The host must call
    /// [`PendingSources::finalize`] on the same node before it prints it.
    Picture(PendingSources),
}

/// Final result for one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Unchanged,
    Rewritten,
    Replaced { sources: usize },
}

/// The element transform engine, configured with one global layer.
#[derive(Debug, Clone)]
pub struct Modernizer {
    /// Defaults with the global layer already applied.
    base: ResolvedConfig,
}

impl Default for Modernizer {
    fn default() -> Self {
        Self::new(&ModernizeConfig::default())
    }
}

impl Modernizer {
    pub fn new(global: &ModernizeConfig) -> Self {
        Self {
            base: ResolvedConfig::from_global(global),
        }
    }

    pub fn attribute_name(&self) -> &str {
        &self.base.attribute_name
    }

    /// First static attribute named like the directive.
    fn directive<'e>(&self, elem: &'e Element) -> Option<&'e Attribute> {
        elem.attrs()
            .iter()
            .find(|attr| attr.is_static() && attr.name == self.base.attribute_name)
    }

    pub fn is_candidate(&self, elem: &Element) -> bool {
        !elem.attrs().is_empty() && elem.is_tag("img") && self.directive(elem).is_some()
    }

    /// Resolve the configuration for one directive value.
    pub fn resolve(&self, directive_value: &str) -> Result<ResolvedConfig> {
        let inline = if directive_value.is_empty() {
            InlineOptions::default()
        } else {
            inline::parse(directive_value)?
        };

        let mut config = self.base.clone();
        config.apply_inline(inline);
        Ok(config)
    }

    /// Phase one: rewrite the element, or swap it for a `<picture>` skeleton.
    pub fn begin<S>(&self, elem: &mut Element, imports: &mut S) -> Result<Step>
    where
        S: ImportSink + ?Sized,
    {
        if !self.is_candidate(elem) {
            return Ok(Step::Unchanged);
        }
        let Some(directive) = self.directive(elem).cloned() else {
            return Ok(Step::Unchanged);
        };

        let (src_index, src_path) = source_path(elem)?;
        let src_loc = elem.attrs()[src_index].loc;
        let config = self.resolve(directive.value.as_text().unwrap_or_default())?;

        // compressed src, always in the image's own format
        let compressed = config.compress_transformer.apply(&src_path, &config, None);
        let handle = imports.import(&compressed);
        elem.set_value_at(src_index, AttrValue::Bound(Expression::Import(handle)));

        let mode = config.mode();
        if mode == OutputMode::ImgWithSrcset {
            let srcset = config.srcset_transformer.apply(&src_path, &config, None);
            let handle = imports.import(&srcset);
            elem.push_attr(Attribute::bound("srcset", Expression::ImportDefault(handle)).at(src_loc));
        }

        let has_loading = elem
            .attrs()
            .iter()
            .any(|attr| attr.is_static() && attr.name == "loading");
        if !config.no_lazy && !has_loading {
            elem.push_attr(Attribute::text("loading", "lazy").at(directive.loc));
        }

        elem.retain_attrs(|attr| !(attr.is_static() && attr.name == directive.name));

        if mode != OutputMode::Picture {
            debug!("modernize"; "{} → <img> ({:?})", src_path, mode);
            return Ok(Step::Rewritten);
        }

        let pending = PendingSources {
            media: elem.attr("media").cloned(),
            sizes: elem.attr("sizes").cloned(),
            src_path,
            src_loc,
            type_loc: directive.loc,
            loc: elem.loc,
            config,
        };

        let mut img = std::mem::replace(elem, Element::new("picture"));
        img.children.clear();
        elem.loc = img.loc;
        elem.children.push(Node::Element(img));

        Ok(Step::Picture(pending))
    }

    /// Both phases back to back, for hosts without a children pass.
    pub fn transform<S>(&self, elem: &mut Element, imports: &mut S) -> Result<Outcome>
    where
        S: ImportSink + ?Sized,
    {
        Ok(match self.begin(elem, imports)? {
            Step::Unchanged => Outcome::Unchanged,
            Step::Rewritten => Outcome::Rewritten,
            Step::Picture(pending) => pending.finalize(elem, imports),
        })
    }
}

/// Locate `src` and the image path behind it.
fn source_path(elem: &Element) -> Result<(usize, String)> {
    let index = elem.attr_index("src").ok_or(ModernizeError::MissingSrc)?;

    let path = match &elem.attrs()[index].value {
        AttrValue::Text(path) => path,
        AttrValue::Bound(Expression::Import(handle) | Expression::ImportDefault(handle)) => {
            &handle.path
        }
        AttrValue::Bound(Expression::Raw(expr)) => {
            return Err(ModernizeError::UnresolvedSrc(expr.clone()));
        }
    };

    if path.is_empty() {
        return Err(ModernizeError::EmptySrc);
    }
    Ok((index, path.clone()))
}
