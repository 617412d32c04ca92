//! `<source>` construction (phase two).
//!
//! Runs after the host has visited the picture's children, so the inner
//! `<img>` is already final when the sources are prepended:
//!
//! ```text
//! <picture>
//!   <source type="image/webp" :srcset="_imports_1.default">
//!   <source type="image/png"  :srcset="_imports_2.default">
//!   <img :src="_imports_0" loading="lazy">
//! </picture>
//! ```

use super::media::Outcome;
use crate::config::ResolvedConfig;
use crate::debug;
use crate::dom::{Attribute, Closing, Element, Expression, ImportSink, Node, SourceLocation};
use crate::format::ImageFormat;
use crate::utils::mime;

/// Everything phase two needs, captured before the `<img>` moved into the
/// picture.
#[derive(Debug)]
pub struct PendingSources {
    pub(super) src_path: String,
    pub(super) config: ResolvedConfig,
    pub(super) media: Option<Attribute>,
    pub(super) sizes: Option<Attribute>,
    pub(super) src_loc: Option<SourceLocation>,
    /// Location of the directive attribute, reused for `type`.
    pub(super) type_loc: Option<SourceLocation>,
    pub(super) loc: Option<SourceLocation>,
}

impl PendingSources {
    pub fn src_path(&self) -> &str {
        &self.src_path
    }

    /// Prepend one `<source>` per distinct MIME type.
    ///
    /// Does nothing when `picture` is no longer a `<picture>`, e.g. when
    /// another transform replaced the node in between.
    pub fn finalize<S>(self, picture: &mut Element, imports: &mut S) -> Outcome
    where
        S: ImportSink + ?Sized,
    {
        if !picture.is_tag("picture") {
            return Outcome::Unchanged;
        }

        let sources = self.build_sources(imports);
        let count = sources.len();
        picture
            .children
            .splice(0..0, sources.into_iter().map(Node::Element));

        debug!("modernize"; "{} → <picture> with {} <source>", self.src_path, count);
        Outcome::Replaced { sources: count }
    }

    fn build_sources<S>(&self, imports: &mut S) -> Vec<Element>
    where
        S: ImportSink + ?Sized,
    {
        let mut sources: Vec<Element> = Vec::with_capacity(self.config.image_formats.len());

        for &entry in &self.config.image_formats {
            let mime = match entry {
                ImageFormat::Original => mime::from_path(&self.src_path),
                ImageFormat::Named(format) => Some(format.mime()),
            };
            if sources.iter().any(|source| source.get_text("type") == mime) {
                continue;
            }

            let srcset = self
                .config
                .srcset_transformer
                .apply(&self.src_path, &self.config, entry.named());
            let handle = imports.import(&srcset);

            let mut source = Element::new("source").with_closing(Closing::SelfClosing);
            source.loc = self.loc;
            if let Some(mime) = mime {
                source.push_attr(Attribute::text("type", mime).at(self.type_loc));
            }
            source.push_attr(
                Attribute::bound("srcset", Expression::ImportDefault(handle)).at(self.src_loc),
            );
            if let Some(media) = &self.media {
                source.push_attr(media.clone());
            }
            if let Some(sizes) = &self.sizes {
                source.push_attr(sizes.clone());
            }

            sources.push(source);
        }

        sources
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Modernizer, Step};
    use super::*;
    use crate::dom::ImportRegistry;

    fn begin_picture(registry: &mut ImportRegistry) -> (Element, PendingSources) {
        let mut elem = Element::new("img")
            .with_attr(Attribute::text("src", "./a.png"))
            .with_attr(Attribute::text("modernize", ""));
        match Modernizer::default().begin(&mut elem, registry).unwrap() {
            Step::Picture(pending) => (elem, pending),
            other => panic!("expected picture, got {other:?}"),
        }
    }

    #[test]
    fn test_skeleton_before_finalize() {
        let mut registry = ImportRegistry::new();
        let (picture, pending) = begin_picture(&mut registry);

        assert!(picture.is_tag("picture"));
        assert_eq!(picture.children.len(), 1);
        assert_eq!(pending.src_path(), "./a.png");
        // only the compressed src so far
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_finalize_prepends_sources() {
        let mut registry = ImportRegistry::new();
        let (mut picture, pending) = begin_picture(&mut registry);
        picture.children.push(Node::Text("\n".into()));

        let outcome = pending.finalize(&mut picture, &mut registry);
        assert_eq!(outcome, Outcome::Replaced { sources: 2 });

        let tags: Vec<&str> = picture
            .children
            .iter()
            .map(|child| child.as_element().map_or("#text", Element::tag))
            .collect();
        assert_eq!(tags, ["source", "source", "img", "#text"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_finalize_noop_when_replaced() {
        let mut registry = ImportRegistry::new();
        let (_, pending) = begin_picture(&mut registry);

        let mut other = Element::new("figure");
        let outcome = pending.finalize(&mut other, &mut registry);
        assert_eq!(outcome, Outcome::Unchanged);
        assert!(other.children.is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_source_locations() {
        let src_loc = Some(SourceLocation { start: 5, end: 18 });
        let directive_loc = Some(SourceLocation { start: 19, end: 28 });
        let mut elem = Element::new("img")
            .with_attr(Attribute::text("src", "./a.png").at(src_loc))
            .with_attr(Attribute::text("modernize", "").at(directive_loc));
        elem.loc = Some(SourceLocation { start: 0, end: 31 });

        let mut registry = ImportRegistry::new();
        Modernizer::default().transform(&mut elem, &mut registry).unwrap();

        assert_eq!(elem.loc, Some(SourceLocation { start: 0, end: 31 }));
        let source = elem.children[0].as_element().unwrap();
        assert_eq!(source.loc, elem.loc);
        assert_eq!(source.attr("type").unwrap().loc, directive_loc);
        assert_eq!(source.attr("srcset").unwrap().loc, src_loc);
    }
}
