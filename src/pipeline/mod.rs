//! Tree walk over the neutral node model.
//!
//! Drives the two-phase element protocol for a whole tree:
//!
//! ```text
//! visit(node)
//!   ├── begin(element)        rewrite in place, or swap in <picture>
//!   ├── visit(children)       the inner <img> is visited here
//!   └── finalize(pending)     prepend <source> elements
//! ```
//!
//! Hosts that already have their own traversal call
//! [`Modernizer::begin`] and [`PendingSources::finalize`] directly.

pub mod transform;

use crate::dom::{ImportSink, Node};
use crate::error::{ModernizeError, Result};

pub use transform::{Modernizer, Outcome, PendingSources, Step};

/// Counts collected over one walk.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Elements rewritten as `<img>`.
    pub rewritten: usize,
    /// Elements replaced by `<picture>`.
    pub pictures: usize,
    /// `<source>` elements created across all pictures.
    pub sources: usize,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.rewritten + self.pictures
    }

    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Unchanged => {}
            Outcome::Rewritten => self.rewritten += 1,
            Outcome::Replaced { sources } => {
                self.pictures += 1;
                self.sources += sources;
            }
        }
    }
}

/// Modernize every candidate in `nodes`, depth first, in document order.
///
/// Stops at the first failing element. Errors from elements with a known
/// location are wrapped in [`ModernizeError::Element`].
pub fn modernize_nodes<S>(
    nodes: &mut [Node],
    modernizer: &Modernizer,
    imports: &mut S,
) -> Result<Summary>
where
    S: ImportSink + ?Sized,
{
    let mut summary = Summary::default();
    for node in nodes {
        visit(node, modernizer, imports, &mut summary)?;
    }
    Ok(summary)
}

fn visit<S>(
    node: &mut Node,
    modernizer: &Modernizer,
    imports: &mut S,
    summary: &mut Summary,
) -> Result<()>
where
    S: ImportSink + ?Sized,
{
    let Node::Element(elem) = node else {
        return Ok(());
    };

    let step = match modernizer.begin(elem, imports) {
        Ok(step) => step,
        Err(err) => {
            return Err(match elem.loc {
                Some(loc) => ModernizeError::Element {
                    tag: elem.tag().to_string(),
                    position: loc.start,
                    source: Box::new(err),
                },
                None => err,
            });
        }
    };

    for child in &mut elem.children {
        visit(child, modernizer, imports, summary)?;
    }

    match step {
        Step::Unchanged => {}
        Step::Rewritten => summary.record(Outcome::Rewritten),
        Step::Picture(pending) => summary.record(pending.finalize(elem, imports)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Attribute, Element, ImportRegistry, SourceLocation};

    fn img(src: &str, directive: &str) -> Node {
        Element::new("img")
            .with_attr(Attribute::text("src", src))
            .with_attr(Attribute::text("modernize", directive))
            .into()
    }

    #[test]
    fn test_walk_nested() {
        let mut nodes = vec![
            Node::Text("\n".into()),
            Element::new("div")
                .with_child(img("./a.png", ""))
                .with_child(
                    Element::new("section")
                        .with_child(img("./b.jpg", "compressOnly"))
                        .into(),
                )
                .into(),
            img("./c.png", "onlyUseImg"),
            Element::new("img")
                .with_attr(Attribute::text("src", "./plain.png"))
                .into(),
        ];

        let mut registry = ImportRegistry::new();
        let summary = modernize_nodes(&mut nodes, &Modernizer::default(), &mut registry).unwrap();

        assert_eq!(
            summary,
            Summary {
                rewritten: 2,
                pictures: 1,
                sources: 2,
            }
        );
        assert_eq!(summary.total(), 3);
        // a.png: src + 2 sources; b.jpg: src; c.png: src + srcset
        assert_eq!(registry.len(), 6);

        let div = nodes[1].as_element().unwrap();
        let picture = div.children[0].as_element().unwrap();
        assert!(picture.is_tag("picture"));
        assert_eq!(picture.children.len(), 3);
        assert!(picture.children[2].as_element().unwrap().is_tag("img"));
    }

    #[test]
    fn test_empty_tree() {
        let summary =
            modernize_nodes(&mut [], &Modernizer::default(), &mut ImportRegistry::new()).unwrap();
        assert_eq!(summary, Summary::default());
    }

    #[test]
    fn test_error_carries_position() {
        let mut broken = Element::new("img").with_attr(Attribute::text("modernize", ""));
        broken.loc = Some(SourceLocation { start: 17, end: 35 });
        let mut nodes = vec![Element::new("p").with_child(broken.into()).into()];

        let err = modernize_nodes(&mut nodes, &Modernizer::default(), &mut ImportRegistry::new())
            .unwrap_err();
        assert!(matches!(
            err,
            ModernizeError::Element { position: 17, ref tag, .. } if tag == "img"
        ));
        assert!(matches!(err.root(), ModernizeError::MissingSrc));
    }

    #[test]
    fn test_error_without_location_is_bare() {
        let mut nodes = vec![img("", "")];
        let err = modernize_nodes(&mut nodes, &Modernizer::default(), &mut ImportRegistry::new())
            .unwrap_err();
        assert!(matches!(err, ModernizeError::EmptySrc));
    }
}
