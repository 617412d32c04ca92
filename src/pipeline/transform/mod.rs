//! Element transforms.
//!
//! # Modules
//!
//! - `media`: candidate filter, option resolution, in-place `<img>` rewrite,
//!   and the `<picture>` skeleton (phase one)
//! - `picture`: `<source>` construction once the host has visited the
//!   picture's children (phase two)

mod media;
mod picture;

pub use media::{Modernizer, Outcome, Step};
pub use picture::PendingSources;
