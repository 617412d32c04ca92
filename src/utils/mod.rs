//! Utility modules shared by the transform and the template host.

pub mod html;
pub mod mime;
