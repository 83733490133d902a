//! Common utility functions

pub mod slug;
pub mod validation;

pub use slug::{slugify, slug_with_suffix, FALLBACK_SLUG};
