//! Drafts module - local edits held apart from the saved value.

mod draft;

pub use draft::Draft;
