//! Feature slices, each with its own state, update and render.

pub mod input;
pub mod transcript;
