//! UI rendering module.

mod render;
pub mod text;
pub mod theme;
pub mod transcript;

pub use render::render;
