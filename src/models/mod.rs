pub mod common;
pub mod gemini;
pub mod image;
pub mod text;

pub use common::*;
pub use image::*;
pub use text::*;
