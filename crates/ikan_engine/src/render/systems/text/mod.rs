//! Text rendering system
//!
//! Glyph rasterization and per-glyph text drawing.

pub mod font;
pub mod text_renderer;

pub use font::{FontFace, GlyphRasterizer, RasterizedGlyph};
pub use text_renderer::{glyph_vertices, Glyph, TextRenderer, TextVertex};
