//! Glyph sources for the text renderer
//!
//! [`FontFace`] rasterizes TrueType/OpenType glyphs with `fontdue`. Anything
//! else that can produce coverage bitmaps (bitmap fonts, test fixtures)
//! plugs in through [`GlyphRasterizer`].

use std::path::Path;

use fontdue::{Font, FontSettings, Metrics};

use crate::foundation::math::Vec2;
use crate::render::{RenderError, RenderResult};

/// A rasterized glyph: 8-bit coverage plus layout metrics in pixels
#[derive(Debug, Clone, PartialEq)]
pub struct RasterizedGlyph {
    /// Bitmap width
    pub width: u32,
    /// Bitmap height
    pub height: u32,
    /// Offset from the pen position to the bitmap's top-left corner,
    /// y measured upwards from the baseline
    pub bearing: Vec2,
    /// Horizontal pen advance
    pub advance: f32,
    /// Row-major coverage, top row first, `width * height` bytes
    pub coverage: Vec<u8>,
}

/// Source of glyph bitmaps
pub trait GlyphRasterizer {
    /// Rasterize `ch` at `pixel_size`, or `None` when the source has no glyph for it
    fn rasterize(&self, ch: char, pixel_size: f32) -> Option<RasterizedGlyph>;
}

/// TrueType/OpenType font
pub struct FontFace {
    font: Font,
}

impl FontFace {
    /// Parse font data
    pub fn from_bytes(bytes: &[u8]) -> RenderResult<Self> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| RenderError::FontParse(e.to_string()))?;
        Ok(Self { font })
    }

    /// Read and parse a font file
    pub fn from_file(path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| RenderError::Io {
            path: path.display().to_string(),
            source,
        })?;
        log::info!("Loaded font '{}'", path.display());
        Self::from_bytes(&bytes)
    }
}

impl GlyphRasterizer for FontFace {
    fn rasterize(&self, ch: char, pixel_size: f32) -> Option<RasterizedGlyph> {
        // control characters have no outline; keep whatever the face maps them to
        if !ch.is_control() && self.font.lookup_glyph_index(ch) == 0 {
            return None;
        }

        let (metrics, coverage) = self.font.rasterize(ch, pixel_size);
        Some(glyph_from_metrics(&metrics, coverage))
    }
}

/// fontdue measures `ymin` from the baseline to the bitmap's bottom edge
fn glyph_from_metrics(metrics: &Metrics, coverage: Vec<u8>) -> RasterizedGlyph {
    RasterizedGlyph {
        width: metrics.width as u32,
        height: metrics.height as u32,
        bearing: Vec2::new(metrics.xmin as f32, (metrics.ymin + metrics.height as i32) as f32),
        advance: metrics.advance_width,
        coverage,
    }
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace").field("glyphs", &self.font.glyph_count()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_font_data_is_an_error() {
        let result = FontFace::from_bytes(&[0, 1, 2, 3]);
        assert!(matches!(result, Err(RenderError::FontParse(_))));
    }

    #[test]
    fn test_missing_font_file_is_an_error() {
        let result = FontFace::from_file("missing/font.ttf");
        assert!(matches!(result, Err(RenderError::Io { .. })));
    }

    #[test]
    fn test_descender_bearing_is_measured_from_the_top_edge() {
        let metrics = Metrics {
            xmin: 1,
            ymin: -4,
            width: 6,
            height: 10,
            advance_width: 8.5,
            ..Default::default()
        };
        let glyph = glyph_from_metrics(&metrics, vec![0xff; 60]);

        assert_eq!((glyph.width, glyph.height), (6, 10));
        assert_eq!(glyph.bearing, Vec2::new(1.0, 6.0));
        assert_eq!(glyph.advance, 8.5);
        assert_eq!(glyph.coverage.len(), 60);
    }

    #[test]
    fn test_empty_glyph_keeps_its_advance() {
        let metrics = Metrics {
            advance_width: 12.0,
            ..Default::default()
        };
        let glyph = glyph_from_metrics(&metrics, Vec::new());

        assert_eq!((glyph.width, glyph.height), (0, 0));
        assert_eq!(glyph.bearing, Vec2::zeros());
        assert_eq!(glyph.advance, 12.0);
    }
}
