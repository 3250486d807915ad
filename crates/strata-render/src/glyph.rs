//! Glyph outlines for text drawing.
//!
//! Shaping and font parsing live outside Strata. A [`GlyphSource`] hands the
//! canvas one outline path per glyph id, in a coordinate space whose origin
//! is the glyph's pen position.

use glam::Vec2;
use strata_geometry::Path;

pub type GlyphId = u16;

/// Provider of glyph outlines, typically one per typeface and size.
pub trait GlyphSource: Send + Sync {
    /// Outline of `glyph`, `None` for glyphs without one (spaces).
    fn glyph_path(&self, glyph: GlyphId) -> Option<Path>;
}

/// A positioned glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub id: GlyphId,
    /// Pen position in canvas coordinates.
    pub origin: Vec2,
}

impl Glyph {
    pub fn new(id: GlyphId, origin: Vec2) -> Self {
        Self { id, origin }
    }
}
