//! Shapes shared by tests and benches.

use std::sync::atomic::{AtomicUsize, Ordering};

use glam::Vec2;
use strata_core::Rect;
use strata_geometry::{FillRule, Path, PathBuilder};
use strata_render::{GlyphId, GlyphSource};

/// Closed polygon through `points`.
pub fn polygon(points: &[Vec2]) -> Path {
    let mut builder = PathBuilder::new();
    builder.polygon(points);
    builder.build()
}

/// Axis aligned rectangle path.
pub fn rect(rect: Rect) -> Path {
    let mut builder = PathBuilder::new();
    builder.rect(rect);
    builder.build()
}

/// Star with `points` tips, alternating between the two radii. Concave for
/// any `inner < outer`.
pub fn star(center: Vec2, outer: f32, inner: f32, points: usize) -> Path {
    let steps = points * 2;
    let vertices: Vec<Vec2> = (0..steps)
        .map(|i| {
            let angle = i as f32 / steps as f32 * std::f32::consts::TAU;
            let radius = if i % 2 == 0 { outer } else { inner };
            center + Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect();
    polygon(&vertices)
}

/// Self-intersecting bow tie: the left lobe winds one way, the right lobe
/// the other, crossing at `(50, 50)`.
pub fn figure_eight() -> Path {
    polygon(&[
        Vec2::new(0.0, 0.0),
        Vec2::new(100.0, 100.0),
        Vec2::new(100.0, 0.0),
        Vec2::new(0.0, 100.0),
    ])
}

/// Square with a square hole wound the same way. Non-zero fills the hole,
/// even-odd leaves it empty.
pub fn nested_squares(fill_rule: FillRule) -> Path {
    let mut builder = PathBuilder::new();
    builder
        .rect(Rect::from_xywh(10.0, 10.0, 80.0, 80.0))
        .rect(Rect::from_xywh(30.0, 30.0, 40.0, 40.0))
        .fill_rule(fill_rule);
    builder.build()
}

/// Glyph source drawing every glyph as a `size` square above the baseline,
/// except glyph 0 which has no outline. Counts outline requests.
#[derive(Debug)]
pub struct CountingGlyphSource {
    size: f32,
    lookups: AtomicUsize,
}

impl CountingGlyphSource {
    pub fn new(size: f32) -> Self {
        Self {
            size,
            lookups: AtomicUsize::new(0),
        }
    }

    /// Outline requests served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

impl GlyphSource for CountingGlyphSource {
    fn glyph_path(&self, glyph: GlyphId) -> Option<Path> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        if glyph == 0 {
            return None;
        }
        Some(rect(Rect::from_xywh(0.0, -self.size, self.size, self.size)))
    }
}
