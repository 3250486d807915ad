//! Anti-alias fringe for targets without multisampling.
//!
//! Every outline segment gets a band [`AA_WIDTH`] wide on both of its
//! sides. Vertices on the outline carry coverage 1 and the band's far
//! vertices coverage 0, so the fragment stage fades the paint out across
//! the band. The draw masks the band with the fill's winding, which leaves
//! only the outer half visible.

use glam::Vec2;
use strata_core::profiling::profile_function;

use super::{RasterWriter, expand_line};
use crate::curve::QuadraticBezier;
use crate::mesh::{Mesh, RangeKind, RasterRanges};
use crate::path::Path;
use crate::visitor::{SegmentHandler, visit_path};

/// Band width in path units.
pub const AA_WIDTH: f32 = 1.0;

/// Largest distance between a curve and its flattened fringe.
const FRINGE_TOLERANCE: f32 = 0.25;

/// Turns segment events into fringe quads.
#[derive(Debug)]
pub struct AaFringe<'m> {
    writer: RasterWriter<'m>,
    width: f32,
}

impl<'m> AaFringe<'m> {
    pub fn new(mut writer: RasterWriter<'m>, width: f32) -> Self {
        writer.set_target(RangeKind::AaOutline);
        Self { writer, width }
    }

    pub fn into_writer(self) -> RasterWriter<'m> {
        self.writer
    }

    fn edge(&mut self, p0: Vec2, p1: Vec2) {
        let Some([left0, right0, left1, right1]) = expand_line(p0, p1, self.width) else {
            return;
        };
        let from = self.writer.aa_vertex(p0, 1.0);
        let to = self.writer.aa_vertex(p1, 1.0);
        let left0 = self.writer.aa_vertex(left0, 0.0);
        let right0 = self.writer.aa_vertex(right0, 0.0);
        let left1 = self.writer.aa_vertex(left1, 0.0);
        let right1 = self.writer.aa_vertex(right1, 0.0);

        self.writer.rect(left0, from, left1, to);
        self.writer.rect(from, right0, to, right1);
    }
}

impl SegmentHandler for AaFringe<'_> {
    fn move_to(&mut self, _p: Vec2) {}

    fn line_to(&mut self, p0: Vec2, p1: Vec2) {
        self.edge(p0, p1);
    }

    fn quad_to(&mut self, p0: Vec2, p1: Vec2, p2: Vec2) {
        let mut prev = p0;
        QuadraticBezier::new(p0, p1, p2).flatten(FRINGE_TOLERANCE, &mut |p| {
            self.edge(prev, p);
            prev = p;
        });
    }
}

/// Fringe around every closed contour of `path`, in the aa outline range
/// only.
pub fn aa_fringe(mesh: &mut Mesh, path: &Path, width: f32) -> RasterRanges {
    profile_function!();

    let mut fringe = AaFringe::new(RasterWriter::new(mesh), width);
    visit_path(path, true, &mut fringe);
    fringe.into_writer().finish()
}
