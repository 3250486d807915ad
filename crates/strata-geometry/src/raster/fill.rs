//! Fill tessellator for the stencil-then-cover technique.
//!
//! Each contour is fanned from its first point. Counter-clockwise fan
//! triangles increment the stencil, clockwise ones decrement it, so after the
//! stencil pass every pixel holds its winding number. A cover rect over the
//! bounds then colors the pixels the fill rule accepts.
//!
//! Convex paths skip all of that: their fan is drawn straight into color.

use glam::Vec2;
use strata_core::math::{Orientation, orientation};
use strata_core::profiling::profile_function;

use super::RasterWriter;
use super::aa::AaFringe;
use crate::mesh::{Mesh, RangeKind, RasterRanges};
use crate::path::Path;
use crate::vertex::VertexType;
use crate::visitor::{SegmentHandler, visit_path};

/// Turns segment events into fill triangles.
#[derive(Debug)]
pub struct FillTessellator<'m> {
    writer: RasterWriter<'m>,
    convex: bool,
    first: Vec2,
    first_index: Option<u32>,
}

impl<'m> FillTessellator<'m> {
    /// With `convex` set, triangles go to the color buffer regardless of
    /// their orientation.
    pub fn new(writer: RasterWriter<'m>, convex: bool) -> Self {
        Self {
            writer,
            convex,
            first: Vec2::ZERO,
            first_index: None,
        }
    }

    pub fn into_writer(self) -> RasterWriter<'m> {
        self.writer
    }

    /// Route a triangle by orientation, or to color on the convex path.
    fn emit(&mut self, turn: Orientation, a: u32, b: u32, c: u32) {
        match (self.convex, turn) {
            (_, Orientation::Linear) => {}
            (true, _) => self.writer.triangle(a, b, c),
            (false, Orientation::CounterClockwise) => self.writer.front_triangle(a, b, c),
            (false, Orientation::Clockwise) => self.writer.back_triangle(a, b, c),
        }
    }

    fn fan_triangle(&mut self, p1: Vec2, p2: Vec2) {
        let Some(first_index) = self.first_index else {
            return;
        };
        if p1 == self.first {
            return;
        }
        let turn = orientation(self.first, p1, p2);
        if turn == Orientation::Linear {
            return;
        }
        let i1 = self.writer.line_vertex(p1);
        let i2 = self.writer.line_vertex(p2);
        self.emit(turn, first_index, i1, i2);
    }
}

impl SegmentHandler for FillTessellator<'_> {
    fn move_to(&mut self, p: Vec2) {
        self.first = p;
        self.first_index = Some(self.writer.line_vertex(p));
    }

    fn line_to(&mut self, p1: Vec2, p2: Vec2) {
        self.fan_triangle(p1, p2);
    }

    fn quad_to(&mut self, p1: Vec2, p2: Vec2, p3: Vec2) {
        // chord part of the fan
        self.fan_triangle(p1, p3);

        // curve hull, the fragment stage keeps u² - v <= 0
        let turn = orientation(p1, p2, p3);
        if turn == Orientation::Linear {
            return;
        }
        let i1 = self.writer.vertex(p1, VertexType::QuadIn, 0.0, 0.0);
        let i2 = self.writer.vertex(p2, VertexType::QuadIn, 0.5, 0.0);
        let i3 = self.writer.vertex(p3, VertexType::QuadIn, 1.0, 1.0);
        self.emit(turn, i1, i2, i3);
    }
}

/// Fill `path` into `mesh`.
///
/// Convex paths yield only a color range. Everything else yields stencil
/// front/back ranges plus the cover rect as the color range.
pub fn fill_path(mesh: &mut Mesh, path: &Path) -> RasterRanges {
    profile_function!();
    fill_writer(mesh, path).finish()
}

/// [`fill_path`] plus an anti-alias fringe `aa_width` wide around every
/// contour.
pub fn fill_path_aa(mesh: &mut Mesh, path: &Path, aa_width: f32) -> RasterRanges {
    profile_function!();

    let writer = fill_writer(mesh, path);
    if writer.bounds().is_none() {
        return writer.finish();
    }
    let mut fringe = AaFringe::new(writer, aa_width);
    visit_path(path, true, &mut fringe);
    fringe.into_writer().finish()
}

fn fill_writer<'m>(mesh: &'m mut Mesh, path: &Path) -> RasterWriter<'m> {
    let convex = path.is_convex();
    let mut tessellator = FillTessellator::new(RasterWriter::new(mesh), convex);
    visit_path(path, true, &mut tessellator);

    let mut writer = tessellator.into_writer();
    if !convex {
        if let Some(bounds) = writer.bounds() {
            writer.set_target(RangeKind::Color);
            writer.fill_rect(&bounds);
        }
    }
    writer
}

/// Winding triangles of `path` only, routed by orientation even when the
/// path is convex. Clip masks are built from these.
pub fn stencil_path(mesh: &mut Mesh, path: &Path) -> RasterRanges {
    profile_function!();

    let mut tessellator = FillTessellator::new(RasterWriter::new(mesh), false);
    visit_path(path, true, &mut tessellator);
    tessellator.into_writer().finish()
}
