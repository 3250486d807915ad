//! Direct geometry for simple shapes.
//!
//! These never overlap themselves, so they go straight into the color buffer
//! without a stencil pass.

use glam::Vec2;
use strata_core::Rect;
use tracing::trace;

use super::{RasterWriter, expand_line};
use crate::mesh::{Mesh, RasterRanges};
use crate::stroke::{LineCap, StrokeStyle};

/// A stroked line segment with caps on both ends.
pub fn raster_line(mesh: &mut Mesh, p0: Vec2, p1: Vec2, style: StrokeStyle) -> RasterRanges {
    let mut writer = RasterWriter::new(mesh);
    let r = style.radius();

    let Some(corners) = expand_line(p0, p1, r) else {
        trace!("skipping zero length line at {:?}", p0);
        return writer.finish();
    };
    let [a, b, c, d] = corners.map(|p| writer.line_vertex(p));
    writer.rect(a, b, c, d);

    let dir = (p1 - p0).normalize();
    line_cap(&mut writer, style.cap, p0, corners[0], corners[1], -dir, r);
    line_cap(&mut writer, style.cap, p1, corners[2], corners[3], dir, r);

    writer.finish()
}

/// Extend the ribbon edge `e0 - e1` at `center` by `r` along `out_dir`.
fn line_cap(
    writer: &mut RasterWriter<'_>,
    cap: LineCap,
    center: Vec2,
    e0: Vec2,
    e1: Vec2,
    out_dir: Vec2,
    r: f32,
) {
    let (a, b) = (e0 + out_dir * r, e1 + out_dir * r);
    let [i1, i2, i3, i4] = match cap {
        LineCap::Butt => return,
        LineCap::Round => [e0, e1, a, b].map(|p| writer.circle_vertex(p, center)),
        LineCap::Square => [e0, e1, a, b].map(|p| writer.line_vertex(p)),
    };
    writer.rect(i1, i2, i3, i4);
}

/// A filled axis aligned rect.
pub fn fill_rect(mesh: &mut Mesh, rect: &Rect) -> RasterRanges {
    let mut writer = RasterWriter::new(mesh);
    let rect = rect.sorted();
    if !rect.is_empty() {
        writer.fill_rect(&rect);
    }
    writer.finish()
}

/// The outline of an axis aligned rect as four mitered ribbons. Corners are
/// always mitered; check [`StrokeStyle::miters_right_angles`] first.
pub fn stroke_rect(mesh: &mut Mesh, rect: &Rect, style: StrokeStyle) -> RasterRanges {
    let mut writer = RasterWriter::new(mesh);
    let rect = rect.sorted();
    let r = style.radius();

    // unnormalized corner bisectors, each component is +-1
    let [p1, p2, p3, p4] = rect.corners();
    let corners = [
        (p1, Vec2::new(-1.0, -1.0)),
        (p2, Vec2::new(1.0, -1.0)),
        (p3, Vec2::new(1.0, 1.0)),
        (p4, Vec2::new(-1.0, 1.0)),
    ];

    let indices = corners.map(|(p, out)| {
        let outer = writer.line_vertex(p + out * r);
        let inner = writer.line_vertex(p - out * r);
        (outer, inner)
    });

    for i in 0..4 {
        let (o0, i0) = indices[i];
        let (o1, i1) = indices[(i + 1) % 4];
        writer.rect(o0, i0, o1, i1);
    }
    writer.finish()
}

/// A filled circle as one distance-field quad.
pub fn fill_circle(mesh: &mut Mesh, center: Vec2, radius: f32) -> RasterRanges {
    let mut writer = RasterWriter::new(mesh);
    if !(radius > 0.0) || !center.is_finite() {
        trace!("skipping degenerate circle");
        return writer.finish();
    }

    let a = writer.circle_vertex(center + Vec2::new(-radius, -radius), center);
    let b = writer.circle_vertex(center + Vec2::new(-radius, radius), center);
    let c = writer.circle_vertex(center + Vec2::new(radius, -radius), center);
    let d = writer.circle_vertex(center + Vec2::new(radius, radius), center);
    writer.rect(a, b, c, d);

    writer.finish()
}
