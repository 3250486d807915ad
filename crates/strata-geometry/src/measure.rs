//! Arc length along path contours.
//!
//! Curves are flattened first, so lengths and extracted pieces follow a
//! polyline within [`MEASURE_TOLERANCE`] of the true curve.

use glam::Vec2;
use strata_core::profiling::profile_function;

use crate::curve::QuadraticBezier;
use crate::path::{Path, PathBuilder};
use crate::visitor::{SegmentHandler, visit_path};

/// Largest distance between a curve and the polyline measured for it.
pub const MEASURE_TOLERANCE: f32 = 0.25;

/// One contour flattened to a polyline, with the running length at every
/// vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourMeasure {
    points: Vec<Vec2>,
    distances: Vec<f32>,
    closed: bool,
}

impl ContourMeasure {
    fn start(p: Vec2) -> Self {
        Self {
            points: vec![p],
            distances: vec![0.0],
            closed: false,
        }
    }

    fn push(&mut self, p: Vec2) {
        let Some(&last) = self.points.last() else {
            return;
        };
        let step = last.distance(p);
        if !(step > 0.0) || !step.is_finite() {
            return;
        }
        let total = self.length() + step;
        self.points.push(p);
        self.distances.push(total);
    }

    pub fn length(&self) -> f32 {
        self.distances.last().copied().unwrap_or(0.0)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Index of the polyline segment holding `distance`.
    fn segment_index(&self, distance: f32) -> usize {
        let upper = self.distances.partition_point(|&d| d <= distance);
        upper.saturating_sub(1).min(self.points.len().saturating_sub(2))
    }

    /// Point `distance` along the contour, clamped to its ends.
    pub fn position_at(&self, distance: f32) -> Option<Vec2> {
        if self.points.len() < 2 {
            return self.points.first().copied();
        }
        let distance = distance.clamp(0.0, self.length());
        let i = self.segment_index(distance);
        let (d0, d1) = (self.distances[i], self.distances[i + 1]);
        let t = (distance - d0) / (d1 - d0);
        Some(self.points[i].lerp(self.points[i + 1], t))
    }

    /// Append the piece between `start` and `end` to `builder`, beginning
    /// a new contour when `move_to` is set and continuing the current one
    /// otherwise. Returns false when the clamped piece is empty.
    pub fn segment(&self, start: f32, end: f32, builder: &mut PathBuilder, move_to: bool) -> bool {
        let start = start.max(0.0);
        let end = end.min(self.length());
        if !(start < end) {
            return false;
        }
        let (Some(first), Some(last)) = (self.position_at(start), self.position_at(end)) else {
            return false;
        };

        if move_to {
            builder.move_to(first);
        } else {
            builder.line_to(first);
        }
        let from = self.segment_index(start) + 1;
        let to = self.segment_index(end);
        for i in from..=to {
            if self.distances[i] > start && self.distances[i] < end {
                builder.line_to(self.points[i]);
            }
        }
        builder.line_to(last);
        true
    }
}

#[derive(Debug, Default)]
struct Measurer {
    contours: Vec<ContourMeasure>,
    current: Option<ContourMeasure>,
}

impl Measurer {
    fn finish_contour(&mut self) {
        if let Some(contour) = self.current.take() {
            if contour.length() > 0.0 {
                self.contours.push(contour);
            }
        }
    }
}

impl SegmentHandler for Measurer {
    fn end_path(&mut self) {
        self.finish_contour();
    }

    fn move_to(&mut self, p: Vec2) {
        self.finish_contour();
        self.current = Some(ContourMeasure::start(p));
    }

    fn line_to(&mut self, _p0: Vec2, p1: Vec2) {
        if let Some(contour) = self.current.as_mut() {
            contour.push(p1);
        }
    }

    fn quad_to(&mut self, p0: Vec2, p1: Vec2, p2: Vec2) {
        if let Some(contour) = self.current.as_mut() {
            QuadraticBezier::new(p0, p1, p2).flatten(MEASURE_TOLERANCE, &mut |p| contour.push(p));
        }
    }

    fn close(&mut self) {
        if let Some(contour) = self.current.as_mut() {
            contour.closed = true;
        }
    }
}

/// Measure every contour of `path` with a non-zero length, in order.
pub fn measure_path(path: &Path) -> Vec<ContourMeasure> {
    profile_function!();

    let mut measurer = Measurer::default();
    visit_path(path, false, &mut measurer);
    measurer.finish_contour();
    measurer.contours
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathCommand;
    use strata_core::Rect;

    fn line(from: Vec2, to: Vec2) -> Path {
        let mut builder = PathBuilder::new();
        builder.move_to(from).line_to(to);
        builder.build()
    }

    #[test]
    fn test_line_length() {
        let contours = measure_path(&line(Vec2::ZERO, Vec2::new(30.0, 40.0)));
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].length(), 50.0);
        assert!(!contours[0].is_closed());
        assert_eq!(contours[0].position_at(25.0), Some(Vec2::new(15.0, 20.0)));
    }

    #[test]
    fn test_closed_rect() {
        let mut builder = PathBuilder::new();
        builder.rect(Rect::from_xywh(0.0, 0.0, 10.0, 20.0));
        let contours = measure_path(&builder.build());

        assert_eq!(contours.len(), 1);
        assert!(contours[0].is_closed());
        assert_eq!(contours[0].length(), 60.0);
    }

    #[test]
    fn test_circle_length() {
        let mut builder = PathBuilder::new();
        builder.circle(Vec2::ZERO, 10.0);
        let contours = measure_path(&builder.build());

        let expected = std::f32::consts::TAU * 10.0;
        assert!((contours[0].length() - expected).abs() < 1.0);
    }

    #[test]
    fn test_zero_length_contours_dropped() {
        let mut builder = PathBuilder::new();
        builder
            .move_to(Vec2::ZERO)
            .line_to(Vec2::ZERO)
            .move_to(Vec2::new(5.0, 5.0))
            .line_to(Vec2::new(5.0, 15.0));
        let contours = measure_path(&builder.build());
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].length(), 10.0);
    }

    #[test]
    fn test_segment_keeps_corners() {
        let mut builder = PathBuilder::new();
        builder
            .move_to(Vec2::ZERO)
            .line_to(Vec2::new(10.0, 0.0))
            .line_to(Vec2::new(10.0, 10.0));
        let contour = &measure_path(&builder.build())[0];

        let mut out = PathBuilder::new();
        assert!(contour.segment(5.0, 15.0, &mut out, true));
        assert_eq!(
            out.build().commands(),
            &[
                PathCommand::MoveTo(Vec2::new(5.0, 0.0)),
                PathCommand::LineTo(Vec2::new(10.0, 0.0)),
                PathCommand::LineTo(Vec2::new(10.0, 5.0)),
            ]
        );

        let mut empty = PathBuilder::new();
        assert!(!contour.segment(12.0, 12.0, &mut empty, true));
        assert!(!contour.segment(25.0, 30.0, &mut empty, true));
    }
}
