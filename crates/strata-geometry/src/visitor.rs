//! Path segment visitor.
//!
//! Walks a [`Path`] and reports a reduced event stream (moves, lines,
//! quadratics, closes) to a [`SegmentHandler`]. Conics and cubics are
//! turned into quadratics here, so handlers only ever see two segment kinds.

use glam::Vec2;
use strata_core::profiling::profile_function;
use tracing::trace;

use crate::curve::{Conic, CubicBezier, QuadraticBezier};
use crate::path::{Path, PathCommand};

/// Receiver of segment events.
///
/// Every event stream is `begin_path`, then per contour one `move_to`
/// followed by any number of `line_to` / `quad_to` and an optional `close`,
/// then `end_path`.
pub trait SegmentHandler {
    fn begin_path(&mut self) {}

    fn end_path(&mut self) {}

    fn move_to(&mut self, p: Vec2);

    fn line_to(&mut self, p0: Vec2, p1: Vec2);

    fn quad_to(&mut self, p0: Vec2, p1: Vec2, p2: Vec2);

    fn close(&mut self) {}
}

/// Cursor state carried between commands.
#[derive(Debug, Default)]
struct Cursor {
    first: Vec2,
    prev: Vec2,
    open: bool,
    closed: bool,
}

impl Cursor {
    fn line<H: SegmentHandler + ?Sized>(&mut self, handler: &mut H, to: Vec2) {
        handler.line_to(self.prev, to);
        self.prev = to;
        self.closed = false;
    }

    fn quad<H: SegmentHandler + ?Sized>(&mut self, handler: &mut H, quad: QuadraticBezier) {
        handler.quad_to(quad.from, quad.control, quad.to);
        self.prev = quad.to;
        self.closed = false;
    }

    /// Close the contour, adding the closing edge when needed.
    fn close<H: SegmentHandler + ?Sized>(&mut self, handler: &mut H) {
        if !self.open || self.closed {
            return;
        }
        if self.prev != self.first {
            self.line(handler, self.first);
        }
        handler.close();
        self.closed = true;
    }
}

/// Report every segment of `path` to `handler`.
///
/// With `force_close` every contour is closed, as filling requires.
pub fn visit_path<H: SegmentHandler + ?Sized>(path: &Path, force_close: bool, handler: &mut H) {
    profile_function!();

    let mut cursor = Cursor::default();
    handler.begin_path();

    for cmd in path.commands() {
        match *cmd {
            PathCommand::MoveTo(p) => {
                if force_close {
                    cursor.close(handler);
                }
                if !p.is_finite() {
                    trace!("skipping contour with non-finite start {:?}", p);
                    cursor.open = false;
                    continue;
                }
                cursor.first = p;
                cursor.prev = p;
                cursor.open = true;
                cursor.closed = false;
                handler.move_to(p);
            }
            _ if !cursor.open => {
                trace!("skipping {:?} outside of a contour", cmd);
            }
            PathCommand::LineTo(p) => {
                if p.is_finite() {
                    cursor.line(handler, p);
                } else {
                    trace!("skipping line to non-finite point");
                }
            }
            PathCommand::QuadTo { control, to } => {
                let quad = QuadraticBezier::new(cursor.prev, control, to);
                if control.is_finite() && to.is_finite() {
                    cursor.quad(handler, quad);
                } else {
                    trace!("skipping quad with non-finite points");
                }
            }
            PathCommand::ConicTo {
                control,
                to,
                weight,
            } => {
                if !(control.is_finite() && to.is_finite() && weight.is_finite()) {
                    trace!("skipping conic with non-finite input");
                    continue;
                }
                let conic = Conic::new(cursor.prev, control, to, weight);
                for quad in conic.chop_into_quads() {
                    cursor.quad(handler, quad);
                }
            }
            PathCommand::CubicTo {
                control1,
                control2,
                to,
            } => {
                if !(control1.is_finite() && control2.is_finite() && to.is_finite()) {
                    trace!("skipping cubic with non-finite points");
                    continue;
                }
                let cubic = CubicBezier::new(cursor.prev, control1, control2, to);
                for quad in cubic.to_quadratics() {
                    cursor.quad(handler, quad);
                }
            }
            PathCommand::Close => cursor.close(handler),
        }
    }

    if force_close {
        cursor.close(handler);
    }
    handler.end_path();
}
