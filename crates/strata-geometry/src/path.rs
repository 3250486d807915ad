//! Path primitives for vector graphics.
//!
//! A path is a sequence of drawing commands that define a shape. Paths are
//! immutable once built; [`PathBuilder`] is the only way to grow one.

use glam::Vec2;
use strata_core::Rect;
use strata_core::math::cross;

/// Weight of a conic describing a quarter of a circle or ellipse.
pub const QUARTER_ARC_WEIGHT: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// A command in a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    /// Move to a new position without drawing.
    MoveTo(Vec2),
    /// Draw a line to a position.
    LineTo(Vec2),
    /// Draw a quadratic Bezier curve.
    QuadTo {
        /// Control point
        control: Vec2,
        /// End point
        to: Vec2,
    },
    /// Draw a rational quadratic curve.
    ConicTo {
        /// Control point
        control: Vec2,
        /// End point
        to: Vec2,
        /// Weight of the control point
        weight: f32,
    },
    /// Draw a cubic Bezier curve.
    CubicTo {
        /// First control point
        control1: Vec2,
        /// Second control point
        control2: Vec2,
        /// End point
        to: Vec2,
    },
    /// Close the current sub-path by drawing a line to the start.
    Close,
}

/// How overlapping contours decide what is inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    /// Inside where the winding number is non-zero.
    #[default]
    NonZero,
    /// Inside where the winding number is odd.
    EvenOdd,
}

/// Whether a path is known to be convex.
///
/// Convex paths skip the stencil pass and are fanned straight into color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Convexity {
    #[default]
    Unknown,
    Convex,
    Concave,
}

/// A 2D path consisting of drawing commands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    commands: Vec<PathCommand>,
    fill_rule: FillRule,
    convexity: Convexity,
}

impl Path {
    /// Create a new empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a path from a list of commands.
    ///
    /// The commands are taken as is; convexity is computed from them.
    pub fn from_commands(commands: Vec<PathCommand>) -> Self {
        let convexity = compute_convexity(&commands);
        Self {
            commands,
            fill_rule: FillRule::NonZero,
            convexity,
        }
    }

    /// Get the commands in this path.
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Check if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Get the number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    pub fn convexity(&self) -> Convexity {
        self.convexity
    }

    pub fn is_convex(&self) -> bool {
        self.convexity == Convexity::Convex
    }

    /// Replace the fill rule.
    pub fn with_fill_rule(mut self, fill_rule: FillRule) -> Self {
        self.fill_rule = fill_rule;
        self
    }

    /// Override the computed convexity.
    ///
    /// Marking a concave path as convex makes the fill fan it directly, which
    /// produces wrong coverage. Callers only do this for shapes they built.
    pub fn with_convexity(mut self, convexity: Convexity) -> Self {
        self.convexity = convexity;
        self
    }

    /// Number of contours (one per `MoveTo`).
    pub fn contour_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|cmd| matches!(cmd, PathCommand::MoveTo(_)))
            .count()
    }

    /// Conservative bounding box including control points.
    pub fn bounds(&self) -> Option<Rect> {
        if self.commands.is_empty() {
            return None;
        }

        let points = self.commands.iter().flat_map(|cmd| {
            let (a, b, c) = match *cmd {
                PathCommand::MoveTo(to) | PathCommand::LineTo(to) => (Some(to), None, None),
                PathCommand::QuadTo { control, to } | PathCommand::ConicTo { control, to, .. } => {
                    (Some(control), Some(to), None)
                }
                PathCommand::CubicTo {
                    control1,
                    control2,
                    to,
                } => (Some(control1), Some(control2), Some(to)),
                PathCommand::Close => (None, None, None),
            };
            a.into_iter().chain(b).chain(c)
        });

        Rect::from_points(points)
    }

    /// Reverse the path direction.
    ///
    /// Each contour is walked backwards; closed contours stay closed.
    pub fn reverse(&self) -> Self {
        let mut reversed = Vec::with_capacity(self.commands.len());
        let mut subpath_start = Vec2::ZERO;
        let mut current = Vec2::ZERO;
        let mut subpath_commands = Vec::new();
        let mut closed = false;

        let flush = |reversed: &mut Vec<PathCommand>,
                     subpath_commands: &mut Vec<PathCommand>,
                     current: Vec2,
                     closed: bool| {
            if subpath_commands.is_empty() {
                return;
            }
            reversed.push(PathCommand::MoveTo(current));
            reversed.extend(subpath_commands.drain(..).rev());
            if closed {
                reversed.push(PathCommand::Close);
            }
        };

        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo(to) => {
                    flush(&mut reversed, &mut subpath_commands, current, closed);
                    closed = false;
                    subpath_start = to;
                    current = to;
                }
                PathCommand::LineTo(to) => {
                    subpath_commands.push(PathCommand::LineTo(current));
                    current = to;
                }
                PathCommand::QuadTo { control, to } => {
                    subpath_commands.push(PathCommand::QuadTo {
                        control,
                        to: current,
                    });
                    current = to;
                }
                PathCommand::ConicTo {
                    control,
                    to,
                    weight,
                } => {
                    subpath_commands.push(PathCommand::ConicTo {
                        control,
                        to: current,
                        weight,
                    });
                    current = to;
                }
                PathCommand::CubicTo {
                    control1,
                    control2,
                    to,
                } => {
                    subpath_commands.push(PathCommand::CubicTo {
                        control1: control2,
                        control2: control1,
                        to: current,
                    });
                    current = to;
                }
                PathCommand::Close => {
                    if current != subpath_start {
                        subpath_commands.push(PathCommand::LineTo(current));
                        current = subpath_start;
                    }
                    closed = true;
                }
            }
        }
        flush(&mut reversed, &mut subpath_commands, current, closed);

        Self {
            commands: reversed,
            fill_rule: self.fill_rule,
            convexity: self.convexity,
        }
    }
}

/// A rectangle with elliptical corners of equal radii.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundRect {
    pub rect: Rect,
    pub radii: Vec2,
}

impl RoundRect {
    pub fn new(rect: Rect, rx: f32, ry: f32) -> Self {
        Self {
            rect,
            radii: Vec2::new(rx, ry),
        }
    }

    /// Radii clamped to half the rect size; zero when either radius is not
    /// positive.
    pub fn clamped_radii(&self) -> Vec2 {
        if !(self.radii.x > 0.0 && self.radii.y > 0.0) {
            return Vec2::ZERO;
        }
        Vec2::new(
            self.radii.x.min(self.rect.width() * 0.5),
            self.radii.y.min(self.rect.height() * 0.5),
        )
    }
}

/// Builder for constructing paths.
#[derive(Debug, Default)]
pub struct PathBuilder {
    commands: Vec<PathCommand>,
    current_pos: Vec2,
    subpath_start: Vec2,
    in_contour: bool,
    fill_rule: FillRule,
}

impl PathBuilder {
    /// Create a new path builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to a new position without drawing.
    pub fn move_to(&mut self, to: Vec2) -> &mut Self {
        // a trailing MoveTo has nothing to start
        if let Some(PathCommand::MoveTo(last)) = self.commands.last_mut() {
            *last = to;
        } else {
            self.commands.push(PathCommand::MoveTo(to));
        }
        self.current_pos = to;
        self.subpath_start = to;
        self.in_contour = true;
        self
    }

    /// Start a contour at the current position if none is open.
    fn ensure_contour(&mut self) {
        if !self.in_contour {
            self.move_to(self.current_pos);
        }
    }

    /// Draw a line to a position.
    pub fn line_to(&mut self, to: Vec2) -> &mut Self {
        self.ensure_contour();
        self.commands.push(PathCommand::LineTo(to));
        self.current_pos = to;
        self
    }

    /// Draw a horizontal line to x coordinate.
    pub fn horizontal_line_to(&mut self, x: f32) -> &mut Self {
        let to = Vec2::new(x, self.current_pos.y);
        self.line_to(to)
    }

    /// Draw a vertical line to y coordinate.
    pub fn vertical_line_to(&mut self, y: f32) -> &mut Self {
        let to = Vec2::new(self.current_pos.x, y);
        self.line_to(to)
    }

    /// Draw a quadratic Bezier curve.
    pub fn quad_to(&mut self, control: Vec2, to: Vec2) -> &mut Self {
        self.ensure_contour();
        self.commands.push(PathCommand::QuadTo { control, to });
        self.current_pos = to;
        self
    }

    /// Draw a conic (weighted quadratic) curve.
    pub fn conic_to(&mut self, control: Vec2, to: Vec2, weight: f32) -> &mut Self {
        self.ensure_contour();
        self.commands.push(PathCommand::ConicTo {
            control,
            to,
            weight,
        });
        self.current_pos = to;
        self
    }

    /// Draw a cubic Bezier curve.
    pub fn cubic_to(&mut self, control1: Vec2, control2: Vec2, to: Vec2) -> &mut Self {
        self.ensure_contour();
        self.commands.push(PathCommand::CubicTo {
            control1,
            control2,
            to,
        });
        self.current_pos = to;
        self
    }

    /// Close the current sub-path.
    pub fn close(&mut self) -> &mut Self {
        if self.in_contour {
            self.commands.push(PathCommand::Close);
            self.current_pos = self.subpath_start;
            self.in_contour = false;
        }
        self
    }

    /// Add a closed rectangle, clockwise on screen (y down).
    pub fn rect(&mut self, rect: Rect) -> &mut Self {
        let [lt, rt, rb, lb] = rect.corners();
        self.move_to(lt);
        self.line_to(rt);
        self.line_to(rb);
        self.line_to(lb);
        self.close()
    }

    /// Add an ellipse inscribed in `rect` as four conic quadrants.
    pub fn oval(&mut self, rect: Rect) -> &mut Self {
        let c = rect.center();
        let (l, t, r, b) = (rect.left, rect.top, rect.right, rect.bottom);

        self.move_to(Vec2::new(r, c.y));
        self.conic_to(Vec2::new(r, b), Vec2::new(c.x, b), QUARTER_ARC_WEIGHT);
        self.conic_to(Vec2::new(l, b), Vec2::new(l, c.y), QUARTER_ARC_WEIGHT);
        self.conic_to(Vec2::new(l, t), Vec2::new(c.x, t), QUARTER_ARC_WEIGHT);
        self.conic_to(Vec2::new(r, t), Vec2::new(r, c.y), QUARTER_ARC_WEIGHT);
        self.close()
    }

    /// Add a circle to the path.
    pub fn circle(&mut self, center: Vec2, radius: f32) -> &mut Self {
        self.oval(Rect::from_ltrb(
            center.x - radius,
            center.y - radius,
            center.x + radius,
            center.y + radius,
        ))
    }

    /// Add a rounded rectangle. Zero radii degrade to a plain rect.
    pub fn round_rect(&mut self, rrect: &RoundRect) -> &mut Self {
        let radii = rrect.clamped_radii();
        if radii == Vec2::ZERO {
            return self.rect(rrect.rect);
        }

        let (l, t, r, b) = (rrect.rect.left, rrect.rect.top, rrect.rect.right, rrect.rect.bottom);
        let (rx, ry) = (radii.x, radii.y);

        self.move_to(Vec2::new(l + rx, t));
        self.line_to(Vec2::new(r - rx, t));
        self.conic_to(Vec2::new(r, t), Vec2::new(r, t + ry), QUARTER_ARC_WEIGHT);
        self.line_to(Vec2::new(r, b - ry));
        self.conic_to(Vec2::new(r, b), Vec2::new(r - rx, b), QUARTER_ARC_WEIGHT);
        self.line_to(Vec2::new(l + rx, b));
        self.conic_to(Vec2::new(l, b), Vec2::new(l, b - ry), QUARTER_ARC_WEIGHT);
        self.line_to(Vec2::new(l, t + ry));
        self.conic_to(Vec2::new(l, t), Vec2::new(l + rx, t), QUARTER_ARC_WEIGHT);
        self.close()
    }

    /// Add a polygon to the path.
    pub fn polygon(&mut self, points: &[Vec2]) -> &mut Self {
        let Some((first, rest)) = points.split_first() else {
            return self;
        };

        self.move_to(*first);
        for point in rest {
            self.line_to(*point);
        }
        self.close()
    }

    /// Set the fill rule of the built path.
    pub fn fill_rule(&mut self, fill_rule: FillRule) -> &mut Self {
        self.fill_rule = fill_rule;
        self
    }

    /// Get the current position.
    pub fn current_pos(&self) -> Vec2 {
        self.current_pos
    }

    /// Build the path, classifying its convexity.
    pub fn build(mut self) -> Path {
        if matches!(self.commands.last(), Some(PathCommand::MoveTo(_))) {
            self.commands.pop();
        }
        Path::from_commands(self.commands).with_fill_rule(self.fill_rule)
    }
}

/// Sine of the smallest turn angle counted when classifying convexity.
const CONVEXITY_TOLERANCE: f32 = 1e-5;

/// Classify a command list.
///
/// A single contour whose control polygon turns one way and winds once is
/// convex; curves are judged by their control points, which is conservative.
fn compute_convexity(commands: &[PathCommand]) -> Convexity {
    let mut points: Vec<Vec2> = Vec::with_capacity(commands.len() * 2);
    let mut contours = 0;

    for cmd in commands {
        match *cmd {
            PathCommand::MoveTo(to) => {
                contours += 1;
                if contours > 1 {
                    return Convexity::Concave;
                }
                points.push(to);
            }
            PathCommand::LineTo(to) => points.push(to),
            PathCommand::QuadTo { control, to } | PathCommand::ConicTo { control, to, .. } => {
                points.push(control);
                points.push(to);
            }
            PathCommand::CubicTo {
                control1,
                control2,
                to,
            } => {
                points.push(control1);
                points.push(control2);
                points.push(to);
            }
            PathCommand::Close => {}
        }
    }

    if points.iter().any(|p| !p.is_finite()) {
        return Convexity::Unknown;
    }

    points.dedup();
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    let n = points.len();
    if n < 3 {
        return Convexity::Convex;
    }

    let mut winding: Option<bool> = None;
    let mut x_flips = 0;
    let mut y_flips = 0;
    let mut last_dx = 0.0f32;
    let mut last_dy = 0.0f32;

    for i in 0..n {
        let p0 = points[i];
        let p1 = points[(i + 1) % n];
        let p2 = points[(i + 2) % n];

        let (e0, e1) = (p1 - p0, p2 - p1);
        let turn = cross(e0, e1);
        // relative tolerance so tiny glyph outlines still classify
        if turn.abs() > CONVEXITY_TOLERANCE * e0.length() * e1.length() {
            let sign = turn > 0.0;
            match winding {
                None => winding = Some(sign),
                Some(w) if w != sign => return Convexity::Concave,
                Some(_) => {}
            }
        }

        let d = p1 - p0;
        if d.x != 0.0 {
            if last_dx != 0.0 && d.x.signum() != last_dx.signum() {
                x_flips += 1;
            }
            last_dx = d.x;
        }
        if d.y != 0.0 {
            if last_dy != 0.0 && d.y.signum() != last_dy.signum() {
                y_flips += 1;
            }
            last_dy = d.y;
        }
    }

    // a simple convex loop reverses each axis direction exactly twice,
    // counting the wrap back to the first edge
    let first = points[1] - points[0];
    let wrap_x = first.x != 0.0 && last_dx != 0.0 && first.x.signum() != last_dx.signum();
    let wrap_y = first.y != 0.0 && last_dy != 0.0 && first.y.signum() != last_dy.signum();
    if x_flips > 2 || y_flips > 2 || (x_flips == 2 && wrap_x) || (y_flips == 2 && wrap_y) {
        return Convexity::Concave;
    }

    Convexity::Convex
}
