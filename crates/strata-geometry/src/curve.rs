//! Bezier and conic curve primitives.
//!
//! The rasterizer only consumes lines and quadratics. Cubics and conics are
//! reduced to quadratics here with a fixed amount of subdivision: 8 pieces per
//! cubic, 2 per conic. There is no error bound tied to on-screen scale, so
//! strongly zoomed curves facet.

use glam::Vec2;

/// Number of halvings applied to a cubic before each piece is approximated
/// by a quadratic (2^3 = 8 pieces).
pub const CUBIC_SUBDIVISION_DEPTH: u32 = 3;

/// Number of quadratics produced per cubic.
pub const QUADS_PER_CUBIC: usize = 1 << CUBIC_SUBDIVISION_DEPTH;

/// Number of quadratics produced per conic.
pub const QUADS_PER_CONIC: usize = 2;

/// A quadratic Bezier curve (one control point).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticBezier {
    /// Start point
    pub from: Vec2,
    /// Control point
    pub control: Vec2,
    /// End point
    pub to: Vec2,
}

impl QuadraticBezier {
    pub fn new(from: Vec2, control: Vec2, to: Vec2) -> Self {
        Self { from, control, to }
    }

    /// Evaluate the curve at parameter t (0.0 to 1.0).
    pub fn eval(&self, t: f32) -> Vec2 {
        let mt = 1.0 - t;
        self.from * (mt * mt) + self.control * (2.0 * mt * t) + self.to * (t * t)
    }

    /// Unit tangent at the start. Falls back to the chord when the control
    /// point coincides with the start.
    pub fn start_tangent(&self) -> Vec2 {
        let d = self.control - self.from;
        if d == Vec2::ZERO {
            (self.to - self.from).normalize()
        } else {
            d.normalize()
        }
    }

    /// Unit tangent at the end. Falls back to the chord when the control
    /// point coincides with the end.
    pub fn end_tangent(&self) -> Vec2 {
        let d = self.to - self.control;
        if d == Vec2::ZERO {
            (self.to - self.from).normalize()
        } else {
            d.normalize()
        }
    }

    /// Split the curve at parameter t.
    pub fn split(&self, t: f32) -> (Self, Self) {
        let p01 = self.from.lerp(self.control, t);
        let p12 = self.control.lerp(self.to, t);
        let p012 = p01.lerp(p12, t);

        (
            Self::new(self.from, p01, p012),
            Self::new(p012, p12, self.to),
        )
    }
}

/// Halvings after which a quadratic is taken as flat whatever its error.
pub const MAX_FLATTEN_DEPTH: u32 = 6;

impl QuadraticBezier {
    /// Report the end point of every line of a polyline within `tolerance`
    /// of the curve, start point excluded. Halves until the curve midpoint
    /// is close enough to the chord.
    pub fn flatten(&self, tolerance: f32, emit: &mut impl FnMut(Vec2)) {
        self.flatten_to_depth(tolerance, 0, emit);
    }

    fn flatten_to_depth(&self, tolerance: f32, depth: u32, emit: &mut impl FnMut(Vec2)) {
        let chord_mid = (self.from + self.to) * 0.5;
        // NaN error falls through to the chord
        let error = chord_mid.distance(self.eval(0.5));
        if depth >= MAX_FLATTEN_DEPTH || !(error > tolerance) {
            emit(self.to);
            return;
        }
        let (first, second) = self.split(0.5);
        first.flatten_to_depth(tolerance, depth + 1, emit);
        second.flatten_to_depth(tolerance, depth + 1, emit);
    }
}

/// A cubic Bezier curve (two control points).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub from: Vec2,
    pub control1: Vec2,
    pub control2: Vec2,
    pub to: Vec2,
}

impl CubicBezier {
    pub fn new(from: Vec2, control1: Vec2, control2: Vec2, to: Vec2) -> Self {
        Self {
            from,
            control1,
            control2,
            to,
        }
    }

    /// Evaluate the curve at parameter t (0.0 to 1.0).
    pub fn eval(&self, t: f32) -> Vec2 {
        let mt = 1.0 - t;
        self.from * (mt * mt * mt)
            + self.control1 * (3.0 * mt * mt * t)
            + self.control2 * (3.0 * mt * t * t)
            + self.to * (t * t * t)
    }

    /// Split the curve at parameter t.
    pub fn split(&self, t: f32) -> (Self, Self) {
        let p01 = self.from.lerp(self.control1, t);
        let p12 = self.control1.lerp(self.control2, t);
        let p23 = self.control2.lerp(self.to, t);
        let p012 = p01.lerp(p12, t);
        let p123 = p12.lerp(p23, t);
        let p0123 = p012.lerp(p123, t);

        (
            Self::new(self.from, p01, p012, p0123),
            Self::new(p0123, p123, p23, self.to),
        )
    }

    /// Single quadratic sharing the end points whose control point is the
    /// midpoint-preserving approximation `(3(c1 + c2) - p0 - p3) / 4`.
    pub fn to_quadratic(&self) -> QuadraticBezier {
        let control = ((self.control1 + self.control2) * 3.0 - self.from - self.to) * 0.25;
        QuadraticBezier::new(self.from, control, self.to)
    }

    /// Fixed-depth reduction into [`QUADS_PER_CUBIC`] quadratics.
    pub fn to_quadratics(&self) -> [QuadraticBezier; QUADS_PER_CUBIC] {
        let mut pieces = [*self; QUADS_PER_CUBIC];
        let mut count = 1;
        for _ in 0..CUBIC_SUBDIVISION_DEPTH {
            // split back to front so earlier pieces are not overwritten
            for i in (0..count).rev() {
                let (left, right) = pieces[i].split(0.5);
                pieces[2 * i] = left;
                pieces[2 * i + 1] = right;
            }
            count *= 2;
        }
        pieces.map(|piece| piece.to_quadratic())
    }
}

/// A rational quadratic curve with weight `w` on the control point.
///
/// `w == 1` is a parabola (plain quadratic), `w < 1` an ellipse arc and
/// `w > 1` a hyperbola arc. A quarter circle has `w = sqrt(2) / 2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conic {
    pub from: Vec2,
    pub control: Vec2,
    pub to: Vec2,
    pub weight: f32,
}

impl Conic {
    pub fn new(from: Vec2, control: Vec2, to: Vec2, weight: f32) -> Self {
        Self {
            from,
            control,
            to,
            weight,
        }
    }

    /// Evaluate the curve at parameter t (0.0 to 1.0).
    pub fn eval(&self, t: f32) -> Vec2 {
        let mt = 1.0 - t;
        let a = mt * mt;
        let b = 2.0 * self.weight * mt * t;
        let c = t * t;
        (self.from * a + self.control * b + self.to * c) / (a + b + c)
    }

    /// Split at t = 0.5 into two conics in standard form.
    pub fn chop(&self) -> [Conic; 2] {
        let w = self.weight;
        let scale = 1.0 / (1.0 + w);
        let wp1 = self.control * w;

        let mut mid = (self.from + wp1 * 2.0 + self.to) * scale * 0.5;
        if !mid.is_finite() {
            let wd = w as f64;
            let half = 1.0 / (1.0 + wd) * 0.5;
            let sum = self.from.as_dvec2() + self.control.as_dvec2() * (wd * 2.0) + self.to.as_dvec2();
            mid = (sum * half).as_vec2();
        }

        let new_weight = (0.5 + w * 0.5).sqrt();
        [
            Conic::new(self.from, (self.from + wp1) * scale, mid, new_weight),
            Conic::new(mid, (wp1 + self.to) * scale, self.to, new_weight),
        ]
    }

    /// One weight-aware chop, each half read as a quadratic.
    pub fn chop_into_quads(&self) -> [QuadraticBezier; QUADS_PER_CONIC] {
        self.chop()
            .map(|half| QuadraticBezier::new(half.from, half.control, half.to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2, tol: f32) -> bool {
        (a - b).length() <= tol
    }

    #[test]
    fn test_quadratic_endpoints() {
        let curve = QuadraticBezier::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(50.0, 100.0),
            Vec2::new(100.0, 0.0),
        );

        assert_eq!(curve.eval(0.0), curve.from);
        assert_eq!(curve.eval(1.0), curve.to);
    }

    #[test]
    fn test_quadratic_split() {
        let curve = QuadraticBezier::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(50.0, 100.0),
            Vec2::new(100.0, 0.0),
        );

        let (left, right) = curve.split(0.5);
        let midpoint = curve.eval(0.5);

        assert!(close(left.to, midpoint, 0.001));
        assert!(close(right.from, midpoint, 0.001));
    }

    #[test]
    fn test_quadratic_flatten() {
        let curve = QuadraticBezier::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(50.0, 100.0),
            Vec2::new(100.0, 0.0),
        );
        let mut points = Vec::new();
        curve.flatten(0.25, &mut |p| points.push(p));

        assert!(points.len() > 4);
        assert_eq!(points.last(), Some(&curve.to));
        // every vertex lies on the curve
        for p in &points {
            let t = p.x / 100.0;
            assert!(close(*p, curve.eval(t), 0.01));
        }

        let line = QuadraticBezier::new(Vec2::ZERO, Vec2::new(5.0, 0.0), Vec2::new(10.0, 0.0));
        let mut count = 0;
        line.flatten(0.25, &mut |_| count += 1);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_cubic_reduces_to_eight_connected_quads() {
        let cubic = CubicBezier::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 100.0),
            Vec2::new(100.0, 100.0),
            Vec2::new(100.0, 0.0),
        );
        let quads = cubic.to_quadratics();

        assert_eq!(quads.len(), 8);
        assert_eq!(quads[0].from, cubic.from);
        assert_eq!(quads[7].to, cubic.to);
        for pair in quads.windows(2) {
            assert_eq!(pair[0].to, pair[1].from);
        }
        // piece i ends at t = (i + 1) / 8 on the cubic
        for (i, quad) in quads.iter().enumerate() {
            let t = (i + 1) as f32 / 8.0;
            assert!(close(quad.to, cubic.eval(t), 0.01), "piece {} end drifted", i);
        }
    }

    #[test]
    fn test_conic_chop_stays_on_curve() {
        // quarter circle of radius 100
        let conic = Conic::new(
            Vec2::new(100.0, 0.0),
            Vec2::new(100.0, 100.0),
            Vec2::new(0.0, 100.0),
            std::f32::consts::FRAC_1_SQRT_2,
        );
        let [a, b] = conic.chop();

        assert_eq!(a.to, b.from);
        assert!((a.to.length() - 100.0).abs() < 0.01, "midpoint should lie on the circle");
        assert!((a.weight - b.weight).abs() < f32::EPSILON);
        assert!(a.weight > conic.weight);
    }

    #[test]
    fn test_conic_chop_into_quads() {
        let conic = Conic::new(
            Vec2::new(100.0, 0.0),
            Vec2::new(100.0, 100.0),
            Vec2::new(0.0, 100.0),
            std::f32::consts::FRAC_1_SQRT_2,
        );
        let quads = conic.chop_into_quads();
        assert_eq!(quads.len(), 2);
        assert_eq!(quads[0].from, conic.from);
        assert_eq!(quads[1].to, conic.to);
        assert!(close(quads[0].eval(1.0), conic.eval(0.5), 0.01));
    }

    #[test]
    fn test_parabolic_conic_matches_quadratic() {
        let conic = Conic::new(Vec2::ZERO, Vec2::new(50.0, 100.0), Vec2::new(100.0, 0.0), 1.0);
        let quad = QuadraticBezier::new(conic.from, conic.control, conic.to);
        for i in 0..=4 {
            let t = i as f32 / 4.0;
            assert!(close(conic.eval(t), quad.eval(t), 0.001));
        }
    }
}
