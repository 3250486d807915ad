use glam::Vec2;

/// An axis aligned rectangle stored as left/top/right/bottom edges.
///
/// Follows screen conventions: `top <= bottom` for a non-empty rect.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub const EMPTY: Rect = Rect::from_ltrb(0.0, 0.0, 0.0, 0.0);

    pub const fn from_ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::from_ltrb(x, y, x + width, y + height)
    }

    pub fn from_wh(width: f32, height: f32) -> Self {
        Self::from_ltrb(0.0, 0.0, width, height)
    }

    /// Smallest rect containing every point, `None` for an empty iterator or
    /// non-finite input.
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for p in points {
            min = min.min(p);
            max = max.max(p);
        }
        if min.is_finite() && max.is_finite() {
            Some(Self::from_ltrb(min.x, min.y, max.x, max.y))
        } else {
            None
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new((self.left + self.right) * 0.5, (self.top + self.bottom) * 0.5)
    }

    pub fn is_empty(&self) -> bool {
        !(self.left < self.right && self.top < self.bottom)
    }

    /// Swap edges so that `left <= right` and `top <= bottom`.
    pub fn sorted(&self) -> Self {
        Self::from_ltrb(
            self.left.min(self.right),
            self.top.min(self.bottom),
            self.left.max(self.right),
            self.top.max(self.bottom),
        )
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left && p.x < self.right && p.y >= self.top && p.y < self.bottom
    }

    /// Grow to include `p`.
    pub fn join_point(&mut self, p: Vec2) {
        self.left = self.left.min(p.x);
        self.top = self.top.min(p.y);
        self.right = self.right.max(p.x);
        self.bottom = self.bottom.max(p.y);
    }

    pub fn union(&self, other: &Rect) -> Self {
        Self::from_ltrb(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Outset by `dx` horizontally and `dy` vertically.
    pub fn outset(&self, dx: f32, dy: f32) -> Self {
        Self::from_ltrb(self.left - dx, self.top - dy, self.right + dx, self.bottom + dy)
    }

    /// Corners in `left-top, right-top, right-bottom, left-bottom` order.
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.left, self.top),
            Vec2::new(self.right, self.top),
            Vec2::new(self.right, self.bottom),
            Vec2::new(self.left, self.bottom),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let r = Rect::from_points([Vec2::new(10.0, 20.0), Vec2::new(-5.0, 40.0)]).unwrap();
        assert_eq!(r, Rect::from_ltrb(-5.0, 20.0, 10.0, 40.0));
        assert!(Rect::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_empty() {
        assert!(Rect::EMPTY.is_empty());
        assert!(!Rect::from_wh(1.0, 1.0).is_empty());
        assert!(Rect::from_ltrb(5.0, 0.0, 1.0, 1.0).is_empty());
    }

    #[test]
    fn test_outset_and_union() {
        let a = Rect::from_xywh(0.0, 0.0, 10.0, 10.0).outset(1.0, 2.0);
        assert_eq!(a, Rect::from_ltrb(-1.0, -2.0, 11.0, 12.0));
        let b = a.union(&Rect::from_ltrb(20.0, 0.0, 30.0, 5.0));
        assert_eq!(b.right, 30.0);
        assert_eq!(b.top, -2.0);
    }
}
