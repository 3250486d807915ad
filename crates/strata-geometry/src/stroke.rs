//! Stroke properties for geometry outlines.
//!
//! Defines how paths are stroked: width, caps, joins and the miter limit.

/// Default miter limit, as a ratio of miter length to half the stroke width.
pub const DEFAULT_MITER_LIMIT: f32 = 4.0;

/// Line cap style for stroke endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    /// Flat cap ending at the endpoint.
    #[default]
    Butt,
    /// Round cap extending beyond the endpoint.
    Round,
    /// Square cap extending beyond the endpoint.
    Square,
}

/// Line join style for stroke corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    /// Miter join (sharp corner).
    #[default]
    Miter,
    /// Round join (rounded corner).
    Round,
    /// Bevel join (flat corner).
    Bevel,
}

/// Stroke geometry settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    /// Stroke width in logical pixels. Hairlines are widened to 1.
    pub width: f32,
    /// Line cap style
    pub cap: LineCap,
    /// Line join style
    pub join: LineJoin,
    /// Miter joins longer than `miter_limit * width / 2` become bevels.
    pub miter_limit: f32,
}

impl StrokeStyle {
    pub fn new(width: f32) -> Self {
        Self {
            width,
            ..Default::default()
        }
    }

    /// Set the line cap style.
    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }

    /// Set the line join style.
    pub fn with_join(mut self, join: LineJoin) -> Self {
        self.join = join;
        self
    }

    /// Set the miter limit.
    pub fn with_miter_limit(mut self, limit: f32) -> Self {
        self.miter_limit = limit.max(1.0);
        self
    }

    /// Half of the effective width.
    pub fn radius(&self) -> f32 {
        self.width.max(1.0) * 0.5
    }

    /// Whether a right angle corner keeps its miter under this style.
    /// The miter of a 90 degree turn is `sqrt(2)` radii long.
    pub fn miters_right_angles(&self) -> bool {
        self.join == LineJoin::Miter && self.miter_limit > std::f32::consts::SQRT_2
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: DEFAULT_MITER_LIMIT,
        }
    }
}
