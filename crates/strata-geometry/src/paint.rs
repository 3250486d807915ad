//! Paint types for filling and stroking.
//!
//! A [`Paint`] is read-only input to the rasterizer: what to draw (fill,
//! stroke or both), the stroke geometry, and the [`Shader`] that colors it.

use std::sync::Arc;

use glam::{Vec2, Vec4};
use strata_core::{Color, Rect, StrataError, StrataResult};

use crate::effect::PathEffect;
use crate::stroke::{LineCap, LineJoin, StrokeStyle};

/// What geometry a paint produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaintStyle {
    #[default]
    Fill,
    Stroke,
    StrokeAndFill,
}

impl PaintStyle {
    pub fn fills(self) -> bool {
        matches!(self, Self::Fill | Self::StrokeAndFill)
    }

    pub fn strokes(self) -> bool {
        matches!(self, Self::Stroke | Self::StrokeAndFill)
    }
}

/// RGBA8 image data, row major, unpremultiplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pixmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Pixmap {
    /// Wrap pixel data, checking it holds exactly `width * height` pixels.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> StrataResult<Self> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(StrataError::InvalidPixmap {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A single-color image.
    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> StrataResult<Self> {
        let pixels = color
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self::new(width, height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// A color stop in a gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient (0.0 to 1.0)
    pub offset: f32,
    /// Color at this stop
    pub color: Color,
}

impl GradientStop {
    /// Create a new gradient stop.
    pub fn new(offset: f32, color: Color) -> Self {
        Self {
            offset: offset.clamp(0.0, 1.0),
            color,
        }
    }
}

/// A linear gradient between two points.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub start: Vec2,
    pub end: Vec2,
    pub stops: Vec<GradientStop>,
}

/// A radial gradient around a center.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub center: Vec2,
    pub radius: f32,
    pub stops: Vec<GradientStop>,
}

/// How covered pixels are colored.
#[derive(Debug, Clone, PartialEq)]
pub enum Shader {
    /// Solid color.
    Solid(Color),
    /// Linear gradient.
    LinearGradient(LinearGradient),
    /// Radial gradient.
    RadialGradient(RadialGradient),
    /// Image stretched over the bounds of the drawn geometry.
    Image(Arc<Pixmap>),
}

impl Shader {
    /// Create a linear gradient shader.
    pub fn linear_gradient(start: Vec2, end: Vec2, stops: Vec<GradientStop>) -> Self {
        Self::LinearGradient(LinearGradient { start, end, stops })
    }

    /// Create a radial gradient shader.
    pub fn radial_gradient(center: Vec2, radius: f32, stops: Vec<GradientStop>) -> Self {
        Self::RadialGradient(RadialGradient {
            center,
            radius,
            stops,
        })
    }

    /// Get the solid color if this is a solid shader.
    pub fn as_solid(&self) -> Option<Color> {
        match self {
            Self::Solid(color) => Some(*color),
            _ => None,
        }
    }
}

impl Default for Shader {
    fn default() -> Self {
        Self::Solid(Color::BLACK)
    }
}

impl From<Color> for Shader {
    fn from(color: Color) -> Self {
        Self::Solid(color)
    }
}

/// Gradient data in the layout the pipeline consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientInfo {
    /// `(x0, y0, x1, y1)` for linear, `(cx, cy, radius, 0)` for radial.
    pub bounds: Vec4,
    pub colors: Vec<Vec4>,
    pub positions: Vec<f32>,
}

impl GradientInfo {
    fn from_stops(bounds: Vec4, stops: &[GradientStop]) -> Self {
        Self {
            bounds,
            colors: stops.iter().map(|s| s.color.to_vec4()).collect(),
            positions: stops.iter().map(|s| s.offset).collect(),
        }
    }
}

impl LinearGradient {
    pub fn info(&self) -> GradientInfo {
        GradientInfo::from_stops(
            Vec4::new(self.start.x, self.start.y, self.end.x, self.end.y),
            &self.stops,
        )
    }
}

impl RadialGradient {
    pub fn info(&self) -> GradientInfo {
        GradientInfo::from_stops(
            Vec4::new(self.center.x, self.center.y, self.radius, 0.0),
            &self.stops,
        )
    }
}

/// Style, stroke geometry and shader for one draw call.
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    pub style: PaintStyle,
    pub stroke: StrokeStyle,
    /// Fringe fill edges when the target is not multisampled.
    pub anti_alias: bool,
    pub shader: Shader,
    /// Applied to the path before it is stroked.
    pub path_effect: Option<PathEffect>,
    /// Opacity multiplier (0.0 to 1.0)
    pub alpha: f32,
}

impl Paint {
    /// A solid fill paint.
    pub fn fill(color: Color) -> Self {
        Self {
            shader: Shader::Solid(color),
            ..Default::default()
        }
    }

    /// A solid stroke paint.
    pub fn stroke(color: Color, width: f32) -> Self {
        Self {
            style: PaintStyle::Stroke,
            stroke: StrokeStyle::new(width),
            shader: Shader::Solid(color),
            ..Default::default()
        }
    }

    pub fn with_style(mut self, style: PaintStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_shader(mut self, shader: impl Into<Shader>) -> Self {
        self.shader = shader.into();
        self
    }

    pub fn with_stroke_width(mut self, width: f32) -> Self {
        self.stroke.width = width;
        self
    }

    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.stroke.cap = cap;
        self
    }

    pub fn with_join(mut self, join: LineJoin) -> Self {
        self.stroke.join = join;
        self
    }

    pub fn with_miter_limit(mut self, limit: f32) -> Self {
        self.stroke = self.stroke.with_miter_limit(limit);
        self
    }

    pub fn with_anti_alias(mut self, anti_alias: bool) -> Self {
        self.anti_alias = anti_alias;
        self
    }

    pub fn with_path_effect(mut self, effect: PathEffect) -> Self {
        self.path_effect = Some(effect);
        self
    }

    /// Set the opacity.
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    /// Solid color with the paint alpha applied.
    pub fn effective_color(&self) -> Option<Color> {
        self.shader
            .as_solid()
            .map(|color| color.with_alpha_scaled(self.alpha))
    }

    /// How far stroke geometry may reach past the path bounds.
    pub fn stroke_outset(&self) -> f32 {
        if !self.style.strokes() {
            return 0.0;
        }
        let r = self.stroke.radius();
        match self.stroke.join {
            LineJoin::Miter => r * self.stroke.miter_limit.max(1.0),
            _ => r,
        }
        .max(r * std::f32::consts::SQRT_2)
    }

    /// Grow geometry bounds by the stroke reach.
    pub fn outset_bounds(&self, bounds: Rect) -> Rect {
        let d = self.stroke_outset();
        bounds.outset(d, d)
    }

    /// Nothing visible can be drawn with this paint.
    pub fn nothing_to_draw(&self) -> bool {
        !(self.alpha > 0.0)
    }
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            style: PaintStyle::Fill,
            stroke: StrokeStyle::default(),
            anti_alias: false,
            shader: Shader::default(),
            path_effect: None,
            alpha: 1.0,
        }
    }
}
