use glam::Mat4;

/// Canvas construction options.
///
/// # Example
///
/// ```
/// use strata_render::CanvasConfig;
///
/// let config = CanvasConfig::new(1280, 720).with_density(2.0);
/// assert_eq!(config.target_size(), (2560, 1440));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasConfig {
    /// Logical width.
    pub width: u32,
    /// Logical height.
    pub height: u32,
    /// Physical pixels per logical pixel.
    pub density: f32,
    /// Overrides the default orthographic projection.
    pub view_projection: Option<Mat4>,
    /// Targets are multisampled. Without it, anti-aliased paints get
    /// fringe geometry around their fills instead.
    pub anti_alias: bool,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            density: 1.0,
            view_projection: None,
            anti_alias: true,
        }
    }
}

impl CanvasConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = if density > 0.0 { density } else { 1.0 };
        self
    }

    pub fn with_view_projection(mut self, matrix: Mat4) -> Self {
        self.view_projection = Some(matrix);
        self
    }

    pub fn with_anti_alias(mut self, anti_alias: bool) -> Self {
        self.anti_alias = anti_alias;
        self
    }

    /// Projection from canvas coordinates to clip space, y pointing down.
    pub fn view_projection(&self) -> Mat4 {
        self.view_projection.unwrap_or_else(|| {
            Mat4::orthographic_rh(0.0, self.width as f32, self.height as f32, 0.0, -1.0, 1.0)
        })
    }

    /// Size of offscreen targets in physical pixels.
    pub fn target_size(&self) -> (u32, u32) {
        let scale = |v: u32| ((v as f32 * self.density).ceil() as u32).max(1);
        (scale(self.width), scale(self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_default_projection_is_y_down() {
        let config = CanvasConfig::new(200, 100);
        let vp = config.view_projection();

        let top_left = vp.project_point3(Vec3::ZERO);
        assert!((top_left.x + 1.0).abs() < 1e-5);
        assert!((top_left.y - 1.0).abs() < 1e-5);

        let bottom_right = vp.project_point3(Vec3::new(200.0, 100.0, 0.0));
        assert!((bottom_right.x - 1.0).abs() < 1e-5);
        assert!((bottom_right.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_invalid_density_falls_back() {
        let config = CanvasConfig::default().with_density(0.0);
        assert_eq!(config.density, 1.0);
        assert_eq!(config.target_size(), (800, 600));
    }
}
