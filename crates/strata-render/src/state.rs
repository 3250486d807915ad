//! Canvas state: the transform stack and the clip stack.

use glam::{Mat4, Vec3, Vec4};
use strata_geometry::{FillRule, MeshRange};

/// How a new clip combines with the active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipOp {
    /// Keep only pixels inside both.
    #[default]
    Intersect,
    /// Remove the new shape from the active clip.
    Difference,
}

/// One clip recorded at a save depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipStackValue {
    /// Save count when the clip was made.
    pub stack_depth: usize,
    pub front_range: MeshRange,
    pub back_range: MeshRange,
    /// Full-canvas rect used to rewrite stencil bits.
    pub bound_range: MeshRange,
    /// Transform the clip path was recorded under.
    pub stack_matrix: Mat4,
    pub fill_rule: FillRule,
    pub op: ClipOp,
    /// The stencil was cleared under this entry and it has not been
    /// applied again yet.
    pub needs_forward: bool,
}

/// Transform and clip stacks of a canvas.
#[derive(Debug, Clone)]
pub struct CanvasState {
    matrices: Vec<Mat4>,
    clips: Vec<ClipStackValue>,
    matrix_dirty: bool,
    revert_clip: bool,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasState {
    pub fn new() -> Self {
        Self {
            matrices: vec![Mat4::IDENTITY],
            clips: Vec::new(),
            matrix_dirty: true,
            revert_clip: false,
        }
    }

    /// Number of saved states, 1 at the bottom.
    pub fn save_count(&self) -> usize {
        self.matrices.len()
    }

    pub fn save(&mut self) {
        let current = self.current_matrix();
        self.matrices.push(current);
    }

    /// Pop one state and every clip made above it.
    ///
    /// Returns whether the transform changed. Restoring the bottom state
    /// does nothing.
    pub fn restore(&mut self) -> bool {
        if self.matrices.len() <= 1 {
            return false;
        }
        let prev = self.current_matrix();
        self.matrices.pop();
        self.pop_clips();

        self.matrix_dirty = self.current_matrix() != prev;
        self.matrix_dirty
    }

    fn pop_clips(&mut self) {
        let depth = self.save_count();
        let before = self.clips.len();
        self.clips.retain(|clip| clip.stack_depth <= depth);
        if self.clips.len() != before {
            self.revert_clip = true;
            // anything left is reapplied after the clear
            for clip in &mut self.clips {
                clip.needs_forward = true;
            }
        }
    }

    pub fn current_matrix(&self) -> Mat4 {
        self.matrices.last().copied().unwrap_or(Mat4::IDENTITY)
    }

    fn top_mut(&mut self) -> &mut Mat4 {
        if self.matrices.is_empty() {
            self.matrices.push(Mat4::IDENTITY);
        }
        let last = self.matrices.len() - 1;
        &mut self.matrices[last]
    }

    /// Post-multiply the current transform by `matrix`.
    pub fn concat(&mut self, matrix: &Mat4) {
        let top = self.top_mut();
        *top *= *matrix;
        self.matrix_dirty = true;
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.concat(&Mat4::from_translation(Vec3::new(dx, dy, 0.0)));
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.concat(&Mat4::from_scale(Vec3::new(sx, sy, 1.0)));
    }

    /// Rotate by `degrees` about the origin.
    pub fn rotate(&mut self, degrees: f32) {
        self.concat(&Mat4::from_rotation_z(degrees.to_radians()));
    }

    /// Rotate by `degrees` about `(px, py)`.
    pub fn rotate_about(&mut self, degrees: f32, px: f32, py: f32) {
        let post = Mat4::from_translation(Vec3::new(px, py, 0.0));
        let rotate = Mat4::from_rotation_z(degrees.to_radians());
        let pre = Mat4::from_translation(Vec3::new(-px, -py, 0.0));
        self.concat(&(post * rotate * pre));
    }

    /// `x' = x + kx·y`, `y' = ky·x + y`.
    pub fn skew(&mut self, kx: f32, ky: f32) {
        let skew = Mat4::from_cols(
            Vec4::new(1.0, ky, 0.0, 0.0),
            Vec4::new(kx, 1.0, 0.0, 0.0),
            Vec4::Z,
            Vec4::W,
        );
        self.concat(&skew);
    }

    /// Replace the current transform.
    pub fn set_matrix(&mut self, matrix: Mat4) {
        *self.top_mut() = matrix;
        self.matrix_dirty = true;
    }

    pub fn matrix_dirty(&self) -> bool {
        self.matrix_dirty
    }

    pub fn clear_matrix_dirty(&mut self) {
        self.matrix_dirty = false;
    }

    /// Push a clip at the current depth.
    pub fn save_clip(
        &mut self,
        front_range: MeshRange,
        back_range: MeshRange,
        bound_range: MeshRange,
        fill_rule: FillRule,
        op: ClipOp,
    ) -> ClipStackValue {
        let value = ClipStackValue {
            stack_depth: self.save_count(),
            front_range,
            back_range,
            bound_range,
            stack_matrix: self.current_matrix(),
            fill_rule,
            op,
            needs_forward: false,
        };
        self.clips.push(value);
        value
    }

    pub fn has_clip(&self) -> bool {
        !self.clips.is_empty()
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    pub fn clips(&self) -> &[ClipStackValue] {
        &self.clips
    }

    pub fn current_clip(&self) -> Option<&ClipStackValue> {
        self.clips.last()
    }

    /// Whether a restore popped clips whose bits are still in the stencil.
    pub fn needs_revert_clip(&self) -> bool {
        self.revert_clip
    }

    /// Acknowledge a pending revert.
    pub fn take_revert(&mut self) -> bool {
        std::mem::take(&mut self.revert_clip)
    }

    /// Entries from index `base` up that wait to be applied again, in stack
    /// order. Clears every pending flag, including those below `base`.
    pub fn take_forward(&mut self, base: usize) -> Vec<ClipStackValue> {
        let pending = self
            .clips
            .iter()
            .skip(base)
            .filter(|clip| clip.needs_forward)
            .copied()
            .collect();
        for clip in &mut self.clips {
            clip.needs_forward = false;
        }
        pending
    }

    /// Forget every clip, as at the end of a frame.
    pub fn clear_clips(&mut self) {
        self.clips.clear();
        self.revert_clip = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn apply(m: Mat4, p: Vec2) -> Vec2 {
        m.transform_point3(p.extend(0.0)).truncate()
    }

    fn clip(state: &mut CanvasState) -> ClipStackValue {
        let range = MeshRange::new(0, 3);
        state.save_clip(range, MeshRange::EMPTY, range, FillRule::NonZero, ClipOp::Intersect)
    }

    #[test]
    fn test_initial_state() {
        let state = CanvasState::new();
        assert_eq!(state.save_count(), 1);
        assert_eq!(state.current_matrix(), Mat4::IDENTITY);
        assert!(!state.has_clip());
    }

    #[test]
    fn test_restore_never_pops_bottom() {
        let mut state = CanvasState::new();
        state.translate(5.0, 5.0);
        assert!(!state.restore());
        assert_eq!(state.save_count(), 1);
        assert_eq!(apply(state.current_matrix(), Vec2::ZERO), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_save_restore_reports_dirty() {
        let mut state = CanvasState::new();
        state.save();
        state.translate(10.0, 0.0);
        assert!(state.restore());
        assert_eq!(state.current_matrix(), Mat4::IDENTITY);

        state.save();
        assert!(!state.restore());
        assert!(!state.matrix_dirty());
    }

    #[test]
    fn test_transforms_post_multiply() {
        let mut state = CanvasState::new();
        state.translate(10.0, 0.0);
        state.scale(2.0, 2.0);
        // the scale applies first
        assert_eq!(apply(state.current_matrix(), Vec2::new(1.0, 1.0)), Vec2::new(12.0, 2.0));
    }

    #[test]
    fn test_rotate_about_keeps_pivot() {
        let mut state = CanvasState::new();
        state.rotate_about(90.0, 50.0, 50.0);
        let m = state.current_matrix();
        assert!(apply(m, Vec2::new(50.0, 50.0)).abs_diff_eq(Vec2::new(50.0, 50.0), 1e-4));
        assert!(apply(m, Vec2::new(60.0, 50.0)).abs_diff_eq(Vec2::new(50.0, 60.0), 1e-4));
    }

    #[test]
    fn test_skew() {
        let mut state = CanvasState::new();
        state.skew(0.5, 0.0);
        assert_eq!(apply(state.current_matrix(), Vec2::new(0.0, 10.0)), Vec2::new(5.0, 10.0));
    }

    #[test]
    fn test_clip_depths_and_flags() {
        let mut state = CanvasState::new();
        state.save();
        let first = clip(&mut state);
        assert_eq!(first.stack_depth, 2);

        state.save();
        clip(&mut state);
        assert!(state.clips().iter().all(|clip| !clip.needs_forward));
        assert_eq!(state.clip_count(), 2);

        state.restore();
        assert_eq!(state.clip_count(), 1);
        assert!(state.clips()[0].needs_forward);
        assert!(state.needs_revert_clip());
        assert!(state.take_revert());
        assert!(!state.needs_revert_clip());

        let pending = state.take_forward(0);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].front_range, first.front_range);
        assert!(!state.clips()[0].needs_forward);
        assert!(state.take_forward(0).is_empty());

        state.restore();
        assert!(!state.has_clip());
        assert!(state.take_revert());
    }

    #[test]
    fn test_take_forward_skips_entries_below_base() {
        let mut state = CanvasState::new();
        clip(&mut state);
        state.save();
        clip(&mut state);
        state.save();
        clip(&mut state);
        state.restore();

        assert!(state.take_revert());
        let pending = state.take_forward(1);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].stack_depth, 2);
        assert!(state.clips().iter().all(|clip| !clip.needs_forward));
    }

    #[test]
    fn test_restore_without_clips_needs_no_revert() {
        let mut state = CanvasState::new();
        clip(&mut state);
        state.save();
        state.restore();
        // the clip lives at depth 1 and survives
        assert_eq!(state.clip_count(), 1);
        assert!(!state.needs_revert_clip());
    }
}
