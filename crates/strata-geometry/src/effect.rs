//! Path effects applied to stroke geometry before it is tessellated.

use strata_core::profiling::profile_function;
use tracing::{trace, warn};

use crate::measure::measure_path;
use crate::path::{Path, PathBuilder};

/// Dashing gives up past this many dashes per path.
pub const MAX_DASH_COUNT: f32 = 1_000_000.0;

/// Rewrites a path before it is stroked.
#[derive(Debug, Clone, PartialEq)]
pub enum PathEffect {
    Dash(DashEffect),
}

impl PathEffect {
    /// Dash effect, `None` when the intervals are unusable.
    pub fn dash(intervals: &[f32], phase: f32) -> Option<Self> {
        DashEffect::new(intervals, phase).map(Self::Dash)
    }

    pub fn as_dash(&self) -> Option<&DashEffect> {
        match self {
            PathEffect::Dash(dash) => Some(dash),
        }
    }

    /// The path to stroke instead of `path`. `None` leaves `path` as is.
    pub fn filter_path(&self, path: &Path) -> Option<Path> {
        match self {
            PathEffect::Dash(dash) => dash.apply(path),
        }
    }
}

/// Alternating on and off lengths along every contour.
///
/// Even interval indices are drawn, odd ones skipped. `phase` is the
/// distance into the pattern at which each contour starts.
#[derive(Debug, Clone, PartialEq)]
pub struct DashEffect {
    intervals: Vec<f32>,
    phase: f32,
    interval_length: f32,
    /// Remaining length of the interval the phase lands in.
    first_length: f32,
    first_index: usize,
}

impl DashEffect {
    /// Needs an even number of at least two finite, non-negative intervals
    /// with a positive sum.
    pub fn new(intervals: &[f32], phase: f32) -> Option<Self> {
        if intervals.len() < 2 || intervals.len() % 2 != 0 {
            trace!("dash needs an even interval count, got {}", intervals.len());
            return None;
        }
        if intervals.iter().any(|&i| !(i >= 0.0) || !i.is_finite()) || !phase.is_finite() {
            trace!("dash intervals must be finite and non-negative");
            return None;
        }
        let interval_length: f32 = intervals.iter().sum();
        if !(interval_length > 0.0) || !interval_length.is_finite() {
            return None;
        }

        let phase = normalize_phase(phase, interval_length);
        let (first_index, first_length) = first_interval(intervals, phase);
        Some(Self {
            intervals: intervals.to_vec(),
            phase,
            interval_length,
            first_length,
            first_index,
        })
    }

    pub fn intervals(&self) -> &[f32] {
        &self.intervals
    }

    /// Phase folded into `[0, interval length)`.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Every "on" piece of every contour as an open contour of its own.
    /// On a closed contour the piece crossing the start is joined into one.
    ///
    /// Returns `None` when the path would need more than
    /// [`MAX_DASH_COUNT`] dashes.
    pub fn apply(&self, path: &Path) -> Option<Path> {
        profile_function!();

        let count = self.intervals.len();
        let mut builder = PathBuilder::new();
        let mut dash_count = 0.0;

        for contour in measure_path(path) {
            let length = contour.length();
            dash_count += length * (count / 2) as f32 / self.interval_length;
            if dash_count > MAX_DASH_COUNT {
                warn!("dash pattern too dense, stroking undashed");
                return None;
            }

            // the first dash of a closed contour is emitted last, joined
            // to the one ending there
            let mut skip_first = contour.is_closed();
            let mut added = false;
            let mut index = self.first_index;
            // f64 keeps long contours from stalling on rounding
            let mut distance = 0.0f64;
            let mut dash = f64::from(self.first_length);

            while distance < f64::from(length) {
                added = false;
                if index % 2 == 0 && !skip_first {
                    added = contour.segment(distance as f32, (distance + dash) as f32, &mut builder, true);
                }
                distance += dash;
                skip_first = false;
                index = (index + 1) % count;
                dash = f64::from(self.intervals[index]);
            }

            if contour.is_closed() && self.first_index % 2 == 0 {
                contour.segment(0.0, self.first_length, &mut builder, !added);
            }
        }

        Some(builder.build())
    }
}

/// Fold `phase` into `[0, length)`, counting negative phases back from the
/// end of the pattern.
fn normalize_phase(phase: f32, length: f32) -> f32 {
    let phase = if phase < 0.0 {
        let folded = length - (-phase % length);
        if folded >= length { 0.0 } else { folded }
    } else if phase >= length {
        phase % length
    } else {
        phase
    };
    phase.clamp(0.0, length)
}

/// Interval the pattern starts in and how much of it remains.
fn first_interval(intervals: &[f32], mut phase: f32) -> (usize, f32) {
    for (i, &gap) in intervals.iter().enumerate() {
        if phase > gap || (phase == gap && gap != 0.0) {
            phase -= gap;
        } else {
            return (i, gap - phase);
        }
    }
    // rounding left phase past the pattern end
    (0, intervals[0])
}
