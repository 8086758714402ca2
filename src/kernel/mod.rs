//! Score kernels for the normalized squared-difference metric.
//!
//! For a template `T` and a reference window `I`, both normalized per
//! channel, the score is `sum((T - I)^2) / sqrt(sum(T^2) * sum(I^2))` over
//! all pixels and the three channels. Lower is better and zero is an exact
//! match; a numerator not below the denominator scores `1`.

use crate::candidate::ties::{Peak, ScoreMap};
use crate::template::PatchPlan;
use crate::util::DepixResult;

/// Scan configuration for kernel evaluations.
#[derive(Clone, Copy, Debug)]
pub struct ScanParams {
    /// Maximum number of tied placements to keep.
    pub max_candidates: usize,
    /// Scores within this distance of the best count as ties.
    pub tie_tolerance: f64,
}

/// Kernel trait for scoring and scan operations.
pub trait Kernel {
    /// Precomputed search space the kernel reads from.
    type Space;

    /// Computes the score at a single placement (top-left coordinates).
    fn score_at(space: &Self::Space, plan: &PatchPlan, x: usize, y: usize) -> f64;

    /// Scores every placement.
    fn score_map(space: &Self::Space, plan: &PatchPlan) -> DepixResult<ScoreMap>;

    /// Scans every placement and returns the tied best peaks in row-major order.
    fn scan_full(
        space: &Self::Space,
        plan: &PatchPlan,
        params: ScanParams,
    ) -> DepixResult<Vec<Peak>> {
        let map = Self::score_map(space, plan)?;
        Ok(map.select_ties(params.max_candidates, params.tie_tolerance))
    }
}

/// Largest top-left coordinates for a `w x h` window; windows larger than
/// the reference are placed only at the origin.
#[inline]
pub(crate) fn placement_bounds(ref_w: usize, ref_h: usize, w: usize, h: usize) -> (usize, usize) {
    (ref_w.saturating_sub(w), ref_h.saturating_sub(h))
}

/// Combines the accumulated terms into the final score.
#[inline]
pub(crate) fn normalized_sqdiff(sse: f64, sum_t2: f64, sum_i2: f64) -> f64 {
    let sse = sse.max(0.0);
    let denom = (sum_t2 * sum_i2).sqrt();
    if sse < denom {
        sse / denom
    } else {
        1.0
    }
}

pub mod scalar;
pub mod uniform;

#[cfg(feature = "rayon")]
pub mod rayon;
