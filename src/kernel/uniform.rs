//! Constant-time kernel for single-color templates.
//!
//! With a uniform fill `c` over `n` pixels the squared difference expands to
//! `n*c^2 - 2*c*S1 + S2` per channel, so only the window sums `S1` and `S2`
//! are needed. They are read from the reference's summed-area tables at each
//! placement; nothing is cached per block size.

use crate::candidate::ties::ScoreMap;
use crate::image::planes::WindowSums;
use crate::image::ReferencePlanes;
use crate::kernel::{normalized_sqdiff, placement_bounds, Kernel};
use crate::template::PatchPlan;
use crate::util::{DepixError, DepixResult};

/// Kernel for templates whose pixels all share one color.
pub struct UniformFill;

impl UniformFill {
    #[inline]
    fn score(sums: &WindowSums, fill: [f64; 3], n: f64, sum_t2: f64) -> f64 {
        let mut sse = 0.0f64;
        let mut sum_i2 = 0.0f64;
        for c in 0..3 {
            let t = fill[c];
            sse += n * t * t - 2.0 * t * sums.s1[c] + sums.s2[c];
            sum_i2 += sums.s2[c];
        }
        normalized_sqdiff(sse, sum_t2, sum_i2)
    }

    /// Returns the fill of a single-color plan.
    pub(crate) fn check(plan: &PatchPlan) -> DepixResult<[f64; 3]> {
        if plan.width() == 0 || plan.height() == 0 {
            return Err(DepixError::InvalidDimensions {
                width: plan.width(),
                height: plan.height(),
            });
        }
        plan.uniform_fill()
            .ok_or(DepixError::InvalidInput("uniform kernel needs a single-color patch"))
    }

    /// Placement grid `(cols, rows)` for `plan` over `planes`.
    pub(crate) fn grid(planes: &ReferencePlanes, plan: &PatchPlan) -> (usize, usize) {
        let (max_x, max_y) =
            placement_bounds(planes.width(), planes.height(), plan.width(), plan.height());
        (max_x + 1, max_y + 1)
    }

    /// Scores one placement row.
    pub(crate) fn score_row(
        planes: &ReferencePlanes,
        plan: &PatchPlan,
        fill: [f64; 3],
        y: usize,
    ) -> Vec<f64> {
        let (cols, _) = Self::grid(planes, plan);
        let (w, h) = (plan.width(), plan.height());
        let n = (w * h) as f64;
        (0..cols)
            .map(|x| Self::score(&planes.window_sums(x, y, w, h), fill, n, plan.sum_t2()))
            .collect()
    }
}

impl Kernel for UniformFill {
    type Space = ReferencePlanes;

    fn score_at(planes: &ReferencePlanes, plan: &PatchPlan, x: usize, y: usize) -> f64 {
        let Ok(fill) = Self::check(plan) else {
            return f64::INFINITY;
        };
        let (cols, rows) = Self::grid(planes, plan);
        if x >= cols || y >= rows {
            return f64::INFINITY;
        }
        let (w, h) = (plan.width(), plan.height());
        Self::score(
            &planes.window_sums(x, y, w, h),
            fill,
            (w * h) as f64,
            plan.sum_t2(),
        )
    }

    fn score_map(planes: &ReferencePlanes, plan: &PatchPlan) -> DepixResult<ScoreMap> {
        let fill = Self::check(plan)?;
        let (cols, rows) = Self::grid(planes, plan);
        let rows = (0..rows)
            .map(|y| Self::score_row(planes, plan, fill, y))
            .collect();
        Ok(ScoreMap::from_rows(cols, rows))
    }
}
