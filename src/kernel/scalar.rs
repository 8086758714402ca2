//! Direct per-pixel kernel. Works for any patch; reference pixels outside
//! the image read as black.

use crate::candidate::ties::ScoreMap;
use crate::image::ReferencePlanes;
use crate::kernel::{normalized_sqdiff, placement_bounds, Kernel};
use crate::template::PatchPlan;
use crate::util::DepixResult;

/// Scalar reference kernel evaluating every template pixel.
pub struct DirectScalar;

impl DirectScalar {
    /// Placement grid `(cols, rows)` for `plan` over `planes`.
    pub(crate) fn grid(planes: &ReferencePlanes, plan: &PatchPlan) -> (usize, usize) {
        let (max_x, max_y) =
            placement_bounds(planes.width(), planes.height(), plan.width(), plan.height());
        (max_x + 1, max_y + 1)
    }

    /// Scores one placement row.
    pub(crate) fn score_row(planes: &ReferencePlanes, plan: &PatchPlan, y: usize) -> Vec<f64> {
        let (cols, _) = Self::grid(planes, plan);
        (0..cols)
            .map(|x| Self::score_at(planes, plan, x, y))
            .collect()
    }
}

impl Kernel for DirectScalar {
    type Space = ReferencePlanes;

    fn score_at(planes: &ReferencePlanes, plan: &PatchPlan, x: usize, y: usize) -> f64 {
        let width = plan.width();
        let mut sse = 0.0f64;
        let mut sum_i2 = 0.0f64;
        for (idx, t) in plan.values().iter().enumerate() {
            let px = x + idx % width;
            let py = y + idx / width;
            for (c, &tv) in t.iter().enumerate() {
                let iv = planes.value(c, px, py);
                let diff = tv - iv;
                sse += diff * diff;
                sum_i2 += iv * iv;
            }
        }
        normalized_sqdiff(sse, plan.sum_t2(), sum_i2)
    }

    fn score_map(planes: &ReferencePlanes, plan: &PatchPlan) -> DepixResult<ScoreMap> {
        let (cols, rows) = Self::grid(planes, plan);
        let rows = (0..rows).map(|y| Self::score_row(planes, plan, y)).collect();
        Ok(ScoreMap::from_rows(cols, rows))
    }
}
