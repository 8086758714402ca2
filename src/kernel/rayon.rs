//! Rayon-parallel kernels and search helpers (feature-gated).
//!
//! Work is split over placement rows. Rows are collected in order, so the
//! resulting score maps are identical to the sequential kernels.

use crate::candidate::ties::{Peak, ScoreMap};
use crate::image::ReferencePlanes;
use crate::kernel::scalar::DirectScalar;
use crate::kernel::uniform::UniformFill;
use crate::kernel::ScanParams;
use crate::template::PatchPlan;
use crate::util::DepixResult;
use rayon::prelude::*;

/// Row-parallel score map for the direct kernel.
pub fn direct_score_map_par(planes: &ReferencePlanes, plan: &PatchPlan) -> ScoreMap {
    let (cols, rows) = DirectScalar::grid(planes, plan);
    let rows: Vec<Vec<f64>> = (0..rows)
        .into_par_iter()
        .map(|y| DirectScalar::score_row(planes, plan, y))
        .collect();
    ScoreMap::from_rows(cols, rows)
}

/// Row-parallel score map for the uniform kernel.
pub fn uniform_score_map_par(planes: &ReferencePlanes, plan: &PatchPlan) -> DepixResult<ScoreMap> {
    let fill = UniformFill::check(plan)?;
    let (cols, rows) = UniformFill::grid(planes, plan);
    let rows: Vec<Vec<f64>> = (0..rows)
        .into_par_iter()
        .map(|y| UniformFill::score_row(planes, plan, fill, y))
        .collect();
    Ok(ScoreMap::from_rows(cols, rows))
}

/// Row-parallel full scan for the direct kernel.
pub fn direct_scan_full_par(
    planes: &ReferencePlanes,
    plan: &PatchPlan,
    params: ScanParams,
) -> DepixResult<Vec<Peak>> {
    let map = direct_score_map_par(planes, plan);
    Ok(map.select_ties(params.max_candidates, params.tie_tolerance))
}

/// Row-parallel full scan for the uniform kernel.
pub fn uniform_scan_full_par(
    planes: &ReferencePlanes,
    plan: &PatchPlan,
    params: ScanParams,
) -> DepixResult<Vec<Peak>> {
    let map = uniform_score_map_par(planes, plan)?;
    Ok(map.select_ties(params.max_candidates, params.tie_tolerance))
}

#[cfg(test)]
mod tests {
    use super::{direct_scan_full_par, uniform_score_map_par, uniform_scan_full_par};
    use crate::image::{Color, Patch, PixelGrid, ReferencePlanes};
    use crate::kernel::scalar::DirectScalar;
    use crate::kernel::uniform::UniformFill;
    use crate::kernel::{Kernel, ScanParams};
    use crate::search::AveragingMode;
    use crate::template::PatchPlan;

    fn reference() -> PixelGrid {
        PixelGrid::from_fn(17, 11, |x, y| {
            Color::new((x * 13) as u8, ((x + y) * 9) as u8, ((y * 23) % 256) as u8)
        })
        .unwrap()
    }

    #[test]
    fn parallel_score_map_matches_sequential() {
        let planes = ReferencePlanes::build(&reference(), AveragingMode::Linear).unwrap();
        let plan = PatchPlan::uniform(Color::new(70, 30, 190), 4, 3, AveragingMode::Linear)
            .unwrap();
        let seq = UniformFill::score_map(&planes, &plan).unwrap();
        let par = uniform_score_map_par(&planes, &plan).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn parallel_direct_scan_matches_sequential() {
        let grid = reference();
        let planes = ReferencePlanes::build(&grid, AveragingMode::GammaCorrected).unwrap();
        let patch = Patch::new(
            vec![
                Color::new(40, 90, 10),
                Color::new(52, 99, 33),
                Color::new(40, 99, 56),
                Color::new(52, 108, 79),
            ],
            2,
            2,
        )
        .unwrap();
        let plan = PatchPlan::from_patch(&patch, AveragingMode::GammaCorrected).unwrap();
        let params = ScanParams {
            max_candidates: 4,
            tie_tolerance: 1e-9,
        };
        let seq = DirectScalar::scan_full(&planes, &plan, params).unwrap();
        let par = direct_scan_full_par(&planes, &plan, params).unwrap();
        assert_eq!(seq, par);
        assert!(!seq.is_empty());
    }

    #[test]
    fn parallel_uniform_scan_matches_sequential() {
        let planes = ReferencePlanes::build(&reference(), AveragingMode::GammaCorrected).unwrap();
        let plan = PatchPlan::uniform(Color::new(39, 72, 46), 3, 3, AveragingMode::GammaCorrected)
            .unwrap();
        let params = ScanParams {
            max_candidates: 16,
            tie_tolerance: 1e-9,
        };
        let seq = UniformFill::scan_full(&planes, &plan, params).unwrap();
        let par = uniform_scan_full_par(&planes, &plan, params).unwrap();
        assert_eq!(seq, par);
    }
}
