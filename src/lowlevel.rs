//! Low-level building blocks for custom matching pipelines.
//!
//! These types expose prepared reference planes, patch plans, kernel traits
//! and score maps for callers that drive the search themselves. Most users
//! should prefer [`depixelize`](crate::depixelize) or [`Matcher`](crate::Matcher).

pub use crate::candidate::ties::{Peak, ScoreMap};
pub use crate::image::planes::{ReferencePlanes, WindowSums};
pub use crate::kernel::scalar::DirectScalar;
pub use crate::kernel::uniform::UniformFill;
pub use crate::kernel::{Kernel, ScanParams};
pub use crate::template::PatchPlan;

#[cfg(feature = "rayon")]
pub use crate::kernel::rayon::{
    direct_scan_full_par, direct_score_map_par, uniform_scan_full_par, uniform_score_map_par,
};
