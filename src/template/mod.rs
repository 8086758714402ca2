//! Block patches prepared as matching templates.

mod plan;

pub use plan::PatchPlan;
