//! Template plan precomputation for the normalized squared-difference metric.

use crate::image::{Color, Patch};
use crate::search::AveragingMode;
use crate::util::{DepixError, DepixResult};

/// Normalized template values and the statistics every score needs.
#[derive(Clone, Debug)]
pub struct PatchPlan {
    width: usize,
    height: usize,
    values: Vec<[f64; 3]>,
    uniform: Option<[f64; 3]>,
    sum_t2: f64,
}

impl PatchPlan {
    /// Builds a plan from the block's source pixels.
    pub fn from_patch(patch: &Patch, mode: AveragingMode) -> DepixResult<Self> {
        let values: Vec<[f64; 3]> = patch
            .pixels()
            .iter()
            .map(|c| c.channels().map(|v| mode.normalize(v)))
            .collect();
        let uniform = patch
            .uniform_color()
            .map(|c| c.channels().map(|v| mode.normalize(v)));
        Self::from_values(values, patch.width(), patch.height(), uniform)
    }

    /// Builds a plan for a `width x height` patch filled with `fill`.
    pub fn uniform(
        fill: Color,
        width: usize,
        height: usize,
        mode: AveragingMode,
    ) -> DepixResult<Self> {
        let count = width
            .checked_mul(height)
            .ok_or(DepixError::InvalidDimensions { width, height })?;
        let normalized = fill.channels().map(|v| mode.normalize(v));
        Self::from_values(vec![normalized; count], width, height, Some(normalized))
    }

    fn from_values(
        values: Vec<[f64; 3]>,
        width: usize,
        height: usize,
        uniform: Option<[f64; 3]>,
    ) -> DepixResult<Self> {
        if width == 0 || height == 0 {
            return Err(DepixError::InvalidDimensions { width, height });
        }
        if values.len() != width * height {
            return Err(DepixError::BufferTooSmall {
                needed: width * height,
                got: values.len(),
            });
        }
        let sum_t2 = values
            .iter()
            .map(|px| px.iter().map(|v| v * v).sum::<f64>())
            .sum();
        Ok(Self {
            width,
            height,
            values,
            uniform,
            sum_t2,
        })
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the normalized channels in row-major order.
    pub fn values(&self) -> &[[f64; 3]] {
        &self.values
    }

    /// Returns the normalized fill if every pixel shares one color.
    pub fn uniform_fill(&self) -> Option<[f64; 3]> {
        self.uniform
    }

    /// Sum of squared normalized values over all pixels and channels.
    pub fn sum_t2(&self) -> f64 {
        self.sum_t2
    }
}
