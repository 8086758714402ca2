//! Block-average pixelation, used to produce test inputs.
//!
//! The image is tiled with `block_size` squares starting at the origin; tiles
//! on the right and bottom edges are clipped to the image. Each tile is
//! replaced by the truncated mean of its pixels.

use crate::image::{Color, PixelGrid};
use crate::util::{math, DepixError, DepixResult};
use std::fmt;
use std::str::FromStr;

/// How tile colors are averaged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PixelationMode {
    /// Plain mean of the 8-bit values, as most screenshot tools do.
    #[default]
    Gamma,
    /// Mean in approximately linear light, converted back with `1/2.2`.
    Linear,
}

impl PixelationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PixelationMode::Gamma => "gamma",
            PixelationMode::Linear => "linear",
        }
    }
}

impl fmt::Display for PixelationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PixelationMode {
    type Err = DepixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gamma" => Ok(PixelationMode::Gamma),
            "linear" => Ok(PixelationMode::Linear),
            _ => Err(DepixError::InvalidInput(
                "pixelation method must be gamma or linear",
            )),
        }
    }
}

/// Pixelates `image` with square tiles of `block_size`.
pub fn pixelate(
    image: &PixelGrid,
    block_size: usize,
    mode: PixelationMode,
) -> DepixResult<PixelGrid> {
    if block_size == 0 {
        return Err(DepixError::InvalidInput("block size must be at least 1"));
    }
    let width = image.width();
    let height = image.height();
    let mut out = image.pixels().to_vec();

    for ty in (0..height).step_by(block_size) {
        let y1 = (ty + block_size).min(height);
        for tx in (0..width).step_by(block_size) {
            let x1 = (tx + block_size).min(width);
            let rows = || (ty..y1).map(|y| &image.pixels()[y * width + tx..y * width + x1]);
            let count = ((x1 - tx) * (y1 - ty)) as f64;

            let color = match mode {
                PixelationMode::Gamma => {
                    let mut sums = [0u64; 3];
                    for px in rows().flatten() {
                        for (s, v) in sums.iter_mut().zip(px.channels()) {
                            *s += u64::from(v);
                        }
                    }
                    let n = count as u64;
                    Color::from_channels(sums.map(|s| (s / n) as u8))
                }
                PixelationMode::Linear => {
                    let mut sums = [0f64; 3];
                    for px in rows().flatten() {
                        for (s, v) in sums.iter_mut().zip(px.channels()) {
                            *s += math::linearize(math::unit(v));
                        }
                    }
                    Color::from_channels(sums.map(|s| math::encode_truncated(s / count)))
                }
            };

            for y in ty..y1 {
                out[y * width + tx..y * width + x1].fill(color);
            }
        }
    }
    PixelGrid::new(out, width, height)
}
