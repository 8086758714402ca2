//! Reference image prepared for matching.
//!
//! Each channel is kept as raw 8-bit levels plus summed-area tables of the
//! integer level weights (see [`AveragingMode::level_weight`]) and of their
//! squares. Table arithmetic is exact modular integer arithmetic, so a
//! window's sums carry no rounding noise however far from the origin it
//! sits; they are converted to normalized floats only when read. Rows and
//! columns beyond the image edge contribute zero, i.e. read as black.

use crate::image::PixelGrid;
use crate::search::AveragingMode;
use crate::util::DepixResult;

/// Per-channel sums of a window: `s1` of values, `s2` of squared values.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WindowSums {
    pub s1: [f64; 3],
    pub s2: [f64; 3],
}

/// Normalized reference channels with summed-area tables.
pub struct ReferencePlanes {
    width: usize,
    height: usize,
    mode: AveragingMode,
    levels: [Vec<u8>; 3],
    unit: [f64; 256],
    // Wrapping prefix sums; a window total is exact while it fits the type.
    sums: [Vec<u64>; 3],
    sq_sums: [Vec<u128>; 3],
}

impl ReferencePlanes {
    /// Splits `grid` into channel levels and builds the tables for `mode`.
    pub fn build(grid: &PixelGrid, mode: AveragingMode) -> DepixResult<Self> {
        let width = grid.width();
        let height = grid.height();
        let mut levels: [Vec<u8>; 3] = Default::default();
        for plane in levels.iter_mut() {
            plane.reserve_exact(width * height);
        }
        for color in grid.pixels() {
            for (plane, channel) in levels.iter_mut().zip(color.channels()) {
                plane.push(channel);
            }
        }

        let mut weights = [0u64; 256];
        let mut unit = [0.0f64; 256];
        for level in 0..=255u8 {
            weights[usize::from(level)] = mode.level_weight(level);
            unit[usize::from(level)] = mode.normalize(level);
        }

        let stride = width + 1;
        let table_len = stride * (height + 1);
        let mut sums: [Vec<u64>; 3] = Default::default();
        let mut sq_sums: [Vec<u128>; 3] = Default::default();
        for c in 0..3 {
            let mut s = vec![0u64; table_len];
            let mut sq = vec![0u128; table_len];
            for y in 0..height {
                let mut row_sum = 0u64;
                let mut row_sq = 0u128;
                for x in 0..width {
                    let w = weights[usize::from(levels[c][y * width + x])];
                    row_sum = row_sum.wrapping_add(w);
                    row_sq = row_sq.wrapping_add(u128::from(w) * u128::from(w));
                    let idx = (y + 1) * stride + x + 1;
                    s[idx] = s[idx - stride].wrapping_add(row_sum);
                    sq[idx] = sq[idx - stride].wrapping_add(row_sq);
                }
            }
            sums[c] = s;
            sq_sums[c] = sq;
        }

        Ok(Self {
            width,
            height,
            mode,
            levels,
            unit,
            sums,
            sq_sums,
        })
    }

    /// Returns the reference width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the reference height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the transfer mode the planes were built with.
    pub fn mode(&self) -> AveragingMode {
        self.mode
    }

    /// Returns the normalized value of `channel` at `(x, y)`; zero outside.
    #[inline]
    pub fn value(&self, channel: usize, x: usize, y: usize) -> f64 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.unit[usize::from(self.levels[channel][y * self.width + x])]
    }

    /// Returns the sums over the `w x h` window at `(x, y)`, clipped to the image.
    pub fn window_sums(&self, x: usize, y: usize, w: usize, h: usize) -> WindowSums {
        let x0 = x.min(self.width);
        let y0 = y.min(self.height);
        let x1 = x.saturating_add(w).min(self.width);
        let y1 = y.saturating_add(h).min(self.height);
        let stride = self.width + 1;
        let (a, b, c, d) = (
            y1 * stride + x1,
            y0 * stride + x1,
            y1 * stride + x0,
            y0 * stride + x0,
        );

        let scale = self.mode.level_scale();
        let scale2 = scale * scale;
        let mut out = WindowSums::default();
        for ch in 0..3 {
            let s = &self.sums[ch];
            let s1 = s[a].wrapping_sub(s[b]).wrapping_sub(s[c]).wrapping_add(s[d]);
            let sq = &self.sq_sums[ch];
            let s2 = sq[a].wrapping_sub(sq[b]).wrapping_sub(sq[c]).wrapping_add(sq[d]);
            out.s1[ch] = s1 as f64 / scale;
            out.s2[ch] = s2 as f64 / scale2;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::ReferencePlanes;
    use crate::image::{Color, PixelGrid};
    use crate::search::AveragingMode;

    fn gradient() -> PixelGrid {
        PixelGrid::from_fn(5, 4, |x, y| {
            Color::new((x * 40) as u8, (y * 60) as u8, ((x + y) * 20) as u8)
        })
        .unwrap()
    }

    #[test]
    fn window_sums_match_direct_sums() {
        let grid = gradient();
        for mode in [AveragingMode::GammaCorrected, AveragingMode::Linear] {
            let planes = ReferencePlanes::build(&grid, mode).unwrap();
            for (x, y, w, h) in [(0, 0, 5, 4), (1, 1, 2, 3), (4, 3, 1, 1), (3, 2, 4, 4)] {
                let sums = planes.window_sums(x, y, w, h);
                for c in 0..3 {
                    let mut s1 = 0.0;
                    let mut s2 = 0.0;
                    for yy in y..y + h {
                        for xx in x..x + w {
                            let v = planes.value(c, xx, yy);
                            s1 += v;
                            s2 += v * v;
                        }
                    }
                    assert!((sums.s1[c] - s1).abs() < 1e-9, "{mode} s1 {c} at {x},{y}");
                    assert!((sums.s2[c] - s2).abs() < 1e-9, "{mode} s2 {c} at {x},{y}");
                }
            }
        }
    }

    #[test]
    fn equal_windows_far_apart_have_identical_sums() {
        let (width, height) = (1500, 900);
        let grid = PixelGrid::from_fn(width, height, |x, y| {
            if (x, y) == (2, 1) || (x, y) == (width - 2, height - 1) {
                Color::new(201, 17, 99)
            } else {
                let v = ((x * 31 + y * 17) % 97 + 150) as u8;
                Color::new(v, v.wrapping_add(40), 255 - v)
            }
        })
        .unwrap();
        for mode in [AveragingMode::GammaCorrected, AveragingMode::Linear] {
            let planes = ReferencePlanes::build(&grid, mode).unwrap();
            let near = planes.window_sums(2, 1, 1, 1);
            let far = planes.window_sums(width - 2, height - 1, 1, 1);
            assert_eq!(near, far, "{mode}");
        }
    }

    #[test]
    fn linear_mode_darkens_midtones() {
        let grid = PixelGrid::filled(1, 1, Color::new(128, 0, 255)).unwrap();
        let gamma = ReferencePlanes::build(&grid, AveragingMode::GammaCorrected).unwrap();
        let linear = ReferencePlanes::build(&grid, AveragingMode::Linear).unwrap();
        assert!(linear.value(0, 0, 0) < gamma.value(0, 0, 0));
        assert_eq!(linear.value(1, 0, 0), 0.0);
        assert_eq!(linear.value(2, 0, 0), 1.0);
        assert_eq!(linear.value(0, 3, 3), 0.0);
    }
}
