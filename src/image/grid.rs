//! Owned RGB buffers: the immutable `PixelGrid`, block-sized `Patch`es and
//! the mutable output `Canvas`.

use crate::image::{Color, ImageView};
use crate::util::{DepixError, DepixResult};

/// Immutable row-major RGB image, origin at the top-left corner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelGrid {
    data: Vec<Color>,
    width: usize,
    height: usize,
}

impl PixelGrid {
    /// Wraps a row-major buffer of exactly `width * height` pixels.
    pub fn new(data: Vec<Color>, width: usize, height: usize) -> DepixResult<Self> {
        if width == 0 || height == 0 {
            return Err(DepixError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(DepixError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(DepixError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(DepixError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Creates a grid of a single color.
    pub fn filled(width: usize, height: usize, color: Color) -> DepixResult<Self> {
        let len = width
            .checked_mul(height)
            .ok_or(DepixError::InvalidDimensions { width, height })?;
        Self::new(vec![color; len], width, height)
    }

    /// Creates a grid by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> DepixResult<Self>
    where
        F: FnMut(usize, usize) -> Color,
    {
        let mut data = Vec::with_capacity(width.saturating_mul(height));
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self::new(data, width, height)
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the color at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Returns the row-major pixel buffer.
    pub fn pixels(&self) -> &[Color] {
        &self.data
    }

    /// Returns a borrowed view of the whole grid.
    pub fn view(&self) -> ImageView<'_, Color> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }

    /// Reads a `width x height` window at `(x, y)`; pixels outside the grid
    /// read as black.
    pub fn patch_at(&self, x: usize, y: usize, width: usize, height: usize) -> Patch {
        let mut pixels = Vec::with_capacity(width * height);
        for dy in 0..height {
            for dx in 0..width {
                let px = x.checked_add(dx);
                let py = y.checked_add(dy);
                let color = match (px, py) {
                    (Some(px), Some(py)) => self.get(px, py).unwrap_or(Color::BLACK),
                    _ => Color::BLACK,
                };
                pixels.push(color);
            }
        }
        Patch {
            width,
            height,
            pixels,
        }
    }

    /// Copies a rectangle that must lie fully inside the grid.
    pub fn extract(&self, x: usize, y: usize, width: usize, height: usize) -> DepixResult<Patch> {
        let roi = self.view().roi(x, y, width, height)?;
        Patch::new(roi.to_vec(), width, height)
    }
}

/// A block-sized rectangle of colors in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Patch {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl Patch {
    /// Wraps exactly `width * height` colors.
    pub fn new(pixels: Vec<Color>, width: usize, height: usize) -> DepixResult<Self> {
        if width == 0 || height == 0 {
            return Err(DepixError::InvalidDimensions { width, height });
        }
        if pixels.len() != width * height {
            return Err(DepixError::BufferTooSmall {
                needed: width * height,
                got: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Creates a patch of a single color.
    pub fn filled(width: usize, height: usize, color: Color) -> DepixResult<Self> {
        Self::new(vec![color; width * height], width, height)
    }

    /// Returns the patch width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the patch height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the colors in row-major order.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Returns the color at `(x, y)` inside the patch.
    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    /// Returns the single color if every pixel is identical.
    pub fn uniform_color(&self) -> Option<Color> {
        let first = *self.pixels.first()?;
        self.pixels.iter().all(|&c| c == first).then_some(first)
    }
}

/// Mutable output surface, initialized from the pixelated source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    grid: PixelGrid,
}

impl Canvas {
    /// Starts a canvas as a copy of `source`.
    pub fn from_grid(source: &PixelGrid) -> Self {
        Self {
            grid: source.clone(),
        }
    }

    /// Returns the current contents.
    pub fn as_grid(&self) -> &PixelGrid {
        &self.grid
    }

    /// Consumes the canvas and returns its contents.
    pub fn into_grid(self) -> PixelGrid {
        self.grid
    }

    /// Returns the color at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        self.grid.get(x, y)
    }

    /// Overwrites the rectangle at `(x, y)` with `patch`.
    pub fn write_patch(&mut self, x: usize, y: usize, patch: &Patch) -> DepixResult<()> {
        let width = patch.width();
        let height = patch.height();
        let out_of_bounds = || DepixError::RegionOutOfBounds {
            x,
            y,
            width,
            height,
            img_width: self.grid.width,
            img_height: self.grid.height,
        };
        let end_x = x.checked_add(width).ok_or_else(out_of_bounds)?;
        let end_y = y.checked_add(height).ok_or_else(out_of_bounds)?;
        if end_x > self.grid.width || end_y > self.grid.height {
            return Err(out_of_bounds());
        }

        let stride = self.grid.width;
        for (dy, src) in patch.pixels().chunks_exact(width).enumerate() {
            let start = (y + dy) * stride + x;
            self.grid.data[start..start + width].copy_from_slice(src);
        }
        Ok(())
    }
}
