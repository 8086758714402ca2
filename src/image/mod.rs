//! Pixel storage: borrowed views, owned grids and prepared reference planes.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows. ROI slices are zero-copy
//! views into the same backing slice and retain the original stride.

use crate::util::{DepixError, DepixResult};

pub mod color;
pub mod grid;
pub mod planes;

#[cfg(feature = "image-io")]
pub mod io;

pub use color::Color;
pub use grid::{Canvas, Patch, PixelGrid};
pub use planes::ReferencePlanes;

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> DepixResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> DepixResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(DepixError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y.checked_mul(self.stride)?.checked_add(x)?;
        self.data.get(idx)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width)?;
        self.data.get(start..end)
    }

    /// Returns a zero-copy ROI view into the same backing buffer.
    pub fn roi(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> DepixResult<ImageView<'a, T>> {
        if width == 0 || height == 0 {
            return Err(DepixError::InvalidDimensions { width, height });
        }

        let out_of_bounds = DepixError::RegionOutOfBounds {
            x,
            y,
            width,
            height,
            img_width: self.width,
            img_height: self.height,
        };
        let end_x = x.checked_add(width).ok_or_else(|| out_of_bounds.clone())?;
        let end_y = y.checked_add(height).ok_or_else(|| out_of_bounds.clone())?;
        if end_x > self.width || end_y > self.height {
            return Err(out_of_bounds);
        }

        let start = y
            .checked_mul(self.stride)
            .and_then(|v| v.checked_add(x))
            .ok_or(DepixError::InvalidDimensions {
                width: self.width,
                height: self.height,
            })?;
        let data = self.data.get(start..).ok_or(DepixError::BufferTooSmall {
            needed: start.saturating_add(1),
            got: self.data.len(),
        })?;

        ImageView::new(data, width, height, self.stride)
    }
}

impl<T: Copy> ImageView<'_, T> {
    /// Copies the view into a contiguous row-major vector.
    pub fn to_vec(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            if let Some(row) = self.row(y) {
                out.extend_from_slice(row);
            }
        }
        out
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> DepixResult<usize> {
    if width == 0 || height == 0 {
        return Err(DepixError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(DepixError::InvalidInput("stride is smaller than width"));
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(DepixError::InvalidDimensions { width, height })
}

#[cfg(test)]
mod tests {
    use super::ImageView;
    use crate::util::DepixError;

    #[test]
    fn roi_is_zero_copy_and_keeps_stride() {
        let data: Vec<u8> = (0u8..16).collect();
        let view = ImageView::from_slice(&data, 4, 4).unwrap();
        let roi = view.roi(1, 1, 2, 2).unwrap();
        assert_eq!(roi.stride(), 4);
        assert_eq!(roi.row(0).unwrap(), &[5u8, 6u8]);
        assert_eq!(roi.row(1).unwrap(), &[9u8, 10u8]);
        assert_eq!(roi.to_vec(), vec![5, 6, 9, 10]);
        assert!(roi.get(2, 0).is_none());
    }

    #[test]
    fn roi_rejects_out_of_bounds() {
        let data = [0u8; 16];
        let view = ImageView::from_slice(&data, 4, 4).unwrap();
        let err = view.roi(3, 3, 2, 2).unwrap_err();
        assert_eq!(
            err,
            DepixError::RegionOutOfBounds {
                x: 3,
                y: 3,
                width: 2,
                height: 2,
                img_width: 4,
                img_height: 4,
            }
        );
    }

    #[test]
    fn rejects_short_buffers() {
        let data = [0u8; 3];
        let err = ImageView::new(&data, 2, 2, 2).unwrap_err();
        assert_eq!(err, DepixError::BufferTooSmall { needed: 4, got: 3 });
    }
}
