//! Uniform-color blocks found in the pixelated source.
//!
//! A [`Block`] is plain data: a rectangle plus the color filling it. The
//! submodules partition a region into blocks, drop uninformative ones and
//! group the survivors by size.

pub mod filter;
pub mod segment;
pub mod sizes;

use crate::image::Color;

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Number of pixels covered.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Returns true if `(x, y)` lies inside the rectangle.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && y >= self.y && x - self.x < self.width && y - self.y < self.height
    }

    /// Returns true if the two rectangles share at least one pixel.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }

    /// Returns the `(width, height)` pair.
    pub fn size(&self) -> BlockSize {
        BlockSize {
            width: self.width,
            height: self.height,
        }
    }
}

/// Width and height of a block, used as a grouping key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockSize {
    pub width: usize,
    pub height: usize,
}

impl BlockSize {
    /// Creates a size key.
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

/// A rectangle of identical pixels in the pixelated image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Block {
    pub rect: Rect,
    pub fill: Color,
}

impl Block {
    /// Creates a block.
    pub const fn new(rect: Rect, fill: Color) -> Self {
        Self { rect, fill }
    }
}
