//! Debug rendering of detected blocks over an enlarged copy of the image.

use crate::block::Block;
use crate::image::{Color, PixelGrid};
use crate::util::{DepixError, DepixResult};

/// Default enlargement factor.
pub const DEFAULT_ENHANCE: usize = 3;

/// Outline color used by the command-line tool.
pub const OUTLINE: Color = Color::new(255, 0, 0);

/// Upscales `image` by `enhance` (nearest neighbour) and draws a one-pixel
/// outline for every block.
///
/// A block at `(x, y, w, h)` is outlined from `(x*e, y*e)` to
/// `((x+w)*e - e, (y+h)*e - e)`, both corners inclusive. Outline pixels
/// that fall outside the enlarged image are dropped.
pub fn render_boxes(
    image: &PixelGrid,
    blocks: &[Block],
    enhance: usize,
    outline: Color,
) -> DepixResult<PixelGrid> {
    if enhance == 0 {
        return Err(DepixError::InvalidInput("enhancement factor must be at least 1"));
    }
    let width = image
        .width()
        .checked_mul(enhance)
        .ok_or(DepixError::InvalidDimensions {
            width: image.width(),
            height: image.height(),
        })?;
    let height = image
        .height()
        .checked_mul(enhance)
        .ok_or(DepixError::InvalidDimensions {
            width: image.width(),
            height: image.height(),
        })?;

    let src = image.pixels();
    let src_w = image.width();
    let mut data: Vec<Color> = Vec::with_capacity(width * height);
    for y in 0..height {
        let row = &src[(y / enhance) * src_w..(y / enhance + 1) * src_w];
        for x in 0..width {
            data.push(row[x / enhance]);
        }
    }

    let mut put = |x: usize, y: usize| {
        if x < width && y < height {
            data[y * width + x] = outline;
        }
    };
    for block in blocks {
        let r = block.rect;
        if r.width == 0 || r.height == 0 {
            continue;
        }
        let x0 = r.x * enhance;
        let y0 = r.y * enhance;
        let x1 = (r.x + r.width) * enhance - enhance;
        let y1 = (r.y + r.height) * enhance - enhance;
        for x in x0..=x1 {
            put(x, y0);
            put(x, y1);
        }
        for y in y0..=y1 {
            put(x0, y);
            put(x1, y);
        }
    }

    PixelGrid::new(data, width, height)
}
