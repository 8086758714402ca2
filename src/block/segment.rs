//! Column-band partition of a region into uniform-color blocks.
//!
//! The scan walks column bands left to right. Inside a band it walks down:
//! the block width is the color run along the current row only, the height
//! is the number of rows whose first `width` pixels all share that color.
//! The next band starts at `x + width` using the width of the last block
//! emitted in the band. When rows in one band have runs of different
//! lengths the resulting blocks may overlap or leave gaps relative to the
//! neighbouring band; callers must not assume a perfect tiling.

use crate::block::{Block, Rect};
use crate::image::{Color, ImageView};
use crate::trace::{names, trace_event, trace_span};
use crate::util::{DepixError, DepixResult};

/// Partitions `region` of `image` into blocks in scan order.
pub fn segment_region(image: ImageView<'_, Color>, region: Rect) -> DepixResult<Vec<Block>> {
    let _span = trace_span!(names::SEGMENT, width = region.width, height = region.height).entered();

    // Validates bounds and non-zero size.
    let roi = image.roi(region.x, region.y, region.width, region.height)?;
    let max_x = region.width;
    let max_y = region.height;
    let pixel = |x: usize, y: usize| -> DepixResult<Color> {
        roi.get(x, y)
            .copied()
            .ok_or(DepixError::InvalidInput("segment scan left the region"))
    };

    let mut blocks = Vec::new();
    let mut x = 0usize;
    while x < max_x {
        let mut y = 0usize;
        let mut width = 1usize;
        while y < max_y {
            let fill = pixel(x, y)?;

            width = 1;
            while x + width < max_x && pixel(x + width, y)? == fill {
                width += 1;
            }

            let mut height = 1usize;
            'rows: while y + height < max_y {
                for dx in 0..width {
                    if pixel(x + dx, y + height)? != fill {
                        break 'rows;
                    }
                }
                height += 1;
            }

            blocks.push(Block::new(
                Rect::new(region.x + x, region.y + y, width, height),
                fill,
            ));
            y += height;
        }
        x += width;
    }

    trace_event!(names::SEGMENTED, count = blocks.len());
    Ok(blocks)
}

/// Partitions the whole image.
pub fn segment(image: ImageView<'_, Color>) -> DepixResult<Vec<Block>> {
    segment_region(image, Rect::new(0, 0, image.width(), image.height()))
}
