//! Writes resolved block contents over the pixelated canvas.

use crate::image::Canvas;
use crate::log::LogSink;
use crate::resolve::ResolvedBlock;

/// Writes every resolved block at its original offset, in order.
///
/// Later blocks overwrite earlier ones where rectangles overlap. A block
/// that does not fit the canvas is logged and skipped. Returns the number
/// of blocks written.
pub fn composite(canvas: &mut Canvas, resolved: &[ResolvedBlock], sink: &dyn LogSink) -> usize {
    let mut written = 0;
    for item in resolved {
        let rect = item.block.rect;
        match canvas.write_patch(rect.x, rect.y, item.resolution.content()) {
            Ok(()) => written += 1,
            Err(err) => sink.warn(format_args!(
                "skipping block at ({}, {}): {err}",
                rect.x, rect.y
            )),
        }
    }
    written
}
