//! Engine entry point: segment, filter, index, match, resolve, composite.

use crate::block::filter::remove_moot_colors;
use crate::block::segment::segment_region;
use crate::block::sizes::SizeIndex;
use crate::block::Rect;
use crate::composite::composite;
use crate::image::{Canvas, Color, PixelGrid};
use crate::log::LogSink;
use crate::resolve::{resolve_all, ResolvedBlock};
use crate::search::{MatchConfig, Matcher};
use crate::trace::{names, trace_span};
use crate::util::DepixResult;

/// Below this many distinct sizes the "too many sizes" warning never fires.
const MIN_SIZE_WARNING: usize = 10;

/// Number of distinct block sizes above which a region of `area` pixels is
/// probably not cleanly pixelated.
pub fn size_warning_limit(area: usize) -> usize {
    MIN_SIZE_WARNING.max(area / 100)
}

/// Full configuration for one depixelization run.
#[derive(Clone, Debug, Default)]
pub struct DepixConfig {
    /// Extra fill color to ignore besides black and white.
    pub background: Option<Color>,
    /// Sub-rectangle of the pixelated image to segment; whole image if unset.
    pub region: Option<Rect>,
    /// Matching options.
    pub matching: MatchConfig,
}

/// Block counts collected during a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Blocks produced by segmentation.
    pub segmented: usize,
    /// Blocks left after dropping moot colors.
    pub surviving: usize,
    /// Distinct block sizes among surviving blocks.
    pub sizes: usize,
    /// Blocks with at least one candidate.
    pub matched: usize,
    /// Blocks searched without any candidate.
    pub unmatched: usize,
    /// Blocks skipped because of geometry or match errors.
    pub skipped: usize,
    /// Blocks resolved from a single agreed content.
    pub direct: usize,
    /// Blocks resolved by averaging disagreeing candidates.
    pub averaged: usize,
}

/// Result of [`depixelize`].
#[derive(Clone, Debug)]
pub struct Depixelized {
    /// The pixelated image with every resolved block written back.
    pub canvas: Canvas,
    /// Counts describing the run.
    pub report: RunReport,
}

/// Recovers the pixelated blocks of `pixelated` by searching `reference`.
///
/// Only an invalid region or an unusable reference image fails the run.
/// Blocks that cannot be matched are logged and stay pixelated.
pub fn depixelize(
    pixelated: &PixelGrid,
    reference: &PixelGrid,
    cfg: &DepixConfig,
    sink: &dyn LogSink,
) -> DepixResult<Depixelized> {
    let _span = trace_span!(
        names::DEPIXELIZE,
        width = pixelated.width(),
        height = pixelated.height()
    )
    .entered();

    let region = cfg
        .region
        .unwrap_or_else(|| Rect::new(0, 0, pixelated.width(), pixelated.height()));
    let mut report = RunReport::default();

    let blocks = segment_region(pixelated.view(), region)?;
    report.segmented = blocks.len();
    sink.info(format_args!("found {} same color blocks", blocks.len()));

    let blocks = remove_moot_colors(blocks, cfg.background);
    report.surviving = blocks.len();
    sink.info(format_args!(
        "{} blocks left after moot color filter",
        blocks.len()
    ));

    let index = SizeIndex::build(&blocks);
    report.sizes = index.len();
    sink.info(format_args!("found {} different block sizes", index.len()));
    let size_limit = size_warning_limit(region.area());
    if index.len() > size_limit {
        sink.warn(format_args!(
            "{} block sizes exceed the expected {size_limit}; the image may not be pixelated",
            index.len()
        ));
    }

    let matcher = Matcher::new(reference, cfg.matching.clone())?;
    let run = matcher.match_blocks(pixelated, &blocks, &index, sink);
    report.skipped = run.failed;

    let (resolved, unmatched) = resolve_all(run.matches)?;
    report.matched = resolved.len();
    report.unmatched = unmatched.len();
    sink.info(format_args!(
        "{} blocks matched, {} without a match",
        report.matched, report.unmatched
    ));

    let (averaged, direct): (Vec<ResolvedBlock>, Vec<ResolvedBlock>) = resolved
        .into_iter()
        .partition(|r| r.resolution.is_averaged());
    report.direct = direct.len();
    report.averaged = averaged.len();
    sink.info(format_args!(
        "[{} straight matches | {} multiple matches]",
        report.direct, report.averaged
    ));

    let mut canvas = Canvas::from_grid(pixelated);
    composite(&mut canvas, &direct, sink);
    composite(&mut canvas, &averaged, sink);

    Ok(Depixelized { canvas, report })
}

#[cfg(test)]
mod tests {
    use super::{depixelize, size_warning_limit, DepixConfig};
    use crate::block::Rect;
    use crate::image::{Color, PixelGrid};
    use crate::log::{Level, MemorySink};
    use crate::util::ErrorKind;

    #[test]
    fn size_limit_scales_with_area() {
        assert_eq!(size_warning_limit(100), 10);
        assert_eq!(size_warning_limit(5_000), 50);
    }

    #[test]
    fn invalid_region_is_rejected() {
        let grid = PixelGrid::filled(4, 4, Color::WHITE).unwrap();
        let cfg = DepixConfig {
            region: Some(Rect::new(2, 2, 4, 1)),
            ..DepixConfig::default()
        };
        let err = depixelize(&grid, &grid, &cfg, &MemorySink::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Geometry);
    }

    #[test]
    fn all_moot_image_is_unchanged() {
        let grid = PixelGrid::from_fn(6, 2, |x, _| {
            if x < 3 {
                Color::WHITE
            } else {
                Color::BLACK
            }
        })
        .unwrap();
        let sink = MemorySink::new();
        let out = depixelize(&grid, &grid, &DepixConfig::default(), &sink).unwrap();
        assert_eq!(out.canvas.as_grid(), &grid);
        assert_eq!(out.report.segmented, 2);
        assert_eq!(out.report.surviving, 0);
        assert_eq!(out.report.matched, 0);
        assert_eq!(sink.messages_at(Level::Info)[0], "found 2 same color blocks");
    }

    #[test]
    fn many_sizes_trigger_warning() {
        // Every column is a distinct color with a distinct height.
        let grid = PixelGrid::from_fn(12, 12, |x, y| {
            if y <= x {
                Color::new(10 + x as u8, 50, 90)
            } else {
                Color::WHITE
            }
        })
        .unwrap();
        let sink = MemorySink::new();
        let out = depixelize(&grid, &grid, &DepixConfig::default(), &sink).unwrap();
        assert!(out.report.sizes > 10);
        assert!(sink
            .messages_at(Level::Warn)
            .iter()
            .any(|m| m.contains("block sizes exceed")));
    }
}
