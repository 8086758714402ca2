//! Per-block search of the reference image.
//!
//! [`Matcher`] prepares the reference once, then walks the blocks size group
//! by size group. Single-color blocks are scored from the reference's window
//! sums, anything else pixel by pixel. A block whose pixels cannot be read or
//! matched is logged and left out; the run goes on.

use crate::block::sizes::SizeIndex;
use crate::block::Block;
use crate::candidate::ties::ScoreMap;
use crate::image::{Patch, PixelGrid, ReferencePlanes};
use crate::kernel::scalar::DirectScalar;
use crate::kernel::uniform::UniformFill;
use crate::kernel::{Kernel, ScanParams};
use crate::log::LogSink;
use crate::template::PatchPlan;
use crate::trace::{names, trace_event, trace_span};
use crate::util::{math, DepixError, DepixResult, ErrorKind};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "rayon")]
use crate::kernel::rayon::{direct_score_map_par, uniform_score_map_par};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Default tolerance under which two scores count as tied.
pub const DEFAULT_TIE_TOLERANCE: f64 = 1e-9;

/// Default cap on tied candidates kept per block.
pub const DEFAULT_MAX_CANDIDATES: usize = 64;

const PROGRESS_EVERY: usize = 50;

/// Fixed-point scale (2^32) of linear-light level weights.
const LINEAR_SCALE: f64 = 4_294_967_296.0;

/// How the pixelation tool averaged colors, and so how colors are compared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AveragingMode {
    /// Compare gamma-encoded values normalized to `[0, 1]`.
    #[default]
    GammaCorrected,
    /// Compare `v^2.2`, approximating linear light.
    Linear,
}

impl AveragingMode {
    /// Maps an 8-bit channel into the comparison space.
    ///
    /// Always equals `level_weight(value) / level_scale()`.
    #[inline]
    pub fn normalize(self, value: u8) -> f64 {
        self.level_weight(value) as f64 / self.level_scale()
    }

    /// Integer weight of an 8-bit level in the comparison space.
    ///
    /// Gamma mode uses the level itself; linear mode stores `v^2.2` in
    /// 32-bit fixed point. Sums of weights are exact, so two windows holding
    /// the same pixels get identical sums wherever they sit.
    #[inline]
    pub fn level_weight(self, value: u8) -> u64 {
        match self {
            AveragingMode::GammaCorrected => u64::from(value),
            AveragingMode::Linear => {
                (math::linearize(math::unit(value)) * LINEAR_SCALE).round() as u64
            }
        }
    }

    /// Divisor turning a level weight into a normalized value.
    #[inline]
    pub fn level_scale(self) -> f64 {
        match self {
            AveragingMode::GammaCorrected => 255.0,
            AveragingMode::Linear => LINEAR_SCALE,
        }
    }

    /// Command-line name of the mode.
    pub fn as_str(self) -> &'static str {
        match self {
            AveragingMode::GammaCorrected => "gammacorrected",
            AveragingMode::Linear => "linear",
        }
    }
}

impl fmt::Display for AveragingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AveragingMode {
    type Err = DepixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gammacorrected" => Ok(AveragingMode::GammaCorrected),
            "linear" => Ok(AveragingMode::Linear),
            _ => Err(DepixError::InvalidInput(
                "averaging mode must be gammacorrected or linear",
            )),
        }
    }
}

/// Matching configuration, fixed for a whole run.
#[derive(Clone, Debug)]
pub struct MatchConfig {
    /// Comparison space.
    pub averaging: AveragingMode,
    /// Keep every placement tied at the best score instead of only the first.
    pub detect_ties: bool,
    /// Scores within this distance of the best count as ties.
    pub tie_tolerance: f64,
    /// Upper bound on tied candidates kept per block.
    pub max_candidates: usize,
    /// Match blocks in parallel (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            averaging: AveragingMode::GammaCorrected,
            detect_ties: true,
            tie_tolerance: DEFAULT_TIE_TOLERANCE,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            parallel: false,
        }
    }
}

impl MatchConfig {
    /// Without tie detection only the first best placement in row-major
    /// order is kept.
    pub(crate) fn scan_params(&self) -> ScanParams {
        let max_candidates = if self.detect_ties {
            self.max_candidates.max(1)
        } else {
            1
        };
        ScanParams {
            max_candidates,
            tie_tolerance: self.tie_tolerance.max(0.0),
        }
    }

    fn use_parallel(&self) -> bool {
        cfg!(feature = "rayon") && self.parallel
    }
}

/// A reference location and the pixels found there.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// Column of the window's top-left corner in the reference.
    pub x: usize,
    /// Row of the window's top-left corner in the reference.
    pub y: usize,
    /// Normalized squared-difference score; zero is exact.
    pub score: f64,
    /// Reference pixels under the window, black where it overhangs.
    pub content: Patch,
}

/// A block together with its best-scoring candidates.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockMatch {
    pub block: Block,
    pub candidates: Vec<Candidate>,
}

/// Output of [`Matcher::match_blocks`].
#[derive(Clone, Debug, Default)]
pub struct MatchRun {
    /// Matched blocks in their original order; candidate lists may be empty.
    pub matches: Vec<BlockMatch>,
    /// Blocks skipped because of geometry or match errors.
    pub failed: usize,
}

/// Searches one reference image for pixelated blocks.
pub struct Matcher<'r> {
    reference: &'r PixelGrid,
    planes: ReferencePlanes,
    cfg: MatchConfig,
}

impl<'r> Matcher<'r> {
    /// Prepares `reference` for matching under `cfg`.
    pub fn new(reference: &'r PixelGrid, cfg: MatchConfig) -> DepixResult<Self> {
        let _span = trace_span!(
            names::PREPARE_REFERENCE,
            width = reference.width(),
            height = reference.height()
        )
        .entered();
        let planes = ReferencePlanes::build(reference, cfg.averaging)?;
        Ok(Self {
            reference,
            planes,
            cfg,
        })
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Returns the prepared reference planes.
    pub fn planes(&self) -> &ReferencePlanes {
        &self.planes
    }

    /// Matches a single block of `source`.
    ///
    /// When more placements tie than `max_candidates` allows, the extra ones
    /// are dropped and a warning naming the block goes to `sink`.
    pub fn match_block(
        &self,
        source: &PixelGrid,
        block: &Block,
        sink: &dyn LogSink,
    ) -> DepixResult<Vec<Candidate>> {
        let rect = block.rect;
        if rect.width == 0 || rect.height == 0 {
            return Err(DepixError::DegenerateBlock {
                x: rect.x,
                y: rect.y,
                reason: "zero-size block",
            });
        }

        let patch = source.extract(rect.x, rect.y, rect.width, rect.height)?;
        let plan = PatchPlan::from_patch(&patch, self.cfg.averaging)?;
        let params = self.cfg.scan_params();

        let map = if plan.uniform_fill().is_some() {
            self.uniform_map(&plan)?
        } else {
            self.direct_map(&plan)?
        };
        let peaks = map.select_ties(params.max_candidates, params.tie_tolerance);
        if self.cfg.detect_ties {
            let tied = map.count_ties(params.tie_tolerance);
            if tied > peaks.len() {
                sink.warn(format_args!(
                    "block at ({}, {}) has {tied} tied locations, keeping the first {}",
                    rect.x,
                    rect.y,
                    peaks.len()
                ));
            }
        }

        Ok(peaks
            .into_iter()
            .map(|peak| Candidate {
                x: peak.x,
                y: peak.y,
                score: peak.score,
                content: self
                    .reference
                    .patch_at(peak.x, peak.y, rect.width, rect.height),
            })
            .collect())
    }

    fn uniform_map(&self, plan: &PatchPlan) -> DepixResult<ScoreMap> {
        #[cfg(feature = "rayon")]
        if self.cfg.use_parallel() {
            return uniform_score_map_par(&self.planes, plan);
        }
        UniformFill::score_map(&self.planes, plan)
    }

    fn direct_map(&self, plan: &PatchPlan) -> DepixResult<ScoreMap> {
        #[cfg(feature = "rayon")]
        if self.cfg.use_parallel() {
            return Ok(direct_score_map_par(&self.planes, plan));
        }
        DirectScalar::score_map(&self.planes, plan)
    }

    /// Matches every block listed in `index`, reporting to `sink`.
    ///
    /// `index` must have been built from `blocks`.
    pub fn match_blocks(
        &self,
        source: &PixelGrid,
        blocks: &[Block],
        index: &SizeIndex,
        sink: &dyn LogSink,
    ) -> MatchRun {
        let _span = trace_span!(names::MATCH_BLOCKS, blocks = blocks.len(), sizes = index.len())
            .entered();

        let total = blocks.len();
        let done = AtomicUsize::new(0);
        let mut slots: Vec<Option<Vec<Candidate>>> = vec![None; total];
        let mut failed = 0usize;

        for (size, members) in index.iter() {
            trace_event!(names::SIZE_GROUP, width = size.width, height = size.height);
            let run_one = |idx: usize| {
                let result = match blocks.get(idx) {
                    Some(block) => self.match_block(source, block, sink),
                    None => Err(DepixError::InvalidInput("size index does not match blocks")),
                };
                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                if finished % PROGRESS_EVERY == 0 || finished == total {
                    sink.info(format_args!(
                        "progress: {finished}/{total} blocks processed ({:.1}%)",
                        finished as f64 * 100.0 / total.max(1) as f64
                    ));
                }
                (idx, result)
            };

            let results: Vec<(usize, DepixResult<Vec<Candidate>>)> = {
                #[cfg(feature = "rayon")]
                {
                    if self.cfg.use_parallel() {
                        members.par_iter().map(|&idx| run_one(idx)).collect()
                    } else {
                        members.iter().map(|&idx| run_one(idx)).collect()
                    }
                }
                #[cfg(not(feature = "rayon"))]
                {
                    members.iter().map(|&idx| run_one(idx)).collect()
                }
            };

            for (idx, result) in results {
                match result {
                    Ok(candidates) => {
                        if let Some(slot) = slots.get_mut(idx) {
                            *slot = Some(candidates);
                        }
                    }
                    Err(err) => {
                        failed += 1;
                        log_block_failure(sink, blocks.get(idx), &err);
                    }
                }
            }
        }

        let matches: Vec<BlockMatch> = blocks
            .iter()
            .zip(slots)
            .filter_map(|(block, slot)| {
                slot.map(|candidates| BlockMatch {
                    block: *block,
                    candidates,
                })
            })
            .collect();

        trace_event!(names::MATCHED, count = matches.len(), failed = failed);
        MatchRun { matches, failed }
    }
}

fn log_block_failure(sink: &dyn LogSink, block: Option<&Block>, err: &DepixError) {
    let (x, y) = block.map_or((0, 0), |b| (b.rect.x, b.rect.y));
    match err.kind() {
        ErrorKind::Geometry => sink.warn(format_args!("skipping block at ({x}, {y}): {err}")),
        _ => sink.error(format_args!("error processing block at ({x}, {y}): {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::{AveragingMode, MatchConfig, Matcher};
    use crate::block::sizes::SizeIndex;
    use crate::block::{Block, Rect};
    use crate::image::{Color, PixelGrid};
    use crate::kernel::scalar::DirectScalar;
    use crate::kernel::Kernel;
    use crate::log::{Level, MemorySink};
    use crate::template::PatchPlan;
    use crate::util::ErrorKind;

    const P: Color = Color::new(100, 100, 100);
    const Q: Color = Color::new(120, 120, 120);
    const K: Color = Color::new(10, 10, 10);
    const MID: Color = Color::new(110, 110, 110);

    fn tie_reference() -> PixelGrid {
        let row = [K, P, Q, K, Q, P, K];
        PixelGrid::from_fn(row.len(), 1, |x, _| row[x]).unwrap()
    }

    #[test]
    fn parses_modes() {
        assert_eq!(
            "gammacorrected".parse::<AveragingMode>().unwrap(),
            AveragingMode::GammaCorrected
        );
        assert_eq!("Linear".parse::<AveragingMode>().unwrap(), AveragingMode::Linear);
        assert!("gamma".parse::<AveragingMode>().is_err());
        assert_eq!(AveragingMode::default().to_string(), "gammacorrected");
    }

    #[test]
    fn normalize_follows_level_weights() {
        for mode in [AveragingMode::GammaCorrected, AveragingMode::Linear] {
            assert_eq!(mode.level_weight(0), 0);
            assert_eq!(mode.normalize(255), 1.0);
        }
        assert_eq!(AveragingMode::GammaCorrected.normalize(51), 51.0 / 255.0);
        let linear = AveragingMode::Linear.normalize(128);
        assert!((linear - (128.0f64 / 255.0).powf(2.2)).abs() < 1e-9);
    }

    #[test]
    fn mirrored_windows_tie() {
        let reference = tie_reference();
        let source = PixelGrid::filled(2, 1, MID).unwrap();
        let block = Block::new(Rect::new(0, 0, 2, 1), MID);
        let matcher = Matcher::new(&reference, MatchConfig::default()).unwrap();
        let sink = MemorySink::new();

        let candidates = matcher.match_block(&source, &block, &sink).unwrap();
        let positions: Vec<(usize, usize)> = candidates.iter().map(|c| (c.x, c.y)).collect();
        assert_eq!(positions, vec![(1, 0), (4, 0)]);
        assert_eq!(candidates[0].content.pixels(), &[P, Q]);
        assert_eq!(candidates[1].content.pixels(), &[Q, P]);
        assert!(sink.messages_at(Level::Warn).is_empty());

        let plan = PatchPlan::uniform(MID, 2, 1, AveragingMode::GammaCorrected).unwrap();
        let params = matcher.config().scan_params();
        let direct = DirectScalar::scan_full(matcher.planes(), &plan, params).unwrap();
        let direct_positions: Vec<(usize, usize)> = direct.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(direct_positions, positions);
    }

    #[test]
    fn single_candidate_without_tie_detection() {
        let reference = tie_reference();
        let source = PixelGrid::filled(2, 1, MID).unwrap();
        let block = Block::new(Rect::new(0, 0, 2, 1), MID);
        let cfg = MatchConfig {
            detect_ties: false,
            ..MatchConfig::default()
        };
        let matcher = Matcher::new(&reference, cfg).unwrap();
        let sink = MemorySink::new();
        let candidates = matcher.match_block(&source, &block, &sink).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!((candidates[0].x, candidates[0].y), (1, 0));
        assert!(sink.messages_at(Level::Warn).is_empty());
    }

    #[test]
    fn capped_ties_are_reported() {
        let reference = PixelGrid::filled(10, 1, MID).unwrap();
        let source = PixelGrid::filled(4, 3, MID).unwrap();
        let block = Block::new(Rect::new(2, 1, 1, 1), MID);
        let cfg = MatchConfig {
            max_candidates: 3,
            ..MatchConfig::default()
        };
        let matcher = Matcher::new(&reference, cfg).unwrap();
        let sink = MemorySink::new();

        let candidates = matcher.match_block(&source, &block, &sink).unwrap();
        let xs: Vec<usize> = candidates.iter().map(|c| c.x).collect();
        assert_eq!(xs, vec![0, 1, 2]);
        let warnings = sink.messages_at(Level::Warn);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("(2, 1)"), "{}", warnings[0]);
        assert!(warnings[0].contains("10 tied"), "{}", warnings[0]);
    }

    #[test]
    fn failing_blocks_are_logged_and_skipped() {
        let reference = tie_reference();
        let source = PixelGrid::filled(4, 2, MID).unwrap();
        let blocks = vec![
            Block::new(Rect::new(0, 0, 2, 1), MID),
            Block::new(Rect::new(3, 1, 2, 1), MID),
            Block::new(Rect::new(1, 1, 0, 1), MID),
        ];
        let index = SizeIndex::build(&blocks);
        let matcher = Matcher::new(&reference, MatchConfig::default()).unwrap();
        let sink = MemorySink::new();

        let run = matcher.match_blocks(&source, &blocks, &index, &sink);
        assert_eq!(run.failed, 2);
        assert_eq!(run.matches.len(), 1);
        assert_eq!(run.matches[0].block, blocks[0]);

        let warnings = sink.messages_at(Level::Warn);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("(3, 1)"));
        let errors = sink.messages_at(Level::Error);
        assert!(errors.iter().any(|m| m.contains("(1, 1)")));
    }

    #[test]
    fn zero_size_block_is_a_match_failure() {
        let reference = tie_reference();
        let source = PixelGrid::filled(2, 2, MID).unwrap();
        let matcher = Matcher::new(&reference, MatchConfig::default()).unwrap();
        let err = matcher
            .match_block(
                &source,
                &Block::new(Rect::new(0, 0, 0, 2), MID),
                &MemorySink::new(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Match);
    }
}
