//! Depix recovers text hidden behind block pixelation.
//!
//! The pixelated region is split into uniform-color blocks, each block is
//! searched for in a reference rendering of the same font, and the pixels
//! found there are written back over the block. Blocks matching several
//! locations with different content are averaged.
//!
//! The core depends only on `thiserror`. Parallel matching is available via
//! the `rayon` feature, file loading via `image-io`, and log forwarding via
//! `tracing`.

pub mod block;
pub mod boxes;
mod candidate;
pub mod composite;
pub mod image;
pub mod kernel;
pub mod log;
pub mod lowlevel;
pub mod pipeline;
pub mod pixelate;
pub mod resolve;
pub mod search;
pub mod template;
mod trace;
pub mod util;

pub use crate::block::{Block, BlockSize, Rect};
pub use crate::image::{Canvas, Color, ImageView, Patch, PixelGrid};
pub use crate::log::{Level, LogSink, MemorySink, NullSink, TracingSink};
pub use crate::pipeline::{depixelize, DepixConfig, Depixelized, RunReport};
pub use crate::pixelate::{pixelate, PixelationMode};
pub use crate::resolve::{Resolution, ResolvedBlock};
pub use crate::search::{AveragingMode, BlockMatch, Candidate, MatchConfig, MatchRun, Matcher};
pub use crate::util::{DepixError, DepixResult, ErrorKind};
