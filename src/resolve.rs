//! Turns a block's tied candidates into the pixels written back.
//!
//! A block whose candidates all carry the same content is resolved
//! directly. Otherwise every pixel is the per-channel mean of all
//! candidates' pixels, truncated to an integer. Duplicated contents are
//! counted with their multiplicity.

use crate::block::Block;
use crate::image::{Color, Patch};
use crate::search::{BlockMatch, Candidate};
use crate::util::{DepixError, DepixResult};

/// Final content for one block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Every candidate agreed on this content.
    Direct(Patch),
    /// Candidates disagreed; this is their element-wise mean.
    Averaged(Patch),
}

impl Resolution {
    /// The resolved pixels.
    pub fn content(&self) -> &Patch {
        match self {
            Resolution::Direct(patch) | Resolution::Averaged(patch) => patch,
        }
    }

    /// Whether the content came from averaging.
    pub fn is_averaged(&self) -> bool {
        matches!(self, Resolution::Averaged(_))
    }
}

/// A block paired with its resolved content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedBlock {
    pub block: Block,
    pub resolution: Resolution,
}

/// Resolves one block's candidates. Returns `Ok(None)` when there are none.
pub fn resolve(candidates: &[Candidate]) -> DepixResult<Option<Resolution>> {
    let Some(first) = candidates.first() else {
        return Ok(None);
    };
    if candidates.iter().all(|c| c.content == first.content) {
        return Ok(Some(Resolution::Direct(first.content.clone())));
    }
    Ok(Some(Resolution::Averaged(average(candidates)?)))
}

fn average(candidates: &[Candidate]) -> DepixResult<Patch> {
    let width = candidates[0].content.width();
    let height = candidates[0].content.height();
    if candidates
        .iter()
        .any(|c| c.content.width() != width || c.content.height() != height)
    {
        return Err(DepixError::InvalidInput(
            "candidate contents differ in size",
        ));
    }

    let mut sums = vec![[0u32; 3]; width * height];
    for candidate in candidates {
        for (acc, px) in sums.iter_mut().zip(candidate.content.pixels()) {
            for (a, v) in acc.iter_mut().zip(px.channels()) {
                *a += u32::from(v);
            }
        }
    }

    let count = candidates.len() as u32;
    let pixels = sums
        .into_iter()
        .map(|acc| {
            // Mean of 8-bit values always fits back into a byte.
            Color::from_channels(acc.map(|s| (s / count) as u8))
        })
        .collect();
    Patch::new(pixels, width, height)
}

/// Resolves every match that has at least one candidate, keeping order.
///
/// Blocks without candidates are returned separately so callers can report
/// them.
pub fn resolve_all(matches: Vec<BlockMatch>) -> DepixResult<(Vec<ResolvedBlock>, Vec<Block>)> {
    let mut resolved = Vec::with_capacity(matches.len());
    let mut unmatched = Vec::new();
    for m in matches {
        match resolve(&m.candidates)? {
            Some(resolution) => resolved.push(ResolvedBlock {
                block: m.block,
                resolution,
            }),
            None => unmatched.push(m.block),
        }
    }
    Ok((resolved, unmatched))
}
