//! Span and event macros for the engine's stages.
//!
//! With the `tracing` feature each stage opens an info span and stage counts
//! go out as info events. Without it the span macro yields [`DisabledSpan`]
//! and the event macro only evaluates its field expressions. Span and event
//! names come from [`names`], so subscribers filter on one fixed vocabulary.

/// Span and event names emitted by the engine.
pub(crate) mod names {
    /// Whole run, from segmentation to compositing.
    pub(crate) const DEPIXELIZE: &str = "depixelize";
    /// Block segmentation of the pixelated region.
    pub(crate) const SEGMENT: &str = "segment";
    /// Building reference planes and tables.
    pub(crate) const PREPARE_REFERENCE: &str = "prepare_reference";
    /// Matching all surviving blocks.
    pub(crate) const MATCH_BLOCKS: &str = "match_blocks";
    /// Event: number of segmented blocks.
    pub(crate) const SEGMENTED: &str = "segmented_blocks";
    /// Event: start of one block-size group.
    pub(crate) const SIZE_GROUP: &str = "size_group";
    /// Event: matched and failed block counts.
    pub(crate) const MATCHED: &str = "matched_blocks";
}

#[cfg(feature = "tracing")]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        tracing::info_span!($name $(, $($field)*)?)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {{
        let _ = $name;
        $crate::trace::DisabledSpan
    }};
}

#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::info!(name: $name, $($key = $value),+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {{
        let _ = ($name, $($value,)+);
    }};
}

pub(crate) use trace_event;
pub(crate) use trace_span;

/// Stand-in for `tracing::Span` so `trace_span!(..).entered()` needs no cfg
/// at call sites.
#[cfg(not(feature = "tracing"))]
pub struct DisabledSpan;

#[cfg(not(feature = "tracing"))]
impl DisabledSpan {
    #[inline]
    pub fn entered(self) -> Self {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{names, trace_event, trace_span};

    #[test]
    fn stage_names_are_distinct() {
        let all = [
            names::DEPIXELIZE,
            names::SEGMENT,
            names::PREPARE_REFERENCE,
            names::MATCH_BLOCKS,
            names::SEGMENTED,
            names::SIZE_GROUP,
            names::MATCHED,
        ];
        let mut unique = all.to_vec();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), all.len());
    }

    #[test]
    fn macros_work_without_a_subscriber() {
        let _span = trace_span!(names::SEGMENT, width = 3usize, height = 2usize).entered();
        trace_event!(names::SEGMENTED, count = 6usize);
    }
}
