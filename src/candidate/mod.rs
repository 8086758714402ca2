//! Candidate collection for match scores.
//!
//! Scores are dissimilarities: lower is better and zero is exact.

pub(crate) mod ties;
