//! Error types for depix.

use thiserror::Error;

/// Result alias for depix operations.
pub type Result<T> = std::result::Result<T, DepixError>;

/// Broad failure classes used to decide whether a run aborts or recovers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad caller input, rejected before the engine runs.
    Input,
    /// A rectangle fell outside the expected bounds; the block is skipped.
    Geometry,
    /// Matching a single block failed; the block is skipped.
    Match,
    /// The output could not be written.
    Output,
}

/// Errors that can occur when running the depixelization engine.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DepixError {
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Width or height is zero or overflows.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// The backing buffer is shorter than the declared geometry requires.
    #[error("buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A rectangle does not fit inside the image it addresses.
    #[error(
        "region ({x}, {y}, {width}x{height}) out of bounds for {img_width}x{img_height} image"
    )]
    RegionOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// A color specification could not be parsed.
    #[error("invalid color {input:?}: {reason}")]
    InvalidColor { input: String, reason: &'static str },
    /// A block cannot be matched at all.
    #[error("degenerate block at ({x}, {y}): {reason}")]
    DegenerateBlock {
        x: usize,
        y: usize,
        reason: &'static str,
    },
    /// Decoding or reading an image failed.
    #[error("image I/O failed: {reason}")]
    ImageIo { reason: String },
    /// Writing the output image failed.
    #[error("failed to write {path}: {reason}")]
    Output { path: String, reason: String },
}

impl DepixError {
    /// Returns the failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DepixError::InvalidInput(_)
            | DepixError::InvalidColor { .. }
            | DepixError::ImageIo { .. } => ErrorKind::Input,
            DepixError::InvalidDimensions { .. }
            | DepixError::BufferTooSmall { .. }
            | DepixError::RegionOutOfBounds { .. } => ErrorKind::Geometry,
            DepixError::DegenerateBlock { .. } => ErrorKind::Match,
            DepixError::Output { .. } => ErrorKind::Output,
        }
    }
}
