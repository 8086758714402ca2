//! Shared utility helpers.

pub mod error;
pub(crate) mod math;

pub use error::{DepixError, ErrorKind, Result as DepixResult};
