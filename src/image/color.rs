//! 8-bit RGB colors and their textual forms.

use crate::util::{DepixError, DepixResult};
use std::fmt;
use std::str::FromStr;

/// An RGB triple. Equality is exact per channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Pure black.
    pub const BLACK: Color = Color::new(0, 0, 0);
    /// Pure white.
    pub const WHITE: Color = Color::new(255, 255, 255);

    /// Creates a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Returns the channels as `[r, g, b]`.
    pub const fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Builds a color from `[r, g, b]`.
    pub const fn from_channels(c: [u8; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }

    /// Parses `#rrggbb` or `rrggbb`.
    pub fn from_hex(input: &str) -> DepixResult<Self> {
        let digits = input.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(invalid(input, "expected six hex digits"));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| invalid(input, "expected six hex digits"))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Formats as lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<[u8; 3]> for Color {
    fn from(value: [u8; 3]) -> Self {
        Self::from_channels(value)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

/// Parses the `r,g,b` form used on the command line; whitespace around
/// components is ignored and each component must lie in `0..=255`.
impl FromStr for Color {
    type Err = DepixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 3 {
            return Err(invalid(s, "expected three comma-separated components"));
        }
        let mut channels = [0u8; 3];
        for (slot, part) in channels.iter_mut().zip(parts) {
            let value: i64 = part
                .trim()
                .parse()
                .map_err(|_| invalid(s, "component is not an integer"))?;
            *slot = u8::try_from(value).map_err(|_| invalid(s, "component out of range 0-255"))?;
        }
        Ok(Self::from_channels(channels))
    }
}

fn invalid(input: &str, reason: &'static str) -> DepixError {
    DepixError::InvalidColor {
        input: input.to_string(),
        reason,
    }
}
