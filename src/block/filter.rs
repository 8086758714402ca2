//! Removal of blocks whose fill carries no information.

use crate::block::Block;
use crate::image::Color;

/// Colors that are always considered moot.
pub const MOOT_COLORS: [Color; 2] = [Color::BLACK, Color::WHITE];

/// Returns true if `color` is black, white or the given background.
pub fn is_moot(color: Color, background: Option<Color>) -> bool {
    MOOT_COLORS.contains(&color) || background == Some(color)
}

/// Drops moot blocks, keeping the order of the survivors.
pub fn remove_moot_colors(blocks: Vec<Block>, background: Option<Color>) -> Vec<Block> {
    blocks
        .into_iter()
        .filter(|block| !is_moot(block.fill, background))
        .collect()
}
