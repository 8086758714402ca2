//! Grouping of blocks by `(width, height)`.
//!
//! The matcher walks blocks group by group and parallelizes within a group;
//! grouping changes scheduling, never results.

use crate::block::{Block, BlockSize};
use std::collections::BTreeMap;

/// Block indices grouped by size, ordered by `(width, height)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SizeIndex {
    groups: BTreeMap<BlockSize, Vec<usize>>,
}

impl SizeIndex {
    /// Indexes `blocks`; each group lists positions into `blocks` in order.
    pub fn build(blocks: &[Block]) -> Self {
        let mut groups: BTreeMap<BlockSize, Vec<usize>> = BTreeMap::new();
        for (idx, block) in blocks.iter().enumerate() {
            groups.entry(block.rect.size()).or_default().push(idx);
        }
        Self { groups }
    }

    /// Number of distinct sizes.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if no blocks were indexed.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of blocks of `size`.
    pub fn count(&self, size: BlockSize) -> usize {
        self.groups.get(&size).map_or(0, Vec::len)
    }

    /// Occurrence count for every size.
    pub fn counts(&self) -> BTreeMap<BlockSize, usize> {
        self.groups
            .iter()
            .map(|(size, members)| (*size, members.len()))
            .collect()
    }

    /// Iterates over `(size, block indices)` in size order.
    pub fn iter(&self) -> impl Iterator<Item = (BlockSize, &[usize])> {
        self.groups
            .iter()
            .map(|(size, members)| (*size, members.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::SizeIndex;
    use crate::block::{Block, BlockSize, Rect};
    use crate::image::Color;

    #[test]
    fn counts_sizes() {
        let blocks = vec![
            Block::new(Rect::new(0, 0, 5, 5), Color::new(255, 0, 0)),
            Block::new(Rect::new(5, 5, 5, 5), Color::new(0, 255, 0)),
            Block::new(Rect::new(10, 10, 10, 10), Color::new(0, 0, 255)),
            Block::new(Rect::new(20, 20, 5, 10), Color::new(255, 255, 0)),
        ];
        let index = SizeIndex::build(&blocks);

        assert_eq!(index.len(), 3);
        assert_eq!(index.count(BlockSize::new(5, 5)), 2);
        assert_eq!(index.count(BlockSize::new(10, 10)), 1);
        assert_eq!(index.count(BlockSize::new(5, 10)), 1);
        assert_eq!(index.count(BlockSize::new(1, 1)), 0);

        let groups: Vec<_> = index.iter().collect();
        assert_eq!(groups[0], (BlockSize::new(5, 5), &[0usize, 1][..]));
        assert_eq!(index.counts().values().sum::<usize>(), 4);
    }
}
