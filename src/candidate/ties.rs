//! Selection of every placement tied at the minimum score.
//!
//! Scores for all placements are collected into a [`ScoreMap`] first, then
//! the global minimum is found and every placement within the tolerance is
//! kept in row-major order. Two placements whose scores differ only by
//! floating-point noise are therefore ordered by position, never by noise.

/// Scored placement in reference-image coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    /// X coordinate (column) of the window's top-left corner.
    pub x: usize,
    /// Y coordinate (row) of the window's top-left corner.
    pub y: usize,
    /// Normalized squared-difference score.
    pub score: f64,
}

/// Dense row-major grid of scores, one per placement.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreMap {
    cols: usize,
    rows: usize,
    scores: Vec<f64>,
}

impl ScoreMap {
    /// Wraps `cols * rows` scores in row-major order.
    pub(crate) fn new(cols: usize, rows: usize, scores: Vec<f64>) -> Self {
        debug_assert_eq!(scores.len(), cols * rows);
        Self { cols, rows, scores }
    }

    /// Concatenates per-row score vectors.
    pub(crate) fn from_rows(cols: usize, rows: Vec<Vec<f64>>) -> Self {
        let count = rows.len();
        let mut scores = Vec::with_capacity(cols * count);
        for row in rows {
            scores.extend(row);
        }
        Self::new(cols, count, scores)
    }

    /// Placements per row.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of placement rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Score at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.cols || y >= self.rows {
            return None;
        }
        self.scores.get(y * self.cols + x).copied()
    }

    /// Lowest finite score.
    pub fn best(&self) -> Option<f64> {
        self.scores
            .iter()
            .copied()
            .filter(|s| s.is_finite())
            .min_by(f64::total_cmp)
    }

    fn tie_limit(&self, tolerance: f64) -> Option<f64> {
        self.best().map(|best| best + tolerance.max(0.0))
    }

    /// Number of placements scoring within `tolerance` of the minimum.
    pub fn count_ties(&self, tolerance: f64) -> usize {
        let Some(limit) = self.tie_limit(tolerance) else {
            return 0;
        };
        self.scores
            .iter()
            .filter(|s| s.is_finite() && **s <= limit)
            .count()
    }

    /// Returns up to `cap` placements scoring within `tolerance` of the
    /// minimum, in row-major order.
    pub fn select_ties(&self, cap: usize, tolerance: f64) -> Vec<Peak> {
        let Some(limit) = self.tie_limit(tolerance) else {
            return Vec::new();
        };
        let cols = self.cols.max(1);
        self.scores
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_finite() && **s <= limit)
            .take(cap)
            .map(|(idx, &score)| Peak {
                x: idx % cols,
                y: idx / cols,
                score,
            })
            .collect()
    }
}
