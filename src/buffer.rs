use crate::unicode::{MASK, is_digit, is_symbol};
use std::ops::{Deref, Range};

/// Per-call scratch buffer: one cell per normalized code point.
///
/// Stages only ever overwrite cells with [`MASK`]; the length never changes
/// after construction, so indices stay aligned with the case-preserved
/// original for the whole call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanBuffer {
    cells: Vec<char>,
}

impl ScanBuffer {
    pub fn new(cells: Vec<char>) -> Self {
        Self { cells }
    }

    #[inline]
    pub fn is_masked(&self, index: usize) -> bool {
        self.cells.get(index) == Some(&MASK)
    }

    /// Overwrite `range` with [`MASK`]. Out-of-range ends are clamped.
    pub fn mask(&mut self, range: Range<usize>) {
        let end = range.end.min(self.cells.len());
        if range.start >= end {
            return;
        }
        self.cells[range.start..end].fill(MASK);
    }

    #[inline]
    pub fn set(&mut self, index: usize, c: char) {
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = c;
        }
    }

    pub fn contains_digit(&self) -> bool {
        self.cells.iter().copied().any(is_digit)
    }

    /// Number of masked cells in the contiguous symbol run ending just before
    /// `offset`.
    pub fn masked_run_before(&self, offset: usize) -> usize {
        self.cells[..offset.min(self.cells.len())]
            .iter()
            .rev()
            .take_while(|&&c| is_symbol(c))
            .filter(|&&c| c == MASK)
            .count()
    }

    /// Number of masked cells in the contiguous symbol run starting just after
    /// `offset`.
    pub fn masked_run_after(&self, offset: usize) -> usize {
        self.cells
            .get(offset + 1..)
            .unwrap_or_default()
            .iter()
            .take_while(|&&c| is_symbol(c))
            .filter(|&&c| c == MASK)
            .count()
    }

    pub fn into_string(self) -> String {
        self.cells.into_iter().collect()
    }
}

impl Deref for ScanBuffer {
    type Target = [char];

    #[inline(always)]
    fn deref(&self) -> &[char] {
        &self.cells
    }
}

impl From<&str> for ScanBuffer {
    fn from(text: &str) -> Self {
        Self::new(text.chars().collect())
    }
}
