//! Input normalization.
//!
//! Every code point outside the allowed set becomes a space, runs of spaces
//! collapse to one, and the result is trimmed. Two views come out: the
//! case-preserved text used to restore capitals at the end, and the lowercase
//! cells every stage scans and masks.

use crate::{buffer::ScanBuffer, unicode::is_allowed};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    original: Vec<char>,
    lowercase: String,
}

impl Normalized {
    pub fn new(raw: &str) -> Self {
        let mut collapsed = String::with_capacity(raw.len());
        let mut last_space = false;
        for c in raw.chars() {
            let c = if is_allowed(c) { c } else { ' ' };
            if c == ' ' && last_space {
                continue;
            }
            last_space = c == ' ';
            collapsed.push(c);
        }

        let trimmed = collapsed.trim();
        // ASCII lowercasing keeps the cell count, so indices line up across views.
        let lowercase = trimmed.to_ascii_lowercase();
        Self {
            original: trimmed.chars().collect(),
            lowercase,
        }
    }

    /// Case-preserved, trimmed cells.
    pub fn original(&self) -> &[char] {
        &self.original
    }

    pub fn lowercase(&self) -> &str {
        &self.lowercase
    }

    pub fn len(&self) -> usize {
        self.original.len()
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }

    /// Fresh scan buffer seeded from the lowercase view.
    pub fn scan_buffer(&self) -> ScanBuffer {
        ScanBuffer::from(self.lowercase.as_str())
    }
}
