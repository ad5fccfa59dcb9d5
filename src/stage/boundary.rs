//! How strongly one side of a domain or TLD match is delimited.

use crate::{buffer::ScanBuffer, unicode::is_symbol};

/// Boundary signal, weakest first. Comparisons follow declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Boundary {
    /// A letter or digit sits right next to the match.
    Open,
    /// A single adjacent symbol that is not a separator.
    Symbol,
    /// The match touches the start or end of the buffer.
    Edge,
    /// A separator sits among the contiguous symbols on this side.
    Separator,
    /// The marker copy shows a masked separator word right next to the match.
    Marker,
}

impl Boundary {
    /// Strong enough to qualify a match on its own.
    #[inline]
    pub fn is_strong(self) -> bool {
        self > Boundary::Edge
    }

    #[inline]
    pub fn is_present(self) -> bool {
        self > Boundary::Open
    }
}

/// Signal on the side before `offset`, the first matched cell.
///
/// `markers` is a copy of the buffer with the separator word already masked;
/// a masked run of at least `min_marker` cells counts as [`Boundary::Marker`].
pub fn before(
    buf: &[char],
    offset: usize,
    markers: &ScanBuffer,
    min_marker: usize,
    separators: &[char],
) -> Boundary {
    if offset == 0 {
        return Boundary::Edge;
    }
    if buf[..offset]
        .iter()
        .rev()
        .take_while(|&&c| is_symbol(c))
        .any(|c| separators.contains(c))
    {
        return Boundary::Separator;
    }
    if markers.masked_run_before(offset) >= min_marker {
        return Boundary::Marker;
    }
    if is_symbol(buf[offset - 1]) {
        Boundary::Symbol
    } else {
        Boundary::Open
    }
}

/// Signal on the side after `offset`, the last matched cell.
pub fn after(
    buf: &[char],
    offset: usize,
    markers: &ScanBuffer,
    min_marker: usize,
    separators: &[char],
) -> Boundary {
    if offset + 1 >= buf.len() {
        return Boundary::Edge;
    }
    if buf[offset + 1..]
        .iter()
        .take_while(|&&c| is_symbol(c))
        .any(|c| separators.contains(c))
    {
        return Boundary::Separator;
    }
    if markers.masked_run_after(offset) >= min_marker {
        return Boundary::Marker;
    }
    if is_symbol(buf[offset + 1]) {
        Boundary::Symbol
    } else {
        Boundary::Open
    }
}
