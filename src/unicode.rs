// Character predicates shared by every stage. All of them are ASCII-only:
// the scan buffer never holds anything outside printable ASCII plus
// `£`, `€`, tab and newline once the normalizer has run.

/// Replacement written over every censored code point.
pub const MASK: char = '*';

/// Sentinel returned for reads past either end of a buffer.
pub const NUL: char = '\0';

#[inline(always)]
pub const fn is_lowercase(c: char) -> bool {
    c.is_ascii_lowercase()
}

#[inline(always)]
pub const fn is_uppercase_letter(c: char) -> bool {
    c.is_ascii_uppercase()
}

#[inline(always)]
pub const fn is_letter(c: char) -> bool {
    is_lowercase(c) || is_uppercase_letter(c)
}

#[inline(always)]
pub const fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Anything that is neither an ASCII letter nor an ASCII digit, including
/// whitespace, the mask character and [`NUL`].
#[inline(always)]
pub const fn is_symbol(c: char) -> bool {
    !is_letter(c) && !is_digit(c)
}

/// Whether `c` may be skipped as filler between two matched fragment letters.
///
/// Ordinary lowercase letters end a match, except `v`, `x`, `j`, `q` and `z`,
/// which are tolerated like symbols, digits and uppercase letters.
#[inline(always)]
pub const fn is_continuable(c: char) -> bool {
    if is_lowercase(c) {
        matches!(c, 'v' | 'x' | 'j' | 'q' | 'z')
    } else {
        true
    }
}

/// An apostrophe counts as part of a word everywhere a symbol would otherwise
/// break one.
#[inline(always)]
pub const fn is_word_break(c: char) -> bool {
    is_symbol(c) && c != '\''
}

/// Code points that survive normalization untouched.
#[inline(always)]
pub const fn is_allowed(c: char) -> bool {
    matches!(c, ' '..='\u{7f}' | '\t' | '\n' | '£' | '€')
}

/// Class of a neighbouring character, as stored in bad-word exception pairs.
///
/// `a..=z` → 1..=26, any other symbol → 27, apostrophe → 28, `0..=9` → 29..=38.
#[inline(always)]
pub const fn class_index(c: char) -> u8 {
    if is_lowercase(c) {
        c as u8 - b'a' + 1
    } else if c == '\'' {
        28
    } else if is_digit(c) {
        c as u8 - b'0' + 29
    } else {
        27
    }
}
