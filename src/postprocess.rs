//! Steps that run once every stage has masked the buffer.

use crate::{
    buffer::ScanBuffer,
    unicode::{is_letter, is_lowercase, is_uppercase_letter},
};
use memchr::memmem;

/// Words that read as profanity to the stages but are left alone.
pub const DEFAULT_WHITELIST: [&str; 5] = ["cook", "cook's", "cooks", "seeks", "sheet"];

/// Write every whitelisted word found in `lowercase` back over `out`,
/// undoing any mask placed on it.
pub fn restore_whitelist<S: AsRef<str>>(out: &mut ScanBuffer, lowercase: &str, whitelist: &[S]) {
    let haystack = lowercase.as_bytes();
    for word in whitelist {
        let word = word.as_ref();
        if word.is_empty() {
            continue;
        }
        for at in memmem::find_iter(haystack, word.as_bytes()) {
            // Matches of a UTF-8 needle always start on a char boundary.
            let start = lowercase[..at].chars().count();
            for (offset, c) in word.chars().enumerate() {
                out.set(start + offset, c);
            }
        }
    }
}

/// Copy capitals from the case-preserved input into unmasked cells.
pub fn replace_uppercases(out: &mut ScanBuffer, original: &[char]) {
    for (index, &c) in original.iter().enumerate() {
        if is_uppercase_letter(c) && !out.is_masked(index) {
            out.set(index, c);
        }
    }
}

/// Lower-case capitals that follow a lowercase letter in the same word.
///
/// A word keeps its leading capitals up to its first lowercase letter, so
/// `Hello` and `NASA` survive while `hELLO` becomes `hello`.
pub fn format_uppercases(out: &mut ScanBuffer) {
    let mut word_start = true;
    for index in 0..out.len() {
        let c = out[index];
        if !is_letter(c) {
            word_start = true;
        } else if word_start {
            if is_lowercase(c) {
                word_start = false;
            }
        } else if is_uppercase_letter(c) {
            out.set(index, c.to_ascii_lowercase());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitelist_undoes_masks() {
        let mut out = ScanBuffer::from("i ***** my dinner");
        restore_whitelist(&mut out, "i cooks my dinner", &DEFAULT_WHITELIST[..]);
        assert_eq!(out.into_string(), "i cooks my dinner");
    }

    #[test]
    fn whitelist_handles_every_occurrence_and_wide_chars() {
        let mut out = ScanBuffer::from("£ **** and ****");
        restore_whitelist(&mut out, "£ cook and cook", &["cook"][..]);
        assert_eq!(out.into_string(), "£ cook and cook");
    }

    #[test]
    fn capitals_return_outside_masks() {
        let mut out = ScanBuffer::from("well **** man");
        replace_uppercases(&mut out, &"Well FUCK Man".chars().collect::<Vec<_>>());
        assert_eq!(out.into_string(), "Well **** Man");
    }

    #[test]
    fn capitals_after_lowercase_are_lowered() {
        let mut out = ScanBuffer::from("HeLLo NASA wOW x-Ray");
        format_uppercases(&mut out);
        assert_eq!(out.into_string(), "Hello NASA wow x-Ray");
    }
}
