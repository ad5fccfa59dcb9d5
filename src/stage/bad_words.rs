use crate::{
    buffer::ScanBuffer,
    config::FilterConfig,
    matcher::match_fragment,
    stage::Stage,
    unicode::{class_index, is_digit, is_letter, is_word_break},
};
use smallvec::SmallVec;
use tracing::trace;

/// Masks profanity stems from the bad-word table.
///
/// The table is walked back to front, twice, so that a mask written late in
/// the first sweep can still expose a neighbouring match to the second.
pub struct BadWordStage;

impl Stage for BadWordStage {
    fn name(&self) -> &'static str {
        "bad_words"
    }

    #[inline]
    fn needs_apply(&self, buf: &ScanBuffer, config: &FilterConfig) -> bool {
        !buf.is_empty() && !config.bad_words().is_empty()
    }

    fn apply(&self, buf: &mut ScanBuffer, config: &FilterConfig) {
        for _ in 0..2 {
            for bad in config.bad_words().iter().rev() {
                mask_fragment(buf, config, bad.word(), |before, after| {
                    bad.is_excepted(before, after)
                });
            }
        }
    }
}

/// Mask every complete match of `fragment` unless its context excuses it.
///
/// `is_excepted` receives the class indices of the characters just before and
/// just after a plain (filler-free) match.
pub(crate) fn mask_fragment(
    buf: &mut ScanBuffer,
    config: &FilterConfig,
    fragment: &[char],
    is_excepted: impl Fn(u8, u8) -> bool,
) {
    if fragment.len() > buf.len() {
        return;
    }

    for start in 0..=buf.len() - fragment.len() {
        let m = match_fragment(buf, fragment, start);
        if !m.is_complete(fragment.len()) {
            continue;
        }
        let end = m.end;

        let censor = if m.symbol_filler {
            has_plain_window(buf, config, start, end)
        } else {
            let before = if start == 0 { ' ' } else { buf[start - 1] };
            let after = buf.get(end).copied().unwrap_or(' ');
            !is_excepted(class_index(before), class_index(after))
        };
        if !censor {
            continue;
        }

        let span = &buf[start..end];
        let digits = span.iter().filter(|&&c| is_digit(c)).count();
        let letters = span.iter().filter(|&&c| is_letter(c)).count();
        if digits <= letters {
            trace!(start, end, "masked fragment match");
            buf.mask(start..end);
        }
    }
}

/// For a match stitched together across punctuation: `true` when the
/// punctuation is not decoration around ordinary words.
///
/// A match with breaks on both sides always counts. Otherwise the letter
/// windows (up to three characters) starting around the match are checked,
/// and the match counts as soon as one of them is neither all digits nor a
/// known fragment.
fn has_plain_window(buf: &[char], config: &FilterConfig, start: usize, end: usize) -> bool {
    let open_before = start == 0 || is_word_break(buf[start - 1]);
    let open_after = end >= buf.len() || is_word_break(buf[end]);
    if open_before && open_after {
        return true;
    }

    let first = if open_before { start } else { start.saturating_sub(2) };
    (first..end).any(|cur| {
        if is_word_break(buf[cur]) {
            return false;
        }
        let window: SmallVec<[char; 3]> = buf[cur..]
            .iter()
            .copied()
            .take(3)
            .take_while(|&c| !is_word_break(c))
            .collect();
        let whole_word = window.len() == 3 || cur == 0 || is_word_break(buf[cur - 1]);
        whole_word && !config.is_bad_fragment(&window)
    })
}
