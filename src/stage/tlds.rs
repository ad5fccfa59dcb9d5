use crate::{
    buffer::ScanBuffer,
    config::{FilterConfig, TldTier},
    matcher::match_tld,
    stage::{
        Stage,
        bad_words::mask_fragment,
        boundary::{self, Boundary},
    },
    unicode::{MASK, is_symbol},
};
use tracing::trace;

const PERIOD_SEPARATORS: &[char] = &[',', '.'];
const SLASH_SEPARATORS: &[char] = &['\\', '/'];
const DOT: &[char] = &['d', 'o', 't'];
const SLASH: &[char] = &['s', 'l', 'a', 's', 'h'];

/// Masks top-level domains together with the address they end.
///
/// A TLD qualifies by the signal on its period side (before it) and its slash
/// side (after it), weighed by the TLD's tier. On a qualifying match the mask
/// grows outward over the separator and the token behind it, so
/// `site.com` and `site dot com` are censored whole.
pub struct TldStage;

impl TldStage {
    fn qualifies(tier: TldTier, period: Boundary, slash: Boundary) -> bool {
        match tier {
            TldTier::Relaxed => period.is_present() && slash.is_present(),
            TldTier::Balanced => {
                (period.is_strong() && slash.is_present())
                    || (period.is_present() && slash.is_strong())
            }
            TldTier::Strict => period.is_strong() && slash.is_strong(),
        }
    }
}

impl Stage for TldStage {
    fn name(&self) -> &'static str {
        "tlds"
    }

    #[inline]
    fn needs_apply(&self, buf: &ScanBuffer, config: &FilterConfig) -> bool {
        !buf.is_empty() && !config.tlds().is_empty()
    }

    fn apply(&self, buf: &mut ScanBuffer, config: &FilterConfig) {
        let mut dots = buf.clone();
        mask_fragment(&mut dots, config, DOT, |_, _| false);
        let mut slashes = buf.clone();
        mask_fragment(&mut slashes, config, SLASH, |_, _| false);

        for tld in config.tlds() {
            let name = tld.name();
            if name.len() > buf.len() {
                continue;
            }
            for index in 0..=buf.len() - name.len() {
                let Some(end) = match_tld(buf, name, index) else {
                    continue;
                };
                let last = end - 1;
                let period = boundary::before(buf, index, &dots, 3, PERIOD_SEPARATORS);
                let slash = boundary::after(buf, last, &slashes, 5, SLASH_SEPARATORS);
                if !Self::qualifies(tld.tier(), period, slash) {
                    continue;
                }

                let mut first = index;
                let mut last = last;
                if period.is_strong() {
                    if period == Boundary::Marker {
                        first = grow_back_over_marker(&dots, first);
                    }
                    first = grow_back_over_token(buf, first);
                }
                if slash.is_strong() {
                    if slash == Boundary::Marker {
                        last = grow_forward_over_marker(&slashes, last);
                    }
                    last = grow_forward_over_token(buf, last);
                }

                trace!(
                    stage = self.name(),
                    start = first,
                    end = last + 1,
                    ?period,
                    ?slash,
                    "masked tld"
                );
                buf.mask(first..last + 1);
            }
        }
    }
}

/// Walk back to the nearest masked run in `markers` and across it.
fn grow_back_over_marker(markers: &[char], from: usize) -> usize {
    let Some(hit) = markers[..from].iter().rposition(|&c| c == MASK) else {
        return from;
    };
    let run = markers[..hit].iter().rev().take_while(|&&c| c == MASK).count();
    hit - run
}

/// Walk back across symbols to the nearest token and across it.
fn grow_back_over_token(buf: &[char], from: usize) -> usize {
    let Some(hit) = buf[..from].iter().rposition(|&c| !is_symbol(c)) else {
        return from;
    };
    let run = buf[..hit].iter().rev().take_while(|&&c| !is_symbol(c)).count();
    hit - run
}

fn grow_forward_over_marker(markers: &[char], from: usize) -> usize {
    let Some(hit) = markers[from + 1..].iter().position(|&c| c == MASK) else {
        return from;
    };
    let hit = from + 1 + hit;
    hit + markers[hit + 1..].iter().take_while(|&&c| c == MASK).count()
}

fn grow_forward_over_token(buf: &[char], from: usize) -> usize {
    let Some(hit) = buf[from + 1..].iter().position(|&c| !is_symbol(c)) else {
        return from;
    };
    let hit = from + 1 + hit;
    hit + buf[hit + 1..].iter().take_while(|&&c| !is_symbol(c)).count()
}
