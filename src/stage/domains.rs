use crate::{
    buffer::ScanBuffer,
    config::FilterConfig,
    matcher::match_domain,
    stage::{Stage, bad_words::mask_fragment, boundary},
};
use tracing::trace;

const AT_SEPARATORS: &[char] = &['@'];
const PERIOD_SEPARATORS: &[char] = &['.', ','];
const AT_WORD: &[char] = &['(', 'a', ')'];
const DOT: &[char] = &['d', 'o', 't'];

/// Masks domain stems written as part of an address: preceded by an `@`
/// (or a spelled-out `(a)`) or followed by a period (or `dot`).
pub struct DomainStage;

impl Stage for DomainStage {
    fn name(&self) -> &'static str {
        "domains"
    }

    #[inline]
    fn needs_apply(&self, buf: &ScanBuffer, config: &FilterConfig) -> bool {
        !buf.is_empty() && !config.domains().is_empty()
    }

    fn apply(&self, buf: &mut ScanBuffer, config: &FilterConfig) {
        let mut ats = buf.clone();
        mask_fragment(&mut ats, config, AT_WORD, |_, _| false);
        let mut dots = buf.clone();
        mask_fragment(&mut dots, config, DOT, |_, _| false);

        for domain in config.domains().iter().rev() {
            if domain.len() > buf.len() {
                continue;
            }
            for index in 0..=buf.len() - domain.len() {
                let Some(end) = match_domain(buf, domain, index) else {
                    continue;
                };
                let at = boundary::before(buf, index, &ats, 3, AT_SEPARATORS);
                let period = boundary::after(buf, end - 1, &dots, 3, PERIOD_SEPARATORS);
                if at.is_strong() || period.is_strong() {
                    trace!(stage = self.name(), start = index, end, ?at, ?period, "masked domain");
                    buf.mask(index..end);
                }
            }
        }
    }
}
