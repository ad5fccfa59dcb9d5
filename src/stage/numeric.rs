use crate::{
    buffer::ScanBuffer,
    config::FilterConfig,
    stage::Stage,
    unicode::{is_continuable, is_digit, is_symbol},
};
use tracing::trace;

/// Largest value a single octet may take.
const OCTET_MAX: u32 = 255;
/// Longer digit runs never count as an octet, whatever their value.
const OCTET_MAX_DIGITS: usize = 8;
/// Octet-like runs needed before the whole address is masked.
const OCTETS: usize = 4;

/// Masks IPv4-like addresses: four octet-sized digit runs in a row, separated
/// only by symbols (or filler letters), are masked from the first run to the
/// last.
pub struct NumericStage;

impl Stage for NumericStage {
    fn name(&self) -> &'static str {
        "numeric"
    }

    #[inline]
    fn needs_apply(&self, buf: &ScanBuffer, _config: &FilterConfig) -> bool {
        buf.contains_digit()
    }

    fn apply(&self, buf: &mut ScanBuffer, _config: &FilterConfig) {
        let mut cursor = 0;
        let mut octets = 0;
        let mut run_start = 0;

        while let Some(offset) = buf[cursor..].iter().position(|&c| is_digit(c)) {
            let digits_start = cursor + offset;
            // An ordinary word between two runs breaks the address apart.
            if buf[cursor..digits_start]
                .iter()
                .any(|&c| !is_symbol(c) && !is_continuable(c))
            {
                octets = 0;
            }
            if octets == 0 {
                run_start = digits_start;
            }

            let digits_len = buf[digits_start..]
                .iter()
                .take_while(|&&c| is_digit(c))
                .count();
            cursor = digits_start + digits_len;
            if digits_len > OCTET_MAX_DIGITS
                || octet_value(&buf[digits_start..cursor]) > OCTET_MAX
            {
                octets = 0;
                continue;
            }

            octets += 1;
            if octets == OCTETS {
                trace!(stage = self.name(), start = run_start, end = cursor, "masked address");
                buf.mask(run_start..cursor);
                octets = 0;
            }
        }
    }
}

fn octet_value(digits: &[char]) -> u32 {
    digits
        .iter()
        .filter_map(|c| c.to_digit(10))
        .fold(0u32, |value, d| value.saturating_mul(10).saturating_add(d))
}
