//! Masking stages.
//!
//! Every stage scans the same lowercase [`ScanBuffer`] and overwrites the
//! spans it censors with the mask character. Stages run in a fixed order and
//! each one sees the masks written by the ones before it, so the order is part
//! of the behaviour:
//!
//! 1. [`TldStage`](tlds::TldStage): top-level domains and the URL around them
//! 2. [`BadWordStage`](bad_words::BadWordStage): profanity stems
//! 3. [`DomainStage`](domains::DomainStage): domain stems next to `@` or `.`
//! 4. [`NumericStage`](numeric::NumericStage): IPv4-like digit runs

pub mod bad_words;
pub mod boundary;
pub mod domains;
pub mod numeric;
pub mod tlds;

use crate::{buffer::ScanBuffer, config::FilterConfig};

/// A single masking step.
pub trait Stage: Send + Sync {
    /// Human-readable name, used in trace output.
    fn name(&self) -> &'static str;

    /// Fast pre-check. Returning `false` skips the whole stage.
    fn needs_apply(&self, buf: &ScanBuffer, config: &FilterConfig) -> bool;

    /// Mask every span this stage censors.
    fn apply(&self, buf: &mut ScanBuffer, config: &FilterConfig);
}
