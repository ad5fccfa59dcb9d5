use crate::{
    buffer::ScanBuffer,
    config::FilterConfig,
    stage::{
        Stage, bad_words::BadWordStage, domains::DomainStage, numeric::NumericStage,
        tlds::TldStage,
    },
};
use std::{fmt, sync::Arc};
use tracing::trace;

#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Vec<Arc<dyn Stage>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.stages.iter().map(|s| s.name()))
            .finish()
    }
}

impl Pipeline {
    pub fn new(stages: Vec<Arc<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// TLDs, bad words, domains, then addresses.
    pub fn standard() -> Self {
        Self::new(vec![
            Arc::new(TldStage),
            Arc::new(BadWordStage),
            Arc::new(DomainStage),
            Arc::new(NumericStage),
        ])
    }

    pub fn stages(&self) -> &[Arc<dyn Stage>] {
        &self.stages
    }

    pub fn run(&self, buf: &mut ScanBuffer, config: &FilterConfig) {
        for stage in &self.stages {
            // Fast path: nothing this stage could match
            if !stage.needs_apply(buf, config) {
                trace!(stage = stage.name(), "skipped");
                continue;
            }
            stage.apply(buf, config);
        }
    }
}
