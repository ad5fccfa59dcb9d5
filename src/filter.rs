use crate::{
    buffer::ScanBuffer,
    config::FilterConfig,
    normalize::Normalized,
    pipeline::Pipeline,
    postprocess::{self, DEFAULT_WHITELIST},
    stage::Stage,
};
use std::sync::Arc;
use tracing::debug;

/// Censor `raw` with the standard stages and the default whitelist.
pub fn filter(config: &FilterConfig, raw: &str) -> String {
    censor(config, &Pipeline::standard(), &DEFAULT_WHITELIST[..], raw)
}

fn censor<S: AsRef<str>>(
    config: &FilterConfig,
    pipeline: &Pipeline,
    whitelist: &[S],
    raw: &str,
) -> String {
    let normalized = Normalized::new(raw);
    if normalized.is_empty() {
        return String::new();
    }

    let mut buf: ScanBuffer = normalized.scan_buffer();
    pipeline.run(&mut buf, config);

    postprocess::restore_whitelist(&mut buf, normalized.lowercase(), whitelist);
    postprocess::replace_uppercases(&mut buf, normalized.original());
    postprocess::format_uppercases(&mut buf);
    buf.into_string().trim().to_string()
}

/// A reusable, thread-safe chat filter over shared tables.
#[derive(Debug, Clone)]
pub struct WordFilter {
    config: Arc<FilterConfig>,
    pipeline: Pipeline,
    whitelist: Vec<String>,
}

impl WordFilter {
    /// Filter with the standard stages and default whitelist.
    pub fn new(config: Arc<FilterConfig>) -> Self {
        Self::builder(config).standard_stages().build()
    }

    pub fn builder(config: Arc<FilterConfig>) -> WordFilterBuilder {
        WordFilterBuilder {
            config,
            stages: Vec::new(),
            whitelist: DEFAULT_WHITELIST.iter().map(|w| w.to_string()).collect(),
        }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn filter(&self, raw: &str) -> String {
        censor(&self.config, &self.pipeline, self.whitelist.as_slice(), raw)
    }
}

pub struct WordFilterBuilder {
    config: Arc<FilterConfig>,
    stages: Vec<Arc<dyn Stage>>,
    whitelist: Vec<String>,
}

impl WordFilterBuilder {
    pub fn add_stage<T: Stage + 'static>(mut self, stage: T) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Append the standard stages in their fixed order.
    pub fn standard_stages(mut self) -> Self {
        self.stages.extend(Pipeline::standard().stages().iter().cloned());
        self
    }

    /// Replace the whitelist. Words are matched lowercase.
    pub fn whitelist<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.whitelist = words
            .into_iter()
            .map(|w| w.as_ref().to_ascii_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        self
    }

    pub fn build(self) -> WordFilter {
        let pipeline = Pipeline::new(self.stages);
        debug!(?pipeline, whitelist = self.whitelist.len(), "built word filter");
        WordFilter {
            config: self.config,
            pipeline,
            whitelist: self.whitelist,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::BadWord,
        stage::{bad_words::BadWordStage, numeric::NumericStage},
    };

    fn config() -> Arc<FilterConfig> {
        let words = vec![BadWord::new("cook", &[])];
        Arc::new(FilterConfig::new(words, vec![], vec![], vec![]).unwrap())
    }

    #[test]
    fn default_whitelist_restores_words() {
        let filter = WordFilter::new(config());
        assert_eq!(filter.filter("i cook food"), "i cook food");
    }

    #[test]
    fn custom_whitelist_replaces_default() {
        let filter = WordFilter::builder(config())
            .add_stage(BadWordStage)
            .whitelist(["Cooks"])
            .build();
        assert_eq!(filter.filter("i cook food"), "i **** food");
        assert_eq!(filter.filter("he cooks food"), "he cooks food");
    }

    #[test]
    fn only_added_stages_run() {
        let filter = WordFilter::builder(config()).add_stage(NumericStage).build();
        assert_eq!(filter.filter("cook at 1.2.3.4"), "cook at *******");
    }

    #[test]
    fn blank_input_is_empty() {
        let cfg = FilterConfig::default();
        assert_eq!(filter(&cfg, ""), "");
        assert_eq!(filter(&cfg, " \u{1F600} "), "");
    }

    #[test]
    fn filter_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WordFilter>();
    }
}
