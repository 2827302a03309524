//! Getter methods for `FetchConfig`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::convert::CustomConverter;
use crate::llm::{LlmConfig, LlmProvider};

use super::types::{
    ConversionStrategy, CrawlMode, FetchConfig, LinkClassification, OutputStructure,
};

impl FetchConfig {
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn mode(&self) -> CrawlMode {
        self.mode
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    #[must_use]
    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    #[must_use]
    pub fn include_patterns(&self) -> &[String] {
        &self.include_patterns
    }

    #[must_use]
    pub fn exclude_patterns(&self) -> &[String] {
        &self.exclude_patterns
    }

    /// Path-boundary prefix restriction. Applied by the smart and agent
    /// crawlers only; the simple crawler treats it as advisory.
    #[must_use]
    pub fn path_prefix(&self) -> Option<&str> {
        self.path_prefix.as_deref()
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn output_structure(&self) -> OutputStructure {
        self.output_structure
    }

    #[must_use]
    pub fn single_file(&self) -> bool {
        self.single_file
    }

    #[must_use]
    pub fn generate_index(&self) -> bool {
        self.generate_index
    }

    #[must_use]
    pub fn conversion_strategy(&self) -> Option<ConversionStrategy> {
        self.conversion_strategy
    }

    #[must_use]
    pub fn custom_converter(&self) -> Option<&CustomConverter> {
        self.custom_converter.as_ref()
    }

    #[must_use]
    pub fn optimize_conversion(&self) -> bool {
        self.optimize_conversion
    }

    /// Baseline delay before each request.
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency.max(1)
    }

    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    #[must_use]
    pub fn respect_robots(&self) -> bool {
        self.respect_robots
    }

    #[must_use]
    pub fn adaptive_rate_limit(&self) -> bool {
        self.adaptive_rate_limit
    }

    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    #[must_use]
    pub fn cookie_file(&self) -> Option<&PathBuf> {
        self.cookie_file.as_ref()
    }

    #[must_use]
    pub fn link_classification(&self) -> LinkClassification {
        self.link_classification
    }

    #[must_use]
    pub fn llm_provider(&self) -> Option<&Arc<dyn LlmProvider>> {
        self.llm_provider.as_ref()
    }

    /// LLM configuration with the top-level `model` override folded in.
    #[must_use]
    pub fn effective_llm_config(&self) -> LlmConfig {
        let mut llm_config = self.llm_config.clone().unwrap_or_default();
        if let Some(model) = &self.model {
            llm_config.model = Some(model.clone());
        }
        llm_config
    }
}
