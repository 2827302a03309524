//! Type-safe builder for `FetchConfig` using the typestate pattern.
//!
//! The start URL is the only required field; the transition into the
//! `WithUrl` state makes `build()` available. Collaborators that cannot be
//! serialized (LLM provider, custom converter) attach to the built config
//! via its `with_*` methods.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::llm::LlmConfig;

use super::types::{
    ConversionStrategy, CrawlMode, FetchConfig, LinkClassification, OutputStructure,
};

/// Builder state after the start URL was provided.
pub struct WithUrl;

pub struct FetchConfigBuilder<State = ()> {
    config: FetchConfig,
    _phantom: PhantomData<State>,
}

impl Default for FetchConfigBuilder<()> {
    fn default() -> Self {
        Self {
            config: FetchConfig::default(),
            _phantom: PhantomData,
        }
    }
}

impl FetchConfig {
    /// Create a builder for configuring a `FetchConfig` with a fluent
    /// interface.
    #[must_use]
    pub fn builder() -> FetchConfigBuilder<()> {
        FetchConfigBuilder::default()
    }
}

impl FetchConfigBuilder<()> {
    /// Set the root URL. A URL without a scheme gets `https://` prepended.
    pub fn url(mut self, url: impl Into<String>) -> FetchConfigBuilder<WithUrl> {
        let url = url.into();
        let normalized = if url.starts_with("http://") || url.starts_with("https://") {
            url
        } else {
            format!("https://{url}")
        };
        self.config.url = normalized;

        FetchConfigBuilder {
            config: self.config,
            _phantom: PhantomData,
        }
    }
}

impl<State> FetchConfigBuilder<State> {
    #[must_use]
    pub fn mode(mut self, mode: CrawlMode) -> Self {
        self.config.mode = mode;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.config.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    #[must_use]
    pub fn include_patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.include_patterns = patterns;
        self
    }

    #[must_use]
    pub fn exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.exclude_patterns = patterns;
        self
    }

    #[must_use]
    pub fn path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.path_prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    #[must_use]
    pub fn output_structure(mut self, structure: OutputStructure) -> Self {
        self.config.output_structure = structure;
        self
    }

    #[must_use]
    pub fn single_file(mut self, single_file: bool) -> Self {
        self.config.single_file = single_file;
        self
    }

    #[must_use]
    pub fn generate_index(mut self, generate_index: bool) -> Self {
        self.config.generate_index = generate_index;
        self
    }

    #[must_use]
    pub fn conversion_strategy(mut self, strategy: ConversionStrategy) -> Self {
        self.config.conversion_strategy = Some(strategy);
        self
    }

    #[must_use]
    pub fn optimize_conversion(mut self, optimize: bool) -> Self {
        self.config.optimize_conversion = optimize;
        self
    }

    /// Baseline delay between requests, in milliseconds.
    #[must_use]
    pub fn delay_ms(mut self, delay_ms: u64) -> Self {
        self.config.delay_ms = delay_ms;
        self
    }

    #[must_use]
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency.max(1);
        self
    }

    #[must_use]
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn respect_robots(mut self, respect: bool) -> Self {
        self.config.respect_robots = respect;
        self
    }

    #[must_use]
    pub fn adaptive_rate_limit(mut self, adaptive: bool) -> Self {
        self.config.adaptive_rate_limit = adaptive;
        self
    }

    #[must_use]
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.config.headers = headers;
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn cookie_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.cookie_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn link_classification(mut self, classification: LinkClassification) -> Self {
        self.config.link_classification = classification;
        self
    }

    #[must_use]
    pub fn llm_config(mut self, llm_config: LlmConfig) -> Self {
        self.config.llm_config = Some(llm_config);
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }
}

// Build is only available once the URL is set.
impl FetchConfigBuilder<WithUrl> {
    /// Finish the builder.
    ///
    /// Checks the URL and glob patterns; mode-dependent requirements
    /// (description, converter, provider) are re-checked by
    /// `FetchConfig::validate` once collaborators are attached.
    pub fn build(self) -> Result<FetchConfig, ConfigError> {
        let parsed = url::Url::parse(&self.config.url)
            .map_err(|_| ConfigError::InvalidUrl(self.config.url.clone()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(self.config.url.clone()));
        }

        crate::extract::glob::GlobSet::compile(&self.config.include_patterns)?;
        crate::extract::glob::GlobSet::compile(&self.config.exclude_patterns)?;

        Ok(self.config)
    }
}
