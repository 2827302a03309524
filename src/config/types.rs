//! Core configuration types for a crawl.
//!
//! `FetchConfig` carries every knob the crawlers, fetcher, converter, and
//! writer consult. Build one through the typestate builder and attach
//! non-serializable collaborators (LLM provider, custom converter) with
//! the `with_*` methods afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::convert::CustomConverter;
use crate::error::ConfigError;
use crate::extract::glob::GlobSet;
use crate::llm::{LlmConfig, LlmProvider};
use crate::utils::constants::{
    DEFAULT_CONCURRENCY, DEFAULT_DELAY_MS, DEFAULT_MAX_DEPTH, DEFAULT_MAX_PAGES,
    DEFAULT_MAX_RETRIES,
};

/// Which crawl engine drives the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlMode {
    /// Rule-based BFS.
    Simple,
    /// BFS with LLM link classification.
    Smart,
    /// LLM conversation driving fetch/store/skip decisions.
    Agent,
}

impl std::fmt::Display for CrawlMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::Smart => write!(f, "smart"),
            Self::Agent => write!(f, "agent"),
        }
    }
}

impl std::str::FromStr for CrawlMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "smart" => Ok(Self::Smart),
            "agent" => Ok(Self::Agent),
            other => Err(format!("unknown mode `{other}` (expected simple, smart, or agent)")),
        }
    }
}

/// How output files are laid out under the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStructure {
    /// One file per page mirroring the URL path.
    Mirror,
    /// All files in one directory, path separators flattened to `_`.
    Flat,
}

impl std::str::FromStr for OutputStructure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mirror" => Ok(Self::Mirror),
            "flat" => Ok(Self::Flat),
            other => Err(format!("unknown output structure `{other}` (expected mirror or flat)")),
        }
    }
}

/// Base conversion strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionStrategy {
    Default,
    Readability,
    Custom,
}

impl std::str::FromStr for ConversionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "readability" => Ok(Self::Readability),
            "custom" => Ok(Self::Custom),
            other => Err(format!(
                "unknown conversion strategy `{other}` (expected default, readability, or custom)"
            )),
        }
    }
}

/// How the smart crawler consults the LLM about discovered links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkClassification {
    /// One call per chunk of 50 links.
    Batch,
    /// One call per link; calls may run in parallel.
    PerLink,
}

impl std::str::FromStr for LinkClassification {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "batch" => Ok(Self::Batch),
            "per-link" | "perlink" => Ok(Self::PerLink),
            other => Err(format!(
                "unknown link classification `{other}` (expected batch or per-link)"
            )),
        }
    }
}

/// Main configuration for a crawl.
#[derive(Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    pub(crate) url: String,
    pub(crate) mode: CrawlMode,
    /// Goal text steering the LLM; required for smart and agent modes.
    pub(crate) description: Option<String>,
    pub(crate) max_depth: usize,
    pub(crate) max_pages: usize,
    pub(crate) include_patterns: Vec<String>,
    pub(crate) exclude_patterns: Vec<String>,
    /// Path-boundary prefix restriction. Advisory in simple mode: only the
    /// smart and agent crawlers pass it to the link extractor.
    pub(crate) path_prefix: Option<String>,
    pub(crate) output_dir: PathBuf,
    pub(crate) output_structure: OutputStructure,
    pub(crate) single_file: bool,
    pub(crate) generate_index: bool,
    /// Explicit base strategy; `None` defers to the mode's default.
    pub(crate) conversion_strategy: Option<ConversionStrategy>,
    #[serde(skip)]
    pub(crate) custom_converter: Option<CustomConverter>,
    /// Force conversion layer 3 regardless of mode.
    pub(crate) optimize_conversion: bool,
    /// Baseline delay before each request, in milliseconds.
    pub(crate) delay_ms: u64,
    pub(crate) concurrency: usize,
    /// 5xx retry budget per request, on top of the first attempt.
    pub(crate) max_retries: u32,
    pub(crate) respect_robots: bool,
    pub(crate) adaptive_rate_limit: bool,
    pub(crate) headers: HashMap<String, String>,
    pub(crate) cookie_file: Option<PathBuf>,
    pub(crate) link_classification: LinkClassification,
    pub(crate) llm_config: Option<LlmConfig>,
    #[serde(skip)]
    pub(crate) llm_provider: Option<Arc<dyn LlmProvider>>,
    /// Model override applied on top of `llm_config`.
    pub(crate) model: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            mode: CrawlMode::Simple,
            description: None,
            max_depth: DEFAULT_MAX_DEPTH,
            max_pages: DEFAULT_MAX_PAGES,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            path_prefix: None,
            output_dir: PathBuf::from("./output"),
            output_structure: OutputStructure::Mirror,
            single_file: false,
            generate_index: true,
            conversion_strategy: None,
            custom_converter: None,
            optimize_conversion: false,
            delay_ms: DEFAULT_DELAY_MS,
            concurrency: DEFAULT_CONCURRENCY,
            max_retries: DEFAULT_MAX_RETRIES,
            respect_robots: true,
            adaptive_rate_limit: true,
            headers: HashMap::new(),
            cookie_file: None,
            link_classification: LinkClassification::Batch,
            llm_config: None,
            llm_provider: None,
            model: None,
        }
    }
}

impl FetchConfig {
    /// Attach an LLM provider.
    #[must_use]
    pub fn with_llm_provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.llm_provider = Some(provider);
        self
    }

    /// Attach the converter used by the `custom` strategy.
    #[must_use]
    pub fn with_custom_converter(mut self, converter: CustomConverter) -> Self {
        self.custom_converter = Some(converter);
        self
    }

    /// Fail-fast validation, run before any work begins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.url)
            .map_err(|_| ConfigError::InvalidUrl(self.url.clone()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(self.url.clone()));
        }

        if matches!(self.mode, CrawlMode::Smart | CrawlMode::Agent)
            && self.description.as_deref().is_none_or(|d| d.trim().is_empty())
        {
            return Err(ConfigError::MissingDescription {
                mode: self.mode.to_string(),
            });
        }

        if self.conversion_strategy == Some(ConversionStrategy::Custom)
            && self.custom_converter.is_none()
        {
            return Err(ConfigError::MissingCustomConverter);
        }

        if self.mode == CrawlMode::Agent && self.llm_provider.is_none() {
            return Err(ConfigError::MissingLlmProvider);
        }

        GlobSet::compile(&self.include_patterns)?;
        GlobSet::compile(&self.exclude_patterns)?;

        Ok(())
    }
}
