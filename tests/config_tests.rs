//! Tests for the configuration builder and fail-fast validation.

mod common;

use std::sync::Arc;
use website_fetch::{ConfigError, ConversionStrategy, CrawlMode, FetchConfig};

use common::MockProvider;

#[test]
fn builder_defaults() {
    let config = FetchConfig::builder()
        .url("https://example.com")
        .build()
        .unwrap();

    assert_eq!(config.url(), "https://example.com");
    assert_eq!(config.mode(), CrawlMode::Simple);
    assert_eq!(config.max_depth(), 5);
    assert_eq!(config.max_pages(), 100);
    assert_eq!(config.delay().as_millis(), 200);
    assert_eq!(config.concurrency(), 3);
    assert!(config.respect_robots());
    assert!(config.adaptive_rate_limit());
    assert!(config.generate_index());
    assert!(!config.single_file());
    assert_eq!(config.conversion_strategy(), None);
}

#[test]
fn builder_prepends_https_scheme() {
    let config = FetchConfig::builder().url("example.com/docs").build().unwrap();
    assert_eq!(config.url(), "https://example.com/docs");
}

#[test]
fn build_rejects_non_http_url() {
    let result = FetchConfig::builder().url("ftp://example.com").build();
    assert!(matches!(result, Err(ConfigError::InvalidUrl(_))));
}

#[test]
fn validate_requires_description_for_smart_mode() {
    let config = FetchConfig::builder()
        .url("https://example.com")
        .mode(CrawlMode::Smart)
        .build()
        .unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::MissingDescription { .. })
    ));
}

#[test]
fn validate_requires_provider_for_agent_mode() {
    let config = FetchConfig::builder()
        .url("https://example.com")
        .mode(CrawlMode::Agent)
        .description("collect the docs")
        .build()
        .unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::MissingLlmProvider)
    ));

    let with_provider = config.with_llm_provider(MockProvider::failing());
    assert!(with_provider.validate().is_ok());
}

#[test]
fn validate_requires_converter_for_custom_strategy() {
    let config = FetchConfig::builder()
        .url("https://example.com")
        .conversion_strategy(ConversionStrategy::Custom)
        .build()
        .unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::MissingCustomConverter)
    ));

    let converter: website_fetch::CustomConverter =
        Arc::new(|html, _url| Box::pin(async move { Ok(html.to_uppercase()) }));
    let with_converter = config.with_custom_converter(converter);
    assert!(with_converter.validate().is_ok());
}
