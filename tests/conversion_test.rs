//! Converter façade behavior across modes, plus the LLM layers.

mod common;

use serde_json::json;
use std::sync::Arc;
use url::Url;
use website_fetch::convert::optimizer;
use website_fetch::{
    ConversionStrategy, Converter, CrawlMode, CustomConverter, FetchConfig, LlmClient, LlmConfig,
};

use common::MockProvider;

const PAGE: &str = "<html><body>\
    <nav><a href='/nav'>site chrome</a></nav>\
    <main><h1>Article</h1><p>Body text.</p></main>\
    </body></html>";

fn config(mode: CrawlMode) -> FetchConfig {
    FetchConfig::builder()
        .url("https://example.com")
        .mode(mode)
        .description("anything")
        .build()
        .unwrap()
}

fn page_url() -> Url {
    Url::parse("https://example.com/article").unwrap()
}

#[tokio::test]
async fn simple_mode_converts_full_document_without_llm() {
    let converter = Converter::new(&config(CrawlMode::Simple), None);
    let markdown = converter.convert(PAGE, &page_url()).await.unwrap();
    // Default strategy keeps the nav; no LLM layer runs.
    assert!(markdown.contains("site chrome"));
    assert!(markdown.contains("# Article"));
}

#[tokio::test]
async fn smart_mode_falls_back_to_readability_when_selector_fails() {
    let provider = MockProvider::failing();
    let llm = LlmClient::new(provider, LlmConfig::default());
    let converter = Converter::new(&config(CrawlMode::Smart), Some(llm));

    let markdown = converter.convert(PAGE, &page_url()).await.unwrap();
    // Fallback is the mode default (readability): nav content is gone.
    assert!(!markdown.contains("site chrome"));
    assert!(markdown.contains("# Article"));
}

#[tokio::test]
async fn selector_choice_is_honored() {
    let provider = MockProvider::new(
        |prompt| {
            assert!(prompt.contains("Choose `default`"));
            Ok(json!({ "strategy": "default" }))
        },
        |_| Err("no text calls expected".to_string()),
    );
    let llm = LlmClient::new(provider, LlmConfig::default());
    let converter = Converter::new(&config(CrawlMode::Smart), Some(llm));

    let markdown = converter.convert(PAGE, &page_url()).await.unwrap();
    assert!(markdown.contains("site chrome"));
}

#[tokio::test]
async fn optimizer_with_zero_iterations_is_identity() {
    let provider = MockProvider::failing();
    let llm = LlmClient::new(provider, LlmConfig::default());
    let markdown = optimizer::optimize(&llm, PAGE, &page_url(), "# As is".to_string(), 0).await;
    assert_eq!(markdown, "# As is");
}

#[tokio::test]
async fn optimizer_applies_instructions_until_acceptable() {
    let provider = MockProvider::new(
        |prompt| {
            if prompt.contains("Evaluate whether this Markdown") {
                if prompt.contains("IMPROVED") {
                    Ok(json!({ "acceptable": true }))
                } else {
                    Ok(json!({
                        "acceptable": false,
                        "issues": ["flat text"],
                        "instructions": "uppercase everything"
                    }))
                }
            } else {
                Err(format!("unexpected structured prompt: {prompt}"))
            }
        },
        |prompt| {
            assert!(prompt.contains("uppercase everything"));
            Ok("IMPROVED".to_string())
        },
    );
    let llm = LlmClient::new(provider, LlmConfig::default());

    let markdown = optimizer::optimize(&llm, PAGE, &page_url(), "draft".to_string(), 2).await;
    assert_eq!(markdown, "IMPROVED");
}

#[tokio::test]
async fn optimizer_keeps_current_on_evaluation_failure() {
    let provider = MockProvider::failing();
    let llm = LlmClient::new(provider, LlmConfig::default());
    let markdown = optimizer::optimize(&llm, PAGE, &page_url(), "draft".to_string(), 2).await;
    assert_eq!(markdown, "draft");
}

#[tokio::test]
async fn custom_strategy_bypasses_selection_and_propagates_errors() {
    let converter_fn: CustomConverter = Arc::new(|_html, url| {
        Box::pin(async move {
            Err(website_fetch::ConversionError::new(url, "deliberate failure"))
        })
    });

    let config = FetchConfig::builder()
        .url("https://example.com")
        .conversion_strategy(ConversionStrategy::Custom)
        .build()
        .unwrap()
        .with_custom_converter(converter_fn);

    let converter = Converter::new(&config, None);
    let err = converter.convert(PAGE, &page_url()).await.unwrap_err();
    assert!(err.to_string().contains("deliberate failure"));
}

#[tokio::test]
async fn custom_strategy_output_is_used() {
    let converter_fn: CustomConverter =
        Arc::new(|_html, _url| Box::pin(async move { Ok("custom output".to_string()) }));

    let config = FetchConfig::builder()
        .url("https://example.com")
        .conversion_strategy(ConversionStrategy::Custom)
        .build()
        .unwrap()
        .with_custom_converter(converter_fn);

    let converter = Converter::new(&config, None);
    let markdown = converter.convert(PAGE, &page_url()).await.unwrap();
    assert_eq!(markdown, "custom output");
}
