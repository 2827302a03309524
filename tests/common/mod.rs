//! Shared test helpers: a scriptable LLM provider and page fixtures.
#![allow(dead_code)]

use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use website_fetch::{CallOptions, LlmError, LlmProvider, LlmRequest};

type StructuredHandler = dyn Fn(&str) -> Result<Value, String> + Send + Sync;
type TextHandler = dyn Fn(&str) -> Result<String, String> + Send + Sync;

/// LLM provider driven by prompt-inspecting closures.
///
/// The real call sites never share prompts, so handlers dispatch on
/// distinctive prompt markers ("Which of these links", "Decide the next
/// tool calls", ...).
pub struct MockProvider {
    structured: Arc<StructuredHandler>,
    text: Arc<TextHandler>,
    pub structured_calls: AtomicUsize,
    pub text_calls: AtomicUsize,
}

impl MockProvider {
    pub fn new(
        structured: impl Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
        text: impl Fn(&str) -> Result<String, String> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            structured: Arc::new(structured),
            text: Arc::new(text),
            structured_calls: AtomicUsize::new(0),
            text_calls: AtomicUsize::new(0),
        })
    }

    /// Provider that fails every call.
    pub fn failing() -> Arc<Self> {
        Self::new(
            |_| Err("mock structured failure".to_string()),
            |_| Err("mock text failure".to_string()),
        )
    }
}

impl LlmProvider for MockProvider {
    fn invoke(
        &self,
        request: LlmRequest,
        _options: CallOptions,
    ) -> BoxFuture<'_, Result<String, LlmError>> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        let handler = Arc::clone(&self.text);
        Box::pin(async move {
            handler(&request.prompt).map_err(|message| LlmError::Invocation {
                site: "mock".to_string(),
                message,
            })
        })
    }

    fn invoke_structured(
        &self,
        request: LlmRequest,
        _schema: Value,
        _options: CallOptions,
    ) -> BoxFuture<'_, Result<Value, LlmError>> {
        self.structured_calls.fetch_add(1, Ordering::SeqCst);
        let handler = Arc::clone(&self.structured);
        Box::pin(async move {
            handler(&request.prompt).map_err(|message| LlmError::Invocation {
                site: "mock".to_string(),
                message,
            })
        })
    }
}

/// Default structured handler for smart/agent conversion plumbing: pick the
/// `default` strategy and accept the Markdown as-is.
pub fn conversion_defaults(prompt: &str) -> Option<Result<Value, String>> {
    if prompt.contains("Choose `default`") {
        return Some(Ok(serde_json::json!({ "strategy": "default" })));
    }
    if prompt.contains("Evaluate whether this Markdown") {
        return Some(Ok(serde_json::json!({ "acceptable": true })));
    }
    None
}

/// A small HTML page whose body links to `hrefs`.
pub fn page_with_links(title: &str, hrefs: &[String]) -> String {
    let links = hrefs
        .iter()
        .map(|href| format!("<li><a href=\"{href}\">link to {href}</a></li>"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "<html><head><title>{title}</title></head>\
         <body><h1>{title}</h1><ul>{links}</ul></body></html>"
    )
}

/// Counting observer recording every callback.
#[derive(Default)]
pub struct CountingObserver {
    pub fetched: AtomicUsize,
    pub skipped: AtomicUsize,
    pub errors: AtomicUsize,
}

impl website_fetch::CrawlObserver for CountingObserver {
    fn on_page_fetched(&self, _page: &website_fetch::FetchedPage) {
        self.fetched.fetch_add(1, Ordering::SeqCst);
    }

    fn on_page_skipped(&self, _url: &str, _reason: &str) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }

    fn on_error(&self, _url: &str, _error: &(dyn std::error::Error + Send + Sync)) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }
}
