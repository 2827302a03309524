//! LLM-backed base-strategy selection (conversion layer 2).
//!
//! Shows the model the head of the HTML and asks which base strategy will
//! produce the better Markdown. Any failure falls back to the mode's
//! default strategy; selection is an optimization, never a requirement.

use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::llm::{LlmClient, LlmRequest};
use crate::utils::constants::SELECTOR_HTML_CHARS;
use crate::utils::truncate_chars;

/// A base strategy the selector can choose between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseStrategy {
    Default,
    Readability,
}

#[derive(Debug, Deserialize)]
struct StrategyChoice {
    strategy: BaseStrategy,
}

const CALL_SITE: &str = "strategy-selector";

/// Ask the LLM to pick a base strategy for this page.
pub async fn select_strategy(
    llm: &LlmClient,
    html: &str,
    url: &Url,
    fallback: BaseStrategy,
) -> BaseStrategy {
    let excerpt = truncate_chars(html, SELECTOR_HTML_CHARS);
    let prompt = format!(
        "You are choosing how to convert a web page to Markdown.\n\
         Page URL: {url}\n\n\
         First {SELECTOR_HTML_CHARS} characters of the HTML:\n\
         ```html\n{excerpt}\n```\n\n\
         Choose `default` to convert the full document, or `readability` to \
         extract the main article content first (better for pages with heavy \
         navigation or boilerplate)."
    );

    let schema = json!({
        "type": "object",
        "properties": {
            "strategy": { "type": "string", "enum": ["default", "readability"] }
        },
        "required": ["strategy"]
    });

    match llm
        .invoke_structured::<StrategyChoice>(CALL_SITE, LlmRequest::new(prompt), schema)
        .await
    {
        Ok(choice) => choice.strategy,
        Err(e) => {
            debug!(
                target: "website_fetch::convert",
                "strategy selection failed for {url}: {e}; using fallback"
            );
            fallback
        }
    }
}
