//! LLM-backed Markdown optimization loop (conversion layer 3).
//!
//! Alternates an evaluation call (is this Markdown an acceptable rendition
//! of the HTML?) with a rewrite call applying the evaluator's
//! instructions. Every failure path returns the best Markdown produced so
//! far; with zero iterations the input passes through unchanged.

use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::llm::{LlmClient, LlmRequest};
use crate::utils::constants::OPTIMIZER_HTML_CHARS;
use crate::utils::truncate_chars;

#[derive(Debug, Deserialize)]
struct Evaluation {
    acceptable: bool,
    #[serde(default)]
    issues: Vec<String>,
    #[serde(default)]
    instructions: Option<String>,
}

const EVAL_SITE: &str = "conversion-optimizer";
const REWRITE_SITE: &str = "conversion-rewriter";

/// Iteratively improve `markdown` against the source HTML.
pub async fn optimize(
    llm: &LlmClient,
    html: &str,
    url: &Url,
    markdown: String,
    max_iterations: u32,
) -> String {
    let excerpt = truncate_chars(html, OPTIMIZER_HTML_CHARS);
    let mut current = markdown;

    for iteration in 0..max_iterations {
        let evaluation = match evaluate(llm, &excerpt, &current).await {
            Ok(evaluation) => evaluation,
            Err(e) => {
                debug!(
                    target: "website_fetch::convert",
                    "optimizer evaluation failed for {url}: {e}; keeping current markdown"
                );
                return current;
            }
        };

        if evaluation.acceptable {
            return current;
        }
        let Some(instructions) = evaluation.instructions else {
            return current;
        };

        debug!(
            target: "website_fetch::convert",
            iteration,
            issues = evaluation.issues.len(),
            "rewriting markdown for {url}"
        );

        match rewrite(llm, &current, &instructions).await {
            Ok(rewritten) if !rewritten.trim().is_empty() => {
                current = rewritten.trim().to_string();
            }
            Ok(_) => return current,
            Err(e) => {
                debug!(
                    target: "website_fetch::convert",
                    "optimizer rewrite failed for {url}: {e}; keeping current markdown"
                );
                return current;
            }
        }
    }

    current
}

async fn evaluate(
    llm: &LlmClient,
    html_excerpt: &str,
    markdown: &str,
) -> Result<Evaluation, crate::error::LlmError> {
    let prompt = format!(
        "Evaluate whether this Markdown is a faithful, well-formatted \
         rendition of the HTML source.\n\n\
         HTML source (truncated):\n```html\n{html_excerpt}\n```\n\n\
         Current Markdown:\n```markdown\n{markdown}\n```\n\n\
         If it is acceptable, say so. Otherwise list the issues and give \
         concrete rewrite instructions."
    );

    let schema = json!({
        "type": "object",
        "properties": {
            "acceptable": { "type": "boolean" },
            "issues": { "type": "array", "items": { "type": "string" } },
            "instructions": { "type": "string" }
        },
        "required": ["acceptable"]
    });

    llm.invoke_structured(EVAL_SITE, LlmRequest::new(prompt), schema)
        .await
}

async fn rewrite(
    llm: &LlmClient,
    markdown: &str,
    instructions: &str,
) -> Result<String, crate::error::LlmError> {
    let prompt = format!(
        "Apply these instructions to the Markdown below and return only the \
         raw, improved Markdown with no commentary.\n\n\
         Instructions:\n{instructions}\n\n\
         Markdown:\n{markdown}"
    );

    llm.invoke_text(REWRITE_SITE, LlmRequest::new(prompt)).await
}
