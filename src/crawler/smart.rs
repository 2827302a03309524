//! BFS crawler with LLM link classification.
//!
//! Identical to the simple crawler except that extracted links pass
//! through an LLM relevance check before they are enqueued, and the path
//! prefix filter applies. Classification failures always fall back to
//! including the links: a broken classifier degrades to a simple crawl
//! rather than silently dropping pages.

use futures::future::join_all;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::{FetchConfig, LinkClassification};
use crate::error::ConfigError;
use crate::extract::{ExtractedLink, LinkExtractor};
use crate::llm::{LlmClient, LlmRequest};
use crate::page::FetchResult;
use crate::utils::constants::CLASSIFIER_BATCH_SIZE;

use super::{CrawlCore, CrawlObserver, run_bfs};

const CALL_SITE: &str = "link-classifier";

#[derive(Debug, Deserialize)]
struct BatchVerdict {
    /// 1-indexed positions of the relevant links.
    #[serde(default)]
    relevant: Vec<usize>,
}

#[derive(Debug, Deserialize)]
struct LinkVerdict {
    relevant: bool,
}

/// LLM relevance filter over extracted links.
pub(crate) struct LinkClassifier {
    llm: Option<LlmClient>,
    description: String,
    mode: LinkClassification,
}

impl LinkClassifier {
    pub(crate) fn new(
        llm: Option<LlmClient>,
        description: String,
        mode: LinkClassification,
    ) -> Self {
        Self {
            llm,
            description,
            mode,
        }
    }

    /// Keep the links the LLM considers relevant to the crawl goal.
    pub(crate) async fn classify(&self, links: Vec<ExtractedLink>) -> Vec<ExtractedLink> {
        if links.is_empty() {
            return links;
        }
        let Some(llm) = &self.llm else {
            debug!(
                target: "website_fetch::links",
                "no LLM provider; including all {} links",
                links.len()
            );
            return links;
        };

        match self.mode {
            LinkClassification::Batch => self.classify_batch(llm, links).await,
            LinkClassification::PerLink => self.classify_per_link(llm, links).await,
        }
    }

    async fn classify_batch(&self, llm: &LlmClient, links: Vec<ExtractedLink>) -> Vec<ExtractedLink> {
        let mut kept = Vec::new();

        for chunk in links.chunks(CLASSIFIER_BATCH_SIZE) {
            let listing = chunk
                .iter()
                .enumerate()
                .map(|(i, link)| {
                    format!("{}. {} — {}", i + 1, link.url, link.context)
                })
                .collect::<Vec<_>>()
                .join("\n");

            let prompt = format!(
                "We are crawling a website with this goal:\n{}\n\n\
                 Which of these links are worth following? Answer with the \
                 1-indexed numbers of the relevant links.\n\n{listing}",
                self.description
            );

            let schema = json!({
                "type": "object",
                "properties": {
                    "relevant": { "type": "array", "items": { "type": "integer" } }
                },
                "required": ["relevant"]
            });

            match llm
                .invoke_structured::<BatchVerdict>(CALL_SITE, LlmRequest::new(prompt), schema)
                .await
            {
                Ok(verdict) => {
                    for index in verdict.relevant {
                        // 1-indexed; out-of-range entries are ignored.
                        if (1..=chunk.len()).contains(&index) {
                            kept.push(chunk[index - 1].clone());
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        target: "website_fetch::links",
                        "batch classification failed ({e}); including all {} links in chunk",
                        chunk.len()
                    );
                    kept.extend(chunk.iter().cloned());
                }
            }
        }

        kept
    }

    async fn classify_per_link(
        &self,
        llm: &LlmClient,
        links: Vec<ExtractedLink>,
    ) -> Vec<ExtractedLink> {
        let verdicts = join_all(links.iter().map(|link| {
            let prompt = format!(
                "We are crawling a website with this goal:\n{}\n\n\
                 Is this link worth following?\nURL: {}\nLink text: {}\nContext: {}",
                self.description, link.url, link.text, link.context
            );
            let schema = json!({
                "type": "object",
                "properties": { "relevant": { "type": "boolean" } },
                "required": ["relevant"]
            });
            llm.invoke_structured::<LinkVerdict>(CALL_SITE, LlmRequest::new(prompt), schema)
        }))
        .await;

        links
            .into_iter()
            .zip(verdicts)
            .filter(|(link, verdict)| match verdict {
                Ok(verdict) => verdict.relevant,
                Err(e) => {
                    warn!(
                        target: "website_fetch::links",
                        "classification failed for {} ({e}); including it",
                        link.url
                    );
                    true
                }
            })
            .map(|(link, _)| link)
            .collect()
    }
}

/// BFS crawler with LLM link classification and path-prefix filtering.
pub struct SmartCrawler {
    core: CrawlCore,
    extractor: LinkExtractor,
    classifier: LinkClassifier,
}

impl SmartCrawler {
    pub async fn new(
        config: Arc<FetchConfig>,
        observer: Arc<dyn CrawlObserver>,
    ) -> Result<Self, ConfigError> {
        let extractor = LinkExtractor::new(
            config.include_patterns(),
            config.exclude_patterns(),
            config.path_prefix(),
            true,
        )?;
        let description = config.description().unwrap_or_default().to_string();
        let mode = config.link_classification();
        let core = CrawlCore::initialize(config, observer).await?;
        let classifier = LinkClassifier::new(core.llm.clone(), description, mode);
        Ok(Self {
            core,
            extractor,
            classifier,
        })
    }

    /// Run the crawl to completion.
    pub async fn run(&self) -> FetchResult {
        run_bfs(&self.core, &self.extractor, Some(&self.classifier)).await
    }
}
