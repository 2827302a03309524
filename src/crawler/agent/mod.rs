//! LLM-conversation-driven crawler.
//!
//! One conversation with the model decides, page by page, what to fetch,
//! what to keep, and when to stop. Each generation returns a directive of
//! up to ten tool calls; tool results are appended to the transcript for
//! the next turn. The loop terminates when the model calls `done`, the
//! page budget fills, a generation requests no tools, the LLM errors, or
//! the turn cap is reached. Anything still parked in temp storage at the
//! end is reported as skipped.

mod tools;

use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::FetchConfig;
use crate::error::ConfigError;
use crate::extract::LinkExtractor;
use crate::llm::{LlmClient, LlmRequest};
use crate::page::{FetchResult, SkippedPage};
use crate::utils::constants::{AGENT_MAX_TOOL_CALLS, AGENT_MAX_TURNS};

use super::{CrawlCore, CrawlObserver, finish_result};
use self::tools::{AgentContext, AgentToolCall, AgentToolbox};

const LOOP_SITE: &str = "agent-loop";

const REASON_NOT_STORED: &str = "Fetched but not stored by agent";

#[derive(Debug, Deserialize)]
struct AgentDirective {
    #[serde(default)]
    calls: Vec<AgentToolCall>,
}

/// Crawler whose control flow is an LLM conversation over five tools.
pub struct AgentCrawler {
    core: CrawlCore,
    extractor: LinkExtractor,
    description: String,
}

impl AgentCrawler {
    /// Fails fast with `ConfigError::MissingLlmProvider` when no provider
    /// is attached.
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
        let core = CrawlCore::initialize(config, observer).await?;
        Ok(Self {
            core,
            extractor,
            description,
        })
    }

    /// Run the conversation to completion.
    pub async fn run(&self) -> FetchResult {
        let started = Instant::now();
        let root = self.core.config.url().to_string();
        let max_pages = self.core.config.max_pages();

        // Validation guarantees a provider in agent mode.
        let Some(llm) = self.core.llm.clone() else {
            return finish_result(&self.core, Vec::new(), Vec::new(), started).await;
        };

        let toolbox = AgentToolbox {
            core: &self.core,
            llm: &llm,
            extractor: &self.extractor,
        };

        let system = self.system_prompt(&root, max_pages);
        let mut transcript: Vec<String> = Vec::new();
        let mut ctx = AgentContext::default();

        'conversation: for turn in 0..AGENT_MAX_TURNS {
            let directive = match self.request_directive(&llm, &system, &transcript).await {
                Ok(directive) => directive,
                Err(e) => {
                    warn!(
                        target: "website_fetch::agent",
                        "agent conversation failed on turn {turn}: {e}"
                    );
                    self.core.observer.on_error(&root, &e);
                    break;
                }
            };

            if directive.calls.is_empty() {
                debug!(
                    target: "website_fetch::agent",
                    "agent requested no tools on turn {turn}; stopping"
                );
                break;
            }

            for call in directive.calls.iter().take(AGENT_MAX_TOOL_CALLS) {
                let result = toolbox.execute(call, &mut ctx).await;
                transcript.push(format!(
                    "{}({}) -> {result}",
                    call.tool,
                    call.url.as_deref().unwrap_or("")
                ));

                if ctx.done || ctx.stored.len() >= max_pages {
                    break 'conversation;
                }
            }
        }

        // Whatever the agent fetched but never ruled on is a skip.
        let mut leftovers: Vec<_> = ctx.temp.drain().collect();
        leftovers.sort_by(|(a, _), (b, _)| a.cmp(b));
        for (_, entry) in leftovers {
            self.core
                .observer
                .on_page_skipped(&entry.raw.url, REASON_NOT_STORED);
            ctx.skipped
                .push(SkippedPage::new(entry.raw.url, REASON_NOT_STORED));
        }

        finish_result(&self.core, ctx.stored, ctx.skipped, started).await
    }

    fn system_prompt(&self, root: &str, max_pages: usize) -> String {
        format!(
            "You are crawling a website to collect pages as Markdown.\n\
             Goal: {}\n\
             Start URL: {root}\n\
             You may store at most {max_pages} pages.\n\n\
             Tools:\n\
             - fetchPage(url): fetch and convert a page; returns a summary.\n\
             - storePage(url): keep a fetched page in the output; returns its links.\n\
             - markIrrelevant(url): discard a fetched page; returns its links.\n\
             - getLinks(url): list a fetched page's links without deciding.\n\
             - done(): finish the crawl.\n\n\
             Start from the start URL, follow links relevant to the goal, \
             store pages that serve it, discard pages that do not, and call \
             done when the goal is covered.",
            self.description
        )
    }

    async fn request_directive(
        &self,
        llm: &LlmClient,
        system: &str,
        transcript: &[String],
    ) -> Result<AgentDirective, crate::error::LlmError> {
        let history = if transcript.is_empty() {
            "(no tool calls yet)".to_string()
        } else {
            transcript.join("\n\n")
        };

        let prompt = format!(
            "Tool call history:\n{history}\n\n\
             Decide the next tool calls (up to {AGENT_MAX_TOOL_CALLS}). \
             Respond with an empty list only if there is nothing left to do."
        );

        let schema = json!({
            "type": "object",
            "properties": {
                "calls": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "tool": {
                                "type": "string",
                                "enum": ["fetchPage", "storePage", "markIrrelevant", "getLinks", "done"]
                            },
                            "url": { "type": "string" }
                        },
                        "required": ["tool"]
                    }
                }
            },
            "required": ["calls"]
        });

        llm.invoke_structured::<AgentDirective>(
            LOOP_SITE,
            LlmRequest::new(prompt).with_system(system.to_string()),
            schema,
        )
        .await
    }
}
