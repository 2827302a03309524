//! The five tools the agent conversation drives, and the mutable context
//! they share.
//!
//! The context is owned by the agent loop; tools receive a mutable borrow
//! at the tool-call grain, so no internal synchronization is needed. Tool
//! failures are reported back to the model as textual results — they never
//! abort the conversation.

use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;
use url::Url;

use crate::crawler::CrawlCore;
use crate::convert::extract_title;
use crate::extract::{ExtractedLink, LinkExtractor};
use crate::llm::{LlmClient, LlmRequest};
use crate::page::{FetchedPage, FetchedPageRaw, SkippedPage};
use crate::utils::constants::{SUMMARY_FALLBACK_CHARS, SUMMARY_MARKDOWN_CHARS};
use crate::utils::{normalize_url, truncate_chars};

pub(crate) const SUMMARIZER_SITE: &str = "page-summarizer";

const REASON_IRRELEVANT: &str = "Marked irrelevant by agent";

/// A fetched-and-converted page parked until the agent stores or discards
/// it.
pub(crate) struct TempEntry {
    pub(crate) raw: FetchedPageRaw,
    pub(crate) markdown: String,
    pub(crate) title: Option<String>,
}

/// Mutable state shared by all tool calls in one conversation.
#[derive(Default)]
pub(crate) struct AgentContext {
    /// Temp storage keyed by normalized URL.
    pub(crate) temp: HashMap<String, TempEntry>,
    /// Summary cache keyed by normalized URL.
    pub(crate) summaries: HashMap<String, String>,
    pub(crate) stored: Vec<FetchedPage>,
    pub(crate) skipped: Vec<SkippedPage>,
    pub(crate) done: bool,
}

/// One tool invocation requested by the model.
#[derive(Debug, Deserialize)]
pub(crate) struct AgentToolCall {
    pub(crate) tool: AgentTool,
    #[serde(default)]
    pub(crate) url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum AgentTool {
    FetchPage,
    StorePage,
    MarkIrrelevant,
    GetLinks,
    Done,
}

impl std::fmt::Display for AgentTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FetchPage => write!(f, "fetchPage"),
            Self::StorePage => write!(f, "storePage"),
            Self::MarkIrrelevant => write!(f, "markIrrelevant"),
            Self::GetLinks => write!(f, "getLinks"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Executes tool calls against the crawl core.
pub(crate) struct AgentToolbox<'a> {
    pub(crate) core: &'a CrawlCore,
    pub(crate) llm: &'a LlmClient,
    pub(crate) extractor: &'a LinkExtractor,
}

impl AgentToolbox<'_> {
    /// Run one tool call, mutating the context, and produce the textual
    /// result fed back to the model.
    pub(crate) async fn execute(&self, call: &AgentToolCall, ctx: &mut AgentContext) -> String {
        match call.tool {
            AgentTool::Done => {
                ctx.done = true;
                "Acknowledged; finishing the crawl.".to_string()
            }
            tool => {
                let Some(url) = call.url.as_deref() else {
                    return format!("Error: {tool} requires a url argument.");
                };
                match tool {
                    AgentTool::FetchPage => self.fetch_page(url, ctx).await,
                    AgentTool::StorePage => self.store_page(url, ctx).await,
                    AgentTool::MarkIrrelevant => self.mark_irrelevant(url, ctx),
                    AgentTool::GetLinks => self.get_links(url, ctx),
                    AgentTool::Done => unreachable!("handled above"),
                }
            }
        }
    }

    async fn fetch_page(&self, url: &str, ctx: &mut AgentContext) -> String {
        let normalized = normalize_url(url);

        if ctx.temp.contains_key(&normalized) {
            if let Some(summary) = ctx.summaries.get(&normalized) {
                return format!("Already fetched {url}.\nSummary:\n{summary}");
            }
        }

        let raw = match self.core.fetch(url).await {
            Ok(raw) => raw,
            Err(e) => {
                self.core.observer.on_error(url, &e);
                return format!("Failed to fetch {url}: {e}");
            }
        };

        let page_url = match Url::parse(&raw.url) {
            Ok(parsed) => parsed,
            Err(e) => return format!("Failed to fetch {url}: invalid final URL ({e})"),
        };

        let markdown = match self.core.converter.convert(&raw.html, &page_url).await {
            Ok(markdown) => markdown,
            Err(e) => {
                self.core.observer.on_error(url, &e);
                return format!("Failed to convert {url}: {e}");
            }
        };

        let title = extract_title(&raw.html);
        let summary = self.summarize(url, &markdown).await;

        ctx.temp.insert(
            normalized.clone(),
            TempEntry {
                raw,
                markdown,
                title,
            },
        );
        ctx.summaries.insert(normalized, summary.clone());

        format!("Fetched {url}.\nSummary:\n{summary}")
    }

    async fn store_page(&self, url: &str, ctx: &mut AgentContext) -> String {
        let normalized = normalize_url(url);

        let Some(entry) = ctx.temp.get(&normalized) else {
            return format!("Error: no fetched page for {url}; call fetchPage first.");
        };

        let max_pages = self.core.config.max_pages();
        if ctx.stored.len() >= max_pages {
            return format!(
                "Error: the page limit of {max_pages} is reached; call done to finish."
            );
        }

        let page = FetchedPage {
            raw: entry.raw.clone(),
            markdown: entry.markdown.clone(),
            title: entry.title.clone(),
            depth: 0,
        };

        if let Err(e) = self.core.writer.write_page(&page).await {
            self.core.observer.on_error(url, e.as_ref());
            return format!("Failed to store {url}: {e:#}");
        }

        let links = self.entry_links(entry);
        ctx.temp.remove(&normalized);
        self.core.observer.on_page_fetched(&page);
        ctx.stored.push(page);

        format!(
            "Stored {url} ({}/{max_pages} pages).\nLinks on the page:\n{}",
            ctx.stored.len(),
            format_links(&links)
        )
    }

    fn mark_irrelevant(&self, url: &str, ctx: &mut AgentContext) -> String {
        let normalized = normalize_url(url);

        let Some(entry) = ctx.temp.get(&normalized) else {
            return format!("Error: no fetched page for {url}; call fetchPage first.");
        };

        let links = self.entry_links(entry);
        ctx.temp.remove(&normalized);
        ctx.skipped.push(SkippedPage::new(url, REASON_IRRELEVANT));
        self.core.observer.on_page_skipped(url, REASON_IRRELEVANT);

        format!(
            "Discarded {url}.\nLinks on the page:\n{}",
            format_links(&links)
        )
    }

    fn get_links(&self, url: &str, ctx: &mut AgentContext) -> String {
        let normalized = normalize_url(url);

        let Some(entry) = ctx.temp.get(&normalized) else {
            return format!("Error: no fetched page for {url}; call fetchPage first.");
        };

        format!(
            "Links on {url}:\n{}",
            format_links(&self.entry_links(entry))
        )
    }

    fn entry_links(&self, entry: &TempEntry) -> Vec<ExtractedLink> {
        match Url::parse(&entry.raw.url) {
            Ok(page_url) => self.extractor.extract(&entry.raw.html, &page_url),
            Err(_) => Vec::new(),
        }
    }

    async fn summarize(&self, url: &str, markdown: &str) -> String {
        let excerpt = truncate_chars(markdown, SUMMARY_MARKDOWN_CHARS);
        let prompt = format!(
            "Summarize this page's content in 200-500 words, focusing on \
             what the page is about and what it contains.\n\n{excerpt}"
        );

        match self
            .llm
            .invoke_text(SUMMARIZER_SITE, LlmRequest::new(prompt))
            .await
        {
            Ok(summary) if !summary.trim().is_empty() => summary.trim().to_string(),
            Ok(_) | Err(_) => {
                debug!(
                    target: "website_fetch::agent",
                    "summarizer unavailable for {url}; using markdown prefix"
                );
                truncate_chars(markdown, SUMMARY_FALLBACK_CHARS)
            }
        }
    }
}

fn format_links(links: &[ExtractedLink]) -> String {
    if links.is_empty() {
        return "(none)".to_string();
    }
    links
        .iter()
        .map(|link| {
            if link.text.is_empty() {
                format!("- {}", link.url)
            } else {
                format!("- {} ({})", link.url, link.text)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
