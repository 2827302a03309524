//! Shared constants for timeouts, caps, and defaults.

/// User agent sent when the configured headers do not override it.
pub const DEFAULT_USER_AGENT: &str = "website-fetch/1.0";

pub const DEFAULT_MAX_DEPTH: usize = 5;
pub const DEFAULT_MAX_PAGES: usize = 100;
pub const DEFAULT_DELAY_MS: u64 = 200;
pub const DEFAULT_CONCURRENCY: usize = 3;

/// Retries on 5xx responses, on top of the initial attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Consecutive successes before the adaptive delay decays toward baseline.
pub const RATE_LIMIT_SUCCESS_STREAK: u32 = 10;

pub const MAX_REDIRECTS: usize = 5;
pub const FETCH_TIMEOUT_SECS: u64 = 30;
pub const ROBOTS_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;

/// Surrounding-context budget attached to an extracted link.
pub const LINK_CONTEXT_MAX_CHARS: usize = 200;

/// Links per LLM classification request in batch mode.
pub const CLASSIFIER_BATCH_SIZE: usize = 50;

/// HTML prefix shown to the conversion strategy selector.
pub const SELECTOR_HTML_CHARS: usize = 2_000;

/// HTML prefix shown to the conversion optimizer's evaluation step.
pub const OPTIMIZER_HTML_CHARS: usize = 8_000;

/// Markdown prefix summarized for the agent after a `fetchPage`.
pub const SUMMARY_MARKDOWN_CHARS: usize = 8_000;

/// Markdown prefix used verbatim when the summarizer call fails.
pub const SUMMARY_FALLBACK_CHARS: usize = 500;

pub const DEFAULT_OPTIMIZER_ITERATIONS: u32 = 2;

pub const AGENT_MAX_TURNS: usize = 100;

/// Tool calls honored from a single agent generation.
pub const AGENT_MAX_TOOL_CALLS: usize = 10;
