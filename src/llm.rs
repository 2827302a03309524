//! Abstract LLM provider interface and the thin client over it.
//!
//! The crate never talks to a model vendor directly. Callers supply an
//! [`LlmProvider`] that turns a prompt into text, or into a JSON value
//! validated against a schema. The [`LlmClient`] layers call-site option
//! resolution, timeouts, and typed deserialization on top.
//!
//! Call sites are named contexts (`link-classifier`, `page-summarizer`,
//! `strategy-selector`, `conversion-optimizer`, `conversion-rewriter`,
//! `agent-loop`) whose parameters can be overridden independently in
//! [`LlmConfig`].

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::error::LlmError;
use crate::utils::constants::DEFAULT_LLM_TIMEOUT_SECS;

/// One request to the model.
#[derive(Debug, Clone, Default)]
pub struct LlmRequest {
    pub prompt: String,
    pub system: Option<String>,
}

impl LlmRequest {
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
        }
    }

    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// Parameters resolved for a single call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallOptions {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
}

impl CallOptions {
    /// Fill unset fields from `base`.
    #[must_use]
    fn or(self, base: &CallOptions) -> CallOptions {
        CallOptions {
            model: self.model.or_else(|| base.model.clone()),
            temperature: self.temperature.or(base.temperature),
            max_tokens: self.max_tokens.or(base.max_tokens),
            timeout_secs: self.timeout_secs.or(base.timeout_secs),
        }
    }
}

/// Model selection and per-call-site parameter overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model used when neither a call-site override nor `defaults` name one.
    pub model: Option<String>,
    #[serde(default)]
    pub defaults: CallOptions,
    /// Overrides keyed by call-site name.
    #[serde(default)]
    pub call_sites: HashMap<String, CallOptions>,
}

impl LlmConfig {
    /// Resolve the effective options for a call site.
    #[must_use]
    pub fn options_for(&self, site: &str) -> CallOptions {
        let mut options = self
            .call_sites
            .get(site)
            .cloned()
            .unwrap_or_default()
            .or(&self.defaults);
        if options.model.is_none() {
            options.model = self.model.clone();
        }
        options
    }
}

/// An abstract capability that turns a prompt into text or a structured
/// value.
///
/// The schema handed to `invoke_structured` is a JSON value describing the
/// expected shape (a validator, not a language feature); providers are
/// expected to return JSON conforming to it. Methods return boxed futures
/// so the trait stays object-safe behind `Arc<dyn LlmProvider>`.
pub trait LlmProvider: Send + Sync {
    fn invoke(
        &self,
        request: LlmRequest,
        options: CallOptions,
    ) -> BoxFuture<'_, Result<String, LlmError>>;

    fn invoke_structured(
        &self,
        request: LlmRequest,
        schema: serde_json::Value,
        options: CallOptions,
    ) -> BoxFuture<'_, Result<serde_json::Value, LlmError>>;
}

/// Provider plus configuration: what the rest of the crate calls.
#[derive(Clone)]
pub struct LlmClient {
    provider: Arc<dyn LlmProvider>,
    config: LlmConfig,
}

impl LlmClient {
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, config: LlmConfig) -> Self {
        Self { provider, config }
    }

    /// Plain-text invocation at a named call site.
    pub async fn invoke_text(
        &self,
        site: &str,
        request: LlmRequest,
    ) -> Result<String, LlmError> {
        let options = self.config.options_for(site);
        let timeout = call_timeout(&options);

        match tokio::time::timeout(timeout, self.provider.invoke(request, options)).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout {
                site: site.to_string(),
                seconds: timeout.as_secs(),
            }),
        }
    }

    /// Structured invocation at a named call site, deserialized into `T`.
    pub async fn invoke_structured<T: DeserializeOwned>(
        &self,
        site: &str,
        request: LlmRequest,
        schema: serde_json::Value,
    ) -> Result<T, LlmError> {
        let options = self.config.options_for(site);
        let timeout = call_timeout(&options);

        let value = match tokio::time::timeout(
            timeout,
            self.provider.invoke_structured(request, schema, options),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(LlmError::Timeout {
                    site: site.to_string(),
                    seconds: timeout.as_secs(),
                });
            }
        };

        serde_json::from_value(value).map_err(|e| LlmError::Malformed {
            site: site.to_string(),
            message: e.to_string(),
        })
    }
}

fn call_timeout(options: &CallOptions) -> Duration {
    Duration::from_secs(options.timeout_secs.unwrap_or(DEFAULT_LLM_TIMEOUT_SECS))
}
