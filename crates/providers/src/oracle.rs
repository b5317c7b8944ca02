//! The text-generation oracle the assistant pipeline talks to.
//!
//! Every pipeline stage sends one prompt and receives free text back. The
//! text may be malformed; callers own parsing and fallbacks.

use std::sync::Arc;
use std::time::Instant;

use mh_domain::error::{Error, Result};
use mh_domain::trace::TraceEvent;

use crate::registry::ProviderRegistry;
use crate::traits::{ChatRequest, LlmProvider};

/// Prompt in, text out.
#[async_trait::async_trait]
pub trait Oracle: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Oracle backed by a chat-completions provider.
pub struct LlmOracle {
    provider: Arc<dyn LlmProvider>,
    model: Option<String>,
    temperature: Option<f32>,
}

impl LlmOracle {
    pub fn new(provider: Arc<dyn LlmProvider>, model: Option<String>) -> Self {
        Self {
            provider,
            model,
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Build from the provider assigned to `role`, if any.
    pub fn from_registry(registry: &ProviderRegistry, role: &str) -> Option<Self> {
        registry
            .resolve_role(role)
            .map(|(provider, model)| Self::new(provider, model))
    }
}

#[async_trait::async_trait]
impl Oracle for LlmOracle {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let req = ChatRequest::prompt(prompt)
            .model(self.model.clone())
            .temperature(self.temperature);

        let start = Instant::now();
        let resp = self.provider.chat(&req).await?;

        TraceEvent::LlmRequest {
            provider: self.provider.provider_id().to_string(),
            model: resp.model.clone(),
            duration_ms: start.elapsed().as_millis() as u64,
            prompt_tokens: resp.usage.map(|u| u.prompt_tokens),
            completion_tokens: resp.usage.map(|u| u.completion_tokens),
        }
        .emit();

        let content = resp.content.trim();
        if content.is_empty() {
            return Err(Error::Provider {
                provider: self.provider.provider_id().to_string(),
                message: "empty completion".into(),
            });
        }
        Ok(content.to_string())
    }
}

/// Oracle used when no provider is configured. Every call fails, so each
/// stage serves its fallback content.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullOracle;

#[async_trait::async_trait]
impl Oracle for NullOracle {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(Error::Config("no LLM provider configured".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ChatResponse;

    struct Echo {
        reply: &'static str,
    }

    #[async_trait::async_trait]
    impl LlmProvider for Echo {
        async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
            assert_eq!(req.messages.len(), 1);
            Ok(ChatResponse {
                content: self.reply.into(),
                model: req.model.clone().unwrap_or_else(|| "default".into()),
                usage: None,
            })
        }
        fn provider_id(&self) -> &str {
            "echo"
        }
    }

    #[tokio::test]
    async fn trims_completion() {
        let oracle = LlmOracle::new(Arc::new(Echo { reply: "  ok \n" }), None);
        assert_eq!(oracle.complete("hi").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn empty_completion_is_an_error() {
        let oracle = LlmOracle::new(Arc::new(Echo { reply: "   " }), Some("m".into()));
        assert!(oracle.complete("hi").await.is_err());
    }

    #[tokio::test]
    async fn null_oracle_always_fails() {
        let err = NullOracle.complete("anything").await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
