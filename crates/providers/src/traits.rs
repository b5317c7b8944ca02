//! Provider-agnostic chat completion contract.

use mh_domain::error::Result;
use mh_domain::message::Message;

/// One chat completion call.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    /// Trace messages are dropped before anything is sent.
    pub messages: Vec<Message>,
    /// `None` lets the provider choose.
    pub temperature: Option<f32>,
    /// Overrides the provider's default model.
    pub model: Option<String>,
}

impl ChatRequest {
    /// A request carrying a single user turn.
    pub fn prompt(text: &str) -> Self {
        Self {
            messages: vec![Message::user(text)],
            ..Default::default()
        }
    }

    pub fn model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Token counts as reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    /// The model that actually answered.
    pub model: String,
    pub usage: Option<Usage>,
}

#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse>;

    /// Config id, used in logs and role resolution.
    fn provider_id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use mh_domain::message::Role;

    #[test]
    fn prompt_builds_single_user_turn() {
        let req = ChatRequest::prompt("hello")
            .model(Some("m".into()))
            .temperature(Some(0.5));
        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.messages[0].role, Role::User);
        assert_eq!(req.model.as_deref(), Some("m"));
        assert_eq!(req.temperature, Some(0.5));
    }
}
