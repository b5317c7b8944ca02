//! Adapter for chat-completions endpoints in the OpenAI format.
//!
//! Covers OpenAI itself, Groq, Ollama, vLLM, LM Studio and similar
//! servers. Only non-streaming calls are made.

use serde_json::Value;

use crate::traits::{ChatRequest, ChatResponse, LlmProvider, Usage};
use crate::util::{from_reqwest, http_client, resolve_api_key};
use mh_domain::config::ProviderConfig;
use mh_domain::error::{Error, Result};
use mh_domain::message::{Message, Role};

const FALLBACK_MODEL: &str = "gpt-4o-mini";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct OpenAiCompatProvider {
    id: String,
    endpoint: String,
    /// Full header value, prefix included.
    auth: Option<(String, String)>,
    default_model: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    pub fn from_config(cfg: &ProviderConfig, timeout_ms: u64) -> Result<Self> {
        let auth = resolve_api_key(&cfg.id, &cfg.auth)?.map(|key| {
            let header = cfg.auth.header.as_deref().unwrap_or("Authorization");
            let prefix = cfg.auth.prefix.as_deref().unwrap_or("Bearer ");
            (header.to_string(), format!("{prefix}{key}"))
        });

        Ok(Self {
            id: cfg.id.clone(),
            endpoint: format!("{}/chat/completions", cfg.base_url.trim_end_matches('/')),
            auth,
            default_model: cfg
                .default_model
                .clone()
                .unwrap_or_else(|| FALLBACK_MODEL.into()),
            client: http_client(timeout_ms)?,
        })
    }

    fn request_body(&self, req: &ChatRequest) -> Value {
        let messages: Vec<Value> = req.messages.iter().filter_map(wire_message).collect();
        let mut body = serde_json::json!({
            "model": req.model.as_deref().unwrap_or(&self.default_model),
            "messages": messages,
            "stream": false,
        });
        if let Some(temp) = req.temperature {
            body["temperature"] = serde_json::json!(temp);
        }
        body
    }

    fn provider_error(&self, message: impl Into<String>) -> Error {
        Error::Provider {
            provider: self.id.clone(),
            message: message.into(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire format
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Trace messages are local reasoning and never leave the process.
fn wire_message(msg: &Message) -> Option<Value> {
    let role = match msg.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Trace => return None,
    };
    Some(serde_json::json!({ "role": role, "content": msg.content }))
}

/// First choice's text, the answering model, and token usage if reported.
fn parse_response(body: &Value) -> std::result::Result<ChatResponse, &'static str> {
    let message = body
        .pointer("/choices/0/message")
        .ok_or("no message in response")?;

    let content = message
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let model = body
        .get("model")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();

    let usage = body.get("usage").and_then(|u| {
        Some(Usage {
            prompt_tokens: u.get("prompt_tokens")?.as_u64()? as u32,
            completion_tokens: u
                .get("completion_tokens")
                .and_then(Value::as_u64)
                .unwrap_or(0) as u32,
        })
    });

    Ok(ChatResponse {
        content,
        model,
        usage,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl LlmProvider for OpenAiCompatProvider {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
        tracing::debug!(provider = %self.id, endpoint = %self.endpoint, "chat completion request");

        let mut builder = self.client.post(&self.endpoint).json(&self.request_body(req));
        if let Some((header, value)) = &self.auth {
            builder = builder.header(header.as_str(), value.as_str());
        }

        let resp = builder.send().await.map_err(from_reqwest)?;
        let status = resp.status();
        let text = resp.text().await.map_err(from_reqwest)?;

        if !status.is_success() {
            return Err(self.provider_error(format!("HTTP {} - {}", status.as_u16(), text)));
        }

        let json: Value = serde_json::from_str(&text)?;
        parse_response(&json).map_err(|m| self.provider_error(m))
    }

    fn provider_id(&self) -> &str {
        &self.id
    }
}
