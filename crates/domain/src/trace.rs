use serde::Serialize;

/// Structured trace events emitted across all mh crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    TurnStarted {
        new_session: bool,
        message_chars: usize,
    },
    ContentClassified {
        content_type: String,
        urgency_level: String,
        emotional_tone: String,
    },
    RouteSelected {
        route: String,
        /// `override`, `oracle`, or `fallback`.
        source: String,
    },
    EmotionAnalyzed {
        primary_emotion: String,
        crisis_level: String,
        immediate_resources_needed: bool,
    },
    StrategyDetermined {
        approach: String,
        tools: Vec<String>,
    },
    CrisisFlagged {
        route: String,
    },
    HandlerCompleted {
        handler: String,
        messages: usize,
    },
    ToolInvoked {
        tool: String,
        ok: bool,
        result_chars: usize,
        duration_ms: u64,
    },
    OracleFallback {
        stage: String,
        reason: String,
    },
    TurnCompleted {
        route: String,
        reply_chars: usize,
        duration_ms: u64,
    },
    SessionLoaded {
        user_id: String,
        is_new: bool,
    },
    SessionEvicted {
        user_id: String,
        reason: String,
    },
    LlmRequest {
        provider: String,
        model: String,
        duration_ms: u64,
        prompt_tokens: Option<u32>,
        completion_tokens: Option<u32>,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "mh_event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_event_tag() {
        let ev = TraceEvent::RouteSelected {
            route: "self_care".into(),
            source: "oracle".into(),
        };
        let v: serde_json::Value = serde_json::to_value(&ev).unwrap();
        assert_eq!(v["event"], "RouteSelected");
        assert_eq!(v["route"], "self_care");
    }
}
