use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classification::ContentClassification;
use crate::emotion::{CrisisLevel, EmotionAnalysis, ResponseStrategy};
use crate::message::{Message, Role};
use crate::route::Route;

/// Hard upper bound on `SessionState::mood_history`.
pub const MOOD_HISTORY_CAP: usize = 30;
/// Self-care suggestions remembered per session.
pub const SELF_CARE_HISTORY_CAP: usize = 10;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session sub-records
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub timestamp: DateTime<Utc>,
    pub emotion: String,
    pub intensity: CrisisLevel,
    /// First 100 characters of the message that produced the entry.
    pub context: String,
    pub is_checkin: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CbtProgress {
    #[serde(default)]
    pub exercises_completed: Vec<String>,
    #[serde(default)]
    pub current_focus: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub likes_videos: bool,
    #[serde(default)]
    pub prefers_brief_responses: bool,
    #[serde(default = "d_true")]
    pub wants_resources: bool,
    #[serde(default)]
    pub prefers_detailed_content: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            likes_videos: false,
            prefers_brief_responses: false,
            wants_resources: true,
            prefers_detailed_content: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CulturalContext {
    pub language: String,
    pub region: String,
}

impl Default for CulturalContext {
    fn default() -> Self {
        Self {
            language: "english".into(),
            region: "global".into(),
        }
    }
}

/// Output of one tool call: plain text or structured JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolResult {
    Text(String),
    Structured(serde_json::Value),
}

impl ToolResult {
    /// Text view of the result (structured values are rendered as JSON).
    pub fn as_text(&self) -> String {
        match self {
            ToolResult::Text(s) => s.clone(),
            ToolResult::Structured(v) => v.to_string(),
        }
    }

    pub fn as_structured(&self) -> Option<&serde_json::Value> {
        match self {
            ToolResult::Structured(v) => Some(v),
            ToolResult::Text(_) => None,
        }
    }
}

impl From<String> for ToolResult {
    fn from(s: String) -> Self {
        ToolResult::Text(s)
    }
}

impl From<&str> for ToolResult {
    fn from(s: &str) -> Self {
        ToolResult::Text(s.to_string())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session state
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Per-user record threaded through every stage of a turn and persisted
/// between turns by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub emotion_analysis: Option<EmotionAnalysis>,
    #[serde(default)]
    pub response_strategy: Option<ResponseStrategy>,
    #[serde(default)]
    pub content_classification: Option<ContentClassification>,
    #[serde(default)]
    pub query_route: Route,
    #[serde(default)]
    pub immediate_resources_needed: bool,
    #[serde(default)]
    pub tool_results: BTreeMap<String, ToolResult>,
    #[serde(default)]
    pub mood_history: Vec<MoodEntry>,
    #[serde(default)]
    pub cbt_progress: CbtProgress,
    #[serde(default)]
    pub psychoeducation_topics_covered: Vec<String>,
    #[serde(default)]
    pub user_preferences: UserPreferences,
    #[serde(default = "d_true")]
    pub reasoning_visible: bool,
    #[serde(default)]
    pub cultural_context: CulturalContext,
    #[serde(default)]
    pub self_care_recommendations: Vec<String>,
    #[serde(default)]
    pub last_professional_referral: Option<DateTime<Utc>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            emotion_analysis: None,
            response_strategy: None,
            content_classification: None,
            query_route: Route::GeneralAdvice,
            immediate_resources_needed: false,
            tool_results: BTreeMap::new(),
            mood_history: Vec::new(),
            cbt_progress: CbtProgress::default(),
            psychoeducation_topics_covered: Vec::new(),
            user_preferences: UserPreferences::default(),
            reasoning_visible: true,
            cultural_context: CulturalContext::default(),
            self_care_recommendations: Vec::new(),
            last_professional_referral: None,
        }
    }
}

impl SessionState {
    /// Fresh state seeded with the assistant persona.
    pub fn new(system_prompt: impl Into<String>, reasoning_visible: bool) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
            reasoning_visible,
            ..Self::default()
        }
    }

    /// Reset per-turn scratch data. Cross-turn records are untouched.
    pub fn begin_turn(&mut self) {
        self.tool_results.clear();
    }

    /// Content of the most recent user message, if any.
    pub fn last_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }

    pub fn primary_emotion(&self) -> &str {
        self.emotion_analysis
            .as_ref()
            .map(|a| a.primary_emotion.as_str())
            .unwrap_or(crate::emotion::DEFAULT_EMOTION)
    }

    /// Merge a stage's output into the state with the default mood cap.
    pub fn apply(&mut self, delta: StateDelta) {
        self.apply_with_mood_cap(delta, MOOD_HISTORY_CAP);
    }

    /// Merge a stage's output. `mood_cap` is clamped to `MOOD_HISTORY_CAP`.
    pub fn apply_with_mood_cap(&mut self, delta: StateDelta, mood_cap: usize) {
        self.messages.extend(delta.messages);

        if let Some(analysis) = delta.emotion_analysis {
            self.immediate_resources_needed = analysis.requires_immediate_resources();
            self.emotion_analysis = Some(analysis);
        }
        if let Some(strategy) = delta.response_strategy {
            self.response_strategy = Some(strategy);
        }
        if let Some(classification) = delta.content_classification {
            self.content_classification = Some(classification);
        }
        if let Some(route) = delta.query_route {
            self.query_route = route;
        }
        for (name, result) in delta.tool_results {
            self.tool_results.insert(name, result);
        }
        if let Some(entry) = delta.mood_entry {
            self.push_mood(entry, mood_cap);
        }
        if let Some(focus) = delta.cbt_focus {
            self.cbt_progress.current_focus = Some(focus);
        }
        if let Some(topic) = delta.topic_covered {
            if !self.psychoeducation_topics_covered.contains(&topic) {
                self.psychoeducation_topics_covered.push(topic);
            }
        }
        if let Some(prefs) = delta.user_preferences {
            self.user_preferences = prefs;
        }
        if let Some(visible) = delta.reasoning_visible {
            self.reasoning_visible = visible;
        }
        if let Some(suggestion) = delta.self_care_recommendation {
            self.self_care_recommendations.push(suggestion);
            let excess = self
                .self_care_recommendations
                .len()
                .saturating_sub(SELF_CARE_HISTORY_CAP);
            self.self_care_recommendations.drain(..excess);
        }
        if let Some(at) = delta.professional_referral {
            self.last_professional_referral = Some(at);
        }
    }

    fn push_mood(&mut self, entry: MoodEntry, cap: usize) {
        let cap = cap.clamp(1, MOOD_HISTORY_CAP);
        self.mood_history.push(entry);
        let excess = self.mood_history.len().saturating_sub(cap);
        self.mood_history.drain(..excess);
    }

    /// Drop the oldest non-system messages until at most `max` remain.
    /// A leading system message is always preserved.
    pub fn trim_messages(&mut self, max: usize) {
        if self.messages.len() <= max {
            return;
        }
        let keep_head = usize::from(
            self.messages
                .first()
                .is_some_and(|m| m.role == Role::System),
        );
        let excess = self.messages.len() - max.max(keep_head + 1);
        self.messages.drain(keep_head..keep_head + excess);
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// State delta
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Changes produced by one pipeline stage, merged via `SessionState::apply`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateDelta {
    pub messages: Vec<Message>,
    pub emotion_analysis: Option<EmotionAnalysis>,
    pub response_strategy: Option<ResponseStrategy>,
    pub content_classification: Option<ContentClassification>,
    pub query_route: Option<Route>,
    pub tool_results: Vec<(String, ToolResult)>,
    pub mood_entry: Option<MoodEntry>,
    pub cbt_focus: Option<String>,
    pub topic_covered: Option<String>,
    pub user_preferences: Option<UserPreferences>,
    pub reasoning_visible: Option<bool>,
    pub self_care_recommendation: Option<String>,
    pub professional_referral: Option<DateTime<Utc>>,
}

impl StateDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Push a trace message only when reasoning is visible.
    pub fn trace_if(&mut self, visible: bool, content: impl Into<String>) {
        if visible {
            self.messages.push(Message::trace(content));
        }
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Assistant-role contents carried by this delta.
    pub fn assistant_contents(&self) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }
}

fn d_true() -> bool {
    true
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
