use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Assistant pipeline
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Whether new sessions show reasoning trace messages.
    #[serde(default = "d_true")]
    pub reasoning_default: bool,
    /// Mood entries kept per session. Values above 30 are clamped.
    #[serde(default = "d_30")]
    pub mood_history_cap: usize,
    /// Fixed seed for exercise and story selection (tests, demos).
    #[serde(default)]
    pub rng_seed: Option<u64>,
    /// Override for the system persona of fresh sessions.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            reasoning_default: true,
            mood_history_cap: 30,
            rng_seed: None,
            system_prompt: None,
        }
    }
}

fn d_true() -> bool {
    true
}
fn d_30() -> usize {
    30
}
