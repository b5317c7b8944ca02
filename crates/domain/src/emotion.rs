use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrisisLevel {
    #[default]
    Low,
    Medium,
    High,
    VeryHigh,
}

impl CrisisLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            CrisisLevel::Low => "low",
            CrisisLevel::Medium => "medium",
            CrisisLevel::High => "high",
            CrisisLevel::VeryHigh => "very_high",
        }
    }

    /// Lenient lookup: accepts "very high", "Very-High", etc.
    pub fn from_label(label: &str) -> Option<Self> {
        let norm: String = label
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();
        match norm.as_str() {
            "low" => Some(CrisisLevel::Low),
            "medium" => Some(CrisisLevel::Medium),
            "high" => Some(CrisisLevel::High),
            "very_high" => Some(CrisisLevel::VeryHigh),
            _ => None,
        }
    }

    /// High and very-high levels always require crisis resources.
    pub fn requires_resources(self) -> bool {
        self >= CrisisLevel::High
    }
}

impl fmt::Display for CrisisLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DEFAULT_EMOTION: &str = "neutral";

/// Structured emotion and crisis assessment for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionAnalysis {
    pub primary_emotion: String,
    pub emotion_justification: String,
    pub crisis_level: CrisisLevel,
    pub crisis_justification: String,
    pub needs_immediate_resources: bool,
    pub reasoning: String,
}

impl Default for EmotionAnalysis {
    fn default() -> Self {
        Self {
            primary_emotion: DEFAULT_EMOTION.into(),
            emotion_justification: "Unable to determine emotion from message".into(),
            crisis_level: CrisisLevel::Low,
            crisis_justification: "No clear crisis indicators detected".into(),
            needs_immediate_resources: false,
            reasoning: "Analysis encountered technical difficulties".into(),
        }
    }
}

impl EmotionAnalysis {
    /// Parsed flag OR a high/very-high crisis level.
    pub fn requires_immediate_resources(&self) -> bool {
        self.needs_immediate_resources || self.crisis_level.requires_resources()
    }

    /// Lowercased primary emotion, for table lookups.
    pub fn emotion_key(&self) -> String {
        self.primary_emotion.trim().to_lowercase()
    }
}

/// The plan the response stage follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseStrategy {
    pub approach: String,
    pub key_points: Vec<String>,
    pub appropriate_tools: Vec<String>,
    pub reasoning: String,
}

impl Default for ResponseStrategy {
    fn default() -> Self {
        Self {
            approach: "empathize".into(),
            key_points: vec!["Acknowledge feelings".into(), "Offer support".into()],
            appropriate_tools: Vec::new(),
            reasoning: "Defaulting to empathetic approach due to technical issue".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crisis_level_ordering() {
        assert!(CrisisLevel::VeryHigh > CrisisLevel::High);
        assert!(CrisisLevel::High.requires_resources());
        assert!(CrisisLevel::VeryHigh.requires_resources());
        assert!(!CrisisLevel::Medium.requires_resources());
    }

    #[test]
    fn crisis_level_lenient_labels() {
        assert_eq!(CrisisLevel::from_label("Very High"), Some(CrisisLevel::VeryHigh));
        assert_eq!(CrisisLevel::from_label("very-high"), Some(CrisisLevel::VeryHigh));
        assert_eq!(CrisisLevel::from_label("extreme"), None);
    }

    #[test]
    fn immediate_resources_is_or_of_flag_and_level() {
        let mut a = EmotionAnalysis::default();
        assert!(!a.requires_immediate_resources());
        a.crisis_level = CrisisLevel::High;
        assert!(a.requires_immediate_resources());
        a.crisis_level = CrisisLevel::Low;
        a.needs_immediate_resources = true;
        assert!(a.requires_immediate_resources());
    }

    #[test]
    fn default_strategy_has_no_tools() {
        let s = ResponseStrategy::default();
        assert_eq!(s.approach, "empathize");
        assert!(s.appropriate_tools.is_empty());
        assert_eq!(s.key_points.len(), 2);
    }
}
