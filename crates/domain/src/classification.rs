use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares a lowercase label enum with `as_str` and `Display`.
macro_rules! label_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? } default $default:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Case-insensitive lookup by label.
            pub fn from_label(label: &str) -> Option<Self> {
                let label = label.trim().to_ascii_lowercase();
                match label.as_str() {
                    $($label => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

label_enum!(
    /// What kind of utterance the user sent.
    ContentType {
        Question => "question",
        Statement => "statement",
        RequestForHelp => "request_for_help",
        EmotionalExpression => "emotional_expression",
        SharingExperience => "sharing_experience",
        FollowUp => "follow_up",
        Greeting => "greeting",
        Gratitude => "gratitude",
    } default Statement
);

label_enum!(
    UrgencyLevel {
        Low => "low",
        Medium => "medium",
        High => "high",
        Emergency => "emergency",
    } default Medium
);

label_enum!(
    Complexity {
        Simple => "simple",
        Moderate => "moderate",
        Complex => "complex",
    } default Moderate
);

label_enum!(
    EmotionalTone {
        Positive => "positive",
        Neutral => "neutral",
        Negative => "negative",
        Mixed => "mixed",
    } default Neutral
);

/// Labels the content classifier attaches to an incoming message.
///
/// The default value (`statement` / `medium` / `moderate` / `neutral`) is
/// also the fallback when the classifier cannot produce a result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentClassification {
    pub content_type: ContentType,
    pub urgency_level: UrgencyLevel,
    pub complexity: Complexity,
    pub emotional_tone: EmotionalTone,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_classification() {
        let c = ContentClassification::default();
        assert_eq!(c.content_type, ContentType::Statement);
        assert_eq!(c.urgency_level, UrgencyLevel::Medium);
        assert_eq!(c.complexity, Complexity::Moderate);
        assert_eq!(c.emotional_tone, EmotionalTone::Neutral);
    }

    #[test]
    fn from_label_is_case_insensitive() {
        assert_eq!(
            ContentType::from_label(" Request_For_Help "),
            Some(ContentType::RequestForHelp)
        );
        assert_eq!(UrgencyLevel::from_label("EMERGENCY"), Some(UrgencyLevel::Emergency));
        assert_eq!(EmotionalTone::from_label("furious"), None);
    }

    #[test]
    fn display_matches_serde() {
        let json = serde_json::to_string(&ContentType::SharingExperience).unwrap();
        assert_eq!(json, format!("\"{}\"", ContentType::SharingExperience));
    }
}
