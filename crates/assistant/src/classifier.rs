//! Labels the incoming message along four axes.

use mh_domain::classification::{
    Complexity, ContentClassification, ContentType, EmotionalTone, UrgencyLevel,
};
use mh_domain::state::{SessionState, StateDelta};
use mh_domain::trace::TraceEvent;

use crate::json;
use crate::prompts::compose;
use crate::stage::{fallback, StageCtx};

const STAGE: &str = "classify_content";

const INSTRUCTIONS: &str = r#"You are an expert at classifying mental health messages to help provide appropriate responses.

Classify the message along four axes:
1. content_type: question, statement, request_for_help, emotional_expression, sharing_experience, follow_up, greeting, gratitude
2. urgency_level: low, medium, high, emergency (emergency = crisis requiring immediate attention)
3. complexity: simple, moderate, complex
4. emotional_tone: positive, neutral, negative, mixed

Return ONLY a JSON object:
{"content_type": "...", "urgency_level": "...", "complexity": "...", "emotional_tone": "..."}"#;

/// Classify `message`. Never fails: an unusable reply yields the default
/// `{statement, medium, moderate, neutral}`; unknown labels fall back per field.
pub async fn classify(ctx: &StageCtx<'_>, message: &str) -> ContentClassification {
    let Some(reply) = ctx.ask(STAGE, &compose(INSTRUCTIONS, &format!("Message: {message}"))).await
    else {
        return ContentClassification::default();
    };
    match json::parse_object(&reply) {
        Some(map) => {
            let label = |key: &str| json::str_field(&map, key).unwrap_or_default();
            ContentClassification {
                content_type: ContentType::from_label(&label("content_type")).unwrap_or_default(),
                urgency_level: UrgencyLevel::from_label(&label("urgency_level"))
                    .unwrap_or_default(),
                complexity: Complexity::from_label(&label("complexity")).unwrap_or_default(),
                emotional_tone: EmotionalTone::from_label(&label("emotional_tone"))
                    .unwrap_or_default(),
            }
        }
        None => {
            fallback(STAGE, "unparseable classification");
            ContentClassification::default()
        }
    }
}

pub async fn stage(state: &SessionState, ctx: &StageCtx<'_>) -> StateDelta {
    let classification = classify(ctx, state.last_user_message().unwrap_or_default()).await;
    TraceEvent::ContentClassified {
        content_type: classification.content_type.to_string(),
        urgency_level: classification.urgency_level.to_string(),
        emotional_tone: classification.emotional_tone.to_string(),
    }
    .emit();
    StateDelta {
        content_classification: Some(classification),
        ..StateDelta::default()
    }
}
