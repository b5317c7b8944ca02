//! Emotion and crisis assessment for the current message.

use mh_domain::emotion::{CrisisLevel, EmotionAnalysis};
use mh_domain::state::{SessionState, StateDelta};
use mh_domain::trace::TraceEvent;

use crate::json;
use crate::prompts::compose;
use crate::stage::{fallback, StageCtx};

const STAGE: &str = "analyze_emotion";

const INSTRUCTIONS: &str = r#"You are a mental health professional who analyzes emotional content.

Analyze the message and provide a structured assessment in the following JSON format:
{
    "primary_emotion": "one of [happy, sad, angry, anxious, neutral, hopeful, fearful, confused]",
    "emotion_justification": "why you believe this is the primary emotion",
    "crisis_level": "one of [low, medium, high, very_high]",
    "crisis_justification": "why you assessed this crisis level",
    "needs_immediate_resources": true/false,
    "reasoning": "your step-by-step reasoning process"
}

Return ONLY the valid JSON object without any other text."#;

/// Parse an oracle reply into an analysis. Missing fields take their
/// default; `needs_immediate_resources` is forced on for high crisis levels.
pub fn parse_analysis(reply: &str) -> Option<EmotionAnalysis> {
    let map = json::parse_object(reply)?;
    let defaults = EmotionAnalysis::default();
    let crisis_level = json::str_field(&map, "crisis_level")
        .and_then(|l| CrisisLevel::from_label(&l))
        .unwrap_or(defaults.crisis_level);
    let needs = json::bool_field(&map, "needs_immediate_resources").unwrap_or(false);
    Some(EmotionAnalysis {
        primary_emotion: json::str_field(&map, "primary_emotion")
            .unwrap_or(defaults.primary_emotion),
        emotion_justification: json::str_field(&map, "emotion_justification")
            .unwrap_or(defaults.emotion_justification),
        crisis_level,
        crisis_justification: json::str_field(&map, "crisis_justification")
            .unwrap_or(defaults.crisis_justification),
        needs_immediate_resources: needs || crisis_level.requires_resources(),
        reasoning: json::str_field(&map, "reasoning").unwrap_or(defaults.reasoning),
    })
}

pub async fn analyze(ctx: &StageCtx<'_>, message: &str) -> EmotionAnalysis {
    let prompt = compose(INSTRUCTIONS, &format!("Message to analyze: {message}"));
    let Some(reply) = ctx.ask(STAGE, &prompt).await else {
        return EmotionAnalysis::default();
    };
    parse_analysis(&reply).unwrap_or_else(|| {
        fallback(STAGE, "unparseable emotion analysis");
        EmotionAnalysis::default()
    })
}

fn reasoning_trace(a: &EmotionAnalysis) -> String {
    format!(
        "💭 **Live Thinking Process**\n\n\
         Let me think about what you've shared...\n\n\
         Looking at how you've expressed yourself, I sense that your primary emotion is **{}**.\n\n\
         I'm noticing this because: {}\n\n\
         Considering the overall context and intensity of your message, I would assess this as a **{}** level situation.\n\n\
         {}\n\n\
         Now, let me think about how best to respond...",
        a.primary_emotion, a.emotion_justification, a.crisis_level, a.reasoning
    )
}

pub async fn stage(state: &SessionState, ctx: &StageCtx<'_>) -> StateDelta {
    let analysis = analyze(ctx, state.last_user_message().unwrap_or_default()).await;
    TraceEvent::EmotionAnalyzed {
        primary_emotion: analysis.primary_emotion.clone(),
        crisis_level: analysis.crisis_level.to_string(),
        immediate_resources_needed: analysis.requires_immediate_resources(),
    }
    .emit();

    let mut delta = StateDelta::new();
    delta.trace_if(state.reasoning_visible, reasoning_trace(&analysis));
    delta.emotion_analysis = Some(analysis);
    delta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_crisis_forces_resources() {
        let a = parse_analysis(
            r#"{"primary_emotion":"sad","crisis_level":"high","needs_immediate_resources":false}"#,
        )
        .unwrap();
        assert!(a.needs_immediate_resources);
        assert_eq!(a.crisis_level, CrisisLevel::High);

        let a = parse_analysis(r#"{"crisis_level":"very high"}"#).unwrap();
        assert!(a.needs_immediate_resources);
    }

    #[test]
    fn explicit_flag_kept_at_low_level() {
        let a = parse_analysis(r#"{"crisis_level":"low","needs_immediate_resources":true}"#)
            .unwrap();
        assert!(a.needs_immediate_resources);
        let a = parse_analysis(r#"{"crisis_level":"medium"}"#).unwrap();
        assert!(!a.needs_immediate_resources);
    }

    #[test]
    fn partial_reply_fills_defaults() {
        let a = parse_analysis("```json\n{\"primary_emotion\": \"anxious\"}\n```").unwrap();
        assert_eq!(a.primary_emotion, "anxious");
        assert_eq!(a.crisis_level, CrisisLevel::Low);
        assert_eq!(a.reasoning, EmotionAnalysis::default().reasoning);
    }

    #[test]
    fn non_json_is_none() {
        assert!(parse_analysis("I think they are sad.").is_none());
    }
}
