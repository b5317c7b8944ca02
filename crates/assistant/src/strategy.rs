//! Plans the approach, talking points and tool hints for the reply.

use mh_domain::emotion::{EmotionAnalysis, ResponseStrategy};
use mh_domain::state::{SessionState, StateDelta};
use mh_domain::trace::TraceEvent;

use crate::json;
use crate::prompts::compose;
use crate::stage::{fallback, StageCtx};

const STAGE: &str = "determine_strategy";

const INSTRUCTIONS: &str = r#"You are a mental health professional deciding how to respond to someone.

Based on the emotional analysis and message context, determine the best response strategy.

Return a JSON object with the following structure:
{
    "approach": "emotional approach to take (empathize, validate, encourage, educate, etc)",
    "key_points": ["specific point to address", "another point to address"],
    "appropriate_tools": ["any tools that would help like 'mental_health_info', 'web_search', 'wikipedia', 'youtube_videos', 'arxiv'"],
    "reasoning": "your step-by-step reasoning process"
}

Return ONLY the valid JSON object without any other text."#;

pub fn parse_strategy(reply: &str) -> Option<ResponseStrategy> {
    let map = json::parse_object(reply)?;
    let defaults = ResponseStrategy::default();
    Some(ResponseStrategy {
        approach: json::str_field(&map, "approach").unwrap_or(defaults.approach),
        key_points: json::list_field(&map, "key_points").unwrap_or(defaults.key_points),
        appropriate_tools: json::list_field(&map, "appropriate_tools").unwrap_or_default(),
        reasoning: json::str_field(&map, "reasoning").unwrap_or(defaults.reasoning),
    })
}

pub async fn determine(
    ctx: &StageCtx<'_>,
    message: &str,
    analysis: &EmotionAnalysis,
) -> ResponseStrategy {
    let input = format!(
        "User message: {message}\n\nEmotional analysis:\n- Primary emotion: {}\n- Crisis level: {}\n\nWhat would be the best response strategy?",
        analysis.primary_emotion, analysis.crisis_level
    );
    let Some(reply) = ctx.ask(STAGE, &compose(INSTRUCTIONS, &input)).await else {
        return ResponseStrategy::default();
    };
    parse_strategy(&reply).unwrap_or_else(|| {
        fallback(STAGE, "unparseable strategy");
        ResponseStrategy::default()
    })
}

pub async fn stage(state: &SessionState, ctx: &StageCtx<'_>) -> StateDelta {
    let analysis = state.emotion_analysis.clone().unwrap_or_default();
    let strategy = determine(ctx, state.last_user_message().unwrap_or_default(), &analysis).await;
    TraceEvent::StrategyDetermined {
        approach: strategy.approach.clone(),
        tools: strategy.appropriate_tools.clone(),
    }
    .emit();

    let mut delta = StateDelta::new();
    delta.trace_if(
        state.reasoning_visible,
        format!(
            "💭 **Continuing My Thought Process**\n\n\
             Given that you're feeling **{}**, I think the most helpful approach would be **{}**.\n\n\
             I should focus on:\n{}\n\n{}\n\n\
             Let me gather any information that might help...",
            analysis.primary_emotion,
            strategy.approach,
            strategy.key_points.join(", "),
            strategy.reasoning
        ),
    );
    delta.response_strategy = Some(strategy);
    delta
}
