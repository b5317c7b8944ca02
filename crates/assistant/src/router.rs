//! Picks the strategy route for a classified message.

use std::fmt;

use mh_domain::classification::{ContentClassification, ContentType, EmotionalTone, UrgencyLevel};
use mh_domain::route::Route;
use mh_domain::state::{SessionState, StateDelta};
use mh_domain::trace::TraceEvent;

use crate::json;
use crate::prompts::compose;
use crate::stage::{fallback, StageCtx};

const STAGE: &str = "route_query";

const INSTRUCTIONS: &str = "\
You are an expert at routing mental health queries to the most appropriate resources.

Options (choose ONE that best fits):
- knowledge_base: For factual questions about mental health topics
- crisis_resources: For urgent situations where someone needs immediate help
- video_resources: For requests for video content or visual learning
- academic_research: For in-depth or research-based information
- mood_tracking: For questions about tracking emotions or mood patterns
- cbt_exercise: For requests about cognitive behavioral therapy techniques
- self_care: For advice on personal well-being activities
- psychoeducation: For educational content about mental health concepts
- therapeutic_story: For requests about stories, metaphors, or narrative approaches to healing
- follow_up: For messages that refer to or follow up on previous conversations
- motivational: For when the user needs encouragement or motivation
- reflective_listening: For when the user mainly shares feelings without asking a specific question
- resource_sharing: For when the user specifically asks for resources, tools, or materials
- general_advice: For general mental health advice that doesn't fit the above categories

Route to crisis_resources for any message suggesting harm to self or others.

Answer with the route name only.";

/// Where a routing decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteSource {
    /// Fixed rule on the classification; the oracle was not consulted.
    Override,
    Oracle,
    Fallback,
}

impl RouteSource {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteSource::Override => "override",
            RouteSource::Oracle => "oracle",
            RouteSource::Fallback => "fallback",
        }
    }
}

impl fmt::Display for RouteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rules that decide the route without asking the oracle.
pub fn override_route(c: &ContentClassification) -> Option<Route> {
    if c.urgency_level == UrgencyLevel::Emergency {
        return Some(Route::CrisisResources);
    }
    match c.content_type {
        ContentType::Greeting => Some(Route::GeneralAdvice),
        ContentType::Gratitude => Some(Route::ReflectiveListening),
        _ => None,
    }
}

/// Total table used when the oracle fails or answers outside the route set.
pub fn fallback_route(c: &ContentClassification) -> Route {
    match (c.content_type, c.emotional_tone) {
        (ContentType::EmotionalExpression, EmotionalTone::Negative) => Route::ReflectiveListening,
        (ContentType::SharingExperience, _) => Route::TherapeuticStory,
        (ContentType::RequestForHelp, _) => Route::SelfCare,
        (ContentType::Question, _) => Route::KnowledgeBase,
        _ => Route::GeneralAdvice,
    }
}

/// Read a route name out of an oracle reply: the bare name, a JSON object
/// with `route_to`/`route`, or the first line.
pub fn parse_route(reply: &str) -> Option<Route> {
    if let Ok(route) = reply.parse() {
        return Some(route);
    }
    if let Some(map) = json::parse_object(reply) {
        return json::str_field(&map, "route_to")
            .or_else(|| json::str_field(&map, "route"))
            .and_then(|r| r.parse().ok());
    }
    reply.lines().next().and_then(|l| l.parse().ok())
}

pub async fn route(
    ctx: &StageCtx<'_>,
    classification: &ContentClassification,
    message: &str,
) -> (Route, RouteSource) {
    if let Some(route) = override_route(classification) {
        return (route, RouteSource::Override);
    }

    let query = format!(
        "{message}\n\nClassification context: {} with {} tone.",
        classification.content_type, classification.emotional_tone
    );
    let Some(reply) = ctx.ask(STAGE, &compose(INSTRUCTIONS, &query)).await else {
        return (fallback_route(classification), RouteSource::Fallback);
    };
    match parse_route(&reply) {
        Some(route) => (route, RouteSource::Oracle),
        None => {
            fallback(STAGE, "unknown route in reply");
            (fallback_route(classification), RouteSource::Fallback)
        }
    }
}

pub async fn stage(state: &SessionState, ctx: &StageCtx<'_>) -> StateDelta {
    let classification = state.content_classification.unwrap_or_default();
    let (route, source) =
        route(ctx, &classification, state.last_user_message().unwrap_or_default()).await;
    TraceEvent::RouteSelected {
        route: route.to_string(),
        source: source.to_string(),
    }
    .emit();
    StateDelta {
        query_route: Some(route),
        ..StateDelta::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mh_domain::classification::Complexity;

    fn class(ct: ContentType, urgency: UrgencyLevel, tone: EmotionalTone) -> ContentClassification {
        ContentClassification {
            content_type: ct,
            urgency_level: urgency,
            complexity: Complexity::Simple,
            emotional_tone: tone,
        }
    }

    #[test]
    fn emergency_beats_everything() {
        let c = class(ContentType::Greeting, UrgencyLevel::Emergency, EmotionalTone::Positive);
        assert_eq!(override_route(&c), Some(Route::CrisisResources));
    }

    #[test]
    fn greeting_and_gratitude_overrides() {
        let g = class(ContentType::Greeting, UrgencyLevel::Low, EmotionalTone::Neutral);
        assert_eq!(override_route(&g), Some(Route::GeneralAdvice));
        let t = class(ContentType::Gratitude, UrgencyLevel::Low, EmotionalTone::Positive);
        assert_eq!(override_route(&t), Some(Route::ReflectiveListening));
        let q = class(ContentType::Question, UrgencyLevel::High, EmotionalTone::Neutral);
        assert_eq!(override_route(&q), None);
    }

    #[test]
    fn fallback_table() {
        let cases = [
            (ContentType::EmotionalExpression, EmotionalTone::Negative, Route::ReflectiveListening),
            (ContentType::EmotionalExpression, EmotionalTone::Mixed, Route::GeneralAdvice),
            (ContentType::SharingExperience, EmotionalTone::Positive, Route::TherapeuticStory),
            (ContentType::RequestForHelp, EmotionalTone::Neutral, Route::SelfCare),
            (ContentType::Question, EmotionalTone::Neutral, Route::KnowledgeBase),
            (ContentType::Statement, EmotionalTone::Negative, Route::GeneralAdvice),
            (ContentType::FollowUp, EmotionalTone::Neutral, Route::GeneralAdvice),
        ];
        for (ct, tone, want) in cases {
            assert_eq!(fallback_route(&class(ct, UrgencyLevel::Medium, tone)), want);
        }
    }

    #[test]
    fn parses_route_replies() {
        assert_eq!(parse_route("cbt_exercise"), Some(Route::CbtExercise));
        assert_eq!(parse_route("`self_care`."), Some(Route::SelfCare));
        assert_eq!(
            parse_route(r#"{"route_to": "mood_tracking"}"#),
            Some(Route::MoodTracking)
        );
        assert_eq!(parse_route("psychoeducation\nBecause..."), Some(Route::Psychoeducation));
        assert_eq!(parse_route("astrology"), None);
    }
}
