use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The named strategy a turn is dispatched to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    KnowledgeBase,
    CrisisResources,
    VideoResources,
    AcademicResearch,
    #[default]
    GeneralAdvice,
    MoodTracking,
    CbtExercise,
    SelfCare,
    Psychoeducation,
    TherapeuticStory,
    FollowUp,
    Motivational,
    ReflectiveListening,
    ResourceSharing,
}

impl Route {
    pub const ALL: [Route; 14] = [
        Route::KnowledgeBase,
        Route::CrisisResources,
        Route::VideoResources,
        Route::AcademicResearch,
        Route::GeneralAdvice,
        Route::MoodTracking,
        Route::CbtExercise,
        Route::SelfCare,
        Route::Psychoeducation,
        Route::TherapeuticStory,
        Route::FollowUp,
        Route::Motivational,
        Route::ReflectiveListening,
        Route::ResourceSharing,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Route::KnowledgeBase => "knowledge_base",
            Route::CrisisResources => "crisis_resources",
            Route::VideoResources => "video_resources",
            Route::AcademicResearch => "academic_research",
            Route::GeneralAdvice => "general_advice",
            Route::MoodTracking => "mood_tracking",
            Route::CbtExercise => "cbt_exercise",
            Route::SelfCare => "self_care",
            Route::Psychoeducation => "psychoeducation",
            Route::TherapeuticStory => "therapeutic_story",
            Route::FollowUp => "follow_up",
            Route::Motivational => "motivational",
            Route::ReflectiveListening => "reflective_listening",
            Route::ResourceSharing => "resource_sharing",
        }
    }

    /// Whether this route is served by a dedicated strategy handler
    /// rather than the tool path.
    pub fn is_specialized(self) -> bool {
        matches!(
            self,
            Route::CbtExercise
                | Route::SelfCare
                | Route::Psychoeducation
                | Route::TherapeuticStory
                | Route::ReflectiveListening
                | Route::Motivational
                | Route::ResourceSharing
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRoute(pub String);

impl fmt::Display for UnknownRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown route: {}", self.0)
    }
}

impl std::error::Error for UnknownRoute {}

impl FromStr for Route {
    type Err = UnknownRoute;

    /// Accepts the canonical name with surrounding whitespace, quotes,
    /// or a trailing period, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned = s
            .trim()
            .trim_matches(|c: char| c == '"' || c == '\'' || c == '`' || c == '.')
            .trim()
            .to_ascii_lowercase();
        Route::ALL
            .into_iter()
            .find(|r| r.as_str() == cleaned)
            .ok_or_else(|| UnknownRoute(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for route in Route::ALL {
            assert_eq!(route.as_str().parse::<Route>(), Ok(route));
        }
    }

    #[test]
    fn parse_tolerates_quotes_and_case() {
        assert_eq!(" \"Self_Care\". ".parse::<Route>(), Ok(Route::SelfCare));
        assert!("self care".parse::<Route>().is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Route::CbtExercise).unwrap();
        assert_eq!(json, "\"cbt_exercise\"");
    }

    #[test]
    fn specialized_routes() {
        let n = Route::ALL.iter().filter(|r| r.is_specialized()).count();
        assert_eq!(n, 7);
        assert!(!Route::MoodTracking.is_specialized());
        assert!(!Route::CrisisResources.is_specialized());
    }
}
