use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;

use mh_domain::config::AssistantConfig;
use mh_domain::message::{Message, Role};
use mh_domain::route::Route;
use mh_domain::state::{SessionState, StateDelta};
use mh_domain::trace::TraceEvent;
use mh_providers::Oracle;
use mh_tools::ToolSet;

use crate::handlers::{cbt, conversational, mood, psychoeducation, resources, self_care, story};
use crate::prompts::SYSTEM_PROMPT;
use crate::stage::StageCtx;
use crate::{assembler, classifier, crisis, emotion, preferences, router, strategy, tools};

/// Result of one processed turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub state: SessionState,
    /// Every assistant fragment of this turn, joined by blank lines.
    pub final_message: String,
    /// Messages appended this turn, starting with the user message.
    pub turn_messages: Vec<Message>,
}

impl TurnOutcome {
    pub fn into_parts(self) -> (SessionState, String) {
        (self.state, self.final_message)
    }
}

/// Where a turn goes after the crisis check.
enum Next {
    Handler(&'static str),
    Mood,
    Tools,
}

fn next_after_crisis(route: Route) -> Next {
    match route {
        Route::CbtExercise => Next::Handler("cbt_exercise"),
        Route::SelfCare => Next::Handler("self_care"),
        Route::Psychoeducation => Next::Handler("psychoeducation"),
        Route::TherapeuticStory => Next::Handler("therapeutic_story"),
        Route::ReflectiveListening => Next::Handler("reflective_listening"),
        Route::Motivational => Next::Handler("motivational"),
        Route::ResourceSharing => Next::Handler("resource_sharing"),
        Route::MoodTracking => Next::Mood,
        Route::KnowledgeBase
        | Route::CrisisResources
        | Route::VideoResources
        | Route::AcademicResearch
        | Route::GeneralAdvice
        | Route::FollowUp => Next::Tools,
    }
}

/// The turn pipeline with its collaborators.
pub struct Assistant {
    oracle: Arc<dyn Oracle>,
    tools: ToolSet,
    config: AssistantConfig,
    rng: Mutex<StdRng>,
}

impl Assistant {
    pub fn new(oracle: Arc<dyn Oracle>, tools: ToolSet, config: AssistantConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            oracle,
            tools,
            config,
            rng: Mutex::new(rng),
        }
    }

    pub fn system_prompt(&self) -> &str {
        self.config.system_prompt.as_deref().unwrap_or(SYSTEM_PROMPT)
    }

    pub fn new_session(&self) -> SessionState {
        SessionState::new(self.system_prompt(), self.config.reasoning_default)
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    fn merge(&self, state: &mut SessionState, delta: StateDelta) {
        state.apply_with_mood_cap(delta, self.config.mood_history_cap);
    }

    /// Process one user message against the prior session state, or a
    /// fresh session when there is none. Never fails: every oracle or tool
    /// failure is replaced by its fallback content.
    pub async fn process_turn(&self, message: &str, prior: Option<SessionState>) -> TurnOutcome {
        let started = Instant::now();
        TraceEvent::TurnStarted {
            new_session: prior.is_none(),
            message_chars: message.chars().count(),
        }
        .emit();

        let mut state = prior.unwrap_or_else(|| self.new_session());
        state.begin_turn();
        let turn_start = state.messages.len();
        state.messages.push(Message::user(message));

        let ctx = StageCtx::new(
            self.oracle.as_ref(),
            &self.tools,
            self.system_prompt(),
            &self.rng,
        );

        let delta = preferences::stage(&state);
        self.merge(&mut state, delta);
        let delta = classifier::stage(&state, &ctx).await;
        self.merge(&mut state, delta);
        let delta = router::stage(&state, &ctx).await;
        self.merge(&mut state, delta);
        let delta = emotion::stage(&state, &ctx).await;
        self.merge(&mut state, delta);
        let delta = strategy::stage(&state, &ctx).await;
        self.merge(&mut state, delta);
        let delta = crisis::stage(&state);
        self.merge(&mut state, delta);

        match next_after_crisis(state.query_route) {
            Next::Handler(name) => {
                let delta = self.run_handler(state.query_route, &state, &ctx).await;
                handler_completed(name, &delta);
                self.merge(&mut state, delta);
            }
            Next::Mood => {
                let delta = mood::handle(&state, &ctx).await;
                handler_completed("mood_tracking", &delta);
                self.merge(&mut state, delta);
                self.tool_path(&mut state, &ctx).await;
            }
            Next::Tools => self.tool_path(&mut state, &ctx).await,
        }

        let delta = assembler::generate_response(&state, &ctx).await;
        self.merge(&mut state, delta);

        let turn_messages = state.messages[turn_start..].to_vec();
        let final_message = turn_messages
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        TraceEvent::TurnCompleted {
            route: state.query_route.to_string(),
            reply_chars: final_message.chars().count(),
            duration_ms: started.elapsed().as_millis() as u64,
        }
        .emit();

        TurnOutcome {
            state,
            final_message,
            turn_messages,
        }
    }

    async fn run_handler(&self, route: Route, state: &SessionState, ctx: &StageCtx<'_>) -> StateDelta {
        match route {
            Route::CbtExercise => cbt::handle(state, ctx).await,
            Route::SelfCare => self_care::handle(state, ctx).await,
            Route::Psychoeducation => psychoeducation::handle(state, ctx).await,
            Route::TherapeuticStory => story::handle(state, ctx).await,
            Route::ReflectiveListening => conversational::reflective_listening(state, ctx).await,
            Route::Motivational => conversational::motivational(state, ctx).await,
            Route::ResourceSharing => resources::handle(state, ctx).await,
            Route::MoodTracking
            | Route::KnowledgeBase
            | Route::CrisisResources
            | Route::VideoResources
            | Route::AcademicResearch
            | Route::GeneralAdvice
            | Route::FollowUp => StateDelta::new(),
        }
    }

    async fn tool_path(&self, state: &mut SessionState, ctx: &StageCtx<'_>) {
        let delta = tools::explain(state);
        self.merge(state, delta);

        let wants_tools = state
            .response_strategy
            .as_ref()
            .is_some_and(|s| !s.appropriate_tools.is_empty());
        if wants_tools {
            let delta = tools::use_tools(state, ctx).await;
            self.merge(state, delta);
        }
    }
}

fn handler_completed(handler: &str, delta: &StateDelta) {
    TraceEvent::HandlerCompleted {
        handler: handler.to_string(),
        messages: delta.messages.len(),
    }
    .emit();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_specialized_route_has_a_handler() {
        for route in Route::ALL {
            let handled = matches!(next_after_crisis(route), Next::Handler(_));
            assert_eq!(handled, route.is_specialized(), "{route}");
        }
    }

    #[test]
    fn handler_names_match_routes() {
        for route in Route::ALL {
            if let Next::Handler(name) = next_after_crisis(route) {
                assert_eq!(name, route.as_str());
            }
        }
    }

    #[test]
    fn mood_tracking_goes_through_the_tool_path() {
        assert!(matches!(next_after_crisis(Route::MoodTracking), Next::Mood));
        assert!(matches!(next_after_crisis(Route::CrisisResources), Next::Tools));
    }
}
