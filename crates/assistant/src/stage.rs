use parking_lot::Mutex;
use rand::rngs::StdRng;

use mh_domain::trace::TraceEvent;
use mh_providers::Oracle;
use mh_tools::ToolSet;

/// Collaborators shared by every stage of one turn.
pub struct StageCtx<'a> {
    pub oracle: &'a dyn Oracle,
    pub tools: &'a ToolSet,
    /// Persona placed at the head of the final reply prompt.
    pub system_prompt: &'a str,
    rng: &'a Mutex<StdRng>,
}

impl<'a> StageCtx<'a> {
    pub fn new(
        oracle: &'a dyn Oracle,
        tools: &'a ToolSet,
        system_prompt: &'a str,
        rng: &'a Mutex<StdRng>,
    ) -> Self {
        Self {
            oracle,
            tools,
            system_prompt,
            rng,
        }
    }

    /// Run `f` with the shared RNG. Never hold the result across an await.
    pub fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        f(&mut self.rng.lock())
    }

    /// One oracle call. Errors are logged as a fallback for `stage` and
    /// reported as `None`; the caller substitutes its fallback content.
    pub async fn ask(&self, stage: &str, prompt: &str) -> Option<String> {
        match self.oracle.complete(prompt).await {
            Ok(text) => Some(text),
            Err(e) => {
                fallback(stage, &e.to_string());
                None
            }
        }
    }
}

pub(crate) fn fallback(stage: &str, reason: &str) {
    TraceEvent::OracleFallback {
        stage: stage.to_string(),
        reason: reason.to_string(),
    }
    .emit();
}
