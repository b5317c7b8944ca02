//! Reflective listening and motivational replies. One oracle call each.

use mh_domain::message::Message;
use mh_domain::state::{SessionState, StateDelta};

use crate::prompts::compose;
use crate::stage::StageCtx;

const REFLECTIVE: &str = "\
You are a mental health assistant skilled in reflective listening.

Create a response that:
1. Mirrors back the person's feelings with validation
2. Shows you understand their experience
3. Acknowledges the difficulty or importance of what they've shared
4. Offers gentle support without pushing advice
5. Ends with a small opening for them to share more if they wish

Keep your response concise, warm, and focused on their feelings.";

const MOTIVATIONAL: &str = "\
You are a compassionate mental health assistant skilled in motivation.

Create an encouraging response that:
1. Acknowledges the person's current feelings
2. Validates their effort or courage in seeking support
3. Offers specific encouragement related to their situation
4. Provides a small, achievable step they might consider
5. Emphasizes their existing strengths or resources

Keep your response warm, genuine, and focused on hope without dismissing difficulties.";

fn input(message: &str, emotion: &str, ask: &str) -> String {
    format!(
        "The person shared: \"{message}\"\n\nTheir primary emotion appears to be: {emotion}\n\n{ask}"
    )
}

pub fn reflective_fallback(emotion: &str) -> String {
    format!(
        "It sounds like you're feeling {emotion} right now, and that makes sense given what you're carrying. \
         Thank you for sharing this with me. I'm here to listen whenever you'd like to say more."
    )
}

pub fn motivational_fallback(emotion: &str) -> String {
    format!(
        "Even while feeling {emotion}, reaching out like this takes real courage. \
         You've already taken a meaningful step today. What is one small thing you could do next that feels manageable?"
    )
}

pub async fn reflective_listening(state: &SessionState, ctx: &StageCtx<'_>) -> StateDelta {
    let emotion = state.primary_emotion();
    let message = state.last_user_message().unwrap_or_default();
    let reply = ctx
        .ask(
            "reflective_listening",
            &compose(REFLECTIVE, &input(message, emotion, "Create a reflective listening response:")),
        )
        .await
        .unwrap_or_else(|| reflective_fallback(emotion));

    let mut delta = StateDelta::new();
    delta.trace_if(
        state.reasoning_visible,
        "💭 **Using Reflective Listening**\n\n\
         In this moment, what seems most helpful is to validate what you're feeling and show I understand.\n\n\
         I'll focus on mirroring back what I hear, without rushing to solutions or advice.",
    );
    delta.push(Message::assistant(reply));
    delta
}

pub async fn motivational(state: &SessionState, ctx: &StageCtx<'_>) -> StateDelta {
    let emotion = state.primary_emotion();
    let message = state.last_user_message().unwrap_or_default();
    let reply = ctx
        .ask(
            "motivational",
            &compose(MOTIVATIONAL, &input(message, emotion, "Create a motivational response:")),
        )
        .await
        .unwrap_or_else(|| motivational_fallback(emotion));

    let mut delta = StateDelta::new();
    delta.trace_if(
        state.reasoning_visible,
        "💭 **Creating Motivational Support**\n\n\
         I'll focus on acknowledging your feelings while highlighting your strengths, \
         offering gentle encouragement without minimizing challenges.",
    );
    delta.push(Message::assistant(reply));
    delta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallbacks_name_the_emotion() {
        assert!(reflective_fallback("lonely").contains("feeling lonely"));
        assert!(motivational_fallback("stuck").contains("feeling stuck"));
    }
}
