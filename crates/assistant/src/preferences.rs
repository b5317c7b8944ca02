//! Keyword-driven preference updates from the latest user message.

use mh_domain::state::{SessionState, StateDelta, UserPreferences};

const VIDEO_WORDS: &[&str] = &["video", "youtube", "watch"];
const BRIEF_WORDS: &[&str] = &["brief", "short", "quick"];
const RESOURCE_WORDS: &[&str] = &["resource", "article", "read"];
const DETAIL_WORDS: &[&str] = &["blog", "article", "write-up"];
const HIDE_REASONING: &[&str] = &["stop showing reasoning", "hide reasoning"];
const SHOW_REASONING: &[&str] = &["show reasoning", "explain reasoning"];

fn mentions(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

/// Preferences only ever switch on; nothing in a message clears them.
pub fn updated(prefs: &UserPreferences, message: &str) -> UserPreferences {
    let text = message.to_lowercase();
    let mut next = prefs.clone();
    next.likes_videos |= mentions(&text, VIDEO_WORDS);
    next.prefers_brief_responses |= mentions(&text, BRIEF_WORDS);
    next.wants_resources |= mentions(&text, RESOURCE_WORDS);
    next.prefers_detailed_content |= mentions(&text, DETAIL_WORDS);
    next
}

/// Explicit show/hide requests. "Show" wins when both appear.
pub fn reasoning_toggle(message: &str) -> Option<bool> {
    let text = message.to_lowercase();
    if mentions(&text, SHOW_REASONING) {
        Some(true)
    } else if mentions(&text, HIDE_REASONING) {
        Some(false)
    } else {
        None
    }
}

pub fn stage(state: &SessionState) -> StateDelta {
    let message = state.last_user_message().unwrap_or_default();
    let prefs = updated(&state.user_preferences, message);
    StateDelta {
        user_preferences: (prefs != state.user_preferences).then_some(prefs),
        reasoning_visible: reasoning_toggle(message),
        ..StateDelta::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mh_domain::message::Message;

    #[test]
    fn keywords_switch_flags_on() {
        let p = updated(&UserPreferences::default(), "Can you give me a SHORT video?");
        assert!(p.likes_videos);
        assert!(p.prefers_brief_responses);
        assert!(!p.prefers_detailed_content);

        let p = updated(&p, "write a blog about it");
        assert!(p.prefers_detailed_content);
        assert!(p.likes_videos);
    }

    #[test]
    fn reasoning_toggles() {
        assert_eq!(reasoning_toggle("please hide reasoning"), Some(false));
        assert_eq!(reasoning_toggle("Stop showing reasoning"), Some(false));
        assert_eq!(reasoning_toggle("show reasoning again"), Some(true));
        assert_eq!(reasoning_toggle("hello"), None);
    }

    #[test]
    fn unchanged_preferences_produce_no_update() {
        let mut state = SessionState::default();
        state.messages.push(Message::user("hi there"));
        let delta = stage(&state);
        assert!(delta.user_preferences.is_none());
        assert!(delta.reasoning_visible.is_none());
    }
}
