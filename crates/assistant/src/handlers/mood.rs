//! Mood tracking: records the turn's emotion and surfaces simple patterns.

use std::collections::HashMap;

use chrono::Utc;

use mh_domain::message::Message;
use mh_domain::state::{MoodEntry, SessionState, StateDelta};

use crate::prompts::compose;
use crate::stage::StageCtx;

const CHECKIN_WORDS: &[&str] = &["feeling", "mood", "today", "doing", "am i", "how are you"];
const PATTERN_WORDS: &[&str] = &["pattern", "history", "trends", "tracking", "journal"];
const RECENT_WINDOW: usize = 5;

pub fn is_checkin(message: &str) -> bool {
    let lower = message.to_lowercase();
    CHECKIN_WORDS.iter().any(|w| lower.contains(w))
}

pub fn asks_about_patterns(message: &str) -> bool {
    let lower = message.to_lowercase();
    PATTERN_WORDS.iter().any(|w| lower.contains(w))
}

/// Most common emotion over the last five entries, with its count.
/// Ties go to the emotion seen first in that window.
pub fn recent_dominant(history: &[MoodEntry]) -> Option<(String, usize)> {
    let window = &history[history.len().saturating_sub(RECENT_WINDOW)..];
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for entry in window {
        let count = counts.entry(entry.emotion.as_str()).or_insert(0);
        if *count == 0 {
            order.push(entry.emotion.as_str());
        }
        *count += 1;
    }
    order
        .into_iter()
        .map(|e| (e, counts[e]))
        .fold(None, |best: Option<(&str, usize)>, (e, n)| match best {
            Some((_, m)) if m >= n => best,
            _ => Some((e, n)),
        })
        .map(|(e, n)| (e.to_string(), n))
}

pub fn insight_message(emotion: &str, count: usize) -> String {
    format!(
        "💭 **Mood Tracking Insight**\n\n\
         I've noticed that you've mentioned feeling **{emotion}** {count} times recently.\n\n\
         Would you like to explore what might be contributing to this feeling?"
    )
}

fn history_summary(history: &[MoodEntry]) -> String {
    history
        .iter()
        .rev()
        .take(10)
        .map(|m| {
            format!(
                "- {} | {} ({}) | {}",
                m.timestamp.format("%Y-%m-%d %H:%M"),
                m.emotion,
                m.intensity,
                m.context
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn handle(state: &SessionState, ctx: &StageCtx<'_>) -> StateDelta {
    let message = state.last_user_message().unwrap_or_default();
    let checkin = is_checkin(message);
    let analysis = state.emotion_analysis.clone().unwrap_or_default();

    let entry = MoodEntry {
        timestamp: Utc::now(),
        emotion: analysis.primary_emotion.clone(),
        intensity: analysis.crisis_level,
        context: message.chars().take(100).collect(),
        is_checkin: checkin,
    };

    // History as it will look after this entry is merged.
    let mut history = state.mood_history.clone();
    history.push(entry.clone());

    let mut delta = StateDelta::new();
    if checkin && history.len() >= 3 {
        if let Some((emotion, count)) = recent_dominant(&history) {
            if count >= 2 {
                delta.push(Message::assistant(insight_message(&emotion, count)));
            }
        }
    }

    if asks_about_patterns(message) && history.len() > 3 {
        let prompt = compose(
            "You are analyzing mood tracking data to provide helpful insights. \
             Format your response as bullet points with 2-3 observations and a gentle question to explore further.",
            &format!("Mood history (most recent first):\n{}", history_summary(&history)),
        );
        if let Some(insight) = ctx.ask("mood_insights", &prompt).await {
            delta.push(Message::assistant(format!(
                "💭 **Analyzing Your Mood Patterns**\n\nLooking at your recent mood entries, I notice:\n\n{insight}"
            )));
        }
    }

    delta.mood_entry = Some(entry);
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use mh_domain::emotion::CrisisLevel;

    fn entry(emotion: &str) -> MoodEntry {
        MoodEntry {
            timestamp: Utc::now(),
            emotion: emotion.into(),
            intensity: CrisisLevel::Low,
            context: String::new(),
            is_checkin: true,
        }
    }

    #[test]
    fn checkin_indicators() {
        assert!(is_checkin("How am I doing?"));
        assert!(is_checkin("my mood is low"));
        assert!(!is_checkin("tell me about CBT"));
    }

    #[test]
    fn dominant_over_last_five() {
        let history: Vec<_> = ["happy", "happy", "happy", "sad", "sad", "calm", "sad"]
            .into_iter()
            .map(entry)
            .collect();
        assert_eq!(recent_dominant(&history), Some(("sad".into(), 3)));
    }

    #[test]
    fn ties_go_to_first_seen() {
        let history: Vec<_> = ["calm", "sad", "calm", "sad"].into_iter().map(entry).collect();
        assert_eq!(recent_dominant(&history), Some(("calm".into(), 2)));
        assert_eq!(recent_dominant(&[]), None);
    }

    #[test]
    fn insight_wording() {
        assert!(insight_message("sad", 4)
            .contains("I've noticed that you've mentioned feeling **sad** 4 times recently."));
    }
}
