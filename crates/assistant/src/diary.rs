//! Mood analysis of a free-form diary entry.

use std::sync::OnceLock;

use regex::Regex;

use mh_providers::Oracle;
use mh_sessions::{DiaryEntry, MoodAnalysis};

use crate::stage::fallback;

const DEFAULT_MOOD: &str = "neutral";
const DEFAULT_ANALYSIS: &str = "Unable to determine specific mood patterns";
const ERROR_ANALYSIS: &str = "Error in mood analysis";
const DEFAULT_CONFIDENCE: f32 = 0.5;

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid regex"))
}

/// Diary text without rich-text markup.
pub fn plain_text(content: &str) -> String {
    let stripped = tag_re().replace_all(content, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn prompt(entry: &DiaryEntry) -> String {
    format!(
        "Analyze the mood and emotional state expressed in this diary entry.\n\n\
         Diary entry ({date}):\n{text}\n\n\
         Respond in exactly this format:\n\
         MOOD: [one word describing the primary mood]\n\
         ANALYSIS: [2-3 sentences about the emotional patterns you notice]\n\
         CONFIDENCE: [a number between 0 and 1]",
        date = entry.date,
        text = plain_text(&entry.content)
    )
}

/// Read `MOOD:` / `ANALYSIS:` / `CONFIDENCE:` lines. Missing or malformed
/// fields keep their defaults.
pub fn parse_mood_analysis(reply: &str) -> MoodAnalysis {
    let mut out = MoodAnalysis {
        mood: DEFAULT_MOOD.into(),
        analysis: DEFAULT_ANALYSIS.into(),
        confidence: DEFAULT_CONFIDENCE,
    };
    for line in reply.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.trim().to_ascii_uppercase().as_str() {
            "MOOD" => out.mood = value.to_lowercase(),
            "ANALYSIS" => out.analysis = value.to_string(),
            "CONFIDENCE" => {
                if let Ok(c) = value.parse::<f32>() {
                    out.confidence = c.clamp(0.0, 1.0);
                }
            }
            _ => {}
        }
    }
    out
}

pub async fn analyze_diary(oracle: &dyn Oracle, entry: &DiaryEntry) -> MoodAnalysis {
    match oracle.complete(&prompt(entry)).await {
        Ok(reply) => parse_mood_analysis(&reply),
        Err(e) => {
            tracing::warn!(user_id = %entry.user_id, error = %e, "diary analysis failed");
            fallback("diary_analysis", &e.to_string());
            MoodAnalysis {
                mood: DEFAULT_MOOD.into(),
                analysis: ERROR_ANALYSIS.into(),
                confidence: DEFAULT_CONFIDENCE,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mh_providers::NullOracle;

    fn entry(content: &str) -> DiaryEntry {
        DiaryEntry {
            content: content.into(),
            date: "2024-05-01".into(),
            user_id: "u1".into(),
        }
    }

    #[test]
    fn parses_all_fields() {
        let a = parse_mood_analysis(
            "MOOD: Hopeful\nANALYSIS: The writer sounds optimistic about work.\nCONFIDENCE: 0.8",
        );
        assert_eq!(a.mood, "hopeful");
        assert_eq!(a.analysis, "The writer sounds optimistic about work.");
        assert!((a.confidence - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn missing_fields_keep_defaults() {
        let a = parse_mood_analysis("MOOD: tired\nCONFIDENCE: very");
        assert_eq!(a.mood, "tired");
        assert_eq!(a.analysis, DEFAULT_ANALYSIS);
        assert_eq!(a.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn strips_markup() {
        assert_eq!(plain_text("<p>Long <b>day</b></p>\n<br/>ok"), "Long day ok");
        assert!(prompt(&entry("<p>hi</p>")).contains("\nhi\n"));
    }

    #[tokio::test]
    async fn failing_oracle_reports_error_analysis() {
        let a = analyze_diary(&NullOracle, &entry("today")).await;
        assert_eq!(a.mood, "neutral");
        assert_eq!(a.analysis, ERROR_ANALYSIS);
    }
}
