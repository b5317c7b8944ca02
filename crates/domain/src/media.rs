use serde::{Deserialize, Serialize};

/// Output of an external face or voice emotion classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaEmotion {
    #[serde(alias = "emotion")]
    pub label: String,
    #[serde(default, alias = "score")]
    pub confidence: f32,
}

/// Append detected media emotions to a user message as bracketed context.
///
/// Returns the message unchanged when neither classifier produced a label.
pub fn annotate_message(
    message: &str,
    face: Option<&MediaEmotion>,
    voice: Option<&MediaEmotion>,
) -> String {
    let face = face.map(|m| m.label.trim()).filter(|l| !l.is_empty());
    let voice = voice.map(|m| m.label.trim()).filter(|l| !l.is_empty());
    match (face, voice) {
        (Some(f), Some(v)) => {
            format!("{message} [Detected facial expression: {f}, voice tone: {v}]")
        }
        (Some(f), None) => format!("{message} [Detected facial expression: {f}]"),
        (None, Some(v)) => format!("{message} [Detected voice tone: {v}]"),
        (None, None) => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(label: &str) -> MediaEmotion {
        MediaEmotion {
            label: label.into(),
            confidence: 80.0,
        }
    }

    #[test]
    fn both_signals() {
        let out = annotate_message("hello", Some(&m("sad")), Some(&m("calm")));
        assert_eq!(out, "hello [Detected facial expression: sad, voice tone: calm]");
    }

    #[test]
    fn single_signal_and_blank_labels() {
        assert_eq!(
            annotate_message("hi", None, Some(&m("tense"))),
            "hi [Detected voice tone: tense]"
        );
        assert_eq!(annotate_message("hi", Some(&m("  ")), None), "hi");
    }

    #[test]
    fn accepts_classifier_field_names() {
        let e: MediaEmotion = serde_json::from_str(r#"{"emotion":"happy","score":0.9}"#).unwrap();
        assert_eq!(e.label, "happy");
        assert!((e.confidence - 0.9).abs() < 1e-6);
    }
}
