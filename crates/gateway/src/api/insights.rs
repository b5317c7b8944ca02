//! `GET /v1/emotion-insights/:kind/:emotion`: fixed notes on a face or
//! voice emotion reading, with recommendations for the Bangladesh context.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use super::error_response;

#[derive(Debug, Clone, Serialize)]
pub struct EmotionInsight {
    #[serde(skip)]
    pub emotion: &'static str,
    pub description: &'static str,
    pub connection: &'static str,
    pub recommendations: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_resources: Option<&'static str>,
}

pub const FACE_INSIGHTS: &[EmotionInsight] = &[
    EmotionInsight {
        emotion: "happy",
        description: "Happiness can be a sign of good mental wellbeing, but sometimes it may mask underlying issues.",
        connection: "In Bangladesh, expressing happiness openly is culturally encouraged in many situations, but it's also important to acknowledge all emotions.",
        recommendations: &[
            "Take time to appreciate positive moments",
            "Consider writing down what's making you happy to revisit during challenging times",
            "Check if your happiness feels genuine or if you're suppressing other feelings",
        ],
        local_resources: Some("Community gatherings and family events can be good support systems to maintain positive emotions."),
    },
    EmotionInsight {
        emotion: "sad",
        description: "Sadness is a natural emotion and can indicate grief, loss, or depression if persistent.",
        connection: "In Bangladesh, sadness may sometimes be internalized due to cultural expectations of emotional resilience, especially in rural areas.",
        recommendations: &[
            "Allow yourself to experience sadness without judgment",
            "Consider speaking with a trusted elder or family member",
            "Engage in community or religious activities that provide comfort",
            "If sadness persists for more than two weeks, consider speaking with a mental health professional",
        ],
        local_resources: Some("Kaan Pete Roi's emotional support line provides confidential support in Bangla."),
    },
    EmotionInsight {
        emotion: "angry",
        description: "Anger can be a response to perceived injustice, frustration, or unmet needs.",
        connection: "In Bangladeshi culture, managing anger appropriately is highly valued, but suppressed anger can lead to mental health challenges.",
        recommendations: &[
            "Practice deep breathing for 5 minutes",
            "Write down what triggered your anger",
            "Consider cultural practices like taking a short walk or reciting calming prayers",
            "Find a private space to express frustration safely",
        ],
        local_resources: Some("Local community mediators (such as village elders) can sometimes help resolve interpersonal conflicts."),
    },
    EmotionInsight {
        emotion: "fear",
        description: "Fear is a protective emotion but can develop into anxiety disorders if persistent.",
        connection: "In Bangladesh, fears related to natural disasters, economic insecurity, or social judgment are common stressors.",
        recommendations: &[
            "Practice grounding techniques using the 5-4-3-2-1 method",
            "Talk about your fears with someone you trust",
            "Consider how realistic your fears are and what evidence supports or contradicts them",
            "Gradually face minor fears in a controlled way",
        ],
        local_resources: Some("The National Institute of Mental Health (NIMH) in Bangladesh provides services for anxiety disorders."),
    },
    EmotionInsight {
        emotion: "surprise",
        description: "Surprise indicates something unexpected and can trigger stress responses if startling.",
        connection: "In fast-changing Bangladeshi urban environments, constant surprises can sometimes contribute to adjustment stress.",
        recommendations: &[
            "Take a moment to process unexpected information",
            "Consider if the surprise has triggered any other emotions",
            "Practice adaptability through mindful acceptance",
        ],
        local_resources: Some("Community support groups can help those adjusting to major life changes."),
    },
    EmotionInsight {
        emotion: "neutral",
        description: "Neutral expressions may indicate emotional balance or sometimes emotional suppression.",
        connection: "In Bangladesh, maintaining neutrality might be a cultural value in certain contexts, especially in professional settings.",
        recommendations: &[
            "Check in with yourself about what you're actually feeling",
            "Consider if you're suppressing emotions for cultural reasons",
            "Practice mindfulness to increase emotional awareness",
        ],
        local_resources: Some("Meditation groups in urban areas like Dhaka can help with emotional awareness."),
    },
    EmotionInsight {
        emotion: "disgust",
        description: "Disgust can relate to moral judgments, traumatic memories, or physical aversion.",
        connection: "In Bangladesh, disgust related to environmental conditions or certain social situations may be common stressors.",
        recommendations: &[
            "Identify exactly what's triggering the disgust response",
            "Consider if this relates to any past experiences",
            "For environmental triggers, focus on what's within your control to change",
        ],
        local_resources: Some("Environmental improvement community groups can help address some common disgust triggers."),
    },
];

pub const VOICE_INSIGHTS: &[EmotionInsight] = &[
    EmotionInsight {
        emotion: "happy",
        description: "A happy tone in your voice can indicate positive emotional state and well-being.",
        connection: "In Bangladesh, expressing happiness in your voice is generally culturally appropriate and can strengthen social bonds.",
        recommendations: &[
            "Notice what made you feel happy and try to incorporate more of it in your life",
            "Share this positive feeling with others who might benefit from your support",
            "Use this moment of positivity to address any challenging tasks",
        ],
        local_resources: None,
    },
    EmotionInsight {
        emotion: "sad",
        description: "Sadness in your voice can reflect grief, disappointment, or low mood states.",
        connection: "In Bangladesh, particularly in rural areas, expressing sadness verbally may be seen as seeking community support.",
        recommendations: &[
            "Allow yourself to experience this emotion without judgment",
            "Reach out to trusted family members or friends",
            "Consider gentle physical activities like walking to help process feelings",
            "If persistent, speaking with a mental health professional can help",
        ],
        local_resources: None,
    },
    EmotionInsight {
        emotion: "angry",
        description: "An angry tone can reflect frustration, perceived injustice, or unmet needs.",
        connection: "In Bangladeshi culture, anger expression is often moderated, especially in public settings.",
        recommendations: &[
            "Take deep breaths before responding to situations",
            "Identify the source of your anger and whether it relates to deeper issues",
            "Find appropriate outlets for expressing feelings, like writing or physical activity",
            "Consider culturally-appropriate ways to address concerns constructively",
        ],
        local_resources: None,
    },
    EmotionInsight {
        emotion: "fearful",
        description: "Fear in your voice can indicate anxiety, worry, or feeling threatened.",
        connection: "In Bangladesh, anxiety about social perception and family matters may be reflected in voice patterns.",
        recommendations: &[
            "Practice grounding techniques to reduce immediate anxiety",
            "Identify specific triggers for your fear",
            "Share your concerns with someone you trust",
            "Break down overwhelming situations into manageable steps",
        ],
        local_resources: None,
    },
    EmotionInsight {
        emotion: "neutral",
        description: "A neutral tone may indicate emotional balance or sometimes emotional suppression.",
        connection: "In professional and formal settings in Bangladesh, a neutral tone is often valued.",
        recommendations: &[
            "Check if you're actually feeling neutral or suppressing emotions",
            "Practice mindfulness to maintain awareness of your emotional state",
            "Consider if this is your typical speaking pattern or a response to current circumstances",
        ],
        local_resources: None,
    },
    EmotionInsight {
        emotion: "calm",
        description: "A calm voice tone suggests emotional regulation and composure.",
        connection: "In Bangladesh, a calm demeanor in speech is highly valued, especially among elders and leaders.",
        recommendations: &[
            "Notice what helps you maintain this state of calm",
            "Use this composure to address any challenges effectively",
            "Share techniques that help you maintain calm with others who might benefit",
        ],
        local_resources: None,
    },
];

/// Case-insensitive lookup. `kind` is `face` or `voice`.
pub fn lookup(kind: &str, emotion: &str) -> Result<&'static EmotionInsight, Response> {
    let table = match kind.to_lowercase().as_str() {
        "face" => FACE_INSIGHTS,
        "voice" => VOICE_INSIGHTS,
        _ => {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "Emotion type must be either 'face' or 'voice'",
            ))
        }
    };
    let emotion = emotion.to_lowercase();
    table.iter().find(|i| i.emotion == emotion).ok_or_else(|| {
        error_response(
            StatusCode::NOT_FOUND,
            format!("No insights found for {} emotion: {emotion}", kind.to_lowercase()),
        )
    })
}

pub async fn get_insight(Path((kind, emotion)): Path<(String, String)>) -> Response {
    match lookup(&kind, &emotion) {
        Ok(insight) => Json(insight).into_response(),
        Err(resp) => resp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case() {
        let insight = lookup("Voice", "CALM").unwrap();
        assert!(insight.description.starts_with("A calm voice tone"));
        assert!(insight.local_resources.is_none());
        assert!(lookup("face", "disgust").unwrap().local_resources.is_some());
    }

    #[test]
    fn unknown_kind_and_emotion_are_rejected() {
        assert_eq!(lookup("hand", "happy").unwrap_err().status(), StatusCode::BAD_REQUEST);
        assert_eq!(lookup("voice", "surprise").unwrap_err().status(), StatusCode::NOT_FOUND);
    }
}
