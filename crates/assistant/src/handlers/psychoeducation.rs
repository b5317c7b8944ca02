use mh_domain::message::Message;
use mh_domain::state::{SessionState, StateDelta};

use crate::prompts::compose;
use crate::stage::StageCtx;

const STAGE: &str = "psychoeducation";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    pub topic: String,
    pub title: String,
    pub description: String,
    pub key_points: Vec<String>,
    pub framework: String,
    pub strategies: Vec<String>,
}

struct Entry {
    topic: &'static str,
    title: &'static str,
    description: &'static str,
    key_points: [&'static str; 4],
    framework: &'static str,
    strategies: [&'static str; 4],
}

const TOPICS: [Entry; 5] = [
    Entry {
        topic: "anxiety",
        title: "Understanding Anxiety",
        description: "Anxiety is the body's natural response to stress. It's a feeling of fear or apprehension about what's to come.",
        key_points: [
            "Anxiety triggers your 'fight-or-flight' response",
            "Physical symptoms can include racing heart, rapid breathing, and muscle tension",
            "While uncomfortable, anxiety is not dangerous and is a normal human experience",
            "Anxiety becomes a disorder when it's excessive, persistent, and interferes with daily life",
        ],
        framework: "Think of anxiety as your body's alarm system. Sometimes it's oversensitive and goes off when there's no real danger.",
        strategies: [
            "Regular exercise can reduce stress hormones",
            "Mindfulness and breathing techniques help calm the nervous system",
            "Gradually facing feared situations (exposure) reduces anxiety over time",
            "Limiting caffeine and alcohol can reduce symptoms",
        ],
    },
    Entry {
        topic: "depression",
        title: "Understanding Depression",
        description: "Depression is more than just feeling sad. It's a mood disorder that causes persistent feelings of sadness and loss of interest.",
        key_points: [
            "Depression affects how you feel, think, and handle daily activities",
            "It involves changes in brain chemistry and function",
            "Can be triggered by life events, biological factors, or arise without a clear cause",
            "Is not a sign of weakness and isn't something people can 'snap out of'",
        ],
        framework: "Depression is like wearing tinted glasses that make everything appear darker and more hopeless than it actually is.",
        strategies: [
            "Regular physical activity boosts mood-enhancing chemicals",
            "Maintaining social connections even when you don't feel like it",
            "Breaking tasks into smaller steps to make them more manageable",
            "Establishing daily routines to provide structure",
        ],
    },
    Entry {
        topic: "stress",
        title: "Understanding Stress",
        description: "Stress is your body's reaction to pressure from a situation or life event.",
        key_points: [
            "Some stress is normal and even helpful for motivation",
            "Chronic stress can affect your physical and mental health",
            "Your perception of a situation influences your stress response",
            "Everyone's stress triggers and responses are different",
        ],
        framework: "Think of stress like electricity: the right amount powers your life, but too much can cause damage.",
        strategies: [
            "Identify your stress triggers to better manage them",
            "Practice relaxation techniques like deep breathing",
            "Physical activity helps burn off stress hormones",
            "Setting boundaries around time and commitments",
        ],
    },
    Entry {
        topic: "sleep",
        title: "Sleep and Mental Health",
        description: "Sleep and mental health are closely connected. Sleep deprivation affects your psychological state and mental health.",
        key_points: [
            "Sleep problems may increase risk for developing mental health conditions",
            "Mental health issues can disrupt sleep patterns",
            "Most adults need 7-9 hours of quality sleep per night",
            "REM sleep is particularly important for emotional processing",
        ],
        framework: "Sleep is like your brain's cleaning service. It processes emotions and clears out mental 'debris' from the day.",
        strategies: [
            "Keep a consistent sleep schedule, even on weekends",
            "Create a relaxing bedtime routine",
            "Limit screen time before bed (blue light affects melatonin)",
            "Keep your bedroom cool, dark, and quiet",
        ],
    },
    Entry {
        topic: "mindfulness",
        title: "Understanding Mindfulness",
        description: "Mindfulness is the practice of being fully present and engaged in the moment, aware of your thoughts and feelings without judgment.",
        key_points: [
            "Mindfulness helps you observe thoughts without being controlled by them",
            "Regular practice can physically change brain structure in positive ways",
            "You don't need to meditate for hours. Even brief practices help",
            "Mindfulness is a skill that improves with practice",
        ],
        framework: "Mindfulness is like developing a mental watchtower, observing your thoughts and feelings as they pass by without getting swept away by them.",
        strategies: [
            "Start with brief 1-2 minute mindfulness exercises",
            "Use everyday activities (like brushing teeth) as mindfulness opportunities",
            "Try guided mindfulness apps or videos",
            "Be patient and gentle with yourself as you learn",
        ],
    },
];

fn to_strings<const N: usize>(items: &[&str; N]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Exact topic match first, then substring either way.
pub fn lookup(topic: &str) -> Lesson {
    let key = topic.trim().to_lowercase();
    let entry = TOPICS.iter().find(|e| e.topic == key).or_else(|| {
        TOPICS
            .iter()
            .find(|e| !key.is_empty() && (key.contains(e.topic) || e.topic.contains(key.as_str())))
    });
    match entry {
        Some(e) => Lesson {
            topic: e.topic.to_string(),
            title: e.title.to_string(),
            description: e.description.to_string(),
            key_points: to_strings(&e.key_points),
            framework: e.framework.to_string(),
            strategies: to_strings(&e.strategies),
        },
        None => Lesson {
            topic: key.clone(),
            title: format!("Information About {}", capitalize(&key)),
            description: format!("I don't have specific information about {key} in my knowledge base."),
            key_points: vec![
                "Mental health topics are diverse and interconnected".into(),
                "It's important to seek information from reliable sources".into(),
                "Consider consulting with a mental health professional for specific concerns".into(),
            ],
            framework: "Would you like me to help you find general information about this topic instead?".into(),
            strategies: vec![
                "Consider reading from evidence-based mental health resources".into(),
                "Academic journals and reputable health organizations offer reliable information".into(),
                "Mental health professionals can provide personalized guidance".into(),
            ],
        },
    }
}

pub fn render(lesson: &Lesson) -> String {
    let mut out = format!("**{}**\n\n{}\n\n**Key Points:**", lesson.title, lesson.description);
    for point in &lesson.key_points {
        out.push_str(&format!("\n• {point}"));
    }
    out.push_str(&format!(
        "\n\n**Helpful Framework:** {}\n\n**Management Strategies:**",
        lesson.framework
    ));
    for strategy in &lesson.strategies {
        out.push_str(&format!("\n• {strategy}"));
    }
    out.push_str("\n\nIs there anything specific about this topic you'd like to explore further?");
    out
}

pub async fn handle(state: &SessionState, ctx: &StageCtx<'_>) -> StateDelta {
    let message = state.last_user_message().unwrap_or_default();
    let prompt = compose(
        "Extract the main mental health topic from this query. Respond with just the topic name.",
        message,
    );
    let reply = ctx
        .ask(STAGE, &prompt)
        .await
        .map(|r| r.trim().trim_matches(|c: char| c == '"' || c == '.').to_lowercase())
        .filter(|t| !t.is_empty());
    let topic = reply.unwrap_or_else(|| state.primary_emotion().trim().to_lowercase());
    lesson_delta(state, topic)
}

/// Reply for `topic`. A blank topic leaves `topic_covered` untouched.
fn lesson_delta(state: &SessionState, topic: String) -> StateDelta {
    let lesson = lookup(&topic);

    let mut delta = StateDelta::new();
    delta.trace_if(
        state.reasoning_visible,
        format!(
            "💭 **Preparing Educational Information**\n\nYou're asking about **{}**.\n\n\
             I'll provide some evidence-based information about this topic in a clear, accessible way.",
            lesson.topic
        ),
    );
    delta.push(Message::assistant(render(&lesson)));
    if !topic.is_empty() {
        delta.topic_covered = Some(topic);
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_and_substring_matches() {
        assert_eq!(lookup("Sleep").title, "Sleep and Mental Health");
        assert_eq!(lookup("social anxiety").topic, "anxiety");
        assert_eq!(lookup("stress").topic, "stress");
        assert_eq!(lookup("mindful").topic, "mindfulness");
    }

    #[test]
    fn unknown_topic_is_generic() {
        let lesson = lookup("grief");
        assert_eq!(lesson.title, "Information About Grief");
        assert_eq!(
            lesson.description,
            "I don't have specific information about grief in my knowledge base."
        );
    }

    #[test]
    fn blank_topic_is_not_recorded_as_covered() {
        let state = SessionState::new("persona", false);
        assert_eq!(lesson_delta(&state, String::new()).topic_covered, None);
        assert_eq!(
            lesson_delta(&state, "sleep".into()).topic_covered.as_deref(),
            Some("sleep")
        );
    }

    #[test]
    fn render_layout() {
        let text = render(&lookup("depression"));
        assert!(text.starts_with("**Understanding Depression**"));
        assert!(text.contains("**Key Points:**\n• Depression affects"));
        assert!(text.contains("**Helpful Framework:**"));
    }
}
