use rand::seq::SliceRandom;
use rand::Rng;

use mh_domain::message::Message;
use mh_domain::state::{SessionState, StateDelta};

use crate::stage::StageCtx;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exercise {
    pub name: &'static str,
    pub description: &'static str,
    pub steps: &'static [&'static str],
}

const THOUGHT_RECORD: Exercise = Exercise {
    name: "Thought Record",
    description: "Identify the anxious thought, consider evidence for and against it, and develop a balanced perspective.",
    steps: &[
        "Write down the specific thought causing anxiety",
        "Rate your belief in this thought (0-100%)",
        "List evidence that supports this thought",
        "List evidence that contradicts this thought",
        "Create a balanced alternative thought",
        "Rate your belief in the alternative thought (0-100%)",
    ],
};

const GROUNDING: Exercise = Exercise {
    name: "Grounding Technique",
    description: "The 5-4-3-2-1 technique to bring your awareness to the present moment.",
    steps: &[
        "Name 5 things you can see",
        "Name 4 things you can feel/touch",
        "Name 3 things you can hear",
        "Name 2 things you can smell",
        "Name 1 thing you can taste",
    ],
};

const BEHAVIORAL_ACTIVATION: Exercise = Exercise {
    name: "Behavioral Activation",
    description: "Plan and engage in activities that typically bring you joy or a sense of accomplishment.",
    steps: &[
        "Make a list of activities you used to enjoy",
        "Choose one small activity from the list",
        "Schedule a specific time to do it, even if you don't feel like it",
        "After completing it, note how your mood changed",
    ],
};

const GRATITUDE_JOURNAL: Exercise = Exercise {
    name: "Gratitude Journal",
    description: "Write down things you're grateful for to shift focus toward positive aspects of life.",
    steps: &[
        "Set aside 5 minutes",
        "Write down 3 specific things you're grateful for today",
        "For each item, write why you're grateful for it",
        "Notice how you feel after completing this exercise",
    ],
};

const STOPP: Exercise = Exercise {
    name: "STOPP Technique",
    description: "A strategy to pause and respond more effectively when feeling angry.",
    steps: &[
        "Stop - Pause, don't react immediately",
        "Take a breath - Breathe deeply, in through nose, out through mouth",
        "Observe - What am I thinking and feeling?",
        "Perspective - Is this fact or opinion? Is there another way of seeing this?",
        "Practice what works - What's the most helpful thing to do right now?",
    ],
};

const EXPOSURE_HIERARCHY: Exercise = Exercise {
    name: "Exposure Hierarchy",
    description: "Gradually face feared situations in a controlled way to reduce anxiety.",
    steps: &[
        "List situations that trigger your fear, from least to most frightening",
        "Start with the least frightening item",
        "Practice facing it until your anxiety decreases",
        "Move to the next item only when you're ready",
    ],
};

const MINDFULNESS: Exercise = Exercise {
    name: "Mindfulness Meditation",
    description: "Focus on your breath to anchor yourself in the present moment.",
    steps: &[
        "Find a quiet place to sit comfortably",
        "Close your eyes or maintain a soft gaze",
        "Focus on your breath, without trying to change it",
        "When your mind wanders, gently bring attention back to your breath",
        "Start with 5 minutes and gradually increase",
    ],
};

const RESTRUCTURING: Exercise = Exercise {
    name: "Cognitive Restructuring",
    description: "Identify and challenge negative thought patterns.",
    steps: &[
        "Notice the negative thought",
        "Identify the thinking distortion (e.g., catastrophizing, black-and-white thinking)",
        "Challenge the thought: Is it based on facts? What evidence contradicts it?",
        "Create a more balanced, realistic thought",
    ],
};

const GENERIC: [Exercise; 2] = [MINDFULNESS, RESTRUCTURING];

fn emotion_specific(emotion: &str) -> &'static [Exercise] {
    match emotion {
        "anxious" => &[THOUGHT_RECORD, GROUNDING],
        "sad" => &[BEHAVIORAL_ACTIVATION, GRATITUDE_JOURNAL],
        "angry" => &[STOPP],
        "fearful" => &[EXPOSURE_HIERARCHY],
        _ => &[],
    }
}

/// Emotion-specific exercises followed by the generic set.
pub fn candidates(emotion: &str) -> Vec<Exercise> {
    let key = emotion.trim().to_lowercase();
    emotion_specific(&key)
        .iter()
        .chain(GENERIC.iter())
        .copied()
        .collect()
}

pub fn choose(emotion: &str, rng: &mut impl Rng) -> Exercise {
    *candidates(emotion)
        .choose(rng)
        .unwrap_or(&MINDFULNESS)
}

pub fn introduction(emotion: &str, exercise: &Exercise) -> String {
    let name = exercise.name;
    match emotion.trim().to_lowercase().as_str() {
        "anxious" | "fearful" => format!(
            "I notice you're feeling {emotion}. This {name} exercise can help reduce anxiety and bring a sense of calm."
        ),
        "sad" | "depressed" => format!(
            "When you're feeling {emotion}, it can be hard to take action. This {name} exercise is designed to gently help shift your perspective."
        ),
        "angry" | "frustrated" => format!(
            "I understand you're feeling {emotion}. This {name} technique can help you process those feelings in a healthy way."
        ),
        _ => format!(
            "Based on what you've shared, I think this {name} exercise might be helpful for you right now."
        ),
    }
}

pub fn render(emotion: &str, exercise: &Exercise) -> String {
    let mut out = format!(
        "**{}**\n\n{}\n\n{}\n\n**Steps:**",
        exercise.name,
        introduction(emotion, exercise),
        exercise.description
    );
    for (i, step) in exercise.steps.iter().enumerate() {
        out.push_str(&format!("\n{}. {}", i + 1, step));
    }
    out.push_str("\n\nWould you like to try this exercise now? Or would you prefer something different?");
    out
}

pub async fn handle(state: &SessionState, ctx: &StageCtx<'_>) -> StateDelta {
    let emotion = state.primary_emotion().to_string();
    let exercise = ctx.with_rng(|rng| choose(&emotion, rng));

    let mut delta = StateDelta::new();
    delta.trace_if(
        state.reasoning_visible,
        format!(
            "💭 **Selecting an Exercise For You**\n\nYou appear to be feeling **{emotion}**.\n\n\
             The {} technique could be helpful right now because it's designed to address {emotion} thoughts and feelings.",
            exercise.name
        ),
    );
    delta.push(Message::assistant(render(&emotion, &exercise)));
    delta.cbt_focus = Some(exercise.name.to_string());
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn names(emotion: &str) -> Vec<&'static str> {
        candidates(emotion).iter().map(|e| e.name).collect()
    }

    #[test]
    fn candidate_sets() {
        assert_eq!(
            names("Anxious"),
            vec!["Thought Record", "Grounding Technique", "Mindfulness Meditation", "Cognitive Restructuring"]
        );
        assert_eq!(names("angry").len(), 3);
        assert_eq!(names("fearful")[0], "Exposure Hierarchy");
        assert_eq!(names("happy"), vec!["Mindfulness Meditation", "Cognitive Restructuring"]);
    }

    #[test]
    fn choice_stays_in_candidates() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let e = choose("sad", &mut rng);
            assert!(names("sad").contains(&e.name));
        }
    }

    #[test]
    fn intro_groups() {
        assert!(introduction("fearful", &GROUNDING).contains("reduce anxiety"));
        assert!(introduction("depressed", &GROUNDING).contains("hard to take action"));
        assert!(introduction("frustrated", &STOPP).contains("healthy way"));
        assert!(introduction("confused", &MINDFULNESS).starts_with("Based on what you've shared"));
    }

    #[test]
    fn render_numbers_steps() {
        let text = render("angry", &STOPP);
        assert!(text.starts_with("**STOPP Technique**"));
        assert!(text.contains("\n1. Stop - Pause"));
        assert!(text.contains("\n5. Practice what works"));
        assert!(text.ends_with("prefer something different?"));
    }
}
