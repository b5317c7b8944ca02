use rand::seq::SliceRandom;
use rand::Rng;

use mh_domain::message::Message;
use mh_domain::state::{SessionState, StateDelta};

use crate::stage::StageCtx;

const PHYSICAL: &[&str] = &[
    "Take a 10-minute walk outside, focusing on the sensations around you",
    "Do a quick 5-minute stretch routine to release tension",
    "Try 3 minutes of jumping jacks or dancing to get your blood flowing",
    "Practice deep breathing: inhale for 4 counts, hold for 4, exhale for 6",
    "Splash cold water on your face to help reset your nervous system",
];

const MENTAL: &[&str] = &[
    "Take a 5-minute break from screens",
    "Write down three thoughts you're having, then challenge their accuracy",
    "Do a quick puzzle or brain game to shift your focus",
    "Visualize a peaceful place for 2 minutes with your eyes closed",
    "Listen to a guided meditation (I can suggest one if you'd like)",
];

const EMOTIONAL: &[&str] = &[
    "Write down three things you're grateful for right now",
    "Text a supportive friend or family member just to say hello",
    "Listen to a song that matches how you'd like to feel",
    "Look at photos that bring back positive memories",
    "Give yourself permission to feel your emotions without judgment for 5 minutes",
];

/// Emotion families with their own activity list and benefit phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Anxious,
    Low,
    Angry,
    Other,
}

impl Category {
    pub fn of(emotion: &str) -> Self {
        match emotion.trim().to_lowercase().as_str() {
            "anxious" | "stressed" | "fearful" | "worried" => Category::Anxious,
            "sad" | "depressed" | "down" | "hopeless" => Category::Low,
            "angry" | "frustrated" | "irritated" => Category::Angry,
            _ => Category::Other,
        }
    }

    pub fn activities(self) -> &'static [&'static str] {
        match self {
            Category::Anxious => &[
                "Try box breathing: inhale for 4 counts, hold for 4, exhale for 4, hold for 4",
                "Progressive muscle relaxation: tense and release each muscle group",
                "Focus on an object near you and describe 5 details about it",
                "Step outside and name 3 things you can see, hear, and feel",
                "Wrap yourself in a warm blanket and make a cup of caffeine-free tea",
            ],
            Category::Low => &[
                "Do just one small task and celebrate completing it",
                "Open curtains or blinds to let in natural light",
                "Step outside for 5 minutes of sunlight",
                "Listen to uplifting music or a comedy podcast",
                "Call or message someone who makes you feel good",
            ],
            Category::Angry => &[
                "Write down what's bothering you, then tear it up",
                "Do a physical activity to release tension (jumping jacks, pushups)",
                "Count backward slowly from 20 to 1",
                "Find a private place and let yourself scream into a pillow",
                "Wash your hands with cold water, focusing on the sensation",
            ],
            Category::Other => &[
                "Take a moment to appreciate something beautiful around you",
                "Do something creative for 10 minutes",
                "Send a kind message to someone",
                "Take a few minutes to plan something you can look forward to",
                "Write down one thing you're proud of about yourself",
            ],
        }
    }

    pub fn benefit(self) -> &'static str {
        match self {
            Category::Anxious => "ground you in the present moment and calm your nervous system",
            Category::Low => "gently activate your energy and connect with positive experiences",
            Category::Angry => "release tension and create space between feelings and reactions",
            Category::Other => "maintain balance and nurture your wellbeing",
        }
    }
}

/// Used when a category has no activities of its own.
const GENERIC_ACTIVITY: &str = "Take a few slow, deep breaths and notice how your body feels";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub primary: String,
    pub alternative: String,
    pub rationale: String,
}

/// Primary from the emotion's own list; alternative from every pool,
/// never equal to the primary.
pub fn suggest(emotion: &str, rng: &mut impl Rng) -> Suggestion {
    let category = Category::of(emotion);
    let (primary, alternative) = pick(category.activities(), rng);
    Suggestion {
        primary: primary.to_string(),
        alternative: alternative.to_string(),
        rationale: format!(
            "When feeling {emotion}, activities that help {} can be particularly helpful.",
            category.benefit()
        ),
    }
}

fn pick(own: &[&'static str], rng: &mut impl Rng) -> (&'static str, &'static str) {
    let primary = own.choose(rng).copied().unwrap_or(GENERIC_ACTIVITY);
    let pool: Vec<&str> = own
        .iter()
        .chain(PHYSICAL)
        .chain(MENTAL)
        .chain(EMOTIONAL)
        .copied()
        .filter(|a| *a != primary)
        .collect();
    let alternative = pool.choose(rng).copied().unwrap_or(PHYSICAL[3]);
    (primary, alternative)
}

pub fn render(s: &Suggestion) -> String {
    format!(
        "**Self-Care Suggestion**\n\n{}\n\n**You might try:** {}\n\n**Alternatively:** {}\n\n\
         Would you like to try one of these now, or would you prefer a different type of self-care activity?",
        s.rationale, s.primary, s.alternative
    )
}

pub async fn handle(state: &SessionState, ctx: &StageCtx<'_>) -> StateDelta {
    let emotion = state.primary_emotion().to_string();
    let suggestion = ctx.with_rng(|rng| suggest(&emotion, rng));

    let mut delta = StateDelta::new();
    delta.trace_if(
        state.reasoning_visible,
        format!(
            "💭 **Thinking About Self-Care For You**\n\n\
             When feeling **{emotion}**, specific self-care activities can be particularly beneficial.\n\n\
             Let me suggest something quick and accessible that could help..."
        ),
    );
    delta.push(Message::assistant(render(&suggestion)));
    delta.self_care_recommendation = Some(suggestion.primary);
    delta
}
