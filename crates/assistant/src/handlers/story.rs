//! Narrative-therapy stories built around the user's struggle.

use std::sync::OnceLock;

use rand::Rng;
use regex::Regex;

use mh_domain::message::Message;
use mh_domain::state::{SessionState, StateDelta};

use crate::prompts::compose;
use crate::stage::StageCtx;

pub const DEFAULT_TITLE: &str = "Your Therapeutic Story";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Archetype {
    pub key: &'static str,
    pub metaphors: [&'static str; 4],
    pub themes: [&'static str; 4],
    pub heroes: [&'static str; 4],
}

pub const ARCHETYPES: [Archetype; 10] = [
    Archetype {
        key: "anxiety",
        metaphors: ["river", "storm", "mountain", "maze"],
        themes: ["courage", "breathing", "perspective", "facing fears"],
        heroes: ["explorer", "navigator", "climber", "guide"],
    },
    Archetype {
        key: "depression",
        metaphors: ["winter", "dark cave", "fog", "heavy backpack"],
        themes: ["light", "seasons", "rest", "connection"],
        heroes: ["traveler", "gardener", "lighthouse keeper", "dawn bringer"],
    },
    Archetype {
        key: "grief",
        metaphors: ["ocean", "changing tree", "bridge", "mosaic"],
        themes: ["memory", "honoring", "integration", "transformation"],
        heroes: ["memory keeper", "bridge builder", "weaver", "composer"],
    },
    Archetype {
        key: "fear",
        metaphors: ["closed door", "shadow", "uncharted territory", "high cliff"],
        themes: ["curiosity", "courage", "unknown", "stepping forward"],
        heroes: ["door opener", "light bearer", "map maker", "cliff climber"],
    },
    Archetype {
        key: "anger",
        metaphors: ["fire", "storm", "tangled knot", "pressure cooker"],
        themes: ["power", "energy", "boundaries", "transformation"],
        heroes: ["fire keeper", "weather worker", "untangler", "pressure release"],
    },
    Archetype {
        key: "guilt",
        metaphors: ["heavy stone", "locked room", "repeating record", "mirror"],
        themes: ["forgiveness", "compassion", "learning", "release"],
        heroes: ["stone bearer", "key finder", "new composer", "truth seeker"],
    },
    Archetype {
        key: "shame",
        metaphors: ["mask", "invisibility cloak", "cave", "wall"],
        themes: ["authenticity", "acceptance", "belonging", "speaking"],
        heroes: ["mask remover", "voice finder", "light bearer", "bridge builder"],
    },
    Archetype {
        key: "identity",
        metaphors: ["river", "mirror", "garden", "tapestry"],
        themes: ["growth", "integration", "discovery", "cultivation"],
        heroes: ["gardener", "navigator", "weaver", "mirror holder"],
    },
    Archetype {
        key: "perfectionism",
        metaphors: ["impossible mountain", "never-ending path", "unreachable star", "golden cage"],
        themes: ["acceptance", "growth", "process", "good enough"],
        heroes: ["path walker", "star counter", "cage opener", "good-enough finder"],
    },
    Archetype {
        key: "failure",
        metaphors: ["blocked road", "fallen attempt", "closed door", "missed mark"],
        themes: ["learning", "resilience", "redirection", "wisdom"],
        heroes: ["path finder", "rising phoenix", "door creator", "arrow adjuster"],
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    pub title: String,
    pub body: String,
    pub reflection_questions: Vec<String>,
    pub metaphor_explanation: String,
}

/// First archetype whose key appears in the struggle, else a random one.
pub fn pick_archetype(struggle: &str, rng: &mut impl Rng) -> Archetype {
    let lower = struggle.to_lowercase();
    ARCHETYPES
        .iter()
        .find(|a| lower.contains(a.key))
        .copied()
        .unwrap_or_else(|| ARCHETYPES[rng.gen_range(0..ARCHETYPES.len())])
}

pub fn default_questions(struggle: &str) -> Vec<String> {
    vec![
        format!("How does this story relate to your experience with {struggle}?"),
        "What part of the story resonates most with you, and why?".into(),
        "What new perspective might this story offer about your situation?".into(),
    ]
}

fn title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^#[ \t]+(.+?)[ \t]*$").expect("valid regex"))
}

fn questions_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"##\s*Reflection Questions:?([\s\S]*?)(?:#|\z)").expect("valid regex")
    })
}

fn numbered_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\d+\.\s*(.+?)\s*$").expect("valid regex"))
}

/// Split a generated story into title, body and reflection questions.
/// Always yields at least the three default questions.
pub fn parse_story(content: &str, struggle: &str, archetype: &Archetype) -> Story {
    let mut title = DEFAULT_TITLE.to_string();
    let mut body = content.to_string();

    if let Some(caps) = title_re().captures(content) {
        title = caps[1].trim().to_string();
        body = body.replacen(&caps[0], "", 1);
    }

    let mut questions = Vec::new();
    if let Some(caps) = questions_re().captures(content) {
        if let (Some(all), Some(section)) = (caps.get(0), caps.get(1)) {
            questions = section
                .as_str()
                .lines()
                .filter_map(|l| numbered_re().captures(l))
                .map(|c| c[1].to_string())
                .collect();
            body = body.replacen(&content[all.start()..section.end()], "", 1);
        }
    }
    if questions.is_empty() {
        questions = default_questions(struggle);
    }

    Story {
        title,
        body: body.trim().to_string(),
        reflection_questions: questions,
        metaphor_explanation: format!(
            "In narrative therapy, metaphors help externalize problems, allowing us to see them as separate from our identity.\n\n\
             This story uses the metaphor of {} to help reframe your experience with {struggle}.\n\n\
             By seeing yourself as the {} in this journey, you can draw on your inherent strengths of {} and {}.",
            archetype.metaphors[0], archetype.heroes[0], archetype.themes[0], archetype.themes[1]
        ),
    }
}

pub fn fallback_story(struggle: &str) -> Story {
    Story {
        title: "A Story About Resilience".into(),
        body: format!(
            "Once upon a time, there was a person facing {struggle}. Through patience and self-compassion, they discovered new strengths within themselves and found a path forward."
        ),
        reflection_questions: vec![
            "What strengths have helped you in difficult times before?".into(),
            "What small step might help you move forward?".into(),
            "How might you show yourself compassion during this challenge?".into(),
        ],
        metaphor_explanation: "Sometimes our struggles are like storms. They pass with time, and we discover our resilience in weathering them.".into(),
    }
}

pub fn render(story: &Story) -> String {
    let mut out = format!("# {}\n\n{}\n\n## Reflection Questions:", story.title, story.body);
    for (i, q) in story.reflection_questions.iter().enumerate() {
        out.push_str(&format!("\n{}. {}", i + 1, q));
    }
    out.push_str(&format!(
        "\n\n## How This Story Relates to Your Situation:\n{}\n\n\
         How does this story resonate with you? Is there a particular part that speaks to your experience?",
        story.metaphor_explanation
    ));
    out
}

fn story_prompt(struggle: &str, archetype: &Archetype, context: &str) -> String {
    let instructions = format!(
        "You are a therapeutic storyteller who creates healing narratives based on narrative therapy principles.\n\n\
         Create a brief allegorical story (500-800 words) where the protagonist faces and learns to work with {struggle}.\n\
         1. Use metaphors related to: {}\n\
         2. Incorporate themes of: {}\n\
         3. Cast the protagonist as a type of: {}\n\
         4. Use externalization, unique outcomes, and a strengthened preferred narrative\n\
         5. End with a sense of hope and new possibilities\n\
         6. Include 3-4 reflection questions\n\n\
         Write in second person. Format your response as:\n\n\
         # TITLE\n\nSTORY CONTENT\n\n## Reflection Questions:\n1. First question\n2. Second question\n3. Third question",
        archetype.metaphors.join(", "),
        archetype.themes.join(", "),
        archetype.heroes.join(", "),
    );
    compose(
        &instructions,
        &format!("Create a therapeutic story for someone struggling with {struggle}. Additional context about their situation: {context}"),
    )
}

pub async fn handle(state: &SessionState, ctx: &StageCtx<'_>) -> StateDelta {
    let message = state.last_user_message().unwrap_or_default();
    let struggle_prompt = compose(
        "Extract the main emotional struggle or challenge from this message. \
         Return only a brief phrase (2-5 words), such as \"fear of failure\", \"social anxiety\", or \"coping with grief\".",
        message,
    );
    let struggle = match ctx.ask("story_struggle", &struggle_prompt).await {
        Some(reply) => reply.trim().to_string(),
        None => state.primary_emotion().to_string(),
    };

    let context = state
        .emotion_analysis
        .as_ref()
        .map(|a| format!("They are feeling {}. {}", a.primary_emotion, a.emotion_justification))
        .unwrap_or_default();
    let archetype = ctx.with_rng(|rng| pick_archetype(&struggle, rng));

    let story = match ctx
        .ask("story_generation", &story_prompt(&struggle, &archetype, &context))
        .await
    {
        Some(content) => parse_story(&content, &struggle, &archetype),
        None => fallback_story(&struggle),
    };

    let mut delta = StateDelta::new();
    delta.trace_if(
        state.reasoning_visible,
        format!(
            "💭 **Crafting a Therapeutic Story for You**\n\n\
             I'll create a narrative based on your struggle with **{struggle}**.\n\n\
             Therapeutic stories can help externalize our challenges and see them from a new perspective."
        ),
    );
    delta.push(Message::assistant(render(&story)));
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn archetype_by_key_substring() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(pick_archetype("Fear of Failure", &mut rng).key, "fear");
        assert_eq!(pick_archetype("coping with grief", &mut rng).key, "grief");
        let random = pick_archetype("loneliness", &mut rng);
        assert!(ARCHETYPES.iter().any(|a| a.key == random.key));
    }

    #[test]
    fn parses_title_body_and_questions() {
        let content = "# The Lighthouse\n\nYou walk along the shore.\n\n## Reflection Questions:\n1. What is your light?\n2. Who keeps you company?\n";
        let story = parse_story(content, "loneliness", &ARCHETYPES[1]);
        assert_eq!(story.title, "The Lighthouse");
        assert_eq!(story.body, "You walk along the shore.");
        assert_eq!(
            story.reflection_questions,
            vec!["What is your light?", "Who keeps you company?"]
        );
        assert!(story.metaphor_explanation.contains("metaphor of winter"));
    }

    #[test]
    fn missing_questions_get_three_defaults() {
        let story = parse_story("# Title\nJust a story.", "grief", &ARCHETYPES[2]);
        assert_eq!(story.reflection_questions.len(), 3);
        assert!(story.reflection_questions[0].contains("grief"));
    }

    #[test]
    fn untitled_story_with_questions_keeps_default_title() {
        let content = "Once you walked the shore.\n\n## Reflection Questions:\n1. What did the tide take?\n2. What did it leave?\n";
        let story = parse_story(content, "grief", &ARCHETYPES[2]);
        assert_eq!(story.title, DEFAULT_TITLE);
        assert_eq!(story.body, "Once you walked the shore.");
        assert_eq!(
            story.reflection_questions,
            vec!["What did the tide take?", "What did it leave?"]
        );
    }

    #[test]
    fn title_is_only_a_single_hash_heading() {
        let content = "Intro line\n# The Bridge \nYou cross it.";
        let story = parse_story(content, "fear", &ARCHETYPES[3]);
        assert_eq!(story.title, "The Bridge");
        assert_eq!(story.body, "Intro line\n\nYou cross it.");
    }

    #[test]
    fn untitled_story_uses_default_title() {
        let story = parse_story("No headings at all.", "fear", &ARCHETYPES[3]);
        assert_eq!(story.title, DEFAULT_TITLE);
        assert_eq!(story.reflection_questions.len(), 3);
    }

    #[test]
    fn render_numbers_questions() {
        let text = render(&fallback_story("stress"));
        assert!(text.starts_with("# A Story About Resilience"));
        assert!(text.contains("## Reflection Questions:\n1. What strengths"));
        assert!(text.contains("## How This Story Relates to Your Situation:"));
    }
}
