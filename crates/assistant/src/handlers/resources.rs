//! Fixed Bangladesh resource directory. No oracle call.

use mh_domain::message::Message;
use mh_domain::state::{SessionState, StateDelta};

use crate::stage::StageCtx;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceCategory {
    General,
    Depression,
    Anxiety,
    Stress,
}

impl ResourceCategory {
    pub const ALL: [ResourceCategory; 4] = [
        ResourceCategory::General,
        ResourceCategory::Depression,
        ResourceCategory::Anxiety,
        ResourceCategory::Stress,
    ];

    /// Chosen by substring of the primary emotion.
    pub fn for_emotion(emotion: &str) -> Self {
        let e = emotion.to_lowercase();
        if e.contains("depress") || e.contains("sad") {
            ResourceCategory::Depression
        } else if e.contains("anx") || e.contains("worry") || e.contains("fear") {
            ResourceCategory::Anxiety
        } else if e.contains("stress") || e.contains("overwhelm") {
            ResourceCategory::Stress
        } else {
            ResourceCategory::General
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceCategory::General => "general",
            ResourceCategory::Depression => "depression",
            ResourceCategory::Anxiety => "anxiety",
            ResourceCategory::Stress => "stress",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ResourceCategory::General => "General",
            ResourceCategory::Depression => "Depression",
            ResourceCategory::Anxiety => "Anxiety",
            ResourceCategory::Stress => "Stress",
        }
    }

    pub fn entries(self) -> &'static [&'static str] {
        match self {
            ResourceCategory::General => &[
                "National Institute of Mental Health (NIMH) Bangladesh: 01713-200300",
                "Bangladesh Mental Health Foundation: www.bmhf.org.bd",
                "Kaan Pete Roi (emotional support helpline): 01779-554391, 01688-709965",
                "Bangladesh Association of Psychiatrists: http://bap.org.bd/",
            ],
            ResourceCategory::Depression => &[
                "Depression support groups at Dhaka Community Hospital",
                "BRAC Mental Health Program: https://www.brac.net/",
                "PDF Guide: 'Understanding Depression in Bangladesh Context'",
            ],
            ResourceCategory::Anxiety => &[
                "Anxiety management workshops at Psychological Health & Wellness Clinic (Dhaka)",
                "Breathing & Mindfulness resources in Bengali: mentalhealthbd.org/anxiety",
                "Anxiety support forum: bangladesh-anxiety-support.groups.io",
            ],
            ResourceCategory::Stress => &[
                "Work-Life Balance workshops by LifeSpring Counseling Center",
                "Stress Management techniques in Bengali - downloadable audio",
                "Virtual stress support groups (weekly via Zoom)",
            ],
        }
    }
}

pub fn render(category: ResourceCategory) -> String {
    let mut out = format!(
        "**Bangladesh Mental Health Resources for {}**\n\nHere are some resources that might be helpful:\n",
        category.title()
    );
    for entry in category.entries() {
        out.push_str(&format!("\n• {entry}"));
    }
    out.push_str(
        "\n\nWould you like more specific information about any of these resources? \
         Or would you prefer resources for a different concern?\n\n\
         Remember that while these resources can be helpful, they're not a substitute for professional mental health support when needed.",
    );
    out
}

pub async fn handle(state: &SessionState, _ctx: &StageCtx<'_>) -> StateDelta {
    let category = ResourceCategory::for_emotion(state.primary_emotion());
    let mut delta = StateDelta::new();
    delta.trace_if(
        state.reasoning_visible,
        format!(
            "💭 **Finding Relevant Resources**\n\n\
             Based on your message, I think these {}-related resources in Bangladesh might be helpful.\n\n\
             These complement our conversation but don't replace professional support.",
            category.as_str()
        ),
    );
    delta.push(Message::assistant(render(category)));
    delta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_by_emotion_substring() {
        assert_eq!(ResourceCategory::for_emotion("Sadness"), ResourceCategory::Depression);
        assert_eq!(ResourceCategory::for_emotion("worry"), ResourceCategory::Anxiety);
        assert_eq!(ResourceCategory::for_emotion("fearful"), ResourceCategory::Anxiety);
        assert_eq!(ResourceCategory::for_emotion("overwhelmed"), ResourceCategory::Stress);
        assert_eq!(ResourceCategory::for_emotion("happy"), ResourceCategory::General);
    }

    #[test]
    fn render_lists_every_entry() {
        let text = render(ResourceCategory::General);
        assert!(text.starts_with("**Bangladesh Mental Health Resources for General**"));
        assert_eq!(text.matches("\n• ").count(), 4);
    }
}
