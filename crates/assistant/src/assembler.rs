//! Final reply generation and deterministic post-processing.

use std::collections::BTreeMap;

use mh_domain::message::{Message, Role};
use mh_domain::state::{SessionState, StateDelta, ToolResult};
use mh_tools::truncate::prefix_chars;

use crate::stage::StageCtx;
use crate::tools::{VideoBlog, VIDEO_BLOG, YOUTUBE_CONTENT, YOUTUBE_VIDEOS};

const INSTRUCTIONS: &str = "\
Respond to the user's most recent message with empathy and support.

Guidelines:
- Keep the reply concise: 3 to 4 sentences.
- Acknowledge their feelings before offering anything else.
- Draw on the information gathered above where it helps, in plain language.
- When you use a Wikipedia fact, say it comes from Wikipedia.
- When you use a web result, mention the site it comes from.
- When you use an academic paper, name the paper briefly.
- If a blog summary was created from a video, mention that it is available.
- Never diagnose, and suggest professional help gently where appropriate.";

/// Context block describing the emotion, the planned approach, and what
/// the tools found.
pub fn context(state: &SessionState) -> String {
    let mut out = String::new();
    if let Some(analysis) = &state.emotion_analysis {
        out.push_str(&format!("- The user seems to be feeling: {}\n", analysis.primary_emotion));
    }
    if let Some(strategy) = &state.response_strategy {
        out.push_str(&format!("- I should approach with: {}\n", strategy.approach));
        if !strategy.key_points.is_empty() {
            out.push_str(&format!(
                "- Key points to address: {}\n",
                strategy.key_points.join(", ")
            ));
        }
    }

    if !state.tool_results.is_empty() {
        out.push_str("\nInformation gathered:\n");
        for (name, result) in &state.tool_results {
            out.push_str(&preview(name, result));
            out.push('\n');
        }
    }
    out
}

fn preview(name: &str, result: &ToolResult) -> String {
    match name {
        YOUTUBE_CONTENT => {
            let summary = result
                .as_structured()
                .and_then(|v| v.get("summary"))
                .and_then(|s| s.as_str())
                .map(String::from)
                .unwrap_or_else(|| result.as_text());
            format!("Video summary: {}...", prefix_chars(&summary, 300))
        }
        VIDEO_BLOG => match video_blog(result) {
            Some(blog) => format!(
                "Blog from video: {}\nKey points: {}\nBlog content: {}...",
                blog.title,
                blog.key_points.iter().take(3).cloned().collect::<Vec<_>>().join(", "),
                prefix_chars(&blog.content, 300)
            ),
            None => format!("Blog from video: {}...", prefix_chars(&result.as_text(), 300)),
        },
        YOUTUBE_VIDEOS => format!("Relevant videos: {}...", prefix_chars(&result.as_text(), 150)),
        other => format!("{other}: {}...", prefix_chars(&result.as_text(), 200)),
    }
}

fn video_blog(result: &ToolResult) -> Option<VideoBlog> {
    serde_json::from_value(result.as_structured()?.clone()).ok()
}

/// Conversation so far as plain `role: content` lines. System and trace
/// entries are left out.
fn history(messages: &[Message]) -> String {
    messages
        .iter()
        .filter_map(|m| {
            let who = match m.role {
                Role::User => "User",
                Role::Assistant => "Assistant",
                Role::System | Role::Trace => return None,
            };
            Some(format!("{who}: {}", m.content))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn prompt(system_prompt: &str, state: &SessionState) -> String {
    format!(
        "{system_prompt}\n\nContext for this reply:\n{}\n{INSTRUCTIONS}\n\nConversation:\n{}\n\nAssistant:",
        context(state),
        history(&state.messages)
    )
}

pub fn fallback_reply(emotion: &str) -> String {
    format!(
        "I hear that you're feeling {emotion}, and I'm really glad you reached out. \
         I'm here with you. Would you like to tell me a little more about what's going on?"
    )
}

fn finalizing_trace(state: &SessionState) -> String {
    let emotion = state.primary_emotion();
    let (points, approach) = match &state.response_strategy {
        Some(s) if !s.key_points.is_empty() => (s.key_points.join(", "), s.approach.as_str()),
        Some(s) => ("providing empathetic support".to_string(), s.approach.as_str()),
        None => ("providing empathetic support".to_string(), "supportive"),
    };
    let found = if state.tool_results.is_empty() {
        ""
    } else {
        "\n\nI'll also weave in some of the helpful information I found."
    };
    format!(
        "💭 **Finalizing My Response**\n\n\
         Now I'm putting together a response that acknowledges your feelings of {emotion}.\n\n\
         I want to make sure I address: {points}\n\n\
         I'll use a {approach} approach in my response.{found}"
    )
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Post-processing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Mention a generated video blog when the reply has not already.
pub fn append_blog_mention(reply: &mut String, results: &BTreeMap<String, ToolResult>) {
    let Some(blog) = results.get(VIDEO_BLOG).and_then(video_blog) else {
        return;
    };
    if reply.to_lowercase().contains("blog") {
        return;
    }
    let url = results
        .get(YOUTUBE_VIDEOS)
        .map(|r| r.as_text())
        .and_then(|listing| {
            listing
                .lines()
                .find(|l| l.contains("youtube.com/watch"))
                .map(|l| l.trim().to_string())
        })
        .unwrap_or_default();

    reply.push_str(&format!(
        "\n\nI've created a blog summary from this video: {url}\n\nKey insights: "
    ));
    for point in blog.key_points.iter().take(3) {
        let point = point.trim_start_matches(['•', '-', '*']).trim();
        reply.push_str(&format!("\n• {point}"));
    }
}

/// One `Source:` line per consulted reference tool.
pub fn references(results: &BTreeMap<String, ToolResult>) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(text) = results.get("wikipedia").map(|r| r.as_text()) {
        let topic = text
            .split(" - ")
            .next()
            .map(str::trim)
            .filter(|t| !t.is_empty() && text.contains(" - "))
            .unwrap_or("the topic");
        out.push(format!("Source: Wikipedia article on {topic}"));
    }

    if let Some(text) = results.get("web_search").map(|r| r.as_text()) {
        if text.contains("http") {
            let first = text.lines().next().unwrap_or_default();
            if let Some((title, url)) = first.split_once(" - ") {
                out.push(format!("Source: [{}]({})", title.trim(), url.trim()));
            }
        }
    }

    if let Some(text) = results.get("arxiv").map(|r| r.as_text()) {
        if let Some(first) = text.lines().next().filter(|l| !l.trim().is_empty()) {
            out.push(format!("Source: {}", first.trim()));
        }
    }
    out
}

pub fn post_process(reply: String, results: &BTreeMap<String, ToolResult>) -> String {
    let mut reply = reply;
    append_blog_mention(&mut reply, results);
    let refs = references(results);
    if !refs.is_empty() {
        reply.push_str("\n\nReferences:\n");
        reply.push_str(&refs.join("\n"));
    }
    reply
}

/// The turn's single generated reply.
pub async fn generate_response(state: &SessionState, ctx: &StageCtx<'_>) -> StateDelta {
    let mut delta = StateDelta::new();
    delta.trace_if(state.reasoning_visible, finalizing_trace(state));

    let reply = ctx
        .ask("generate_response", &prompt(ctx.system_prompt, state))
        .await
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| fallback_reply(state.primary_emotion()));

    delta.push(Message::assistant(post_process(reply, &state.tool_results)));
    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use mh_domain::emotion::{EmotionAnalysis, ResponseStrategy};

    fn results(pairs: &[(&str, ToolResult)]) -> BTreeMap<String, ToolResult> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn references_for_each_source() {
        let r = results(&[
            ("wikipedia", "Anxiety - Anxiety is an emotion...".into()),
            (
                "web_search",
                "Coping with stress - https://example.org/stress\nTips for everyday stress".into(),
            ),
            ("arxiv", "Sleep and mood by A. Author\nPublished: 2021-01-01".into()),
        ]);
        assert_eq!(
            references(&r),
            vec![
                "Source: Wikipedia article on Anxiety",
                "Source: [Coping with stress](https://example.org/stress)",
                "Source: Sleep and mood by A. Author",
            ]
        );
    }

    #[test]
    fn web_without_links_is_not_cited() {
        let r = results(&[("web_search", "No web results found.".into())]);
        assert!(references(&r).is_empty());
    }

    #[test]
    fn wikipedia_without_title_separator() {
        let r = results(&[("wikipedia", "No good Wikipedia search result was found".into())]);
        assert_eq!(references(&r), vec!["Source: Wikipedia article on the topic"]);
    }

    #[test]
    fn blog_mention_lists_three_insights() {
        let blog = serde_json::json!({
            "title": "Calm",
            "content": "...",
            "key_points": ["• Breathe", "- Rest", "* Move", "• Extra"]
        });
        let r = results(&[
            (VIDEO_BLOG, ToolResult::Structured(blog)),
            (YOUTUBE_VIDEOS, "https://www.youtube.com/watch?v=abc\nhttps://www.youtube.com/watch?v=def".into()),
        ]);
        let out = post_process("Take a slow breath.".into(), &r);
        assert!(out.contains("I've created a blog summary from this video: https://www.youtube.com/watch?v=abc"));
        assert!(out.ends_with("Key insights: \n• Breathe\n• Rest\n• Move"));
        assert!(!out.contains("References:"));
    }

    #[test]
    fn blog_not_repeated_when_reply_mentions_it() {
        let blog = serde_json::json!({"title": "t", "content": "c", "key_points": ["a"]});
        let r = results(&[(VIDEO_BLOG, ToolResult::Structured(blog))]);
        let out = post_process("I wrote a Blog for you.".into(), &r);
        assert_eq!(out, "I wrote a Blog for you.");
    }

    #[test]
    fn context_lists_emotion_approach_and_tools() {
        let mut state = SessionState::default();
        state.emotion_analysis = Some(EmotionAnalysis {
            primary_emotion: "anxious".into(),
            ..EmotionAnalysis::default()
        });
        state.response_strategy = Some(ResponseStrategy {
            approach: "validating".into(),
            key_points: vec!["breathing".into(), "sleep".into()],
            ..ResponseStrategy::default()
        });
        state
            .tool_results
            .insert("mental_health_info".into(), "Anxiety disorders...".into());
        let text = context(&state);
        assert!(text.contains("- The user seems to be feeling: anxious"));
        assert!(text.contains("- I should approach with: validating"));
        assert!(text.contains("- Key points to address: breathing, sleep"));
        assert!(text.contains("mental_health_info: Anxiety disorders......"));
    }

    #[test]
    fn prompt_skips_trace_and_system() {
        let mut state = SessionState::new("persona", true);
        state.messages.push(Message::user("hello"));
        state.messages.push(Message::trace("thinking"));
        let p = prompt("You are a gentle guide.", &state);
        assert!(p.starts_with("You are a gentle guide.\n\n"));
        assert!(p.contains("User: hello"));
        assert!(!p.contains("thinking"));
        assert!(!p.contains("persona"));
    }
}
