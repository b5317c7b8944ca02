//! Tool selection and invocation for one turn.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use mh_domain::route::Route;
use mh_domain::state::{SessionState, StateDelta, ToolResult};
use mh_domain::trace::TraceEvent;
use mh_tools::truncate::prefix_chars;
use mh_tools::{truncate_chars, ToolKind, VideoSearch};

use crate::prompts::compose;
use crate::stage::StageCtx;

pub const YOUTUBE_VIDEOS: &str = "youtube_videos";
pub const YOUTUBE_CONTENT: &str = "youtube_content";
pub const VIDEO_BLOG: &str = "video_blog";

const VIDEO_RESULTS: usize = 3;
const TRANSCRIPT_CHARS: usize = 2000;
const BLOG_SOURCE_CHARS: usize = 3000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSummary {
    pub title: String,
    pub transcript: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoBlog {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub key_points: Vec<String>,
}

impl VideoBlog {
    fn failed(reason: impl std::fmt::Display) -> Self {
        Self {
            title: "Error Creating Blog".into(),
            content: format!("Sorry, I encountered an error while creating the blog: {reason}"),
            key_points: Vec::new(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Selection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Which tools a turn will consult.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub video: bool,
    pub text: Vec<ToolKind>,
}

fn any_hint(hints: &[String], words: &[&str]) -> bool {
    hints.iter().any(|h| words.iter().any(|w| h.contains(w)))
}

pub fn select(route: Route, hints: &[String], message: &str) -> Selection {
    let hints: Vec<String> = hints.iter().map(|h| h.to_lowercase()).collect();
    let lower = message.to_lowercase();
    let mut text = Vec::new();

    if route == Route::KnowledgeBase || any_hint(&hints, &["mental_health_info", "knowledge"]) {
        text.push(ToolKind::MentalHealthInfo);
    }
    if route == Route::AcademicResearch || any_hint(&hints, &["research", "arxiv", "academic"]) {
        text.push(ToolKind::Arxiv);
    }
    if any_hint(&hints, &["web", "search", "internet"]) {
        text.push(ToolKind::WebSearch);
    }
    if any_hint(&hints, &["wikipedia", "wiki"]) {
        text.push(ToolKind::Wikipedia);
    }

    Selection {
        video: route == Route::VideoResources
            || hints.iter().any(|h| h == YOUTUBE_VIDEOS)
            || lower.contains("video"),
        text,
    }
}

fn wants_blog(state: &SessionState, message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("blog")
        || lower.contains("summarize")
        || state.user_preferences.prefers_detailed_content
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Stages
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Narrates the planned tool use. Produces only a trace message.
pub fn explain(state: &SessionState) -> StateDelta {
    let mut delta = StateDelta::new();
    let Some(strategy) = &state.response_strategy else {
        return delta;
    };
    if strategy.appropriate_tools.is_empty() {
        return delta;
    }
    let message = state.last_user_message().unwrap_or_default();
    delta.trace_if(
        state.reasoning_visible,
        format!(
            "💭 **Searching for Helpful Information**\n\n\
             I think some additional information would be helpful here...\n\n\
             Let me search for: {}\n\n\
             This should help address your question about {}...\n\nSearching...",
            strategy.appropriate_tools.join(", "),
            prefix_chars(message, 30)
        ),
    );
    delta
}

pub async fn use_tools(state: &SessionState, ctx: &StageCtx<'_>) -> StateDelta {
    let message = state.last_user_message().unwrap_or_default();
    let hints = state
        .response_strategy
        .as_ref()
        .map(|s| s.appropriate_tools.clone())
        .unwrap_or_default();
    let selection = select(state.query_route, &hints, message);
    let mut delta = StateDelta::new();

    if selection.video {
        match ctx.tools.video() {
            Some(video) => run_video(state, ctx, video.clone(), message, &mut delta).await,
            None => tracing::debug!("video search requested but not configured"),
        }
    }

    for kind in selection.text {
        if let Some((name, result)) = run_text(ctx, kind, message).await {
            delta.tool_results.push((name, result));
        }
    }

    if state.reasoning_visible && !delta.tool_results.is_empty() {
        let summary = gathered_summary(&delta.tool_results);
        delta.trace_if(true, summary);
    }
    delta
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Invocation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn invoked(tool: &str, ok: bool, result_chars: usize, start: Instant) {
    TraceEvent::ToolInvoked {
        tool: tool.to_string(),
        ok,
        result_chars,
        duration_ms: start.elapsed().as_millis() as u64,
    }
    .emit();
}

async fn run_text(ctx: &StageCtx<'_>, kind: ToolKind, query: &str) -> Option<(String, ToolResult)> {
    let Some(tool) = ctx.tools.get(kind) else {
        tracing::debug!(tool = %kind, "tool requested but not configured");
        return None;
    };
    let name = kind.name();
    let start = Instant::now();
    match tool.query(query).await {
        Ok(text) => {
            invoked(name, true, text.chars().count(), start);
            let text = truncate_chars(&text, ctx.tools.max_result_chars());
            Some((name.to_string(), ToolResult::Text(text)))
        }
        Err(e) => {
            invoked(name, false, 0, start);
            tracing::warn!(tool = name, error = %e, "tool call failed");
            Some((
                format!("error_{name}"),
                ToolResult::Text(format!("Error using {name}: {e}")),
            ))
        }
    }
}

async fn run_video(
    state: &SessionState,
    ctx: &StageCtx<'_>,
    video: Arc<dyn VideoSearch>,
    message: &str,
    delta: &mut StateDelta,
) {
    let start = Instant::now();
    let query = format!("mental health {message} expert advice");
    let hits = match video.search(&query, VIDEO_RESULTS).await {
        Ok(hits) => hits,
        Err(e) => {
            invoked(YOUTUBE_VIDEOS, false, 0, start);
            delta.tool_results.push((
                format!("error_{YOUTUBE_VIDEOS}"),
                ToolResult::Text(format!("Error searching for videos: {e}")),
            ));
            return;
        }
    };

    let listing = if hits.is_empty() {
        "No videos found on this topic.".to_string()
    } else {
        hits.iter()
            .take(VIDEO_RESULTS)
            .map(|h| h.url.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    };
    invoked(YOUTUBE_VIDEOS, true, listing.len(), start);
    delta
        .tool_results
        .push((YOUTUBE_VIDEOS.to_string(), ToolResult::Text(listing)));

    let Some(first) = hits.first().filter(|h| h.url.contains("youtube.com/watch")) else {
        return;
    };

    if wants_blog(state, message) {
        delta.trace_if(
            state.reasoning_visible,
            "💭 **Creating Blog Post from Video**\n\n\
             I'm generating a blog post from the video that covers this topic, \
             so you can read the key insights at your own pace.",
        );
        let blog = video_blog(ctx, video.as_ref(), &first.url).await;
        delta.tool_results.push((
            VIDEO_BLOG.to_string(),
            ToolResult::Structured(serde_json::json!(blog)),
        ));
    } else {
        let content = match video_summary(ctx, video.as_ref(), &first.url).await {
            Ok(summary) => serde_json::json!(summary),
            Err(reason) => serde_json::json!({ "error": format!("Error processing video: {reason}") }),
        };
        delta
            .tool_results
            .push((YOUTUBE_CONTENT.to_string(), ToolResult::Structured(content)));
    }
}

async fn video_summary(
    ctx: &StageCtx<'_>,
    video: &dyn VideoSearch,
    url: &str,
) -> Result<VideoSummary, String> {
    let details = video.details(url).await.map_err(|e| e.to_string())?;
    let transcript = truncate_chars(&details.text, TRANSCRIPT_CHARS);
    let prompt = compose(
        "You are a mental health expert who creates helpful summaries of videos. \
         Create a helpful summary of this video transcript in the context of mental health support. \
         Include key points and advice.",
        &format!("TRANSCRIPT:\n{transcript}"),
    );
    let summary = ctx
        .ask("video_summary", &prompt)
        .await
        .ok_or_else(|| "summary unavailable".to_string())?;
    Ok(VideoSummary {
        title: details.title,
        transcript,
        summary: truncate_chars(&summary, ctx.tools.max_result_chars()),
    })
}

async fn video_blog(ctx: &StageCtx<'_>, video: &dyn VideoSearch, url: &str) -> VideoBlog {
    let details = match video.details(url).await {
        Ok(d) => d,
        Err(e) => return VideoBlog::failed(e),
    };
    if details.text.trim().is_empty() {
        return VideoBlog {
            title: "Unable to Generate Blog".into(),
            content: "Could not extract content from this video.".into(),
            key_points: Vec::new(),
        };
    }

    let prompt = compose(
        "You are a professional mental health content writer who creates engaging, informative blog posts \
         from video content. Structure the post with:\n\
         1. An engaging title that captures the essence of the video\n\
         2. A brief introduction explaining the topic's importance\n\
         3. 3-5 main sections with helpful content and advice\n\
         4. A conclusion with actionable takeaways\n\
         5. 3-5 bullet point key highlights from the video\n\n\
         Keep it conversational, evidence-based, and supportive. Maximum length: 600 words.",
        &format!(
            "VIDEO TITLE: {}\n\nTRANSCRIPT:\n{}... [transcript continues]",
            details.title,
            prefix_chars(&details.text, BLOG_SOURCE_CHARS)
        ),
    );
    let Some(content) = ctx.ask("video_blog", &prompt).await else {
        return VideoBlog::failed("the writer is unavailable");
    };

    let mut key_points = bullet_points(&content);
    if key_points.is_empty() {
        let extract = compose("Extract 3-5 key points from this blog post as bullet points:", &content);
        if let Some(reply) = ctx.ask("video_blog_points", &extract).await {
            key_points = reply
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect();
        }
    }

    VideoBlog {
        title: details.title,
        content: truncate_chars(&content, ctx.tools.max_result_chars()),
        key_points,
    }
}

/// Bullet lines, but only when the post announces a highlights section.
pub fn bullet_points(content: &str) -> Vec<String> {
    let lower = content.to_lowercase();
    if !(lower.contains("key points") || lower.contains("highlights") || lower.contains("takeaway")) {
        return Vec::new();
    }
    content
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with('•') || l.starts_with('-') || l.starts_with('*'))
        .map(String::from)
        .collect()
}

fn gathered_summary(results: &[(String, ToolResult)]) -> String {
    let mut out = String::from("🔍 **Information Gathered**\n\n");
    for (name, result) in results {
        match (name.as_str(), result) {
            (YOUTUBE_CONTENT, ToolResult::Structured(v)) => {
                let title = v.get("title").and_then(|t| t.as_str()).unwrap_or("Video");
                out.push_str(&format!("Found a relevant video: {title}\n"));
            }
            (YOUTUBE_VIDEOS, _) => out.push_str("Found relevant videos you might find helpful.\n"),
            ("mental_health_info", r) => out.push_str(&format!(
                "From our mental health resources:\n{}...\n\n",
                prefix_chars(&r.as_text(), 200)
            )),
            (other, r) => out.push_str(&format!(
                "From {other}:\n{}...\n\n",
                prefix_chars(&r.as_text(), 200)
            )),
        }
    }
    out
}
