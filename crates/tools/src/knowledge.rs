//! Built-in mental-health knowledge base with keyword retrieval.

use std::collections::HashSet;

use mh_domain::error::Result;

use crate::backend::{TextTool, ToolKind};

pub const NO_MATCH: &str = "No specific information found about that topic.";

const DOCUMENTS: [&str; 10] = [
    "Depression is a common mental health disorder characterized by persistent sadness and loss of interest in activities.",
    "Anxiety disorders involve excessive worry that's difficult to control.",
    "Mindfulness meditation can help reduce stress and anxiety by focusing on the present moment.",
    "Cognitive Behavioral Therapy (CBT) is an effective treatment for many mental health conditions.",
    "Self-care practices like regular exercise, proper sleep, and healthy eating can improve mental well-being.",
    "Trauma can have lasting effects on mental health, but treatment approaches like EMDR can be helpful.",
    "Social support is crucial for mental health recovery - connecting with others can reduce feelings of isolation.",
    "Dialectical Behavior Therapy (DBT) combines cognitive techniques with mindfulness to help regulate emotions.",
    "Recovery from mental health challenges is possible with the right support and treatment approach.",
    "Setting boundaries is an important self-care practice for protecting your mental health.",
];

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "about", "can", "do", "does", "for", "from", "how", "i", "im", "in",
    "is", "it", "me", "my", "of", "on", "or", "so", "the", "to", "what", "when", "why", "with",
    "you", "your", "tell", "know", "feel", "feeling", "get", "have", "been", "some", "more",
    "mental", "health",
];

/// Ranks the fixed documents by overlapping word stems with the query.
pub struct KnowledgeBase {
    top_k: usize,
    docs: Vec<(&'static str, HashSet<String>)>,
}

impl KnowledgeBase {
    pub fn new(top_k: usize) -> Self {
        let docs = DOCUMENTS.iter().map(|d| (*d, stems(d))).collect();
        Self {
            top_k: top_k.max(1),
            docs,
        }
    }

    /// Best matching documents, highest score first. Ties keep document order.
    pub fn retrieve(&self, query: &str) -> Vec<&'static str> {
        let q = stems(query);
        if q.is_empty() {
            return Vec::new();
        }
        let mut scored: Vec<(usize, usize)> = self
            .docs
            .iter()
            .enumerate()
            .map(|(i, (_, terms))| (i, q.intersection(terms).count()))
            .filter(|(_, score)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        scored
            .into_iter()
            .take(self.top_k)
            .map(|(i, _)| self.docs[i].0)
            .collect()
    }
}

#[async_trait::async_trait]
impl TextTool for KnowledgeBase {
    fn kind(&self) -> ToolKind {
        ToolKind::MentalHealthInfo
    }

    async fn query(&self, query: &str) -> Result<String> {
        let hits = self.retrieve(query);
        if hits.is_empty() {
            return Ok(NO_MATCH.to_string());
        }
        Ok(hits.join("\n"))
    }
}

fn stems(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|w| w.len() > 2 && !STOPWORDS.contains(&w.as_str()))
        .map(|w| stem(&w))
        .collect()
}

fn stem(word: &str) -> String {
    let mut w = word;
    for suffix in ["ness", "ing", "ive", "ed", "es", "s", "y"] {
        if w.len() > suffix.len() + 3 {
            if let Some(s) = w.strip_suffix(suffix) {
                w = s;
                break;
            }
        }
    }
    w.chars().take(6).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anxiety_query_finds_anxiety_docs() {
        let kb = KnowledgeBase::new(3);
        let hits = kb.retrieve("What is anxiety?");
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|d| d.contains("nxiety")));
    }

    #[test]
    fn respects_top_k() {
        let kb = KnowledgeBase::new(1);
        assert_eq!(kb.retrieve("therapy treatment mindfulness").len(), 1);
    }

    #[test]
    fn stems_match_inflections() {
        let kb = KnowledgeBase::new(3);
        let hits = kb.retrieve("I am so depressed");
        assert!(hits[0].starts_with("Depression"));
    }

    #[tokio::test]
    async fn unknown_topic_returns_fixed_text() {
        let kb = KnowledgeBase::new(3);
        assert_eq!(kb.query("quantum chromodynamics").await.unwrap(), NO_MATCH);
    }

    #[tokio::test]
    async fn hits_are_newline_joined() {
        let kb = KnowledgeBase::new(2);
        let out = kb.query("boundaries self-care").await.unwrap();
        assert_eq!(out.lines().count(), 2);
    }
}
