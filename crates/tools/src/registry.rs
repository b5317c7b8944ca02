use std::collections::BTreeMap;
use std::sync::Arc;

use mh_domain::config::ToolsConfig;
use mh_domain::error::{Error, Result};

use crate::arxiv::Arxiv;
use crate::backend::{TextTool, ToolKind, VideoSearch};
use crate::knowledge::KnowledgeBase;
use crate::video::YouTube;
use crate::web_search::TavilySearch;
use crate::wikipedia::Wikipedia;

/// The retrieval tools available to the assistant, keyed by kind.
///
/// Backends that are disabled or lack credentials are simply absent;
/// callers treat a missing tool as "not consulted".
#[derive(Clone)]
pub struct ToolSet {
    text: BTreeMap<ToolKind, Arc<dyn TextTool>>,
    video: Option<Arc<dyn VideoSearch>>,
    max_result_chars: usize,
}

impl ToolSet {
    pub fn new(max_result_chars: usize) -> Self {
        Self {
            text: BTreeMap::new(),
            video: None,
            max_result_chars,
        }
    }

    /// Build every enabled backend. Remote backends that need an API key
    /// are skipped with a warning when the key is not set.
    pub fn from_config(cfg: &ToolsConfig) -> Self {
        let mut set = Self::new(cfg.max_result_chars);

        if cfg.knowledge.enabled {
            set = set.register(Arc::new(KnowledgeBase::new(cfg.knowledge.top_k)));
        }

        if cfg.web_search.enabled {
            match env_key(&cfg.web_search.api_key_env)
                .and_then(|key| TavilySearch::new(&cfg.web_search, key, cfg.timeout_secs))
            {
                Ok(tool) => set = set.register(Arc::new(tool)),
                Err(e) => tracing::warn!(tool = "web_search", error = %e, "tool unavailable"),
            }
        }

        if cfg.wikipedia.enabled {
            match Wikipedia::new(&cfg.wikipedia, cfg.timeout_secs) {
                Ok(tool) => set = set.register(Arc::new(tool)),
                Err(e) => tracing::warn!(tool = "wikipedia", error = %e, "tool unavailable"),
            }
        }

        if cfg.arxiv.enabled {
            match Arxiv::new(&cfg.arxiv, cfg.timeout_secs) {
                Ok(tool) => set = set.register(Arc::new(tool)),
                Err(e) => tracing::warn!(tool = "arxiv", error = %e, "tool unavailable"),
            }
        }

        if cfg.video.enabled {
            match env_key(&cfg.video.api_key_env)
                .and_then(|key| YouTube::new(&cfg.video, key, cfg.timeout_secs))
            {
                Ok(tool) => set = set.with_video(Arc::new(tool)),
                Err(e) => tracing::warn!(tool = "youtube", error = %e, "tool unavailable"),
            }
        }

        tracing::info!(
            tools = ?set.list(),
            video = set.video.is_some(),
            "retrieval tools loaded"
        );
        set
    }

    pub fn register(mut self, tool: Arc<dyn TextTool>) -> Self {
        self.text.insert(tool.kind(), tool);
        self
    }

    pub fn with_video(mut self, video: Arc<dyn VideoSearch>) -> Self {
        self.video = Some(video);
        self
    }

    pub fn get(&self, kind: ToolKind) -> Option<&Arc<dyn TextTool>> {
        self.text.get(&kind)
    }

    pub fn video(&self) -> Option<&Arc<dyn VideoSearch>> {
        self.video.as_ref()
    }

    pub fn list(&self) -> Vec<&'static str> {
        self.text.keys().map(|k| k.name()).collect()
    }

    pub fn max_result_chars(&self) -> usize {
        self.max_result_chars
    }
}

fn env_key(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::Config(format!("env var {var} is not set"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knowledge_only_when_remote_tools_disabled() {
        let mut cfg = ToolsConfig::default();
        cfg.web_search.enabled = false;
        cfg.wikipedia.enabled = false;
        cfg.arxiv.enabled = false;
        cfg.video.enabled = false;
        let set = ToolSet::from_config(&cfg);
        assert_eq!(set.list(), vec!["mental_health_info"]);
        assert!(set.video().is_none());
        assert_eq!(set.max_result_chars(), 2000);
    }

    #[test]
    fn missing_api_key_skips_backend() {
        let mut cfg = ToolsConfig::default();
        cfg.web_search.api_key_env = "MH_TEST_SURELY_UNSET_KEY".into();
        cfg.video.api_key_env = "MH_TEST_SURELY_UNSET_KEY".into();
        let set = ToolSet::from_config(&cfg);
        assert!(set.get(ToolKind::WebSearch).is_none());
        assert!(set.get(ToolKind::Wikipedia).is_some());
        assert!(set.video().is_none());
    }
}
