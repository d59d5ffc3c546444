//! Process configuration.
//!
//! `Config` is assembled once per binary, after `.env` has been loaded, and is
//! passed by reference to every component that needs credentials or policy.
//! Nothing outside this module reads the process environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};

const DEFAULT_FAST_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_FAST_MODEL: &str = "gpt-4o-mini";

/// Connection settings for one text-generation backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub name: String,
    pub base_url: String,
    pub model: String,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct SearchCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchPolicy {
    /// Use deterministic placeholder search results instead of the live API.
    pub offline: bool,
}

/// Tunables loaded from the optional YAML policy file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelinePolicy {
    pub consecutive_failure_limit: usize,
    pub serp_display: usize,
    pub page_timeout_secs: u64,
    pub blog_home_timeout_secs: u64,
    pub generation_timeout_secs: u64,
    pub crawl_delay_ms: u64,
    pub templates_dir: PathBuf,
    pub debug_dumps: bool,
    pub search: SearchPolicy,
}

impl Default for PipelinePolicy {
    fn default() -> Self {
        Self {
            consecutive_failure_limit: 3,
            serp_display: 30,
            page_timeout_secs: 7,
            blog_home_timeout_secs: 10,
            generation_timeout_secs: 120,
            crawl_delay_ms: 500,
            templates_dir: PathBuf::from("templates"),
            debug_dumps: true,
            search: SearchPolicy::default(),
        }
    }
}

impl PipelinePolicy {
    pub fn load(path: &Path) -> PipelineResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        serde_yaml::from_str(&content).map_err(|e| {
            PipelineError::Config(format!("invalid policy file {}: {}", path.display(), e))
        })
    }
}

/// Output directory and policy, enough for commands that never call a backend.
#[derive(Debug, Clone)]
pub struct LocalConfig {
    pub output_dir: PathBuf,
    pub policy: PipelinePolicy,
}

impl LocalConfig {
    pub fn from_env() -> PipelineResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> PipelineResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let policy = match get("BLOG_PIPELINE_CONFIG") {
            Some(path) => PipelinePolicy::load(Path::new(&path))?,
            None => PipelinePolicy::default(),
        };
        Ok(Self {
            output_dir: get("BLOG_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("outputs")),
            policy,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub fast: BackendConfig,
    pub quality: Option<BackendConfig>,
    pub search: Option<SearchCredentials>,
    pub output_dir: PathBuf,
    pub policy: PipelinePolicy,
}

impl Config {
    /// Build from the process environment.
    pub fn from_env() -> PipelineResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as absent.
    pub fn from_lookup<F>(lookup: F) -> PipelineResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let fast_key = get("FAST_API_KEY")
            .or_else(|| get("OPENAI_API_KEY"))
            .ok_or_else(|| {
                PipelineError::Config(
                    "FAST_API_KEY (or OPENAI_API_KEY) must be set for the primary backend"
                        .to_string(),
                )
            })?;
        let fast = BackendConfig {
            name: "fast".to_string(),
            base_url: get("FAST_BASE_URL").unwrap_or_else(|| DEFAULT_FAST_BASE_URL.to_string()),
            model: get("FAST_MODEL").unwrap_or_else(|| DEFAULT_FAST_MODEL.to_string()),
            api_key: fast_key,
        };

        let quality = get("QUALITY_API_KEY").map(|api_key| BackendConfig {
            name: "quality".to_string(),
            base_url: get("QUALITY_BASE_URL").unwrap_or_else(|| fast.base_url.clone()),
            model: get("QUALITY_MODEL").unwrap_or_else(|| fast.model.clone()),
            api_key,
        });

        let search = match (get("NAVER_CLIENT_ID"), get("NAVER_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(SearchCredentials {
                client_id,
                client_secret,
            }),
            _ => None,
        };

        let local = LocalConfig::from_lookup(&lookup)?;

        Ok(Self {
            fast,
            quality,
            search,
            output_dir: local.output_dir,
            policy: local.policy,
        })
    }

    /// Search credentials, required unless offline search is configured.
    pub fn require_search(&self) -> PipelineResult<Option<&SearchCredentials>> {
        if self.policy.search.offline {
            return Ok(None);
        }
        self.search.as_ref().map(Some).ok_or_else(|| {
            PipelineError::Config(
                "NAVER_CLIENT_ID and NAVER_CLIENT_SECRET must be set (or enable search.offline)"
                    .to_string(),
            )
        })
    }

    pub fn debug_dir(&self) -> Option<PathBuf> {
        self.policy
            .debug_dumps
            .then(|| self.output_dir.join("debug"))
    }
}
