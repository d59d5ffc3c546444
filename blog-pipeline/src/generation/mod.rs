//! Text-generation port.
//!
//! Stages only ever see [`TextGenerator`]. Concrete backends live in
//! [`chat`]; [`HybridGenerator`] routes each call to a backend by mode.

pub mod chat;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::PipelineResult;

pub use chat::ChatCompletionsBackend;

/// How a prompt should be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Cheap, structured output.
    Fast,
    /// Free-form writing.
    Creative,
    /// Careful, low-temperature analysis.
    Analytical,
}

impl GenerationMode {
    pub fn temperature(self) -> f32 {
        match self {
            Self::Fast => 0.3,
            Self::Creative => 0.8,
            Self::Analytical => 0.2,
        }
    }

    pub fn wants_quality(self) -> bool {
        !matches!(self, Self::Fast)
    }
}

impl std::fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Fast => "fast",
            Self::Creative => "creative",
            Self::Analytical => "analytical",
        };
        f.write_str(s)
    }
}

/// Submit a prompt, get raw text back.
///
/// Implementations do not retry and make no promise that the reply is JSON.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(
        &self,
        prompt: &str,
        max_output_tokens: u32,
        mode: GenerationMode,
    ) -> PipelineResult<String>;
}

/// Routes `fast` calls to the cheap backend and `creative`/`analytical` calls
/// to the quality backend, using the cheap backend when no quality backend is
/// configured.
pub struct HybridGenerator {
    cheap: Arc<dyn TextGenerator>,
    quality: Option<Arc<dyn TextGenerator>>,
}

impl HybridGenerator {
    pub fn new(cheap: Arc<dyn TextGenerator>, quality: Option<Arc<dyn TextGenerator>>) -> Self {
        if quality.is_none() {
            warn!(
                backend = cheap.name(),
                "quality backend not configured; creative and analytical calls use the cheap backend"
            );
        }
        Self { cheap, quality }
    }

    pub fn has_quality(&self) -> bool {
        self.quality.is_some()
    }

    fn route(&self, mode: GenerationMode) -> &Arc<dyn TextGenerator> {
        if !mode.wants_quality() {
            return &self.cheap;
        }
        match &self.quality {
            Some(quality) => quality,
            None => {
                warn!(%mode, backend = self.cheap.name(), "falling back to cheap backend");
                &self.cheap
            }
        }
    }
}

#[async_trait]
impl TextGenerator for HybridGenerator {
    fn name(&self) -> &str {
        "hybrid"
    }

    async fn generate(
        &self,
        prompt: &str,
        max_output_tokens: u32,
        mode: GenerationMode,
    ) -> PipelineResult<String> {
        let backend = self.route(mode);
        debug!(%mode, backend = backend.name(), max_output_tokens, "generation request");
        backend.generate(prompt, max_output_tokens, mode).await
    }
}

/// Build the hybrid generator described by `config`.
pub fn from_config(config: &crate::config::Config) -> PipelineResult<HybridGenerator> {
    let timeout = std::time::Duration::from_secs(config.policy.generation_timeout_secs);
    let cheap: Arc<dyn TextGenerator> =
        Arc::new(ChatCompletionsBackend::new(config.fast.clone(), timeout)?);
    let quality = match &config.quality {
        Some(backend) => Some(
            Arc::new(ChatCompletionsBackend::new(backend.clone(), timeout)?) as Arc<dyn TextGenerator>,
        ),
        None => None,
    };
    Ok(HybridGenerator::new(cheap, quality))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::error::PipelineError;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned replies in order and records every call.
    pub struct ScriptedGenerator {
        name: String,
        replies: Mutex<VecDeque<PipelineResult<String>>>,
        pub calls: Mutex<Vec<(String, u32, GenerationMode)>>,
    }

    impl ScriptedGenerator {
        pub fn new(name: &str, replies: Vec<PipelineResult<String>>) -> Self {
            Self {
                name: name.to_string(),
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn ok(name: &str, replies: &[&str]) -> Self {
            Self::new(name, replies.iter().map(|r| Ok(r.to_string())).collect())
        }

        pub fn modes(&self) -> Vec<GenerationMode> {
            self.calls.lock().unwrap().iter().map(|c| c.2).collect()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        fn name(&self) -> &str {
            &self.name
        }

        async fn generate(
            &self,
            prompt: &str,
            max_output_tokens: u32,
            mode: GenerationMode,
        ) -> PipelineResult<String> {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), max_output_tokens, mode));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(PipelineError::transport(&self.name, "script exhausted")))
        }
    }
}
