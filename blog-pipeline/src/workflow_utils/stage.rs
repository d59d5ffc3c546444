//! Stage abstraction and the runner that drives it.
//!
//! A stage is a prompt builder plus an output parser. [`StageRunner`] owns
//! the generation call, the state transitions, debug dumps of unparseable
//! replies, and the fallback policy:
//!
//! - `Critical` stages propagate every failure.
//! - `BestEffort` stages substitute [`Stage::default_output`] when the reply
//!   is malformed or fails validation. Transport failures still propagate.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

use blog_pipeline_sdk::{log_fallback, log_stage_complete, log_stage_failed, log_stage_start};

use crate::error::{PipelineError, PipelineResult};
use crate::generation::{GenerationMode, TextGenerator};
use crate::workflow_utils::files::write_text_atomic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagePolicy {
    Critical,
    BestEffort,
}

/// Lifecycle of one stage invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    Pending,
    Generating,
    Parsing,
    Validated,
    Failed,
}

/// What to ask the generator.
#[derive(Debug, Clone)]
pub struct StageRequest {
    pub prompt: String,
    pub max_output_tokens: u32,
    pub mode: GenerationMode,
}

impl StageRequest {
    pub fn new(prompt: impl Into<String>, max_output_tokens: u32, mode: GenerationMode) -> Self {
        Self {
            prompt: prompt.into(),
            max_output_tokens,
            mode,
        }
    }
}

pub trait Stage<TIn, TOut>: Send + Sync {
    fn name(&self) -> &'static str;

    fn policy(&self) -> StagePolicy {
        StagePolicy::Critical
    }

    fn request(&self, input: &TIn) -> StageRequest;

    /// Turn raw generator text into a validated output.
    fn parse(&self, input: &TIn, raw: &str) -> PipelineResult<TOut>;

    /// Deterministic substitute for best-effort stages.
    fn default_output(&self, _input: &TIn) -> Option<TOut> {
        None
    }
}

/// Result of a runner invocation, with the path taken.
#[derive(Debug)]
pub struct StageOutcome<T> {
    pub output: T,
    pub used_default: bool,
}

#[derive(Clone)]
pub struct StageRunner {
    generator: Arc<dyn TextGenerator>,
    debug_dir: Option<PathBuf>,
}

impl StageRunner {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            debug_dir: None,
        }
    }

    /// Runner over the configured hybrid generator, dumping into the
    /// configured debug directory.
    pub fn from_config(config: &crate::config::Config) -> PipelineResult<Self> {
        let generator = crate::generation::from_config(config)?;
        Ok(Self::new(Arc::new(generator)).with_debug_dir(config.debug_dir()))
    }

    /// Write unparseable replies to `<dir>/debug_<stage>.txt`.
    pub fn with_debug_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.debug_dir = dir;
        self
    }

    pub fn generator(&self) -> &Arc<dyn TextGenerator> {
        &self.generator
    }

    pub async fn run<TIn, TOut, S>(&self, stage: &S, input: &TIn) -> PipelineResult<TOut>
    where
        S: Stage<TIn, TOut> + ?Sized,
        TIn: Sync,
    {
        Ok(self.run_with_outcome(stage, input).await?.output)
    }

    pub async fn run_with_outcome<TIn, TOut, S>(
        &self,
        stage: &S,
        input: &TIn,
    ) -> PipelineResult<StageOutcome<TOut>>
    where
        S: Stage<TIn, TOut> + ?Sized,
        TIn: Sync,
    {
        let name = stage.name();
        let mut state = StageState::Pending;
        debug!(stage = name, ?state);

        let request = stage.request(input);
        state = StageState::Generating;
        debug!(stage = name, ?state, mode = %request.mode);
        let raw = match self
            .generator
            .generate(&request.prompt, request.max_output_tokens, request.mode)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                debug!(stage = name, state = ?StageState::Failed, error = %e);
                return Err(e);
            }
        };

        state = StageState::Parsing;
        debug!(stage = name, ?state, chars = raw.chars().count());
        match stage.parse(input, &raw) {
            Ok(output) => {
                debug!(stage = name, state = ?StageState::Validated);
                Ok(StageOutcome {
                    output,
                    used_default: false,
                })
            }
            Err(e) => {
                debug!(stage = name, state = ?StageState::Failed, error = %e);
                self.dump_raw(name, &raw);
                self.recover(stage, input, e)
            }
        }
    }

    fn recover<TIn, TOut, S>(
        &self,
        stage: &S,
        input: &TIn,
        error: PipelineError,
    ) -> PipelineResult<StageOutcome<TOut>>
    where
        S: Stage<TIn, TOut> + ?Sized,
    {
        if stage.policy() != StagePolicy::BestEffort || !error.is_output_error() {
            return Err(error);
        }
        match stage.default_output(input) {
            Some(output) => {
                warn!(stage = stage.name(), error = %error, "using default output");
                log_fallback!(stage.name(), error);
                Ok(StageOutcome {
                    output,
                    used_default: true,
                })
            }
            None => Err(error),
        }
    }

    fn dump_raw(&self, stage: &str, raw: &str) {
        let Some(dir) = &self.debug_dir else {
            return;
        };
        let path = dir.join(format!("debug_{}.txt", stage));
        match write_text_atomic(&path, raw) {
            Ok(()) => debug!(path = %path.display(), "raw reply saved"),
            Err(e) => warn!(error = %e, "could not save raw reply"),
        }
    }
}

/// Run one orchestration step with structured start/complete/failed events.
pub async fn execute_step<F, Fut, R>(
    step: usize,
    name: &str,
    total: usize,
    executor: F,
) -> anyhow::Result<R>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<R>>,
{
    log_stage_start!(step, name, total);
    match executor().await {
        Ok(result) => {
            log_stage_complete!(step, name);
            Ok(result)
        }
        Err(e) => {
            log_stage_failed!(step, name, e);
            Err(e)
        }
    }
}
