//! Single-day generation with resume state and trend keywords.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use blog_pipeline_sdk::{log_day_complete, log_day_start};

use crate::content::types::{FinishedPost, ToneStyleGuide};
use crate::content::writer::{DayOutcome, DayWriter};
use crate::error::{PipelineError, PipelineResult};
use crate::interactive::{ask_number, Prompter};
use crate::planner::types::{ContentPlan, PLAN_DAYS};
use crate::workflow_utils::files::{content_file, DAILY_STATE};
use crate::workflow_utils::{read_json, write_json_atomic};

const LAST_DAY: u32 = PLAN_DAYS as u32;

/// Resume point shared by the daily generator and the batch runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyState {
    pub last_generated_day: Option<u32>,
    pub next_day: u32,
    pub last_generated_at: Option<String>,
}

impl Default for DailyState {
    fn default() -> Self {
        Self {
            last_generated_day: None,
            next_day: 1,
            last_generated_at: None,
        }
    }
}

impl DailyState {
    pub fn path(output_dir: &Path) -> PathBuf {
        output_dir.join(DAILY_STATE)
    }

    /// Missing file means nothing generated yet.
    pub fn load(output_dir: &Path) -> PipelineResult<Self> {
        let path = Self::path(output_dir);
        if !path.exists() {
            return Ok(Self::default());
        }
        read_json(&path)
    }

    /// Persist `day` as the latest success; `next_day` is stored as `day + 1`.
    pub fn record(output_dir: &Path, day: u32) -> PipelineResult<Self> {
        let state = Self {
            last_generated_day: Some(day),
            next_day: day + 1,
            last_generated_at: Some(chrono::Local::now().to_rfc3339()),
        };
        write_json_atomic(&Self::path(output_dir), &state)?;
        Ok(state)
    }

    /// Day to generate next, starting the rotation over past the plan's end.
    pub fn resume_day(&self) -> u32 {
        if (1..=LAST_DAY).contains(&self.next_day) {
            self.next_day
        } else {
            1
        }
    }
}

pub fn check_day(day: u32) -> PipelineResult<u32> {
    if (1..=LAST_DAY).contains(&day) {
        Ok(day)
    } else {
        Err(PipelineError::validation(
            "daily_content",
            format!("day must be between 1 and {}, got {}", LAST_DAY, day),
        ))
    }
}

/// Explicit day wins, then `--auto`, then an interactive prompt.
pub fn resolve_day(
    day: Option<u32>,
    auto: bool,
    state: &DailyState,
    prompter: &dyn Prompter,
) -> PipelineResult<u32> {
    if let Some(day) = day {
        return check_day(day);
    }
    if auto {
        return Ok(state.resume_day());
    }
    let answer = ask_number(
        prompter,
        &format!("생성할 Day (1-{})", LAST_DAY),
        state.resume_day(),
    )?;
    check_day(answer)
}

/// Deterministic trend data merged into a day's keywords.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSnapshot {
    pub date: String,
    pub hot_keywords: Vec<String>,
    pub related_news: Vec<String>,
    pub seasonal_context: String,
}

impl TrendSnapshot {
    pub fn today() -> Self {
        Self {
            date: chrono::Local::now().format("%Y-%m-%d").to_string(),
            hot_keywords: vec![
                "겨울 여행".into(),
                "크리스마스 공연".into(),
                "연말 할인".into(),
            ],
            related_news: vec![
                "2025년 겨울 가족 여행지 TOP 10".into(),
                "어린이 공연 티켓 50% 할인 이벤트".into(),
            ],
            seasonal_context: "겨울 시즌, 연말 분위기".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DailyOptions {
    pub use_trends: bool,
    pub regenerate: bool,
}

#[derive(Debug)]
pub enum DailyOutcome {
    /// The day's file already existed and regeneration was not requested.
    Skipped { day: u32, path: PathBuf },
    Generated {
        day: u32,
        path: PathBuf,
        outcome: Box<DayOutcome>,
    },
}

impl DailyOutcome {
    pub fn post(&self) -> Option<&FinishedPost> {
        match self {
            Self::Generated { outcome, .. } => Some(&outcome.post),
            Self::Skipped { .. } => None,
        }
    }
}

pub struct DailyGenerator {
    writer: DayWriter,
    output_dir: PathBuf,
}

impl DailyGenerator {
    pub fn new(writer: DayWriter, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            writer,
            output_dir: output_dir.into(),
        }
    }

    /// Write `content/dayNN_content.json` and advance the resume state.
    pub async fn generate(
        &self,
        plan: &ContentPlan,
        guide: &ToneStyleGuide,
        day: u32,
        options: DailyOptions,
    ) -> PipelineResult<DailyOutcome> {
        let day = check_day(day)?;
        let path = content_file(&self.output_dir, day);
        if path.exists() && !options.regenerate {
            info!(day, path = %path.display(), "day already generated, skipping");
            return Ok(DailyOutcome::Skipped { day, path });
        }

        let item = plan.item(day).ok_or_else(|| {
            PipelineError::validation("daily_content", format!("day {} is not in the plan", day))
        })?;
        log_day_start!(day, item.title);

        let trends = if options.use_trends {
            TrendSnapshot::today().hot_keywords
        } else {
            Vec::new()
        };
        let outcome = self.writer.write(item, guide, &trends).await?;

        write_json_atomic(&path, &outcome.post)?;
        DailyState::record(&self.output_dir, day)?;
        log_day_complete!(day, outcome.post.full_text_length);

        Ok(DailyOutcome::Generated {
            day,
            path,
            outcome: Box::new(outcome),
        })
    }
}
