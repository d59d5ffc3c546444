//! Sequential generation over a range of days.
//!
//! Each day is written to `batch_posts/dayNN.json` before the next starts.
//! A run stops early after `failure_limit` consecutive failed days; the
//! summary is written either way.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{error, warn};

use blog_pipeline_sdk::{
    log_batch_summary, log_day_complete, log_day_failed, log_day_start, log_day_status,
    log_file_saved, log_warning,
};

use crate::content::daily::DailyState;
use crate::content::types::ToneStyleGuide;
use crate::content::writer::DayWriter;
use crate::error::{PipelineError, PipelineResult};
use crate::planner::types::{ContentPlan, ContentPlanItem, PLAN_DAYS};
use crate::workflow_utils::files::{batch_file, BATCH_SUMMARY};
use crate::workflow_utils::write_json_atomic;

const LAST_DAY: u32 = PLAN_DAYS as u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRange {
    pub start: u32,
    pub end: u32,
}

impl BatchRange {
    /// Both bounds are clamped into the plan before comparing.
    pub fn new(start: u32, end: u32) -> PipelineResult<Self> {
        let start = start.clamp(1, LAST_DAY);
        let end = end.clamp(1, LAST_DAY);
        if start > end {
            return Err(PipelineError::validation(
                "batch_posts",
                format!("start day {} is after end day {}", start, end),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn days(&self) -> std::ops::RangeInclusive<u32> {
        self.start..=self.end
    }

    pub fn len(&self) -> usize {
        (self.end - self.start + 1) as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayReport {
    pub day: u32,
    pub title: String,
    pub status: DayStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub char_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// Persisted as `batch_posts/generation_summary.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub generated_at: String,
    pub range: BatchRange,
    /// Days attempted, which is less than the range after an abort.
    pub total_count: usize,
    pub successful: usize,
    pub failed: usize,
    pub aborted: bool,
    pub results: Vec<DayReport>,
}

pub struct BatchRunner {
    writer: DayWriter,
    output_dir: PathBuf,
    failure_limit: usize,
}

impl BatchRunner {
    pub fn new(writer: DayWriter, output_dir: impl Into<PathBuf>, failure_limit: usize) -> Self {
        Self {
            writer,
            output_dir: output_dir.into(),
            failure_limit: failure_limit.max(1),
        }
    }

    pub fn summary_path(&self) -> PathBuf {
        self.output_dir.join("batch_posts").join(BATCH_SUMMARY)
    }

    async fn run_day(
        &self,
        item: &ContentPlanItem,
        guide: &ToneStyleGuide,
    ) -> PipelineResult<(usize, PathBuf)> {
        let outcome = self.writer.write(item, guide, &[]).await?;
        let path = batch_file(&self.output_dir, item.day);
        write_json_atomic(&path, &outcome.post)?;
        DailyState::record(&self.output_dir, item.day)?;
        Ok((outcome.post.full_text_length, path))
    }

    pub async fn run(
        &self,
        plan: &ContentPlan,
        guide: &ToneStyleGuide,
        range: BatchRange,
    ) -> PipelineResult<BatchSummary> {
        let total = range.len();
        let mut results = Vec::with_capacity(total);
        let mut streak = 0usize;
        let mut aborted = false;

        for day in range.days() {
            let title = plan.item(day).map(|i| i.title.clone()).unwrap_or_default();
            log_day_start!(day, title, total);

            let attempt = match plan.item(day) {
                Some(item) => self.run_day(item, guide).await,
                None => Err(PipelineError::validation(
                    "batch_posts",
                    format!("day {} is not in the plan", day),
                )),
            };

            match attempt {
                Ok((char_count, path)) => {
                    streak = 0;
                    log_day_complete!(day, char_count);
                    log_day_status!(day, range.end, "✓", format!("{} ({}자)", title, char_count));
                    results.push(DayReport {
                        day,
                        title,
                        status: DayStatus::Success,
                        char_count: Some(char_count),
                        error: None,
                        file: Some(path.display().to_string()),
                    });
                }
                Err(e) => {
                    streak += 1;
                    error!(day, error = %e, "day failed");
                    log_day_failed!(day, e);
                    log_day_status!(day, range.end, "✗", format!("{} ({})", title, e));
                    results.push(DayReport {
                        day,
                        title,
                        status: DayStatus::Failed,
                        char_count: None,
                        error: Some(e.to_string()),
                        file: None,
                    });
                    if streak >= self.failure_limit {
                        warn!(streak, "consecutive failure limit reached, stopping batch");
                        log_warning!(
                            "{}회 연속 실패로 남은 작업을 중단합니다",
                            self.failure_limit
                        );
                        aborted = true;
                        break;
                    }
                }
            }
        }

        let successful = results
            .iter()
            .filter(|r| r.status == DayStatus::Success)
            .count();
        let summary = BatchSummary {
            generated_at: chrono::Local::now().to_rfc3339(),
            range,
            total_count: results.len(),
            successful,
            failed: results.len() - successful,
            aborted,
            results,
        };

        let path = self.summary_path();
        write_json_atomic(&path, &summary)?;
        log_batch_summary!(summary.successful, summary.failed, summary.total_count);
        log_file_saved!(path.display());
        Ok(summary)
    }
}
