use serde::{Deserialize, Serialize};

/// Prefix that marks a structured event line on stderr.
pub const EVENT_PREFIX: &str = "__BLOG_EVENT__:";

/// Structured logging events emitted by pipeline runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineLog {
    /// Stage started
    StageStarted {
        stage: usize,
        name: String,
        total_stages: usize,
    },
    /// Stage completed
    StageCompleted {
        stage: usize,
        name: String,
    },
    /// Stage failed
    StageFailed {
        stage: usize,
        name: String,
        error: String,
    },
    /// A best-effort stage substituted its default output
    FallbackUsed {
        stage_name: String,
        reason: String,
    },
    /// Per-day generation started
    DayStarted {
        day: u32,
        title: String,
        total_days: Option<usize>,
    },
    /// Per-day generation completed
    DayCompleted {
        day: u32,
        char_count: usize,
    },
    /// Per-day generation failed
    DayFailed {
        day: u32,
        error: String,
    },
    /// Artifact written to disk
    StateFileCreated {
        stage: usize,
        file_path: String,
        description: String,
    },
}

impl PipelineLog {
    /// Serialize into a single prefixed line.
    pub fn to_line(&self) -> Option<String> {
        serde_json::to_string(self)
            .ok()
            .map(|json| format!("{}{}", EVENT_PREFIX, json))
    }

    /// Parse a line produced by [`PipelineLog::to_line`].
    pub fn parse_line(line: &str) -> Option<Self> {
        let json = line.strip_prefix(EVENT_PREFIX)?;
        serde_json::from_str(json).ok()
    }

    /// Emit this event to stderr
    pub fn emit(&self) {
        if let Some(line) = self.to_line() {
            use std::io::Write;
            eprintln!("{}", line);
            let _ = std::io::stderr().flush();
        }
    }
}

/// Helper macros for structured pipeline logging
#[macro_export]
macro_rules! log_stage_start {
    ($stage:expr, $name:expr, $total:expr) => {
        $crate::PipelineLog::StageStarted {
            stage: $stage,
            name: $name.to_string(),
            total_stages: $total,
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_stage_complete {
    ($stage:expr, $name:expr) => {
        $crate::PipelineLog::StageCompleted {
            stage: $stage,
            name: $name.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_stage_failed {
    ($stage:expr, $name:expr, $error:expr) => {
        $crate::PipelineLog::StageFailed {
            stage: $stage,
            name: $name.to_string(),
            error: $error.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_fallback {
    ($stage_name:expr, $reason:expr) => {
        $crate::PipelineLog::FallbackUsed {
            stage_name: $stage_name.to_string(),
            reason: $reason.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_day_start {
    ($day:expr, $title:expr) => {
        $crate::PipelineLog::DayStarted {
            day: $day,
            title: $title.to_string(),
            total_days: None,
        }
        .emit();
    };
    ($day:expr, $title:expr, $total:expr) => {
        $crate::PipelineLog::DayStarted {
            day: $day,
            title: $title.to_string(),
            total_days: Some($total),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_day_complete {
    ($day:expr, $char_count:expr) => {
        $crate::PipelineLog::DayCompleted {
            day: $day,
            char_count: $char_count,
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_day_failed {
    ($day:expr, $error:expr) => {
        $crate::PipelineLog::DayFailed {
            day: $day,
            error: $error.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_state_file {
    ($stage:expr, $path:expr, $desc:expr) => {
        $crate::PipelineLog::StateFileCreated {
            stage: $stage,
            file_path: $path.to_string(),
            description: $desc.to_string(),
        }
        .emit();
    };
}

// ============================================================================
// Console Logging Macros
// ============================================================================
// Colored, human-readable lines on stdout. They complement the structured
// PipelineLog events on stderr.
// ============================================================================

/// Logs the start of a pipeline stage with a header and description.
///
/// # Example
/// ```
/// use blog_pipeline_sdk::log_stage_start_console;
/// log_stage_start_console!(1, "Idea Expansion", "Expand the idea into topic candidates");
/// ```
///
/// Outputs:
/// ```text
/// ═══ STEP 1: Idea Expansion ═══
/// Expand the idea into topic candidates
/// ```
#[macro_export]
macro_rules! log_stage_start_console {
    ($stage:expr, $title:expr, $description:expr) => {
        println!("\x1b[1;36m═══ STEP {}: {} ═══\x1b[0m", $stage, $title);
        println!("\x1b[36m{}\x1b[0m", $description);
    };
}

/// Logs the completion of a pipeline stage.
///
/// # Example
/// ```
/// use blog_pipeline_sdk::log_stage_complete_console;
/// log_stage_complete_console!(1);
/// ```
#[macro_export]
macro_rules! log_stage_complete_console {
    ($stage:expr) => {
        println!("\x1b[32m✓ Step {} complete\x1b[0m", $stage);
    };
}

/// Logs a per-day status line inside a batch.
///
/// # Example
/// ```
/// use blog_pipeline_sdk::log_day_status;
/// log_day_status!(3, 30, "success", "겨울 가족 여행 준비물");
/// ```
///
/// Outputs:
/// ```text
/// [3/30] success: 겨울 가족 여행 준비물
/// ```
#[macro_export]
macro_rules! log_day_status {
    ($day:expr, $total:expr, $status:expr, $title:expr) => {
        println!(
            "\x1b[36m[{}/{}]\x1b[0m {}: {}",
            $day, $total, $status, $title
        );
    };
}

/// Logs a batch tally.
///
/// # Example
/// ```
/// use blog_pipeline_sdk::log_batch_summary;
/// log_batch_summary!(8, 2, 10);
/// ```
///
/// Outputs:
/// ```text
/// Batch: ✓ 8 succeeded, ✗ 2 failed (10 attempted)
/// ```
#[macro_export]
macro_rules! log_batch_summary {
    ($succeeded:expr, $failed:expr, $attempted:expr) => {
        println!(
            "\x1b[1mBatch: \x1b[32m✓ {} succeeded\x1b[0m, \x1b[31m✗ {} failed\x1b[0m ({} attempted)",
            $succeeded, $failed, $attempted
        );
    };
}

/// Logs progress of an operation.
///
/// # Example
/// ```
/// use blog_pipeline_sdk::log_progress;
/// log_progress!(3, 30, "SERP pages");
/// ```
#[macro_export]
macro_rules! log_progress {
    ($current:expr, $total:expr, $item_type:expr) => {
        println!(
            "\x1b[36mProgress: {}/{} {}\x1b[0m",
            $current, $total, $item_type
        );
    };
}

/// Logs the number of items found.
///
/// # Example
/// ```
/// use blog_pipeline_sdk::log_found;
/// log_found!(12, "topic candidates");
/// ```
#[macro_export]
macro_rules! log_found {
    ($count:expr, $item_type:expr) => {
        println!("\x1b[36mFound {} {}\x1b[0m", $count, $item_type);
    };
}

/// Logs an informational message.
///
/// # Example
/// ```
/// use blog_pipeline_sdk::log_info;
/// log_info!("Loading tone_style_guide.json...");
/// ```
#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        println!("\x1b[36mℹ {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[36mℹ {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs a warning message.
///
/// # Example
/// ```
/// use blog_pipeline_sdk::log_warning;
/// log_warning!("Quality backend not configured");
/// ```
#[macro_export]
macro_rules! log_warning {
    ($message:expr) => {
        println!("\x1b[33m⚠ Warning: {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[33m⚠ Warning: {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs that a file has been saved.
///
/// # Example
/// ```
/// use blog_pipeline_sdk::log_file_saved;
/// log_file_saved!("outputs/content/day01_content.json");
/// ```
#[macro_export]
macro_rules! log_file_saved {
    ($path:expr) => {
        println!("\x1b[32m✓ Saved: {}\x1b[0m", $path);
    };
}
