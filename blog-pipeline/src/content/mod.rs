//! Tone derivation and per-day post generation.
//!
//! ## Module Structure
//!
//! - `types` - Tone analysis, style guide, outline and post structures
//! - `cli` - Command-line argument definitions
//! - `tone` - Two-call tone & style guide derivation
//! - `structure` - Outline stage
//! - `prose` - Prose stage
//! - `writer` - One day: outline then prose
//! - `daily` - Single-day runs with resume state and trend keywords
//! - `batch` - Day ranges with a consecutive-failure limit
//! - `workflow` - Orchestration and persistence

pub mod batch;
pub mod cli;
pub mod daily;
pub mod prose;
pub mod structure;
pub mod tone;
pub mod types;
pub mod workflow;
pub mod writer;

pub use batch::{BatchRange, BatchRunner, BatchSummary, DayReport, DayStatus};
pub use daily::{DailyGenerator, DailyOptions, DailyOutcome, DailyState, TrendSnapshot};
pub use workflow::{run_batch, run_batch_posts, run_daily, run_daily_content, run_tone_derivation, run_tone_style};
pub use writer::{DayOutcome, DayWriter};
