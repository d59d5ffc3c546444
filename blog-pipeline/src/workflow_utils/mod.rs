//! Reusable pieces shared by every pipeline step
//!
//! - **json**: JSON recovery from generator replies
//! - **stage**: `Stage` trait, runner and fallback policy
//! - **files**: artifact names and atomic persistence

pub mod files;
pub mod json;
pub mod stage;

pub use files::{read_json, read_prerequisite, write_json_atomic, write_text_atomic};
pub use json::JsonExtractor;
pub use stage::{execute_step, Stage, StageOutcome, StagePolicy, StageRequest, StageRunner, StageState};
