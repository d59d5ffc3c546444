//! Initial planning pipeline: idea to a validated 30-day content plan.
//!
//! ## Module Structure
//!
//! - `types` - Data structures for topics, platforms, SERP data and plans
//! - `cli` - Command-line argument definitions
//! - `step0_refine` - Optional interactive idea refinement
//! - `step1_expand` - Expand the idea into topic candidates
//! - `step2_score` - Score candidates and select one
//! - `step3_platform` - Recommend a publishing platform
//! - `step4_serp` - Collect and summarize competing search results
//! - `step5_plan` - Build and validate the 30-day rotation
//! - `keywords` - Standalone keyword expansion
//! - `workflow` - Orchestration and persistence

pub mod cli;
pub mod keywords;
pub mod step0_refine;
pub mod step1_expand;
pub mod step2_score;
pub mod step3_platform;
pub mod step4_serp;
pub mod step5_plan;
pub mod types;
pub mod workflow;

pub use workflow::{run_initial_pipeline, run_keyword_expand, run_planning, PlannerConfig, PlannerServices};
