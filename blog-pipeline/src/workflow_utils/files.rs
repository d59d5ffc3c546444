//! Artifact persistence.
//!
//! Every write goes to a sibling temp file first and is then renamed over the
//! target, so readers see either the old file or the new one.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};

pub const INITIAL_PIPELINE_RESULT: &str = "initial_pipeline_result.json";
pub const SERP_DATA: &str = "serp_data.json";
pub const TONE_STYLE_GUIDE: &str = "tone_style_guide.json";
pub const TONE_ANALYSIS: &str = "tone_analysis.json";
pub const KEYWORD_EXPANSION: &str = "keyword_expansion.json";
pub const DAILY_STATE: &str = "daily_generation_state.json";
pub const BATCH_SUMMARY: &str = "generation_summary.json";

pub fn content_file(output_dir: &Path, day: u32) -> PathBuf {
    output_dir.join("content").join(format!("day{:02}_content.json", day))
}

pub fn batch_file(output_dir: &Path, day: u32) -> PathBuf {
    output_dir.join("batch_posts").join(format!("day{:02}.json", day))
}

pub fn write_text_atomic(path: &Path, content: &str) -> PipelineResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));

    std::fs::write(&tmp, content).map_err(|e| PipelineError::io(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        PipelineError::io(path, e)
    })
}

/// Pretty (2-space) JSON with non-ASCII text kept verbatim.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> PipelineResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_text_atomic(path, &json)
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> PipelineResult<T> {
    let content = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

/// Read an upstream artifact, mapping absence to `MissingPrerequisite`.
pub fn read_prerequisite<T: DeserializeOwned>(path: &Path, hint: &str) -> PipelineResult<T> {
    if !path.exists() {
        return Err(PipelineError::MissingPrerequisite {
            path: path.to_path_buf(),
            hint: hint.to_string(),
        });
    }
    read_json(path)
}
