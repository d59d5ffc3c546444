//! JSON recovery from free-form generator replies.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{MalformedKind, PipelineError, PipelineResult};

/// Interior of the first fenced code block, if any.
///
/// Handles ```` ```json ```` and bare ```` ``` ```` fences. An unterminated
/// fence runs to the end of the text.
pub fn fenced_block(text: &str) -> Option<&str> {
    let (start, tag_len) = match text.find("```json") {
        Some(pos) => (pos, 7),
        None => (text.find("```")?, 3),
    };
    let body_start = start + tag_len;
    let rest = &text[body_start..];
    let body = match rest.find("```") {
        Some(end) => &rest[..end],
        None => rest,
    };
    Some(body.trim())
}

/// Substring from the first `{` to the last `}` inclusive.
///
/// A truncated reply with an opening brace but no closing one yields the tail
/// from that brace, so it surfaces as invalid JSON rather than as "no JSON".
pub fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    match text.rfind('}') {
        Some(end) if end > start => Some(&text[start..=end]),
        _ => Some(&text[start..]),
    }
}

/// Stateless extractor used after every structured generation call.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExtractor;

impl JsonExtractor {
    /// Recover a single JSON object from `raw`.
    pub fn extract(raw: &str) -> PipelineResult<Value> {
        let candidate = fenced_block(raw)
            .filter(|block| block.contains('{'))
            .unwrap_or(raw);
        let span = brace_span(candidate).ok_or_else(|| PipelineError::MalformedOutput {
            kind: MalformedKind::NoJsonFound,
            raw_text: raw.to_string(),
        })?;

        match serde_json::from_str::<Value>(span) {
            Ok(value) if value.is_object() => Ok(value),
            Ok(_) => Err(PipelineError::MalformedOutput {
                kind: MalformedKind::InvalidJson("top-level value is not an object".to_string()),
                raw_text: raw.to_string(),
            }),
            Err(e) => Err(PipelineError::MalformedOutput {
                kind: MalformedKind::InvalidJson(e.to_string()),
                raw_text: raw.to_string(),
            }),
        }
    }

    /// Extract and deserialize; shape mismatches are validation errors for `stage`.
    pub fn extract_as<T: DeserializeOwned>(stage: &str, raw: &str) -> PipelineResult<T> {
        let value = Self::extract(raw)?;
        serde_json::from_value(value)
            .map_err(|e| PipelineError::validation(stage, format!("unexpected shape: {}", e)))
    }
}
