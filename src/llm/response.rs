//! Gemini response handling: envelope extraction and verdict validation.
//!
//! `responseMimeType: "application/json"` should give clean JSON, but
//! fences are stripped anyway since some model versions still add them.

use super::types::{ConfidenceScores, InspectionStatus, Verdict};
use crate::error::InspectError;
use serde::Deserialize;
use serde_json::Value;

/// Remaining verdict fields, read once the status is known to be valid.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVerdict {
    object_type: String,
    description: String,
    #[serde(default)]
    confidence_scores: Option<ConfidenceScores>,
}

/// Concatenate `candidates[0].content.parts[*].text`.
///
/// Returns `None` when the envelope has no text at all (blocked prompt,
/// empty candidate list, non-text parts only).
pub fn extract_text(envelope: &Value) -> Option<String> {
    let parts = envelope
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Strip a surrounding ```json ... ``` fence if present.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the optional language tag on the opening fence line.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse model text into a validated [`Verdict`].
///
/// The status is checked first: any parseable JSON without a known status
/// label yields [`Verdict::unrecognized`]. Invalid JSON, or a known status
/// with missing fields, is an analysis failure.
pub fn parse_verdict(text: &str) -> Result<Verdict, InspectError> {
    let json_str = strip_code_fences(text);
    if json_str.is_empty() {
        return Err(InspectError::EmptyResponse);
    }

    let value: Value = serde_json::from_str(json_str).map_err(|e| {
        log::warn!(
            "[LLM] Failed to parse verdict: {} — raw: {}",
            e,
            excerpt(json_str, 200)
        );
        malformed(e)
    })?;

    let status = value
        .get("status")
        .and_then(Value::as_str)
        .and_then(InspectionStatus::from_label);
    let Some(status) = status else {
        log::warn!(
            "[LLM] Unrecognized status {} — using fallback verdict",
            value.get("status").unwrap_or(&Value::Null)
        );
        return Ok(Verdict::unrecognized());
    };

    let raw: RawVerdict = serde_json::from_value(value).map_err(|e| {
        log::warn!("[LLM] Verdict for status {} is incomplete: {}", status.name(), e);
        malformed(e)
    })?;

    Verdict::new(status, raw.object_type, raw.description, raw.confidence_scores)
}

fn malformed(e: serde_json::Error) -> InspectError {
    InspectError::AnalysisFailed(format!("malformed response from Gemini: {}", e))
}

/// Log token usage from `usageMetadata`, if the envelope carries it.
pub fn log_usage(envelope: &Value) {
    if let Some(usage) = envelope.get("usageMetadata") {
        let input = usage["promptTokenCount"].as_u64().unwrap_or(0);
        let output = usage["candidatesTokenCount"].as_u64().unwrap_or(0);
        log::info!("[LLM] Input tokens: {}", input);
        log::info!("[LLM] Output tokens: {}", output);
    }
}

/// First `max` chars of `text`, for log lines and error messages.
pub fn excerpt(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
