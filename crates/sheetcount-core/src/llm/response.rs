//! Validation of the model's answer.
//!
//! The model is asked for a bare JSON object but often wraps it in a markdown
//! code fence. [`validate_response`] strips the fence, parses the JSON and
//! enforces the answer schema plus the one numeric invariant: per-colour counts
//! must add up to `total`.

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::ResponseError;
use crate::types::AnalysisResult;

const REQUIRED_KEYS: [&str; 4] = ["sheets_present", "colours", "total", "accuracy"];

/// Remove a surrounding triple-backtick fence, with or without a language tag.
///
/// Text without a fence is returned trimmed and otherwise unchanged.
pub fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        // Skip a language tag such as `json` or `JSON` directly after the fence
        let tag_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+')))
            .unwrap_or(rest.len());
        body = &rest[tag_len..];
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

/// Parse and validate the raw text returned by the model.
///
/// Every failure comes back as a [`ResponseError`] whose message is fit to show
/// to the user; nothing here panics.
pub fn validate_response(raw: &str) -> Result<AnalysisResult, ResponseError> {
    let cleaned = strip_code_fences(raw);
    let value: Value = serde_json::from_str(cleaned).map_err(|_| ResponseError::InvalidJson {
        raw: raw.trim().to_string(),
    })?;

    let object = value.as_object().ok_or(ResponseError::InvalidFormat)?;
    if !REQUIRED_KEYS.iter().all(|key| object.contains_key(*key)) {
        return Err(ResponseError::InvalidFormat);
    }

    let sheets_present = object["sheets_present"]
        .as_bool()
        .ok_or(ResponseError::InvalidSheetsPresent)?;

    let colours = parse_colours(&object["colours"])?;

    let total = object["total"].as_i64().ok_or(ResponseError::InvalidTotal)?;

    let sum: i128 = colours.values().map(|&count| i128::from(count)).sum();
    if sum != i128::from(total) {
        return Err(ResponseError::TotalMismatch { sum, total });
    }

    let accuracy = match &object["accuracy"] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    Ok(AnalysisResult {
        sheets_present,
        colours,
        total,
        accuracy,
    })
}

/// Read the `colours` object, requiring an integer count for every colour.
fn parse_colours(value: &Value) -> Result<IndexMap<String, i64>, ResponseError> {
    let map = value.as_object().ok_or(ResponseError::InvalidColours)?;
    map.iter()
        .map(|(name, count)| {
            count
                .as_i64()
                .map(|n| (name.clone(), n))
                .ok_or(ResponseError::InvalidColours)
        })
        .collect()
}
