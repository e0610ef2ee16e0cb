//! Core data types for a sheet-count analysis.
//!
//! These types describe the uploaded image and the validated answer from the
//! vision model, plus the report shape shown to users.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Properties of an uploaded image, shown before analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Client-supplied file name
    pub file_name: String,

    /// Image width in pixels
    pub width: u32,

    /// Image height in pixels
    pub height: u32,

    /// Colour mode ("L", "LA", "RGB", "RGBA", ...)
    pub mode: String,

    /// Detected container format ("png", "jpeg", ...)
    pub format: String,

    /// Upload size in bytes
    pub file_size: u64,
}

/// A validated answer from the vision model.
///
/// The per-colour counts always sum to `total`; the validator refuses anything
/// else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Whether the model saw any countable sheets
    pub sheets_present: bool,

    /// Sheet count per colour name, in the order the model listed them
    pub colours: IndexMap<String, i64>,

    /// Sum of all colour counts
    pub total: i64,

    /// Self-reported confidence, e.g. "95%"
    pub accuracy: String,
}

impl AnalysisResult {
    /// Parse the accuracy string ("95%", "82 %", "70") into a whole percentage.
    ///
    /// Returns `None` when the model reported something that isn't a number.
    pub fn accuracy_percent(&self) -> Option<u8> {
        let digits = self.accuracy.trim().trim_end_matches('%').trim();
        let value: f64 = digits.parse().ok()?;
        if (0.0..=100.0).contains(&value) {
            Some(value.round() as u8)
        } else {
            None
        }
    }
}

/// A completed analysis together with the image it was run on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub image: ImageInfo,
    pub result: AnalysisResult,
}

/// Uniform error object: `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub error: String,
}

impl ErrorReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// What a user sees after an analysis: the result or an error object.
///
/// Serializes untagged, so JSON consumers get either the result fields or a
/// lone `error` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisReport {
    Failure(ErrorReport),
    Success(AnalysisResult),
}

impl AnalysisReport {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl<E: std::fmt::Display> From<Result<AnalysisResult, E>> for AnalysisReport {
    fn from(result: Result<AnalysisResult, E>) -> Self {
        match result {
            Ok(analysis) => Self::Success(analysis),
            Err(e) => Self::Failure(ErrorReport::new(e.to_string())),
        }
    }
}
