use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Sessions shorter than this are not worth analyzing.
pub const MIN_TURNS_FOR_ANALYSIS: usize = 4;

/// End-of-session performance report returned by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: String,
    pub mistakes: Vec<String>,
    pub strength: String,
    pub improvement: String,
}

/// Decodes the model's analysis text. Models like to wrap JSON in a markdown
/// fence, so one surrounding fence is tolerated; anything else that is not the
/// four-field object is a decode error.
pub fn decode_report(text: &str) -> Result<AnalysisReport, Error> {
    serde_json::from_str(strip_code_fence(text)).map_err(Error::AnalysisDecode)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return trimmed;
    };
    // Drop an info string such as `json` on the opening line.
    match inner.split_once('\n') {
        Some((info, body)) if !info.trim_start().starts_with('{') => body.trim(),
        _ => inner.trim(),
    }
}
