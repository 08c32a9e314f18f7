use serde::Serialize;
use thiserror::Error;

/// Recoverable session errors. None of these end a session; the front end
/// surfaces them as notices and keeps going.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),

    #[error("nothing to send")]
    EmptyUtterance,

    #[error("Please chat a bit more before analyzing!")]
    TranscriptTooShort { turns: usize, required: usize },

    #[error("no correction at position {0}")]
    UnknownCorrection(usize),

    #[error("Could not generate report at this time.")]
    AnalysisDecode(#[source] serde_json::Error),

    #[error("Could not generate report at this time.")]
    AnalysisUnavailable(String),

    #[error("Speech recognition is not supported here.")]
    VoiceUnsupported,
}

/// Structured error payload for anything printed on stderr.
/// Enough context for a user (or a script) to see what went wrong and what to try next.
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    /// Machine-readable error code (see [`codes`])
    pub error: String,
    /// Human-readable description of what went wrong
    pub message: String,
    /// Hint about what to do instead
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_hint: Option<String>,
}

/// Error codes used across the workspace
pub mod codes {
    pub const UNKNOWN_SCENARIO: &str = "unknown_scenario";
    pub const EMPTY_UTTERANCE: &str = "empty_utterance";
    pub const TRANSCRIPT_TOO_SHORT: &str = "transcript_too_short";
    pub const UNKNOWN_CORRECTION: &str = "unknown_correction";
    pub const ANALYSIS_DECODE_FAILED: &str = "analysis_decode_failed";
    pub const ANALYSIS_UNAVAILABLE: &str = "analysis_unavailable";
    pub const VOICE_UNSUPPORTED: &str = "voice_unsupported";
    pub const CONFIG_INVALID: &str = "config_invalid";
    pub const CONNECTION_ERROR: &str = "connection_error";
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::UnknownScenario(_) => codes::UNKNOWN_SCENARIO,
            Error::EmptyUtterance => codes::EMPTY_UTTERANCE,
            Error::TranscriptTooShort { .. } => codes::TRANSCRIPT_TOO_SHORT,
            Error::UnknownCorrection(_) => codes::UNKNOWN_CORRECTION,
            Error::AnalysisDecode(_) => codes::ANALYSIS_DECODE_FAILED,
            Error::AnalysisUnavailable(_) => codes::ANALYSIS_UNAVAILABLE,
            Error::VoiceUnsupported => codes::VOICE_UNSUPPORTED,
        }
    }

    pub fn docs_hint(&self) -> Option<&'static str> {
        match self {
            Error::UnknownScenario(_) => Some("Run /scenarios to list the available ids."),
            Error::UnknownCorrection(_) => {
                Some("Run /corrections; positions start at 1 with the newest entry.")
            }
            Error::TranscriptTooShort { .. } => {
                Some("Analysis needs at least a few exchanges to work with.")
            }
            _ => None,
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            error: self.code().to_string(),
            message: self.to_string(),
            docs_hint: self.docs_hint().map(str::to_string),
        }
    }
}
