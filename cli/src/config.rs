use std::time::Duration;

use fluency_core::scenarios::{self, ScenarioDefinition};
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is required")]
    MissingApiKey,

    #[error("invalid API URL '{url}': {source}")]
    InvalidApiUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("model name must not be empty")]
    EmptyModel,

    #[error("timeout must be at least one second")]
    ZeroTimeout,

    #[error(transparent)]
    Scenario(#[from] fluency_core::Error),
}

impl ConfigError {
    pub fn docs_hint(&self) -> Option<&'static str> {
        match self {
            ConfigError::MissingApiKey => Some("Set --api-key or GEMINI_API_KEY (a .env file works too)."),
            ConfigError::InvalidApiUrl { .. } => {
                Some("Use the API base, e.g. https://generativelanguage.googleapis.com/v1beta")
            }
            ConfigError::Scenario(err) => err.docs_hint(),
            _ => None,
        }
    }
}

/// Validated settings for a tutoring session.
#[derive(Clone)]
pub struct TutorConfig {
    pub api_url: Url,
    pub model: String,
    api_key: String,
    pub timeout: Duration,
    pub scenario: &'static ScenarioDefinition,
}

impl TutorConfig {
    pub fn new(
        api_url: &str,
        model: &str,
        api_key: Option<&str>,
        timeout_secs: u64,
        scenario_id: &str,
    ) -> Result<Self, ConfigError> {
        let api_key = api_key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;
        let parsed_url = Url::parse(api_url).map_err(|source| ConfigError::InvalidApiUrl {
            url: api_url.to_string(),
            source,
        })?;
        let model = model.trim();
        if model.is_empty() {
            return Err(ConfigError::EmptyModel);
        }
        if timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(Self {
            api_url: parsed_url,
            model: model.to_string(),
            api_key: api_key.to_string(),
            timeout: Duration::from_secs(timeout_secs),
            scenario: scenarios::find(scenario_id)?,
        })
    }

    /// `<api-url>/models/<model>:generateContent?key=<api-key>`
    pub fn endpoint(&self) -> Result<Url, url::ParseError> {
        let base = self.api_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/models/{}:generateContent", self.model))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }
}

impl std::fmt::Debug for TutorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TutorConfig")
            .field("api_url", &self.api_url.as_str())
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("scenario", &self.scenario.id)
            .finish()
    }
}
