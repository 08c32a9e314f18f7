use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::config::TutorConfig;

#[derive(Debug, Error)]
pub enum TutorError {
    #[error("request to the generation endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("generation endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid generation endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Anything that turns a prompt into model text. `Ok(None)` means the call
/// went through but the response had no candidate text.
pub trait TextGenerator: Send + Sync + 'static {
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<Option<String>, TutorError>> + Send;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    fn single_prompt(text: &'a str) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text }],
            }],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// `candidates[0].content.parts[0].text`, treating an empty string as missing.
    pub fn into_first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
            .filter(|text| !text.is_empty())
    }
}

/// Client for the `generateContent` endpoint of the generative-language API.
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl GeminiClient {
    pub fn new(config: &TutorConfig) -> Result<Self, TutorError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint()?,
        })
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, TutorError> {
        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(&GenerateContentRequest::single_prompt(prompt))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "generation endpoint returned non-success status");
            // Error bodies are JSON without candidates; they read as an empty
            // response. Only an undecodable body counts as a failure.
            let body = resp.text().await?;
            return match serde_json::from_str::<GenerateContentResponse>(&body) {
                Ok(parsed) => Ok(parsed.into_first_text()),
                Err(_) => Err(TutorError::Status { status, body }),
            };
        }

        let parsed: GenerateContentResponse = resp.json().await?;
        Ok(parsed.into_first_text())
    }
}
