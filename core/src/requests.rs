use serde::Serialize;
use uuid::Uuid;

/// Identifies one outstanding request to the text-generation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// What came back from the text-generation endpoint for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    /// `candidates[0].content.parts[0].text`
    Text(String),
    /// The call succeeded but carried no candidate text.
    Empty,
    /// Transport or decode failure.
    Failed(String),
}

/// A chat turn in flight. The user turn is already in the transcript.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub id: RequestId,
    pub(crate) epoch: u64,
    pub utterance: String,
    pub prompt: String,
}

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub id: RequestId,
    pub(crate) epoch: u64,
    pub prompt: String,
}

#[derive(Debug, Clone)]
pub struct ExplanationRequest {
    pub id: RequestId,
    pub(crate) epoch: u64,
    pub correction_id: Uuid,
    pub prompt: String,
}

/// Any outstanding request, as handed to whatever performs the network call.
#[derive(Debug, Clone)]
pub enum PendingRequest {
    Chat(ChatRequest),
    Analysis(AnalysisRequest),
    Explanation(ExplanationRequest),
}

impl PendingRequest {
    pub fn id(&self) -> RequestId {
        match self {
            PendingRequest::Chat(request) => request.id,
            PendingRequest::Analysis(request) => request.id,
            PendingRequest::Explanation(request) => request.id,
        }
    }

    pub fn prompt(&self) -> &str {
        match self {
            PendingRequest::Chat(request) => &request.prompt,
            PendingRequest::Analysis(request) => &request.prompt,
            PendingRequest::Explanation(request) => &request.prompt,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PendingRequest::Chat(_) => "chat",
            PendingRequest::Analysis(_) => "analysis",
            PendingRequest::Explanation(_) => "explanation",
        }
    }
}
