use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::corrections::Correction;
use crate::requests::RequestId;

/// Who a transcript entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Assistant,
    /// Corrections and local notices, shown apart from the dialogue.
    Annotation,
}

impl Speaker {
    pub fn as_str(self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Assistant => "assistant",
            Speaker::Annotation => "annotation",
        }
    }
}

/// One message-equivalent entry in the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// UUIDv7, sortable by creation time
    pub id: Uuid,
    pub speaker: Speaker,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Present on annotation turns derived from a correction block.
    /// An annotation turn without it is a local notice (e.g. a connection error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correction: Option<Correction>,
    /// The chat request this turn belongs to, if any.
    #[serde(skip)]
    pub(crate) request: Option<RequestId>,
}

impl Turn {
    fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            speaker,
            text: text.into(),
            created_at: Utc::now(),
            correction: None,
            request: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Speaker::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Speaker::Assistant, text)
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Self::new(Speaker::Annotation, text)
    }

    /// Annotation turn for an extracted correction; its text is the corrected sentence.
    pub fn annotation(correction: Correction) -> Self {
        let mut turn = Self::new(Speaker::Annotation, correction.corrected_text.clone());
        turn.correction = Some(correction);
        turn
    }

    pub(crate) fn for_request(mut self, request: RequestId) -> Self {
        self.request = Some(request);
        self
    }
}

/// Ordered log of turns. Append-only during a session, replaced wholesale on reset.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn starting_with(intro: Turn) -> Self {
        Self { turns: vec![intro] }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Places `turns` right after the last turn already tagged with `request`,
    /// so a request's reply stays next to its own user turn whatever order
    /// completions arrive in. Falls back to appending when nothing is tagged.
    pub fn insert_for_request(&mut self, request: RequestId, turns: Vec<Turn>) {
        let position = self
            .turns
            .iter()
            .rposition(|turn| turn.request == Some(request))
            .map(|index| index + 1)
            .unwrap_or(self.turns.len());
        let tagged = turns.into_iter().map(|turn| turn.for_request(request));
        self.turns.splice(position..position, tagged);
    }

    pub fn replace(&mut self, intro: Turn) {
        self.turns.clear();
        self.turns.push(intro);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The trailing `n` turns, oldest first.
    pub fn recent(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
