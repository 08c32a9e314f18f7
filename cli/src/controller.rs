use std::sync::Arc;

use fluency_core::Error;
use fluency_core::requests::{
    AnalysisRequest, ChatRequest, ExplanationRequest, Generation, PendingRequest, RequestId,
};
use fluency_core::session::{
    AnalysisCompletion, ChatCompletion, ExplanationCompletion, Session,
};
use tokio::sync::mpsc;

use crate::gemini::TextGenerator;

/// A finished network call, waiting to be applied to the session.
#[derive(Debug)]
pub enum Completion {
    Chat(ChatRequest, Generation),
    Analysis(AnalysisRequest, Generation),
    Explanation(ExplanationRequest, Generation),
}

/// What applying a completion changed, for the front end to show.
#[derive(Debug)]
pub enum Update {
    Chat(ChatCompletion),
    Analysis(AnalysisCompletion),
    Explanation(ExplanationCompletion),
}

/// Owns the session and runs its requests. Requests run concurrently on the
/// runtime; their completions come back over a channel and are applied one at
/// a time, in arrival order, on the caller's task.
pub struct Controller<G> {
    session: Session,
    generator: Arc<G>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl<G: TextGenerator> Controller<G> {
    pub fn new(session: Session, generator: G) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            session,
            generator: Arc::new(generator),
            completions_tx,
            completions_rx,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn send_message(&mut self, text: &str) -> Result<RequestId, Error> {
        let request = self.session.begin_chat(text)?;
        Ok(self.dispatch(PendingRequest::Chat(request)))
    }

    pub fn send_draft(&mut self) -> Result<RequestId, Error> {
        let request = self.session.send_draft()?;
        Ok(self.dispatch(PendingRequest::Chat(request)))
    }

    pub fn request_analysis(&mut self) -> Result<RequestId, Error> {
        let request = self.session.begin_analysis()?;
        Ok(self.dispatch(PendingRequest::Analysis(request)))
    }

    pub fn request_explanation(&mut self, position: usize) -> Result<RequestId, Error> {
        let request = self.session.begin_explanation(position)?;
        Ok(self.dispatch(PendingRequest::Explanation(request)))
    }

    fn dispatch(&self, request: PendingRequest) -> RequestId {
        let id = request.id();
        let generator = Arc::clone(&self.generator);
        let completions = self.completions_tx.clone();

        tracing::info!(
            request_id = %id,
            kind = request.kind(),
            scenario = self.session.scenario().id,
            "request issued"
        );

        tokio::spawn(async move {
            let generation = match generator.generate(request.prompt()).await {
                Ok(Some(text)) => Generation::Text(text),
                Ok(None) => {
                    tracing::warn!(request_id = %id, "response carried no candidate text");
                    Generation::Empty
                }
                Err(err) => {
                    tracing::warn!(request_id = %id, error = %err, "generation request failed");
                    Generation::Failed(err.to_string())
                }
            };

            let completion = match request {
                PendingRequest::Chat(request) => Completion::Chat(request, generation),
                PendingRequest::Analysis(request) => Completion::Analysis(request, generation),
                PendingRequest::Explanation(request) => {
                    Completion::Explanation(request, generation)
                }
            };

            // The receiver only goes away when the session has ended.
            let _ = completions.send(completion);
        });

        id
    }

    /// Waits for the next request to finish and applies it.
    pub async fn next_update(&mut self) -> Option<Update> {
        let completion = self.completions_rx.recv().await?;
        Some(self.apply(completion))
    }

    pub fn apply(&mut self, completion: Completion) -> Update {
        match completion {
            Completion::Chat(request, generation) => {
                let outcome = self.session.complete_chat(&request, generation);
                if let ChatCompletion::Applied {
                    correction: Some(_),
                    ..
                } = &outcome
                {
                    tracing::info!(
                        request_id = %request.id,
                        ledger_len = self.session.ledger().len(),
                        "correction logged"
                    );
                }
                log_if_stale(request.id, matches!(outcome, ChatCompletion::Stale));
                Update::Chat(outcome)
            }
            Completion::Analysis(request, generation) => {
                let outcome = self.session.complete_analysis(&request, generation);
                if let AnalysisCompletion::Failed(err) = &outcome {
                    tracing::warn!(request_id = %request.id, code = err.code(), error = %err, "analysis failed");
                }
                log_if_stale(request.id, matches!(outcome, AnalysisCompletion::Stale));
                Update::Analysis(outcome)
            }
            Completion::Explanation(request, generation) => {
                let outcome = self.session.complete_explanation(&request, generation);
                log_if_stale(request.id, outcome == ExplanationCompletion::Stale);
                Update::Explanation(outcome)
            }
        }
    }
}

fn log_if_stale(request_id: RequestId, stale: bool) {
    if stale {
        tracing::debug!(request_id = %request_id, "dropped stale completion");
    }
}
