//! Application state for one tutoring session and every transition on it.
//!
//! Network calls happen elsewhere. A `begin_*` method records the request and
//! hands back a handle carrying the prompt; the matching `complete_*` method
//! applies whatever came back. Each kind of request only touches its own slice
//! of state (transcript and ledger, analysis report, explanation panel), so
//! overlapping requests cannot interfere. Handles remember the scenario epoch
//! they were issued in, and completions from before a scenario switch are
//! dropped.

use crate::analysis::{self, AnalysisReport, MIN_TURNS_FOR_ANALYSIS};
use crate::corrections::{CorrectionLedger, CorrectionRecord};
use crate::error::Error;
use crate::parser::parse_model_output;
use crate::prompts::{self, HISTORY_WINDOW};
use crate::requests::{AnalysisRequest, ChatRequest, ExplanationRequest, Generation, RequestId};
use crate::scenarios::{self, ScenarioDefinition};
use crate::turns::{Transcript, Turn};
use crate::voice::{VoiceCapture, VoiceState};

pub const CHAT_PLACEHOLDER: &str = "Sorry, I lost my train of thought.";
pub const CHAT_CONNECTION_ERROR: &str = "Error connecting to AI tutor.";
pub const EXPLANATION_PLACEHOLDER: &str = "Could not generate explanation.";
pub const EXPLANATION_CONNECTION_ERROR: &str =
    "Sorry, I couldn't connect to the server to explain this right now.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplanationPanel {
    Closed,
    Loading {
        request: RequestId,
        record: CorrectionRecord,
    },
    Ready {
        record: CorrectionRecord,
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatCompletion {
    /// Turns that were placed in the transcript, in order.
    Applied {
        turns: Vec<Turn>,
        correction: Option<CorrectionRecord>,
    },
    /// Issued before the last scenario switch; nothing changed.
    Stale,
}

#[derive(Debug)]
pub enum AnalysisCompletion {
    Ready(AnalysisReport),
    /// The previous report, if any, is left in place.
    Failed(Error),
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplanationCompletion {
    Ready(String),
    /// The panel has moved on to another correction or was closed.
    Stale,
}

#[derive(Debug)]
pub struct Session {
    scenario: &'static ScenarioDefinition,
    epoch: u64,
    transcript: Transcript,
    ledger: CorrectionLedger,
    draft: String,
    report: Option<AnalysisReport>,
    analysis_in_flight: Option<RequestId>,
    explanation: ExplanationPanel,
    voice: VoiceCapture,
    chats_in_flight: usize,
}

impl Session {
    pub fn new(scenario: &'static ScenarioDefinition, voice_supported: bool) -> Self {
        Self {
            scenario,
            epoch: 0,
            transcript: Transcript::starting_with(Turn::assistant(scenario.intro_message)),
            ledger: CorrectionLedger::default(),
            draft: String::new(),
            report: None,
            analysis_in_flight: None,
            explanation: ExplanationPanel::Closed,
            voice: VoiceCapture::new(voice_supported),
            chats_in_flight: 0,
        }
    }

    pub fn scenario(&self) -> &'static ScenarioDefinition {
        self.scenario
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn ledger(&self) -> &CorrectionLedger {
        &self.ledger
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        self.report.as_ref()
    }

    pub fn explanation(&self) -> &ExplanationPanel {
        &self.explanation
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn chats_in_flight(&self) -> usize {
        self.chats_in_flight
    }

    pub fn is_analyzing(&self) -> bool {
        self.analysis_in_flight.is_some()
    }

    pub fn voice_state(&self) -> VoiceState {
        self.voice.state()
    }

    /// Switches scenario and starts over: fresh transcript with the intro
    /// line, empty ledger, no report, explanation panel closed.
    pub fn select_scenario(&mut self, id: &str) -> Result<&'static ScenarioDefinition, Error> {
        let scenario = scenarios::find(id)?;
        self.scenario = scenario;
        self.reset();
        Ok(scenario)
    }

    pub fn reset(&mut self) {
        self.epoch += 1;
        self.transcript.replace(Turn::assistant(self.scenario.intro_message));
        self.ledger.clear();
        self.report = None;
        self.analysis_in_flight = None;
        self.explanation = ExplanationPanel::Closed;
        self.chats_in_flight = 0;
    }

    /// Records the user turn and returns the request for the model's reply.
    pub fn begin_chat(&mut self, utterance: &str) -> Result<ChatRequest, Error> {
        if utterance.trim().is_empty() {
            return Err(Error::EmptyUtterance);
        }

        let id = RequestId::new();
        let prompt = prompts::chat_prompt(
            self.scenario,
            self.transcript.recent(HISTORY_WINDOW),
            utterance,
        );
        self.transcript.push(Turn::user(utterance).for_request(id));
        self.draft.clear();
        self.chats_in_flight += 1;

        Ok(ChatRequest {
            id,
            epoch: self.epoch,
            utterance: utterance.to_string(),
            prompt,
        })
    }

    /// Sends whatever is in the draft.
    pub fn send_draft(&mut self) -> Result<ChatRequest, Error> {
        let draft = std::mem::take(&mut self.draft);
        match self.begin_chat(&draft) {
            Ok(request) => Ok(request),
            Err(err) => {
                self.draft = draft;
                Err(err)
            }
        }
    }

    pub fn complete_chat(&mut self, request: &ChatRequest, generation: Generation) -> ChatCompletion {
        if request.epoch != self.epoch {
            return ChatCompletion::Stale;
        }
        self.chats_in_flight = self.chats_in_flight.saturating_sub(1);

        let raw = match generation {
            Generation::Text(raw) => raw,
            Generation::Empty => CHAT_PLACEHOLDER.to_string(),
            Generation::Failed(_) => {
                let notice = Turn::notice(CHAT_CONNECTION_ERROR);
                self.transcript
                    .insert_for_request(request.id, vec![notice.clone()]);
                return ChatCompletion::Applied {
                    turns: vec![notice],
                    correction: None,
                };
            }
        };

        let parsed = parse_model_output(&raw, &request.utterance);
        let mut turns = vec![Turn::assistant(parsed.reply_text)];
        if let Some(record) = &parsed.correction {
            turns.push(Turn::annotation(record.correction.clone()));
            self.ledger.append(record.clone());
        }

        self.transcript.insert_for_request(request.id, turns.clone());
        ChatCompletion::Applied {
            turns,
            correction: parsed.correction,
        }
    }

    pub fn begin_analysis(&mut self) -> Result<AnalysisRequest, Error> {
        if self.transcript.len() < MIN_TURNS_FOR_ANALYSIS {
            return Err(Error::TranscriptTooShort {
                turns: self.transcript.len(),
                required: MIN_TURNS_FOR_ANALYSIS,
            });
        }

        let id = RequestId::new();
        self.analysis_in_flight = Some(id);
        Ok(AnalysisRequest {
            id,
            epoch: self.epoch,
            prompt: prompts::analysis_prompt(self.transcript.turns()),
        })
    }

    pub fn complete_analysis(
        &mut self,
        request: &AnalysisRequest,
        generation: Generation,
    ) -> AnalysisCompletion {
        if request.epoch != self.epoch {
            return AnalysisCompletion::Stale;
        }
        if self.analysis_in_flight == Some(request.id) {
            self.analysis_in_flight = None;
        }

        let decoded = match generation {
            Generation::Text(text) => analysis::decode_report(&text),
            Generation::Empty => Err(Error::AnalysisUnavailable(
                "response carried no text".to_string(),
            )),
            Generation::Failed(reason) => Err(Error::AnalysisUnavailable(reason)),
        };

        match decoded {
            Ok(report) => {
                self.report = Some(report.clone());
                AnalysisCompletion::Ready(report)
            }
            Err(err) => AnalysisCompletion::Failed(err),
        }
    }

    /// Opens the explanation panel for the `position`-th correction, newest first, 1-based.
    pub fn begin_explanation(&mut self, position: usize) -> Result<ExplanationRequest, Error> {
        let record = self
            .ledger
            .nth_newest(position)
            .cloned()
            .ok_or(Error::UnknownCorrection(position))?;

        let id = RequestId::new();
        let prompt = prompts::explanation_prompt(&record.correction);
        let correction_id = record.id;
        self.explanation = ExplanationPanel::Loading {
            request: id,
            record,
        };

        Ok(ExplanationRequest {
            id,
            epoch: self.epoch,
            correction_id,
            prompt,
        })
    }

    pub fn complete_explanation(
        &mut self,
        request: &ExplanationRequest,
        generation: Generation,
    ) -> ExplanationCompletion {
        let waiting = matches!(
            &self.explanation,
            ExplanationPanel::Loading { request: current, .. } if *current == request.id
        );
        if !waiting || request.epoch != self.epoch {
            return ExplanationCompletion::Stale;
        }
        let Some(record) = self.ledger.get(request.correction_id).cloned() else {
            return ExplanationCompletion::Stale;
        };

        let text = match generation {
            Generation::Text(text) => text,
            Generation::Empty => EXPLANATION_PLACEHOLDER.to_string(),
            Generation::Failed(_) => EXPLANATION_CONNECTION_ERROR.to_string(),
        };
        self.explanation = ExplanationPanel::Ready {
            record,
            text: text.clone(),
        };
        ExplanationCompletion::Ready(text)
    }

    pub fn close_explanation(&mut self) {
        self.explanation = ExplanationPanel::Closed;
    }

    pub fn toggle_voice(&mut self) -> Result<VoiceState, Error> {
        self.voice.toggle()
    }

    /// A recognized utterance replaces the draft; it is not sent.
    pub fn voice_recognized(&mut self, transcript: &str) -> bool {
        match self.voice.recognized(transcript) {
            Some(text) => {
                self.draft = text;
                true
            }
            None => false,
        }
    }

    pub fn voice_ended(&mut self) {
        self.voice.ended();
    }
}
