use crate::error::Error;

/// Speech capture is a single exclusive resource: at most one capture runs,
/// and it ends on the first recognized utterance or on any error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Unsupported,
    Idle,
    Listening,
}

#[derive(Debug, Clone)]
pub struct VoiceCapture {
    state: VoiceState,
}

impl VoiceCapture {
    pub fn new(supported: bool) -> Self {
        let state = if supported {
            VoiceState::Idle
        } else {
            VoiceState::Unsupported
        };
        Self { state }
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == VoiceState::Listening
    }

    /// Starts capture when idle, stops it when listening.
    pub fn toggle(&mut self) -> Result<VoiceState, Error> {
        self.state = match self.state {
            VoiceState::Unsupported => return Err(Error::VoiceUnsupported),
            VoiceState::Idle => VoiceState::Listening,
            VoiceState::Listening => VoiceState::Idle,
        };
        Ok(self.state)
    }

    /// A recognized utterance ends the capture. Returns the text to place in
    /// the draft, or `None` if nothing was listening.
    pub fn recognized(&mut self, transcript: &str) -> Option<String> {
        if !self.is_listening() {
            return None;
        }
        self.state = VoiceState::Idle;
        Some(transcript.to_string())
    }

    /// Error or end-of-capture from the recognizer.
    pub fn ended(&mut self) {
        if self.is_listening() {
            self.state = VoiceState::Idle;
        }
    }
}
