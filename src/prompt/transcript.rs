use std::{cell::RefCell, rc::Rc};

use tracing::debug;

use crate::{
    animation::timer::SingleSlotTimer,
    canvas::editor::CanvasEditor,
    foundation::{config::PromptConfig, core::Millis},
    session::region::Region,
};

/// Which transcript a prompt is collected into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptMode {
    /// No unlocked content in the drawing area: the prompt describes a new image.
    Agent,
    /// Drawing area has unlocked content: the prompt asks for an edit.
    Ask,
}

impl PromptMode {
    pub fn for_region<E: CanvasEditor + ?Sized>(editor: &E, region: &Region) -> Self {
        if region.is_empty(editor) {
            Self::Agent
        } else {
            Self::Ask
        }
    }
}

/// One speech-recognition result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeechResult {
    pub text: String,
    pub is_final: bool,
}

impl SpeechResult {
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }

    pub fn final_(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }
}

/// Per-mode transcripts behind shared cells. Clones see the same text.
#[derive(Clone, Debug, Default)]
pub struct Transcripts {
    agent: Rc<RefCell<String>>,
    ask: Rc<RefCell<String>>,
}

impl Transcripts {
    fn cell(&self, mode: PromptMode) -> &Rc<RefCell<String>> {
        match mode {
            PromptMode::Agent => &self.agent,
            PromptMode::Ask => &self.ask,
        }
    }

    pub fn get(&self, mode: PromptMode) -> String {
        self.cell(mode).borrow().clone()
    }

    /// Replace the text, as a manual edit does.
    pub fn set(&self, mode: PromptMode, text: impl Into<String>) {
        *self.cell(mode).borrow_mut() = text.into();
    }

    pub fn clear(&self, mode: PromptMode) {
        self.cell(mode).borrow_mut().clear();
    }

    /// Append final results, each followed by a space. Interim results are ignored.
    pub fn push_results(&self, mode: PromptMode, results: &[SpeechResult]) {
        let mut text = self.cell(mode).borrow_mut();
        for r in results.iter().filter(|r| r.is_final) {
            text.push_str(&r.text);
            text.push(' ');
        }
    }
}

/// Listening toggle with the agent-mode auto-generate timer.
#[derive(Debug)]
pub struct PromptSession {
    transcripts: Transcripts,
    listening: bool,
    auto_generate: SingleSlotTimer,
    auto_generate_ms: u64,
}

impl PromptSession {
    pub fn new(cfg: &PromptConfig) -> Self {
        Self {
            transcripts: Transcripts::default(),
            listening: false,
            auto_generate: SingleSlotTimer::new(),
            auto_generate_ms: cfg.auto_generate_ms,
        }
    }

    /// Shared handle to the transcripts.
    pub fn transcripts(&self) -> &Transcripts {
        &self.transcripts
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Start a fresh listening session in `mode`, clearing its transcript.
    pub fn start_listening(&mut self, mode: PromptMode, now: Millis) {
        self.transcripts.clear(mode);
        self.listening = true;
        self.auto_generate.disarm();
        if mode == PromptMode::Agent {
            self.auto_generate.arm(now, self.auto_generate_ms);
            debug!(delay_ms = self.auto_generate_ms, "auto-generate armed");
        }
    }

    pub fn stop_listening(&mut self) {
        self.listening = false;
        self.auto_generate.disarm();
    }

    pub fn on_results(&mut self, mode: PromptMode, results: &[SpeechResult]) {
        if self.listening {
            self.transcripts.push_results(mode, results);
        }
    }

    /// Prompt to generate with, if the auto-generate timer fired at `now` and
    /// the transcript of `mode` is not blank at that moment.
    pub fn poll_auto_generate(&mut self, mode: PromptMode, now: Millis) -> Option<String> {
        if !self.auto_generate.fire_if_due(now) {
            return None;
        }
        let text = self.transcripts.get(mode);
        if text.trim().is_empty() {
            debug!("auto-generate fired with no transcript, skipping");
            return None;
        }
        Some(text)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/prompt/transcript.rs"]
mod tests;
