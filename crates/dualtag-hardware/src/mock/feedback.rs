//! Mock keyboard and tone generator.

use crate::error::{HardwareError, Result};
use crate::traits::{Keyboard, ToneGenerator};
use std::time::Duration;

/// Keystroke recorded by [`MockKeyboard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyEvent {
    Text(String),
    Enter,
}

/// Keyboard that records everything typed into it.
#[derive(Debug, Default, Clone)]
pub struct MockKeyboard {
    events: Vec<KeyEvent>,
    failing: bool,
}

impl MockKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[KeyEvent] {
        &self.events
    }

    /// Lines submitted so far: text typed before each Enter.
    pub fn submitted_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();
        for event in &self.events {
            match event {
                KeyEvent::Text(text) => current.push_str(text),
                KeyEvent::Enter => lines.push(std::mem::take(&mut current)),
            }
        }
        lines
    }

    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }
}

impl Keyboard for MockKeyboard {
    fn type_text(&mut self, text: &str) -> Result<()> {
        if self.failing {
            return Err(HardwareError::disconnected("mock keyboard"));
        }
        self.events.push(KeyEvent::Text(text.to_string()));
        Ok(())
    }

    fn press_enter(&mut self) -> Result<()> {
        if self.failing {
            return Err(HardwareError::disconnected("mock keyboard"));
        }
        self.events.push(KeyEvent::Enter);
        Ok(())
    }
}

/// Tone generator that records requested tones without sleeping.
#[derive(Debug, Default, Clone)]
pub struct MockToneGenerator {
    played: Vec<(u32, Duration)>,
    fail_frequency: Option<u32>,
}

impl MockToneGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tones played so far as `(frequency_hz, duration)`.
    pub fn played(&self) -> &[(u32, Duration)] {
        &self.played
    }

    pub fn frequencies(&self) -> Vec<u32> {
        self.played.iter().map(|(f, _)| *f).collect()
    }

    /// Fail every tone at `frequency_hz`.
    pub fn fail_on(&mut self, frequency_hz: u32) {
        self.fail_frequency = Some(frequency_hz);
    }
}

impl ToneGenerator for MockToneGenerator {
    fn play_tone(&mut self, frequency_hz: u32, duration: Duration) -> Result<()> {
        if self.fail_frequency == Some(frequency_hz) {
            return Err(HardwareError::unsupported(format!("tone {frequency_hz}Hz")));
        }
        self.played.push((frequency_hz, duration));
        Ok(())
    }
}
