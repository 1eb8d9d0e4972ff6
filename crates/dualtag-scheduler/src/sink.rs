//! Output side of the acquisition loop.
//!
//! An [`OutputSink`] receives each accepted identifier together with the
//! channel it came from. [`FeedbackSink`] is the keyboard-wedge
//! implementation: type the identifier, press Enter, then play the
//! channel's acknowledgement tones.

use dualtag_core::{Identifier, ReaderChannel};
use dualtag_hardware::{Keyboard, Result, ToneGenerator};
use tracing::warn;

/// Consumer of accepted identifiers.
pub trait OutputSink {
    /// Deliver one identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier could not be delivered. The
    /// scheduler logs it and carries on.
    fn emit(&mut self, id: &Identifier, channel: ReaderChannel) -> Result<()>;
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn emit(&mut self, id: &Identifier, channel: ReaderChannel) -> Result<()> {
        (**self).emit(id, channel)
    }
}

/// Keyboard plus buzzer sink.
///
/// # Examples
///
/// ```
/// use dualtag_core::{Identifier, ReaderChannel};
/// use dualtag_hardware::mock::{MockKeyboard, MockToneGenerator};
/// use dualtag_scheduler::{FeedbackSink, OutputSink};
///
/// let mut sink = FeedbackSink::new(MockKeyboard::new(), MockToneGenerator::new());
/// sink.emit(&Identifier::new("ABCDEFGHIJ"), ReaderChannel::Uart).unwrap();
///
/// assert_eq!(sink.keyboard().submitted_lines(), vec!["ABCDEFGHIJ"]);
/// assert_eq!(sink.tones().frequencies(), vec![2000, 3000]);
/// ```
#[derive(Debug)]
pub struct FeedbackSink<K, T> {
    keyboard: K,
    tones: T,
}

impl<K: Keyboard, T: ToneGenerator> FeedbackSink<K, T> {
    pub fn new(keyboard: K, tones: T) -> Self {
        Self { keyboard, tones }
    }

    pub fn keyboard(&self) -> &K {
        &self.keyboard
    }

    pub fn tones(&self) -> &T {
        &self.tones
    }

    pub fn into_parts(self) -> (K, T) {
        (self.keyboard, self.tones)
    }

    fn acknowledge(&mut self, channel: ReaderChannel) {
        for step in channel.acknowledgement() {
            if let Err(e) = self.tones.play_tone(step.frequency_hz, step.duration()) {
                warn!("Tone {} Hz failed: {}", step.frequency_hz, e);
            }
        }
    }
}

impl<K: Keyboard, T: ToneGenerator> OutputSink for FeedbackSink<K, T> {
    fn emit(&mut self, id: &Identifier, channel: ReaderChannel) -> Result<()> {
        if id.is_empty() {
            return Ok(());
        }

        self.keyboard.type_text(id.as_str())?;
        self.keyboard.press_enter()?;
        self.acknowledge(channel);
        Ok(())
    }
}
