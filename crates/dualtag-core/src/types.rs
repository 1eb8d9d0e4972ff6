use crate::{
    Result,
    constants::{MAX_UID_LENGTH, TONE_DURATION_MS, TONE_HIGH_HZ, TONE_MID_HZ},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Physical reader that produced an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReaderChannel {
    /// 13.56 MHz MFRC522, register-addressed over SPI.
    Register,

    /// 125 kHz RDM6300, framed ASCII over UART.
    Uart,
}

const REGISTER_ACK: [ToneStep; 3] = [
    ToneStep::new(TONE_HIGH_HZ, TONE_DURATION_MS),
    ToneStep::new(TONE_MID_HZ, TONE_DURATION_MS),
    ToneStep::new(TONE_HIGH_HZ, TONE_DURATION_MS),
];

const UART_ACK: [ToneStep; 2] = [
    ToneStep::new(TONE_MID_HZ, TONE_DURATION_MS),
    ToneStep::new(TONE_HIGH_HZ, TONE_DURATION_MS),
];

impl ReaderChannel {
    /// Short hardware name used in log output.
    pub fn reader_name(&self) -> &'static str {
        match self {
            ReaderChannel::Register => "RC522",
            ReaderChannel::Uart => "RDM6300",
        }
    }

    /// Tone sequence played after an identifier from this channel is typed.
    ///
    /// # Examples
    ///
    /// ```
    /// use dualtag_core::ReaderChannel;
    ///
    /// let freqs: Vec<u32> = ReaderChannel::Register
    ///     .acknowledgement()
    ///     .iter()
    ///     .map(|step| step.frequency_hz)
    ///     .collect();
    /// assert_eq!(freqs, vec![3000, 2000, 3000]);
    /// assert_eq!(ReaderChannel::Uart.acknowledgement().len(), 2);
    /// ```
    pub fn acknowledgement(&self) -> &'static [ToneStep] {
        match self {
            ReaderChannel::Register => &REGISTER_ACK,
            ReaderChannel::Uart => &UART_ACK,
        }
    }
}

impl fmt::Display for ReaderChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reader_name())
    }
}

/// Result of one MFRC522 command cycle.
///
/// `NoTag` is the normal outcome when nothing is in the field and is kept
/// distinct from `Error` so callers never treat silence as a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandOutcome {
    Ok,
    NoTag,
    Error,
}

impl CommandOutcome {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, CommandOutcome::Ok)
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match self {
            CommandOutcome::Ok => "ok",
            CommandOutcome::NoTag => "no tag",
            CommandOutcome::Error => "error",
        };
        f.write_str(outcome)
    }
}

/// UID bytes returned by the anticollision step (1-10 bytes).
///
/// Stored inline so a poll never allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardUid {
    bytes: [u8; MAX_UID_LENGTH],
    len: usize,
}

impl CardUid {
    /// Create a UID from raw response bytes.
    ///
    /// # Errors
    /// Returns `Error::InvalidUidLength` if `bytes` is empty or longer than
    /// [`MAX_UID_LENGTH`].
    pub fn new(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() || bytes.len() > MAX_UID_LENGTH {
            return Err(Error::InvalidUidLength {
                min: 1,
                max: MAX_UID_LENGTH,
                actual: bytes.len(),
            });
        }

        let mut buf = [0u8; MAX_UID_LENGTH];
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            bytes: buf,
            len: bytes.len(),
        })
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Render the UID as contiguous uppercase hex.
    ///
    /// ```
    /// use dualtag_core::CardUid;
    ///
    /// let uid = CardUid::new(&[0x04, 0xAB, 0x0C, 0xEF]).unwrap();
    /// assert_eq!(uid.to_hex(), "04AB0CEF");
    /// ```
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.as_bytes().iter().map(|b| format!("{b:02X}")).collect()
    }
}

impl fmt::Display for CardUid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for b in self.as_bytes() {
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}

/// Canonical identifier handed to the output sink.
///
/// Either the uppercase hex rendering of an MFRC522 UID or the literal tag
/// characters of an RDM6300 frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier(String);

impl Identifier {
    /// Wrap already-decoded tag characters.
    pub fn new(text: impl Into<String>) -> Self {
        Identifier(text.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&CardUid> for Identifier {
    fn from(uid: &CardUid) -> Self {
        Identifier(uid.to_hex())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One tone of an acknowledgement pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneStep {
    pub frequency_hz: u32,
    pub duration_ms: u64,
}

impl ToneStep {
    pub const fn new(frequency_hz: u32, duration_ms: u64) -> Self {
        Self {
            frequency_hz,
            duration_ms,
        }
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}
