//! Incremental RDM6300 frame parser.
//!
//! The RDM6300 streams fixed-length frames over UART with no flow control.
//! Reads hand over whatever happened to arrive: half a frame, two frames, or
//! the tail of a frame that started before the reader was enabled. The
//! parser accumulates bytes in a fixed 14-byte buffer and resynchronizes on
//! every start marker.
//!
//! # Framing
//!
//! ```text
//! STX  tag text (10)  checksum (2)  ETX
//! 0x02 "0415C3A1B2"   "C1"          0x03
//! ```
//!
//! # Resynchronization
//!
//! - A start marker (0x02) anywhere restarts the frame at offset 0.
//! - A byte arriving while the buffer is full is dropped and the buffer is
//!   discarded.
//! - If more than the configured byte gap (200 ms by default) passes between
//!   reads while a frame is in progress, the partial frame is discarded.
//!
//! Malformed input never surfaces as an error; it is simply not reported.
//!
//! # Usage
//!
//! ```
//! use dualtag_protocol::{FrameParser, TagFrame};
//! use std::time::Instant;
//!
//! let mut parser = FrameParser::new();
//! let frame = TagFrame::encode(b"0415C3A1B2").unwrap();
//! let bytes = frame.as_bytes();
//! let now = Instant::now();
//!
//! assert!(parser.feed(&bytes[..6], now).is_none());
//! let id = parser.feed(&bytes[6..], now).unwrap();
//! assert_eq!(id.as_str(), "0415C3A1B2");
//! ```

use crate::frame::TagFrame;
use dualtag_core::{
    Identifier,
    constants::{DEFAULT_BYTE_GAP_TIMEOUT_MS, END_BYTE, RDM6300_FRAME_LENGTH, START_BYTE},
};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Frame parser configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameParserConfig {
    /// Maximum silence tolerated inside a frame, in milliseconds.
    pub byte_gap_timeout_ms: u64,

    /// Drop frames whose checksum field does not match the tag text.
    pub verify_checksum: bool,
}

impl FrameParserConfig {
    pub fn byte_gap_timeout(&self) -> Duration {
        Duration::from_millis(self.byte_gap_timeout_ms)
    }
}

impl Default for FrameParserConfig {
    fn default() -> Self {
        Self {
            byte_gap_timeout_ms: DEFAULT_BYTE_GAP_TIMEOUT_MS,
            verify_checksum: false,
        }
    }
}

/// Stateful RDM6300 frame parser.
///
/// # State Machine
///
/// ```text
///              STX (any state)
///        ┌──────────────────────────┐
///        ▼                          │
///   cursor = 1 ── byte ──► cursor = n < 14 ──┐
///                                            │ 14th byte
///                     ETX at 14 ◄────────────┘
///                   ┌─────┴──────┐
///            frame reported   other byte: next byte resets
///              cursor = 0       cursor = 0, byte dropped
/// ```
#[derive(Debug, Clone)]
pub struct FrameParser {
    config: FrameParserConfig,

    /// Bytes of the frame in progress.
    buffer: [u8; RDM6300_FRAME_LENGTH],

    /// Next write position in `buffer`; never exceeds its length.
    cursor: usize,

    /// Time the most recent byte was accepted.
    last_byte_at: Option<Instant>,
}

impl FrameParser {
    /// Create a parser with the default 200 ms byte gap and no checksum
    /// verification.
    pub fn new() -> Self {
        Self::with_config(FrameParserConfig::default())
    }

    pub fn with_config(config: FrameParserConfig) -> Self {
        Self {
            config,
            buffer: [0; RDM6300_FRAME_LENGTH],
            cursor: 0,
            last_byte_at: None,
        }
    }

    pub fn config(&self) -> &FrameParserConfig {
        &self.config
    }

    /// Number of bytes of the frame in progress.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Discard any partial frame.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Feed a batch of bytes received at `now`.
    ///
    /// Returns the tag text of the last frame completed by this batch.
    /// A completed frame whose tag text is not printable ASCII yields an
    /// empty identifier; callers treat that as "no identifier".
    ///
    /// An empty batch is still meaningful: it lets the byte-gap timeout
    /// discard a stale partial frame.
    ///
    /// # Examples
    ///
    /// ```
    /// use dualtag_protocol::FrameParser;
    /// use std::time::{Duration, Instant};
    ///
    /// let mut parser = FrameParser::new();
    /// let start = Instant::now();
    ///
    /// parser.feed(&[0x02, b'0', b'4'], start);
    /// assert_eq!(parser.cursor(), 3);
    ///
    /// parser.feed(&[], start + Duration::from_millis(250));
    /// assert_eq!(parser.cursor(), 0);
    /// ```
    pub fn feed(&mut self, bytes: &[u8], now: Instant) -> Option<Identifier> {
        self.expire_stale_frame(now);

        let mut completed = None;
        for &byte in bytes {
            self.last_byte_at = Some(now);

            if byte == START_BYTE {
                self.cursor = 0;
            }

            if self.cursor < RDM6300_FRAME_LENGTH {
                self.buffer[self.cursor] = byte;
                self.cursor += 1;
            } else {
                trace!("RDM6300 buffer overrun, dropping {:#04x}", byte);
                self.cursor = 0;
                continue;
            }

            if byte == END_BYTE && self.cursor == RDM6300_FRAME_LENGTH {
                if let Some(id) = self.complete_frame() {
                    completed = Some(id);
                }
                self.cursor = 0;
            }
        }

        completed
    }

    fn expire_stale_frame(&mut self, now: Instant) {
        if self.cursor == 0 {
            return;
        }
        if let Some(last) = self.last_byte_at {
            let gap = now.saturating_duration_since(last);
            if gap > self.config.byte_gap_timeout() {
                trace!(
                    "RDM6300 partial frame ({} bytes) expired after {:?}",
                    self.cursor, gap
                );
                self.cursor = 0;
            }
        }
    }

    /// Decode the full buffer. `None` if the frame did not begin with a
    /// start marker or fails checksum verification.
    fn complete_frame(&self) -> Option<Identifier> {
        let frame = TagFrame::from_bytes(self.buffer);
        if !frame.has_markers() {
            trace!("RDM6300 frame without start marker ignored");
            return None;
        }

        if self.config.verify_checksum && !frame.checksum_valid() {
            debug!("RDM6300 checksum mismatch in {:?}", frame);
            return None;
        }

        Some(Identifier::new(frame.tag_text()))
    }
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}
