//! Core constants for the dual-reader acquisition loop.
//!
//! This module centralizes the framing, timing and feedback constants shared
//! by the MFRC522 driver, the RDM6300 frame parser and the scheduler. Every
//! configurable value here is only a default; the `*Config` structs in the
//! individual crates carry the values actually used at runtime.
//!
//! # RDM6300 Frame Layout
//!
//! The 125 kHz reader emits fixed-length ASCII frames:
//!
//! ```text
//! offset  0     1 ........ 10   11  12   13
//!         STX   tag data (10)   checksum ETX
//!         0x02  ASCII hex       ASCII hex 0x03
//! ```
//!
//! # Usage
//!
//! ```
//! use dualtag_core::constants::*;
//! use std::time::Duration;
//!
//! assert_eq!(RDM6300_FRAME_LENGTH, 14);
//! assert_eq!(TAG_DATA_END - TAG_DATA_START, 10);
//!
//! let quantum = Duration::from_millis(DEFAULT_PHASE_QUANTUM_MS);
//! assert_eq!(quantum.as_millis(), 250);
//! ```

// ============================================================================
// UART Frame Markers
// ============================================================================

/// Start of text marker (STX).
///
/// A start marker always restarts frame assembly, even in the middle of a
/// partially received frame.
pub const START_BYTE: u8 = 0x02; // STX

/// End of text marker (ETX).
///
/// Only accepted as a terminator when it lands on the final byte of a
/// full-length frame.
pub const END_BYTE: u8 = 0x03; // ETX

/// Total length of an RDM6300 frame, markers included.
pub const RDM6300_FRAME_LENGTH: usize = 14;

/// First buffer offset of the printable tag data.
pub const TAG_DATA_START: usize = 1;

/// Buffer offset one past the printable tag data.
pub const TAG_DATA_END: usize = 11;

/// First buffer offset of the two ASCII-hex checksum characters.
pub const CHECKSUM_START: usize = 11;

/// Buffer offset one past the checksum characters.
pub const CHECKSUM_END: usize = 13;

// ============================================================================
// UID Constraints
// ============================================================================

/// Minimum UID length in bytes (per ISO 14443 specification).
///
/// Shorter anticollision responses are discarded before rendering.
pub const MIN_UID_LENGTH: usize = 4;

/// Maximum UID length in bytes (per ISO 14443 specification).
pub const MAX_UID_LENGTH: usize = 10;

/// Size of the MFRC522 on-chip FIFO in bytes.
///
/// A response can never be longer than this, so response buffers are
/// fixed arrays of this capacity.
pub const FIFO_CAPACITY: usize = 64;

// ============================================================================
// Scheduling
// ============================================================================

/// Default length of one scheduler phase (milliseconds).
///
/// # Value: 250ms
///
/// Bounds worst-case detection latency for either tag type to roughly
/// one quantum.
pub const DEFAULT_PHASE_QUANTUM_MS: u64 = 250;

/// Default sleep between two control-loop ticks (milliseconds).
///
/// # Value: 10ms
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 10;

/// Default cooldown before the same MFRC522 UID is emitted again (milliseconds).
///
/// # Value: 1000ms
pub const DEFAULT_REGISTER_COOLDOWN_MS: u64 = 1000;

/// Default cooldown before the same RDM6300 tag is emitted again (milliseconds).
///
/// # Value: 2000ms
pub const DEFAULT_UART_COOLDOWN_MS: u64 = 2000;

/// Inactivity gap after which a partially received UART frame is dropped
/// (milliseconds).
///
/// # Value: 200ms
pub const DEFAULT_BYTE_GAP_TIMEOUT_MS: u64 = 200;

// ============================================================================
// Hardware Timing
// ============================================================================

/// Settle delay on each edge of the MFRC522 reset pulse (milliseconds).
pub const RESET_SETTLE_MS: u64 = 50;

/// Default iteration ceiling for the command-completion poll loop.
///
/// This is a count of bus round-trips, not a duration. At the usual 1 MHz
/// SPI clock it comfortably exceeds the 25ms timer programmed by
/// `configure()`.
pub const DEFAULT_POLL_CEILING: u32 = 2000;

/// Maximum number of UART bytes consumed per tick.
pub const UART_READ_CHUNK: usize = 32;

/// RDM6300 serial baud rate.
pub const UART_BAUD_RATE: u32 = 9600;

/// Read timeout configured on the UART channel (milliseconds).
pub const UART_READ_TIMEOUT_MS: u64 = 50;

// ============================================================================
// Audible Feedback
// ============================================================================

/// Higher acknowledgement tone (Hz).
pub const TONE_HIGH_HZ: u32 = 3000;

/// Lower acknowledgement tone (Hz).
pub const TONE_MID_HZ: u32 = 2000;

/// Duration of each acknowledgement tone (milliseconds).
pub const TONE_DURATION_MS: u64 = 100;
