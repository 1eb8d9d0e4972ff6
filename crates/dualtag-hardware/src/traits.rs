//! Hardware collaborator trait definitions.
//!
//! These traits are the seams between the acquisition core and the physical
//! world. They are deliberately synchronous: the control loop is a single
//! cooperative thread and every bus access completes before the next action
//! is taken.
//!
//! ```text
//!  SpiTransport + OutputLine (CS) ──► ChipSelectBus ──► RegisterBus ──► MFRC522 driver
//!  ByteChannel + OutputLine (EN)  ──────────────────────────────────► RDM6300 parser
//!  Keyboard + ToneGenerator       ◄────────────────────────────────── output sink
//! ```

use crate::error::Result;
use std::time::Duration;

/// Raw byte-level access to a clocked serial bus.
///
/// Implementations do not manage chip select; see
/// [`ChipSelectBus`](crate::bus::ChipSelectBus) for the bracketing layer.
pub trait SpiTransport {
    /// Clock `bytes` out onto the bus, discarding whatever is clocked in.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying transfer fails.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Clock in `buf.len()` bytes, filling `buf` in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying transfer fails.
    fn read_into(&mut self, buf: &mut [u8]) -> Result<()>;
}

/// Single digital output (chip select, reset, reader enable).
pub trait OutputLine {
    /// Drive the line high (`true`) or low (`false`).
    ///
    /// # Errors
    ///
    /// Returns an error if the GPIO cannot be driven.
    fn set(&mut self, high: bool) -> Result<()>;

    fn set_high(&mut self) -> Result<()> {
        self.set(true)
    }

    fn set_low(&mut self) -> Result<()> {
        self.set(false)
    }
}

/// Register-addressed device access.
///
/// Every call is one complete bus transaction; no other bus user may
/// interleave between its chip-select assert and deassert.
pub trait RegisterBus {
    /// Write `value` to register `reg`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus transaction fails.
    fn write_register(&mut self, reg: u8, value: u8) -> Result<()>;

    /// Read the current value of register `reg`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus transaction fails.
    fn read_register(&mut self, reg: u8) -> Result<u8>;
}

impl<T: RegisterBus + ?Sized> RegisterBus for &mut T {
    fn write_register(&mut self, reg: u8, value: u8) -> Result<()> {
        (**self).write_register(reg, value)
    }

    fn read_register(&mut self, reg: u8) -> Result<u8> {
        (**self).read_register(reg)
    }
}

/// Raw asynchronous byte channel (UART receive side).
pub trait ByteChannel {
    /// Copy whatever bytes are pending into `buf` and return how many were
    /// copied.
    ///
    /// Must not block longer than the channel's configured read timeout.
    /// Returns `Ok(0)` when nothing is pending.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel is closed or the read fails.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize>;
}

/// Audible feedback generator.
pub trait ToneGenerator {
    /// Play a single tone, blocking for `duration`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tone cannot be generated.
    fn play_tone(&mut self, frequency_hz: u32, duration: Duration) -> Result<()>;
}

/// Keystroke injection target.
pub trait Keyboard {
    /// Type `text` character by character.
    ///
    /// # Errors
    ///
    /// Returns an error if the keystrokes cannot be delivered.
    fn type_text(&mut self, text: &str) -> Result<()>;

    /// Send one "submit" (Enter) keystroke.
    ///
    /// # Errors
    ///
    /// Returns an error if the keystroke cannot be delivered.
    fn press_enter(&mut self) -> Result<()>;
}

/// Blocking delay provider used for settle times.
pub trait Delay {
    fn delay(&mut self, duration: Duration);
}

/// [`Delay`] backed by `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn delay(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
