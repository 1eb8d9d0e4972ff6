//! Chip-select gated register bus.
//!
//! Wraps a raw [`SpiTransport`] and a manually driven, active-low chip-select
//! line into a [`RegisterBus`] using the MFRC522 SPI address encoding:
//!
//! ```text
//! write:  CS↓  [ (reg << 1) & 0x7E, value ]        CS↑
//! read:   CS↓  [ ((reg << 1) & 0x7E) | 0x80 ] [rx] CS↑
//! ```
//!
//! The bus owns its transport, so the borrow checker guarantees no other user
//! can interleave a transfer between assert and deassert.

use crate::error::Result;
use crate::traits::{OutputLine, RegisterBus, SpiTransport};
use tracing::trace;

/// Read flag in the MFRC522 SPI address byte.
const READ_FLAG: u8 = 0x80;

/// Register address bits after shifting into the address byte.
const ADDRESS_MASK: u8 = 0x7E;

/// Encode a register number into an SPI address byte.
#[inline]
pub fn address_byte(reg: u8, read: bool) -> u8 {
    let addr = (reg << 1) & ADDRESS_MASK;
    if read { addr | READ_FLAG } else { addr }
}

/// Register bus over SPI with a manual chip-select line.
#[derive(Debug)]
pub struct ChipSelectBus<T, C> {
    transport: T,
    cs: C,
}

impl<T: SpiTransport, C: OutputLine> ChipSelectBus<T, C> {
    /// Create the bus and park chip select in the inactive (high) state.
    ///
    /// # Errors
    ///
    /// Returns an error if the chip-select line cannot be driven.
    pub fn new(transport: T, mut cs: C) -> Result<Self> {
        cs.set_high()?;
        Ok(Self { transport, cs })
    }

    /// Run `f` with chip select asserted.
    ///
    /// Chip select is released even when the transfer fails; the transfer
    /// error takes precedence over a release error.
    fn transaction<R>(&mut self, f: impl FnOnce(&mut T) -> Result<R>) -> Result<R> {
        self.cs.set_low()?;
        let result = f(&mut self.transport);
        let released = self.cs.set_high();
        let value = result?;
        released?;
        Ok(value)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn chip_select(&self) -> &C {
        &self.cs
    }

    pub fn into_parts(self) -> (T, C) {
        (self.transport, self.cs)
    }
}

impl<T: SpiTransport, C: OutputLine> RegisterBus for ChipSelectBus<T, C> {
    fn write_register(&mut self, reg: u8, value: u8) -> Result<()> {
        trace!("write {:#04x} <- {:#04x}", reg, value);
        self.transaction(|spi| spi.write(&[address_byte(reg, false), value]))
    }

    fn read_register(&mut self, reg: u8) -> Result<u8> {
        let value = self.transaction(|spi| {
            spi.write(&[address_byte(reg, true)])?;
            let mut buf = [0u8; 1];
            spi.read_into(&mut buf)?;
            Ok(buf[0])
        })?;
        trace!("read {:#04x} -> {:#04x}", reg, value);
        Ok(value)
    }
}
