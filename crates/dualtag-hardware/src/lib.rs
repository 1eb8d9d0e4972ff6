//! Hardware collaborator layer for the dual-reader RFID keyboard wedge.
//!
//! This crate defines the interfaces the acquisition core consumes and
//! produces to, plus implementations of them:
//!
//! - **Traits** ([`traits`]): raw SPI transport, register bus, GPIO output
//!   line, UART byte channel, tone generator and keyboard.
//! - **Bus** ([`bus`]): [`ChipSelectBus`], which turns an SPI transport and
//!   a manual chip-select line into an MFRC522 register bus.
//! - **Mocks** ([`mock`]): scriptable devices for tests and development.
//! - **Backends**: a `serialport` UART channel (feature `hardware-serial`)
//!   and Raspberry Pi SPI/GPIO/PWM devices via `rppal` (feature
//!   `hardware-spi`).
//!
//! # Example
//!
//! ```
//! use dualtag_hardware::bus::ChipSelectBus;
//! use dualtag_hardware::mock::{MockOutputLine, MockSpiTransport};
//! use dualtag_hardware::traits::RegisterBus;
//!
//! # fn main() -> dualtag_hardware::Result<()> {
//! let mut spi = MockSpiTransport::new();
//! spi.queue_replies(&[0x92]);
//!
//! let mut bus = ChipSelectBus::new(spi, MockOutputLine::new())?;
//! assert_eq!(bus.read_register(0x37)?, 0x92);
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`][error::Result] with a
//! [`HardwareError`]. The acquisition core decides which failures are fatal;
//! during normal operation none are.

pub mod bus;
pub mod error;
pub mod mock;
#[cfg(feature = "hardware-spi")]
pub mod rpi;
#[cfg(feature = "hardware-serial")]
pub mod serial;
pub mod traits;

// Re-export commonly used types for convenience
pub use bus::ChipSelectBus;
pub use error::{HardwareError, Result};
pub use traits::{
    ByteChannel, Delay, Keyboard, OutputLine, RegisterBus, SpiTransport, StdDelay, ToneGenerator,
};
