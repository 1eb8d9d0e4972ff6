//! MFRC522 (13.56 MHz) reader support.
//!
//! - [`Mfrc522`]: register-level command driver (reset, configuration,
//!   generic command cycle).
//! - [`CardPresenceDetector`]: request + anticollision handshake returning a
//!   tag UID.
//! - [`registers`]: register map and bit masks.
//!
//! The driver is generic over [`RegisterBus`](dualtag_hardware::RegisterBus)
//! so it runs unchanged against real SPI hardware and the scriptable mocks
//! in `dualtag_hardware::mock`.

pub mod detector;
pub mod driver;
pub mod registers;

pub use detector::CardPresenceDetector;
pub use driver::{
    AntennaGain, CommandResponse, DriverConfig, FifoData, Mfrc522, PcdCommand, RequestMode,
};
