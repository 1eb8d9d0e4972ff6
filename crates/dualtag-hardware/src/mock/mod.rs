//! Mock device implementations for testing and development.
//!
//! This module provides simulated collaborators that can be scripted and
//! inspected programmatically without requiring physical hardware.

pub mod feedback;
pub mod line;
pub mod register_bus;
pub mod uart;

// Re-export commonly used types
pub use feedback::{KeyEvent, MockKeyboard, MockToneGenerator};
pub use line::{MockDelay, MockOutputLine, MockSpiTransport};
pub use register_bus::MockRegisterBus;
pub use uart::MockByteChannel;
