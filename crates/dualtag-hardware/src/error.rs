//! Error types for hardware operations.
//!
//! This module defines the error type returned by every collaborator trait:
//! bus transport failures, serial port errors, GPIO/PWM failures and the
//! injected faults used by the mock devices.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Failures reported by reader, GPIO and feedback devices.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// A register or SPI transfer did not complete.
    #[error("Bus transfer failed: {message}")]
    Bus { message: String },

    /// A GPIO line or PWM channel could not be driven.
    #[error("GPIO error: {message}")]
    Gpio { message: String },

    /// The device went away (serial adapter unplugged, pipe closed).
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: String },

    /// Opening or claiming a device failed.
    #[error("Initialization failed: {message}")]
    InitializationFailed { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    pub fn bus(message: impl Into<String>) -> Self {
        Self::Bus {
            message: message.into(),
        }
    }

    pub fn gpio(message: impl Into<String>) -> Self {
        Self::Gpio {
            message: message.into(),
        }
    }

    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }
}

#[cfg(feature = "hardware-serial")]
impl From<serialport::Error> for HardwareError {
    fn from(err: serialport::Error) -> Self {
        match err.kind() {
            serialport::ErrorKind::NoDevice => Self::disconnected(err.description),
            serialport::ErrorKind::Io(kind) => Self::Io(std::io::Error::new(kind, err.description)),
            _ => Self::bus(format!("serial: {}", err.description)),
        }
    }
}

#[cfg(feature = "hardware-spi")]
impl From<rppal::spi::Error> for HardwareError {
    fn from(err: rppal::spi::Error) -> Self {
        Self::bus(format!("SPI: {err}"))
    }
}

#[cfg(feature = "hardware-spi")]
impl From<rppal::gpio::Error> for HardwareError {
    fn from(err: rppal::gpio::Error) -> Self {
        Self::gpio(err.to_string())
    }
}
