//! Application configuration.
//!
//! Every section falls back to its defaults, so an empty JSON object (or no
//! file at all) yields the stock wiring:
//!
//! ```json
//! {
//!   "scheduler": { "phase_quantum_ms": 250, "tick_interval_ms": 10 },
//!   "serial": { "port": "/dev/ttyAMA0" },
//!   "pins": { "uart_enable": 24 }
//! }
//! ```

use anyhow::{Context, Result, bail};
use dualtag_core::constants::{UART_BAUD_RATE, UART_READ_TIMEOUT_MS};
use dualtag_protocol::FrameParserConfig;
use dualtag_rfid::DriverConfig;
use dualtag_scheduler::SchedulerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// GPIO and SPI wiring (BCM numbering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinConfig {
    /// MFRC522 RST.
    pub reset: u8,

    /// MFRC522 SDA, driven as a plain GPIO.
    pub chip_select: u8,

    /// Base of the transistor switching the RDM6300 supply.
    pub uart_enable: u8,

    pub buzzer: u8,

    pub spi_bus: u8,

    pub spi_clock_hz: u32,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            reset: 25,
            chip_select: 22,
            uart_enable: 23,
            buzzer: 18,
            spi_bus: 0,
            spi_clock_hz: 1_000_000,
        }
    }
}

/// RDM6300 serial port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
    pub read_timeout_ms: u64,
}

impl SerialConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/serial0".to_string(),
            baud_rate: UART_BAUD_RATE,
            read_timeout_ms: UART_READ_TIMEOUT_MS,
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scheduler: SchedulerConfig,
    pub driver: DriverConfig,
    pub parser: FrameParserConfig,
    pub pins: PinConfig,
    pub serial: SerialConfig,
}

impl AppConfig {
    /// Read and parse a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reject settings the acquisition loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.scheduler.validate()?;

        if self.driver.poll_ceiling == 0 {
            bail!("driver.poll_ceiling must be non-zero");
        }
        if self.parser.byte_gap_timeout_ms == 0 {
            bail!("parser.byte_gap_timeout_ms must be non-zero");
        }
        if self.serial.port.is_empty() {
            bail!("serial.port must not be empty");
        }
        if self.serial.baud_rate == 0 {
            bail!("serial.baud_rate must be non-zero");
        }
        if self.pins.spi_clock_hz == 0 {
            bail!("pins.spi_clock_hz must be non-zero");
        }
        Ok(())
    }
}
