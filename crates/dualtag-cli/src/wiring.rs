//! Raspberry Pi wiring: open every device named in [`AppConfig`] and run
//! the acquisition loop on them.

use crate::config::AppConfig;
use crate::console::ConsoleKeyboard;
use crate::runner::{self, RunSummary};
use anyhow::{Context, Result};
use dualtag_hardware::rpi::{self, RpiBuzzer, RpiOutputPin, RpiSpi};
use dualtag_hardware::serial::SerialByteChannel;
use dualtag_hardware::{ChipSelectBus, StdDelay};
use dualtag_protocol::FrameParser;
use dualtag_rfid::{CardPresenceDetector, Mfrc522};
use dualtag_scheduler::{DualReaderScheduler, FeedbackSink, ReaderSet};
use rppal::gpio::Gpio;
use rppal::spi::SlaveSelect;
use std::sync::atomic::AtomicBool;
use std::time::Instant;
use tracing::{info, warn};

/// Bring up both readers and the buzzer, then block in the loop until
/// `stop` is set.
pub fn run(config: &AppConfig, stop: &AtomicBool) -> Result<RunSummary> {
    let pins = &config.pins;
    let gpio = Gpio::new().context("failed to open GPIO")?;

    let spi = RpiSpi::open(
        rpi::spi_bus(pins.spi_bus)?,
        SlaveSelect::Ss0,
        pins.spi_clock_hz,
    )
    .context("failed to open SPI for the MFRC522")?;
    let chip_select = RpiOutputPin::claim(&gpio, pins.chip_select)
        .with_context(|| format!("failed to claim chip select GPIO{}", pins.chip_select))?;
    let bus = ChipSelectBus::new(spi, chip_select)?;

    let mut reset = RpiOutputPin::claim(&gpio, pins.reset)
        .with_context(|| format!("failed to claim reset GPIO{}", pins.reset))?;
    let mut driver = Mfrc522::new(bus, config.driver);
    driver.reset(&mut reset, &mut StdDelay);
    driver.configure().context("failed to configure the MFRC522")?;
    match driver.version() {
        Ok(version) => info!("MFRC522 version 0x{:02X}", version),
        Err(e) => warn!("Could not read MFRC522 version: {}", e),
    }

    let uart = SerialByteChannel::open(
        &config.serial.port,
        config.serial.baud_rate,
        config.serial.read_timeout(),
    )
    .with_context(|| format!("failed to open RDM6300 port {}", config.serial.port))?;
    let uart_enable = RpiOutputPin::claim(&gpio, pins.uart_enable)
        .with_context(|| format!("failed to claim RDM6300 enable GPIO{}", pins.uart_enable))?;
    let buzzer = RpiBuzzer::claim(&gpio, pins.buzzer)
        .with_context(|| format!("failed to claim buzzer GPIO{}", pins.buzzer))?;

    let readers = ReaderSet {
        detector: CardPresenceDetector::new(driver),
        uart,
        uart_enable,
        parser: FrameParser::with_config(config.parser),
    };
    let sink = FeedbackSink::new(ConsoleKeyboard::stdout(), buzzer);
    let mut scheduler = DualReaderScheduler::new(readers, sink, config.scheduler, Instant::now());

    Ok(runner::run_until(&mut scheduler, stop, &mut StdDelay))
}
