//! MFRC522 command driver.
//!
//! Drives the reader through its register interface: soft reset, timer and
//! modulation setup, antenna control and the generic "load FIFO, issue
//! command, poll IRQ, drain FIFO" cycle every card operation is built on.

use crate::registers::{self, command, reg};
use dualtag_core::{
    CommandOutcome,
    constants::{DEFAULT_POLL_CEILING, FIFO_CAPACITY, RESET_SETTLE_MS},
};
use dualtag_hardware::{Delay, OutputLine, RegisterBus, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// PCD command issued through CommandReg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PcdCommand {
    /// Transmit the FIFO contents and receive the tag's reply.
    Transceive,

    /// MIFARE Classic three-pass authentication.
    Authenticate,
}

impl PcdCommand {
    /// Command code written to CommandReg.
    pub fn code(&self) -> u8 {
        match self {
            PcdCommand::Transceive => command::TRANSCEIVE,
            PcdCommand::Authenticate => command::MF_AUTHENT,
        }
    }

    /// Interrupt sources enabled while the command runs.
    pub fn irq_enable(&self) -> u8 {
        match self {
            // Tx | Rx | Idle | LoAlert | Err | Timer
            PcdCommand::Transceive => 0x77,
            // Idle | Err
            PcdCommand::Authenticate => 0x12,
        }
    }

    /// ComIrqReg bits that signal completion.
    pub fn wait_irq(&self) -> u8 {
        match self {
            // Rx | Idle
            PcdCommand::Transceive => 0x30,
            // Idle
            PcdCommand::Authenticate => 0x10,
        }
    }
}

/// Receiver gain written to RFCfgReg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AntennaGain {
    Db18,
    Db23,
    Db33,
    Db38,
    Db43,
    #[default]
    Db48,
}

impl AntennaGain {
    /// Value of the RxGain field, already shifted into place.
    pub fn register_bits(&self) -> u8 {
        let field = match self {
            AntennaGain::Db18 => 0b010,
            AntennaGain::Db23 => 0b011,
            AntennaGain::Db33 => 0b100,
            AntennaGain::Db38 => 0b101,
            AntennaGain::Db43 => 0b110,
            AntennaGain::Db48 => 0b111,
        };
        field << 4
    }
}

/// Which tags a request wakes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestMode {
    /// REQA: only tags in the IDLE state answer. A tag that stays in the
    /// field is not reported again until it leaves and re-enters.
    #[default]
    Idle,

    /// WUPA: HALTed tags answer too.
    All,
}

impl RequestMode {
    pub fn picc_command(&self) -> u8 {
        match self {
            RequestMode::Idle => registers::picc::REQ_IDLE,
            RequestMode::All => registers::picc::REQ_ALL,
        }
    }
}

/// MFRC522 driver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Maximum number of ComIrqReg reads before a command is abandoned.
    pub poll_ceiling: u32,

    /// Receiver gain written during configuration.
    pub antenna_gain: AntennaGain,

    /// Request command used by presence detection.
    pub request_mode: RequestMode,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            poll_ceiling: DEFAULT_POLL_CEILING,
            antenna_gain: AntennaGain::Db48,
            request_mode: RequestMode::Idle,
        }
    }
}

/// Bytes drained from the FIFO after a successful transceive.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FifoData {
    bytes: [u8; FIFO_CAPACITY],
    len: usize,
}

impl FifoData {
    pub const fn empty() -> Self {
        Self {
            bytes: [0; FIFO_CAPACITY],
            len: 0,
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn push(&mut self, byte: u8) {
        if self.len < FIFO_CAPACITY {
            self.bytes[self.len] = byte;
            self.len += 1;
        }
    }
}

impl Default for FifoData {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for FifoData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FifoData({:02X?})", self.as_slice())
    }
}

/// Result of [`Mfrc522::execute_command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandResponse {
    pub outcome: CommandOutcome,
    pub data: FifoData,

    /// Number of valid bits in `data`; the last byte may be partial.
    pub valid_bits: usize,
}

impl CommandResponse {
    fn with_outcome(outcome: CommandOutcome) -> Self {
        Self {
            outcome,
            data: FifoData::empty(),
            valid_bits: 0,
        }
    }

    pub fn error() -> Self {
        Self::with_outcome(CommandOutcome::Error)
    }

    pub fn no_tag() -> Self {
        Self::with_outcome(CommandOutcome::NoTag)
    }
}

/// MFRC522 reader driven over a [`RegisterBus`].
///
/// The driver owns its bus, so no other bus user can interleave with a
/// command cycle.
///
/// # Examples
///
/// ```
/// use dualtag_core::CommandOutcome;
/// use dualtag_hardware::mock::MockRegisterBus;
/// use dualtag_rfid::{DriverConfig, Mfrc522, PcdCommand};
///
/// let mut bus = MockRegisterBus::new();
/// bus.set_register(0x04, 0x01); // timer expired, nothing answered
///
/// let mut reader = Mfrc522::new(bus, DriverConfig::default());
/// let response = reader.execute_command(PcdCommand::Transceive, &[0x26]);
/// assert_eq!(response.outcome, CommandOutcome::NoTag);
/// ```
#[derive(Debug)]
pub struct Mfrc522<B> {
    bus: B,
    config: DriverConfig,
}

impl<B: RegisterBus> Mfrc522<B> {
    pub fn new(bus: B, config: DriverConfig) -> Self {
        Self { bus, config }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn into_bus(self) -> B {
        self.bus
    }

    /// Pulse the hardware reset line low, then high.
    ///
    /// Failures are logged and otherwise ignored; a reader that did not come
    /// back simply reports no tags.
    pub fn reset<L, D>(&mut self, reset_line: &mut L, delay: &mut D)
    where
        L: OutputLine,
        D: Delay,
    {
        let settle = Duration::from_millis(RESET_SETTLE_MS);

        if let Err(e) = reset_line.set_low() {
            warn!("Failed to assert RC522 reset line: {}", e);
        }
        delay.delay(settle);
        if let Err(e) = reset_line.set_high() {
            warn!("Failed to release RC522 reset line: {}", e);
        }
        delay.delay(settle);
    }

    /// Write the SoftReset command.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus write fails.
    pub fn soft_reset(&mut self) -> Result<()> {
        debug!("RC522 soft reset");
        self.bus
            .write_register(reg::COMMAND, command::SOFT_RESET)
    }

    /// Soft-reset, program timer, modulation, CRC preset and receiver gain,
    /// then switch the antenna on.
    ///
    /// Safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// Returns an error if any register access fails.
    pub fn configure(&mut self) -> Result<()> {
        self.soft_reset()?;
        self.bus.write_register(reg::T_MODE, registers::T_MODE_AUTO)?;
        self.bus
            .write_register(reg::T_PRESCALER, registers::T_PRESCALER_LO)?;
        self.bus
            .write_register(reg::T_RELOAD_L, registers::T_RELOAD_LO)?;
        self.bus
            .write_register(reg::T_RELOAD_H, registers::T_RELOAD_HI)?;
        self.bus
            .write_register(reg::TX_ASK, registers::FORCE_100_ASK)?;
        self.bus
            .write_register(reg::MODE, registers::MODE_CRC_6363)?;

        self.set_antenna_gain(self.config.antenna_gain)?;
        self.antenna_on()
    }

    /// Enable both antenna drivers, leaving them untouched if already on.
    ///
    /// # Errors
    ///
    /// Returns an error if any register access fails.
    pub fn antenna_on(&mut self) -> Result<()> {
        let current = self.bus.read_register(reg::TX_CONTROL)?;
        if current & registers::ANTENNA_ON != registers::ANTENNA_ON {
            self.bus
                .write_register(reg::TX_CONTROL, current | registers::ANTENNA_ON)?;
        }
        Ok(())
    }

    /// Replace the RxGain field of RFCfgReg.
    ///
    /// # Errors
    ///
    /// Returns an error if any register access fails.
    pub fn set_antenna_gain(&mut self, gain: AntennaGain) -> Result<()> {
        let current = self.bus.read_register(reg::RF_CFG)?;
        let updated = (current & !registers::RX_GAIN_MASK) | gain.register_bits();
        debug!("RC522 antenna gain {:?} (RFCfgReg {:#04x})", gain, updated);
        self.bus.write_register(reg::RF_CFG, updated)
    }

    /// Read VersionReg.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus read fails.
    pub fn version(&mut self) -> Result<u8> {
        self.bus.read_register(reg::VERSION)
    }

    /// Write `value` to a raw register.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus write fails.
    pub fn write_register(&mut self, register: u8, value: u8) -> Result<()> {
        self.bus.write_register(register, value)
    }

    /// Run one command cycle.
    ///
    /// Loads `payload` into the FIFO, starts `cmd`, and polls ComIrqReg until
    /// the timer or one of the command's completion bits fires, giving up
    /// after [`DriverConfig::poll_ceiling`] reads. Bus failures are reported
    /// as [`CommandOutcome::Error`].
    pub fn execute_command(&mut self, cmd: PcdCommand, payload: &[u8]) -> CommandResponse {
        match self.run_command(cmd, payload) {
            Ok(response) => response,
            Err(e) => {
                debug!("RC522 {:?} failed on the bus: {}", cmd, e);
                CommandResponse::error()
            }
        }
    }

    fn run_command(&mut self, cmd: PcdCommand, payload: &[u8]) -> Result<CommandResponse> {
        let irq_enable = cmd.irq_enable();
        let wait_irq = cmd.wait_irq();

        self.bus
            .write_register(reg::COM_IEN, irq_enable | registers::IRQ_INVERT)?;
        self.bus
            .write_register(reg::COM_IRQ, registers::CLEAR_ALL_IRQ)?;
        self.bus
            .write_register(reg::FIFO_LEVEL, registers::FLUSH_BUFFER)?;

        for &byte in payload {
            self.bus.write_register(reg::FIFO_DATA, byte)?;
        }

        self.bus.write_register(reg::COMMAND, cmd.code())?;
        if cmd == PcdCommand::Transceive {
            self.set_bits(reg::BIT_FRAMING, registers::START_SEND)?;
        }

        let irq = self.poll_irq(wait_irq)?;

        if cmd == PcdCommand::Transceive {
            self.clear_bits(reg::BIT_FRAMING, registers::START_SEND)?;
        }

        let Some(irq) = irq else {
            debug!(
                "RC522 {:?} gave no IRQ after {} polls",
                cmd, self.config.poll_ceiling
            );
            return Ok(CommandResponse::error());
        };

        let error = self.bus.read_register(reg::ERROR)?;
        if error & registers::ERROR_MASK != 0 {
            trace!("RC522 ErrorReg {:#04x}", error);
            return Ok(CommandResponse::error());
        }

        if irq & irq_enable & registers::TIMER_IRQ != 0 {
            return Ok(CommandResponse::no_tag());
        }

        let mut response = CommandResponse::with_outcome(CommandOutcome::Ok);
        if cmd == PcdCommand::Transceive {
            self.drain_fifo(&mut response)?;
        }
        Ok(response)
    }

    /// Poll ComIrqReg until the timer or a `wait_irq` bit is set.
    fn poll_irq(&mut self, wait_irq: u8) -> Result<Option<u8>> {
        for _ in 0..self.config.poll_ceiling {
            let irq = self.bus.read_register(reg::COM_IRQ)?;
            if irq & (registers::TIMER_IRQ | wait_irq) != 0 {
                return Ok(Some(irq));
            }
        }
        Ok(None)
    }

    fn drain_fifo(&mut self, response: &mut CommandResponse) -> Result<()> {
        let level = self.bus.read_register(reg::FIFO_LEVEL)? & registers::FIFO_LEVEL_MASK;
        let count = usize::from(level).min(FIFO_CAPACITY);
        let last_bits = usize::from(
            self.bus.read_register(reg::CONTROL)? & registers::RX_LAST_BITS_MASK,
        );

        response.valid_bits = match (count, last_bits) {
            (0, _) => 0,
            (n, 0) => n * 8,
            (n, bits) => (n - 1) * 8 + bits,
        };

        for _ in 0..count {
            let byte = self.bus.read_register(reg::FIFO_DATA)?;
            response.data.push(byte);
        }

        trace!(
            "RC522 FIFO {:02X?} ({} bits)",
            response.data.as_slice(),
            response.valid_bits
        );
        Ok(())
    }

    fn set_bits(&mut self, register: u8, mask: u8) -> Result<()> {
        let current = self.bus.read_register(register)?;
        self.bus.write_register(register, current | mask)
    }

    fn clear_bits(&mut self, register: u8, mask: u8) -> Result<()> {
        let current = self.bus.read_register(register)?;
        self.bus.write_register(register, current & !mask)
    }
}
