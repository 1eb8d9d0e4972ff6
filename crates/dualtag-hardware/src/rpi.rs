//! Raspberry Pi backends via `rppal`.
//!
//! - [`RpiSpi`] exposes an SPI bus as a raw [`SpiTransport`]. The reader's
//!   chip select must be wired to a plain GPIO and driven through
//!   [`ChipSelectBus`](crate::bus::ChipSelectBus), because the kernel's
//!   hardware chip select toggles between the address and data phases of a
//!   register read.
//! - [`RpiOutputPin`] drives reset, chip-select and RDM6300 enable lines.
//! - [`RpiBuzzer`] generates acknowledgement tones with software PWM.

use crate::error::Result;
use crate::traits::{OutputLine, SpiTransport, ToneGenerator};
use rppal::gpio::{Gpio, OutputPin};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use std::time::Duration;
use tracing::debug;

/// Duty cycle used for buzzer tones.
const BUZZER_DUTY_CYCLE: f64 = 0.5;

/// SPI bus wrapper.
#[derive(Debug)]
pub struct RpiSpi {
    spi: Spi,
}

impl RpiSpi {
    /// Open `/dev/spidev<bus>.<ss>` in mode 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the SPI device cannot be opened.
    pub fn open(bus: Bus, slave_select: SlaveSelect, clock_hz: u32) -> Result<Self> {
        debug!("Opening SPI {:?}/{:?} at {} Hz", bus, slave_select, clock_hz);
        let spi = Spi::new(bus, slave_select, clock_hz, Mode::Mode0)?;
        Ok(Self { spi })
    }
}

impl SpiTransport for RpiSpi {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.spi.write(bytes)?;
        Ok(())
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        self.spi.read(buf)?;
        Ok(())
    }
}

/// Map a bus number from configuration onto an `rppal` SPI bus.
///
/// # Errors
///
/// Returns an error for bus numbers the Pi does not expose.
pub fn spi_bus(index: u8) -> Result<Bus> {
    match index {
        0 => Ok(Bus::Spi0),
        1 => Ok(Bus::Spi1),
        2 => Ok(Bus::Spi2),
        other => Err(crate::HardwareError::initialization_failed(format!(
            "unknown SPI bus {other}"
        ))),
    }
}

/// GPIO output pin.
#[derive(Debug)]
pub struct RpiOutputPin {
    pin: OutputPin,
}

impl RpiOutputPin {
    /// Claim BCM pin `bcm` as an output, initially low.
    ///
    /// # Errors
    ///
    /// Returns an error if the GPIO peripheral or the pin is unavailable.
    pub fn claim(gpio: &Gpio, bcm: u8) -> Result<Self> {
        let mut pin = gpio.get(bcm)?.into_output_low();
        pin.set_reset_on_drop(false);
        Ok(Self { pin })
    }
}

impl OutputLine for RpiOutputPin {
    fn set(&mut self, high: bool) -> Result<()> {
        if high {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
        Ok(())
    }
}

/// Piezo buzzer on a GPIO pin, driven with software PWM.
#[derive(Debug)]
pub struct RpiBuzzer {
    pin: OutputPin,
}

impl RpiBuzzer {
    /// Claim BCM pin `bcm` for the buzzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the GPIO peripheral or the pin is unavailable.
    pub fn claim(gpio: &Gpio, bcm: u8) -> Result<Self> {
        let pin = gpio.get(bcm)?.into_output_low();
        Ok(Self { pin })
    }
}

impl ToneGenerator for RpiBuzzer {
    fn play_tone(&mut self, frequency_hz: u32, duration: Duration) -> Result<()> {
        self.pin
            .set_pwm_frequency(f64::from(frequency_hz), BUZZER_DUTY_CYCLE)?;
        std::thread::sleep(duration);
        self.pin.clear_pwm()?;
        self.pin.set_low();
        Ok(())
    }
}
