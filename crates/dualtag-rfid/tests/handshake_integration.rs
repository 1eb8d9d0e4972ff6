//! Integration tests for the MFRC522 driver over a chip-select bus.
//!
//! A small simulated reader sits behind the SPI transport and answers REQA
//! and anticollision the way a real MFRC522 with one tag in the field would,
//! so the address encoding, chip-select bracketing, driver and detector are
//! exercised together.

use dualtag_core::Identifier;
use dualtag_hardware::mock::MockOutputLine;
use dualtag_hardware::{ChipSelectBus, SpiTransport};
use dualtag_rfid::registers::{picc, reg};
use dualtag_rfid::{CardPresenceDetector, DriverConfig, Mfrc522};
use std::collections::{HashMap, VecDeque};

/// Register-level model of an MFRC522 with at most one tag in range.
#[derive(Debug, Default)]
struct SimulatedReader {
    registers: HashMap<u8, u8>,
    fifo_in: Vec<u8>,
    fifo_out: VecDeque<u8>,
    read_latch: Option<u8>,
    tag: Option<Vec<u8>>,
}

impl SimulatedReader {
    fn with_tag(uid: &[u8]) -> Self {
        Self {
            tag: Some(uid.to_vec()),
            ..Self::default()
        }
    }

    fn register_write(&mut self, register: u8, value: u8) {
        match register {
            reg::FIFO_DATA => self.fifo_in.push(value),
            reg::FIFO_LEVEL if value & 0x80 != 0 => {
                self.fifo_in.clear();
                self.fifo_out.clear();
            }
            reg::COM_IRQ => {
                self.registers.insert(reg::COM_IRQ, 0);
            }
            reg::BIT_FRAMING if value & 0x80 != 0 => {
                self.registers.insert(reg::BIT_FRAMING, value);
                self.transceive();
            }
            _ => {
                self.registers.insert(register, value);
            }
        }
    }

    fn register_read(&mut self, register: u8) -> u8 {
        match register {
            reg::FIFO_DATA => self.fifo_out.pop_front().unwrap_or(0),
            reg::FIFO_LEVEL => self.fifo_out.len() as u8,
            _ => self.registers.get(&register).copied().unwrap_or(0),
        }
    }

    fn transceive(&mut self) {
        let frame = std::mem::take(&mut self.fifo_in);
        let reply = match (&self.tag, frame.as_slice()) {
            (Some(_), [picc::REQ_IDLE]) | (Some(_), [picc::REQ_ALL]) => Some(vec![0x04, 0x00]),
            (Some(uid), [0x93, 0x20]) => {
                let bcc = uid.iter().fold(0u8, |acc, b| acc ^ b);
                let mut reply = uid.clone();
                reply.push(bcc);
                Some(reply)
            }
            _ => None,
        };

        match reply {
            Some(bytes) => {
                self.fifo_out.extend(bytes);
                self.registers.insert(reg::COM_IRQ, 0x30);
            }
            None => {
                self.registers.insert(reg::COM_IRQ, 0x01);
            }
        }
    }
}

impl SpiTransport for SimulatedReader {
    fn write(&mut self, bytes: &[u8]) -> dualtag_hardware::Result<()> {
        match bytes {
            [addr] if addr & 0x80 != 0 => self.read_latch = Some((addr & 0x7E) >> 1),
            [addr, value] => self.register_write((addr & 0x7E) >> 1, *value),
            other => panic!("unexpected SPI write {other:02X?}"),
        }
        Ok(())
    }

    fn read_into(&mut self, buf: &mut [u8]) -> dualtag_hardware::Result<()> {
        let register = self.read_latch.take().expect("read without address");
        for byte in buf.iter_mut() {
            *byte = self.register_read(register);
        }
        Ok(())
    }
}

fn detector_for(
    reader: SimulatedReader,
) -> CardPresenceDetector<ChipSelectBus<SimulatedReader, MockOutputLine>> {
    let bus = ChipSelectBus::new(reader, MockOutputLine::new()).unwrap();
    let mut driver = Mfrc522::new(bus, DriverConfig::default());
    driver.configure().unwrap();
    CardPresenceDetector::new(driver)
}

#[test]
fn test_configure_turns_antenna_on() {
    let detector = detector_for(SimulatedReader::default());
    let sim = detector.driver().bus().transport();

    assert_eq!(sim.registers.get(&reg::TX_CONTROL), Some(&0x03));
    assert_eq!(sim.registers.get(&reg::T_MODE), Some(&0x8D));
    assert_eq!(sim.registers.get(&reg::RF_CFG), Some(&0x70));
}

#[test]
fn test_four_byte_uid_detected() {
    let mut detector = detector_for(SimulatedReader::with_tag(&[0x04, 0x05, 0x06, 0x07]));

    let uid = detector.poll_for_tag().unwrap();

    // Cascade level 1 reply carries the BCC after the UID.
    assert_eq!(uid.as_bytes(), &[0x04, 0x05, 0x06, 0x07, 0x04]);
    assert_eq!(Identifier::from(&uid).as_str(), "0405060704");
}

#[test]
fn test_empty_field_reports_nothing() {
    let mut detector = detector_for(SimulatedReader::default());

    assert!(detector.poll_for_tag().is_none());
    assert!(detector.poll_for_tag().is_none());
}

#[test]
fn test_chip_select_released_after_every_transaction() {
    let mut detector = detector_for(SimulatedReader::with_tag(&[0xDE, 0xAD, 0xBE, 0xEF]));
    detector.poll_for_tag().unwrap();

    let cs = detector.driver().bus().chip_select();
    assert_eq!(cs.level(), Some(true));

    let history = cs.history();
    assert!(history.len() > 1);
    // parked high, then alternating assert/release
    for pair in history[1..].chunks(2) {
        assert_eq!(pair, &[false, true]);
    }
}
