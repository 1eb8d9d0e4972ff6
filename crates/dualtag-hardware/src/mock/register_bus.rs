//! Scriptable register bus.
//!
//! Reads are answered from a per-register queue first and fall back to a
//! sticky value once the queue is drained. Writes never change what is read
//! back; they are only recorded, which lets tests model volatile registers
//! (IRQ flags, FIFO data) independently of what the driver writes.

use crate::error::{HardwareError, Result};
use crate::traits::RegisterBus;
use std::collections::{HashMap, VecDeque};

/// Mock register-addressed device for driver tests.
///
/// # Examples
///
/// ```
/// use dualtag_hardware::mock::MockRegisterBus;
/// use dualtag_hardware::traits::RegisterBus;
///
/// let mut bus = MockRegisterBus::new();
/// bus.set_register(0x37, 0x92);
/// bus.queue_reads(0x09, &[0xAA, 0xBB]);
///
/// assert_eq!(bus.read_register(0x37).unwrap(), 0x92);
/// assert_eq!(bus.read_register(0x09).unwrap(), 0xAA);
/// assert_eq!(bus.read_register(0x09).unwrap(), 0xBB);
/// assert_eq!(bus.read_register(0x09).unwrap(), 0x00);
///
/// bus.write_register(0x01, 0x0F).unwrap();
/// assert_eq!(bus.writes_to(0x01), vec![0x0F]);
/// ```
#[derive(Debug, Default, Clone)]
pub struct MockRegisterBus {
    /// Value returned once a register's queue is empty.
    sticky: HashMap<u8, u8>,

    /// One-shot values consumed in order by reads.
    queued: HashMap<u8, VecDeque<u8>>,

    /// Every write in issue order.
    writes: Vec<(u8, u8)>,

    /// Every register read in issue order.
    reads: Vec<u8>,

    /// Fail every transaction when set.
    failing: bool,
}

impl MockRegisterBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value a register reads back once its queue is drained.
    pub fn set_register(&mut self, reg: u8, value: u8) {
        self.sticky.insert(reg, value);
    }

    /// Append one-shot read values for a register.
    pub fn queue_reads(&mut self, reg: u8, values: &[u8]) {
        self.queued.entry(reg).or_default().extend(values);
    }

    /// Make every subsequent transaction fail.
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// All writes recorded so far, as `(register, value)` pairs.
    pub fn writes(&self) -> &[(u8, u8)] {
        &self.writes
    }

    /// Values written to a single register, in order.
    pub fn writes_to(&self, reg: u8) -> Vec<u8> {
        self.writes
            .iter()
            .filter(|(r, _)| *r == reg)
            .map(|(_, v)| *v)
            .collect()
    }

    /// Number of reads issued against a register.
    pub fn read_count(&self, reg: u8) -> usize {
        self.reads.iter().filter(|r| **r == reg).count()
    }

    /// Forget recorded traffic, keeping scripted values.
    pub fn clear_history(&mut self) {
        self.writes.clear();
        self.reads.clear();
    }
}

impl RegisterBus for MockRegisterBus {
    fn write_register(&mut self, reg: u8, value: u8) -> Result<()> {
        if self.failing {
            return Err(HardwareError::bus("mock bus failure"));
        }
        self.writes.push((reg, value));
        Ok(())
    }

    fn read_register(&mut self, reg: u8) -> Result<u8> {
        if self.failing {
            return Err(HardwareError::bus("mock bus failure"));
        }
        self.reads.push(reg);

        let queued = self.queued.get_mut(&reg).and_then(VecDeque::pop_front);
        Ok(queued.unwrap_or_else(|| self.sticky.get(&reg).copied().unwrap_or(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_takes_precedence_over_sticky() {
        let mut bus = MockRegisterBus::new();
        bus.set_register(0x04, 0x30);
        bus.queue_reads(0x04, &[0x00, 0x00]);

        assert_eq!(bus.read_register(0x04).unwrap(), 0x00);
        assert_eq!(bus.read_register(0x04).unwrap(), 0x00);
        assert_eq!(bus.read_register(0x04).unwrap(), 0x30);
        assert_eq!(bus.read_count(0x04), 3);
    }

    #[test]
    fn test_writes_do_not_change_reads() {
        let mut bus = MockRegisterBus::new();
        bus.set_register(0x14, 0x80);
        bus.write_register(0x14, 0x83).unwrap();

        assert_eq!(bus.read_register(0x14).unwrap(), 0x80);
        assert_eq!(bus.writes(), &[(0x14, 0x83)]);
    }

    #[test]
    fn test_failing_bus() {
        let mut bus = MockRegisterBus::new();
        bus.set_failing(true);

        assert!(bus.write_register(0x01, 0x00).is_err());
        assert!(bus.read_register(0x01).is_err());
        assert!(bus.writes().is_empty());
    }

    #[test]
    fn test_clear_history() {
        let mut bus = MockRegisterBus::new();
        bus.set_register(0x37, 0x91);
        bus.write_register(0x01, 0x0F).unwrap();
        bus.read_register(0x37).unwrap();

        bus.clear_history();
        assert!(bus.writes().is_empty());
        assert_eq!(bus.read_count(0x37), 0);
        assert_eq!(bus.read_register(0x37).unwrap(), 0x91);
    }
}
