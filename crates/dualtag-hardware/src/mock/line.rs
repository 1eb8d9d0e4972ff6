//! Mock GPIO lines, SPI transport and delay.

use crate::error::{HardwareError, Result};
use crate::traits::{Delay, OutputLine, SpiTransport};
use std::collections::VecDeque;
use std::time::Duration;

/// Output line that records every level it is driven to.
#[derive(Debug, Default, Clone)]
pub struct MockOutputLine {
    history: Vec<bool>,
    failing: bool,
}

impl MockOutputLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current level; `None` if the line was never driven.
    pub fn level(&self) -> Option<bool> {
        self.history.last().copied()
    }

    pub fn history(&self) -> &[bool] {
        &self.history
    }

    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }
}

impl OutputLine for MockOutputLine {
    fn set(&mut self, high: bool) -> Result<()> {
        if self.failing {
            return Err(HardwareError::gpio("mock line failure"));
        }
        self.history.push(high);
        Ok(())
    }
}

/// SPI transport that records outgoing bytes and replays scripted input.
#[derive(Debug, Default, Clone)]
pub struct MockSpiTransport {
    written: Vec<Vec<u8>>,
    replies: VecDeque<u8>,
}

impl MockSpiTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes returned by subsequent `read_into` calls; zero once exhausted.
    pub fn queue_replies(&mut self, bytes: &[u8]) {
        self.replies.extend(bytes);
    }

    /// Every `write` call's payload, in order.
    pub fn written(&self) -> &[Vec<u8>] {
        &self.written
    }
}

impl SpiTransport for MockSpiTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.written.push(bytes.to_vec());
        Ok(())
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        for b in buf.iter_mut() {
            *b = self.replies.pop_front().unwrap_or(0);
        }
        Ok(())
    }
}

/// Delay that records requested durations instead of sleeping.
#[derive(Debug, Default, Clone)]
pub struct MockDelay {
    requested: Vec<Duration>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requested(&self) -> &[Duration] {
        &self.requested
    }

    pub fn total(&self) -> Duration {
        self.requested.iter().sum()
    }
}

impl Delay for MockDelay {
    fn delay(&mut self, duration: Duration) {
        self.requested.push(duration);
    }
}
