//! Mock UART receive channel.

use crate::error::{HardwareError, Result};
use crate::traits::ByteChannel;
use std::collections::VecDeque;

/// Byte channel fed with scripted batches.
///
/// Each pushed batch is delivered by its own `read_available` call (split
/// further only if the caller's buffer is smaller), so tests control exactly
/// which bytes arrive together in one tick.
///
/// # Examples
///
/// ```
/// use dualtag_hardware::mock::MockByteChannel;
/// use dualtag_hardware::traits::ByteChannel;
///
/// let mut uart = MockByteChannel::new();
/// uart.push(&[0x02, b'1', b'2']);
///
/// let mut buf = [0u8; 32];
/// assert_eq!(uart.read_available(&mut buf).unwrap(), 3);
/// assert_eq!(uart.read_available(&mut buf).unwrap(), 0);
/// ```
#[derive(Debug, Default, Clone)]
pub struct MockByteChannel {
    batches: VecDeque<Vec<u8>>,
    reads: usize,
    failing: bool,
}

impl MockByteChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a batch of bytes for a later read.
    pub fn push(&mut self, bytes: &[u8]) {
        if !bytes.is_empty() {
            self.batches.push_back(bytes.to_vec());
        }
    }

    /// Number of batches still waiting to be read.
    pub fn pending_batches(&self) -> usize {
        self.batches.len()
    }

    /// Number of `read_available` calls made so far.
    pub fn read_calls(&self) -> usize {
        self.reads
    }

    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }
}

impl ByteChannel for MockByteChannel {
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.reads += 1;
        if self.failing {
            return Err(HardwareError::disconnected("mock UART"));
        }

        let Some(batch) = self.batches.front_mut() else {
            return Ok(0);
        };

        let n = batch.len().min(buf.len());
        buf[..n].copy_from_slice(&batch[..n]);
        batch.drain(..n);
        if batch.is_empty() {
            self.batches.pop_front();
        }
        Ok(n)
    }
}
