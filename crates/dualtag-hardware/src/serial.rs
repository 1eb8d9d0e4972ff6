//! Serial-port backed UART channel.
//!
//! Opens the RDM6300 port at 9600 8N1 with a short read timeout and exposes
//! it as a non-blocking [`ByteChannel`]: only bytes already sitting in the
//! driver's receive queue are read.

use crate::error::Result;
use crate::traits::ByteChannel;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{ErrorKind, Read};
use std::time::Duration;
use tracing::{debug, info};

/// UART receive channel over a host serial port.
pub struct SerialByteChannel {
    port: Box<dyn SerialPort>,
}

impl SerialByteChannel {
    /// Open `path` at `baud_rate` with the given read timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the port does not exist or cannot be configured.
    pub fn open(path: &str, baud_rate: u32, read_timeout: Duration) -> Result<Self> {
        info!("Opening UART {} at {} baud", path, baud_rate);
        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(read_timeout)
            .open()?;

        // Stale bytes from before startup would only desynchronize the parser.
        port.clear(serialport::ClearBuffer::Input)?;
        Ok(Self { port })
    }

    pub fn name(&self) -> Option<String> {
        self.port.name()
    }
}

impl std::fmt::Debug for SerialByteChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialByteChannel")
            .field("port", &self.port.name())
            .finish()
    }
}

impl ByteChannel for SerialByteChannel {
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize> {
        let pending = self.port.bytes_to_read()? as usize;
        if pending == 0 || buf.is_empty() {
            return Ok(0);
        }

        let n = pending.min(buf.len());
        match self.port.read(&mut buf[..n]) {
            Ok(read) => Ok(read),
            Err(e) if e.kind() == ErrorKind::TimedOut => {
                debug!("UART read timed out with {} bytes pending", pending);
                Ok(0)
            }
            Err(e) => Err(e.into()),
        }
    }
}
