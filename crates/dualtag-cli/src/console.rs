//! Keyboard that types into a byte stream.
//!
//! Used when the process runs on a host that forwards stdout to the target
//! application (for example a serial console or a pipe into a HID gadget
//! helper).

use dualtag_hardware::{Keyboard, Result};
use std::io::{self, Stdout, Write};

/// [`Keyboard`] writing each identifier as one line.
#[derive(Debug)]
pub struct ConsoleKeyboard<W> {
    out: W,
}

impl ConsoleKeyboard<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleKeyboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }
}

impl<W: Write> Keyboard for ConsoleKeyboard<W> {
    fn type_text(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes())?;
        Ok(())
    }

    fn press_enter(&mut self) -> Result<()> {
        self.out.write_all(b"\n")?;
        self.out.flush()?;
        Ok(())
    }
}
