//! Card presence detection: request followed by cascade-level-1
//! anticollision.

use crate::driver::{Mfrc522, PcdCommand};
use crate::registers::{self, picc, reg};
use dualtag_core::CardUid;
use dualtag_hardware::RegisterBus;
use tracing::{debug, trace};

/// Bits in a well-formed ATQA.
const ATQA_BITS: usize = 16;

/// Polls an MFRC522 for a single tag and returns its UID.
#[derive(Debug)]
pub struct CardPresenceDetector<B> {
    driver: Mfrc522<B>,
}

impl<B: RegisterBus> CardPresenceDetector<B> {
    pub fn new(driver: Mfrc522<B>) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &Mfrc522<B> {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut Mfrc522<B> {
        &mut self.driver
    }

    pub fn into_driver(self) -> Mfrc522<B> {
        self.driver
    }

    /// Run one request/anticollision exchange.
    ///
    /// Returns `None` when no tag answers, the ATQA is malformed, or the
    /// anticollision reply is empty or longer than a UID can be. Never
    /// fails; bus errors surface as `None`.
    pub fn poll_for_tag(&mut self) -> Option<CardUid> {
        let request = self.driver.config().request_mode.picc_command();

        if let Err(e) = self
            .driver
            .write_register(reg::BIT_FRAMING, registers::SHORT_FRAME_BITS)
        {
            debug!("RC522 bit framing write failed: {}", e);
            return None;
        }

        let atqa = self.driver.execute_command(PcdCommand::Transceive, &[request]);
        if !atqa.outcome.is_ok() {
            return None;
        }
        if atqa.valid_bits != ATQA_BITS {
            trace!("RC522 ATQA with {} bits ignored", atqa.valid_bits);
            return None;
        }

        if let Err(e) = self
            .driver
            .write_register(reg::BIT_FRAMING, registers::FULL_BYTE_FRAMING)
        {
            debug!("RC522 bit framing write failed: {}", e);
            return None;
        }

        let select = self
            .driver
            .execute_command(PcdCommand::Transceive, &picc::ANTICOLL_CL1);
        if !select.outcome.is_ok() {
            trace!("RC522 anticollision: {}", select.outcome);
            return None;
        }

        match CardUid::new(select.data.as_slice()) {
            Ok(uid) => {
                debug!("RC522 UID {}", uid);
                Some(uid)
            }
            Err(e) => {
                trace!("RC522 anticollision reply rejected: {}", e);
                None
            }
        }
    }
}
