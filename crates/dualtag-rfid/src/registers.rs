//! MFRC522 register map, command codes and bit masks.
//!
//! Only the subset used by the request/anticollision handshake is listed.

/// Register addresses (datasheet section 9.2).
pub mod reg {
    pub const COMMAND: u8 = 0x01;
    pub const COM_IEN: u8 = 0x02;
    pub const COM_IRQ: u8 = 0x04;
    pub const ERROR: u8 = 0x06;
    pub const FIFO_DATA: u8 = 0x09;
    pub const FIFO_LEVEL: u8 = 0x0A;
    pub const CONTROL: u8 = 0x0C;
    pub const BIT_FRAMING: u8 = 0x0D;
    pub const MODE: u8 = 0x11;
    pub const TX_CONTROL: u8 = 0x14;
    pub const TX_ASK: u8 = 0x15;
    pub const RF_CFG: u8 = 0x26;
    pub const T_MODE: u8 = 0x2A;
    pub const T_PRESCALER: u8 = 0x2B;
    pub const T_RELOAD_H: u8 = 0x2C;
    pub const T_RELOAD_L: u8 = 0x2D;
    pub const VERSION: u8 = 0x37;
}

/// ComIEnReg: invert the IRQ pin polarity.
pub const IRQ_INVERT: u8 = 0x80;

/// ComIrqReg: writing this with Set1 = 0 clears every flag.
pub const CLEAR_ALL_IRQ: u8 = 0x7F;

/// ComIrqReg: the command timer reached zero.
pub const TIMER_IRQ: u8 = 0x01;

/// FIFOLevelReg: flush the FIFO buffer (write-only).
pub const FLUSH_BUFFER: u8 = 0x80;

/// FIFOLevelReg: number of bytes stored.
pub const FIFO_LEVEL_MASK: u8 = 0x7F;

/// ControlReg: valid bits in the last received byte.
pub const RX_LAST_BITS_MASK: u8 = 0x07;

/// BitFramingReg: start transmission of a transceive.
pub const START_SEND: u8 = 0x80;

/// BitFramingReg value for a 7-bit short frame (REQA / WUPA).
pub const SHORT_FRAME_BITS: u8 = 0x07;

/// BitFramingReg value for whole-byte frames.
pub const FULL_BYTE_FRAMING: u8 = 0x00;

/// ErrorReg: BufferOvfl | CollErr | ParityErr | ProtocolErr.
pub const ERROR_MASK: u8 = 0x1B;

/// TxControlReg: Tx1RFEn | Tx2RFEn.
pub const ANTENNA_ON: u8 = 0x03;

/// TModeReg: TAuto, prescaler high nibble 0x0D.
pub const T_MODE_AUTO: u8 = 0x8D;

/// TPrescalerReg low byte; with [`T_MODE_AUTO`] the timer ticks every ~0.5 ms.
pub const T_PRESCALER_LO: u8 = 0x3E;

/// Timer reload value (ticks) giving a ~15 ms command timeout.
pub const T_RELOAD_LO: u8 = 30;
pub const T_RELOAD_HI: u8 = 0;

/// TxASKReg: force 100 % ASK modulation.
pub const FORCE_100_ASK: u8 = 0x40;

/// ModeReg: CRC coprocessor preset 0x6363 (ISO 14443-3).
pub const MODE_CRC_6363: u8 = 0x3D;

/// RFCfgReg: receiver gain field.
pub const RX_GAIN_MASK: u8 = 0x70;

/// PCD command codes written to CommandReg.
pub mod command {
    pub const IDLE: u8 = 0x00;
    pub const TRANSCEIVE: u8 = 0x0C;
    pub const MF_AUTHENT: u8 = 0x0E;
    pub const SOFT_RESET: u8 = 0x0F;
}

/// PICC command bytes sent over the air.
pub mod picc {
    /// REQA: wake tags in the IDLE state.
    pub const REQ_IDLE: u8 = 0x26;

    /// WUPA: wake all tags, including HALTed ones.
    pub const REQ_ALL: u8 = 0x52;

    /// Cascade level 1 select followed by NVB 0x20 (anticollision).
    pub const ANTICOLL_CL1: [u8; 2] = [0x93, 0x20];
}
