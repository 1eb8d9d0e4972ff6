//! RDM6300 frame layout.
//!
//! The RDM6300 reports each 125 kHz tag read as a fixed 14-byte ASCII frame:
//!
//! ```text
//! offset  0     1 ........ 10   11   12   13
//!         STX   tag text (10)   checksum  ETX
//!         0x02  "0415C3A1B2"    "C1"      0x03
//! ```
//!
//! The tag text is ten hex characters (version byte plus four card bytes);
//! the checksum is the XOR of those five bytes, also hex-encoded.

use dualtag_core::{
    Error, Result,
    constants::{
        CHECKSUM_END, CHECKSUM_START, END_BYTE, RDM6300_FRAME_LENGTH, START_BYTE, TAG_DATA_END,
        TAG_DATA_START,
    },
};
use std::fmt;

/// Number of characters in the tag text field.
pub const TAG_TEXT_LENGTH: usize = TAG_DATA_END - TAG_DATA_START;

/// Number of data bytes the tag text encodes.
const TAG_DATA_BYTES: usize = TAG_TEXT_LENGTH / 2;

/// One complete RDM6300 frame, markers included.
///
/// # Examples
///
/// ```
/// use dualtag_protocol::TagFrame;
///
/// let frame = TagFrame::encode(b"0415C3A1B2").unwrap();
/// assert_eq!(frame.as_bytes()[0], 0x02);
/// assert_eq!(frame.as_bytes()[13], 0x03);
/// assert_eq!(frame.tag_text(), "0415C3A1B2");
/// assert!(frame.checksum_valid());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagFrame {
    bytes: [u8; RDM6300_FRAME_LENGTH],
}

impl TagFrame {
    /// Wrap raw frame bytes without validation.
    pub const fn from_bytes(bytes: [u8; RDM6300_FRAME_LENGTH]) -> Self {
        Self { bytes }
    }

    /// Build a frame around ten bytes of tag text.
    ///
    /// When the text is hex the checksum field is filled in; otherwise it is
    /// left as `"00"`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTagData` if `text` is not exactly ten bytes.
    pub fn encode(text: &[u8]) -> Result<Self> {
        if text.len() != TAG_TEXT_LENGTH {
            return Err(Error::InvalidTagData(format!(
                "tag text must be {} bytes, got {}",
                TAG_TEXT_LENGTH,
                text.len()
            )));
        }

        let mut bytes = [b'0'; RDM6300_FRAME_LENGTH];
        bytes[0] = START_BYTE;
        bytes[TAG_DATA_START..TAG_DATA_END].copy_from_slice(text);
        bytes[RDM6300_FRAME_LENGTH - 1] = END_BYTE;

        let mut frame = Self { bytes };
        if let Some(checksum) = frame.computed_checksum() {
            let [hi, lo] = hex_pair(checksum);
            frame.bytes[CHECKSUM_START] = hi;
            frame.bytes[CHECKSUM_START + 1] = lo;
        }
        Ok(frame)
    }

    pub fn as_bytes(&self) -> &[u8; RDM6300_FRAME_LENGTH] {
        &self.bytes
    }

    /// Whether the frame starts with STX and ends with ETX.
    pub fn has_markers(&self) -> bool {
        self.bytes[0] == START_BYTE && self.bytes[RDM6300_FRAME_LENGTH - 1] == END_BYTE
    }

    /// Raw tag text bytes (offsets 1..11).
    pub fn tag_bytes(&self) -> &[u8] {
        &self.bytes[TAG_DATA_START..TAG_DATA_END]
    }

    /// Tag text as a string, or an empty string if any byte is not
    /// printable ASCII.
    pub fn tag_text(&self) -> String {
        let text = self.tag_bytes();
        if text.iter().all(u8::is_ascii_graphic) {
            text.iter().map(|&b| char::from(b)).collect()
        } else {
            String::new()
        }
    }

    /// The five data bytes encoded by the tag text, if it is hex.
    pub fn data_bytes(&self) -> Option<[u8; TAG_DATA_BYTES]> {
        let mut data = [0u8; TAG_DATA_BYTES];
        for (slot, pair) in data.iter_mut().zip(self.tag_bytes().chunks_exact(2)) {
            *slot = decode_hex_pair(pair[0], pair[1])?;
        }
        Some(data)
    }

    /// Checksum carried in the frame (offsets 11..13), if it is hex.
    pub fn declared_checksum(&self) -> Option<u8> {
        let field = &self.bytes[CHECKSUM_START..CHECKSUM_END];
        decode_hex_pair(field[0], field[1])
    }

    /// XOR of the data bytes, if the tag text is hex.
    pub fn computed_checksum(&self) -> Option<u8> {
        self.data_bytes()
            .map(|data| data.iter().fold(0, |acc, b| acc ^ b))
    }

    /// Whether the declared checksum matches the tag text.
    pub fn checksum_valid(&self) -> bool {
        match (self.declared_checksum(), self.computed_checksum()) {
            (Some(declared), Some(computed)) => declared == computed,
            _ => false,
        }
    }
}

impl fmt::Debug for TagFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagFrame")
            .field("text", &String::from_utf8_lossy(self.tag_bytes()))
            .field("checksum", &self.declared_checksum())
            .finish()
    }
}

/// Decode two ASCII hex digits (either case) into a byte.
pub fn decode_hex_pair(hi: u8, lo: u8) -> Option<u8> {
    let hi = char::from(hi).to_digit(16)?;
    let lo = char::from(lo).to_digit(16)?;
    u8::try_from((hi << 4) | lo).ok()
}

fn hex_pair(byte: u8) -> [u8; 2] {
    const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
    [DIGITS[usize::from(byte >> 4)], DIGITS[usize::from(byte & 0x0F)]]
}
