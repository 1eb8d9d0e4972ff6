//! RDM6300 (125 kHz) UART protocol support.
//!
//! - [`TagFrame`]: fixed 14-byte frame layout, tag text and checksum.
//! - [`FrameParser`]: incremental parser that turns raw UART reads into
//!   identifiers.

pub mod frame;
pub mod stream_parser;

pub use frame::{TAG_TEXT_LENGTH, TagFrame, decode_hex_pair};
pub use stream_parser::{FrameParser, FrameParserConfig};
