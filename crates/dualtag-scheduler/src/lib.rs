//! Dual-reader acquisition scheduler.
//!
//! Time-slices one control loop between an MFRC522 and an RDM6300,
//! suppresses repeated reads per channel and delivers accepted identifiers
//! to an [`OutputSink`].
//!
//! # Examples
//!
//! ```
//! use dualtag_hardware::mock::{
//!     MockByteChannel, MockKeyboard, MockOutputLine, MockRegisterBus, MockToneGenerator,
//! };
//! use dualtag_protocol::FrameParser;
//! use dualtag_rfid::{CardPresenceDetector, DriverConfig, Mfrc522};
//! use dualtag_scheduler::{
//!     DualReaderScheduler, FeedbackSink, Phase, ReaderSet, SchedulerConfig, TickEvent,
//! };
//! use std::time::Instant;
//!
//! let mut bus = MockRegisterBus::new();
//! bus.set_register(0x04, 0x01); // no tag in the field
//!
//! let readers = ReaderSet {
//!     detector: CardPresenceDetector::new(Mfrc522::new(bus, DriverConfig::default())),
//!     uart: MockByteChannel::new(),
//!     uart_enable: MockOutputLine::new(),
//!     parser: FrameParser::new(),
//! };
//! let sink = FeedbackSink::new(MockKeyboard::new(), MockToneGenerator::new());
//! let now = Instant::now();
//! let mut scheduler = DualReaderScheduler::new(readers, sink, SchedulerConfig::default(), now);
//!
//! let outcome = scheduler.tick(now);
//! assert_eq!(outcome.phase, Phase::RegisterActive);
//! assert_eq!(outcome.event, TickEvent::Nothing);
//! ```

pub mod dedup;
pub mod phase;
pub mod scheduler;
pub mod sink;

pub use dedup::DedupState;
pub use phase::{Phase, SchedulePhase};
pub use scheduler::{
    DualReaderScheduler, ReaderSet, SchedulerConfig, TickEvent, TickOutcome,
};
pub use sink::{FeedbackSink, OutputSink};
