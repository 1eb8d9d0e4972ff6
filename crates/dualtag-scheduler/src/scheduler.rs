//! Dual-reader acquisition loop.
//!
//! [`DualReaderScheduler`] owns both readers, the UART enable line and the
//! output sink. Each [`tick`](DualReaderScheduler::tick) advances the phase
//! if its quantum has run out, polls the active reader once, runs any
//! identifier through that channel's duplicate filter and hands accepted
//! identifiers to the sink.
//!
//! Nothing in a tick fails: bus errors, malformed frames and sink failures
//! are logged and the loop carries on.

use crate::dedup::DedupState;
use crate::phase::{Phase, SchedulePhase};
use crate::sink::OutputSink;
use dualtag_core::{
    Error, Identifier, ReaderChannel, Result,
    constants::{
        DEFAULT_PHASE_QUANTUM_MS, DEFAULT_REGISTER_COOLDOWN_MS, DEFAULT_TICK_INTERVAL_MS,
        DEFAULT_UART_COOLDOWN_MS, MAX_UID_LENGTH, MIN_UID_LENGTH, UART_READ_CHUNK,
    },
};
use dualtag_hardware::{ByteChannel, OutputLine, RegisterBus};
use dualtag_protocol::FrameParser;
use dualtag_rfid::CardPresenceDetector;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Scheduler timing and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Length of each reader's time slice.
    pub phase_quantum_ms: u64,

    /// Sleep between ticks in the outer loop.
    pub tick_interval_ms: u64,

    /// Duplicate window for MFRC522 identifiers.
    pub register_cooldown_ms: u64,

    /// Duplicate window for RDM6300 identifiers.
    pub uart_cooldown_ms: u64,

    /// Shorter MFRC522 UIDs are treated as misreads.
    pub min_uid_length: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            phase_quantum_ms: DEFAULT_PHASE_QUANTUM_MS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            register_cooldown_ms: DEFAULT_REGISTER_COOLDOWN_MS,
            uart_cooldown_ms: DEFAULT_UART_COOLDOWN_MS,
            min_uid_length: MIN_UID_LENGTH,
        }
    }
}

impl SchedulerConfig {
    pub fn phase_quantum(&self) -> Duration {
        Duration::from_millis(self.phase_quantum_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Duplicate window for `channel`.
    pub fn cooldown(&self, channel: ReaderChannel) -> Duration {
        match channel {
            ReaderChannel::Register => Duration::from_millis(self.register_cooldown_ms),
            ReaderChannel::Uart => Duration::from_millis(self.uart_cooldown_ms),
        }
    }

    /// Reject zero timings and impossible UID lengths.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let timings = [
            ("phase_quantum_ms", self.phase_quantum_ms),
            ("tick_interval_ms", self.tick_interval_ms),
            ("register_cooldown_ms", self.register_cooldown_ms),
            ("uart_cooldown_ms", self.uart_cooldown_ms),
        ];
        if let Some((name, _)) = timings.iter().find(|(_, value)| *value == 0) {
            return Err(Error::Config(format!("{name} must be non-zero")));
        }

        if !(1..=MAX_UID_LENGTH).contains(&self.min_uid_length) {
            return Err(Error::Config(format!(
                "min_uid_length must be between 1 and {MAX_UID_LENGTH}, got {}",
                self.min_uid_length
            )));
        }
        Ok(())
    }
}

/// Hardware owned by the scheduler.
#[derive(Debug)]
pub struct ReaderSet<B, C, L> {
    /// MFRC522 presence detector.
    pub detector: CardPresenceDetector<B>,

    /// RDM6300 receive channel.
    pub uart: C,

    /// RDM6300 enable line (high = powered).
    pub uart_enable: L,

    /// Frame parser for the UART stream.
    pub parser: FrameParser,
}

/// What a single tick produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickEvent {
    /// Nothing read, or only a misread.
    Nothing,

    /// Identifier accepted and delivered.
    Emitted(Identifier),

    /// Identifier seen again inside its cooldown.
    Suppressed(Identifier),

    /// Identifier accepted but the sink failed.
    SinkFailed(Identifier),
}

/// Summary of one call to [`DualReaderScheduler::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    /// Phase the tick ran in.
    pub phase: Phase,

    /// Whether this tick began a new phase.
    pub switched: bool,

    pub event: TickEvent,
}

impl TickOutcome {
    /// Identifier delivered by this tick, if any.
    pub fn emitted(&self) -> Option<&Identifier> {
        match &self.event {
            TickEvent::Emitted(id) => Some(id),
            _ => None,
        }
    }
}

/// Time-sliced scheduler for the MFRC522 / RDM6300 pair.
#[derive(Debug)]
pub struct DualReaderScheduler<B, C, L, S> {
    readers: ReaderSet<B, C, L>,
    sink: S,
    config: SchedulerConfig,
    phase: SchedulePhase,
    register_dedup: DedupState,
    uart_dedup: DedupState,
    read_buf: [u8; UART_READ_CHUNK],
}

impl<B, C, L, S> DualReaderScheduler<B, C, L, S>
where
    B: RegisterBus,
    C: ByteChannel,
    L: OutputLine,
    S: OutputSink,
{
    /// Create a scheduler starting in [`Phase::RegisterActive`] at `now`.
    ///
    /// The UART enable line is driven low immediately so the RDM6300 stays
    /// silent during the first MFRC522 slice.
    pub fn new(readers: ReaderSet<B, C, L>, sink: S, config: SchedulerConfig, now: Instant) -> Self {
        let mut scheduler = Self {
            readers,
            sink,
            phase: SchedulePhase::new(now, config.phase_quantum()),
            register_dedup: DedupState::new(config.cooldown(ReaderChannel::Register)),
            uart_dedup: DedupState::new(config.cooldown(ReaderChannel::Uart)),
            config,
            read_buf: [0; UART_READ_CHUNK],
        };

        info!(
            "Scheduler started: quantum {:?}, cooldowns {:?}/{:?}",
            config.phase_quantum(),
            config.cooldown(ReaderChannel::Register),
            config.cooldown(ReaderChannel::Uart)
        );
        scheduler.drive_uart_enable(Phase::RegisterActive);
        scheduler
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn phase(&self) -> &SchedulePhase {
        &self.phase
    }

    pub fn readers(&self) -> &ReaderSet<B, C, L> {
        &self.readers
    }

    pub fn readers_mut(&mut self) -> &mut ReaderSet<B, C, L> {
        &mut self.readers
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn dedup(&self, channel: ReaderChannel) -> &DedupState {
        match channel {
            ReaderChannel::Register => &self.register_dedup,
            ReaderChannel::Uart => &self.uart_dedup,
        }
    }

    pub fn into_parts(self) -> (ReaderSet<B, C, L>, S) {
        (self.readers, self.sink)
    }

    /// Run one scheduling step at `now`.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let switched = match self.phase.advance(now) {
            Some(phase) => {
                trace!("Phase -> {}", phase);
                self.drive_uart_enable(phase);
                true
            }
            None => false,
        };

        let phase = self.phase.current();
        let event = match phase {
            Phase::RegisterActive => self.poll_register(now),
            Phase::UartActive => self.poll_uart(now),
        };

        TickOutcome {
            phase,
            switched,
            event,
        }
    }

    /// Disable the RDM6300. Used when the loop stops.
    pub fn shutdown(&mut self) {
        debug!("Deasserting RDM6300 enable");
        if let Err(e) = self.readers.uart_enable.set_low() {
            warn!("Failed to disable RDM6300: {}", e);
        }
    }

    fn drive_uart_enable(&mut self, phase: Phase) {
        if let Err(e) = self.readers.uart_enable.set(phase.uart_enabled()) {
            warn!("Failed to drive RDM6300 enable for {}: {}", phase, e);
        }
    }

    fn poll_register(&mut self, now: Instant) -> TickEvent {
        let Some(uid) = self.readers.detector.poll_for_tag() else {
            return TickEvent::Nothing;
        };

        if uid.len() < self.config.min_uid_length {
            debug!("RC522 UID {} too short, ignored", uid);
            return TickEvent::Nothing;
        }

        self.dispatch(Identifier::from(&uid), ReaderChannel::Register, now)
    }

    fn poll_uart(&mut self, now: Instant) -> TickEvent {
        let n = match self.readers.uart.read_available(&mut self.read_buf) {
            Ok(n) => n,
            Err(e) => {
                debug!("RDM6300 read failed: {}", e);
                0
            }
        };

        match self.readers.parser.feed(&self.read_buf[..n], now) {
            Some(id) if !id.is_empty() => self.dispatch(id, ReaderChannel::Uart, now),
            Some(_) => {
                debug!("RDM6300 frame with unprintable tag text ignored");
                TickEvent::Nothing
            }
            None => TickEvent::Nothing,
        }
    }

    fn dispatch(&mut self, id: Identifier, channel: ReaderChannel, now: Instant) -> TickEvent {
        let dedup = match channel {
            ReaderChannel::Register => &mut self.register_dedup,
            ReaderChannel::Uart => &mut self.uart_dedup,
        };

        if !dedup.accept(&id, now) {
            trace!("{} duplicate {} suppressed", channel, id);
            return TickEvent::Suppressed(id);
        }

        info!("{} tag: {}", channel, id);
        match self.sink.emit(&id, channel) {
            Ok(()) => TickEvent::Emitted(id),
            Err(e) => {
                warn!("Failed to deliver {} from {}: {}", id, channel, e);
                TickEvent::SinkFailed(id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::FeedbackSink;
    use dualtag_hardware::mock::{
        MockByteChannel, MockKeyboard, MockOutputLine, MockRegisterBus, MockToneGenerator,
    };
    use dualtag_protocol::TagFrame;
    use dualtag_rfid::registers::reg;
    use dualtag_rfid::{DriverConfig, Mfrc522};
    use rstest::rstest;

    type TestScheduler = DualReaderScheduler<
        MockRegisterBus,
        MockByteChannel,
        MockOutputLine,
        FeedbackSink<MockKeyboard, MockToneGenerator>,
    >;

    const QUANTUM: Duration = Duration::from_millis(250);

    /// Bus that answers every poll with ATQA then `uid`.
    fn tag_bus(uid: &[u8], polls: usize) -> MockRegisterBus {
        let mut bus = MockRegisterBus::new();
        bus.set_register(reg::COM_IRQ, 0x30);
        for _ in 0..polls {
            bus.queue_reads(reg::FIFO_LEVEL, &[2, uid.len() as u8]);
            bus.queue_reads(reg::FIFO_DATA, &[0x04, 0x00]);
            bus.queue_reads(reg::FIFO_DATA, uid);
        }
        bus
    }

    fn empty_bus() -> MockRegisterBus {
        let mut bus = MockRegisterBus::new();
        bus.set_register(reg::COM_IRQ, 0x01);
        bus
    }

    fn scheduler_with(bus: MockRegisterBus, uart: MockByteChannel, now: Instant) -> TestScheduler {
        let readers = ReaderSet {
            detector: CardPresenceDetector::new(Mfrc522::new(bus, DriverConfig::default())),
            uart,
            uart_enable: MockOutputLine::new(),
            parser: FrameParser::new(),
        };
        let sink = FeedbackSink::new(MockKeyboard::new(), MockToneGenerator::new());
        DualReaderScheduler::new(readers, sink, SchedulerConfig::default(), now)
    }

    fn frame(text: &[u8]) -> Vec<u8> {
        TagFrame::encode(text).unwrap().as_bytes().to_vec()
    }

    #[test]
    fn test_starts_register_active_with_uart_disabled() {
        let now = Instant::now();
        let scheduler = scheduler_with(empty_bus(), MockByteChannel::new(), now);

        assert_eq!(scheduler.phase().current(), Phase::RegisterActive);
        assert_eq!(scheduler.readers().uart_enable.history(), &[false]);
    }

    #[test]
    fn test_register_uid_emitted_once_within_cooldown() {
        let t0 = Instant::now();
        let mut scheduler = scheduler_with(
            tag_bus(&[0x04, 0x05, 0x06, 0x07], 2),
            MockByteChannel::new(),
            t0,
        );

        let first = scheduler.tick(t0);
        let second = scheduler.tick(t0 + Duration::from_millis(100));

        assert_eq!(first.event, TickEvent::Emitted(Identifier::new("04050607")));
        assert_eq!(
            second.event,
            TickEvent::Suppressed(Identifier::new("04050607"))
        );
        assert_eq!(scheduler.sink().keyboard().submitted_lines(), vec!["04050607"]);
        assert_eq!(scheduler.sink().tones().frequencies(), vec![3000, 2000, 3000]);
    }

    #[test]
    fn test_register_uid_reemitted_after_cooldown() {
        let t0 = Instant::now();
        let config = SchedulerConfig {
            phase_quantum_ms: 10_000,
            ..SchedulerConfig::default()
        };
        let readers = ReaderSet {
            detector: CardPresenceDetector::new(Mfrc522::new(
                tag_bus(&[0x04, 0x05, 0x06, 0x07], 2),
                DriverConfig::default(),
            )),
            uart: MockByteChannel::new(),
            uart_enable: MockOutputLine::new(),
            parser: FrameParser::new(),
        };
        let sink = FeedbackSink::new(MockKeyboard::new(), MockToneGenerator::new());
        let mut scheduler = DualReaderScheduler::new(readers, sink, config, t0);

        scheduler.tick(t0);
        let again = scheduler.tick(t0 + Duration::from_millis(1000));

        assert_eq!(again.emitted().map(Identifier::as_str), Some("04050607"));
        assert_eq!(scheduler.sink().keyboard().submitted_lines().len(), 2);
    }

    #[test]
    fn test_short_uid_discarded() {
        let t0 = Instant::now();
        let mut scheduler = scheduler_with(tag_bus(&[0x04, 0x05, 0x06], 1), MockByteChannel::new(), t0);

        let outcome = scheduler.tick(t0);

        assert_eq!(outcome.event, TickEvent::Nothing);
        assert!(scheduler.sink().keyboard().events().is_empty());
    }

    #[test]
    fn test_phase_switch_enables_uart() {
        let t0 = Instant::now();
        let mut scheduler = scheduler_with(empty_bus(), MockByteChannel::new(), t0);

        let before = scheduler.tick(t0 + Duration::from_millis(249));
        let switch = scheduler.tick(t0 + QUANTUM);
        let back = scheduler.tick(t0 + QUANTUM * 2);

        assert!(!before.switched);
        assert_eq!(before.phase, Phase::RegisterActive);
        assert!(switch.switched);
        assert_eq!(switch.phase, Phase::UartActive);
        assert!(back.switched);
        assert_eq!(back.phase, Phase::RegisterActive);
        assert_eq!(
            scheduler.readers().uart_enable.history(),
            &[false, true, false]
        );
    }

    #[test]
    fn test_uart_frame_emitted_in_uart_phase() {
        let t0 = Instant::now();
        let mut uart = MockByteChannel::new();
        uart.push(&frame(b"ABCDEFGHIJ"));
        let mut scheduler = scheduler_with(empty_bus(), uart, t0);

        let outcome = scheduler.tick(t0 + QUANTUM);

        assert_eq!(outcome.phase, Phase::UartActive);
        assert_eq!(outcome.event, TickEvent::Emitted(Identifier::new("ABCDEFGHIJ")));
        assert_eq!(scheduler.sink().tones().frequencies(), vec![2000, 3000]);
    }

    #[test]
    fn test_uart_not_read_during_register_phase() {
        let t0 = Instant::now();
        let mut uart = MockByteChannel::new();
        uart.push(&frame(b"ABCDEFGHIJ"));
        let mut scheduler = scheduler_with(empty_bus(), uart, t0);

        scheduler.tick(t0);
        scheduler.tick(t0 + Duration::from_millis(100));

        assert_eq!(scheduler.readers().uart.read_calls(), 0);
    }

    #[test]
    fn test_register_not_polled_during_uart_phase() {
        let t0 = Instant::now();
        let mut scheduler = scheduler_with(empty_bus(), MockByteChannel::new(), t0);

        scheduler.tick(t0 + QUANTUM);
        scheduler.readers_mut().detector.driver_mut().bus_mut().clear_history();
        scheduler.tick(t0 + QUANTUM + Duration::from_millis(10));

        let bus = scheduler.readers().detector.driver().bus();
        assert!(bus.writes().is_empty());
    }

    #[rstest]
    #[case(1999, TickEvent::Suppressed(Identifier::new("ABCDEFGHIJ")))]
    #[case(2000, TickEvent::Emitted(Identifier::new("ABCDEFGHIJ")))]
    fn test_uart_cooldown(#[case] gap_ms: u64, #[case] expected: TickEvent) {
        let t0 = Instant::now();
        let config = SchedulerConfig {
            phase_quantum_ms: 60_000,
            ..SchedulerConfig::default()
        };
        let mut uart = MockByteChannel::new();
        uart.push(&frame(b"ABCDEFGHIJ"));
        uart.push(&frame(b"ABCDEFGHIJ"));
        let readers = ReaderSet {
            detector: CardPresenceDetector::new(Mfrc522::new(empty_bus(), DriverConfig::default())),
            uart,
            uart_enable: MockOutputLine::new(),
            parser: FrameParser::new(),
        };
        let sink = FeedbackSink::new(MockKeyboard::new(), MockToneGenerator::new());
        let mut scheduler = DualReaderScheduler::new(readers, sink, config, t0);

        let enter = t0 + Duration::from_secs(60);
        let first = scheduler.tick(enter);
        let second = scheduler.tick(enter + Duration::from_millis(gap_ms));

        assert!(first.emitted().is_some());
        assert_eq!(second.event, expected);
    }

    #[test]
    fn test_channels_deduplicate_independently() {
        let t0 = Instant::now();
        let mut uart = MockByteChannel::new();
        uart.push(&frame(b"0405060700"));
        let mut scheduler = scheduler_with(tag_bus(&[0x04, 0x05, 0x06, 0x07, 0x00], 1), uart, t0);

        let register = scheduler.tick(t0);
        let uart = scheduler.tick(t0 + QUANTUM);

        assert!(register.emitted().is_some());
        assert!(uart.emitted().is_some());
        assert_eq!(
            scheduler.sink().keyboard().submitted_lines(),
            vec!["0405060700", "0405060700"]
        );
    }

    #[test]
    fn test_unprintable_uart_frame_ignored() {
        let t0 = Instant::now();
        let mut uart = MockByteChannel::new();
        uart.push(&frame(b"ABCD\x7FFGHIJ"));
        let mut scheduler = scheduler_with(empty_bus(), uart, t0);

        let outcome = scheduler.tick(t0 + QUANTUM);

        assert_eq!(outcome.event, TickEvent::Nothing);
        assert!(scheduler.dedup(ReaderChannel::Uart).last_accepted().is_none());
    }

    #[test]
    fn test_uart_read_failure_is_absorbed() {
        let t0 = Instant::now();
        let mut uart = MockByteChannel::new();
        uart.set_failing(true);
        let mut scheduler = scheduler_with(empty_bus(), uart, t0);

        let outcome = scheduler.tick(t0 + QUANTUM);

        assert_eq!(outcome.event, TickEvent::Nothing);
    }

    #[test]
    fn test_sink_failure_is_absorbed() {
        let t0 = Instant::now();
        let readers = ReaderSet {
            detector: CardPresenceDetector::new(Mfrc522::new(
                tag_bus(&[0x04, 0x05, 0x06, 0x07], 1),
                DriverConfig::default(),
            )),
            uart: MockByteChannel::new(),
            uart_enable: MockOutputLine::new(),
            parser: FrameParser::new(),
        };
        let mut keyboard = MockKeyboard::new();
        keyboard.set_failing(true);
        let sink = FeedbackSink::new(keyboard, MockToneGenerator::new());
        let mut scheduler = DualReaderScheduler::new(readers, sink, SchedulerConfig::default(), t0);

        let outcome = scheduler.tick(t0);

        assert_eq!(outcome.event, TickEvent::SinkFailed(Identifier::new("04050607")));
        // still counts as accepted for dedup
        assert!(scheduler.dedup(ReaderChannel::Register).last_accepted().is_some());
    }

    #[test]
    fn test_shutdown_disables_uart() {
        let t0 = Instant::now();
        let mut scheduler = scheduler_with(empty_bus(), MockByteChannel::new(), t0);

        scheduler.tick(t0 + QUANTUM);
        scheduler.shutdown();

        assert_eq!(scheduler.readers().uart_enable.level(), Some(false));
    }

    #[rstest]
    #[case(SchedulerConfig { phase_quantum_ms: 0, ..SchedulerConfig::default() }, "phase_quantum_ms")]
    #[case(SchedulerConfig { tick_interval_ms: 0, ..SchedulerConfig::default() }, "tick_interval_ms")]
    #[case(SchedulerConfig { register_cooldown_ms: 0, ..SchedulerConfig::default() }, "register_cooldown_ms")]
    #[case(SchedulerConfig { uart_cooldown_ms: 0, ..SchedulerConfig::default() }, "uart_cooldown_ms")]
    #[case(SchedulerConfig { min_uid_length: 0, ..SchedulerConfig::default() }, "min_uid_length")]
    #[case(SchedulerConfig { min_uid_length: 11, ..SchedulerConfig::default() }, "min_uid_length")]
    fn test_config_validation(#[case] config: SchedulerConfig, #[case] field: &str) {
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains(field), "{err}");
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = SchedulerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.phase_quantum(), Duration::from_millis(250));
        assert_eq!(config.cooldown(ReaderChannel::Register), Duration::from_millis(1000));
        assert_eq!(config.cooldown(ReaderChannel::Uart), Duration::from_millis(2000));
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: SchedulerConfig =
            serde_json::from_str(r#"{"uart_cooldown_ms": 1500, "min_uid_length": 7}"#).unwrap();

        assert_eq!(config.uart_cooldown_ms, 1500);
        assert_eq!(config.min_uid_length, 7);
        assert_eq!(config.phase_quantum_ms, 250);
        assert_eq!(config.tick_interval(), Duration::from_millis(10));
    }
}
