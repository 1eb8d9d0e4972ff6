//! End-to-end acquisition flows.
//!
//! Each test runs the scheduler against scripted hardware on a simulated
//! 10 ms tick clock and checks what reaches the keyboard and buzzer.

use dualtag_core::Identifier;
use dualtag_hardware::mock::{
    MockByteChannel, MockKeyboard, MockOutputLine, MockRegisterBus, MockToneGenerator,
};
use dualtag_protocol::{FrameParser, TagFrame};
use dualtag_rfid::registers::reg;
use dualtag_rfid::{CardPresenceDetector, DriverConfig, Mfrc522};
use dualtag_scheduler::{
    DualReaderScheduler, FeedbackSink, Phase, ReaderSet, SchedulerConfig, TickEvent,
};
use std::time::{Duration, Instant};

type Scheduler = DualReaderScheduler<
    MockRegisterBus,
    MockByteChannel,
    MockOutputLine,
    FeedbackSink<MockKeyboard, MockToneGenerator>,
>;

const TICK: Duration = Duration::from_millis(10);

fn build(bus: MockRegisterBus, uart: MockByteChannel, now: Instant) -> Scheduler {
    let readers = ReaderSet {
        detector: CardPresenceDetector::new(Mfrc522::new(bus, DriverConfig::default())),
        uart,
        uart_enable: MockOutputLine::new(),
        parser: FrameParser::new(),
    };
    let sink = FeedbackSink::new(MockKeyboard::new(), MockToneGenerator::new());
    DualReaderScheduler::new(readers, sink, SchedulerConfig::default(), now)
}

/// Run `ticks` ticks starting at `start`, returning every emitted id.
fn run(scheduler: &mut Scheduler, start: Instant, ticks: u32) -> Vec<(Phase, Identifier)> {
    (0..ticks)
        .map(|i| scheduler.tick(start + TICK * i))
        .filter_map(|outcome| match outcome.event {
            TickEvent::Emitted(id) => Some((outcome.phase, id)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_register_tag_held_in_field() {
    // The tag answers every poll; the scheduler must type it once per
    // cooldown window, and only during MFRC522 slices.
    let mut bus = MockRegisterBus::new();
    bus.set_register(reg::COM_IRQ, 0x30);
    for _ in 0..200 {
        bus.queue_reads(reg::FIFO_LEVEL, &[2, 4]);
        bus.queue_reads(reg::FIFO_DATA, &[0x04, 0x00, 0x04, 0x05, 0x06, 0x07]);
    }
    let start = Instant::now();
    let mut scheduler = build(bus, MockByteChannel::new(), start);

    // 1.2 s: register slices at 0-250, 500-750, 1000-1200 ms
    let emitted = run(&mut scheduler, start, 120);

    assert_eq!(
        emitted,
        vec![
            (Phase::RegisterActive, Identifier::new("04050607")),
            (Phase::RegisterActive, Identifier::new("04050607")),
        ]
    );
    let keyboard = scheduler.sink().keyboard();
    assert_eq!(keyboard.submitted_lines(), vec!["04050607", "04050607"]);
}

#[test]
fn test_uart_tag_streamed_continuously() {
    // The RDM6300 repeats its frame while enabled; one read per tick.
    let frame = TagFrame::encode(b"ABCDEFGHIJ").unwrap();
    let mut uart = MockByteChannel::new();
    for _ in 0..200 {
        uart.push(frame.as_bytes());
    }
    let mut bus = MockRegisterBus::new();
    bus.set_register(reg::COM_IRQ, 0x01);
    let start = Instant::now();
    let mut scheduler = build(bus, uart, start);

    let emitted = run(&mut scheduler, start, 300);

    // UART slices start at 250, 750, 1250, 1750, 2250, 2750 ms; the 2000 ms
    // cooldown lets the tag through at 250 and 2250.
    assert_eq!(
        emitted,
        vec![
            (Phase::UartActive, Identifier::new("ABCDEFGHIJ")),
            (Phase::UartActive, Identifier::new("ABCDEFGHIJ")),
        ]
    );
    assert_eq!(
        scheduler.sink().tones().frequencies(),
        vec![2000, 3000, 2000, 3000]
    );
}

#[test]
fn test_uart_enable_follows_phases() {
    let mut bus = MockRegisterBus::new();
    bus.set_register(reg::COM_IRQ, 0x01);
    let start = Instant::now();
    let mut scheduler = build(bus, MockByteChannel::new(), start);

    run(&mut scheduler, start, 101);

    // initial low, then four flips in one second
    assert_eq!(
        scheduler.readers().uart_enable.history(),
        &[false, true, false, true, false]
    );
    assert_eq!(scheduler.phase().switches(), 4);
}

#[test]
fn test_both_readers_interleaved() {
    let mut bus = MockRegisterBus::new();
    bus.set_register(reg::COM_IRQ, 0x30);
    bus.queue_reads(reg::FIFO_LEVEL, &[2, 7]);
    bus.queue_reads(
        reg::FIFO_DATA,
        &[0x44, 0x00, 0x04, 0x5A, 0x3B, 0x12, 0x6E, 0x80, 0x33],
    );

    let mut uart = MockByteChannel::new();
    uart.push(TagFrame::encode(b"0415C3A1B2").unwrap().as_bytes());

    let start = Instant::now();
    let mut scheduler = build(bus, uart, start);

    let emitted = run(&mut scheduler, start, 50);

    assert_eq!(
        emitted,
        vec![
            (Phase::RegisterActive, Identifier::new("045A3B126E8033")),
            (Phase::UartActive, Identifier::new("0415C3A1B2")),
        ]
    );
}
