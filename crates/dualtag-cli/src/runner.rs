//! Outer acquisition loop.

use dualtag_hardware::{ByteChannel, Delay, OutputLine, RegisterBus};
use dualtag_scheduler::{DualReaderScheduler, OutputSink, TickEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Counters reported when the loop stops.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub emitted: u64,
    pub suppressed: u64,
    pub sink_failures: u64,
}

/// Tick `scheduler` every `tick_interval` until `stop` is set, then
/// disable the RDM6300.
pub fn run_until<B, C, L, S, D>(
    scheduler: &mut DualReaderScheduler<B, C, L, S>,
    stop: &AtomicBool,
    delay: &mut D,
) -> RunSummary
where
    B: RegisterBus,
    C: ByteChannel,
    L: OutputLine,
    S: OutputSink,
    D: Delay,
{
    let interval = scheduler.config().tick_interval();
    let mut summary = RunSummary::default();

    while !stop.load(Ordering::Relaxed) {
        let outcome = scheduler.tick(Instant::now());
        summary.ticks += 1;

        if outcome.switched {
            debug!("Phase {}", outcome.phase);
        }
        match outcome.event {
            TickEvent::Emitted(_) => summary.emitted += 1,
            TickEvent::Suppressed(_) => summary.suppressed += 1,
            TickEvent::SinkFailed(id) => {
                summary.sink_failures += 1;
                warn!("Identifier {} was not delivered", id);
            }
            TickEvent::Nothing => {}
        }

        delay.delay(interval);
    }

    scheduler.shutdown();
    info!(
        "Stopped after {} ticks: {} emitted, {} suppressed, {} undelivered",
        summary.ticks, summary.emitted, summary.suppressed, summary.sink_failures
    );
    summary
}
