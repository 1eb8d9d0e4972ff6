//! Time-sliced reader phases.
//!
//! The two readers share one control loop. Time is cut into fixed quanta
//! and exactly one reader is active in each:
//!
//! ```text
//!  ┌─────────────────┐  quantum elapsed  ┌─────────────────┐
//!  │ RegisterActive  │──────────────────►│ UartActive      │
//!  │ UART enable low │◄──────────────────│ UART enable high│
//!  └─────────────────┘  quantum elapsed  └─────────────────┘
//! ```

use dualtag_core::ReaderChannel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Which reader owns the current quantum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// MFRC522 polled every tick; RDM6300 held disabled.
    RegisterActive,

    /// RDM6300 enabled and drained every tick.
    UartActive,
}

impl Phase {
    /// The phase that follows this one.
    pub fn next(&self) -> Phase {
        match self {
            Phase::RegisterActive => Phase::UartActive,
            Phase::UartActive => Phase::RegisterActive,
        }
    }

    /// Reader polled during this phase.
    pub fn channel(&self) -> ReaderChannel {
        match self {
            Phase::RegisterActive => ReaderChannel::Register,
            Phase::UartActive => ReaderChannel::Uart,
        }
    }

    /// Level of the UART enable line while this phase is active.
    pub fn uart_enabled(&self) -> bool {
        matches!(self, Phase::UartActive)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self {
            Phase::RegisterActive => "RegisterActive",
            Phase::UartActive => "UartActive",
        };
        f.write_str(phase)
    }
}

/// Current phase plus the time it began.
#[derive(Debug, Clone)]
pub struct SchedulePhase {
    current: Phase,
    started_at: Instant,
    quantum: Duration,
    switches: u64,
}

impl SchedulePhase {
    /// Start in [`Phase::RegisterActive`] at `now`.
    pub fn new(now: Instant, quantum: Duration) -> Self {
        Self {
            current: Phase::RegisterActive,
            started_at: now,
            quantum,
            switches: 0,
        }
    }

    pub fn current(&self) -> Phase {
        self.current
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn quantum(&self) -> Duration {
        self.quantum
    }

    /// Number of phase changes since creation.
    pub fn switches(&self) -> u64 {
        self.switches
    }

    /// Time spent in the current phase as of `now`.
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started_at)
    }

    /// Flip to the next phase if a full quantum has elapsed.
    ///
    /// Returns the newly entered phase. At most one flip happens per call,
    /// however late the call is; the new phase starts at `now`.
    ///
    /// # Examples
    ///
    /// ```
    /// use dualtag_scheduler::{Phase, SchedulePhase};
    /// use std::time::{Duration, Instant};
    ///
    /// let start = Instant::now();
    /// let mut phase = SchedulePhase::new(start, Duration::from_millis(250));
    ///
    /// assert_eq!(phase.advance(start + Duration::from_millis(249)), None);
    /// assert_eq!(
    ///     phase.advance(start + Duration::from_millis(250)),
    ///     Some(Phase::UartActive)
    /// );
    /// ```
    pub fn advance(&mut self, now: Instant) -> Option<Phase> {
        if self.elapsed(now) < self.quantum {
            return None;
        }
        self.current = self.current.next();
        self.started_at = now;
        self.switches += 1;
        Some(self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUANTUM: Duration = Duration::from_millis(250);

    #[test]
    fn test_initial_phase() {
        let now = Instant::now();
        let phase = SchedulePhase::new(now, QUANTUM);

        assert_eq!(phase.current(), Phase::RegisterActive);
        assert_eq!(phase.started_at(), now);
        assert_eq!(phase.switches(), 0);
    }

    #[test]
    fn test_alternates() {
        let start = Instant::now();
        let mut phase = SchedulePhase::new(start, QUANTUM);

        assert_eq!(phase.advance(start + QUANTUM), Some(Phase::UartActive));
        assert_eq!(phase.advance(start + QUANTUM * 2), Some(Phase::RegisterActive));
        assert_eq!(phase.advance(start + QUANTUM * 3), Some(Phase::UartActive));
        assert_eq!(phase.switches(), 3);
    }

    #[test]
    fn test_late_tick_flips_once() {
        let start = Instant::now();
        let mut phase = SchedulePhase::new(start, QUANTUM);

        let late = start + Duration::from_secs(10);
        assert_eq!(phase.advance(late), Some(Phase::UartActive));
        assert_eq!(phase.advance(late), None);
        assert_eq!(phase.started_at(), late);
    }

    #[test]
    fn test_clock_before_start_does_not_flip() {
        let start = Instant::now() + Duration::from_secs(1);
        let mut phase = SchedulePhase::new(start, QUANTUM);

        assert_eq!(phase.advance(start - Duration::from_millis(500)), None);
    }

    #[test]
    fn test_phase_helpers() {
        assert_eq!(Phase::RegisterActive.channel(), ReaderChannel::Register);
        assert_eq!(Phase::UartActive.channel(), ReaderChannel::Uart);
        assert!(Phase::UartActive.uart_enabled());
        assert!(!Phase::RegisterActive.uart_enabled());
        assert_eq!(Phase::UartActive.to_string(), "UartActive");
    }
}
