//! Per-channel duplicate suppression.

use dualtag_core::Identifier;
use std::time::{Duration, Instant};

/// Remembers the last accepted identifier on one channel.
///
/// A tag held against a reader is reported over and over; only the first
/// report and those arriving after the cooldown are let through. A
/// different identifier is always accepted and restarts the cooldown.
///
/// # Examples
///
/// ```
/// use dualtag_core::Identifier;
/// use dualtag_scheduler::DedupState;
/// use std::time::{Duration, Instant};
///
/// let mut dedup = DedupState::new(Duration::from_millis(1000));
/// let id = Identifier::new("04050607");
/// let t0 = Instant::now();
///
/// assert!(dedup.accept(&id, t0));
/// assert!(!dedup.accept(&id, t0 + Duration::from_millis(999)));
/// assert!(dedup.accept(&id, t0 + Duration::from_millis(1000)));
/// ```
#[derive(Debug, Clone)]
pub struct DedupState {
    cooldown: Duration,
    last: Option<(Identifier, Instant)>,
}

impl DedupState {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last: None,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Identifier and time of the last acceptance.
    pub fn last_accepted(&self) -> Option<(&Identifier, Instant)> {
        self.last.as_ref().map(|(id, at)| (id, *at))
    }

    /// Decide whether `id` seen at `now` should be emitted, recording it if
    /// so. Rejections leave the state untouched.
    pub fn accept(&mut self, id: &Identifier, now: Instant) -> bool {
        let accepted = match &self.last {
            None => true,
            Some((last_id, _)) if last_id != id => true,
            Some((_, at)) => now.saturating_duration_since(*at) >= self.cooldown,
        };

        if accepted {
            self.last = Some((id.clone(), now));
        }
        accepted
    }

    /// Forget the last accepted identifier.
    pub fn clear(&mut self) {
        self.last = None;
    }
}
