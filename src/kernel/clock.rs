use std::time::{Duration, Instant};

/// Converts wall-clock progress into whole-second steps for the per-phase
/// counters. The monotonic clock is sampled once per tick and the sub-second
/// remainder is carried, so the counters advance at a true 1 Hz no matter
/// how fast or unevenly the driver loop spins.
#[derive(Debug)]
pub struct SecondsClock {
    last: Option<Instant>,
    carry: Duration,
}

impl SecondsClock {
    pub fn new() -> Self {
        Self {
            last: None,
            carry: Duration::ZERO,
        }
    }

    /// Returns the number of whole seconds that elapsed since the previous
    /// sample and have not yet been consumed.
    pub fn advance(&mut self, now: Instant) -> u32 {
        let elapsed = match self.last {
            Some(prev) => now.saturating_duration_since(prev),
            None => Duration::ZERO,
        };
        self.last = Some(now);
        self.carry += elapsed;

        let whole = self.carry.as_secs();
        self.carry -= Duration::from_secs(whole);
        whole as u32
    }
}

impl Default for SecondsClock {
    fn default() -> Self {
        Self::new()
    }
}
