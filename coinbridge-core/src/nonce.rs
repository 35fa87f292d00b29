//! Strictly increasing nonces for signed requests.
//!
//! Exchanges reject a private request whose nonce does not exceed the previous
//! one, so two requests issued within the same clock tick must still get distinct,
//! ordered values.
//!
//! Most exchanges take nanosecond nonces. Some cap the nonce at 32 bits and need
//! [`NonceResolution::Seconds`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::time::{Clock, SystemClock};

/// Time unit a nonce is counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NonceResolution {
    /// Nanoseconds since the epoch
    #[default]
    Nanos,
    /// Whole seconds since the epoch; fits in a `u32` until 2106
    Seconds,
}

impl NonceResolution {
    fn scale(self, nanos: u64) -> u64 {
        match self {
            Self::Nanos => nanos,
            Self::Seconds => nanos / 1_000_000_000,
        }
    }
}

/// Nonce source: the current time in the configured resolution, bumped past the
/// last value handed out when the clock has not moved.
#[derive(Debug)]
pub struct Nonce {
    clock: Arc<dyn Clock>,
    resolution: NonceResolution,
    last: AtomicU64,
}

impl Default for Nonce {
    fn default() -> Self {
        Self::new()
    }
}

impl Nonce {
    /// Nonces on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Nanosecond nonces on a custom clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::with_resolution(clock, NonceResolution::Nanos)
    }

    /// Nonces in `resolution` on a custom clock.
    pub fn with_resolution(clock: Arc<dyn Clock>, resolution: NonceResolution) -> Self {
        Self {
            clock,
            resolution,
            last: AtomicU64::new(0),
        }
    }

    /// Unit this source counts in.
    pub fn resolution(&self) -> NonceResolution {
        self.resolution
    }

    /// Next nonce, strictly greater than every value returned before.
    ///
    /// Within one tick of the resolution, successive calls count up from the last
    /// value, so a burst of second-resolution nonces runs ahead of the clock.
    pub fn next(&self) -> u64 {
        let now = self.resolution.scale(self.clock.now_nanos());
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last.saturating_add(1));
            match self
                .last
                .compare_exchange_weak(last, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(observed) => last = observed,
            }
        }
    }

    /// Last nonce handed out, or 0.
    pub fn last(&self) -> u64 {
        self.last.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualClock;
    use std::collections::HashSet;
    use std::time::Duration;

    #[test]
    fn test_monotonic_on_frozen_clock() {
        let clock = ManualClock::new(1_000);
        let nonce = Nonce::with_clock(Arc::new(clock.clone()));
        let first = nonce.next();
        let second = nonce.next();
        assert_eq!(first, 1_000_000_000);
        assert_eq!(second, first + 1);

        clock.advance(Duration::from_millis(1));
        assert_eq!(nonce.next(), 1_001_000_000);
    }

    #[test]
    fn test_clock_going_backwards_keeps_increasing() {
        let clock = ManualClock::new(5_000);
        let nonce = Nonce::with_clock(Arc::new(clock.clone()));
        let before = nonce.next();
        clock.set(4_000);
        assert!(nonce.next() > before);
    }

    #[test]
    fn test_seconds_resolution_fits_u32_and_increases() {
        let clock = ManualClock::new(1_500_000_000_123);
        let nonce = Nonce::with_resolution(Arc::new(clock.clone()), NonceResolution::Seconds);
        let first = nonce.next();
        assert_eq!(first, 1_500_000_000);
        assert_eq!(nonce.next(), first + 1);

        clock.advance(Duration::from_secs(10));
        let later = nonce.next();
        assert_eq!(later, 1_500_000_010);
        assert!(u32::try_from(later).is_ok());
    }

    #[test]
    fn test_unique_across_threads() {
        let nonce = Arc::new(Nonce::with_clock(Arc::new(ManualClock::new(1))));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let nonce = Arc::clone(&nonce);
                std::thread::spawn(move || (0..500).map(|_| nonce.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for value in handle.join().unwrap() {
                assert!(seen.insert(value));
            }
        }
        assert_eq!(seen.len(), 4_000);
        assert_eq!(nonce.last(), *seen.iter().max().unwrap());
    }
}
