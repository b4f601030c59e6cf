//! Lamport logical clock of a single peer.

/// Logical timestamp carried by every message.
pub type Timestamp = u64;

/// Struct that represents the Lamport clock owned by a peer.
///
/// The value never decreases. Concurrent access is serialized by the owner of the clock,
/// see [`crate::process::Process`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogicalClock(Timestamp);

impl LogicalClock {
    pub fn new() -> Self {
        Self(0)
    }

    /// Function that returns the current value of the clock.
    pub fn value(&self) -> Timestamp {
        self.0
    }

    /// Function that moves the clock forward by `delta`, which must be positive.
    pub fn advance(&mut self, delta: Timestamp) {
        debug_assert!(delta > 0, "clock must advance by a positive delta");
        self.0 += delta;
    }

    /// Function that merges a timestamp observed in a received message.
    ///
    /// Advances by `max(0, observed - current) + 1`, so the result is always greater than both.
    pub fn merge(&mut self, observed: Timestamp) {
        self.advance(observed.saturating_sub(self.0) + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_adds_delta() {
        let mut clock = LogicalClock::new();
        clock.advance(1);
        clock.advance(3);
        assert_eq!(clock.value(), 4);
    }

    #[test]
    fn merge_jumps_past_larger_observed_timestamp() {
        let mut clock = LogicalClock::new();
        clock.advance(2);
        clock.merge(7);
        assert_eq!(clock.value(), 8);
    }

    #[test]
    fn merge_with_older_timestamp_still_ticks() {
        let mut clock = LogicalClock::new();
        clock.advance(10);
        clock.merge(3);
        assert_eq!(clock.value(), 11);
        clock.merge(11);
        assert_eq!(clock.value(), 12);
    }

    #[test]
    fn value_never_decreases() {
        let mut clock = LogicalClock::new();
        let mut last = clock.value();
        for observed in [5, 0, 2, 40, 39, 41, 1] {
            clock.merge(observed);
            assert!(clock.value() > last);
            last = clock.value();
        }
    }
}
