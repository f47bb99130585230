//! Epoch clock for the agreement
//!
//! The agreement operates in discrete epochs of fixed length. Epochs only
//! advance when a caller asks for it; there is no wall-clock coupling.

use serde::{Deserialize, Serialize};

/// Manages agreement time in whole epochs
///
/// # Example
/// ```
/// use proposal_inverter_core_rs::EpochClock;
///
/// let mut clock = EpochClock::new(86_400, 0); // one-day epochs
/// assert_eq!(clock.current_epoch(), 0);
///
/// clock.advance();
/// assert_eq!(clock.current_epoch(), 1);
/// assert_eq!(clock.elapsed_seconds(), 86_400);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochClock {
    /// Epochs elapsed since the agreement started
    current_epoch: usize,
    /// Epoch the clock was started at
    start_epoch: usize,
    /// Length of one epoch, in seconds
    epoch_length: u64,
}

impl EpochClock {
    /// Create a new clock
    ///
    /// # Arguments
    /// * `epoch_length` - Length of one epoch in seconds
    /// * `start_epoch` - Epoch number the agreement starts at
    pub fn new(epoch_length: u64, start_epoch: usize) -> Self {
        assert!(epoch_length > 0, "epoch_length must be positive");
        Self {
            current_epoch: start_epoch,
            start_epoch,
            epoch_length,
        }
    }

    /// Advance time by one epoch
    pub fn advance(&mut self) {
        self.current_epoch += 1;
    }

    pub fn current_epoch(&self) -> usize {
        self.current_epoch
    }

    pub fn epoch_length(&self) -> u64 {
        self.epoch_length
    }

    /// Simulated seconds elapsed since the clock started
    ///
    /// # Example
    /// ```
    /// use proposal_inverter_core_rs::EpochClock;
    ///
    /// let mut clock = EpochClock::new(60, 10);
    /// for _ in 0..3 {
    ///     clock.advance();
    /// }
    /// assert_eq!(clock.current_epoch(), 13);
    /// assert_eq!(clock.elapsed_seconds(), 180);
    /// ```
    pub fn elapsed_seconds(&self) -> u64 {
        (self.current_epoch - self.start_epoch) as u64 * self.epoch_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "epoch_length must be positive")]
    fn test_zero_epoch_length_panics() {
        EpochClock::new(0, 0);
    }

    #[test]
    fn test_clock_is_monotonic() {
        let mut clock = EpochClock::new(1, 0);
        let mut last = clock.current_epoch();
        for _ in 0..10 {
            clock.advance();
            assert!(clock.current_epoch() > last);
            last = clock.current_epoch();
        }
    }
}
