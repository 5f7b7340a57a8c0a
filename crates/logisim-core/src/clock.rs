//! Day counter for the Logisim simulation.
//!
//! The clock is the single source of truth for the current day. Day 0 is
//! world creation; each successful day-advance increments it by one. The
//! increment happens on the transaction's working copy, so an aborted
//! advance leaves the committed clock untouched.

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// Day counter would overflow.
    #[error("day counter overflow: cannot advance beyond u64::MAX")]
    DayOverflow,
}

/// Simulation day counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DayClock {
    day: u64,
}

impl DayClock {
    /// A clock at day 0.
    pub const fn new() -> Self {
        Self { day: 0 }
    }

    /// A clock at an explicit day (state restoration and tests).
    pub const fn at(day: u64) -> Self {
        Self { day }
    }

    /// The current day.
    pub const fn day(&self) -> u64 {
        self.day
    }

    /// Move to the next day and return it.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::DayOverflow`] at `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.day = self.day.checked_add(1).ok_or(ClockError::DayOverflow)?;
        Ok(self.day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero_and_advances() {
        let mut clock = DayClock::new();
        assert_eq!(clock.day(), 0);
        assert_eq!(clock.advance(), Ok(1));
        assert_eq!(clock.advance(), Ok(2));
        assert_eq!(clock.day(), 2);
    }

    #[test]
    fn overflow_leaves_day_unchanged() {
        let mut clock = DayClock::at(u64::MAX);
        assert_eq!(clock.advance(), Err(ClockError::DayOverflow));
        assert_eq!(clock.day(), u64::MAX);
    }
}
