//! Submission timestamps.

use std::sync::Mutex;

use chrono::{DateTime, TimeDelta, Utc};

/// Hands out strictly increasing UTC instants.
///
/// The wall clock is used as is unless it has not moved past the last
/// instant handed out, in which case the last instant plus one microsecond
/// is returned. Stored timestamps keep microsecond precision, so two
/// submissions from one process never share one.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl MonotonicClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The next instant, later than every instant returned before.
    pub fn now(&self) -> DateTime<Utc> {
        self.next_after(Utc::now())
    }

    fn next_after(&self, wall: DateTime<Utc>) -> DateTime<Utc> {
        let mut last = self
            .last
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let next = match *last {
            Some(previous) if wall <= previous => previous + TimeDelta::microseconds(1),
            _ => wall,
        };

        *last = Some(next);
        next
    }
}
