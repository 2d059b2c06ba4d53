//! Slow/fast timeframe alignment.
//!
//! Slow bars are held back until a fast bar closes at or after them, so a fast
//! decision never sees a slow bar from its future.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use crate::domain::{check_sequence, Bar, BarError, Timeframe};

#[derive(Debug, Clone, Default)]
pub struct SlowBarQueue {
    queued: VecDeque<Bar>,
    last_timestamp: Option<DateTime<Utc>>,
    received: usize,
}

impl SlowBarQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a closed slow bar. Out-of-order or insane bars are refused.
    pub fn push(&mut self, bar: Bar) -> Result<usize, BarError> {
        check_sequence(Timeframe::Slow, self.last_timestamp, &bar)?;
        self.last_timestamp = Some(bar.timestamp);
        self.queued.push_back(bar);
        self.received += 1;
        Ok(self.received - 1)
    }

    /// Remove and return every queued bar with `timestamp <= until`, oldest first.
    pub fn drain_until(&mut self, until: DateTime<Utc>) -> Vec<Bar> {
        let ready = self
            .queued
            .iter()
            .take_while(|bar| bar.timestamp <= until)
            .count();
        self.queued.drain(..ready).collect()
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn bar_at(hours: i64) -> Bar {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(hours);
        Bar::new(ts, 10.0, 11.0, 9.0, 10.0, 100.0)
    }

    #[test]
    fn drains_only_closed_bars() {
        let mut q = SlowBarQueue::new();
        q.push(bar_at(24)).unwrap();
        q.push(bar_at(48)).unwrap();
        assert!(q.drain_until(bar_at(20).timestamp).is_empty());
        let drained = q.drain_until(bar_at(24).timestamp);
        assert_eq!(drained.len(), 1);
        assert_eq!(q.len(), 1);
        assert_eq!(q.drain_until(bar_at(100).timestamp).len(), 1);
        assert!(q.is_empty());
    }

    #[test]
    fn refuses_out_of_order() {
        let mut q = SlowBarQueue::new();
        assert_eq!(q.push(bar_at(24)), Ok(0));
        assert!(matches!(q.push(bar_at(24)), Err(BarError::OutOfOrder { .. })));
        assert!(q.push(bar_at(12)).is_err());
        assert_eq!(q.len(), 1);
        assert_eq!(q.push(bar_at(48)), Ok(1));
    }
}
