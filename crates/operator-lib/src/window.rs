//! Daily hour window evaluation
//!
//! Windows are inclusive on both ends and expressed in UTC hours. A window
//! whose start is after its end wraps past midnight, so `17..=4` covers
//! 17, 18, ..., 23, 0, 1, ..., 4.

use chrono::{DateTime, Timelike, Utc};
use std::sync::Mutex;

/// Returns true if `current_hour` falls inside the inclusive window
/// `[start_hour, end_hour]`.
///
/// All three values are expected in `0..=23`.
pub fn is_within_window(current_hour: u32, start_hour: u32, end_hour: u32) -> bool {
    if start_hour <= end_hour {
        start_hour <= current_hour && current_hour <= end_hour
    } else {
        current_hour >= start_hour || current_hour <= end_hour
    }
}

/// Source of wall-clock time for the reconcile loop
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Current hour of day in UTC
    fn current_hour(&self) -> u32 {
        self.now().hour()
    }
}

/// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a settable instant
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Clock pinned to the given hour of an arbitrary fixed day
    pub fn at_hour(hour: u32) -> Self {
        let now = DateTime::<Utc>::from_timestamp(i64::from(hour) * 3600, 0).unwrap_or_default();
        Self::new(now)
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|guard| *guard).unwrap_or_default()
    }
}
