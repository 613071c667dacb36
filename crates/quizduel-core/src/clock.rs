//! Clock abstraction for determinism.
//!
//! Round deadlines, TTL cleanup and daily score buckets all read time
//! through [`Clock`], so tests can pin or step it.

use chrono::{DateTime, TimeDelta, Utc};

/// Abstraction over system time for deterministic behavior.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Time elapsed since `earlier`; negative when `earlier` lies ahead.
    fn since(&self, earlier: DateTime<Utc>) -> TimeDelta {
        self.now() - earlier
    }
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    struct Pinned(DateTime<Utc>);

    impl Clock for Pinned {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[test]
    fn test_since_measures_from_now() {
        let clock = Pinned(Utc.with_ymd_and_hms(2026, 1, 15, 10, 1, 0).unwrap());
        let earlier = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();

        assert_eq!(clock.since(earlier), TimeDelta::seconds(60));
        assert_eq!(
            clock.since(earlier + TimeDelta::seconds(90)),
            TimeDelta::seconds(-30)
        );
    }
}
