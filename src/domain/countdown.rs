use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::Serialize;

/// Time left until the reveal day ends, split for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    // ---

    /// Countdown to the last second (23:59:59 UTC) of `target`'s calendar day.
    /// Clamps to zero once the deadline has passed.
    pub fn until(target: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        // ---
        let remaining = deadline(target) - now;
        if remaining <= Duration::zero() {
            return Self::default();
        }

        let total = remaining.num_seconds();
        Self {
            days: total / 86_400,
            hours: (total / 3_600) % 24,
            minutes: (total / 60) % 60,
            seconds: total % 60,
        }
    }
}

/// End of the target's UTC calendar day.
pub fn deadline(target: DateTime<Utc>) -> DateTime<Utc> {
    // ---
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    target.date_naive().and_time(end_of_day).and_utc()
}
