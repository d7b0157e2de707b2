use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime};

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> crate::Result<Self> {
        if end < start {
            crate::invalid!("end date {end} is before start date {start}");
        }

        Ok(Self { start, end })
    }

    pub fn contains(&self, day: Date) -> bool {
        self.start <= day && day <= self.end
    }

    pub fn contains_range(&self, other: &DateRange) -> bool {
        self.contains(other.start) && self.contains(other.end)
    }

    pub fn len(&self) -> usize {
        ((self.end - self.start).whole_days() + 1).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Days in chronological order.
    pub fn days(&self) -> impl Iterator<Item = Date> + '_ {
        (0..self.len() as i64).map(|offset| self.start + Duration::days(offset))
    }

    /// The `days` calendar days ending at `until`, both ends included.
    /// `trailing(d, 1)` is `d` alone; zero is treated as one.
    pub fn trailing(until: Date, days: u16) -> Self {
        Self {
            start: until - Duration::days(days.saturating_sub(1) as i64),
            end: until,
        }
    }
}

/// Days are persisted as the unix timestamp of their UTC midnight.
pub fn day_to_timestamp(day: Date) -> i64 {
    day.midnight().assume_utc().unix_timestamp()
}

pub fn timestamp_to_day(timestamp: i64) -> crate::Result<Date> {
    Ok(OffsetDateTime::from_unix_timestamp(timestamp)?.date())
}

pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}
