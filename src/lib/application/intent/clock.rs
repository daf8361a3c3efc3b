use chrono::{FixedOffset, NaiveDate, Offset, Utc};

/// Source of "today" for relative date phrases.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock evaluated in a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    /// Offsets outside ±24h fall back to UTC.
    pub fn with_offset_minutes(minutes: i32) -> Self {
        let offset = FixedOffset::east_opt(minutes.saturating_mul(60)).unwrap_or(Utc.fix());
        Self { offset }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::with_offset_minutes(0)
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_is_stable() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).expect("date");
        assert_eq!(FixedClock(day).today(), day);
    }

    #[test]
    fn out_of_range_offset_is_utc() {
        let clock = SystemClock::with_offset_minutes(100_000);
        assert_eq!(clock.offset.local_minus_utc(), 0);
    }
}
