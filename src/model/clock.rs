use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

pub const WEEKS_PER_YEAR: u32 = 52;

/// Simulation calendar. One tick is one week; week 52 wraps to week 1 of
/// the next year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    /// 1-based week of the year (1..=52).
    pub week: u32,
    /// 1-based year in office.
    pub year: u32,
    /// Real calendar year that simulation year 1 maps onto.
    pub start_year: i32,
}

impl Clock {
    pub fn new(start_year: i32) -> Self {
        Self {
            week: 1,
            year: 1,
            start_year,
        }
    }

    /// Advance one week, rolling over to the next year past week 52.
    pub fn advance(&mut self) {
        self.week += 1;
        if self.week > WEEKS_PER_YEAR {
            self.week = 1;
            self.year += 1;
        }
    }

    /// Weeks elapsed since the start of the simulation, 1-based.
    pub fn absolute_week(&self) -> u32 {
        (self.year - 1) * WEEKS_PER_YEAR + self.week
    }

    /// Derived calendar date: the Monday of the current ISO week.
    pub fn calendar_date(&self) -> NaiveDate {
        let calendar_year = self.start_year + self.year as i32 - 1;
        NaiveDate::from_isoywd_opt(calendar_year, self.week, Weekday::Mon).unwrap_or_default()
    }
}

/// A scheduled point on the calendar (elections, votes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarPoint {
    pub week: u32,
    pub year: u32,
}

impl CalendarPoint {
    pub fn absolute_week(&self) -> u32 {
        (self.year - 1) * WEEKS_PER_YEAR + self.week
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_wraps_and_year_increments() {
        let mut clock = Clock::new(2026);
        clock.week = 52;
        clock.advance();
        assert_eq!(clock.week, 1);
        assert_eq!(clock.year, 2);
    }

    #[test]
    fn absolute_week_is_monotone_across_years() {
        let mut clock = Clock::new(2026);
        let mut last = 0;
        for _ in 0..130 {
            let abs = clock.absolute_week();
            assert_eq!(abs, last + 1);
            last = abs;
            clock.advance();
        }
    }

    #[test]
    fn calendar_date_tracks_start_year() {
        let clock = Clock::new(2026);
        assert_eq!(clock.calendar_date().to_string(), "2025-12-29");
        let mut later = clock;
        for _ in 0..52 {
            later.advance();
        }
        assert_eq!(later.year, 2);
    }
}
