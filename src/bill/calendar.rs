//! Simulation period and partial-month proration of fixed charges.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// Invalid simulation period.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    #[error("{month}/{day} is not a valid date in {year}")]
    InvalidDate { year: i32, month: u32, day: u32 },
    #[error(
        "simulation begins on {begin_month}/{begin_day}, after it ends on {end_month}/{end_day}"
    )]
    EndsBeforeBegin {
        begin_month: u32,
        begin_day: u32,
        end_month: u32,
        end_day: u32,
    },
}

/// Number of days in `month` (1-based) of `year`.
///
/// # Panics
///
/// Panics if `month` is not in `1..=12`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    assert!((1..=12).contains(&month), "month must be in 1..=12");
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    first_of_month(next_year, next_month)
        .signed_duration_since(first_of_month(year, month))
        .num_days() as u32
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

/// Inclusive simulation date range within one calendar year.
///
/// # Examples
///
/// ```
/// use utility_bills::bill::calendar::SimulationPeriod;
///
/// let period = SimulationPeriod::new(2002, (3, 5), (3, 20)).unwrap();
/// assert_eq!(period.prorate(3), 16.0 / 31.0);
/// assert_eq!(period.prorate(4), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationPeriod {
    calendar_year: i32,
    begin: NaiveDate,
    end: NaiveDate,
}

impl SimulationPeriod {
    /// Creates a period from `(month, day)` pairs.
    ///
    /// # Errors
    ///
    /// Returns a [`PeriodError`] if a date does not exist in `calendar_year` (e.g. Feb 29 of a
    /// non-leap year) or the period ends before it begins.
    pub fn new(
        calendar_year: i32,
        begin: (u32, u32),
        end: (u32, u32),
    ) -> Result<Self, PeriodError> {
        let date = |(month, day): (u32, u32)| {
            NaiveDate::from_ymd_opt(calendar_year, month, day).ok_or(PeriodError::InvalidDate {
                year: calendar_year,
                month,
                day,
            })
        };
        let begin_date = date(begin)?;
        let end_date = date(end)?;
        if end_date < begin_date {
            return Err(PeriodError::EndsBeforeBegin {
                begin_month: begin.0,
                begin_day: begin.1,
                end_month: end.0,
                end_day: end.1,
            });
        }
        Ok(Self {
            calendar_year,
            begin: begin_date,
            end: end_date,
        })
    }

    /// January 1 through December 31 of `calendar_year`.
    pub fn full_year(calendar_year: i32) -> Self {
        Self {
            calendar_year,
            begin: NaiveDate::from_ymd_opt(calendar_year, 1, 1).unwrap_or(NaiveDate::MIN),
            end: NaiveDate::from_ymd_opt(calendar_year, 12, 31).unwrap_or(NaiveDate::MIN),
        }
    }

    pub fn calendar_year(&self) -> i32 {
        self.calendar_year
    }

    pub fn begin_month(&self) -> u32 {
        self.begin.month()
    }

    pub fn end_month(&self) -> u32 {
        self.end.month()
    }

    /// Total simulated days.
    pub fn num_days(&self) -> u32 {
        self.end.signed_duration_since(self.begin).num_days() as u32 + 1
    }

    /// Days of `month` that fall inside the period.
    pub fn simulated_days_in_month(&self, month: u32) -> u32 {
        let (begin_month, end_month) = (self.begin.month(), self.end.month());
        if month < begin_month || month > end_month {
            return 0;
        }
        let first = if month == begin_month { self.begin.day() } else { 1 };
        let last = if month == end_month {
            self.end.day()
        } else {
            days_in_month(self.calendar_year, month)
        };
        last - first + 1
    }

    /// Fraction of `month` (1-based) that falls inside the period, in `[0, 1]`.
    ///
    /// Scales the fixed monthly charge; marginal charges are never prorated.
    pub fn prorate(&self, month: u32) -> f64 {
        let (begin_month, end_month) = (self.begin.month(), self.end.month());
        if month < begin_month || month > end_month {
            return 0.0;
        }
        let days = f64::from(days_in_month(self.calendar_year, month));
        let (begin_day, end_day) = (f64::from(self.begin.day()), f64::from(self.end.day()));

        if month == begin_month && month == end_month {
            (end_day - begin_day + 1.0) / days
        } else if month == begin_month {
            (days - begin_day + 1.0) / days
        } else if month == end_month {
            end_day / days
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn february_is_leap_aware() {
        assert_eq!(days_in_month(2002, 2), 28);
        assert_eq!(days_in_month(2012, 2), 29);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2002, 12), 31);
    }

    #[test]
    fn prorate_single_month() {
        let period = SimulationPeriod::new(2002, (3, 5), (3, 20)).unwrap();
        assert_eq!(period.prorate(2), 0.0);
        assert_eq!(period.prorate(3), (20.0 - 5.0 + 1.0) / 31.0);
        assert_eq!(period.prorate(4), 0.0);
    }

    #[test]
    fn prorate_multi_month() {
        let period = SimulationPeriod::new(2002, (2, 10), (4, 10)).unwrap();
        assert_eq!(period.prorate(1), 0.0);
        assert_eq!(period.prorate(2), (28.0 - 10.0 + 1.0) / 28.0);
        assert_eq!(period.prorate(3), 1.0);
        assert_eq!(period.prorate(4), 10.0 / 30.0);
        assert_eq!(period.prorate(5), 0.0);
    }

    #[test]
    fn full_year_prorates_to_one() {
        let period = SimulationPeriod::full_year(2012);
        assert!((1..=12).all(|m| period.prorate(m) == 1.0));
        assert_eq!(period.num_days(), 366);
    }

    #[test]
    fn simulated_days_follow_period() {
        let period = SimulationPeriod::new(2002, (2, 10), (4, 10)).unwrap();
        let days: Vec<u32> = (1..=12).map(|m| period.simulated_days_in_month(m)).collect();
        assert_eq!(days, vec![0, 19, 31, 10, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(period.num_days(), 60);
    }

    #[test]
    fn rejects_feb_29_outside_leap_year() {
        let err = SimulationPeriod::new(2002, (1, 1), (2, 29)).unwrap_err();
        assert!(matches!(err, PeriodError::InvalidDate { day: 29, .. }));
        assert!(SimulationPeriod::new(2012, (1, 1), (2, 29)).is_ok());
    }

    #[test]
    fn rejects_reversed_period() {
        let err = SimulationPeriod::new(2002, (6, 1), (3, 1)).unwrap_err();
        assert!(matches!(err, PeriodError::EndsBeforeBegin { .. }));
    }
}
