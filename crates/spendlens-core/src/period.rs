//! Quick period presets
//!
//! Each preset resolves against a caller-supplied "today" so results are
//! reproducible in tests. Weeks start on Monday.

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::error::{Error, Result};
use crate::models::DateRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Yesterday,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    /// Current month plus the five full months before it
    LastSixMonths,
    ThisYear,
    LastYear,
}

impl Period {
    pub const ALL: [Period; 8] = [
        Self::Yesterday,
        Self::ThisWeek,
        Self::LastWeek,
        Self::ThisMonth,
        Self::LastMonth,
        Self::LastSixMonths,
        Self::ThisYear,
        Self::LastYear,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Yesterday => "yesterday",
            Self::ThisWeek => "this-week",
            Self::LastWeek => "last-week",
            Self::ThisMonth => "this-month",
            Self::LastMonth => "last-month",
            Self::LastSixMonths => "last-6-months",
            Self::ThisYear => "this-year",
            Self::LastYear => "last-year",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Yesterday => "Yesterday",
            Self::ThisWeek => "This Week",
            Self::LastWeek => "Last Week",
            Self::ThisMonth => "This Month",
            Self::LastMonth => "Last Month",
            Self::LastSixMonths => "Last 6 Months",
            Self::ThisYear => "This Year",
            Self::LastYear => "Last Year",
        }
    }

    pub fn resolve(&self, today: NaiveDate) -> DateRange {
        let (start, end) = match self {
            Self::Yesterday => {
                let day = today - Duration::days(1);
                (day, day)
            }
            Self::ThisWeek => week_of(today),
            Self::LastWeek => week_of(today - Duration::days(7)),
            Self::ThisMonth => month_of(today),
            Self::LastMonth => month_of(start_of_month(today) - Duration::days(1)),
            Self::LastSixMonths => {
                let (_, end) = month_of(today);
                let start = start_of_month(today)
                    .checked_sub_months(Months::new(5))
                    .unwrap_or(NaiveDate::MIN);
                (start, end)
            }
            Self::ThisYear => year_of(today.year()),
            Self::LastYear => year_of(today.year() - 1),
        };
        // All arms produce start <= end
        DateRange::new(start, end).unwrap_or_else(|_| DateRange::single_day(today))
    }
}

impl std::str::FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        if wanted == "last-day" {
            return Ok(Self::Yesterday);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.key() == wanted)
            .ok_or_else(|| {
                let keys: Vec<&str> = Self::ALL.iter().map(|p| p.key()).collect();
                Error::Validation(format!(
                    "Unknown period: {}. Available: {}",
                    s,
                    keys.join(", ")
                ))
            })
    }
}

/// Default dashboard range: first of the current month through today
pub fn default_range(today: NaiveDate) -> DateRange {
    DateRange::new(start_of_month(today), today).unwrap_or_else(|_| DateRange::single_day(today))
}

fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn month_of(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = start_of_month(date);
    let end = start
        .checked_add_months(Months::new(1))
        .map(|next| next - Duration::days(1))
        .unwrap_or(NaiveDate::MAX);
    (start, end)
}

fn week_of(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = date.weekday().num_days_from_monday() as i64;
    let start = date - Duration::days(offset);
    (start, start + Duration::days(6))
}

fn year_of(year: i32) -> (NaiveDate, NaiveDate) {
    let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN);
    let end = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(NaiveDate::MAX);
    (start, end)
}
