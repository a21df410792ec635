use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    #[error("Month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),
    #[error("Year must have four digits, got {0}")]
    InvalidYear(i32),
    #[error("Expected YYYY-MM, got {0:?}")]
    Malformed(String),
    #[error("Range start {start} is after end {end}")]
    InvertedRange { start: YearMonth, end: YearMonth },
}

/// Loan payments in or before this month are outside the warehouse
/// retention window.
pub const RETENTION_CUTOFF: YearMonth = YearMonth { year: 2023, month: 6 };

/// A calendar month. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodError> {
        if !(1000..=9999).contains(&year) {
            return Err(PeriodError::InvalidYear(year));
        }
        if !(1..=12).contains(&month) {
            return Err(PeriodError::InvalidMonth(month));
        }
        Ok(YearMonth { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn succ(self) -> Self {
        if self.month == 12 {
            YearMonth {
                year: self.year + 1,
                month: 1,
            }
        } else {
            YearMonth {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || PeriodError::Malformed(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(malformed)?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(malformed());
        }
        let year = year.parse::<i32>().map_err(|_| malformed())?;
        let month = month.parse::<u32>().map_err(|_| malformed())?;
        YearMonth::new(year, month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = PeriodError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// Inclusive run of months, iterated oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    start: YearMonth,
    end: YearMonth,
}

impl MonthRange {
    pub fn new(start: YearMonth, end: YearMonth) -> Result<Self, PeriodError> {
        if start > end {
            return Err(PeriodError::InvertedRange { start, end });
        }
        Ok(MonthRange { start, end })
    }

    pub fn single(month: YearMonth) -> Self {
        MonthRange {
            start: month,
            end: month,
        }
    }

    pub fn start(&self) -> YearMonth {
        self.start
    }

    pub fn end(&self) -> YearMonth {
        self.end
    }

    pub fn iter(&self) -> impl Iterator<Item = YearMonth> {
        let end = self.end;
        std::iter::successors(Some(self.start), move |m| {
            let next = m.succ();
            (next <= end).then_some(next)
        })
    }
}

impl fmt::Display for MonthRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_rejects_bad_month() {
        assert_eq!(YearMonth::new(2024, 0), Err(PeriodError::InvalidMonth(0)));
        assert_eq!(YearMonth::new(2024, 13), Err(PeriodError::InvalidMonth(13)));
    }

    #[test]
    fn new_rejects_short_year() {
        assert_eq!(YearMonth::new(24, 10), Err(PeriodError::InvalidYear(24)));
    }

    #[test]
    fn contains_is_exact_month() {
        let oct = ym(2024, 10);
        assert!(oct.contains(date(2024, 10, 1)));
        assert!(oct.contains(date(2024, 10, 31)));
        assert!(!oct.contains(date(2024, 9, 30)));
        assert!(!oct.contains(date(2024, 11, 1)));
        assert!(!oct.contains(date(2023, 10, 15)));
    }

    #[test]
    fn display_and_parse() {
        assert_eq!(ym(2023, 6).to_string(), "2023-06");
        assert_eq!("2023-06".parse::<YearMonth>().unwrap(), ym(2023, 6));
        assert_eq!("2024-1".parse::<YearMonth>().unwrap(), ym(2024, 1));
        assert!("202306".parse::<YearMonth>().is_err());
        assert!("2023-13".parse::<YearMonth>().is_err());
        assert!("23-06".parse::<YearMonth>().is_err());
    }

    #[test]
    fn ordering_is_chronological() {
        assert!(ym(2023, 12) < ym(2024, 1));
        assert!(ym(2023, 6) < ym(2023, 7));
        assert!(YearMonth::of(date(2023, 7, 1)) > ym(2023, 6));
    }

    #[test]
    fn succ_wraps_year() {
        assert_eq!(ym(2024, 12).succ(), ym(2025, 1));
        assert_eq!(ym(2024, 3).succ(), ym(2024, 4));
    }

    #[test]
    fn range_iterates_inclusive() {
        let range = MonthRange::new(ym(2024, 11), ym(2025, 2)).unwrap();
        let months: Vec<String> = range.iter().map(|m| m.to_string()).collect();
        assert_eq!(months, vec!["2024-11", "2024-12", "2025-01", "2025-02"]);
    }

    #[test]
    fn range_rejects_inverted() {
        assert!(MonthRange::new(ym(2025, 1), ym(2024, 12)).is_err());
        assert_eq!(MonthRange::single(ym(2024, 10)).iter().count(), 1);
    }

    #[test]
    fn serde_as_string() {
        let json = serde_json::to_string(&ym(2024, 10)).unwrap();
        assert_eq!(json, "\"2024-10\"");
        let back: YearMonth = serde_json::from_str("\"2023-06\"").unwrap();
        assert_eq!(back, ym(2023, 6));
        assert!(serde_json::from_str::<YearMonth>("\"2023-00\"").is_err());
    }
}
