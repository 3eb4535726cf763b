//! Calendar helpers for finance primitives.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A calendar month identified by year and 1-based month number.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    /// Returns `None` when `month` falls outside 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if is_valid_month(month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn label(&self) -> &'static str {
        month_label(self.month)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

pub fn is_valid_month(month: u32) -> bool {
    (1..=12).contains(&month)
}

/// Short English label for a 1-based month. Out-of-range values yield `"?"`.
pub fn month_label(month: u32) -> &'static str {
    if is_valid_month(month) {
        MONTH_LABELS[(month - 1) as usize]
    } else {
        "?"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_key_rejects_out_of_range() {
        assert!(MonthKey::new(2024, 0).is_none());
        assert!(MonthKey::new(2024, 13).is_none());
        assert_eq!(MonthKey::new(2024, 12).map(|key| key.label()), Some("Dec"));
    }

    #[test]
    fn month_key_contains_matches_year_and_month() {
        let key = MonthKey::new(2025, 3).unwrap();
        assert!(key.contains(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()));
        assert!(!key.contains(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()));
        assert_eq!(key.to_string(), "2025-03");
    }
}
