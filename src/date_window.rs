// src/date_window.rs
use chrono::{Months, NaiveDate};
use serde::Serialize;

use crate::error::{Error, Result};

/// Default half-width of the search window around the requested date.
pub const DEFAULT_WINDOW_MONTHS: u32 = 2;

/// Half-open acquisition window `[start, end)` centred on a requested date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    center: NaiveDate,
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Parse a `YYYY-MM-DD` date and extend it by `months` on each side.
    pub fn around(date: &str, months: u32) -> Result<Self> {
        let center = parse_date(date)?;
        Self::from_center(center, months).map_err(|reason| Error::InvalidDate {
            input: date.to_string(),
            reason,
        })
    }

    fn from_center(center: NaiveDate, months: u32) -> std::result::Result<Self, String> {
        if months == 0 {
            return Err("window must span at least one month on each side".to_string());
        }
        let offset = Months::new(months);
        let start = center
            .checked_sub_months(offset)
            .ok_or_else(|| format!("window start underflows {months} months before {center}"))?;
        let end = center
            .checked_add_months(offset)
            .ok_or_else(|| format!("window end overflows {months} months after {center}"))?;
        Ok(Self { center, start, end })
    }

    pub fn center(&self) -> NaiveDate {
        self.center
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }
}

/// Strict `YYYY-MM-DD` parsing.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    let well_formed = trimmed.len() == 10
        && trimmed
            .bytes()
            .enumerate()
            .all(|(i, b)| if i == 4 || i == 7 { b == b'-' } else { b.is_ascii_digit() });
    if !well_formed {
        return Err(Error::InvalidDate {
            input: input.to_string(),
            reason: "expected YYYY-MM-DD".to_string(),
        });
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|e| Error::InvalidDate {
        input: input.to_string(),
        reason: e.to_string(),
    })
}
