//! The YYYYMMDD integer date used as the store's range key.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// 8-digit YYYYMMDD date, the store's range key and the external date
/// representation in API responses.
///
/// Serializes as a bare integer; serde_json stringifies it when it appears
/// as a JSON object key, which is exactly the wire shape of the `rates`
/// maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateInt(u32);

impl DateInt {
    /// 1970-01-01. A fresh builder's max-date watermark starts here.
    pub const UNIX_EPOCH: DateInt = DateInt(19700101);

    /// 9999-12-31, the upper bound of the range-key space.
    pub const MAX: DateInt = DateInt(99991231);

    /// Validates the raw integer as an actual calendar date, so values
    /// like 20230230 are rejected.
    pub fn new(value: u32) -> Result<Self, DomainError> {
        let candidate = DateInt(value);
        candidate.to_date()?;
        Ok(candidate)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        DateInt(date.year() as u32 * 10_000 + date.month() * 100 + date.day())
    }

    /// The current UTC calendar date.
    pub fn today() -> Self {
        Self::from_date(Utc::now().date_naive())
    }

    pub fn to_date(self) -> Result<NaiveDate, DomainError> {
        let year = (self.0 / 10_000) as i32;
        let month = self.0 / 100 % 100;
        let day = self.0 % 100;
        NaiveDate::from_ymd_opt(year, month, day).ok_or(DomainError::InvalidDate(self.0))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DateInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08}", self.0)
    }
}

impl FromStr for DateInt {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u32 = s
            .parse()
            .map_err(|_| DomainError::Validation(format!("Not a YYYYMMDD date: {}", s)))?;
        DateInt::new(value)
    }
}

impl From<NaiveDate> for DateInt {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}
