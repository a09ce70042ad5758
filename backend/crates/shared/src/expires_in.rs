//! Expiry durations shared by pastes and access tokens.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

/// How long something lives after creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExpiresIn {
    #[default]
    #[serde(rename = "never")]
    Never,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "2h")]
    TwoHours,
    #[serde(rename = "10h")]
    TenHours,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "2d")]
    TwoDays,
    #[serde(rename = "1w")]
    OneWeek,
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "1y")]
    OneYear,
}

impl ExpiresIn {
    pub const ALL: [ExpiresIn; 9] = [
        ExpiresIn::Never,
        ExpiresIn::OneHour,
        ExpiresIn::TwoHours,
        ExpiresIn::TenHours,
        ExpiresIn::OneDay,
        ExpiresIn::TwoDays,
        ExpiresIn::OneWeek,
        ExpiresIn::OneMonth,
        ExpiresIn::OneYear,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ExpiresIn::Never => "never",
            ExpiresIn::OneHour => "1h",
            ExpiresIn::TwoHours => "2h",
            ExpiresIn::TenHours => "10h",
            ExpiresIn::OneDay => "1d",
            ExpiresIn::TwoDays => "2d",
            ExpiresIn::OneWeek => "1w",
            ExpiresIn::OneMonth => "1m",
            ExpiresIn::OneYear => "1y",
        }
    }

    /// Compute the deletion time for something created at `start`.
    ///
    /// Months and years follow the calendar and clamp to the last day of the
    /// target month (Jan 31 + 1m = Feb 28/29). `Never` yields `None`.
    pub fn to_deletes_at(self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            ExpiresIn::Never => None,
            ExpiresIn::OneHour => Some(start + Duration::hours(1)),
            ExpiresIn::TwoHours => Some(start + Duration::hours(2)),
            ExpiresIn::TenHours => Some(start + Duration::hours(10)),
            ExpiresIn::OneDay => Some(start + Duration::days(1)),
            ExpiresIn::TwoDays => Some(start + Duration::days(2)),
            ExpiresIn::OneWeek => Some(start + Duration::days(7)),
            ExpiresIn::OneMonth => start.checked_add_months(Months::new(1)),
            ExpiresIn::OneYear => start.checked_add_months(Months::new(12)),
        }
    }
}

impl fmt::Display for ExpiresIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an unknown expiry string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown expiry value: {0}")]
pub struct ParseExpiresInError(pub String);

impl FromStr for ExpiresIn {
    type Err = ParseExpiresInError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExpiresIn::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| ParseExpiresInError(s.to_string()))
    }
}
