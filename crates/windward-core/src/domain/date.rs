use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;

use crate::ValidationError;

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Calendar trading date, serialized as `YYYY-MM-DD`.
///
/// Operator input also accepts `YYYY/MM/DD`; the slash form is normalized on
/// parse and never written back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TradeDate(Date);

impl TradeDate {
    pub fn new(date: Date) -> Self {
        Self(date)
    }

    /// Parse `YYYY-MM-DD` or `YYYY/MM/DD`.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().replace('/', "-");
        Date::parse(&normalized, DATE_FORMAT)
            .map(Self)
            .map_err(|_| ValidationError::InvalidDate {
                value: input.to_owned(),
            })
    }

    pub fn date(&self) -> Date {
        self.0
    }

    /// `YYYY-MM` grouping key used by the monthly aggregation.
    pub fn month_key(&self) -> String {
        format!("{:04}-{:02}", self.0.year(), u8::from(self.0.month()))
    }

    /// The following calendar day; saturates at the calendar maximum.
    pub fn next_day(&self) -> Self {
        self.0.next_day().map(Self).unwrap_or(*self)
    }

    /// Subtract whole days; saturates at the calendar minimum.
    pub fn days_before(&self, days: i64) -> Self {
        self.0
            .checked_sub(time::Duration::days(days))
            .map(Self)
            .unwrap_or(*self)
    }

    /// Midnight UTC unix timestamp, used by chart-style history endpoints.
    pub fn unix_timestamp(&self) -> i64 {
        self.0.midnight().assume_utc().unix_timestamp()
    }
}

impl Display for TradeDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0.format(DATE_FORMAT) {
            Ok(formatted) => f.write_str(&formatted),
            Err(_) => write!(f, "{}", self.0),
        }
    }
}

impl FromStr for TradeDate {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl Serialize for TradeDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TradeDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(DeError::custom)
    }
}
