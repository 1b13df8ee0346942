use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::ValidationError;

/// Calendar date of one trading session, compared at day granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TradingDate(Date);

impl TradingDate {
    /// Parse a provider or storage date key; only `YYYY-MM-DD` is accepted.
    pub fn parse_iso(input: &str) -> Result<Self, ValidationError> {
        Date::parse(input, format_description!("[year]-[month]-[day]"))
            .map(Self)
            .map_err(|_| ValidationError::InvalidDate {
                value: input.to_owned(),
            })
    }

    /// Parse a caller-supplied range bound.
    ///
    /// Accepts `YYYY-MM-DD`, or an RFC3339 timestamp whose calendar date (in
    /// its own offset) is kept and whose time-of-day is discarded.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        Self::parse_iso(trimmed).or_else(|_| {
            OffsetDateTime::parse(trimmed, &Rfc3339)
                .map(|value| Self(value.date()))
                .map_err(|_| ValidationError::InvalidDate {
                    value: input.to_owned(),
                })
        })
    }

    pub const fn from_date(date: Date) -> Self {
        Self(date)
    }

    pub const fn into_inner(self) -> Date {
        self.0
    }

    pub fn format_iso(self) -> String {
        format!(
            "{:04}-{:02}-{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day()
        )
    }
}

impl Display for TradingDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_iso())
    }
}

impl FromStr for TradingDate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TradingDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_iso())
    }
}

impl<'de> Deserialize<'de> for TradingDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse_iso(&value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_dates() {
        let date = TradingDate::parse("2024-01-03").expect("must parse");
        assert_eq!(date.to_string(), "2024-01-03");
    }

    #[test]
    fn timestamps_are_truncated_to_their_date() {
        let morning = TradingDate::parse("2024-01-03T00:00:00Z").expect("must parse");
        let evening = TradingDate::parse("2024-01-03T23:59:59-05:00").expect("must parse");
        let plain = TradingDate::parse("2024-01-03").expect("must parse");

        assert_eq!(morning, plain);
        assert_eq!(evening, plain);
    }

    #[test]
    fn storage_keys_must_be_iso_dates() {
        assert!(TradingDate::parse_iso("2024-1-3").is_err());
        assert!(TradingDate::parse_iso("2024-01-03T00:00:00Z").is_err());
        assert!(TradingDate::parse_iso("2024-02-30").is_err());
    }

    #[test]
    fn ordering_follows_the_calendar() {
        let earlier = TradingDate::parse("2023-12-29").expect("must parse");
        let later = TradingDate::parse("2024-01-02").expect("must parse");
        assert!(earlier < later);
    }
}
