//! Leaf types the codec recognises by identity: dates and URLs.
//!
//! Both serialize through `serialize_newtype_struct` with a reserved name
//! the js-bridge codec checks before generic dispatch. Any other serde format
//! sees a plain millisecond number or URL string.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::de::{self, Deserialize, Deserializer, Visitor};
use serde::ser::{Serialize, Serializer};
use thiserror::Error;
use time::OffsetDateTime;
use url::Url;

/// Reserved newtype name carried by [`ScriptDate`].
pub const DATE_TOKEN: &str = "$__js_bridge_private_Date";

/// Reserved newtype name carried by [`ScriptUrl`].
pub const URL_TOKEN: &str = "$__js_bridge_private_Url";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("date is not a finite number of milliseconds")]
    NotFinite,
    #[error("date is outside the supported range")]
    OutOfRange,
}

/// A point in time as the runtime's `Date` sees it: milliseconds since the
/// Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ScriptDate {
    millis: f64,
}

impl ScriptDate {
    pub fn from_epoch_millis(millis: f64) -> Self {
        Self { millis }
    }

    pub fn from_epoch_seconds(seconds: f64) -> Self {
        Self {
            millis: seconds * 1000.0,
        }
    }

    pub fn epoch_millis(self) -> f64 {
        self.millis
    }

    pub fn epoch_seconds(self) -> f64 {
        self.millis / 1000.0
    }
}

impl From<SystemTime> for ScriptDate {
    fn from(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => Self::from_epoch_millis(after.as_secs_f64() * 1000.0),
            Err(before) => Self::from_epoch_millis(-before.duration().as_secs_f64() * 1000.0),
        }
    }
}

impl TryFrom<ScriptDate> for SystemTime {
    type Error = DateRangeError;

    fn try_from(date: ScriptDate) -> Result<Self, Self::Error> {
        if !date.millis.is_finite() {
            return Err(DateRangeError::NotFinite);
        }
        let offset = Duration::try_from_secs_f64(date.epoch_seconds().abs())
            .map_err(|_| DateRangeError::OutOfRange)?;
        let shifted = if date.millis < 0.0 {
            UNIX_EPOCH.checked_sub(offset)
        } else {
            UNIX_EPOCH.checked_add(offset)
        };
        shifted.ok_or(DateRangeError::OutOfRange)
    }
}

impl From<OffsetDateTime> for ScriptDate {
    fn from(time: OffsetDateTime) -> Self {
        Self::from_epoch_millis(time.unix_timestamp_nanos() as f64 / 1_000_000.0)
    }
}

impl TryFrom<ScriptDate> for OffsetDateTime {
    type Error = DateRangeError;

    fn try_from(date: ScriptDate) -> Result<Self, Self::Error> {
        if !date.millis.is_finite() {
            return Err(DateRangeError::NotFinite);
        }
        let nanos = (date.millis * 1_000_000.0).round() as i128;
        OffsetDateTime::from_unix_timestamp_nanos(nanos).map_err(|_| DateRangeError::OutOfRange)
    }
}

impl Serialize for ScriptDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_newtype_struct(DATE_TOKEN, &self.millis)
    }
}

impl<'de> Deserialize<'de> for ScriptDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_newtype_struct(DATE_TOKEN, DateVisitor)
    }
}

struct DateVisitor;

impl<'de> Visitor<'de> for DateVisitor {
    type Value = ScriptDate;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a date or a number of epoch milliseconds")
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(self, d: D) -> Result<ScriptDate, D::Error> {
        f64::deserialize(d).map(ScriptDate::from_epoch_millis)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<ScriptDate, E> {
        Ok(ScriptDate::from_epoch_millis(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ScriptDate, E> {
        Ok(ScriptDate::from_epoch_millis(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ScriptDate, E> {
        Ok(ScriptDate::from_epoch_millis(v as f64))
    }
}

/// A URL, exchanged with the runtime as its string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScriptUrl(pub Url);

impl ScriptUrl {
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        Url::parse(input).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn into_inner(self) -> Url {
        self.0
    }
}

impl From<Url> for ScriptUrl {
    fn from(url: Url) -> Self {
        Self(url)
    }
}

impl FromStr for ScriptUrl {
    type Err = url::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ScriptUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ScriptUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_newtype_struct(URL_TOKEN, self.as_str())
    }
}

impl<'de> Deserialize<'de> for ScriptUrl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_newtype_struct(URL_TOKEN, UrlVisitor)
    }
}

struct UrlVisitor;

impl<'de> Visitor<'de> for UrlVisitor {
    type Value = ScriptUrl;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a URL string")
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(self, d: D) -> Result<ScriptUrl, D::Error> {
        d.deserialize_str(self)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ScriptUrl, E> {
        ScriptUrl::parse(v).map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_seconds_and_millis_agree() {
        let date = ScriptDate::from_epoch_seconds(1.5);
        assert_eq!(date.epoch_millis(), 1500.0);
        assert_eq!(ScriptDate::from_epoch_millis(1500.0).epoch_seconds(), 1.5);
    }

    #[test]
    fn system_time_conversion_matrix() {
        let later = UNIX_EPOCH + Duration::from_millis(2_500);
        assert_eq!(ScriptDate::from(later).epoch_millis(), 2500.0);
        let earlier = UNIX_EPOCH - Duration::from_millis(1_000);
        let date = ScriptDate::from(earlier);
        assert_eq!(date.epoch_millis(), -1000.0);
        assert_eq!(SystemTime::try_from(date), Ok(earlier));
        assert_eq!(
            SystemTime::try_from(ScriptDate::from_epoch_millis(f64::NAN)),
            Err(DateRangeError::NotFinite)
        );
    }

    #[test]
    fn offset_date_time_conversion() {
        let time = OffsetDateTime::from_unix_timestamp(1_700_000_000).expect("timestamp");
        let date = ScriptDate::from(time);
        assert_eq!(date.epoch_millis(), 1_700_000_000_000.0);
        assert_eq!(OffsetDateTime::try_from(date), Ok(time));
    }

    #[test]
    fn foreign_formats_see_plain_values() {
        let date = ScriptDate::from_epoch_millis(1500.0);
        assert_eq!(serde_json::to_string(&date).expect("date"), "1500.0");
        let back: ScriptDate = serde_json::from_str("1500").expect("date back");
        assert_eq!(back, date);

        let url = ScriptUrl::parse("https://example.com/a?b=1").expect("url");
        assert_eq!(
            serde_json::to_string(&url).expect("url"),
            "\"https://example.com/a?b=1\""
        );
        let back: ScriptUrl = serde_json::from_str("\"https://example.com/a?b=1\"").expect("url");
        assert_eq!(back, url);
        assert!(serde_json::from_str::<ScriptUrl>("\"not a url\"").is_err());
    }
}
