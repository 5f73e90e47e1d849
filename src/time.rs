use chrono::{DateTime, NaiveDate, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::Deref;

/// Format used for query dates such as `?date=2024-07-01`
pub const YMD_FORMAT: &str = "%Y-%m-%d";

/// Epoch values above this are in milliseconds rather than seconds
const MILLIS_THRESHOLD: u64 = 10_000_000_000;

/// Current time at microsecond precision, the precision tokens are persisted with
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Render a timestamp the way the trader API expects `fromEnteredTime`/`toEnteredTime`
pub fn to_iso8601(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Render a date as `YYYY-MM-DD`
pub fn date_to_str(date: &NaiveDate) -> String {
    date.format(YMD_FORMAT).to_string()
}

/// Broker timestamp that arrives as a Unix epoch number.
///
/// The API mixes seconds and milliseconds (`quoteTimeInLong`, `tradeDate`),
/// so values above 1e10 are read as milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Time(pub DateTime<Utc>);

impl Time {
    /// Create a Time from an epoch value in seconds or milliseconds
    pub fn from_epoch(raw: i64) -> Option<Self> {
        let dt = if raw.unsigned_abs() > MILLIS_THRESHOLD {
            Utc.timestamp_millis_opt(raw).single()?
        } else {
            Utc.timestamp_opt(raw, 0).single()?
        };
        Some(Time(dt))
    }

    /// Get the timestamp in milliseconds
    pub fn unix_milli(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Calendar date of this timestamp as `YYYY-MM-DD`
    pub fn date_string(&self) -> String {
        self.0.format(YMD_FORMAT).to_string()
    }
}

impl Deref for Time {
    type Target = DateTime<Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<DateTime<Utc>> for Time {
    fn from(dt: DateTime<Utc>) -> Self {
        Time(dt)
    }
}

impl From<Time> for DateTime<Utc> {
    fn from(t: Time) -> Self {
        t.0
    }
}

impl Serialize for Time {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.unix_milli())
    }
}

impl<'de> Deserialize<'de> for Time {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = i64::deserialize(deserializer)?;
        Time::from_epoch(raw)
            .ok_or_else(|| serde::de::Error::custom(format!("epoch value out of range: {}", raw)))
    }
}

/// Serde adapter storing a `DateTime<Utc>` as floating-point Unix seconds.
///
/// Microseconds survive the round trip; anything finer is dropped.
pub mod epoch_seconds {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let secs = dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_micros()) / 1e6;
        serializer.serialize_f64(secs)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = f64::deserialize(deserializer)?;
        from_f64(raw).ok_or_else(|| D::Error::custom(format!("invalid epoch seconds: {}", raw)))
    }

    pub(crate) fn from_f64(raw: f64) -> Option<DateTime<Utc>> {
        if !raw.is_finite() {
            return None;
        }
        let mut secs = raw.floor() as i64;
        let mut micros = ((raw - raw.floor()) * 1e6).round() as u32;
        if micros >= 1_000_000 {
            secs += 1;
            micros = 0;
        }
        Utc.timestamp_opt(secs, micros * 1000).single()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_millis_and_seconds() {
        let millis: Time = serde_json::from_str("1719846000000").unwrap();
        let secs: Time = serde_json::from_str("1719846000").unwrap();
        assert_eq!(millis, secs);
        assert_eq!(millis.date_string(), "2024-07-01");
    }

    #[test]
    fn test_time_extreme_epoch_is_an_error() {
        assert!(Time::from_epoch(i64::MIN).is_none());
        assert!(Time::from_epoch(i64::MAX).is_none());

        let result = serde_json::from_str::<Time>("-9223372036854775808");
        assert!(result.unwrap_err().to_string().contains("out of range"));

        let before_epoch: Time = serde_json::from_str("-20000000000").unwrap();
        assert_eq!(before_epoch.date_string(), "1969-05-14");
    }

    #[test]
    fn test_time_null() {
        let result: Result<Option<Time>, _> = serde_json::from_str("null");
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn test_epoch_seconds_keeps_micros() {
        let dt = Utc.timestamp_opt(1_719_846_000, 123_456_000).unwrap();
        let raw = dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_micros()) / 1e6;
        assert_eq!(epoch_seconds::from_f64(raw), Some(dt));
    }

    #[test]
    fn test_epoch_seconds_rejects_nan() {
        assert!(epoch_seconds::from_f64(f64::NAN).is_none());
    }

    #[test]
    fn test_iso8601() {
        let dt = Utc.with_ymd_and_hms(2024, 7, 1, 13, 30, 5).unwrap();
        assert_eq!(to_iso8601(&dt), "2024-07-01T13:30:05.000Z");
        assert_eq!(date_to_str(&dt.date_naive()), "2024-07-01");
    }
}
