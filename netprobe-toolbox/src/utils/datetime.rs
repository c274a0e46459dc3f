//! Timestamp helpers shared by every result type.
//!
//! Results carry UTC timestamps in the same shape a browser's
//! `Date.prototype.toISOString()` produces: RFC 3339, millisecond precision,
//! `Z` suffix (e.g. `2025-01-01T12:00:00.123Z`).

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Current time truncated to whole milliseconds.
///
/// Truncating at creation keeps serialize → parse round-trips lossless.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Serializes `DateTime<Utc>` as an RFC 3339 string with millisecond precision.
pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Deserializes `DateTime<Utc>` from RFC 3339 or a Unix timestamp.
///
/// Unix timestamps are auto-detected as seconds or milliseconds.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TimestampOrString {
        String(String),
        I64(i64),
    }

    match TimestampOrString::deserialize(deserializer)? {
        TimestampOrString::String(s) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Error::custom(format!("Invalid RFC3339 timestamp: {e}"))),
        TimestampOrString::I64(ts) => {
            parse_unix_timestamp(ts).ok_or_else(|| Error::custom("Invalid Unix timestamp"))
        }
    }
}

/// Parses a Unix timestamp with second/millisecond auto-detection.
fn parse_unix_timestamp(ts: i64) -> Option<DateTime<Utc>> {
    // Values larger than 10^11 are interpreted as milliseconds.
    if ts > 100_000_000_000 {
        DateTime::from_timestamp_millis(ts)
    } else {
        DateTime::from_timestamp(ts, 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Timelike;
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Serialize, Deserialize)]
    struct Wrapper {
        #[serde(with = "super")]
        at: DateTime<Utc>,
    }

    #[test]
    fn test_now_millis_has_no_sub_millisecond_part() {
        let now = now_millis();
        assert_eq!(now.nanosecond() % 1_000_000, 0);
    }

    #[test]
    fn test_serialize_iso_millis_z() {
        let at = DateTime::parse_from_rfc3339("2025-03-04T05:06:07.089Z")
            .unwrap()
            .with_timezone(&Utc);
        let json = serde_json::to_value(Wrapper { at }).unwrap();
        assert_eq!(json["at"], "2025-03-04T05:06:07.089Z");
    }

    #[test]
    fn test_deserialize_offset_is_normalised_to_utc() {
        let w: Wrapper = serde_json::from_str(r#"{"at":"2025-03-04T07:06:07+02:00"}"#).unwrap();
        assert_eq!(w.at.hour(), 5);
    }

    #[test]
    fn test_deserialize_unix_seconds_and_millis() {
        let secs: Wrapper = serde_json::from_str(r#"{"at":1700000000}"#).unwrap();
        let millis: Wrapper = serde_json::from_str(r#"{"at":1700000000000}"#).unwrap();
        assert_eq!(secs.at, millis.at);
    }

    #[test]
    fn test_deserialize_rejects_garbage() {
        assert!(serde_json::from_str::<Wrapper>(r#"{"at":"yesterday"}"#).is_err());
    }
}
