//! Conversions for `google.protobuf.Timestamp`.
//!
//! Timestamps are absolute instants: seconds and nanoseconds since the Unix
//! epoch in UTC. The textual form is RFC 3339 with a `Z` suffix and 0, 3, 6
//! or 9 fractional digits, restricted to years 0001 through 9999.

use chrono::{DateTime, SecondsFormat, Utc};
use prost_types::Timestamp;

use crate::error::TimestampError;

/// 0001-01-01T00:00:00Z
pub const MIN_SECONDS: i64 = -62_135_596_800;
/// 9999-12-31T23:59:59Z
pub const MAX_SECONDS: i64 = 253_402_300_799;

const NANOS_PER_SECOND: i32 = 1_000_000_000;

/// Builds a wire timestamp from a `chrono` instant.
pub fn from_datetime(value: &DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: value.timestamp(),
        // chrono folds leap seconds into nanos >= 1e9
        nanos: value.timestamp_subsec_nanos().min(999_999_999) as i32,
    }
}

/// Converts a wire timestamp to a `chrono` instant.
pub fn to_datetime(value: &Timestamp) -> Result<DateTime<Utc>, TimestampError> {
    let out_of_range = || TimestampError::OutOfRange {
        seconds: value.seconds,
        nanos: value.nanos,
    };
    if !(MIN_SECONDS..=MAX_SECONDS).contains(&value.seconds)
        || !(0..NANOS_PER_SECOND).contains(&value.nanos)
    {
        return Err(out_of_range());
    }
    DateTime::<Utc>::from_timestamp(value.seconds, value.nanos as u32).ok_or_else(out_of_range)
}

/// Renders a wire timestamp as RFC 3339 text.
pub fn format_rfc3339(value: &Timestamp) -> Result<String, TimestampError> {
    Ok(to_datetime(value)?.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// Parses RFC 3339 text into a wire timestamp.
///
/// Any UTC offset is accepted and normalised to UTC.
pub fn parse_rfc3339(input: &str) -> Result<Timestamp, TimestampError> {
    let parsed = DateTime::parse_from_rfc3339(input).map_err(|err| TimestampError::Parse {
        input: input.to_string(),
        message: err.to_string(),
    })?;
    let timestamp = from_datetime(&parsed.with_timezone(&Utc));
    // reject years chrono accepts but the wire range does not
    to_datetime(&timestamp)?;
    Ok(timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uses_shortest_fraction() {
        let whole = Timestamp {
            seconds: 1_700_000_000,
            nanos: 0,
        };
        assert_eq!(format_rfc3339(&whole).unwrap(), "2023-11-14T22:13:20Z");

        let millis = Timestamp {
            seconds: 1_700_000_000,
            nanos: 250_000_000,
        };
        assert_eq!(format_rfc3339(&millis).unwrap(), "2023-11-14T22:13:20.250Z");

        let nanos = Timestamp {
            seconds: 1_700_000_000,
            nanos: 1,
        };
        assert_eq!(
            format_rfc3339(&nanos).unwrap(),
            "2023-11-14T22:13:20.000000001Z"
        );
    }

    #[test]
    fn test_parse_normalises_offset() {
        let parsed = parse_rfc3339("2023-11-15T00:13:20.5+02:00").unwrap();
        assert_eq!(
            parsed,
            Timestamp {
                seconds: 1_700_000_000,
                nanos: 500_000_000,
            }
        );
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let bad_nanos = Timestamp {
            seconds: 0,
            nanos: -1,
        };
        assert!(matches!(
            format_rfc3339(&bad_nanos),
            Err(TimestampError::OutOfRange { .. })
        ));

        let too_late = Timestamp {
            seconds: MAX_SECONDS + 1,
            nanos: 0,
        };
        assert!(to_datetime(&too_late).is_err());
    }

    #[test]
    fn test_range_bounds_render() {
        let min = Timestamp {
            seconds: MIN_SECONDS,
            nanos: 0,
        };
        assert_eq!(format_rfc3339(&min).unwrap(), "0001-01-01T00:00:00Z");
        let max = Timestamp {
            seconds: MAX_SECONDS,
            nanos: 999_999_999,
        };
        assert_eq!(
            format_rfc3339(&max).unwrap(),
            "9999-12-31T23:59:59.999999999Z"
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_rfc3339("yesterday"),
            Err(TimestampError::Parse { .. })
        ));
    }
}
