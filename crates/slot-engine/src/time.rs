//! Argument parsing and validation shared by every entry point.

use chrono::{NaiveDate, NaiveDateTime};

use crate::config::{WorkingHours, MAX_DURATION_MINUTES};
use crate::error::{PlannerError, Result};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a naive ISO-8601 wall-clock timestamp.
///
/// Accepts `YYYY-MM-DDTHH:MM[:SS[.f]]`, the same with a space instead of `T`,
/// and a bare `YYYY-MM-DD` (midnight). Offsets are not accepted: all times
/// are local.
pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime> {
    let trimmed = input.trim();

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| PlannerError::InvalidArgument(format!("malformed timestamp '{input}'")))
}

/// Durations must lie in `1..=1440` minutes.
pub fn validate_duration(duration_minutes: i64) -> Result<()> {
    if duration_minutes <= 0 || duration_minutes > MAX_DURATION_MINUTES {
        return Err(PlannerError::InvalidArgument(format!(
            "duration must be between 1 and {MAX_DURATION_MINUTES} minutes, got {duration_minutes}"
        )));
    }
    Ok(())
}

/// Slots found by scanning lie inside one working day, so a longer
/// duration could never be satisfied.
pub fn validate_fits_working_day(duration_minutes: i64, hours: &WorkingHours) -> Result<()> {
    let day = hours.day_minutes();
    if duration_minutes > day {
        return Err(PlannerError::InvalidArgument(format!(
            "duration of {duration_minutes} minutes exceeds the {day}-minute working day ({:02}:00-{:02}:00)",
            hours.start_hour, hours.end_hour
        )));
    }
    Ok(())
}

/// A request window must be non-empty.
pub fn validate_window(start: NaiveDateTime, end: NaiveDateTime) -> Result<()> {
    if end <= start {
        return Err(PlannerError::InvalidArgument(format!(
            "window end {end} must be after start {start}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_shapes() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 6)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2025-01-06T09:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2025-01-06T09:30").unwrap(), expected);
        assert_eq!(parse_timestamp("2025-01-06 09:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp(" 2025-01-06T09:30:00.000 ").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2025-01-06").unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 6)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "tomorrow", "2025-13-01T09:00:00", "2025-01-06T25:00"] {
            assert!(
                matches!(parse_timestamp(bad), Err(PlannerError::InvalidArgument(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn duration_bounds() {
        assert!(validate_duration(0).is_err());
        assert!(validate_duration(-15).is_err());
        assert!(validate_duration(1).is_ok());
        assert!(validate_duration(1440).is_ok());
        assert!(validate_duration(1441).is_err());
    }
}
