use crate::error::{GhmapError, Result};
use crate::model::DateRange;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::time::SystemTime;

/// Calendar-date key for an event, taken from the timestamp's own UTC date
/// component. No timezone conversion.
pub fn day_key(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d").to_string()
}

pub fn parse_day_key(key: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d")
        .map_err(|e| GhmapError::Parse(format!("Invalid date key '{key}': {e}")))
}

/// Resolve `--since`/`--until` strings into a `DateRange`.
pub fn resolve_range(since: Option<&str>, until: Option<&str>) -> Result<DateRange> {
    let mut range = DateRange::new();

    let since_dt = since.map(parse_date).transpose()?;
    let until_dt = until.map(parse_date).transpose()?;

    if let (Some(s), Some(u)) = (since_dt, until_dt) {
        if s > u {
            return Err(GhmapError::InvalidDate(format!(
                "Invalid range: since ({}) is after until ({})",
                s, u
            )));
        }
    }

    if let Some(s) = since_dt {
        range = range.with_since(s);
    }
    if let Some(u) = until_dt {
        range = range.with_until(u);
    }

    Ok(range)
}

/// Accepts RFC3339, `YYYY-MM-DD`, or a duration back from now
/// (e.g. "90d", "2 weeks ago").
pub fn parse_date(input: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(datetime) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&datetime));
        }
    }

    let cleaned = input
        .trim()
        .to_lowercase()
        .strip_suffix(" ago")
        .unwrap_or(input.trim())
        .replace(' ', "");
    if let Ok(duration) = humantime::parse_duration(&cleaned) {
        let target = SystemTime::now()
            .checked_sub(duration)
            .ok_or_else(|| GhmapError::InvalidDate(format!("Duration overflow for '{input}'")))?;
        return Ok(DateTime::<Utc>::from(target));
    }

    Err(GhmapError::InvalidDate(format!(
        "Cannot parse '{input}' as a date or duration"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn day_key_uses_utc_date_component() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 5, 23, 59, 59).unwrap();
        assert_eq!(day_key(&ts), "2024-03-05");
    }

    #[test]
    fn day_key_round_trips_through_parse() {
        let ts = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();
        let parsed = parse_day_key(&day_key(&ts)).unwrap();
        assert_eq!(parsed, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }

    #[test]
    fn parse_date_accepts_plain_dates_and_rfc3339() {
        use chrono::Timelike;

        let plain = parse_date("2024-01-15").unwrap();
        assert_eq!((plain.year(), plain.month(), plain.day()), (2024, 1, 15));

        let rfc = parse_date("2024-01-15T10:30:00Z").unwrap();
        assert_eq!(rfc.hour(), 10);
    }

    #[test]
    fn parse_date_accepts_natural_durations() {
        let now = Utc::now();
        let back = parse_date("2 weeks ago").unwrap();
        let delta = now - back;
        assert!((delta.num_days() - 14).abs() <= 1);

        assert!(parse_date("90d").is_ok());
        assert!(parse_date("not-a-date").is_err());
    }

    #[test]
    fn resolve_range_rejects_inverted_bounds() {
        assert!(resolve_range(Some("2024-02-01"), Some("2024-01-01")).is_err());
        let range = resolve_range(Some("2024-01-01"), Some("2024-02-01")).unwrap();
        assert!(range.since.is_some() && range.until.is_some());
    }
}
