use crate::error::UpstreamError;
use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Europe::Warsaw;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parse a provider kickoff timestamp.
/// Accepts "2025-01-08T19:45:00Z", "2025-01-08T19:45:00+01:00" and
/// "2025-01-08T19:45:00" (no offset means UTC).
pub fn parse_kickoff(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .map(|naive| naive.and_utc())
        .map_err(|_| UpstreamError::InvalidKickoff(raw.to_string()).into())
}

/// Kickoff time as Warsaw civil time, "YYYY-MM-DD HH:MM"
pub fn format_kickoff(raw: &str) -> Result<String> {
    let utc = parse_kickoff(raw)?;
    Ok(utc.with_timezone(&Warsaw).format(DISPLAY_FORMAT).to_string())
}
