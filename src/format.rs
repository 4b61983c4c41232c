//! Text formatting for video cards: duration, view count and relative publish date.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DEFAULT_MINUTES: u64 = 5;
const DEFAULT_SECONDS: u64 = 30;
const DEFAULT_DURATION: &str = "5:30";

/// Split a leading run of ASCII digits followed by `unit` off `s`.
fn take_component(s: &str, unit: char) -> Option<(u64, &str)> {
  let digits = s.bytes().take_while(u8::is_ascii_digit).count();
  if digits == 0 || !s[digits..].starts_with(unit) {
    return None;
  }
  let value = s[..digits].parse().ok()?;
  Some((value, &s[digits + 1..]))
}

/// Format an ISO-8601-like duration token as `m:ss`.
///
/// Only the minute and second components after the first `PT` are read. A token
/// with neither falls back to `5:30`; absent minutes read as 5, absent seconds as 0.
pub fn format_duration(duration: Option<&str>) -> String {
  let Some(rest) = duration.and_then(|d| d.find("PT").map(|idx| &d[idx + 2..])) else {
    return DEFAULT_DURATION.to_string();
  };

  let (minutes, rest) = match take_component(rest, 'M') {
    Some((m, rest)) => (Some(m), rest),
    None => (None, rest),
  };
  let seconds = take_component(rest, 'S').map(|(s, _)| s);

  match (minutes, seconds) {
    (None, None) => DEFAULT_DURATION.to_string(),
    (Some(m), s) => format!("{}:{:02}", m, s.unwrap_or(0)),
    (None, Some(s)) => format!("{}:{:02}", DEFAULT_MINUTES, s),
  }
}

/// Abbreviate a view count: `2.5M`, `1.5K`, or the plain integer below 1000.
pub fn format_views(count: u64) -> String {
  if count >= 1_000_000 {
    format!("{:.1}M", count as f64 / 1_000_000.0)
  } else if count >= 1_000 {
    format!("{:.1}K", count as f64 / 1_000.0)
  } else {
    count.to_string()
  }
}

/// Parse a backend timestamp: RFC 3339, naive ISO datetime (read as UTC), or a bare date.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.with_timezone(&Utc));
  }
  if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
    return Some(naive.and_utc());
  }
  NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0)).map(|dt| dt.and_utc())
}

fn plural(n: i64, unit: &str) -> String {
  if n == 1 { format!("1 {} ago", unit) } else { format!("{} {}s ago", n, unit) }
}

/// Describe how long ago `published_at` was, relative to `now`.
///
/// Whole days are rounded up; a missing or unparseable timestamp counts as `now`.
pub fn format_relative_date(published_at: Option<&str>, now: DateTime<Utc>) -> String {
  let published = published_at.and_then(parse_timestamp).unwrap_or(now);
  let millis = (now - published).num_milliseconds().unsigned_abs();
  let days = millis.div_ceil(86_400_000) as i64;

  if days == 1 {
    "1 day ago".to_string()
  } else if days < 7 {
    format!("{} days ago", days)
  } else if days < 30 {
    plural(days / 7, "week")
  } else {
    plural(days / 30, "month")
  }
}

/// Recommendation score suffix: two decimals, or `N/A` when absent.
pub fn format_score(score: Option<f64>) -> String {
  score.map_or_else(|| "N/A".to_string(), |s| format!("{:.2}", s))
}
