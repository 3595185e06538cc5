use super::{RepoError, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

/// Trimmed, non-empty value of a required field.
pub fn required(value: &Option<String>, field: &str, label: &str) -> Result<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| RepoError::invalid(field, format!("{label} is required")))
}

/// Trimmed value, with blank strings collapsed to `None`.
pub fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn length(value: &str, field: &str, label: &str, min: usize, max: usize) -> Result<()> {
    let n = value.chars().count();
    if n < min {
        return Err(RepoError::invalid(
            field,
            format!("{label} must be at least {min} characters"),
        ));
    }
    if n > max {
        return Err(RepoError::invalid(
            field,
            format!("{label} must be at most {max} characters"),
        ));
    }
    Ok(())
}

pub fn email(value: &str, field: &str, message: &str) -> Result<()> {
    let ok = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if ok {
        Ok(())
    } else {
        Err(RepoError::invalid(field, message))
    }
}

pub fn date(value: &str, field: &str, label: &str) -> Result<NaiveDate> {
    let head = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .map_err(|_| RepoError::invalid(field, format!("{label}: invalid date format")))
}

/// Accepts RFC 3339 timestamps or plain dates (midnight UTC).
pub fn instant(value: &str, field: &str, label: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    let midnight = date(value, field, label)?
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| RepoError::invalid(field, format!("{label}: invalid date format")))?;
    Ok(Utc.from_utc_datetime(&midnight))
}

/// `H:MM` or `HH:MM`, 00:00 through 23:59. Returns minutes past midnight.
pub fn clock_time(value: &str, field: &str) -> Result<u32> {
    let bad = || RepoError::invalid(field, "Invalid time format (HH:MM)");
    let (h, m) = value.split_once(':').ok_or_else(bad)?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return Err(bad());
    }
    if !h.chars().all(|c| c.is_ascii_digit()) || !m.chars().all(|c| c.is_ascii_digit()) {
        return Err(bad());
    }
    let hours: u32 = h.parse().map_err(|_| bad())?;
    let minutes: u32 = m.parse().map_err(|_| bad())?;
    if hours > 23 || minutes > 59 {
        return Err(bad());
    }
    Ok(hours * 60 + minutes)
}

/// Numbers may arrive as JSON numbers or numeric strings; blanks are `None`.
pub fn lenient_f64<'de, D>(d: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(d)?;
    match raw {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => Ok(n.as_f64()),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("not a number: {s}"))),
        Some(other) => Err(serde::de::Error::custom(format!("not a number: {other}"))),
    }
}

pub fn lenient_i64<'de, D>(d: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = lenient_f64(d)?;
    Ok(v.map(|f| f.trunc() as i64))
}
