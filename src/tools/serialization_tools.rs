use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Parses RFC 3339 dates, falling back to offset-less ISO date-times (and bare dates), which are taken as UTC.
pub fn parse_flexible_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw).ok().map(|d| d.with_timezone(&Utc))
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok().map(|n| n.and_utc()))
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0)).map(|n| n.and_utc()))
}

pub fn flexible_date_serializer<S: Serializer>(v: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&v.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

pub fn flexible_date_deserializer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_flexible_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", raw)))
}
