//! Time related utils.

/// DateTime in UTC, the only time zone signatures are computed in.
pub type DateTime = chrono::DateTime<chrono::Utc>;

/// Current UTC time.
#[inline]
pub fn now() -> DateTime {
    chrono::Utc::now()
}

/// Format time into date: `20220313`
pub fn format_date(t: DateTime) -> String {
    t.format("%Y%m%d").to_string()
}

/// Format time into ISO8601 basic format: `20220313T072004Z`
///
/// Sub-second precision is dropped.
pub fn format_iso8601(t: DateTime) -> String {
    t.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Format time into RFC3339: `2022-03-13T07:20:04Z`
pub fn format_rfc3339(t: DateTime) -> String {
    t.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
