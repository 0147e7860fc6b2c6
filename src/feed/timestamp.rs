//! Timestamp parsing for feed entries.
//!
//! Feeds in the wild use a handful of date layouts. We try a fixed, ordered
//! list and take the first that parses; anything else yields `None`, which
//! sorts the entry to the end of the list.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Layouts carrying a numeric offset, parsed with [`DateTime::parse_from_str`].
const OFFSET_LAYOUTS: &[&str] = &[
    // Ruby: "Mon Jan 02 15:04:05 -0700 2006"
    "%a %b %d %H:%M:%S %z %Y",
];

/// Layouts with a zone abbreviation or no zone at all. `%Z` only skips the
/// abbreviation, so these are interpreted as UTC.
const NAIVE_LAYOUTS: &[&str] = &[
    // RFC 1123 with a zone name chrono's RFC 2822 parser doesn't know (e.g. CEST)
    "%a, %d %b %Y %H:%M:%S %Z",
    // RFC 850: "Monday, 02-Jan-06 15:04:05 MST"
    "%A, %d-%b-%y %H:%M:%S %Z",
    // Unix date: "Mon Jan  2 15:04:05 MST 2006"
    "%a %b %e %H:%M:%S %Z %Y",
    // ANSI C: "Mon Jan  2 15:04:05 2006"
    "%a %b %e %H:%M:%S %Y",
];

/// Parses a feed timestamp, trying each known layout in order.
///
/// RFC 2822 (which covers RFC 1123/822 with or without numeric zones) and
/// RFC 3339 come first since they account for nearly every real feed.
pub fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for layout in OFFSET_LAYOUTS {
        if let Ok(dt) = DateTime::parse_from_str(raw, layout) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for layout in NAIVE_LAYOUTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, layout) {
            return Some(naive.and_utc());
        }
    }

    tracing::trace!(raw = %raw, "Unrecognized timestamp layout");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap()
    }

    #[test]
    fn test_rfc1123_gmt() {
        assert_eq!(
            parse_published("Mon, 02 Jan 2006 15:04:05 GMT"),
            Some(reference())
        );
    }

    #[test]
    fn test_rfc1123_numeric_zone() {
        assert_eq!(
            parse_published("Mon, 02 Jan 2006 08:04:05 -0700"),
            Some(reference())
        );
    }

    #[test]
    fn test_rfc3339() {
        assert_eq!(parse_published("2006-01-02T15:04:05Z"), Some(reference()));
        assert_eq!(
            parse_published("2006-01-02T17:04:05+02:00"),
            Some(reference())
        );
    }

    #[test]
    fn test_rfc3339_nano() {
        let parsed = parse_published("2006-01-02T15:04:05.999999999Z").unwrap();
        assert_eq!(parsed.timestamp(), reference().timestamp());
    }

    #[test]
    fn test_ruby_date() {
        assert_eq!(
            parse_published("Mon Jan 02 08:04:05 -0700 2006"),
            Some(reference())
        );
    }

    #[test]
    fn test_ansic_two_digit_day() {
        let expected = Utc.with_ymd_and_hms(2006, 1, 12, 15, 4, 5).unwrap();
        assert_eq!(parse_published("Thu Jan 12 15:04:05 2006"), Some(expected));
    }

    #[test]
    fn test_ansic_space_padded_day() {
        assert_eq!(parse_published("Mon Jan  2 15:04:05 2006"), Some(reference()));
    }

    #[test]
    fn test_unix_date() {
        assert_eq!(
            parse_published("Mon Jan  2 15:04:05 MST 2006"),
            Some(reference())
        );
    }

    #[test]
    fn test_rfc850() {
        assert_eq!(
            parse_published("Monday, 02-Jan-06 15:04:05 MST"),
            Some(reference())
        );
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        assert_eq!(
            parse_published("  2006-01-02T15:04:05Z\n"),
            Some(reference())
        );
    }

    #[test]
    fn test_unparseable_is_none() {
        assert_eq!(parse_published(""), None);
        assert_eq!(parse_published("yesterday"), None);
        assert_eq!(parse_published("2006/01/02"), None);
    }
}
