use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

/// Naive formats seen in the feed and in `date` query parameters.
const NAIVE_DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];
const NAIVE_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Parse an upstream or query timestamp.
///
/// RFC 3339 values keep their offset; naive values are read as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt);
    }

    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(naive.and_utc().fixed_offset());
        }
    }

    for fmt in NAIVE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|naive| naive.and_utc().fixed_offset());
        }
    }

    None
}

/// Whether an event end time is still ahead of (or equal to) `now`.
/// Missing and unparsable end times count as ended.
pub fn has_not_ended(end: Option<&str>, now: DateTime<Utc>) -> bool {
    end.and_then(parse_timestamp)
        .is_some_and(|end| end.with_timezone(&Utc) >= now)
}

/// "YYYY/MM/DD HH:mm" in the timestamp's own offset.
pub fn format_datetime(dt: &DateTime<FixedOffset>) -> String {
    dt.format("%Y/%m/%d %H:%M").to_string()
}

/// "YYYY/MM/DD" in the timestamp's own offset.
pub fn format_date(dt: &DateTime<FixedOffset>) -> String {
    dt.format("%Y/%m/%d").to_string()
}

/// "YYYY/MM/DD HH:mm - YYYY/MM/DD HH:mm" when both ends parse.
pub fn format_schedule(start: Option<&str>, end: Option<&str>) -> Option<String> {
    let start = start.and_then(parse_timestamp)?;
    let end = end.and_then(parse_timestamp)?;
    Some(format!("{} - {}", format_datetime(&start), format_datetime(&end)))
}

/// "YYYY/MM/DD - YYYY/MM/DD" when both ends parse.
pub fn format_date_range(start: Option<&str>, end: Option<&str>) -> Option<String> {
    let start = start.and_then(parse_timestamp)?;
    let end = end.and_then(parse_timestamp)?;
    Some(format!("{} - {}", format_date(&start), format_date(&end)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_variants() {
        let rfc = parse_timestamp("2025-01-01T09:00:00+08:00").unwrap();
        assert_eq!(rfc.offset().local_minus_utc(), 8 * 3600);

        let naive = parse_timestamp("2025-01-01T00:00").unwrap();
        assert_eq!(format_datetime(&naive), "2025/01/01 00:00");

        let date = parse_timestamp("2025-01-03").unwrap();
        assert_eq!(format_date(&date), "2025/01/03");

        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("next tuesday").is_none());
    }

    #[test]
    fn test_has_not_ended() {
        let now = parse_timestamp("2025-01-03T00:00:00Z").unwrap().with_timezone(&Utc);
        assert!(has_not_ended(Some("2025-01-05T00:00:00+08:00"), now));
        assert!(has_not_ended(Some("2025-01-03T08:00:00+08:00"), now));
        assert!(!has_not_ended(Some("2025-01-02T23:59:59Z"), now));
        assert!(!has_not_ended(None, now));
        assert!(!has_not_ended(Some("soon"), now));
    }

    #[test]
    fn test_format_schedule_keeps_source_offset() {
        let start = Some("2025-01-01T09:30:00+08:00");
        let end = Some("2025-01-05T18:00:00+08:00");
        assert_eq!(
            format_schedule(start, end).as_deref(),
            Some("2025/01/01 09:30 - 2025/01/05 18:00")
        );
        assert_eq!(
            format_date_range(start, end).as_deref(),
            Some("2025/01/01 - 2025/01/05")
        );
    }

    #[test]
    fn test_format_schedule_requires_both_times() {
        assert!(format_schedule(Some("2025-01-01T00:00:00+08:00"), None).is_none());
        assert!(format_date_range(None, None).is_none());
        assert!(format_date_range(Some("bad"), Some("2025-01-01")).is_none());
    }
}
