//! Keyword, category, city and date filtering over merged records.
//!
//! Also holds pagination, the featured ordering used by the event home
//! listing and candidate selection for the related-items endpoint.

use chrono::{DateTime, FixedOffset, Utc};

use crate::aggregate::MergedRecord;
use crate::error::{Error, Result};
use crate::models::{Domain, Language, Overlay, SourceRecord};
use crate::utils::{has_not_ended, parse_timestamp};

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 12;

/// 1-based page and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: usize,
    pub limit: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Page {
    /// Missing, zero and unparsable values fall back to the defaults.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Self {
        fn positive(value: Option<&str>) -> Option<usize> {
            value
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|v| *v > 0)
        }

        Self {
            page: positive(page).unwrap_or(DEFAULT_PAGE),
            limit: positive(limit).unwrap_or(DEFAULT_LIMIT),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// The `[offset, offset + limit)` slice of `items`.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().skip(self.offset()).take(self.limit).collect()
    }
}

/// Search criteria. Every criterion is optional; an empty filter matches
/// every record that has a city.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    /// Whitespace-separated terms, lowercased. Any term may match.
    pub terms: Vec<String>,
    pub category: Option<String>,
    pub city: Option<String>,
    /// Events only: must fall within the event's start/end window.
    pub date: Option<DateTime<FixedOffset>>,
    pub exclude_id: Option<String>,
}

impl SearchFilter {
    /// Build a filter from raw query values. Blank values are ignored; an
    /// unparsable `date` is rejected.
    pub fn parse(
        keyword: Option<&str>,
        category: Option<&str>,
        city: Option<&str>,
        date: Option<&str>,
        exclude_id: Option<&str>,
    ) -> Result<Self> {
        let present = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
        };

        let date = match present(date) {
            Some(raw) => Some(
                parse_timestamp(&raw)
                    .ok_or_else(|| Error::invalid("date", format!("unrecognized date '{}'", raw)))?,
            ),
            None => None,
        };

        Ok(Self {
            terms: keyword
                .unwrap_or_default()
                .split_whitespace()
                .map(str::to_lowercase)
                .collect(),
            category: present(category),
            city: present(city),
            date,
            exclude_id: present(exclude_id),
        })
    }

    pub fn matches(&self, record: &MergedRecord, now: DateTime<Utc>) -> bool {
        if record.city.is_none() {
            return false;
        }
        if self.exclude_id.as_deref() == Some(record.id.as_str()) {
            return false;
        }
        if let Some(city) = self.city.as_deref() {
            if !matches_city(record, city) {
                return false;
            }
        }
        if let Some(category) = self.category.as_deref() {
            let in_slots = |tags: &[String]| tags.iter().any(|t| t == category);
            if !in_slots(&record.source_categories) && !in_slots(&record.category_tags) {
                return false;
            }
        }
        if !self.terms.is_empty() {
            let name = record.name.to_lowercase();
            if !self.terms.iter().any(|term| name.contains(term.as_str())) {
                return false;
            }
        }
        if record.domain == Domain::Events {
            if !has_not_ended(record.end_time.as_deref(), now) {
                return false;
            }
            if let Some(date) = self.date {
                if !in_window(record, date) {
                    return false;
                }
            }
        }
        true
    }
}

/// City equality against the default-language source city or the resolved city.
pub fn matches_city(record: &MergedRecord, city: &str) -> bool {
    record.source_city.as_deref() == Some(city) || record.city.as_deref() == Some(city)
}

/// `start <= date <= end`; a missing bound is open.
fn in_window(record: &MergedRecord, date: DateTime<FixedOffset>) -> bool {
    let start = record.start_time.as_deref().and_then(parse_timestamp);
    let end = record.end_time.as_deref().and_then(parse_timestamp);
    start.map_or(true, |s| date >= s) && end.map_or(true, |e| date <= e)
}

pub fn filter_records<'a>(
    records: &'a [MergedRecord],
    filter: &SearchFilter,
    now: DateTime<Utc>,
) -> Vec<&'a MergedRecord> {
    records.iter().filter(|r| filter.matches(r, now)).collect()
}

/// Event records eligible for the home listing: a picture, a city and not ended.
pub fn is_featured_candidate(record: &MergedRecord, now: DateTime<Utc>) -> bool {
    !record.images.is_empty()
        && record.source_city.is_some()
        && has_not_ended(record.end_time.as_deref(), now)
}

/// Ongoing events first, then ascending by start time.
/// Records without a parsable start sort after the timed ones in their tier.
pub fn featured_order(records: &mut [MergedRecord], now: DateTime<Utc>) {
    let now = now.fixed_offset();
    records.sort_by_cached_key(|r| {
        let start = r.start_time.as_deref().and_then(parse_timestamp);
        let end = r.end_time.as_deref().and_then(parse_timestamp);
        let ongoing = match (start, end) {
            (Some(s), Some(e)) => s <= now && now <= e,
            _ => false,
        };
        (!ongoing, start.is_none(), start)
    });
}

/// The default-language city for a possibly localized city name.
///
/// Looks for an overlay record whose city in `lang` equals the input and
/// returns that record's default-language city; otherwise the input itself.
pub fn normalize_city(overlay: &Overlay, city: &str, lang: Language) -> String {
    overlay
        .iter()
        .find(|t| t.city.get(lang) == Some(city))
        .and_then(|t| t.city.get(Language::default()))
        .unwrap_or(city)
        .to_string()
}

/// Source records in the same city as `city` (default language), for the related listing.
pub fn related_candidates<'a, R: SourceRecord>(
    records: &'a [R],
    city: &str,
    exclude_id: Option<&str>,
    now: DateTime<Utc>,
) -> Vec<&'a R> {
    records
        .iter()
        .filter(|r| exclude_id != Some(r.id()))
        .filter(|r| {
            r.city().is_some_and(|c| c.contains(city))
                || r.address().is_some_and(|a| a.starts_with(city))
        })
        .filter(|r| R::DOMAIN != Domain::Events || has_not_ended(r.end_time(), now))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::merge;
    use crate::models::{EventRecord, FoodRecord, Pictures, SpotRecord, TranslationRecord};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        parse_timestamp("2025-01-02T00:00:00Z").unwrap().with_timezone(&Utc)
    }

    fn spot(id: &str, name: &str, city: Option<&str>, class1: &str) -> MergedRecord {
        let record = SpotRecord {
            id: id.into(),
            name: Some(name.into()),
            city: city.map(String::from),
            class1: Some(class1.into()),
            ..Default::default()
        };
        merge(&record, None, Language::ZhTw)
    }

    fn event(id: &str, start: Option<&str>, end: Option<&str>) -> MergedRecord {
        let record = EventRecord {
            id: id.into(),
            name: Some(format!("活動 {}", id)),
            city: Some("臺南市".into()),
            start_time: start.map(String::from),
            end_time: end.map(String::from),
            picture: Pictures::new(vec!["https://img/e.jpg".into()]),
            ..Default::default()
        };
        merge(&record, None, Language::ZhTw)
    }

    fn ids(records: &[&MergedRecord]) -> Vec<String> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_page_parse_defaults() {
        assert_eq!(Page::parse(None, None), Page::default());
        assert_eq!(Page::parse(Some("0"), Some("abc")), Page { page: 1, limit: 12 });
        assert_eq!(Page::parse(Some("3"), Some("5")), Page { page: 3, limit: 5 });
        assert_eq!(Page::parse(Some("-1"), Some(" 4 ")), Page { page: 1, limit: 4 });
    }

    #[test]
    fn test_pages_partition_the_full_set() {
        let items: Vec<u32> = (0..29).collect();
        let mut seen = Vec::new();
        for page in 1..=4 {
            seen.extend(Page { page, limit: 8 }.apply(items.clone()));
        }
        assert_eq!(seen, items);
        assert!(Page { page: 5, limit: 8 }.apply(items).is_empty());
    }

    #[test]
    fn test_keyword_any_term_case_insensitive() {
        let records = vec![
            spot("S1", "Taipei 101", Some("臺北市"), "都會公園類"),
            spot("S2", "Night Market", Some("臺北市"), "都會公園類"),
            spot("S3", "Temple", Some("臺北市"), "廟宇類"),
        ];
        let filter = SearchFilter::parse(Some("market  101"), None, None, None, None).unwrap();
        assert_eq!(ids(&filter_records(&records, &filter, now())), vec!["S1", "S2"]);

        let all = SearchFilter::parse(Some("  "), None, None, None, None).unwrap();
        assert_eq!(filter_records(&records, &all, now()).len(), 3);
    }

    #[test]
    fn test_category_city_and_exclusion() {
        let records = vec![
            spot("S1", "A", Some("臺北市"), "廟宇類"),
            spot("S2", "B", Some("新北市"), "廟宇類"),
            spot("S3", "C", Some("臺北市"), "自然風景類"),
            spot("S4", "D", None, "廟宇類"),
            spot("S5", "E", Some("臺北市"), "廟宇類"),
        ];
        let filter =
            SearchFilter::parse(None, Some("廟宇類"), Some("臺北市"), None, Some("S5")).unwrap();
        assert_eq!(ids(&filter_records(&records, &filter, now())), vec!["S1"]);
    }

    #[test]
    fn test_city_matches_default_or_resolved() {
        let t = TranslationRecord::from_raw(
            Domain::Foods,
            json!({"RestaurantID": "F1", "City_en": "Tainan City"}).as_object().unwrap(),
        )
        .unwrap();
        let food = FoodRecord {
            id: "F1".into(),
            city: Some("臺南市".into()),
            ..Default::default()
        };
        let record = merge(&food, Some(&t), Language::EnUs);
        assert!(matches_city(&record, "臺南市"));
        assert!(matches_city(&record, "Tainan City"));
        assert!(!matches_city(&record, "Tainan"));
    }

    #[test]
    fn test_event_date_window() {
        let records = vec![event("A1", Some("2025-01-01T00:00"), Some("2025-01-05T00:00"))];

        let inside = SearchFilter::parse(None, None, None, Some("2025-01-03"), None).unwrap();
        assert_eq!(filter_records(&records, &inside, now()).len(), 1);

        let outside = SearchFilter::parse(None, None, None, Some("2025-02-01"), None).unwrap();
        assert!(filter_records(&records, &outside, now()).is_empty());
    }

    #[test]
    fn test_event_without_start_passes_date_lower_bound() {
        let records = vec![event("A1", None, Some("2025-03-01T00:00:00+08:00"))];
        let filter = SearchFilter::parse(None, None, None, Some("2025-01-03"), None).unwrap();
        assert_eq!(filter_records(&records, &filter, now()).len(), 1);
    }

    #[test]
    fn test_ended_events_excluded() {
        let records = vec![
            event("A1", Some("2024-12-01T00:00"), Some("2025-01-01T00:00")),
            event("A2", Some("2024-12-01T00:00"), None),
        ];
        assert!(filter_records(&records, &SearchFilter::default(), now()).is_empty());
    }

    #[test]
    fn test_invalid_date_rejected() {
        let err = SearchFilter::parse(None, None, None, Some("someday"), None).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { name: "date", .. }));
    }

    #[test]
    fn test_featured_order_ongoing_first() {
        let mut records = vec![
            event("upcoming-late", Some("2025-03-01T00:00"), Some("2025-03-05T00:00")),
            event("ongoing-late", Some("2025-01-01T00:00"), Some("2025-01-10T00:00")),
            event("untimed", None, Some("2025-05-01T00:00")),
            event("upcoming-early", Some("2025-02-01T00:00"), Some("2025-02-05T00:00")),
            event("ongoing-early", Some("2024-12-01T00:00"), Some("2025-01-10T00:00")),
        ];
        featured_order(&mut records, now());
        let order: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            order,
            vec!["ongoing-early", "ongoing-late", "upcoming-early", "upcoming-late", "untimed"]
        );
        assert!(records.iter().all(|r| is_featured_candidate(r, now())));
    }

    #[test]
    fn test_normalize_city_through_overlay() {
        let overlay = Overlay::new(TranslationRecord::parse_overlay(
            Domain::Spots,
            json!([{"ScenicSpotID": "S1", "City": "臺北市", "City_en": "Taipei City"}]),
        ));
        assert_eq!(normalize_city(&overlay, "Taipei City", Language::EnUs), "臺北市");
        assert_eq!(normalize_city(&overlay, "臺中市", Language::EnUs), "臺中市");
    }

    #[test]
    fn test_related_candidates_city_or_address_prefix() {
        let spots = vec![
            SpotRecord {
                id: "S1".into(),
                city: Some("臺北市".into()),
                ..Default::default()
            },
            SpotRecord {
                id: "S2".into(),
                address: Some("臺北市中正區".into()),
                ..Default::default()
            },
            SpotRecord {
                id: "S3".into(),
                city: Some("臺中市".into()),
                ..Default::default()
            },
            SpotRecord {
                id: "S4".into(),
                city: Some("臺北市".into()),
                ..Default::default()
            },
        ];
        let found = related_candidates(&spots, "臺北市", Some("S4"), now());
        let found: Vec<&str> = found.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(found, vec!["S1", "S2"]);
    }
}
