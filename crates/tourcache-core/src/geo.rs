//! Great-circle distance and radius search over source records.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::models::{Domain, Language, Overlay, SourceRecord};
use crate::search::Page;
use crate::utils::{has_not_ended, round2};

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Search radius when the caller does not give one.
pub const DEFAULT_RADIUS_KM: f64 = 3.0;

/// Haversine distance between two points given in degrees.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    EARTH_RADIUS_KM * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

/// A validated nearby request.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
    pub exclude_id: Option<String>,
    pub page: Page,
}

impl NearbyQuery {
    /// Parse raw query values. `lat` and `lon` are required.
    pub fn parse(
        lat: Option<&str>,
        lon: Option<&str>,
        radius: Option<&str>,
        exclude_id: Option<&str>,
        page: Page,
    ) -> Result<Self> {
        let lat = parse_coordinate("lat", lat, 90.0)?;
        let lon = parse_coordinate("lon", lon, 180.0)?;

        let radius_km = match radius.map(str::trim).filter(|r| !r.is_empty()) {
            None => DEFAULT_RADIUS_KM,
            Some(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|r| r.is_finite() && *r >= 0.0)
                .ok_or_else(|| Error::invalid("radius", format!("'{}' is not a distance", raw)))?,
        };

        Ok(Self {
            lat,
            lon,
            radius_km,
            exclude_id: exclude_id
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(String::from),
            page,
        })
    }
}

fn parse_coordinate(name: &'static str, value: Option<&str>, bound: f64) -> Result<f64> {
    let raw = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(Error::MissingParameter(name))?;

    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.abs() <= bound)
        .ok_or_else(|| Error::invalid(name, format!("'{}' is not a coordinate", raw)))
}

/// One page of records within the radius, nearest first.
#[derive(Debug)]
pub struct NearbyMatches<'a, R> {
    /// Matches across all pages.
    pub total: usize,
    pub items: Vec<(&'a R, f64)>,
}

/// Records with a valid position within `query.radius_km` of the query point.
///
/// Both the exact and the 2-decimal distance must be within the radius.
/// Events must also have a city and must not have ended. Ties keep the
/// upstream order.
pub fn find_nearby<'a, R: SourceRecord>(
    records: &'a [R],
    query: &NearbyQuery,
    now: DateTime<Utc>,
) -> NearbyMatches<'a, R> {
    let mut matches: Vec<(&R, f64)> = records
        .iter()
        .filter(|r| query.exclude_id.as_deref() != Some(r.id()))
        .filter(|r| {
            R::DOMAIN != Domain::Events || (r.city().is_some() && has_not_ended(r.end_time(), now))
        })
        .filter_map(|r| {
            let (lat, lon) = r.coords()?;
            let distance = haversine_km(query.lat, query.lon, lat, lon);
            // The reported distance is rounded, and it must stay within the radius too
            (distance <= query.radius_km && round2(distance) <= query.radius_km).then_some((r, distance))
        })
        .collect();

    matches.sort_by(|a, b| a.1.total_cmp(&b.1));

    NearbyMatches {
        total: matches.len(),
        items: query.page.apply(matches),
    }
}

/// Display name of the record the nearby search started from.
///
/// Overlay names in `lang` are checked across all domains first, then the
/// source names; the first non-empty one wins.
pub fn nearby_source_name(
    id: &str,
    lang: Language,
    overlays: &[&Overlay],
    source_names: &[Option<&str>],
) -> String {
    overlays
        .iter()
        .find_map(|overlay| overlay.get(id).and_then(|t| t.name.get(lang)))
        .or_else(|| source_names.iter().flatten().copied().find(|n| !n.trim().is_empty()))
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventRecord, Position, SpotRecord, TranslationRecord};
    use crate::utils::parse_timestamp;
    use serde_json::json;

    const TAIPEI: (f64, f64) = (25.0330, 121.5654);
    const KAOHSIUNG: (f64, f64) = (22.6273, 120.3014);

    fn now() -> DateTime<Utc> {
        parse_timestamp("2025-01-02T00:00:00Z").unwrap().with_timezone(&Utc)
    }

    fn spot_at(id: &str, lat: f64, lon: f64) -> SpotRecord {
        SpotRecord {
            id: id.into(),
            position: Some(Position {
                lat: Some(lat),
                lon: Some(lon),
            }),
            ..Default::default()
        }
    }

    fn query(radius: &str, page: Page) -> NearbyQuery {
        NearbyQuery::parse(Some("25.0330"), Some("121.5654"), Some(radius), None, page).unwrap()
    }

    #[test]
    fn test_haversine_same_point_is_zero() {
        for (lat, lon) in [TAIPEI, KAOHSIUNG, (0.0, 0.0), (-33.86, 151.2)] {
            assert_eq!(haversine_km(lat, lon, lat, lon), 0.0);
        }
    }

    #[test]
    fn test_haversine_symmetric() {
        let ab = haversine_km(TAIPEI.0, TAIPEI.1, KAOHSIUNG.0, KAOHSIUNG.1);
        let ba = haversine_km(KAOHSIUNG.0, KAOHSIUNG.1, TAIPEI.0, TAIPEI.1);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_taipei_kaohsiung() {
        let d = haversine_km(TAIPEI.0, TAIPEI.1, KAOHSIUNG.0, KAOHSIUNG.1);
        assert!((250.0..=300.0).contains(&d), "distance was {}", d);
    }

    #[test]
    fn test_find_nearby_filters_sorts_and_paginates() {
        let spots = vec![
            spot_at("far", 25.10, 121.60),
            spot_at("near", 25.034, 121.566),
            spot_at("mid", 25.040, 121.570),
            spot_at("no-position", 0.0, 121.5654),
            spot_at("south", KAOHSIUNG.0, KAOHSIUNG.1),
        ];

        let q = query("3", Page::default());
        let result = find_nearby(&spots, &q, now());
        let ids: Vec<&str> = result.items.iter().map(|(s, _)| s.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid"]);
        assert_eq!(result.total, 2);
        assert!(result.items.iter().all(|(_, d)| *d <= q.radius_km));

        let q = query("3", Page { page: 2, limit: 1 });
        let result = find_nearby(&spots, &q, now());
        assert_eq!(result.total, 2);
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].0.id, "mid");
    }

    #[test]
    fn test_find_nearby_reported_distance_within_radius() {
        let edge = vec![spot_at("edge", 25.02694, 121.5)];
        let d = haversine_km(25.0, 121.5, 25.02694, 121.5);
        assert!(d < round2(d));

        // Exact distance equals the radius, but the rounded one would exceed it
        let radius = d.to_string();
        let q = NearbyQuery::parse(Some("25.0"), Some("121.5"), Some(&radius), None, Page::default()).unwrap();
        assert_eq!(find_nearby(&edge, &q, now()).total, 0);

        let q = NearbyQuery::parse(Some("25.0"), Some("121.5"), Some("3.01"), None, Page::default()).unwrap();
        let result = find_nearby(&edge, &q, now());
        assert_eq!(result.total, 1);
        assert!(round2(result.items[0].1) <= q.radius_km);
    }

    #[test]
    fn test_find_nearby_excludes_origin() {
        let spots = vec![spot_at("S1", TAIPEI.0, TAIPEI.1), spot_at("S2", 25.034, 121.566)];
        let q = NearbyQuery::parse(Some("25.0330"), Some("121.5654"), None, Some("S1"), Page::default())
            .unwrap();
        let result = find_nearby(&spots, &q, now());
        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].0.id, "S2");
    }

    #[test]
    fn test_find_nearby_events_need_city_and_future_end() {
        let event = |id: &str, city: Option<&str>, end: &str| EventRecord {
            id: id.into(),
            city: city.map(String::from),
            end_time: Some(end.into()),
            position: Some(Position {
                lat: Some(25.034),
                lon: Some(121.566),
            }),
            ..Default::default()
        };
        let events = vec![
            event("ok", Some("臺北市"), "2025-02-01T00:00:00+08:00"),
            event("ended", Some("臺北市"), "2024-12-31T00:00:00+08:00"),
            event("no-city", None, "2025-02-01T00:00:00+08:00"),
        ];
        let result = find_nearby(&events, &query("3", Page::default()), now());
        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].0.id, "ok");
    }

    #[test]
    fn test_nearby_query_validation() {
        let err = NearbyQuery::parse(None, Some("121.5"), None, None, Page::default()).unwrap_err();
        assert!(matches!(err, Error::MissingParameter("lat")));

        let err = NearbyQuery::parse(Some("25"), Some(""), None, None, Page::default()).unwrap_err();
        assert!(matches!(err, Error::MissingParameter("lon")));

        let err = NearbyQuery::parse(Some("north"), Some("121.5"), None, None, Page::default())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { name: "lat", .. }));

        let err = NearbyQuery::parse(Some("25"), Some("121.5"), Some("-1"), None, Page::default())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { name: "radius", .. }));

        let q = NearbyQuery::parse(Some("25"), Some("121.5"), None, Some(" "), Page::default()).unwrap();
        assert_eq!(q.radius_km, DEFAULT_RADIUS_KM);
        assert!(q.exclude_id.is_none());
    }

    #[test]
    fn test_nearby_source_name_prefers_overlays() {
        let spots = Overlay::new(TranslationRecord::parse_overlay(
            Domain::Spots,
            json!([{"ScenicSpotID": "S1", "ScenicSpotName_en": "Elephant Mountain"}]),
        ));
        let empty = Overlay::default();

        assert_eq!(
            nearby_source_name("S1", Language::EnUs, &[&spots, &empty, &empty], &[Some("象山"), None, None]),
            "Elephant Mountain"
        );
        assert_eq!(
            nearby_source_name("S1", Language::JaJp, &[&spots, &empty, &empty], &[Some("象山"), None, None]),
            "象山"
        );
        assert_eq!(
            nearby_source_name("X", Language::JaJp, &[&spots, &empty, &empty], &[None, None, None]),
            ""
        );
    }
}
