use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;
use tracing::{info, warn};

use super::TtlCache;
use crate::api::{ApiClient, ApiError};
use crate::auth::{ClientCredentials, TokenProvider};
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::models::{
    Domain, EventRecord, FoodRecord, Overlay, SourceRecord, SpotRecord, TranslationRecord,
};

/// TTLs for every cache class, plus the stale-on-error policy.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    pub source_ttl: Duration,
    pub overlay_ttl: Duration,
    pub home_ttl: Duration,
    pub search_ttl: Duration,
    pub event_search_ttl: Duration,
    /// Serve the previous payload when a refresh fails instead of erroring.
    pub serve_stale_on_error: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            source_ttl: Duration::hours(24),
            overlay_ttl: Duration::hours(24),
            home_ttl: Duration::hours(24),
            search_ttl: Duration::hours(24),
            event_search_ttl: Duration::hours(2),
            serve_stale_on_error: false,
        }
    }
}

/// Age of one populated cache entry, for the health endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheAge {
    pub cache: String,
    pub age: String,
}

/// Source records that have a slot in the `CacheManager`.
pub trait CachedSource: SourceRecord {
    fn source_cache(cache: &CacheManager) -> &TtlCache<(), Vec<Self>>;
}

impl CachedSource for SpotRecord {
    fn source_cache(cache: &CacheManager) -> &TtlCache<(), Vec<Self>> {
        &cache.spots
    }
}

impl CachedSource for FoodRecord {
    fn source_cache(cache: &CacheManager) -> &TtlCache<(), Vec<Self>> {
        &cache.foods
    }
}

impl CachedSource for EventRecord {
    fn source_cache(cache: &CacheManager) -> &TtlCache<(), Vec<Self>> {
        &cache.events
    }
}

/// Upstream source collections and translation overlays, each behind a TTL cache.
pub struct CacheManager {
    client: ApiClient,
    tokens: TokenProvider,
    settings: CacheSettings,
    clock: Arc<dyn Clock>,
    spots: TtlCache<(), Vec<SpotRecord>>,
    foods: TtlCache<(), Vec<FoodRecord>>,
    events: TtlCache<(), Vec<EventRecord>>,
    overlays: TtlCache<Domain, Overlay>,
}

impl CacheManager {
    pub fn new(
        client: ApiClient,
        credentials: ClientCredentials,
        settings: CacheSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let tokens = TokenProvider::new(client.clone(), credentials, clock.clone());
        Self {
            spots: TtlCache::new("spots", settings.source_ttl, clock.clone()),
            foods: TtlCache::new("foods", settings.source_ttl, clock.clone()),
            events: TtlCache::new("events", settings.source_ttl, clock.clone()),
            overlays: TtlCache::new("overlays", settings.overlay_ttl, clock.clone()),
            client,
            tokens,
            settings,
            clock,
        }
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    /// All upstream records of one domain.
    pub async fn source<R: CachedSource>(&self) -> Result<Arc<Vec<R>>> {
        R::source_cache(self)
            .get_or_refresh_with(
                (),
                |_| true,
                self.settings.serve_stale_on_error,
                || self.fetch_source::<R>(),
            )
            .await
    }

    async fn fetch_source<R: SourceRecord>(&self) -> Result<Vec<R>> {
        let domain = R::DOMAIN;
        let token = self.tokens.access_token().await.map_err(Error::UpstreamAuth)?;

        let records = match self.client.fetch_collection::<R>(domain, &token).await {
            Ok(records) => records,
            Err(source) => {
                if matches!(source, ApiError::Unauthorized) {
                    // Token was revoked early; the next request re-authenticates
                    self.tokens.invalidate().await;
                }
                warn!(domain = %domain, error = %source, "Upstream collection fetch failed");
                return Err(Error::UpstreamFetch { domain, source });
            }
        };

        info!(domain = %domain, count = records.len(), "Loaded upstream collection");
        Ok(records)
    }

    /// The translation overlay of one domain. Never fails: a load failure yields an empty overlay.
    pub async fn overlay(&self, domain: Domain) -> Arc<Overlay> {
        let result = self
            .overlays
            .get_or_refresh_with(
                domain,
                |overlay| is_usable_overlay(domain, overlay),
                self.settings.serve_stale_on_error,
                || self.load_overlay(domain),
            )
            .await;

        match result {
            Ok(overlay) => overlay,
            Err(e) => {
                warn!(domain = %domain, error = %e, "Translation overlay unavailable, using source fields");
                Arc::new(Overlay::default())
            }
        }
    }

    async fn load_overlay(&self, domain: Domain) -> std::result::Result<Overlay, ApiError> {
        let body = self.client.fetch_overlay(domain).await?;
        let mut records = TranslationRecord::parse_overlay(domain, body);

        if domain == Domain::Events && !records.is_empty() {
            match self.source::<EventRecord>().await {
                Ok(events) => merge_event_schedule(&mut records, &events),
                Err(e) => warn!(error = %e, "Event overlay loaded without schedule"),
            }
        }

        info!(domain = %domain, count = records.len(), "Loaded translation overlay");
        Ok(Overlay::new(records))
    }

    pub fn cache_ages(&self) -> Vec<CacheAge> {
        let now = self.clock.now();
        let mut ages = Vec::new();

        let sources = [
            (Domain::Spots, self.spots.peek(&()).map(|c| c.age_display(now))),
            (Domain::Foods, self.foods.peek(&()).map(|c| c.age_display(now))),
            (Domain::Events, self.events.peek(&()).map(|c| c.age_display(now))),
        ];
        for (domain, age) in sources {
            if let Some(age) = age {
                ages.push(CacheAge {
                    cache: format!("source:{}", domain),
                    age,
                });
            }
        }

        for domain in Domain::ALL {
            if let Some(cached) = self.overlays.peek(&domain) {
                ages.push(CacheAge {
                    cache: format!("overlay:{}", domain),
                    age: cached.age_display(now),
                });
            }
        }
        ages
    }
}

/// Overlays must be non-empty; event overlays need at least one record with a schedule.
fn is_usable_overlay(domain: Domain, overlay: &Overlay) -> bool {
    if overlay.is_empty() {
        return false;
    }
    domain != Domain::Events || overlay.iter().any(|t| t.has_schedule())
}

/// Copy upstream start/end times onto event overlay records, matched by ID.
fn merge_event_schedule(records: &mut [TranslationRecord], events: &[EventRecord]) {
    let by_id: HashMap<&str, &EventRecord> = events.iter().map(|e| (e.id(), e)).collect();
    for record in records {
        let event = by_id.get(record.id.as_str());
        record.start_time = event.and_then(|e| e.start_time()).map(String::from);
        record.end_time = event.and_then(|e| e.end_time()).map(String::from);
    }
}
