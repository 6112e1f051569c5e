//! The request-facing facade.
//!
//! `TourService` owns every cache and is shared by all request handlers.
//! Each public operation takes a `Domain` and dispatches to a generic
//! implementation over the matching source record type.

use std::sync::Arc;

use futures::join;
use tracing::debug;

use crate::aggregate::{card_view, detail_view, event_card_view, merge, merge_all, nearby_item, MergedRecord};
use crate::api::{ApiClient, Endpoints};
use crate::auth::ClientCredentials;
use crate::cache::{CacheAge, CacheManager, CacheSettings, CachedSource, TtlCache};
use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::geo::{find_nearby, nearby_source_name, NearbyQuery};
use crate::models::{
    find_by_id, CardView, DetailView, Domain, EventRecord, FoodRecord, Language, NearbyPage,
    SearchPage, SourceRecord, SpotRecord,
};
use crate::search::{
    featured_order, filter_records, is_featured_candidate, matches_city, normalize_city,
    related_candidates, Page, SearchFilter,
};
use crate::selection::{Sampler, StableSelectionCache, HOME_SELECTION_SIZE};

/// Everything needed to build a `TourService`.
#[derive(Debug, Clone, Default)]
pub struct TourConfig {
    pub endpoints: Endpoints,
    pub credentials: ClientCredentials,
    pub cache: CacheSettings,
    /// Fixed seed for home and related sampling; random when unset.
    pub selection_seed: Option<u64>,
}

type IndexKey = (Domain, Language, Option<String>);

pub struct TourService {
    cache: CacheManager,
    selection: StableSelectionCache,
    sampler: Sampler,
    home_views: TtlCache<(Domain, Language), Vec<CardView>>,
    search_index: TtlCache<IndexKey, Vec<MergedRecord>>,
    event_search_index: TtlCache<IndexKey, Vec<MergedRecord>>,
    clock: Arc<dyn Clock>,
}

impl TourService {
    pub fn new(config: TourConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: TourConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let client = ApiClient::new(config.endpoints).map_err(Error::Client)?;
        let settings = config.cache;

        Ok(Self {
            selection: StableSelectionCache::new(settings.home_ttl, clock.clone()),
            sampler: Sampler::new(config.selection_seed),
            home_views: TtlCache::new("home", settings.home_ttl, clock.clone()),
            search_index: TtlCache::new("search", settings.search_ttl, clock.clone()),
            event_search_index: TtlCache::new("event-search", settings.event_search_ttl, clock.clone()),
            cache: CacheManager::new(client, config.credentials, settings, clock.clone()),
            clock,
        })
    }

    pub fn cache_ages(&self) -> Vec<CacheAge> {
        self.cache.cache_ages()
    }

    // ===== Detail =====

    /// One merged record. Fails with `NotFound` when the ID is missing from the
    /// source set or from a loaded overlay.
    pub async fn detail(&self, domain: Domain, id: &str, lang: Language) -> Result<DetailView> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::MissingParameter("id"));
        }

        match domain {
            Domain::Spots => self.detail_of::<SpotRecord>(id, lang).await,
            Domain::Foods => self.detail_of::<FoodRecord>(id, lang).await,
            Domain::Events => self.detail_of::<EventRecord>(id, lang).await,
        }
    }

    async fn detail_of<R: CachedSource>(&self, id: &str, lang: Language) -> Result<DetailView> {
        let (sources, overlay) = join!(self.cache.source::<R>(), self.cache.overlay(R::DOMAIN));
        let sources = sources?;

        let not_found = || Error::NotFound {
            domain: R::DOMAIN,
            id: id.to_string(),
        };

        let source = find_by_id(sources.as_slice(), id).ok_or_else(not_found)?;
        let translation = overlay.get(id);
        if translation.is_none() {
            // An empty overlay means it could not be loaded; serve source fields then
            if !overlay.is_empty() {
                return Err(not_found());
            }
            debug!(domain = %R::DOMAIN, id, "Overlay unavailable, using source fields");
        }

        Ok(detail_view(&merge(source, translation, lang), lang))
    }

    // ===== Home =====

    /// Up to four cards, pinned per domain for the home TTL.
    pub async fn home(&self, domain: Domain, lang: Language) -> Result<Arc<Vec<CardView>>> {
        self.home_views
            .get_or_refresh((domain, lang), || async move {
                match domain {
                    Domain::Spots => self.home_of::<SpotRecord>(lang).await,
                    Domain::Foods => self.home_of::<FoodRecord>(lang).await,
                    Domain::Events => self.event_home(lang).await,
                }
            })
            .await
    }

    /// Pinned IDs for the home listing of `domain`.
    pub async fn home_selection(&self, domain: Domain) -> Result<Arc<Vec<String>>> {
        match domain {
            Domain::Spots => self.random_selection::<SpotRecord>().await,
            Domain::Foods => self.random_selection::<FoodRecord>().await,
            Domain::Events => self.featured_selection().await,
        }
    }

    async fn random_selection<R: CachedSource>(&self) -> Result<Arc<Vec<String>>> {
        self.selection
            .select(R::DOMAIN, || async move {
                let sources = self.cache.source::<R>().await?;
                let pool: Vec<&str> = sources
                    .iter()
                    .filter(|r| r.is_showcase_ready())
                    .map(|r| r.id())
                    .collect();
                let picked = self.sampler.sample(&pool, HOME_SELECTION_SIZE);
                Ok(picked.into_iter().map(String::from).collect())
            })
            .await
    }

    async fn featured_selection(&self) -> Result<Arc<Vec<String>>> {
        self.selection
            .select(Domain::Events, || async move {
                let events = self.cache.source::<EventRecord>().await?;
                let now = self.clock.now();

                let mut candidates: Vec<MergedRecord> = events
                    .iter()
                    .map(|e| merge(e, None, Language::default()))
                    .filter(|r| is_featured_candidate(r, now))
                    .collect();
                featured_order(&mut candidates, now);

                Ok(candidates
                    .into_iter()
                    .take(HOME_SELECTION_SIZE)
                    .map(|r| r.id)
                    .collect())
            })
            .await
    }

    async fn home_of<R: CachedSource>(&self, lang: Language) -> Result<Vec<CardView>> {
        let ids = self.random_selection::<R>().await?;
        let (sources, overlay) = join!(self.cache.source::<R>(), self.cache.overlay(R::DOMAIN));
        let sources = sources?;

        // Pinned IDs that have since left the source set are skipped
        Ok(ids
            .iter()
            .filter_map(|id| find_by_id(sources.as_slice(), id))
            .map(|r| card_view(&merge(r, overlay.get(r.id()), lang)))
            .collect())
    }

    async fn event_home(&self, lang: Language) -> Result<Vec<CardView>> {
        let ids = self.featured_selection().await?;
        let (events, overlay) = join!(
            self.cache.source::<EventRecord>(),
            self.cache.overlay(Domain::Events)
        );
        let events = events?;

        Ok(ids
            .iter()
            .filter_map(|id| find_by_id(events.as_slice(), id))
            .map(|e| event_card_view(&merge(e, overlay.get(e.id()), lang)))
            .filter(|card| card.date.is_some() && !card.city.is_empty())
            .collect())
    }

    // ===== Nearby =====

    pub async fn nearby(&self, domain: Domain, query: &NearbyQuery, lang: Language) -> Result<NearbyPage> {
        match domain {
            Domain::Spots => self.nearby_of::<SpotRecord>(query, lang).await,
            Domain::Foods => self.nearby_of::<FoodRecord>(query, lang).await,
            Domain::Events => self.nearby_of::<EventRecord>(query, lang).await,
        }
    }

    async fn nearby_of<R: CachedSource>(&self, query: &NearbyQuery, lang: Language) -> Result<NearbyPage> {
        let (sources, overlay) = join!(self.cache.source::<R>(), self.cache.overlay(R::DOMAIN));
        let sources = sources?;

        let matches = find_nearby(sources.as_slice(), query, self.clock.now());
        let data = matches
            .items
            .iter()
            .map(|(r, distance)| nearby_item(&merge(*r, overlay.get(r.id()), lang), *distance))
            .collect();

        let nearby_source_name = match query.exclude_id.as_deref() {
            Some(id) => self.source_name(id, lang).await,
            None => String::new(),
        };

        Ok(NearbyPage {
            total: matches.total,
            data,
            nearby_source_name,
        })
    }

    /// Display name of `id` in any domain. Upstream failures leave the label empty.
    async fn source_name(&self, id: &str, lang: Language) -> String {
        let (spot_overlay, food_overlay, event_overlay) = join!(
            self.cache.overlay(Domain::Spots),
            self.cache.overlay(Domain::Foods),
            self.cache.overlay(Domain::Events)
        );
        let (spots, foods, events) = join!(
            self.cache.source::<SpotRecord>(),
            self.cache.source::<FoodRecord>(),
            self.cache.source::<EventRecord>()
        );

        let spot = spots.as_ref().ok().and_then(|s| find_by_id(s.as_slice(), id));
        let food = foods.as_ref().ok().and_then(|s| find_by_id(s.as_slice(), id));
        let event = events.as_ref().ok().and_then(|s| find_by_id(s.as_slice(), id));

        nearby_source_name(
            id,
            lang,
            &[&*spot_overlay, &*food_overlay, &*event_overlay],
            &[
                spot.and_then(|r| r.name()),
                food.and_then(|r| r.name()),
                event.and_then(|r| r.name()),
            ],
        )
    }

    // ===== Related =====

    /// Up to four random records in the same city, excluding `exclude_id`.
    pub async fn related(
        &self,
        domain: Domain,
        city: Option<&str>,
        exclude_id: Option<&str>,
        lang: Language,
    ) -> Result<Vec<CardView>> {
        let city = city
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(Error::MissingParameter("city"))?;
        let exclude_id = exclude_id.map(str::trim).filter(|id| !id.is_empty());

        match domain {
            Domain::Spots => self.related_of::<SpotRecord>(city, exclude_id, lang).await,
            Domain::Foods => self.related_of::<FoodRecord>(city, exclude_id, lang).await,
            Domain::Events => self.related_of::<EventRecord>(city, exclude_id, lang).await,
        }
    }

    async fn related_of<R: CachedSource>(
        &self,
        city: &str,
        exclude_id: Option<&str>,
        lang: Language,
    ) -> Result<Vec<CardView>> {
        let (sources, overlay) = join!(self.cache.source::<R>(), self.cache.overlay(R::DOMAIN));
        let sources = sources?;

        let city = normalize_city(&overlay, city, lang);
        let candidates = related_candidates(sources.as_slice(), &city, exclude_id, self.clock.now());
        debug!(domain = %R::DOMAIN, city = %city, candidates = candidates.len(), "Related candidates");

        Ok(self
            .sampler
            .sample(&candidates, HOME_SELECTION_SIZE)
            .into_iter()
            .map(|r| card_view(&merge(r, overlay.get(r.id()), lang)))
            .collect())
    }

    // ===== Search =====

    pub async fn search(
        &self,
        domain: Domain,
        filter: &SearchFilter,
        page: Page,
        lang: Language,
    ) -> Result<SearchPage> {
        let index = self.search_index(domain, lang, filter.city.clone()).await?;
        let matches = filter_records(&index, filter, self.clock.now());

        Ok(SearchPage {
            total: matches.len(),
            data: page.apply(matches).into_iter().map(card_view).collect(),
        })
    }

    /// Merged records for one language, narrowed to `city` when given.
    async fn search_index(
        &self,
        domain: Domain,
        lang: Language,
        city: Option<String>,
    ) -> Result<Arc<Vec<MergedRecord>>> {
        let cache = match domain {
            Domain::Events => &self.event_search_index,
            Domain::Spots | Domain::Foods => &self.search_index,
        };

        cache
            .get_or_refresh((domain, lang, city.clone()), || async move {
                let merged = match domain {
                    Domain::Spots => self.merged::<SpotRecord>(lang).await?,
                    Domain::Foods => self.merged::<FoodRecord>(lang).await?,
                    Domain::Events => self.merged::<EventRecord>(lang).await?,
                };
                Ok(match city.as_deref() {
                    Some(city) => merged.into_iter().filter(|r| matches_city(r, city)).collect(),
                    None => merged,
                })
            })
            .await
    }

    async fn merged<R: CachedSource>(&self, lang: Language) -> Result<Vec<MergedRecord>> {
        let (sources, overlay) = join!(self.cache.source::<R>(), self.cache.overlay(R::DOMAIN));
        Ok(merge_all(sources?.as_slice(), &overlay, lang))
    }
}
