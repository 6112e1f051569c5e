//! HTTP routes.
//!
//! Every collection route is mounted under `/{domain}` where domain is one
//! of `spots`, `foods` or `events`. Query parameters are camelCase.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tourcache_core::{
    CacheAge, CardView, DetailView, Domain, Language, NearbyPage, NearbyQuery, Page, SearchFilter,
    SearchPage, TourService,
};

use crate::error::{ApiError, ApiResult};

type AppState = Arc<TourService>;

pub fn router(service: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/:domain/home", get(home))
        .route("/:domain/nearby", get(nearby))
        .route("/:domain/related", get(related))
        .route("/:domain/search", get(search))
        .route("/:domain/:id", get(detail))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(service)
}

fn domain(segment: &str) -> ApiResult<Domain> {
    Domain::from_segment(segment).ok_or_else(|| ApiError::unknown_domain(segment))
}

#[derive(Debug, Default, Deserialize)]
struct LangParams {
    lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NearbyParams {
    lat: Option<String>,
    lon: Option<String>,
    radius: Option<String>,
    exclude_id: Option<String>,
    page: Option<String>,
    limit: Option<String>,
    lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelatedParams {
    city: Option<String>,
    exclude_id: Option<String>,
    lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchParams {
    city: Option<String>,
    keyword: Option<String>,
    class1: Option<String>,
    date: Option<String>,
    exclude_id: Option<String>,
    page: Option<String>,
    limit: Option<String>,
    lang: Option<String>,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    caches: Vec<CacheAge>,
}

async fn healthz(State(service): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        caches: service.cache_ages(),
    })
}

async fn detail(
    State(service): State<AppState>,
    Path((segment, id)): Path<(String, String)>,
    Query(params): Query<LangParams>,
) -> ApiResult<Json<DetailView>> {
    let lang = Language::from_code(params.lang.as_deref());
    let view = service.detail(domain(&segment)?, &id, lang).await?;
    Ok(Json(view))
}

async fn home(
    State(service): State<AppState>,
    Path(segment): Path<String>,
    Query(params): Query<LangParams>,
) -> ApiResult<Json<Vec<CardView>>> {
    let lang = Language::from_code(params.lang.as_deref());
    let cards = service.home(domain(&segment)?, lang).await?;
    Ok(Json(Vec::clone(&cards)))
}

async fn nearby(
    State(service): State<AppState>,
    Path(segment): Path<String>,
    Query(params): Query<NearbyParams>,
) -> ApiResult<Json<NearbyPage>> {
    let domain = domain(&segment)?;
    let query = NearbyQuery::parse(
        params.lat.as_deref(),
        params.lon.as_deref(),
        params.radius.as_deref(),
        params.exclude_id.as_deref(),
        Page::parse(params.page.as_deref(), params.limit.as_deref()),
    )?;
    let lang = Language::from_code(params.lang.as_deref());
    Ok(Json(service.nearby(domain, &query, lang).await?))
}

async fn related(
    State(service): State<AppState>,
    Path(segment): Path<String>,
    Query(params): Query<RelatedParams>,
) -> ApiResult<Json<Vec<CardView>>> {
    let lang = Language::from_code(params.lang.as_deref());
    let cards = service
        .related(
            domain(&segment)?,
            params.city.as_deref(),
            params.exclude_id.as_deref(),
            lang,
        )
        .await?;
    Ok(Json(cards))
}

async fn search(
    State(service): State<AppState>,
    Path(segment): Path<String>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchPage>> {
    let domain = domain(&segment)?;
    let filter = SearchFilter::parse(
        params.keyword.as_deref(),
        params.class1.as_deref(),
        params.city.as_deref(),
        params.date.as_deref(),
        params.exclude_id.as_deref(),
    )?;
    let page = Page::parse(params.page.as_deref(), params.limit.as_deref());
    let lang = Language::from_code(params.lang.as_deref());
    Ok(Json(service.search(domain, &filter, page, lang).await?))
}
