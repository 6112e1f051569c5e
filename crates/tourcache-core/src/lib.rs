//! tourcache core library.
//!
//! Fetches the TDX tourism collections and their translation overlays,
//! caches both with TTLs, and builds the localized views served by the
//! HTTP layer:
//!
//! - `api`, `auth`: upstream client and bearer-token cache
//! - `cache`: single-flight TTL caches for sources and overlays
//! - `aggregate`: source + overlay merge and view shaping
//! - `search`, `geo`, `selection`: filtering, radius search, home picks
//! - `service`: `TourService`, the facade used by request handlers

pub mod aggregate;
pub mod api;
pub mod auth;
pub mod cache;
pub mod clock;
pub mod error;
pub mod geo;
pub mod models;
pub mod search;
pub mod selection;
pub mod service;
pub mod utils;

pub use api::Endpoints;
pub use auth::ClientCredentials;
pub use cache::{CacheAge, CacheSettings};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use geo::NearbyQuery;
pub use models::{CardView, DetailView, Domain, Language, NearbyPage, SearchPage};
pub use search::{Page, SearchFilter};
pub use service::{TourConfig, TourService};
