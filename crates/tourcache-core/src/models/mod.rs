//! Data models for the tourism feed.
//!
//! This module contains:
//!
//! - `Domain`, `Language`: the collection and display-language enums
//! - `SpotRecord`, `FoodRecord`, `EventRecord`: typed upstream records behind `SourceRecord`
//! - `TranslationRecord`, `Overlay`: per-ID localized overlay
//! - View types serialized to the UI: `DetailView`, `CardView`, `NearbyPage`, `SearchPage`

pub mod common;
pub mod domain;
pub mod event;
pub mod food;
pub mod record;
pub mod spot;
pub mod translation;
pub mod view;

pub use common::{LocalizedText, Pictures, Position, MAX_PICTURES};
pub use domain::{Domain, Language};
pub use event::EventRecord;
pub use food::FoodRecord;
pub use record::{find_by_id, SourceRecord};
pub use spot::SpotRecord;
pub use translation::{Overlay, TranslationRecord};
pub use view::{CardView, DetailView, NearbyItem, NearbyPage, SearchPage};
