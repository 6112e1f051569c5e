//! JSON view types served to the UI layer.

use serde::{Deserialize, Serialize};

use super::Position;

/// Full record for `GET /{domain}/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct DetailView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub city: String,
    pub address: String,
    pub open_time: String,
    pub phone: String,
    pub website: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ticket_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub remarks: Option<String>,
    pub position: Option<Position>,
    pub images: Vec<String>,
    pub class_tags: Vec<String>,
}

/// Compact list entry used by home, related and search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct CardView {
    pub id: String,
    pub name: String,
    pub city: String,
    pub image: String,
    pub link: String,
    /// Event date range on the home listing.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NearbyItem {
    pub id: String,
    pub name: String,
    pub city: String,
    pub address: String,
    pub position: Option<Position>,
    pub image: String,
    pub description: String,
    pub link: String,
    /// Kilometers from the query point, rounded to 2 decimals.
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NearbyPage {
    pub total: usize,
    pub data: Vec<NearbyItem>,
    pub nearby_source_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SearchPage {
    pub total: usize,
    pub data: Vec<CardView>,
}
