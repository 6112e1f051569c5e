use std::fmt;

use serde::{Deserialize, Serialize};

/// The three record collections republished from the upstream feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Spots,
    Foods,
    Events,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Spots, Domain::Foods, Domain::Events];

    /// Path segment used by the produced API and the overlay file name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Spots => "spots",
            Domain::Foods => "foods",
            Domain::Events => "events",
        }
    }

    /// Inverse of `as_str`.
    pub fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == segment)
    }

    /// Upstream collection path under the tourism API base.
    pub fn collection_path(&self) -> &'static str {
        match self {
            Domain::Spots => "Tourism/ScenicSpot",
            Domain::Foods => "Tourism/Restaurant",
            Domain::Events => "Tourism/Activity",
        }
    }

    pub fn overlay_file(&self) -> String {
        format!("{}.json", self.as_str())
    }

    /// Primary key field name in both upstream and overlay records.
    pub fn id_field(&self) -> &'static str {
        match self {
            Domain::Spots => "ScenicSpotID",
            Domain::Foods => "RestaurantID",
            Domain::Events => "ActivityID",
        }
    }

    pub fn name_field(&self) -> &'static str {
        match self {
            Domain::Spots => "ScenicSpotName",
            Domain::Foods => "RestaurantName",
            Domain::Events => "ActivityName",
        }
    }

    /// Category field names, one per slot. Restaurants only carry a single `Class`.
    pub fn category_fields(&self) -> [Option<&'static str>; 2] {
        match self {
            Domain::Foods => [Some("Class"), None],
            Domain::Spots | Domain::Events => [Some("Class1"), Some("Class2")],
        }
    }

    pub fn link(&self, id: &str) -> String {
        format!("/{}/{}", self.as_str(), id)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported display languages. Unknown codes resolve to the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    ZhTw,
    EnUs,
    JaJp,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::ZhTw, Language::EnUs, Language::JaJp];

    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("en-US") => Language::EnUs,
            Some("ja-JP") => Language::JaJp,
            _ => Language::ZhTw,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::ZhTw => "zh-TW",
            Language::EnUs => "en-US",
            Language::JaJp => "ja-JP",
        }
    }

    /// Suffix appended to overlay field names for this language.
    pub fn suffix(&self) -> &'static str {
        match self {
            Language::ZhTw => "",
            Language::EnUs => "_en",
            Language::JaJp => "_ja",
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Language::ZhTw)
    }

    /// Replacement text for "24 hours" opening times.
    pub fn open_all_day(&self) -> &'static str {
        match self {
            Language::ZhTw => "全天候開放",
            Language::EnUs => "Open 24 hours",
            Language::JaJp => "24時間営業",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
