use std::collections::HashMap;

use serde::{ser::SerializeMap, Deserialize, Deserializer, Serialize, Serializer};

use super::Language;

/// Maximum number of numbered picture URLs carried by an upstream record.
pub const MAX_PICTURES: usize = 10;

/// Geographic position as delivered by the upstream feed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Position {
    #[serde(rename = "PositionLat", default)]
    pub lat: Option<f64>,
    #[serde(rename = "PositionLon", default)]
    pub lon: Option<f64>,
}

impl Position {
    /// Coordinates when both are present, finite and non-zero.
    pub fn coords(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon))
                if lat.is_finite() && lon.is_finite() && lat != 0.0 && lon != 0.0 =>
            {
                Some((lat, lon))
            }
            _ => None,
        }
    }
}

/// Ordered picture URLs parsed from `Picture.PictureUrl1..PictureUrl10`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pictures(Vec<String>);

impl Pictures {
    pub fn new(urls: Vec<String>) -> Self {
        Self(urls.into_iter().take(MAX_PICTURES).collect())
    }

    pub fn urls(&self) -> &[String] {
        &self.0
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for Pictures {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<HashMap<String, serde_json::Value>> = Option::deserialize(deserializer)?;
        let raw = raw.unwrap_or_default();
        let urls = (1..=MAX_PICTURES)
            .filter_map(|i| raw.get(&format!("PictureUrl{}", i)))
            .filter_map(|v| v.as_str())
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(String::from)
            .collect();
        Ok(Self(urls))
    }
}

impl Serialize for Pictures {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (i, url) in self.0.iter().enumerate() {
            map.serialize_entry(&format!("PictureUrl{}", i + 1), url)?;
        }
        map.end()
    }
}

/// One overlay field in every supported language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedText {
    pub zh: Option<String>,
    pub en: Option<String>,
    pub ja: Option<String>,
}

impl LocalizedText {
    /// Non-blank value for the given language, if any.
    pub fn get(&self, lang: Language) -> Option<&str> {
        let value = match lang {
            Language::ZhTw => &self.zh,
            Language::EnUs => &self.en,
            Language::JaJp => &self.ja,
        };
        non_blank(value.as_deref())
    }

    pub fn set(&mut self, lang: Language, value: String) {
        match lang {
            Language::ZhTw => self.zh = Some(value),
            Language::EnUs => self.en = Some(value),
            Language::JaJp => self.ja = Some(value),
        }
    }

    pub fn is_empty(&self) -> bool {
        Language::ALL.iter().all(|lang| self.get(*lang).is_none())
    }
}

/// Treat empty and whitespace-only strings as missing.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}
