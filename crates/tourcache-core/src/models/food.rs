use serde::{Deserialize, Serialize};

use super::common::non_blank;
use super::{Domain, Pictures, Position, SourceRecord};

/// Restaurant as returned by `Tourism/Restaurant`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodRecord {
    #[serde(rename = "RestaurantID")]
    pub id: String,
    #[serde(rename = "RestaurantName", default)]
    pub name: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Address", default)]
    pub address: Option<String>,
    #[serde(rename = "Phone", default)]
    pub phone: Option<String>,
    #[serde(rename = "City", default)]
    pub city: Option<String>,
    #[serde(rename = "WebsiteUrl", default)]
    pub website_url: Option<String>,
    #[serde(rename = "OpenTime", default)]
    pub open_time: Option<String>,
    #[serde(rename = "Class", default)]
    pub class: Option<String>,
    #[serde(rename = "Picture", default)]
    pub picture: Pictures,
    #[serde(rename = "Position", default)]
    pub position: Option<Position>,
}

impl SourceRecord for FoodRecord {
    const DOMAIN: Domain = Domain::Foods;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> Option<&str> {
        non_blank(self.name.as_deref())
    }

    fn city(&self) -> Option<&str> {
        non_blank(self.city.as_deref())
    }

    fn address(&self) -> Option<&str> {
        non_blank(self.address.as_deref())
    }

    fn phone(&self) -> Option<&str> {
        non_blank(self.phone.as_deref())
    }

    fn website(&self) -> Option<&str> {
        non_blank(self.website_url.as_deref())
    }

    fn description(&self) -> Option<&str> {
        non_blank(self.description.as_deref())
    }

    fn pictures(&self) -> &Pictures {
        &self.picture
    }

    fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    // Restaurants only have one category; it occupies the first slot.
    fn category(&self, slot: usize) -> Option<&str> {
        match slot {
            0 => non_blank(self.class.as_deref()),
            _ => None,
        }
    }

    fn open_time(&self) -> Option<&str> {
        non_blank(self.open_time.as_deref())
    }
}
