use serde::{Deserialize, Serialize};

use super::common::non_blank;
use super::{Domain, Pictures, Position, SourceRecord};

/// Activity as returned by `Tourism/Activity`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "ActivityID")]
    pub id: String,
    #[serde(rename = "ActivityName", default)]
    pub name: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Address", default)]
    pub address: Option<String>,
    #[serde(rename = "Phone", default)]
    pub phone: Option<String>,
    #[serde(rename = "City", default)]
    pub city: Option<String>,
    #[serde(rename = "Organizer", default)]
    pub organizer: Option<String>,
    #[serde(rename = "WebsiteUrl", default)]
    pub website_url: Option<String>,
    #[serde(rename = "StartTime", default)]
    pub start_time: Option<String>,
    #[serde(rename = "EndTime", default)]
    pub end_time: Option<String>,
    #[serde(rename = "Class1", default)]
    pub class1: Option<String>,
    #[serde(rename = "Class2", default)]
    pub class2: Option<String>,
    #[serde(rename = "Picture", default)]
    pub picture: Pictures,
    #[serde(rename = "Position", default)]
    pub position: Option<Position>,
}

impl SourceRecord for EventRecord {
    const DOMAIN: Domain = Domain::Events;

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

    fn category(&self, slot: usize) -> Option<&str> {
        match slot {
            0 => non_blank(self.class1.as_deref()),
            1 => non_blank(self.class2.as_deref()),
            _ => None,
        }
    }

    fn start_time(&self) -> Option<&str> {
        non_blank(self.start_time.as_deref())
    }

    fn end_time(&self) -> Option<&str> {
        non_blank(self.end_time.as_deref())
    }
}
