use serde::{Deserialize, Serialize};

use super::common::non_blank;
use super::{Domain, Pictures, Position, SourceRecord};

/// Scenic spot as returned by `Tourism/ScenicSpot`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpotRecord {
    #[serde(rename = "ScenicSpotID")]
    pub id: String,
    #[serde(rename = "ScenicSpotName", default)]
    pub name: Option<String>,
    #[serde(rename = "DescriptionDetail", default)]
    pub description_detail: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Phone", default)]
    pub phone: Option<String>,
    #[serde(rename = "Address", default)]
    pub address: Option<String>,
    #[serde(rename = "City", default)]
    pub city: Option<String>,
    #[serde(rename = "WebsiteUrl", default)]
    pub website_url: Option<String>,
    #[serde(rename = "OpenTime", default)]
    pub open_time: Option<String>,
    #[serde(rename = "TicketInfo", default)]
    pub ticket_info: Option<String>,
    #[serde(rename = "Remarks", default)]
    pub remarks: Option<String>,
    #[serde(rename = "Class1", default)]
    pub class1: Option<String>,
    #[serde(rename = "Class2", default)]
    pub class2: Option<String>,
    #[serde(rename = "Picture", default)]
    pub picture: Pictures,
    #[serde(rename = "Position", default)]
    pub position: Option<Position>,
}

impl SourceRecord for SpotRecord {
    const DOMAIN: Domain = Domain::Spots;

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
        non_blank(self.description_detail.as_deref())
            .or_else(|| non_blank(self.description.as_deref()))
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

    fn open_time(&self) -> Option<&str> {
        non_blank(self.open_time.as_deref())
    }

    fn ticket_info(&self) -> Option<&str> {
        non_blank(self.ticket_info.as_deref())
    }

    fn remarks(&self) -> Option<&str> {
        non_blank(self.remarks.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spot() {
        let json = r#"{
            "ScenicSpotID": "C1_315080500H_000001",
            "ScenicSpotName": "象山",
            "DescriptionDetail": "",
            "Description": "登山步道",
            "City": "臺北市",
            "Class1": "自然風景類",
            "Class2": "  ",
            "Picture": {"PictureUrl1": "https://img/1.jpg"},
            "Position": {"PositionLon": 121.57, "PositionLat": 25.02, "GeoHash": "wsqqq"},
            "SrcUpdateTime": "2025-01-01T00:00:00+08:00"
        }"#;

        let spot: SpotRecord = serde_json::from_str(json).expect("Failed to parse spot JSON");
        assert_eq!(spot.id(), "C1_315080500H_000001");
        // Empty DescriptionDetail falls through to Description
        assert_eq!(spot.description(), Some("登山步道"));
        assert_eq!(spot.category(0), Some("自然風景類"));
        assert_eq!(spot.category(1), None);
        assert_eq!(spot.coords(), Some((25.02, 121.57)));
        assert!(spot.is_showcase_ready());
    }
}
