use super::MergedRecord;
use crate::models::{CardView, DetailView, Domain, Language, NearbyItem};
use crate::utils::{derive_city, format_date_range, format_schedule, mentions_open_all_day, round2};

/// Placeholder for records without pictures.
pub const DEFAULT_IMAGE: &str = "/images/default.jpg";

fn image_or_default(record: &MergedRecord) -> String {
    record.first_image().unwrap_or(DEFAULT_IMAGE).to_string()
}

fn city_or_empty(record: &MergedRecord) -> String {
    record.city.clone().unwrap_or_default()
}

/// Full detail view.
///
/// A missing city is derived from the resolved address. Events show their
/// schedule as the opening time; "24 hours" texts become the localized
/// all-day marker. Ticket info and remarks are only carried by spots.
pub fn detail_view(record: &MergedRecord, lang: Language) -> DetailView {
    let city = match &record.city {
        Some(city) => city.clone(),
        None if !record.address.is_empty() => derive_city(&record.address, lang),
        None => String::new(),
    };

    let open_time = match record.domain {
        Domain::Events => {
            format_schedule(record.start_time.as_deref(), record.end_time.as_deref())
                .unwrap_or_default()
        }
        Domain::Spots | Domain::Foods => match record.open_time.as_deref() {
            Some(text) if mentions_open_all_day(text) => lang.open_all_day().to_string(),
            Some(text) => text.to_string(),
            None => String::new(),
        },
    };

    let (ticket_info, remarks) = match record.domain {
        Domain::Spots => (
            Some(record.ticket_info.clone().unwrap_or_default()),
            Some(record.remarks.clone().unwrap_or_default()),
        ),
        Domain::Foods | Domain::Events => (None, None),
    };

    let images = if record.images.is_empty() {
        vec![DEFAULT_IMAGE.to_string()]
    } else {
        record.images.clone()
    };

    DetailView {
        id: record.id.clone(),
        name: record.name.clone(),
        description: record.description.clone(),
        city,
        address: record.address.clone(),
        open_time,
        phone: record.phone.clone(),
        website: record.website.clone(),
        ticket_info,
        remarks,
        position: record.position,
        images,
        class_tags: record.category_tags.clone(),
    }
}

pub fn card_view(record: &MergedRecord) -> CardView {
    CardView {
        id: record.id.clone(),
        name: record.name.clone(),
        city: city_or_empty(record),
        image: image_or_default(record),
        link: record.link(),
        date: None,
    }
}

/// Card with the "YYYY/MM/DD - YYYY/MM/DD" range used by the event home listing.
pub fn event_card_view(record: &MergedRecord) -> CardView {
    CardView {
        date: format_date_range(record.start_time.as_deref(), record.end_time.as_deref()),
        ..card_view(record)
    }
}

pub fn nearby_item(record: &MergedRecord, distance_km: f64) -> NearbyItem {
    NearbyItem {
        id: record.id.clone(),
        name: record.name.clone(),
        city: city_or_empty(record),
        address: record.address.clone(),
        position: record.position,
        image: image_or_default(record),
        description: record.description.clone(),
        link: record.link(),
        distance: round2(distance_km),
    }
}
