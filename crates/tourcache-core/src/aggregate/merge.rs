use crate::models::common::non_blank;
use crate::models::{
    Domain, Language, LocalizedText, Overlay, Position, SourceRecord, TranslationRecord,
};

/// A source record with every display field resolved for one language.
///
/// Each field is `overlay[lang] -> source -> default`, with blank strings
/// treated as absent on both sides.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub domain: Domain,
    pub id: String,
    pub name: String,
    /// Resolved city; `None` when neither side has one.
    pub city: Option<String>,
    /// The source city, always in the default language.
    pub source_city: Option<String>,
    pub address: String,
    pub description: String,
    pub open_time: Option<String>,
    pub ticket_info: Option<String>,
    pub remarks: Option<String>,
    pub phone: String,
    pub website: String,
    pub position: Option<Position>,
    pub images: Vec<String>,
    /// Resolved category per slot, blank slots omitted.
    pub category_tags: Vec<String>,
    /// Source category per slot, blank slots omitted.
    pub source_categories: Vec<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl MergedRecord {
    /// Valid coordinates, if any.
    pub fn coords(&self) -> Option<(f64, f64)> {
        self.position.as_ref().and_then(Position::coords)
    }

    pub fn link(&self) -> String {
        self.domain.link(&self.id)
    }

    pub fn first_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

fn resolve(text: Option<&LocalizedText>, lang: Language, source: Option<&str>) -> Option<String> {
    text.and_then(|t| t.get(lang))
        .or_else(|| non_blank(source))
        .map(String::from)
}

/// Resolve one record. A missing overlay record means every field comes from the source.
pub fn merge<R: SourceRecord>(
    source: &R,
    translation: Option<&TranslationRecord>,
    lang: Language,
) -> MergedRecord {
    let mut category_tags = Vec::with_capacity(2);
    let mut source_categories = Vec::with_capacity(2);
    for slot in 0..2 {
        let translated = translation.and_then(|t| t.categories[slot].get(lang));
        if let Some(tag) = translated.or_else(|| source.category(slot)) {
            category_tags.push(tag.to_string());
        }
        if let Some(tag) = source.category(slot) {
            source_categories.push(tag.to_string());
        }
    }

    MergedRecord {
        domain: R::DOMAIN,
        id: source.id().to_string(),
        name: resolve(translation.map(|t| &t.name), lang, source.name()).unwrap_or_default(),
        city: resolve(translation.map(|t| &t.city), lang, source.city()),
        source_city: source.city().map(String::from),
        address: resolve(translation.map(|t| &t.address), lang, source.address()).unwrap_or_default(),
        description: resolve(translation.map(|t| &t.description), lang, source.description()).unwrap_or_default(),
        open_time: resolve(translation.map(|t| &t.open_time), lang, source.open_time()),
        ticket_info: resolve(translation.map(|t| &t.ticket_info), lang, source.ticket_info()),
        remarks: resolve(translation.map(|t| &t.remarks), lang, source.remarks()),
        phone: source.phone().unwrap_or_default().to_string(),
        website: source.website().unwrap_or_default().to_string(),
        position: source.position().copied(),
        images: source.pictures().urls().to_vec(),
        category_tags,
        source_categories,
        start_time: source.start_time().map(String::from),
        end_time: source.end_time().map(String::from),
    }
}

/// Merge every source record with its overlay entry.
pub fn merge_all<R: SourceRecord>(
    sources: &[R],
    overlay: &Overlay,
    lang: Language,
) -> Vec<MergedRecord> {
    sources
        .iter()
        .map(|s| merge(s, overlay.get(s.id()), lang))
        .collect()
}
