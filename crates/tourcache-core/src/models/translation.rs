use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::debug;

use super::common::non_blank;
use super::{Domain, Language, LocalizedText};

/// Localized overlay for one upstream record, keyed by the same primary ID.
///
/// The overlay files carry language variants as suffixed keys
/// (`ScenicSpotName_en`, `City_ja`, ...). They are folded into typed
/// per-language fields here, at the ingestion boundary, and nowhere else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslationRecord {
    pub id: String,
    pub name: LocalizedText,
    pub description: LocalizedText,
    pub city: LocalizedText,
    pub address: LocalizedText,
    pub open_time: LocalizedText,
    pub ticket_info: LocalizedText,
    pub remarks: LocalizedText,
    pub categories: [LocalizedText; 2],
    /// Event overlays are enriched with upstream schedule fields.
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl TranslationRecord {
    /// Build a record from one raw overlay object. Returns `None` without an ID.
    pub fn from_raw(domain: Domain, raw: &Map<String, Value>) -> Option<Self> {
        let id = non_blank(raw.get(domain.id_field()).and_then(Value::as_str))?.to_string();
        let [class1, class2] = domain.category_fields();

        Some(Self {
            id,
            name: localized(raw, &[domain.name_field()]),
            description: localized(raw, &["DescriptionDetail", "Description"]),
            city: localized(raw, &["City"]),
            address: localized(raw, &["Address"]),
            open_time: localized(raw, &["OpenTime"]),
            ticket_info: localized(raw, &["TicketInfo"]),
            remarks: localized(raw, &["Remarks"]),
            categories: [
                class1.map(|f| localized(raw, &[f])).unwrap_or_default(),
                class2.map(|f| localized(raw, &[f])).unwrap_or_default(),
            ],
            start_time: plain(raw, "StartTime"),
            end_time: plain(raw, "EndTime"),
        })
    }

    /// Parse a whole overlay file body. Entries that are not objects or lack an ID are skipped.
    pub fn parse_overlay(domain: Domain, body: Value) -> Vec<Self> {
        let Value::Array(items) = body else {
            debug!(domain = %domain, "Overlay body is not an array");
            return Vec::new();
        };

        let total = items.len();
        let records: Vec<Self> = items
            .iter()
            .filter_map(Value::as_object)
            .filter_map(|raw| Self::from_raw(domain, raw))
            .collect();

        if records.len() != total {
            debug!(domain = %domain, skipped = total - records.len(), "Skipped malformed overlay entries");
        }
        records
    }

    pub fn has_schedule(&self) -> bool {
        non_blank(self.start_time.as_deref()).is_some()
            && non_blank(self.end_time.as_deref()).is_some()
    }
}

/// A domain's parsed overlay file, indexed by record ID.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    records: Vec<TranslationRecord>,
    index: HashMap<String, usize>,
}

impl Overlay {
    /// Build the ID index. On duplicate IDs the first record wins.
    pub fn new(records: Vec<TranslationRecord>) -> Self {
        let mut index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            index.entry(record.id.clone()).or_insert(i);
        }
        Self { records, index }
    }

    pub fn get(&self, id: &str) -> Option<&TranslationRecord> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &TranslationRecord> {
        self.records.iter()
    }

    pub fn first(&self) -> Option<&TranslationRecord> {
        self.records.first()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Collect `{base}{suffix}` for every language; earlier base names take precedence.
fn localized(raw: &Map<String, Value>, bases: &[&str]) -> LocalizedText {
    let mut text = LocalizedText::default();
    for lang in Language::ALL {
        let value = bases
            .iter()
            .find_map(|base| non_blank(raw.get(&format!("{}{}", base, lang.suffix())).and_then(Value::as_str)));
        if let Some(value) = value {
            text.set(lang, value.to_string());
        }
    }
    text
}

fn plain(raw: &Map<String, Value>, key: &str) -> Option<String> {
    non_blank(raw.get(key).and_then(Value::as_str)).map(String::from)
}
