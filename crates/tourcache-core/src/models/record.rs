use serde::de::DeserializeOwned;

use super::{Domain, Pictures, Position};

/// Common accessors over the per-domain upstream record structs.
///
/// Every string accessor returns `None` for missing or blank values, so the
/// field-resolution rules never have to distinguish the two.
pub trait SourceRecord: DeserializeOwned + Clone + Send + Sync + 'static {
    const DOMAIN: Domain;

    fn id(&self) -> &str;
    fn name(&self) -> Option<&str>;
    fn city(&self) -> Option<&str>;
    fn address(&self) -> Option<&str>;
    fn phone(&self) -> Option<&str>;
    fn website(&self) -> Option<&str>;
    fn description(&self) -> Option<&str>;
    fn pictures(&self) -> &Pictures;
    fn position(&self) -> Option<&Position>;

    /// Category value for slot 0 or 1.
    fn category(&self, slot: usize) -> Option<&str>;

    fn open_time(&self) -> Option<&str> {
        None
    }

    fn ticket_info(&self) -> Option<&str> {
        None
    }

    fn remarks(&self) -> Option<&str> {
        None
    }

    fn start_time(&self) -> Option<&str> {
        None
    }

    fn end_time(&self) -> Option<&str> {
        None
    }

    /// Valid coordinates, if the record has any.
    fn coords(&self) -> Option<(f64, f64)> {
        self.position().and_then(Position::coords)
    }

    /// Eligible for home selections: at least one picture and a city.
    fn is_showcase_ready(&self) -> bool {
        !self.pictures().is_empty() && self.city().is_some()
    }
}

/// Look up one record by primary key.
pub fn find_by_id<'a, R: SourceRecord>(records: &'a [R], id: &str) -> Option<&'a R> {
    records.iter().find(|r| r.id() == id)
}
