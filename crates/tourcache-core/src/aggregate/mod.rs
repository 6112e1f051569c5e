//! Joins source records with their translation overlay.
//!
//! `merge` resolves every display field for one language; the `views`
//! functions turn a `MergedRecord` into the JSON shapes served to the UI.

pub mod merge;
pub mod views;

pub use merge::{merge, merge_all, MergedRecord};
pub use views::{card_view, detail_view, event_card_view, nearby_item, DEFAULT_IMAGE};
