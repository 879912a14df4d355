use std::collections::HashSet;

use crate::event::Event;

/// Identity of an event: two events with the same key are the same event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub name: String,
    pub country: String,
    pub start_date: String,
}

impl DedupKey {
    pub fn of(event: &Event) -> Self {
        DedupKey {
            name: normalize_name(&event.name),
            country: event.country.clone(),
            start_date: event.start_date.clone(),
        }
    }
}

/// Lower-case and collapse internal whitespace.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Append the events of `new_events` whose key is neither in `existing` nor earlier in the batch.
///
/// Existing rows keep their order; additions go at the end in batch order. Returns the updated
/// store and the number of rows added.
pub fn merge(mut existing: Vec<Event>, new_events: Vec<Event>) -> (Vec<Event>, usize) {
    let mut seen: HashSet<DedupKey> = existing.iter().map(DedupKey::of).collect();
    let before = existing.len();
    existing.extend(new_events.into_iter().filter(|ev| seen.insert(DedupKey::of(ev))));
    let added = existing.len() - before;
    (existing, added)
}
