//! Latest normalized snapshot of every source attached to a view.

use riziq_types::{Kind, Origin, RawItem, Record, RecordKey};

use crate::merge::{merge, KindFilter, View};
use crate::normalize::normalize;

struct SourceSnapshot {
    kind: Kind,
    origin: Origin,
    records: Vec<Record>,
}

/// Holds one full snapshot per source, in source order.
///
/// Snapshots are replaced wholesale on every update; nothing is patched
/// incrementally, so the view can never drift from what a source last
/// reported.
pub struct ViewCache {
    sources: Vec<SourceSnapshot>,
}

impl ViewCache {
    pub fn new(sources: impl IntoIterator<Item = (Kind, Origin)>) -> Self {
        Self {
            sources: sources
                .into_iter()
                .map(|(kind, origin)| SourceSnapshot {
                    kind,
                    origin,
                    records: Vec::new(),
                })
                .collect(),
        }
    }

    /// Normalizes `items` and makes them the current snapshot of `source`.
    pub fn replace(&mut self, source: usize, items: &[RawItem]) {
        if let Some(snapshot) = self.sources.get_mut(source) {
            let kind = snapshot.kind;
            snapshot.records = items.iter().map(|item| normalize(item, kind)).collect();
        }
    }

    pub fn get(&self, key: &RecordKey) -> Option<&Record> {
        self.sources
            .iter()
            .filter(|s| s.kind == key.kind && s.origin == key.origin)
            .flat_map(|s| s.records.iter())
            .find(|record| record.id == key.id)
    }

    pub fn source_of(&self, source: usize) -> Option<(Kind, Origin)> {
        self.sources.get(source).map(|s| (s.kind, s.origin))
    }

    pub fn len(&self) -> usize {
        self.sources.iter().map(|s| s.records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn merged(&self, filter: &KindFilter) -> View {
        merge(self.sources.iter().map(|s| s.records.as_slice()), filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: &str, name: &str) -> RawItem {
        let serde_json::Value::Object(fields) = json!({ "fullName": name }) else {
            unreachable!()
        };
        RawItem {
            id: id.to_string(),
            origin: Origin::Remote,
            fields,
        }
    }

    #[test]
    fn snapshots_replace_instead_of_accumulating() {
        let mut cache = ViewCache::new([(Kind::Application, Origin::Remote)]);
        cache.replace(0, &[item("a", "Amina"), item("b", "Bilal")]);
        assert_eq!(cache.len(), 2);

        cache.replace(0, &[item("b", "Bilal K.")]);
        assert_eq!(cache.len(), 1);

        let key = RecordKey::new(Kind::Application, Origin::Remote, "b");
        assert_eq!(cache.get(&key).unwrap().display_name, "Bilal K.");
        assert!(cache
            .get(&RecordKey::new(Kind::Application, Origin::Remote, "a"))
            .is_none());
    }

    #[test]
    fn lookups_respect_origin() {
        let mut cache = ViewCache::new([(Kind::Application, Origin::Remote)]);
        cache.replace(0, &[item("a", "Amina")]);
        assert!(cache
            .get(&RecordKey::new(Kind::Application, Origin::Local, "a"))
            .is_none());
    }

    #[test]
    fn unknown_sources_are_ignored() {
        let mut cache = ViewCache::new([(Kind::Application, Origin::Remote)]);
        cache.replace(3, &[item("a", "Amina")]);
        assert!(cache.is_empty());
        assert_eq!(cache.source_of(3), None);
    }
}
