use std::collections::HashMap;

use tracing::debug;

use crate::jsonapi::{Entity, Envelope};

/// Id → entity lookup for one collection of a response envelope.
///
/// Borrows from the envelope it was built from; built once per response
/// and dropped with it.
#[derive(Debug, Clone)]
pub struct EntityIndex<'a> {
    collection: String,
    entries: HashMap<&'a str, &'a Entity>,
}

impl<'a> EntityIndex<'a> {
    pub fn empty(collection: &str) -> Self {
        EntityIndex {
            collection: collection.to_string(),
            entries: HashMap::new(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn get(&self, id: &str) -> Option<&'a Entity> {
        self.entries.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entries.keys().copied()
    }
}

/// Build the index of `collection` from an envelope's `data` and `included`.
///
/// Entities of other collections are ignored, entities without an id are
/// skipped. When an id appears twice the later entity wins (`included`
/// is scanned after `data`).
pub fn build_index<'a>(collection: &str, envelope: Option<&'a Envelope>) -> EntityIndex<'a> {
    let mut index = EntityIndex::empty(collection);
    let Some(envelope) = envelope else {
        return index;
    };

    for entity in envelope.data.iter().chain(envelope.included.iter()) {
        if entity.kind != collection {
            continue;
        }
        let Some(id) = entity.id.as_deref() else {
            debug!("Skipping {} entity without id", collection);
            continue;
        };
        if index.entries.insert(id, entity).is_some() {
            debug!("Duplicate {} id {}, keeping the last one", collection, id);
        }
    }

    debug!("Indexed {} {}", index.len(), collection);
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsonapi::{FINDINGS, PROVIDERS, RESOURCES, SCANS};
    use serde_json::json;

    fn envelope() -> Envelope {
        serde_json::from_value(json!({
            "data": [
                { "type": "findings", "id": "f1" },
                { "type": "findings", "id": "f2" }
            ],
            "included": [
                { "type": "scans", "id": "s1", "attributes": { "name": "daily" } },
                { "type": "resources", "id": "r1" },
                { "type": "resources", "id": "r2" },
                { "type": "resources" },
                { "type": "providers", "id": "p1" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn indexes_only_requested_collection() {
        let env = envelope();
        let resources = build_index(RESOURCES, Some(&env));

        assert_eq!(resources.collection(), RESOURCES);
        assert_eq!(resources.len(), 2);
        assert!(resources.contains("r1"));
        assert!(resources.contains("r2"));
        assert!(!resources.contains("s1"));
        assert!(resources.ids().all(|id| resources.get(id).unwrap().kind == RESOURCES));
    }

    #[test]
    fn primary_data_is_indexed_too() {
        let env = envelope();
        let findings = build_index(FINDINGS, Some(&env));
        assert_eq!(findings.len(), 2);
        assert_eq!(findings.get("f2").unwrap().display_id(), "f2");
    }

    #[test]
    fn entries_are_keyed_by_their_own_id() {
        let env = envelope();
        let scans = build_index(SCANS, Some(&env));
        let scan = scans.get("s1").unwrap();
        assert_eq!(scan.id.as_deref(), Some("s1"));
        assert_eq!(scan.attr_str("name"), Some("daily"));
    }

    #[test]
    fn absent_envelope_or_collections_give_empty_index() {
        assert!(build_index(SCANS, None).is_empty());
        let env = Envelope::default();
        assert!(build_index(PROVIDERS, Some(&env)).is_empty());
    }

    #[test]
    fn building_twice_yields_same_entries() {
        let env = envelope();
        let a = build_index(RESOURCES, Some(&env));
        let b = build_index(RESOURCES, Some(&env));

        let mut ids_a: Vec<_> = a.ids().collect();
        let mut ids_b: Vec<_> = b.ids().collect();
        ids_a.sort_unstable();
        ids_b.sort_unstable();
        assert_eq!(ids_a, ids_b);
        for id in ids_a {
            assert_eq!(a.get(id), b.get(id));
        }
    }

    #[test]
    fn duplicate_ids_keep_last_entity() {
        let env: Envelope = serde_json::from_value(json!({
            "included": [
                { "type": "scans", "id": "s1", "attributes": { "name": "first" } },
                { "type": "scans", "id": "s1", "attributes": { "name": "second" } }
            ]
        }))
        .unwrap();
        let scans = build_index(SCANS, Some(&env));
        assert_eq!(scans.len(), 1);
        assert_eq!(scans.get("s1").unwrap().attr_str("name"), Some("second"));
    }
}
