//! Wire model for JSON:API compound documents.
//!
//! Only the parts the overview needs are typed: entity `type`/`id`,
//! free-form `attributes`, and relationship linkage. Everything else is
//! carried through as raw JSON.

pub mod reference;

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

pub use reference::{Identifier, Reference, Relationship};

/// Collection names used by the findings API
pub const FINDINGS: &str = "findings";
pub const RESOURCES: &str = "resources";
pub const SCANS: &str = "scans";
pub const PROVIDERS: &str = "providers";

/// Relationship names on findings and scans
pub const SCAN_REL: &str = "scan";
pub const RESOURCES_REL: &str = "resources";
pub const PROVIDER_REL: &str = "provider";

static NO_REFERENCE: Reference = Reference::None;

/// A top-level JSON:API response document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Primary entities, in response order
    #[serde(default, deserialize_with = "entity_list")]
    pub data: Vec<Entity>,

    /// Side-loaded entities of any collection
    #[serde(default, deserialize_with = "entity_list")]
    pub included: Vec<Entity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
}

/// A single resource object.
///
/// Every member is decoded leniently: a wrongly-typed member becomes its
/// empty value instead of failing the whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Collection discriminator (`findings`, `scans`, ...)
    #[serde(rename = "type", default, deserialize_with = "lenient_kind")]
    pub kind: String,

    /// Unique within `kind`. Numeric ids are kept as decimal text; missing
    /// or non-scalar ids are tolerated and the entity is never indexed.
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "lenient_object", skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,

    #[serde(
        default,
        deserialize_with = "lenient_relationships",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub relationships: BTreeMap<String, Relationship>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl Entity {
    /// Relationship by name, `Reference::None` when absent
    pub fn reference(&self, name: &str) -> &Reference {
        self.relationships
            .get(name)
            .map_or(&NO_REFERENCE, |rel| &rel.reference)
    }

    pub fn attr_str(&self, name: &str) -> Option<&str> {
        attr_str(&self.attributes, name)
    }

    pub fn display_id(&self) -> &str {
        display_id(self.id.as_deref())
    }
}

/// String attribute by name, shared by raw and denormalized records
pub(crate) fn attr_str<'a>(attributes: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    attributes.get(name).and_then(Value::as_str)
}

/// Id for log lines and tables
pub(crate) fn display_id(id: Option<&str>) -> &str {
    id.unwrap_or("<no id>")
}

/// `null` collections are empty; items that are not entity objects are dropped
fn entity_list<'de, D>(deserializer: D) -> Result<Vec<Entity>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Entity>(item) {
            Ok(entity) => Some(entity),
            Err(e) => {
                debug!("Skipping malformed entity: {}", e);
                None
            }
        })
        .collect())
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_kind<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        _ => String::new(),
    })
}

fn lenient_object<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => map,
        _ => Map::new(),
    })
}

fn lenient_relationships<'de, D>(deserializer: D) -> Result<BTreeMap<String, Relationship>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_object(deserializer)?
        .into_iter()
        .map(|(name, raw)| (name, Relationship::from(raw)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_and_null_collections_are_empty() {
        let env: Envelope = serde_json::from_value(json!({ "data": null })).unwrap();
        assert!(env.data.is_empty());
        assert!(env.included.is_empty());
        assert!(env.meta.is_none());
    }

    #[test]
    fn parses_finding_entity() {
        let env: Envelope = serde_json::from_value(json!({
            "data": [{
                "type": "findings",
                "id": "f1",
                "attributes": { "status": "FAIL", "severity": "high", "muted": false },
                "relationships": {
                    "scan": { "data": { "type": "scans", "id": "s1" } },
                    "resources": { "data": [{ "type": "resources", "id": "r1" }], "meta": { "count": 1 } }
                }
            }],
            "meta": { "version": "v1" }
        }))
        .unwrap();

        let finding = &env.data[0];
        assert_eq!(finding.kind, FINDINGS);
        assert_eq!(finding.attr_str("status"), Some("FAIL"));
        assert_eq!(finding.attr_str("muted"), None);
        assert_eq!(finding.reference(SCAN_REL).single().unwrap().id, "s1");
        assert_eq!(finding.reference(RESOURCES_REL).first().unwrap().id, "r1");
        assert!(finding.reference(PROVIDER_REL).is_none());
    }

    #[test]
    fn numeric_and_odd_ids_do_not_fail_the_document() {
        let env: Envelope = serde_json::from_value(json!({
            "included": [
                { "type": "resources", "id": 7 },
                { "type": "resources", "id": { "nested": true } },
                { "type": 3, "id": "x" },
                "not an entity",
                { "type": "resources", "id": "r2", "attributes": null }
            ]
        }))
        .unwrap();

        assert_eq!(env.included.len(), 4);
        assert_eq!(env.included[0].id.as_deref(), Some("7"));
        assert!(env.included[1].id.is_none());
        assert_eq!(env.included[2].kind, "");
        assert!(env.included[3].attributes.is_empty());
    }

    #[test]
    fn null_or_odd_relationships_decode_to_none() {
        let env: Envelope = serde_json::from_value(json!({
            "data": [
                { "type": "findings", "id": "f1", "relationships": { "scan": null, "resources": 5 } },
                { "type": "findings", "id": "f2", "relationships": null }
            ]
        }))
        .unwrap();

        assert!(env.data[0].reference(SCAN_REL).is_none());
        assert!(env.data[0].reference(RESOURCES_REL).is_none());
        assert!(env.data[1].relationships.is_empty());
    }

    #[test]
    fn relationship_links_and_meta_survive_serialization() {
        let raw = json!({
            "type": "scans",
            "id": "s1",
            "relationships": {
                "provider": {
                    "data": { "type": "providers", "id": "p1" },
                    "links": { "related": "/scans/s1/provider" }
                },
                "resources": { "data": [], "meta": { "count": 0 } }
            }
        });
        let entity: Entity = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(entity.reference(PROVIDER_REL).single().unwrap().id, "p1");
        assert_eq!(serde_json::to_value(&entity).unwrap(), raw);
    }

    #[test]
    fn entity_without_id_still_parses() {
        let entity: Entity = serde_json::from_value(json!({ "type": "scans" })).unwrap();
        assert!(entity.id.is_none());
        assert_eq!(entity.display_id(), "<no id>");
    }
}
