//! Denormalization of a findings response.
//!
//! Each finding references its scan and resources by id, and the scan in
//! turn references its provider. Resolution goes through one
//! [`EntityIndex`] per side-loaded collection:
//!
//! ```text
//! finding ──scan──▶ scans ──provider──▶ providers
//!    └──resources[0]──▶ resources
//! ```
//!
//! Unresolvable references never fail; the corresponding field is left out.

pub mod index;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::jsonapi::{
    self, Entity, Envelope, PROVIDERS, PROVIDER_REL, RESOURCES, RESOURCES_REL, SCANS, SCAN_REL,
};

pub use index::{build_index, EntityIndex};

/// The three side-loaded lookups a findings response needs
#[derive(Debug, Clone)]
pub struct SideIndexes<'a> {
    pub scans: EntityIndex<'a>,
    pub resources: EntityIndex<'a>,
    pub providers: EntityIndex<'a>,
}

impl<'a> SideIndexes<'a> {
    pub fn build(envelope: &'a Envelope) -> Self {
        SideIndexes {
            scans: build_index(SCANS, Some(envelope)),
            resources: build_index(RESOURCES, Some(envelope)),
            providers: build_index(PROVIDERS, Some(envelope)),
        }
    }

    pub fn denormalize(&self, findings: &[Entity]) -> Vec<DenormalizedFinding> {
        denormalize(findings, &self.scans, &self.resources, &self.providers)
    }
}

/// Resolved relationships of a finding. Absent members are omitted on output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedRelationships {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan: Option<Entity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Entity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<Entity>,
}

/// A finding with its scan, resource and provider inlined
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DenormalizedFinding {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub attributes: Map<String, Value>,

    pub relationships: ResolvedRelationships,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl DenormalizedFinding {
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        jsonapi::attr_str(&self.attributes, name)
    }

    pub fn display_id(&self) -> &str {
        jsonapi::display_id(self.id.as_deref())
    }
}

/// Response shape handed to the display layer: the envelope with `data`
/// replaced by denormalized findings. `included` is not carried over since
/// every side-loaded entity a finding needs is now inline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpandedResponse {
    pub data: Vec<DenormalizedFinding>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
}

/// Scan referenced by the finding's to-one `scan` relationship
pub fn resolve_scan<'a>(finding: &Entity, scans: &EntityIndex<'a>) -> Option<&'a Entity> {
    let ident = finding.reference(SCAN_REL).single()?;
    scans.get(&ident.id)
}

/// First resource of the finding's `resources` relationship
pub fn resolve_resource<'a>(finding: &Entity, resources: &EntityIndex<'a>) -> Option<&'a Entity> {
    let ident = finding.reference(RESOURCES_REL).first()?;
    resources.get(&ident.id)
}

/// Provider reached through an already-resolved scan. The finding itself is
/// never consulted: no scan, no provider.
pub fn resolve_provider<'a>(
    scan: Option<&Entity>,
    providers: &EntityIndex<'a>,
) -> Option<&'a Entity> {
    let ident = scan?.reference(PROVIDER_REL).single()?;
    providers.get(&ident.id)
}

/// Replace each finding's relationships with the entities they point at.
///
/// One output per input, in input order. Inputs are left untouched.
pub fn denormalize(
    findings: &[Entity],
    scans: &EntityIndex<'_>,
    resources: &EntityIndex<'_>,
    providers: &EntityIndex<'_>,
) -> Vec<DenormalizedFinding> {
    findings
        .iter()
        .map(|finding| {
            let scan = resolve_scan(finding, scans);
            let resource = resolve_resource(finding, resources);
            let provider = resolve_provider(scan, providers);

            if scan.is_none() {
                debug!("Finding {}: scan unresolved", finding.display_id());
            }
            if resource.is_none() {
                debug!("Finding {}: resource unresolved", finding.display_id());
            }
            if provider.is_none() {
                debug!("Finding {}: provider unresolved", finding.display_id());
            }

            DenormalizedFinding {
                kind: finding.kind.clone(),
                id: finding.id.clone(),
                attributes: finding.attributes.clone(),
                relationships: ResolvedRelationships {
                    scan: scan.cloned(),
                    resource: resource.cloned(),
                    provider: provider.cloned(),
                },
                links: finding.links.clone(),
                meta: finding.meta.clone(),
            }
        })
        .collect()
}

/// Index and denormalize a whole envelope in one step
pub fn expand_envelope(envelope: &Envelope) -> ExpandedResponse {
    let indexes = SideIndexes::build(envelope);
    ExpandedResponse {
        data: indexes.denormalize(&envelope.data),
        meta: envelope.meta.clone(),
        links: envelope.links.clone(),
    }
}
