//! Request filters, in the `filter[field]=value` form used by the findings API.
//!
//! Filters are passed in explicitly (CLI flags, config file) and applied to
//! already-denormalized findings. Keys that do not start with `filter[`
//! are ignored.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::FindexError;
use crate::expand::DenormalizedFinding;
use crate::jsonapi::Entity;

static FILTER_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^filter\[([A-Za-z0-9_.\-]+)\]$").expect("valid filter regex"));

const FILTER_PREFIX: &str = "filter[";
const IN_SUFFIX: &str = "__in";

/// Which entity of a denormalized finding a filter looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Finding,
    Scan,
    Resource,
    Provider,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Predicate {
    target: Target,
    field: String,
    values: Vec<String>,
}

impl Predicate {
    fn parse(field: &str, value: &str) -> Self {
        let (target, field) = match field.split_once('.') {
            Some(("scan", rest)) => (Target::Scan, rest),
            Some(("resource", rest)) => (Target::Resource, rest),
            Some(("provider", rest)) => (Target::Provider, rest),
            _ => (Target::Finding, field),
        };

        let (field, values) = match field.strip_suffix(IN_SUFFIX) {
            Some(base) => (
                base,
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            None => (field, vec![value.to_string()]),
        };

        Predicate {
            target,
            field: field.to_string(),
            values,
        }
    }

    fn matches(&self, finding: &DenormalizedFinding) -> bool {
        let rel = &finding.relationships;
        let attr = match self.target {
            Target::Finding => finding.attributes.get(&self.field),
            Target::Scan => attribute(rel.scan.as_ref(), &self.field),
            Target::Resource => attribute(rel.resource.as_ref(), &self.field),
            Target::Provider => attribute(rel.provider.as_ref(), &self.field),
        };

        let Some(actual) = attr.and_then(scalar_text) else {
            return false;
        };
        self.values.iter().any(|v| v.eq_ignore_ascii_case(&actual))
    }
}

fn attribute<'a>(entity: Option<&'a Entity>, field: &str) -> Option<&'a Value> {
    entity?.attributes.get(field)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// An ordered set of `filter[...]` pairs. An empty value marks the key as
/// unset: it removes that key when merged over another set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindingFilters {
    entries: BTreeMap<String, String>,
}

impl FindingFilters {
    /// Filters applied when the caller does not opt out:
    /// failing findings that are new in the latest scan.
    pub fn defaults() -> Self {
        let mut filters = FindingFilters::default();
        filters.insert("filter[status]", "FAIL");
        filters.insert("filter[delta]", "new");
        filters
    }

    /// Keep only the `filter[...]` keys of arbitrary query-style pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filters = FindingFilters::default();
        for (key, value) in pairs {
            if key.as_ref().starts_with(FILTER_PREFIX) {
                filters.insert(key.as_ref(), value.as_ref());
            }
        }
        filters
    }

    /// Parse a `filter[field]=value` command-line argument
    pub fn parse_pair(arg: &str) -> Result<(String, String), FindexError> {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| FindexError::InvalidFilter(arg.to_string()))?;
        let key = key.trim();
        if !FILTER_KEY.is_match(key) {
            return Err(FindexError::InvalidFilter(arg.to_string()));
        }
        Ok((key.to_string(), value.trim().to_string()))
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    /// Apply `overrides` on top of `self`
    pub fn merged(mut self, overrides: &FindingFilters) -> Self {
        for (key, value) in &overrides.entries {
            if value.is_empty() {
                self.entries.remove(key);
            } else {
                self.entries.insert(key.clone(), value.clone());
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Compile into a matcher. Malformed keys and unset values are skipped.
    pub fn compile(&self) -> FilterMatcher {
        let predicates = self
            .entries
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .filter_map(|(key, value)| {
                let caps = FILTER_KEY.captures(key)?;
                Some(Predicate::parse(&caps[1], value))
            })
            .collect();
        FilterMatcher { predicates }
    }
}

/// Conjunction of compiled filters
#[derive(Debug, Clone, Default)]
pub struct FilterMatcher {
    predicates: Vec<Predicate>,
}

impl FilterMatcher {
    pub fn matches(&self, finding: &DenormalizedFinding) -> bool {
        self.predicates.iter().all(|p| p.matches(finding))
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}
