pub mod loader;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::InputArgs;
use crate::config::FindexConfig;
use crate::expand::SideIndexes;
use crate::filters::{FilterMatcher, FindingFilters};
use crate::jsonapi::Envelope;
use crate::report::overview::{OverviewReport, OverviewSummary};
use crate::report::sorter;

pub use loader::Source;

/// Findings shown when neither the CLI nor the config sets a limit
pub const DEFAULT_LIMIT: usize = 10;

/// The overview pipeline: load, denormalize, filter, sort, limit, summarize.
pub struct Overview {
    /// Where the response comes from
    source: Source,
    /// Effective filters after defaults, config and CLI are merged
    filters: FindingFilters,
    /// Findings to keep (0 = all)
    limit: usize,
}

impl Overview {
    /// Resolve effective settings. Precedence: CLI, then config, then defaults.
    pub fn new(input: &InputArgs, limit: Option<usize>, config: Option<&FindexConfig>) -> Result<Self> {
        let source = Source::from_arg(&input.path);

        let mut filters = if input.all {
            FindingFilters::default()
        } else {
            FindingFilters::defaults()
        };
        if let Some(cfg) = config {
            filters = filters.merged(&cfg.filters());
        }
        let mut cli_filters = FindingFilters::default();
        for arg in &input.filters {
            let (key, value) = FindingFilters::parse_pair(arg)?;
            cli_filters.insert(&key, &value);
        }
        let filters = filters.merged(&cli_filters);

        let limit = limit
            .or_else(|| config.and_then(|c| c.output.limit))
            .unwrap_or(DEFAULT_LIMIT);

        debug!(
            "Filters: {}",
            filters
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Overview {
            source,
            filters,
            limit,
        })
    }

    /// Load the response and build the overview
    pub fn run(&self) -> Result<OverviewReport> {
        info!("Reading findings from {}", self.source);
        let envelope = loader::load_envelope(&self.source)?;
        Ok(self.build(&envelope))
    }

    /// Build the overview for an already-loaded response
    pub fn build(&self, envelope: &Envelope) -> OverviewReport {
        // Step 1: Index side-loaded collections
        let indexes = SideIndexes::build(envelope);
        info!(
            "Response: {} findings, {} scans, {} resources, {} providers",
            envelope.data.len(),
            indexes.scans.len(),
            indexes.resources.len(),
            indexes.providers.len()
        );

        // Step 2: Denormalize
        let expanded = indexes.denormalize(&envelope.data);

        // Step 3: Filter
        let matcher: FilterMatcher = self.filters.compile();
        let matching: Vec<_> = expanded.into_iter().filter(|f| matcher.matches(f)).collect();
        info!("{} findings match {} filters", matching.len(), matcher.len());

        // Step 4: Summarize, sort, and limit
        let summary = OverviewSummary::from_findings(&matching);
        let findings = sorter::apply_limit(sorter::sort_findings(matching), self.limit);

        OverviewReport {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            source: self.source.to_string(),
            findings_total: envelope.data.len(),
            findings,
            summary,
            meta: envelope.meta.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn input(filters: &[&str], all: bool) -> InputArgs {
        InputArgs {
            path: PathBuf::from("-"),
            filters: filters.iter().map(|s| s.to_string()).collect(),
            all,
            no_config: true,
        }
    }

    fn envelope() -> Envelope {
        let mut data = Vec::new();
        for (i, (status, delta, severity)) in [
            ("FAIL", "new", "low"),
            ("FAIL", "new", "critical"),
            ("PASS", "new", "high"),
            ("FAIL", "changed", "high"),
            ("FAIL", "new", "medium"),
        ]
        .iter()
        .enumerate()
        {
            data.push(json!({
                "type": "findings",
                "id": format!("f{}", i + 1),
                "attributes": {
                    "status": status,
                    "delta": delta,
                    "severity": severity,
                    "inserted_at": format!("2024-05-0{}T12:00:00Z", i + 1)
                },
                "relationships": {
                    "scan": { "data": { "type": "scans", "id": "s1" } },
                    "resources": { "data": [{ "type": "resources", "id": "r1" }] }
                }
            }));
        }
        serde_json::from_value(json!({
            "data": data,
            "included": [
                {
                    "type": "scans", "id": "s1",
                    "relationships": { "provider": { "data": { "type": "providers", "id": "p1" } } }
                },
                { "type": "resources", "id": "r1" },
                { "type": "providers", "id": "p1", "attributes": { "provider": "gcp" } }
            ],
            "meta": { "version": "v1" }
        }))
        .unwrap()
    }

    fn ids(report: &OverviewReport) -> Vec<&str> {
        report.findings.iter().map(|f| f.display_id()).collect()
    }

    #[test]
    fn default_filters_sort_and_summarize() {
        let overview = Overview::new(&input(&[], false), None, None).unwrap();
        let report = overview.build(&envelope());

        assert_eq!(report.findings_total, 5);
        assert_eq!(ids(&report), ["f2", "f5", "f1"]);
        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.by_status.fail, 3);
        assert_eq!(report.source, "<stdin>");
        assert_eq!(report.meta, Some(json!({ "version": "v1" })));
        assert!(report
            .findings
            .iter()
            .all(|f| f.relationships.provider.as_ref().and_then(|p| p.attr_str("provider")) == Some("gcp")));
    }

    #[test]
    fn limit_applies_after_summary() {
        let overview = Overview::new(&input(&[], true), Some(2), None).unwrap();
        let report = overview.build(&envelope());
        assert_eq!(ids(&report), ["f2", "f4"]);
        assert_eq!(report.summary.total, 5);
    }

    #[test]
    fn cli_filters_override_config_and_defaults() {
        let config: FindexConfig = toml::from_str(
            "[filters]\n\"filter[delta]\" = \"changed\"\n\n[output]\nlimit = 1\n",
        )
        .unwrap();
        let overview = Overview::new(
            &input(&["filter[delta]=", "filter[severity__in]=high,medium"], false),
            None,
            Some(&config),
        )
        .unwrap();
        let report = overview.build(&envelope());
        // status=FAIL from defaults, delta removed, severity in {high, medium}
        assert_eq!(report.summary.total, 2);
        assert_eq!(ids(&report), ["f4"]);
    }

    #[test]
    fn invalid_cli_filter_is_rejected() {
        assert!(Overview::new(&input(&["severity=high"], false), None, None).is_err());
    }

    #[test]
    fn empty_response_gives_empty_report() {
        let overview = Overview::new(&input(&[], false), None, None).unwrap();
        let report = overview.build(&Envelope::default());
        assert!(report.findings.is_empty());
        assert_eq!(report.summary, OverviewSummary::default());
    }
}
