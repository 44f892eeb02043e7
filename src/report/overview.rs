use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::expand::DenormalizedFinding;

/// Severity of a finding, lowest first so `Ord` ranks critical highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Unknown,
    Informational,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn from_attr(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            "informational" | "info" => Severity::Informational,
            _ => Severity::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Informational => "informational",
            Severity::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Check result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Pass,
    Fail,
    Manual,
    Other,
}

impl Status {
    pub fn from_attr(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "PASS" => Status::Pass,
            "FAIL" => Status::Fail,
            "MANUAL" => Status::Manual,
            _ => Status::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pass => "PASS",
            Status::Fail => "FAIL",
            Status::Manual => "MANUAL",
            Status::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Typed views over the attributes the overview sorts and counts by
pub trait FindingAttributes {
    fn severity(&self) -> Severity;
    fn status(&self) -> Status;
    fn inserted_at(&self) -> Option<DateTime<FixedOffset>>;
}

impl FindingAttributes for DenormalizedFinding {
    fn severity(&self) -> Severity {
        self.attr_str("severity")
            .map(Severity::from_attr)
            .unwrap_or(Severity::Unknown)
    }

    fn status(&self) -> Status {
        self.attr_str("status")
            .map(Status::from_attr)
            .unwrap_or(Status::Other)
    }

    fn inserted_at(&self) -> Option<DateTime<FixedOffset>> {
        self.attr_str("inserted_at")
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
    }
}

/// The overview produced for one response
#[derive(Debug, Clone, Serialize)]
pub struct OverviewReport {
    /// findex version
    pub version: String,

    /// When the overview was generated
    pub timestamp: String,

    /// Where the response was read from
    pub source: String,

    /// Findings in the response before filtering
    pub findings_total: usize,

    /// Findings after filtering, sorting and the display limit
    pub findings: Vec<DenormalizedFinding>,

    /// Counts over the filtered findings (before the limit)
    pub summary: OverviewSummary,

    /// Response `meta`, passed through untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OverviewSummary {
    pub total: usize,
    pub by_severity: SeverityCounts,
    pub by_status: StatusCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub informational: usize,
    pub unknown: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pass: usize,
    pub fail: usize,
    pub manual: usize,
    pub other: usize,
}

impl OverviewSummary {
    pub fn from_findings(findings: &[DenormalizedFinding]) -> Self {
        let mut summary = OverviewSummary {
            total: findings.len(),
            ..Default::default()
        };
        for f in findings {
            let sev = &mut summary.by_severity;
            match f.severity() {
                Severity::Critical => sev.critical += 1,
                Severity::High => sev.high += 1,
                Severity::Medium => sev.medium += 1,
                Severity::Low => sev.low += 1,
                Severity::Informational => sev.informational += 1,
                Severity::Unknown => sev.unknown += 1,
            }
            let status = &mut summary.by_status;
            match f.status() {
                Status::Pass => status.pass += 1,
                Status::Fail => status.fail += 1,
                Status::Manual => status.manual += 1,
                Status::Other => status.other += 1,
            }
        }
        summary
    }
}

/// Bare finding with the given attributes, no relationships
#[cfg(test)]
pub(crate) fn finding(id: &str, attrs: Value) -> DenormalizedFinding {
    DenormalizedFinding {
        kind: "findings".to_string(),
        id: Some(id.to_string()),
        attributes: attrs.as_object().cloned().unwrap_or_default(),
        relationships: crate::expand::ResolvedRelationships::default(),
        links: None,
        meta: None,
    }
}
