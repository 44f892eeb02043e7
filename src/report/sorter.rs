use std::cmp::Ordering;

use crate::expand::DenormalizedFinding;
use crate::report::overview::FindingAttributes;

/// Sort by severity (critical first), then newest `inserted_at` first.
/// Findings without a parsable timestamp go after dated ones; ties keep
/// response order.
pub fn sort_findings(mut findings: Vec<DenormalizedFinding>) -> Vec<DenormalizedFinding> {
    findings.sort_by(|a, b| {
        b.severity()
            .cmp(&a.severity())
            .then_with(|| match (a.inserted_at(), b.inserted_at()) {
                (Some(ta), Some(tb)) => tb.cmp(&ta),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    });
    findings
}

/// Keep the first `limit` findings; `0` keeps everything
pub fn apply_limit(mut findings: Vec<DenormalizedFinding>, limit: usize) -> Vec<DenormalizedFinding> {
    if limit > 0 {
        findings.truncate(limit);
    }
    findings
}
