use anyhow::Result;

use crate::report::overview::OverviewReport;

/// Render an overview as pretty-printed JSON
pub fn render(report: &OverviewReport) -> Result<String> {
    let json = serde_json::to_string_pretty(report)?;
    Ok(json)
}
