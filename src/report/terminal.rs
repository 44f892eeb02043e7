use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use owo_colors::OwoColorize;

use crate::expand::DenormalizedFinding;
use crate::jsonapi::Entity;
use crate::report::overview::{FindingAttributes, OverviewReport, OverviewSummary, Severity, Status};

const MISSING: &str = "-";

/// Render an overview to the terminal: summary bar plus findings table
pub fn render(report: &OverviewReport) {
    println!();
    println!(
        "{}  findex v{} — {}",
        "🔍".bold(),
        report.version,
        report.source.dimmed()
    );
    println!();

    if report.findings.is_empty() {
        println!("  {}  No findings match the current filters", "✅".bold());
        println!();
        render_summary(&report.summary, report.findings_total);
        return;
    }

    println!("{}", findings_table(&report.findings));
    println!();

    if report.findings.len() < report.summary.total {
        println!(
            " Showing {} of {} matching findings",
            report.findings.len().to_string().bold(),
            report.summary.total
        );
    }
    render_summary(&report.summary, report.findings_total);
}

/// Render only the severity/status counts
pub fn render_summary(summary: &OverviewSummary, findings_total: usize) {
    println!("{}", "━".repeat(60));

    let sev = &summary.by_severity;
    let mut severity_parts = Vec::new();
    if sev.critical > 0 {
        severity_parts.push(format!("{} critical", sev.critical).red().bold().to_string());
    }
    if sev.high > 0 {
        severity_parts.push(format!("{} high", sev.high).yellow().bold().to_string());
    }
    if sev.medium > 0 {
        severity_parts.push(format!("{} medium", sev.medium).blue().to_string());
    }
    if sev.low > 0 {
        severity_parts.push(format!("{} low", sev.low).white().to_string());
    }
    if sev.informational > 0 {
        severity_parts.push(format!("{} informational", sev.informational).dimmed().to_string());
    }
    if sev.unknown > 0 {
        severity_parts.push(format!("{} unknown", sev.unknown).dimmed().to_string());
    }

    println!(
        " {} findings ({} in response): {}",
        summary.total.to_string().bold(),
        findings_total,
        severity_parts.join(", ")
    );

    let st = &summary.by_status;
    println!(
        " By status: {} fail, {} pass, {} manual{}",
        st.fail.to_string().red(),
        st.pass.to_string().green(),
        st.manual,
        if st.other > 0 {
            format!(", {} other", st.other)
        } else {
            String::new()
        }
    );

    println!("{}", "━".repeat(60));
    println!();
}

/// Build the findings table
pub fn findings_table(findings: &[DenormalizedFinding]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Severity", "Status", "Check", "Resource", "Region", "Provider", "Scan", "Inserted",
        ]);

    for finding in findings {
        let rel = &finding.relationships;
        table.add_row(vec![
            severity_cell(finding.severity()),
            status_cell(finding.status()),
            Cell::new(finding.attr_str("check_id").unwrap_or(MISSING)),
            Cell::new(entity_label(rel.resource.as_ref(), &["name", "uid"])),
            Cell::new(
                rel.resource
                    .as_ref()
                    .and_then(|r| r.attr_str("region"))
                    .unwrap_or(MISSING),
            ),
            Cell::new(provider_label(rel.provider.as_ref())),
            Cell::new(entity_label(rel.scan.as_ref(), &["name"])),
            Cell::new(
                finding
                    .inserted_at()
                    .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| MISSING.to_string()),
            ),
        ]);
    }

    table
}

fn severity_cell(severity: Severity) -> Cell {
    let cell = Cell::new(severity.as_str());
    match severity {
        Severity::Critical => cell.fg(Color::Red).add_attribute(Attribute::Bold),
        Severity::High => cell.fg(Color::Yellow).add_attribute(Attribute::Bold),
        Severity::Medium => cell.fg(Color::Blue),
        Severity::Low | Severity::Informational | Severity::Unknown => cell,
    }
}

fn status_cell(status: Status) -> Cell {
    let cell = Cell::new(status.as_str());
    match status {
        Status::Fail => cell.fg(Color::Red),
        Status::Pass => cell.fg(Color::Green),
        Status::Manual | Status::Other => cell,
    }
}

/// First present attribute of `keys`, else the entity id, else `-`
fn entity_label(entity: Option<&Entity>, keys: &[&str]) -> String {
    let Some(entity) = entity else {
        return MISSING.to_string();
    };
    keys.iter()
        .find_map(|k| entity.attr_str(k).filter(|v| !v.is_empty()))
        .or(entity.id.as_deref())
        .unwrap_or(MISSING)
        .to_string()
}

/// `aws: prod-account` style label
fn provider_label(provider: Option<&Entity>) -> String {
    let Some(provider) = provider else {
        return MISSING.to_string();
    };
    let name = entity_label(Some(provider), &["alias", "uid"]);
    match provider.attr_str("provider") {
        Some(kind) => format!("{}: {}", kind, name),
        None => name,
    }
}
