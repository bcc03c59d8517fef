//! Dashboard rendering.
//!
//! Turns a [`DashboardSnapshot`] into plain text for the terminal or
//! pretty-printed JSON for other tools.

use crate::views::{
    AnalysisSummaryView, ComplianceLevel, DashboardSnapshot, EncroachmentMapView,
    ImageGalleryView, InsightsView, RiskLevel,
};
use anyhow::{Context, Result};
use std::path::Path;

/// Render every view in the snapshot as plain text.
pub fn render_text(snapshot: &DashboardSnapshot) -> String {
    let mut output = String::new();

    output.push_str("Zone Analysis Dashboard\n");
    output.push_str("=======================\n\n");

    if snapshot.is_empty() {
        output.push_str("No analysis results yet. Run an analysis with --zone.\n");
        return output;
    }

    if let Some(updated) = snapshot.last_updated {
        output.push_str(&format!(
            "Last updated: {}\n\n",
            updated.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }

    if let Some(ref summary) = snapshot.summary {
        output.push_str(&summary_section(summary));
    }
    if let Some(ref map) = snapshot.map {
        output.push_str(&map_section(map));
    }
    if let Some(ref gallery) = snapshot.gallery {
        output.push_str(&gallery_section(gallery));
    }
    if let Some(ref insights) = snapshot.insights {
        output.push_str(&insights_section(insights));
    }

    output
}

fn summary_section(summary: &AnalysisSummaryView) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str(&format!("- Zone: {}\n", summary.zone));
    section.push_str(&format!("- Status: {}\n", summary.status));
    section.push_str(&format!(
        "- Images generated: {}\n",
        summary.images_generated
    ));
    for (key, value) in &summary.metrics {
        section.push_str(&format!("- {}: {}\n", key, value));
    }
    section.push('\n');

    section
}

fn map_section(map: &EncroachmentMapView) -> String {
    let mut section = String::new();

    section.push_str("## Encroachment Map\n\n");
    if map.is_placeholder {
        section.push_str(&format!("- Placeholder: {}\n\n", map.image_url));
    } else {
        section.push_str(&format!("- {}\n\n", map.image_url));
    }

    section
}

fn gallery_section(gallery: &ImageGalleryView) -> String {
    let mut section = String::new();

    section.push_str(&format!("## Analysis Images - {}\n\n", gallery.zone));
    if gallery.is_empty() {
        section.push_str("No images available.\n\n");
        return section;
    }

    for image in &gallery.images {
        section.push_str(&format!("### {}\n", image.label));
        section.push_str(&format!("{}\n", image.description));
        section.push_str(&format!("- URL: {}\n", image.url));
        section.push_str(&format!(
            "- Save as: {}\n\n",
            image.download_name(&gallery.zone)
        ));
    }

    section
}

fn insights_section(insights: &InsightsView) -> String {
    let mut section = String::new();

    section.push_str("## AI Insights\n\n");
    if !insights.has_content() {
        section.push_str("No AI insights in this result.\n\n");
        return section;
    }

    if let Some(ref summary) = insights.executive_summary {
        section.push_str(&format!("{}\n\n", summary));
    }

    if let Some(ref status) = insights.compliance_status {
        section.push_str(&format!(
            "- Compliance: {} {}\n",
            compliance_icon(insights.compliance),
            status
        ));
    }
    if let Some(ref risk) = insights.risk_level {
        section.push_str(&format!("- Risk: {} {}\n", risk_icon(insights.risk), risk));
    }
    if let Some(ref trend) = insights.construction_trend {
        section.push_str(&format!("- Construction trend: {}\n", trend));
    }
    section.push('\n');

    if let Some(ref site) = insights.site {
        section.push_str("### Site Assessment\n\n");
        if let Some(ref status) = site.encroachment_status {
            section.push_str(&format!("- Encroachment: {}\n", status));
        }
        section.push_str(&format!(
            "- Construction: {:.1}%\n",
            site.construction_percentage
        ));
        section.push_str(&format!("- Vegetation: {:.1}%\n", site.vegetation_percentage));
        section.push_str(&format!("- Idle status: {}\n", site.idle_status));
        if let Some(ref explanation) = site.explanation {
            section.push_str(&format!("\n{}\n", explanation));
        }
        section.push('\n');
    }

    section.push_str(&bullet_list("Key Findings", &insights.key_findings));
    section.push_str(&bullet_list("Recommendations", &insights.recommendations));

    if !insights.comparative_findings.is_empty() {
        section.push_str("### Plan vs Ground Reality\n\n");
        section.push_str(
            "| Category | Manual Plan | Satellite | Ground Reality | Discrepancy | Action |\n",
        );
        section.push_str("|---|---|---|---|---|---|\n");
        for row in &insights.comparative_findings {
            let marker = if row.is_major_discrepancy() { "⚠️ " } else { "" };
            section.push_str(&format!(
                "| {} | {} | {} | {} | {}{} | {} |\n",
                row.category,
                row.manual_plan,
                row.satellite_analysis,
                row.ground_reality,
                marker,
                row.discrepancy,
                row.action
            ));
        }
        section.push('\n');
    }

    section.push_str(&plot_list("Encroachment plots", &insights.encroachment_plots));
    section.push_str(&plot_list("Idle plots", &insights.idle_plots));
    section.push_str(&plot_list(
        "Low vegetation plots",
        &insights.low_vegetation_plots,
    ));

    section
}

fn bullet_list(title: &str, items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }

    let mut section = format!("### {}\n\n", title);
    for item in items {
        section.push_str(&format!("- {}\n", item));
    }
    section.push('\n');
    section
}

fn plot_list(title: &str, plots: &[String]) -> String {
    if plots.is_empty() {
        return String::new();
    }
    format!("{}: {}\n", title, plots.join(", "))
}

fn compliance_icon(level: ComplianceLevel) -> &'static str {
    match level {
        ComplianceLevel::Compliant => "🟢",
        ComplianceLevel::UnderReview => "🟡",
        ComplianceLevel::NonCompliant => "🔴",
        ComplianceLevel::Unknown => "⚪",
    }
}

fn risk_icon(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::High => "🔴",
        RiskLevel::Medium => "🟡",
        RiskLevel::Low => "🟢",
        RiskLevel::Unknown => "⚪",
    }
}

/// Render the snapshot as pretty-printed JSON.
pub fn render_json(snapshot: &DashboardSnapshot) -> Result<String> {
    serde_json::to_string_pretty(snapshot).map_err(Into::into)
}

/// Write rendered output to a file.
pub fn write_output(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write output to {}", path.display()))
}
