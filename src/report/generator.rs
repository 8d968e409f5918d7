//! Comparison report generation.
//!
//! This module renders comparison datasets either as a Markdown report with
//! one table per metric, or as JSON shaped like a chart widget's input.

use crate::analysis::{leader_for, project_totals};
use crate::models::{
    ChartEntry, ComparisonDataset, ComparisonOutcome, ComparisonReport, MetricKind,
    NoDataReason, ReportMetadata, SeriesColors,
};
use anyhow::Result;
use serde_json::{json, Value};

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &ComparisonReport) -> String {
    let mut output = String::new();

    output.push_str("# Project Comparison Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_table_of_contents(report));

    for chart in &report.charts {
        output.push_str(&generate_chart_section(chart));
    }

    output.push_str(&generate_footer());

    output
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    let projects: Vec<&str> = metadata.projects.iter().map(|p| p.as_str()).collect();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Backend:** {}\n", metadata.backend_url));
    section.push_str(&format!("- **Projects:** {}\n", projects.join(", ")));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

fn generate_table_of_contents(report: &ComparisonReport) -> String {
    let mut toc = String::new();

    toc.push_str("## Contents\n\n");
    for chart in &report.charts {
        toc.push_str(&format!(
            "- [{}](#{})\n",
            chart.kind.title(),
            chart.kind.slug()
        ));
    }
    toc.push('\n');

    toc
}

fn generate_chart_section(chart: &ChartEntry) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "## {} {{#{}}}\n\n",
        chart.kind.title(),
        chart.kind.slug()
    ));

    match &chart.outcome {
        ComparisonOutcome::Ready(dataset) => {
            section.push_str(&format!(
                "*Chart: {:?} | Categories: {}*\n\n",
                chart.kind.chart_style(),
                dataset.labels.len()
            ));
            section.push_str(&generate_dataset_table(dataset));
            section.push_str(&generate_color_legend(dataset));
        }
        ComparisonOutcome::NoData(reason) => {
            section.push_str(&generate_no_data_block(reason));
        }
    }

    section
}

/// Categories as rows, projects as columns, plus a totals row.
fn generate_dataset_table(dataset: &ComparisonDataset) -> String {
    let mut table = String::new();

    table.push_str("| Category |");
    for series in &dataset.series {
        table.push_str(&format!(" {} |", series.project));
    }
    table.push_str(" Leader |\n");

    table.push_str("|:---|");
    for _ in &dataset.series {
        table.push_str("---:|");
    }
    table.push_str(":---:|\n");

    for (index, label) in dataset.labels.iter().enumerate() {
        table.push_str(&format!("| {} |", label));
        for series in &dataset.series {
            table.push_str(&format!(
                " {} |",
                format_value(dataset.kind, series.values[index])
            ));
        }
        let leader = leader_for(dataset, index)
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        table.push_str(&format!(" {} |\n", leader));
    }

    table.push_str("| **Total** |");
    for (_, total) in project_totals(dataset) {
        table.push_str(&format!(" **{}** |", format_value(dataset.kind, total)));
    }
    table.push_str(" |\n\n");

    table
}

fn generate_color_legend(dataset: &ComparisonDataset) -> String {
    let mut legend = String::from("**Colors:**\n\n");

    for series in &dataset.series {
        match &series.colors {
            SeriesColors::Solid(color) => {
                legend.push_str(&format!("- {}: `{}`\n", series.project, color));
            }
            SeriesColors::PerCategory(colors) => {
                let swatches: Vec<String> = dataset
                    .labels
                    .iter()
                    .zip(colors)
                    .map(|(label, color)| format!("{} `{}`", label, color))
                    .collect();
                legend.push_str(&format!("- {}: {}\n", series.project, swatches.join(", ")));
            }
        }
    }
    legend.push('\n');

    legend
}

fn generate_no_data_block(reason: &NoDataReason) -> String {
    format!("> ⚠️ **No data:** {}\n\n", reason)
}

fn generate_footer() -> String {
    "---\n\n*Report generated by issue-compare*\n".to_string()
}

/// Format a value for display; time spent is stored in seconds.
pub fn format_value(kind: MetricKind, value: u64) -> String {
    match kind {
        MetricKind::TimeSpent => format!("{:.1}h", value as f64 / 3600.0),
        _ => value.to_string(),
    }
}

/// Chart-widget input for one dataset.
pub fn chart_data(dataset: &ComparisonDataset) -> Value {
    let datasets: Vec<Value> = dataset
        .series
        .iter()
        .map(|series| {
            let (background, border, width) = match &series.colors {
                SeriesColors::Solid(color) => (json!(color), json!(color), 1),
                SeriesColors::PerCategory(colors) => (json!(colors), json!("#ffffff"), 2),
            };
            json!({
                "label": series.project,
                "data": series.values,
                "backgroundColor": background,
                "borderColor": border,
                "borderWidth": width,
            })
        })
        .collect();

    json!({
        "labels": dataset.labels,
        "datasets": datasets,
    })
}

fn chart_json(chart: &ChartEntry) -> Value {
    match &chart.outcome {
        ComparisonOutcome::Ready(dataset) => json!({
            "metric": chart.kind,
            "title": chart.kind.title(),
            "chart": chart.kind.chart_style(),
            "status": "ready",
            "data": chart_data(dataset),
        }),
        ComparisonOutcome::NoData(reason) => json!({
            "metric": chart.kind,
            "title": chart.kind.title(),
            "chart": chart.kind.chart_style(),
            "status": "no_data",
            "reason": reason.to_string(),
            "cause": reason,
        }),
    }
}

/// Generate a JSON report.
pub fn generate_json_report(report: &ComparisonReport) -> Result<String> {
    let value = json!({
        "metadata": report.metadata,
        "charts": report.charts.iter().map(chart_json).collect::<Vec<_>>(),
    });

    serde_json::to_string_pretty(&value).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{aggregate, AggregateOptions};
    use crate::models::{ComparisonPayload, MetricRow, MetricSeries, ProjectKey};
    use chrono::Utc;

    fn key(s: &str) -> ProjectKey {
        ProjectKey::new(s).unwrap()
    }

    fn status_dataset() -> ComparisonDataset {
        let mut payload = ComparisonPayload::default();
        payload.insert(key("A"), MetricSeries::new(vec![MetricRow::new("X", 5)]));
        payload.insert(key("B"), MetricSeries::new(vec![MetricRow::new("Y", 3)]));

        aggregate(
            MetricKind::StatusDistribution,
            &[key("A"), key("B")],
            &payload,
            &AggregateOptions::default(),
        )
        .dataset()
        .cloned()
        .unwrap()
    }

    fn create_test_report() -> ComparisonReport {
        ComparisonReport {
            metadata: ReportMetadata {
                backend_url: "http://localhost:8000".to_string(),
                projects: vec![key("A"), key("B")],
                generated_at: Utc::now(),
                duration_seconds: 0.4,
            },
            charts: vec![
                ChartEntry {
                    kind: MetricKind::StatusDistribution,
                    outcome: ComparisonOutcome::Ready(status_dataset()),
                },
                ChartEntry {
                    kind: MetricKind::TimeOpen,
                    outcome: ComparisonOutcome::NoData(NoDataReason::EmptyPayload),
                },
            ],
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("# Project Comparison Report"));
        assert!(markdown.contains("- **Projects:** A, B"));
        assert!(markdown.contains("## Issue distribution by status {#status-distribution}"));
        assert!(markdown.contains("| X | 5 | 0 | A |"));
        assert!(markdown.contains("| Y | 0 | 3 | B |"));
        assert!(markdown.contains("**No data:** backend returned no data"));
    }

    #[test]
    fn test_format_time_spent_in_hours() {
        assert_eq!(format_value(MetricKind::TimeSpent, 5400), "1.5h");
        assert_eq!(format_value(MetricKind::Priority, 7), "7");
    }

    #[test]
    fn test_chart_data_shape() {
        let data = chart_data(&status_dataset());

        assert_eq!(data["labels"], json!(["X", "Y"]));
        assert_eq!(data["datasets"][0]["label"], json!("A"));
        assert_eq!(data["datasets"][0]["data"], json!([5, 0]));
        assert_eq!(data["datasets"][1]["data"], json!([0, 3]));
        assert_eq!(data["datasets"][0]["borderColor"], json!("#ffffff"));
        assert_eq!(
            data["datasets"][0]["backgroundColor"]
                .as_array()
                .map(|a| a.len()),
            Some(2)
        );
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["charts"][0]["status"], json!("ready"));
        assert_eq!(value["charts"][0]["metric"], json!("status-distribution"));
        assert_eq!(value["charts"][0]["chart"], json!("doughnut"));
        assert_eq!(value["charts"][1]["status"], json!("no_data"));
        assert_eq!(value["charts"][1]["cause"]["kind"], json!("empty_payload"));
        assert_eq!(value["metadata"]["projects"], json!(["A", "B"]));
    }
}
