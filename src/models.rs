//! Data models for project comparisons.
//!
//! This module contains the core data structures used throughout the
//! application for representing metric kinds, per-project metric rows,
//! and the aligned comparison datasets handed to the renderers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The analytics dimension being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricKind {
    /// Histogram of open issues by days spent open.
    TimeOpen,
    /// Issue counts per workflow status.
    StatusDistribution,
    /// Total logged time per author.
    TimeSpent,
    /// Issue counts per priority.
    Priority,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl MetricKind {
    /// All metric kinds, in dashboard tab order.
    pub const ALL: [MetricKind; 4] = [
        MetricKind::TimeOpen,
        MetricKind::StatusDistribution,
        MetricKind::TimeSpent,
        MetricKind::Priority,
    ];

    /// URL slug, also used as the endpoint's last path segment.
    pub fn slug(&self) -> &'static str {
        match self {
            MetricKind::TimeOpen => "time-open",
            MetricKind::StatusDistribution => "status-distribution",
            MetricKind::TimeSpent => "time-spent",
            MetricKind::Priority => "priority",
        }
    }

    /// Path of the comparison endpoint, relative to the backend base URL.
    pub fn endpoint_path(&self) -> String {
        format!("/api/v1/compare/{}", self.slug())
    }

    /// Human-readable chart title.
    pub fn title(&self) -> &'static str {
        match self {
            MetricKind::TimeOpen => "Time spent in open state (days)",
            MetricKind::StatusDistribution => "Issue distribution by status",
            MetricKind::TimeSpent => "Time spent per author",
            MetricKind::Priority => "Issue distribution by priority",
        }
    }

    /// Chart widget used to display this metric.
    pub fn chart_style(&self) -> ChartStyle {
        match self {
            MetricKind::TimeOpen => ChartStyle::Bar,
            MetricKind::StatusDistribution => ChartStyle::Doughnut,
            MetricKind::TimeSpent => ChartStyle::HorizontalBar,
            MetricKind::Priority => ChartStyle::Pie,
        }
    }

    /// JSON field holding the category label in a row object.
    pub fn category_field(&self) -> &'static str {
        match self {
            MetricKind::TimeOpen => "range",
            MetricKind::StatusDistribution => "status",
            MetricKind::TimeSpent => "author",
            MetricKind::Priority => "priority",
        }
    }

    /// JSON field holding the numeric value in a row object.
    pub fn value_field(&self) -> &'static str {
        match self {
            MetricKind::TimeSpent => "total_time_spent",
            _ => "count",
        }
    }
}

/// Visual family of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartStyle {
    Bar,
    HorizontalBar,
    Pie,
    Doughnut,
}

impl ChartStyle {
    /// Segment charts color each category; bar charts color each project.
    pub fn is_segmented(&self) -> bool {
        matches!(self, ChartStyle::Pie | ChartStyle::Doughnut)
    }
}

/// Identifier of a tracked project (e.g. `"PROJ"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectKey(String);

impl ProjectKey {
    /// Creates a key from user input, trimming whitespace.
    ///
    /// Returns `None` for blank input.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One `{category, value}` row of a project's metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRow {
    /// Range bucket, status, author or priority name.
    pub category: String,
    /// Count of issues, or total time spent.
    pub value: u64,
}

impl MetricRow {
    pub fn new(category: impl Into<String>, value: u64) -> Self {
        Self {
            category: category.into(),
            value,
        }
    }
}

/// Metric rows of a single project, in backend order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSeries {
    pub rows: Vec<MetricRow>,
}

impl MetricSeries {
    pub fn new(rows: Vec<MetricRow>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

}

/// Decoded comparison response: project key to that project's metric.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonPayload {
    pub projects: HashMap<ProjectKey, MetricSeries>,
}

impl ComparisonPayload {
    pub fn is_empty(&self) -> bool {
        self.projects.values().all(MetricSeries::is_empty)
    }

    pub fn get(&self, key: &ProjectKey) -> Option<&MetricSeries> {
        self.projects.get(key)
    }

    pub fn insert(&mut self, key: ProjectKey, series: MetricSeries) {
        self.projects.insert(key, series);
    }
}

/// Display color as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` or `rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Colors of one project's series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SeriesColors {
    /// A single base color for the whole series (bar-style charts).
    Solid(Color),
    /// One color per category, aligned with the category axis.
    PerCategory(Vec<Color>),
}

/// One project's values aligned with the dataset's category axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSeries {
    pub project: ProjectKey,
    pub values: Vec<u64>,
    pub colors: SeriesColors,
}

impl ProjectSeries {
    /// Sum of all values, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.values.iter().fold(0, |acc, v| acc.saturating_add(*v))
    }
}

/// Multi-series dataset ready for a chart widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonDataset {
    pub kind: MetricKind,
    pub labels: Vec<String>,
    pub series: Vec<ProjectSeries>,
}

impl ComparisonDataset {
    /// True if every series is aligned with the category axis.
    pub fn is_aligned(&self) -> bool {
        self.series.iter().all(|s| {
            s.values.len() == self.labels.len()
                && match &s.colors {
                    SeriesColors::Solid(_) => true,
                    SeriesColors::PerCategory(colors) => colors.len() == self.labels.len(),
                }
        })
    }
}

/// Why a chart could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum NoDataReason {
    /// Connection, timeout or non-success HTTP status.
    Transport(String),
    /// The backend answered with no rows for any project.
    EmptyPayload,
    /// The response body did not have the expected shape.
    Malformed(String),
    /// A selected project had no payload at all.
    MissingProject(ProjectKey),
}

impl fmt::Display for NoDataReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoDataReason::Transport(msg) => write!(f, "request failed: {}", msg),
            NoDataReason::EmptyPayload => write!(f, "backend returned no data"),
            NoDataReason::Malformed(msg) => write!(f, "unexpected response: {}", msg),
            NoDataReason::MissingProject(key) => write!(f, "no data for project {}", key),
        }
    }
}

/// Result of building one comparison chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparisonOutcome {
    Ready(ComparisonDataset),
    NoData(NoDataReason),
}

impl ComparisonOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, ComparisonOutcome::Ready(_))
    }

    pub fn dataset(&self) -> Option<&ComparisonDataset> {
        match self {
            ComparisonOutcome::Ready(dataset) => Some(dataset),
            ComparisonOutcome::NoData(_) => None,
        }
    }
}

/// Metadata about a comparison report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Base URL of the analytics backend.
    pub backend_url: String,
    /// Compared projects, in selection order.
    pub projects: Vec<ProjectKey>,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Time spent fetching and aggregating, in seconds.
    pub duration_seconds: f64,
}

/// One chart of a report.
#[derive(Debug, Clone)]
pub struct ChartEntry {
    pub kind: MetricKind,
    pub outcome: ComparisonOutcome,
}

/// The complete comparison report.
#[derive(Debug, Clone)]
pub struct ComparisonReport {
    pub metadata: ReportMetadata,
    pub charts: Vec<ChartEntry>,
}

impl ComparisonReport {
    /// Number of charts that ended in the no-data state.
    pub fn no_data_count(&self) -> usize {
        self.charts.iter().filter(|c| !c.outcome.is_ready()).count()
    }
}
