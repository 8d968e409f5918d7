//! Comparison aggregation.
//!
//! This module merges per-project metric payloads into one dataset whose
//! series all share the same category axis, ready for a chart widget.

use crate::analysis::palette::Palette;
use crate::models::{
    ComparisonDataset, ComparisonOutcome, ComparisonPayload, MetricKind, MetricSeries,
    NoDataReason, ProjectKey, ProjectSeries,
};
use std::collections::HashMap;
use tracing::debug;

/// Authors kept on the time-spent axis.
pub const DEFAULT_TOP_AUTHORS: usize = 10;

/// Settings for building a comparison dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateOptions {
    /// Maximum number of authors on the time-spent axis.
    pub top_authors: usize,
    pub palette: Palette,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            top_authors: DEFAULT_TOP_AUTHORS,
            palette: Palette::default(),
        }
    }
}

/// Build the comparison dataset for `selection` from a decoded payload.
///
/// A selected project without rows turns the whole chart into the no-data
/// state; only individual categories are zero-filled.
pub fn aggregate(
    kind: MetricKind,
    selection: &[ProjectKey],
    payload: &ComparisonPayload,
    options: &AggregateOptions,
) -> ComparisonOutcome {
    if payload.is_empty() {
        return ComparisonOutcome::NoData(NoDataReason::EmptyPayload);
    }

    let mut sources: Vec<&MetricSeries> = Vec::with_capacity(selection.len());
    for key in selection {
        match payload.get(key) {
            Some(series) if !series.is_empty() => sources.push(series),
            _ => {
                debug!("No {} rows for project {}", kind, key);
                return ComparisonOutcome::NoData(NoDataReason::MissingProject(key.clone()));
            }
        }
    }

    let labels = category_axis(kind, &sources, options.top_authors);
    if labels.is_empty() {
        return ComparisonOutcome::NoData(NoDataReason::EmptyPayload);
    }

    let series = selection
        .iter()
        .zip(&sources)
        .enumerate()
        .map(|(index, (key, source))| ProjectSeries {
            project: key.clone(),
            values: align_values(&labels, source),
            colors: options.palette.assign(kind, labels.len(), index),
        })
        .collect();

    ComparisonOutcome::Ready(ComparisonDataset {
        kind,
        labels,
        series,
    })
}

/// Compute the ordered category axis for a metric kind.
pub fn category_axis(kind: MetricKind, sources: &[&MetricSeries], top_authors: usize) -> Vec<String> {
    match kind {
        MetricKind::TimeOpen => {
            let mut labels = first_seen_categories(sources);
            sort_time_open_buckets(&mut labels);
            labels
        }
        MetricKind::TimeSpent => top_categories_by_total(sources, top_authors),
        MetricKind::StatusDistribution | MetricKind::Priority => first_seen_categories(sources),
    }
}

/// Union of categories in first-seen order.
pub fn first_seen_categories(sources: &[&MetricSeries]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();

    for source in sources {
        for row in &source.rows {
            if !labels.contains(&row.category) {
                labels.push(row.category.clone());
            }
        }
    }

    labels
}

/// Values of `source` over `labels`, zero where the category is absent.
pub fn align_values(labels: &[String], source: &MetricSeries) -> Vec<u64> {
    let mut by_category: HashMap<&str, u64> = HashMap::new();
    for row in &source.rows {
        let value = by_category.entry(row.category.as_str()).or_default();
        *value = value.saturating_add(row.value);
    }

    labels
        .iter()
        .map(|label| by_category.get(label.as_str()).copied().unwrap_or(0))
        .collect()
}

/// Top `n` categories by value summed across all sources, descending.
///
/// Ties keep first-seen order.
pub fn top_categories_by_total(sources: &[&MetricSeries], n: usize) -> Vec<String> {
    let mut totals: Vec<(String, u64)> = Vec::new();

    for source in sources {
        for row in &source.rows {
            match totals.iter_mut().find(|(name, _)| *name == row.category) {
                Some((_, total)) => *total = total.saturating_add(row.value),
                None => totals.push((row.category.clone(), row.value)),
            }
        }
    }

    // Stable sort keeps first-seen order among equal totals
    totals.sort_by_key(|(_, total)| std::cmp::Reverse(*total));
    totals.truncate(n);

    totals.into_iter().map(|(name, _)| name).collect()
}

/// Sort key of a time-open range label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BucketBound {
    /// `"3-5"` or `"7"`: ordered by lower bound.
    Bounded(u64),
    /// Labels without a numeric lower bound.
    Unparsed,
    /// `"30+"`: unbounded above, always last.
    OpenEnded(u64),
}

impl BucketBound {
    pub fn parse(label: &str) -> Self {
        let label = label.trim();

        if let Some(lower) = label.strip_suffix('+') {
            return BucketBound::OpenEnded(lower.trim().parse().unwrap_or(u64::MAX));
        }

        let lower = label.split('-').next().unwrap_or("").trim();
        match lower.parse() {
            Ok(bound) => BucketBound::Bounded(bound),
            Err(_) => BucketBound::Unparsed,
        }
    }
}

/// Sort time-open buckets by lower bound, open-ended buckets last.
pub fn sort_time_open_buckets(labels: &mut [String]) {
    labels.sort_by_key(|label| BucketBound::parse(label));
}

/// Sum of each project's series, in selection order.
pub fn project_totals(dataset: &ComparisonDataset) -> Vec<(&ProjectKey, u64)> {
    dataset
        .series
        .iter()
        .map(|s| (&s.project, s.total()))
        .collect()
}

/// Project with the highest value for the category at `index`.
///
/// Returns `None` when all projects are zero or tie for the maximum.
pub fn leader_for(dataset: &ComparisonDataset, index: usize) -> Option<&ProjectKey> {
    let mut best: Option<(&ProjectKey, u64)> = None;
    let mut tied = false;

    for series in &dataset.series {
        let value = *series.values.get(index)?;
        match best {
            Some((_, top)) if value == top => tied = true,
            Some((_, top)) if value < top => {}
            _ => {
                best = Some((&series.project, value));
                tied = false;
            }
        }
    }

    match best {
        Some((key, value)) if value > 0 && !tied => Some(key),
        _ => None,
    }
}
