//! Randomized comparison data in the backend's wire shapes.

use crate::models::MetricKind;
use rand::Rng;
use serde_json::{json, Map, Value};

pub const TIME_OPEN_RANGES: [&str; 10] = [
    "0-1", "1-2", "2-3", "3-5", "5-7", "7-10", "10-14", "14-21", "21-30", "30+",
];
pub const STATUSES: [&str; 5] = ["Open", "In Progress", "Resolved", "Closed", "Reopened"];
pub const AUTHORS: [&str; 5] = [
    "John Doe",
    "Jane Smith",
    "Mike Johnson",
    "Sarah Williams",
    "David Brown",
];
pub const PRIORITIES: [&str; 4] = ["Critical", "High", "Medium", "Low"];

/// Chance that a category appears in a project's rows.
const KEEP_PROBABILITY: f64 = 0.8;

/// Build a response body for `projects`, keyed by project in request order.
pub fn generate<R: Rng>(kind: MetricKind, projects: &[String], rng: &mut R) -> Value {
    let mut body = Map::new();

    for project in projects {
        let entry = match kind {
            MetricKind::TimeOpen => time_open(rng),
            MetricKind::StatusDistribution => counts(rng, &STATUSES, 10..110),
            MetricKind::TimeSpent => time_spent(rng),
            MetricKind::Priority => counts(rng, &PRIORITIES, 5..55),
        };
        body.insert(project.clone(), entry);
    }

    Value::Object(body)
}

fn time_open<R: Rng>(rng: &mut R) -> Value {
    let rows: Vec<Value> = pick(rng, &TIME_OPEN_RANGES)
        .into_iter()
        .map(|range| json!({ "range": range, "count": rng.gen_range(5..55) }))
        .collect();
    Value::Array(rows)
}

fn counts<R: Rng>(rng: &mut R, categories: &[&str], range: std::ops::Range<u64>) -> Value {
    let mut map = Map::new();
    for category in pick(rng, categories) {
        map.insert(category.to_string(), json!(rng.gen_range(range.clone())));
    }
    Value::Object(map)
}

fn time_spent<R: Rng>(rng: &mut R) -> Value {
    let mut authors: Vec<(&str, u64)> = pick(rng, &AUTHORS)
        .into_iter()
        .map(|author| (author, rng.gen_range(5..85) * 3600))
        .collect();
    authors.sort_by(|a, b| b.1.cmp(&a.1));

    let rows: Vec<Value> = authors
        .into_iter()
        .map(|(author, seconds)| json!({ "author": author, "total_time_spent": seconds }))
        .collect();

    json!({ "authors": rows })
}

/// Random subset of `categories`, never empty, in their original order.
fn pick<'a, R: Rng>(rng: &mut R, categories: &[&'a str]) -> Vec<&'a str> {
    let mut kept: Vec<&str> = categories
        .iter()
        .copied()
        .filter(|_| rng.gen_bool(KEEP_PROBABILITY))
        .collect();

    if kept.is_empty() {
        kept.push(categories[rng.gen_range(0..categories.len())]);
    }

    kept
}
