//! End-to-end comparisons against the in-process mock backend.

use issue_compare::analysis::AggregateOptions;
use issue_compare::client::{BackendClient, ClientConfig};
use issue_compare::mock;
use issue_compare::models::{ComparisonOutcome, MetricKind, NoDataReason};
use issue_compare::session::{ComparisonSession, Selection};
use tokio_test::assert_ok;

async fn start_mock(seed: u64) -> String {
    let (addr, _handle) = assert_ok!(mock::spawn("127.0.0.1:0".parse().unwrap(), Some(seed)).await);
    format!("http://{}", addr)
}

fn session_for(base_url: String, options: AggregateOptions) -> ComparisonSession {
    let client = assert_ok!(BackendClient::new(ClientConfig {
        base_url,
        timeout_seconds: 5,
        ..ClientConfig::default()
    }));
    ComparisonSession::new(client, options)
}

#[tokio::test]
async fn test_all_metrics_are_aligned() {
    let session = session_for(start_mock(11).await, AggregateOptions::default());
    let selection = assert_ok!(Selection::new(&["ALPHA", "BETA", "GAMMA"]));

    let outcomes = session
        .load_all(&selection, &MetricKind::ALL)
        .await
        .expect("only generation in flight");

    assert_eq!(outcomes.len(), 4);
    for (kind, outcome) in outcomes {
        let dataset = outcome
            .dataset()
            .unwrap_or_else(|| panic!("{} had no data", kind));

        assert_eq!(dataset.kind, kind);
        assert!(dataset.is_aligned());
        assert!(!dataset.labels.is_empty());

        let order: Vec<&str> = dataset.series.iter().map(|s| s.project.as_str()).collect();
        assert_eq!(order, vec!["ALPHA", "BETA", "GAMMA"]);
    }
}

#[tokio::test]
async fn test_time_open_buckets_in_range_order() {
    let session = session_for(start_mock(4).await, AggregateOptions::default());
    let selection = assert_ok!(Selection::new(&["ALPHA", "BETA"]));

    let outcome = session
        .load(&selection, MetricKind::TimeOpen)
        .await
        .expect("only generation in flight");
    let dataset = outcome.dataset().expect("time-open data");

    let expected: Vec<&str> = mock::data::TIME_OPEN_RANGES
        .iter()
        .copied()
        .filter(|range| dataset.labels.iter().any(|label| label == range))
        .collect();
    assert_eq!(dataset.labels, expected);
}

#[tokio::test]
async fn test_time_spent_keeps_top_authors() {
    let options = AggregateOptions {
        top_authors: 2,
        ..AggregateOptions::default()
    };
    let session = session_for(start_mock(8).await, options);
    let selection = assert_ok!(Selection::new(&["ALPHA", "BETA"]));

    let outcome = session
        .load(&selection, MetricKind::TimeSpent)
        .await
        .expect("only generation in flight");
    let dataset = outcome.dataset().expect("time-spent data");

    assert!(dataset.labels.len() <= 2);
    assert!(dataset.is_aligned());
}

#[tokio::test]
async fn test_newer_selection_wins() {
    let session = session_for(start_mock(2).await, AggregateOptions::default());
    let first = assert_ok!(Selection::new(&["ALPHA", "BETA"]));
    let second = assert_ok!(Selection::new(&["GAMMA", "DELTA"]));

    let (stale, fresh) = tokio::join!(
        session.load(&first, MetricKind::Priority),
        session.load(&second, MetricKind::Priority),
    );

    assert_eq!(stale, None);
    let dataset = fresh.expect("newest request").dataset().cloned().expect("priority data");
    let order: Vec<&str> = dataset.series.iter().map(|s| s.project.as_str()).collect();
    assert_eq!(order, vec!["GAMMA", "DELTA"]);
}

#[tokio::test]
async fn test_rejected_request_is_no_data() {
    let base_url = start_mock(1).await;
    let client = assert_ok!(BackendClient::new(ClientConfig {
        base_url,
        timeout_seconds: 5,
        project_param: "project".to_string(),
    }));
    let session = ComparisonSession::new(client, AggregateOptions::default());
    let selection = assert_ok!(Selection::new(&["ALPHA", "BETA"]));

    let outcome = session
        .load(&selection, MetricKind::StatusDistribution)
        .await
        .expect("only generation in flight");

    match outcome {
        ComparisonOutcome::NoData(NoDataReason::Transport(message)) => {
            assert!(message.contains("400"), "unexpected message: {}", message);
        }
        other => panic!("expected transport no-data, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_backend_is_no_data_for_every_chart() {
    let session = session_for("http://127.0.0.1:9".to_string(), AggregateOptions::default());
    let selection = assert_ok!(Selection::new(&["ALPHA", "BETA"]));

    let outcomes = session
        .load_all(&selection, &MetricKind::ALL)
        .await
        .expect("only generation in flight");

    assert!(outcomes
        .iter()
        .all(|(_, outcome)| matches!(outcome, ComparisonOutcome::NoData(NoDataReason::Transport(_)))));
}
