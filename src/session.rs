//! Comparison selection and last-request-wins loading.
//!
//! A new selection makes every in-flight response for an older selection
//! irrelevant. Requests are not cancelled; their results are simply dropped
//! when they resolve under a stale ticket.

use crate::analysis::{aggregate, AggregateOptions};
use crate::client::BackendClient;
use crate::error::SelectionError;
use crate::models::{ComparisonOutcome, MetricKind, ProjectKey};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Smallest number of projects in a comparison.
pub const MIN_PROJECTS: usize = 2;
/// Largest number of projects in a comparison.
pub const MAX_PROJECTS: usize = 3;

/// Validated set of projects to compare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    projects: Vec<ProjectKey>,
}

impl Selection {
    /// Validate raw project keys: 2 to 3 distinct, non-blank keys.
    pub fn new<S: AsRef<str>>(raw: &[S]) -> Result<Self, SelectionError> {
        if raw.len() < MIN_PROJECTS || raw.len() > MAX_PROJECTS {
            return Err(SelectionError::WrongCount {
                min: MIN_PROJECTS,
                max: MAX_PROJECTS,
                got: raw.len(),
            });
        }

        let mut projects: Vec<ProjectKey> = Vec::with_capacity(raw.len());
        for item in raw {
            let key = ProjectKey::new(item.as_ref()).ok_or(SelectionError::EmptyKey)?;
            if projects.contains(&key) {
                return Err(SelectionError::Duplicate(key.to_string()));
            }
            projects.push(key);
        }

        Ok(Self { projects })
    }

    pub fn projects(&self) -> &[ProjectKey] {
        &self.projects
    }
}

/// Proof of which request generation a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Loads comparison charts, keeping only the newest request's result.
#[derive(Debug, Clone)]
pub struct ComparisonSession {
    client: BackendClient,
    options: AggregateOptions,
    generation: Arc<AtomicU64>,
}

impl ComparisonSession {
    pub fn new(client: BackendClient, options: AggregateOptions) -> Self {
        Self {
            client,
            options,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }

    /// Start a new request generation, invalidating all older tickets.
    pub fn begin(&self) -> Ticket {
        Ticket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `ticket` belongs to the newest request.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Fetch and aggregate one chart for a new selection.
    ///
    /// Returns `None` if another selection started while this one was in
    /// flight.
    pub async fn load(&self, selection: &Selection, kind: MetricKind) -> Option<ComparisonOutcome> {
        let ticket = self.begin();
        let outcome = self.fetch_outcome(selection, kind).await;
        self.settle(ticket, kind, outcome)
    }

    /// Fetch and aggregate all metric kinds concurrently as one generation.
    ///
    /// Returns `None` if a newer selection started before all charts resolved.
    pub async fn load_all(
        &self,
        selection: &Selection,
        kinds: &[MetricKind],
    ) -> Option<Vec<(MetricKind, ComparisonOutcome)>> {
        let ticket = self.begin();

        let outcomes = futures::future::join_all(
            kinds
                .iter()
                .map(|&kind| async move { (kind, self.fetch_outcome(selection, kind).await) }),
        )
        .await;

        if self.is_current(ticket) {
            Some(outcomes)
        } else {
            debug!("Dropping stale results for {} chart(s)", outcomes.len());
            None
        }
    }

    /// Keep `outcome` only if `ticket` is still current.
    pub fn settle(
        &self,
        ticket: Ticket,
        kind: MetricKind,
        outcome: ComparisonOutcome,
    ) -> Option<ComparisonOutcome> {
        if self.is_current(ticket) {
            Some(outcome)
        } else {
            debug!("Dropping stale {} response", kind);
            None
        }
    }

    async fn fetch_outcome(&self, selection: &Selection, kind: MetricKind) -> ComparisonOutcome {
        match self
            .client
            .fetch_comparison(kind, selection.projects())
            .await
        {
            Ok(payload) => {
                let outcome = aggregate(kind, selection.projects(), &payload, &self.options);
                if let ComparisonOutcome::NoData(ref reason) = outcome {
                    info!("No {} chart: {}", kind, reason);
                }
                outcome
            }
            Err(e) => {
                info!("No {} chart: {}", kind, e);
                ComparisonOutcome::NoData(e.into_no_data())
            }
        }
    }
}
