//! Scan orchestration.
//!
//! Inspection of distinct resources is embarrassingly parallel and
//! I/O-bound, so describe calls are dispatched concurrently behind a
//! semaphore (provider rate limits make the width configurable).
//! Comparison and classification are pure per-resource computations with
//! no shared mutable state; output ordering is imposed afterward by
//! sorting on the resource address, and the summary is a fold over the
//! final record list.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::drift::{DriftComparator, DriftRecord, DriftStatus, Severity, SeverityTable};
use crate::error::DriftError;
use crate::inspect::{InspectorRegistry, ResourceInspector, RetryPolicy, describe_with_retry};
use crate::resource::DeclaredResourceState;

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Maximum in-flight describe calls.
    pub concurrency: usize,
    /// Overall scan deadline. Once passed, no new inspections are
    /// dispatched; in-flight calls are bounded by the remaining time.
    pub timeout: Option<Duration>,
    pub retry: RetryPolicy,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            concurrency: 8,
            timeout: None,
            retry: RetryPolicy::default(),
        }
    }
}

/// Pure fold over the final record list: totals per status and per
/// severity tier. `unknown` counts resources that were never actually
/// verified; callers must not read it as "no drift".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScanSummary {
    pub total: usize,
    pub matched: usize,
    pub drifted: usize,
    pub deleted: usize,
    pub unknown: usize,
    pub by_severity: BTreeMap<Severity, usize>,
}

impl ScanSummary {
    pub fn from_records(records: &[DriftRecord]) -> Self {
        let mut summary = Self {
            total: records.len(),
            matched: 0,
            drifted: 0,
            deleted: 0,
            unknown: 0,
            by_severity: BTreeMap::new(),
        };
        for record in records {
            match record.status {
                DriftStatus::Match => summary.matched += 1,
                DriftStatus::Drifted => summary.drifted += 1,
                DriftStatus::Deleted => summary.deleted += 1,
                DriftStatus::InspectionFailed { .. } => summary.unknown += 1,
            }
            if let Some(severity) = record.severity {
                *summary.by_severity.entry(severity).or_insert(0) += 1;
            }
        }
        summary
    }

    /// Highest severity present across all records, ignoring unknowns.
    pub fn max_severity(&self) -> Severity {
        self.by_severity
            .keys()
            .max()
            .copied()
            .unwrap_or(Severity::None)
    }
}

#[derive(Debug)]
pub struct ScanOutcome {
    /// One record per declared resource, sorted by address.
    pub records: Vec<DriftRecord>,
    pub summary: ScanSummary,
    /// True when the deadline cut the scan short and some resources were
    /// recorded as not attempted.
    pub incomplete: bool,
}

const NOT_ATTEMPTED: &str = "not attempted: scan deadline exceeded";

/// Engine wiring shared by every per-resource task.
pub struct ScanEngine {
    pub registry: InspectorRegistry,
    pub comparator: DriftComparator,
    pub severity: SeverityTable,
}

impl ScanEngine {
    pub fn new(registry: InspectorRegistry) -> Self {
        Self {
            registry,
            comparator: DriftComparator::default(),
            severity: SeverityTable::default(),
        }
    }
}

/// Run one full scan: inspect every declared resource, compare, classify.
///
/// Always yields one record per declared resource; per-resource failures
/// become `InspectionFailed` records rather than aborting the scan.
pub async fn run_scan(
    declared: Vec<DeclaredResourceState>,
    engine: Arc<ScanEngine>,
    options: &ScanOptions,
) -> Result<ScanOutcome, DriftError> {
    if declared.is_empty() {
        return Err(DriftError::EmptyState);
    }
    if !declared
        .iter()
        .any(|d| engine.registry.get(&d.address.resource_type).is_some())
    {
        return Err(DriftError::NoInspectors);
    }

    let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
    let deadline = options.timeout.map(|t| Instant::now() + t);
    let retry = options.retry.clone();

    let mut records = Vec::with_capacity(declared.len());
    let mut incomplete = false;
    let mut tasks = JoinSet::new();

    for resource in declared {
        let Some(inspector) = engine.registry.get(&resource.address.resource_type) else {
            tracing::warn!(
                resource = %resource.address,
                "no inspector registered for resource type"
            );
            records.push(DriftRecord::inspection_failed(
                resource.address,
                "no inspector registered for this resource type",
            ));
            continue;
        };

        let semaphore = Arc::clone(&semaphore);
        let engine = Arc::clone(&engine);
        let retry = retry.clone();
        tasks.spawn(async move {
            inspect_one(resource, inspector, semaphore, deadline, retry, engine).await
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((record, attempted)) => {
                incomplete |= !attempted;
                records.push(record);
            }
            Err(e) => {
                // Task panic; per-resource errors never arrive this way.
                tracing::error!(error = %e, "inspection task failed to join");
            }
        }
    }

    records.sort_by(|a, b| a.address.cmp(&b.address));
    let summary = ScanSummary::from_records(&records);

    tracing::info!(
        total = summary.total,
        drifted = summary.drifted,
        deleted = summary.deleted,
        unknown = summary.unknown,
        incomplete,
        "scan complete"
    );

    Ok(ScanOutcome {
        records,
        summary,
        incomplete,
    })
}

/// One resource, single pass: Pending -> {Match, Drifted, Deleted,
/// InspectionFailed}. Returns the terminal record plus whether the
/// inspection was actually attempted.
async fn inspect_one(
    resource: DeclaredResourceState,
    inspector: Arc<dyn ResourceInspector>,
    semaphore: Arc<Semaphore>,
    deadline: Option<Instant>,
    retry: RetryPolicy,
    engine: Arc<ScanEngine>,
) -> (DriftRecord, bool) {
    let expired = |d: Option<Instant>| d.is_some_and(|d| Instant::now() >= d);

    if expired(deadline) {
        return (
            DriftRecord::inspection_failed(resource.address, NOT_ATTEMPTED),
            false,
        );
    }

    let Ok(_permit) = semaphore.acquire_owned().await else {
        return (
            DriftRecord::inspection_failed(resource.address, NOT_ATTEMPTED),
            false,
        );
    };

    // Re-check after waiting in the queue: late resources must be marked
    // "not attempted", never silently treated as clean.
    if expired(deadline) {
        return (
            DriftRecord::inspection_failed(resource.address, NOT_ATTEMPTED),
            false,
        );
    }

    let describe = describe_with_retry(inspector.as_ref(), &resource, &retry);
    let outcome = match deadline {
        Some(deadline) => match tokio::time::timeout_at(deadline, describe).await {
            Ok(outcome) => outcome,
            Err(_) => {
                return (
                    DriftRecord::inspection_failed(
                        resource.address,
                        "inspection timed out at scan deadline",
                    ),
                    true,
                );
            }
        },
        None => describe.await,
    };

    let mut record = match outcome {
        Ok(observed) => engine.comparator.compare(&resource, observed.as_ref()),
        Err(e) => {
            tracing::warn!(resource = %resource.address, error = %e, "inspection failed");
            DriftRecord::inspection_failed(resource.address, e.to_string())
        }
    };
    record.severity = engine.severity.classify(&record);
    (record, true)
}
