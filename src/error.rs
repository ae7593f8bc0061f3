use thiserror::Error;

use crate::terraform::StateError;

/// Scan-wide failures. Only global preconditions live here; per-resource
/// inspection failures are recorded in their drift records and never
/// propagate past the comparator boundary.
#[derive(Debug, Error)]
pub enum DriftError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error("no declared resources to scan")]
    EmptyState,

    #[error("no registered inspector matches any declared resource type")]
    NoInspectors,
}
