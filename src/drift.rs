//! Drift detection and classification engine.
//!
//! Pure, synchronous core: normalization, declared-vs-observed comparison,
//! severity classification, and fix synthesis. Inspection (network I/O)
//! lives in `crate::inspect`; everything in here is deterministic given
//! identical inputs.

mod compare;
mod fix;
mod normalize;
mod severity;

pub use compare::{AttributeDiff, DiffKind, DriftComparator, DriftRecord, DriftStatus};
pub use fix::{FixGenerator, FixKind, FixSuggestion};
pub use normalize::AttributeNormalizer;
pub use severity::{Severity, SeverityTable};
