//! tfdrift - Terraform Drift Detector
//!
//! Detects configuration drift between a Terraform state file and live
//! cloud resources, classifies each discrepancy by severity, and
//! synthesizes remediation suggestions.

pub mod drift;
pub mod error;
pub mod inspect;
pub mod output;
pub mod resource;
pub mod scan;
pub mod terraform;

pub use drift::{DriftRecord, DriftStatus, FixGenerator, FixSuggestion, Severity};
pub use error::DriftError;
pub use inspect::{InspectorRegistry, ProviderClient};
pub use resource::{DeclaredResourceState, ResourceAddress};
pub use scan::{ScanOptions, ScanOutcome, ScanSummary};
