use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::normalize::AttributeNormalizer;
use super::severity::Severity;
use crate::resource::{AttrMap, DeclaredResourceState, ResourceAddress};

/// Direction of one attribute-level discrepancy, oriented as drift:
/// `Removed` means the declared value was unset live, `Added` means a
/// value was introduced live that was never declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    Added,
    Removed,
    Changed,
}

/// One attribute discrepancy after normalization. Map-valued attributes
/// are diffed per entry, so `key` may be dotted (`tags.Owner`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AttributeDiff {
    pub key: String,
    pub declared: Option<Value>,
    pub observed: Option<Value>,
    pub kind: DiffKind,
}

/// Terminal outcome of one resource's scan. All four are terminal; there
/// is no retry across resources, only inside the inspector call itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum DriftStatus {
    Match,
    Drifted,
    Deleted,
    InspectionFailed { reason: String },
}

impl DriftStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DriftStatus::Match => "match",
            DriftStatus::Drifted => "drifted",
            DriftStatus::Deleted => "deleted",
            DriftStatus::InspectionFailed { .. } => "unknown",
        }
    }
}

/// The unit consumed by reporting and fix generation.
///
/// Invariants: `Match` implies empty diffs, `Drifted` implies non-empty
/// diffs, `Deleted` implies empty diffs. `severity: None` is the
/// distinguished "unknown" marker, used only for `InspectionFailed`, so
/// callers can always tell "we don't know" from "everything matches".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DriftRecord {
    pub address: ResourceAddress,
    #[serde(flatten)]
    pub status: DriftStatus,
    pub diffs: Vec<AttributeDiff>,
    pub severity: Option<Severity>,
}

impl DriftRecord {
    pub fn inspection_failed(address: ResourceAddress, reason: impl Into<String>) -> Self {
        Self {
            address,
            status: DriftStatus::InspectionFailed {
                reason: reason.into(),
            },
            diffs: Vec::new(),
            severity: None,
        }
    }
}

/// Pairs a declared resource with its observed live attributes and
/// computes the attribute-level diff through the normalizer.
///
/// Declared and observed maps are treated as partial: a key absent from
/// both sides is never compared. Output diff order is sorted by key, so
/// identical inputs always yield identical records.
pub struct DriftComparator {
    normalizer: AttributeNormalizer,
}

impl DriftComparator {
    pub fn new(normalizer: AttributeNormalizer) -> Self {
        Self { normalizer }
    }

    pub fn normalizer(&self) -> &AttributeNormalizer {
        &self.normalizer
    }

    /// Compare one declared resource against its observed state.
    /// `None` observed means the resource no longer exists live.
    /// Severity is left unset here; classification is a separate pass.
    pub fn compare(
        &self,
        declared: &DeclaredResourceState,
        observed: Option<&AttrMap>,
    ) -> DriftRecord {
        let Some(observed) = observed else {
            return DriftRecord {
                address: declared.address.clone(),
                status: DriftStatus::Deleted,
                diffs: Vec::new(),
                severity: None,
            };
        };

        let resource_type = declared.address.resource_type.as_str();
        let mut diffs = Vec::new();

        let mut keys: Vec<&String> = declared.attributes.keys().collect();
        keys.extend(observed.keys().filter(|k| !declared.attributes.contains_key(*k)));
        keys.sort();

        for key in keys {
            self.diff_value(
                resource_type,
                key,
                declared.attributes.get(key),
                observed.get(key),
                &mut diffs,
            );
        }

        diffs.sort_by(|a, b| a.key.cmp(&b.key));

        let status = if diffs.is_empty() {
            DriftStatus::Match
        } else {
            DriftStatus::Drifted
        };

        DriftRecord {
            address: declared.address.clone(),
            status,
            diffs,
            severity: None,
        }
    }

    fn diff_value(
        &self,
        resource_type: &str,
        key: &str,
        declared: Option<&Value>,
        observed: Option<&Value>,
        diffs: &mut Vec<AttributeDiff>,
    ) {
        if self.normalizer.should_ignore(resource_type, key) {
            return;
        }

        // Explicit null is the same as absent.
        let declared = declared.filter(|v| !v.is_null());
        let observed = observed.filter(|v| !v.is_null());

        match (declared, observed) {
            (None, None) => {}
            (Some(Value::Object(d)), Some(Value::Object(o))) => {
                // Maps drift per entry, with dotted keys.
                let mut subkeys: Vec<&String> = d.keys().collect();
                subkeys.extend(o.keys().filter(|k| !d.contains_key(*k)));
                subkeys.sort();
                for subkey in subkeys {
                    self.diff_value(
                        resource_type,
                        &format!("{key}.{subkey}"),
                        d.get(subkey),
                        o.get(subkey),
                        diffs,
                    );
                }
            }
            (Some(d), None) => {
                if AttributeNormalizer::is_empty_like(d)
                    || self.normalizer.suppresses_missing(resource_type, key)
                {
                    return;
                }
                diffs.push(AttributeDiff {
                    key: key.to_string(),
                    declared: Some(d.clone()),
                    observed: None,
                    kind: DiffKind::Removed,
                });
            }
            (None, Some(o)) => {
                if AttributeNormalizer::is_empty_like(o) {
                    return;
                }
                diffs.push(AttributeDiff {
                    key: key.to_string(),
                    declared: None,
                    observed: Some(o.clone()),
                    kind: DiffKind::Added,
                });
            }
            (Some(d), Some(o)) => {
                let dn = self.normalizer.normalize(resource_type, key, d);
                let on = self.normalizer.normalize(resource_type, key, o);
                if dn != on {
                    diffs.push(AttributeDiff {
                        key: key.to_string(),
                        declared: Some(d.clone()),
                        observed: Some(o.clone()),
                        kind: DiffKind::Changed,
                    });
                }
            }
        }
    }
}

impl Default for DriftComparator {
    fn default() -> Self {
        Self::new(AttributeNormalizer::default())
    }
}
