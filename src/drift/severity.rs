use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::compare::{DriftRecord, DriftStatus};

/// Operational risk ranking for a drift record. Ordered: a record's
/// severity is the maximum tier over its attribute diffs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::None,
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::None => "none",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Static, data-driven mapping from diff content to severity tiers.
///
/// Keyed by `(resource_type, attribute_key)` with a default tier for
/// unlisted attributes and a deletion tier (per-type overridable) for
/// resources that no longer exist live. Kept as plain data so tests can
/// substitute a custom table without touching comparator logic.
pub struct SeverityTable {
    attribute_tiers: HashMap<(String, String), Severity>,
    deletion_tiers: HashMap<String, Severity>,
    default_tier: Severity,
    default_deletion_tier: Severity,
}

impl SeverityTable {
    pub fn new(default_tier: Severity, default_deletion_tier: Severity) -> Self {
        Self {
            attribute_tiers: HashMap::new(),
            deletion_tiers: HashMap::new(),
            default_tier,
            default_deletion_tier,
        }
    }

    pub fn tier(mut self, resource_type: &str, key: &str, severity: Severity) -> Self {
        self.attribute_tiers
            .insert((resource_type.to_string(), key.to_string()), severity);
        self
    }

    pub fn deletion_tier(mut self, resource_type: &str, severity: Severity) -> Self {
        self.deletion_tiers
            .insert(resource_type.to_string(), severity);
        self
    }

    /// Tier for one attribute diff. Dotted keys fall back to their root
    /// segment (`tags.Owner` -> `tags`) before the default applies.
    fn attribute_tier(&self, resource_type: &str, key: &str) -> Severity {
        if let Some(tier) = self
            .attribute_tiers
            .get(&(resource_type.to_string(), key.to_string()))
        {
            return *tier;
        }
        let root = key.split('.').next().unwrap_or(key);
        if root != key {
            if let Some(tier) = self
                .attribute_tiers
                .get(&(resource_type.to_string(), root.to_string()))
            {
                return *tier;
            }
        }
        self.default_tier
    }

    /// Deterministic severity for a record. `None` (the distinguished
    /// "unknown" marker) is returned only for `InspectionFailed`; it is
    /// never folded into the ordered scale.
    pub fn classify(&self, record: &DriftRecord) -> Option<Severity> {
        let resource_type = record.address.resource_type.as_str();
        match &record.status {
            DriftStatus::Match => Some(Severity::None),
            DriftStatus::Deleted => Some(
                *self
                    .deletion_tiers
                    .get(resource_type)
                    .unwrap_or(&self.default_deletion_tier),
            ),
            DriftStatus::Drifted => Some(
                record
                    .diffs
                    .iter()
                    .map(|diff| self.attribute_tier(resource_type, &diff.key))
                    .max()
                    .unwrap_or(self.default_tier),
            ),
            DriftStatus::InspectionFailed { .. } => None,
        }
    }
}

impl Default for SeverityTable {
    /// Built-in tiers: compute/image changes, firewall rules, and bucket
    /// versioning are High; tag-only drift is Low; everything else
    /// defaults to Medium. Deletion is Critical unless overridden.
    fn default() -> Self {
        Self::new(Severity::Medium, Severity::Critical)
            .tier("aws_instance", "instance_type", Severity::High)
            .tier("aws_instance", "ami", Severity::High)
            .tier("aws_instance", "vpc_security_group_ids", Severity::High)
            .tier("aws_instance", "subnet_id", Severity::High)
            .tier("aws_instance", "tags", Severity::Low)
            .tier("aws_security_group", "ingress", Severity::High)
            .tier("aws_security_group", "egress", Severity::High)
            .tier("aws_security_group", "description", Severity::Low)
            .tier("aws_security_group", "tags", Severity::Low)
            .tier("aws_s3_bucket", "versioning", Severity::High)
            .tier("aws_s3_bucket", "tags", Severity::Low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drift::compare::{AttributeDiff, DiffKind};
    use crate::resource::ResourceAddress;
    use serde_json::json;

    fn diff(key: &str) -> AttributeDiff {
        AttributeDiff {
            key: key.to_string(),
            declared: Some(json!("a")),
            observed: Some(json!("b")),
            kind: DiffKind::Changed,
        }
    }

    fn record(resource_type: &str, status: DriftStatus, diffs: Vec<AttributeDiff>) -> DriftRecord {
        DriftRecord {
            address: ResourceAddress::new(resource_type, "test"),
            status,
            diffs,
            severity: None,
        }
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::None < Severity::Low);
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn test_match_is_severity_none() {
        let table = SeverityTable::default();
        let r = record("aws_instance", DriftStatus::Match, vec![]);
        assert_eq!(table.classify(&r), Some(Severity::None));
    }

    #[test]
    fn test_deleted_uses_deletion_tier() {
        let table = SeverityTable::default();
        let r = record("aws_instance", DriftStatus::Deleted, vec![]);
        assert_eq!(table.classify(&r), Some(Severity::Critical));
    }

    #[test]
    fn test_deletion_tier_per_type_override() {
        let table = SeverityTable::default().deletion_tier("aws_s3_bucket", Severity::High);
        let r = record("aws_s3_bucket", DriftStatus::Deleted, vec![]);
        assert_eq!(table.classify(&r), Some(Severity::High));
    }

    #[test]
    fn test_inspection_failed_is_unknown() {
        let table = SeverityTable::default();
        let r = record(
            "aws_instance",
            DriftStatus::InspectionFailed {
                reason: "permission denied".to_string(),
            },
            vec![],
        );
        assert_eq!(table.classify(&r), None);
    }

    #[test]
    fn test_listed_attribute_tier() {
        let table = SeverityTable::default();
        let r = record(
            "aws_instance",
            DriftStatus::Drifted,
            vec![diff("instance_type")],
        );
        assert_eq!(table.classify(&r), Some(Severity::High));
    }

    #[test]
    fn test_unlisted_attribute_gets_default_tier() {
        let table = SeverityTable::default();
        let r = record(
            "aws_instance",
            DriftStatus::Drifted,
            vec![diff("availability_zone")],
        );
        assert_eq!(table.classify(&r), Some(Severity::Medium));
    }

    #[test]
    fn test_record_severity_is_max_over_diffs() {
        let table = SeverityTable::default();
        let r = record(
            "aws_instance",
            DriftStatus::Drifted,
            vec![diff("tags.Owner"), diff("instance_type")],
        );
        assert_eq!(table.classify(&r), Some(Severity::High));
    }

    #[test]
    fn test_dotted_key_falls_back_to_root_tier() {
        let table = SeverityTable::default();
        let r = record("aws_instance", DriftStatus::Drifted, vec![diff("tags.Env")]);
        assert_eq!(table.classify(&r), Some(Severity::Low));
    }

    #[test]
    fn test_adding_lower_tier_diff_never_decreases_severity() {
        let table = SeverityTable::default();
        let base = record(
            "aws_security_group",
            DriftStatus::Drifted,
            vec![diff("ingress")],
        );
        let with_more = record(
            "aws_security_group",
            DriftStatus::Drifted,
            vec![diff("ingress"), diff("description"), diff("tags.Name")],
        );
        assert!(table.classify(&with_more) >= table.classify(&base));
    }

    #[test]
    fn test_custom_table_substitution() {
        let table = SeverityTable::new(Severity::Low, Severity::Medium).tier(
            "custom_type",
            "field",
            Severity::Critical,
        );
        let r = record("custom_type", DriftStatus::Drifted, vec![diff("field")]);
        assert_eq!(table.classify(&r), Some(Severity::Critical));
        let r = record("custom_type", DriftStatus::Deleted, vec![]);
        assert_eq!(table.classify(&r), Some(Severity::Medium));
    }
}
