use std::collections::{HashMap, HashSet};

use serde_json::Value;

/// Canonicalizes attribute values before comparison and decides which
/// attributes are excluded from drift detection altogether.
///
/// Pure lookup+transform, no side effects. All rules live in data tables
/// so tests can substitute their own without touching comparator logic.
pub struct AttributeNormalizer {
    /// Ignored for every resource type (cloud-computed, never declared).
    ignore_global: HashSet<String>,
    /// Additional per-type ignores, keyed by resource type.
    ignore_by_type: HashMap<String, HashSet<String>>,
    /// Per-type attributes that routinely come back null/absent from the
    /// provider without being real drift (optional blocks, write-only
    /// arguments). Suppressed only when the observed side lacks a value.
    suppress_missing: HashMap<String, HashSet<String>>,
    /// Leaf keys whose array values are set-like and compared order-free.
    unordered_keys: HashSet<String>,
    /// Leaf keys whose string values compare case-insensitively.
    case_insensitive_keys: HashSet<String>,
}

impl AttributeNormalizer {
    pub fn new() -> Self {
        Self {
            ignore_global: HashSet::new(),
            ignore_by_type: HashMap::new(),
            suppress_missing: HashMap::new(),
            unordered_keys: HashSet::new(),
            case_insensitive_keys: HashSet::new(),
        }
    }

    pub fn ignore(mut self, key: &str) -> Self {
        self.ignore_global.insert(key.to_string());
        self
    }

    pub fn ignore_for(mut self, resource_type: &str, key: &str) -> Self {
        self.ignore_by_type
            .entry(resource_type.to_string())
            .or_default()
            .insert(key.to_string());
        self
    }

    pub fn suppress_missing_for(mut self, resource_type: &str, key: &str) -> Self {
        self.suppress_missing
            .entry(resource_type.to_string())
            .or_default()
            .insert(key.to_string());
        self
    }

    pub fn unordered(mut self, key: &str) -> Self {
        self.unordered_keys.insert(key.to_string());
        self
    }

    pub fn case_insensitive(mut self, key: &str) -> Self {
        self.case_insensitive_keys.insert(key.to_string());
        self
    }

    /// Whether `key` is excluded from comparison for `resource_type`.
    /// Dotted keys (`tags.Owner`) also match on their root segment.
    pub fn should_ignore(&self, resource_type: &str, key: &str) -> bool {
        let root = key.split('.').next().unwrap_or(key);
        let hit = |set: &HashSet<String>| set.contains(key) || set.contains(root);

        if hit(&self.ignore_global) {
            return true;
        }
        self.ignore_by_type
            .get(resource_type)
            .is_some_and(|set| hit(set))
    }

    /// Whether a value missing/null on the observed side should be treated
    /// as a known false positive rather than drift.
    pub fn suppresses_missing(&self, resource_type: &str, key: &str) -> bool {
        let root = key.split('.').next().unwrap_or(key);
        self.suppress_missing
            .get(resource_type)
            .is_some_and(|set| set.contains(key) || set.contains(root))
    }

    /// Canonical form of `value` for equality testing: scalars stringified
    /// (so `80` equals `"80"`), set-like arrays sorted, objects normalized
    /// recursively. `resource_type` is accepted for symmetry with the
    /// ignore lookups; the current rules key on the attribute only.
    pub fn normalize(&self, _resource_type: &str, key: &str, value: &Value) -> Value {
        let leaf = key.rsplit('.').next().unwrap_or(key);
        self.normalize_inner(leaf, value)
    }

    fn normalize_inner(&self, leaf: &str, value: &Value) -> Value {
        match value {
            Value::Null => Value::Null,
            Value::Bool(b) => Value::String(b.to_string()),
            Value::Number(n) => Value::String(n.to_string()),
            Value::String(s) => {
                if self.case_insensitive_keys.contains(leaf) {
                    Value::String(s.to_lowercase())
                } else {
                    Value::String(s.clone())
                }
            }
            Value::Array(items) => {
                let mut normalized: Vec<Value> = items
                    .iter()
                    .map(|item| self.normalize_inner(leaf, item))
                    .collect();
                if self.unordered_keys.contains(leaf) {
                    normalized.sort_by_cached_key(|v| v.to_string());
                }
                Value::Array(normalized)
            }
            Value::Object(map) => {
                let normalized: serde_json::Map<String, Value> = map
                    .iter()
                    .map(|(k, v)| (k.clone(), self.normalize_inner(k, v)))
                    .collect();
                Value::Object(normalized)
            }
        }
    }

    /// True for values equivalent to "nothing declared": null, empty
    /// string, empty array, empty object. A missing key versus an
    /// empty-like value is never drift.
    pub fn is_empty_like(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            Value::Bool(_) | Value::Number(_) => false,
        }
    }
}

impl Default for AttributeNormalizer {
    /// Built-in rules for the supported AWS resource types: globally
    /// cloud-computed attributes, per-type null-drift suppressions, and
    /// set-like collection keys.
    fn default() -> Self {
        let mut n = Self::new()
            .ignore("id")
            .ignore("arn")
            .ignore("create_time")
            .ignore("owner_id")
            .ignore("state")
            .ignore("tags_all")
            .unordered("vpc_security_group_ids")
            .unordered("security_groups")
            .unordered("cidr_blocks")
            .unordered("ipv6_cidr_blocks")
            .unordered("ingress")
            .unordered("egress")
            .case_insensitive("protocol");

        for key in [
            "bucket_domain_name",
            "bucket_regional_domain_name",
            "hosted_zone_id",
            "website_endpoint",
            "website_domain",
        ] {
            n = n.ignore_for("aws_s3_bucket", key);
        }
        n = n.ignore_for("aws_security_group", "revoke_rules_on_delete");
        n = n.ignore_for("aws_security_group", "timeouts");

        // Optional blocks and write-only arguments that the provider
        // reports as null/absent even when undrifted.
        for key in [
            "user_data",
            "user_data_base64",
            "user_data_replace_on_change",
            "get_password_data",
            "password_data",
            "key_name",
            "hibernation",
            "ebs_optimized",
            "monitoring",
            "source_dest_check",
            "disable_api_termination",
            "disable_api_stop",
            "iam_instance_profile",
            "credit_specification",
            "metadata_options",
            "root_block_device",
            "ebs_block_device",
            "ephemeral_block_device",
            "network_interface",
            "launch_template",
            "cpu_options",
            "capacity_reservation_specification",
            "maintenance_options",
            "enclave_options",
            "private_dns_name_options",
            "instance_market_options",
            "tenancy",
            "host_id",
            "placement_group",
            "placement_partition_number",
            "ipv6_address_count",
            "ipv6_addresses",
            "secondary_private_ips",
            "associate_public_ip_address",
            "instance_initiated_shutdown_behavior",
            "private_dns",
            "public_dns",
            "security_groups",
            "cpu_core_count",
            "cpu_threads_per_core",
            "outpost_arn",
            "spot_instance_request_id",
            "primary_network_interface_id",
            "instance_lifecycle",
            "instance_state",
        ] {
            n = n.suppress_missing_for("aws_instance", key);
        }
        n = n.suppress_missing_for("aws_s3_bucket", "region");

        n
    }
}
