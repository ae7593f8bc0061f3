use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Instance index for resources declared with `count` or `for_each`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddressIndex {
    Int(u64),
    Key(String),
}

/// Stable `(type, name, index)` identifier correlating a declared resource
/// with its live counterpart. Unique within one scan.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResourceAddress {
    pub resource_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<AddressIndex>,
}

impl ResourceAddress {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            index: None,
        }
    }

    pub fn with_index(mut self, index: AddressIndex) -> Self {
        self.index = Some(index);
        self
    }
}

impl fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource_type, self.name)?;
        match &self.index {
            Some(AddressIndex::Int(i)) => write!(f, "[{}]", i),
            Some(AddressIndex::Key(k)) => write!(f, "[\"{}\"]", k),
            None => Ok(()),
        }
    }
}

/// Attribute map shared by declared and observed resource states.
/// BTreeMap keeps key iteration ordered, which the comparator relies on
/// for deterministic diff output.
pub type AttrMap = BTreeMap<String, serde_json::Value>;

/// One declared resource instance as recorded in the Terraform state.
/// Produced once per scan by the state reader and never mutated after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DeclaredResourceState {
    pub address: ResourceAddress,
    pub attributes: AttrMap,
}

impl DeclaredResourceState {
    /// String-valued attribute lookup. Inspectors use this with whatever
    /// attribute their provider addresses the resource by.
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn addr(t: &str, n: &str) -> ResourceAddress {
        ResourceAddress::new(t, n)
    }

    #[test]
    fn test_address_display_plain() {
        assert_eq!(addr("aws_instance", "web").to_string(), "aws_instance.web");
    }

    #[test]
    fn test_address_display_int_index() {
        let a = addr("aws_instance", "web").with_index(AddressIndex::Int(2));
        assert_eq!(a.to_string(), "aws_instance.web[2]");
    }

    #[test]
    fn test_address_display_key_index() {
        let a = addr("aws_instance", "web").with_index(AddressIndex::Key("blue".into()));
        assert_eq!(a.to_string(), "aws_instance.web[\"blue\"]");
    }

    #[test]
    fn test_address_ordering_by_type_then_name_then_index() {
        let mut addrs = vec![
            addr("aws_s3_bucket", "logs"),
            addr("aws_instance", "web").with_index(AddressIndex::Int(1)),
            addr("aws_instance", "web").with_index(AddressIndex::Int(0)),
            addr("aws_instance", "db"),
        ];
        addrs.sort();
        let rendered: Vec<String> = addrs.iter().map(|a| a.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "aws_instance.db",
                "aws_instance.web[0]",
                "aws_instance.web[1]",
                "aws_s3_bucket.logs",
            ]
        );
    }

    #[test]
    fn test_address_serialization_snake_case() {
        let a = addr("aws_instance", "web").with_index(AddressIndex::Int(0));
        let json = serde_json::to_string(&a).unwrap();
        assert!(json.contains("resource_type"));
        assert!(!json.contains("resourceType"));
    }

    #[test]
    fn test_attr_str_present() {
        let declared = DeclaredResourceState {
            address: addr("aws_instance", "web"),
            attributes: [("id".to_string(), json!("i-0abc123"))].into(),
        };
        assert_eq!(declared.attr_str("id"), Some("i-0abc123"));
    }

    #[test]
    fn test_attr_str_missing_or_non_string() {
        let declared = DeclaredResourceState {
            address: addr("aws_instance", "web"),
            attributes: [("cpu_core_count".to_string(), json!(2))].into(),
        };
        assert_eq!(declared.attr_str("id"), None);
        assert_eq!(declared.attr_str("cpu_core_count"), None);
    }
}
