//! Terraform state parser for drift detection.
//!
//! Parses tfstate v4 files and extracts managed resource instances for
//! comparison against live provider state. Data sources (`mode = "data"`)
//! are skipped; only managed resources can drift.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::resource::{AddressIndex, AttrMap, DeclaredResourceState, ResourceAddress};

const SUPPORTED_STATE_VERSION: u64 = 4;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("state file not found or unreadable: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON in state file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported state version {found} (expected {SUPPORTED_STATE_VERSION})")]
    UnsupportedVersion { found: u64 },

    #[error("state contains no managed resources")]
    NoManagedResources,
}

/// Declared state for one scan: version metadata plus the ordered list of
/// managed resource instances.
#[derive(Debug, Clone)]
pub struct StateFile {
    pub terraform_version: String,
    pub resources: Vec<DeclaredResourceState>,
}

#[derive(Debug, Deserialize)]
struct RawState {
    version: u64,
    #[serde(default)]
    terraform_version: Option<String>,
    #[serde(default)]
    resources: Vec<RawResource>,
}

#[derive(Debug, Deserialize)]
struct RawResource {
    #[serde(default)]
    mode: String,
    #[serde(rename = "type")]
    resource_type: String,
    name: String,
    #[serde(default)]
    instances: Vec<RawInstance>,
}

#[derive(Debug, Deserialize)]
struct RawInstance {
    #[serde(default)]
    index_key: Option<serde_json::Value>,
    #[serde(default)]
    attributes: AttrMap,
}

pub fn read_state_file(path: &Path) -> Result<StateFile, StateError> {
    let text = std::fs::read_to_string(path)?;
    parse_state(&text)
}

pub fn parse_state(text: &str) -> Result<StateFile, StateError> {
    let raw: RawState = serde_json::from_str(text)?;

    if raw.version != SUPPORTED_STATE_VERSION {
        return Err(StateError::UnsupportedVersion { found: raw.version });
    }

    let mut resources = Vec::new();
    for block in raw.resources {
        if block.mode != "managed" {
            tracing::debug!(
                resource_type = %block.resource_type,
                name = %block.name,
                mode = %block.mode,
                "skipping non-managed resource block"
            );
            continue;
        }

        let multi = block.instances.len() > 1;
        for (position, instance) in block.instances.into_iter().enumerate() {
            let index = match instance.index_key {
                Some(serde_json::Value::Number(n)) => n.as_u64().map(AddressIndex::Int),
                Some(serde_json::Value::String(s)) => Some(AddressIndex::Key(s)),
                // No index_key but multiple instances: fall back to position
                _ if multi => Some(AddressIndex::Int(position as u64)),
                _ => None,
            };

            let mut address = ResourceAddress::new(&block.resource_type, &block.name);
            if let Some(index) = index {
                address = address.with_index(index);
            }

            resources.push(DeclaredResourceState {
                address,
                attributes: instance.attributes,
            });
        }
    }

    if resources.is_empty() {
        return Err(StateError::NoManagedResources);
    }

    Ok(StateFile {
        terraform_version: raw.terraform_version.unwrap_or_else(|| "unknown".to_string()),
        resources,
    })
}
