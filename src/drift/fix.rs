use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::compare::{AttributeDiff, DiffKind, DriftRecord, DriftStatus};
use crate::resource::ResourceAddress;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixKind {
    UpdateAttributes,
    ImportResource,
    ManualReview,
}

/// Remediation artifact derived purely from one drift record. Rendered
/// by the reporting layer as an independent text/code block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FixSuggestion {
    pub address: ResourceAddress,
    pub kind: FixKind,
    pub snippet: String,
}

/// Converts drift records into remediation suggestions.
///
/// The suggestion always restores the declared intent: every drifted
/// attribute in an update snippet carries its declared value, with the
/// observed value it overrides noted in a trailing comment. The live
/// state is never proposed as the new declaration.
pub struct FixGenerator;

impl FixGenerator {
    pub fn generate(record: &DriftRecord) -> Option<FixSuggestion> {
        match &record.status {
            DriftStatus::Match => None,
            DriftStatus::Drifted => Some(FixSuggestion {
                address: record.address.clone(),
                kind: FixKind::UpdateAttributes,
                snippet: Self::update_snippet(record),
            }),
            DriftStatus::Deleted => Some(FixSuggestion {
                address: record.address.clone(),
                kind: FixKind::ImportResource,
                snippet: Self::import_snippet(record),
            }),
            DriftStatus::InspectionFailed { reason } => Some(FixSuggestion {
                address: record.address.clone(),
                kind: FixKind::ManualReview,
                snippet: Self::review_snippet(record, reason),
            }),
        }
    }

    fn update_snippet(record: &DriftRecord) -> String {
        let address = &record.address;
        let mut lines = vec![format!(
            "resource \"{}\" \"{}\" {{",
            address.resource_type, address.name
        )];

        let mut diffs = record.diffs.iter().peekable();
        while let Some(diff) = diffs.next() {
            match diff.key.split_once('.') {
                None => lines.push(Self::attribute_line(diff)),
                Some((root, _)) => {
                    // Group dotted diffs under their map attribute.
                    let mut entries = vec![diff];
                    while diffs
                        .peek()
                        .is_some_and(|next| next.key.split_once('.').map(|(r, _)| r) == Some(root))
                    {
                        if let Some(next) = diffs.next() {
                            entries.push(next);
                        }
                    }
                    lines.extend(Self::map_block(root, &entries));
                }
            }
        }

        lines.push("}".to_string());
        lines.join("\n")
    }

    fn attribute_line(diff: &AttributeDiff) -> String {
        match (diff.kind, &diff.declared, &diff.observed) {
            (DiffKind::Added, _, Some(observed)) => format!(
                "  # {} = {} observed live but not declared; remove it or declare it",
                diff.key,
                render_hcl(observed, 1)
            ),
            (_, Some(declared), Some(observed)) => format!(
                "  {} = {} # observed: {}",
                diff.key,
                render_hcl(declared, 1),
                render_hcl(observed, 1)
            ),
            (_, Some(declared), None) => format!(
                "  {} = {} # unset live, restore declared value",
                diff.key,
                render_hcl(declared, 1)
            ),
            _ => format!("  # {}: no declared value recorded", diff.key),
        }
    }

    fn map_block(root: &str, entries: &[&AttributeDiff]) -> Vec<String> {
        let mut lines = vec![format!("  {} = {{", root)];
        for diff in entries {
            let entry = diff.key.split_once('.').map(|(_, e)| e).unwrap_or(&diff.key);
            match (diff.kind, &diff.declared, &diff.observed) {
                (DiffKind::Added, _, Some(observed)) => lines.push(format!(
                    "    # {} = {} observed live but not declared",
                    entry,
                    render_hcl(observed, 2)
                )),
                (_, Some(declared), Some(observed)) => lines.push(format!(
                    "    {} = {} # observed: {}",
                    entry,
                    render_hcl(declared, 2),
                    render_hcl(observed, 2)
                )),
                (_, Some(declared), None) => lines.push(format!(
                    "    {} = {} # unset live, restore declared value",
                    entry,
                    render_hcl(declared, 2)
                )),
                _ => {}
            }
        }
        lines.push("  }".to_string());
        lines
    }

    fn import_snippet(record: &DriftRecord) -> String {
        let address = &record.address;
        [
            format!(
                "# {} exists in the declared state but was not found live.",
                address
            ),
            "# Confirm the deletion was intentional before acting:".to_string(),
            format!(
                "#   keep it deleted:  terraform state rm '{}'",
                address
            ),
            "#   or restore it and re-import:".to_string(),
            format!("terraform import '{}' <resource-id>", address),
        ]
        .join("\n")
    }

    fn review_snippet(record: &DriftRecord, reason: &str) -> String {
        [
            format!("# {} could not be inspected: {}", record.address, reason),
            "# No drift verdict is possible for this resource.".to_string(),
            "# Review provider credentials and IAM permissions, then re-run the scan."
                .to_string(),
        ]
        .join("\n")
    }
}

/// Render a JSON value as an HCL expression. `depth` controls map
/// indentation (attribute maps nest one level inside the resource block).
fn render_hcl(value: &Value, depth: usize) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        Value::Array(items) => {
            let rendered: Vec<String> = items.iter().map(|v| render_hcl(v, depth)).collect();
            format!("[{}]", rendered.join(", "))
        }
        Value::Object(map) => {
            if map.is_empty() {
                return "{}".to_string();
            }
            let indent = "  ".repeat(depth + 1);
            let closing = "  ".repeat(depth);
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{indent}{k} = {}", render_hcl(v, depth + 1)))
                .collect();
            format!("{{\n{}\n{closing}}}", entries.join("\n"))
        }
    }
}
