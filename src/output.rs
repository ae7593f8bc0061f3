//! Text rendering of scan results for the terminal and the fixes file.

use std::path::Path;

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::drift::{DriftRecord, FixGenerator, FixSuggestion, Severity};
use crate::scan::ScanSummary;

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "RESOURCE")]
    resource: String,
    #[tabled(rename = "STATUS")]
    status: &'static str,
    #[tabled(rename = "SEVERITY")]
    severity: String,
    #[tabled(rename = "DRIFTED ATTRIBUTES")]
    attributes: String,
}

fn severity_cell(severity: Option<Severity>) -> String {
    match severity {
        Some(s) => s.to_string(),
        None => "unknown".to_string(),
    }
}

pub fn records_table(records: &[DriftRecord]) -> String {
    let rows: Vec<RecordRow> = records
        .iter()
        .map(|record| RecordRow {
            resource: record.address.to_string(),
            status: record.status.label(),
            severity: severity_cell(record.severity),
            attributes: record
                .diffs
                .iter()
                .map(|d| d.key.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();

    Table::new(rows).with(Style::sharp()).to_string()
}

pub fn summary_block(summary: &ScanSummary, incomplete: bool) -> String {
    let mut lines = vec![
        format!("Resources checked : {}", summary.total),
        format!("Clean             : {}", summary.matched),
        format!("Drifted           : {}", summary.drifted),
        format!("Deleted           : {}", summary.deleted),
        format!("Unknown           : {}", summary.unknown),
    ];
    for severity in Severity::ALL.iter().rev() {
        if let Some(count) = summary.by_severity.get(severity) {
            if *severity != Severity::None {
                lines.push(format!("  {:<8}: {}", severity.to_string(), count));
            }
        }
    }
    if incomplete {
        lines.push(
            "WARNING: scan incomplete; unknown resources were not checked, not verified clean"
                .to_string(),
        );
    }
    lines.join("\n")
}

/// Fix suggestions for every non-matching record, in record order.
pub fn collect_fixes(records: &[DriftRecord]) -> Vec<FixSuggestion> {
    records.iter().filter_map(FixGenerator::generate).collect()
}

/// Assemble the fixes document written next to the user's configuration:
/// header instructions plus one annotated block per suggestion.
pub fn fixes_document(records: &[DriftRecord]) -> String {
    let mut out = String::from(
        "# Drift remediation suggestions\n\
         #\n\
         # Review each block, apply the wanted changes to your .tf files,\n\
         # then run `terraform plan` to verify before `terraform apply`.\n",
    );

    for record in records {
        let Some(fix) = FixGenerator::generate(record) else {
            continue;
        };
        out.push('\n');
        out.push_str(&format!(
            "# --- {} (severity: {}) ---\n",
            fix.address,
            severity_cell(record.severity)
        ));
        out.push_str(&fix.snippet);
        out.push('\n');
    }
    out
}

pub fn write_fixes_file(path: &Path, records: &[DriftRecord]) -> std::io::Result<()> {
    std::fs::write(path, fixes_document(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drift::{AttributeDiff, DiffKind, DriftStatus};
    use crate::resource::ResourceAddress;
    use serde_json::json;

    fn sample_records() -> Vec<DriftRecord> {
        vec![
            DriftRecord {
                address: ResourceAddress::new("aws_instance", "web"),
                status: DriftStatus::Drifted,
                diffs: vec![AttributeDiff {
                    key: "instance_type".to_string(),
                    declared: Some(json!("t2.micro")),
                    observed: Some(json!("t2.small")),
                    kind: DiffKind::Changed,
                }],
                severity: Some(Severity::High),
            },
            DriftRecord {
                address: ResourceAddress::new("aws_s3_bucket", "logs"),
                status: DriftStatus::Match,
                diffs: vec![],
                severity: Some(Severity::None),
            },
            DriftRecord::inspection_failed(
                ResourceAddress::new("aws_security_group", "edge"),
                "permission denied: ec2:DescribeSecurityGroups",
            ),
        ]
    }

    #[test]
    fn test_records_table_contains_all_rows() {
        let table = records_table(&sample_records());
        assert!(table.contains("aws_instance.web"));
        assert!(table.contains("drifted"));
        assert!(table.contains("high"));
        assert!(table.contains("instance_type"));
        assert!(table.contains("aws_security_group.edge"));
        assert!(table.contains("unknown"));
    }

    #[test]
    fn test_summary_block_reports_unknown_distinctly() {
        let records = sample_records();
        let summary = ScanSummary::from_records(&records);
        let block = summary_block(&summary, false);
        assert!(block.contains("Clean             : 1"));
        assert!(block.contains("Drifted           : 1"));
        assert!(block.contains("Unknown           : 1"));
    }

    #[test]
    fn test_summary_block_incomplete_warning() {
        let summary = ScanSummary::from_records(&[]);
        assert!(summary_block(&summary, true).contains("scan incomplete"));
        assert!(!summary_block(&summary, false).contains("scan incomplete"));
    }

    #[test]
    fn test_collect_fixes_skips_match() {
        let fixes = collect_fixes(&sample_records());
        assert_eq!(fixes.len(), 2);
        assert!(
            fixes
                .iter()
                .all(|f| f.address.to_string() != "aws_s3_bucket.logs")
        );
    }

    #[test]
    fn test_fixes_document_sections() {
        let doc = fixes_document(&sample_records());
        assert!(doc.contains("# --- aws_instance.web (severity: high) ---"));
        assert!(doc.contains("instance_type = \"t2.micro\""));
        assert!(doc.contains("# --- aws_security_group.edge (severity: unknown) ---"));
        assert!(doc.contains("terraform plan"));
    }
}
