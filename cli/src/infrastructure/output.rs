//! ワークフロー結果の表示。
//!
//! 情報メッセージはそのまま 1 行、一覧や登録結果は整形済み JSON、
//! inspect はテーブルとスキーマ本文、export はファイルへの書き出し。

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tabled::{Table, Tabled};
use tracing::info;

use crate::domain::{Payload, SchemaReport, WorkflowOutcome};

#[derive(Tabled)]
struct ReportRow<'a> {
    #[tabled(rename = "Subject")]
    subject: &'a str,
    #[tabled(rename = "ID")]
    id: i32,
    #[tabled(rename = "Version")]
    version: i32,
    #[tabled(rename = "References")]
    references: &'a str,
}

/// 結果を `out` に書き出す。`Document` は `output` があればそのファイルへ書く。
pub fn render(
    outcome: &WorkflowOutcome,
    out: &mut impl Write,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    match outcome {
        WorkflowOutcome::Info(message) => writeln!(out, "{message}")?,
        WorkflowOutcome::Done(payload) => render_payload(payload, out, output)?,
    }
    Ok(())
}

fn render_payload(
    payload: &Payload,
    out: &mut impl Write,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    match payload {
        Payload::Message(message) => writeln!(out, "{message}")?,
        Payload::Registered(registration) => write_json(out, registration)?,
        Payload::Deleted(deletion) => write_json(out, deletion)?,
        Payload::Versions(versions) => write_json(out, versions)?,
        Payload::Subjects(subjects) => write_json(out, subjects)?,
        Payload::Inspection(report) => write_report(out, report)?,
        Payload::Document(bytes) => match output {
            Some(path) => {
                std::fs::write(path, bytes).map_err(|e| {
                    anyhow::anyhow!("can not write schema to {}: {}", path.display(), e)
                })?;
                info!(path = %path.display(), bytes = bytes.len(), "Schema written");
            }
            None => out.write_all(bytes)?,
        },
    }
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> anyhow::Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

fn write_report(out: &mut impl Write, report: &SchemaReport) -> anyhow::Result<()> {
    let table = Table::new([ReportRow {
        subject: &report.subject,
        id: report.id,
        version: report.version,
        references: &report.references,
    }]);
    writeln!(out, "{table}")?;
    writeln!(out)?;
    write!(out, "{}", report.schema)?;
    if !report.schema.ends_with('\n') {
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Deletion, Registration};

    fn rendered(outcome: &WorkflowOutcome) -> String {
        let mut buf = Vec::new();
        render(outcome, &mut buf, None).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_info_is_plain_line() {
        assert_eq!(
            rendered(&WorkflowOutcome::info("topic is not set")),
            "topic is not set\n"
        );
    }

    #[test]
    fn test_message_is_plain_line() {
        let outcome = WorkflowOutcome::Done(Payload::Message("schema is compatible".to_string()));
        assert_eq!(rendered(&outcome), "schema is compatible\n");
    }

    #[test]
    fn test_registration_is_json() {
        let outcome = WorkflowOutcome::Done(Payload::Registered(Registration {
            subject: "rates-usd_eur-value".to_string(),
            id: 11,
            version: 1,
        }));
        let value: serde_json::Value = serde_json::from_str(&rendered(&outcome)).unwrap();
        assert_eq!(value["subject"], "rates-usd_eur-value");
        assert_eq!(value["id"], 11);
        assert_eq!(value["version"], 1);
    }

    #[test]
    fn test_deletion_is_json() {
        let outcome = WorkflowOutcome::Done(Payload::Deleted(Deletion {
            subject: "orders-default-value".to_string(),
            versions: vec![1, 2],
            permanent: true,
        }));
        let value: serde_json::Value = serde_json::from_str(&rendered(&outcome)).unwrap();
        assert_eq!(value["versions"], serde_json::json!([1, 2]));
        assert_eq!(value["permanent"], true);
    }

    #[test]
    fn test_lists_are_json_arrays() {
        let versions = WorkflowOutcome::Done(Payload::Versions(vec![1, 2, 5]));
        let value: serde_json::Value = serde_json::from_str(&rendered(&versions)).unwrap();
        assert_eq!(value, serde_json::json!([1, 2, 5]));

        let subjects = WorkflowOutcome::Done(Payload::Subjects(Vec::new()));
        assert_eq!(rendered(&subjects), "[]\n");
    }

    #[test]
    fn test_inspection_table_then_schema() {
        let outcome = WorkflowOutcome::Done(Payload::Inspection(SchemaReport {
            subject: "orders-default-value".to_string(),
            id: 7,
            version: 2,
            references: "[]".to_string(),
            schema: "syntax = \"proto3\";".to_string(),
        }));
        let text = rendered(&outcome);

        let (table, schema) = text.split_once("\n\n").unwrap();
        for header in ["Subject", "ID", "Version", "References"] {
            assert!(table.contains(header), "missing header {header}");
        }
        assert!(table.contains("orders-default-value"));
        assert!(table.contains("[]"));
        assert_eq!(schema, "syntax = \"proto3\";\n");
    }

    #[test]
    fn test_document_written_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("currency.proto");
        let outcome = WorkflowOutcome::Done(Payload::Document(b"message Currency {}\n".to_vec()));

        let mut buf = Vec::new();
        render(&outcome, &mut buf, Some(&path)).unwrap();

        assert!(buf.is_empty());
        assert_eq!(std::fs::read(&path).unwrap(), b"message Currency {}\n");
    }

    #[test]
    fn test_document_without_path_goes_to_stream() {
        let outcome = WorkflowOutcome::Done(Payload::Document(b"message A {}".to_vec()));
        assert_eq!(rendered(&outcome), "message A {}");
    }

    #[test]
    fn test_document_to_missing_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.proto");
        let outcome = WorkflowOutcome::Done(Payload::Document(b"x".to_vec()));
        let err = render(&outcome, &mut Vec::new(), Some(&path)).unwrap_err();
        assert!(err.to_string().contains("can not write schema"));
    }
}
