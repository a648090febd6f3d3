use super::emit_document;
use crate::analysis::{Finding, Severity};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// JSON reporter for programmatic output
pub struct JsonReporter {
    output_path: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn report(&self, findings: &[Finding]) -> Result<()> {
        let json = self.render(findings)?;
        emit_document(&json, self.output_path.as_deref(), "Report")
    }

    pub fn render(&self, findings: &[Finding]) -> Result<String> {
        let report = JsonReport::from_findings(findings);
        serde_json::to_string_pretty(&report).into_diagnostic()
    }
}

#[derive(Serialize)]
struct JsonReport {
    version: &'static str,
    total_findings: usize,
    findings: Vec<JsonFinding>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonFinding {
    code: &'static str,
    severity: &'static str,
    artifact: &'static str,
    name: String,
    message: String,
    file: String,
    line: usize,
    column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<usize>,
    length: usize,
}

#[derive(Serialize)]
struct JsonSummary {
    by_artifact: BTreeMap<&'static str, usize>,
    errors: usize,
    warnings: usize,
}

impl JsonReport {
    fn from_findings(findings: &[Finding]) -> Self {
        let mut errors = 0;
        let mut warnings = 0;
        let mut by_artifact = BTreeMap::new();

        let entries = findings
            .iter()
            .map(|finding| {
                match finding.severity {
                    Severity::Error => errors += 1,
                    Severity::Warning => warnings += 1,
                }
                *by_artifact.entry(finding.artifact.display_name()).or_insert(0) += 1;

                JsonFinding {
                    code: finding.issue.code(),
                    severity: finding.severity.as_str(),
                    artifact: finding.artifact.display_name(),
                    name: finding.name.clone(),
                    message: finding.message.clone(),
                    file: finding.location.file.to_string_lossy().to_string(),
                    line: finding.location.line,
                    column: finding.location.column,
                    offset: finding.location.offset,
                    length: finding.location.length,
                }
            })
            .collect();

        Self {
            version: "1.0",
            total_findings: findings.len(),
            findings: entries,
            summary: JsonSummary {
                by_artifact,
                errors,
                warnings,
            },
        }
    }
}
