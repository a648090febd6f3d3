use super::emit_document;
use crate::analysis::{Finding, Issue};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;

/// SARIF reporter for CI/CD integration (GitHub, Azure DevOps, etc.)
pub struct SarifReporter {
    output_path: Option<PathBuf>,
}

impl SarifReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn report(&self, findings: &[Finding]) -> Result<()> {
        let json = self.render(findings)?;
        emit_document(&json, self.output_path.as_deref(), "SARIF report")
    }

    pub fn render(&self, findings: &[Finding]) -> Result<String> {
        let sarif = SarifReport::from_findings(findings);
        serde_json::to_string_pretty(&sarif).into_diagnostic()
    }
}

/// SARIF 2.1.0 format
#[derive(Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: &'static str,
    version: &'static str,
    runs: Vec<SarifRun>,
}

#[derive(Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
struct SarifDriver {
    name: &'static str,
    version: &'static str,
    #[serde(rename = "informationUri")]
    information_uri: &'static str,
    rules: Vec<SarifRule>,
}

#[derive(Serialize)]
struct SarifRule {
    id: &'static str,
    name: &'static str,
    #[serde(rename = "shortDescription")]
    short_description: SarifMessage,
    #[serde(rename = "defaultConfiguration")]
    default_configuration: SarifConfiguration,
}

#[derive(Serialize)]
struct SarifConfiguration {
    level: &'static str,
}

#[derive(Serialize)]
struct SarifResult {
    #[serde(rename = "ruleId")]
    rule_id: &'static str,
    level: &'static str,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Serialize)]
struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    physical_location: SarifPhysicalLocation,
}

#[derive(Serialize)]
struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    artifact_location: SarifArtifactLocation,
    region: SarifRegion,
}

#[derive(Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

#[derive(Serialize)]
struct SarifRegion {
    #[serde(rename = "startLine")]
    start_line: usize,
    #[serde(rename = "startColumn")]
    start_column: usize,
    #[serde(rename = "byteOffset", skip_serializing_if = "Option::is_none")]
    byte_offset: Option<usize>,
    #[serde(rename = "byteLength", skip_serializing_if = "Option::is_none")]
    byte_length: Option<usize>,
}

impl SarifReport {
    fn from_findings(findings: &[Finding]) -> Self {
        let rules = Issue::ALL
            .iter()
            .map(|issue| SarifRule {
                id: issue.code(),
                name: issue.rule_name(),
                short_description: SarifMessage {
                    text: issue.description().to_string(),
                },
                default_configuration: SarifConfiguration {
                    level: issue.default_severity().as_str(),
                },
            })
            .collect();

        let results = findings
            .iter()
            .map(|finding| {
                let location = &finding.location;
                SarifResult {
                    rule_id: finding.issue.code(),
                    level: finding.severity.as_str(),
                    message: SarifMessage {
                        text: finding.message.clone(),
                    },
                    locations: vec![SarifLocation {
                        physical_location: SarifPhysicalLocation {
                            artifact_location: SarifArtifactLocation {
                                uri: location.file.to_string_lossy().replace('\\', "/"),
                            },
                            region: SarifRegion {
                                start_line: location.line,
                                start_column: location.column,
                                byte_offset: location.offset,
                                byte_length: location.offset.map(|_| location.length),
                            },
                        },
                    }],
                }
            })
            .collect();

        SarifReport {
            schema: "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json",
            version: "2.1.0",
            runs: vec![SarifRun {
                tool: SarifTool {
                    driver: SarifDriver {
                        name: "ofbizdeadcode",
                        version: env!("CARGO_PKG_VERSION"),
                        information_uri: "https://github.com/KevinDoremy/SearchDeadCode",
                        rules,
                    },
                },
                results,
            }],
        }
    }
}
