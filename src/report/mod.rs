mod terminal;
mod json;
mod sarif;

pub use terminal::TerminalReporter;
pub use json::JsonReporter;
pub use sarif::SarifReporter;

use crate::analysis::Finding;
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};

/// Output format for reports
#[derive(Debug, Clone, Default)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
    Sarif,
}

/// Reporter for outputting findings
pub struct Reporter {
    format: ReportFormat,
    output_path: Option<PathBuf>,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>) -> Self {
        Self { format, output_path }
    }

    /// Report the findings of one run
    pub fn report(&self, findings: &[Finding]) -> Result<()> {
        match &self.format {
            ReportFormat::Terminal => {
                let reporter = TerminalReporter::new();
                reporter.report(findings)
            }
            ReportFormat::Json => {
                let reporter = JsonReporter::new(self.output_path.clone());
                reporter.report(findings)
            }
            ReportFormat::Sarif => {
                let reporter = SarifReporter::new(self.output_path.clone());
                reporter.report(findings)
            }
        }
    }
}

/// Write a machine-readable document to `path`, or to stdout
fn emit_document(document: &str, path: Option<&Path>, label: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, document).into_diagnostic()?;
            eprintln!("{} written to: {}", label, path.display());
        }
        None => println!("{}", document),
    }
    Ok(())
}
