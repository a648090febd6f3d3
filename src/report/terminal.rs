use crate::analysis::{Finding, Severity};
use crate::model::ArtifactKind;
use colored::Colorize;
use miette::Result;
use std::collections::BTreeMap;
use std::path::Path;

/// Terminal reporter with colored output
pub struct TerminalReporter;

impl TerminalReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report(&self, findings: &[Finding]) -> Result<()> {
        if findings.is_empty() {
            println!("{}", "No dead artifacts found!".green().bold());
            return Ok(());
        }

        // Group by file
        let mut by_file: BTreeMap<&Path, Vec<&Finding>> = BTreeMap::new();
        for finding in findings {
            by_file.entry(finding.file()).or_default().push(finding);
        }

        println!();
        println!(
            "{}",
            format!("Found {} dead or broken artifacts:", findings.len())
                .yellow()
                .bold()
        );
        println!();

        for (file, items) in &by_file {
            println!("{}", file.display().to_string().cyan().bold());
            for item in items {
                self.print_item(item);
            }
            println!();
        }

        self.print_summary(findings);

        Ok(())
    }

    fn print_item(&self, item: &Finding) {
        let severity = match item.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        let location = format!("{}:{}", item.location.line, item.location.column);

        println!(
            "  {} {} [{}] {}",
            location.dimmed(),
            severity,
            item.issue.code().dimmed(),
            item.message
        );

        println!(
            "    {} {} '{}'",
            "→".dimmed(),
            item.artifact.display_name().dimmed(),
            item.name.white()
        );
    }

    fn print_summary(&self, findings: &[Finding]) {
        let mut by_artifact: BTreeMap<ArtifactKind, usize> = BTreeMap::new();
        let mut errors = 0;
        let mut warnings = 0;

        for finding in findings {
            *by_artifact.entry(finding.artifact).or_default() += 1;
            match finding.severity {
                Severity::Error => errors += 1,
                Severity::Warning => warnings += 1,
            }
        }

        println!("{}", "─".repeat(60).dimmed());

        for (artifact, count) in &by_artifact {
            println!("  {:<10} {}", format!("{}s", artifact.display_name()), count);
        }

        let mut severity_parts = Vec::new();
        if errors > 0 {
            severity_parts.push(format!("{} errors", errors).red().to_string());
        }
        if warnings > 0 {
            severity_parts.push(format!("{} warnings", warnings).yellow().to_string());
        }
        println!("Summary: {}", severity_parts.join(", "));
        println!("{}", format!("Total: {} findings", findings.len()).bold());
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}
