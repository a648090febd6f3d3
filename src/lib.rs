//! OfbizDeadCode - Dead artifact detection for OFBiz projects
//!
//! This library finds services, views, screens, FreeMarker templates and
//! scripts that nothing in an OFBiz project refers to, plus views that
//! render screens which do not exist.
//!
//! # Architecture
//!
//! The analysis pipeline consists of:
//! 1. **Scanning** - Walk the project tree once, extracting definitions and
//!    references from XML descriptors, templates and scripts
//! 2. **Method model** - Parse Java sources with tree-sitter to find
//!    methods shaped like service implementations
//! 3. **Usage analysis** - Resolve each definition against the collected
//!    references, falling back to a textual search of the project
//! 4. **Reporting** - Output findings in various formats
//!
//! Both phases poll a [`ProgressMonitor`] and stop with
//! [`Error::Cancelled`] when asked to.

pub mod analysis;
pub mod config;
pub mod discovery;
pub mod error;
pub mod model;
pub mod parser;
pub mod progress;
pub mod report;
pub mod search;

pub use analysis::{Finding, FindingSink, Issue, MatchPolicy, Severity, UsageAnalyzer};
pub use config::Config;
pub use discovery::{ScanResult, Scanner};
pub use error::{Error, Result};
pub use model::CrossReferenceModel;
pub use progress::{BarMonitor, ProgressMonitor, ScanCancellation};
pub use report::{ReportFormat, Reporter};

use std::path::{Path, PathBuf};

/// Everything one scan/analyze cycle produced
#[derive(Debug)]
pub struct Analysis {
    pub findings: Vec<Finding>,
    /// XML files abandoned by the scan
    pub skipped: Vec<PathBuf>,
}

/// Scan `root` and analyze it.
///
/// Findings are collected locally and only returned when the whole cycle
/// completes; a cancelled run yields `Err(Error::Cancelled)` and nothing
/// else.
pub fn run(root: &Path, config: &Config, monitor: &dyn ProgressMonitor) -> Result<Analysis> {
    let ScanResult { model, skipped } = Scanner::new(config, monitor)?.scan(root)?;

    let mut findings = Vec::new();
    UsageAnalyzer::new(&model, config, monitor).analyze(&mut findings)?;

    Ok(Analysis { findings, skipped })
}
