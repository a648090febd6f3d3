//! Usage analysis over the cross-reference model

mod policy;
pub mod service_candidates;
mod usage;

pub use policy::MatchPolicy;
pub use service_candidates::{looks_like_service, MapSignature};
pub use usage::UsageAnalyzer;

use crate::model::ArtifactKind;
use crate::search::SearchMatch;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Kinds of dead or broken artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Issue {
    /// Method shaped like a service with no `<service>` pointing at it
    ServiceWithoutDefinition,

    /// Service that nothing calls
    UncalledService,

    /// Template neither used by a screen nor included by another template
    UnreferencedTemplate,

    /// Script not used by any screen
    UnreferencedScript,

    /// View no request map responds with
    UnreferencedView,

    /// View rendering a screen that is not defined
    MissingViewTarget,

    /// Screen nothing renders or decorates with
    UnreferencedScreen,
}

impl Issue {
    pub const ALL: [Issue; 7] = [
        Issue::ServiceWithoutDefinition,
        Issue::UncalledService,
        Issue::UnreferencedTemplate,
        Issue::UnreferencedScript,
        Issue::UnreferencedView,
        Issue::MissingViewTarget,
        Issue::UnreferencedScreen,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Issue::ServiceWithoutDefinition => "OFB001",
            Issue::UncalledService => "OFB002",
            Issue::UnreferencedTemplate => "OFB003",
            Issue::UnreferencedScript => "OFB004",
            Issue::UnreferencedView => "OFB005",
            Issue::MissingViewTarget => "OFB006",
            Issue::UnreferencedScreen => "OFB007",
        }
    }

    /// Kebab-case rule name used by SARIF output
    pub fn rule_name(&self) -> &'static str {
        match self {
            Issue::ServiceWithoutDefinition => "service-without-definition",
            Issue::UncalledService => "uncalled-service",
            Issue::UnreferencedTemplate => "unreferenced-template",
            Issue::UnreferencedScript => "unreferenced-script",
            Issue::UnreferencedView => "unreferenced-view",
            Issue::MissingViewTarget => "missing-view-target",
            Issue::UnreferencedScreen => "unreferenced-screen",
        }
    }

    pub fn artifact(&self) -> ArtifactKind {
        match self {
            Issue::ServiceWithoutDefinition | Issue::UncalledService => ArtifactKind::Service,
            Issue::UnreferencedTemplate => ArtifactKind::Template,
            Issue::UnreferencedScript => ArtifactKind::Script,
            Issue::UnreferencedView | Issue::MissingViewTarget => ArtifactKind::View,
            Issue::UnreferencedScreen => ArtifactKind::Screen,
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            Issue::MissingViewTarget => Severity::Error,
            _ => Severity::Warning,
        }
    }

    /// One-line rule description
    pub fn description(&self) -> &'static str {
        match self {
            Issue::ServiceWithoutDefinition => "Method looks like a service but has no service definition",
            Issue::UncalledService => "Service is not called from anywhere",
            Issue::UnreferencedTemplate => "Template is not referenced from screens nor included",
            Issue::UnreferencedScript => "Script is not referenced from screen definitions",
            Issue::UnreferencedView => "View is not referenced from any request map",
            Issue::MissingViewTarget => "View renders a screen that does not exist",
            Issue::UnreferencedScreen => "Screen is not referenced from anywhere",
        }
    }
}

/// Severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a finding is placed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FindingLocation {
    pub file: PathBuf,
    /// Byte offset of the marked text, when resolved to a character range
    pub offset: Option<usize>,
    pub length: usize,
    /// 1-based
    pub line: usize,
    /// 1-based
    pub column: usize,
}

impl FindingLocation {
    /// A whole-line location without a character range
    pub fn at_line(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            offset: None,
            length: 0,
            line,
            column: 1,
        }
    }

    pub fn from_match(found: &SearchMatch) -> Self {
        Self {
            file: found.path.clone(),
            offset: Some(found.offset),
            length: found.length,
            line: found.line,
            column: found.column,
        }
    }
}

/// A dead or broken artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub issue: Issue,
    pub artifact: ArtifactKind,
    /// Identity of the artifact: service name, view key, screen URI or path
    pub name: String,
    pub location: FindingLocation,
    /// Message with the artifact tag prefix, e.g. `[Service] ...`
    pub message: String,
    pub severity: Severity,
}

impl Finding {
    pub fn new(issue: Issue, name: impl Into<String>, location: FindingLocation, text: &str) -> Self {
        let artifact = issue.artifact();
        Self {
            issue,
            artifact,
            name: name.into(),
            location,
            message: format!("{} {}", artifact.tag(), text),
            severity: issue.default_severity(),
        }
    }

    pub fn file(&self) -> &Path {
        &self.location.file
    }
}

/// Receives findings as the analyzer emits them
pub trait FindingSink {
    fn record(&mut self, finding: Finding);
}

impl FindingSink for Vec<Finding> {
    fn record(&mut self, finding: Finding) {
        self.push(finding);
    }
}
