//! Typed identities for each artifact kind
//!
//! Services, views, screens, templates and scripts each live in their own
//! key space. Keeping them as distinct types instead of concatenated
//! strings makes a cross-kind collision a type error.

use serde::Serialize;
use std::fmt;

/// Scheme prefix of the framework's cross-file addressing
pub const COMPONENT_SCHEME: &str = "component://";

/// Kind of artifact a definition or finding belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ArtifactKind {
    Service,
    View,
    Screen,
    Template,
    Script,
}

impl ArtifactKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ArtifactKind::Service => "service",
            ArtifactKind::View => "view",
            ArtifactKind::Screen => "screen",
            ArtifactKind::Template => "template",
            ArtifactKind::Script => "script",
        }
    }

    /// Fixed tag that prefixes every finding message of this kind
    pub fn tag(&self) -> &'static str {
        match self {
            ArtifactKind::Service => "[Service]",
            ArtifactKind::View => "[View]",
            ArtifactKind::Screen => "[Screen]",
            ArtifactKind::Template => "[Template]",
            ArtifactKind::Script => "[Script]",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Global service name, e.g. `crmsfa.createAccount`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ServiceName(pub String);

impl ServiceName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Path of a file relative to its component, without a leading slash,
/// e.g. `accounting/widget/screens/common/CommonScreens.xml`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ComponentPath(String);

impl ComponentPath {
    /// Normalize a `location`/`page` attribute value:
    /// `component://foo/bar.xml` becomes `foo/bar.xml`
    pub fn from_uri(uri: &str) -> Self {
        let trimmed = uri.trim();
        let path = trimmed.strip_prefix(COMPONENT_SCHEME).unwrap_or(trimmed);
        Self(path.trim_start_matches('/').to_string())
    }

    /// Build from a project-relative path (with `/` separators), stripping
    /// the first matching component root such as `hot-deploy`
    pub fn from_project_relative(relative: &str, component_roots: &[String]) -> Self {
        let relative = relative.trim_start_matches('/');
        for root in component_roots {
            let root = root.trim_matches('/');
            if root.is_empty() {
                continue;
            }
            if let Some(rest) = relative.strip_prefix(root) {
                if let Some(rest) = rest.strip_prefix('/') {
                    return Self(rest.to_string());
                }
            }
        }
        Self(relative.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final path segment
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ComponentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `<componentPath>#<screenName>`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ScreenUri {
    pub path: ComponentPath,
    pub name: String,
}

impl ScreenUri {
    pub fn new(path: ComponentPath, name: impl Into<String>) -> Self {
        Self {
            path,
            name: name.into(),
        }
    }

    /// Parse `component://a/b.xml#name`, `a/b.xml#name` or a quoted literal
    /// of either. A URI without `#` yields an empty screen name.
    pub fn parse(uri: &str) -> Self {
        let uri = uri.trim().trim_matches('"');
        match uri.rsplit_once('#') {
            Some((path, name)) => Self::new(ComponentPath::from_uri(path), name),
            None => Self::new(ComponentPath::from_uri(uri), ""),
        }
    }
}

impl fmt::Display for ScreenUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.path, self.name)
    }
}

/// View name scoped to the controller file that declares it
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ViewKey {
    /// Project-relative path of the controller file
    pub controller: String,
    pub name: String,
}

impl ViewKey {
    pub fn new(controller: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ViewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.controller, self.name)
    }
}
