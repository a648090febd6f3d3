use crate::analysis::MatchPolicy;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for an OFBiz dead artifact analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Patterns for derived/build entries that are never scanned
    pub exclude: Vec<String>,

    /// Path prefixes stripped to form component-relative paths
    pub component_roots: Vec<String>,

    /// Artifact names or paths that are never reported
    pub retain_patterns: Vec<String>,

    /// How a located finding is placed when a search returns several matches
    pub match_policy: MatchPolicy,

    /// Text search configuration
    pub search: SearchConfig,

    /// Detection configuration
    pub detection: DetectionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Files searched for quoted service names
    pub service_reference_globs: Vec<String>,

    /// Files searched for `<#include>`/`<#import>` of templates
    pub include_globs: Vec<String>,

    /// Files larger than this are skipped by the text search
    pub max_file_size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Java methods that look like services but have no definition
    pub service_candidates: bool,

    /// Service definitions that are never called
    pub service_definitions: bool,

    /// Templates never referenced nor included
    pub templates: bool,

    /// Scripts never referenced from screens
    pub scripts: bool,

    /// Unreferenced views and views pointing at missing screens
    pub views: bool,

    /// Screens never referenced
    pub screens: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exclude: vec![
                "**/build/**".to_string(),
                "**/target/**".to_string(),
                "**/.git/**".to_string(),
                "**/.svn/**".to_string(),
                "**/runtime/**".to_string(),
                "**/node_modules/**".to_string(),
            ],
            component_roots: vec!["hot-deploy".to_string()],
            retain_patterns: vec![],
            match_policy: MatchPolicy::default(),
            search: SearchConfig::default(),
            detection: DetectionConfig::default(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            service_reference_globs: vec![
                "*.xml".to_string(),
                "*.bsh".to_string(),
                "*.java".to_string(),
            ],
            include_globs: vec!["*.ftl".to_string()],
            max_file_size: 10 * 1024 * 1024,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            service_candidates: true,
            service_definitions: true,
            templates: true,
            scripts: true,
            views: true,
            screens: true,
        }
    }
}

impl DetectionConfig {
    /// Enable only the passes named in a comma-separated list
    pub fn only(list: &str) -> Result<Self> {
        let mut detection = Self {
            service_candidates: false,
            service_definitions: false,
            templates: false,
            scripts: false,
            views: false,
            screens: false,
        };

        for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match name {
                "service-candidates" | "candidates" => detection.service_candidates = true,
                "services" | "service-definitions" => detection.service_definitions = true,
                "templates" | "ftl" => detection.templates = true,
                "scripts" | "bsh" | "groovy" => detection.scripts = true,
                "views" => detection.views = true,
                "screens" => detection.screens = true,
                other => miette::bail!("Unknown detection pass: {}", other),
            }
        }

        Ok(detection)
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config"),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config"),
            _ => {
                // Try YAML first, then TOML
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")
                }
            }
        }
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(project_root: &Path) -> Result<Self> {
        let default_names = [
            ".ofbizdeadcode.yml",
            ".ofbizdeadcode.yaml",
            ".ofbizdeadcode.toml",
            "ofbizdeadcode.yml",
            "ofbizdeadcode.yaml",
            "ofbizdeadcode.toml",
        ];

        for name in &default_names {
            let path = project_root.join(name);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Check whether a project-relative path is a derived/build artifact
    pub fn should_exclude(&self, relative_path: &str) -> bool {
        // Match against "/rel/path/" so that "**/build/**" also catches a
        // top-level "build" directory
        let anchored = format!("/{}/", relative_path.trim_matches('/'));
        self.exclude
            .iter()
            .any(|pattern| glob_match(pattern, &anchored) || glob_match(pattern, relative_path))
    }

    /// Check whether an artifact should never be reported
    pub fn should_retain(&self, name: &str) -> bool {
        self.retain_patterns.iter().any(|p| glob_match(p, name))
    }
}

/// Simple glob matching for patterns like "*Screens", "*.ftl" or "**/build/**"
pub fn glob_match(pattern: &str, text: &str) -> bool {
    if pattern == "*" {
        return true;
    }

    if let Some(suffix) = pattern.strip_prefix('*') {
        if !pattern.contains('/') && !suffix.contains('*') {
            // "*.ftl" matches "a/b/main.ftl", "*Test" matches "accountTest"
            return text.ends_with(suffix);
        }
    }

    if let Some(prefix) = pattern.strip_suffix('*') {
        if !pattern.contains('/') && !prefix.contains('*') {
            return text.starts_with(prefix);
        }
    }

    if pattern.contains("**") {
        if pattern.starts_with("**/") && pattern.ends_with("/**") {
            // Must match a complete directory name, not a substring:
            // "/build/" matches, "/buildtools/" does not
            let dir_name = pattern.trim_start_matches("**/").trim_end_matches("/**");
            return text.contains(&format!("/{}/", dir_name));
        }

        let parts: Vec<&str> = pattern.split("**").collect();
        if parts.len() == 2 {
            let prefix = parts[0].trim_end_matches('/');
            let suffix = parts[1].trim_start_matches('/');

            if prefix.is_empty() && suffix.is_empty() {
                return true;
            }

            if prefix.is_empty() {
                return text.ends_with(suffix) || text.contains(&format!("/{}", suffix));
            }

            if suffix.is_empty() {
                return text.starts_with(prefix) || text.contains(&format!("{}/", prefix));
            }

            return (text.starts_with(prefix) || text.contains(&format!("/{}/", prefix)))
                && (text.ends_with(suffix) || text.contains(&format!("/{}", suffix)));
        }
    }

    text == pattern
}
