use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::ComponentPath;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};
use walkdir::WalkDir;

/// One child of a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: PathBuf,
    /// Project-relative path with `/` separators
    pub relative: String,
    pub is_dir: bool,
}

impl TreeEntry {
    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|e| e.to_str())
    }
}

/// The scanned project as a file tree without derived entries
pub struct ProjectTree<'a> {
    root: PathBuf,
    config: &'a Config,
}

impl<'a> ProjectTree<'a> {
    pub fn new(root: impl Into<PathBuf>, config: &'a Config) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Direct children of `dir`, sorted by name, derived entries left out.
    ///
    /// Entries that disappear while listing are skipped; other listing
    /// failures are errors.
    pub fn children(&self, dir: &Path) -> Result<Vec<TreeEntry>> {
        let mut entries = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let kind = e.io_error().map(|io| io.kind());
                    skip_vanished(kind, e.path().unwrap_or(dir), &e)?;
                    continue;
                }
            };

            let relative = self.relative_path(entry.path());
            if self.is_derived(&relative) {
                trace!("Excluding: {}", relative);
                continue;
            }

            entries.push(TreeEntry {
                is_dir: entry.file_type().is_dir(),
                path: entry.into_path(),
                relative,
            });
        }

        Ok(entries)
    }

    /// Hidden entries and the configured `exclude` patterns are derived
    pub fn is_derived(&self, relative: &str) -> bool {
        let name = relative.rsplit('/').next().unwrap_or(relative);
        name.starts_with('.') || self.config.should_exclude(relative)
    }

    /// Project-relative path with `/` separators
    pub fn relative_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Path relative to the component, with the component root stripped
    pub fn component_path(&self, path: &Path) -> ComponentPath {
        ComponentPath::from_project_relative(&self.relative_path(path), &self.config.component_roots)
    }
}

/// Walk failures share one policy: an entry that vanished while listing
/// is skipped with a warning, anything else stops the scan.
pub(crate) fn skip_vanished(kind: Option<ErrorKind>, path: &Path, error: &dyn std::fmt::Display) -> Result<()> {
    if kind == Some(ErrorKind::NotFound) {
        warn!("Skipping vanished entry: {}", error);
        return Ok(());
    }
    Err(Error::Walk {
        path: path.to_path_buf(),
        reason: error.to_string(),
    })
}
