use super::tree::skip_vanished;
use crate::config::Config;
use crate::error::Result;
use crate::progress::{check_cancel, ProgressMonitor};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Finds the Java sources that feed the method model
pub struct JavaSourceFinder<'a> {
    config: &'a Config,
}

impl<'a> JavaSourceFinder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// All `.java` files under `root`, sorted
    pub fn find(&self, root: &Path, monitor: &dyn ProgressMonitor) -> Result<Vec<PathBuf>> {
        debug!("Looking for Java sources in: {}", root.display());

        let walker = WalkBuilder::new(root)
            .hidden(true) // Skip hidden files
            .git_ignore(true) // Respect .gitignore
            .git_exclude(true) // Respect .git/info/exclude
            .ignore(true) // Respect .ignore files
            .parents(false)
            .follow_links(false)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            check_cancel(monitor)?;

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    skip_vanished(e.io_error().map(|io| io.kind()), root, &e)?;
                    continue;
                }
            };

            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("java") {
                continue;
            }

            let relative = path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/");
            if self.config.should_exclude(&relative) {
                trace!("Excluding: {}", relative);
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        debug!("Found {} Java files", files.len());
        Ok(files)
    }
}
