use super::{JavaSourceFinder, ProjectTree, TreeEntry};
use crate::analysis::looks_like_service;
use crate::config::Config;
use crate::error::Result;
use crate::model::{CorpusFile, CrossReferenceModel, ModelBuilder, ServiceMethodCandidate};
use crate::parser::xml::{ExtractOutcome, XmlExtractor, XmlSource};
use crate::parser::{JavaParser, MethodSymbol, ScreenReferenceScanner};
use crate::progress::{check_cancel, ProgressMonitor, ScanProgress};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Work units reported by the tree walk; the analyzer uses the rest
pub const SCAN_WORK: u64 = 20;

/// Directories per work unit. A guess: large trees stop reporting early.
const DIRECTORIES_PER_UNIT: u64 = SCAN_WORK * 40;

/// What a completed scan produced
#[derive(Debug)]
pub struct ScanResult {
    pub model: CrossReferenceModel,
    /// XML files abandoned because they could not be read or parsed
    pub skipped: Vec<PathBuf>,
}

/// Walks a project once and fills the cross-reference model
pub struct Scanner<'a> {
    config: &'a Config,
    monitor: &'a dyn ProgressMonitor,
    extractor: XmlExtractor,
    screen_refs: ScreenReferenceScanner,
}

impl<'a> Scanner<'a> {
    /// Fails if the extraction queries do not compile, before any file is read
    pub fn new(config: &'a Config, monitor: &'a dyn ProgressMonitor) -> Result<Self> {
        Ok(Self {
            config,
            monitor,
            extractor: XmlExtractor::new()?,
            screen_refs: ScreenReferenceScanner::new(),
        })
    }

    pub fn scan(&self, root: &Path) -> Result<ScanResult> {
        info!("Scanning {}", root.display());

        let tree = ProjectTree::new(root, self.config);
        let mut builder = ModelBuilder::new();
        let mut skipped = Vec::new();
        let mut progress = ScanProgress::new(self.monitor, SCAN_WORK, DIRECTORIES_PER_UNIT);

        self.scan_directory(&tree, root, &mut builder, &mut skipped, &mut progress)?;

        if self.config.detection.service_candidates {
            self.collect_service_candidates(root, &mut builder)?;
        }

        let model = builder.build();
        info!("Scanned: {}", model.stats());
        if !skipped.is_empty() {
            warn!("{} XML files could not be parsed", skipped.len());
        }

        Ok(ScanResult { model, skipped })
    }

    fn scan_directory(
        &self,
        tree: &ProjectTree<'_>,
        dir: &Path,
        builder: &mut ModelBuilder,
        skipped: &mut Vec<PathBuf>,
        progress: &mut ScanProgress<'_>,
    ) -> Result<()> {
        for entry in tree.children(dir)? {
            check_cancel(self.monitor)?;

            if entry.is_dir {
                progress.tick();
                self.monitor.sub_task(&format!("Scanning {}", entry.relative));
                self.scan_directory(tree, &entry.path, builder, skipped, progress)?;
                continue;
            }

            builder.add_corpus_file(CorpusFile {
                path: entry.path.clone(),
                relative: entry.relative.clone(),
            });

            match entry.extension() {
                Some("xml") => {
                    let source = XmlSource {
                        path: &entry.path,
                        relative: &entry.relative,
                        component_path: tree.component_path(&entry.path),
                    };
                    match self.extractor.extract_file(&source)? {
                        ExtractOutcome::Extracted(extraction) => builder.merge(extraction),
                        ExtractOutcome::Skipped(_) => skipped.push(entry.path.clone()),
                    }
                }
                Some("ftl") => {
                    builder.add_template(tree.component_path(&entry.path), entry.path.clone());
                    self.scan_screen_references(&entry, builder);
                }
                Some("bsh") | Some("groovy") => {
                    builder.add_script(tree.component_path(&entry.path), entry.path.clone());
                    self.scan_screen_references(&entry, builder);
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Screens rendered by name from template or script code
    fn scan_screen_references(&self, entry: &TreeEntry, builder: &mut ModelBuilder) {
        let bytes = match std::fs::read(&entry.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Skipping {}: {}", entry.relative, e);
                return;
            }
        };

        for uri in self.screen_refs.scan(&String::from_utf8_lossy(&bytes)) {
            debug!("{} renders {}", entry.relative, uri);
            builder.reference_screen(uri);
        }
    }

    fn collect_service_candidates(&self, root: &Path, builder: &mut ModelBuilder) -> Result<()> {
        let sources = JavaSourceFinder::new(self.config).find(root, self.monitor)?;
        check_cancel(self.monitor)?;

        self.monitor.sub_task(&format!("Parsing {} Java files", sources.len()));
        let methods = JavaParser::new().parse_files(&sources);
        check_cancel(self.monitor)?;

        for method in methods.iter().filter(|m| looks_like_service(*m)) {
            builder.add_service_candidate(ServiceMethodCandidate {
                qualified_name: method.qualified_name(),
                file: method.file().to_path_buf(),
                line: method.source_line(),
            });
        }

        Ok(())
    }
}
