//! Cross-reference model
//!
//! Definitions and references gathered by the scan phase. A
//! [`ModelBuilder`] is the single writer while the tree is walked;
//! [`ModelBuilder::build`] freezes it into a [`CrossReferenceModel`] that
//! the analyzer only reads.

mod keys;

pub use keys::{ArtifactKind, ComponentPath, ScreenUri, ServiceName, ViewKey, COMPONENT_SCHEME};

use crate::parser::xml::XmlExtraction;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// A Java method whose signature looks like a service implementation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceMethodCandidate {
    /// `<qualifiedTypeName>.<methodName>`
    pub qualified_name: String,
    pub file: PathBuf,
    /// 1-based declaration line, when the method model knows it
    pub line: Option<usize>,
}

/// A `<service>` element with both `location` and `invoke`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDefinition {
    pub name: ServiceName,
    /// `location + "." + invoke`
    pub qualified_method: String,
    pub file: PathBuf,
}

/// A controller `view-map`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewDefinition {
    pub key: ViewKey,
    /// The screen the view renders
    pub target: ScreenUri,
    pub file: PathBuf,
}

/// A file in the scanned tree, available to the text search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusFile {
    pub path: PathBuf,
    /// Project-relative path with `/` separators
    pub relative: String,
}

/// Immutable snapshot of everything the scan found
#[derive(Debug, Default)]
pub struct CrossReferenceModel {
    service_candidates: Vec<ServiceMethodCandidate>,
    service_methods: BTreeMap<String, ServiceName>,
    services: BTreeMap<ServiceName, PathBuf>,
    referenced_services: BTreeSet<ServiceName>,

    views: BTreeMap<ViewKey, ViewDefinition>,
    referenced_views: BTreeSet<ViewKey>,
    screens: BTreeMap<ScreenUri, PathBuf>,
    referenced_screens: BTreeSet<ScreenUri>,

    templates: BTreeMap<ComponentPath, PathBuf>,
    referenced_templates: BTreeSet<ComponentPath>,
    scripts: BTreeMap<ComponentPath, PathBuf>,
    referenced_scripts: BTreeSet<ComponentPath>,

    corpus: Vec<CorpusFile>,
}

impl CrossReferenceModel {
    pub fn service_candidates(&self) -> &[ServiceMethodCandidate] {
        &self.service_candidates
    }

    /// Service registered for a `<type>.<method>` key
    pub fn service_for_method(&self, qualified_method: &str) -> Option<&ServiceName> {
        self.service_methods.get(qualified_method)
    }

    /// Defined services and their defining files, sorted by name
    pub fn services(&self) -> impl Iterator<Item = (&ServiceName, &Path)> {
        self.services.iter().map(|(name, file)| (name, file.as_path()))
    }

    pub fn is_service_referenced(&self, name: &ServiceName) -> bool {
        self.referenced_services.contains(name)
    }

    pub fn referenced_services(&self) -> &BTreeSet<ServiceName> {
        &self.referenced_services
    }

    pub fn views(&self) -> impl Iterator<Item = &ViewDefinition> {
        self.views.values()
    }

    pub fn is_view_referenced(&self, key: &ViewKey) -> bool {
        self.referenced_views.contains(key)
    }

    pub fn referenced_views(&self) -> &BTreeSet<ViewKey> {
        &self.referenced_views
    }

    pub fn screens(&self) -> impl Iterator<Item = (&ScreenUri, &Path)> {
        self.screens.iter().map(|(uri, file)| (uri, file.as_path()))
    }

    pub fn has_screen(&self, uri: &ScreenUri) -> bool {
        self.screens.contains_key(uri)
    }

    pub fn is_screen_referenced(&self, uri: &ScreenUri) -> bool {
        self.referenced_screens.contains(uri)
    }

    pub fn referenced_screens(&self) -> &BTreeSet<ScreenUri> {
        &self.referenced_screens
    }

    pub fn templates(&self) -> impl Iterator<Item = (&ComponentPath, &Path)> {
        self.templates.iter().map(|(path, file)| (path, file.as_path()))
    }

    pub fn is_template_referenced(&self, path: &ComponentPath) -> bool {
        self.referenced_templates.contains(path)
    }

    pub fn referenced_templates(&self) -> &BTreeSet<ComponentPath> {
        &self.referenced_templates
    }

    pub fn scripts(&self) -> impl Iterator<Item = (&ComponentPath, &Path)> {
        self.scripts.iter().map(|(path, file)| (path, file.as_path()))
    }

    pub fn is_script_referenced(&self, path: &ComponentPath) -> bool {
        self.referenced_scripts.contains(path)
    }

    pub fn referenced_scripts(&self) -> &BTreeSet<ComponentPath> {
        &self.referenced_scripts
    }

    pub fn corpus(&self) -> &[CorpusFile] {
        &self.corpus
    }

    pub fn stats(&self) -> ModelStats {
        ModelStats {
            service_candidates: self.service_candidates.len(),
            services: self.services.len(),
            referenced_services: self.referenced_services.len(),
            views: self.views.len(),
            referenced_views: self.referenced_views.len(),
            screens: self.screens.len(),
            referenced_screens: self.referenced_screens.len(),
            templates: self.templates.len(),
            scripts: self.scripts.len(),
            files: self.corpus.len(),
        }
    }

    /// Number of definitions the analyzer will visit, used to size progress
    pub fn work_items(&self) -> usize {
        self.service_candidates.len()
            + self.services.len()
            + self.templates.len()
            + self.scripts.len()
            + self.views.len()
            + self.screens.len()
    }
}

/// Counts for logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelStats {
    pub service_candidates: usize,
    pub services: usize,
    pub referenced_services: usize,
    pub views: usize,
    pub referenced_views: usize,
    pub screens: usize,
    pub referenced_screens: usize,
    pub templates: usize,
    pub scripts: usize,
    pub files: usize,
}

impl fmt::Display for ModelStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files, {} services ({} referenced, {} candidate methods), {} views, {} screens, {} templates, {} scripts",
            self.files,
            self.services,
            self.referenced_services,
            self.service_candidates,
            self.views,
            self.screens,
            self.templates,
            self.scripts
        )
    }
}

/// Single writer used during the scan phase
#[derive(Debug, Default)]
pub struct ModelBuilder {
    model: CrossReferenceModel,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_service_candidate(&mut self, candidate: ServiceMethodCandidate) {
        self.model.service_candidates.push(candidate);
    }

    /// Merge everything one XML document contributed
    pub fn merge(&mut self, extraction: XmlExtraction) {
        for definition in extraction.services {
            self.model
                .service_methods
                .insert(definition.qualified_method, definition.name.clone());
            self.model.services.insert(definition.name, definition.file);
        }
        self.model.referenced_services.extend(extraction.referenced_services);

        for view in extraction.views {
            // A view-map uses the screen it points at
            self.model.referenced_screens.insert(view.target.clone());
            self.model.views.insert(view.key.clone(), view);
        }
        self.model.referenced_views.extend(extraction.referenced_views);

        for (uri, file) in extraction.screens {
            self.model.screens.insert(uri, file);
        }
        self.model.referenced_screens.extend(extraction.referenced_screens);
        self.model.referenced_templates.extend(extraction.referenced_templates);
        self.model.referenced_scripts.extend(extraction.referenced_scripts);
    }

    pub fn add_template(&mut self, path: ComponentPath, file: PathBuf) {
        self.model.templates.insert(path, file);
    }

    pub fn add_script(&mut self, path: ComponentPath, file: PathBuf) {
        self.model.scripts.insert(path, file);
    }

    pub fn reference_screen(&mut self, uri: ScreenUri) {
        self.model.referenced_screens.insert(uri);
    }

    pub fn add_corpus_file(&mut self, file: CorpusFile) {
        self.model.corpus.push(file);
    }

    pub fn build(self) -> CrossReferenceModel {
        self.model
    }
}
