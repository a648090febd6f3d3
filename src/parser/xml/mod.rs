//! Declaration extraction from framework XML files
//!
//! Each document is parsed once into an element arena, then a fixed
//! battery of [`ElementQuery`]s (compiled when the extractor is built)
//! pulls typed definitions and references out of it. Service, controller
//! and screen rules run independently; a document that matches none of
//! them simply contributes nothing.

mod controller;
mod document;
mod query;
mod screens;
mod services;

pub use document::{ElementId, XmlDocument, XmlElement};
pub use query::ElementQuery;

use crate::error::{Error, Result, XmlError};
use crate::model::{ComponentPath, ScreenUri, ServiceDefinition, ServiceName, ViewDefinition, ViewKey};
use controller::ControllerRules;
use screens::ScreenRules;
use services::ServiceRules;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

/// Everything one document contributed to the cross-reference model
#[derive(Debug, Default)]
pub struct XmlExtraction {
    pub services: Vec<ServiceDefinition>,
    pub referenced_services: Vec<ServiceName>,
    pub views: Vec<ViewDefinition>,
    pub referenced_views: Vec<ViewKey>,
    pub screens: Vec<(ScreenUri, PathBuf)>,
    pub referenced_screens: Vec<ScreenUri>,
    pub referenced_templates: Vec<ComponentPath>,
    pub referenced_scripts: Vec<ComponentPath>,
}

impl XmlExtraction {
    pub fn len(&self) -> usize {
        self.services.len()
            + self.referenced_services.len()
            + self.views.len()
            + self.referenced_views.len()
            + self.screens.len()
            + self.referenced_screens.len()
            + self.referenced_templates.len()
            + self.referenced_scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Where a document lives, in the three addressing schemes the rules need
#[derive(Debug, Clone)]
pub struct XmlSource<'a> {
    pub path: &'a Path,
    /// Project-relative path, `/`-separated; scopes view names
    pub relative: &'a str,
    /// Component-relative path; prefixes screen names
    pub component_path: ComponentPath,
}

/// Result of extracting one file
#[derive(Debug)]
pub enum ExtractOutcome {
    Extracted(XmlExtraction),
    /// The file was abandoned; the scan goes on without it
    Skipped(XmlError),
}

/// Runs the fixed extraction rules over XML documents
pub struct XmlExtractor {
    services: ServiceRules,
    controller: ControllerRules,
    screens: ScreenRules,
}

impl XmlExtractor {
    /// Compile every query. Fails only if a built-in query is invalid.
    pub fn new() -> Result<Self> {
        Ok(Self {
            services: ServiceRules::compile()?,
            controller: ControllerRules::compile()?,
            screens: ScreenRules::compile()?,
        })
    }

    /// Read and extract one file.
    ///
    /// Missing, undecodable and malformed files are skipped with a warning;
    /// any other I/O failure stops the run.
    pub fn extract_file(&self, source: &XmlSource<'_>) -> Result<ExtractOutcome> {
        let bytes = match std::fs::read(source.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Skipping {}: {}", source.relative, XmlError::NotFound);
                return Ok(ExtractOutcome::Skipped(XmlError::NotFound));
            }
            Err(e) => return Err(Error::io(source.path, e)),
        };

        match self.extract_bytes(&bytes, source) {
            Ok(extraction) => Ok(ExtractOutcome::Extracted(extraction)),
            Err(e) => {
                warn!("Skipping {}: {}", source.relative, e);
                Ok(ExtractOutcome::Skipped(e))
            }
        }
    }

    /// Extract from in-memory contents
    pub fn extract_bytes(&self, contents: &[u8], source: &XmlSource<'_>) -> std::result::Result<XmlExtraction, XmlError> {
        let doc = XmlDocument::parse(contents)?;
        Ok(self.extract_document(&doc, source))
    }

    pub fn extract_document(&self, doc: &XmlDocument, source: &XmlSource<'_>) -> XmlExtraction {
        let mut out = XmlExtraction::default();

        // The root element decides which rule set can match at all
        match doc.element(doc.root()).name() {
            "services" | "service-eca" => self.services.apply(doc, source, &mut out),
            "site-conf" => self.controller.apply(doc, source, &mut out),
            "screens" => self.screens.apply(doc, source, &mut out),
            _ => {}
        }

        trace!("{}: {} declarations", source.relative, out.len());
        out
    }
}
