use super::{Finding, FindingLocation, FindingSink, Issue};
use crate::config::Config;
use crate::error::Result;
use crate::model::{CrossReferenceModel, ViewDefinition};
use crate::progress::{PassProgress, ProgressMonitor};
use crate::search::{SearchMatch, TextSearch};
use std::path::Path;
use tracing::{debug, info};

/// Work units shared by all passes; the scan uses the rest
pub const SEARCH_WORK: usize = 80;

/// Resolves, per artifact kind, whether each definition is used.
///
/// Passes run in a fixed order: service candidates, service definitions,
/// templates, scripts, views, screens. Each one polls the monitor before
/// every definition it looks at.
pub struct UsageAnalyzer<'a> {
    model: &'a CrossReferenceModel,
    config: &'a Config,
    monitor: &'a dyn ProgressMonitor,
    search: TextSearch<'a>,
}

impl<'a> UsageAnalyzer<'a> {
    pub fn new(model: &'a CrossReferenceModel, config: &'a Config, monitor: &'a dyn ProgressMonitor) -> Self {
        Self {
            model,
            config,
            monitor,
            search: TextSearch::new(model.corpus(), config.search.max_file_size),
        }
    }

    /// Run every enabled pass, returning the number of findings recorded
    pub fn analyze(&self, sink: &mut dyn FindingSink) -> Result<usize> {
        let detection = &self.config.detection;
        let mut emitted = 0;

        if detection.service_candidates {
            emitted += self.service_candidates(sink)?;
        }
        if detection.service_definitions {
            emitted += self.service_definitions(sink)?;
        }
        if detection.templates {
            emitted += self.templates(sink)?;
        }
        if detection.scripts {
            emitted += self.scripts(sink)?;
        }
        if detection.views {
            emitted += self.views(sink)?;
        }
        if detection.screens {
            emitted += self.screens(sink)?;
        }

        Ok(emitted)
    }

    /// Methods shaped like services that no `<service>` points at
    fn service_candidates(&self, sink: &mut dyn FindingSink) -> Result<usize> {
        let candidates = self.model.service_candidates();
        let mut progress = self.progress("Service methods", candidates.len());
        let mut emitted = 0;

        for candidate in candidates {
            progress.step()?;

            // Without a line the method cannot be marked, and neither are
            // the candidates after it
            let Some(line) = candidate.line else {
                debug!("Ignore method {} without source line", candidate.qualified_name);
                break;
            };

            if self.model.service_for_method(&candidate.qualified_name).is_some()
                || self.is_retained(&[candidate.qualified_name.as_str()])
            {
                continue;
            }

            self.emit(
                sink,
                Finding::new(
                    Issue::ServiceWithoutDefinition,
                    candidate.qualified_name.clone(),
                    FindingLocation::at_line(&candidate.file, line),
                    "Looks like a service but has no service definition!",
                ),
            );
            emitted += 1;
        }

        Ok(emitted)
    }

    /// Defined services nothing calls
    fn service_definitions(&self, sink: &mut dyn FindingSink) -> Result<usize> {
        let total = self.model.services().count();
        let mut progress = self.progress("Service Definitions", total);
        let mut emitted = 0;

        for (name, file) in self.model.services() {
            progress.step()?;

            if self.model.is_service_referenced(name) || self.is_retained(&[name.as_str()]) {
                continue;
            }

            // Any quoted occurrence besides the definition itself is treated
            // as a call, whatever the match policy
            let matches = self
                .search
                .search_literal(&format!("\"{}\"", name), &self.config.search.service_reference_globs);
            if matches.len() > 1 {
                debug!("Service {} occurs {} times, assuming it is called", name, matches.len());
                continue;
            }
            let Some(found) = self.place(matches, "service", name.as_str(), file) else {
                continue;
            };

            self.emit(
                sink,
                Finding::new(
                    Issue::UncalledService,
                    name.as_str(),
                    FindingLocation::from_match(&found),
                    &format!("The service \"{}\" is not called from anywhere!", name),
                ),
            );
            emitted += 1;
        }

        Ok(emitted)
    }

    /// Templates no screen uses and no other template includes
    fn templates(&self, sink: &mut dyn FindingSink) -> Result<usize> {
        let total = self.model.templates().count();
        let mut progress = self.progress("ftls", total);
        let mut emitted = 0;

        for (path, file) in self.model.templates() {
            progress.step()?;

            if self.model.is_template_referenced(path)
                || self.is_retained(&[path.file_name(), format!("/{}", path).as_str()])
            {
                continue;
            }

            let include = format!(
                r#"<#(include|import) ".*{}""#,
                regex::escape(path.file_name())
            );
            if !self
                .search
                .search_regex(&include, &self.config.search.include_globs)?
                .is_empty()
            {
                continue;
            }

            self.emit(
                sink,
                Finding::new(
                    Issue::UnreferencedTemplate,
                    path.as_str(),
                    FindingLocation::at_line(file, 1),
                    "This file is not referenced from screen definitions neither included from other files!",
                ),
            );
            emitted += 1;
        }

        Ok(emitted)
    }

    /// Scripts no screen runs
    fn scripts(&self, sink: &mut dyn FindingSink) -> Result<usize> {
        let total = self.model.scripts().count();
        let mut progress = self.progress("bsh/groovy", total);
        let mut emitted = 0;

        for (path, file) in self.model.scripts() {
            progress.step()?;

            if self.model.is_script_referenced(path)
                || self.is_retained(&[path.file_name(), format!("/{}", path).as_str()])
            {
                continue;
            }

            self.emit(
                sink,
                Finding::new(
                    Issue::UnreferencedScript,
                    path.as_str(),
                    FindingLocation::at_line(file, 1),
                    "This file is not referenced from screen definitions!",
                ),
            );
            emitted += 1;
        }

        Ok(emitted)
    }

    /// Views no request map responds with, and views whose screen is missing
    fn views(&self, sink: &mut dyn FindingSink) -> Result<usize> {
        let total = self.model.views().count();
        let mut progress = self.progress("views", total);
        let mut emitted = 0;

        for view in self.model.views() {
            progress.step()?;

            if self.is_retained(&[view.key.name.as_str()]) {
                continue;
            }

            let unreferenced = !self.model.is_view_referenced(&view.key);
            // Pages without `#name` are not screens (ftl, jsp views)
            let missing_target = !view.target.name.is_empty() && !self.model.has_screen(&view.target);
            if !unreferenced && !missing_target {
                continue;
            }

            let Some(found) = self.locate_view(view)? else {
                continue;
            };
            let location = FindingLocation::from_match(&found);

            if unreferenced {
                self.emit(
                    sink,
                    Finding::new(
                        Issue::UnreferencedView,
                        view.key.to_string(),
                        location.clone(),
                        &format!("The view \"{}\" is not referenced from any request map!", view.key.name),
                    ),
                );
                emitted += 1;
            }
            if missing_target {
                self.emit(
                    sink,
                    Finding::new(
                        Issue::MissingViewTarget,
                        view.key.to_string(),
                        location,
                        &format!(
                            "The screen \"{}\" rendered by view \"{}\" does not exist!",
                            view.target, view.key.name
                        ),
                    ),
                );
                emitted += 1;
            }
        }

        Ok(emitted)
    }

    /// Screens nothing renders, decorates with or points a view at
    fn screens(&self, sink: &mut dyn FindingSink) -> Result<usize> {
        let total = self.model.screens().count();
        let mut progress = self.progress("screens", total);
        let mut emitted = 0;

        for (uri, file) in self.model.screens() {
            progress.step()?;

            if self.model.is_screen_referenced(uri) || self.is_retained(&[uri.name.as_str(), uri.to_string().as_str()]) {
                continue;
            }

            let pattern = format!(r#"<screen\s+name="{}""#, regex::escape(&uri.name));
            let matches = self.search.search_regex_in_file(&pattern, file)?;
            let Some(found) = self.place(matches, "screen", &uri.to_string(), file) else {
                continue;
            };

            self.emit(
                sink,
                Finding::new(
                    Issue::UnreferencedScreen,
                    uri.to_string(),
                    FindingLocation::from_match(&found),
                    &format!("The screen \"{}\" is not referenced from anywhere!", uri),
                ),
            );
            emitted += 1;
        }

        Ok(emitted)
    }

    /// `view-map name="X"` in the controller, else any `name="X"`
    fn locate_view(&self, view: &ViewDefinition) -> Result<Option<SearchMatch>> {
        let name = &view.key.name;
        let pattern = format!(r#"view-map\s+name="{}""#, regex::escape(name));
        let mut matches = self.search.search_regex_in_file(&pattern, &view.file)?;
        if matches.is_empty() {
            matches = self
                .search
                .search_literal_in_file(&format!("name=\"{}\"", name), &view.file);
        }
        Ok(self.place(matches, "view", &view.key.to_string(), &view.file))
    }

    /// Apply the match policy; a definition that cannot be placed is only logged
    fn place(&self, matches: Vec<SearchMatch>, kind: &str, name: &str, file: &Path) -> Option<SearchMatch> {
        let count = matches.len();
        let picked = self.config.match_policy.pick(matches);
        if picked.is_none() {
            debug!(
                "Unused {} {} in {} not marked: {} matches (policy: {})",
                kind,
                name,
                file.display(),
                count,
                self.config.match_policy
            );
        }
        picked
    }

    fn is_retained(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.config.should_retain(name))
    }

    fn progress(&self, label: &'static str, total: usize) -> PassProgress<'a> {
        let work = self.model.work_items().max(1);
        PassProgress::new(self.monitor, label, total, SEARCH_WORK * total / work)
    }

    fn emit(&self, sink: &mut dyn FindingSink, finding: Finding) {
        info!(
            "{}:{}: {} [{}]",
            finding.location.file.display(),
            finding.location.line,
            finding.message,
            finding.issue.code()
        );
        sink.record(finding);
    }
}
