//! Integration tests for the scan/analyze cycle
//!
//! These tests verify the complete pipeline against the fixture project and
//! small temporary trees.

use ofbizdeadcode::config::DetectionConfig;
use ofbizdeadcode::model::{ModelBuilder, ServiceMethodCandidate};
use ofbizdeadcode::{
    run, Config, Error, Finding, Issue, MatchPolicy, ProgressMonitor, ScanCancellation, Scanner, Severity,
    UsageAnalyzer,
};
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get the path to the test fixtures directory
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn analyze(root: &Path, config: &Config) -> Vec<Finding> {
    let token = ScanCancellation::new();
    run(root, config, &token).unwrap().findings
}

fn codes(findings: &[Finding]) -> Vec<&'static str> {
    findings.iter().map(|f| f.issue.code()).collect()
}

fn find(findings: &[Finding], issue: Issue) -> &Finding {
    findings
        .iter()
        .find(|f| f.issue == issue)
        .unwrap_or_else(|| panic!("no {} finding", issue.code()))
}

/// Trips cancellation on the first analyzer progress message
struct CancelOnSearch {
    cancelled: Cell<bool>,
}

impl ProgressMonitor for CancelOnSearch {
    fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    fn sub_task(&self, message: &str) {
        if message.starts_with("Search") {
            self.cancelled.set(true);
        }
    }
}

/// Trips cancellation after a number of polls
struct CancelAfter {
    remaining: Cell<usize>,
}

impl ProgressMonitor for CancelAfter {
    fn is_cancelled(&self) -> bool {
        let remaining = self.remaining.get();
        if remaining == 0 {
            return true;
        }
        self.remaining.set(remaining - 1);
        false
    }
}

/// Trips cancellation after a number of polls and records what the scan
/// did once it was tripped
struct TrackingCancel {
    remaining: Cell<usize>,
    tripped: Cell<bool>,
    polls_after_trip: Cell<usize>,
    directories_after_trip: Cell<usize>,
}

impl TrackingCancel {
    fn after(polls: usize) -> Self {
        Self {
            remaining: Cell::new(polls),
            tripped: Cell::new(false),
            polls_after_trip: Cell::new(0),
            directories_after_trip: Cell::new(0),
        }
    }
}

impl ProgressMonitor for TrackingCancel {
    fn is_cancelled(&self) -> bool {
        if self.tripped.get() || self.remaining.get() == 0 {
            self.tripped.set(true);
            self.polls_after_trip.set(self.polls_after_trip.get() + 1);
            return true;
        }
        self.remaining.set(self.remaining.get() - 1);
        false
    }

    fn sub_task(&self, message: &str) {
        if self.tripped.get() && message.starts_with("Scanning") {
            self.directories_after_trip.set(self.directories_after_trip.get() + 1);
        }
    }
}

// ============================================================================
// Fixture project
// ============================================================================

#[test]
fn test_fixture_reports_one_finding_per_issue() {
    let findings = analyze(&fixtures_path().join("project"), &Config::default());

    assert_eq!(
        codes(&findings),
        vec!["OFB001", "OFB002", "OFB003", "OFB004", "OFB005", "OFB006", "OFB007"]
    );
}

#[test]
fn test_fixture_service_findings() {
    let findings = analyze(&fixtures_path().join("project"), &Config::default());

    let candidate = find(&findings, Issue::ServiceWithoutDefinition);
    assert_eq!(candidate.name, "org.opentaps.crmsfa.AccountServices.mergeAccounts");
    assert_eq!(
        candidate.message,
        "[Service] Looks like a service but has no service definition!"
    );
    assert!(candidate.file().ends_with("AccountServices.java"));
    assert_eq!(candidate.location.line, 20);

    let uncalled = find(&findings, Issue::UncalledService);
    assert_eq!(uncalled.name, "crmsfa.deleteAccount");
    assert_eq!(
        uncalled.message,
        "[Service] The service \"crmsfa.deleteAccount\" is not called from anywhere!"
    );
    assert!(uncalled.file().ends_with("services.xml"));
    assert_eq!(uncalled.location.line, 11);
    assert_eq!(uncalled.location.length, "\"crmsfa.deleteAccount\"".len());
}

#[test]
fn test_fixture_file_findings() {
    let findings = analyze(&fixtures_path().join("project"), &Config::default());

    let template = find(&findings, Issue::UnreferencedTemplate);
    assert_eq!(template.name, "crmsfa/webapp/crmsfa/unusedWidget.ftl");
    assert_eq!(
        template.message,
        "[Template] This file is not referenced from screen definitions neither included from other files!"
    );
    assert_eq!(template.location.line, 1);

    let script = find(&findings, Issue::UnreferencedScript);
    assert_eq!(script.name, "crmsfa/webapp/crmsfa/WEB-INF/actions/orphan.bsh");
    assert_eq!(script.message, "[Script] This file is not referenced from screen definitions!");
}

#[test]
fn test_fixture_view_and_screen_findings() {
    let findings = analyze(&fixtures_path().join("project"), &Config::default());

    let view = find(&findings, Issue::UnreferencedView);
    assert_eq!(
        view.message,
        "[View] The view \"legacyAccounts\" is not referenced from any request map!"
    );
    assert!(view.file().ends_with("controller.xml"));
    assert_eq!(view.location.line, 16);
    assert_eq!(view.location.column, 5);

    let missing = find(&findings, Issue::MissingViewTarget);
    assert_eq!(
        missing.message,
        "[View] The screen \"crmsfa/widget/CrmsfaScreens.xml#legacyAccounts\" rendered by view \"legacyAccounts\" does not exist!"
    );
    assert_eq!(missing.severity, Severity::Error);
    assert_eq!(missing.location.line, 16);

    let screen = find(&findings, Issue::UnreferencedScreen);
    assert_eq!(screen.name, "crmsfa/widget/CrmsfaScreens.xml#orphanReport");
    assert_eq!(
        screen.message,
        "[Screen] The screen \"crmsfa/widget/CrmsfaScreens.xml#orphanReport\" is not referenced from anywhere!"
    );
    assert_eq!(screen.location.line, 27);
}

#[test]
fn test_retained_names_are_not_reported() {
    let config = Config {
        retain_patterns: vec!["orphan*".to_string(), "*Widget.ftl".to_string()],
        ..Config::default()
    };
    let findings = analyze(&fixtures_path().join("project"), &config);

    assert_eq!(codes(&findings), vec!["OFB001", "OFB002", "OFB005", "OFB006"]);
}

#[test]
fn test_detection_subset() {
    let config = Config {
        detection: DetectionConfig::only("templates,screens").unwrap(),
        ..Config::default()
    };
    let findings = analyze(&fixtures_path().join("project"), &config);

    assert_eq!(codes(&findings), vec!["OFB003", "OFB007"]);
}

#[test]
fn test_latin1_screens_are_defined() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "hot-deploy/crmsfa/webapp/crmsfa/WEB-INF/controller.xml",
        r#"<site-conf>
    <request-map uri="main"><response name="success" type="view" value="main"/></request-map>
    <view-map name="main" type="screen" page="component://crmsfa/widget/Screens.xml#main"/>
</site-conf>"#,
    );
    let screens = dir.path().join("hot-deploy/crmsfa/widget/Screens.xml");
    fs::create_dir_all(screens.parent().unwrap()).unwrap();
    fs::write(
        &screens,
        b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<screens>\n<screen name=\"main\"><section><widgets><label text=\"Soci\xE9t\xE9\"/></widgets></section></screen>\n<screen name=\"unused\"/>\n</screens>",
    )
    .unwrap();

    let config = Config {
        detection: DetectionConfig::only("views,screens").unwrap(),
        ..Config::default()
    };
    let findings = analyze(dir.path(), &config);

    assert_eq!(codes(&findings), vec!["OFB007"]);
    let screen = find(&findings, Issue::UnreferencedScreen);
    assert_eq!(screen.location.line, 4);
    assert_eq!(screen.location.column, 1);
}

#[test]
fn test_runs_are_deterministic() {
    let root = fixtures_path().join("project");
    let first = analyze(&root, &Config::default());
    let second = analyze(&root, &Config::default());
    assert_eq!(first, second);
}

// ============================================================================
// Templates
// ============================================================================

#[test]
fn test_included_template_is_not_reported() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "hot-deploy/crmsfa/widget/Screens.xml",
        r#"<screens>
    <screen name="main">
        <section>
            <widgets><html><html-template location="component://crmsfa/webapp/crmsfa/main.ftl"/></html></widgets>
        </section>
    </screen>
</screens>"#,
    );
    write(
        dir.path(),
        "hot-deploy/crmsfa/webapp/crmsfa/main.ftl",
        "<#import \"component://crmsfa/webapp/crmsfa/lib/macros.ftl\" as m/>\n<#include \"strayXftl\">",
    );
    write(dir.path(), "hot-deploy/crmsfa/webapp/crmsfa/lib/macros.ftl", "<#macro x></#macro>");
    // The dot in the file name matches only a dot
    write(dir.path(), "hot-deploy/crmsfa/webapp/crmsfa/stray.ftl", "<p/>");

    let config = Config {
        detection: DetectionConfig::only("templates").unwrap(),
        ..Config::default()
    };
    let findings = analyze(dir.path(), &config);

    let names: Vec<_> = findings.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["crmsfa/webapp/crmsfa/stray.ftl"]);
}

#[test]
fn test_excluded_directories_are_not_reported() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "hot-deploy/crmsfa/build/generated.ftl", "<p/>");
    write(dir.path(), "hot-deploy/crmsfa/legacy/old.ftl", "<p/>");
    write(dir.path(), "hot-deploy/crmsfa/.hidden/secret.bsh", "x = 1;");
    write(dir.path(), "hot-deploy/crmsfa/webapp/live.bsh", "x = 1;");

    let mut config = Config::default();
    config.exclude.push("**/legacy/**".to_string());
    let findings = analyze(dir.path(), &config);

    let names: Vec<_> = findings.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["crmsfa/webapp/live.bsh"]);
}

// ============================================================================
// Services
// ============================================================================

#[test]
fn test_service_called_from_script_is_not_reported() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "hot-deploy/crmsfa/servicedef/services.xml",
        r#"<services>
    <service name="crmsfa.used" engine="java" location="a.Services" invoke="used"/>
    <service name="crmsfa.unused" engine="java" location="a.Services" invoke="unused"/>
</services>"#,
    );
    write(
        dir.path(),
        "hot-deploy/crmsfa/webapp/crmsfa/actions/run.bsh",
        r#"dispatcher.runSync("crmsfa.used", context);"#,
    );

    for policy in [MatchPolicy::UniqueOrSuppress, MatchPolicy::FirstMatch] {
        let config = Config {
            match_policy: policy,
            detection: DetectionConfig::only("services").unwrap(),
            ..Config::default()
        };
        let findings = analyze(dir.path(), &config);

        let names: Vec<_> = findings.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["crmsfa.unused"], "policy {}", policy);
        assert_eq!(findings[0].location.line, 3);
    }
}

#[test]
fn test_service_referenced_from_eca_is_not_reported() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "hot-deploy/crmsfa/servicedef/services.xml",
        r#"<services><service name="crmsfa.notify" engine="java" location="a.Services" invoke="notify"/></services>"#,
    );
    write(
        dir.path(),
        "hot-deploy/crmsfa/servicedef/secas.xml",
        r#"<service-eca><eca service="createAccount" event="commit"><action service="crmsfa.notify" mode="async"/></eca></service-eca>"#,
    );

    let config = Config {
        detection: DetectionConfig::only("services").unwrap(),
        ..Config::default()
    };
    assert!(analyze(dir.path(), &config).is_empty());
}

#[test]
fn test_candidate_without_line_stops_the_pass() {
    let mut builder = ModelBuilder::new();
    for (name, line) in [("first", Some(3)), ("second", None), ("third", Some(9))] {
        builder.add_service_candidate(ServiceMethodCandidate {
            qualified_name: format!("org.example.Services.{}", name),
            file: PathBuf::from("Services.java"),
            line,
        });
    }
    let model = builder.build();

    let config = Config {
        detection: DetectionConfig::only("service-candidates").unwrap(),
        ..Config::default()
    };
    let token = ScanCancellation::new();
    let mut findings = Vec::new();
    let emitted = UsageAnalyzer::new(&model, &config, &token)
        .analyze(&mut findings)
        .unwrap();

    assert_eq!(emitted, 1);
    assert_eq!(findings[0].name, "org.example.Services.first");
    assert_eq!(findings[0].location.line, 3);
}

// ============================================================================
// Views and screens
// ============================================================================

fn duplicated_view_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "hot-deploy/crmsfa/webapp/crmsfa/WEB-INF/controller.xml",
        r#"<site-conf>
    <view-map name="dup" type="screen" page="component://crmsfa/widget/Screens.xml#dup"/>
    <view-map name="dup" type="screen" page="component://crmsfa/widget/Screens.xml#dup"/>
</site-conf>"#,
    );
    write(
        dir.path(),
        "hot-deploy/crmsfa/widget/Screens.xml",
        r#"<screens><screen name="dup"/></screens>"#,
    );
    dir
}

#[test]
fn test_ambiguous_view_is_suppressed_by_default() {
    let dir = duplicated_view_project();
    let config = Config {
        detection: DetectionConfig::only("views").unwrap(),
        ..Config::default()
    };
    assert!(analyze(dir.path(), &config).is_empty());
}

#[test]
fn test_ambiguous_view_is_placed_at_first_match() {
    let dir = duplicated_view_project();
    let config = Config {
        match_policy: MatchPolicy::FirstMatch,
        detection: DetectionConfig::only("views").unwrap(),
        ..Config::default()
    };
    let findings = analyze(dir.path(), &config);

    assert_eq!(codes(&findings), vec!["OFB005"]);
    assert_eq!(findings[0].location.line, 2);
}

#[test]
fn test_view_located_by_name_fallback() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "hot-deploy/crmsfa/webapp/crmsfa/WEB-INF/controller.xml",
        r#"<site-conf>
    <view-map type="screen" name="reordered" page="component://crmsfa/widget/Screens.xml#reordered"/>
</site-conf>"#,
    );
    write(
        dir.path(),
        "hot-deploy/crmsfa/widget/Screens.xml",
        r#"<screens><screen name="reordered"/></screens>"#,
    );

    let config = Config {
        detection: DetectionConfig::only("views").unwrap(),
        ..Config::default()
    };
    let findings = analyze(dir.path(), &config);

    assert_eq!(codes(&findings), vec!["OFB005"]);
    assert_eq!(findings[0].location.line, 2);
}

#[test]
fn test_view_rendering_a_template_has_no_missing_target() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "hot-deploy/crmsfa/webapp/crmsfa/WEB-INF/controller.xml",
        r#"<site-conf>
    <request-map uri="login"><response name="success" type="view" value="login"/></request-map>
    <view-map name="login" type="ftl" page="/login.ftl"/>
</site-conf>"#,
    );

    let config = Config {
        detection: DetectionConfig::only("views").unwrap(),
        ..Config::default()
    };
    assert!(analyze(dir.path(), &config).is_empty());
}

#[test]
fn test_views_are_scoped_to_their_controller() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "hot-deploy/crmsfa/webapp/crmsfa/WEB-INF/controller.xml",
        r#"<site-conf>
    <request-map uri="main"><response name="success" type="view" value="main"/></request-map>
    <view-map name="main" type="ftl" page="/main.ftl"/>
</site-conf>"#,
    );
    write(
        dir.path(),
        "hot-deploy/sales/webapp/sales/WEB-INF/controller.xml",
        r#"<site-conf>
    <view-map name="main" type="ftl" page="/main.ftl"/>
</site-conf>"#,
    );

    let config = Config {
        detection: DetectionConfig::only("views").unwrap(),
        ..Config::default()
    };
    let findings = analyze(dir.path(), &config);

    assert_eq!(findings.len(), 1);
    assert!(findings[0].file().to_string_lossy().contains("sales"));
}

#[test]
fn test_screen_rendered_from_template_is_not_reported() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "hot-deploy/crmsfa/widget/Screens.xml",
        r#"<screens>
    <screen name="rendered"/>
    <screen name="unused"/>
</screens>"#,
    );
    write(
        dir.path(),
        "hot-deploy/crmsfa/webapp/crmsfa/page.ftl",
        r#"${screens.render("component://crmsfa/widget/Screens.xml#rendered")}"#,
    );

    let config = Config {
        detection: DetectionConfig::only("screens").unwrap(),
        ..Config::default()
    };
    let findings = analyze(dir.path(), &config);

    assert_eq!(codes(&findings), vec!["OFB007"]);
    assert_eq!(findings[0].name, "crmsfa/widget/Screens.xml#unused");
    assert_eq!(findings[0].location.line, 3);
}

// ============================================================================
// Robustness
// ============================================================================

#[test]
fn test_malformed_xml_does_not_hide_other_findings() {
    let dir = TempDir::new().unwrap();
    for i in 0..5 {
        write(
            dir.path(),
            &format!("hot-deploy/crmsfa/widget/Screens{}.xml", i),
            &format!(r#"<screens><screen name="screen{}"/></screens>"#, i),
        );
    }
    write(dir.path(), "hot-deploy/crmsfa/widget/Broken.xml", "<screens><screen name=\"x\">");

    let config = Config {
        detection: DetectionConfig::only("screens").unwrap(),
        ..Config::default()
    };
    let token = ScanCancellation::new();
    let analysis = run(dir.path(), &config, &token).unwrap();

    assert_eq!(analysis.skipped.len(), 1);
    assert_eq!(analysis.findings.len(), 5);
}

#[test]
fn test_cancellation_during_scan_discards_everything() {
    let monitor = CancelAfter {
        remaining: Cell::new(3),
    };
    let result = run(&fixtures_path().join("project"), &Config::default(), &monitor);
    assert!(matches!(result, Err(Error::Cancelled)));
}

#[test]
fn test_scan_stops_walking_once_cancelled() {
    let monitor = TrackingCancel::after(3);
    let result = run(&fixtures_path().join("project"), &Config::default(), &monitor);

    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(monitor.tripped.get());
    // The poll that saw the request is the last one
    assert_eq!(monitor.polls_after_trip.get(), 1);
    assert_eq!(monitor.directories_after_trip.get(), 0);
}

#[test]
fn test_cancellation_during_analysis_discards_everything() {
    let monitor = CancelOnSearch {
        cancelled: Cell::new(false),
    };
    let result = run(&fixtures_path().join("project"), &Config::default(), &monitor);
    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(monitor.is_cancelled());
}

#[test]
fn test_analysis_after_completed_scan_can_be_cancelled() {
    let config = Config::default();
    let token = ScanCancellation::new();
    let model = Scanner::new(&config, &token)
        .unwrap()
        .scan(&fixtures_path().join("project"))
        .unwrap()
        .model;

    token.cancel();
    let mut findings = Vec::new();
    let result = UsageAnalyzer::new(&model, &config, &token).analyze(&mut findings);

    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(findings.is_empty());
}
