//! Scanner integration tests
//!
//! These tests walk real directory trees and check what ends up in the
//! cross-reference model.

use ofbizdeadcode::model::{ComponentPath, ScreenUri, ServiceName, ViewKey};
use ofbizdeadcode::{Config, Error, ScanCancellation, Scanner};
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

#[test]
fn test_fixture_definitions_and_references() {
    let config = Config::default();
    let token = ScanCancellation::new();
    let result = Scanner::new(&config, &token)
        .unwrap()
        .scan(&fixtures_path().join("project"))
        .unwrap();
    let model = result.model;

    let services: Vec<_> = model.services().map(|(name, _)| name.to_string()).collect();
    assert_eq!(services, vec!["crmsfa.createAccount", "crmsfa.deleteAccount"]);
    assert!(model.is_service_referenced(&ServiceName::new("crmsfa.createAccount")));
    assert!(!model.is_service_referenced(&ServiceName::new("crmsfa.deleteAccount")));
    assert_eq!(
        model.service_for_method("org.opentaps.crmsfa.AccountServices.deleteAccount"),
        Some(&ServiceName::new("crmsfa.deleteAccount"))
    );

    let controller = "hot-deploy/crmsfa/webapp/crmsfa/WEB-INF/controller.xml";
    assert!(model.is_view_referenced(&ViewKey::new(controller, "main")));
    assert!(!model.is_view_referenced(&ViewKey::new(controller, "legacyAccounts")));

    let screens = ComponentPath::from_uri("component://crmsfa/widget/CrmsfaScreens.xml");
    assert!(model.has_screen(&ScreenUri::new(screens.clone(), "main")));
    assert!(model.is_screen_referenced(&ScreenUri::new(screens.clone(), "main-decorator")));
    assert!(!model.is_screen_referenced(&ScreenUri::new(screens, "orphanReport")));

    assert!(model.is_template_referenced(&ComponentPath::from_uri("crmsfa/webapp/crmsfa/main.ftl")));
    assert!(model.is_script_referenced(&ComponentPath::from_uri(
        "crmsfa/webapp/crmsfa/WEB-INF/actions/main.bsh"
    )));

    assert!(result.skipped.is_empty());
}

#[test]
fn test_fixture_service_candidates() {
    let config = Config::default();
    let token = ScanCancellation::new();
    let model = Scanner::new(&config, &token)
        .unwrap()
        .scan(&fixtures_path().join("project"))
        .unwrap()
        .model;

    let names: Vec<_> = model
        .service_candidates()
        .iter()
        .map(|c| c.qualified_name.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "org.opentaps.crmsfa.AccountServices.createAccount",
            "org.opentaps.crmsfa.AccountServices.deleteAccount",
            "org.opentaps.crmsfa.AccountServices.mergeAccounts",
        ]
    );
    assert!(model.service_candidates().iter().all(|c| c.line.is_some()));
}

#[test]
fn test_derived_directories_are_not_scanned() {
    let config = Config::default();
    let token = ScanCancellation::new();
    let model = Scanner::new(&config, &token)
        .unwrap()
        .scan(&fixtures_path().join("project"))
        .unwrap()
        .model;

    assert!(model.screens().all(|(uri, _)| uri.name != "generated"));
    assert!(model
        .corpus()
        .iter()
        .all(|file| !file.relative.contains("/build/")));
}

#[test]
fn test_malformed_xml_is_skipped() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "hot-deploy/crmsfa/servicedef/services.xml",
        r#"<services><service name="crmsfa.ok" engine="java" location="a.B" invoke="ok"/></services>"#,
    );
    write(dir.path(), "hot-deploy/crmsfa/servicedef/broken.xml", r#"<services><service name="crmsfa.bad"></services>"#);
    write(
        dir.path(),
        "hot-deploy/crmsfa/widget/Screens.xml",
        r#"<screens><screen name="main"/></screens>"#,
    );

    let config = Config::default();
    let token = ScanCancellation::new();
    let result = Scanner::new(&config, &token).unwrap().scan(dir.path()).unwrap();

    assert_eq!(result.skipped.len(), 1);
    assert!(result.skipped[0].ends_with("broken.xml"));
    assert_eq!(result.model.services().count(), 1);
    assert_eq!(result.model.screens().count(), 1);
}

#[test]
fn test_declared_encoding_is_honoured() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hot-deploy/crmsfa/widget/Screens.xml");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<screens><screen name=\"main\"><section><widgets><label text=\"Soci\xE9t\xE9\"/></widgets></section></screen></screens>",
    )
    .unwrap();

    let config = Config::default();
    let token = ScanCancellation::new();
    let result = Scanner::new(&config, &token).unwrap().scan(dir.path()).unwrap();

    assert!(result.skipped.is_empty());
    assert_eq!(result.model.screens().count(), 1);
    assert!(result
        .model
        .has_screen(&ScreenUri::parse("component://crmsfa/widget/Screens.xml#main")));
}

#[test]
fn test_screen_references_from_scripts() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "hot-deploy/crmsfa/widget/Screens.xml",
        r#"<screens><screen name="accountPdf"/></screens>"#,
    );
    write(
        dir.path(),
        "hot-deploy/crmsfa/webapp/crmsfa/WEB-INF/actions/print.bsh",
        r#"screens.render("component://crmsfa/widget/Screens.xml#accountPdf");"#,
    );

    let config = Config::default();
    let token = ScanCancellation::new();
    let model = Scanner::new(&config, &token).unwrap().scan(dir.path()).unwrap().model;

    let uri = ScreenUri::parse("component://crmsfa/widget/Screens.xml#accountPdf");
    assert!(model.has_screen(&uri));
    assert!(model.is_screen_referenced(&uri));
}

#[test]
fn test_component_roots_are_configurable() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "applications/party/widget/PartyScreens.xml",
        r#"<screens><screen name="viewprofile"/></screens>"#,
    );

    let config = Config {
        component_roots: vec!["applications".to_string()],
        ..Config::default()
    };
    let token = ScanCancellation::new();
    let model = Scanner::new(&config, &token).unwrap().scan(dir.path()).unwrap().model;

    let (uri, _) = model.screens().next().unwrap();
    assert_eq!(uri.to_string(), "party/widget/PartyScreens.xml#viewprofile");
}

#[test]
fn test_scan_without_service_candidates() {
    let config = Config {
        detection: ofbizdeadcode::config::DetectionConfig::only("views").unwrap(),
        ..Config::default()
    };
    let token = ScanCancellation::new();
    let model = Scanner::new(&config, &token)
        .unwrap()
        .scan(&fixtures_path().join("project"))
        .unwrap()
        .model;

    assert!(model.service_candidates().is_empty());
}

#[test]
fn test_cancelled_before_scan() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "hot-deploy/crmsfa/widget/Screens.xml", "<screens/>");

    let config = Config::default();
    let token = ScanCancellation::new();
    token.cancel();

    let result = Scanner::new(&config, &token).unwrap().scan(dir.path());
    assert!(matches!(result, Err(Error::Cancelled)));
}
