use super::document::XmlDocument;
use super::query::ElementQuery;
use super::{XmlExtraction, XmlSource};
use crate::error::Result;
use crate::model::{ScreenUri, ServiceName, ViewDefinition, ViewKey};
use tracing::debug;

/// Request maps and view maps of a `controller.xml`.
///
/// View names are only unique inside one controller, so both definitions
/// and references are keyed by the controller's project-relative path.
pub(super) struct ControllerRules {
    service_call: ElementQuery,
    view_reference: ElementQuery,
    view_definition: ElementQuery,
}

impl ControllerRules {
    pub(super) fn compile() -> Result<Self> {
        Ok(Self {
            service_call: ElementQuery::compile("/site-conf/request-map/event[@type='service']")?,
            view_reference: ElementQuery::compile("/site-conf/request-map/response[@type='view']")?,
            view_definition: ElementQuery::compile("/site-conf/view-map")?,
        })
    }

    pub(super) fn apply(&self, doc: &XmlDocument, source: &XmlSource<'_>, out: &mut XmlExtraction) {
        self.service_calls(doc, out);
        self.view_references(doc, source, out);
        self.view_definitions(doc, source, out);
    }

    // <event type="service" invoke="createAccount"/>
    fn service_calls(&self, doc: &XmlDocument, out: &mut XmlExtraction) {
        for id in self.service_call.evaluate(doc) {
            if let Some(invoke) = doc.element(id).attribute("invoke") {
                out.referenced_services.push(ServiceName::new(invoke));
            }
        }
    }

    // <response name="error" type="view" value="accountingViewDetails"/>
    fn view_references(&self, doc: &XmlDocument, source: &XmlSource<'_>, out: &mut XmlExtraction) {
        for id in self.view_reference.evaluate(doc) {
            if let Some(value) = doc.element(id).attribute("value") {
                out.referenced_views.push(ViewKey::new(source.relative, value));
            }
        }
    }

    // <view-map name="vatReportOverview" type="screen"
    //           page="component://accounting/widget/accounting/screens/accounting.xml#vatReportOverview"/>
    fn view_definitions(&self, doc: &XmlDocument, source: &XmlSource<'_>, out: &mut XmlExtraction) {
        for id in self.view_definition.evaluate(doc) {
            let element = doc.element(id);
            let Some(page) = element.attribute("page") else {
                continue;
            };
            let Some(name) = element.attribute("name") else {
                debug!("{}: <view-map page=\"{}\"> without name", source.relative, page);
                continue;
            };

            out.views.push(ViewDefinition {
                key: ViewKey::new(source.relative, name),
                target: ScreenUri::parse(page),
                file: source.path.to_path_buf(),
            });
        }
    }
}
