use super::document::XmlDocument;
use super::query::ElementQuery;
use super::{XmlExtraction, XmlSource};
use crate::error::Result;
use crate::model::{ServiceDefinition, ServiceName};
use tracing::debug;

/// Service definitions (`services.xml`) and service calls from ECA rules
pub(super) struct ServiceRules {
    definition: ElementQuery,
    eca_call: ElementQuery,
}

impl ServiceRules {
    pub(super) fn compile() -> Result<Self> {
        Ok(Self {
            // Every engine counts, not only engine="java": whether the
            // implementation exists is not checked
            definition: ElementQuery::compile("/services/service")?,
            eca_call: ElementQuery::compile("/service-eca/eca/action")?,
        })
    }

    pub(super) fn apply(&self, doc: &XmlDocument, source: &XmlSource<'_>, out: &mut XmlExtraction) {
        self.definitions(doc, source, out);
        self.eca_calls(doc, out);
    }

    // <service name="crmsfa.createAccount" engine="java"
    //          location="com.opensourcestrategies.crmsfa.accounts.AccountsServices" invoke="createAccount">
    fn definitions(&self, doc: &XmlDocument, source: &XmlSource<'_>, out: &mut XmlExtraction) {
        for id in self.definition.evaluate(doc) {
            let element = doc.element(id);
            let Some(name) = element.attribute("name") else {
                debug!("{}: <service> without name", source.relative);
                continue;
            };

            if let (Some(location), Some(invoke)) = (element.attribute("location"), element.attribute("invoke")) {
                out.services.push(ServiceDefinition {
                    name: ServiceName::new(name),
                    qualified_method: format!("{}.{}", location, invoke),
                    file: source.path.to_path_buf(),
                });
            }
        }
    }

    // <action service="company.webservice.esb.outgoing.updateOrderPaymentStatus" mode="sync"/>
    fn eca_calls(&self, doc: &XmlDocument, out: &mut XmlExtraction) {
        for id in self.eca_call.evaluate(doc) {
            if let Some(service) = doc.element(id).attribute("service") {
                out.referenced_services.push(ServiceName::new(service));
            }
        }
    }
}
