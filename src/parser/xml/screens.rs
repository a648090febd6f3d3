use super::document::XmlDocument;
use super::query::ElementQuery;
use super::{XmlExtraction, XmlSource};
use crate::error::Result;
use crate::model::{ComponentPath, ScreenUri};

/// Screen definitions and what they pull in: templates, scripts and
/// decorator screens
pub(super) struct ScreenRules {
    template: ElementQuery,
    script: ElementQuery,
    definition: ElementQuery,
    decorator: ElementQuery,
}

impl ScreenRules {
    pub(super) fn compile() -> Result<Self> {
        Ok(Self {
            template: ElementQuery::compile("/screens/screen/section//html-template")?,
            script: ElementQuery::compile("/screens/screen/section/actions/script")?,
            definition: ElementQuery::compile("/screens/screen")?,
            decorator: ElementQuery::compile("/screens/screen/widgets/decorator-screen")?,
        })
    }

    pub(super) fn apply(&self, doc: &XmlDocument, source: &XmlSource<'_>, out: &mut XmlExtraction) {
        // <html-template location="component://crmsfa/webapp/crmsfa/includes/test.ftl"/>
        for id in self.template.evaluate(doc) {
            if let Some(location) = doc.element(id).attribute("location") {
                out.referenced_templates.push(ComponentPath::from_uri(location));
            }
        }

        // <script location="component://crmsfa/webapp/crmsfa/WEB-INF/actions/includes/main-decorator.bsh"/>
        for id in self.script.evaluate(doc) {
            if let Some(location) = doc.element(id).attribute("location") {
                out.referenced_scripts.push(ComponentPath::from_uri(location));
            }
        }

        // <screen name="main-application-decorator">
        for id in self.definition.evaluate(doc) {
            if let Some(name) = doc.element(id).attribute("name") {
                out.screens
                    .push((ScreenUri::new(source.component_path.clone(), name), source.path.to_path_buf()));
            }
        }

        // <decorator-screen name="main-decorator" location="component://accounting/widget/screens/common/CommonScreens.xml">
        for id in self.decorator.evaluate(doc) {
            let element = doc.element(id);
            if let (Some(name), Some(location)) = (element.attribute("name"), element.attribute("location")) {
                out.referenced_screens
                    .push(ScreenUri::new(ComponentPath::from_uri(location), name));
            }
        }
    }
}
