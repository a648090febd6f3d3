use crate::error::XmlError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Index of an element inside an [`XmlDocument`]. Ids follow document order.
pub type ElementId = usize;

/// One element with its decoded attributes
#[derive(Debug, Clone)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl XmlElement {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }
}

/// Element tree of a well-formed XML document.
///
/// Only elements and attributes are kept; text, comments and processing
/// instructions are dropped since no extraction rule looks at them.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    elements: Vec<XmlElement>,
}

impl XmlDocument {
    /// Parse a document, rejecting anything that is not well-formed.
    ///
    /// Names and attribute values are decoded with the encoding the XML
    /// declaration names, UTF-8 when there is none.
    pub fn parse(contents: impl AsRef<[u8]>) -> Result<Self, XmlError> {
        let contents = contents.as_ref();
        let contents = contents.strip_prefix(UTF8_BOM).unwrap_or(contents);
        let mut reader = Reader::from_reader(contents);
        reader.trim_text(true);
        reader.check_end_names(true);

        let mut elements: Vec<XmlElement> = Vec::new();
        let mut stack: Vec<ElementId> = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    let id = push_element(&reader, &mut elements, &stack, e)?;
                    stack.push(id);
                }
                Ok(Event::Empty(ref e)) => {
                    push_element(&reader, &mut elements, &stack, e)?;
                }
                Ok(Event::End(ref e)) => {
                    if stack.pop().is_none() {
                        return Err(XmlError::Malformed(format!(
                            "unexpected closing tag </{}>",
                            String::from_utf8_lossy(e.name().as_ref())
                        )));
                    }
                }
                Ok(Event::Text(_)) | Ok(Event::CData(_)) if stack.is_empty() => {
                    return Err(XmlError::Malformed(
                        "content is not allowed outside the root element".to_string(),
                    ));
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(quick_xml::Error::NonDecodable(_)) => return Err(XmlError::Encoding),
                Err(e) => {
                    return Err(XmlError::Malformed(format!(
                        "at byte {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
            }
        }

        if let Some(open) = stack.last() {
            return Err(XmlError::Malformed(format!(
                "premature end of document, <{}> is not closed",
                elements[*open].name
            )));
        }
        if elements.is_empty() {
            return Err(XmlError::Malformed("document has no root element".to_string()));
        }

        Ok(Self { elements })
    }

    pub fn root(&self) -> ElementId {
        0
    }

    pub fn element(&self, id: ElementId) -> &XmlElement {
        &self.elements[id]
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        &self.elements[id].children
    }

    /// All strict descendants of `id`, in document order
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut pending: Vec<ElementId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = pending.pop() {
            out.push(next);
            pending.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Every element id, in document order
    pub fn all(&self) -> impl Iterator<Item = ElementId> {
        0..self.elements.len()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

fn push_element(
    reader: &Reader<&[u8]>,
    elements: &mut Vec<XmlElement>,
    stack: &[ElementId],
    start: &BytesStart<'_>,
) -> Result<ElementId, XmlError> {
    let parent = stack.last().copied();
    if parent.is_none() && !elements.is_empty() {
        return Err(XmlError::Malformed(
            "document has more than one root element".to_string(),
        ));
    }

    let decoder = reader.decoder();
    let name = decoder.decode(start.name().as_ref()).map_err(decode_error)?.into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::Malformed(format!("in <{}>: {}", name, e)))?;
        let key = decoder.decode(attr.key.as_ref()).map_err(decode_error)?.into_owned();
        let value = attr
            .decode_and_unescape_value(reader)
            .map_err(|e| match e {
                quick_xml::Error::NonDecodable(_) => XmlError::Encoding,
                e => XmlError::Malformed(format!("in <{}> attribute {}: {}", name, key, e)),
            })?
            .into_owned();
        attributes.push((key, value));
    }

    let id = elements.len();
    elements.push(XmlElement {
        name,
        attributes,
        parent,
        children: Vec::new(),
    });
    if let Some(parent) = parent {
        elements[parent].children.push(id);
    }
    Ok(id)
}

fn decode_error(e: quick_xml::Error) -> XmlError {
    match e {
        quick_xml::Error::NonDecodable(_) => XmlError::Encoding,
        e => XmlError::Malformed(e.to_string()),
    }
}
