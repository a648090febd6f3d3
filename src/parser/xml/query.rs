//! Compiled element path queries
//!
//! A small subset of XPath location paths, enough for the fixed battery of
//! extraction rules: absolute paths made of `/` (child) and `//`
//! (descendant) steps, name tests (or `*`), and an optional attribute
//! predicate `[@attr]` / `[@attr='value']`.

use super::document::{ElementId, XmlDocument};
use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameTest {
    Any,
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Predicate {
    attribute: String,
    value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    axis: Axis,
    name: NameTest,
    predicate: Option<Predicate>,
}

/// A query compiled once and evaluated against many documents
#[derive(Debug, Clone)]
pub struct ElementQuery {
    source: String,
    steps: Vec<Step>,
}

impl ElementQuery {
    pub fn compile(query: &str) -> Result<Self> {
        let fail = |reason: &str| Error::QueryCompile {
            query: query.to_string(),
            reason: reason.to_string(),
        };

        if !query.starts_with('/') {
            return Err(fail("query must be an absolute path"));
        }

        let mut steps = Vec::new();
        let mut rest = query;
        while !rest.is_empty() {
            let axis = if let Some(r) = rest.strip_prefix("//") {
                rest = r;
                Axis::Descendant
            } else if let Some(r) = rest.strip_prefix('/') {
                rest = r;
                Axis::Child
            } else {
                return Err(fail("expected '/' between steps"));
            };

            let end = step_end(rest).ok_or_else(|| fail("unbalanced '[' or quote"))?;
            let (name, predicate) = parse_step(&rest[..end]).map_err(|reason| fail(&reason))?;
            steps.push(Step {
                axis,
                name,
                predicate,
            });
            rest = &rest[end..];
        }

        Ok(Self {
            source: query.to_string(),
            steps,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Matching elements in document order
    pub fn evaluate(&self, doc: &XmlDocument) -> Vec<ElementId> {
        // `None` stands for the document node above the root element
        let mut context: Vec<Option<ElementId>> = vec![None];

        for step in &self.steps {
            let mut matched = BTreeSet::new();
            for node in &context {
                let candidates: Vec<ElementId> = match (node, step.axis) {
                    (None, Axis::Child) => vec![doc.root()],
                    (None, Axis::Descendant) => doc.all().collect(),
                    (Some(id), Axis::Child) => doc.children(*id).to_vec(),
                    (Some(id), Axis::Descendant) => doc.descendants(*id),
                };
                matched.extend(candidates.into_iter().filter(|id| step.matches(doc, *id)));
            }
            if matched.is_empty() {
                return Vec::new();
            }
            context = matched.into_iter().map(Some).collect();
        }

        context.into_iter().flatten().collect()
    }
}

impl fmt::Display for ElementQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Step {
    fn matches(&self, doc: &XmlDocument, id: ElementId) -> bool {
        let element = doc.element(id);
        if let NameTest::Named(name) = &self.name {
            if element.name() != name {
                return false;
            }
        }
        match &self.predicate {
            None => true,
            Some(predicate) => match (element.attribute(&predicate.attribute), &predicate.value) {
                (Some(actual), Some(expected)) => actual == expected,
                (Some(_), None) => true,
                (None, _) => false,
            },
        }
    }
}

/// Byte index where the current step ends: the next `/` outside brackets
fn step_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'') | (None, '"') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.checked_sub(1)?,
            (None, '/') if depth == 0 => return Some(i),
            _ => {}
        }
    }
    if depth == 0 && quote.is_none() {
        Some(text.len())
    } else {
        None
    }
}

fn parse_step(text: &str) -> std::result::Result<(NameTest, Option<Predicate>), String> {
    let (name, predicate) = match text.find('[') {
        Some(open) => {
            let inner = text[open..]
                .strip_prefix('[')
                .and_then(|t| t.strip_suffix(']'))
                .ok_or_else(|| format!("malformed predicate in step `{}`", text))?;
            (&text[..open], Some(parse_predicate(inner)?))
        }
        None => (text, None),
    };

    let name = if name == "*" {
        NameTest::Any
    } else if is_valid_name(name) {
        NameTest::Named(name.to_string())
    } else if name.is_empty() {
        return Err("empty step".to_string());
    } else {
        return Err(format!("invalid element name `{}`", name));
    };

    Ok((name, predicate))
}

fn parse_predicate(text: &str) -> std::result::Result<Predicate, String> {
    let text = text.trim();
    let body = text
        .strip_prefix('@')
        .ok_or_else(|| format!("only attribute predicates are supported, got `{}`", text))?;

    match body.split_once('=') {
        None if is_valid_name(body.trim()) => Ok(Predicate {
            attribute: body.trim().to_string(),
            value: None,
        }),
        None => Err(format!("invalid attribute name `{}`", body)),
        Some((attribute, value)) => {
            let attribute = attribute.trim();
            if !is_valid_name(attribute) {
                return Err(format!("invalid attribute name `{}`", attribute));
            }
            let value = value.trim();
            let unquoted = value
                .strip_prefix('\'')
                .and_then(|v| v.strip_suffix('\''))
                .or_else(|| value.strip_prefix('"').and_then(|v| v.strip_suffix('"')))
                .ok_or_else(|| format!("predicate value must be quoted: `{}`", value))?;
            Ok(Predicate {
                attribute: attribute.to_string(),
                value: Some(unquoted.to_string()),
            })
        }
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}
