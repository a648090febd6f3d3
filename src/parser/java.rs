use super::common::{node_text, MethodSymbol};
use super::signature::encode_type;
use crate::error::{Error, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tree_sitter::{Node, Parser as TsParser};

/// A method declaration read from a Java source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaMethod {
    file: PathBuf,
    declaring_type: String,
    name: String,
    is_static: bool,
    is_public: bool,
    parameters: Vec<String>,
    line: usize,
}

impl MethodSymbol for JavaMethod {
    fn is_static(&self) -> bool {
        self.is_static
    }

    fn is_public(&self) -> bool {
        self.is_public
    }

    fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parameter_signatures(&self) -> &[String] {
        &self.parameters
    }

    fn source_line(&self) -> Option<usize> {
        Some(self.line)
    }

    fn file(&self) -> &Path {
        &self.file
    }
}

/// Kind of type declaration a member lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeKind {
    Class,
    Interface,
}

/// Java source parser using tree-sitter
#[derive(Debug, Default, Clone, Copy)]
pub struct JavaParser;

impl JavaParser {
    pub fn new() -> Self {
        Self
    }

    /// Every method declared in `contents`, nested types included
    pub fn parse(&self, path: &Path, contents: &str) -> Result<Vec<JavaMethod>> {
        let mut parser = TsParser::new();
        parser
            .set_language(&tree_sitter_java::language())
            .map_err(|e| Error::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let tree = parser.parse(contents, None).ok_or_else(|| Error::Parse {
            path: path.to_path_buf(),
            reason: "tree-sitter returned no tree".to_string(),
        })?;

        let root = tree.root_node();
        let package = extract_package(root, contents);
        let mut methods = Vec::new();

        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            self.visit_type(path, child, contents, package.as_deref(), '.', &mut methods);
        }

        debug!("Parsed {}: {} methods", path.display(), methods.len());
        Ok(methods)
    }

    pub fn parse_file(&self, path: &Path) -> Result<Vec<JavaMethod>> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        self.parse(path, &contents)
    }

    /// Parse files in parallel. Files that fail are logged and skipped.
    pub fn parse_files(&self, files: &[PathBuf]) -> Vec<JavaMethod> {
        files
            .par_iter()
            .flat_map_iter(|path| match self.parse_file(path) {
                Ok(methods) => methods,
                Err(e) => {
                    warn!("Skipping {}", e);
                    Vec::new()
                }
            })
            .collect()
    }

    /// Handle a node that may be a type declaration. `outer` is the binary
    /// name of the enclosing type, or the package at top level.
    fn visit_type(
        &self,
        path: &Path,
        node: Node,
        source: &str,
        outer: Option<&str>,
        separator: char,
        methods: &mut Vec<JavaMethod>,
    ) {
        let kind = match node.kind() {
            "class_declaration" | "enum_declaration" | "record_declaration" => TypeKind::Class,
            "interface_declaration" | "annotation_type_declaration" => TypeKind::Interface,
            _ => return,
        };

        let Some(name) = node.child_by_field_name("name").map(|n| node_text(n, source)) else {
            return;
        };
        let binary_name = match outer {
            Some(outer) => format!("{}{}{}", outer, separator, name),
            None => name.to_string(),
        };

        if let Some(body) = node.child_by_field_name("body") {
            self.visit_body(path, body, source, &binary_name, kind, methods);
        }
    }

    fn visit_body(
        &self,
        path: &Path,
        body: Node,
        source: &str,
        type_name: &str,
        kind: TypeKind,
        methods: &mut Vec<JavaMethod>,
    ) {
        let mut cursor = body.walk();
        for member in body.children(&mut cursor) {
            match member.kind() {
                "method_declaration" => {
                    if let Some(method) = self.extract_method(path, member, source, type_name, kind) {
                        methods.push(method);
                    }
                }
                // Enum members after the constants
                "enum_body_declarations" => {
                    self.visit_body(path, member, source, type_name, kind, methods);
                }
                _ => self.visit_type(path, member, source, Some(type_name), '$', methods),
            }
        }
    }

    fn extract_method(
        &self,
        path: &Path,
        node: Node,
        source: &str,
        type_name: &str,
        kind: TypeKind,
    ) -> Option<JavaMethod> {
        let name_node = node.child_by_field_name("name")?;
        let modifiers = modifiers(node, source);

        let parameters = node
            .child_by_field_name("parameters")
            .map(|params| parameter_signatures(params, source))
            .unwrap_or_default();

        Some(JavaMethod {
            file: path.to_path_buf(),
            declaring_type: type_name.to_string(),
            name: node_text(name_node, source).to_string(),
            is_static: modifiers.contains(&"static"),
            is_public: modifiers.contains(&"public") || kind == TypeKind::Interface,
            parameters,
            line: name_node.start_position().row + 1,
        })
    }
}

fn extract_package(root: Node, source: &str) -> Option<String> {
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if child.kind() == "package_declaration" {
            let mut pkg_cursor = child.walk();
            for pkg_child in child.children(&mut pkg_cursor) {
                if pkg_child.kind() == "scoped_identifier" || pkg_child.kind() == "identifier" {
                    return Some(node_text(pkg_child, source).to_string());
                }
            }
        }
    }
    None
}

fn modifiers<'a>(node: Node, source: &'a str) -> Vec<&'a str> {
    let mut found = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "modifiers" {
            let mut mod_cursor = child.walk();
            for modifier in child.children(&mut mod_cursor) {
                found.push(node_text(modifier, source));
            }
        }
    }
    found
}

fn parameter_signatures(params: Node, source: &str) -> Vec<String> {
    let mut signatures = Vec::new();
    let mut cursor = params.walk();

    for param in params.children(&mut cursor) {
        match param.kind() {
            "formal_parameter" => {
                let Some(type_node) = param.child_by_field_name("type") else {
                    continue;
                };
                let mut signature = encode_type(node_text(type_node, source));
                // C-style array declarator: `String args[]`
                if let Some(dims) = param.child_by_field_name("dimensions") {
                    let count = node_text(dims, source).matches('[').count();
                    signature = format!("{}{}", "[".repeat(count), signature);
                }
                signatures.push(signature);
            }
            "spread_parameter" => {
                let mut inner = param.walk();
                let type_node = param
                    .named_children(&mut inner)
                    .find(|n| n.kind() != "modifiers" && n.kind() != "variable_declarator");
                if let Some(type_node) = type_node {
                    signatures.push(format!("[{}", encode_type(node_text(type_node, source))));
                }
            }
            _ => {}
        }
    }

    signatures
}
