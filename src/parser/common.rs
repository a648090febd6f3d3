use std::path::Path;

/// What the service heuristic needs to know about a method.
///
/// Any symbol table can provide this; the crate ships one built from Java
/// sources ([`super::JavaMethod`]).
pub trait MethodSymbol {
    fn is_static(&self) -> bool;

    fn is_public(&self) -> bool;

    /// Fully qualified binary name of the declaring type, e.g.
    /// `org.ofbiz.order.OrderServices` or `com.example.Outer$Inner`
    fn declaring_type(&self) -> &str;

    fn name(&self) -> &str;

    /// Erased, unresolved parameter type signatures in declaration order
    fn parameter_signatures(&self) -> &[String];

    /// 1-based line of the declaration, if known
    fn source_line(&self) -> Option<usize>;

    fn file(&self) -> &Path;

    /// `<declaring type>.<method name>`, the key a service `location` and
    /// `invoke` pair resolves to
    fn qualified_name(&self) -> String {
        format!("{}.{}", self.declaring_type(), self.name())
    }
}

/// Get text content of a tree-sitter node
pub fn node_text<'a>(node: tree_sitter::Node, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}
