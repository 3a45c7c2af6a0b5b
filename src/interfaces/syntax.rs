//! TypeScript syntax trees
//!
//! Thin helpers over tree-sitter shared by definition extraction, the
//! structural converter, usage analysis and import lifting.

use tree_sitter::{Node, Parser, Tree};

use crate::error::{GenError, Result};

/// Parse TypeScript source. Syntax errors are kept in the tree as `ERROR`
/// nodes; only a parser that cannot be set up fails.
pub(crate) fn parse_typescript(source: &str) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&arborium_typescript::language().into())
        .map_err(|e| GenError::Parser(format!("tree-sitter init: {}", e)))?;

    parser
        .parse(source, None)
        .ok_or_else(|| GenError::Parser("failed to parse TypeScript".into()))
}

pub(crate) fn node_text<'s>(node: Node, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Named children without comments
pub(crate) fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// First child of `node` of the given kind, anonymous tokens included
pub(crate) fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

/// Whether `node` has an anonymous `token` child, such as `?` or `type`
pub(crate) fn has_token(node: Node, token: &str, source: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| !child.is_named() && node_text(child, source) == token);
    found
}

/// Contents of a string literal node, quotes removed
pub(crate) fn string_value(node: Node, source: &str) -> String {
    let text = node_text(node, source);
    let inner = text.get(1..text.len().saturating_sub(1)).unwrap_or("");

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(escaped) => out.push(escaped),
            None => {}
        }
    }
    out
}

/// Identifiers in value position, in source order.
///
/// Comments, string contents and property names never count.
pub(crate) fn value_identifiers(source: &str) -> Result<Vec<String>> {
    let tree = parse_typescript(source)?;
    let mut identifiers = Vec::new();
    let mut stack = vec![tree.root_node()];

    while let Some(node) = stack.pop() {
        if matches!(node.kind(), "identifier" | "shorthand_property_identifier") {
            identifiers.push(node_text(node, source).to_string());
        }
        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    Ok(identifiers)
}
