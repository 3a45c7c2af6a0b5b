//! Interface Definitions
//!
//! Locates `interface` and `type` declarations in a TypeScript definitions
//! file. Extraction records names, type parameters and parents; turning a
//! declaration into a schema is the job of an [`InterfaceConverter`].

pub mod converter;
pub(crate) mod syntax;

pub use converter::{InterfaceConverter, StructuralConverter};

use tree_sitter::Node;

use crate::error::Result;
use syntax::{child_of_kind, named_children, node_text, parse_typescript};

/// Declaration form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    Interface,
    TypeAlias,
}

/// One named declaration from the definitions file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDef {
    pub name: String,
    pub kind: DefinitionKind,
    /// Names of the generic parameters, defaults and constraints dropped
    pub type_params: Vec<String>,
    /// Parent types of an interface, as written
    pub extends: Vec<String>,
    /// Whether an interface body declares any member
    pub own_members: bool,
    /// Declaration text without `export` or `declare`
    pub source: String,
    /// 1-based line of the declaration in the definitions file
    pub line: usize,
    array_element: Option<String>,
}

impl InterfaceDef {
    /// Element type of an empty interface that only extends `Array<T>` or
    /// `ReadonlyArray<T>`, when that element is a plain type name
    pub fn array_extension(&self) -> Option<&str> {
        self.array_element.as_deref()
    }
}

/// Extract every interface and type alias declaration, in source order.
///
/// Declarations inside `declare module` and `namespace` blocks are included.
/// Text the parser cannot make sense of is logged and skipped.
pub fn extract_interfaces(source: &str) -> Result<Vec<InterfaceDef>> {
    let tree = parse_typescript(source)?;
    let extractor = Extractor { source };
    let mut defs = Vec::new();
    extractor.visit(tree.root_node(), &mut defs);
    Ok(defs)
}

struct Extractor<'a> {
    source: &'a str,
}

impl Extractor<'_> {
    fn text(&self, node: Node) -> &str {
        node_text(node, self.source)
    }

    fn visit(&self, node: Node, defs: &mut Vec<InterfaceDef>) {
        for child in named_children(node) {
            match child.kind() {
                "interface_declaration" | "type_alias_declaration" => {
                    if let Some(def) = self.definition(child) {
                        tracing::debug!(name = %def.name, kind = ?def.kind, line = def.line, "found definition");
                        defs.push(def);
                    }
                }
                "export_statement" | "ambient_declaration" | "module" | "internal_module" | "statement_block" => {
                    self.visit(child, defs)
                }
                "ERROR" => {
                    tracing::warn!(
                        line = child.start_position().row + 1,
                        "unparseable text in definitions file: {}",
                        self.text(child).lines().next().unwrap_or_default()
                    );
                    self.visit(child, defs);
                }
                _ => {}
            }
        }
    }

    fn definition(&self, node: Node) -> Option<InterfaceDef> {
        let Some(name) = node.child_by_field_name("name") else {
            tracing::warn!(line = node.start_position().row + 1, "declaration without a name skipped");
            return None;
        };
        let type_params = node
            .child_by_field_name("type_parameters")
            .map(|params| self.type_params(params))
            .unwrap_or_default();

        let mut def = InterfaceDef {
            name: self.text(name).to_string(),
            kind: DefinitionKind::TypeAlias,
            type_params,
            extends: Vec::new(),
            own_members: false,
            source: self.text(node).to_string(),
            line: node.start_position().row + 1,
            array_element: None,
        };

        if node.kind() == "interface_declaration" {
            let parents = parent_types(node);
            def.kind = DefinitionKind::Interface;
            def.extends = parents.iter().map(|p| self.text(*p).to_string()).collect();
            def.own_members = node
                .child_by_field_name("body")
                .is_some_and(|body| !named_children(body).is_empty());
            if !def.own_members {
                if let [parent] = parents.as_slice() {
                    def.array_element = self.array_element(*parent);
                }
            }
        }
        Some(def)
    }

    fn type_params(&self, params: Node) -> Vec<String> {
        named_children(params)
            .into_iter()
            .filter(|param| param.kind() == "type_parameter")
            .filter_map(|param| param.child_by_field_name("name"))
            .map(|name| self.text(name).to_string())
            .collect()
    }

    fn array_element(&self, parent: Node) -> Option<String> {
        if parent.kind() != "generic_type" {
            return None;
        }
        let name = parent.child_by_field_name("name")?;
        if !matches!(self.text(name), "Array" | "ReadonlyArray") {
            return None;
        }
        let args = named_children(parent.child_by_field_name("type_arguments")?);
        match args.as_slice() {
            [element] if matches!(element.kind(), "type_identifier" | "predefined_type") => {
                Some(self.text(*element).to_string())
            }
            _ => None,
        }
    }
}

/// Types listed in the `extends` clause of an interface declaration
pub(crate) fn parent_types<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    child_of_kind(node, "extends_type_clause")
        .map(named_children)
        .unwrap_or_default()
}
