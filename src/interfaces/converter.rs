//! Interface-to-schema conversion
//!
//! The pipeline depends only on [`InterfaceConverter`]; any mechanical
//! converter can be plugged in. [`StructuralConverter`] covers the shapes
//! that appear in CMS type files and refuses the rest, so the caller can
//! skip the definition and report it.

use tree_sitter::Node;

use crate::codegen::ir::{Declaration, Expr, Member};
use crate::codegen::names::interface_symbol;
use crate::error::{GenError, Result};

use super::syntax::{has_token, named_children, node_text, parse_typescript, string_value};
use super::{parent_types, InterfaceDef};

/// Turns one interface or type alias into generated schema source
pub trait InterfaceConverter {
    /// Returns the complete source for the definition, imports included
    fn convert(&self, def: &InterfaceDef) -> Result<String>;
}

/// Built-in converter for plain structural types
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralConverter;

impl StructuralConverter {
    pub fn new() -> Self {
        Self
    }

    /// Schema expression for a definition
    pub fn schema_expr(&self, def: &InterfaceDef) -> Result<Expr> {
        let convert_err = |reason: String| GenError::Convert {
            name: def.name.clone(),
            reason,
        };

        let tree = parse_typescript(&def.source)?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(convert_err("declaration has syntax errors".to_string()));
        }
        let declaration = named_children(root)
            .into_iter()
            .find(|n| matches!(n.kind(), "interface_declaration" | "type_alias_declaration"))
            .ok_or_else(|| convert_err("no declaration found".to_string()))?;

        let lowering = Lowering {
            source: &def.source,
            name: &def.name,
            params: &def.type_params,
        };
        lowering.declaration(declaration).map_err(convert_err)
    }
}

impl InterfaceConverter for StructuralConverter {
    fn convert(&self, def: &InterfaceDef) -> Result<String> {
        let declaration = Declaration::expr(interface_symbol(&def.name), self.schema_expr(def)?);
        Ok(format!("import {{ z }} from \"zod\";\n\n{}\n", declaration.render()))
    }
}

type Lowered<T> = std::result::Result<T, String>;

/// Walks the syntax tree of one declaration
struct Lowering<'a> {
    source: &'a str,
    /// Declared name; references to it become lazy
    name: &'a str,
    /// Generic parameters of the declaration, accepted as anything
    params: &'a [String],
}

impl Lowering<'_> {
    fn text(&self, node: Node) -> &str {
        node_text(node, self.source)
    }

    fn field<'t>(&self, node: Node<'t>, field: &str) -> Lowered<Node<'t>> {
        node.child_by_field_name(field)
            .ok_or_else(|| format!("{} without {}", node.kind(), field))
    }

    fn declaration(&self, node: Node) -> Lowered<Expr> {
        if node.kind() == "type_alias_declaration" {
            return self.ty(self.field(node, "value")?);
        }

        let (members, index) = self.members(self.field(node, "body")?)?;
        let bases = parent_types(node)
            .into_iter()
            .map(|parent| self.ty(parent))
            .collect::<Lowered<Vec<_>>>()?;

        let body = if bases.is_empty() {
            Expr::Object(members)
        } else {
            Expr::Extend { bases, members }
        };
        Ok(match index {
            Some(value) => Expr::Intersection(vec![body, Expr::Record(Box::new(value))]),
            None => body,
        })
    }

    /// Members of an interface body or object type, plus the value type of
    /// its index signatures
    fn members(&self, body: Node) -> Lowered<(Vec<Member>, Option<Expr>)> {
        let mut members = Vec::new();
        let mut index: Option<Expr> = None;

        for child in named_children(body) {
            match child.kind() {
                "property_signature" => members.push(self.property(child)?),
                "index_signature" => {
                    if named_children(child).iter().any(|n| n.kind() == "mapped_type_clause") {
                        return Err("mapped types are not supported".to_string());
                    }
                    let value = self.annotation(self.field(child, "type")?)?;
                    index = Some(match index.take() {
                        Some(previous) => Expr::Union(vec![previous, value]),
                        None => value,
                    });
                }
                "method_signature" => {
                    let name = child.child_by_field_name("name").map(|n| self.text(n)).unwrap_or("?");
                    return Err(format!("method signature '{}' is not supported", name));
                }
                "call_signature" | "construct_signature" => {
                    return Err("call and construct signatures are not supported".to_string());
                }
                other => return Err(format!("unsupported member syntax '{}'", other)),
            }
        }
        Ok((members, index))
    }

    fn property(&self, node: Node) -> Lowered<Member> {
        let name_node = self.field(node, "name")?;
        let name = match name_node.kind() {
            "string" => string_value(name_node, self.source),
            "computed_property_name" => return Err("computed member names are not supported".to_string()),
            _ => self.text(name_node).to_string(),
        };
        let marked_optional = has_token(node, "?", self.source);

        let expr = match node.child_by_field_name("type") {
            Some(annotation) => self.annotation(annotation)?,
            None => Expr::Any,
        };
        let (expr, optional) = match expr {
            Expr::Optional(inner) => (*inner, true),
            expr => (expr, marked_optional),
        };
        Ok(Member { name, expr, optional })
    }

    /// Type inside a `: T` annotation
    fn annotation(&self, node: Node) -> Lowered<Expr> {
        match named_children(node).first() {
            Some(ty) => self.ty(*ty),
            None => Err("empty type annotation".to_string()),
        }
    }

    fn only_child<'t>(&self, node: Node<'t>) -> Lowered<Node<'t>> {
        named_children(node)
            .into_iter()
            .next()
            .ok_or_else(|| format!("empty {}", node.kind()))
    }

    fn ty(&self, node: Node) -> Lowered<Expr> {
        match node.kind() {
            "predefined_type" => {
                let name = self.text(node);
                keyword(name).ok_or_else(|| format!("'{}' is not supported", name))
            }
            "type_identifier" => self.reference(self.text(node)),
            "nested_type_identifier" => Err(format!("qualified type names like '{}' are not supported", self.text(node))),
            "generic_type" => self.generic(node),
            "array_type" => Ok(Expr::array(self.ty(self.only_child(node)?)?)),
            "readonly_type" | "parenthesized_type" => self.ty(self.only_child(node)?),
            "union_type" => {
                let mut variants = Vec::new();
                self.flatten(node, "union_type", &mut variants)?;
                Ok(union(variants))
            }
            "intersection_type" => {
                let mut parts = Vec::new();
                self.flatten(node, "intersection_type", &mut parts)?;
                Ok(Expr::Intersection(parts))
            }
            "object_type" => {
                let (members, index) = self.members(node)?;
                Ok(match index {
                    None => Expr::Object(members),
                    Some(value) if members.is_empty() => Expr::Record(Box::new(value)),
                    Some(value) => Expr::Intersection(vec![Expr::Object(members), Expr::Record(Box::new(value))]),
                })
            }
            "tuple_type" => named_children(node)
                .into_iter()
                .map(|item| self.tuple_item(item))
                .collect::<Lowered<Vec<_>>>()
                .map(Expr::Tuple),
            "literal_type" => self.literal(node),
            "template_literal_type" => {
                if named_children(node).iter().any(|n| n.kind() == "template_type") {
                    return Err("template literal types are not supported".to_string());
                }
                Ok(Expr::Literal(self.text(node).trim_matches('`').to_string()))
            }
            "function_type" | "constructor_type" => Err("function types are not supported".to_string()),
            "conditional_type" => Err("conditional types are not supported".to_string()),
            "index_type_query" => Err("'keyof' type operators are not supported".to_string()),
            "type_query" => Err("'typeof' type operators are not supported".to_string()),
            "lookup_type" => Err("indexed access types are not supported".to_string()),
            "infer_type" => Err("'infer' type operators are not supported".to_string()),
            other => Err(format!("unsupported type syntax '{}' ({})", self.text(node), other)),
        }
    }

    /// Collect the operands of a left-nested `|` or `&` chain
    fn flatten(&self, node: Node, kind: &str, out: &mut Vec<Expr>) -> Lowered<()> {
        for child in named_children(node) {
            if child.kind() == kind {
                self.flatten(child, kind, out)?;
            } else {
                out.push(self.ty(child)?);
            }
        }
        Ok(())
    }

    fn tuple_item(&self, node: Node) -> Lowered<Expr> {
        match node.kind() {
            "rest_type" => Err("variadic tuples are not supported".to_string()),
            "optional_type" => Ok(Expr::Optional(Box::new(self.ty(self.only_child(node)?)?))),
            "tuple_parameter" | "optional_tuple_parameter" => {
                let item = self.annotation(self.field(node, "type")?)?;
                Ok(if node.kind() == "optional_tuple_parameter" {
                    Expr::Optional(Box::new(item))
                } else {
                    item
                })
            }
            _ => self.ty(node),
        }
    }

    fn literal(&self, node: Node) -> Lowered<Expr> {
        let text = self.text(node);
        if let Some(expr) = keyword(text) {
            return Ok(expr);
        }
        let value = self.only_child(node)?;
        match value.kind() {
            "string" => Ok(Expr::Literal(string_value(value, self.source))),
            "number" | "true" | "false" => Ok(Expr::RawLiteral(self.text(value).to_string())),
            "unary_expression" => Ok(Expr::RawLiteral(self.text(value).split_whitespace().collect())),
            other => Err(format!("unsupported literal type '{}' ({})", text, other)),
        }
    }

    fn generic(&self, node: Node) -> Lowered<Expr> {
        let name = self.field(node, "name")?;
        if name.kind() == "nested_type_identifier" {
            return Err(format!("qualified type names like '{}' are not supported", self.text(name)));
        }
        let name = self.text(name);
        let mut args = named_children(self.field(node, "type_arguments")?)
            .into_iter()
            .map(|arg| self.ty(arg))
            .collect::<Lowered<Vec<_>>>()?;

        match (name, args.len()) {
            ("Array" | "ReadonlyArray", 1) => Ok(Expr::array(args.remove(0))),
            ("Record", 2) => Ok(Expr::Record(Box::new(args.remove(1)))),
            _ => Err(format!("generic type {}<...> cannot be resolved", name)),
        }
    }

    fn reference(&self, name: &str) -> Lowered<Expr> {
        if let Some(expr) = keyword(name) {
            return Ok(expr);
        }
        if self.params.iter().any(|p| p == name) {
            return Ok(Expr::Any);
        }
        if matches!(name, "Array" | "ReadonlyArray" | "Record") {
            return Err(format!("{} requires type arguments", name));
        }

        let symbol = interface_symbol(name);
        if name == self.name {
            Ok(Expr::Lazy(Box::new(Expr::reference(symbol))))
        } else {
            Ok(Expr::reference(symbol))
        }
    }
}

/// Built-in type names
fn keyword(name: &str) -> Option<Expr> {
    let expr = match name {
        "string" => Expr::String,
        "number" => Expr::Number,
        "boolean" => Expr::Boolean,
        "any" => Expr::Any,
        "unknown" => Expr::Builtin("unknown"),
        "never" => Expr::Builtin("never"),
        "null" => Expr::Builtin("null"),
        "undefined" => Expr::Builtin("undefined"),
        "void" => Expr::Builtin("void"),
        "bigint" => Expr::Builtin("bigint"),
        "symbol" => Expr::Builtin("symbol"),
        "Date" => Expr::Builtin("date"),
        "object" => Expr::Record(Box::new(Expr::Builtin("unknown"))),
        "true" | "false" => Expr::RawLiteral(name.to_string()),
        _ => return None,
    };
    Some(expr)
}

/// `null` makes the rest nullable, `undefined` and `void` make it optional
fn union(variants: Vec<Expr>) -> Expr {
    let mut nullable = false;
    let mut optional = false;
    let mut rest: Vec<Expr> = Vec::new();
    for variant in variants {
        match variant {
            Expr::Builtin("null") => nullable = true,
            Expr::Builtin("undefined") | Expr::Builtin("void") => optional = true,
            other if !rest.contains(&other) => rest.push(other),
            _ => {}
        }
    }

    let mut expr = match rest.len() {
        0 if nullable => {
            nullable = false;
            Expr::Builtin("null")
        }
        0 => {
            optional = false;
            Expr::Builtin("undefined")
        }
        1 => rest.remove(0),
        _ => Expr::Union(rest),
    };
    if nullable {
        expr = Expr::nullable(expr);
    }
    if optional {
        expr = Expr::Optional(Box::new(expr));
    }
    expr
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::extract_interfaces;

    fn convert(source: &str) -> Result<String> {
        let defs = extract_interfaces(source).unwrap();
        assert_eq!(defs.len(), 1, "expected exactly one definition in {:?}", source);
        StructuralConverter::new().convert(&defs[0])
    }

    #[test]
    fn test_object_interface() {
        let code = convert(
            "export interface StoryblokAsset {\n  /** id */\n  id: number | null;\n  filename: string;\n  alt?: string | null\n  meta_data?: { [key: string]: string };\n}",
        )
        .unwrap();
        assert_eq!(
            code,
            "import { z } from \"zod\";\n\nexport const storyblokAssetSchema = z.object({\n  id: z.number().nullable(),\n  filename: z.string(),\n  alt: z.string().nullable().optional(),\n  meta_data: z.record(z.string(), z.string()).optional(),\n});\n"
        );
    }

    #[test]
    fn test_literal_union_alias() {
        let code = convert("export type LinkType = \"url\" | \"story\" | 1 | -2 | true;").unwrap();
        assert!(code.ends_with(
            "export const linkTypeSchema = z.union([z.literal(\"url\"), z.literal(\"story\"), z.literal(1), z.literal(-2), z.literal(true)]);\n"
        ));
    }

    #[test]
    fn test_extends_and_undefined_members() {
        let code = convert("interface Page extends Base { title: string | undefined; tags: Array<string> }").unwrap();
        assert!(code.contains(
            "export const pageSchema = baseSchema.extend({\n  title: z.string().optional(),\n  tags: z.array(z.string()),\n});"
        ));
    }

    #[test]
    fn test_quoted_member_names() {
        let code = convert("interface Meta { \"data-id\": string; 'plain': number }").unwrap();
        assert!(code.contains("  \"data-id\": z.string(),\n  plain: z.number(),\n"));
    }

    #[test]
    fn test_self_reference_is_lazy() {
        let code = convert("interface TreeNode { label: string; children?: TreeNode[] }").unwrap();
        assert!(code.contains("  children: z.array(z.lazy(() => treeNodeSchema)).optional(),\n"));
    }

    #[test]
    fn test_generic_parameters_become_any() {
        let code = convert("interface Story<Content = unknown> { content: Content; related: Record<string, Story<Content>> }");
        // Applying a user generic cannot be resolved.
        assert!(code.is_err());

        let code = convert("interface Story<Content> { content: Content; meta: object }").unwrap();
        assert!(code.contains("  content: z.any(),\n"));
        assert!(code.contains("  meta: z.record(z.string(), z.unknown()),\n"));
    }

    #[test]
    fn test_every_generic_parameter_becomes_any() {
        let code = convert("interface Pair<A, B extends string = string> { a: A; b: B }").unwrap();
        assert!(code.contains("  a: z.any(),\n  b: z.any(),\n"));
        assert!(!code.contains("bSchema"));
    }

    #[test]
    fn test_object_defaults_and_parent_arguments_keep_members() {
        let code = convert("export interface Story<Meta = { a: string }> { id: number; meta: Meta }").unwrap();
        assert!(code.contains("export const storySchema = z.object({\n  id: z.number(),\n  meta: z.any(),\n});"));

        // Base<...> is a user generic and cannot be resolved
        let err = convert("export interface B extends Base<{ x: string }> { y: number }").unwrap_err();
        assert!(err.to_string().contains("Base<...>"), "{}", err);
    }

    #[test]
    fn test_index_signature_with_members() {
        let code = convert("interface Bag { name: string; [key: string]: unknown }").unwrap();
        assert!(code.contains(
            "export const bagSchema = z.object({\n  name: z.string(),\n}).and(z.record(z.string(), z.unknown()));"
        ));
    }

    #[test]
    fn test_array_extension_without_bypass() {
        let code = convert("export interface StoryblokAssets extends Array<StoryblokAsset> {}").unwrap();
        assert!(code.contains("export const storyblokAssetsSchema = z.array(storyblokAssetSchema).extend({});"));
    }

    #[test]
    fn test_unsupported_shapes_fail() {
        for source in [
            "type Handler = () => void;",
            "type Keys = keyof Foo;",
            "type Maybe = Partial<Foo>;",
            "interface Api { fetch(id: string): void }",
            "type Flags = { [K in Keys]: boolean };",
            "type Pick1 = Foo[\"bar\"];",
            "type Scoped = Storyblok.Asset;",
        ] {
            let err = convert(source).unwrap_err();
            assert!(matches!(err, GenError::Convert { .. }), "{}: {}", source, err);
        }
    }

    #[test]
    fn test_tuples_and_parentheses() {
        let code = convert("type Pair = [string, (number | null)[]];").unwrap();
        assert!(code.contains("z.tuple([z.string(), z.array(z.number().nullable())])"));
    }
}
