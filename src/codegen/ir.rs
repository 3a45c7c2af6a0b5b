//! Output IR
//!
//! Generated code is composed as declarations over a small expression
//! tree and only turned into text by [`Document::render`]. Declarations
//! produced by the interface converter arrive as text and stay opaque
//! ([`DeclarationBody::Raw`]); their imports are lifted out by the
//! assembler so the document owns a single import block.

use std::fmt::Write as _;

/// Validator expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    String,
    Number,
    Boolean,
    /// ISO-8601 timestamp string
    Datetime,
    Any,
    /// `z.literal("...")`
    Literal(String),
    /// `z.literal(<token>)` for number and boolean literals
    RawLiteral(String),
    /// Argument-less constructor such as `z.null()` or `z.date()`
    Builtin(&'static str),
    /// `z.union([...])`
    Union(Vec<Expr>),
    /// `z.discriminatedUnion("<tag>", [...])`
    DiscriminatedUnion { tag: String, variants: Vec<Expr> },
    Array(Box<Expr>),
    /// `z.tuple([...])`
    Tuple(Vec<Expr>),
    /// `z.record(z.string(), <value>)`
    Record(Box<Expr>),
    /// `a.and(b)...`
    Intersection(Vec<Expr>),
    Object(Vec<Member>),
    /// `base.merge(other).extend({...})`
    Extend { bases: Vec<Expr>, members: Vec<Member> },
    /// Reference to another declaration by symbol
    Ref(String),
    /// `z.lazy(() => ...)`
    Lazy(Box<Expr>),
    /// `<expr>.nullable()`
    Nullable(Box<Expr>),
    /// `<expr>.optional()` outside of object members
    Optional(Box<Expr>),
    /// Expression followed by a block comment
    Annotated { expr: Box<Expr>, comment: String },
}

/// Object member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub expr: Expr,
    pub optional: bool,
}

impl Member {
    pub fn required(name: impl Into<String>, expr: Expr) -> Self {
        Self { name: name.into(), expr, optional: false }
    }

    pub fn optional(name: impl Into<String>, expr: Expr) -> Self {
        Self { name: name.into(), expr, optional: true }
    }
}

impl Expr {
    pub fn array(item: Expr) -> Self {
        Expr::Array(Box::new(item))
    }

    pub fn nullable(inner: Expr) -> Self {
        Expr::Nullable(Box::new(inner))
    }

    pub fn reference(symbol: impl Into<String>) -> Self {
        Expr::Ref(symbol.into())
    }

    pub fn annotated(expr: Expr, comment: impl Into<String>) -> Self {
        Expr::Annotated { expr: Box::new(expr), comment: comment.into() }
    }

    /// Every symbol this expression references, in first-seen order
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Ref(symbol) => {
                if !out.contains(&symbol.as_str()) {
                    out.push(symbol);
                }
            }
            Expr::Union(items)
            | Expr::Tuple(items)
            | Expr::Intersection(items)
            | Expr::DiscriminatedUnion { variants: items, .. } => {
                items.iter().for_each(|e| e.collect_references(out));
            }
            Expr::Object(members) => members.iter().for_each(|m| m.expr.collect_references(out)),
            Expr::Extend { bases, members } => {
                bases.iter().for_each(|e| e.collect_references(out));
                members.iter().for_each(|m| m.expr.collect_references(out));
            }
            Expr::Array(inner)
            | Expr::Record(inner)
            | Expr::Lazy(inner)
            | Expr::Nullable(inner)
            | Expr::Optional(inner)
            | Expr::Annotated { expr: inner, .. } => inner.collect_references(out),
            Expr::String
            | Expr::Number
            | Expr::Boolean
            | Expr::Datetime
            | Expr::Any
            | Expr::Literal(_)
            | Expr::RawLiteral(_)
            | Expr::Builtin(_) => {}
        }
    }

    /// Render at the given indentation depth
    pub fn render(&self, depth: usize) -> String {
        self.render_with_suffix(depth, "")
    }

    /// Render with a method-chain suffix such as `.optional()`.
    ///
    /// The suffix goes before any trailing annotation comment.
    pub fn render_with_suffix(&self, depth: usize, suffix: &str) -> String {
        match self {
            Expr::String => format!("z.string(){}", suffix),
            Expr::Number => format!("z.number(){}", suffix),
            Expr::Boolean => format!("z.boolean(){}", suffix),
            Expr::Datetime => format!("z.string().datetime(){}", suffix),
            Expr::Any => format!("z.any(){}", suffix),
            Expr::Literal(value) => format!("z.literal({}){}", quote(value), suffix),
            Expr::RawLiteral(token) => format!("z.literal({}){}", token, suffix),
            Expr::Builtin(name) => format!("z.{}(){}", name, suffix),
            Expr::Union(items) => format!("z.union([{}]){}", render_list(items, depth), suffix),
            Expr::DiscriminatedUnion { tag, variants } => format!(
                "z.discriminatedUnion({}, [{}]){}",
                quote(tag),
                render_list(variants, depth),
                suffix
            ),
            Expr::Array(item) => format!("z.array({}){}", item.render(depth), suffix),
            Expr::Tuple(items) => format!("z.tuple([{}]){}", render_list(items, depth), suffix),
            Expr::Record(value) => format!("z.record(z.string(), {}){}", value.render(depth), suffix),
            Expr::Intersection(items) => {
                let mut parts = items.iter().map(|e| e.render(depth));
                let mut out = parts.next().unwrap_or_else(|| "z.any()".to_string());
                for part in parts {
                    let _ = write!(out, ".and({})", part);
                }
                format!("{}{}", out, suffix)
            }
            Expr::Object(members) => format!("{}{}", render_object(members, depth), suffix),
            Expr::Extend { bases, members } => {
                let mut parts = bases.iter().map(|e| e.render(depth));
                let mut out = parts.next().unwrap_or_else(|| "z.object({})".to_string());
                for part in parts {
                    let _ = write!(out, ".merge({})", part);
                }
                let object = render_object(members, depth);
                let shape = object.strip_prefix("z.object(").and_then(|s| s.strip_suffix(')')).unwrap_or("{}");
                format!("{}.extend({}){}", out, shape, suffix)
            }
            Expr::Ref(symbol) => format!("{}{}", symbol, suffix),
            Expr::Lazy(inner) => format!("z.lazy(() => {}){}", inner.render(depth), suffix),
            Expr::Nullable(inner) => inner.render_with_suffix(depth, &format!(".nullable(){}", suffix)),
            Expr::Optional(inner) => inner.render_with_suffix(depth, &format!(".optional(){}", suffix)),
            Expr::Annotated { expr, comment } => {
                format!("{} /* {} */", expr.render_with_suffix(depth, suffix), comment.replace("*/", "* /"))
            }
        }
    }
}

fn render_list(items: &[Expr], depth: usize) -> String {
    items.iter().map(|e| e.render(depth)).collect::<Vec<_>>().join(", ")
}

fn render_object(members: &[Member], depth: usize) -> String {
    if members.is_empty() {
        return "z.object({})".to_string();
    }
    let pad = "  ".repeat(depth + 1);
    let mut out = String::from("z.object({\n");
    for member in members {
        let suffix = if member.optional { ".optional()" } else { "" };
        let _ = writeln!(
            out,
            "{}{}: {},",
            pad,
            property_key(&member.name),
            member.expr.render_with_suffix(depth + 1, suffix)
        );
    }
    out.push_str(&"  ".repeat(depth));
    out.push_str("})");
    out
}

/// Object keys that are not plain identifiers are quoted
fn property_key(name: &str) -> String {
    let mut chars = name.chars();
    let ident = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    };
    if ident {
        name.to_string()
    } else {
        quote(name)
    }
}

fn quote(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
}

// =============================================================================
// Declarations and Documents
// =============================================================================

/// Body of a top-level declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclarationBody {
    /// Built by this crate
    Expr(Expr),
    /// Converter output, kept verbatim minus its import lines
    Raw(String),
}

/// A top-level `export const <symbol> = ...;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub symbol: String,
    pub body: DeclarationBody,
}

impl Declaration {
    pub fn expr(symbol: impl Into<String>, expr: Expr) -> Self {
        Self { symbol: symbol.into(), body: DeclarationBody::Expr(expr) }
    }

    pub fn raw(symbol: impl Into<String>, text: impl Into<String>) -> Self {
        Self { symbol: symbol.into(), body: DeclarationBody::Raw(text.into()) }
    }

    pub fn render(&self) -> String {
        match &self.body {
            DeclarationBody::Expr(expr) => format!("export const {} = {};", self.symbol, expr.render(0)),
            DeclarationBody::Raw(text) => text.trim().to_string(),
        }
    }
}

/// One consolidated import statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Import {
    /// `import [type ]{ a, b } from "module";`
    Named { module: String, names: Vec<String>, type_only: bool },
    /// Any other import form, deduplicated by exact text
    Verbatim(String),
}

impl Import {
    pub fn named(module: impl Into<String>, names: &[&str]) -> Self {
        Import::Named {
            module: module.into(),
            names: names.iter().map(|n| n.to_string()).collect(),
            type_only: false,
        }
    }

    pub fn render(&self) -> String {
        match self {
            Import::Named { module, names, type_only } => format!(
                "import {}{{ {} }} from {};",
                if *type_only { "type " } else { "" },
                names.join(", "),
                quote(module)
            ),
            Import::Verbatim(line) => line.clone(),
        }
    }
}

/// The generated file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Comment lines without the `//` prefix
    pub header: Vec<String>,
    pub imports: Vec<Import>,
    pub declarations: Vec<Declaration>,
}

impl Document {
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.header {
            if line.is_empty() {
                out.push_str("//\n");
            } else {
                let _ = writeln!(out, "// {}", line);
            }
        }
        if !self.header.is_empty() {
            out.push('\n');
        }

        for import in &self.imports {
            let _ = writeln!(out, "{}", import.render());
        }
        if !self.imports.is_empty() {
            out.push('\n');
        }

        for declaration in &self.declarations {
            let _ = writeln!(out, "{}\n", declaration.render());
        }

        out.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_rendering() {
        assert_eq!(Expr::String.render(0), "z.string()");
        assert_eq!(Expr::Datetime.render(0), "z.string().datetime()");
        assert_eq!(
            Expr::array(Expr::Union(vec![Expr::Number, Expr::String])).render(0),
            "z.array(z.union([z.number(), z.string()]))"
        );
    }

    #[test]
    fn test_annotation_follows_suffix() {
        let expr = Expr::annotated(Expr::Any, "Unknown type: foo");
        assert_eq!(expr.render(0), "z.any() /* Unknown type: foo */");
        assert_eq!(
            expr.render_with_suffix(0, ".optional()"),
            "z.any().optional() /* Unknown type: foo */"
        );
    }

    #[test]
    fn test_annotation_cannot_close_its_comment() {
        let expr = Expr::annotated(Expr::Any, "Unknown type: x */ }); export const pwn = (1");
        assert_eq!(
            expr.render_with_suffix(0, ".optional()"),
            "z.any().optional() /* Unknown type: x * / }); export const pwn = (1 */"
        );
    }

    #[test]
    fn test_object_rendering() {
        let expr = Expr::Object(vec![
            Member::required("_uid", Expr::String),
            Member::optional("data-id", Expr::Number),
            Member::optional(
                "nested",
                Expr::Object(vec![Member::required("flag", Expr::Boolean)]),
            ),
        ]);
        let expected = "z.object({\n  _uid: z.string(),\n  \"data-id\": z.number().optional(),\n  nested: z.object({\n    flag: z.boolean(),\n  }).optional(),\n})";
        assert_eq!(expr.render(0), expected);
    }

    #[test]
    fn test_extend_and_intersection_rendering() {
        let expr = Expr::Extend {
            bases: vec![Expr::reference("baseSchema"), Expr::reference("mixinSchema")],
            members: vec![Member::optional("title", Expr::String)],
        };
        assert_eq!(
            expr.render(0),
            "baseSchema.merge(mixinSchema).extend({\n  title: z.string().optional(),\n})"
        );

        let expr = Expr::Intersection(vec![
            Expr::Object(Vec::new()),
            Expr::Record(Box::new(Expr::Builtin("unknown"))),
        ]);
        assert_eq!(expr.render(0), "z.object({}).and(z.record(z.string(), z.unknown()))");
    }

    #[test]
    fn test_references_are_collected_once() {
        let expr = Expr::Object(vec![
            Member::required("a", Expr::reference("cardSchema")),
            Member::required(
                "b",
                Expr::array(Expr::DiscriminatedUnion {
                    tag: "component".into(),
                    variants: vec![Expr::reference("cardSchema"), Expr::reference("buttonSchema")],
                }),
            ),
        ]);
        assert_eq!(expr.references(), ["cardSchema", "buttonSchema"]);
    }

    #[test]
    fn test_document_rendering_trims_trailing_whitespace() {
        let doc = Document {
            header: vec!["Generated".into()],
            imports: vec![Import::named("zod", &["z"])],
            declarations: vec![Declaration::expr("aSchema", Expr::String)],
        };
        assert_eq!(
            doc.render(),
            "// Generated\n\nimport { z } from \"zod\";\n\nexport const aSchema = z.string();"
        );
    }
}
