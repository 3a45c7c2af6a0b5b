//! Field-type mapping
//!
//! One field descriptor in, one validator expression out. Mapping never
//! fails: anything it cannot express becomes `z.any()`, with a note the
//! caller can report.

use crate::component::{FieldDescriptor, FieldKind};
use crate::config::CodegenConfig;

use super::ir::Expr;
use super::registry::ConvertedRegistry;

/// Discriminator every nested component carries
pub const COMPONENT_TAG: &str = "component";

/// Symbols shared by asset, multilink and richtext fields
#[derive(Debug, Clone)]
pub struct SharedSymbols {
    pub asset: String,
    pub multilink: String,
    pub richtext: String,
}

impl From<&CodegenConfig> for SharedSymbols {
    fn from(config: &CodegenConfig) -> Self {
        Self {
            asset: config.asset_symbol.clone(),
            multilink: config.multilink_symbol.clone(),
            richtext: config.richtext_symbol.clone(),
        }
    }
}

impl Default for SharedSymbols {
    fn default() -> Self {
        Self::from(&CodegenConfig::default())
    }
}

/// Why a field was downgraded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldNote {
    UnknownType(String),
    InvalidShape(String),
    /// Whitelisted components that had not been converted
    Unresolved(Vec<String>),
}

/// Result of mapping one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedField {
    pub expr: Expr,
    pub note: Option<FieldNote>,
}

impl MappedField {
    fn plain(expr: Expr) -> Self {
        Self { expr, note: None }
    }
}

/// Map a field descriptor to its validator expression.
///
/// Returns `None` for editor-only fields (`tab`, `section`), which are left
/// out of the emitted object.
pub fn map_field(field: &FieldDescriptor, registry: &ConvertedRegistry, shared: &SharedSymbols) -> Option<MappedField> {
    let mapped = match &field.kind {
        FieldKind::Text | FieldKind::Textarea | FieldKind::Markdown => MappedField::plain(Expr::String),
        FieldKind::Number => MappedField::plain(Expr::Number),
        FieldKind::Boolean => MappedField::plain(Expr::Boolean),
        FieldKind::Datetime => MappedField::plain(Expr::Datetime),
        FieldKind::SingleOption => MappedField::plain(option_value()),
        FieldKind::MultiOption => MappedField::plain(Expr::array(option_value())),
        FieldKind::Asset => MappedField::plain(Expr::reference(&shared.asset)),
        FieldKind::Multilink => MappedField::plain(Expr::reference(&shared.multilink)),
        FieldKind::Richtext => MappedField::plain(Expr::reference(&shared.richtext)),
        FieldKind::Bloks { whitelist } => {
            let unresolved = unresolved_components(whitelist, registry);
            match resolve_bloks(whitelist, registry) {
                Expr::Any => MappedField {
                    expr: Expr::Any,
                    note: (!unresolved.is_empty()).then(|| FieldNote::Unresolved(unresolved)),
                },
                item => MappedField::plain(Expr::array(item)),
            }
        }
        FieldKind::Tab | FieldKind::Section => return None,
        FieldKind::Missing => MappedField::plain(Expr::Any),
        FieldKind::Unknown(tag) => MappedField {
            expr: Expr::annotated(Expr::Any, format!("Unknown type: {}", tag)),
            note: Some(FieldNote::UnknownType(tag.clone())),
        },
        FieldKind::Invalid(reason) => MappedField {
            expr: Expr::Any,
            note: Some(FieldNote::InvalidShape(reason.clone())),
        },
    };
    Some(mapped)
}

fn option_value() -> Expr {
    Expr::Union(vec![Expr::Number, Expr::String])
}

/// Resolve the item expression of a bloks field.
///
/// An empty whitelist allows anything. A single whitelisted component that
/// has not been converted yet downgrades the whole field to `z.any()`
/// rather than narrowing it to the resolved subset.
pub fn resolve_bloks(whitelist: &[String], registry: &ConvertedRegistry) -> Expr {
    if whitelist.is_empty() {
        return Expr::Any;
    }

    let mut symbols: Vec<&str> = Vec::with_capacity(whitelist.len());
    for name in whitelist {
        let Some(symbol) = registry.symbol_of(name) else {
            return Expr::Any;
        };
        if !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }

    match symbols.as_slice() {
        [single] => Expr::reference(*single),
        _ => Expr::DiscriminatedUnion {
            tag: COMPONENT_TAG.to_string(),
            variants: symbols.into_iter().map(Expr::reference).collect(),
        },
    }
}

/// Whitelisted names missing from the registry, in whitelist order
pub fn unresolved_components(whitelist: &[String], registry: &ConvertedRegistry) -> Vec<String> {
    whitelist
        .iter()
        .filter(|name| !registry.contains(name))
        .cloned()
        .collect()
}
