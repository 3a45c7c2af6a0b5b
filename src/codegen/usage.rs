//! Usage analysis
//!
//! Only native schemas reachable from a converted component are emitted.
//! Component references are known structurally from conversion. Native
//! bodies produced by the converter are opaque text, so their references
//! to other natives are read off the identifiers in their syntax tree.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::graph::DependencyGraph;
use crate::interfaces::syntax::value_identifiers;
use crate::report::{DiagnosticCode, RunReport};

use super::ir::DeclarationBody;
use super::registry::{ConvertedRegistry, NativeRegistry, NativeSchema};

/// Outcome of usage analysis
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Usage {
    /// Native symbols to emit, each after the natives it references
    pub used: Vec<String>,
    /// Referenced symbols that no declaration provides
    pub undefined: Vec<String>,
}

/// Compute the native schemas the converted components need
pub fn analyze_usage(components: &ConvertedRegistry, natives: &NativeRegistry, report: &mut RunReport) -> Usage {
    let component_symbols: HashSet<&str> = components.iter().map(|c| c.declaration.symbol.as_str()).collect();

    let mut usage = Usage::default();
    let mut reached: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<String> = VecDeque::new();

    for component in components.iter() {
        for symbol in &component.references {
            if natives.contains_symbol(symbol) {
                if reached.insert(symbol.clone()) {
                    queue.push_back(symbol.clone());
                }
            } else if !component_symbols.contains(symbol.as_str()) && !usage.undefined.contains(symbol) {
                report.record(
                    &component.name,
                    DiagnosticCode::UndefinedSymbol,
                    format!("{} is referenced but not defined by the types file", symbol),
                );
                usage.undefined.push(symbol.clone());
            }
        }
    }

    let mut edges: HashMap<String, Vec<String>> = HashMap::new();
    while let Some(symbol) = queue.pop_front() {
        let Some(native) = natives.get(&symbol) else {
            continue;
        };
        let refs = native_references(native, natives);
        for dep in &refs {
            if reached.insert(dep.clone()) {
                tracing::debug!(from = %symbol, to = %dep, "native schema used transitively");
                queue.push_back(dep.clone());
            }
        }
        edges.insert(symbol, refs);
    }

    // Dependencies first; definition order breaks ties
    let dependencies: Vec<(String, Vec<String>)> = natives
        .iter()
        .map(|n| n.declaration.symbol.clone())
        .filter(|s| reached.contains(s))
        .map(|s| {
            let refs = edges.remove(&s).unwrap_or_default();
            (s, refs)
        })
        .collect();
    let definition_order: Vec<String> = dependencies.iter().map(|(s, _)| s.clone()).collect();

    usage.used = match DependencyGraph::from_dependencies(dependencies).topo_order() {
        Ok(order) => order,
        Err(e) => {
            tracing::warn!("{}; emitting native schemas in definition order", e);
            definition_order
        }
    };

    tracing::info!(
        used = usage.used.len(),
        defined = natives.len(),
        undefined = usage.undefined.len(),
        "analyzed native schema usage"
    );
    usage
}

/// Other natives a native schema refers to, in first-seen order
fn native_references(native: &NativeSchema, natives: &NativeRegistry) -> Vec<String> {
    let own = native.declaration.symbol.as_str();
    let candidates: Vec<String> = match &native.declaration.body {
        DeclarationBody::Expr(expr) => expr.references().into_iter().map(String::from).collect(),
        DeclarationBody::Raw(text) => match value_identifiers(text) {
            Ok(identifiers) => identifiers,
            Err(e) => {
                tracing::warn!(symbol = %own, "cannot scan native schema for references: {}", e);
                Vec::new()
            }
        },
    };

    let mut refs: Vec<String> = Vec::new();
    for symbol in candidates {
        if symbol != own && natives.contains_symbol(&symbol) && !refs.contains(&symbol) {
            refs.push(symbol);
        }
    }
    refs
}
