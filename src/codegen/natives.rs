//! Native schema processing
//!
//! Every definition from the types file becomes one native schema. Empty
//! interfaces that only extend an array type are synthesized directly as
//! `z.array(<element>)` unless the bypass is switched off; everything else
//! goes through the injected [`InterfaceConverter`].

use crate::interfaces::{InterfaceConverter, InterfaceDef};
use crate::report::{DiagnosticCode, RunReport};

use super::ir::{Declaration, Expr};
use super::names::interface_symbol;
use super::registry::{NativeRegistry, NativeSchema};

/// Converts interface definitions into the native registry
pub struct NativeProcessor<'a> {
    converter: &'a dyn InterfaceConverter,
    array_bypass: bool,
}

impl<'a> NativeProcessor<'a> {
    pub fn new(converter: &'a dyn InterfaceConverter, array_bypass: bool) -> Self {
        Self { converter, array_bypass }
    }

    /// Convert all definitions; failures are reported and skipped
    pub fn process(&self, defs: &[InterfaceDef], report: &mut RunReport) -> NativeRegistry {
        let mut registry = NativeRegistry::new();

        for def in defs {
            let symbol = interface_symbol(&def.name);
            if registry.contains_symbol(&symbol) {
                report.record(
                    &def.name,
                    DiagnosticCode::SkippedInterface,
                    format!("schema symbol {} is already defined", symbol),
                );
                continue;
            }

            let declaration = match self.bypass_element(def) {
                Some(element) => {
                    tracing::debug!(interface = %def.name, element, "array extension bypass");
                    Declaration::expr(symbol, Expr::array(element_expr(element)))
                }
                None => match self.converter.convert(def) {
                    Ok(code) => Declaration::raw(symbol, code),
                    Err(e) => {
                        report.record(&def.name, DiagnosticCode::SkippedInterface, e.to_string());
                        continue;
                    }
                },
            };

            registry.insert(NativeSchema {
                interface: def.name.clone(),
                declaration,
            });
        }

        tracing::info!(converted = registry.len(), total = defs.len(), "converted interface definitions");
        registry
    }

    /// Element type to synthesize directly, when the bypass applies
    fn bypass_element<'d>(&self, def: &'d InterfaceDef) -> Option<&'d str> {
        if !self.array_bypass {
            return None;
        }
        def.array_extension()
    }
}

fn element_expr(element: &str) -> Expr {
    match element {
        "string" => Expr::String,
        "number" => Expr::Number,
        "boolean" => Expr::Boolean,
        "any" => Expr::Any,
        "unknown" => Expr::Builtin("unknown"),
        name => Expr::reference(interface_symbol(name)),
    }
}
