//! Code Generation
//!
//! Turns loaded components and interface definitions into one Zod module.
//!
//! Stages, in order:
//! - Dependency graph + topological sort: fatal on cycles
//! - Native schemas: one per interface definition, via the injected converter
//! - Component conversion: in dependency order, into a per-run registry
//! - Usage analysis: which native schemas the components actually reach
//! - Assembly: header, used natives, components, one import block
//!
//! Registries live for one [`Pipeline::run`] and are never shared between
//! runs.

pub mod assemble;
pub mod components;
pub mod fields;
pub mod ir;
pub mod names;
pub mod natives;
pub mod registry;
pub mod usage;

use crate::config::GenConfig;
use crate::error::Result;
use crate::graph::DependencyGraph;
use crate::inputs::{load_inputs, Inputs};
use crate::interfaces::InterfaceConverter;
use crate::report::RunReport;

use assemble::assemble;
use components::ComponentConverter;
use fields::SharedSymbols;
use natives::NativeProcessor;
use registry::{ConvertedRegistry, NativeSchema};
use usage::analyze_usage;

/// First header line of every generated document
pub const GENERATED_NOTICE: &str = "This file was generated by storyblok-zod. Do not edit it by hand.";

// =============================================================================
// Generated Output
// =============================================================================

/// Output from code generation
#[derive(Debug, Clone)]
pub struct GeneratedOutput {
    /// Generated TypeScript module, trailing whitespace trimmed
    pub code: String,
    /// Number of component schemas emitted
    pub component_count: usize,
    /// Number of native schemas emitted
    pub native_count: usize,
    /// Everything skipped or degraded along the way
    pub report: RunReport,
}

// =============================================================================
// Pipeline
// =============================================================================

/// One generation run over already loaded inputs
pub struct Pipeline<'a> {
    config: &'a GenConfig,
    converter: &'a dyn InterfaceConverter,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a GenConfig, converter: &'a dyn InterfaceConverter) -> Self {
        Self { config, converter }
    }

    /// Generate the document.
    ///
    /// Only a dependency cycle between components fails the run; every
    /// per-component and per-interface problem ends up in the report.
    pub fn run(&self, inputs: Inputs) -> Result<GeneratedOutput> {
        let Inputs {
            components,
            definitions,
            checksum,
            mut report,
        } = inputs;
        let codegen = &self.config.codegen;

        let graph = DependencyGraph::from_components(&components);
        let order = graph.topo_order()?;
        tracing::info!(
            components = graph.component_count(),
            edges = graph.edge_count(),
            "sorted components"
        );

        let natives =
            NativeProcessor::new(self.converter, codegen.array_extension_bypass).process(&definitions, &mut report);

        let story_wrappers = codegen.story_wrappers && natives.has_interface(&codegen.story_interface);
        if codegen.story_wrappers && !story_wrappers {
            tracing::debug!(
                interface = %codegen.story_interface,
                "story interface not defined, skipping story wrappers"
            );
        }

        let mut registry = ConvertedRegistry::new();
        ComponentConverter::new(SharedSymbols::from(codegen), story_wrappers)
            .reserve_natives(&natives)
            .convert_all(&order, &components, &mut registry, &mut report);

        let usage = analyze_usage(&registry, &natives, &mut report);
        let used: Vec<&NativeSchema> = usage.used.iter().filter_map(|symbol| natives.get(symbol)).collect();

        let mut header = vec![GENERATED_NOTICE.to_string(), format!("Input checksum: {}", checksum)];
        if let Some(extra) = &self.config.output.header {
            header.extend(extra.lines().map(|line| line.trim_end().to_string()));
        }

        let code = assemble(header, &used, &registry).render();
        tracing::info!(
            components = registry.len(),
            natives = used.len(),
            warnings = report.warning_count(),
            "generated document"
        );

        Ok(GeneratedOutput {
            code,
            component_count: registry.len(),
            native_count: used.len(),
            report,
        })
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Load the inputs of `space` and generate its document
pub fn generate(config: &GenConfig, space: &str, converter: &dyn InterfaceConverter) -> Result<GeneratedOutput> {
    let inputs = load_inputs(config, space)?;
    Pipeline::new(config, converter).run(inputs)
}
