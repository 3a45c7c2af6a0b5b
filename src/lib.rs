//! Storyblok Zod Generator
//!
//! Generates a TypeScript module of Zod schemas from the component
//! definitions and type-definitions file of a Storyblok space.
//!
//! ## Features
//!
//! - **Dependency Ordering**: Components nested through `bloks` fields are emitted before the components that nest them
//! - **Exhaustive Field Mapping**: Every field type maps to a schema; unknown types degrade to `z.any()`
//! - **Interface Schemas**: Shared types come from the definitions file, and only the ones in use are emitted
//! - **Fail Soft**: A broken component or interface is reported and skipped, never fatal
//! - **Deterministic Output**: The header carries an input checksum instead of a timestamp
//!
//! ## Input Layout
//!
//! ```text
//! .storyblok/
//! ├── components/
//! │   └── <space-id>/
//! │       ├── article-page.json
//! │       ├── button.json
//! │       └── card.json
//! └── types/
//!     └── storyblok.d.ts
//! ```

pub mod checksum;
pub mod codegen;
pub mod component;
pub mod config;
pub mod error;
pub mod graph;
pub mod inputs;
pub mod interfaces;
pub mod report;

pub use checksum::Checksum;
pub use codegen::{generate, GeneratedOutput, Pipeline};
pub use component::{Component, Field, FieldDescriptor, FieldKind};
pub use config::GenConfig;
pub use error::{GenError, Result};
pub use graph::DependencyGraph;
pub use inputs::{load_inputs, Inputs};
pub use interfaces::{extract_interfaces, InterfaceConverter, InterfaceDef, StructuralConverter};
pub use report::{DiagnosticCode, RunReport};
