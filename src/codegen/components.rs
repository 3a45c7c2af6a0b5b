//! Component conversion
//!
//! Walks components in dependency order, builds one object schema per
//! component and registers it, so components converted later can refer
//! to it by symbol. A component that fails to convert is reported and
//! skipped; the run carries on with the rest.
//!
//! Every emitted symbol is unique. Native schema symbols are claimed up
//! front; after that the first component or story wrapper to claim a
//! symbol keeps it and later claimants are skipped.

use std::collections::HashMap;

use crate::component::{Component, Field};
use crate::error::{GenError, Result};
use crate::report::{DiagnosticCode, RunReport};

use super::fields::{map_field, FieldNote, SharedSymbols, COMPONENT_TAG};
use super::ir::{Declaration, Expr, Member};
use super::names::{component_symbol, story_symbol};
use super::registry::{ConvertedComponent, ConvertedRegistry, NativeRegistry};

/// Members every nested component instance carries
const RESERVED_MEMBERS: [&str; 2] = ["_uid", COMPONENT_TAG];

/// Settings for one conversion pass
#[derive(Debug, Clone, Default)]
pub struct ComponentConverter {
    pub shared: SharedSymbols,
    /// Also emit `<name>StorySchema` for every component
    pub story_wrappers: bool,
    /// Symbols taken by native schemas, with the interface that owns each
    reserved: HashMap<String, String>,
}

impl ComponentConverter {
    pub fn new(shared: SharedSymbols, story_wrappers: bool) -> Self {
        Self {
            shared,
            story_wrappers,
            reserved: HashMap::new(),
        }
    }

    /// Keep component and story symbols clear of native schema symbols
    pub fn reserve_natives(mut self, natives: &NativeRegistry) -> Self {
        for native in natives.iter() {
            self.reserved
                .insert(native.declaration.symbol.clone(), format!("interface {}", native.interface));
        }
        self
    }

    /// Who already emits `symbol`, if anyone
    fn claimant(&self, symbol: &str, registry: &ConvertedRegistry) -> Option<String> {
        if let Some(owner) = self.reserved.get(symbol) {
            return Some(owner.clone());
        }
        registry.iter().find_map(|c| {
            if c.declaration.symbol == symbol {
                Some(format!("component '{}'", c.name))
            } else if c.story.as_ref().is_some_and(|story| story.symbol == symbol) {
                Some(format!("the story wrapper of '{}'", c.name))
            } else {
                None
            }
        })
    }

    /// Convert components in `order`, registering each result.
    ///
    /// Names in `order` without a loaded component are ignored.
    pub fn convert_all(
        &self,
        order: &[String],
        components: &[Component],
        registry: &mut ConvertedRegistry,
        report: &mut RunReport,
    ) -> usize {
        let by_name: HashMap<&str, &Component> = components.iter().map(|c| (c.name.as_str(), c)).collect();
        let mut converted = 0;

        for name in order {
            let Some(component) = by_name.get(name.as_str()) else {
                continue;
            };
            match self.convert(component, registry, report) {
                Ok(entry) => {
                    tracing::debug!(component = %name, symbol = %entry.declaration.symbol, "converted component");
                    registry.insert(entry);
                    converted += 1;
                }
                Err(e) => report.record(name, DiagnosticCode::SkippedComponent, e.to_string()),
            }
        }

        tracing::info!(converted, total = order.len(), "converted components");
        converted
    }

    /// Build the schema declaration for one component
    pub fn convert(
        &self,
        component: &Component,
        registry: &ConvertedRegistry,
        report: &mut RunReport,
    ) -> Result<ConvertedComponent> {
        let symbol = component_symbol(&component.name);
        if let Some(owner) = self.claimant(&symbol, registry) {
            return Err(GenError::Convert {
                name: component.name.clone(),
                reason: format!("schema symbol {} is already used by {}", symbol, owner),
            });
        }

        let mut members = vec![
            Member::required("_uid", Expr::String),
            Member::required(COMPONENT_TAG, Expr::Literal(component.name.clone())),
        ];
        for field in &component.fields {
            if let Some(member) = self.member_for(component, field, registry, report) {
                members.push(member);
            }
        }

        let object = Expr::Object(members);
        let references = object.references().into_iter().map(String::from).collect();
        let story = if self.story_wrappers {
            self.story_for(component, &symbol, registry, report)
        } else {
            None
        };

        Ok(ConvertedComponent {
            name: component.name.clone(),
            declaration: Declaration::expr(symbol, object),
            story,
            references,
        })
    }

    fn story_for(
        &self,
        component: &Component,
        content_symbol: &str,
        registry: &ConvertedRegistry,
        report: &mut RunReport,
    ) -> Option<Declaration> {
        let symbol = story_symbol(&component.name);
        if let Some(owner) = self.claimant(&symbol, registry) {
            report.record(
                &component.name,
                DiagnosticCode::SkippedComponent,
                format!("story wrapper skipped, symbol {} is already used by {}", symbol, owner),
            );
            return None;
        }
        Some(Declaration::expr(symbol, story_envelope(content_symbol)))
    }

    fn member_for(
        &self,
        component: &Component,
        field: &Field,
        registry: &ConvertedRegistry,
        report: &mut RunReport,
    ) -> Option<Member> {
        if RESERVED_MEMBERS.contains(&field.name.as_str()) {
            report.record(
                &component.name,
                DiagnosticCode::DegradedField,
                format!("field '{}' shadows a built-in member and was dropped", field.name),
            );
            return None;
        }

        let mapped = map_field(&field.descriptor, registry, &self.shared)?;
        match mapped.note {
            Some(FieldNote::UnknownType(tag)) => report.record(
                &component.name,
                DiagnosticCode::UnknownFieldType,
                format!("field '{}' has unknown type '{}'", field.name, tag),
            ),
            Some(FieldNote::InvalidShape(reason)) => report.record(
                &component.name,
                DiagnosticCode::DegradedField,
                format!("field '{}': {}", field.name, reason),
            ),
            Some(FieldNote::Unresolved(names)) => report.record(
                &component.name,
                DiagnosticCode::UnresolvedBloks,
                format!("field '{}' allows unconverted components: {}", field.name, names.join(", ")),
            ),
            None => {}
        }

        Some(Member {
            name: field.name.clone(),
            expr: mapped.expr,
            optional: !field.descriptor.required,
        })
    }
}

/// Story envelope with `content` filled by the component schema
pub fn story_envelope(content_symbol: &str) -> Expr {
    let link = |extra: Vec<Member>| {
        let mut members = vec![
            Member::required("id", Expr::Number),
            Member::required("name", Expr::String),
            Member::required("slug", Expr::String),
            Member::required("full_slug", Expr::String),
        ];
        members.extend(extra);
        Expr::Object(members)
    };

    Expr::Object(vec![
        Member::required("id", Expr::Number),
        Member::required("uuid", Expr::String),
        Member::required("name", Expr::String),
        Member::required("slug", Expr::String),
        Member::required("full_slug", Expr::String),
        Member::optional("default_full_slug", Expr::nullable(Expr::String)),
        Member::required("created_at", Expr::Datetime),
        Member::required("published_at", Expr::nullable(Expr::Datetime)),
        Member::required("first_published_at", Expr::nullable(Expr::Datetime)),
        Member::optional("updated_at", Expr::Datetime),
        Member::required("sort_by_date", Expr::nullable(Expr::String)),
        Member::required("position", Expr::Number),
        Member::required("tag_list", Expr::array(Expr::String)),
        Member::required("is_startpage", Expr::Boolean),
        Member::required("parent_id", Expr::nullable(Expr::Number)),
        Member::required("group_id", Expr::String),
        Member::optional("release_id", Expr::nullable(Expr::Number)),
        Member::required("lang", Expr::String),
        Member::optional("path", Expr::nullable(Expr::String)),
        Member::optional("meta_data", Expr::Any),
        Member::required(
            "alternates",
            Expr::array(link(vec![
                Member::optional("is_folder", Expr::nullable(Expr::Boolean)),
                Member::optional("parent_id", Expr::nullable(Expr::Number)),
            ])),
        ),
        Member::optional(
            "translated_slugs",
            Expr::nullable(Expr::array(Expr::Object(vec![
                Member::required("path", Expr::String),
                Member::optional("name", Expr::nullable(Expr::String)),
                Member::required("lang", Expr::String),
            ]))),
        ),
        Member::optional("breadcrumbs", Expr::array(link(Vec::new()))),
        Member::required("content", Expr::reference(content_symbol)),
    ])
}
