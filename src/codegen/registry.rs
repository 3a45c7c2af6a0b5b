//! Per-run schema registries
//!
//! Both registries are plain values owned by one pipeline run and passed
//! to each stage by reference. Entries are written once, in the order
//! their declarations will be emitted.

use std::collections::HashMap;

use super::ir::Declaration;

/// Schema generated for one component
#[derive(Debug, Clone)]
pub struct ConvertedComponent {
    pub name: String,
    pub declaration: Declaration,
    /// Story envelope around the component, when wrappers are enabled
    pub story: Option<Declaration>,
    /// Symbols referenced by the component schema, in first-seen order
    pub references: Vec<String>,
}

/// Components converted so far, keyed by component name
#[derive(Debug, Default)]
pub struct ConvertedRegistry {
    entries: Vec<ConvertedComponent>,
    by_name: HashMap<String, usize>,
}

impl ConvertedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a converted component. A name is only ever registered once.
    pub fn insert(&mut self, component: ConvertedComponent) -> bool {
        if self.by_name.contains_key(&component.name) {
            return false;
        }
        self.by_name.insert(component.name.clone(), self.entries.len());
        self.entries.push(component);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ConvertedComponent> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    /// Schema symbol of an already converted component
    pub fn symbol_of(&self, name: &str) -> Option<&str> {
        self.get(name).map(|c| c.declaration.symbol.as_str())
    }

    /// Entries in conversion order
    pub fn iter(&self) -> impl Iterator<Item = &ConvertedComponent> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Schema generated from one interface definition
#[derive(Debug, Clone)]
pub struct NativeSchema {
    /// Interface name as written in the definitions file
    pub interface: String,
    pub declaration: Declaration,
}

/// Interface schemas keyed by their schema symbol
#[derive(Debug, Default)]
pub struct NativeRegistry {
    entries: Vec<NativeSchema>,
    by_symbol: HashMap<String, usize>,
}

impl NativeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a native schema; a second definition of a symbol is ignored
    pub fn insert(&mut self, schema: NativeSchema) -> bool {
        let symbol = schema.declaration.symbol.clone();
        if self.by_symbol.contains_key(&symbol) {
            return false;
        }
        self.by_symbol.insert(symbol, self.entries.len());
        self.entries.push(schema);
        true
    }

    pub fn contains_symbol(&self, symbol: &str) -> bool {
        self.by_symbol.contains_key(symbol)
    }

    pub fn get(&self, symbol: &str) -> Option<&NativeSchema> {
        self.by_symbol.get(symbol).map(|&i| &self.entries[i])
    }

    /// Whether a schema was generated from the named interface
    pub fn has_interface(&self, interface: &str) -> bool {
        self.entries.iter().any(|n| n.interface == interface)
    }

    /// Entries in definition order
    pub fn iter(&self) -> impl Iterator<Item = &NativeSchema> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::ir::Expr;

    fn converted(name: &str, symbol: &str) -> ConvertedComponent {
        ConvertedComponent {
            name: name.to_string(),
            declaration: Declaration::expr(symbol, Expr::Any),
            story: None,
            references: Vec::new(),
        }
    }

    #[test]
    fn test_entries_are_written_once() {
        let mut registry = ConvertedRegistry::new();
        assert!(registry.insert(converted("card", "cardSchema")));
        assert!(!registry.insert(converted("card", "otherSchema")));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.symbol_of("card"), Some("cardSchema"));
        assert_eq!(registry.symbol_of("ghost"), None);
    }

    #[test]
    fn test_native_lookup_by_interface() {
        let mut natives = NativeRegistry::new();
        natives.insert(NativeSchema {
            interface: "StoryblokStory".into(),
            declaration: Declaration::raw("storyblokStorySchema", "export const storyblokStorySchema = z.any();"),
        });
        assert!(natives.has_interface("StoryblokStory"));
        assert!(natives.contains_symbol("storyblokStorySchema"));
        assert!(!natives.has_interface("StoryblokAsset"));
    }
}
