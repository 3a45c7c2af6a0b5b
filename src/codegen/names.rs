//! Symbol naming
//!
//! Component `article-page` becomes `articlePageSchema`, interface
//! `StoryblokAsset` becomes `storyblokAssetSchema`.

/// Convert a kebab, snake or space separated name to camelCase
pub fn to_camel_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut capitalize_next = false;

    for c in s.chars() {
        if c == '_' || c == '-' || c == ' ' || c == '.' {
            capitalize_next = !result.is_empty();
        } else if !c.is_ascii_alphanumeric() && c != '$' {
            capitalize_next = !result.is_empty();
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else if result.is_empty() {
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }

    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }
    result
}

/// Lower the first character of a PascalCase type name
pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Schema symbol for a component
pub fn component_symbol(component: &str) -> String {
    format!("{}Schema", to_camel_case(component))
}

/// Story-wrapper symbol for a component
pub fn story_symbol(component: &str) -> String {
    format!("{}StorySchema", to_camel_case(component))
}

/// Schema symbol for an interface or type alias
pub fn interface_symbol(interface: &str) -> String {
    format!("{}Schema", lower_first(interface))
}
