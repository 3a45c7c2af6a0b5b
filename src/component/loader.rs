//! Component Loading
//!
//! Reads every component document of one space folder. A document that
//! cannot be read or parsed only costs that document; the folder itself
//! must exist.

use serde_json::Value;
use sha2::Sha256;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::Component;
use crate::checksum::Checksum;
use crate::error::{GenError, Result};
use crate::report::{DiagnosticCode, RunReport};

/// Components of one space, in file-name then document order
#[derive(Debug, Default)]
pub struct LoadedComponents {
    pub components: Vec<Component>,
    /// Number of documents that were read successfully
    pub document_count: usize,
}

/// Load every `*.json` component document directly under `dir`.
///
/// Document contents are fed to `hasher` so identical inputs can be
/// recognized in the generated header.
pub fn load_components(dir: &Path, report: &mut RunReport, hasher: &mut Sha256) -> Result<LoadedComponents> {
    if !dir.is_dir() {
        return Err(GenError::invalid(dir, "components folder does not exist"));
    }

    let mut loaded = LoadedComponents::default();
    let mut seen: HashSet<String> = HashSet::new();

    let entries = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                match e.path() {
                    Some(path) if !is_document(path) => {
                        tracing::debug!(path = %path.display(), "skipping unreadable entry: {}", e)
                    }
                    path => {
                        let label = path
                            .and_then(Path::file_name)
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_else(|| dir.display().to_string());
                        report.record(label, DiagnosticCode::SkippedDocument, format!("unreadable: {}", e));
                    }
                }
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() || !is_document(path) {
            continue;
        }
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                report.record(&label, DiagnosticCode::SkippedDocument, format!("unreadable: {}", e));
                continue;
            }
        };
        Checksum::update_field(hasher, label.as_bytes());
        Checksum::update_field(hasher, content.as_bytes());

        let json: Value = match serde_json::from_str(&content) {
            Ok(j) => j,
            Err(e) => {
                report.record(&label, DiagnosticCode::SkippedDocument, format!("malformed JSON: {}", e));
                continue;
            }
        };
        loaded.document_count += 1;

        for raw in component_objects(&json) {
            match Component::from_value(raw) {
                Ok(component) => {
                    if !seen.insert(component.name.clone()) {
                        report.record(
                            &component.name,
                            DiagnosticCode::DuplicateComponent,
                            format!("already defined before {}, keeping the first definition", label),
                        );
                        continue;
                    }
                    tracing::debug!(component = %component.name, fields = component.fields.len(), "loaded component");
                    loaded.components.push(component);
                }
                Err(reason) => report.record(&label, DiagnosticCode::SkippedComponent, reason),
            }
        }
    }

    tracing::info!(
        components = loaded.components.len(),
        documents = loaded.document_count,
        "loaded component documents from {}",
        dir.display()
    );
    Ok(loaded)
}

fn is_document(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "json")
}

/// The component objects inside one document.
///
/// Accepts a single component, a bare list, or a `{"components": [...]}` export.
fn component_objects(json: &Value) -> Vec<&Value> {
    match json {
        Value::Array(items) => items.iter().collect(),
        Value::Object(obj) => match obj.get("components").and_then(Value::as_array) {
            Some(items) if !obj.contains_key("schema") => items.iter().collect(),
            _ => vec![json],
        },
        other => vec![other],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sha2::Digest;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_document_shapes() {
        let single = json!({"name": "a", "schema": {}});
        assert_eq!(component_objects(&single).len(), 1);

        let list = json!([{"name": "a", "schema": {}}, {"name": "b", "schema": {}}]);
        assert_eq!(component_objects(&list).len(), 2);

        let export = json!({"components": [{"name": "a", "schema": {}}]});
        assert_eq!(component_objects(&export).len(), 1);
    }

    #[test]
    fn test_malformed_documents_are_skipped() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.json", r#"{"name": "a", "schema": {"t": {"type": "text"}}}"#);
        write(tmp.path(), "b.json", r#"{"name": "b", "schema": "#);
        write(tmp.path(), "c.json", r#"{"name": "c"}"#);
        write(tmp.path(), "notes.txt", "ignored");

        let mut report = RunReport::new();
        let loaded = load_components(tmp.path(), &mut report, &mut Sha256::new()).unwrap();

        let names: Vec<_> = loaded.components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a"]);
        assert_eq!(report.with_code(DiagnosticCode::SkippedDocument).count(), 1);
        assert_eq!(report.with_code(DiagnosticCode::SkippedComponent).count(), 1);
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "1.json", r#"{"name": "card", "schema": {"a": {"type": "text"}}}"#);
        write(tmp.path(), "2.json", r#"{"name": "card", "schema": {"b": {"type": "text"}}}"#);

        let mut report = RunReport::new();
        let loaded = load_components(tmp.path(), &mut report, &mut Sha256::new()).unwrap();

        assert_eq!(loaded.components.len(), 1);
        assert_eq!(loaded.components[0].fields[0].name, "a");
        assert_eq!(report.with_code(DiagnosticCode::DuplicateComponent).count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_link_is_reported() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.json", r#"{"name": "a", "schema": {}}"#);
        std::os::unix::fs::symlink(tmp.path().join("gone.json"), tmp.path().join("b.json")).unwrap();
        std::os::unix::fs::symlink(tmp.path().join("gone.txt"), tmp.path().join("notes.txt")).unwrap();

        let mut report = RunReport::new();
        let loaded = load_components(tmp.path(), &mut report, &mut Sha256::new()).unwrap();

        assert_eq!(loaded.components.len(), 1);
        let skipped: Vec<_> = report.with_code(DiagnosticCode::SkippedDocument).collect();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].subject, "b.json");
    }

    #[test]
    fn test_checksum_separates_name_and_content() {
        let checksum = |name: &str, content: &str| {
            let tmp = TempDir::new().unwrap();
            write(tmp.path(), name, content);
            let mut hasher = Sha256::new();
            load_components(tmp.path(), &mut RunReport::new(), &mut hasher).unwrap();
            Checksum::from_hasher(hasher)
        };
        // both spell "a.json.json{}" when name and content run together
        assert_ne!(checksum("a.json", ".json{}"), checksum("a.json.json", "{}"));
        assert_eq!(checksum("a.json", "{}"), checksum("a.json", "{}"));
    }

    #[test]
    fn test_missing_folder_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let mut report = RunReport::new();
        let result = load_components(&tmp.path().join("nope"), &mut report, &mut Sha256::new());
        assert!(matches!(result, Err(GenError::InvalidInput { .. })));
    }
}
