//! Run inputs
//!
//! Validates the configured paths for one space and reads everything a run
//! needs. Path problems are fatal; problems inside individual component
//! documents only land in the report.

use sha2::{Digest, Sha256};
use std::fs;

use crate::checksum::Checksum;
use crate::component::loader::load_components;
use crate::component::Component;
use crate::config::GenConfig;
use crate::error::{GenError, Result};
use crate::interfaces::{extract_interfaces, InterfaceDef};
use crate::report::RunReport;

/// Everything one generation run reads
#[derive(Debug)]
pub struct Inputs {
    pub components: Vec<Component>,
    pub definitions: Vec<InterfaceDef>,
    /// Checksum over component documents and the types file
    pub checksum: Checksum,
    /// Diagnostics raised while loading
    pub report: RunReport,
}

impl Inputs {
    /// Inputs assembled in memory
    pub fn new(components: Vec<Component>, definitions: Vec<InterfaceDef>, checksum: Checksum) -> Self {
        Self {
            components,
            definitions,
            checksum,
            report: RunReport::new(),
        }
    }
}

/// Validate paths and load the components of `space` plus the types file
pub fn load_inputs(config: &GenConfig, space: &str) -> Result<Inputs> {
    let root = &config.input.root;
    if space.trim().is_empty() {
        return Err(GenError::invalid(root.join(&config.input.components_dir), "space id must not be empty"));
    }
    if !root.exists() {
        return Err(GenError::invalid(root, "input root does not exist"));
    }
    if !root.is_dir() {
        return Err(GenError::invalid(root, "input root is not a directory"));
    }

    let components_dir = config.components_path(space);
    let types_path = config.types_path();
    if !types_path.exists() {
        return Err(GenError::invalid(&types_path, "types file does not exist"));
    }
    if !types_path.is_file() {
        return Err(GenError::invalid(&types_path, "types file is not a file"));
    }
    let types = fs::read_to_string(&types_path).map_err(|e| GenError::io(&types_path, e))?;
    if types.trim().is_empty() {
        return Err(GenError::EmptyFile(types_path));
    }

    let mut report = RunReport::new();
    let mut hasher = Sha256::new();
    let loaded = load_components(&components_dir, &mut report, &mut hasher)?;
    Checksum::update_field(&mut hasher, b"types");
    Checksum::update_field(&mut hasher, types.as_bytes());

    let definitions = extract_interfaces(&types)?;
    tracing::info!(
        space,
        documents = loaded.document_count,
        components = loaded.components.len(),
        definitions = definitions.len(),
        "loaded inputs"
    );

    Ok(Inputs {
        components: loaded.components,
        definitions,
        checksum: Checksum::from_hasher(hasher),
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn config_for(root: &Path) -> GenConfig {
        let mut config = GenConfig::default();
        config.input.root = root.to_path_buf();
        config
    }

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(
            &dir.path().join("components/123/card.json"),
            r#"{"name": "card", "schema": {"title": {"type": "text"}}}"#,
        );
        write(&dir.path().join("types/storyblok.d.ts"), "export interface StoryblokAsset { id: number }");
        dir
    }

    #[test]
    fn test_loads_valid_tree() {
        let dir = tree();
        let inputs = load_inputs(&config_for(dir.path()), "123").unwrap();
        assert_eq!(inputs.components.len(), 1);
        assert_eq!(inputs.definitions.len(), 1);
        assert!(inputs.report.is_empty());

        let again = load_inputs(&config_for(dir.path()), "123").unwrap();
        assert_eq!(inputs.checksum, again.checksum);
    }

    #[test]
    fn test_checksum_tracks_types_file() {
        let dir = tree();
        let before = load_inputs(&config_for(dir.path()), "123").unwrap().checksum;
        write(&dir.path().join("types/storyblok.d.ts"), "export interface StoryblokAsset { id: string }");
        let after = load_inputs(&config_for(dir.path()), "123").unwrap().checksum;
        assert_ne!(before, after);
    }

    #[test]
    fn test_fatal_path_errors() {
        let dir = tree();
        let config = config_for(dir.path());

        assert!(matches!(load_inputs(&config, " "), Err(GenError::InvalidInput { .. })));
        assert!(matches!(load_inputs(&config, "999"), Err(GenError::InvalidInput { .. })));
        assert!(matches!(
            load_inputs(&config_for(&dir.path().join("missing")), "123"),
            Err(GenError::InvalidInput { .. })
        ));

        write(&dir.path().join("types/storyblok.d.ts"), "  \n");
        assert!(matches!(load_inputs(&config, "123"), Err(GenError::EmptyFile(_))));

        fs::remove_file(dir.path().join("types/storyblok.d.ts")).unwrap();
        assert!(matches!(load_inputs(&config, "123"), Err(GenError::InvalidInput { .. })));
    }
}
