//! Configuration management for the generator
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (storyblok-zod.toml)
//! - Environment variables (STORYBLOK_ZOD__*)
//!
//! Command-line flags are applied on top by the binary.
//!
//! ## Example config file (storyblok-zod.toml):
//! ```toml
//! [input]
//! root = ".storyblok"
//! components_dir = "components"
//! types_file = "types/storyblok.d.ts"
//!
//! [output]
//! path = "src/schemas/storyblok.zod.ts"
//!
//! [codegen]
//! array_extension_bypass = true
//! story_interface = "StoryblokStory"
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for a generation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenConfig {
    /// Where the fetched CMS data lives
    #[serde(default)]
    pub input: InputConfig,

    /// Where the generated document goes
    #[serde(default)]
    pub output: OutputConfig,

    /// Code generation switches
    #[serde(default)]
    pub codegen: CodegenConfig,
}

/// Input locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Root folder holding the fetched components and types
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Folder (relative to root) containing one subfolder per space
    #[serde(default = "default_components_dir")]
    pub components_dir: PathBuf,

    /// Interface-definitions file (relative to root unless absolute)
    #[serde(default = "default_types_file")]
    pub types_file: PathBuf,
}

/// Output settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Destination file; stdout when absent
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Extra comment lines appended to the fixed header
    #[serde(default)]
    pub header: Option<String>,
}

/// Code generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodegenConfig {
    /// Emit `z.array(T)` directly for empty interfaces extending an array type
    #[serde(default = "default_true")]
    pub array_extension_bypass: bool,

    /// Emit `<name>StorySchema` wrappers when the story interface is present
    #[serde(default = "default_true")]
    pub story_wrappers: bool,

    /// Interface whose presence enables story wrappers
    #[serde(default = "default_story_interface")]
    pub story_interface: String,

    /// Symbol referenced by `asset` fields
    #[serde(default = "default_asset_symbol")]
    pub asset_symbol: String,

    /// Symbol referenced by `multilink` fields
    #[serde(default = "default_multilink_symbol")]
    pub multilink_symbol: String,

    /// Symbol referenced by `richtext` fields
    #[serde(default = "default_richtext_symbol")]
    pub richtext_symbol: String,
}

// Default value functions
fn default_root() -> PathBuf {
    PathBuf::from(".storyblok")
}

fn default_components_dir() -> PathBuf {
    PathBuf::from("components")
}

fn default_types_file() -> PathBuf {
    PathBuf::from("types/storyblok.d.ts")
}

fn default_true() -> bool {
    true
}

fn default_story_interface() -> String {
    "StoryblokStory".to_string()
}

fn default_asset_symbol() -> String {
    "storyblokAssetSchema".to_string()
}

fn default_multilink_symbol() -> String {
    "storyblokMultilinkSchema".to_string()
}

fn default_richtext_symbol() -> String {
    "storyblokRichtextSchema".to_string()
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            components_dir: default_components_dir(),
            types_file: default_types_file(),
        }
    }
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            array_extension_bypass: true,
            story_wrappers: true,
            story_interface: default_story_interface(),
            asset_symbol: default_asset_symbol(),
            multilink_symbol: default_multilink_symbol(),
            richtext_symbol: default_richtext_symbol(),
        }
    }
}

impl GenConfig {
    /// Load configuration, layering an explicit file over the default locations
    pub fn load_from(config_path: Option<&Path>) -> crate::error::Result<Self> {
        let mut builder = Config::builder();

        for location in ["storyblok-zod.toml", ".storyblok-zod.toml"] {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(dirs) = directories::ProjectDirs::from("dev", "storyblok-zod", "storyblok-zod") {
            let xdg_config = dirs.config_dir().join("config.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("STORYBLOK_ZOD")
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Folder holding the component documents of one space
    pub fn components_path(&self, space: &str) -> PathBuf {
        self.input.root.join(&self.input.components_dir).join(space)
    }

    /// Resolved interface-definitions file
    pub fn types_path(&self) -> PathBuf {
        if self.input.types_file.is_absolute() {
            self.input.types_file.clone()
        } else {
            self.input.root.join(&self.input.types_file)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GenConfig::default();
        assert!(config.codegen.array_extension_bypass);
        assert_eq!(config.codegen.story_interface, "StoryblokStory");
        assert!(config.output.path.is_none());
    }

    #[test]
    fn test_paths_resolve_against_root() {
        let mut config = GenConfig::default();
        config.input.root = PathBuf::from("/data/cms");
        assert_eq!(config.components_path("12345"), PathBuf::from("/data/cms/components/12345"));
        assert_eq!(config.types_path(), PathBuf::from("/data/cms/types/storyblok.d.ts"));

        config.input.types_file = PathBuf::from("/elsewhere/types.d.ts");
        assert_eq!(config.types_path(), PathBuf::from("/elsewhere/types.d.ts"));
    }

    #[test]
    fn test_explicit_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("gen.toml");
        std::fs::write(&path, "[codegen]\nstory_wrappers = false\n").unwrap();
        let config = GenConfig::load_from(Some(&path)).unwrap();
        assert!(!config.codegen.story_wrappers);

        let missing = GenConfig::load_from(Some(&dir.path().join("missing.toml")));
        assert!(matches!(missing, Err(crate::error::GenError::Config(_))));
    }

    #[test]
    fn test_serialize_config() {
        let toml_str = GenConfig::default().to_toml().unwrap();
        assert!(toml_str.contains("[input]"));
        assert!(toml_str.contains("[codegen]"));
    }
}
