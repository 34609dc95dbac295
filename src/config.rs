//! Configuration module for the documentation model.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `DG_` and use double underscores
//! to separate nested levels:
//! - `DG_EXTRACTION__EXTRACT_PRIVATE=true` sets `extraction.extract_private`
//! - `DG_OUTPUT__INLINE_INHERITED_MEMBER=true` sets `output.inline_inherited_member`
//! - `DG_ANALYSIS__MAX_INHERITANCE_DEPTH=0` disables the depth guard
//!
//! # Option facade
//!
//! The model never reads `Settings` directly. It consults a [`ConfigFacade`]
//! using dashed option names (`extract-private`, `inline-inherited-member`, ...)
//! and snapshots the answers into [`ModelOptions`] once.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Directory that marks a docgraph workspace.
pub const CONFIG_DIR: &str = ".docgraph";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Which declarations are extracted into the model
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Output-facing toggles that influence the model layout
    #[serde(default)]
    pub output: OutputConfig,

    /// Graph traversal limits
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Logging configuration for the binary
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ExtractionConfig {
    /// Include private members and private base classes
    #[serde(default)]
    pub extract_private: bool,

    /// Include package-scoped members (Java, C#)
    #[serde(default)]
    pub extract_package: bool,

    /// Include file-static entities and members
    #[serde(default)]
    pub extract_static: bool,

    /// Include classes declared in source (not header) files
    #[serde(default = "default_true")]
    pub extract_local_classes: bool,

    /// Include methods declared in implementation sections (ObjC)
    #[serde(default)]
    pub extract_local_methods: bool,

    #[serde(default)]
    pub hide_undoc_classes: bool,

    #[serde(default)]
    pub hide_undoc_members: bool,

    /// Keep friend class declarations out of the friends list
    #[serde(default)]
    pub hide_friend_compounds: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OutputConfig {
    /// Copy inherited members into the derived class' own lists
    #[serde(default)]
    pub inline_inherited_member: bool,

    #[serde(default)]
    pub allow_sub_grouping: bool,

    /// Treat plain data structs as simple (documented inline)
    #[serde(default)]
    pub inline_simple_struct: bool,

    /// Keep upper-case letters in generated file names
    #[serde(default)]
    pub case_sensitive_fname: bool,

    #[serde(default = "default_html_file_extension")]
    pub html_file_extension: String,

    /// Show external classes in hierarchies
    #[serde(default)]
    pub all_externals: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AnalysisConfig {
    /// Depth at which base/derived traversals give up. 0 disables the bound.
    #[serde(default = "default_max_inheritance_depth")]
    pub max_inheritance_depth: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines instead of human-readable ones
    #[serde(default)]
    pub json: bool,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_true() -> bool {
    true
}
fn default_html_file_extension() -> String {
    ".html".to_string()
}
fn default_max_inheritance_depth() -> usize {
    256
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            extraction: ExtractionConfig {
                extract_local_classes: true,
                ..ExtractionConfig::default()
            },
            output: OutputConfig::default(),
            analysis: AnalysisConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            inline_inherited_member: false,
            allow_sub_grouping: false,
            inline_simple_struct: false,
            case_sensitive_fname: false,
            html_file_extension: default_html_file_extension(),
            all_externals: false,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_inheritance_depth: default_max_inheritance_depth(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));
        Self::load_from(config_path)
    }

    /// Load configuration from a specific file, still honouring `DG_` overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            // Double underscore separates nested levels, single underscore stays in field names
            .merge(Env::prefixed("DG_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Find `.docgraph/settings.toml` searching from the current directory up to root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(CONFIG_DIR);
            if config_dir.is_dir() {
                return Some(config_dir.join("settings.toml"));
            }
        }

        None
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file with helpful comments
    pub fn init_config_file(
        dir: impl AsRef<Path>,
        force: bool,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = dir.as_ref().join(CONFIG_DIR).join("settings.toml");

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = r#"# docgraph configuration file

# Version of the configuration schema
version = 1

[extraction]
# Document private members and private base classes
extract_private = false
# Document package-scoped members (Java, C#)
extract_package = false
# Document file-static entities
extract_static = false
# Document classes declared in source files
extract_local_classes = true
# Document methods from implementation sections (Objective-C)
extract_local_methods = false
hide_undoc_classes = false
hide_undoc_members = false
# Drop friend class declarations from the friends list
hide_friend_compounds = false

[output]
# Copy inherited members into the derived class' own member lists
inline_inherited_member = false
allow_sub_grouping = false
inline_simple_struct = false
case_sensitive_fname = false
html_file_extension = ".html"
# Show external classes in hierarchies
all_externals = false

[analysis]
# Base/derived traversals deeper than this are treated as cycles.
# Set to 0 to rely on cycle detection only.
max_inheritance_depth = 256

[logging]
# Default filter when RUST_LOG is not set
level = "warn"
json = false
"#;

        std::fs::write(&config_path, template)?;
        Ok(config_path)
    }
}

/// Boolean and string option lookup by dashed option name.
pub trait ConfigFacade {
    fn get_bool(&self, name: &str) -> Option<bool>;

    fn get_string(&self, name: &str) -> Option<String>;

    fn get_usize(&self, name: &str) -> Option<usize> {
        self.get_string(name).and_then(|s| s.parse().ok())
    }
}

impl ConfigFacade for Settings {
    fn get_bool(&self, name: &str) -> Option<bool> {
        let ex = &self.extraction;
        let out = &self.output;
        let value = match name {
            "extract-private" => ex.extract_private,
            "extract-package" => ex.extract_package,
            "extract-static" => ex.extract_static,
            "extract-local-classes" => ex.extract_local_classes,
            "extract-local-methods" => ex.extract_local_methods,
            "hide-undoc-classes" => ex.hide_undoc_classes,
            "hide-undoc-members" => ex.hide_undoc_members,
            "hide-friend-compounds" => ex.hide_friend_compounds,
            "inline-inherited-member" => out.inline_inherited_member,
            "allow-sub-grouping" => out.allow_sub_grouping,
            "inline-simple-struct" => out.inline_simple_struct,
            "case-sensitive-fname" => out.case_sensitive_fname,
            "all-externals" => out.all_externals,
            _ => return None,
        };
        Some(value)
    }

    fn get_string(&self, name: &str) -> Option<String> {
        match name {
            "html-file-extension" => Some(self.output.html_file_extension.clone()),
            "max-inheritance-depth" => Some(self.analysis.max_inheritance_depth.to_string()),
            "log-level" => Some(self.logging.level.clone()),
            _ => None,
        }
    }
}

/// Map-backed facade, handy for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MapConfig {
    values: HashMap<String, String>,
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl ToString) -> Self {
        self.values.insert(name.to_string(), value.to_string());
        self
    }
}

impl ConfigFacade for MapConfig {
    fn get_bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name)?.as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }

    fn get_string(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

/// Toggles the model consults, captured once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOptions {
    pub extract_private: bool,
    pub extract_package: bool,
    pub extract_static: bool,
    pub extract_local_classes: bool,
    pub extract_local_methods: bool,
    pub hide_undoc_classes: bool,
    pub hide_undoc_members: bool,
    pub hide_friend_compounds: bool,
    pub inline_inherited_member: bool,
    pub allow_sub_grouping: bool,
    pub inline_simple_struct: bool,
    pub case_sensitive_fname: bool,
    pub all_externals: bool,
    pub html_file_extension: String,
    /// 0 means unbounded
    pub max_inheritance_depth: usize,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self::from_facade(&Settings::default())
    }
}

impl ModelOptions {
    pub fn from_facade(config: &dyn ConfigFacade) -> Self {
        let flag = |name: &str, default: bool| config.get_bool(name).unwrap_or(default);

        Self {
            extract_private: flag("extract-private", false),
            extract_package: flag("extract-package", false),
            extract_static: flag("extract-static", false),
            extract_local_classes: flag("extract-local-classes", true),
            extract_local_methods: flag("extract-local-methods", false),
            hide_undoc_classes: flag("hide-undoc-classes", false),
            hide_undoc_members: flag("hide-undoc-members", false),
            hide_friend_compounds: flag("hide-friend-compounds", false),
            inline_inherited_member: flag("inline-inherited-member", false),
            allow_sub_grouping: flag("allow-sub-grouping", false),
            inline_simple_struct: flag("inline-simple-struct", false),
            case_sensitive_fname: flag("case-sensitive-fname", false),
            all_externals: flag("all-externals", false),
            html_file_extension: config
                .get_string("html-file-extension")
                .unwrap_or_else(default_html_file_extension),
            max_inheritance_depth: config
                .get_usize("max-inheritance-depth")
                .unwrap_or_else(default_max_inheritance_depth),
        }
    }
}
