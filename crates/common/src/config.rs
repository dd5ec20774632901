//! `apibuilder.toml` configuration.
//!
//! Every key is optional. A minimal config only names the document source:
//!
//! ```toml
//! source = "http://localhost:8080/doc.html"
//! namespace = "mall"
//!
//! [output]
//! api = "./src/api"
//! typed = "./src/typed"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Config file looked up from the working directory upwards.
pub const CONFIG_FILENAME: &str = "apibuilder.toml";

/// Environment variable overriding `source`.
pub const SOURCE_ENV: &str = "APIBUILDER_SOURCE";

const DEFAULT_API_DIR: &str = "./src/api";
const DEFAULT_TYPED_DIR: &str = "./src/typed";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Document URL, swagger UI URL, export project URL or local path
    pub source: Option<String>,
    /// Skip the run when `api.lock` exists next to the config
    pub use_lock: bool,
    /// Bearer token for API-management exports
    pub auth_token: Option<String>,
    /// Output subdirectory when no groups are configured
    pub namespace: Option<String>,
    /// Single swagger group to generate
    pub primary_name: Option<String>,
    /// Swagger groups to generate, each into its own namespace
    pub primary_names: Vec<PrimaryName>,
    /// Import lines of the function module
    pub api_imports: Vec<String>,
    /// Type import template with a `{}` placeholder
    pub api_type_import: Option<String>,
    pub output: OutputConfig,
    pub filter: FilterConfig,
    pub line_ending: LineEndingConfig,
}

/// A swagger group and the namespace it is generated into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimaryName {
    pub namespace: String,
    pub primary_name: String,
}

/// Output directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root of `<namespace>/index.ts`
    pub api: PathBuf,
    /// Root of `<namespace>/dto.typed.ts` and `<namespace>/dto.value.ts`
    pub typed: PathBuf,
    /// Create missing output directories
    pub auto_mkdir: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            api: PathBuf::from(DEFAULT_API_DIR),
            typed: PathBuf::from(DEFAULT_TYPED_DIR),
            auto_mkdir: true,
        }
    }
}

/// Declarative operation filter.
///
/// Patterns are regular expressions matched against the full operation URL.
/// Empty lists do not restrict anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub include_paths: Vec<String>,
    pub exclude_paths: Vec<String>,
    /// Lowercase HTTP methods to keep
    pub methods: Vec<String>,
    /// Keep operations carrying at least one of these tags
    pub tags: Vec<String>,
    pub include_deprecated: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            include_paths: Vec::new(),
            exclude_paths: Vec::new(),
            methods: Vec::new(),
            tags: Vec::new(),
            include_deprecated: true,
        }
    }
}

impl FilterConfig {
    /// True when the filter lets every operation through.
    pub fn is_empty(&self) -> bool {
        self.include_paths.is_empty()
            && self.exclude_paths.is_empty()
            && self.methods.is_empty()
            && self.tags.is_empty()
            && self.include_deprecated
    }
}

/// Line terminator of generated files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEndingConfig {
    /// Host convention
    #[default]
    Auto,
    Lf,
    Crlf,
}

impl BuilderConfig {
    /// Parse config text.
    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|err| format!("Failed to parse {CONFIG_FILENAME}: {err}"))
    }

    /// Read and parse a config file, then apply the environment override.
    pub fn load(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
        let mut config = Self::from_toml_str(&contents)?;
        config.apply_source_override(std::env::var(SOURCE_ENV).ok());
        debug!(path = %path.display(), source = ?config.source, "Loaded config.");
        Ok(config)
    }

    /// Find `apibuilder.toml` in `start` or any of its ancestors.
    pub fn discover(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .find(|candidate| candidate.is_file())
    }

    /// Replace `source` with a non-empty override.
    pub fn apply_source_override(&mut self, source: Option<String>) {
        if let Some(source) = source.filter(|s| !s.trim().is_empty()) {
            debug!(source = %source, "Source overridden from environment.");
            self.source = Some(source);
        }
    }

    /// Swagger groups to generate.
    ///
    /// `primary_names` wins; a lone `primary_name` is generated into a
    /// namespace of the same name. Empty when no group is configured.
    pub fn groups(&self) -> Vec<PrimaryName> {
        if !self.primary_names.is_empty() {
            return self.primary_names.clone();
        }
        self.primary_name
            .iter()
            .map(|name| PrimaryName {
                namespace: name.clone(),
                primary_name: name.clone(),
            })
            .collect()
    }
}
