//! Arguments and config handling shared by `generate` and `render`.

use std::path::{Path, PathBuf};

use apibuilder_common::{BuilderConfig, LineEndingConfig, SOURCE_ENV};
use apibuilder_core::{GenerateOptions, LineEnding};
use clap::{Args, ValueEnum};
use tracing::debug;

use crate::filter::ConfigFilter;

/// Line terminator flag values.
#[derive(ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
#[value(rename_all = "lower")]
pub enum LineEndingArg {
    /// Host convention
    Auto,
    Lf,
    Crlf,
}

impl From<LineEndingArg> for LineEndingConfig {
    fn from(arg: LineEndingArg) -> Self {
        match arg {
            LineEndingArg::Auto => LineEndingConfig::Auto,
            LineEndingArg::Lf => LineEndingConfig::Lf,
            LineEndingArg::Crlf => LineEndingConfig::Crlf,
        }
    }
}

/// Flags overriding `apibuilder.toml`.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Config file (default: apibuilder.toml in this or a parent directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Output namespace (subdirectory and type import path)
    #[arg(long, value_name = "NAME")]
    pub namespace: Option<String>,
    /// Root directory of the request function modules
    #[arg(long = "api-dir", value_name = "DIR")]
    pub api_dir: Option<PathBuf>,
    /// Root directory of the DTO modules
    #[arg(long = "typed-dir", value_name = "DIR")]
    pub typed_dir: Option<PathBuf>,
    /// Line terminator of generated files
    #[arg(long = "line-ending", value_enum)]
    pub line_ending: Option<LineEndingArg>,
}

/// A config together with the directory relative paths resolve against.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: BuilderConfig,
    pub base_dir: PathBuf,
}

impl ConfigArgs {
    /// Load the config file and apply the flag overrides.
    pub fn load(&self) -> Result<LoadedConfig, String> {
        let cwd = std::env::current_dir()
            .map_err(|err| format!("Failed to determine current directory: {err}"))?;
        let mut loaded = load_config(self.config.as_deref(), &cwd)?;
        self.apply(&mut loaded.config, &cwd);
        Ok(loaded)
    }

    fn apply(&self, config: &mut BuilderConfig, cwd: &Path) {
        if let Some(namespace) = &self.namespace {
            config.namespace = Some(namespace.clone());
        }
        if let Some(dir) = &self.api_dir {
            config.output.api = cwd.join(dir);
        }
        if let Some(dir) = &self.typed_dir {
            config.output.typed = cwd.join(dir);
        }
        if let Some(line_ending) = self.line_ending {
            config.line_ending = line_ending.into();
        }
    }
}

/// Load `explicit`, or the nearest `apibuilder.toml` above `cwd`, or the
/// defaults when there is none.
pub fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<LoadedConfig, String> {
    let path = match explicit {
        Some(path) => Some(cwd.join(path)),
        None => BuilderConfig::discover(cwd),
    };
    let Some(path) = path else {
        debug!(cwd = %cwd.display(), "No config file found; using defaults.");
        let mut config = BuilderConfig::default();
        config.apply_source_override(std::env::var(SOURCE_ENV).ok());
        return Ok(LoadedConfig {
            config,
            base_dir: cwd.to_path_buf(),
        });
    };

    let config = BuilderConfig::load(&path)?;
    let base_dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map_or_else(|| cwd.to_path_buf(), Path::to_path_buf);
    Ok(LoadedConfig { config, base_dir })
}

pub fn line_ending(config: LineEndingConfig) -> LineEnding {
    match config {
        LineEndingConfig::Auto => LineEnding::host(),
        LineEndingConfig::Lf => LineEnding::Lf,
        LineEndingConfig::Crlf => LineEnding::CrLf,
    }
}

/// Generator options for one namespace.
pub fn generate_options(config: &BuilderConfig, namespace: &str) -> Result<GenerateOptions, String> {
    let mut options = GenerateOptions::default()
        .with_api_imports(config.api_imports.clone())
        .with_line_ending(line_ending(config.line_ending));
    if !namespace.is_empty() {
        options = options.with_namespace(namespace);
    }
    if let Some(template) = &config.api_type_import {
        options = options.with_api_type_import(template.clone());
    }
    if !config.filter.is_empty() {
        options = options.with_filter(ConfigFilter::from_config(&config.filter)?);
    }
    Ok(options)
}
