//! Writes generated artifacts into the output directories.
//!
//! Layout per namespace:
//! - `<api>/<namespace>/index.ts`
//! - `<typed>/<namespace>/dto.typed.ts`
//! - `<typed>/<namespace>/dto.value.ts`

use std::fs;
use std::path::{Path, PathBuf};

use apibuilder_common::OutputConfig;
use apibuilder_core::GeneratedArtifacts;
use tracing::{debug, info};

pub const API_FILENAME: &str = "index.ts";
pub const TYPES_FILENAME: &str = "dto.typed.ts";
pub const VALUES_FILENAME: &str = "dto.value.ts";

/// One file to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub contents: String,
}

/// Output roots, resolved against a base directory.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    api: PathBuf,
    typed: PathBuf,
    auto_mkdir: bool,
}

impl OutputLayout {
    /// Relative roots in `config` are taken relative to `base_dir`.
    pub fn new(config: &OutputConfig, base_dir: &Path) -> Self {
        Self {
            api: base_dir.join(&config.api),
            typed: base_dir.join(&config.typed),
            auto_mkdir: config.auto_mkdir,
        }
    }

    /// The three files of one namespace.
    pub fn files(&self, namespace: &str, artifacts: &GeneratedArtifacts) -> Vec<OutputFile> {
        let api_dir = self.api.join(namespace);
        let typed_dir = self.typed.join(namespace);
        vec![
            OutputFile {
                path: api_dir.join(API_FILENAME),
                contents: artifacts.api_module.clone(),
            },
            OutputFile {
                path: typed_dir.join(TYPES_FILENAME),
                contents: artifacts.dto_types.clone(),
            },
            OutputFile {
                path: typed_dir.join(VALUES_FILENAME),
                contents: artifacts.dto_values.clone(),
            },
        ]
    }

    /// Write every file, checking all target directories first.
    ///
    /// Nothing is written when a directory is missing and `auto_mkdir` is
    /// off.
    pub fn write_all(&self, files: &[OutputFile]) -> Result<(), String> {
        let mut dirs: Vec<&Path> = files.iter().filter_map(|f| f.path.parent()).collect();
        dirs.dedup();

        for dir in &dirs {
            if dir.is_dir() {
                continue;
            }
            if !self.auto_mkdir {
                return Err(format!(
                    "Output directory {} does not exist and auto_mkdir is off",
                    dir.display()
                ));
            }
        }
        for dir in &dirs {
            fs::create_dir_all(dir)
                .map_err(|err| format!("Failed to create {}: {err}", dir.display()))?;
        }

        for file in files {
            fs::write(&file.path, &file.contents)
                .map_err(|err| format!("Failed to write {}: {err}", file.path.display()))?;
            debug!(path = %file.path.display(), bytes = file.contents.len(), "Wrote file.");
        }
        info!(files = files.len(), "Output written.");
        Ok(())
    }
}
