//! Definition file schema.
//!
//! A project directory holds a `project.toml`; each module directory it lists
//! holds a `module.toml`; an external project directory holds an
//! `external.toml`. These types mirror the files one-to-one and are turned
//! into the [`model`](crate::model) by the [`TomlLoader`](crate::loader::TomlLoader).
//!
//! ```toml
//! # project.toml
//! name = "Engine"
//! condition_keys = ["InstallAlways"]
//! install_dir = "install"
//!
//! [modules]
//! public = ["source/Core", "source/Render"]
//!
//! [dependencies]
//! public = [{ project = "Base", path = "../Base" }]
//!
//! [[build_mode]]
//! name = "Debug"
//! keys = ["InstallAlways", "Debug"]
//! ```

use crate::error::{GenError, GenResult};
use crate::generator::BuildMode;
use crate::model::Scoped;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

pub const PROJECT_FILE: &str = "project.toml";
pub const MODULE_FILE: &str = "module.toml";
pub const EXTERNAL_FILE: &str = "external.toml";

#[derive(Deserialize, Debug, Default)]
pub struct ProjectConfig {
    pub name: Option<String>,
    #[serde(default)]
    pub condition_keys: Vec<String>,
    pub binaries_dir: Option<PathBuf>,
    pub archive_dir: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub install_dir: Option<PathBuf>,
    #[serde(default = "default_should_install")]
    pub should_install: bool,
    pub cxx_standard: Option<u32>,
    #[serde(default)]
    pub macros: Scoped<String>,
    /// Module directories, relative to the project directory
    #[serde(default)]
    pub modules: Scoped<PathBuf>,
    #[serde(default)]
    pub dependencies: Scoped<ProjectDependencyConfig>,
    #[serde(default)]
    pub external: Scoped<ProjectDependencyConfig>,
    #[serde(default)]
    pub sub_projects: Vec<PathBuf>,
    #[serde(default, rename = "build_mode")]
    pub build_modes: Vec<BuildMode>,
}

/// A project-level edge. With `path` the target is loaded from that
/// directory; without it the target must already be registered by name.
#[derive(Deserialize, Debug, Clone)]
pub struct ProjectDependencyConfig {
    pub project: String,
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub required_keys: Vec<String>,
    #[serde(default = "default_relative")]
    pub relative: bool,
}

#[derive(Deserialize, Debug, Default)]
pub struct ModuleConfig {
    pub name: Option<String>,
    /// Checked by the loader with `LibraryKind::parse`
    pub kind: Option<String>,
    #[serde(default)]
    pub condition_keys: Vec<String>,
    /// Files, directories or glob patterns, relative to the module directory
    #[serde(default)]
    pub sources: Scoped<String>,
    #[serde(default)]
    pub includes: Scoped<PathBuf>,
    #[serde(default)]
    pub macros: Scoped<String>,
    #[serde(default)]
    pub dependencies: Scoped<ModuleDependencyConfig>,
    #[serde(default)]
    pub external: Scoped<ModuleDependencyConfig>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ModuleDependencyConfig {
    pub project: String,
    pub module: String,
    #[serde(default)]
    pub required_keys: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ExternalProjectConfig {
    pub name: Option<String>,
    /// `package` when omitted
    pub kind: Option<String>,
    pub package_name: Option<String>,
    #[serde(default)]
    pub condition_keys: Vec<String>,
    pub install_dir: Option<PathBuf>,
    #[serde(default, rename = "module")]
    pub modules: Vec<ExternalModuleConfig>,
}

#[derive(Deserialize, Debug)]
pub struct ExternalModuleConfig {
    pub name: String,
    pub library_name: Option<String>,
    pub kind: Option<String>,
    #[serde(default)]
    pub condition_keys: Vec<String>,
    #[serde(default)]
    pub use_absolute_name: bool,
}

fn default_should_install() -> bool {
    true
}

fn default_relative() -> bool {
    true
}

/// Reads and parses a definition file.
pub fn read_definition<T: DeserializeOwned>(path: &Path) -> GenResult<T> {
    let content = fs::read_to_string(path).map_err(|e| GenError::Load {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_definition(path, &content)
}

/// Parses definition text; `path` is only used for error reporting.
pub fn parse_definition<T: DeserializeOwned>(path: &Path, content: &str) -> GenResult<T> {
    toml::from_str(content).map_err(|e| GenError::Load {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
