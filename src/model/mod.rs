//! Definition model.
//!
//! Value types for projects, modules, external projects and the dependency
//! edges between them. Definitions are produced by a
//! [`DefinitionLoader`](crate::loader::DefinitionLoader), handed to the
//! [`Registry`](crate::registry::Registry), and are read-only once registered.
//!
//! Projects own their modules; a module refers back to its owner through a
//! [`ProjectId`] into the registry's arena, never through a pointer.

mod dependency;
mod external;
mod kind;
mod module;
mod project;

pub use dependency::{
    ExternalModuleDependency, ExternalProjectDependency, ModuleDependency, ModuleLink, ModuleRef,
    ProjectDependency, ProjectLink, ProjectRef,
};
pub use external::{ExternalModule, ExternalProject};
pub use kind::{LibraryKind, ProjectKind, Visibility};
pub use module::Module;
pub use project::Project;

use crate::error::{GenError, GenResult};
use crate::keys::KeySet;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Characters CMake accepts in a target or package name.
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.+-]+$").unwrap());

/// Accessors shared by every kind of definition.
pub trait Definition {
    fn name(&self) -> &str;
    fn path(&self) -> &Path;
    fn condition_keys(&self) -> &KeySet;
}

/// Index of a registered project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectId(pub(crate) usize);

/// Index of a registered external project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExternalProjectId(pub(crate) usize);

/// A module addressed through its owning project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId {
    pub project: ProjectId,
    pub visibility: Visibility,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExternalModuleId {
    pub project: ExternalProjectId,
    pub index: usize,
}

/// A pair of public and private lists.
///
/// Deserializes from a `{ public = [...], private = [...] }` table where both
/// keys are optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Scoped<T> {
    pub public: Vec<T>,
    pub private: Vec<T>,
}

impl<T> Default for Scoped<T> {
    fn default() -> Self {
        Self {
            public: Vec::new(),
            private: Vec::new(),
        }
    }
}

impl<T> Scoped<T> {
    pub fn get(&self, visibility: Visibility) -> &[T] {
        match visibility {
            Visibility::Public => &self.public,
            Visibility::Private => &self.private,
        }
    }

    pub fn get_mut(&mut self, visibility: Visibility) -> &mut Vec<T> {
        match visibility {
            Visibility::Public => &mut self.public,
            Visibility::Private => &mut self.private,
        }
    }

    /// Public entries first, then private ones.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.public.iter().chain(self.private.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.public.iter_mut().chain(self.private.iter_mut())
    }

    pub fn is_empty(&self) -> bool {
        self.public.is_empty() && self.private.is_empty()
    }
}

/// Resolves `path` against `base` unless it is already absolute.
pub fn to_abs_path(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

pub(crate) fn require_name(entity: &str, name: String) -> GenResult<String> {
    if name.trim().is_empty() {
        return Err(GenError::MissingField {
            entity: entity.to_string(),
            field: "name",
        });
    }
    if !NAME_PATTERN.is_match(&name) {
        return Err(GenError::config(format!(
            "{entity} name '{name}' is not a valid CMake target name"
        )));
    }
    Ok(name)
}

pub(crate) fn require_absolute(entity: &str, name: &str, path: PathBuf) -> GenResult<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(GenError::MissingField {
            entity: format!("{entity} '{name}'"),
            field: "path",
        });
    }
    if !path.is_absolute() {
        return Err(GenError::InvalidPath {
            entity: format!("{entity} '{name}'"),
            path,
        });
    }
    Ok(path)
}
