use crate::error::{GenError, GenResult};
use crate::keys::KeySet;
use std::path::{Path, PathBuf};

use super::{
    Definition, ExternalProjectId, LibraryKind, ProjectKind, require_absolute, require_name,
    to_abs_path,
};

/// A prebuilt or independently built library exposed by an external project.
#[derive(Debug, Clone)]
pub struct ExternalModule {
    name: String,
    path: PathBuf,
    condition_keys: KeySet,
    library_name: String,
    kind: LibraryKind,
    use_absolute_name: bool,
    owner: Option<ExternalProjectId>,
}

impl ExternalModule {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        kind: LibraryKind,
    ) -> GenResult<Self> {
        let name = require_name("external module", name.into())?;
        let path = require_absolute("external module", &name, path.into())?;
        Ok(Self {
            library_name: name.clone(),
            name,
            path,
            condition_keys: KeySet::always(),
            kind,
            use_absolute_name: false,
            owner: None,
        })
    }

    pub fn with_condition_keys(mut self, keys: KeySet) -> Self {
        self.condition_keys = keys.non_empty();
        self
    }

    /// Name of the linkable target, when it differs from the logical name.
    pub fn with_library_name(mut self, library_name: impl Into<String>) -> Self {
        self.library_name = library_name.into();
        self
    }

    /// Link against the bare library name instead of `<Project>::<library>`.
    pub fn with_absolute_name(mut self) -> Self {
        self.use_absolute_name = true;
        self
    }

    pub fn library_name(&self) -> &str {
        &self.library_name
    }

    pub fn kind(&self) -> LibraryKind {
        self.kind
    }

    pub fn use_absolute_name(&self) -> bool {
        self.use_absolute_name
    }

    pub fn owner(&self) -> Option<ExternalProjectId> {
        self.owner
    }

    pub(crate) fn attach_owner(&mut self, owner: ExternalProjectId) -> GenResult<()> {
        match self.owner {
            Some(current) if current != owner => Err(GenError::config(format!(
                "external module '{}' already belongs to another project and cannot be re-owned",
                self.name
            ))),
            _ => {
                self.owner = Some(owner);
                Ok(())
            }
        }
    }
}

impl Definition for ExternalModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn condition_keys(&self) -> &KeySet {
        &self.condition_keys
    }
}

/// A dependency that this system does not build itself.
#[derive(Debug, Clone)]
pub struct ExternalProject {
    name: String,
    path: PathBuf,
    kind: ProjectKind,
    package_name: String,
    condition_keys: KeySet,
    install_dir: PathBuf,
    modules: Vec<ExternalModule>,
}

impl ExternalProject {
    /// `install_dir` is resolved against `path` when relative.
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        install_dir: impl AsRef<Path>,
    ) -> GenResult<Self> {
        let name = require_name("external project", name.into())?;
        let path = require_absolute("external project", &name, path.into())?;
        if install_dir.as_ref().as_os_str().is_empty() {
            return Err(GenError::MissingField {
                entity: format!("external project '{name}'"),
                field: "install_dir",
            });
        }
        Ok(Self {
            install_dir: to_abs_path(&path, install_dir),
            package_name: name.clone(),
            name,
            path,
            kind: ProjectKind::Package,
            condition_keys: KeySet::always(),
            modules: Vec::new(),
        })
    }

    pub fn with_kind(mut self, kind: ProjectKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_package_name(mut self, package_name: impl Into<String>) -> Self {
        self.package_name = package_name.into();
        self
    }

    pub fn with_condition_keys(mut self, keys: KeySet) -> Self {
        self.condition_keys = keys.non_empty();
        self
    }

    pub fn with_module(mut self, module: ExternalModule) -> Self {
        self.modules.push(module);
        self
    }

    pub fn kind(&self) -> ProjectKind {
        self.kind
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    pub fn modules(&self) -> &[ExternalModule] {
        &self.modules
    }

    pub fn find_module(&self, name: &str) -> Option<usize> {
        self.modules.iter().position(|m| m.name() == name)
    }

    pub(crate) fn modules_mut(&mut self) -> &mut [ExternalModule] {
        &mut self.modules
    }
}

impl Definition for ExternalProject {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn condition_keys(&self) -> &KeySet {
        &self.condition_keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_name_defaults_to_logical_name() {
        let module = ExternalModule::new("fmt", "/deps/fmt", LibraryKind::StaticLibrary).unwrap();
        assert_eq!(module.library_name(), "fmt");
        assert!(!module.use_absolute_name());

        let module = module.with_library_name("fmt-header-only");
        assert_eq!(module.library_name(), "fmt-header-only");
    }

    #[test]
    fn test_external_project_defaults() {
        let project = ExternalProject::new("fmt", "/deps/fmt", "out/install").unwrap();
        assert_eq!(project.kind(), ProjectKind::Package);
        assert_eq!(project.package_name(), "fmt");
        assert_eq!(project.install_dir(), Path::new("/deps/fmt/out/install"));
    }

    #[test]
    fn test_external_project_requires_install_dir() {
        assert!(matches!(
            ExternalProject::new("fmt", "/deps/fmt", ""),
            Err(GenError::MissingField {
                field: "install_dir",
                ..
            })
        ));
    }
}
