use crate::error::{GenError, GenResult};
use crate::keys::KeySet;
use std::path::{Path, PathBuf};

use super::{
    Definition, ExternalModuleDependency, LibraryKind, ModuleDependency, ProjectId, Scoped,
    Visibility, require_absolute, require_name, to_abs_path,
};

/// A buildable unit owned by exactly one project.
///
/// Source and include entries are concrete paths; pattern expansion happens in
/// the loader before a module is constructed. Relative entries are resolved
/// against the module directory.
#[derive(Debug, Clone)]
pub struct Module {
    name: String,
    path: PathBuf,
    condition_keys: KeySet,
    kind: LibraryKind,
    sources: Scoped<PathBuf>,
    includes: Scoped<PathBuf>,
    macros: Scoped<String>,
    dependencies: Scoped<ModuleDependency>,
    external_dependencies: Scoped<ExternalModuleDependency>,
    owner: Option<ProjectId>,
}

impl Module {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        kind: LibraryKind,
    ) -> GenResult<Self> {
        let name = require_name("module", name.into())?;
        let path = require_absolute("module", &name, path.into())?;
        Ok(Self {
            name,
            path,
            condition_keys: KeySet::always(),
            kind,
            sources: Scoped::default(),
            includes: Scoped::default(),
            macros: Scoped::default(),
            dependencies: Scoped::default(),
            external_dependencies: Scoped::default(),
            owner: None,
        })
    }

    pub fn with_condition_keys(mut self, keys: KeySet) -> Self {
        self.condition_keys = keys.non_empty();
        self
    }

    pub fn with_sources<I, P>(mut self, visibility: Visibility, sources: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let resolved = sources.into_iter().map(|s| to_abs_path(&self.path, s));
        self.sources.get_mut(visibility).extend(resolved);
        self
    }

    pub fn with_includes<I, P>(mut self, visibility: Visibility, includes: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let resolved = includes.into_iter().map(|s| to_abs_path(&self.path, s));
        self.includes.get_mut(visibility).extend(resolved);
        self
    }

    pub fn with_macros<I, S>(mut self, visibility: Visibility, macros: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.macros
            .get_mut(visibility)
            .extend(macros.into_iter().map(Into::into));
        self
    }

    pub fn depends_on(mut self, visibility: Visibility, dependency: ModuleDependency) -> Self {
        self.dependencies.get_mut(visibility).push(dependency);
        self
    }

    pub fn depends_on_external(
        mut self,
        visibility: Visibility,
        dependency: ExternalModuleDependency,
    ) -> Self {
        self.external_dependencies
            .get_mut(visibility)
            .push(dependency);
        self
    }

    pub fn kind(&self) -> LibraryKind {
        self.kind
    }

    pub fn sources(&self, visibility: Visibility) -> &[PathBuf] {
        self.sources.get(visibility)
    }

    pub fn includes(&self, visibility: Visibility) -> &[PathBuf] {
        self.includes.get(visibility)
    }

    pub fn macros(&self, visibility: Visibility) -> &[String] {
        self.macros.get(visibility)
    }

    pub fn dependencies(&self) -> &Scoped<ModuleDependency> {
        &self.dependencies
    }

    pub fn external_dependencies(&self) -> &Scoped<ExternalModuleDependency> {
        &self.external_dependencies
    }

    pub(crate) fn dependencies_mut(&mut self) -> &mut Scoped<ModuleDependency> {
        &mut self.dependencies
    }

    pub(crate) fn external_dependencies_mut(&mut self) -> &mut Scoped<ExternalModuleDependency> {
        &mut self.external_dependencies
    }

    pub fn owner(&self) -> Option<ProjectId> {
        self.owner
    }

    /// Sets the owner back-reference. Assigning a different owner later is an error.
    pub(crate) fn attach_owner(&mut self, owner: ProjectId) -> GenResult<()> {
        match self.owner {
            Some(current) if current != owner => Err(GenError::config(format!(
                "module '{}' already belongs to another project and cannot be re-owned",
                self.name
            ))),
            _ => {
                self.owner = Some(owner);
                Ok(())
            }
        }
    }
}

impl Definition for Module {
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
    fn test_new_requires_name_and_absolute_path() {
        assert!(matches!(
            Module::new("", "/work/Core", LibraryKind::StaticLibrary),
            Err(GenError::MissingField { field: "name", .. })
        ));
        assert!(matches!(
            Module::new("Core", "Core", LibraryKind::StaticLibrary),
            Err(GenError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_relative_entries_resolve_against_module_dir() {
        let module = Module::new("Core", "/work/Engine/Core", LibraryKind::StaticLibrary)
            .unwrap()
            .with_sources(Visibility::Private, ["private/core.cpp", "/abs/extra.cpp"])
            .with_includes(Visibility::Public, ["public"]);
        assert_eq!(
            module.sources(Visibility::Private),
            &[
                PathBuf::from("/work/Engine/Core/private/core.cpp"),
                PathBuf::from("/abs/extra.cpp")
            ]
        );
        assert_eq!(
            module.includes(Visibility::Public),
            &[PathBuf::from("/work/Engine/Core/public")]
        );
        assert!(module.condition_keys().is_always());
    }

    #[test]
    fn test_empty_condition_keys_fall_back_to_always() {
        let module = Module::new("Core", "/work/Core", LibraryKind::StaticLibrary)
            .unwrap()
            .with_condition_keys(KeySet::empty());
        assert!(module.condition_keys().is_always());
    }

    #[test]
    fn test_owner_cannot_be_reassigned() {
        let mut module = Module::new("Core", "/work/Core", LibraryKind::Interface).unwrap();
        module.attach_owner(ProjectId(0)).unwrap();
        module.attach_owner(ProjectId(0)).unwrap();
        assert!(matches!(
            module.attach_owner(ProjectId(1)),
            Err(GenError::Configuration(_))
        ));
        assert_eq!(module.owner(), Some(ProjectId(0)));
    }
}
