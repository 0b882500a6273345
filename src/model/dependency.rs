use crate::error::{GenError, GenResult};
use crate::keys::KeySet;
use std::fmt;
use std::path::PathBuf;

use super::{ExternalModuleId, ExternalProjectId, ModuleId, ProjectId};

/// Target of a module-level dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleRef<Id> {
    Resolved(Id),
    /// Looked up by owning project name and module name at resolution time
    Named { project: String, module: String },
}

/// Target of a project-level dependency or sub-project entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectRef<Id> {
    Resolved(Id),
    /// Looked up in the registry's name table
    Named(String),
    /// Loaded from (or fetched by) its absolute directory
    Located(PathBuf),
}

impl<Id: Copy> ProjectRef<Id> {
    /// The bound target; fails if resolution has not run.
    pub fn resolved(&self) -> GenResult<Id> {
        match self {
            ProjectRef::Resolved(id) => Ok(*id),
            other => Err(GenError::UnknownTarget {
                what: "unresolved project",
                name: other.to_string(),
            }),
        }
    }
}

impl<Id> fmt::Display for ModuleRef<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleRef::Resolved(_) => f.write_str("<resolved module>"),
            ModuleRef::Named { project, module } => write!(f, "{project}::{module}"),
        }
    }
}

impl<Id> fmt::Display for ProjectRef<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectRef::Resolved(_) => f.write_str("<resolved project>"),
            ProjectRef::Named(name) => f.write_str(name),
            ProjectRef::Located(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A module depending on another (internal or external) module.
#[derive(Debug, Clone)]
pub struct ModuleLink<Id> {
    target: ModuleRef<Id>,
    required_keys: KeySet,
}

pub type ModuleDependency = ModuleLink<ModuleId>;
pub type ExternalModuleDependency = ModuleLink<ExternalModuleId>;

impl<Id: Copy> ModuleLink<Id> {
    pub fn on(id: Id) -> Self {
        Self {
            target: ModuleRef::Resolved(id),
            required_keys: KeySet::always(),
        }
    }

    pub fn named(project: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            target: ModuleRef::Named {
                project: project.into(),
                module: module.into(),
            },
            required_keys: KeySet::always(),
        }
    }

    pub fn requiring(mut self, keys: KeySet) -> Self {
        self.required_keys = keys.non_empty();
        self
    }

    pub fn target(&self) -> &ModuleRef<Id> {
        &self.target
    }

    pub fn required_keys(&self) -> &KeySet {
        &self.required_keys
    }

    /// The bound target; fails if resolution has not run.
    pub fn resolved(&self) -> GenResult<Id> {
        match &self.target {
            ModuleRef::Resolved(id) => Ok(*id),
            other => Err(GenError::UnknownTarget {
                what: "unresolved module",
                name: other.to_string(),
            }),
        }
    }

    pub(crate) fn bind(&mut self, id: Id) {
        self.target = ModuleRef::Resolved(id);
    }
}

/// A project depending on another (internal or external) project.
#[derive(Debug, Clone)]
pub struct ProjectLink<Id> {
    target: ProjectRef<Id>,
    required_keys: KeySet,
    use_relative_path: bool,
}

pub type ProjectDependency = ProjectLink<ProjectId>;
pub type ExternalProjectDependency = ProjectLink<ExternalProjectId>;

impl<Id: Copy> ProjectLink<Id> {
    fn with_target(target: ProjectRef<Id>) -> Self {
        Self {
            target,
            required_keys: KeySet::always(),
            use_relative_path: true,
        }
    }

    pub fn on(id: Id) -> Self {
        Self::with_target(ProjectRef::Resolved(id))
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::with_target(ProjectRef::Named(name.into()))
    }

    pub fn located(path: impl Into<PathBuf>) -> Self {
        Self::with_target(ProjectRef::Located(path.into()))
    }

    pub fn requiring(mut self, keys: KeySet) -> Self {
        self.required_keys = keys.non_empty();
        self
    }

    /// Emit the dependency's location as an absolute path.
    pub fn with_absolute_path(mut self) -> Self {
        self.use_relative_path = false;
        self
    }

    pub fn target(&self) -> &ProjectRef<Id> {
        &self.target
    }

    pub fn required_keys(&self) -> &KeySet {
        &self.required_keys
    }

    pub fn use_relative_path(&self) -> bool {
        self.use_relative_path
    }

    pub fn resolved(&self) -> GenResult<Id> {
        self.target.resolved()
    }

    pub(crate) fn bind(&mut self, id: Id) {
        self.target = ProjectRef::Resolved(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let dep = ProjectDependency::named("Engine");
        assert!(dep.required_keys().is_always());
        assert!(dep.use_relative_path());
        assert!(!dep.with_absolute_path().use_relative_path());
    }

    #[test]
    fn test_empty_required_keys_fall_back_to_always() {
        let dep = ModuleDependency::named("Engine", "Core").requiring(KeySet::empty());
        assert!(dep.required_keys().is_always());
        let dep = ProjectDependency::named("Engine").requiring(KeySet::empty());
        assert!(dep.required_keys().is_always());
    }

    #[test]
    fn test_unresolved_reports_reference() {
        let dep = ModuleDependency::named("Engine", "Core");
        let err = dep.resolved().unwrap_err();
        assert_eq!(err.to_string(), "unresolved module 'Engine::Core' was not found");
    }

    #[test]
    fn test_bind() {
        let mut dep = ProjectDependency::located("/work/Engine");
        dep.bind(ProjectId(3));
        assert_eq!(dep.resolved().unwrap(), ProjectId(3));
    }
}
