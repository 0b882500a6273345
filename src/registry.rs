//! The definition registry.
//!
//! One [`Registry`] lives for a whole generation run. It owns every loaded
//! project and external project, keeps the name and path tables that make
//! loading idempotent, and drives the two initialization phases:
//!
//! 1. owner attachment: every module learns its project id
//! 2. resolution and validation: deferred references are bound, upstream
//!    projects are loaded, then the project is validated
//!
//! A project whose name or directory is already taken is rejected before it
//! touches either table. A project failing phase 2 is removed from both tables
//! before the error is returned.

use crate::error::{GenError, GenResult};
use crate::loader::DefinitionLoader;
use crate::model::{
    Definition, ExternalModule, ExternalModuleId, ExternalProject, ExternalProjectId, Module,
    ModuleId, ModuleRef, Project, ProjectId, ProjectRef, Visibility,
};
use crate::paths::normalize;
use crate::validate::validate_project;
use colored::*;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

pub struct Registry {
    loader: Box<dyn DefinitionLoader>,
    projects: Vec<Project>,
    externals: Vec<ExternalProject>,
    project_names: HashMap<String, ProjectId>,
    project_paths: HashMap<PathBuf, ProjectId>,
    external_names: HashMap<String, ExternalProjectId>,
    external_paths: HashMap<PathBuf, ExternalProjectId>,
    /// Projects currently between registration and the end of phase 2
    loading: Vec<ProjectId>,
    verbose: bool,
}

impl Registry {
    pub fn new(loader: impl DefinitionLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            projects: Vec::new(),
            externals: Vec::new(),
            project_names: HashMap::new(),
            project_paths: HashMap::new(),
            external_names: HashMap::new(),
            external_paths: HashMap::new(),
            loading: Vec::new(),
            verbose: false,
        }
    }

    /// Print a status line for every project loaded.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Returns the project registered for `dir`, loading it first if needed.
    /// The loader is invoked at most once per directory.
    pub fn register_or_fetch(&mut self, dir: &Path) -> GenResult<ProjectId> {
        let dir = normalize(dir);
        if let Some(&id) = self.project_paths.get(&dir) {
            if self.loading.contains(&id) {
                return Err(self.cycle_error(id));
            }
            return Ok(id);
        }
        let project = self.loader.load_project(&dir)?;
        self.register_at(project, dir)
    }

    /// Registers a definition that was built in code.
    pub fn register(&mut self, project: Project) -> GenResult<ProjectId> {
        let dir = normalize(project.path());
        self.register_at(project, dir)
    }

    pub fn register_or_fetch_external(&mut self, dir: &Path) -> GenResult<ExternalProjectId> {
        let dir = normalize(dir);
        if let Some(&id) = self.external_paths.get(&dir) {
            return Ok(id);
        }
        let project = self.loader.load_external_project(&dir)?;
        self.register_external_at(project, dir)
    }

    pub fn register_external(&mut self, project: ExternalProject) -> GenResult<ExternalProjectId> {
        let dir = normalize(project.path());
        self.register_external_at(project, dir)
    }

    fn register_at(&mut self, mut project: Project, dir: PathBuf) -> GenResult<ProjectId> {
        if let Some(&existing) = self.project_names.get(project.name()) {
            return Err(GenError::DuplicateName {
                name: project.name().to_string(),
                existing: self.projects[existing.0].path().to_path_buf(),
                duplicate: project.path().to_path_buf(),
            });
        }
        if let Some(&existing) = self.project_paths.get(&dir) {
            return Err(GenError::DuplicateName {
                name: project.name().to_string(),
                existing: self.projects[existing.0].path().to_path_buf(),
                duplicate: project.path().to_path_buf(),
            });
        }

        let id = ProjectId(self.projects.len());
        attach_owners(&mut project, id)?;

        let name = project.name().to_string();
        self.projects.push(project);
        self.project_names.insert(name.clone(), id);
        self.project_paths.insert(dir.clone(), id);

        self.loading.push(id);
        let result = self.initialize(id);
        self.loading.retain(|&loading| loading != id);

        match result {
            Ok(()) => {
                if self.verbose {
                    println!("{} Loaded project {} ({})", "✓".green(), name.bold(), dir.display());
                }
                Ok(id)
            }
            Err(source) => {
                self.project_names.remove(&name);
                self.project_paths.remove(&dir);
                Err(GenError::Dependency {
                    project: name,
                    source: Box::new(source),
                })
            }
        }
    }

    fn register_external_at(
        &mut self,
        mut project: ExternalProject,
        dir: PathBuf,
    ) -> GenResult<ExternalProjectId> {
        if let Some(&existing) = self.external_names.get(project.name()) {
            return Err(GenError::DuplicateName {
                name: project.name().to_string(),
                existing: self.externals[existing.0].path().to_path_buf(),
                duplicate: project.path().to_path_buf(),
            });
        }
        if let Some(&existing) = self.external_paths.get(&dir) {
            return Err(GenError::DuplicateName {
                name: project.name().to_string(),
                existing: self.externals[existing.0].path().to_path_buf(),
                duplicate: project.path().to_path_buf(),
            });
        }

        let id = ExternalProjectId(self.externals.len());
        let mut seen = HashSet::new();
        for module in project.modules_mut() {
            if !seen.insert(module.name().to_string()) {
                return Err(GenError::DuplicateName {
                    name: module.name().to_string(),
                    existing: dir.clone(),
                    duplicate: dir,
                });
            }
            module.attach_owner(id)?;
        }

        self.external_names.insert(project.name().to_string(), id);
        self.external_paths.insert(dir, id);
        self.externals.push(project);
        Ok(id)
    }

    /// Phase 2: load and bind every reference, then validate.
    fn initialize(&mut self, id: ProjectId) -> GenResult<()> {
        self.resolve_project_edges(id)?;
        self.resolve_module_edges(id)?;
        validate_project(self, id)
    }

    fn resolve_project_edges(&mut self, id: ProjectId) -> GenResult<()> {
        let mut dependencies = std::mem::take(self.projects[id.0].dependencies_mut());
        for dependency in dependencies.iter_mut() {
            let target = self.resolve_project_ref(dependency.target())?;
            if self.loading.contains(&target) {
                return Err(self.cycle_error(target));
            }
            dependency.bind(target);
        }
        *self.projects[id.0].dependencies_mut() = dependencies;

        let mut externals = std::mem::take(self.projects[id.0].external_dependencies_mut());
        for dependency in externals.iter_mut() {
            let target = match dependency.target() {
                ProjectRef::Resolved(target) => *target,
                ProjectRef::Named(name) => self.external_id(name)?,
                ProjectRef::Located(dir) => {
                    let dir = dir.clone();
                    self.register_or_fetch_external(&dir)?
                }
            };
            dependency.bind(target);
        }
        *self.projects[id.0].external_dependencies_mut() = externals;

        let mut sub_projects = std::mem::take(self.projects[id.0].sub_projects_mut());
        for sub_project in sub_projects.iter_mut() {
            let target = self.resolve_project_ref(sub_project)?;
            if self.loading.contains(&target) {
                return Err(self.cycle_error(target));
            }
            *sub_project = ProjectRef::Resolved(target);
        }
        *self.projects[id.0].sub_projects_mut() = sub_projects;

        Ok(())
    }

    fn resolve_project_ref(&mut self, target: &ProjectRef<ProjectId>) -> GenResult<ProjectId> {
        match target {
            ProjectRef::Resolved(target) => Ok(*target),
            ProjectRef::Named(name) => self.project_id(name),
            ProjectRef::Located(dir) => {
                let dir = dir.clone();
                self.register_or_fetch(&dir)
            }
        }
    }

    /// Binds named module references. Targets are looked up first, then
    /// written back, so the project's own modules stay visible to the lookup.
    fn resolve_module_edges(&mut self, id: ProjectId) -> GenResult<()> {
        let mut internal = Vec::new();
        let mut external = Vec::new();

        let owner = &self.projects[id.0];
        for visibility in [Visibility::Public, Visibility::Private] {
            for (index, module) in owner.modules().get(visibility).iter().enumerate() {
                for dep_visibility in [Visibility::Public, Visibility::Private] {
                    let deps = module.dependencies().get(dep_visibility);
                    for (dep_index, dep) in deps.iter().enumerate() {
                        if let ModuleRef::Named { project, module: name } = dep.target() {
                            let target = self.module_id(project, name)?;
                            internal.push((visibility, index, dep_visibility, dep_index, target));
                        }
                    }
                    let deps = module.external_dependencies().get(dep_visibility);
                    for (dep_index, dep) in deps.iter().enumerate() {
                        if let ModuleRef::Named { project, module: name } = dep.target() {
                            let target = self.external_module_id(project, name)?;
                            external.push((visibility, index, dep_visibility, dep_index, target));
                        }
                    }
                }
            }
        }

        let modules = self.projects[id.0].modules_mut();
        for (visibility, index, dep_visibility, dep_index, target) in internal {
            modules.get_mut(visibility)[index]
                .dependencies_mut()
                .get_mut(dep_visibility)[dep_index]
                .bind(target);
        }
        for (visibility, index, dep_visibility, dep_index, target) in external {
            modules.get_mut(visibility)[index]
                .external_dependencies_mut()
                .get_mut(dep_visibility)[dep_index]
                .bind(target);
        }
        Ok(())
    }

    fn cycle_error(&self, target: ProjectId) -> GenError {
        let chain: Vec<&str> = self
            .loading
            .iter()
            .chain(std::iter::once(&target))
            .map(|id| self.projects[id.0].name())
            .collect();
        GenError::Dependency {
            project: self.projects[target.0].name().to_string(),
            source: Box::new(GenError::config(format!(
                "dependency cycle: {}",
                chain.join(" -> ")
            ))),
        }
    }

    fn project_id(&self, name: &str) -> GenResult<ProjectId> {
        self.project_names
            .get(name)
            .copied()
            .ok_or_else(|| GenError::UnknownTarget {
                what: "project",
                name: name.to_string(),
            })
    }

    fn external_id(&self, name: &str) -> GenResult<ExternalProjectId> {
        self.external_names
            .get(name)
            .copied()
            .ok_or_else(|| GenError::UnknownTarget {
                what: "external project",
                name: name.to_string(),
            })
    }

    fn module_id(&self, project: &str, module: &str) -> GenResult<ModuleId> {
        let id = self.project_id(project)?;
        self.find_module(id, module)
            .ok_or_else(|| GenError::UnknownTarget {
                what: "module",
                name: format!("{project}::{module}"),
            })
    }

    fn external_module_id(&self, project: &str, module: &str) -> GenResult<ExternalModuleId> {
        let id = self.external_id(project)?;
        self.find_external_module(id, module)
            .ok_or_else(|| GenError::UnknownTarget {
                what: "external module",
                name: format!("{project}::{module}"),
            })
    }

    pub fn project(&self, id: ProjectId) -> &Project {
        &self.projects[id.0]
    }

    pub fn project_by_name(&self, name: &str) -> Option<ProjectId> {
        self.project_names.get(name).copied()
    }

    pub fn project_by_path(&self, dir: &Path) -> Option<ProjectId> {
        self.project_paths.get(&normalize(dir)).copied()
    }

    pub fn module(&self, id: ModuleId) -> Option<&Module> {
        self.projects
            .get(id.project.0)?
            .modules()
            .get(id.visibility)
            .get(id.index)
    }

    pub fn find_module(&self, project: ProjectId, name: &str) -> Option<ModuleId> {
        let (visibility, index) = self.projects.get(project.0)?.find_module(name)?;
        Some(ModuleId {
            project,
            visibility,
            index,
        })
    }

    pub fn external_project(&self, id: ExternalProjectId) -> &ExternalProject {
        &self.externals[id.0]
    }

    pub fn external_project_by_name(&self, name: &str) -> Option<ExternalProjectId> {
        self.external_names.get(name).copied()
    }

    pub fn external_project_by_path(&self, dir: &Path) -> Option<ExternalProjectId> {
        self.external_paths.get(&normalize(dir)).copied()
    }

    pub fn external_module(&self, id: ExternalModuleId) -> Option<&ExternalModule> {
        self.externals.get(id.project.0)?.modules().get(id.index)
    }

    pub fn find_external_module(
        &self,
        project: ExternalProjectId,
        name: &str,
    ) -> Option<ExternalModuleId> {
        let index = self.externals.get(project.0)?.find_module(name)?;
        Some(ExternalModuleId { project, index })
    }

    /// `root` followed by every transitive sub-project, depth first in
    /// declaration order, each listed once.
    pub fn sub_project_closure(&self, root: ProjectId) -> GenResult<Vec<ProjectId>> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            order.push(id);
            let subs = self.project(id).sub_projects();
            for sub in subs.iter().rev() {
                stack.push(sub.resolved()?);
            }
        }
        Ok(order)
    }
}

fn attach_owners(project: &mut Project, id: ProjectId) -> GenResult<()> {
    let mut seen: HashMap<String, PathBuf> = HashMap::new();
    for module in project.modules_mut().iter_mut() {
        if let Some(existing) = seen.get(module.name()) {
            return Err(GenError::DuplicateName {
                name: module.name().to_string(),
                existing: existing.clone(),
                duplicate: module.path().to_path_buf(),
            });
        }
        seen.insert(module.name().to_string(), module.path().to_path_buf());
        module.attach_owner(id)?;
    }
    Ok(())
}
