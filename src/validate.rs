//! Dependency legitimacy checks.
//!
//! Runs at the end of phase-2 initialization, once every reference of the
//! project is bound. Rules:
//!
//! - nothing may depend on an executable module
//! - a dependency's required keys must be a subset of its target's condition keys
//! - a module may depend on any module of its own project, or on a public
//!   module of a project reachable through public project dependencies
//!
//! External modules are only key-checked; they are globally addressable.

use crate::error::{GenError, GenResult};
use crate::keys::KeySet;
use crate::model::{Definition, LibraryKind, ModuleId, ProjectId, Visibility};
use crate::registry::Registry;
use std::collections::HashSet;

/// Validates `id`, its modules and, recursively, its sub-projects.
pub fn validate_project(registry: &Registry, id: ProjectId) -> GenResult<()> {
    let project = registry.project(id);

    for dependency in project.dependencies().iter() {
        let target = registry.project(dependency.resolved()?);
        check_keys(
            project.name(),
            target.name(),
            dependency.required_keys(),
            target.condition_keys(),
        )?;
    }
    for dependency in project.external_dependencies().iter() {
        let target = registry.external_project(dependency.resolved()?);
        check_keys(
            project.name(),
            target.name(),
            dependency.required_keys(),
            target.condition_keys(),
        )?;
    }

    for visibility in [Visibility::Public, Visibility::Private] {
        for index in 0..project.modules().get(visibility).len() {
            validate_module(
                registry,
                ModuleId {
                    project: id,
                    visibility,
                    index,
                },
            )?;
        }
    }

    for sub_project in project.sub_projects() {
        validate_project(registry, sub_project.resolved()?)?;
    }
    Ok(())
}

pub fn validate_module(registry: &Registry, id: ModuleId) -> GenResult<()> {
    let module = registry.module(id).ok_or_else(|| GenError::UnknownTarget {
        what: "module",
        name: format!("{id:?}"),
    })?;
    let owner = registry.project(id.project);
    let qualified = format!("{}::{}", owner.name(), module.name());

    for dependency in module.dependencies().iter() {
        let target_id = dependency.resolved()?;
        let target = registry
            .module(target_id)
            .ok_or_else(|| GenError::UnknownTarget {
                what: "module",
                name: format!("{target_id:?}"),
            })?;
        let target_name = format!(
            "{}::{}",
            registry.project(target_id.project).name(),
            target.name()
        );

        if target.kind() == LibraryKind::Executable {
            return Err(GenError::IllegalDependency {
                module: qualified,
                target: target_name,
                reason: "executables cannot be depended on".to_string(),
            });
        }
        check_keys(
            &qualified,
            &target_name,
            dependency.required_keys(),
            target.condition_keys(),
        )?;
        if !is_legitimate(registry, id.project, target_id) {
            return Err(GenError::IllegalDependency {
                module: qualified,
                target: target_name,
                reason: "dependencies must be modules of the owning project or public modules \
                         of its public dependencies"
                    .to_string(),
            });
        }
    }

    for dependency in module.external_dependencies().iter() {
        let target_id = dependency.resolved()?;
        let target = registry
            .external_module(target_id)
            .ok_or_else(|| GenError::UnknownTarget {
                what: "external module",
                name: format!("{target_id:?}"),
            })?;
        let target_name = format!(
            "{}::{}",
            registry.external_project(target_id.project).name(),
            target.name()
        );
        check_keys(
            &qualified,
            &target_name,
            dependency.required_keys(),
            target.condition_keys(),
        )?;
    }

    Ok(())
}

/// Whether a module of `owner` may depend on `target`.
pub fn is_legitimate(registry: &Registry, owner: ProjectId, target: ModuleId) -> bool {
    if target.project == owner {
        return true;
    }
    if target.visibility != Visibility::Public {
        return false;
    }

    let mut visited = HashSet::new();
    let mut pending = public_dependencies(registry, owner);
    while let Some(project) = pending.pop() {
        if !visited.insert(project) {
            continue;
        }
        if project == target.project {
            return true;
        }
        pending.extend(public_dependencies(registry, project));
    }
    false
}

fn public_dependencies(registry: &Registry, project: ProjectId) -> Vec<ProjectId> {
    registry
        .project(project)
        .dependencies()
        .public
        .iter()
        .filter_map(|d| d.resolved().ok())
        .collect()
}

fn check_keys(
    dependent: &str,
    target: &str,
    required: &KeySet,
    available: &KeySet,
) -> GenResult<()> {
    if required.is_subset(available) {
        return Ok(());
    }
    Err(GenError::InvalidKey {
        dependent: dependent.to_string(),
        target: target.to_string(),
        required: required.to_string(),
        available: available.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::MemoryLoader;
    use crate::model::{Module, ModuleDependency, Project, ProjectDependency};

    fn module(project: &str, name: &str, kind: LibraryKind) -> Module {
        Module::new(name, format!("/work/{project}/{name}"), kind).unwrap()
    }

    fn project(name: &str) -> Project {
        Project::new(name, format!("/work/{name}")).unwrap()
    }

    #[test]
    fn test_executable_target_is_illegal() {
        let app = module("Engine", "App", LibraryKind::StaticLibrary)
            .depends_on(Visibility::Public, ModuleDependency::named("Engine", "Exe"));
        let engine = project("Engine")
            .with_module(Visibility::Public, module("Engine", "Exe", LibraryKind::Executable))
            .with_module(Visibility::Public, app);

        let mut registry = Registry::new(MemoryLoader::new());
        let err = registry.register(engine).unwrap_err();
        assert!(matches!(
            err.root_cause(),
            GenError::IllegalDependency { .. }
        ));
    }

    #[test]
    fn test_required_keys_must_be_declared_by_target() {
        let render = module("Engine", "Render", LibraryKind::StaticLibrary).depends_on(
            Visibility::Private,
            ModuleDependency::named("Engine", "Core").requiring(KeySet::from_iter(["Editor"])),
        );
        let engine = project("Engine")
            .with_module(
                Visibility::Public,
                module("Engine", "Core", LibraryKind::StaticLibrary)
                    .with_condition_keys(KeySet::from_iter(["Debug", "Release"])),
            )
            .with_module(Visibility::Public, render);

        let mut registry = Registry::new(MemoryLoader::new());
        let err = registry.register(engine).unwrap_err();
        assert!(matches!(err.root_cause(), GenError::InvalidKey { .. }));
    }

    #[test]
    fn test_same_project_private_module_is_legitimate() {
        let render = module("Engine", "Render", LibraryKind::StaticLibrary)
            .depends_on(Visibility::Public, ModuleDependency::named("Engine", "Util"));
        let engine = project("Engine")
            .with_module(Visibility::Private, module("Engine", "Util", LibraryKind::StaticLibrary))
            .with_module(Visibility::Public, render);

        let mut registry = Registry::new(MemoryLoader::new());
        assert!(registry.register(engine).is_ok());
    }

    #[test]
    fn test_project_dependency_keys_checked() {
        let mut registry = Registry::new(MemoryLoader::new());
        registry
            .register(project("Engine").with_condition_keys(KeySet::from_iter(["Debug"])))
            .unwrap();

        let game = project("Game").depends_on(
            Visibility::Public,
            ProjectDependency::named("Engine").requiring(KeySet::from_iter(["Release"])),
        );
        let err = registry.register(game).unwrap_err();
        assert!(matches!(err.root_cause(), GenError::InvalidKey { .. }));
    }

    #[test]
    fn test_private_module_hidden_across_diamond() {
        let mut registry = Registry::new(MemoryLoader::new());
        registry
            .register(project("Base").with_module(
                Visibility::Private,
                module("Base", "Hidden", LibraryKind::StaticLibrary),
            ))
            .unwrap();
        for side in ["Left", "Right"] {
            registry
                .register(
                    project(side).depends_on(Visibility::Public, ProjectDependency::named("Base")),
                )
                .unwrap();
        }

        let game = project("Game")
            .depends_on(Visibility::Public, ProjectDependency::named("Left"))
            .depends_on(Visibility::Public, ProjectDependency::named("Right"));
        let game = registry.register(game).unwrap();
        let hidden = registry
            .find_module(registry.project_by_name("Base").unwrap(), "Hidden")
            .unwrap();
        assert!(!is_legitimate(&registry, game, hidden));
    }
}
