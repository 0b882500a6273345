//! Definition loading.
//!
//! The [`Registry`](crate::registry::Registry) never reads files itself: it asks
//! a [`DefinitionLoader`] for the definition living in a directory. Two loaders
//! ship with the crate:
//!
//! - [`TomlLoader`] reads `project.toml`, `module.toml` and `external.toml`
//! - [`MemoryLoader`] serves pre-built definitions keyed by directory

use crate::config::{
    EXTERNAL_FILE, ExternalProjectConfig, MODULE_FILE, ModuleConfig, PROJECT_FILE,
    ProjectConfig, ProjectDependencyConfig, read_definition,
};
use crate::error::{GenError, GenResult};
use crate::files::find_files;
use crate::keys::KeySet;
use crate::model::{
    Definition, ExternalModule, ExternalModuleDependency, ExternalProject,
    ExternalProjectDependency, LibraryKind, Module, ModuleDependency, Project, ProjectDependency,
    ProjectKind, ProjectLink, Visibility, to_abs_path,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Produces definitions for absolute directories.
pub trait DefinitionLoader {
    fn load_project(&self, dir: &Path) -> GenResult<Project>;
    fn load_external_project(&self, dir: &Path) -> GenResult<ExternalProject>;
}

/// Loads definitions from TOML files on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct TomlLoader;

impl TomlLoader {
    pub fn new() -> Self {
        Self
    }

    fn load_module(&self, dir: &Path) -> GenResult<Module> {
        let config: ModuleConfig = read_definition(&dir.join(MODULE_FILE))?;
        let name = config.name.unwrap_or_else(|| dir_name(dir));
        let kind = config.kind.as_deref().ok_or_else(|| GenError::MissingField {
            entity: format!("module '{name}'"),
            field: "kind",
        })?;
        let kind = LibraryKind::parse(kind)?;

        let mut module = Module::new(name, dir, kind)?
            .with_condition_keys(KeySet::or_always(config.condition_keys));

        for visibility in [Visibility::Public, Visibility::Private] {
            let mut sources = Vec::new();
            for entry in config.sources.get(visibility) {
                sources.extend(find_files(&to_abs_path(dir, entry))?);
            }
            module = module
                .with_sources(visibility, sources)
                .with_includes(visibility, config.includes.get(visibility))
                .with_macros(visibility, config.macros.get(visibility).iter().cloned());

            for dep in config.dependencies.get(visibility) {
                module = module.depends_on(
                    visibility,
                    ModuleDependency::named(&dep.project, &dep.module)
                        .requiring(KeySet::or_always(dep.required_keys.iter().cloned())),
                );
            }
            for dep in config.external.get(visibility) {
                module = module.depends_on_external(
                    visibility,
                    ExternalModuleDependency::named(&dep.project, &dep.module)
                        .requiring(KeySet::or_always(dep.required_keys.iter().cloned())),
                );
            }
        }

        Ok(module)
    }
}

impl DefinitionLoader for TomlLoader {
    fn load_project(&self, dir: &Path) -> GenResult<Project> {
        let config: ProjectConfig = read_definition(&dir.join(PROJECT_FILE))?;
        let name = config.name.unwrap_or_else(|| dir_name(dir));

        let mut project = Project::new(name, dir)?
            .with_condition_keys(KeySet::or_always(config.condition_keys))
            .with_install(config.should_install, config.install_dir.as_deref())?;
        if let Some(binaries) = &config.binaries_dir {
            project = project.with_binaries_dir(binaries);
        }
        if let Some(archive) = &config.archive_dir {
            project = project.with_archive_dir(archive);
        }
        if let Some(cache) = &config.cache_dir {
            project = project.with_cache_dir(cache);
        }
        if let Some(standard) = config.cxx_standard {
            project = project.with_cxx_standard(standard);
        }
        if !config.build_modes.is_empty() {
            project = project.with_build_modes(config.build_modes);
        }

        for visibility in [Visibility::Public, Visibility::Private] {
            project =
                project.with_macros(visibility, config.macros.get(visibility).iter().cloned());

            for module_dir in config.modules.get(visibility) {
                let module = self.load_module(&to_abs_path(dir, module_dir))?;
                project = project.with_module(visibility, module);
            }
            for dep in config.dependencies.get(visibility) {
                let dependency: ProjectDependency = project_link(dir, dep);
                project = project.depends_on(visibility, dependency);
            }
            for dep in config.external.get(visibility) {
                let dependency: ExternalProjectDependency = project_link(dir, dep);
                project = project.depends_on_external(visibility, dependency);
            }
        }

        for sub_dir in &config.sub_projects {
            project = project.with_sub_project_dir(sub_dir);
        }

        Ok(project)
    }

    fn load_external_project(&self, dir: &Path) -> GenResult<ExternalProject> {
        let config: ExternalProjectConfig = read_definition(&dir.join(EXTERNAL_FILE))?;
        let name = config.name.unwrap_or_else(|| dir_name(dir));
        let install_dir = config.install_dir.ok_or_else(|| GenError::MissingField {
            entity: format!("external project '{name}'"),
            field: "install_dir",
        })?;

        let kind = match config.kind.as_deref() {
            Some(kind) => ProjectKind::parse(kind)?,
            None => ProjectKind::default(),
        };
        let mut project = ExternalProject::new(&name, dir, install_dir)?
            .with_kind(kind)
            .with_condition_keys(KeySet::or_always(config.condition_keys));
        if let Some(package_name) = config.package_name {
            project = project.with_package_name(package_name);
        }

        for entry in config.modules {
            let kind = entry.kind.as_deref().ok_or_else(|| GenError::MissingField {
                entity: format!("external module '{name}::{}'", entry.name),
                field: "kind",
            })?;
            let kind = LibraryKind::parse(kind)?;
            let mut module = ExternalModule::new(entry.name, dir, kind)?
                .with_condition_keys(KeySet::or_always(entry.condition_keys));
            if let Some(library_name) = entry.library_name {
                module = module.with_library_name(library_name);
            }
            if entry.use_absolute_name {
                module = module.with_absolute_name();
            }
            project = project.with_module(module);
        }

        Ok(project)
    }
}

/// Builds a project-level edge: by directory when a path is given, by name otherwise.
fn project_link<Id: Copy>(dir: &Path, config: &ProjectDependencyConfig) -> ProjectLink<Id> {
    let link = match &config.path {
        Some(path) => ProjectLink::located(to_abs_path(dir, path)),
        None => ProjectLink::named(&config.project),
    };
    let link = link.requiring(KeySet::or_always(config.required_keys.iter().cloned()));
    if config.relative {
        link
    } else {
        link.with_absolute_path()
    }
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Serves definitions that were built in code.
#[derive(Debug, Default, Clone)]
pub struct MemoryLoader {
    projects: HashMap<PathBuf, Project>,
    externals: HashMap<PathBuf, ExternalProject>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `project` loadable from its own path.
    pub fn with_project(mut self, project: Project) -> Self {
        self.projects.insert(project.path().to_path_buf(), project);
        self
    }

    pub fn with_external_project(mut self, project: ExternalProject) -> Self {
        self.externals.insert(project.path().to_path_buf(), project);
        self
    }
}

impl DefinitionLoader for MemoryLoader {
    fn load_project(&self, dir: &Path) -> GenResult<Project> {
        self.projects.get(dir).cloned().ok_or_else(|| GenError::Load {
            path: dir.to_path_buf(),
            message: "no project definition at this path".to_string(),
        })
    }

    fn load_external_project(&self, dir: &Path) -> GenResult<ExternalProject> {
        self.externals.get(dir).cloned().ok_or_else(|| GenError::Load {
            path: dir.to_path_buf(),
            message: "no external project definition at this path".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModuleRef, ProjectRef};
    use std::fs;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_toml_loader_reads_project_and_modules() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("Engine");
        write(
            &root.join(PROJECT_FILE),
            r#"
                should_install = false

                [modules]
                public = ["source/Core"]

                [dependencies]
                public = [{ project = "Base", path = "../Base" }]
                private = [{ project = "Math" }]
            "#,
        );
        write(
            &root.join("source/Core").join(MODULE_FILE),
            r#"
                kind = "static"

                [sources]
                private = ["private"]

                [includes]
                public = ["public"]
            "#,
        );
        write(&root.join("source/Core/private/core.cpp"), "");

        let project = TomlLoader::new().load_project(&root).unwrap();
        assert_eq!(project.name(), "Engine");
        assert!(!project.should_install());

        let core = &project.modules().public[0];
        assert_eq!(core.name(), "Core");
        assert_eq!(core.kind(), LibraryKind::StaticLibrary);
        assert_eq!(
            core.sources(Visibility::Private),
            &[root.join("source/Core/private/core.cpp")]
        );
        assert_eq!(
            core.includes(Visibility::Public),
            &[root.join("source/Core/public")]
        );

        assert_eq!(
            project.dependencies().public[0].target(),
            &ProjectRef::Located(dir.path().join("Engine").join("../Base"))
        );
        assert_eq!(
            project.dependencies().private[0].target(),
            &ProjectRef::Named("Math".to_string())
        );
    }

    #[test]
    fn test_toml_loader_module_without_kind() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("Game");
        write(&root.join(PROJECT_FILE), "modules = { public = [\"App\"] }");
        write(&root.join("App").join(MODULE_FILE), "name = \"App\"");

        let err = TomlLoader::new().load_project(&root).unwrap_err();
        assert!(matches!(err, GenError::MissingField { field: "kind", .. }));
    }

    #[test]
    fn test_toml_loader_unknown_kind_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("Game");
        write(&root.join(PROJECT_FILE), "modules = { public = [\"App\"] }");
        write(&root.join("App").join(MODULE_FILE), "kind = \"plugin\"");

        match TomlLoader::new().load_project(&root).unwrap_err() {
            GenError::Configuration(message) => assert!(message.contains("plugin")),
            other => panic!("Expected Configuration error, got {other:?}"),
        }

        let fmt = dir.path().join("fmt");
        write(&fmt.join(EXTERNAL_FILE), "kind = \"git\"\ninstall_dir = \"install\"");
        assert!(matches!(
            TomlLoader::new().load_external_project(&fmt),
            Err(GenError::Configuration(_))
        ));
    }

    #[test]
    fn test_toml_loader_module_dependencies_are_named() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("Engine");
        write(&root.join(PROJECT_FILE), "modules = { public = [\"Render\"] }");
        write(
            &root.join("Render").join(MODULE_FILE),
            r#"
                kind = "interface"
                dependencies = { public = [{ project = "Engine", module = "Core", required_keys = ["Debug"] }] }
            "#,
        );

        let project = TomlLoader::new().load_project(&root).unwrap();
        let dep = &project.modules().public[0].dependencies().public[0];
        assert_eq!(
            dep.target(),
            &ModuleRef::Named {
                project: "Engine".to_string(),
                module: "Core".to_string()
            }
        );
        assert!(dep.required_keys().contains("Debug"));
    }

    #[test]
    fn test_toml_loader_external_project() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("fmt");
        write(
            &root.join(EXTERNAL_FILE),
            r#"
                package_name = "fmt"
                install_dir = "install"

                [[module]]
                name = "fmt"
                library_name = "fmt-header-only"
                kind = "interface"
            "#,
        );

        let external = TomlLoader::new().load_external_project(&root).unwrap();
        assert_eq!(external.name(), "fmt");
        assert_eq!(external.kind(), ProjectKind::Package);
        assert_eq!(external.install_dir(), root.join("install"));
        assert_eq!(external.modules()[0].library_name(), "fmt-header-only");
    }

    #[test]
    fn test_toml_loader_external_requires_install_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("fmt");
        write(&root.join(EXTERNAL_FILE), "name = \"fmt\"");

        let err = TomlLoader::new().load_external_project(&root).unwrap_err();
        assert!(matches!(
            err,
            GenError::MissingField {
                field: "install_dir",
                ..
            }
        ));
    }

    #[test]
    fn test_memory_loader() {
        let project = Project::new("Engine", "/work/Engine").unwrap();
        let loader = MemoryLoader::new().with_project(project);

        assert_eq!(
            loader.load_project(Path::new("/work/Engine")).unwrap().name(),
            "Engine"
        );
        assert!(matches!(
            loader.load_project(Path::new("/work/Other")),
            Err(GenError::Load { .. })
        ));
    }
}
