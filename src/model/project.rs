use crate::error::{GenError, GenResult};
use crate::generator::{BuildMode, CmakeGenerator};
use crate::keys::KeySet;
use std::path::{Path, PathBuf};

use super::{
    Definition, ExternalProjectDependency, Module, ProjectDependency, ProjectId, ProjectRef,
    Scoped, Visibility, require_absolute, require_name, to_abs_path,
};

pub const DEFAULT_BINARIES_DIR: &str = "binaries";
pub const DEFAULT_ARCHIVE_DIR: &str = "archive";
pub const DEFAULT_CACHE_DIR: &str = "cache";
pub const DEFAULT_INSTALL_DIR: &str = "install";
pub const DEFAULT_CXX_STANDARD: u32 = 17;

/// A top-level buildable unit owning modules.
#[derive(Debug, Clone)]
pub struct Project {
    name: String,
    path: PathBuf,
    condition_keys: KeySet,
    binaries_dir: PathBuf,
    archive_dir: PathBuf,
    cache_dir: PathBuf,
    install_dir: Option<PathBuf>,
    should_install: bool,
    cxx_standard: u32,
    macros: Scoped<String>,
    modules: Scoped<Module>,
    dependencies: Scoped<ProjectDependency>,
    sub_projects: Vec<ProjectRef<ProjectId>>,
    external_dependencies: Scoped<ExternalProjectDependency>,
    build_modes: Vec<BuildMode>,
}

impl Project {
    /// A project installing into `<path>/install` with default output directories.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> GenResult<Self> {
        let name = require_name("project", name.into())?;
        let path = require_absolute("project", &name, path.into())?;
        Ok(Self {
            binaries_dir: path.join(DEFAULT_BINARIES_DIR),
            archive_dir: path.join(DEFAULT_ARCHIVE_DIR),
            cache_dir: path.join(DEFAULT_CACHE_DIR),
            install_dir: Some(path.join(DEFAULT_INSTALL_DIR)),
            name,
            path,
            condition_keys: KeySet::always(),
            should_install: true,
            cxx_standard: DEFAULT_CXX_STANDARD,
            macros: Scoped::default(),
            modules: Scoped::default(),
            dependencies: Scoped::default(),
            sub_projects: Vec::new(),
            external_dependencies: Scoped::default(),
            build_modes: BuildMode::defaults(),
        })
    }

    pub fn with_condition_keys(mut self, keys: KeySet) -> Self {
        self.condition_keys = keys.non_empty();
        self
    }

    pub fn with_binaries_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.binaries_dir = to_abs_path(&self.path, dir);
        self
    }

    pub fn with_archive_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.archive_dir = to_abs_path(&self.path, dir);
        self
    }

    pub fn with_cache_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cache_dir = to_abs_path(&self.path, dir);
        self
    }

    /// Sets the install policy. An installing project needs an install
    /// directory; `None` keeps the current one (the default `install/`).
    pub fn with_install(mut self, should_install: bool, dir: Option<&Path>) -> GenResult<Self> {
        self.should_install = should_install;
        if let Some(dir) = dir {
            self.install_dir = Some(to_abs_path(&self.path, dir));
        }
        if should_install && self.install_dir.is_none() {
            return Err(GenError::MissingField {
                entity: format!("installable project '{}'", self.name),
                field: "install_dir",
            });
        }
        Ok(self)
    }

    pub fn without_install(mut self) -> Self {
        self.should_install = false;
        self
    }

    pub fn with_cxx_standard(mut self, standard: u32) -> Self {
        self.cxx_standard = standard;
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

    pub fn with_module(mut self, visibility: Visibility, module: Module) -> Self {
        self.modules.get_mut(visibility).push(module);
        self
    }

    pub fn depends_on(mut self, visibility: Visibility, dependency: ProjectDependency) -> Self {
        self.dependencies.get_mut(visibility).push(dependency);
        self
    }

    pub fn depends_on_external(
        mut self,
        visibility: Visibility,
        dependency: ExternalProjectDependency,
    ) -> Self {
        self.external_dependencies
            .get_mut(visibility)
            .push(dependency);
        self
    }

    pub fn with_sub_project(mut self, sub_project: ProjectRef<ProjectId>) -> Self {
        self.sub_projects.push(sub_project);
        self
    }

    /// Adds a sub-project by directory, relative to this project's path.
    pub fn with_sub_project_dir(self, dir: impl AsRef<Path>) -> Self {
        let dir = to_abs_path(&self.path, dir);
        self.with_sub_project(ProjectRef::Located(dir))
    }

    pub fn with_build_modes(mut self, modes: Vec<BuildMode>) -> Self {
        self.build_modes = modes;
        self
    }

    pub fn binaries_dir(&self) -> &Path {
        &self.binaries_dir
    }

    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// The install directory; present whenever the project installs.
    pub fn install_dir(&self) -> Option<&Path> {
        if self.should_install {
            self.install_dir.as_deref()
        } else {
            None
        }
    }

    pub fn should_install(&self) -> bool {
        self.should_install
    }

    pub fn cxx_standard(&self) -> u32 {
        self.cxx_standard
    }

    pub fn macros(&self, visibility: Visibility) -> &[String] {
        self.macros.get(visibility)
    }

    pub fn modules(&self) -> &Scoped<Module> {
        &self.modules
    }

    pub(crate) fn modules_mut(&mut self) -> &mut Scoped<Module> {
        &mut self.modules
    }

    /// Locates a module by name among public then private modules.
    pub fn find_module(&self, name: &str) -> Option<(Visibility, usize)> {
        [Visibility::Public, Visibility::Private]
            .into_iter()
            .find_map(|visibility| {
                self.modules
                    .get(visibility)
                    .iter()
                    .position(|m| m.name() == name)
                    .map(|index| (visibility, index))
            })
    }

    pub fn dependencies(&self) -> &Scoped<ProjectDependency> {
        &self.dependencies
    }

    pub(crate) fn dependencies_mut(&mut self) -> &mut Scoped<ProjectDependency> {
        &mut self.dependencies
    }

    pub fn sub_projects(&self) -> &[ProjectRef<ProjectId>] {
        &self.sub_projects
    }

    pub(crate) fn sub_projects_mut(&mut self) -> &mut Vec<ProjectRef<ProjectId>> {
        &mut self.sub_projects
    }

    pub fn external_dependencies(&self) -> &Scoped<ExternalProjectDependency> {
        &self.external_dependencies
    }

    pub(crate) fn external_dependencies_mut(&mut self) -> &mut Scoped<ExternalProjectDependency> {
        &mut self.external_dependencies
    }

    pub fn build_modes(&self) -> &[BuildMode] {
        &self.build_modes
    }

    /// The generator facade producing this project's build files.
    pub fn generator(&self) -> CmakeGenerator {
        CmakeGenerator::new(self.build_modes.clone())
    }
}

impl Definition for Project {
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
