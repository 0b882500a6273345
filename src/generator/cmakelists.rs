//! `CMakeLists.txt` rendering.
//!
//! The text is assembled in memory, block by block:
//!
//! 1. header: standard pin, output directories, mode injection points and
//!    the activation predicate
//! 2. sub-projects (`add_subdirectory`)
//! 3. project and external dependencies (`find_package` / `add_subdirectory`)
//! 4. one guarded block per module: target, sources, includes, macros, links
//!    and install rules
//! 5. the export manifest, for installing projects
//!
//! Paths are written relative to the project directory with forward slashes.

use crate::error::{GenError, GenResult};
use crate::keys::{KeySet, cmake_guard, cmake_predicate};
use crate::model::{Definition, Module, Project, ProjectId, ProjectKind, Visibility};
use crate::paths::{rel_slashed, slashed};
use crate::registry::Registry;
use std::path::{Path, PathBuf};

const CMAKE_MINIMUM_VERSION: &str = "3.20";

/// Renders the build description of project `id`.
pub fn render_cmakelists(registry: &Registry, id: ProjectId) -> GenResult<String> {
    let mut writer = CmakeListsWriter {
        registry,
        project: registry.project(id),
        id,
        lines: Vec::new(),
    };
    writer.header();
    writer.sub_projects()?;
    writer.dependencies()?;
    writer.modules()?;
    writer.export();

    let mut text = writer.lines.join("\n");
    text.push('\n');
    Ok(text)
}

/// Upper-cased name usable inside a CMake variable name.
pub fn cmake_ident(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

struct CmakeListsWriter<'a> {
    registry: &'a Registry,
    project: &'a Project,
    id: ProjectId,
    lines: Vec<String>,
}

impl CmakeListsWriter<'_> {
    fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    fn guard(&mut self, required: &KeySet, var: &str, indent: &str) {
        self.lines.extend(cmake_guard(required, var, indent));
    }

    fn rel(&self, path: &Path) -> String {
        rel_slashed(path, self.project.path())
    }

    fn header(&mut self) {
        let project = self.project;
        self.push(format!("cmake_minimum_required(VERSION {CMAKE_MINIMUM_VERSION})"));
        self.push(format!("project({} LANGUAGES CXX)", project.name()));
        self.blank();
        self.push(format!("set(CMAKE_CXX_STANDARD {})", project.cxx_standard()));
        self.push("set(CMAKE_CXX_STANDARD_REQUIRED ON)");
        self.blank();

        let binaries = self.rel(project.binaries_dir());
        let archive = self.rel(project.archive_dir());
        let output = |var: &str, dir: &str| {
            format!("set({var} \"${{PROJECT_SOURCE_DIR}}/${{MODE_PATH}}/{dir}\")")
        };
        self.push(output("CMAKE_RUNTIME_OUTPUT_DIRECTORY", &binaries));
        self.push(output("CMAKE_LIBRARY_OUTPUT_DIRECTORY", &binaries));
        self.push(output("CMAKE_ARCHIVE_OUTPUT_DIRECTORY", &archive));
        if let Some(install) = project.install_dir() {
            let install = self.rel(install);
            self.push(output("CMAKE_INSTALL_PREFIX", &install));
        }
        self.blank();

        self.push("add_compile_definitions(${MODE_MACROS})");
        self.push("add_compile_options(${COMPILE_OPTIONS})");
        self.push("add_link_options(${LINK_OPTIONS})");
        self.blank();

        self.lines.extend(cmake_predicate());
        self.blank();
    }

    fn sub_projects(&mut self) -> GenResult<()> {
        let (registry, project) = (self.registry, self.project);
        self.push("# --- Sub-projects ---");
        for sub_project in project.sub_projects() {
            let sub = registry.project(sub_project.resolved()?);
            let var = format!("ACTIVATE_SUB_{}", cmake_ident(sub.name()));
            self.guard(sub.condition_keys(), &var, "");
            self.push(format!("    add_subdirectory({})", self.rel(sub.path())));
            self.push("endif()");
            self.blank();
        }
        self.blank();
        Ok(())
    }

    fn dependencies(&mut self) -> GenResult<()> {
        let (registry, project) = (self.registry, self.project);
        self.push("# --- Dependencies ---");

        for dependency in project.dependencies().iter() {
            let target = registry.project(dependency.resolved()?);
            let install = match target.install_dir() {
                Some(install) if target.should_install() => install,
                _ => {
                    return Err(GenError::config(format!(
                        "project '{}' depends on '{}', which must be installable to be found by find_package",
                        project.name(),
                        target.name()
                    )));
                }
            };
            let install = rel_slashed(install, target.path());
            let location = if dependency.use_relative_path() {
                format!("${{PROJECT_SOURCE_DIR}}/{}", self.rel(target.path()))
            } else {
                slashed(target.path())
            };

            let var = format!("ACTIVATE_DEP_{}", cmake_ident(target.name()));
            self.guard(dependency.required_keys(), &var, "");
            self.push(format!(
                "    find_package({} REQUIRED PATHS \"{location}/${{MODE_PATH}}/{install}\")",
                target.name()
            ));
            self.push("endif()");
            self.blank();
        }

        for dependency in project.external_dependencies().iter() {
            let target = registry.external_project(dependency.resolved()?);
            let install = if dependency.use_relative_path() {
                format!("${{PROJECT_SOURCE_DIR}}/{}", self.rel(target.install_dir()))
            } else {
                slashed(target.install_dir())
            };

            let var = format!("ACTIVATE_EXT_{}", cmake_ident(target.name()));
            self.guard(dependency.required_keys(), &var, "");
            match target.kind() {
                ProjectKind::Package => self.push(format!(
                    "    find_package({} REQUIRED PATHS \"{install}\")",
                    target.package_name()
                )),
                ProjectKind::Subdirectory => self.push(format!(
                    "    add_subdirectory(\"{install}\" \"${{CMAKE_CURRENT_BINARY_DIR}}/external/{}\")",
                    target.name()
                )),
            }
            self.push("endif()");
            self.blank();
        }
        self.blank();
        Ok(())
    }

    fn modules(&mut self) -> GenResult<()> {
        let project = self.project;
        self.push("# --- Modules ---");
        for module in project.modules().iter() {
            self.module(module)?;
        }
        Ok(())
    }

    fn module(&mut self, module: &Module) -> GenResult<()> {
        let name = module.name();
        let ident = cmake_ident(name);
        let interface = module.kind().is_interface();

        self.push(format!("# Module: {name}"));
        self.guard(module.condition_keys(), &format!("ACTIVATE_MOD_{ident}"), "");
        match module.kind().cmake_library_type() {
            Some(library_type) => self.push(format!("    add_library({name} {library_type})")),
            None => self.push(format!("    add_executable({name})")),
        }

        let public_sources = self.rel_all(module.sources(Visibility::Public));
        let private_sources = self.rel_all(module.sources(Visibility::Private));
        let public_includes = self.include_dirs(module, Visibility::Public)?;
        let private_includes = self.include_dirs(module, Visibility::Private)?;

        self.usage_block(
            "target_sources",
            name,
            "src",
            &public_sources,
            &private_sources,
            interface,
        );
        self.usage_block(
            "target_include_directories",
            name,
            "include",
            &public_includes,
            &private_includes,
            interface,
        );

        let public_macros = self.macros(module, Visibility::Public);
        let private_macros = self.macros(module, Visibility::Private);
        if interface {
            if !public_macros.is_empty() {
                self.push(format!(
                    "    target_compile_definitions({name} INTERFACE {})",
                    public_macros.join(" ")
                ));
            }
        } else {
            if !public_macros.is_empty() {
                self.push(format!(
                    "    target_compile_definitions({name} PUBLIC {})",
                    public_macros.join(" ")
                ));
            }
            if !private_macros.is_empty() {
                self.push(format!(
                    "    target_compile_definitions({name} PRIVATE {})",
                    private_macros.join(" ")
                ));
            }
        }

        self.blank();
        self.links(module)?;
        self.blank();

        if self.project.should_install() {
            self.install_rules(name, &public_includes, &public_sources);
        }

        self.push("endif()");
        self.blank();
        Ok(())
    }

    fn rel_all(&self, paths: &[PathBuf]) -> Vec<String> {
        paths.iter().map(|p| self.rel(p)).collect()
    }

    fn include_dirs(&self, module: &Module, visibility: Visibility) -> GenResult<Vec<String>> {
        module
            .includes(visibility)
            .iter()
            .map(|include| {
                if include.extension().is_some() {
                    return Err(GenError::config(format!(
                        "include entry '{}' of module '{}::{}' must be a directory",
                        include.display(),
                        self.project.name(),
                        module.name()
                    )));
                }
                Ok(self.rel(include))
            })
            .collect()
    }

    fn macros(&self, module: &Module, visibility: Visibility) -> Vec<String> {
        module
            .macros(visibility)
            .iter()
            .chain(self.project.macros(visibility))
            .cloned()
            .collect()
    }

    /// `target_sources` / `target_include_directories` with build and install
    /// interfaces. Interface targets only carry their public entries.
    fn usage_block(
        &mut self,
        command: &str,
        target: &str,
        install_root: &str,
        public: &[String],
        private: &[String],
        interface: bool,
    ) {
        let private = if interface { &[][..] } else { private };
        if public.is_empty() && private.is_empty() {
            return;
        }

        self.push(format!("    {command}({target}"));
        if !public.is_empty() {
            self.push(if interface {
                "        INTERFACE"
            } else {
                "        PUBLIC"
            });
            for entry in public {
                self.push(format!(
                    "            $<INSTALL_INTERFACE:{install_root}/{target}/{}>",
                    base_name(entry)
                ));
            }
            for entry in public {
                self.push(format!(
                    "            $<BUILD_INTERFACE:${{PROJECT_SOURCE_DIR}}/{entry}>"
                ));
            }
        }
        if !private.is_empty() {
            self.push("        PRIVATE");
            for entry in private {
                self.push(format!(
                    "            $<BUILD_INTERFACE:${{PROJECT_SOURCE_DIR}}/{entry}>"
                ));
            }
        }
        self.push("    )");
    }

    fn links(&mut self, module: &Module) -> GenResult<()> {
        let registry = self.registry;
        let name = module.name();
        let ident = cmake_ident(name);
        let interface = module.kind().is_interface();

        for visibility in [Visibility::Public, Visibility::Private] {
            let keyword = if interface {
                "INTERFACE"
            } else {
                visibility.keyword()
            };

            for dependency in module.dependencies().get(visibility) {
                let target_id = dependency.resolved()?;
                let target = registry.module(target_id).ok_or_else(|| {
                    GenError::UnknownTarget {
                        what: "module",
                        name: format!("{target_id:?}"),
                    }
                })?;
                let owner = registry.project(target_id.project);
                let link_name = if target_id.project == self.id {
                    target.name().to_string()
                } else {
                    format!("{}::{}", owner.name(), target.name())
                };
                let var = format!(
                    "{ident}_ACTIVATE_DEP_{}_{}",
                    cmake_ident(owner.name()),
                    cmake_ident(target.name())
                );
                self.guard(dependency.required_keys(), &var, "    ");
                self.push(format!(
                    "        target_link_libraries({name} {keyword} {link_name})"
                ));
                self.push("    endif()");
            }

            for dependency in module.external_dependencies().get(visibility) {
                let target_id = dependency.resolved()?;
                let target = registry.external_module(target_id).ok_or_else(|| {
                    GenError::UnknownTarget {
                        what: "external module",
                        name: format!("{target_id:?}"),
                    }
                })?;
                let owner = registry.external_project(target_id.project);
                let link_name = if target.use_absolute_name() {
                    target.library_name().to_string()
                } else {
                    format!("{}::{}", owner.name(), target.library_name())
                };
                let var = format!(
                    "{ident}_ACTIVATE_EXT_{}_{}",
                    cmake_ident(owner.name()),
                    cmake_ident(target.name())
                );
                self.guard(dependency.required_keys(), &var, "    ");
                self.push(format!(
                    "        target_link_libraries({name} {keyword} {link_name})"
                ));
                self.push("    endif()");
            }
        }
        Ok(())
    }

    fn install_rules(&mut self, target: &str, public_includes: &[String], public_sources: &[String]) {
        let project = self.project;
        let project = project.name();
        let ident = cmake_ident(target);

        self.push(format!("    install(TARGETS {target}"));
        self.push(format!("        EXPORT {project}Targets"));
        self.push("        ARCHIVE DESTINATION lib");
        self.push("        LIBRARY DESTINATION lib");
        self.push("        RUNTIME DESTINATION bin");
        self.push("    )");

        if !public_includes.is_empty() {
            self.push(format!("    set(PUBLIC_INC_{ident}"));
            for include in public_includes {
                self.push(format!("        \"${{PROJECT_SOURCE_DIR}}/{include}\""));
            }
            self.push("    )");
            self.push("    install(DIRECTORY");
            self.push(format!("        ${{PUBLIC_INC_{ident}}}"));
            self.push(format!("        DESTINATION include/{target}"));
            self.push("    )");
        }

        if !public_sources.is_empty() {
            self.push(format!("    set(PUBLIC_SRC_{ident}"));
            for source in public_sources {
                self.push(format!("        \"${{PROJECT_SOURCE_DIR}}/{source}\""));
            }
            self.push("    )");
            self.push("    install(FILES");
            self.push(format!("        ${{PUBLIC_SRC_{ident}}}"));
            self.push(format!("        DESTINATION src/{target}"));
            self.push("    )");
        }
    }

    fn export(&mut self) {
        if !self.project.should_install() || self.project.modules().is_empty() {
            return;
        }
        let project = self.project;
        let name = project.name();
        self.push(format!("install(EXPORT {name}Targets"));
        self.push(format!("    FILE {name}Config.cmake"));
        self.push(format!("    NAMESPACE {name}::"));
        self.push(format!("    DESTINATION lib/cmake/{name}"));
        self.push(")");
    }
}

fn base_name(entry: &str) -> &str {
    entry.rsplit('/').next().unwrap_or(entry)
}
