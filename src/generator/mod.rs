//! Build file generation.
//!
//! [`CmakeGenerator`] renders a `CMakeLists.txt` and a `CMakePresets.json`
//! for a root project and every project of its sub-project closure. All text
//! is produced before the first file is touched, so a rendering error leaves
//! the tree as it was.

mod clean;
mod cmakelists;
mod presets;

pub use clean::{CleanReport, clean};
pub use cmakelists::{cmake_ident, render_cmakelists};
pub use presets::{BuildMode, render_presets};

use crate::error::GenResult;
use crate::model::{Definition, ProjectId};
use crate::registry::Registry;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const CMAKELISTS_FILE: &str = "CMakeLists.txt";
pub const PRESETS_FILE: &str = "CMakePresets.json";
pub const BUILD_DIR: &str = "build";

/// A backend that turns a registered project into native build files.
pub trait MakefileGenerator {
    /// Writes the build files, returning the paths written in order.
    fn generate(&self, registry: &Registry, root: ProjectId) -> GenResult<Vec<PathBuf>>;

    /// Removes everything [`MakefileGenerator::generate`] produced, plus the
    /// build directory.
    fn clean(&self, registry: &Registry, root: ProjectId) -> GenResult<CleanReport>;
}

/// The CMake backend.
#[derive(Debug, Clone)]
pub struct CmakeGenerator {
    modes: Vec<BuildMode>,
}

impl CmakeGenerator {
    /// `modes` are the presets of the root project; sub-projects use their own.
    pub fn new(modes: Vec<BuildMode>) -> Self {
        Self { modes }
    }

    /// Renders every file without writing anything.
    pub fn render(&self, registry: &Registry, root: ProjectId) -> GenResult<Vec<(PathBuf, String)>> {
        let mut files = Vec::new();
        for id in registry.sub_project_closure(root)? {
            let project = registry.project(id);
            files.push((
                project.path().join(CMAKELISTS_FILE),
                render_cmakelists(registry, id)?,
            ));

            let modes = if id == root {
                &self.modes[..]
            } else {
                project.build_modes()
            };
            if let Some(presets) = render_presets(modes)? {
                files.push((project.path().join(PRESETS_FILE), presets));
            }
        }
        Ok(files)
    }
}

impl MakefileGenerator for CmakeGenerator {
    fn generate(&self, registry: &Registry, root: ProjectId) -> GenResult<Vec<PathBuf>> {
        let files = self.render(registry, root)?;
        let mut written = Vec::with_capacity(files.len());
        for (path, content) in files {
            write_atomic(&path, &content)?;
            written.push(path);
        }
        Ok(written)
    }

    fn clean(&self, registry: &Registry, root: ProjectId) -> GenResult<CleanReport> {
        clean(registry, root)
    }
}

/// Replaces `path` with `content` through a temporary file in the same
/// directory.
fn write_atomic(path: &Path, content: &str) -> GenResult<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::MemoryLoader;
    use crate::model::Project;

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CMAKELISTS_FILE);
        fs::write(&path, "old").unwrap();

        write_atomic(&path, "new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_render_covers_sub_projects() {
        let mut registry = Registry::new(MemoryLoader::new());
        let tools = registry
            .register(
                Project::new("Tools", "/work/Game/Tools")
                    .unwrap()
                    .with_build_modes(Vec::new()),
            )
            .unwrap();
        let game = Project::new("Game", "/work/Game")
            .unwrap()
            .with_sub_project(crate::model::ProjectRef::Resolved(tools));
        let game = registry.register(game).unwrap();

        let generator = registry.project(game).generator();
        let files = generator.render(&registry, game).unwrap();
        let paths: Vec<_> = files.iter().map(|(p, _)| p.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/work/Game/CMakeLists.txt"),
                PathBuf::from("/work/Game/CMakePresets.json"),
                PathBuf::from("/work/Game/Tools/CMakeLists.txt"),
            ]
        );
    }
}
