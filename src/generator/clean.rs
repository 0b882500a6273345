//! Removal of generated files.
//!
//! Cleaning is best effort: every project of the sub-project closure is
//! visited and a failure on one artifact does not stop the others.

use crate::error::GenResult;
use crate::model::{Definition, ProjectId};
use crate::registry::Registry;
use colored::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{BUILD_DIR, CMAKELISTS_FILE, PRESETS_FILE};

#[derive(Debug, Default)]
pub struct CleanReport {
    pub removed: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, io::Error)>,
}

impl CleanReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn print(&self) {
        for path in &self.removed {
            println!("{} Removed {}", "🗑️".red(), path.display());
        }
        for (path, err) in &self.failures {
            println!("{} Failed to remove {}: {}", "x".red(), path.display(), err);
        }

        if !self.failures.is_empty() {
            println!("{} Clean finished with {} failure(s).", "!".yellow(), self.failures.len());
        } else if self.removed.is_empty() {
            println!("{} Nothing to clean", "!".yellow());
        } else {
            println!("{} Clean complete.", "✓".green());
        }
    }

    fn remove_with<F>(&mut self, path: PathBuf, remove: &F)
    where
        F: Fn(&Path) -> io::Result<()>,
    {
        if !path.exists() {
            return;
        }
        match remove(&path) {
            Ok(()) => self.removed.push(path),
            Err(err) => self.failures.push((path, err)),
        }
    }
}

/// Deletes the generated build files and the build directory of every
/// transitive sub-project of `root`, then of `root` itself.
pub fn clean(registry: &Registry, root: ProjectId) -> GenResult<CleanReport> {
    let mut report = CleanReport::default();
    for id in registry.sub_project_closure(root)?.into_iter().rev() {
        clean_dir(registry.project(id).path(), &mut report, &remove_path);
    }
    Ok(report)
}

fn clean_dir<F>(dir: &Path, report: &mut CleanReport, remove: &F)
where
    F: Fn(&Path) -> io::Result<()>,
{
    report.remove_with(dir.join(CMAKELISTS_FILE), remove);
    report.remove_with(dir.join(PRESETS_FILE), remove);
    report.remove_with(dir.join(BUILD_DIR), remove);
}

fn remove_path(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_dir_removes_generated_files_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CMAKELISTS_FILE), "").unwrap();
        fs::create_dir_all(dir.path().join(BUILD_DIR).join("debug")).unwrap();
        fs::write(dir.path().join("project.toml"), "").unwrap();

        let mut report = CleanReport::default();
        clean_dir(dir.path(), &mut report, &remove_path);

        assert!(report.is_clean());
        assert_eq!(report.removed.len(), 2);
        assert!(!dir.path().join(CMAKELISTS_FILE).exists());
        assert!(!dir.path().join(BUILD_DIR).exists());
        assert!(dir.path().join("project.toml").exists());
    }

    #[test]
    fn test_clean_dir_on_empty_dir_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut report = CleanReport::default();
        clean_dir(dir.path(), &mut report, &remove_path);
        assert!(report.removed.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn test_clean_dir_continues_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CMAKELISTS_FILE), "").unwrap();
        fs::write(dir.path().join(PRESETS_FILE), "").unwrap();
        fs::create_dir_all(dir.path().join(BUILD_DIR)).unwrap();

        let locked = |path: &Path| {
            if path.ends_with(CMAKELISTS_FILE) {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked"))
            } else {
                remove_path(path)
            }
        };
        let mut report = CleanReport::default();
        clean_dir(dir.path(), &mut report, &locked);

        assert!(!report.is_clean());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, dir.path().join(CMAKELISTS_FILE));
        assert_eq!(
            report.removed,
            [dir.path().join(PRESETS_FILE), dir.path().join(BUILD_DIR)]
        );
        assert!(dir.path().join(CMAKELISTS_FILE).exists());
        assert!(!dir.path().join(BUILD_DIR).exists());
    }
}
