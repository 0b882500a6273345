//! Source pattern expansion.
//!
//! A source entry in a module file may be a literal file, a directory (every
//! file below it) or a glob pattern such as `private/**/*.cpp`.

use crate::error::{GenError, GenResult};
use globset::{GlobBuilder, GlobSetBuilder};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

const GLOB_CHARS: &[char] = &['*', '?', '['];

pub fn is_glob(pattern: &str) -> bool {
    pattern.contains(GLOB_CHARS)
}

/// Expands `path` into the files it denotes, sorted.
///
/// A glob that matches nothing yields an empty list. A non-glob path that is
/// neither a file nor a directory is a [`GenError::Load`].
pub fn find_files(path: &Path) -> GenResult<Vec<PathBuf>> {
    let raw = path.to_string_lossy().replace('\\', "/");

    let mut found = if is_glob(&raw) {
        expand_glob(&raw)?
    } else if path.is_file() {
        vec![path.to_path_buf()]
    } else if path.is_dir() {
        WalkDir::new(path)
            .min_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect()
    } else {
        return Err(GenError::Load {
            path: path.to_path_buf(),
            message: "no such file or directory".to_string(),
        });
    };

    found.sort();
    Ok(found)
}

fn expand_glob(pattern: &str) -> GenResult<Vec<PathBuf>> {
    let invalid = |e: globset::Error| GenError::Load {
        path: PathBuf::from(pattern),
        message: format!("invalid glob: {e}"),
    };
    let mut builder = GlobSetBuilder::new();
    builder.add(
        GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(invalid)?,
    );
    let set = builder.build().map_err(invalid)?;

    let root = literal_prefix(pattern);
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    Ok(WalkDir::new(&root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| set.is_match(p.to_string_lossy().replace('\\', "/")))
        .collect())
}

/// The leading directories of `pattern` that contain no glob characters.
fn literal_prefix(pattern: &str) -> PathBuf {
    let mut root = PathBuf::new();
    for component in Path::new(pattern).components() {
        if let Component::Normal(part) = component
            && is_glob(&part.to_string_lossy())
        {
            break;
        }
        root.push(component.as_os_str());
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_literal_file_is_returned_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("main.cpp");
        touch(&file);
        assert_eq!(find_files(&file).unwrap(), vec![file]);
    }

    #[test]
    fn test_directory_is_walked_recursively() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("private/b.cpp"));
        touch(&dir.path().join("private/nested/a.cpp"));

        let files = find_files(&dir.path().join("private")).unwrap();
        assert_eq!(
            files,
            vec![
                dir.path().join("private/b.cpp"),
                dir.path().join("private/nested/a.cpp"),
            ]
        );
    }

    #[test]
    fn test_glob_matches_recursively() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("src/a.cpp"));
        touch(&dir.path().join("src/deep/b.cpp"));
        touch(&dir.path().join("src/deep/b.h"));

        let pattern = dir.path().join("src/**/*.cpp");
        let files = find_files(&pattern).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("src/a.cpp"), dir.path().join("src/deep/b.cpp")]
        );
    }

    #[test]
    fn test_glob_without_matches_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = dir.path().join("missing/*.cpp");
        assert!(find_files(&pattern).unwrap().is_empty());
    }

    #[test]
    fn test_missing_path_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_files(&dir.path().join("nope.cpp")).unwrap_err();
        assert!(matches!(err, GenError::Load { .. }));
    }

    #[test]
    fn test_literal_prefix() {
        assert_eq!(literal_prefix("/a/b/**/*.cpp"), PathBuf::from("/a/b"));
        assert_eq!(literal_prefix("/a/b/c?.cpp"), PathBuf::from("/a/b"));
    }
}
