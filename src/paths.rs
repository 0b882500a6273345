//! Path rendering for generated build files.
//!
//! Generated text always uses forward slashes and paths relative to the
//! project being rendered, so the output is identical on every host.

use std::path::{Component, Path, PathBuf};

/// Lexically normalizes `path`, folding `.` and `..` components.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// `path` expressed relative to `base`, stepping up with `..` where the two
/// diverge. Both are expected to be absolute.
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let path = normalize(path);
    let base = normalize(base);

    let mut path_iter = path.components().peekable();
    let mut base_iter = base.components().peekable();
    while let (Some(a), Some(b)) = (path_iter.peek(), base_iter.peek()) {
        if a != b {
            break;
        }
        path_iter.next();
        base_iter.next();
    }

    let mut out = PathBuf::new();
    for _ in base_iter {
        out.push("..");
    }
    for component in path_iter {
        out.push(component.as_os_str());
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Renders a path with forward slashes.
pub fn slashed(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Shorthand for `slashed(relative_to(path, base))`.
pub fn rel_slashed(path: &Path, base: &Path) -> String {
    slashed(&relative_to(path, base))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_to_child() {
        assert_eq!(
            rel_slashed(Path::new("/work/Engine/Core/public"), Path::new("/work/Engine")),
            "Core/public"
        );
    }

    #[test]
    fn test_relative_to_sibling() {
        assert_eq!(
            rel_slashed(Path::new("/work/Engine"), Path::new("/work/Game")),
            "../Engine"
        );
    }

    #[test]
    fn test_relative_to_self() {
        assert_eq!(rel_slashed(Path::new("/work/Game"), Path::new("/work/Game")), ".");
    }

    #[test]
    fn test_normalize_folds_dot_components() {
        assert_eq!(
            normalize(Path::new("/work/Game/../Engine/./Core")),
            PathBuf::from("/work/Engine/Core")
        );
    }
}
