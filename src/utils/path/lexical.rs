//! Lexical path arithmetic.
//!
//! Nothing here touches the file system: manifests name outputs that may
//! not exist yet, and source-map roots must be computed before writing.

use std::path::{Component, Path, PathBuf};

/// Remove `.` components and fold `name/..` pairs.
///
/// Leading `..` components of a relative path are kept; `..` directly
/// below the root is dropped.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().collect()
}

/// Relative path that leads from directory `from` to `to`.
///
/// Both paths are cleaned first and must be anchored the same way (both
/// absolute or both relative to a common base). An empty result means the
/// directories are the same.
///
/// ```ignore
/// relative_path(Path::new("a/css-compiled"), Path::new("a/scss")) == "../scss"
/// ```
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from = clean_path(from);
    let to = clean_path(to);
    let from: Vec<_> = from.components().collect();
    let to: Vec<_> = to.components().collect();

    let common = from
        .iter()
        .zip(&to)
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..from.len() {
        out.push("..");
    }
    for component in &to[common..] {
        out.push(component.as_os_str());
    }
    out
}

/// Render a path with forward slashes, as used in source maps and logs.
pub fn to_slash(path: &Path) -> String {
    let text = path.to_string_lossy();
    if cfg!(windows) {
        text.replace('\\', "/")
    } else {
        text.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path(Path::new("./a/b/../c")), PathBuf::from("a/c"));
        assert_eq!(clean_path(Path::new("../a/./b")), PathBuf::from("../a/b"));
        assert_eq!(clean_path(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(clean_path(Path::new("a/..")), PathBuf::new());
    }

    #[test]
    fn test_relative_sibling() {
        let rel = relative_path(
            Path::new("platforms/common/css-compiled"),
            Path::new("platforms/common/scss"),
        );
        assert_eq!(rel, PathBuf::from("../scss"));
    }

    #[test]
    fn test_relative_same_dir() {
        let rel = relative_path(Path::new("./js"), Path::new("js"));
        assert_eq!(rel, PathBuf::new());
    }

    #[test]
    fn test_relative_nested() {
        let rel = relative_path(Path::new("dist"), Path::new("src/app/styles"));
        assert_eq!(rel, PathBuf::from("../src/app/styles"));
        let rel = relative_path(Path::new("a/b/c"), Path::new("a"));
        assert_eq!(rel, PathBuf::from("../.."));
    }
}
