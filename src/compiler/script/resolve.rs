//! Node-style module resolution through `oxc_resolver`.
//!
//! Relative and absolute specifiers resolve against the importing file's
//! directory. Bare specifiers are looked up in `node_modules` directories
//! walking upward, then in the mapping's search path. Package entries
//! prefer the `browser` field over `main`.

use std::path::{Path, PathBuf};

use oxc_resolver::{ResolveOptions, Resolver as NodeResolver};

/// Extensions tried for extensionless specifiers, in order.
const EXTENSIONS: &[&str] = &[".js", ".mjs", ".cjs", ".json"];

/// One resolver per build; its file-system cache is dropped with it.
pub struct Resolver {
    inner: NodeResolver,
}

impl Resolver {
    pub fn new(search_path: Option<PathBuf>) -> Self {
        let mut modules = vec!["node_modules".to_string()];
        if let Some(dir) = search_path {
            modules.push(dir.to_string_lossy().into_owned());
        }

        let options = ResolveOptions {
            extensions: EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            main_fields: vec!["browser".into(), "main".into()],
            alias_fields: vec![vec!["browser".into()]],
            condition_names: vec!["browser".into(), "require".into()],
            modules,
            symlinks: false,
            ..ResolveOptions::default()
        };
        Self {
            inner: NodeResolver::new(options),
        }
    }

    /// Resolve `specifier` as required from a file in `from_dir`.
    pub fn resolve(&self, specifier: &str, from_dir: &Path) -> Option<PathBuf> {
        match self.inner.resolve(from_dir, specifier) {
            Ok(resolution) => Some(resolution.into_path_buf()),
            Err(err) => {
                crate::debug!("js"; "cannot resolve `{}` from {}: {}", specifier, from_dir.display(), err);
                None
            }
        }
    }

    /// Resolve a file or directory path, trying extensions and index files.
    pub fn resolve_path(&self, path: &Path) -> Option<PathBuf> {
        let dir = path.parent().unwrap_or(Path::new("/"));
        self.resolve(&path.to_string_lossy(), dir)
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, rel: &str, content: &str) -> PathBuf {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_relative_with_extensions() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let util = touch(root, "app/utils/dom.js", "");
        let data = touch(root, "app/data.json", "{}");
        let resolver = Resolver::default();
        let from = root.join("app");

        assert_eq!(resolver.resolve("./utils/dom", &from), Some(util.clone()));
        assert_eq!(resolver.resolve("./utils/dom.js", &from), Some(util));
        assert_eq!(resolver.resolve("./data", &from), Some(data));
        assert_eq!(resolver.resolve("./missing", &from), None);
    }

    #[test]
    fn test_directory_index() {
        let dir = TempDir::new().unwrap();
        let index = touch(dir.path(), "app/ui/index.js", "");
        let resolver = Resolver::default();
        assert_eq!(resolver.resolve("./ui", &dir.path().join("app")), Some(index));
    }

    #[test]
    fn test_node_modules_walk_and_package_main() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "node_modules/lodash/package.json", r#"{ "main": "lib/lodash" }"#);
        let main = touch(root, "node_modules/lodash/lib/lodash.js", "");
        touch(root, "node_modules/widget/package.json", r#"{ "browser": "dist/browser.js", "main": "node.js" }"#);
        let browser = touch(root, "node_modules/widget/dist/browser.js", "");
        touch(root, "node_modules/widget/node.js", "");
        fs::create_dir_all(root.join("app/deep/er")).unwrap();

        let resolver = Resolver::default();
        let from = root.join("app/deep/er");
        assert_eq!(resolver.resolve("lodash", &from), Some(main));
        assert_eq!(resolver.resolve("widget", &from), Some(browser));
    }

    #[test]
    fn test_search_path_fallback() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let lib = touch(root, "vendor/jquery.js", "");
        fs::create_dir_all(root.join("app")).unwrap();
        let resolver = Resolver::new(Some(root.join("vendor")));
        assert_eq!(resolver.resolve("jquery", &root.join("app")), Some(lib));
        assert_eq!(Resolver::default().resolve("jquery", &root.join("app")), None);
    }

    #[test]
    fn test_resolve_path_without_extension() {
        let dir = TempDir::new().unwrap();
        let lib = touch(dir.path(), "js/tooltips.js", "");
        let resolver = Resolver::default();
        assert_eq!(resolver.resolve_path(&dir.path().join("js/tooltips")), Some(lib.clone()));
        assert_eq!(resolver.resolve_path(&lib), Some(lib));
        assert_eq!(resolver.resolve_path(&dir.path().join("js/nope")), None);
    }
}
