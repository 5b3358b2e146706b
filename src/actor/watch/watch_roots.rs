use std::path::PathBuf;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;

/// Keeps the watcher attached to the target's root directories.
///
/// Roots missing at startup, or deleted and recreated later, are attached
/// as soon as they exist. Directories of dependencies outside the roots are
/// watched non-recursively and follow the latest build's inputs.
pub(super) struct WatchRoots {
    desired: Vec<PathBuf>,
    dependency_dirs: Vec<PathBuf>,
    attached: FxHashSet<PathBuf>,
}

impl WatchRoots {
    pub(super) fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            desired: paths,
            dependency_dirs: Vec::new(),
            attached: FxHashSet::default(),
        }
    }

    fn wanted(&self) -> impl Iterator<Item = (&PathBuf, RecursiveMode)> {
        self.desired
            .iter()
            .map(|path| (path, RecursiveMode::Recursive))
            .chain(
                self.dependency_dirs
                    .iter()
                    .map(|path| (path, RecursiveMode::NonRecursive)),
            )
    }

    pub(super) fn attach_existing(&mut self, watcher: &mut RecommendedWatcher) -> notify::Result<()> {
        for path in self.desired.iter().filter(|p| p.is_dir()) {
            watcher.watch(path, RecursiveMode::Recursive)?;
            self.attached.insert(path.clone());
        }
        Ok(())
    }

    pub(super) fn maintain(&mut self, watcher: &mut RecommendedWatcher) {
        self.attached.retain(|path| path.exists());

        let mut newly = Vec::new();
        for (path, mode) in self.wanted() {
            if self.attached.contains(path) || !path.is_dir() {
                continue;
            }
            if watcher.watch(path, mode).is_ok() {
                newly.push(path.clone());
            }
        }
        for path in newly {
            crate::debug!("watch"; "attached watch: {}", path.display());
            self.attached.insert(path);
        }
    }

    /// Replace the dependency directories, detaching those no longer needed.
    pub(super) fn set_dependency_dirs(&mut self, watcher: &mut RecommendedWatcher, dirs: Vec<PathBuf>) {
        for stale in self.dependency_dirs.iter().filter(|dir| !dirs.contains(dir)) {
            if self.attached.remove(stale) {
                let _ = watcher.unwatch(stale);
            }
        }
        self.dependency_dirs = dirs;
        self.maintain(watcher);
    }

    pub(super) fn attached(&self) -> usize {
        self.attached.len()
    }
}
