use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use crate::config::{AssetMapping, MappingKind};
use crate::utils::path::normalize_path;

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

/// Which paths concern one mapping.
#[derive(Debug, Clone)]
pub struct WatchTarget {
    /// Directories watched recursively
    pub roots: Vec<PathBuf>,
    extensions: &'static [&'static str],
    /// The mapping's own artifacts, never a trigger
    outputs: [PathBuf; 2],
    /// Files read by the last successful build
    inputs: FxHashSet<PathBuf>,
}

impl WatchTarget {
    /// Source directory, search path and exposed library directories.
    ///
    /// Roots nested inside another root are dropped.
    pub fn new(kind: MappingKind, mapping: &AssetMapping) -> Self {
        let mut candidates = vec![mapping.source_dir()];
        candidates.extend(mapping.search_path.as_deref());
        candidates.extend(mapping.expose.iter().filter_map(|e| e.lib.parent()));

        let mut roots: Vec<PathBuf> = Vec::with_capacity(candidates.len());
        for candidate in candidates.into_iter().map(normalize_path) {
            if roots.iter().any(|root| candidate.starts_with(root)) {
                continue;
            }
            roots.retain(|root| !root.starts_with(&candidate));
            roots.push(candidate);
        }

        let mut map = mapping.output.clone().into_os_string();
        map.push(".map");

        Self {
            roots,
            extensions: kind.watch_extensions(),
            outputs: [normalize_path(&mapping.output), normalize_path(Path::new(&map))],
            inputs: FxHashSet::default(),
        }
    }

    /// Remember the files a build read.
    ///
    /// Returns the directories of those lying outside every root, sorted;
    /// they need their own (non-recursive) watches.
    pub fn track_inputs(&mut self, inputs: &[PathBuf]) -> Vec<PathBuf> {
        self.inputs = inputs.iter().map(|path| normalize_path(path)).collect();

        let mut dirs: Vec<PathBuf> = self
            .inputs
            .iter()
            .filter(|path| !self.roots.iter().any(|root| path.starts_with(root)))
            .filter_map(|path| path.parent().map(Path::to_path_buf))
            .collect();
        dirs.sort();
        dirs.dedup();
        dirs
    }

    /// Whether a change to `path` should trigger a rebuild.
    ///
    /// Known inputs always do; other files must sit under a root and carry
    /// one of the compiler's extensions.
    pub fn is_relevant(&self, path: &Path) -> bool {
        if self.outputs.iter().any(|out| out == path) {
            return false;
        }
        if self.inputs.contains(path) {
            return true;
        }
        if !self.roots.iter().any(|root| path.starts_with(root)) {
            return false;
        }
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
    }
}
