use std::path::PathBuf;

use rustc_hash::FxHashMap;

use super::types::{ChangeKind, WatchTarget};

/// Turns raw debounced changes into the ones that concern a target.
pub(super) struct EventClassifier;

impl EventClassifier {
    /// Reconcile with the file system, drop irrelevant paths, sort by path.
    pub(super) fn classify(
        raw: FxHashMap<PathBuf, ChangeKind>,
        target: &WatchTarget,
    ) -> Option<Vec<(PathBuf, ChangeKind)>> {
        let mut changes: Vec<_> = raw
            .into_iter()
            .filter(|(path, _)| target.is_relevant(path))
            .filter_map(|(path, kind)| Self::correct_by_existence(path, kind))
            .collect();

        if changes.is_empty() {
            return None;
        }
        changes.sort_by(|a, b| a.0.cmp(&b.0));
        Some(changes)
    }

    /// Editors that save atomically report stale kinds; trust the disk.
    fn correct_by_existence(path: PathBuf, kind: ChangeKind) -> Option<(PathBuf, ChangeKind)> {
        let exists = path.exists();
        let kind = match kind {
            ChangeKind::Created if !exists => return None,
            ChangeKind::Modified if !exists => ChangeKind::Removed,
            ChangeKind::Removed if exists => ChangeKind::Modified,
            kind => kind,
        };
        Some((path, kind))
    }
}
