//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find the manifest by searching upward from the current directory
///
/// Returns the absolute path to the manifest if found
///
/// # Example
/// ```text
/// /home/user/project/platforms/common/  ← cwd
/// /home/user/project/kiln.toml          ← found!
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_file_from(&cwd, config_name)
}

/// Walk up from `start` looking for `config_name`.
pub fn find_config_file_from(start: &Path, config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}
