//! Output route: mapping → destination directory, file name, map root.

use std::path::{Path, PathBuf};

use crate::config::AssetMapping;
use crate::utils::path::{relative_path, to_slash};

/// Where a mapping's artifacts go.
///
/// Pure function of the mapping; nothing here touches the file system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// Everything in the output path before the final separator
    pub dest_dir: PathBuf,
    /// Final segment of the output path
    pub file_name: String,
    /// Source directory as seen from `dest_dir` (source-map `sourceRoot`)
    pub map_root: String,
}

impl OutputPaths {
    pub fn resolve(mapping: &AssetMapping) -> Self {
        let text = mapping.output.to_string_lossy();
        let (dest_dir, file_name) = match text.rfind(['/', '\\']) {
            Some(idx) => (PathBuf::from(&text[..idx]), text[idx + 1..].to_string()),
            None => (PathBuf::new(), text.into_owned()),
        };

        let relative = relative_path(&dest_dir, mapping.source_dir());
        let map_root = if relative.as_os_str().is_empty() {
            ".".to_string()
        } else {
            to_slash(&relative)
        };

        Self {
            dest_dir,
            file_name,
            map_root,
        }
    }

    /// Full path of the compiled artifact.
    pub fn output_file(&self) -> PathBuf {
        self.dest_dir.join(&self.file_name)
    }

    /// File name of the companion source map (`<file>.map`).
    pub fn map_file_name(&self) -> String {
        format!("{}.map", self.file_name)
    }

    /// Full path of the companion source map.
    pub fn map_file(&self) -> PathBuf {
        self.dest_dir.join(self.map_file_name())
    }

    /// A source path as listed in the map: relative to the source root.
    pub fn map_source(&self, source_dir: &Path, file: &Path) -> String {
        to_slash(&relative_path(source_dir, file))
    }
}
