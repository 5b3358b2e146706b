//! Writing compiled artifacts and their source maps.

use std::fs;
use std::path::PathBuf;

use crate::asset::OutputPaths;

use super::error::WriteError;
use super::sourcemap::SourceMap;

/// What to do with `<file>.map` when no map is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleMap {
    Remove,
    Keep,
}

/// Written artifact: byte size and map path, if any.
pub struct Written {
    pub bytes: u64,
    pub map: Option<PathBuf>,
}

/// Write `code` (and `map`) to the mapping's destination.
///
/// Creates the destination directory. Only called after compilation
/// succeeded, so a failed build never leaves a partial file behind.
pub fn write_output(
    paths: &OutputPaths,
    code: &str,
    map: Option<&SourceMap>,
    stale: StaleMap,
) -> Result<Written, WriteError> {
    let wrap = |path: PathBuf| move |error: std::io::Error| WriteError { path, error };

    if !paths.dest_dir.as_os_str().is_empty() {
        fs::create_dir_all(&paths.dest_dir).map_err(wrap(paths.dest_dir.clone()))?;
    }

    let output = paths.output_file();
    fs::write(&output, code).map_err(wrap(output.clone()))?;

    let map_file = paths.map_file();
    let map = match map {
        Some(map) => {
            fs::write(&map_file, map.to_json()).map_err(wrap(map_file.clone()))?;
            Some(map_file)
        }
        None => {
            if stale == StaleMap::Remove && map_file.is_file() {
                fs::remove_file(&map_file).map_err(wrap(map_file.clone()))?;
            }
            None
        }
    };

    Ok(Written {
        bytes: code.len() as u64,
        map,
    })
}
