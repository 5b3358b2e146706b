//! SCSS → CSS via grass.
//!
//! Imports resolve relative to the importing file first, then the mapping's
//! search path. Every file grass reads goes through [`TrackingFs`], which
//! yields the dependency list and the source-map sources.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use grass::{Options, OutputStyle};
use parking_lot::Mutex;

use crate::asset::OutputPaths;
use crate::config::AssetMapping;
use crate::core::BuildMode;
use crate::utils::path::clean_path;

use super::output::{StaleMap, write_output};
use super::sourcemap::SourceMapBuilder;
use super::{CompileError, CompiledAsset, IoOp};

/// File system adapter that records what the compiler loads.
#[derive(Debug, Default)]
struct TrackingFs {
    loaded: Mutex<Vec<(PathBuf, String)>>,
}

impl TrackingFs {
    fn into_loaded(self) -> Vec<(PathBuf, String)> {
        self.loaded.into_inner()
    }
}

impl grass::Fs for TrackingFs {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let bytes = fs::read(path)?;
        let path = clean_path(path);
        let mut loaded = self.loaded.lock();
        if !loaded.iter().any(|(p, _)| *p == path) {
            loaded.push((path, String::from_utf8_lossy(&bytes).into_owned()));
        }
        Ok(bytes)
    }
}

/// Compile one stylesheet mapping.
///
/// Development: expanded output, full diagnostics, companion `.map`.
/// Production: compressed output, first diagnostic line only, no map.
pub fn compile_style(mapping: &AssetMapping, mode: BuildMode) -> Result<CompiledAsset, CompileError> {
    let start = Instant::now();

    if let Some(dir) = &mapping.search_path
        && !dir.is_dir()
    {
        return Err(CompileError::SearchPath(dir.clone()));
    }
    fs::metadata(&mapping.input).map_err(|error| CompileError::Io {
        op: IoOp::Read,
        path: mapping.input.clone(),
        error,
    })?;

    let tracking = TrackingFs::default();
    let style = if mode.is_production() {
        OutputStyle::Compressed
    } else {
        OutputStyle::Expanded
    };
    let mut options = Options::default()
        .style(style)
        .quiet(mode.is_production())
        .fs(&tracking);
    if let Some(dir) = &mapping.search_path {
        options = options.load_path(dir);
    }

    let css = grass::from_path(&mapping.input, &options).map_err(|err| CompileError::Syntax {
        path: mapping.input.clone(),
        message: diagnostic(&err.to_string(), mode),
    })?;
    drop(options);
    let loaded = tracking.into_loaded();

    let paths = OutputPaths::resolve(mapping);
    let (code, map) = if mode.source_maps() {
        let mut builder = SourceMapBuilder::new(&paths.file_name, &paths.map_root);
        for (path, content) in &loaded {
            builder.add_source(&paths.map_source(mapping.source_dir(), path), content);
        }
        let code = format!(
            "{}\n\n/*# sourceMappingURL={} */\n",
            css.trim_end(),
            paths.map_file_name()
        );
        (code, Some(builder.build()))
    } else {
        (css, None)
    };

    let written = write_output(&paths, &code, map.as_ref(), StaleMap::Remove)?;

    Ok(CompiledAsset {
        output: paths.output_file(),
        bytes: written.bytes,
        source_map: written.map,
        inputs: loaded.into_iter().map(|(path, _)| path).collect(),
        elapsed: start.elapsed(),
    })
}

/// Production builds report the headline only.
fn diagnostic(message: &str, mode: BuildMode) -> String {
    if mode.traces() {
        message.trim_end().to_string()
    } else {
        message.lines().next().unwrap_or_default().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) -> PathBuf {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_production_compressed_without_map() {
        let dir = TempDir::new().unwrap();
        let input = write(dir.path(), "scss/a.scss", "$c: red;\n.x { color: $c; }\n");
        let output = dir.path().join("css/a.css");
        write(dir.path(), "css/a.css.map", "{}");

        let mapping = AssetMapping::new(&input, &output);
        let asset = compile_style(&mapping, BuildMode::Production).unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap().trim(), ".x{color:red}");
        assert!(asset.source_map.is_none());
        assert!(!dir.path().join("css/a.css.map").exists());
        assert_eq!(asset.inputs, vec![input]);
    }

    #[test]
    fn test_production_never_larger_than_development() {
        let dir = TempDir::new().unwrap();
        let input = write(
            dir.path(),
            "scss/site.scss",
            "$pad: 4px;\n.nav {\n  padding: $pad;\n  a { color: #ff0000; }\n}\n",
        );
        let mapping = AssetMapping::new(&input, dir.path().join("css/site.css"));

        let dev = compile_style(&mapping, BuildMode::Development).unwrap();
        let prod = compile_style(&mapping, BuildMode::Production).unwrap();
        assert!(prod.bytes <= dev.bytes);
        assert!(dev.source_map.is_some());
        assert!(prod.source_map.is_none());
    }

    #[test]
    fn test_development_map_and_search_path() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "lib/_vars.scss", "$accent: blue;\n");
        let input = write(
            dir.path(),
            "scss/admin.scss",
            "@import 'vars';\n.btn { color: $accent; }\n",
        );
        let output = dir.path().join("css-compiled/g-admin.css");

        let mapping = AssetMapping::new(&input, &output).with_search_path(dir.path().join("lib"));
        let asset = compile_style(&mapping, BuildMode::Development).unwrap();

        let css = fs::read_to_string(&output).unwrap();
        assert!(css.contains("color: blue;"));
        assert!(css.ends_with("/*# sourceMappingURL=g-admin.css.map */\n"));

        let map_path = asset.source_map.unwrap();
        let map: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(map_path).unwrap()).unwrap();
        assert_eq!(map["file"], "g-admin.css");
        assert_eq!(map["sourceRoot"], "../scss");
        let sources: Vec<_> = map["sources"].as_array().unwrap().iter().collect();
        assert!(sources.contains(&&serde_json::json!("admin.scss")));
        assert!(sources.contains(&&serde_json::json!("../lib/_vars.scss")));
        assert_eq!(asset.inputs.len(), 2);
    }

    #[test]
    fn test_syntax_error_leaves_no_output() {
        let dir = TempDir::new().unwrap();
        let input = write(dir.path(), "a.scss", ".x { color: $missing; }\n");
        let output = dir.path().join("out/a.css");

        let err = compile_style(&AssetMapping::new(&input, &output), BuildMode::Production)
            .unwrap_err();
        assert!(matches!(err, CompileError::Syntax { .. }));
        assert!(!err.to_string().contains('\n'));
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_search_path() {
        let dir = TempDir::new().unwrap();
        let input = write(dir.path(), "a.scss", "a { b: c }\n");
        let mapping =
            AssetMapping::new(&input, dir.path().join("a.css")).with_search_path(dir.path().join("nope"));
        let err = compile_style(&mapping, BuildMode::Development).unwrap_err();
        assert!(matches!(err, CompileError::SearchPath(_)));
    }

    #[test]
    fn test_diagnostic_trimming() {
        let message = "Error: Undefined variable.\n  ╷\n1 │ a { b: $x }\n";
        assert_eq!(diagnostic(message, BuildMode::Production), "Error: Undefined variable.");
        assert!(diagnostic(message, BuildMode::Development).contains('╷'));
    }
}
