//! Minify-only pass: production copies of plain assets.

use std::fs;
use std::time::Instant;

use super::OutputPaths;
use super::minify::minify_by_ext;
use crate::compiler::{CompiledAsset, IoOp, MinifyError, StaleMap, write_output};
use crate::config::AssetMapping;

/// Minify `mapping.input` into `mapping.output` (which may be the same file).
///
/// The minifier is chosen by the input extension. Nothing is written when
/// the input fails to parse.
pub fn minify_asset(mapping: &AssetMapping) -> Result<CompiledAsset, MinifyError> {
    let start = Instant::now();
    let content = fs::read_to_string(&mapping.input).map_err(|error| MinifyError::Io {
        op: IoOp::Read,
        path: mapping.input.clone(),
        error,
    })?;

    let minified = minify_by_ext(&mapping.input, &content)?;
    let paths = OutputPaths::resolve(mapping);
    let written = write_output(&paths, &minified, None, StaleMap::Keep)?;

    Ok(CompiledAsset {
        output: paths.output_file(),
        bytes: written.bytes,
        source_map: None,
        inputs: vec![mapping.input.clone()],
        elapsed: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_minify_json_in_place() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("google-fonts.json");
        fs::write(&path, "{\n  \"items\": [\n    \"Roboto\"\n  ]\n}\n").unwrap();

        let asset = minify_asset(&AssetMapping::new(&path, &path)).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"items":["Roboto"]}"#);
        assert_eq!(asset.bytes, 20);
    }

    #[test]
    fn test_minify_js_to_new_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("matchmedia.polyfill.js");
        let output = dir.path().join("min/matchmedia.polyfill.js");
        let source = "window.matchMedia = window.matchMedia || function (query) {\n  return { matches: false, media: query };\n};\n";
        fs::write(&input, source).unwrap();

        minify_asset(&AssetMapping::new(&input, &output)).unwrap();
        let minified = fs::read_to_string(&output).unwrap();
        assert!(minified.len() < source.len());
        assert_eq!(fs::read_to_string(&input).unwrap(), source);
    }

    #[test]
    fn test_parse_failure_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ \"a\": ").unwrap();

        let err = minify_asset(&AssetMapping::new(&path, &path)).unwrap_err();
        assert!(matches!(err, MinifyError::Parse { language: "json", .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ \"a\": ");
    }

    #[test]
    fn test_missing_input() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.js");
        let err = minify_asset(&AssetMapping::new(&path, &path)).unwrap_err();
        assert!(matches!(err, MinifyError::Io { op: IoOp::Read, .. }));
    }
}
