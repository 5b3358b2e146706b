//! Source maps for compiled assets.
//!
//! Mappings are line-granular: each generated line points at column 0 of
//! one original line. Encoding is done by `oxc::sourcemap`; this module adds
//! the `sourceRoot` that locates originals from the output directory.

use oxc_sourcemap as sourcemap;

/// A finished version 3 source map.
#[derive(Debug, Clone)]
pub struct SourceMap {
    inner: sourcemap::SourceMap,
    source_root: String,
}

impl SourceMap {
    /// JSON text written next to the asset.
    pub fn to_json(&self) -> String {
        let encoded = self.inner.to_json_string();
        match serde_json::from_str::<serde_json::Value>(&encoded) {
            Ok(mut value) if value.is_object() => {
                value["sourceRoot"] = serde_json::Value::String(self.source_root.clone());
                value.to_string()
            }
            _ => encoded,
        }
    }
}

/// Accumulates sources and line mappings for one generated file.
pub struct SourceMapBuilder {
    inner: sourcemap::SourceMapBuilder,
    source_root: String,
}

impl SourceMapBuilder {
    pub fn new(file: &str, source_root: impl Into<String>) -> Self {
        let mut inner = sourcemap::SourceMapBuilder::default();
        inner.set_file(file);
        Self {
            inner,
            source_root: source_root.into(),
        }
    }

    /// Register a source file and return its index.
    pub fn add_source(&mut self, name: &str, content: &str) -> u32 {
        self.inner.add_source_and_content(name, content)
    }

    /// Map a generated line (0-based) to an original line of `source`.
    ///
    /// Lines must be added in ascending order.
    pub fn map_line(&mut self, generated: usize, source: u32, original: u32) {
        self.inner
            .add_token(generated as u32, 0, original, 0, Some(source), None);
    }

    pub fn build(self) -> SourceMap {
        SourceMap {
            inner: self.inner.into_sourcemap(),
            source_root: self.source_root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(map: &SourceMap) -> serde_json::Value {
        serde_json::from_str(&map.to_json()).unwrap()
    }

    #[test]
    fn test_line_mappings() {
        let mut builder = SourceMapBuilder::new("main.js", "../application");
        let a = builder.add_source("main.js", "a\nb\n");
        let b = builder.add_source("util.js", "c\n");
        builder.map_line(1, a, 0);
        builder.map_line(2, a, 1);
        builder.map_line(4, b, 0);

        let map = json(&builder.build());
        assert_eq!(map["mappings"], ";AAAA;AACA;;ACDA");
        assert_eq!(map["sources"], serde_json::json!(["main.js", "util.js"]));
        assert_eq!(map["sourcesContent"][1], "c\n");
    }

    #[test]
    fn test_json_shape() {
        let map = json(&SourceMapBuilder::new("a.css", ".").build());
        assert_eq!(map["version"], 3);
        assert_eq!(map["file"], "a.css");
        assert_eq!(map["sourceRoot"], ".");
        assert_eq!(map["mappings"], "");
    }
}
