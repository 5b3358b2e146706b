//! Bundle emission: module wrappers around a small loader.
//!
//! The loader keeps one instance per module id and publishes exposed
//! libraries in a registry object on the global scope, so separately built
//! bundles on the same page share those instances.

use std::path::Path;

use super::graph::ModuleGraph;
use super::module::js_string;
use crate::asset::OutputPaths;
use crate::compiler::{SourceMap, SourceMapBuilder};

const LOADER: &str = r#"(function (modules, entry, exposed, name) {
  var root = typeof globalThis !== "undefined" ? globalThis
    : typeof self !== "undefined" ? self
    : typeof window !== "undefined" ? window : this;
  var registry = root[name] || (root[name] = {});
  var cache = {};
  function load(id) {
    if (cache[id]) return cache[id].exports;
    var record = modules[id];
    var module = (cache[id] = { exports: {} });
    record[0].call(module.exports, function (specifier) {
      var target = record[1][specifier];
      if (typeof target === "number") return load(target);
      if (Object.prototype.hasOwnProperty.call(registry, specifier)) return registry[specifier]();
      var error = new Error("Cannot find module '" + specifier + "'");
      error.code = "MODULE_NOT_FOUND";
      throw error;
    }, module, module.exports);
    return module.exports;
  }
  Object.keys(exposed).forEach(function (alias) {
    var id = exposed[alias];
    registry[alias] = function () { return load(id); };
  });
  load(entry);
})({"#;

/// Generated bundle text and its line map.
pub struct Emitted {
    pub code: String,
    pub map: Option<SourceMap>,
}

/// Line-counting output buffer.
struct Writer {
    out: String,
    line: usize,
}

impl Writer {
    fn push_line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
        self.line += 1;
    }
}

/// Emit `graph` as one script.
///
/// With `paths`, a line map from every module body back to its source is
/// built as well; sources are listed relative to `source_dir`.
pub fn emit(
    graph: &ModuleGraph,
    registry: &str,
    paths: Option<(&OutputPaths, &Path)>,
) -> Emitted {
    let mut builder = paths.map(|(p, _)| SourceMapBuilder::new(&p.file_name, &p.map_root));
    let mut writer = Writer {
        out: String::new(),
        line: 0,
    };
    for line in LOADER.lines() {
        writer.push_line(line);
    }

    for (id, record) in graph.modules.iter().enumerate() {
        let source = match (&mut builder, paths) {
            (Some(builder), Some((paths, source_dir))) => Some(builder.add_source(
                &paths.map_source(source_dir, &record.path),
                &record.module.source,
            )),
            _ => None,
        };

        writer.push_line(&format!("{id}: [function (require, module, exports) {{"));
        for (original, line) in record.module.code.split('\n').enumerate() {
            if let (Some(builder), Some(source)) = (&mut builder, source) {
                builder.map_line(writer.line, source, original as u32);
            }
            writer.push_line(line);
        }
        let deps = record
            .deps
            .iter()
            .map(|(specifier, target)| format!("{}: {target}", js_string(specifier)))
            .collect::<Vec<_>>()
            .join(", ");
        writer.push_line(&format!("}}, {{{deps}}}],"));
    }

    let exposed = graph
        .exposed
        .iter()
        .map(|(alias, id)| format!("{}: {id}", js_string(alias)))
        .collect::<Vec<_>>()
        .join(", ");
    writer.push_line(&format!(
        "}}, {}, {{{exposed}}}, {});",
        graph.entry,
        js_string(registry)
    ));

    Emitted {
        code: writer.out,
        map: builder.map(SourceMapBuilder::build),
    }
}
