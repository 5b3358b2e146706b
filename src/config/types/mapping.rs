//! Asset mappings: one declared (source, destination) pair each.
//!
//! # Example
//!
//! ```toml
//! [[styles]]
//! in = "platforms/common/scss/admin.scss"
//! out = "platforms/common/css-compiled/g-admin.css"
//! load = "engines/common/nucleus/scss"
//!
//! [[scripts]]
//! in = "platforms/common/application/main.js"
//! out = "platforms/common/js/main.js"
//! expose = [{ lib = "platforms/common/js/tooltips.js", require = "ext/tooltips" }]
//!
//! [[minify]]
//! in = "platforms/common/js/google-fonts.json"
//! out = "platforms/common/js/google-fonts.json"
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::utils::path::clean_path;

/// Which compiler a mapping goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MappingKind {
    Style,
    Script,
    Minify,
}

impl MappingKind {
    /// Manifest table name.
    pub const fn table(self) -> &'static str {
        match self {
            Self::Style => "styles",
            Self::Script => "scripts",
            Self::Minify => "minify",
        }
    }

    /// Log prefix.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Style => "css",
            Self::Script => "js",
            Self::Minify => "minify",
        }
    }

    /// Extensions whose changes trigger a recompile in watch mode.
    pub const fn watch_extensions(self) -> &'static [&'static str] {
        match self {
            Self::Style => &["scss", "sass", "css"],
            Self::Script => &["js", "mjs", "cjs", "json"],
            Self::Minify => &[],
        }
    }
}

/// Position of a mapping in the manifest, e.g. `scripts[1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MappingId {
    pub kind: MappingKind,
    pub index: usize,
}

impl MappingId {
    pub const fn new(kind: MappingKind, index: usize) -> Self {
        Self { kind, index }
    }

    /// Manifest field path below this mapping, e.g. `styles[0].out`.
    pub fn field(&self, name: &str) -> String {
        format!("{self}.{name}")
    }
}

impl fmt::Display for MappingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.kind.table(), self.index)
    }
}

/// A module published by a bundle under an alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expose {
    /// File of the exposed module.
    pub lib: PathBuf,
    /// Name other bundles `require()` it by.
    pub require: String,
}

/// One compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMapping {
    /// Entry file.
    #[serde(rename = "in")]
    pub input: PathBuf,

    /// Destination file.
    #[serde(rename = "out")]
    pub output: PathBuf,

    /// Extra directory for resolving imports (`@import` / bare `require`).
    #[serde(default, rename = "load", alias = "search_path")]
    pub search_path: Option<PathBuf>,

    /// Modules published for other bundles (scripts only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expose: Vec<Expose>,

    /// Aliases resolved at runtime through the shared registry (scripts only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external: Vec<String>,
}

impl AssetMapping {
    #[cfg(test)]
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            search_path: None,
            expose: Vec::new(),
            external: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn with_search_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_path = Some(dir.into());
        self
    }

    #[cfg(test)]
    pub fn with_expose(mut self, lib: impl Into<PathBuf>, alias: impl Into<String>) -> Self {
        self.expose.push(Expose {
            lib: lib.into(),
            require: alias.into(),
        });
        self
    }

    /// Make every path absolute against `root` and lexically clean.
    pub fn anchor(&mut self, root: &Path) {
        let anchor = |p: &Path| clean_path(&root.join(p));
        self.input = anchor(&self.input);
        self.output = anchor(&self.output);
        if let Some(dir) = &self.search_path {
            self.search_path = Some(anchor(dir));
        }
        for expose in &mut self.expose {
            expose.lib = anchor(&expose.lib);
        }
    }

    /// Directory containing the entry file.
    pub fn source_dir(&self) -> &Path {
        self.input.parent().unwrap_or(Path::new(""))
    }
}
