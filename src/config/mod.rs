//! Manifest loading and the immutable run configuration.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── types/
//! │   ├── error     # ConfigError, ManifestError, ManifestDiagnostics
//! │   └── mapping   # AssetMapping, Expose, MappingKind, MappingId
//! ├── util.rs       # manifest discovery
//! └── mod.rs        # Manifest, Config (this file)
//! ```
//!
//! # Tables
//!
//! | Table          | Purpose                                         |
//! |----------------|-------------------------------------------------|
//! | `[[styles]]`   | SCSS entries compiled to CSS                    |
//! | `[[scripts]]`  | JS entries bundled with their dependency graph  |
//! | `[[minify]]`   | plain assets minified in production             |
//! | `registry`     | global property holding exposed modules         |
//!
//! The loaded [`Config`] is built once at startup and passed explicitly to
//! every component; nothing reads configuration from global state.

pub mod types;
mod util;

pub use types::{AssetMapping, ConfigError, ManifestDiagnostics, MappingId, MappingKind};
use util::find_config_file;

use crate::cli::Cli;
use crate::core::{BuildMode, WatchScope};
use crate::log;
use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default global property through which bundles share exposed modules.
pub const DEFAULT_REGISTRY: &str = "__kiln_modules__";

// ============================================================================
// manifest
// ============================================================================

/// Root structure of `kiln.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Global property name of the shared-module registry.
    pub registry: String,

    /// Stylesheet mappings.
    pub styles: Vec<AssetMapping>,

    /// Script bundle mappings.
    pub scripts: Vec<AssetMapping>,

    /// Minify-only mappings (production only).
    pub minify: Vec<AssetMapping>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            registry: DEFAULT_REGISTRY.to_string(),
            styles: Vec::new(),
            scripts: Vec::new(),
            minify: Vec::new(),
        }
    }
}

impl Manifest {
    /// Parse manifest from TOML string
    #[cfg(test)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(Self::parse_with_ignored(content)?.0)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let manifest = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((manifest, ignored))
    }

    /// Mappings of one kind.
    pub fn mappings(&self, kind: MappingKind) -> &[AssetMapping] {
        match kind {
            MappingKind::Style => &self.styles,
            MappingKind::Script => &self.scripts,
            MappingKind::Minify => &self.minify,
        }
    }

    /// Every mapping with its manifest position.
    pub fn entries(&self) -> impl Iterator<Item = (MappingId, &AssetMapping)> {
        [MappingKind::Style, MappingKind::Script, MappingKind::Minify]
            .into_iter()
            .flat_map(move |kind| {
                self.mappings(kind)
                    .iter()
                    .enumerate()
                    .map(move |(index, mapping)| (MappingId::new(kind, index), mapping))
            })
    }

    /// Look a mapping up by id.
    pub fn get(&self, id: MappingId) -> Option<&AssetMapping> {
        self.mappings(id.kind).get(id.index)
    }

    /// Make every path absolute against the manifest directory.
    fn anchor(&mut self, root: &Path) {
        for mapping in self
            .styles
            .iter_mut()
            .chain(&mut self.scripts)
            .chain(&mut self.minify)
        {
            mapping.anchor(root);
        }
    }

    /// Structural validation; runs before anything is compiled.
    ///
    /// # Checks
    /// - `in` / `out` must be non-empty
    /// - every `out` is unique across all tables
    /// - `expose` / `external` only appear on scripts
    /// - exposed aliases are non-empty and declared once
    pub fn validate(&self, root: &Path) -> Result<(), ManifestDiagnostics> {
        let mut diag = ManifestDiagnostics::new();
        let mut outputs: FxHashMap<&Path, MappingId> = FxHashMap::default();
        let mut aliases: FxHashMap<&str, MappingId> = FxHashMap::default();

        if self.registry.trim().is_empty() {
            diag.error("registry", "registry name must not be empty");
        }

        for (id, mapping) in self.entries() {
            if mapping.input.as_os_str().is_empty() || mapping.input == root {
                diag.error(id.field("in"), "input path is empty");
            }
            if mapping.output.as_os_str().is_empty() || mapping.output == root {
                diag.error(id.field("out"), "output path is empty");
                continue;
            }

            if let Some(first) = outputs.get(mapping.output.as_path()) {
                diag.error_with_hint(
                    id.field("out"),
                    format!(
                        "`{}` is also written by {}",
                        display_relative(&mapping.output, root),
                        first
                    ),
                    "every mapping needs its own output file",
                );
            } else {
                outputs.insert(mapping.output.as_path(), id);
            }

            if id.kind != MappingKind::Script {
                if !mapping.expose.is_empty() {
                    diag.error(id.field("expose"), "only script mappings can expose modules");
                }
                if !mapping.external.is_empty() {
                    diag.error(id.field("external"), "only script mappings have externals");
                }
                continue;
            }

            for (i, expose) in mapping.expose.iter().enumerate() {
                let field = id.field(&format!("expose[{i}].require"));
                if expose.require.trim().is_empty() {
                    diag.error(field, "exposed alias is empty");
                    continue;
                }
                if let Some(first) = aliases.get(expose.require.as_str()) {
                    diag.error(
                        field,
                        format!("alias `{}` is already exposed by {}", expose.require, first),
                    );
                } else {
                    aliases.insert(expose.require.as_str(), id);
                }
            }
        }

        diag.into_result()
    }
}

// ============================================================================
// run configuration
// ============================================================================

/// Immutable configuration of one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Absolute path to the manifest file
    pub config_path: PathBuf,
    /// Project root directory - parent of the manifest
    pub root: PathBuf,
    /// Development or production
    pub mode: BuildMode,
    /// Which mapping kinds watch mode covers
    pub watch_scope: WatchScope,
    /// Validated manifest with absolute paths
    pub manifest: Manifest,
}

impl Config {
    /// Load the manifest named on the command line and combine it with the
    /// mode flags.
    ///
    /// The manifest is searched upward from cwd; paths inside it are
    /// relative to its directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path =
            find_config_file(&cli.config).ok_or_else(|| ConfigError::NotFound(cli.config.clone()))?;
        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let content = fs::read_to_string(&config_path)
            .map_err(|err| ConfigError::Io(config_path.clone(), err))?;
        let (manifest, ignored) = Manifest::parse_with_ignored(&content)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, &config_path);
        }

        let mode = BuildMode::from_flag(cli.production);
        let scope = WatchScope::from_flags(cli.css, cli.js);
        let mut config = Self::new(root, manifest, mode, scope)?;
        config.config_path = config_path;
        Ok(config)
    }

    /// Build a configuration from an already parsed manifest.
    ///
    /// Anchors all paths at `root` and validates; structural errors are
    /// fatal.
    pub fn new(
        root: PathBuf,
        mut manifest: Manifest,
        mode: BuildMode,
        watch_scope: WatchScope,
    ) -> Result<Self, ConfigError> {
        manifest.anchor(&root);
        manifest.validate(&root).map_err(ConfigError::Manifest)?;
        Ok(Self {
            config_path: root.join("kiln.toml"),
            root,
            mode,
            watch_scope,
            manifest,
        })
    }

    /// Path relative to the project root, for log lines.
    pub fn display(&self, path: &Path) -> String {
        display_relative(path, &self.root)
    }

    /// Aliases exposed by any script mapping, with the exposing mapping.
    pub fn exposed_aliases(&self) -> FxHashMap<&str, MappingId> {
        self.manifest
            .scripts
            .iter()
            .enumerate()
            .flat_map(|(index, mapping)| {
                mapping
                    .expose
                    .iter()
                    .map(move |e| (e.require.as_str(), MappingId::new(MappingKind::Script, index)))
            })
            .collect()
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }
}

fn display_relative(path: &Path, root: &Path) -> String {
    crate::utils::path::to_slash(path.strip_prefix(root).unwrap_or(path))
}
