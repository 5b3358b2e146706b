//! Compilers: stylesheets, script bundles, and the shared output plumbing.
//!
//! Each compiler turns one [`AssetMapping`] into one artifact (plus an
//! optional source map) and reports a [`CompiledAsset`]. Nothing here
//! logs; callers decide how results are presented.

pub mod error;
mod output;
pub mod script;
mod sourcemap;
pub mod style;

use std::path::PathBuf;
use std::time::Duration;

pub use error::{AssetError, BundleError, CompileError, IoOp, MinifyError};
pub(crate) use output::{StaleMap, write_output};
pub use script::{BundleContext, ScriptBundler};
pub use sourcemap::{SourceMap, SourceMapBuilder};

use crate::asset::minify_asset;
use crate::config::{AssetMapping, Config, MappingId, MappingKind};

/// Result of compiling one mapping.
#[derive(Debug, Clone)]
pub struct CompiledAsset {
    /// Artifact path
    pub output: PathBuf,
    /// Artifact size
    pub bytes: u64,
    /// Companion source map, when one was written
    pub source_map: Option<PathBuf>,
    /// Every source file that went into the artifact
    pub inputs: Vec<PathBuf>,
    pub elapsed: Duration,
}

impl CompiledAsset {
    pub fn log_entry(&self) -> BundleLogEntry {
        BundleLogEntry {
            bytes: self.bytes,
            elapsed: self.elapsed,
        }
    }
}

/// Size and duration of one build, as shown in watch mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleLogEntry {
    pub bytes: u64,
    pub elapsed: Duration,
}

/// Compile any mapping with the compiler its table selects.
///
/// Scripts reuse `bundler` when given (watch mode keeps one per mapping);
/// otherwise a one-shot bundler is used.
pub fn compile_mapping(
    config: &Config,
    id: MappingId,
    mapping: &AssetMapping,
    bundler: Option<&mut ScriptBundler>,
) -> Result<CompiledAsset, AssetError> {
    match id.kind {
        MappingKind::Style => Ok(style::compile_style(mapping, config.mode)?),
        MappingKind::Script => {
            let ctx = BundleContext::for_mapping(config, id, mapping);
            let result = match bundler {
                Some(bundler) => bundler.bundle(mapping, &ctx, config.mode),
                None => ScriptBundler::new(false).bundle(mapping, &ctx, config.mode),
            };
            Ok(result?)
        }
        MappingKind::Minify => Ok(minify_asset(mapping)?),
    }
}
