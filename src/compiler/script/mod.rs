//! Script bundler: one entry plus its dependency graph in one file.
//!
//! # Pipeline
//!
//! ```text
//! entry ─► resolve ─► parse/rewrite (cached) ─► graph ─► emit ─► minify | map
//! ```
//!
//! Modules get ids in depth-first discovery order, so identical inputs
//! always produce identical bundles.

mod graph;
mod module;
mod resolve;
mod runtime;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};
use std::time::Instant;

use rustc_hash::FxHashSet;

use crate::asset::OutputPaths;
use crate::asset::minify::minify_js;
use crate::config::{AssetMapping, Config, MappingId};
use crate::core::BuildMode;
use crate::utils::plural_count;

use super::output::{StaleMap, write_output};
use super::{BundleError, CompiledAsset};
use graph::{GraphBuilder, ModuleCache};
use resolve::Resolver;

/// Cross-bundle settings for one script mapping.
#[derive(Debug, Clone)]
pub struct BundleContext {
    /// Global property of the shared-module registry
    pub registry: String,
    /// Specifiers that may stay unresolved: the mapping's own `external`
    /// list plus aliases exposed by other mappings
    pub externals: FxHashSet<String>,
}

impl BundleContext {
    pub fn for_mapping(config: &Config, id: MappingId, mapping: &AssetMapping) -> Self {
        let mut externals: FxHashSet<String> = mapping.external.iter().cloned().collect();
        externals.extend(
            config
                .exposed_aliases()
                .into_iter()
                .filter(|(_, owner)| *owner != id)
                .map(|(alias, _)| alias.to_string()),
        );
        Self {
            registry: config.manifest.registry.clone(),
            externals,
        }
    }
}

/// Bundles script mappings.
///
/// A watching bundler keeps parsed modules between builds and reparses
/// only files whose content changed.
#[derive(Debug, Default)]
pub struct ScriptBundler {
    cache: ModuleCache,
    watching: bool,
}

impl ScriptBundler {
    pub fn new(watching: bool) -> Self {
        Self {
            cache: ModuleCache::default(),
            watching,
        }
    }

    /// Number of module parses performed by this bundler.
    #[cfg(test)]
    pub fn parses(&self) -> usize {
        self.cache.parses()
    }

    pub fn bundle(
        &mut self,
        mapping: &AssetMapping,
        ctx: &BundleContext,
        mode: BuildMode,
    ) -> Result<CompiledAsset, BundleError> {
        let start = Instant::now();
        if !self.watching {
            self.cache.clear();
        }

        if let Some(dir) = &mapping.search_path
            && !dir.is_dir()
        {
            return Err(BundleError::SearchPath(dir.clone()));
        }

        let resolver = Resolver::new(mapping.search_path.clone());
        let exposes = mapping
            .expose
            .iter()
            .map(|expose| {
                resolver
                    .resolve_path(&expose.lib)
                    .map(|lib| (expose.require.clone(), lib))
                    .ok_or_else(|| BundleError::Unresolved {
                        specifier: expose.lib.display().to_string(),
                        from: mapping.input.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let graph = GraphBuilder::new(&resolver, &mut self.cache, &ctx.externals)
            .build(&mapping.input, &exposes)?;
        if self.watching {
            let live: FxHashSet<&Path> = graph.paths().collect();
            self.cache.retain(&live);
            crate::debug!(
                "js";
                "{}: {} cached, {} parsed so far",
                mapping.input.display(),
                plural_count(self.cache.len(), "module"),
                self.cache.parses()
            );
        }

        let paths = OutputPaths::resolve(mapping);
        let emitted = runtime::emit(
            &graph,
            &ctx.registry,
            mode.source_maps().then_some((&paths, mapping.source_dir())),
        );
        let code = if mode.is_production() {
            minify_js(&emitted.code)?
        } else {
            format!(
                "{}//# sourceMappingURL={}\n",
                emitted.code,
                paths.map_file_name()
            )
        };

        let written = write_output(&paths, &code, emitted.map.as_ref(), StaleMap::Remove)?;
        let inputs: Vec<PathBuf> = graph.paths().map(Path::to_path_buf).collect();

        Ok(CompiledAsset {
            output: paths.output_file(),
            bytes: written.bytes,
            source_map: written.map,
            inputs,
            elapsed: start.elapsed(),
        })
    }
}
