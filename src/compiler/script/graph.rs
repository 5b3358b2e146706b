//! Dependency graph construction and the content-hash module cache.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use super::module::{ParsedModule, parse_module};
use super::resolve::Resolver;
use crate::compiler::{BundleError, IoOp};

/// Parsed modules keyed by path, reused while their content hash matches.
#[derive(Debug, Default)]
pub struct ModuleCache {
    entries: FxHashMap<PathBuf, CachedModule>,
    parses: usize,
}

#[derive(Debug)]
struct CachedModule {
    hash: blake3::Hash,
    module: Arc<ParsedModule>,
}

impl ModuleCache {
    /// Read `path` and return its analysis, parsing only on content change.
    pub fn load(&mut self, path: &Path) -> Result<Arc<ParsedModule>, BundleError> {
        let bytes = fs::read(path).map_err(|error| BundleError::Io {
            op: IoOp::Read,
            path: path.to_path_buf(),
            error,
        })?;
        let hash = blake3::hash(&bytes);
        if let Some(cached) = self.entries.get(path)
            && cached.hash == hash
        {
            return Ok(Arc::clone(&cached.module));
        }

        let source = String::from_utf8(bytes).map_err(|_| BundleError::Syntax {
            path: path.to_path_buf(),
            message: "file is not valid UTF-8".to_string(),
        })?;
        let module = parse_module(path, source).map_err(|message| BundleError::Syntax {
            path: path.to_path_buf(),
            message,
        })?;
        self.parses += 1;

        let module = Arc::new(module);
        self.entries.insert(
            path.to_path_buf(),
            CachedModule {
                hash,
                module: Arc::clone(&module),
            },
        );
        Ok(module)
    }

    /// Drop modules no longer part of the graph.
    pub fn retain(&mut self, live: &FxHashSet<&Path>) {
        self.entries.retain(|path, _| live.contains(path.as_path()));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of parses performed so far.
    pub fn parses(&self) -> usize {
        self.parses
    }
}

/// One module in a bundle.
#[derive(Debug)]
pub struct ModuleRecord {
    pub path: PathBuf,
    pub module: Arc<ParsedModule>,
    /// Specifier → module id, for specifiers resolved inside the bundle
    pub deps: Vec<(String, usize)>,
}

/// All modules of one bundle, ids in discovery order.
#[derive(Debug)]
pub struct ModuleGraph {
    pub modules: Vec<ModuleRecord>,
    pub entry: usize,
    /// Alias → module id of every exposed library
    pub exposed: Vec<(String, usize)>,
}

impl ModuleGraph {
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.modules.iter().map(|record| record.path.as_path())
    }
}

/// Depth-first traversal assigning ids in discovery order.
pub struct GraphBuilder<'a> {
    resolver: &'a Resolver,
    cache: &'a mut ModuleCache,
    /// Aliases exposed by this bundle, already resolved to files
    aliases: FxHashMap<String, PathBuf>,
    /// Specifiers left to the shared registry when unresolved
    externals: &'a FxHashSet<String>,
    modules: Vec<Option<ModuleRecord>>,
    ids: FxHashMap<PathBuf, usize>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(
        resolver: &'a Resolver,
        cache: &'a mut ModuleCache,
        externals: &'a FxHashSet<String>,
    ) -> Self {
        Self {
            resolver,
            cache,
            aliases: FxHashMap::default(),
            externals,
            modules: Vec::new(),
            ids: FxHashMap::default(),
        }
    }

    /// Build the graph of `entry` plus every exposed library.
    pub fn build(
        mut self,
        entry: &Path,
        exposes: &[(String, PathBuf)],
    ) -> Result<ModuleGraph, BundleError> {
        self.aliases = exposes.iter().cloned().collect();

        let entry = self.visit(entry.to_path_buf())?;
        let mut exposed = Vec::with_capacity(exposes.len());
        for (alias, lib) in exposes {
            let id = self.visit(lib.clone())?;
            exposed.push((alias.clone(), id));
        }

        let modules = self.modules.into_iter().flatten().collect();
        Ok(ModuleGraph {
            modules,
            entry,
            exposed,
        })
    }

    fn visit(&mut self, path: PathBuf) -> Result<usize, BundleError> {
        if let Some(&id) = self.ids.get(&path) {
            return Ok(id);
        }
        let id = self.modules.len();
        self.ids.insert(path.clone(), id);
        self.modules.push(None);

        let module = self.cache.load(&path)?;
        let from_dir = path.parent().unwrap_or(Path::new("")).to_path_buf();

        let mut deps = Vec::with_capacity(module.specifiers.len());
        for specifier in &module.specifiers {
            let target = match self.aliases.get(specifier) {
                Some(lib) => Some(lib.clone()),
                None => self.resolver.resolve(specifier, &from_dir),
            };
            match target {
                Some(target) => {
                    let child = self.visit(target)?;
                    deps.push((specifier.clone(), child));
                }
                None if self.externals.contains(specifier) => {}
                None => {
                    return Err(BundleError::Unresolved {
                        specifier: specifier.clone(),
                        from: path,
                    });
                }
            }
        }

        self.modules[id] = Some(ModuleRecord { path, module, deps });
        Ok(id)
    }
}
