//! Dependency-management flags.
//!
//! `--install`, `--update` and friends ask for third-party packages to be
//! fetched. Package installation belongs to the package manager, so these
//! flags are recognized before normal argument parsing and short-circuit
//! the pipeline.

use std::sync::OnceLock;

use regex::Regex;

use crate::log;

/// First dependency-management flag among `args`, if any.
pub fn find_deps_flag(args: &[String]) -> Option<&str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^--?(update|up|install|inst|go|deps)$").unwrap());
    args.iter().skip(1).map(String::as_str).find(|arg| re.is_match(arg))
}

/// Report the delegation; nothing is compiled.
pub fn delegate(flag: &str) {
    log!("deps"; "`{}`: dependencies are managed by the package manager", flag);
    log!("deps"; "run `npm install` (or your package manager's equivalent) in the project root");
}
