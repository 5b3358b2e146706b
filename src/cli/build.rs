//! Batch builds (pipeline driver).
//!
//! Build phases:
//! - **Compile** - every selected style and script mapping, in parallel
//! - **Minify** - the minify-only pass, production only, after compile settles
//! - **Summary** - counts; failures make the process exit non-zero

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::compiler::{AssetError, compile_mapping};
use crate::config::{AssetMapping, Config, MappingId, MappingKind};
use crate::logger::ProgressLine;
use crate::utils::{format_bytes, plural_count};
use crate::{debug, log};

use super::Task;

/// Outcome counts of one invocation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildReport {
    pub compiled: usize,
    pub failed: usize,
}

impl BuildReport {
    fn merge(self, other: Self) -> Self {
        Self {
            compiled: self.compiled + other.compiled,
            failed: self.failed + other.failed,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Run a batch task and print a summary.
pub fn run_task(config: &Config, task: Task) -> BuildReport {
    let mut kinds = Vec::with_capacity(2);
    if task.builds_styles() {
        kinds.push(MappingKind::Style);
    }
    if task.builds_scripts() {
        kinds.push(MappingKind::Script);
    }

    let mut report = BuildReport::default();
    if !kinds.is_empty() {
        report = report.merge(build_mappings(config, &kinds));
    }
    if task.runs_minify() {
        report = report.merge(minify_pass(config));
    }

    log_summary(config, &report);
    report
}

/// Compile the mappings of `kinds` concurrently; all of them settle before
/// this returns.
pub fn build_mappings(config: &Config, kinds: &[MappingKind]) -> BuildReport {
    let selected: Vec<_> = config
        .manifest
        .entries()
        .filter(|(id, _)| kinds.contains(&id.kind))
        .collect();

    let counters: Vec<_> = kinds
        .iter()
        .map(|kind| (kind.label(), config.manifest.mappings(*kind).len()))
        .collect();
    run_parallel(config, &selected, &counters)
}

/// Minify-only pass; a no-op outside production.
pub fn minify_pass(config: &Config) -> BuildReport {
    if !config.mode.is_production() {
        debug!("minify"; "skipped in {} mode", config.mode.label());
        return BuildReport::default();
    }
    let selected: Vec<_> = config
        .manifest
        .entries()
        .filter(|(id, _)| id.kind == MappingKind::Minify)
        .collect();
    let counters = [(MappingKind::Minify.label(), selected.len())];
    run_parallel(config, &selected, &counters)
}

fn run_parallel(
    config: &Config,
    selected: &[(MappingId, &AssetMapping)],
    counters: &[(&'static str, usize)],
) -> BuildReport {
    if selected.is_empty() {
        return BuildReport::default();
    }

    let progress = ProgressLine::new(counters);
    let failed = AtomicUsize::new(0);

    selected.par_iter().for_each(|(id, mapping)| {
        let label = id.kind.label();
        debug!(label; "compiling {}", config.display(&mapping.input));

        match compile_mapping(config, *id, mapping, None) {
            Ok(asset) => {
                let map = if asset.source_map.is_some() { " + map" } else { "" };
                log!(label; "{} ({}{map})", config.display(&asset.output), format_bytes(asset.bytes));
            }
            Err(err) => {
                failed.fetch_add(1, Ordering::Relaxed);
                log_error(config, mapping, &err);
            }
        }
        progress.inc(label);
    });

    progress.finish();

    let failed = failed.into_inner();
    BuildReport {
        compiled: selected.len() - failed,
        failed,
    }
}

/// One block per failure: the source path, then the compiler's message.
fn log_error(config: &Config, mapping: &AssetMapping, err: &AssetError) {
    log!("error"; "{}\n{}", config.display(&mapping.input), err);
}

fn log_summary(config: &Config, report: &BuildReport) {
    if report.compiled + report.failed == 0 {
        log!("build"; "nothing to do");
        return;
    }
    if report.is_success() {
        log!("build"; "{} compiled ({})", plural_count(report.compiled, "asset"), config.mode.label());
    } else {
        log!(
            "build";
            "{} compiled, {} failed",
            plural_count(report.compiled, "asset"),
            report.failed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Manifest;
    use crate::core::{BuildMode, WatchScope};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn project(mode: BuildMode) -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "scss/good.scss", "$c: red;\n.x { color: $c; }\n");
        write(root, "scss/bad.scss", ".x { color: $nope; }\n");
        write(root, "app/main.js", "var a = require('./a');\nconsole.log(a);\n");
        write(root, "app/a.js", "module.exports = 1;\n");
        write(root, "data/fonts.json", "{\n  \"items\": []\n}\n");

        let manifest = Manifest::from_str(
            r#"
            [[styles]]
            in = "scss/good.scss"
            out = "css/good.css"

            [[styles]]
            in = "scss/bad.scss"
            out = "css/bad.css"

            [[scripts]]
            in = "app/main.js"
            out = "js/main.js"

            [[minify]]
            in = "data/fonts.json"
            out = "data/fonts.json"
            "#,
        )
        .unwrap();
        let config = Config::new(root.to_path_buf(), manifest, mode, WatchScope::All).unwrap();
        (dir, config)
    }

    #[test]
    fn test_failure_isolated_from_siblings() {
        let (dir, config) = project(BuildMode::Development);
        let report = run_task(&config, Task::All);

        assert_eq!(report, BuildReport { compiled: 2, failed: 1 });
        assert!(dir.path().join("css/good.css").is_file());
        assert!(!dir.path().join("css/bad.css").exists());
        assert!(dir.path().join("js/main.js").is_file());
        // development: the minify pass does not run
        assert_eq!(
            fs::read_to_string(dir.path().join("data/fonts.json")).unwrap(),
            "{\n  \"items\": []\n}\n"
        );
    }

    #[test]
    fn test_production_runs_minify_pass() {
        let (dir, config) = project(BuildMode::Production);
        let report = run_task(&config, Task::All);

        assert_eq!(report, BuildReport { compiled: 3, failed: 1 });
        assert_eq!(
            fs::read_to_string(dir.path().join("data/fonts.json")).unwrap(),
            r#"{"items":[]}"#
        );
        assert!(!dir.path().join("js/main.js.map").exists());
    }

    #[test]
    fn test_single_kind_tasks() {
        let (dir, config) = project(BuildMode::Production);
        let report = run_task(&config, Task::Js);
        assert_eq!(report, BuildReport { compiled: 1, failed: 0 });
        assert!(!dir.path().join("css/good.css").exists());

        let report = run_task(&config, Task::Minify);
        assert_eq!(report, BuildReport { compiled: 1, failed: 0 });
    }
}
