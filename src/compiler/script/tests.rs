use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use tempfile::TempDir;

use super::*;
use crate::config::{DEFAULT_REGISTRY, Manifest, MappingKind};
use crate::core::WatchScope;

fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

fn ctx(externals: &[&str]) -> BundleContext {
    BundleContext {
        registry: DEFAULT_REGISTRY.to_string(),
        externals: externals.iter().map(|s| s.to_string()).collect(),
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_bundle_with_dependencies_and_map() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let entry = write(
        root,
        "application/main.js",
        "var dom = require('./utils/dom');\nvar fonts = require('./fonts.json');\ndom.ready(fonts);\n",
    );
    write(root, "application/utils/dom.js", "exports.ready = function (f) { return f; };\n");
    write(root, "application/fonts.json", "[\"Roboto\"]\n");

    let mapping = AssetMapping::new(&entry, root.join("js/main.js"));
    let asset = ScriptBundler::new(false)
        .bundle(&mapping, &ctx(&[]), BuildMode::Development)
        .unwrap();

    let code = read(&asset.output);
    assert!(code.contains("{\"./utils/dom\": 1, \"./fonts.json\": 2}"));
    assert!(code.contains("module.exports = [\"Roboto\"];"));
    assert!(code.ends_with("//# sourceMappingURL=main.js.map\n"));
    assert_eq!(asset.inputs.len(), 3);
    assert_eq!(asset.inputs[0], entry);

    let map: serde_json::Value = serde_json::from_str(&read(&asset.source_map.unwrap())).unwrap();
    assert_eq!(map["file"], "main.js");
    assert_eq!(map["sourceRoot"], "../application");
    assert_eq!(
        map["sources"],
        serde_json::json!(["main.js", "utils/dom.js", "fonts.json"])
    );
    assert_eq!(map["sourcesContent"][1], "exports.ready = function (f) { return f; };\n");
}

#[test]
fn test_generated_lines_map_to_original_lines() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let entry = write(root, "src/main.js", "var a = 1;\nvar b = 2;\n");
    let mapping = AssetMapping::new(&entry, root.join("out/main.js"));
    let asset = ScriptBundler::new(false)
        .bundle(&mapping, &ctx(&[]), BuildMode::Development)
        .unwrap();

    let code = read(&asset.output);
    let line = code.lines().position(|l| l == "var b = 2;").unwrap();
    let map: serde_json::Value = serde_json::from_str(&read(&asset.source_map.unwrap())).unwrap();
    let mappings = map["mappings"].as_str().unwrap();
    let segments: Vec<_> = mappings.split(';').collect();
    assert_eq!(segments[line - 1], "AAAA");
    assert_eq!(segments[line], "AACA");
}

#[test]
fn test_unresolved_dependency_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let entry = write(root, "src/main.js", "require('./missing');\n");
    let output = root.join("out/main.js");

    let err = ScriptBundler::new(false)
        .bundle(&AssetMapping::new(&entry, &output), &ctx(&[]), BuildMode::Development)
        .unwrap_err();
    match err {
        BundleError::Unresolved { specifier, from } => {
            assert_eq!(specifier, "./missing");
            assert_eq!(from, entry);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!output.exists());
}

#[test]
fn test_syntax_error_names_module() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let entry = write(root, "src/main.js", "require('./broken');\n");
    let broken = write(root, "src/broken.js", "function (\n");

    let err = ScriptBundler::new(false)
        .bundle(&AssetMapping::new(&entry, root.join("o.js")), &ctx(&[]), BuildMode::Production)
        .unwrap_err();
    assert!(matches!(err, BundleError::Syntax { ref path, .. } if *path == broken));
}

#[test]
fn test_expose_and_external() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "js/tooltips.js", "module.exports = { show: function () {} };\n");
    let main = write(root, "application/main.js", "var tips = require('ext/tooltips');\ntips.show();\n");
    let admin = write(root, "admin/admin.js", "require('ext/tooltips').show();\n");

    let exposing = AssetMapping::new(&main, root.join("out/main.js"))
        .with_expose(root.join("js/tooltips"), "ext/tooltips");
    let asset = ScriptBundler::new(false)
        .bundle(&exposing, &ctx(&[]), BuildMode::Development)
        .unwrap();
    let code = read(&asset.output);
    assert!(code.contains("{\"ext/tooltips\": 1}],"));
    assert!(code.contains("}, 0, {\"ext/tooltips\": 1}, \"__kiln_modules__\");"));

    let consumer = AssetMapping::new(&admin, root.join("out/admin.js"));
    let err = ScriptBundler::new(false)
        .bundle(&consumer, &ctx(&[]), BuildMode::Development)
        .unwrap_err();
    assert!(matches!(err, BundleError::Unresolved { .. }));

    let asset = ScriptBundler::new(false)
        .bundle(&consumer, &ctx(&["ext/tooltips"]), BuildMode::Development)
        .unwrap();
    let code = read(&asset.output);
    assert_eq!(asset.inputs, vec![admin]);
    assert!(code.contains("}, {}],"));
    assert!(code.contains("}, 0, {}, \"__kiln_modules__\");"));
}

#[test]
fn test_production_minified_and_stale_map_removed() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let entry = write(root, "src/main.js", "// greeting\nvar message = 'hello';\nconsole.log(message);\n");
    let output = root.join("out/main.js");
    write(root, "out/main.js.map", "{}");

    let dev = ScriptBundler::new(false)
        .bundle(&AssetMapping::new(&entry, &output), &ctx(&[]), BuildMode::Development)
        .unwrap();
    let prod = ScriptBundler::new(false)
        .bundle(&AssetMapping::new(&entry, &output), &ctx(&[]), BuildMode::Production)
        .unwrap();

    assert!(prod.bytes < dev.bytes);
    assert!(prod.source_map.is_none());
    assert!(!root.join("out/main.js.map").exists());
    let code = read(&output);
    assert!(!code.contains("// greeting"));
    assert!(!code.contains("sourceMappingURL"));
}

#[test]
fn test_hashbang_module_builds_in_both_modes() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let entry = write(root, "src/cli.js", "#!/usr/bin/env node\nvar util = require('./util');\nutil();\n");
    write(root, "src/util.js", "#!/usr/bin/env node\nmodule.exports = function () {};\n");
    let output = root.join("out/cli.js");

    for mode in [BuildMode::Development, BuildMode::Production] {
        ScriptBundler::new(false)
            .bundle(&AssetMapping::new(&entry, &output), &ctx(&[]), mode)
            .unwrap();
        assert!(!read(&output).contains("#!"));
    }
}

#[test]
fn test_deterministic_output() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let entry = write(root, "src/main.js", "import a from './a';\nimport { b } from './b';\na(b);\n");
    write(root, "src/a.js", "export default function a(x) { return x; }\n");
    write(root, "src/b.js", "import a from './a';\nexport const b = a(1);\n");
    let output = root.join("out/main.js");
    let mapping = AssetMapping::new(&entry, &output);

    ScriptBundler::new(false).bundle(&mapping, &ctx(&[]), BuildMode::Development).unwrap();
    let first = fs::read(&output).unwrap();
    ScriptBundler::new(false).bundle(&mapping, &ctx(&[]), BuildMode::Development).unwrap();
    assert_eq!(first, fs::read(&output).unwrap());
}

#[test]
fn test_watching_bundler_reparses_changed_files_only() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let entry = write(root, "src/main.js", "require('./a');\nrequire('./b');\n");
    let a = write(root, "src/a.js", "module.exports = 1;\n");
    write(root, "src/b.js", "module.exports = 2;\n");
    let mapping = AssetMapping::new(&entry, root.join("out/main.js"));

    let mut bundler = ScriptBundler::new(true);
    bundler.bundle(&mapping, &ctx(&[]), BuildMode::Development).unwrap();
    assert_eq!(bundler.parses(), 3);

    bundler.bundle(&mapping, &ctx(&[]), BuildMode::Development).unwrap();
    assert_eq!(bundler.parses(), 3);

    fs::write(&a, "module.exports = 10;\n").unwrap();
    let asset = bundler.bundle(&mapping, &ctx(&[]), BuildMode::Development).unwrap();
    assert_eq!(bundler.parses(), 4);
    assert!(read(&asset.output).contains("module.exports = 10;"));

    fs::write(&entry, "require('./a');\n").unwrap();
    bundler.bundle(&mapping, &ctx(&[]), BuildMode::Development).unwrap();
    assert_eq!(bundler.cache.len(), 2);
}

#[test]
fn test_context_externals_from_config() {
    let manifest = Manifest::from_str(
        r#"
        registry = "__shared__"

        [[scripts]]
        in = "app/main.js"
        out = "js/main.js"
        expose = [{ lib = "js/tooltips.js", require = "ext/tooltips" }]

        [[scripts]]
        in = "admin/admin.js"
        out = "js/admin.js"
        external = ["jquery"]
        "#,
    )
    .unwrap();
    let config = Config::new(
        PathBuf::from("/project"),
        manifest,
        BuildMode::Development,
        WatchScope::All,
    )
    .unwrap();

    let main_id = MappingId::new(MappingKind::Script, 0);
    let admin_id = MappingId::new(MappingKind::Script, 1);
    let main = BundleContext::for_mapping(&config, main_id, &config.manifest.scripts[0]);
    let admin = BundleContext::for_mapping(&config, admin_id, &config.manifest.scripts[1]);

    assert_eq!(main.registry, "__shared__");
    assert!(main.externals.is_empty());
    let expected: FxHashSet<String> = ["ext/tooltips", "jquery"].iter().map(|s| s.to_string()).collect();
    assert_eq!(admin.externals, expected);
}
