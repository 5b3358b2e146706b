//! Asset minification for JS, JSON and CSS.
//!
//! Uses oxc for JavaScript and lightningcss for CSS; JSON is re-serialized
//! through serde_json with key order preserved.

use std::path::Path;

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use crate::compiler::MinifyError;

/// Minify a classic script (bundles, vendored polyfills).
///
/// Top-level names are kept: they may be globals other scripts rely on.
pub fn minify_js(source: &str) -> Result<String, MinifyError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::cjs()).parse();
    if let Some(error) = ret.errors.first() {
        return Err(MinifyError::Parse {
            language: "js",
            message: error.to_string(),
        });
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}

/// Minify JSON structurally (whitespace removed, key order kept).
pub fn minify_json(source: &str) -> Result<String, MinifyError> {
    let value: serde_json::Value =
        serde_json::from_str(source).map_err(|e| MinifyError::Parse {
            language: "json",
            message: e.to_string(),
        })?;
    Ok(value.to_string())
}

/// Minify CSS source code.
pub fn minify_css(source: &str) -> Result<String, MinifyError> {
    let parse_error = |message: String| MinifyError::Parse {
        language: "css",
        message,
    };
    let stylesheet = StyleSheet::parse(source, ParserOptions::default())
        .map_err(|e| parse_error(e.to_string()))?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| parse_error(e.to_string()))?;
    Ok(result.code)
}

/// Minify content based on file extension.
///
/// `.json` and `.css` get their structural minifiers; anything else is
/// treated as a script.
pub fn minify_by_ext(path: &Path, content: &str) -> Result<String, MinifyError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "json" => minify_json(content),
        "css" => minify_css(content),
        _ => minify_js(content),
    }
}
