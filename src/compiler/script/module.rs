//! Per-module analysis: dependency discovery and the ES module rewrite.
//!
//! Bundled modules run inside a CommonJS-style wrapper, so `import` and
//! `export` statements are rewritten into `require()` calls and `exports`
//! assignments. Rewrites never change the number of lines, which keeps
//! generated lines aligned with original lines for the source map.

use std::path::Path;

use oxc::allocator::Allocator;
use oxc::ast::ast::{
    Argument, CallExpression, Declaration, ExportDefaultDeclarationKind, Expression,
    ImportDeclarationSpecifier, ImportExpression, ModuleExportName, Program, Statement,
};
use oxc::ast_visit::{Visit, walk};
use oxc::parser::Parser;
use oxc::span::{GetSpan, SourceType, Span};

/// A module ready to be wrapped into a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedModule {
    /// Original text, embedded in source maps
    pub source: String,
    /// Rewritten body with the same line count as `source`
    pub code: String,
    /// Unique dependency specifiers in order of appearance
    pub specifiers: Vec<String>,
    /// Whether the module used `import`/`export` syntax
    pub is_esm: bool,
}

/// Analyze a JavaScript or JSON module.
///
/// Errors carry the parser's message for the first problem found.
pub fn parse_module(path: &Path, source: String) -> Result<ParsedModule, String> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        return parse_json(source);
    }

    let (code, specifiers, is_esm) = analyze(&source)?;
    Ok(ParsedModule {
        source,
        code,
        specifiers,
        is_esm,
    })
}

/// Parse as a module first, then as a sloppy-mode script (`with`, octal
/// literals, top-level `return`).
fn analyze(source: &str) -> Result<(String, Vec<String>, bool), String> {
    let allocator = Allocator::default();
    let module = Parser::new(&allocator, source, SourceType::mjs()).parse();
    if module.errors.is_empty() && !module.panicked {
        return transform(source, &module.program);
    }

    let script = Parser::new(&allocator, source, SourceType::cjs()).parse();
    if script.errors.is_empty() && !script.panicked {
        return transform(source, &script.program);
    }

    Err(module
        .errors
        .first()
        .map(|e| e.to_string())
        .unwrap_or_else(|| "unexpected end of input".to_string()))
}

fn parse_json(source: String) -> Result<ParsedModule, String> {
    serde_json::from_str::<serde_json::Value>(&source).map_err(|e| e.to_string())?;
    Ok(ParsedModule {
        code: format!("module.exports = {};", source.trim_end()),
        source,
        specifiers: Vec::new(),
        is_esm: false,
    })
}

// ============================================================================
// Rewrite
// ============================================================================

/// Replacement of `source[start..end]` (an insertion when empty).
#[derive(Debug)]
struct Edit {
    start: u32,
    end: u32,
    text: String,
}

#[derive(Default)]
struct Rewriter {
    edits: Vec<Edit>,
    /// (position, specifier) pairs, sorted later
    found: Vec<(u32, String)>,
    /// Goes on line 1, before any module code runs
    header: String,
    /// Goes after the last line
    footer: String,
    is_esm: bool,
    temps: usize,
}

impl Rewriter {
    fn temp(&mut self) -> String {
        self.temps += 1;
        format!("__kiln_m{}", self.temps)
    }

    fn replace(&mut self, span: Span, text: String) {
        self.edits.push(Edit {
            start: span.start,
            end: span.end,
            text,
        });
    }

    fn insert(&mut self, at: u32, text: String) {
        self.edits.push(Edit {
            start: at,
            end: at,
            text,
        });
    }

    fn dependency(&mut self, at: u32, specifier: &str) {
        self.found.push((at, specifier.to_string()));
    }
}

fn transform(source: &str, program: &Program<'_>) -> Result<(String, Vec<String>, bool), String> {
    let mut rw = Rewriter::default();

    // Only valid at the very start of a file, so it cannot stay in the wrapper.
    if let Some(hashbang) = &program.hashbang {
        rw.replace(hashbang.span, String::new());
    }

    for stmt in &program.body {
        rewrite_statement(&mut rw, stmt)?;
    }

    let mut collector = DependencyCollector::default();
    collector.visit_program(program);
    rw.found.extend(collector.requires);
    for (span, specifier) in collector.dynamic {
        rw.dependency(span.start, &specifier);
        rw.replace(
            span,
            format!(
                "Promise.resolve().then(function () {{ return require({}); }})",
                js_string(&specifier)
            ),
        );
    }

    let mut code = apply_edits(source, &mut rw.edits);
    if rw.is_esm {
        code.insert_str(
            0,
            &format!(
                "\"use strict\";Object.defineProperty(exports, \"__esModule\", {{ value: true }});{}",
                rw.header
            ),
        );
        if !rw.footer.is_empty() {
            code.push('\n');
            code.push_str(&rw.footer);
        }
    }

    rw.found.sort_by_key(|(at, _)| *at);
    let mut specifiers: Vec<String> = Vec::with_capacity(rw.found.len());
    for (_, specifier) in rw.found {
        if !specifiers.contains(&specifier) {
            specifiers.push(specifier);
        }
    }

    Ok((code, specifiers, rw.is_esm))
}

fn rewrite_statement(rw: &mut Rewriter, stmt: &Statement<'_>) -> Result<(), String> {
    match stmt {
        Statement::ImportDeclaration(decl) => {
            rw.is_esm = true;
            let source = decl.source.value.as_str();
            rw.dependency(decl.span.start, source);
            let require = format!("require({})", js_string(source));

            let specifiers = decl.specifiers.as_ref().filter(|s| !s.is_empty());
            let Some(specifiers) = specifiers else {
                rw.replace(decl.span, format!("{require};"));
                return Ok(());
            };

            let temp = rw.temp();
            let mut text = format!("var {temp} = {require}");
            for specifier in specifiers {
                let binding = match specifier {
                    ImportDeclarationSpecifier::ImportSpecifier(s) => format!(
                        "{} = {temp}[{}]",
                        s.local.name,
                        js_string(&export_name(&s.imported))
                    ),
                    ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => format!(
                        "{} = {temp} && {temp}.__esModule ? {temp}.default : {temp}",
                        s.local.name
                    ),
                    ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                        format!("{} = {temp}", s.local.name)
                    }
                };
                text.push_str(", ");
                text.push_str(&binding);
            }
            text.push(';');
            rw.replace(decl.span, text);
        }

        Statement::ExportNamedDeclaration(decl) => {
            rw.is_esm = true;
            if let Some(source) = &decl.source {
                let source = source.value.as_str();
                rw.dependency(decl.span.start, source);
                let temp = rw.temp();
                let mut text = format!("var {temp} = require({});", js_string(source));
                for specifier in &decl.specifiers {
                    text.push_str(&format!(
                        " exports[{}] = {temp}[{}];",
                        js_string(&export_name(&specifier.exported)),
                        js_string(&export_name(&specifier.local)),
                    ));
                }
                rw.replace(decl.span, text);
            } else if let Some(declaration) = &decl.declaration {
                rw.replace(Span::new(decl.span.start, declaration.span().start), String::new());
                let names = declared_names(declaration)?;
                let assignments: String = names
                    .iter()
                    .map(|name| format!("exports[{}] = {name};", js_string(name)))
                    .collect();
                if matches!(declaration, Declaration::FunctionDeclaration(_)) {
                    rw.header.push_str(&assignments);
                } else {
                    rw.footer.push_str(&assignments);
                }
            } else {
                for specifier in &decl.specifiers {
                    rw.footer.push_str(&format!(
                        "exports[{}] = {};",
                        js_string(&export_name(&specifier.exported)),
                        export_name(&specifier.local),
                    ));
                }
                rw.replace(decl.span, String::new());
            }
        }

        Statement::ExportDefaultDeclaration(decl) => {
            rw.is_esm = true;
            let inner = decl.declaration.span();
            let prefix = Span::new(decl.span.start, inner.start);
            match &decl.declaration {
                ExportDefaultDeclarationKind::FunctionDeclaration(func) if func.id.is_some() => {
                    let name = func.id.as_ref().map(|id| id.name.to_string()).unwrap_or_default();
                    rw.replace(prefix, String::new());
                    rw.header.push_str(&format!("exports.default = {name};"));
                }
                ExportDefaultDeclarationKind::ClassDeclaration(class) if class.id.is_some() => {
                    let name = class.id.as_ref().map(|id| id.name.to_string()).unwrap_or_default();
                    rw.replace(prefix, String::new());
                    rw.footer.push_str(&format!("exports.default = {name};"));
                }
                _ => {
                    rw.replace(prefix, "exports.default = ".to_string());
                    rw.insert(decl.span.end, ";".to_string());
                }
            }
        }

        Statement::ExportAllDeclaration(decl) => {
            rw.is_esm = true;
            let source = decl.source.value.as_str();
            rw.dependency(decl.span.start, source);
            let require = format!("require({})", js_string(source));
            let text = match &decl.exported {
                Some(name) => format!("exports[{}] = {require};", js_string(&export_name(name))),
                None => {
                    let temp = rw.temp();
                    format!(
                        "var {temp} = {require}; Object.keys({temp}).forEach(function (k) {{ \
                         if (k !== \"default\" && !(k in exports)) exports[k] = {temp}[k]; }});"
                    )
                }
            };
            rw.replace(decl.span, text);
        }

        _ => {}
    }
    Ok(())
}

fn declared_names(declaration: &Declaration<'_>) -> Result<Vec<String>, String> {
    let names = match declaration {
        Declaration::VariableDeclaration(var) => {
            let mut names = Vec::with_capacity(var.declarations.len());
            for declarator in &var.declarations {
                let Some(id) = declarator.id.get_binding_identifier() else {
                    return Err("destructuring patterns in `export` declarations are not supported"
                        .to_string());
                };
                names.push(id.name.to_string());
            }
            names
        }
        Declaration::FunctionDeclaration(func) => {
            func.id.iter().map(|id| id.name.to_string()).collect()
        }
        Declaration::ClassDeclaration(class) => {
            class.id.iter().map(|id| id.name.to_string()).collect()
        }
        _ => Vec::new(),
    };
    Ok(names)
}

fn export_name(name: &ModuleExportName<'_>) -> String {
    name.name().to_string()
}

/// JavaScript string literal (JSON strings are valid JS).
pub(super) fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{value}\""))
}

/// Apply non-overlapping edits, padding each replacement with the newlines
/// it removed.
fn apply_edits(source: &str, edits: &mut [Edit]) -> String {
    edits.sort_by_key(|edit| (edit.start, edit.end));

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0usize;
    for edit in edits.iter() {
        let (start, end) = (edit.start as usize, edit.end as usize);
        if start < cursor {
            continue;
        }
        out.push_str(&source[cursor..start]);
        out.push_str(&edit.text);
        let removed = source[start..end].matches('\n').count();
        let added = edit.text.matches('\n').count();
        for _ in added..removed {
            out.push('\n');
        }
        cursor = end;
    }
    out.push_str(&source[cursor..]);
    out
}

// ============================================================================
// Dependency discovery
// ============================================================================

#[derive(Default)]
struct DependencyCollector {
    requires: Vec<(u32, String)>,
    dynamic: Vec<(Span, String)>,
}

impl<'a> Visit<'a> for DependencyCollector {
    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        if let Expression::Identifier(callee) = &it.callee
            && callee.name.as_str() == "require"
            && it.arguments.len() == 1
            && let Some(Argument::StringLiteral(literal)) = it.arguments.first()
        {
            self.requires.push((it.span.start, literal.value.to_string()));
        }
        walk::walk_call_expression(self, it);
    }

    fn visit_import_expression(&mut self, it: &ImportExpression<'a>) {
        if let Expression::StringLiteral(literal) = &it.source {
            self.dynamic.push((it.span, literal.value.to_string()));
        }
        walk::walk_import_expression(self, it);
    }
}
