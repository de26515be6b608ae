//! ES module syntax lowering with oxc.
//!
//! Each module is rewritten into a function body that receives `require` and
//! `exports`:
//!
//! - import declarations become `var _x = require("./x.js");` at the same
//!   position, and every reference to an imported binding is rewritten to a
//!   member access on that variable so imports stay live
//! - local exports become getters on `exports`, defined in a prologue before
//!   any module code runs
//! - re-exports become a `require` plus getters at the declaration's position
//!
//! Everything else is left byte-for-byte as written.

use crate::core::{
    interfaces::SourceTransformer,
    models::{ModuleType, TransformOutput},
};
use crate::utils::{quote, BundlerError, ErrorContext, Result, Timer};
use once_cell::sync::Lazy;
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    AwaitExpression, BindingIdentifier, CallExpression, ExportAllDeclaration,
    ExportDefaultDeclaration, ExportDefaultDeclarationKind, ExportNamedDeclaration, Expression,
    ForOfStatement, FunctionBody, IdentifierReference, ImportDeclaration,
    ImportDeclarationSpecifier, ImportExpression, MetaProperty, ModuleExportName, ObjectProperty,
    Program, Statement,
};
use oxc_ast_visit::{walk, Visit};
use oxc_diagnostics::OxcDiagnostic;
use oxc_parser::{Parser, ParserReturn};
use oxc_semantic::{Scoping, SemanticBuilder, SymbolId};
use oxc_span::{GetSpan, SourceType, Span};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

static IDENTIFIER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

static NON_IDENTIFIER_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_$]").unwrap());

/// Parameters of every module factory; a module may not bind them itself
const LOADER_BINDINGS: [&str; 2] = ["require", "exports"];

/// Source transformer backed by the oxc parser and semantic analyzer
#[derive(Debug, Clone, Default)]
pub struct OxcModuleTransformer;

impl OxcModuleTransformer {
    pub fn new() -> Self {
        Self
    }

    /// Lower one module. Synchronous: the allocator and AST never leave this
    /// call.
    pub fn lower(&self, id: &str, source: &str) -> Result<TransformOutput> {
        let _timer = Timer::start(&format!("Transforming {}", id));

        let extension = Path::new(id)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        if ModuleType::from_extension(extension) != ModuleType::JavaScript {
            return Err(BundlerError::transform(
                id,
                format!("unsupported module type '{}', expected a .js, .mjs or .cjs file", extension),
            ));
        }

        let allocator = Allocator::default();
        let ParserReturn {
            program, errors, ..
        } = Parser::new(&allocator, source, SourceType::mjs()).parse();

        if !errors.is_empty() {
            return Err(diagnostics_error(id, source, &errors));
        }

        let semantic_ret = SemanticBuilder::new()
            .with_check_syntax_error(true)
            .build(&program);

        if !semantic_ret.errors.is_empty() {
            return Err(diagnostics_error(id, source, &semantic_ret.errors));
        }

        let scoping = semantic_ret.semantic.scoping();

        if let Some(err) = loader_binding_clash(id, source, scoping) {
            return Err(err);
        }

        let mut collector = UsageCollector::new(scoping);
        collector.visit_program(&program);

        if let Some((span, message)) = collector.unsupported {
            let context =
                ErrorContext::at_offset(PathBuf::from(id), source, span.start as usize);
            return Err(BundlerError::transform_with_context(id, message, context));
        }

        let mut lowering = Lowering::new(source, scoping, collector.names);
        lowering.run(&program, &collector.uses);

        Ok(lowering.finish(&program))
    }
}

#[async_trait::async_trait]
impl SourceTransformer for OxcModuleTransformer {
    async fn transform(&self, id: &str, source: &str) -> Result<TransformOutput> {
        self.lower(id, source)
    }
}

/// A top-level `require` or `exports` declaration would shadow the factory
/// parameters the lowered code depends on.
fn loader_binding_clash(id: &str, source: &str, scoping: &Scoping) -> Option<BundlerError> {
    let root = scoping.root_scope_id();
    let symbol = scoping.symbol_ids().find(|&symbol| {
        scoping.symbol_scope_id(symbol) == root
            && LOADER_BINDINGS.contains(&scoping.symbol_name(symbol))
    })?;

    let span = scoping.symbol_span(symbol);
    Some(BundlerError::transform_with_context(
        id,
        format!(
            "top-level binding '{}' clashes with the bundle loader, rename it",
            scoping.symbol_name(symbol)
        ),
        ErrorContext::at_offset(PathBuf::from(id), source, span.start as usize),
    ))
}

fn diagnostics_error(id: &str, source: &str, diagnostics: &[OxcDiagnostic]) -> BundlerError {
    let message = diagnostics
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("; ");

    match diagnostics.first().and_then(diagnostic_offset) {
        Some(offset) => BundlerError::transform_with_context(
            id,
            message,
            ErrorContext::at_offset(PathBuf::from(id), source, offset),
        ),
        None => BundlerError::transform(id, message),
    }
}

fn diagnostic_offset(diagnostic: &OxcDiagnostic) -> Option<usize> {
    diagnostic
        .labels
        .as_ref()
        .and_then(|labels| labels.first())
        .map(|label| label.offset())
}

/// One identifier reference and how it is written at its site
struct IdentifierUse {
    span: Span,
    symbol: Option<SymbolId>,
    shorthand: bool,
    callee: bool,
}

/// Collects identifier references, every name in the module, and the first
/// construct the loader cannot support.
struct UsageCollector<'s> {
    scoping: &'s Scoping,
    uses: Vec<IdentifierUse>,
    names: HashSet<String>,
    shorthand: HashSet<u32>,
    callees: HashSet<u32>,
    /// Number of function bodies enclosing the current node
    function_depth: usize,
    unsupported: Option<(Span, &'static str)>,
}

impl<'s> UsageCollector<'s> {
    fn new(scoping: &'s Scoping) -> Self {
        Self {
            scoping,
            uses: Vec::new(),
            names: HashSet::new(),
            shorthand: HashSet::new(),
            callees: HashSet::new(),
            function_depth: 0,
            unsupported: None,
        }
    }
}

impl<'a, 's> Visit<'a> for UsageCollector<'s> {
    fn visit_identifier_reference(&mut self, it: &IdentifierReference<'a>) {
        self.names.insert(it.name.to_string());

        let symbol = it
            .reference_id
            .get()
            .and_then(|reference_id| self.scoping.get_reference(reference_id).symbol_id());

        self.uses.push(IdentifierUse {
            span: it.span,
            symbol,
            shorthand: self.shorthand.contains(&it.span.start),
            callee: self.callees.contains(&it.span.start),
        });
    }

    fn visit_binding_identifier(&mut self, it: &BindingIdentifier<'a>) {
        self.names.insert(it.name.to_string());
    }

    fn visit_object_property(&mut self, it: &ObjectProperty<'a>) {
        if it.shorthand {
            if let Expression::Identifier(ident) = &it.value {
                self.shorthand.insert(ident.span.start);
            }
        }
        walk::walk_object_property(self, it);
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        if let Expression::Identifier(ident) = &it.callee {
            self.callees.insert(ident.span.start);
        }
        walk::walk_call_expression(self, it);
    }

    fn visit_import_expression(&mut self, it: &ImportExpression<'a>) {
        self.unsupported
            .get_or_insert((it.span, "dynamic import() is not supported, bundles are a single chunk"));
        walk::walk_import_expression(self, it);
    }

    fn visit_function_body(&mut self, it: &FunctionBody<'a>) {
        self.function_depth += 1;
        walk::walk_function_body(self, it);
        self.function_depth -= 1;
    }

    fn visit_await_expression(&mut self, it: &AwaitExpression<'a>) {
        if self.function_depth == 0 {
            self.unsupported
                .get_or_insert((it.span, "top-level await is not supported, module factories are synchronous"));
        }
        walk::walk_await_expression(self, it);
    }

    fn visit_for_of_statement(&mut self, it: &ForOfStatement<'a>) {
        if it.r#await && self.function_depth == 0 {
            self.unsupported
                .get_or_insert((it.span, "top-level for await is not supported, module factories are synchronous"));
        }
        walk::walk_for_of_statement(self, it);
    }

    fn visit_meta_property(&mut self, it: &MetaProperty<'a>) {
        if it.meta.name.as_str() == "import" {
            self.unsupported
                .get_or_insert((it.span, "import.meta is not available inside a bundle"));
        }
    }
}

struct Edit {
    start: u32,
    end: u32,
    text: String,
}

struct Lowering<'s> {
    source: &'s str,
    scoping: &'s Scoping,
    reserved: HashSet<String>,
    edits: Vec<Edit>,
    specifiers: Vec<String>,
    /// exported name → expression the getter returns
    exports: Vec<(String, String)>,
    /// names exported other than through `export *`, which star exports never override
    explicit_exports: Vec<String>,
    /// imported local binding → member expression replacing its references
    bindings: HashMap<SymbolId, String>,
}

impl<'s> Lowering<'s> {
    fn new(source: &'s str, scoping: &'s Scoping, reserved: HashSet<String>) -> Self {
        Self {
            source,
            scoping,
            reserved,
            edits: Vec::new(),
            specifiers: Vec::new(),
            exports: Vec::new(),
            explicit_exports: Vec::new(),
            bindings: HashMap::new(),
        }
    }

    fn run(&mut self, program: &Program<'_>, uses: &[IdentifierUse]) {
        if let Some(hashbang) = &program.hashbang {
            self.replace(hashbang.span, String::new());
        }

        // Imports first so export specifiers can see imported bindings
        // wherever they appear in the file.
        for stmt in &program.body {
            if let Statement::ImportDeclaration(decl) = stmt {
                self.lower_import(decl);
            }
        }

        self.explicit_exports = self.explicit_export_names(program);

        for stmt in &program.body {
            match stmt {
                Statement::ExportNamedDeclaration(decl) => self.lower_export_named(decl),
                Statement::ExportDefaultDeclaration(decl) => self.lower_export_default(decl),
                Statement::ExportAllDeclaration(decl) => self.lower_export_all(decl),
                _ => {}
            }
        }

        for site in uses {
            let Some(replacement) = site.symbol.and_then(|s| self.bindings.get(&s)) else {
                continue;
            };

            let text = if site.shorthand {
                format!("{}: {}", self.slice(site.span), replacement)
            } else if site.callee {
                format!("(0, {})", replacement)
            } else {
                replacement.clone()
            };
            self.replace(site.span, text);
        }
    }

    fn finish(mut self, program: &Program<'_>) -> TransformOutput {
        if !self.exports.is_empty() {
            let mut prologue = String::from(
                "\nObject.defineProperty(exports, \"__esModule\", { value: true });\n",
            );
            for (name, expression) in &self.exports {
                prologue.push_str(&getter(name, expression));
                prologue.push('\n');
            }

            let position = program.directives.last().map_or(0, |d| d.span.end);
            self.insert(position, prologue);
        }

        TransformOutput {
            code: apply_edits(self.source, self.edits),
            import_specifiers: self.specifiers,
        }
    }

    fn lower_import(&mut self, decl: &ImportDeclaration<'_>) {
        let specifier = decl.source.value.as_str();
        self.add_specifier(specifier);
        let call = format!("require({})", quote(specifier));

        let specifiers = match &decl.specifiers {
            Some(specifiers) if !specifiers.is_empty() => specifiers,
            _ => {
                self.replace(decl.span, format!("{};", call));
                return;
            }
        };

        let namespace = specifiers.iter().find_map(|s| match s {
            ImportDeclarationSpecifier::ImportNamespaceSpecifier(ns) => {
                Some(ns.local.name.to_string())
            }
            _ => None,
        });
        let var = namespace.unwrap_or_else(|| self.fresh_name(specifier));

        for s in specifiers {
            let (local, member) = match s {
                ImportDeclarationSpecifier::ImportSpecifier(s) => {
                    (&s.local, member_access(s.imported.name().as_str()))
                }
                ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                    (&s.local, ".default".to_string())
                }
                ImportDeclarationSpecifier::ImportNamespaceSpecifier(_) => continue,
            };
            if let Some(symbol) = local.symbol_id.get() {
                self.bindings.insert(symbol, format!("{}{}", var, member));
            }
        }

        self.replace(decl.span, format!("var {} = {};", var, call));
    }

    fn lower_export_named(&mut self, decl: &ExportNamedDeclaration<'_>) {
        if let Some(source) = &decl.source {
            let specifier = source.value.as_str();
            self.add_specifier(specifier);
            let var = self.fresh_name(specifier);

            let mut text = format!("var {} = require({});", var, quote(specifier));
            for spec in &decl.specifiers {
                let target = format!("{}{}", var, member_access(spec.local.name().as_str()));
                text.push('\n');
                text.push_str(&getter(spec.exported.name().as_str(), &target));
            }
            self.replace(decl.span, text);
            return;
        }

        if let Some(declaration) = &decl.declaration {
            let declaration_span = declaration.span();
            self.replace(Span::new(decl.span.start, declaration_span.start), String::new());
            for name in self.declared_names(declaration_span) {
                self.exports.push((name.clone(), name));
            }
            return;
        }

        for spec in &decl.specifiers {
            let expression = match &spec.local {
                ModuleExportName::IdentifierReference(ident) => self.binding_expression(ident),
                other => other.name().to_string(),
            };
            self.exports
                .push((spec.exported.name().to_string(), expression));
        }
        self.replace(decl.span, String::new());
    }

    fn lower_export_default(&mut self, decl: &ExportDefaultDeclaration<'_>) {
        let declaration_span = decl.declaration.span();
        let prefix = Span::new(decl.span.start, declaration_span.start);

        let named = match &decl.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(func) => match &func.id {
                Some(id) => Some(id.name.to_string()),
                None => {
                    // Name it so the declaration stays hoisted like a named one.
                    let name = self.unique_name("_default".to_string());
                    let position = func.params.span.start;
                    let needs_space = !self.source[..position as usize].ends_with(char::is_whitespace);
                    let text = if needs_space { format!(" {}", name) } else { name.clone() };
                    self.insert(position, text);
                    Some(name)
                }
            },
            ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                class.id.as_ref().map(|id| id.name.to_string())
            }
            _ => None,
        };

        match named {
            Some(name) => {
                self.replace(prefix, String::new());
                self.exports.push(("default".to_string(), name));
            }
            None => {
                self.replace(prefix, "exports.default = ".to_string());
                if !self.slice(decl.span).trim_end().ends_with(';') {
                    self.insert(decl.span.end, ";".to_string());
                }
            }
        }
    }

    fn lower_export_all(&mut self, decl: &ExportAllDeclaration<'_>) {
        let specifier = decl.source.value.as_str();
        self.add_specifier(specifier);
        let var = self.fresh_name(specifier);

        let mut text = format!("var {} = require({});\n", var, quote(specifier));
        match &decl.exported {
            Some(exported) => text.push_str(&getter(exported.name().as_str(), &var)),
            None => text.push_str(&format!(
                "Object.keys({var}).forEach(function (key) {{\n\
                 if ({skip}.indexOf(key) !== -1 || Object.prototype.hasOwnProperty.call(exports, key)) return;\n\
                 Object.defineProperty(exports, key, {{ enumerable: true, get: function () {{ return {var}[key]; }} }});\n\
                 }});",
                var = var,
                skip = serde_json::Value::from(self.explicit_exports.clone())
            )),
        }
        self.replace(decl.span, text);
    }

    fn explicit_export_names(&self, program: &Program<'_>) -> Vec<String> {
        let mut names = vec!["default".to_string(), "__esModule".to_string()];

        for stmt in &program.body {
            match stmt {
                Statement::ExportNamedDeclaration(decl) => {
                    if let Some(declaration) = &decl.declaration {
                        names.extend(self.declared_names(declaration.span()));
                    }
                    names.extend(decl.specifiers.iter().map(|spec| spec.exported.name().to_string()));
                }
                Statement::ExportAllDeclaration(decl) => {
                    if let Some(exported) = &decl.exported {
                        names.push(exported.name().to_string());
                    }
                }
                _ => {}
            }
        }

        names.sort();
        names.dedup();
        names
    }

    /// Names bound in the module scope by the declaration at `span`, in
    /// source order.
    fn declared_names(&self, span: Span) -> Vec<String> {
        let root = self.scoping.root_scope_id();
        let mut names: Vec<(u32, String)> = self
            .scoping
            .symbol_ids()
            .filter(|&symbol| self.scoping.symbol_scope_id(symbol) == root)
            .filter_map(|symbol| {
                let symbol_span = self.scoping.symbol_span(symbol);
                (symbol_span.start >= span.start && symbol_span.end <= span.end).then(|| {
                    (
                        symbol_span.start,
                        self.scoping.symbol_name(symbol).to_string(),
                    )
                })
            })
            .collect();

        names.sort();
        names.into_iter().map(|(_, name)| name).collect()
    }

    fn binding_expression(&self, ident: &IdentifierReference<'_>) -> String {
        ident
            .reference_id
            .get()
            .and_then(|reference_id| self.scoping.get_reference(reference_id).symbol_id())
            .and_then(|symbol| self.bindings.get(&symbol))
            .cloned()
            .unwrap_or_else(|| ident.name.to_string())
    }

    fn add_specifier(&mut self, specifier: &str) {
        if !self.specifiers.iter().any(|s| s == specifier) {
            self.specifiers.push(specifier.to_string());
        }
    }

    /// `./lib/util.js` → `_util`, made unique against every name in the module.
    fn fresh_name(&mut self, specifier: &str) -> String {
        let stem = Path::new(specifier)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty() && *s != "." && *s != "..")
            .unwrap_or("module");
        self.unique_name(format!("_{}", NON_IDENTIFIER_CHARS.replace_all(stem, "_")))
    }

    /// `base`, or `base_N` if that is taken.
    fn unique_name(&mut self, base: String) -> String {
        let mut candidate = base.clone();
        let mut suffix = 1;
        while self.reserved.contains(&candidate) {
            candidate = format!("{}_{}", base, suffix);
            suffix += 1;
        }

        self.reserved.insert(candidate.clone());
        candidate
    }

    fn slice(&self, span: Span) -> &'s str {
        &self.source[span.start as usize..span.end as usize]
    }

    fn replace(&mut self, span: Span, text: String) {
        self.edits.push(Edit {
            start: span.start,
            end: span.end,
            text,
        });
    }

    fn insert(&mut self, position: u32, text: String) {
        self.replace(Span::new(position, position), text);
    }
}

/// Apply non-overlapping edits in order. An edit starting inside one already
/// applied is dropped: its text was replaced wholesale.
fn apply_edits(source: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by_key(|edit| (edit.start, edit.end));

    let mut output = String::with_capacity(source.len() + 256);
    let mut cursor = 0usize;

    for edit in edits {
        let (start, end) = (edit.start as usize, edit.end as usize);
        if start < cursor {
            continue;
        }
        output.push_str(&source[cursor..start]);
        output.push_str(&edit.text);
        cursor = end;
    }

    output.push_str(&source[cursor..]);
    output
}

fn getter(name: &str, expression: &str) -> String {
    format!(
        "Object.defineProperty(exports, {}, {{ enumerable: true, get: function () {{ return {}; }} }});",
        quote(name),
        expression
    )
}

fn member_access(name: &str) -> String {
    if IDENTIFIER_REGEX.is_match(name) {
        format!(".{}", name)
    } else {
        format!("[{}]", quote(name))
    }
}
