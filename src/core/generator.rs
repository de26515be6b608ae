//! Bundle generation.
//!
//! The bundle is one classic script: a self-invoking loader that receives the
//! module graph as an object literal and the entry identifier. Every module
//! body is a real `function (require, exports)` so each module gets its own
//! scope. The loader keeps one exports object per module and registers it
//! before the module body runs, which is what lets cyclic imports terminate.

use crate::core::models::{DependencyGraph, RuntimeOptions};
use crate::utils::{quote, BundlerError, Logger, Result};

const LOADER_HEAD: &str = r#"(function (modules, entry) {
"use strict";
var cache = Object.create(null);
"#;

const LOADER_BODY: &str = r#"function requireModule(id) {
var cached = cache[id];
if (cached) {
if (strictCycles && cached.loading && Object.keys(cached.exports).length === 0) {
var cycle = new Error("Module '" + id + "' was required again before it finished loading and has no exports yet");
cycle.name = "CyclicExecutionError";
throw cycle;
}
return cached.exports;
}
if (!Object.prototype.hasOwnProperty.call(modules, id)) {
throw new Error("Cannot find module '" + id + "'");
}
var record = modules[id];
var module = { exports: {}, loading: true };
cache[id] = module;
function localRequire(specifier) {
if (!Object.prototype.hasOwnProperty.call(record.dependencies, specifier)) {
throw new Error("Cannot find module '" + specifier + "' from '" + id + "'");
}
return requireModule(record.dependencies[specifier]);
}
try {
record.factory.call(undefined, localRequire, module.exports);
} catch (error) {
delete cache[id];
throw error;
}
module.loading = false;
return module.exports;
}
requireModule(entry);
})("#;

/// Produce the bundle text for `graph`, starting execution at `entry`.
pub fn generate(graph: &DependencyGraph, entry: &str, options: &RuntimeOptions) -> Result<String> {
    if !graph.contains(entry) {
        return Err(BundlerError::Generate(format!(
            "entry '{}' is not part of the module graph",
            entry
        )));
    }

    let missing = graph.missing_dependencies();
    if !missing.is_empty() {
        let listed = missing
            .iter()
            .map(|(referrer, specifier, target)| {
                format!("'{}' from {} → {}", specifier, referrer, target)
            })
            .collect::<Vec<_>>()
            .join(", ");
        return Err(BundlerError::Generate(format!(
            "module graph is not closed: {}",
            listed
        )));
    }

    let mut bundle = String::with_capacity(
        LOADER_HEAD.len()
            + LOADER_BODY.len()
            + graph.modules().map(|m| m.code.len() + 128).sum::<usize>(),
    );

    bundle.push_str(LOADER_HEAD);
    bundle.push_str(&format!("var strictCycles = {};\n", options.strict_cycles));
    bundle.push_str(LOADER_BODY);

    bundle.push_str("{\n");
    for (index, record) in graph.modules().enumerate() {
        if index > 0 {
            bundle.push_str(",\n");
        }

        let dependencies = serde_json::to_string(&record.dependencies)
            .map_err(|e| BundlerError::Generate(e.to_string()))?;

        bundle.push_str(&quote(&record.id));
        bundle.push_str(": {\nfactory: function (require, exports) {\n\"use strict\";\n");
        bundle.push_str(&record.code);
        bundle.push_str("\n},\ndependencies: ");
        bundle.push_str(&dependencies);
        bundle.push_str("\n}");
    }
    bundle.push_str("\n}, ");
    bundle.push_str(&quote(entry));
    bundle.push_str(");\n");

    Logger::debug(&format!(
        "Generated bundle for {} modules ({} bytes)",
        graph.len(),
        bundle.len()
    ));

    Ok(bundle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ModuleRecord;

    fn record(id: &str, code: &str, deps: &[(&str, &str)]) -> ModuleRecord {
        ModuleRecord {
            id: id.to_string(),
            code: code.to_string(),
            dependencies: deps
                .iter()
                .map(|(s, t)| (s.to_string(), t.to_string()))
                .collect(),
        }
    }

    fn scenario() -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        graph.insert(record(
            "/proj/main.js",
            "var _util = require(\"./util.js\");\nglobalThis.result = (0, _util.add)(2, 3);",
            &[("./util.js", "/proj/util.js")],
        ));
        graph.insert(record(
            "/proj/util.js",
            "function add(a, b) { return a + b; }\nexports.add = add;",
            &[],
        ));
        graph
    }

    #[test]
    fn test_bundle_embeds_every_module_once() {
        let bundle = generate(&scenario(), "/proj/main.js", &RuntimeOptions::default()).unwrap();

        assert_eq!(bundle.matches("\"/proj/main.js\": {").count(), 1);
        assert_eq!(bundle.matches("\"/proj/util.js\": {").count(), 1);
        assert_eq!(bundle.matches("factory: function (require, exports)").count(), 2);
        assert!(bundle.contains(r#"dependencies: {"./util.js":"/proj/util.js"}"#));
        assert!(bundle.contains("dependencies: {}"));
    }

    #[test]
    fn test_bundle_ends_by_requiring_entry() {
        let bundle = generate(&scenario(), "/proj/main.js", &RuntimeOptions::default()).unwrap();

        assert!(bundle.starts_with("(function (modules, entry) {"));
        assert!(bundle.contains("requireModule(entry);\n})("));
        assert!(bundle.ends_with("}, \"/proj/main.js\");\n"));
    }

    #[test]
    fn test_placeholder_is_cached_before_factory_runs() {
        let bundle = generate(&scenario(), "/proj/main.js", &RuntimeOptions::default()).unwrap();

        let placeholder = bundle.find("cache[id] = module;").unwrap();
        let factory_call = bundle.find("record.factory.call(undefined, localRequire, module.exports);").unwrap();
        assert!(placeholder < factory_call);
        assert!(bundle.contains("delete cache[id];"));
    }

    #[test]
    fn test_strict_cycles_flag() {
        let relaxed = generate(&scenario(), "/proj/main.js", &RuntimeOptions::default()).unwrap();
        assert!(relaxed.contains("var strictCycles = false;"));

        let strict = generate(
            &scenario(),
            "/proj/main.js",
            &RuntimeOptions { strict_cycles: true },
        )
        .unwrap();
        assert!(strict.contains("var strictCycles = true;"));
        assert!(strict.contains("cycle.name = \"CyclicExecutionError\";"));
    }

    #[test]
    fn test_identifiers_are_escaped() {
        let mut graph = DependencyGraph::new();
        graph.insert(record("/odd/\"quoted\".js", "", &[]));

        let bundle = generate(&graph, "/odd/\"quoted\".js", &RuntimeOptions::default()).unwrap();
        assert!(bundle.contains(r#""/odd/\"quoted\".js": {"#));
    }

    #[test]
    fn test_module_code_ending_in_line_comment_stays_inside_factory() {
        let mut graph = DependencyGraph::new();
        graph.insert(record("/a.js", "globalThis.x = 1; // trailing", &[]));

        let bundle = generate(&graph, "/a.js", &RuntimeOptions::default()).unwrap();
        assert!(bundle.contains("// trailing\n},"));
    }

    #[test]
    fn test_entry_must_be_in_graph() {
        let err = generate(&scenario(), "/proj/other.js", &RuntimeOptions::default()).unwrap_err();
        assert!(matches!(err, BundlerError::Generate(_)));
    }

    #[test]
    fn test_open_graph_is_rejected() {
        let mut graph = DependencyGraph::new();
        graph.insert(record("/a.js", "", &[("./b.js", "/b.js")]));

        let err = generate(&graph, "/a.js", &RuntimeOptions::default()).unwrap_err();
        assert!(err.to_string().contains("not closed"));
        assert!(err.to_string().contains("'./b.js' from /a.js"));
    }
}
