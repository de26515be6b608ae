use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// One module of the graph, keyed by its canonical identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    pub id: String,
    pub code: String,
    /// Raw specifier as written in source → canonical identifier
    pub dependencies: IndexMap<String, String>,
}

/// Canonical identifier → module record, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    modules: IndexMap<String, ModuleRecord>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record. Returns false (and keeps the existing record) if the
    /// identifier is already present.
    pub fn insert(&mut self, record: ModuleRecord) -> bool {
        if self.modules.contains_key(&record.id) {
            return false;
        }
        self.modules.insert(record.id.clone(), record);
        true
    }

    pub fn get(&self, id: &str) -> Option<&ModuleRecord> {
        self.modules.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.modules.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// The first module discovered, i.e. the entry of a built graph.
    pub fn entry(&self) -> Option<&str> {
        self.modules.keys().next().map(String::as_str)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleRecord> {
        self.modules.values()
    }

    /// (referrer, specifier, target) for every dependency whose target is not a
    /// key of the graph. Empty for a closed graph.
    pub fn missing_dependencies(&self) -> Vec<(&str, &str, &str)> {
        self.modules
            .values()
            .flat_map(|record| {
                record
                    .dependencies
                    .iter()
                    .filter(|(_, target)| !self.modules.contains_key(target.as_str()))
                    .map(|(specifier, target)| {
                        (record.id.as_str(), specifier.as_str(), target.as_str())
                    })
            })
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        self.missing_dependencies().is_empty()
    }
}

/// Output of the source transformer for a single module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformOutput {
    pub code: String,
    /// Declared import specifiers, in source order, without duplicates
    pub import_specifiers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    pub entry: PathBuf,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub resolve: ResolveConfig,
    #[serde(default)]
    pub runtime: RuntimeOptions,
}

impl BuildConfig {
    pub fn new(entry: impl Into<PathBuf>) -> Self {
        Self {
            entry: entry.into(),
            output: OutputConfig::default(),
            resolve: ResolveConfig::default(),
            runtime: RuntimeOptions::default(),
        }
    }

    pub fn output_file(&self) -> PathBuf {
        self.output.path.join(&self.output.filename)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_outdir")]
    pub path: PathBuf,
    #[serde(default = "default_filename")]
    pub filename: String,
    /// Pretty-print the bundle before writing
    #[serde(default = "default_true")]
    pub format: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_outdir(),
            filename: default_filename(),
            format: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Extensions tried, in order, when an import names a file without one
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

/// Knobs for the synthesized module loader
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeOptions {
    /// Throw `CyclicExecutionError` when a cyclic require observes an exports
    /// object nothing has been assigned to yet
    #[serde(default)]
    pub strict_cycles: bool,
}

fn default_outdir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_filename() -> String {
    "bundle.js".to_string()
}

fn default_true() -> bool {
    true
}

fn default_extensions() -> Vec<String> {
    vec![".js".to_string(), ".mjs".to_string(), ".cjs".to_string()]
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleType {
    JavaScript,
    Unknown,
}

impl ModuleType {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "js" | "mjs" | "cjs" => ModuleType::JavaScript,
            _ => ModuleType::Unknown,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputFile {
    pub path: PathBuf,
    pub size: usize,
}

#[derive(Debug)]
pub struct BuildResult {
    pub entry: String,
    pub modules: usize,
    pub output: OutputFile,
    pub build_time: Duration,
}
