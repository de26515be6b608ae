//! Dependency graph construction.
//!
//! Breadth-first walk from the entry: every reachable module is read,
//! transformed exactly once, and recorded with a table mapping each of its
//! specifiers to the canonical identifier it resolved to.

use crate::core::interfaces::{FileSystemService, SourceTransformer};
use crate::core::models::{DependencyGraph, ModuleRecord};
use crate::core::resolver::{normalize, resolve, ModuleLocator};
use crate::utils::{BundlerError, Logger, Result, Timer};
use indexmap::IndexMap;
use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::sync::Arc;

pub struct GraphBuilder {
    fs: Arc<dyn FileSystemService>,
    transformer: Arc<dyn SourceTransformer>,
    locator: ModuleLocator,
}

impl GraphBuilder {
    pub fn new(
        fs: Arc<dyn FileSystemService>,
        transformer: Arc<dyn SourceTransformer>,
        locator: ModuleLocator,
    ) -> Self {
        Self {
            fs,
            transformer,
            locator,
        }
    }

    /// Canonical identifier of the entry file.
    pub async fn entry_id(&self, entry: &Path) -> Result<String> {
        let id = normalize(&entry.to_string_lossy());
        self.locator
            .locate(&id, self.fs.as_ref())
            .await
            .ok_or_else(|| BundlerError::EntryNotFound {
                path: entry.to_path_buf(),
            })
    }

    /// Build the graph reachable from `entry`. Any failure aborts the whole
    /// build; no partial graph is returned.
    pub async fn build(&self, entry: &Path) -> Result<DependencyGraph> {
        let _timer = Timer::start("Building dependency graph");

        let entry_id = self.entry_id(entry).await?;

        let mut graph = DependencyGraph::new();
        let mut queue = VecDeque::from([entry_id.clone()]);
        let mut queued = HashSet::from([entry_id]);

        while let Some(id) = queue.pop_front() {
            if graph.contains(&id) {
                continue;
            }

            Logger::visiting_module(&id);
            let record = self.visit(&id, &mut queue, &mut queued).await?;
            graph.insert(record);
        }

        Logger::graph_complete(graph.len());
        Ok(graph)
    }

    async fn visit(
        &self,
        id: &str,
        queue: &mut VecDeque<String>,
        queued: &mut HashSet<String>,
    ) -> Result<ModuleRecord> {
        let source = self
            .fs
            .read_file(Path::new(id))
            .await
            .map_err(|e| BundlerError::transform(id, format!("cannot read module: {}", e)))?;

        let output = self
            .transformer
            .transform(id, &source)
            .await
            .map_err(|e| match e {
                BundlerError::Transform { .. } => e,
                other => BundlerError::transform(id, other.to_string()),
            })?;

        let mut dependencies = IndexMap::with_capacity(output.import_specifiers.len());
        for specifier in output.import_specifiers {
            let target = self.locate_dependency(id, &specifier).await?;
            Logger::resolved(&specifier, id, &target);

            if queued.insert(target.clone()) {
                queue.push_back(target.clone());
            }
            dependencies.insert(specifier, target);
        }

        Ok(ModuleRecord {
            id: id.to_string(),
            code: output.code,
            dependencies,
        })
    }

    async fn locate_dependency(&self, referrer: &str, specifier: &str) -> Result<String> {
        let resolved = resolve(referrer, specifier)?;

        self.locator
            .locate(&resolved, self.fs.as_ref())
            .await
            .ok_or_else(|| {
                BundlerError::unresolved(
                    specifier,
                    referrer,
                    format!("no such file: {}", resolved),
                )
            })
    }
}
