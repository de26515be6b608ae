use crate::core::{
    generator::generate,
    graph::GraphBuilder,
    interfaces::*,
    models::*,
    resolver::ModuleLocator,
};
use crate::utils::{BundlerError, Logger, Result, Timer};
use std::sync::Arc;

/// Build pipeline: dependency graph, then bundle text, then the output file.
/// Nothing is written unless the first two steps succeed.
pub struct MinipackBuildService {
    fs_service: Arc<dyn FileSystemService>,
    transformer: Arc<dyn SourceTransformer>,
    emitter: Arc<dyn OutputEmitter>,
}

impl MinipackBuildService {
    pub fn new(
        fs_service: Arc<dyn FileSystemService>,
        transformer: Arc<dyn SourceTransformer>,
        emitter: Arc<dyn OutputEmitter>,
    ) -> Self {
        Self {
            fs_service,
            transformer,
            emitter,
        }
    }

    fn graph_builder(&self, config: &BuildConfig) -> GraphBuilder {
        GraphBuilder::new(
            self.fs_service.clone(),
            self.transformer.clone(),
            ModuleLocator::new(config.resolve.extensions.clone()),
        )
    }
}

#[async_trait::async_trait]
impl BuildService for MinipackBuildService {
    async fn build(&self, config: &BuildConfig) -> Result<BuildResult> {
        let timer = Timer::start("Build");

        Logger::build_start(
            &config.entry.display().to_string(),
            &config.output_file().display().to_string(),
        );

        let graph = self.graph_builder(config).build(&config.entry).await?;
        let entry = graph
            .entry()
            .ok_or_else(|| BundlerError::Generate("module graph is empty".to_string()))?
            .to_string();

        let bundle = generate(&graph, &entry, &config.runtime)?;
        let output = self.emitter.emit(&bundle, &config.output).await?;

        let build_time = timer.elapsed();
        Logger::build_complete(graph.len(), &output.path.display().to_string(), build_time);

        Ok(BuildResult {
            entry,
            modules: graph.len(),
            output,
            build_time,
        })
    }
}
