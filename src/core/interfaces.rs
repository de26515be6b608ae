use crate::core::models::*;
use crate::utils::Result;
use async_trait::async_trait;
use std::path::Path;

/// File system operations interface
#[async_trait]
pub trait FileSystemService: Send + Sync {
    async fn read_file(&self, path: &Path) -> Result<String>;
    async fn write_file(&self, path: &Path, content: &str) -> Result<()>;
    async fn create_directory(&self, path: &Path) -> Result<()>;
    async fn is_file(&self, path: &Path) -> bool;
}

/// Turns one module's source text into loader-ready code plus the list of
/// specifiers it imports.
#[async_trait]
pub trait SourceTransformer: Send + Sync {
    async fn transform(&self, id: &str, source: &str) -> Result<TransformOutput>;
}

/// Persists a finished bundle
#[async_trait]
pub trait OutputEmitter: Send + Sync {
    async fn emit(&self, source: &str, output: &OutputConfig) -> Result<OutputFile>;
}

/// Build service interface
#[async_trait]
pub trait BuildService: Send + Sync {
    async fn build(&self, config: &BuildConfig) -> Result<BuildResult>;
}
