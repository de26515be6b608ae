//! minipack: a minimal module bundler.
//!
//! Starting from one entry module, minipack walks every relative import,
//! lowers each module's `import`/`export` syntax to a `require`/`exports`
//! function body, and writes a single script that contains the whole graph
//! plus a small loader that runs it.

pub mod cli;
pub mod core;
pub mod infrastructure;
pub mod utils;

pub use crate::core::{
    generate, resolve, BuildConfig, BuildResult, BuildService, DependencyGraph, GraphBuilder,
    MinipackBuildService, ModuleLocator, ModuleRecord, RuntimeOptions,
};
pub use crate::infrastructure::{FileEmitter, OxcModuleTransformer, TokioFileSystemService};
pub use crate::utils::{BundlerError, Result};
