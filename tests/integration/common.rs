use minipack::core::interfaces::{BuildService, FileSystemService};
use minipack::core::models::{BuildConfig, BuildResult};
use minipack::core::services::MinipackBuildService;
use minipack::infrastructure::{FileEmitter, OxcModuleTransformer, TokioFileSystemService};
use minipack::utils::Result;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::{Arc, OnceLock};

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Write `files` (relative path → contents) under `root`.
pub fn write_project(root: &Path, files: &[(&str, &str)]) {
    for (path, contents) in files {
        let path = root.join(path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }
}

pub async fn build(entry: &Path, outdir: &Path, strict_cycles: bool) -> Result<BuildResult> {
    let mut config = BuildConfig::new(entry);
    config.output.path = outdir.to_path_buf();
    config.runtime.strict_cycles = strict_cycles;

    let fs_service: Arc<dyn FileSystemService> = Arc::new(TokioFileSystemService);
    let build_service = MinipackBuildService::new(
        fs_service.clone(),
        Arc::new(OxcModuleTransformer::new()),
        Arc::new(FileEmitter::new(fs_service)),
    );

    build_service.build(&config).await
}

/// Check if node is available to execute bundles.
pub fn node_available() -> bool {
    static AVAILABLE: OnceLock<bool> = OnceLock::new();
    *AVAILABLE.get_or_init(|| {
        match Command::new("node").arg("--version").output() {
            Ok(o) => o.status.success(),
            Err(_) => false,
        }
    })
}

/// Skip test if node is not available.
macro_rules! skip_if_no_node {
    () => {
        if !crate::common::node_available() {
            eprintln!("Skipping test: node not available on PATH");
            return;
        }
    };
}
pub(crate) use skip_if_no_node;

pub fn run_node(script: &Path) -> Output {
    Command::new("node")
        .arg(script)
        .output()
        .expect("failed to run node")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
