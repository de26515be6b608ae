use crate::core::{interfaces::*, services::MinipackBuildService};
use crate::infrastructure::{FileEmitter, OxcModuleTransformer, TokioFileSystemService};
use crate::utils::{
    BuildReporter, BundlerError, CliOverrides, ConfigLoader, Logger, Result, CONFIG_FILE_NAME,
};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "minipack", version)]
#[command(about = "minipack - bundle an ES module graph into one self-contained script")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Bundle an entry module and everything it imports
    Build {
        /// Configuration file (default: ./minipack.config.json if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Entry module, overrides the configuration file
        #[arg(short, long)]
        entry: Option<PathBuf>,
        /// Output directory, overrides the configuration file
        #[arg(short, long)]
        outdir: Option<PathBuf>,
        /// Output file name, overrides the configuration file
        #[arg(short, long)]
        filename: Option<String>,
    },
    /// Write an example minipack.config.json to the current directory
    Init {
        /// Replace an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

pub struct CliHandler;

impl CliHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn run(&self) -> Result<()> {
        // Initialize logging
        Logger::init();

        let cli = Cli::parse();

        match cli.command {
            Commands::Build {
                config,
                entry,
                outdir,
                filename,
            } => {
                self.handle_build_command(
                    config.as_deref(),
                    CliOverrides {
                        entry,
                        outdir,
                        filename,
                    },
                )
                .await
            }
            Commands::Init { force } => self.handle_init_command(Path::new("."), force),
        }
    }

    async fn handle_build_command(
        &self,
        config_path: Option<&Path>,
        overrides: CliOverrides,
    ) -> Result<()> {
        let file_config = match config_path {
            Some(path) => Some(ConfigLoader::load_from_file(path)?),
            None => ConfigLoader::discover(Path::new("."))?,
        };
        let config = ConfigLoader::merge_with_cli(file_config, overrides)?;

        let reporter = BuildReporter::new();
        reporter.show_banner();

        let fs_service: Arc<dyn FileSystemService> = Arc::new(TokioFileSystemService);
        let build_service = MinipackBuildService::new(
            fs_service.clone(),
            Arc::new(OxcModuleTransformer::new()),
            Arc::new(FileEmitter::new(fs_service)),
        );

        let result = build_service.build(&config).await?;
        reporter.show_completion(&result);

        Ok(())
    }

    fn handle_init_command(&self, root: &Path, force: bool) -> Result<()> {
        let config_path = root.join(CONFIG_FILE_NAME);

        if config_path.exists() && !force {
            return Err(BundlerError::config(format!(
                "{} already exists, use --force to replace it",
                config_path.display()
            )));
        }

        std::fs::write(&config_path, ConfigLoader::generate_example())
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        Logger::info(&format!("📝 Wrote {}", config_path.display()));
        Ok(())
    }
}

impl Default for CliHandler {
    fn default() -> Self {
        Self::new()
    }
}
