use crate::core::models::{BuildConfig, OutputConfig, ResolveConfig, RuntimeOptions};
use crate::utils::{BundlerError, Logger, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "minipack.config.json";

/// Configuration file format (minipack.config.json)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinipackConfig {
    /// Entry point file (e.g., "src/main.js")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub resolve: ResolveConfig,

    #[serde(default)]
    pub runtime: RuntimeOptions,
}

/// A configuration file together with the directory its relative paths are
/// resolved against
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: MinipackConfig,
    pub base_dir: PathBuf,
}

/// Values given on the command line; each one overrides the file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub entry: Option<PathBuf>,
    pub outdir: Option<PathBuf>,
    pub filename: Option<String>,
}

/// Config loader that supports config files with CLI override
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load an explicitly named configuration file
    pub fn load_from_file(path: &Path) -> Result<LoadedConfig> {
        Logger::debug(&format!("Loading config from {}", path.display()));

        let content = std::fs::read_to_string(path).map_err(|e| {
            BundlerError::config(format!("Cannot read {}: {}", path.display(), e))
        })?;

        let config: MinipackConfig = serde_json::from_str(&content).map_err(|e| {
            BundlerError::config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        Logger::debug("✅ Config file loaded successfully");
        Ok(LoadedConfig {
            config,
            base_dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
        })
    }

    /// Load `minipack.config.json` from `root` if there is one
    pub fn discover(root: &Path) -> Result<Option<LoadedConfig>> {
        let config_path = root.join(CONFIG_FILE_NAME);

        if !config_path.is_file() {
            Logger::debug(&format!("No {} found, using defaults", CONFIG_FILE_NAME));
            return Ok(None);
        }

        Self::load_from_file(&config_path).map(Some)
    }

    /// Merge file config with CLI arguments (CLI takes precedence). Paths
    /// from the file are relative to the file's directory; paths from the
    /// CLI are used as given.
    pub fn merge_with_cli(file: Option<LoadedConfig>, cli: CliOverrides) -> Result<BuildConfig> {
        let (base, base_dir) = match file {
            Some(loaded) => (loaded.config, loaded.base_dir),
            None => (MinipackConfig::default(), PathBuf::new()),
        };

        let entry = match (cli.entry, base.entry) {
            (Some(entry), _) => entry,
            (None, Some(entry)) => relative_to(&base_dir, Path::new(&entry)),
            (None, None) => {
                return Err(BundlerError::config(format!(
                    "No entry given: pass --entry or set \"entry\" in {}",
                    CONFIG_FILE_NAME
                )))
            }
        };

        let mut output = base.output;
        output.path = match cli.outdir {
            Some(outdir) => outdir,
            None => relative_to(&base_dir, &output.path),
        };
        if let Some(filename) = cli.filename {
            output.filename = filename;
        }

        let config = BuildConfig {
            entry,
            output,
            resolve: base.resolve,
            runtime: base.runtime,
        };

        Self::validate(&config)?;
        Ok(config)
    }

    fn validate(config: &BuildConfig) -> Result<()> {
        if config.output.filename.trim().is_empty() {
            return Err(BundlerError::config("output.filename must not be empty"));
        }

        if let Some(ext) = config
            .resolve
            .extensions
            .iter()
            .find(|ext| !ext.starts_with('.') || ext.len() < 2)
        {
            return Err(BundlerError::config(format!(
                "resolve.extensions entries must look like \".js\", got \"{}\"",
                ext
            )));
        }

        Ok(())
    }

    /// Generate example config file
    pub fn generate_example() -> String {
        let example = MinipackConfig {
            entry: Some("src/main.js".to_string()),
            ..Default::default()
        };
        serde_json::to_string_pretty(&example).unwrap_or_else(|_| {
            r#"{
  "entry": "src/main.js",
  "output": { "path": "dist", "filename": "bundle.js", "format": true },
  "resolve": { "extensions": [".js", ".mjs", ".cjs"] },
  "runtime": { "strictCycles": false }
}"#
            .to_string()
        })
    }
}

fn relative_to(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
