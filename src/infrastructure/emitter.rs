use crate::core::interfaces::{FileSystemService, OutputEmitter};
use crate::core::models::{OutputConfig, OutputFile};
use crate::infrastructure::processors::JsFormatter;
use crate::utils::{format_size, BundlerError, Logger, Result};
use std::path::Path;
use std::sync::Arc;

/// Writes the bundle to `<output.path>/<output.filename>`
pub struct FileEmitter {
    fs_service: Arc<dyn FileSystemService>,
    formatter: JsFormatter,
}

impl FileEmitter {
    pub fn new(fs_service: Arc<dyn FileSystemService>) -> Self {
        Self {
            fs_service,
            formatter: JsFormatter::new(),
        }
    }
}

#[async_trait::async_trait]
impl OutputEmitter for FileEmitter {
    async fn emit(&self, source: &str, output: &OutputConfig) -> Result<OutputFile> {
        // Format first so a bundle that fails to parse leaves the disk untouched.
        let code = if output.format {
            self.formatter.format(source)?
        } else {
            source.to_string()
        };

        let path = output.path.join(&output.filename);

        self.fs_service
            .create_directory(&output.path)
            .await
            .map_err(|e| emit_error(&output.path, e))?;

        self.fs_service
            .write_file(&path, &code)
            .await
            .map_err(|e| emit_error(&path, e))?;

        Logger::debug(&format!("Wrote {} ({})", path.display(), format_size(code.len())));

        Ok(OutputFile {
            path,
            size: code.len(),
        })
    }
}

fn emit_error(path: &Path, err: BundlerError) -> BundlerError {
    match err {
        BundlerError::Io(source) => BundlerError::Emit {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    }
}
