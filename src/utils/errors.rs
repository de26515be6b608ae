use std::path::PathBuf;
use thiserror::Error;

/// Source location attached to transform failures
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub file_path: Option<PathBuf>,
    pub line: Option<usize>,
    pub column: Option<usize>,
    pub code_snippet: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: PathBuf) -> Self {
        self.file_path = Some(path);
        self
    }

    pub fn with_location(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    pub fn with_snippet(mut self, snippet: String) -> Self {
        self.code_snippet = Some(snippet);
        self
    }

    /// Build a context for a byte offset into `source`: 1-based line and column
    /// plus up to two lines either side of the offending line.
    pub fn at_offset(path: PathBuf, source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let column = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;

        let first = line.saturating_sub(2).max(1);
        let snippet = source
            .lines()
            .enumerate()
            .skip(first - 1)
            .take(line - first + 3)
            .map(|(i, text)| format!("{}:{}", i + 1, text))
            .collect::<Vec<_>>()
            .join("\n");

        Self::new()
            .with_file(path)
            .with_location(line, column)
            .with_snippet(snippet)
    }
}

#[derive(Error, Debug)]
pub enum BundlerError {
    #[error("Cannot resolve '{specifier}' imported from '{referrer}': {reason}")]
    UnresolvedSpecifier {
        specifier: String,
        referrer: String,
        reason: String,
    },

    #[error("Entry module not found: {}", path.display())]
    EntryNotFound { path: PathBuf },

    #[error("Transform error in '{module}': {message}")]
    Transform {
        module: String,
        message: String,
        context: Option<ErrorContext>,
    },

    #[error("Bundle generation error: {0}")]
    Generate(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Failed to write '{}': {source}", path.display())]
    Emit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BundlerError {
    pub fn unresolved(specifier: &str, referrer: &str, reason: impl Into<String>) -> Self {
        Self::UnresolvedSpecifier {
            specifier: specifier.to_string(),
            referrer: referrer.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a transform error without location context
    pub fn transform(module: &str, message: impl Into<String>) -> Self {
        Self::Transform {
            module: module.to_string(),
            message: message.into(),
            context: None,
        }
    }

    /// Create a transform error pointing into the module source
    pub fn transform_with_context(
        module: &str,
        message: impl Into<String>,
        context: ErrorContext,
    ) -> Self {
        Self::Transform {
            module: module.to_string(),
            message: message.into(),
            context: Some(context),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Canonical identifier of the module the error is about, if any.
    pub fn module_id(&self) -> Option<&str> {
        match self {
            Self::Transform { module, .. } => Some(module),
            Self::UnresolvedSpecifier { referrer, .. } => Some(referrer),
            _ => None,
        }
    }

    /// Format error with enhanced context display
    pub fn format_detailed(&self) -> String {
        match self {
            Self::Transform {
                module,
                message,
                context,
            } => {
                let mut output = format!("❌ Transform Error: {}\n📦 Module: {}", message, module);
                if let Some(ctx) = context {
                    output.push_str(&Self::format_context(ctx));
                }
                output
            }
            Self::UnresolvedSpecifier {
                specifier,
                referrer,
                reason,
            } => format!(
                "❌ Unresolved Import: '{}'\n📦 Imported from: {}\n💡 {}",
                specifier, referrer, reason
            ),
            _ => format!("❌ {}", self),
        }
    }

    fn format_context(ctx: &ErrorContext) -> String {
        let mut output = String::new();

        if let Some(ref file_path) = ctx.file_path {
            output.push_str(&format!("\n📁 File: {}", file_path.display()));
        }

        if let (Some(line), Some(column)) = (ctx.line, ctx.column) {
            output.push_str(&format!("\n📍 Location: line {}, column {}", line, column));
        }

        if let Some(ref snippet) = ctx.code_snippet {
            output.push_str("\n📝 Code:\n");
            output.push_str(&Self::format_code_snippet(snippet, ctx.line));
        }

        output
    }

    fn format_code_snippet(snippet: &str, error_line: Option<usize>) -> String {
        let mut output = String::new();

        for raw in snippet.lines() {
            let (number, text) = raw
                .split_once(':')
                .and_then(|(n, t)| n.parse::<usize>().ok().map(|n| (n, t)))
                .unwrap_or((0, raw));

            if Some(number) == error_line {
                output.push_str(&format!("→ {:3} │ {}\n", number, text));
            } else {
                output.push_str(&format!("  {:3} │ {}\n", number, text));
            }
        }

        output
    }
}

pub type Result<T> = std::result::Result<T, BundlerError>;

impl From<anyhow::Error> for BundlerError {
    fn from(err: anyhow::Error) -> Self {
        BundlerError::Config(format!("{:#}", err))
    }
}

impl From<serde_json::Error> for BundlerError {
    fn from(err: serde_json::Error) -> Self {
        BundlerError::Config(format!("Invalid JSON: {}", err))
    }
}
