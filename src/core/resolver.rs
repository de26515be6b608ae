//! Specifier resolution.
//!
//! [`resolve`] is purely lexical: it never touches the file system, so two
//! spellings of the same path always produce the same canonical identifier.
//! [`ModuleLocator`] then maps that identifier onto a file that actually
//! exists, trying the configured extensions and `index` files.

use crate::core::interfaces::FileSystemService;
use crate::utils::{BundlerError, Result};
use path_clean::PathClean;
use std::path::Path;

/// `./x`, `../x`, `.` and `..`
pub fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Lexically normalize a path into canonical identifier form: `.` and `..`
/// segments collapsed, repeated separators removed, `/` as the separator.
pub fn normalize(path: &str) -> String {
    let unified = path.replace('\\', "/");
    Path::new(&unified)
        .clean()
        .to_string_lossy()
        .replace('\\', "/")
}

/// Resolve `specifier` as written inside the module `containing` to a
/// canonical identifier.
pub fn resolve(containing: &str, specifier: &str) -> Result<String> {
    if specifier.is_empty() {
        return Err(BundlerError::unresolved(
            specifier,
            containing,
            "empty import specifier",
        ));
    }

    if specifier.starts_with('/') {
        return Ok(normalize(specifier));
    }

    if !is_relative(specifier) {
        return Err(BundlerError::unresolved(
            specifier,
            containing,
            "bare module specifiers are not supported, import a relative path instead",
        ));
    }

    let containing = containing.replace('\\', "/");
    let dir = Path::new(&containing).parent().unwrap_or_else(|| Path::new(""));
    Ok(normalize(&dir.join(specifier).to_string_lossy()))
}

/// Maps lexically resolved identifiers onto existing files.
#[derive(Debug, Clone)]
pub struct ModuleLocator {
    extensions: Vec<String>,
}

impl ModuleLocator {
    pub fn new(extensions: Vec<String>) -> Self {
        Self { extensions }
    }

    /// Files tried for `id`, in order: the path itself, the path with each
    /// extension appended, then `index` + extension inside the path.
    pub fn candidates(&self, id: &str) -> Vec<String> {
        let mut candidates = Vec::with_capacity(1 + self.extensions.len() * 2);
        candidates.push(id.to_string());

        for ext in &self.extensions {
            candidates.push(format!("{}{}", id, ext));
        }

        for ext in &self.extensions {
            candidates.push(normalize(&format!("{}/index{}", id, ext)));
        }

        candidates
    }

    /// First existing candidate for `id`.
    pub async fn locate(&self, id: &str, fs: &dyn FileSystemService) -> Option<String> {
        for candidate in self.candidates(id) {
            if fs.is_file(Path::new(&candidate)).await {
                return Some(candidate);
            }
        }
        None
    }
}

impl Default for ModuleLocator {
    fn default() -> Self {
        Self::new(crate::core::models::ResolveConfig::default().extensions)
    }
}
