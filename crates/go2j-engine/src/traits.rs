//! Read errors and the system package provider seam.

use crate::ast::File;

/// Error that can occur when reading Go source into a syntax tree.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("unsupported syntax: {0}")]
    Unsupported(String),

    #[error("expected {expected}, got {got}")]
    UnexpectedNode { expected: String, got: String },
}

/// One source file of a system package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the system source root.
    pub path: String,
    pub text: String,
}

/// Provides library sources for imports outside the program's own module.
///
/// Consulted once per distinct import path; files are parsed for
/// signatures only and never emitted.
pub trait SystemSources {
    /// Source files of the package at `import_path` (e.g. `"time"`), or an
    /// empty list when the package is unknown.
    fn package_files(&self, import_path: &str) -> Vec<SourceFile>;
}

/// System sources that know no packages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSystemSources;

impl SystemSources for NoSystemSources {
    fn package_files(&self, _import_path: &str) -> Vec<SourceFile> {
        Vec::new()
    }
}

/// In-memory system sources keyed by import path.
#[derive(Debug, Clone, Default)]
pub struct MemorySystemSources {
    packages: std::collections::HashMap<String, Vec<SourceFile>>,
}

impl MemorySystemSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, import_path: &str, path: &str, text: &str) -> Self {
        self.packages
            .entry(import_path.to_string())
            .or_default()
            .push(SourceFile {
                path: path.to_string(),
                text: text.to_string(),
            });
        self
    }
}

impl SystemSources for MemorySystemSources {
    fn package_files(&self, import_path: &str) -> Vec<SourceFile> {
        self.packages.get(import_path).cloned().unwrap_or_default()
    }
}
