//! Standard library sources read from a Go installation.

use go2j_engine::{SourceFile, SystemSources};
use std::path::{Path, PathBuf};

use crate::files::{is_go_source, relative_path};

/// Reads the files of a standard library package from `$GOROOT/src`.
#[derive(Debug, Clone)]
pub struct GorootSources {
    src: PathBuf,
}

impl GorootSources {
    pub fn new(goroot: &Path) -> Self {
        Self {
            src: goroot.join("src"),
        }
    }
}

impl SystemSources for GorootSources {
    fn package_files(&self, import_path: &str) -> Vec<SourceFile> {
        let dir = self.src.join(import_path);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::debug!(dir = %dir.display(), error = %err, "no system package sources");
                return Vec::new();
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_go_source(path))
            .collect();
        paths.sort();

        paths
            .into_iter()
            .filter_map(|path| match std::fs::read_to_string(&path) {
                Ok(text) => Some(SourceFile {
                    path: relative_path(&path, &self.src),
                    text,
                }),
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "unreadable system source"
                    );
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_package_files() {
        let dir = TempDir::new().unwrap();
        let pkg = dir.path().join("src/strings");
        std::fs::create_dir_all(pkg.join("internal")).unwrap();
        std::fs::write(pkg.join("strings.go"), "package strings\n").unwrap();
        std::fs::write(pkg.join("strings_test.go"), "package strings\n").unwrap();
        std::fs::write(pkg.join("internal/x.go"), "package internal\n").unwrap();

        let sources = GorootSources::new(dir.path());
        let files = sources.package_files("strings");
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "strings/strings.go");
        assert_eq!(files[0].text, "package strings\n");
        assert!(sources.package_files("missing").is_empty());
    }
}
