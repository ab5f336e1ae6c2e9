//! Configuration for go2j.
//!
//! Loads config from `go2j.toml` in the working directory, or from the file
//! given with `--config`. Command-line flags override every value.
//!
//! Example go2j.toml:
//! ```toml
//! [paths]
//! go_src = "/home/me/go/src/github.com/me/app"
//! java_src = "/tmp/out/app"
//! goroot = "/usr/local/go"
//!
//! [output]
//! print_sources = false
//! project_name = "app"
//! ```

use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "go2j.toml";

/// Go library root used when neither the config nor `GOROOT` names one.
pub const DEFAULT_GOROOT: &str = "/usr/local/go";

/// Source and target locations.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    /// Go package directory to translate; must lie under a `src` directory.
    pub go_src: Option<PathBuf>,
    /// Root of the generated Java project.
    pub java_src: Option<PathBuf>,
    /// Go installation whose `src` holds the standard library.
    pub goroot: Option<PathBuf>,
}

/// What to do with the translated sources.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Print every generated file to stdout.
    pub print_sources: bool,
    /// Eclipse project name; the last segment of `java_src` when absent.
    pub project_name: Option<String>,
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Go2jConfig {
    pub paths: PathsConfig,
    pub output: OutputConfig,
}

impl Go2jConfig {
    /// Load `go2j.toml` from `root` if present, falling back to defaults.
    pub fn load(root: &Path) -> Self {
        let config = Self::default();
        match Self::load_file(&root.join(CONFIG_FILE)) {
            Some(file) => config.merge(file),
            None => config,
        }
    }

    /// Load an explicitly requested config file. Unlike [`Self::load`] a
    /// missing or malformed file is an error.
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    fn load_file(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring malformed config");
                None
            }
        }
    }

    /// Merge another config into this one; values set in `other` win.
    pub fn merge(self, other: Self) -> Self {
        Self {
            paths: PathsConfig {
                go_src: other.paths.go_src.or(self.paths.go_src),
                java_src: other.paths.java_src.or(self.paths.java_src),
                goroot: other.paths.goroot.or(self.paths.goroot),
            },
            output: OutputConfig {
                print_sources: other.output.print_sources || self.output.print_sources,
                project_name: other.output.project_name.or(self.output.project_name),
            },
        }
    }

    /// Apply `$GOROOT`, which overrides the config file but not flags.
    pub fn with_env_goroot(mut self, goroot: Option<PathBuf>) -> Self {
        if let Some(goroot) = goroot.filter(|path| !path.as_os_str().is_empty()) {
            self.paths.goroot = Some(goroot);
        }
        self
    }

    pub fn goroot(&self) -> PathBuf {
        self.paths
            .goroot
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_GOROOT))
    }

    /// Project name, defaulting to the last segment of the Java target.
    pub fn project_name(&self) -> Option<String> {
        self.output.project_name.clone().or_else(|| {
            self.paths
                .java_src
                .as_deref()
                .and_then(Path::file_name)
                .map(|name| name.to_string_lossy().into_owned())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Go2jConfig::default();
        assert_eq!(config.paths.go_src, None);
        assert!(!config.output.print_sources);
        assert_eq!(config.goroot(), PathBuf::from(DEFAULT_GOROOT));
    }

    #[test]
    fn test_load_project_config() {
        let dir = TempDir::new().unwrap();
        let mut file = std::fs::File::create(dir.path().join(CONFIG_FILE)).unwrap();
        writeln!(
            file,
            r#"
[paths]
go_src = "/home/me/go/src/app"
java_src = "/tmp/out/app"

[output]
print_sources = true
"#
        )
        .unwrap();

        let config = Go2jConfig::load(dir.path());
        assert_eq!(config.paths.go_src, Some(PathBuf::from("/home/me/go/src/app")));
        assert!(config.output.print_sources);
        assert_eq!(config.project_name().as_deref(), Some("app"));
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Go2jConfig::load(dir.path()), Go2jConfig::default());
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = TempDir::new().unwrap();
        assert!(Go2jConfig::read(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_merge_prefers_other() {
        let base = Go2jConfig {
            paths: PathsConfig {
                goroot: Some(PathBuf::from("/opt/go")),
                java_src: Some(PathBuf::from("/tmp/a")),
                ..PathsConfig::default()
            },
            ..Go2jConfig::default()
        };
        let flags = Go2jConfig {
            paths: PathsConfig {
                java_src: Some(PathBuf::from("/tmp/b")),
                ..PathsConfig::default()
            },
            ..Go2jConfig::default()
        };
        let merged = base.merge(flags);
        assert_eq!(merged.paths.java_src, Some(PathBuf::from("/tmp/b")));
        assert_eq!(merged.paths.goroot, Some(PathBuf::from("/opt/go")));
    }

    #[test]
    fn test_env_goroot_overrides_file() {
        let mut file = Go2jConfig::default();
        file.paths.goroot = Some(PathBuf::from("/opt/go"));
        let config = file.clone().with_env_goroot(Some(PathBuf::from("/env/go")));
        assert_eq!(config.goroot(), PathBuf::from("/env/go"));

        let config = file.with_env_goroot(Some(PathBuf::new()));
        assert_eq!(config.goroot(), PathBuf::from("/opt/go"));
    }
}
