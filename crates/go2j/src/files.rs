//! Go source tree traversal.

use anyhow::bail;
use std::path::{Component, Path, PathBuf};

/// Whether `path` is a Go source that belongs in the translation.
pub fn is_go_source(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    name.ends_with(".go") && !name.ends_with("_test.go")
}

/// Every Go source under `root`, sorted, skipping hidden and `testdata`
/// directories.
pub fn list_go_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0 || {
                let name = entry.file_name().to_string_lossy();
                !name.starts_with('.') && name != "testdata"
            }
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_go_source(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

/// The GOPATH `src` directory containing `go_src`; source paths are made
/// relative to it so their directories become Java packages.
pub fn source_root(go_src: &Path) -> anyhow::Result<PathBuf> {
    let components: Vec<Component> = go_src.components().collect();
    let Some(last) = components
        .iter()
        .rposition(|component| component.as_os_str() == "src")
    else {
        bail!("{} must lie under a src directory", go_src.display());
    };
    Ok(components[..=last].iter().collect())
}

/// `path` relative to `root` with `/` separators.
pub fn relative_path(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "package p\n").unwrap();
    }

    #[test]
    fn test_list_skips_tests_and_hidden() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("main.go"));
        touch(&root.join("util/strings.go"));
        touch(&root.join("util/strings_test.go"));
        touch(&root.join(".git/hook.go"));
        touch(&root.join("testdata/fixture.go"));
        touch(&root.join("README.md"));

        let files: Vec<String> = list_go_files(root)
            .iter()
            .map(|path| relative_path(path, root))
            .collect();
        assert_eq!(files, vec!["main.go", "util/strings.go"]);
    }

    #[test]
    fn test_source_root() {
        let root = source_root(Path::new("/home/me/go/src/github.com/me/app")).unwrap();
        assert_eq!(root, PathBuf::from("/home/me/go/src"));
        assert!(source_root(Path::new("/home/me/project")).is_err());
    }

    #[test]
    fn test_relative_path() {
        let path = Path::new("/go/src/example.com/app/main.go");
        assert_eq!(
            relative_path(path, Path::new("/go/src")),
            "example.com/app/main.go"
        );
    }
}
