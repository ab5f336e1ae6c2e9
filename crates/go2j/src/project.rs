//! Eclipse project scaffolding and output files.

use anyhow::Context;
use go2j_engine::TranslatedUnit;
use std::path::{Path, PathBuf};

const DOT_PROJECT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<projectDescription>
	<name>{{project_name}}</name>
	<comment></comment>
	<projects>
	</projects>
	<buildSpec>
		<buildCommand>
			<name>org.eclipse.jdt.core.javabuilder</name>
			<arguments>
			</arguments>
		</buildCommand>
	</buildSpec>
	<natures>
		<nature>org.eclipse.jdt.core.javanature</nature>
	</natures>
</projectDescription>
"#;

const DOT_CLASSPATH: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<classpath>
	<classpathentry kind="src" path="src"/>
	<classpathentry kind="con" path="org.eclipse.jdt.launching.JRE_CONTAINER"/>
	<classpathentry kind="output" path="bin"/>
</classpath>
"#;

/// Runtime support for `append`, referenced by translated sources.
pub const ARRAY_UTIL_PATH: &str = "org/go2j/util/ArrayUtil.java";

const ARRAY_UTIL: &str = "package org.go2j.util;

import java.util.Arrays;

public class ArrayUtil {

	public static <T> T[] append(T[] original, T element) {
		T[] copy = Arrays.copyOf(original, original.length + 1);
		copy[original.length] = element;
		return copy;
	}

}
";

/// Write `.project` and `.classpath` into `root`.
pub fn write_project(root: &Path, name: &str) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(root)
        .with_context(|| format!("failed to create {}", root.display()))?;
    let project = DOT_PROJECT.replace("{{project_name}}", name);
    let files = [
        (root.join(".project"), project.as_str()),
        (root.join(".classpath"), DOT_CLASSPATH),
    ];
    let mut written = Vec::new();
    for (path, text) in files {
        write_file(&path, text)?;
        written.push(path);
    }
    Ok(written)
}

/// Write the helper classes under the Java source root.
pub fn write_helpers(src: &Path) -> anyhow::Result<PathBuf> {
    let path = src.join(ARRAY_UTIL_PATH);
    write_file(&path, ARRAY_UTIL)?;
    Ok(path)
}

/// Write one translated unit under the Java source root.
pub fn write_unit(src: &Path, unit: &TranslatedUnit) -> anyhow::Result<PathBuf> {
    let path = src.join(&unit.path);
    write_file(&path, &unit.text)?;
    Ok(path)
}

fn write_file(path: &Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_project_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("app");
        let written = write_project(&root, "app").unwrap();
        assert_eq!(written.len(), 2);

        let project = std::fs::read_to_string(root.join(".project")).unwrap();
        assert!(project.contains("<name>app</name>"));
        let classpath = std::fs::read_to_string(root.join(".classpath")).unwrap();
        assert!(classpath.contains(r#"<classpathentry kind="src" path="src"/>"#));
    }

    #[test]
    fn test_helper_and_unit_paths() {
        let dir = TempDir::new().unwrap();
        let helper = write_helpers(dir.path()).unwrap();
        assert!(helper.ends_with("org/go2j/util/ArrayUtil.java"));
        let text = std::fs::read_to_string(helper).unwrap();
        assert!(text.contains("public static <T> T[] append(T[] original, T element)"));

        let unit = TranslatedUnit {
            path: "example/com/app/Main.java".to_string(),
            package: "example.com.app".to_string(),
            class: "Main".to_string(),
            qualified_name: "example.com.app.Main".to_string(),
            text: "package example.com.app;\n".to_string(),
        };
        let path = write_unit(dir.path(), &unit).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), unit.text);
    }
}
