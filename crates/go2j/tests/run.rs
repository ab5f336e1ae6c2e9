//! Translating a Go tree on disk into a Java project.

use go2j::Report;
use go2j::config::{Go2jConfig, PathsConfig};
use std::path::Path;
use tempfile::TempDir;

fn write(path: &Path, text: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, text).unwrap();
}

fn config(go_src: &Path, java_src: &Path, goroot: &Path) -> Go2jConfig {
    Go2jConfig {
        paths: PathsConfig {
            go_src: Some(go_src.to_path_buf()),
            java_src: Some(java_src.to_path_buf()),
            goroot: Some(goroot.to_path_buf()),
        },
        ..Go2jConfig::default()
    }
}

#[test]
fn test_run_writes_project() {
    let dir = TempDir::new().unwrap();
    let app = dir.path().join("go/src/example.com/app");
    write(
        &app.join("main.go"),
        "package main\n\nimport \"fmt\"\n\nfunc main() {\n\tfmt.Println(Greeting())\n}\n",
    );
    write(
        &app.join("greet.go"),
        "package main\n\nfunc Greeting() string {\n\treturn \"hi\"\n}\n",
    );
    write(&app.join("greet_test.go"), "package main\n\nfunc broken( {\n");
    let out = dir.path().join("out/app");

    let summary = go2j::run(&config(&app, &out, &dir.path().join("goroot")), Report::Quiet).unwrap();
    assert!(summary.failed.is_empty());
    assert_eq!(summary.units.len(), 1);

    assert!(out.join(".project").is_file());
    assert!(out.join(".classpath").is_file());
    assert!(out.join("src/org/go2j/util/ArrayUtil.java").is_file());
    let project = std::fs::read_to_string(out.join(".project")).unwrap();
    assert!(project.contains("<name>app</name>"));

    let main = std::fs::read_to_string(out.join("src/example/com/app/Main.java")).unwrap();
    assert!(main.starts_with("package example.com.app;\n"));
    assert!(main.contains("public static String Greeting() {"));
    assert!(main.contains("System.out.println(Greeting());"));
}

#[test]
fn test_run_reads_system_signatures() {
    let dir = TempDir::new().unwrap();
    let goroot = dir.path().join("goroot");
    write(
        &goroot.join("src/strings/strings.go"),
        "package strings\n\nfunc ToUpper(s string) string {\n\treturn s\n}\n",
    );
    let app = dir.path().join("go/src/app");
    write(
        &app.join("main.go"),
        "package main\n\nimport \"strings\"\n\nfunc main() {\n\tloud := strings.ToUpper(\"x\")\n\t_ = loud\n}\n",
    );
    let out = dir.path().join("out");

    let summary = go2j::run(&config(&app, &out, &goroot), Report::Quiet).unwrap();
    assert_eq!(summary.units.len(), 1);
    let main = std::fs::read_to_string(out.join("src/app/Main.java")).unwrap();
    assert!(main.contains("String loud = Strings.ToUpper(\"x\");"), "{}", main);
}

#[test]
fn test_parse_error_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let app = dir.path().join("go/src/app");
    write(&app.join("main.go"), "package main\n\nfunc main( {\n");
    let out = dir.path().join("out");

    let err = go2j::run(&config(&app, &out, &dir.path().join("goroot")), Report::Quiet).unwrap_err();
    assert!(err.to_string().contains("app/main.go"));
    assert!(!out.exists());
}

#[test]
fn test_go_src_outside_src_rejected() {
    let dir = TempDir::new().unwrap();
    let app = dir.path().join("project");
    std::fs::create_dir_all(&app).unwrap();
    let result = go2j::run(
        &config(&app, &dir.path().join("out"), &dir.path().join("goroot")),
        Report::Quiet,
    );
    assert!(result.is_err());
}
