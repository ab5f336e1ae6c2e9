//! Go to Java raw cross compiler.
//!
//! Collects the Go sources of a package tree, translates them with
//! [`go2j_engine`] and writes the result as an Eclipse Java project.

pub mod config;
pub mod files;
pub mod project;
pub mod sources;

use anyhow::Context;
use go2j_engine::{Program, TranslatedUnit};
use serde::Serialize;
use std::path::PathBuf;

use config::Go2jConfig;
use sources::GorootSources;

/// How generated sources are reported on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Report {
    /// One `add:` line per written file.
    #[default]
    Paths,
    /// Every generated file, preceded by a banner.
    Sources,
    /// A JSON summary of the run.
    Json,
    Quiet,
}

/// Result of a run; serialized for `--json`.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub units: Vec<TranslatedUnit>,
    pub written: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

/// Translate the Go tree named by `config` and write the Java project.
///
/// A parse error aborts the run before anything is written. Write
/// failures are logged and collected in [`Summary::failed`].
pub fn run(config: &Go2jConfig, report: Report) -> anyhow::Result<Summary> {
    let go_src = config
        .paths
        .go_src
        .as_deref()
        .context("no Go source directory given (--go-src)")?;
    let java_src = config
        .paths
        .java_src
        .as_deref()
        .context("no Java target directory given (--java-src)")?;
    let root = files::source_root(go_src)?;
    let system = GorootSources::new(&config.goroot());

    let mut program = Program::new();
    for path in files::list_go_files(go_src) {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let relative = files::relative_path(&path, &root);
        program.discover(&relative, &text, &system)?;
    }
    let units = program.flatten()?;

    let name = config.project_name().unwrap_or_else(|| "go2j".to_string());
    let mut written = project::write_project(java_src, &name)?;
    let src = java_src.join("src");
    written.push(project::write_helpers(&src)?);

    let mut failed = Vec::new();
    for unit in &units {
        if report == Report::Sources {
            println!("---------- {} ----------", unit.qualified_name);
            println!("{}", unit.text);
        }
        match project::write_unit(&src, unit) {
            Ok(path) => {
                tracing::info!(path = %path.display(), "wrote unit");
                written.push(path);
            }
            Err(err) => {
                tracing::error!(
                    unit = %unit.qualified_name,
                    error = %format!("{:#}", err),
                    "write failed"
                );
                failed.push(src.join(&unit.path));
            }
        }
    }

    let summary = Summary {
        units,
        written,
        failed,
    };
    match report {
        Report::Paths => {
            for path in &summary.written {
                println!("add: {}", path.display());
            }
        }
        Report::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        Report::Sources | Report::Quiet => {}
    }
    Ok(summary)
}
