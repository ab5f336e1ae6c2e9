use clap::Parser;
use go2j::Report;
use go2j::config::{CONFIG_FILE, Go2jConfig, OutputConfig, PathsConfig};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "go2j")]
#[command(version)]
#[command(about = "Go to Java raw cross compiler")]
struct Cli {
    /// Go package directory to translate; must lie under a `src` directory
    #[arg(long = "go-src", visible_alias = "gs", value_name = "DIR")]
    go_src: Option<PathBuf>,

    /// Java project directory to write
    #[arg(long = "java-src", visible_alias = "js", value_name = "DIR")]
    java_src: Option<PathBuf>,

    /// Go installation providing the standard library sources
    #[arg(long, value_name = "DIR")]
    goroot: Option<PathBuf>,

    /// Print every generated source file
    #[arg(long, visible_alias = "psrc")]
    print_sources: bool,

    /// Print a JSON summary instead of file paths
    #[arg(long, conflicts_with = "print_sources")]
    json: bool,

    /// Config file (defaults to ./go2j.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log more (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn flags(&self) -> Go2jConfig {
        Go2jConfig {
            paths: PathsConfig {
                go_src: self.go_src.clone(),
                java_src: self.java_src.clone(),
                goroot: self.goroot.clone(),
            },
            output: OutputConfig {
                print_sources: self.print_sources,
                project_name: None,
            },
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file = match &cli.config {
        Some(path) => Go2jConfig::read(path)?,
        None => Go2jConfig::load(Path::new(".")),
    };
    let config_path = cli.config.as_deref().unwrap_or(Path::new(CONFIG_FILE));
    tracing::debug!(path = %config_path.display(), "loaded config");
    let config = file
        .with_env_goroot(std::env::var_os("GOROOT").map(PathBuf::from))
        .merge(cli.flags());

    let report = if cli.json {
        Report::Json
    } else if config.output.print_sources {
        Report::Sources
    } else {
        Report::Paths
    };
    let summary = go2j::run(&config, report)?;
    if !summary.failed.is_empty() {
        anyhow::bail!("{} files could not be written", summary.failed.len());
    }
    Ok(())
}
