use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use usagescope::command::ProcessCommandBridge;
use usagescope::config::Config;
use usagescope::scope::{collect, JsonLinesSink, RunMode};

#[derive(Parser)]
#[command(name = "usagescope")]
#[command(version)]
#[command(about = "Usage metrics for an instrumented npm package", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect usage metrics and print them as JSON lines
    Collect {
        /// Directory of the instrumented package
        #[arg(long, default_value = ".")]
        cwd: PathBuf,

        /// Root of the project using the package
        #[arg(long)]
        root: PathBuf,

        /// JSON config file with a `collect` section
        #[arg(short, long)]
        config: PathBuf,

        /// Analyse one file at a time, in order
        #[arg(long)]
        sequential: bool,
    },
    /// Show version information
    Version,
}

fn canonical(path: &Path) -> anyhow::Result<PathBuf> {
    path.canonicalize()
        .with_context(|| format!("cannot resolve {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("usagescope=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Collect {
            cwd,
            root,
            config,
            sequential,
        }) => {
            let config = Config::from_file(&config)
                .with_context(|| format!("loading {}", config.display()))?;
            let mode = if sequential {
                RunMode::Sequential
            } else {
                RunMode::Concurrent
            };

            let sink = JsonLinesSink::new(io::stdout());
            let captured = collect(
                &canonical(&cwd)?,
                &canonical(&root)?,
                &config.collect,
                mode,
                &ProcessCommandBridge,
                &sink,
            );
            tracing::info!(metrics = captured, "collection finished");
        }
        Some(Commands::Version) => {
            println!("usagescope v{}", env!("CARGO_PKG_VERSION"));
        }
        None => {
            println!("UsageScope - usage metrics for an instrumented npm package");
            println!("Run 'usagescope collect --root <dir> --config <file>' to collect");
            println!("Run 'usagescope --help' for more information");
        }
    }
    Ok(())
}
