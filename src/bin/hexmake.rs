use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use hexmake::config::HexmakeConfig;

#[derive(Parser)]
#[command(name = "hexmake", about = "artifact-based build tool")]
struct Cli {
    /// Output artifacts to build, e.g. out/foo
    #[arg(required = true)]
    targets: Vec<String>,

    /// Max number of parallel worker threads (0 = auto-detect)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Path to an ambient hexmake.toml config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let config = match HexmakeConfig::load(cli.config.as_deref())
        .context("failed to load hexmake.toml")
    {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e:?}");
            std::process::exit(2);
        }
    };

    init_logging(&config, cli.verbose);

    let jobs = cli.jobs.unwrap_or_else(|| config.resolved_jobs());

    let workspace_root = match std::env::current_dir().context("failed to determine working directory")
    {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("error: {e:?}");
            std::process::exit(2);
        }
    };

    match hexmake::build(&workspace_root, &cli.targets, jobs).context("build failed") {
        Ok(true) => std::process::exit(0),
        Ok(false) => {
            eprintln!("error: build failed");
            std::process::exit(1);
        }
        Err(e) => {
            // Parsing, validation and planning failures all surface here —
            // execution-time failures (MissingInput, CommandFailed,
            // MissingDeclaredOutput) are reported by the conductor itself
            // and fold into the `Ok(false)` arm above.
            eprintln!("error: {e:?}");
            std::process::exit(2);
        }
    }
}

fn init_logging(config: &HexmakeConfig, verbose: u8) {
    let base_level = match verbose {
        0 => config.log_level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(base_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(config.color)
        .init();
}
