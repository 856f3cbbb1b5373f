mod cmd;
mod console;
mod output;
mod root;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "agent-os",
    about = "Install Agent OS and related code quality tools into a Laravel project",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from composer.json or .git/)
    #[arg(long, global = true, env = "AGENT_OS_ROOT")]
    root: Option<PathBuf>,

    /// Answer yes to every confirmation prompt
    #[arg(long, short = 'y', global = true)]
    yes: bool,

    /// Print the run summary as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install Agent OS and the code quality toolchain
    Install,

    /// Check that Claude Code reviews can be optimized for this project
    OptimizeReviews,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let root = root::resolve_root(cli.root.as_deref(), &cwd);
    let opts = cmd::RunOptions {
        assume_yes: cli.yes,
        json: cli.json,
    };

    let result = match cli.command {
        Commands::Install => cmd::install::run(&root, opts),
        Commands::OptimizeReviews => cmd::optimize_reviews::run(&root, opts),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            // Print the full error chain (anyhow's alternate Display)
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}
