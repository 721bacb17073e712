mod commands;
mod input;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rhtmx-routes")]
#[command(version, about = "Inspect RHTMX file-based routes", long_about = None)]
struct Cli {
    #[command(flatten)]
    input: InputArgs,

    /// Log compiler decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where routes and options come from
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// File listing one virtual path per line (`#` starts a comment)
    #[arg(long, global = true, conflicts_with = "dir")]
    paths: Option<PathBuf>,

    /// Pages directory to scan instead of a path list
    #[arg(long, global = true, default_value = "pages")]
    dir: PathBuf,

    /// TOML file with a [routes] table
    #[arg(short, long, global = true, default_value = "rhtmx.toml")]
    config: PathBuf,

    /// Keep the first source on conflicting routes instead of failing
    #[arg(long, global = true)]
    lenient: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the nested route tree as JSON
    Tree,

    /// Print the server manifest as JSON
    Manifest,

    /// Resolve a URL against the manifest
    Match {
        /// Request path, e.g. /users/42
        url: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Tree => commands::tree::execute(&cli.input)?,
        Commands::Manifest => commands::manifest::execute(&cli.input)?,
        Commands::Match { url } => commands::resolve::execute(&cli.input, &url)?,
    }

    Ok(())
}
