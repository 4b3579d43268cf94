use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};

fn main() {
    // Logs go to stderr so JSON output on stdout stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ysync=info")),
        )
        .init();

    let cli = Cli::parse();
    let format = cli.format.into();

    let result = match &cli.command {
        Commands::Apply(args) => commands::apply::run(args, format),
        Commands::ParsePath(args) => commands::parse::run_path(args, format),
        Commands::ParseKey(args) => commands::parse::run_key(args, format),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
