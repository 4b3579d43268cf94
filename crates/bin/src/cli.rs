//! CLI argument definitions for the ysync binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::output::OutputFormat;

/// Output format flag
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum Format {
    /// Aligned tables and pretty-printed documents
    #[default]
    Human,
    /// One JSON object per invocation
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Human => OutputFormat::Human,
            Format::Json => OutputFormat::Json,
        }
    }
}

/// Replay hierarchical change events onto a document
#[derive(Parser, Debug)]
#[command(name = "ysync")]
#[command(about = "ysync: apply path-keyed change events onto structured values")]
#[command(version)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human", env = "YSYNC_FORMAT")]
    pub format: Format,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply a stream of change events to a dynamic document
    Apply(ApplyArgs),
    /// Split a slash-separated path into segments
    ParsePath(ParsePathArgs),
    /// Decompose a structured list-entry key
    ParseKey(ParseKeyArgs),
}

/// Arguments for the apply command
#[derive(clap::Args, Debug)]
pub struct ApplyArgs {
    /// File of JSON change events, one per line. `-` reads standard input.
    #[arg(default_value = "-")]
    pub events: String,

    /// JSON document to start from instead of an empty one
    #[arg(short, long)]
    pub initial: Option<PathBuf>,

    /// JSON file with sync options
    #[arg(short, long, env = "YSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Queue events between batch markers and apply them at batch end
    #[arg(long)]
    pub buffer_batches: bool,
}

/// Arguments for the parse-path command
#[derive(clap::Args, Debug)]
pub struct ParsePathArgs {
    /// Path such as /interfaces/interface[name=eth0]/mtu
    pub path: String,
}

/// Arguments for the parse-key command
#[derive(clap::Args, Debug)]
pub struct ParseKeyArgs {
    /// Key such as interface[name=eth0][unit=0]
    pub key: String,
}
