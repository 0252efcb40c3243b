// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "skiff")]
#[command(about = "Run commands and copy files over SSH, optionally through a jump host")]
#[command(version)]
pub struct Cli {
    /// Config file (default: skiff.yml in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Target destination (defined in config)
    #[arg(short, long, global = true)]
    pub destination: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print only final results
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new skiff.yml configuration file
    Init {
        /// Target address, as [user@]host[:port]
        #[arg(long)]
        host: Option<String>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Run a command on the target and print its output
    Exec {
        #[command(flatten)]
        format: FormatArgs,

        /// Command to run; words are joined with spaces
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Download remote files or directories (glob patterns allowed)
    Get {
        /// Remote source pattern
        src: String,
        /// Local destination directory
        dst: PathBuf,
    },

    /// Upload local files or directories (glob patterns allowed)
    Put {
        /// Local source pattern
        src: String,
        /// Remote destination directory
        dst: PathBuf,
    },
}

#[derive(Args)]
#[group(multiple = false)]
pub struct FormatArgs {
    /// Print output exactly as captured
    #[arg(long)]
    pub raw: bool,

    /// Split output into one item per line
    #[arg(long)]
    pub lines: bool,
}
