// ABOUTME: Entry point for the skiff CLI application.
// ABOUTME: Parses arguments, loads the config, and dispatches to the library.

mod cli;
mod output;

use clap::Parser;
use cli::{Cli, Commands, FormatArgs};
use output::{Output, OutputMode};
use skiff::Client;
use skiff::config::{self, Config, ConfigError};
use skiff::error::Result;
use skiff::exec;
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);

    if let Err(e) = run(cli, &mut output).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &mut Output) -> Result<()> {
    let cwd = env::current_dir().map_err(ConfigError::from)?;

    if let Commands::Init { host, force } = &cli.command {
        config::init_config(&cwd, host.as_deref(), *force)?;
        output.success(&format!("Created {}", config::CONFIG_FILENAME));
        return Ok(());
    }

    let client = load_client(&cwd, &cli)?;
    output.start_timer();

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Exec { format, command } => {
            let command = command.join(" ");
            let stdout = client.command_with(&command, output_mode(&format)).await?;
            output.command_output(&stdout);
            Ok(())
        }
        Commands::Get { src, dst } => {
            output.progress(&format!("Downloading {} to {}", src, dst.display()));
            let summary = client.get(&src, &dst).await?;
            output.transfer("Downloaded", &summary);
            Ok(())
        }
        Commands::Put { src, dst } => {
            output.progress(&format!("Uploading {} to {}", src, dst.display()));
            let summary = client.put(&src, &dst).await?;
            output.transfer("Uploaded", &summary);
            Ok(())
        }
    }
}

fn load_client(cwd: &Path, cli: &Cli) -> Result<Client> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::discover(cwd)?,
    };

    // Apply destination overrides if specified
    let config = match &cli.destination {
        Some(dest) => config.for_destination(dest)?,
        None => config,
    };

    Ok(Client::new(config.session_target()?))
}

fn output_mode(format: &FormatArgs) -> exec::OutputMode {
    if format.raw {
        exec::OutputMode::Raw
    } else if format.lines {
        exec::OutputMode::Lines
    } else {
        exec::OutputMode::Auto
    }
}
