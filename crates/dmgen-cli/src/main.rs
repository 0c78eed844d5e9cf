//! dmgen — schema compiler generating binary-serializable data classes.

mod commands;
mod config;
mod error;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use error::RunError;

#[derive(Parser, Debug)]
#[command(name = "dmgen")]
#[command(about = "Compile data-model schemas into per-profile serializable classes")]
struct Cli {
    /// Directory containing the `datamodelgen` configuration file
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse every schema under the input tree and generate sources
    Gen,
    /// Rename a schema and its generated artifacts
    Mv { from: String, to: String },
    /// Remove a schema and its generated artifacts
    Rm { name: String },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dmgen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match try_main(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let mut err: &dyn std::error::Error = &e;
            error!("{err}");
            while let Some(source) = err.source() {
                error!("caused by: {source}");
                err = source;
            }
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: Cli) -> Result<(), RunError> {
    let mut config = config::load(&cli.config_dir.join("datamodelgen"))?;

    let now = chrono::Local::now();
    config.year = now.format("%Y").to_string();
    config.month = now.format("%m").to_string();
    config.day = now.format("%d").to_string();

    match cli.command.unwrap_or(Command::Gen) {
        Command::Gen => run::run(config),
        Command::Mv { from, to } => commands::rename(&config, &from, &to),
        Command::Rm { name } => commands::remove(&config, &name),
    }
}
