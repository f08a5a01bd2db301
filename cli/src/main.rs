//! # todo CLI entry point
//!
//! Parses global options, wires a `Backend` to ureq and a session file, and
//! dispatches to `commands::run`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use todo_social_cli::{run, Command, UreqTransport};
use todo_social_core::{ApiError, Backend, FileStore};
use tracing_subscriber::EnvFilter;

/// Client for the todo/social backend.
#[derive(Parser, Debug)]
#[command(name = "todo", version, about)]
struct Cli {
    /// Backend base URL.
    #[arg(long, env = "TODO_API_URL", default_value = "http://127.0.0.1:3000", global = true)]
    base_url: String,

    /// Where the session token and username are kept.
    #[arg(long, env = "TODO_SESSION_FILE", default_value = ".todo-session.json", global = true)]
    session_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let backend = Backend::new(
        &cli.base_url,
        UreqTransport::new(),
        FileStore::new(&cli.session_file),
    );

    match run(cli.command, &backend, &mut std::io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            match err.downcast_ref::<ApiError>() {
                Some(api) => eprintln!("{}", api.user_message()),
                None => eprintln!("{err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
