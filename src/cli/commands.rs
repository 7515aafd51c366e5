//! CLI command implementations
//!
//! Every command loads configuration, builds one session, and drives it on
//! a tokio runtime owned by the command.

use std::io;
use std::path::{Path, PathBuf};

use crate::config::ClientConfig;
use crate::observability::Logger;
use crate::query::{encode, Sample};
use crate::response::Notice;
use crate::session::Session;

use super::args::{Cli, Command, QueryArgs, DEFAULT_CONFIG_PATH};
use super::errors::{CliError, CliResult};
use super::io::{save_download, write_display, write_json, write_line, write_notice};
use super::shell::run_shell;

/// Parse arguments and run the chosen command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_cli(cli)
}

/// Run an already parsed command line
pub fn run_cli(cli: Cli) -> CliResult<()> {
    let config = load_config(cli.config.as_deref())?;
    Logger::set_min_severity(config.severity()?);

    let mut session = Session::connect(config)?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::io_error(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        match cli.command {
            Command::Fetch { query } => fetch(&mut session, &query).await,
            Command::Export { query, out } => export(&mut session, &query, out).await,
            Command::Payload { query } => payload(&mut session, &query),
            Command::Sample { number } => sample(&mut session, &number).await,
            Command::Shell => {
                let stdin = io::stdin();
                let mut stdout = io::stdout();
                run_shell(&mut session, stdin.lock(), &mut stdout).await
            }
        }
    })
}

/// Explicit path must exist; the default path is optional
pub fn load_config(path: Option<&Path>) -> CliResult<ClientConfig> {
    let config = match path {
        Some(path) => ClientConfig::load_or_default(path, true)?,
        None => ClientConfig::load_or_default(Path::new(DEFAULT_CONFIG_PATH), false)?,
    };
    Ok(config)
}

/// Browse once and print the table
pub async fn fetch(session: &mut Session, query: &QueryArgs) -> CliResult<()> {
    query.apply(session)?;
    let notice = session.fetch().await;
    finish(session, notice)
}

/// Export, then download to `out` when given
pub async fn export(session: &mut Session, query: &QueryArgs, out: Option<PathBuf>) -> CliResult<()> {
    query.apply(session)?;
    let notice = session.export(query.size).await?;
    finish(session, notice)?;

    if let Some(out) = out {
        let download = session.download().await?;
        let saved = save_download(&download, &out)?;
        write_line(&format!("Saved {}", saved))?;
    }
    Ok(())
}

/// Print the encoded request without sending it
pub fn payload(session: &mut Session, query: &QueryArgs) -> CliResult<()> {
    query.apply(session)?;
    write_json(&encode(session.state()).to_json())
}

/// Apply a preset and browse
pub async fn sample(session: &mut Session, number: &str) -> CliResult<()> {
    let sample: Sample = number.parse()?;
    session.apply_sample(sample)?;
    write_line(&format!("Sample {}: {}", sample.number(), sample.description()))?;

    let notice = session.fetch().await;
    finish(session, notice)
}

/// Print the display and notice; a failed round trip becomes the command's
/// error
fn finish(session: &Session, notice: Option<Notice>) -> CliResult<()> {
    write_display(session.display())?;
    match notice {
        Some(Notice::Alert(msg)) => Err(CliError::request_failed(msg)),
        Some(notice) => write_notice(&notice),
        None => Ok(()),
    }
}
