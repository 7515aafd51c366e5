//! Terminal and file output for the CLI
//!
//! Command output goes to stdout. Alerts go to stderr, next to the JSON
//! event log.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde_json::Value;

use crate::response::{DisplayState, Notice};
use crate::transport::Download;

use super::errors::CliResult;

/// Write one line to stdout
pub fn write_line(line: &str) -> CliResult<()> {
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", line)?;
    stdout.flush()?;
    Ok(())
}

/// Write pretty-printed JSON to stdout
pub fn write_json(value: &Value) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)?;
    write_line(&text)
}

/// Write the current result area
pub fn write_display(display: &DisplayState) -> CliResult<()> {
    let text = display.to_text();
    if text.is_empty() {
        return Ok(());
    }
    if display.is_error() {
        let mut stderr = io::stderr();
        writeln!(stderr, "{}", text)?;
        return Ok(());
    }
    write_line(&text)
}

/// Write a notice; alerts to stderr, everything else to stdout
pub fn write_notice(notice: &Notice) -> CliResult<()> {
    match notice {
        Notice::Alert(_) => {
            let mut stderr = io::stderr();
            writeln!(stderr, "{}", notice.message())?;
            Ok(())
        }
        _ => write_line(&notice.message()),
    }
}

/// Save a download to `path`, or into `dir` under its own name when `path`
/// is a directory
pub fn save_download(download: &Download, path: &Path) -> CliResult<String> {
    let target = if path.is_dir() {
        path.join(&download.file_name)
    } else {
        path.to_path_buf()
    };
    fs::write(&target, &download.bytes)?;
    Ok(target.display().to_string())
}
