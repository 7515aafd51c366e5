//! CLI argument definitions using clap
//!
//! Commands:
//! - dynquery fetch [query flags]
//! - dynquery export [query flags] [--out FILE]
//! - dynquery payload [query flags]
//! - dynquery sample <N>
//! - dynquery shell

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::filter::FilterDraft;
use crate::session::Session;
use crate::sort::{SortDirection, SortSpec};

use super::errors::CliResult;

/// Default configuration path, used only when it exists
pub const DEFAULT_CONFIG_PATH: &str = "./dynquery.json";

/// dynquery - build and run dynamic entity queries
#[derive(Parser, Debug)]
#[command(name = "dynquery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file [default: ./dynquery.json]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Browse one page and print it as a table
    Fetch {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Request an export and optionally download it
    Export {
        #[command(flatten)]
        query: QueryArgs,

        /// Download the exported file here (file or directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the encoded request without sending it
    Payload {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Apply a preset query (1-4) and browse
    Sample {
        number: String,
    },

    /// Interactive session on stdin
    Shell,
}

/// Query-building flags shared by the one-shot commands
#[derive(Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Entity to query
    #[arg(long)]
    pub entity: Option<String>,

    /// Projected fields, comma separated
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Equality filter FIELD=VALUE
    #[arg(long, value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    pub eq: Vec<(String, String)>,

    /// Substring filter FIELD=PATTERN
    #[arg(long, value_name = "FIELD=PATTERN", value_parser = parse_assignment)]
    pub like: Vec<(String, String)>,

    /// Inclusive range filter FIELD=LOWER..UPPER
    #[arg(long, value_name = "FIELD=LOWER..UPPER", value_parser = parse_range)]
    pub between: Vec<(String, String, String)>,

    /// Subquery filter FIELD={"entity":..,"field":..,"filters":{..}}
    #[arg(long, value_name = "FIELD=JSON", value_parser = parse_assignment)]
    pub subquery: Vec<(String, String)>,

    /// Sort entry FIELD[:asc|desc], repeatable
    #[arg(long, value_name = "FIELD[:DIR]", value_parser = parse_sort)]
    pub sort: Vec<SortSpec>,

    /// Deprecated single sort string, sent verbatim
    #[arg(long)]
    pub legacy_sort: Option<String>,

    #[arg(long)]
    pub page: Option<u32>,

    #[arg(long)]
    pub size: Option<u32>,

    #[arg(long)]
    pub distinct: bool,
}

impl QueryArgs {
    /// Apply the flags to a session, entity first so its reset happens
    /// before the other edits
    pub fn apply(&self, session: &mut Session) -> CliResult<()> {
        if let Some(entity) = &self.entity {
            session.set_entity(entity.clone());
        }

        let state = session.state_mut();
        if !self.fields.is_empty() {
            state.set_fields(self.fields.iter().cloned());
        }

        let drafts = self
            .eq
            .iter()
            .map(|(field, value)| FilterDraft::Equals {
                field: Some(field.clone()),
                value: Some(value.clone()),
            })
            .chain(self.like.iter().map(|(field, pattern)| FilterDraft::Like {
                field: Some(field.clone()),
                pattern: Some(pattern.clone()),
            }))
            .chain(
                self.between
                    .iter()
                    .map(|(field, lower, upper)| FilterDraft::Between {
                        field: Some(field.clone()),
                        lower: Some(lower.clone()),
                        upper: Some(upper.clone()),
                    }),
            )
            .chain(self.subquery.iter().map(|(field, spec)| FilterDraft::Subquery {
                field: Some(field.clone()),
                spec: Some(spec.clone()),
            }));
        for draft in drafts {
            draft.apply(state.filters_mut())?;
        }

        for spec in &self.sort {
            let index = state.sorts_mut().append(spec.field.clone());
            state.sorts_mut().set_direction(index, spec.direction)?;
        }
        if let Some(legacy) = &self.legacy_sort {
            state.set_legacy_sort(legacy.clone());
        }
        if let Some(page) = self.page {
            state.set_page(page);
        }
        if let Some(size) = self.size {
            state.set_size(size)?;
        }
        if self.distinct {
            state.set_distinct(true);
        }
        Ok(())
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", raw))?;
    if field.is_empty() {
        return Err(format!("missing field in '{}'", raw));
    }
    Ok((field.to_string(), value.to_string()))
}

fn parse_range(raw: &str) -> Result<(String, String, String), String> {
    let (field, range) = parse_assignment(raw)?;
    let (lower, upper) = range
        .split_once("..")
        .ok_or_else(|| format!("expected LOWER..UPPER, got '{}'", range))?;
    Ok((field, lower.to_string(), upper.to_string()))
}

fn parse_sort(raw: &str) -> Result<SortSpec, String> {
    let (field, direction) = match raw.rsplit_once(':') {
        Some((field, dir)) => (field, dir.parse::<SortDirection>().map_err(|e| e.to_string())?),
        None => (raw, SortDirection::Asc),
    };
    if field.is_empty() {
        return Err(format!("missing field in '{}'", raw));
    }
    Ok(SortSpec::new(field, direction))
}
