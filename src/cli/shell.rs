//! Line-oriented interactive session
//!
//! One command per line. A filter command missing its field or value does
//! nothing and prints nothing. Other malformed input prints a usage error
//! and leaves the session as it was.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::filter::FilterDraft;
use crate::query::{encode, Sample};
use crate::response::Notice;
use crate::session::Session;
use crate::sort::SortDirection;

use super::errors::{CliError, CliResult};
use super::io::save_download;

pub const HELP: &str = "\
Commands:
  entity <name>               switch entity (resets fields and sorts)
  fields <a,b,..>             replace projected fields
  select <field>              add a projected field
  deselect <field>            drop a projected field
  eq <field> <value>          equality filter
  like <field> <pattern>      substring filter
  between <field> <lo> <hi>   inclusive range filter
  sub <field> <json>          subquery filter {\"entity\",\"field\",\"filters\"}
  unfilter <key>              remove a filter by key, e.g. name_like
  clear                       remove all filters
  sort add                    append a sort on the first field
  sort field <i> <field>      change the field of sort i
  sort dir <i> <asc|desc>     change the direction of sort i
  sort rm <i>                 remove sort i
  legacy [<field,dir>]        set or clear the legacy sort string
  page <n> | next | prev      paging
  size <n>                    page size
  distinct [on|off]           toggle or set distinct
  sample <1-4>                apply a preset query
  show                        print the request payload
  filters                     list filters and sorts
  fetch                       browse the current page
  export [size]               request an export
  download [path]             save the last export
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Entity(String),
    Fields(Vec<String>),
    Select(String),
    Deselect(String),
    Filter(FilterDraft),
    Unfilter(String),
    ClearFilters,
    SortAdd,
    SortField(usize, String),
    SortDirection(usize, SortDirection),
    SortRemove(usize),
    Legacy(String),
    Page(u32),
    Next,
    Prev,
    Size(u32),
    /// `None` toggles
    Distinct(Option<bool>),
    Sample(Sample),
    Show,
    Filters,
    Fetch,
    Export(Option<u32>),
    Download(Option<PathBuf>),
    Help,
    Quit,
}

impl ShellCommand {
    /// Parse one input line; `Ok(None)` for a blank line
    pub fn parse(line: &str) -> CliResult<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = split_word(line);

        let command = match word {
            "entity" => ShellCommand::Entity(required(rest, "entity <name>")?.to_string()),
            "fields" => ShellCommand::Fields(
                rest.split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            "select" => ShellCommand::Select(required(rest, "select <field>")?.to_string()),
            "deselect" => ShellCommand::Deselect(required(rest, "deselect <field>")?.to_string()),
            "eq" => {
                let (field, value) = field_and_rest(rest);
                ShellCommand::Filter(FilterDraft::Equals { field, value })
            }
            "like" => {
                let (field, pattern) = field_and_rest(rest);
                ShellCommand::Filter(FilterDraft::Like { field, pattern })
            }
            "between" => {
                let mut parts = rest.split_whitespace().map(str::to_string);
                ShellCommand::Filter(FilterDraft::Between {
                    field: parts.next(),
                    lower: parts.next(),
                    upper: parts.next(),
                })
            }
            "sub" => {
                let (field, spec) = field_and_rest(rest);
                ShellCommand::Filter(FilterDraft::Subquery { field, spec })
            }
            "unfilter" => ShellCommand::Unfilter(required(rest, "unfilter <key>")?.to_string()),
            "clear" => ShellCommand::ClearFilters,
            "sort" => parse_sort(rest)?,
            "legacy" => ShellCommand::Legacy(rest.to_string()),
            "page" => ShellCommand::Page(number(rest, "page <n>")?),
            "next" => ShellCommand::Next,
            "prev" => ShellCommand::Prev,
            "size" => ShellCommand::Size(number(rest, "size <n>")?),
            "distinct" => ShellCommand::Distinct(match rest {
                "" => None,
                "on" | "true" => Some(true),
                "off" | "false" => Some(false),
                other => return Err(CliError::usage(format!("distinct [on|off], got '{}'", other))),
            }),
            "sample" => {
                let sample = required(rest, "sample <1-4>")?
                    .parse::<Sample>()
                    .map_err(CliError::from)?;
                ShellCommand::Sample(sample)
            }
            "show" => ShellCommand::Show,
            "filters" => ShellCommand::Filters,
            "fetch" => ShellCommand::Fetch,
            "export" => ShellCommand::Export(if rest.is_empty() {
                None
            } else {
                Some(number(rest, "export [size]")?)
            }),
            "download" => {
                ShellCommand::Download((!rest.is_empty()).then(|| PathBuf::from(rest)))
            }
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            other => return Err(CliError::usage(format!("unknown command '{}'", other))),
        };
        Ok(Some(command))
    }
}

fn split_word(s: &str) -> (&str, &str) {
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (s, ""),
    }
}

fn required<'a>(rest: &'a str, usage: &str) -> CliResult<&'a str> {
    if rest.is_empty() {
        Err(CliError::usage(usage))
    } else {
        Ok(rest)
    }
}

fn number<T: std::str::FromStr>(rest: &str, usage: &str) -> CliResult<T> {
    rest.parse()
        .map_err(|_| CliError::usage(format!("{}, got '{}'", usage, rest)))
}

/// First word as the field, everything after it as the value
fn field_and_rest(rest: &str) -> (Option<String>, Option<String>) {
    if rest.is_empty() {
        return (None, None);
    }
    let (field, value) = split_word(rest);
    let value = (!value.is_empty()).then(|| value.to_string());
    (Some(field.to_string()), value)
}

fn parse_sort(rest: &str) -> CliResult<ShellCommand> {
    let usage = "sort add | sort field <i> <field> | sort dir <i> <asc|desc> | sort rm <i>";
    let (action, args) = split_word(rest);
    let (index, arg) = split_word(args);

    match action {
        "add" => Ok(ShellCommand::SortAdd),
        "field" => Ok(ShellCommand::SortField(
            number(index, usage)?,
            required(arg, usage)?.to_string(),
        )),
        "dir" => Ok(ShellCommand::SortDirection(
            number(index, usage)?,
            arg.parse::<SortDirection>().map_err(CliError::from)?,
        )),
        "rm" => Ok(ShellCommand::SortRemove(number(index, usage)?)),
        _ => Err(CliError::usage(usage)),
    }
}

/// Run one command against the session; `Ok(false)` means quit
pub async fn execute(
    session: &mut Session,
    command: ShellCommand,
    out: &mut dyn Write,
) -> CliResult<bool> {
    match command {
        ShellCommand::Entity(entity) => {
            session.set_entity(entity);
            writeln!(out, "Fields: {}", session.state().fields().join(", "))?;
        }
        ShellCommand::Fields(fields) => session.state_mut().set_fields(fields),
        ShellCommand::Select(field) => {
            session.state_mut().select_field(field);
        }
        ShellCommand::Deselect(field) => {
            session.state_mut().deselect_field(&field);
        }
        ShellCommand::Filter(draft) => {
            draft.apply(session.state_mut().filters_mut())?;
        }
        ShellCommand::Unfilter(key) => {
            session.state_mut().filters_mut().remove_encoded(&key);
        }
        ShellCommand::ClearFilters => session.state_mut().filters_mut().clear(),
        ShellCommand::SortAdd => {
            let index = session.append_sort();
            writeln!(out, "Added sort #{}", index)?;
        }
        ShellCommand::SortField(index, field) => {
            session.state_mut().sorts_mut().set_field(index, field)?;
        }
        ShellCommand::SortDirection(index, direction) => {
            session.state_mut().sorts_mut().set_direction(index, direction)?;
        }
        ShellCommand::SortRemove(index) => {
            session.state_mut().sorts_mut().remove(index)?;
        }
        ShellCommand::Legacy(raw) => session.state_mut().set_legacy_sort(raw),
        ShellCommand::Page(page) => session.state_mut().set_page(page),
        ShellCommand::Next => session.state_mut().next_page(),
        ShellCommand::Prev => {
            session.state_mut().prev_page();
        }
        ShellCommand::Size(size) => session.state_mut().set_size(size)?,
        ShellCommand::Distinct(value) => {
            let state = session.state_mut();
            let distinct = value.unwrap_or(!state.distinct());
            state.set_distinct(distinct);
            writeln!(out, "Distinct: {}", distinct)?;
        }
        ShellCommand::Sample(sample) => {
            session.apply_sample(sample)?;
            writeln!(out, "Sample {}: {}", sample.number(), sample.description())?;
        }
        ShellCommand::Show => {
            let payload = serde_json::to_string_pretty(&encode(session.state()))?;
            writeln!(out, "{}", payload)?;
        }
        ShellCommand::Filters => {
            for line in session.state().filters().display_lines() {
                writeln!(out, "{}", line)?;
            }
            for line in session.state().sorts().display_lines() {
                writeln!(out, "{}", line)?;
            }
        }
        ShellCommand::Fetch => {
            let notice = session.fetch().await;
            write_result(session, notice, out)?;
        }
        ShellCommand::Export(size) => {
            let notice = session.export(size).await?;
            write_result(session, notice, out)?;
        }
        ShellCommand::Download(path) => {
            let download = session.download().await?;
            let target = path.unwrap_or_else(|| PathBuf::from("."));
            let saved = save_download(&download, &target)?;
            writeln!(out, "Saved {}", saved)?;
        }
        ShellCommand::Help => writeln!(out, "{}", HELP)?,
        ShellCommand::Quit => return Ok(false),
    }
    Ok(true)
}

fn write_result(session: &Session, notice: Option<Notice>, out: &mut dyn Write) -> CliResult<()> {
    let text = session.display().to_text();
    if !text.is_empty() {
        writeln!(out, "{}", text)?;
    }
    if let Some(notice) = notice {
        writeln!(out, "{}", notice.message())?;
    }
    Ok(())
}

/// Read commands from `input` until EOF or `quit`
///
/// Errors from a single command are printed and the loop continues.
pub async fn run_shell(
    session: &mut Session,
    input: impl BufRead,
    out: &mut dyn Write,
) -> CliResult<()> {
    writeln!(out, "dynquery shell, session {}. Type 'help' for commands.", session.id())?;
    for line in input.lines() {
        let line = line?;
        let command = match ShellCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                writeln!(out, "{}", e.message())?;
                continue;
            }
        };
        match execute(session, command, out).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => writeln!(out, "{}", e.message())?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::filter::FilterKey;
    use crate::query::RequestPayload;
    use crate::response::ExportHandle;
    use crate::transport::{Download, QueryTransport, TransportError, TransportResult};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Arc;

    struct Offline;

    #[async_trait]
    impl QueryTransport for Offline {
        async fn execute(&self, _payload: &RequestPayload) -> TransportResult<Value> {
            Err(TransportError::Network("offline".into()))
        }

        async fn download(&self, _handle: &ExportHandle) -> TransportResult<Download> {
            Err(TransportError::Network("offline".into()))
        }
    }

    fn session() -> Session {
        Session::new(ClientConfig::default(), Arc::new(Offline))
    }

    fn parse(line: &str) -> ShellCommand {
        ShellCommand::parse(line).unwrap().unwrap()
    }

    #[test]
    fn test_parse_filters() {
        assert_eq!(
            parse("eq name John Smith"),
            ShellCommand::Filter(FilterDraft::Equals {
                field: Some("name".into()),
                value: Some("John Smith".into()),
            })
        );
        assert_eq!(
            parse("between salary 30000 80000"),
            ShellCommand::Filter(FilterDraft::Between {
                field: Some("salary".into()),
                lower: Some("30000".into()),
                upper: Some("80000".into()),
            })
        );
        assert_eq!(
            parse(r#"sub department.id {"entity":"Department","field":"id"}"#),
            ShellCommand::Filter(FilterDraft::Subquery {
                field: Some("department.id".into()),
                spec: Some(r#"{"entity":"Department","field":"id"}"#.into()),
            })
        );
    }

    #[test]
    fn test_parse_misc() {
        assert!(ShellCommand::parse("   ").unwrap().is_none());
        assert_eq!(parse("sort dir 0 DESC"), ShellCommand::SortDirection(0, SortDirection::Desc));
        assert_eq!(parse("sort field 1 salary"), ShellCommand::SortField(1, "salary".into()));
        assert_eq!(parse("distinct"), ShellCommand::Distinct(None));
        assert_eq!(parse("export 50"), ShellCommand::Export(Some(50)));
        assert_eq!(parse("sample 4"), ShellCommand::Sample(Sample::SalesSubquery));
        assert_eq!(parse("fields id, name ,salary"), ShellCommand::Fields(vec![
            "id".into(),
            "name".into(),
            "salary".into()
        ]));
        assert!(ShellCommand::parse("frobnicate").is_err());
        assert!(ShellCommand::parse("page x").is_err());
        assert!(ShellCommand::parse("sort dir 0 sideways").is_err());
    }

    #[tokio::test]
    async fn test_incomplete_filter_is_silent() {
        let mut session = session();
        let mut out = Vec::new();

        for line in ["like name", "eq", "between salary 100"] {
            let keep_going = execute(&mut session, parse(line), &mut out).await.unwrap();
            assert!(keep_going);
        }

        assert!(session.state().filters().is_empty());
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_filter_and_unfilter() {
        let mut session = session();
        let mut out = Vec::new();

        execute(&mut session, parse("like name John"), &mut out).await.unwrap();
        assert!(session.state().filters().get(&FilterKey::like("name")).is_some());

        execute(&mut session, parse("unfilter name_like"), &mut out).await.unwrap();
        assert!(session.state().filters().is_empty());
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_session() {
        let mut session = session();
        let mut out = Vec::new();

        let keep_going = execute(&mut session, ShellCommand::Fetch, &mut out).await.unwrap();

        assert!(keep_going);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Error fetching data"));
        assert!(text.contains("Error: Network error: offline"));
    }

    #[tokio::test]
    async fn test_run_shell_reports_errors_and_quits() {
        let mut session = session();
        let mut out = Vec::new();
        let input = "select active\nsort rm 3\ndownload\nquit\nselect joiningDate\n";

        run_shell(&mut session, input.as_bytes(), &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("No export"));
        assert!(text.contains("out of range"));
        assert_eq!(session.state().fields(), ["id", "name", "salary", "active"]);
    }
}
