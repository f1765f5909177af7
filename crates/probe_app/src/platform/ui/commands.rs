//! Line commands typed at the `pageprobe>` prompt.
//!
//! Each line becomes an [`Action`]; most actions are one or more core
//! messages. Queue rows can be named by url or by their `#n` position in the
//! queue listing, results columns by wire key, header text or 1-based number.

use probe_core::{AppState, Column, FilterTarget, Msg};
use thiserror::Error;

pub const HELP: &str = "\
commands:
  add <url>              queue a url for analysis
  run <#n|url> [...]     run one row, or several in the given order
  stop <#n|url>          stop a running or queued row
  sort <column>          sort results (asc, then desc)
  filter [text]          filter results; no text clears the filter
  filter-by <all|column> choose the column the filter applies to
  next | prev            page through results
  show <n>               open details for row n of the current page
  close                  close the details panel
  list                   redraw the screen
  help                   show this help
  quit                   stop any running analysis and exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Dispatch(Vec<Msg>),
    Redraw,
    Help,
    Quit,
    Nothing,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),
    #[error("`{command}` needs {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },
    #[error("no queue row #{0}")]
    NoSuchRow(usize),
    #[error("unknown column `{0}`")]
    UnknownColumn(String),
    #[error("column `{0}` cannot be sorted")]
    NotSortable(&'static str),
    #[error("`{0}` is not a row number on this page")]
    InvalidPosition(String),
}

pub fn parse(line: &str, state: &AppState) -> Result<Action, CommandError> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let msgs = match command.to_ascii_lowercase().as_str() {
        "" => return Ok(Action::Nothing),
        "help" | "?" => return Ok(Action::Help),
        "list" | "ls" => return Ok(Action::Redraw),
        "quit" | "exit" | "q" => return Ok(Action::Quit),
        "add" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "add",
                    what: "a url",
                });
            }
            vec![Msg::InputChanged(rest.to_string()), Msg::UrlSubmitted]
        }
        "run" => {
            let mut urls = rest
                .split_whitespace()
                .map(|target| resolve_target(target, state))
                .collect::<Result<Vec<_>, _>>()?;
            match urls.len() {
                0 => {
                    return Err(CommandError::MissingArgument {
                        command: "run",
                        what: "a row",
                    })
                }
                1 => vec![Msg::RunClicked {
                    url: urls.remove(0),
                }],
                _ => vec![Msg::RunSelected(urls)],
            }
        }
        "stop" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "stop",
                    what: "a row",
                });
            }
            vec![Msg::StopClicked {
                url: resolve_target(rest, state)?,
            }]
        }
        "sort" => {
            let column = parse_column(rest)?;
            if !column.is_sortable() {
                return Err(CommandError::NotSortable(column.header()));
            }
            vec![Msg::ResultsSortClicked(column)]
        }
        "filter" => vec![Msg::ResultsFilterChanged(rest.to_string())],
        "filter-by" => {
            let target = if rest.eq_ignore_ascii_case("all") {
                FilterTarget::Global
            } else {
                FilterTarget::Column(parse_column(rest)?)
            };
            vec![Msg::ResultsFilterTargetChanged(target)]
        }
        "next" => vec![Msg::ResultsNextPage],
        "prev" | "previous" => vec![Msg::ResultsPreviousPage],
        "show" => {
            let position = rest
                .parse::<usize>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(|| CommandError::InvalidPosition(rest.to_string()))?;
            vec![Msg::ResultRowSelected {
                position: position - 1,
            }]
        }
        "close" => vec![Msg::DetailsClosed],
        _ => return Err(CommandError::Unknown(command.to_string())),
    };
    Ok(Action::Dispatch(msgs))
}

/// `#n` picks the n-th queue row; anything else is taken as the url itself.
fn resolve_target(target: &str, state: &AppState) -> Result<String, CommandError> {
    let Some(index) = target.strip_prefix('#') else {
        return Ok(target.to_string());
    };
    let n = index
        .parse::<usize>()
        .map_err(|_| CommandError::NoSuchRow(0))?;
    n.checked_sub(1)
        .and_then(|i| state.queue().items().get(i))
        .map(|item| item.url.clone())
        .ok_or(CommandError::NoSuchRow(n))
}

fn parse_column(name: &str) -> Result<Column, CommandError> {
    if name.is_empty() {
        return Err(CommandError::UnknownColumn(String::new()));
    }
    if let Ok(n) = name.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| Column::ALL.get(i).copied())
            .ok_or_else(|| CommandError::UnknownColumn(name.to_string()));
    }
    Column::from_key(name)
        .or_else(|| {
            Column::ALL
                .into_iter()
                .find(|column| column.header().eq_ignore_ascii_case(name))
        })
        .ok_or_else(|| CommandError::UnknownColumn(name.to_string()))
}
