//! Interactive table session (`roster browse`).
//!
//! Reads one command per line from stdin, applies it to the upload and
//! table widgets, and reprints the table. Uploads and clears notify the
//! table through [`TableWidget::data_changed`].

use std::path::PathBuf;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

use crate::client::UsersApi;
use crate::config::Config;
use crate::notice::Notice;
use crate::table::TableWidget;
use crate::upload::UploadWidget;

pub const HELP: &str = "\
commands:
  n, next            next page
  p, prev            previous page
  f, first           first page
  l, last            last page
  g, page <N>        go to page N
  limit <N>          rows per page (10, 20, 50, 100)
  s, search [TERM]   filter by TERM; no TERM clears the search
  u, upload <FILE>   import a CSV file
  clear              delete every record (asks first)
  r, refresh         reload from the server
  h, help            show this help
  q, quit            leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Next,
    Prev,
    First,
    Last,
    Page(u64),
    Limit(u64),
    Search(String),
    Upload(PathBuf),
    Clear,
    Refresh,
    Help,
    Quit,
}

/// Parse one input line. Errors carry a message for the user.
pub fn parse_command(line: &str) -> Result<BrowseCommand, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((v, r)) => (v, r.trim()),
        None => (line, ""),
    };

    let number = |what: &str| -> Result<u64, String> {
        rest.parse::<u64>()
            .map_err(|_| format!("{} expects a number, got '{}'", what, rest))
    };

    match verb.to_ascii_lowercase().as_str() {
        "" | "r" | "refresh" => Ok(BrowseCommand::Refresh),
        "n" | "next" => Ok(BrowseCommand::Next),
        "p" | "prev" => Ok(BrowseCommand::Prev),
        "f" | "first" => Ok(BrowseCommand::First),
        "l" | "last" => Ok(BrowseCommand::Last),
        "g" | "page" => number("page").map(BrowseCommand::Page),
        "limit" => number("limit").map(BrowseCommand::Limit),
        "s" | "search" => Ok(BrowseCommand::Search(rest.to_string())),
        "u" | "upload" if rest.is_empty() => Err("upload expects a file path".to_string()),
        "u" | "upload" => Ok(BrowseCommand::Upload(PathBuf::from(rest))),
        "clear" => Ok(BrowseCommand::Clear),
        "h" | "help" | "?" => Ok(BrowseCommand::Help),
        "q" | "quit" | "exit" => Ok(BrowseCommand::Quit),
        other => Err(format!("unknown command '{}'; type 'help'", other)),
    }
}

/// `true` for an affirmative answer to a y/N prompt.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

async fn prompt(text: &str) -> Result<()> {
    let mut out = tokio::io::stdout();
    out.write_all(text.as_bytes()).await?;
    out.flush().await?;
    Ok(())
}

async fn show(table: &mut TableWidget, api: &dyn UsersApi) {
    if let Err(notice) = table.ensure_fresh(api).await {
        println!("{}", notice);
    }
    print!("{}", table.render());
}

async fn confirm_clear(
    table: &TableWidget,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<bool> {
    prompt(&format!(
        "Delete all {} records? This cannot be undone. [y/N] ",
        table.total_users()
    ))
    .await?;
    Ok(lines.next_line().await?.map(|a| is_yes(&a)).unwrap_or(false))
}

/// Run the interactive session until `quit` or end of input.
pub async fn run_browse(config: &Config, api: &dyn UsersApi) -> Result<()> {
    let mut table = TableWidget::new(config.client.default_limit, config.client.search_cap);
    let mut upload = UploadWidget::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", HELP);
    show(&mut table, api).await;

    loop {
        prompt("roster> ").await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(c) => c,
            Err(msg) => {
                println!("{}", Notice::error(msg));
                continue;
            }
        };

        match command {
            BrowseCommand::Next => {
                table.next();
            }
            BrowseCommand::Prev => {
                table.prev();
            }
            BrowseCommand::First => {
                table.first();
            }
            BrowseCommand::Last => {
                table.last();
            }
            BrowseCommand::Page(n) => {
                table.goto(n);
            }
            BrowseCommand::Limit(n) => {
                if let Err(notice) = table.set_limit(n) {
                    println!("{}", notice);
                    continue;
                }
            }
            BrowseCommand::Search(term) => table.set_search(&term),
            BrowseCommand::Upload(path) => {
                if let Err(notice) = upload.select(&path, None) {
                    println!("{}", notice);
                    continue;
                }
                let notice = upload.upload(api, |_| table.data_changed()).await;
                println!("{}", notice);
                upload.remove();
            }
            BrowseCommand::Clear => {
                if confirm_clear(&table, &mut lines).await? {
                    println!("{}", table.clear(api).await);
                } else {
                    println!("Clear cancelled.");
                    continue;
                }
            }
            BrowseCommand::Refresh => table.data_changed(),
            BrowseCommand::Help => {
                println!("{}", HELP);
                continue;
            }
            BrowseCommand::Quit => break,
        }

        show(&mut table, api).await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_navigation() {
        assert_eq!(parse_command("n"), Ok(BrowseCommand::Next));
        assert_eq!(parse_command("  PREV "), Ok(BrowseCommand::Prev));
        assert_eq!(parse_command("g 4"), Ok(BrowseCommand::Page(4)));
        assert_eq!(parse_command("limit 50"), Ok(BrowseCommand::Limit(50)));
        assert_eq!(parse_command(""), Ok(BrowseCommand::Refresh));
    }

    #[test]
    fn test_parse_search_keeps_spaces() {
        assert_eq!(
            parse_command("search New York"),
            Ok(BrowseCommand::Search("New York".to_string()))
        );
        assert_eq!(
            parse_command("s"),
            Ok(BrowseCommand::Search(String::new()))
        );
    }

    #[test]
    fn test_parse_upload_path() {
        assert_eq!(
            parse_command("upload ./data/my users.csv"),
            Ok(BrowseCommand::Upload(PathBuf::from("./data/my users.csv")))
        );
        assert!(parse_command("upload").is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("page two")
            .unwrap_err()
            .contains("expects a number"));
        assert!(parse_command("frobnicate")
            .unwrap_err()
            .contains("unknown command"));
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y"));
        assert!(is_yes(" YES\n"));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
    }
}
