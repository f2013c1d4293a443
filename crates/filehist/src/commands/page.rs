use chrono::Utc;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Table};
use libfilehist_core::{Commit, Page};
use libfilehist_git::Pager;
use libfilehist_view::format_relative;
use serde::Serialize;

use crate::cli::Cli;
use crate::commands::{load_config, resolve_path};
use crate::error::CliError;
use crate::output::{output_success, print_human};

#[derive(Serialize)]
struct PageOutput<'a> {
    path: &'a str,
    backend: &'a str,
    commits: Vec<CommitJson<'a>>,
    has_more: bool,
    /// Cursor for the following page
    #[serde(skip_serializing_if = "Option::is_none")]
    next_before: Option<&'a str>,
}

#[derive(Serialize)]
struct CommitJson<'a> {
    hash: &'a str,
    author: &'a str,
    date: &'a str,
    message: &'a str,
    size: usize,
    path_missing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
}

impl<'a> CommitJson<'a> {
    fn new(commit: &'a Commit, with_content: bool) -> Self {
        Self {
            hash: &commit.hash,
            author: &commit.author,
            date: &commit.date,
            message: &commit.message,
            size: commit.content.len(),
            path_missing: commit.path_missing,
            content: with_content.then_some(commit.content.as_str()),
        }
    }
}

pub async fn run(
    cli: &Cli,
    path: &str,
    limit: Option<usize>,
    before: Option<String>,
    content: bool,
) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let path = resolve_path(&config, path)?;
    let mut pager = Pager::from_config(&config, path)?;
    if let Some(limit) = limit {
        pager = pager.with_page_size(limit);
    }

    let page = pager.load_more(before).await?;

    output_success(
        cli,
        PageOutput {
            path: pager.path(),
            backend: config.backend.kind.as_str(),
            commits: page.commits.iter().map(|c| CommitJson::new(c, content)).collect(),
            has_more: page.has_more,
            next_before: next_cursor(&page),
        },
    )?;

    if page.is_empty() {
        print_human(cli, "No history.");
        return Ok(());
    }
    print_human(cli, &page_table(&page).to_string());
    if let Some(cursor) = next_cursor(&page) {
        print_human(cli, &format!("More history: --before {}", cursor));
    }
    Ok(())
}

fn next_cursor(page: &Page) -> Option<&str> {
    if page.has_more {
        page.last_hash()
    } else {
        None
    }
}

fn page_table(page: &Page) -> Table {
    let now = Utc::now();
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Commit", "Date", "Author", "Message", "Size"]);
    for commit in &page.commits {
        let size = if commit.path_missing {
            "deleted".to_string()
        } else {
            format!("{} B", commit.content.len())
        };
        table.add_row(vec![
            commit.short_hash().to_string(),
            format_relative(&commit.date, now),
            commit.author.clone(),
            first_line(&commit.message).to_string(),
            size,
        ]);
    }
    table
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or("")
}
