//! Interactive terminal display
//!
//! Launches `filehist-host` for the file and drives it with the navigator.
//! One command per line on stdin; each command redraws the current diff.

use std::path::PathBuf;

use chrono::Utc;
use libfilehist_core::language::detect_language;
use libfilehist_ipc::client::default_host_bin;
use libfilehist_ipc::{DisplayMessage, HostClient};
use libfilehist_view::store::default_state_path;
use libfilehist_view::{
    format_relative, DiffLayout, DiffOptions, DiffRenderer, DiffSettings, Highlighter,
    JsonFileStore, Navigator, PlainHighlighter, TextDiffRenderer, ViewState,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use crate::cli::Cli;
use crate::commands::load_config;
use crate::error::CliError;

const HELP: &str = "\
n / p      next (older) / previous (newer) diff
g <n>      go to diff n
m          load more history
r          retry the last failed request
l          list loaded revisions
c          print the newer revision
t          toggle unified / split layout
e          toggle expanding unchanged lines
h          this help
q          quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Next,
    Prev,
    Goto(usize),
    More,
    Retry,
    List,
    Cat,
    ToggleLayout,
    ToggleExpand,
    Help,
    Quit,
}

fn parse_action(line: &str) -> Result<Action, String> {
    let mut words = line.split_whitespace();
    let action = match words.next() {
        None | Some("n") | Some("next") => Action::Next,
        Some("p") | Some("prev") => Action::Prev,
        Some("g") | Some("go") => {
            let n: usize = words
                .next()
                .ok_or("g needs a diff number")?
                .parse()
                .map_err(|_| "g needs a diff number".to_string())?;
            if n == 0 {
                return Err("diffs are numbered from 1".to_string());
            }
            Action::Goto(n - 1)
        }
        Some("m") | Some("more") => Action::More,
        Some("r") | Some("retry") => Action::Retry,
        Some("l") | Some("list") => Action::List,
        Some("c") | Some("cat") => Action::Cat,
        Some("t") | Some("layout") => Action::ToggleLayout,
        Some("e") | Some("expand") => Action::ToggleExpand,
        Some("h") | Some("help") | Some("?") => Action::Help,
        Some("q") | Some("quit") => Action::Quit,
        Some(other) => return Err(format!("unknown command '{}' (h for help)", other)),
    };
    Ok(action)
}

pub async fn run(
    cli: &Cli,
    path: &str,
    host: Option<PathBuf>,
    width: usize,
) -> Result<(), CliError> {
    // Fail on a bad config here rather than inside the host
    load_config(cli)?;

    let mut store = match default_state_path() {
        Some(state_path) => Some(JsonFileStore::open(&state_path)?),
        None => None,
    };
    let mut settings = match &store {
        Some(store) => DiffSettings::load(store)?,
        None => DiffSettings::default(),
    };

    let mut highlighter = PlainHighlighter::new();
    highlighter.init()?;
    let language = detect_language(path);
    debug!(language, theme = %settings.theme, "highlighter ready");

    let host_bin = host.unwrap_or_else(default_host_bin);
    let mut client = HostClient::spawn(&host_bin, path, &host_args(cli))?;
    let mut nav = Navigator::new();

    client.send(&nav.start()).await?;
    let init = client.recv().await?;
    let follow_up = nav.on_message(init);
    pump(&mut client, &mut nav, follow_up).await?;

    let renderer = TextDiffRenderer;
    println!("{}", render_view(&nav, &settings, &renderer, width));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let action = match parse_action(&line) {
            Ok(action) => action,
            Err(message) => {
                eprintln!("{}", message);
                continue;
            }
        };

        let outgoing = match action {
            Action::Quit => break,
            Action::Help => {
                println!("{}", HELP);
                continue;
            }
            Action::List => {
                println!("{}", render_list(&nav));
                continue;
            }
            Action::Cat => {
                println!("{}", render_revision(&nav, &highlighter, language));
                continue;
            }
            Action::ToggleLayout | Action::ToggleExpand => {
                toggle(&mut settings, action);
                if let Some(store) = store.as_mut() {
                    if let Err(e) = settings.save(store) {
                        warn!(error = %e, "failed to persist diff settings");
                    }
                }
                None
            }
            Action::Next => nav.next(),
            Action::Prev => nav.prev(),
            Action::Goto(index) => nav.select(index),
            Action::More => nav.load_more(),
            Action::Retry => nav.retry(),
        };

        pump(&mut client, &mut nav, outgoing.into_iter().collect()).await?;
        println!("{}", render_view(&nav, &settings, &renderer, width));
    }

    highlighter.dispose();
    let status = client.shutdown().await?;
    if !status.success() {
        warn!(status = %status, "host exited with failure");
    }
    Ok(())
}

/// Global flags the host understands
fn host_args(cli: &Cli) -> Vec<String> {
    let mut args = vec!["--log-level".to_string(), cli.log_level.clone()];
    if let Some(config) = &cli.config {
        args.push("--config".to_string());
        args.push(config.display().to_string());
    }
    if let Some(kind) = cli.backend {
        args.push("--backend".to_string());
        args.push(kind.to_string());
    }
    args
}

/// Send `outgoing`, then apply host replies until no request is outstanding
async fn pump(
    client: &mut HostClient,
    nav: &mut Navigator,
    mut outgoing: Vec<DisplayMessage>,
) -> Result<(), CliError> {
    loop {
        for message in outgoing.drain(..) {
            client.send(&message).await?;
        }
        if !nav.in_flight() {
            return Ok(());
        }
        let reply = client.recv().await?;
        outgoing = nav.on_message(reply);
    }
}

fn toggle(settings: &mut DiffSettings, action: Action) {
    match action {
        Action::ToggleLayout => {
            settings.layout = match settings.layout {
                DiffLayout::Unified => DiffLayout::Split,
                DiffLayout::Split => DiffLayout::Unified,
            }
        }
        Action::ToggleExpand => settings.expand_unchanged = !settings.expand_unchanged,
        _ => {}
    }
}

fn render_view(
    nav: &Navigator,
    settings: &DiffSettings,
    renderer: &dyn DiffRenderer,
    width: usize,
) -> String {
    let pair = match nav.view() {
        ViewState::Loading => return "Loading history...".to_string(),
        ViewState::Failed(message) => {
            return format!("Failed to load history: {}\n(r to retry)", message)
        }
        ViewState::NotEnoughHistory => {
            return "Not enough history: this file has fewer than two revisions.".to_string()
        }
        ViewState::Diff(pair) => pair,
    };

    let total = nav.commits().len() - 1;
    let more = if nav.has_more() { "+" } else { "" };
    let newer = pair.newer;
    let older = pair.older;

    let mut out = format!(
        "[{}/{}{}] {} {} ({}, {})\n{} -> {}\n",
        pair.index + 1,
        total,
        more,
        newer.short_hash(),
        newer.message.lines().next().unwrap_or(""),
        newer.author,
        format_relative(&newer.date, Utc::now()),
        older.short_hash(),
        newer.short_hash(),
    );
    if older.path_missing {
        out.push_str("(file created)\n");
    }
    if newer.path_missing {
        out.push_str("(file deleted)\n");
    }
    if let Some(error) = nav.error() {
        out.push_str(&format!("(loading more failed: {}; r to retry)\n", error));
    }

    let diff = renderer.render_diff(&older.content, &newer.content, &DiffOptions::from(settings));
    if diff.is_unchanged() {
        out.push_str("(no changes to this file)");
    } else {
        out.push_str(&format!("+{} -{}\n", diff.insertions, diff.deletions));
        out.push_str(diff.to_text(width).trim_end());
    }
    out
}

/// The carousel: every loaded revision, newest first
fn render_list(nav: &Navigator) -> String {
    let now = Utc::now();
    let mut out = String::new();
    for (i, commit) in nav.commits().iter().enumerate() {
        let marker = if i == nav.current_index() || i == nav.current_index() + 1 {
            '*'
        } else {
            ' '
        };
        out.push_str(&format!(
            "{} {} {:<14} {}\n",
            marker,
            commit.short_hash(),
            format_relative(&commit.date, now),
            commit.message.lines().next().unwrap_or("")
        ));
    }
    if nav.has_more() {
        out.push_str("  ... (m to load more)");
    }
    out.trim_end().to_string()
}

fn render_revision(nav: &Navigator, highlighter: &dyn Highlighter, language: &str) -> String {
    let Some(pair) = nav.diff_pair() else {
        return "Nothing to show yet.".to_string();
    };
    if pair.newer.path_missing {
        return format!("{} does not contain the file", pair.newer.short_hash());
    }
    highlighter
        .highlight(&pair.newer.content, language)
        .iter()
        .enumerate()
        .map(|(i, tokens)| {
            let text: String = tokens.iter().map(|t| t.text.as_str()).collect();
            format!("{:>5} {}", i + 1, text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use libfilehist_core::Commit;
    use libfilehist_ipc::HostMessage;

    fn loaded(contents: &[&str], has_more: bool) -> Navigator {
        let mut nav = Navigator::new();
        nav.on_message(HostMessage::Init {
            file_path: "/repo/a.txt".into(),
            file_name: "a.txt".into(),
        });
        let commits = contents
            .iter()
            .enumerate()
            .map(|(i, c)| {
                Commit::new(
                    format!("hash{:04}abcdef", i),
                    "Test Author",
                    "2024-01-01T00:00:00+00:00",
                    format!("change {}", i),
                    *c,
                )
            })
            .collect();
        nav.on_message(HostMessage::Commits { commits, has_more });
        nav
    }

    #[test]
    fn test_parse_actions() {
        assert_eq!(parse_action("").unwrap(), Action::Next);
        assert_eq!(parse_action("p").unwrap(), Action::Prev);
        assert_eq!(parse_action("g 3").unwrap(), Action::Goto(2));
        assert_eq!(parse_action("  q ").unwrap(), Action::Quit);
        assert_eq!(parse_action("t").unwrap(), Action::ToggleLayout);
        assert!(parse_action("g").is_err());
        assert!(parse_action("g 0").is_err());
        assert!(parse_action("g x").is_err());
        assert!(parse_action("zap").is_err());
    }

    #[test]
    fn test_toggle_settings() {
        let mut settings = DiffSettings::default();
        toggle(&mut settings, Action::ToggleLayout);
        assert_eq!(settings.layout, DiffLayout::Split);
        toggle(&mut settings, Action::ToggleExpand);
        assert!(settings.expand_unchanged);
        toggle(&mut settings, Action::ToggleLayout);
        assert_eq!(settings.layout, DiffLayout::Unified);
    }

    #[test]
    fn test_render_view_states() {
        let renderer = TextDiffRenderer;
        let settings = DiffSettings::default();

        let nav = Navigator::new();
        assert_eq!(render_view(&nav, &settings, &renderer, 80), "Loading history...");

        let nav = loaded(&["only\n"], false);
        assert!(render_view(&nav, &settings, &renderer, 80).starts_with("Not enough history"));

        let nav = loaded(&["a\nb\n", "a\n"], false);
        let text = render_view(&nav, &settings, &renderer, 80);
        assert!(text.starts_with("[1/1] hash000"), "{}", text);
        assert!(text.contains("+1 -0"), "{}", text);
        assert!(text.contains("b"), "{}", text);
    }

    #[test]
    fn test_render_unchanged_revision() {
        let nav = loaded(&["same\n", "same\n"], false);
        let text = render_view(&nav, &DiffSettings::default(), &TextDiffRenderer, 80);
        assert!(text.ends_with("(no changes to this file)"));
    }

    #[test]
    fn test_render_list_marks_current_pair() {
        let nav = loaded(&["c\n", "b\n", "a\n"], true);
        let list = render_list(&nav);
        let lines: Vec<_> = list.lines().collect();
        assert!(lines[0].starts_with('*'));
        assert!(lines[1].starts_with('*'));
        assert!(lines[2].starts_with(' '));
        assert!(list.ends_with("(m to load more)"));
    }

    #[test]
    fn test_render_revision_numbers_lines() {
        let nav = loaded(&["one\ntwo\n", "one\n"], false);
        let mut highlighter = PlainHighlighter::new();
        highlighter.init().unwrap();
        let text = render_revision(&nav, &highlighter, "text");
        assert_eq!(text, "    1 one\n    2 two");
    }

    #[test]
    fn test_host_args_pass_globals() {
        use clap::Parser;
        let cli = Cli::parse_from([
            "filehist",
            "--backend",
            "libgit2",
            "--config",
            "/tmp/c.toml",
            "browse",
            "a.txt",
        ]);
        assert_eq!(
            host_args(&cli),
            vec!["--log-level", "warn", "--config", "/tmp/c.toml", "--backend", "libgit2"]
        );
    }
}
