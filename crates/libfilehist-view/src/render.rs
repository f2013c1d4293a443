//! Rendering capabilities consumed by a display
//!
//! A display needs two collaborators: something that turns source text into
//! styled tokens, and something that turns two revisions into a diff. Both
//! are traits so a richer implementation can be swapped in; the defaults
//! here are a plain-text highlighter and a line diff built on `similar`.

use std::fmt::Write as _;

use similar::{ChangeTag, DiffOp, TextDiff};

use crate::error::ViewError;
use crate::settings::{DiffLayout, DiffSettings};

/// A run of text with an optional style class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub style: Option<String>,
}

impl Token {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
        }
    }
}

/// Source highlighting with an explicit lifecycle
///
/// `init` is called once when a session starts and `dispose` when it ends;
/// implementations must not rely on global state between the two.
pub trait Highlighter {
    fn init(&mut self) -> Result<(), ViewError>;

    /// Tokens per line; unknown languages fall back to plain text
    fn highlight(&self, code: &str, language_hint: &str) -> Vec<Vec<Token>>;

    fn dispose(&mut self);
}

/// Highlighter that emits each line as a single unstyled token
#[derive(Debug, Default)]
pub struct PlainHighlighter {
    ready: bool,
}

impl PlainHighlighter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }
}

impl Highlighter for PlainHighlighter {
    fn init(&mut self) -> Result<(), ViewError> {
        self.ready = true;
        Ok(())
    }

    fn highlight(&self, code: &str, _language_hint: &str) -> Vec<Vec<Token>> {
        code.lines().map(|line| vec![Token::plain(line)]).collect()
    }

    fn dispose(&mut self) {
        self.ready = false;
    }
}

/// Options for one diff rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOptions {
    pub layout: DiffLayout,
    pub line_numbers: bool,
    /// Unchanged lines shown around each change; `None` shows the whole file
    pub context: Option<usize>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            layout: DiffLayout::Unified,
            line_numbers: true,
            context: Some(3),
        }
    }
}

impl From<&DiffSettings> for DiffOptions {
    fn from(settings: &DiffSettings) -> Self {
        Self {
            layout: settings.layout,
            line_numbers: settings.line_numbers,
            context: if settings.expand_unchanged { None } else { Some(3) },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `@@ -a,b +c,d @@` separator between groups
    Hunk,
    Context,
    Delete,
    Insert,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub kind: LineKind,
    /// 1-based line number in the older revision
    pub old_line: Option<usize>,
    /// 1-based line number in the newer revision
    pub new_line: Option<usize>,
    /// Line text without its trailing newline
    pub text: String,
}

/// A rendered diff, independent of output medium
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedDiff {
    pub lines: Vec<DiffLine>,
    pub insertions: usize,
    pub deletions: usize,
    pub options: Option<DiffOptions>,
}

impl RenderedDiff {
    pub fn is_unchanged(&self) -> bool {
        self.insertions == 0 && self.deletions == 0
    }

    /// Plain-text rendering in the layout the diff was produced for
    pub fn to_text(&self, width: usize) -> String {
        let options = self.options.clone().unwrap_or_default();
        match options.layout {
            DiffLayout::Unified => self.unified_text(options.line_numbers),
            DiffLayout::Split => self.split_text(options.line_numbers, width),
        }
    }

    pub fn unified_text(&self, line_numbers: bool) -> String {
        let mut out = String::new();
        for line in &self.lines {
            if line.kind == LineKind::Hunk {
                let _ = writeln!(out, "{}", line.text);
                continue;
            }
            let sign = match line.kind {
                LineKind::Delete => '-',
                LineKind::Insert => '+',
                _ => ' ',
            };
            if line_numbers {
                let _ = write!(
                    out,
                    "{:>5} {:>5} ",
                    number(line.old_line),
                    number(line.new_line)
                );
            }
            let _ = writeln!(out, "{}{}", sign, line.text);
        }
        out
    }

    /// Side-by-side rendering; deletions pair with the insertions that follow
    pub fn split_text(&self, line_numbers: bool, width: usize) -> String {
        let gutter = if line_numbers { 6 } else { 0 };
        let column = (width.saturating_sub(3) / 2).saturating_sub(gutter).max(10);

        let mut out = String::new();
        let mut i = 0;
        while i < self.lines.len() {
            let line = &self.lines[i];
            match line.kind {
                LineKind::Hunk => {
                    let _ = writeln!(out, "{}", line.text);
                    i += 1;
                }
                LineKind::Context => {
                    push_row(&mut out, Some(line), Some(line), line_numbers, column);
                    i += 1;
                }
                LineKind::Delete | LineKind::Insert => {
                    let start = i;
                    while i < self.lines.len() && self.lines[i].kind == LineKind::Delete {
                        i += 1;
                    }
                    let deletes = &self.lines[start..i];
                    let mid = i;
                    while i < self.lines.len() && self.lines[i].kind == LineKind::Insert {
                        i += 1;
                    }
                    let inserts = &self.lines[mid..i];
                    for row in 0..deletes.len().max(inserts.len()) {
                        push_row(
                            &mut out,
                            deletes.get(row),
                            inserts.get(row),
                            line_numbers,
                            column,
                        );
                    }
                }
            }
        }
        out
    }
}

fn number(n: Option<usize>) -> String {
    n.map(|n| n.to_string()).unwrap_or_default()
}

fn fit(text: &str, column: usize) -> String {
    let mut cell: String = text.chars().take(column).collect();
    let len = cell.chars().count();
    cell.extend(std::iter::repeat(' ').take(column - len));
    cell
}

fn push_row(
    out: &mut String,
    left: Option<&DiffLine>,
    right: Option<&DiffLine>,
    line_numbers: bool,
    column: usize,
) {
    let side = |line: Option<&DiffLine>, old: bool| -> String {
        let (n, text) = match line {
            Some(line) => (if old { line.old_line } else { line.new_line }, line.text.as_str()),
            None => (None, ""),
        };
        if line_numbers {
            format!("{:>5} {}", number(n), fit(text, column))
        } else {
            fit(text, column)
        }
    };
    let marker = match (left.map(|l| l.kind), right.map(|r| r.kind)) {
        (Some(LineKind::Context), _) => ' ',
        (Some(_), Some(_)) => '|',
        (Some(_), None) => '<',
        _ => '>',
    };
    let _ = writeln!(out, "{} {} {}", side(left, true), marker, side(right, false).trim_end());
}

/// Turns two revisions of a file into a diff
pub trait DiffRenderer {
    fn render_diff(&self, old: &str, new: &str, options: &DiffOptions) -> RenderedDiff;
}

/// Line diff via `similar`
#[derive(Debug, Default, Clone, Copy)]
pub struct TextDiffRenderer;

impl DiffRenderer for TextDiffRenderer {
    fn render_diff(&self, old: &str, new: &str, options: &DiffOptions) -> RenderedDiff {
        let diff = TextDiff::from_lines(old, new);
        let groups: Vec<Vec<DiffOp>> = match options.context {
            Some(radius) => diff.grouped_ops(radius),
            None => vec![diff.ops().to_vec()],
        };

        let mut rendered = RenderedDiff {
            options: Some(options.clone()),
            ..RenderedDiff::default()
        };
        for group in groups.iter().filter(|g| !g.is_empty()) {
            if options.context.is_some() {
                rendered.lines.push(hunk_header(group));
            }
            for op in group {
                for change in diff.iter_changes(op) {
                    let kind = match change.tag() {
                        ChangeTag::Equal => LineKind::Context,
                        ChangeTag::Delete => {
                            rendered.deletions += 1;
                            LineKind::Delete
                        }
                        ChangeTag::Insert => {
                            rendered.insertions += 1;
                            LineKind::Insert
                        }
                    };
                    rendered.lines.push(DiffLine {
                        kind,
                        old_line: change.old_index().map(|i| i + 1),
                        new_line: change.new_index().map(|i| i + 1),
                        text: change.value().trim_end_matches(['\n', '\r']).to_string(),
                    });
                }
            }
        }
        rendered
    }
}

fn hunk_header(group: &[DiffOp]) -> DiffLine {
    let (first, last) = match (group.first(), group.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return DiffLine {
                kind: LineKind::Hunk,
                old_line: None,
                new_line: None,
                text: String::from("@@"),
            }
        }
    };
    let old_start = first.old_range().start;
    let old_len = last.old_range().end - old_start;
    let new_start = first.new_range().start;
    let new_len = last.new_range().end - new_start;
    DiffLine {
        kind: LineKind::Hunk,
        old_line: None,
        new_line: None,
        text: format!(
            "@@ -{},{} +{},{} @@",
            old_start + 1,
            old_len,
            new_start + 1,
            new_len
        ),
    }
}
