//! Navigation controller
//!
//! Display-side counterpart of the host protocol. Owns the loaded commits
//! (newest first), the selected position, and the pagination flags. It
//! performs no IO: every operation returns the messages to send, if any.
//!
//! Position `i` shows the diff from `commits[i + 1]` (older) to
//! `commits[i]` (newer), so valid positions are `0..=len - 2`.

use libfilehist_core::Commit;
use libfilehist_ipc::{DisplayMessage, HostMessage};
use tracing::{debug, warn};

use crate::{PREFETCH_LOOKAHEAD, SCROLL_PREFETCH_PX};

/// Two adjacent revisions to diff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffPair<'a> {
    pub index: usize,
    pub newer: &'a Commit,
    pub older: &'a Commit,
}

/// What the display should show right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState<'a> {
    /// Nothing loaded yet
    Loading,
    /// Nothing can be shown because the only request so far failed
    Failed(&'a str),
    /// Fewer than two revisions exist
    NotEnoughHistory,
    Diff(DiffPair<'a>),
}

#[derive(Debug)]
pub struct Navigator {
    file_name: Option<String>,
    commits: Vec<Commit>,
    current: usize,
    has_more: bool,
    in_flight: bool,
    error: Option<String>,
    /// Cursor of the most recent `loadMore`, for `retry`
    last_request: Option<Option<String>>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            file_name: None,
            commits: Vec::new(),
            current: 0,
            has_more: true,
            in_flight: false,
            error: None,
            last_request: None,
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn commits(&self) -> &[Commit] {
        &self.commits
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Begin the handshake
    pub fn start(&mut self) -> DisplayMessage {
        DisplayMessage::Ready
    }

    /// Apply a host message; returns follow-up messages to send
    pub fn on_message(&mut self, message: HostMessage) -> Vec<DisplayMessage> {
        match message {
            HostMessage::Init { file_name, .. } => {
                self.file_name = Some(file_name);
                self.request(None).into_iter().collect()
            }
            HostMessage::Commits { commits, has_more } => {
                if !self.in_flight {
                    warn!(received = commits.len(), "protocol violation: unrequested page dropped");
                    return Vec::new();
                }
                debug!(received = commits.len(), has_more, "page received");
                self.commits.extend(commits);
                self.has_more = has_more;
                self.in_flight = false;
                self.error = None;

                // A single revision cannot be diffed; keep going if more exist
                if self.commits.len() < 2 {
                    self.load_more().into_iter().collect()
                } else {
                    Vec::new()
                }
            }
            HostMessage::Error { message } => {
                debug!(error = %message, "page failed");
                self.in_flight = false;
                self.error = Some(message);
                Vec::new()
            }
        }
    }

    /// Move to the next (older) diff
    ///
    /// Prefetch is decided on the position being left.
    pub fn next(&mut self) -> Option<DisplayMessage> {
        let from = self.current;
        self.current = (from + 1).min(self.max_index());
        self.prefetch_from(from)
    }

    /// Move to the previous (newer) diff
    pub fn prev(&mut self) -> Option<DisplayMessage> {
        self.current = self.current.saturating_sub(1);
        None
    }

    /// Jump to a position, clamped to the diffable range
    pub fn select(&mut self, index: usize) -> Option<DisplayMessage> {
        self.current = index.min(self.max_index());
        self.prefetch_from(self.current)
    }

    /// Carousel scrolled; request more when close to its end
    pub fn on_scroll(
        &mut self,
        scroll_left: f64,
        scroll_width: f64,
        client_width: f64,
    ) -> Option<DisplayMessage> {
        if scroll_width - scroll_left - client_width < SCROLL_PREFETCH_PX {
            self.load_more()
        } else {
            None
        }
    }

    /// Request the page after the last loaded commit
    ///
    /// No-op while a request is in flight or once history is exhausted.
    pub fn load_more(&mut self) -> Option<DisplayMessage> {
        if !self.has_more || self.in_flight {
            return None;
        }
        let before = self.commits.last()?.hash.clone();
        self.request(Some(before))
    }

    /// Re-issue the request that failed
    pub fn retry(&mut self) -> Option<DisplayMessage> {
        if self.error.is_none() || self.in_flight {
            return None;
        }
        let before = self.last_request.clone()?;
        self.error = None;
        self.request(before)
    }

    /// Current diff, if at least two revisions are loaded
    pub fn diff_pair(&self) -> Option<DiffPair<'_>> {
        let newer = self.commits.get(self.current)?;
        let older = self.commits.get(self.current + 1)?;
        Some(DiffPair {
            index: self.current,
            newer,
            older,
        })
    }

    pub fn view(&self) -> ViewState<'_> {
        if let Some(pair) = self.diff_pair() {
            return ViewState::Diff(pair);
        }
        match (&self.error, self.in_flight) {
            (_, true) => ViewState::Loading,
            (Some(message), false) => ViewState::Failed(message),
            (None, false) if self.last_request.is_none() => ViewState::Loading,
            (None, false) if self.commits.len() < 2 && !self.has_more => {
                ViewState::NotEnoughHistory
            }
            (None, false) => ViewState::Loading,
        }
    }

    fn prefetch_from(&mut self, index: usize) -> Option<DisplayMessage> {
        if index + PREFETCH_LOOKAHEAD >= self.commits.len() {
            self.load_more()
        } else {
            None
        }
    }

    fn max_index(&self) -> usize {
        self.commits.len().saturating_sub(2)
    }

    fn request(&mut self, before: Option<String>) -> Option<DisplayMessage> {
        if self.in_flight {
            return None;
        }
        self.in_flight = true;
        self.last_request = Some(before.clone());
        Some(DisplayMessage::LoadMore { before })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commits(range: std::ops::Range<usize>) -> Vec<Commit> {
        range
            .rev()
            .map(|i| Commit::new(format!("c{}", i), "a", "d", "m", format!("v{}", i)))
            .collect()
    }

    fn page(range: std::ops::Range<usize>, has_more: bool) -> HostMessage {
        HostMessage::Commits {
            commits: commits(range),
            has_more,
        }
    }

    fn load(before: &str) -> DisplayMessage {
        DisplayMessage::load_more(Some(before.to_string()))
    }

    /// Handshake plus a first page of c29..c15
    fn navigator_with_first_page() -> Navigator {
        let mut nav = Navigator::new();
        nav.on_message(HostMessage::init("/repo/notes.md"));
        nav.on_message(page(15..30, true));
        nav
    }

    #[test]
    fn test_handshake() {
        let mut nav = Navigator::new();
        assert_eq!(nav.start(), DisplayMessage::Ready);
        assert_eq!(nav.view(), ViewState::Loading);

        let out = nav.on_message(HostMessage::init("/repo/notes.md"));
        assert_eq!(out, vec![DisplayMessage::load_more(None)]);
        assert_eq!(nav.file_name(), Some("notes.md"));
        assert!(nav.in_flight());
    }

    #[test]
    fn test_diff_pair_is_newer_vs_older() {
        let nav = navigator_with_first_page();
        let pair = nav.diff_pair().unwrap();
        assert_eq!(pair.newer.hash, "c29");
        assert_eq!(pair.older.hash, "c28");
    }

    #[test]
    fn test_prefetch_near_end_only_once() {
        let mut nav = navigator_with_first_page();
        assert_eq!(nav.commits().len(), 15);

        for _ in 0..11 {
            assert_eq!(nav.next(), None);
        }
        assert_eq!(nav.current_index(), 11);

        // Leaving 11: 11 + 4 >= 15
        assert_eq!(nav.next(), Some(load("c15")));
        assert_eq!(nav.current_index(), 12);
        assert!(nav.in_flight());
        assert_eq!(nav.next(), None);
    }

    #[test]
    fn test_append_preserves_position() {
        let mut nav = navigator_with_first_page();
        nav.select(12);
        assert_eq!(nav.current_index(), 12);

        nav.on_message(page(10..15, false));
        assert_eq!(nav.commits().len(), 20);
        assert_eq!(nav.current_index(), 12);
        assert_eq!(nav.commits()[15].hash, "c14");
        assert!(!nav.has_more());
        assert_eq!(nav.load_more(), None);
    }

    #[test]
    fn test_bounds_clamp() {
        let mut nav = navigator_with_first_page();
        assert_eq!(nav.load_more(), Some(load("c15")));
        nav.on_message(page(10..15, false));

        nav.prev();
        assert_eq!(nav.current_index(), 0);

        nav.select(1000);
        assert_eq!(nav.current_index(), 18);
        nav.next();
        assert_eq!(nav.current_index(), 18);
        assert_eq!(nav.diff_pair().unwrap().older.hash, "c10");
    }

    #[test]
    fn test_single_commit_is_not_enough_history() {
        let mut nav = Navigator::new();
        nav.on_message(HostMessage::init("a.txt"));
        let out = nav.on_message(page(0..1, false));
        assert!(out.is_empty());
        assert_eq!(nav.view(), ViewState::NotEnoughHistory);
        assert!(nav.diff_pair().is_none());
    }

    #[test]
    fn test_empty_history_is_not_enough_history() {
        let mut nav = Navigator::new();
        nav.on_message(HostMessage::init("a.txt"));
        nav.on_message(page(0..0, false));
        assert_eq!(nav.view(), ViewState::NotEnoughHistory);
    }

    #[test]
    fn test_single_commit_with_more_keeps_loading() {
        let mut nav = Navigator::new();
        nav.on_message(HostMessage::init("a.txt"));
        let out = nav.on_message(page(4..5, true));
        assert_eq!(out, vec![load("c4")]);
        assert_eq!(nav.view(), ViewState::Loading);
    }

    #[test]
    fn test_error_then_retry() {
        let mut nav = navigator_with_first_page();
        nav.select(11);
        assert!(nav.in_flight());

        nav.on_message(HostMessage::error("backend unavailable"));
        assert!(!nav.in_flight());
        assert_eq!(nav.error(), Some("backend unavailable"));
        // Loaded pages stay usable
        assert!(matches!(nav.view(), ViewState::Diff(_)));

        assert_eq!(nav.retry(), Some(load("c15")));
        assert_eq!(nav.error(), None);
        assert_eq!(nav.retry(), None);
    }

    #[test]
    fn test_initial_failure_view() {
        let mut nav = Navigator::new();
        nav.on_message(HostMessage::init("a.txt"));
        nav.on_message(HostMessage::error("no git"));
        assert_eq!(nav.view(), ViewState::Failed("no git"));
        assert_eq!(nav.retry(), Some(DisplayMessage::load_more(None)));
    }

    #[test]
    fn test_unrequested_page_is_dropped() {
        let mut nav = navigator_with_first_page();
        assert!(!nav.in_flight());

        let out = nav.on_message(page(10..15, false));
        assert!(out.is_empty());
        assert_eq!(nav.commits().len(), 15);
        assert!(nav.has_more());
    }

    #[test]
    fn test_select_prefetches_on_target() {
        let mut nav = navigator_with_first_page();
        assert_eq!(nav.select(10), None);
        assert_eq!(nav.select(11), Some(load("c15")));
    }

    #[test]
    fn test_scroll_prefetch() {
        let mut nav = navigator_with_first_page();
        assert_eq!(nav.on_scroll(0.0, 2000.0, 800.0), None);
        assert_eq!(nav.on_scroll(1050.0, 2000.0, 800.0), Some(load("c15")));
    }
}
