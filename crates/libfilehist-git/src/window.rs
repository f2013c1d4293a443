//! Over-fetch-by-one window shaping shared by every backend
//!
//! A backend asks its source for `request_count(limit, cursor)` items. If the
//! source can only start *at* a revision, the cursor commit comes back first
//! and `strip_cursor` drops it. `shape_window` then truncates to `limit` and
//! reports whether anything was left over.

use libfilehist_core::Cursor;

/// How many items to ask the source for
///
/// `limit + 1` detects `hasMore`; one more is added when the cursor commit
/// itself will be returned and stripped.
pub fn request_count(limit: usize, cursor: &Cursor) -> usize {
    match cursor {
        Cursor::Start => limit + 1,
        Cursor::Before(_) => limit + 2,
    }
}

/// Drop the cursor commit if the source returned it first
pub fn strip_cursor<T>(items: &mut Vec<T>, cursor: &Cursor, hash_of: impl Fn(&T) -> &str) {
    if let Some(before) = cursor.before() {
        if items.first().map(|item| hash_of(item) == before).unwrap_or(false) {
            items.remove(0);
        }
    }
}

/// Truncate to `limit`, returning `(items, has_more)`
pub fn shape_window<T>(mut items: Vec<T>, limit: usize) -> (Vec<T>, bool) {
    if items.len() > limit {
        items.truncate(limit);
        (items, true)
    } else {
        (items, false)
    }
}
