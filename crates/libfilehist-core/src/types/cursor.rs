use std::fmt;

/// Longest revision id accepted in a cursor (SHA-256 object ids)
pub const MAX_REVISION_LEN: usize = 64;

/// Pagination cursor
///
/// `Before(hash)` resumes strictly before `hash`, which is always the oldest
/// commit the caller has seen so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Cursor {
    /// Fetch from the most recent revision
    #[default]
    Start,
    /// Continue strictly before this revision
    Before(String),
}

impl Cursor {
    /// The hash this cursor excludes, if any
    pub fn before(&self) -> Option<&str> {
        match self {
            Cursor::Start => None,
            Cursor::Before(hash) => Some(hash),
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self, Cursor::Start)
    }

    /// Whether the cursor could be a revision id from any backend
    ///
    /// Ids are ASCII alphanumeric and at most 64 characters, so a cursor can
    /// never be mistaken for a command-line option or a revision range.
    pub fn is_well_formed(&self) -> bool {
        match self {
            Cursor::Start => true,
            Cursor::Before(hash) => {
                !hash.is_empty()
                    && hash.len() <= MAX_REVISION_LEN
                    && hash.bytes().all(|b| b.is_ascii_alphanumeric())
            }
        }
    }

    /// Whether the cursor is a git object id (4 to 64 hex digits)
    pub fn is_object_id(&self) -> bool {
        match self {
            Cursor::Start => true,
            Cursor::Before(hash) => {
                (4..=MAX_REVISION_LEN).contains(&hash.len())
                    && hash.bytes().all(|b| b.is_ascii_hexdigit())
            }
        }
    }
}

impl From<Option<String>> for Cursor {
    fn from(before: Option<String>) -> Self {
        match before {
            Some(hash) if !hash.is_empty() => Cursor::Before(hash),
            _ => Cursor::Start,
        }
    }
}

impl From<Cursor> for Option<String> {
    fn from(cursor: Cursor) -> Self {
        match cursor {
            Cursor::Start => None,
            Cursor::Before(hash) => Some(hash),
        }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cursor::Start => write!(f, "start"),
            Cursor::Before(hash) => write!(f, "before:{}", hash),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_from_wire() {
        assert_eq!(Cursor::from(None), Cursor::Start);
        assert_eq!(Cursor::from(Some(String::new())), Cursor::Start);
        assert_eq!(
            Cursor::from(Some("abc".to_string())),
            Cursor::Before("abc".to_string())
        );
    }

    #[test]
    fn test_cursor_to_wire() {
        let wire: Option<String> = Cursor::Before("abc".to_string()).into();
        assert_eq!(wire.as_deref(), Some("abc"));
        let wire: Option<String> = Cursor::Start.into();
        assert!(wire.is_none());
    }

    #[test]
    fn test_cursor_shape_checks() {
        let sha = Cursor::Before("3f2a9c1e".repeat(5));
        assert!(sha.is_well_formed());
        assert!(sha.is_object_id());
        assert!(Cursor::Start.is_object_id());

        let short = Cursor::Before("c5".to_string());
        assert!(short.is_well_formed());
        assert!(!short.is_object_id());

        for bad in ["--output=/tmp/x", "-p", "HEAD~1", "a..b", "abc def", "abc:file"] {
            let cursor = Cursor::Before(bad.to_string());
            assert!(!cursor.is_well_formed(), "{}", bad);
            assert!(!cursor.is_object_id(), "{}", bad);
        }
        assert!(!Cursor::Before("a".repeat(65)).is_well_formed());
        assert!(!Cursor::Before("zzzz".to_string()).is_object_id());
    }

    #[test]
    fn test_cursor_display() {
        assert_eq!(Cursor::Start.to_string(), "start");
        assert_eq!(Cursor::Before("abc".into()).to_string(), "before:abc");
        assert_eq!(Cursor::Before("abc".into()).before(), Some("abc"));
    }
}
