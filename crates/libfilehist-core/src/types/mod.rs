pub mod backend;
pub mod commit;
pub mod cursor;

pub use backend::BackendKind;
pub use commit::{Commit, CommitMeta, Page};
pub use cursor::Cursor;
