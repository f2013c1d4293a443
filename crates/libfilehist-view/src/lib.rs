//! Display-side components for filehist
//!
//! This crate provides:
//! - The navigation controller driving the host protocol from the display side
//! - Highlighter and diff renderer capabilities with default implementations
//! - Persisted view state (diff settings) behind a key-value store
//! - Relative date labels for the commit carousel

pub mod date;
pub mod error;
pub mod navigator;
pub mod render;
pub mod settings;
pub mod store;

pub use date::format_relative;
pub use error::ViewError;
pub use navigator::{DiffPair, Navigator, ViewState};
pub use render::{
    DiffLine, DiffOptions, DiffRenderer, Highlighter, LineKind, PlainHighlighter, RenderedDiff,
    TextDiffRenderer, Token,
};
pub use settings::{DiffLayout, DiffSettings};
pub use store::{JsonFileStore, StateStore};

/// Items from the end of the loaded list at which the next page is requested
pub const PREFETCH_LOOKAHEAD: usize = 4;

/// Carousel scroll distance from the end (px) at which the next page is requested
pub const SCROLL_PREFETCH_PX: f64 = 200.0;
