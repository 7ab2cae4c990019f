//! Shared types, error model, and configuration for the roundup generator.
//!
//! This crate is the foundation depended on by all other roundup crates.
//! It provides:
//! - [`RoundupError`] — the unified error type
//! - Domain types ([`RawBookmark`], [`Bookmark`], [`PROCESSED_TAG`])
//! - The [`BookmarkSource`] trait implemented by remote clients
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod source;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DEFAULT_TAG, PinboardConfig, RoundupConfig, config_dir, config_file_path,
    expand_home, init_config, load_config, load_config_from, resolve_api_token,
};
pub use error::{Result, RoundupError};
pub use source::BookmarkSource;
pub use types::{
    Bookmark, PROCESSED_TAG, PostQuery, RawBookmark, UpsertRequest, is_processed,
};
