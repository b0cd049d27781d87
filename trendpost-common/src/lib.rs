//! Common types and utilities shared across trendpost crates.
//!
//! This crate defines the pipeline data model, the shared error type, and the
//! observability helpers used throughout the workspace. It is intentionally
//! lightweight so that every crate can depend on it without pulling in the
//! HTTP or provider stacks.
//!
//! # Overview
//!
//! - [`TrendList`], [`SelectedLink`], [`GeneratedPost`], [`PostResult`]: values
//!   handed from one pipeline stage to the next
//! - [`Stage`]: the four steps of a run
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`TrendpostError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! ```rust
//! use trendpost_common::{Stage, TrendList, TrendpostError};
//!
//! let trends = TrendList::new(vec!["A".into(), "B".into()]);
//! assert_eq!(trends.joined(), "A, B");
//!
//! let err = TrendpostError::EmptyResult;
//! assert_eq!(err.stage(), Some(Stage::Trends));
//! assert!(err.is_warning());
//! ```
use std::fmt;
use std::path::PathBuf;

pub mod observability;
mod types;

pub use types::{GeneratedPost, PostResult, SelectedLink, TrendList, MAX_POST_CHARS};

/// One discrete step of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Scrape trending terms.
    Trends,
    /// Pick a promotional link.
    Link,
    /// Ask the generation provider for post text.
    Generate,
    /// Submit the post to the social network.
    Publish,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Trends => "trends",
            Stage::Link => "link",
            Stage::Generate => "generate",
            Stage::Publish => "publish",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error types used across the trendpost system.
#[derive(thiserror::Error, Debug)]
pub enum TrendpostError {
    /// The trends page could not be retrieved.
    #[error("error fetching trends: {0}")]
    Fetch(String),

    /// The trends page was retrieved but held no matching entries.
    #[error("no trends found, the page structure may have changed")]
    EmptyResult,

    /// The links file does not exist.
    #[error("links file '{}' not found", .0.display())]
    ResourceNotFound(PathBuf),

    /// The links file exists but has no usable lines.
    #[error("links file '{}' has no usable links", .0.display())]
    EmptyCatalog(PathBuf),

    /// A required secret was absent from the configuration.
    #[error("missing credential: {0}")]
    MissingCredential(String),

    /// The generation provider failed or returned nothing usable.
    #[error("error contacting generation provider: {0}")]
    Generation(String),

    /// The posting provider rejected or never received the post.
    #[error("error posting to X.com: {0}")]
    Publish(String),

    /// Configuration was incomplete or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrendpostError {
    /// Stage that produced the error, if it is a stage-local failure.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            TrendpostError::Fetch(_) | TrendpostError::EmptyResult => Some(Stage::Trends),
            TrendpostError::ResourceNotFound(_)
            | TrendpostError::EmptyCatalog(_)
            | TrendpostError::Io(_) => Some(Stage::Link),
            TrendpostError::Generation(_) => Some(Stage::Generate),
            TrendpostError::Publish(_) => Some(Stage::Publish),
            TrendpostError::MissingCredential(_) | TrendpostError::Config(_) => None,
        }
    }

    /// Fatal errors halt the process instead of being absorbed by a stage.
    pub fn is_fatal(&self) -> bool {
        self.stage().is_none()
    }

    /// Conditions that are reported as warnings rather than errors.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            TrendpostError::EmptyResult | TrendpostError::EmptyCatalog(_)
        )
    }
}

/// Convenient alias for results that use [`TrendpostError`].
pub type Result<T> = std::result::Result<T, TrendpostError>;
