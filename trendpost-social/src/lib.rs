//! Social network publishing for trendpost.
//!
//! Only X (Twitter) is implemented. Posting goes through the v2 tweet endpoint
//! with an OAuth 1.0a user-context signature, see [`twitter::oauth`].
pub mod twitter;

pub use twitter::{Publisher, TwitterApi, XCredentials};
