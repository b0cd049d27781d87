//! Text generation for trendpost.
//!
//! This crate exposes a provider-agnostic [`traits::LlmClient`] interface, the
//! Google Gemini implementation, and the [`post`] helpers that turn a trend
//! list and a link into post text.
//!
//! # Examples
//! ```no_run
//! use trendpost_common::{Result, SelectedLink, TrendList};
//! use trendpost_llm::{gemini::GeminiClient, post::generate_post, DEFAULT_GEMINI_MODEL};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let client = GeminiClient::new("api-key".into(), DEFAULT_GEMINI_MODEL.into())?;
//! let trends = TrendList::new(vec!["Elections".into(), "Weather".into()]);
//! let link = SelectedLink::new("https://example.com/promo");
//! let post = generate_post(&client, &trends, &link, "English").await?;
//! println!("{}", post.as_str());
//! # Ok(())
//! # }
//! ```
pub mod gemini;
pub mod post;
pub mod traits;

/// Default model for post generation.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
