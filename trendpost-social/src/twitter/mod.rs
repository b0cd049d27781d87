//! X (Twitter) API integration.
//!
//! Submodules provide the request signer, the HTTP client wrapper, and the typed
//! request/response models for tweet creation.
pub mod client;
pub mod oauth;
pub mod types;

pub use client::{Publisher, TwitterApi, XCredentials};
