use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform limit used by the advisory post audit.
pub const MAX_POST_CHARS: usize = 280;

/// Trending terms for one run, most prominent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendList(Vec<String>);

impl TrendList {
    pub fn new(items: Vec<String>) -> Self {
        Self(items)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Terms joined the way they are quoted in the generation prompt.
    pub fn joined(&self) -> String {
        self.0.join(", ")
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for TrendList {
    fn from(items: Vec<String>) -> Self {
        Self(items)
    }
}

/// A single promotional URL drawn from the links catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedLink(String);

impl SelectedLink {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SelectedLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Post text returned by the generation provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPost(String);

impl GeneratedPost {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn contains_link(&self, link: &SelectedLink) -> bool {
        self.0.contains(link.as_str())
    }

    /// Length in Unicode scalar values, not bytes.
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    pub fn exceeds_limit(&self) -> bool {
        self.char_count() > MAX_POST_CHARS
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Identifier of a published post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostResult {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
}
