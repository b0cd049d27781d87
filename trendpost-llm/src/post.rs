//! Turning trends and a link into post text.
use crate::traits::LlmClient;
use std::fmt;
use trendpost_common::{
    GeneratedPost, Result, SelectedLink, TrendList, TrendpostError, MAX_POST_CHARS,
};

/// Language the post is requested in unless configured otherwise.
pub const DEFAULT_POST_LANGUAGE: &str = "English";

/// Build the instruction sent to the generation provider.
///
/// ```
/// use trendpost_common::{SelectedLink, TrendList};
/// use trendpost_llm::post::build_post_prompt;
///
/// let trends = TrendList::new(vec!["A".into(), "B".into()]);
/// let prompt = build_post_prompt(&trends, &SelectedLink::new("http://x.example/p"), "English");
/// assert!(prompt.contains("'A, B'"));
/// assert!(prompt.contains("http://x.example/p"));
/// ```
pub fn build_post_prompt(trends: &TrendList, link: &SelectedLink, language: &str) -> String {
    format!(
        "Write a short post for X.com (Twitter) in {language} that is relevant to the \
         following topics or hashtags: '{topics}'. \
         The post must be engaging and informative, and must end with at least one relevant hashtag. \
         Include this exact link at the end of the post: {link}. \
         Do not add any URL other than the one I provided.",
        topics = trends.joined(),
    )
}

/// Ask the provider for post text about `trends` that carries `link`.
pub async fn generate_post(
    llm: &dyn LlmClient,
    trends: &TrendList,
    link: &SelectedLink,
    language: &str,
) -> Result<GeneratedPost> {
    let prompt = build_post_prompt(trends, link, language);
    tracing::debug!(prompt_len = prompt.len(), "built post prompt");

    let response = llm.generate(&prompt).await?;
    if response.text.trim().is_empty() {
        return Err(TrendpostError::Generation(
            "provider returned empty text".into(),
        ));
    }

    let post = GeneratedPost::new(response.text);
    tracing::info!(
        model = %llm.model_name(),
        chars = post.char_count(),
        tokens = ?response.tokens_used,
        "Post content generated"
    );
    Ok(post)
}

/// Something off about a generated post. Advisory only; nothing is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostFinding {
    MissingLink,
    TooLong { chars: usize },
}

impl fmt::Display for PostFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostFinding::MissingLink => f.write_str("generated post does not contain the selected link"),
            PostFinding::TooLong { chars } => write!(
                f,
                "generated post is {chars} characters, over the {MAX_POST_CHARS} limit"
            ),
        }
    }
}

pub fn audit_post(post: &GeneratedPost, link: &SelectedLink) -> Vec<PostFinding> {
    let mut findings = Vec::new();
    if !post.contains_link(link) {
        findings.push(PostFinding::MissingLink);
    }
    if post.exceeds_limit() {
        findings.push(PostFinding::TooLong {
            chars: post.char_count(),
        });
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::LlmResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct CannedLlm {
        reply: std::result::Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedLlm {
        fn new(reply: std::result::Result<&str, &str>) -> Self {
            Self {
                reply: reply.map(str::to_string).map_err(str::to_string),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmClient for CannedLlm {
        async fn generate(&self, prompt: &str) -> Result<LlmResponse> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(LlmResponse {
                    text: text.clone(),
                    model: Some("canned".into()),
                    tokens_used: None,
                }),
                Err(msg) => Err(TrendpostError::Generation(msg.clone())),
            }
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    fn abcd() -> TrendList {
        TrendList::new(vec!["A".into(), "B".into(), "C".into(), "D".into()])
    }

    #[test]
    fn prompt_carries_trends_link_and_url_ban() {
        let link = SelectedLink::new("http://x.example/p");
        let prompt = build_post_prompt(&abcd(), &link, DEFAULT_POST_LANGUAGE);
        assert!(prompt.contains("A, B, C, D"));
        assert!(prompt.contains("http://x.example/p"));
        assert!(prompt.contains("Do not add any URL other than the one I provided"));
        assert!(prompt.contains("X.com"));
        assert!(prompt.contains("in English"));
        assert!(prompt.contains("hashtag"));
    }

    #[test]
    fn prompt_language_is_configurable() {
        let link = SelectedLink::new("http://x.example/p");
        let prompt = build_post_prompt(&abcd(), &link, "Indonesian");
        assert!(prompt.contains("in Indonesian"));
    }

    #[tokio::test]
    async fn generate_post_keeps_provider_text_verbatim() {
        let llm = CannedLlm::new(Ok("Big night http://x.example/p #A\n"));
        let link = SelectedLink::new("http://x.example/p");
        let post = generate_post(&llm, &abcd(), &link, "English").await.unwrap();
        assert_eq!(post.as_str(), "Big night http://x.example/p #A\n");

        let prompts = llm.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("A, B, C, D"));
    }

    #[tokio::test]
    async fn blank_provider_text_is_generation_error() {
        let llm = CannedLlm::new(Ok("   "));
        let link = SelectedLink::new("http://x.example/p");
        let err = generate_post(&llm, &abcd(), &link, "English")
            .await
            .unwrap_err();
        assert!(matches!(err, TrendpostError::Generation(_)));
    }

    #[tokio::test]
    async fn provider_errors_pass_through() {
        let llm = CannedLlm::new(Err("quota exhausted"));
        let link = SelectedLink::new("http://x.example/p");
        let err = generate_post(&llm, &abcd(), &link, "English")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("quota exhausted"));
    }

    #[test]
    fn audit_flags_missing_link_and_length() {
        let link = SelectedLink::new("http://x.example/p");
        let ok = GeneratedPost::new("Read more http://x.example/p #A");
        assert!(audit_post(&ok, &link).is_empty());

        let long = GeneratedPost::new("y".repeat(300));
        assert_eq!(
            audit_post(&long, &link),
            vec![PostFinding::MissingLink, PostFinding::TooLong { chars: 300 }]
        );
    }
}
