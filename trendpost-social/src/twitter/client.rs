//! Minimal wrapper around the X v2 tweet creation endpoint.
//!
//! Requests are signed per call with OAuth 1.0a user context and sent once
//! through the shared HTTP client. Failures surface as
//! [`TrendpostError::Publish`] carrying the API's own message when there is one.
use crate::twitter::oauth::OAuthSigner;
use crate::twitter::types::{CreateTweetRequest, CreateTweetResponse};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use trendpost_common::{GeneratedPost, PostResult, Result, TrendpostError};
use trendpost_http::{Auth, HttpClient, RequestOpts};

pub const X_API_BASE_URL: &str = "https://api.twitter.com/";
const CREATE_TWEET_PATH: &str = "2/tweets";

/// Credentials of the account that posts.
#[derive(Clone, Default)]
pub struct XCredentials {
    pub bearer_token: String,
    pub api_key: String,
    pub api_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl XCredentials {
    /// Names of the credentials that are empty, in environment-variable form.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("X_BEARER_TOKEN", &self.bearer_token),
            ("X_API_KEY", &self.api_key),
            ("X_API_SECRET", &self.api_secret),
            ("X_ACCESS_TOKEN", &self.access_token),
            ("X_ACCESS_TOKEN_SECRET", &self.access_token_secret),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

impl std::fmt::Debug for XCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XCredentials")
            .field("missing", &self.missing())
            .finish_non_exhaustive()
    }
}

/// Anything that can put a post in front of readers.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, post: &GeneratedPost) -> Result<PostResult>;
}

#[derive(Clone, Debug)]
pub struct TwitterApi {
    http: HttpClient,
    signer: OAuthSigner,
}

impl TwitterApi {
    pub fn new(credentials: XCredentials) -> Result<Self> {
        Self::with_base_url(X_API_BASE_URL, credentials)
    }

    pub fn with_base_url(base_url: &str, credentials: XCredentials) -> Result<Self> {
        let missing = credentials.missing();
        if !missing.is_empty() {
            return Err(TrendpostError::MissingCredential(missing.join(", ")));
        }

        let base = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let http = HttpClient::new(&base)
            .map_err(|e| TrendpostError::Config(format!("publish.base_url: {e}")))?;

        let signer = OAuthSigner::new(
            credentials.api_key,
            credentials.api_secret,
            credentials.access_token,
            credentials.access_token_secret,
        );
        Ok(Self { http, signer })
    }

    /// Publish `text` as a new tweet on the authenticated account.
    pub async fn create_tweet(&self, text: &str) -> Result<PostResult> {
        let url = self
            .http
            .url_for(CREATE_TWEET_PATH)
            .map_err(|e| TrendpostError::Publish(e.to_string()))?;
        let authorization = self.signer.authorization_header("POST", &url, &[])?;
        let value = HeaderValue::from_str(&authorization)
            .map_err(|e| TrendpostError::Publish(format!("bad authorization header: {e}")))?;

        let resp: CreateTweetResponse = self
            .http
            .post_json_opts(
                CREATE_TWEET_PATH,
                &CreateTweetRequest { text },
                RequestOpts {
                    auth: Some(Auth::Header {
                        name: AUTHORIZATION,
                        value,
                    }),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| TrendpostError::Publish(e.to_string()))?;

        tracing::info!("posted tweet id={}", resp.data.id);
        Ok(PostResult {
            id: resp.data.id,
            text: resp.data.text,
        })
    }
}

#[async_trait]
impl Publisher for TwitterApi {
    async fn publish(&self, post: &GeneratedPost) -> Result<PostResult> {
        self.create_tweet(post.as_str()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_credentials() -> XCredentials {
        XCredentials {
            bearer_token: "bearer".into(),
            api_key: "ck".into(),
            api_secret: "cs".into(),
            access_token: "at".into(),
            access_token_secret: "ats".into(),
        }
    }

    #[test]
    fn reports_every_missing_credential() {
        let creds = XCredentials {
            api_secret: String::new(),
            access_token_secret: " ".into(),
            ..full_credentials()
        };
        let err = TwitterApi::new(creds).unwrap_err();
        match err {
            TrendpostError::MissingCredential(names) => {
                assert_eq!(names, "X_API_SECRET, X_ACCESS_TOKEN_SECRET")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn debug_output_hides_secrets() {
        let rendered = format!("{:?}", full_credentials());
        assert!(!rendered.contains("ats"));
        assert!(rendered.contains("missing: []"));
    }

    #[test]
    fn tweet_url_resolves_under_base() {
        let api = TwitterApi::with_base_url("http://127.0.0.1:9000", full_credentials()).unwrap();
        assert_eq!(
            api.http.url_for(CREATE_TWEET_PATH).unwrap().as_str(),
            "http://127.0.0.1:9000/2/tweets"
        );
    }
}
