//! Google Gemini `generateContent` client.
use crate::traits::{LlmClient, LlmError, LlmResponse};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use trendpost_common::{Result, TrendpostError};
use trendpost_http::{Auth, HttpClient, HttpError, RequestOpts};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";

const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];
const SAFETY_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<TextPart<'a>>,
}

impl<'a> Content<'a> {
    fn text(text: &'a str) -> Self {
        Self {
            parts: vec![TextPart { text }],
        }
    }
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, all parts concatenated.
    fn first_text(&self) -> std::result::Result<String, LlmError> {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            tracing::warn!(block_reason = reason, "Gemini blocked the prompt");
            return Err(LlmError::Blocked);
        }

        let candidate = self
            .candidates
            .first()
            .ok_or_else(|| LlmError::Empty("no candidates returned from Gemini".into()))?;
        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(LlmError::Blocked);
        }

        let text: String = candidate
            .content
            .iter()
            .flat_map(|c| c.parts.iter())
            .map(|p| p.text.as_str())
            .collect();
        if text.trim().is_empty() {
            return Err(LlmError::Empty("no text in Gemini response".into()));
        }
        Ok(text)
    }
}

/// Google Gemini API client.
///
/// Requires a valid API key and internet access.
pub struct GeminiClient {
    http: HttpClient,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Self::with_base_url(GEMINI_BASE_URL, api_key, model)
    }

    /// Same as [`GeminiClient::new`] against a different endpoint root.
    pub fn with_base_url(base_url: &str, api_key: String, model: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(TrendpostError::MissingCredential("GEMINI_API_KEY".into()));
        }
        let http = HttpClient::new(&with_trailing_slash(base_url))
            .map_err(|e| TrendpostError::Config(format!("generation.base_url: {e}")))?;

        Ok(Self {
            http,
            api_key,
            model,
        })
    }
}

fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

fn classify_http_error(err: HttpError) -> LlmError {
    match err.status().map(|s| s.as_u16()) {
        Some(429) => LlmError::RateLimit,
        Some(401) => LlmError::InvalidKey,
        Some(403) => LlmError::Forbidden,
        Some(_) => LlmError::Api(err.to_string()),
        None => match err {
            HttpError::Decode(msg, _) => LlmError::Api(format!("malformed response: {msg}")),
            other => LlmError::Network(other.to_string()),
        },
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<LlmResponse> {
        let request = GenerateContentRequest {
            contents: vec![Content::text(prompt)],
            safety_settings: SAFETY_CATEGORIES
                .into_iter()
                .map(|category| SafetySetting {
                    category,
                    threshold: SAFETY_THRESHOLD,
                })
                .collect(),
        };

        tracing::debug!(model = %self.model, "sending Gemini request");
        let response: GenerateContentResponse = self
            .http
            .post_json_opts(
                &format!("models/{}:generateContent", self.model),
                &request,
                RequestOpts {
                    auth: Some(Auth::Query {
                        name: "key",
                        value: Cow::Borrowed(self.api_key.as_str()),
                    }),
                    ..Default::default()
                },
            )
            .await
            .map_err(classify_http_error)?;

        let text = response.first_text()?;
        Ok(LlmResponse {
            text,
            model: Some(self.model.clone()),
            tokens_used: response.usage_metadata.and_then(|u| u.total_token_count),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
