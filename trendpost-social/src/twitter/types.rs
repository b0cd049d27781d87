use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct CreateTweetRequest<'a> {
    pub text: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTweetResponse {
    pub data: CreatedTweet,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedTweet {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_response_tolerates_missing_text() {
        let resp: CreateTweetResponse =
            serde_json::from_str(r#"{"data":{"id":"12345"}}"#).unwrap();
        assert_eq!(resp.data.id, "12345");
        assert!(resp.data.text.is_none());
    }

    #[test]
    fn request_serializes_text_only() {
        let body = serde_json::to_value(CreateTweetRequest { text: "hi" }).unwrap();
        assert_eq!(body, serde_json::json!({"text": "hi"}));
    }
}
