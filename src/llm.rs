use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const MODEL_NAME: &str = "gemini-1.5-flash";
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }

    /// Send one prompt to the Gemini API and return the response text.
    pub async fn generate(&self, prompt: String) -> Result<String> {
        let request_body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let url = format!(
            "{}/{}:generateContent?key={}",
            API_BASE, MODEL_NAME, self.api_key
        );
        let response = self.http.post(&url).json(&request_body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let detail: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(200)
                .collect();
            return Err(Error::Upstream(format!(
                "Gemini returned status {}: {}",
                status, detail
            )));
        }

        let body = response.text().await?;
        response_text(parse_response(&body)?)
    }
}

fn parse_response(body: &str) -> Result<GenerateResponse> {
    serde_json::from_str(body)
        .map_err(|e| Error::Upstream(format!("Gemini returned malformed JSON: {}", e)))
}

fn response_text(response: GenerateResponse) -> Result<String> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .map(|part| part.text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| Error::Upstream("response contained no text".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_text_from_first_candidate() {
        let json = r#"{
            "candidates": [
                {
                    "content": {
                        "parts": [{"text": "  **Persona:** curious rustacean. \n"}],
                        "role": "model"
                    },
                    "finishReason": "STOP"
                }
            ]
        }"#;
        let text = response_text(parse_response(json).unwrap()).unwrap();
        assert_eq!(text, "**Persona:** curious rustacean.");
    }

    #[test]
    fn no_candidates_is_an_upstream_error() {
        let response = parse_response(r#"{"candidates": []}"#).unwrap();
        let err = response_text(response).unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }

    #[test]
    fn blocked_candidate_without_content_is_an_upstream_error() {
        let response = parse_response(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        let err = response_text(response).unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }

    #[test]
    fn whitespace_only_text_is_an_upstream_error() {
        let json = r#"{"candidates": [{"content": {"parts": [{"text": "   "}]}}]}"#;
        assert!(response_text(parse_response(json).unwrap()).is_err());
    }

    #[test]
    fn malformed_body_is_an_upstream_error() {
        let err = parse_response("<html>service unavailable</html>").unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }
}
