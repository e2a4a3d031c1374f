use thiserror::Error;

/// Failure modes of the text-generation collaborator. All of them are
/// recoverable; callers fall back to deterministic text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error("API key is missing or was rejected")]
    Auth,

    #[error("rate limited by the API")]
    RateLimited,

    #[error("response was blocked by the content filter")]
    ContentFiltered,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed API response")]
    MalformedResponse,
}

/// Maps a text prompt to a text completion. The only external
/// intelligence in the system; everything else is deterministic.
#[allow(async_fn_in_trait)]
pub trait TextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const TEMPERATURE: f64 = 0.8;
const MAX_OUTPUT_TOKENS: u32 = 150;

/// Client for the Google Generative Language API.
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        GeminiClient {
            http_client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Probe the API with a trivial prompt to verify the key works.
    pub async fn check_connection(&self) -> Result<(), GenerateError> {
        let text = self
            .generate("This is a test message to verify API key validity.")
            .await?;
        if text.trim().is_empty() {
            return Err(GenerateError::MalformedResponse);
        }
        Ok(())
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        if self.api_key.is_empty() {
            return Err(GenerateError::Auth);
        }

        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_BASE_URL, self.model, self.api_key
        );

        let request_body = serde_json::json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }],
            "safetySettings": [
                { "category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_NONE" },
                { "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_NONE" },
                { "category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": "BLOCK_NONE" },
                { "category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": "BLOCK_NONE" }
            ],
            "generationConfig": {
                "temperature": TEMPERATURE,
                "maxOutputTokens": MAX_OUTPUT_TOKENS
            }
        });

        let response = self
            .http_client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| GenerateError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => GenerateError::Auth,
                400 if body.to_lowercase().contains("api key not valid") => GenerateError::Auth,
                429 => GenerateError::RateLimited,
                _ => GenerateError::Transport(format!("status {}: {}", status, body)),
            });
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|_| GenerateError::MalformedResponse)?;

        let candidate = &response_json["candidates"][0];
        if candidate["finishReason"].as_str() == Some("SAFETY") {
            return Err(GenerateError::ContentFiltered);
        }

        candidate["content"]["parts"][0]["text"]
            .as_str()
            .map(|text| text.to_string())
            .ok_or(GenerateError::MalformedResponse)
    }
}
