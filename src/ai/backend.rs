use crate::ai::unwrap::unwrap_records;
use crate::ai::{AssistantSource, ExplanationSource, FlashcardSource, QuizSource};
use crate::auth::TokenProvider;
use crate::error::SourceError;
use crate::models::{Flashcard, Question};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Serialize)]
struct ContextRequest<'a> {
    context: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExplainRequest<'a> {
    question: &'a str,
    correct_answer: &'a str,
}

#[derive(Deserialize)]
struct ExplainResponse {
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Serialize)]
struct AskRequest<'a> {
    query: &'a str,
    context: &'a str,
}

#[derive(Deserialize)]
struct AskResponse {
    #[serde(default)]
    response: Option<String>,
}

/// Client for the study backend's generation endpoints.
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl BackendClient {
    pub fn new(base_url: &str, tokens: Arc<dyn TokenProvider>) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, SourceError> {
        let url = self.endpoint(path);
        log::debug!("POST {}", url);

        let mut request = self.http.post(&url).json(body);
        if let Some(token) = self.tokens.bearer_token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                code: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl QuizSource for BackendClient {
    async fn fetch_quiz(&self, context: &str) -> Result<Vec<Question>, SourceError> {
        let body = self.post_json("quiz", &ContextRequest { context }).await?;
        let payload = body.get("quiz").cloned().unwrap_or(Value::Null);
        Ok(unwrap_records(&payload, "quiz"))
    }
}

#[async_trait]
impl ExplanationSource for BackendClient {
    async fn explain(&self, question: &str, correct_answer: &str) -> Result<String, SourceError> {
        let body = self
            .post_json(
                "explain",
                &ExplainRequest {
                    question,
                    correct_answer,
                },
            )
            .await?;
        let response: ExplainResponse = serde_json::from_value(body)?;
        Ok(response.explanation.unwrap_or_default())
    }
}

#[async_trait]
impl FlashcardSource for BackendClient {
    async fn fetch_flashcards(&self, context: &str) -> Result<Vec<Flashcard>, SourceError> {
        let body = self.post_json("flashcards", &ContextRequest { context }).await?;
        let payload = body.get("flashcards").cloned().unwrap_or(Value::Null);
        Ok(unwrap_records(&payload, "flashcards"))
    }
}

#[async_trait]
impl AssistantSource for BackendClient {
    async fn ask(&self, query: &str, context: &str) -> Result<String, SourceError> {
        let body = self.post_json("ask", &AskRequest { query, context }).await?;
        let response: AskResponse = serde_json::from_value(body)?;
        Ok(response.response.unwrap_or_default())
    }
}
