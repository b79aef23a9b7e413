use crate::ai::unwrap::unwrap_records;
use crate::ai::{AssistantSource, ExplanationSource, FlashcardSource, QuizSource};
use crate::error::SourceError;
use crate::models::{Flashcard, Question};
use async_trait::async_trait;
use openrouter_api::{
    models::provider_preferences::ProviderPreferences,
    models::provider_preferences::ProviderSort,
    types::chat::{ChatCompletionRequest, Message},
};
use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_MODEL: &str = "openai/gpt-oss-120b";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

const SYSTEM_PROMPT: &str =
    "You are an educational assistant that turns study notes into practice material. Be concise and accurate.";

#[derive(Debug)]
pub struct OpenRouterClient {
    client: openrouter_api::OpenRouterClient<openrouter_api::Ready>,
    config: ModelConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelConfig {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: Some(DEFAULT_TEMPERATURE),
            max_tokens: Some(DEFAULT_MAX_TOKENS),
        }
    }
}

pub fn quiz_prompt(context: &str) -> String {
    format!(
        r#"Write a quiz about the study material below.

Material:
{}

IMPORTANT:

- Respond with a single fenced code block labelled json containing this structure:
```json
{{
    "quiz": [
        {{"question": "text", "type": "mcq", "choices": ["a", "b", "c", "d"], "correctAnswer": "a"}},
        {{"question": "text", "type": "true_false", "correctAnswer": "true"}},
        {{"question": "text with ___", "type": "fill_in_blank", "correctAnswer": "word"}}
    ]
}}
```
- Mix the three question types and write between 5 and 10 questions.
- For mcq questions the correctAnswer must be one of the choices, verbatim.
"#,
        context
    )
}

pub fn flashcards_prompt(context: &str) -> String {
    format!(
        r#"Write flashcards for the key terms in the study material below.

Material:
{}

IMPORTANT:

- Respond with a single fenced code block labelled json containing this structure:
```json
{{
    "flashcards": [
        {{"term": "term", "definition": "short definition"}}
    ]
}}
```
"#,
        context
    )
}

pub fn explanation_prompt(question: &str, correct_answer: &str) -> String {
    format!(
        r#"A student did not understand why this answer is correct.

Question: {}
Correct Answer: {}

Explain it in a short paragraph of plain text, without markdown."#,
        question, correct_answer
    )
}

pub fn assistant_prompt(query: &str, context: &str) -> String {
    format!(
        r#"A student is discussing the study material below with you.

Material:
{}

Student: {}

Answer in plain text, in a few sentences. If the material does not cover the question, say so before answering from general knowledge."#,
        context, query
    )
}

impl OpenRouterClient {
    pub fn new(config: ModelConfig) -> Result<Self, SourceError> {
        let client = openrouter_api::OpenRouterClient::quick()
            .map_err(|e| format!("Failed to create OpenRouter client: {}", e))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    async fn complete(&self, prompt: &str) -> Result<String, SourceError> {
        let messages = vec![
            Message::text("system", SYSTEM_PROMPT),
            Message::text("user", prompt),
        ];

        let provider = ProviderPreferences::new().with_sort(ProviderSort::Throughput);

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            provider: Some(provider),
            stream: None,
            response_format: None,
            tools: None,
            tool_choice: None,
            models: None,
            transforms: None,
            route: None,
            user: None,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            top_p: None,
            top_k: None,
            frequency_penalty: None,
            presence_penalty: None,
            repetition_penalty: None,
            min_p: None,
            top_a: None,
            seed: None,
            stop: None,
            logit_bias: None,
            logprobs: None,
            top_logprobs: None,
            prediction: None,
            parallel_tool_calls: None,
            verbosity: None,
        };

        let response = self
            .client
            .chat()
            .map_err(|e| SourceError::Upstream(e.to_string()))?
            .chat_completion(request)
            .await
            .map_err(|e| format!("OpenRouter API error: {}", e))?;

        let Some(choice) = response.choices.first() else {
            return Err("No response choices received".to_string().into());
        };

        match &choice.message.content {
            openrouter_api::MessageContent::Text(text) => Ok(text.clone()),
            openrouter_api::MessageContent::Parts(parts) => {
                let text_parts: Vec<String> = parts
                    .iter()
                    .filter_map(|p| {
                        if let openrouter_api::ContentPart::Text(tc) = p {
                            Some(tc.text.clone())
                        } else {
                            None
                        }
                    })
                    .collect();
                Ok(text_parts.join("\n"))
            }
        }
    }
}

#[async_trait]
impl QuizSource for OpenRouterClient {
    async fn fetch_quiz(&self, context: &str) -> Result<Vec<Question>, SourceError> {
        let text = self.complete(&quiz_prompt(context)).await?;
        log::debug!("Raw quiz response: {}", text);
        Ok(unwrap_records(&Value::String(text), "quiz"))
    }
}

#[async_trait]
impl ExplanationSource for OpenRouterClient {
    async fn explain(&self, question: &str, correct_answer: &str) -> Result<String, SourceError> {
        let text = self
            .complete(&explanation_prompt(question, correct_answer))
            .await?;
        Ok(text.trim().to_string())
    }
}

#[async_trait]
impl FlashcardSource for OpenRouterClient {
    async fn fetch_flashcards(&self, context: &str) -> Result<Vec<Flashcard>, SourceError> {
        let text = self.complete(&flashcards_prompt(context)).await?;
        log::debug!("Raw flashcards response: {}", text);
        Ok(unwrap_records(&Value::String(text), "flashcards"))
    }
}

#[async_trait]
impl AssistantSource for OpenRouterClient {
    async fn ask(&self, query: &str, context: &str) -> Result<String, SourceError> {
        let text = self.complete(&assistant_prompt(query, context)).await?;
        Ok(text.trim().to_string())
    }
}
