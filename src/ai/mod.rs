pub mod backend;
pub mod client;
pub mod unwrap;

use crate::error::SourceError;
use crate::models::{Flashcard, Question};
use async_trait::async_trait;
use std::sync::Arc;

// Public API exports
pub use backend::{BackendClient, DEFAULT_API_URL};
pub use client::{ModelConfig, OpenRouterClient, DEFAULT_MODEL};
pub use unwrap::{extract_fenced_json, unwrap_records};

/// Produces the question set for a context.
#[async_trait]
pub trait QuizSource: Send + Sync {
    async fn fetch_quiz(&self, context: &str) -> Result<Vec<Question>, SourceError>;
}

/// Explains why an answer is correct. Best effort.
#[async_trait]
pub trait ExplanationSource: Send + Sync {
    async fn explain(&self, question: &str, correct_answer: &str) -> Result<String, SourceError>;
}

#[async_trait]
pub trait FlashcardSource: Send + Sync {
    async fn fetch_flashcards(&self, context: &str) -> Result<Vec<Flashcard>, SourceError>;
}

/// Answers free-form questions about the study material.
#[async_trait]
pub trait AssistantSource: Send + Sync {
    async fn ask(&self, query: &str, context: &str) -> Result<String, SourceError>;
}

/// The collaborators a quiz controller talks to.
#[derive(Clone)]
pub struct Sources {
    pub quiz: Arc<dyn QuizSource>,
    pub explanations: Arc<dyn ExplanationSource>,
}

impl Sources {
    /// Use one client for both roles.
    pub fn from_client<C>(client: Arc<C>) -> Self
    where
        C: QuizSource + ExplanationSource + 'static,
    {
        Self {
            quiz: client.clone(),
            explanations: client,
        }
    }
}
