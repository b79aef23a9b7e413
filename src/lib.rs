pub mod ai;
pub mod ai_worker;
pub mod app;
pub mod assistant;
pub mod auth;
pub mod config;
pub mod controller;
pub mod error;
pub mod explanations;
pub mod flashcards;
pub mod input;
pub mod logger;
pub mod models;
pub mod scoring;
pub mod session;
pub mod timer;
pub mod ui;
pub mod utils;


// Re-exports for convenience
pub use ai::{
    AssistantSource, BackendClient, ExplanationSource, FlashcardSource, ModelConfig,
    OpenRouterClient, QuizSource, Sources, DEFAULT_MODEL,
};
pub use assistant::{AssistantChat, ChatMessage, ChatRole};
pub use config::Config;
pub use controller::{QuizController, ReviewRow, SessionView};
pub use error::{ConfigError, SessionError, SourceError};
pub use explanations::{ExplanationCache, ExplanationState};
pub use flashcards::FlashcardDeck;
pub use input::{handle_assistant_input, handle_flashcard_input, handle_quiz_input};
pub use models::{AppState, Flashcard, Question, QuestionKind, QuizScreen};
pub use scoring::{Banding, Tier};
pub use session::{Phase, QuizSession, TimeLimit};
pub use ui::{draw_assistant, draw_flashcards, draw_quit_confirmation, draw_quiz, draw_summary};
