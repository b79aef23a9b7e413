pub mod layout;
mod chat;
mod flashcards;
mod quiz;
mod summary;

pub use chat::draw_assistant;
pub use flashcards::draw_flashcards;
pub use layout::{
    calculate_assistant_chunks, calculate_flashcard_chunks, calculate_quiz_chunks,
    calculate_summary_chunks,
};
pub use quiz::{draw_quit_confirmation, draw_quiz};
pub use summary::{draw_summary, tier_color};
