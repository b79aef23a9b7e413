use crate::assistant::AssistantChat;
use crate::controller::QuizController;
use crate::flashcards::FlashcardDeck;
use crate::models::{AppState, QuizScreen};
use crate::session::Phase;
use crate::utils::{next_char_boundary, prev_char_boundary};
use crossterm::event::{KeyCode, KeyEvent};

/// Clear per-question input whenever a different question became active.
pub fn sync_screen(controller: &QuizController, screen: &mut QuizScreen) {
    let epoch = controller.session().epoch();
    if screen.shown_epoch != epoch {
        screen.reset_input();
        screen.shown_epoch = epoch;
    }
    let total = controller.session().questions().len();
    if screen.selected_review_row >= total {
        screen.selected_review_row = total.saturating_sub(1);
    }
}

pub fn handle_quiz_input(
    controller: &mut QuizController,
    screen: &mut QuizScreen,
    key: KeyEvent,
    app_state: &mut AppState,
) {
    if key.code == KeyCode::Esc {
        *app_state = AppState::QuizQuitConfirm;
        return;
    }

    sync_screen(controller, screen);

    let result = match controller.session().phase() {
        Phase::InProgress => handle_answer_keys(controller, screen, key),
        Phase::Completed => handle_review_keys(controller, screen, key),
        Phase::Loading | Phase::Unavailable => Ok(()),
    };

    if let Err(e) = result {
        log::debug!("Rejected quiz action: {}", e);
        screen.last_error = Some(e.to_string());
    }

    sync_screen(controller, screen);
}

fn handle_answer_keys(
    controller: &mut QuizController,
    screen: &mut QuizScreen,
    key: KeyEvent,
) -> Result<(), crate::error::SessionError> {
    let Some(question) = controller.session().current_question() else {
        return Ok(());
    };

    if question.takes_free_text() {
        match key.code {
            KeyCode::Enter => {
                let answer = screen.input_buffer.clone();
                controller.submit_answer(&answer)?;
            }
            KeyCode::Left => {
                screen.cursor_position = prev_char_boundary(&screen.input_buffer, screen.cursor_position);
            }
            KeyCode::Right => {
                screen.cursor_position = next_char_boundary(&screen.input_buffer, screen.cursor_position);
            }
            KeyCode::Backspace => {
                if screen.cursor_position > 0 {
                    let start = prev_char_boundary(&screen.input_buffer, screen.cursor_position);
                    screen.input_buffer.replace_range(start..screen.cursor_position, "");
                    screen.cursor_position = start;
                }
            }
            KeyCode::Char(c) => {
                screen.input_buffer.insert(screen.cursor_position, c);
                screen.cursor_position += c.len_utf8();
                screen.last_error = None;
            }
            _ => {}
        }
        return Ok(());
    }

    let options = question.answer_options();
    if options.is_empty() {
        return Ok(());
    }

    match key.code {
        KeyCode::Up => {
            screen.selected_choice = screen.selected_choice.saturating_sub(1);
        }
        KeyCode::Down => {
            if screen.selected_choice < options.len() - 1 {
                screen.selected_choice += 1;
            }
        }
        KeyCode::Char(c) if c.is_ascii_digit() => {
            let picked = c.to_digit(10).unwrap_or(0) as usize;
            if (1..=options.len()).contains(&picked) {
                screen.selected_choice = picked - 1;
            }
        }
        KeyCode::Char('t') | KeyCode::Char('T') if options.len() == 2 && options[0] == "true" => {
            controller.submit_answer("true")?;
        }
        KeyCode::Char('f') | KeyCode::Char('F') if options.len() == 2 && options[1] == "false" => {
            controller.submit_answer("false")?;
        }
        KeyCode::Enter => {
            let choice = options[screen.selected_choice.min(options.len() - 1)].clone();
            controller.submit_answer(&choice)?;
        }
        _ => {}
    }
    Ok(())
}

fn handle_review_keys(
    controller: &mut QuizController,
    screen: &mut QuizScreen,
    key: KeyEvent,
) -> Result<(), crate::error::SessionError> {
    let rows = controller.session().questions().len();
    match key.code {
        KeyCode::Up => {
            screen.selected_review_row = screen.selected_review_row.saturating_sub(1);
        }
        KeyCode::Down => {
            if screen.selected_review_row + 1 < rows {
                screen.selected_review_row += 1;
            }
        }
        KeyCode::Enter | KeyCode::Char('e') => {
            screen.last_error = None;
            controller.request_explanation(screen.selected_review_row)?;
        }
        KeyCode::Char('r') => {
            screen.selected_review_row = 0;
            controller.retry()?;
        }
        KeyCode::Char('g') => {
            screen.selected_review_row = 0;
            controller.regenerate()?;
        }
        _ => {}
    }
    Ok(())
}

pub fn handle_flashcard_input(deck: &mut FlashcardDeck, key: KeyEvent, app_state: &mut AppState) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => *app_state = AppState::QuizQuitConfirm,
        KeyCode::Right | KeyCode::Char('n') => deck.next(),
        KeyCode::Left | KeyCode::Char('p') => deck.prev(),
        KeyCode::Enter | KeyCode::Char(' ') => deck.flip(),
        _ => {}
    }
}

/// Returns the question to send when Enter submits one.
pub fn handle_assistant_input(
    chat: &mut AssistantChat,
    key: KeyEvent,
    app_state: &mut AppState,
) -> Option<String> {
    match key.code {
        KeyCode::Esc => *app_state = AppState::QuizQuitConfirm,
        KeyCode::Enter => return chat.begin_ask(),
        KeyCode::Up => chat.scroll_from_bottom = chat.scroll_from_bottom.saturating_add(1),
        KeyCode::Down => chat.scroll_from_bottom = chat.scroll_from_bottom.saturating_sub(1),
        KeyCode::Left => {
            chat.cursor_position = prev_char_boundary(&chat.input_buffer, chat.cursor_position);
        }
        KeyCode::Right => {
            chat.cursor_position = next_char_boundary(&chat.input_buffer, chat.cursor_position);
        }
        KeyCode::Backspace => {
            if chat.cursor_position > 0 {
                let start = prev_char_boundary(&chat.input_buffer, chat.cursor_position);
                chat.input_buffer.replace_range(start..chat.cursor_position, "");
                chat.cursor_position = start;
            }
        }
        KeyCode::Char(c) => {
            chat.input_buffer.insert(chat.cursor_position, c);
            chat.cursor_position += c.len_utf8();
        }
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{ExplanationSource, QuizSource, Sources};
    use crate::error::SourceError;
    use crate::models::{Flashcard, Question, QuestionKind};
    use crate::scoring::Banding;
    use crate::session::TimeLimit;
    use async_trait::async_trait;
    use crossterm::event::KeyModifiers;
    use std::sync::Arc;

    struct FixedQuiz(Vec<Question>);

    #[async_trait]
    impl QuizSource for FixedQuiz {
        async fn fetch_quiz(&self, _context: &str) -> Result<Vec<Question>, SourceError> {
            Ok(self.0.clone())
        }
    }

    struct EchoExplainer;

    #[async_trait]
    impl ExplanationSource for EchoExplainer {
        async fn explain(&self, question: &str, _correct: &str) -> Result<String, SourceError> {
            Ok(question.to_string())
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    async fn loaded_controller(questions: Vec<Question>) -> QuizController {
        let sources = Sources {
            quiz: Arc::new(FixedQuiz(questions)),
            explanations: Arc::new(EchoExplainer),
        };
        let mut controller =
            QuizController::new("notes", sources, TimeLimit::Unlimited, Banding::default());
        controller.start();
        while controller.session().phase() == Phase::Loading {
            let event = controller.next_event().await.unwrap();
            controller.handle_event(event);
        }
        controller
    }

    async fn ready_controller() -> QuizController {
        loaded_controller(vec![
            Question {
                text: "Capital of Italy?".to_string(),
                kind: QuestionKind::MultipleChoice,
                choices: Some(vec!["Paris".to_string(), "Rome".to_string()]),
                correct_answer: "Rome".to_string(),
            },
            Question {
                text: "Fish can fly.".to_string(),
                kind: QuestionKind::TrueFalse,
                choices: None,
                correct_answer: "false".to_string(),
            },
            Question {
                text: "H2O is ___".to_string(),
                kind: QuestionKind::FillInBlank,
                choices: None,
                correct_answer: "water".to_string(),
            },
        ])
        .await
    }

    #[tokio::test]
    async fn test_full_keyboard_run() {
        let mut controller = ready_controller().await;
        let mut screen = QuizScreen::default();
        let mut state = AppState::Quiz;

        // Multiple choice: move down to "Rome" and submit.
        handle_quiz_input(&mut controller, &mut screen, key(KeyCode::Down), &mut state);
        assert_eq!(screen.selected_choice, 1);
        handle_quiz_input(&mut controller, &mut screen, key(KeyCode::Enter), &mut state);
        assert_eq!(controller.session().score(), 1);
        assert_eq!(screen.selected_choice, 0);

        // True/false shortcut.
        handle_quiz_input(&mut controller, &mut screen, key(KeyCode::Char('f')), &mut state);
        assert_eq!(controller.session().score(), 2);

        // Fill in the blank: empty submit is rejected, typed answer accepted.
        handle_quiz_input(&mut controller, &mut screen, key(KeyCode::Enter), &mut state);
        assert_eq!(screen.last_error.as_deref(), Some("answer is empty"));
        for c in "Watr".chars() {
            handle_quiz_input(&mut controller, &mut screen, key(KeyCode::Char(c)), &mut state);
        }
        handle_quiz_input(&mut controller, &mut screen, key(KeyCode::Left), &mut state);
        handle_quiz_input(&mut controller, &mut screen, key(KeyCode::Char('e')), &mut state);
        assert_eq!(screen.input_buffer, "Water");
        handle_quiz_input(&mut controller, &mut screen, key(KeyCode::Enter), &mut state);

        assert_eq!(controller.session().phase(), Phase::Completed);
        assert_eq!(controller.session().score(), 3);
        assert_eq!(state, AppState::Quiz);
    }

    #[tokio::test]
    async fn test_review_keys() {
        let mut controller = ready_controller().await;
        let mut screen = QuizScreen::default();
        let mut state = AppState::Quiz;
        for answer in ["Paris", "true", "ice"] {
            controller.submit_answer(answer).unwrap();
        }

        handle_quiz_input(&mut controller, &mut screen, key(KeyCode::Down), &mut state);
        handle_quiz_input(&mut controller, &mut screen, key(KeyCode::Char('e')), &mut state);
        assert_eq!(screen.selected_review_row, 1);
        assert!(matches!(
            controller.view().review[1].explanation,
            crate::explanations::ExplanationState::Loading
        ));

        handle_quiz_input(&mut controller, &mut screen, key(KeyCode::Char('e')), &mut state);
        assert!(screen.last_error.as_deref().unwrap().contains("still loading"));

        handle_quiz_input(&mut controller, &mut screen, key(KeyCode::Char('r')), &mut state);
        assert_eq!(controller.session().phase(), Phase::InProgress);
        assert_eq!(screen.selected_review_row, 0);
    }

    #[tokio::test]
    async fn test_choiceless_mcq_is_answered_by_typing() {
        let mut controller = loaded_controller(vec![Question {
            text: "2+2?".to_string(),
            kind: QuestionKind::MultipleChoice,
            choices: Some(Vec::new()),
            correct_answer: "4".to_string(),
        }])
        .await;
        let mut screen = QuizScreen::default();
        let mut state = AppState::Quiz;

        handle_quiz_input(&mut controller, &mut screen, key(KeyCode::Enter), &mut state);
        assert_eq!(screen.last_error.as_deref(), Some("answer is empty"));
        handle_quiz_input(&mut controller, &mut screen, key(KeyCode::Char('4')), &mut state);
        assert_eq!(screen.input_buffer, "4");
        handle_quiz_input(&mut controller, &mut screen, key(KeyCode::Enter), &mut state);

        assert_eq!(controller.session().phase(), Phase::Completed);
        assert_eq!(controller.session().score(), 1);
    }

    #[tokio::test]
    async fn test_escape_asks_for_confirmation() {
        let mut controller = ready_controller().await;
        let mut screen = QuizScreen::default();
        let mut state = AppState::Quiz;
        handle_quiz_input(&mut controller, &mut screen, key(KeyCode::Esc), &mut state);
        assert_eq!(state, AppState::QuizQuitConfirm);
        assert_eq!(controller.session().current_index(), 0);
    }

    #[test]
    fn test_assistant_keys() {
        let mut chat = AssistantChat::new();
        let mut state = AppState::Assistant;

        assert_eq!(handle_assistant_input(&mut chat, key(KeyCode::Enter), &mut state), None);
        for c in "ATP?".chars() {
            handle_assistant_input(&mut chat, key(KeyCode::Char(c)), &mut state);
        }
        handle_assistant_input(&mut chat, key(KeyCode::Backspace), &mut state);
        handle_assistant_input(&mut chat, key(KeyCode::Left), &mut state);
        handle_assistant_input(&mut chat, key(KeyCode::Char('D')), &mut state);
        assert_eq!(chat.input_buffer, "ATDP");

        let sent = handle_assistant_input(&mut chat, key(KeyCode::Enter), &mut state);
        assert_eq!(sent.as_deref(), Some("ATDP"));
        assert!(chat.is_pending());

        handle_assistant_input(&mut chat, key(KeyCode::Char('x')), &mut state);
        assert_eq!(handle_assistant_input(&mut chat, key(KeyCode::Enter), &mut state), None);

        handle_assistant_input(&mut chat, key(KeyCode::Up), &mut state);
        handle_assistant_input(&mut chat, key(KeyCode::Up), &mut state);
        handle_assistant_input(&mut chat, key(KeyCode::Down), &mut state);
        assert_eq!(chat.scroll_from_bottom, 1);

        handle_assistant_input(&mut chat, key(KeyCode::Esc), &mut state);
        assert_eq!(state, AppState::QuizQuitConfirm);
    }

    #[test]
    fn test_flashcard_keys() {
        let mut deck = FlashcardDeck::new(vec![
            Flashcard {
                term: "a".to_string(),
                definition: "A".to_string(),
            },
            Flashcard {
                term: "b".to_string(),
                definition: "B".to_string(),
            },
        ]);
        let mut state = AppState::Flashcards;
        handle_flashcard_input(&mut deck, key(KeyCode::Char(' ')), &mut state);
        assert_eq!(deck.visible_text(), Some("A"));
        handle_flashcard_input(&mut deck, key(KeyCode::Right), &mut state);
        assert_eq!(deck.visible_text(), Some("b"));
        handle_flashcard_input(&mut deck, key(KeyCode::Left), &mut state);
        handle_flashcard_input(&mut deck, key(KeyCode::Left), &mut state);
        assert_eq!(deck.visible_text(), Some("b"));
        handle_flashcard_input(&mut deck, key(KeyCode::Esc), &mut state);
        assert_eq!(state, AppState::QuizQuitConfirm);
    }
}
