use crate::error::SourceError;
use serde::{Deserialize, Deserializer, Serialize};

/// Which answer affordance a question expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    #[serde(alias = "mcq")]
    MultipleChoice,
    TrueFalse,
    #[serde(alias = "fill_in_the_blank")]
    FillInBlank,
    /// Anything the source sent that we do not recognise. Answered with free text.
    #[default]
    #[serde(other)]
    Unknown,
}

impl QuestionKind {
    pub fn takes_free_text(self) -> bool {
        matches!(self, QuestionKind::FillInBlank | QuestionKind::Unknown)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question", default, deserialize_with = "lenient_string")]
    pub text: String,
    #[serde(rename = "type", default, deserialize_with = "lenient_kind")]
    pub kind: QuestionKind,
    #[serde(
        default,
        alias = "options",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_choices"
    )]
    pub choices: Option<Vec<String>>,
    #[serde(rename = "correctAnswer", default, deserialize_with = "lenient_string")]
    pub correct_answer: String,
}

impl Question {
    /// Choices offered to the user. True/false questions get a fixed pair,
    /// free-text questions and malformed multiple-choice ones get none.
    pub fn answer_options(&self) -> Vec<String> {
        match self.kind {
            QuestionKind::MultipleChoice => self.choices.clone().unwrap_or_default(),
            QuestionKind::TrueFalse => vec!["true".to_string(), "false".to_string()],
            QuestionKind::FillInBlank | QuestionKind::Unknown => Vec::new(),
        }
    }

    /// Answered by typing. Also true for a multiple-choice question that
    /// arrived without choices, so it can still be answered.
    pub fn takes_free_text(&self) -> bool {
        self.kind.takes_free_text() || self.answer_options().is_empty()
    }
}

fn scalar_to_string(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Sources disagree on whether `correctAnswer` is `"true"` or `true`, and
/// sometimes send `null` text.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(scalar_to_string(value).unwrap_or_default())
}

/// A missing, `null` or non-string type becomes `Unknown`.
fn lenient_kind<'de, D>(deserializer: D) -> Result<QuestionKind, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Numbers and bools are stringified, nulls dropped. A non-array is no choices.
fn lenient_choices<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => {
            Some(items.into_iter().filter_map(scalar_to_string).collect())
        }
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub definition: String,
}

#[derive(Debug)]
pub enum AiRequest {
    LoadQuiz {
        generation: u64,
        context: String,
    },
    Explain {
        generation: u64,
        question_index: usize,
        question: String,
        correct_answer: String,
    },
}

#[derive(Debug)]
pub enum AiResponse {
    QuizLoaded {
        generation: u64,
        questions: Vec<Question>,
    },
    Explanation {
        generation: u64,
        question_index: usize,
        result: Result<String, SourceError>,
    },
}

/// Everything that can wake the quiz controller besides user input.
#[derive(Debug)]
pub enum SessionEvent {
    Tick { epoch: u64 },
    Worker(AiResponse),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Quiz,
    QuizQuitConfirm,
    Flashcards,
    Assistant,
}

/// Presentation-side input state for the quiz screen. Reset whenever the
/// active question changes.
#[derive(Debug, Default, Clone)]
pub struct QuizScreen {
    pub input_buffer: String,
    pub cursor_position: usize,
    pub selected_choice: usize,
    pub selected_review_row: usize,
    pub last_error: Option<String>,
    pub shown_epoch: u64,
}

impl QuizScreen {
    pub fn reset_input(&mut self) {
        self.input_buffer.clear();
        self.cursor_position = 0;
        self.selected_choice = 0;
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mcq_question() {
        let json = r#"{"question":"Q","type":"mcq","choices":["a","b"],"correctAnswer":"a"}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.text, "Q");
        assert_eq!(q.kind, QuestionKind::MultipleChoice);
        assert_eq!(q.choices, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(q.correct_answer, "a");
    }

    #[test]
    fn test_parse_bool_correct_answer() {
        let json = r#"{"question":"Sky is blue","type":"true_false","correctAnswer":true}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.kind, QuestionKind::TrueFalse);
        assert_eq!(q.correct_answer, "true");
        assert_eq!(q.answer_options(), vec!["true", "false"]);
    }

    #[test]
    fn test_fill_in_the_blank_alias() {
        let json = r#"{"question":"Capital of France is ___","type":"fill_in_the_blank","correctAnswer":"Paris"}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.kind, QuestionKind::FillInBlank);
        assert!(q.kind.takes_free_text());
        assert!(q.answer_options().is_empty());
    }

    #[test]
    fn test_options_alias_for_choices() {
        let json = r#"{"question":"Q","type":"multiple_choice","options":["x","y","z"],"correctAnswer":"y"}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.answer_options().len(), 3);
    }

    #[test]
    fn test_missing_fields_degrade() {
        let q: Question = serde_json::from_str(r#"{"type":"essay"}"#).unwrap();
        assert_eq!(q.kind, QuestionKind::Unknown);
        assert!(q.text.is_empty());
        assert!(q.correct_answer.is_empty());
        assert!(q.choices.is_none());
    }

    #[test]
    fn test_mcq_without_choices_offers_nothing() {
        let q: Question = serde_json::from_str(r#"{"question":"Q","type":"mcq","correctAnswer":"a"}"#).unwrap();
        assert!(q.answer_options().is_empty());
    }

    #[test]
    fn test_numeric_choices_and_null_text_degrade() {
        let json = r#"[
            {"question":"2+2?","type":"mcq","choices":[3,4,null,5],"correctAnswer":4},
            {"question":null,"type":"true_false","correctAnswer":true},
            {"question":"Q","type":null,"options":"a or b","correctAnswer":null}
        ]"#;
        let raw: serde_json::Value = serde_json::from_str(json).unwrap();
        let questions: Vec<Question> = crate::ai::unwrap_records(&raw, "quiz");
        assert_eq!(questions.len(), 3);

        assert_eq!(questions[0].answer_options(), vec!["3", "4", "5"]);
        assert_eq!(questions[0].correct_answer, "4");
        assert!(!questions[0].takes_free_text());

        assert!(questions[1].text.is_empty());
        assert_eq!(questions[1].correct_answer, "true");

        assert_eq!(questions[2].kind, QuestionKind::Unknown);
        assert!(questions[2].choices.is_none());
        assert!(questions[2].correct_answer.is_empty());
    }

    #[test]
    fn test_mcq_without_choices_takes_free_text() {
        let q: Question =
            serde_json::from_str(r#"{"question":"Q","type":"mcq","choices":[],"correctAnswer":"a"}"#)
                .unwrap();
        assert_eq!(q.kind, QuestionKind::MultipleChoice);
        assert!(q.takes_free_text());
    }

    #[test]
    fn test_reset_input_keeps_review_selection() {
        let mut screen = QuizScreen {
            input_buffer: "abc".to_string(),
            cursor_position: 3,
            selected_choice: 2,
            selected_review_row: 4,
            last_error: Some("answer is empty".to_string()),
            shown_epoch: 1,
        };
        screen.reset_input();
        assert!(screen.input_buffer.is_empty());
        assert_eq!(screen.cursor_position, 0);
        assert_eq!(screen.selected_choice, 0);
        assert_eq!(screen.selected_review_row, 4);
        assert!(screen.last_error.is_none());
    }
}
