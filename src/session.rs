use crate::error::SessionError;
use crate::models::Question;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TIME_LIMIT_SECS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Loading,
    InProgress,
    Completed,
    /// The source returned nothing usable. Terminal and inert.
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeLimit {
    Unlimited,
    Seconds(u32),
}

impl Default for TimeLimit {
    fn default() -> Self {
        TimeLimit::Seconds(DEFAULT_TIME_LIMIT_SECS)
    }
}

impl TimeLimit {
    fn initial(self) -> Option<u32> {
        match self {
            TimeLimit::Unlimited => None,
            TimeLimit::Seconds(secs) => Some(secs),
        }
    }
}

/// How a single question was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    /// `None` when the countdown ran out.
    pub given: Option<String>,
    pub correct: bool,
}

/// What a successful action did to the active question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A new question is active.
    Advanced { index: usize },
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Tick did not belong to the active question, or nothing is timed.
    Ignored,
    Counting { remaining: u32 },
    Expired(Transition),
}

/// One run through a fixed list of questions.
///
/// Every method is a deterministic transition over owned data: no clock, no
/// I/O. The countdown only moves when the owner feeds it ticks, and each tick
/// names the `epoch` of the question it was armed for so a tick scheduled for
/// an earlier question can never touch the current one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSession {
    questions: Vec<Question>,
    current_index: usize,
    score: usize,
    time_limit: TimeLimit,
    time_remaining: Option<u32>,
    phase: Phase,
    answers: Vec<AnswerOutcome>,
    epoch: u64,
}

impl QuizSession {
    pub fn new(time_limit: TimeLimit) -> Self {
        Self {
            questions: Vec::new(),
            current_index: 0,
            score: 0,
            time_limit,
            time_remaining: None,
            phase: Phase::Loading,
            answers: Vec::new(),
            epoch: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn time_limit(&self) -> TimeLimit {
        self.time_limit
    }

    pub fn time_remaining(&self) -> Option<u32> {
        self.time_remaining
    }

    pub fn answers(&self) -> &[AnswerOutcome] {
        &self.answers
    }

    /// Identifies the active question activation. Changes whenever a
    /// different question (or the same one after a retry) becomes active.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            Phase::InProgress => self.questions.get(self.current_index),
            _ => None,
        }
    }

    /// Whether the active question wants a countdown running.
    pub fn is_timed(&self) -> bool {
        self.phase == Phase::InProgress && self.time_remaining.is_some()
    }

    /// Install the fetched question set. An empty set parks the session in
    /// `Unavailable`. Loads that arrive outside `Loading` are ignored.
    pub fn load(&mut self, questions: Vec<Question>) -> Phase {
        if self.phase != Phase::Loading {
            log::warn!("ignoring question set delivered in phase {:?}", self.phase);
            return self.phase;
        }

        if questions.is_empty() {
            log::info!("quiz source returned no questions");
            self.phase = Phase::Unavailable;
            return self.phase;
        }

        log::info!("loaded {} questions", questions.len());
        self.questions = questions;
        self.begin_run();
        self.phase
    }

    pub fn submit_answer(&mut self, answer: &str) -> Result<Transition, SessionError> {
        let question = self.current_question().ok_or(SessionError::NotInProgress)?;

        if question.takes_free_text() && answer.trim().is_empty() {
            return Err(SessionError::EmptyAnswer);
        }

        let correct = answers_match(answer, &question.correct_answer);
        Ok(self.advance(AnswerOutcome {
            given: Some(answer.to_string()),
            correct,
        }))
    }

    /// One second elapsed for the question activation identified by `epoch`.
    pub fn tick(&mut self, epoch: u64) -> TickOutcome {
        if epoch != self.epoch || self.phase != Phase::InProgress {
            return TickOutcome::Ignored;
        }

        let Some(remaining) = self.time_remaining else {
            return TickOutcome::Ignored;
        };

        let remaining = remaining.saturating_sub(1);
        if remaining > 0 {
            self.time_remaining = Some(remaining);
            return TickOutcome::Counting { remaining };
        }

        log::debug!("question {} timed out", self.current_index + 1);
        self.time_remaining = Some(0);
        TickOutcome::Expired(self.advance(AnswerOutcome {
            given: None,
            correct: false,
        }))
    }

    /// Run the same questions again from the start.
    pub fn retry(&mut self) -> Result<Transition, SessionError> {
        if self.phase != Phase::Completed {
            return Err(SessionError::NotCompleted);
        }

        self.begin_run();
        Ok(Transition::Advanced { index: 0 })
    }

    /// Drop the question set and wait for a fresh one.
    pub fn regenerate(&mut self) -> Result<(), SessionError> {
        if self.phase != Phase::Completed {
            return Err(SessionError::NotCompleted);
        }

        self.questions.clear();
        self.answers.clear();
        self.current_index = 0;
        self.score = 0;
        self.time_remaining = None;
        self.phase = Phase::Loading;
        self.epoch += 1;
        Ok(())
    }

    fn begin_run(&mut self) {
        self.current_index = 0;
        self.score = 0;
        self.answers.clear();
        self.phase = Phase::InProgress;
        self.activate_current();
    }

    fn activate_current(&mut self) {
        self.time_remaining = self.time_limit.initial();
        self.epoch += 1;
    }

    fn advance(&mut self, outcome: AnswerOutcome) -> Transition {
        if outcome.correct {
            self.score += 1;
        }
        self.answers.push(outcome);
        self.current_index += 1;

        if self.current_index == self.questions.len() {
            log::info!(
                "quiz completed with score {}/{}",
                self.score,
                self.questions.len()
            );
            self.phase = Phase::Completed;
            self.time_remaining = None;
            self.epoch += 1;
            Transition::Completed
        } else {
            self.activate_current();
            Transition::Advanced {
                index: self.current_index,
            }
        }
    }
}

/// Trimmed, case-insensitive equality.
pub fn answers_match(given: &str, correct: &str) -> bool {
    given.trim().to_lowercase() == correct.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionKind;

    fn question(kind: QuestionKind, correct: &str) -> Question {
        Question {
            text: format!("{:?} question", kind),
            kind,
            choices: match kind {
                QuestionKind::MultipleChoice => Some(vec![
                    "paris".to_string(),
                    "rome".to_string(),
                    "berlin".to_string(),
                ]),
                _ => None,
            },
            correct_answer: correct.to_string(),
        }
    }

    fn three_question_session() -> QuizSession {
        let mut session = QuizSession::new(TimeLimit::Seconds(30));
        session.load(vec![
            question(QuestionKind::MultipleChoice, "paris"),
            question(QuestionKind::TrueFalse, "true"),
            question(QuestionKind::FillInBlank, "mitochondria"),
        ]);
        session
    }

    fn expire_current(session: &mut QuizSession) -> Transition {
        let epoch = session.epoch();
        loop {
            match session.tick(epoch) {
                TickOutcome::Counting { .. } => continue,
                TickOutcome::Expired(transition) => return transition,
                TickOutcome::Ignored => panic!("tick unexpectedly ignored"),
            }
        }
    }

    #[test]
    fn test_new_session_is_loading() {
        let session = QuizSession::new(TimeLimit::default());
        assert_eq!(session.phase(), Phase::Loading);
        assert!(session.current_question().is_none());
        assert_eq!(session.time_limit(), TimeLimit::Seconds(30));
    }

    #[test]
    fn test_load_starts_first_question() {
        let session = three_question_session();
        assert_eq!(session.phase(), Phase::InProgress);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.time_remaining(), Some(30));
        assert_eq!(session.current_question().unwrap().correct_answer, "paris");
    }

    #[test]
    fn test_empty_load_is_unavailable() {
        let mut session = QuizSession::new(TimeLimit::default());
        assert_eq!(session.load(Vec::new()), Phase::Unavailable);
        assert!(session.current_question().is_none());
        assert_eq!(session.submit_answer("x"), Err(SessionError::NotInProgress));
        assert_eq!(session.tick(session.epoch()), TickOutcome::Ignored);
        assert_eq!(session.retry(), Err(SessionError::NotCompleted));
    }

    #[test]
    fn test_answer_comparison_trims_and_ignores_case() {
        assert!(answers_match("Paris ", "paris"));
        assert!(answers_match("  TRUE", "true"));
        assert!(!answers_match("Pari", "paris"));
    }

    #[test]
    fn test_correct_answer_scores_and_advances() {
        let mut session = three_question_session();
        let transition = session.submit_answer("Paris ").unwrap();
        assert_eq!(transition, Transition::Advanced { index: 1 });
        assert_eq!(session.score(), 1);
        assert_eq!(session.time_remaining(), Some(30));
    }

    #[test]
    fn test_wrong_answer_advances_without_score() {
        let mut session = three_question_session();
        session.submit_answer("rome").unwrap();
        assert_eq!(session.score(), 0);
        assert_eq!(session.current_index(), 1);
        assert!(!session.answers()[0].correct);
    }

    #[test]
    fn test_blank_fill_in_answer_is_rejected() {
        let mut session = three_question_session();
        session.submit_answer("paris").unwrap();
        session.submit_answer("true").unwrap();
        let before = session.clone();
        assert_eq!(session.submit_answer("   "), Err(SessionError::EmptyAnswer));
        assert_eq!(session, before);
    }

    #[test]
    fn test_blank_answer_to_choiceless_mcq_is_rejected() {
        let mut session = QuizSession::new(TimeLimit::Unlimited);
        let mut q = question(QuestionKind::MultipleChoice, "4");
        q.choices = None;
        session.load(vec![q]);
        assert_eq!(session.submit_answer(""), Err(SessionError::EmptyAnswer));
        assert_eq!(session.phase(), Phase::InProgress);
        session.submit_answer(" 4 ").unwrap();
        assert_eq!(session.phase(), Phase::Completed);
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn test_timeout_counts_as_wrong_answer() {
        let mut session = QuizSession::new(TimeLimit::Seconds(3));
        session.load(vec![
            question(QuestionKind::TrueFalse, "true"),
            question(QuestionKind::TrueFalse, "false"),
        ]);
        let epoch = session.epoch();
        assert_eq!(session.tick(epoch), TickOutcome::Counting { remaining: 2 });
        assert_eq!(session.tick(epoch), TickOutcome::Counting { remaining: 1 });
        assert_eq!(
            session.tick(epoch),
            TickOutcome::Expired(Transition::Advanced { index: 1 })
        );
        assert_eq!(session.score(), 0);
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.answers()[0].given, None);
        assert_eq!(session.time_remaining(), Some(3));
    }

    #[test]
    fn test_stale_tick_is_ignored() {
        let mut session = three_question_session();
        let first_epoch = session.epoch();
        session.submit_answer("paris").unwrap();
        assert_ne!(session.epoch(), first_epoch);
        assert_eq!(session.tick(first_epoch), TickOutcome::Ignored);
        assert_eq!(session.time_remaining(), Some(30));
    }

    #[test]
    fn test_unlimited_time_never_expires() {
        let mut session = QuizSession::new(TimeLimit::Unlimited);
        session.load(vec![question(QuestionKind::TrueFalse, "true")]);
        assert!(!session.is_timed());
        assert_eq!(session.time_remaining(), None);
        assert_eq!(session.tick(session.epoch()), TickOutcome::Ignored);
        assert_eq!(session.phase(), Phase::InProgress);
    }

    #[test]
    fn test_three_question_scenario() {
        let mut session = three_question_session();
        session.submit_answer("paris").unwrap();
        expire_current(&mut session);
        assert_eq!(session.submit_answer("ribosome").unwrap(), Transition::Completed);

        assert_eq!(session.phase(), Phase::Completed);
        assert_eq!(session.score(), 1);
        assert_eq!(session.current_index(), 3);
        assert!(session.current_question().is_none());
        assert!(!session.is_timed());
        let correct: Vec<bool> = session.answers().iter().map(|a| a.correct).collect();
        assert_eq!(correct, vec![true, false, false]);
    }

    #[test]
    fn test_score_never_exceeds_index() {
        let mut session = three_question_session();
        for answer in ["paris", "true", "mitochondria"] {
            session.submit_answer(answer).unwrap();
            assert!(session.score() <= session.current_index());
        }
        assert_eq!(session.score(), 3);
        assert_eq!(session.submit_answer("paris"), Err(SessionError::NotInProgress));
        assert_eq!(session.score(), 3);
    }

    #[test]
    fn test_retry_resets_progress_keeps_questions() {
        let mut session = three_question_session();
        let questions = session.questions().to_vec();
        for answer in ["paris", "false", "x"] {
            session.submit_answer(answer).unwrap();
        }
        let completed_epoch = session.epoch();

        assert_eq!(session.retry(), Ok(Transition::Advanced { index: 0 }));
        assert_eq!(session.phase(), Phase::InProgress);
        assert_eq!(session.score(), 0);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.questions(), questions.as_slice());
        assert!(session.answers().is_empty());
        assert_eq!(session.time_remaining(), Some(30));
        assert!(session.epoch() > completed_epoch);
    }

    #[test]
    fn test_retry_requires_completion() {
        let mut session = three_question_session();
        assert_eq!(session.retry(), Err(SessionError::NotCompleted));
    }

    #[test]
    fn test_regenerate_clears_and_reloads() {
        let mut session = three_question_session();
        for answer in ["paris", "true", "mitochondria"] {
            session.submit_answer(answer).unwrap();
        }
        session.regenerate().unwrap();
        assert_eq!(session.phase(), Phase::Loading);
        assert!(session.questions().is_empty());
        assert_eq!(session.score(), 0);

        session.load(vec![question(QuestionKind::TrueFalse, "false")]);
        assert_eq!(session.phase(), Phase::InProgress);
        assert_eq!(session.questions().len(), 1);
    }

    #[test]
    fn test_load_outside_loading_is_ignored() {
        let mut session = three_question_session();
        session.load(vec![question(QuestionKind::TrueFalse, "false")]);
        assert_eq!(session.questions().len(), 3);
    }

    #[test]
    fn test_session_serializes() {
        let session = three_question_session();
        let json = serde_json::to_string(&session).unwrap();
        let restored: QuizSession = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, session);
    }
}
