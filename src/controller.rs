use crate::ai::Sources;
use crate::ai_worker::spawn_ai_worker;
use crate::error::SessionError;
use crate::explanations::{ExplanationCache, ExplanationState};
use crate::models::{AiRequest, AiResponse, Question, SessionEvent};
use crate::scoring::{percentage, Banding, Tier};
use crate::session::{AnswerOutcome, Phase, QuizSession, TickOutcome, TimeLimit, Transition};
use crate::timer::QuestionTimer;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// One review line of a finished quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRow<'a> {
    pub index: usize,
    pub question: &'a Question,
    pub outcome: Option<&'a AnswerOutcome>,
    pub explanation: ExplanationState<'a>,
}

/// Snapshot of everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView<'a> {
    pub phase: Phase,
    pub question: Option<&'a Question>,
    pub index: usize,
    pub total: usize,
    pub time_limit: TimeLimit,
    pub time_remaining: Option<u32>,
    pub score: usize,
    pub percentage: Option<f64>,
    pub tier: Option<Tier>,
    pub review: Vec<ReviewRow<'a>>,
}

/// Owns a quiz session and everything with a lifetime tied to it: the
/// countdown task, the explanation cache and the fetch worker.
///
/// Fetches are tagged with the load generation current when they were issued.
/// Regenerating bumps the generation, so answers for the previous question set
/// are discarded. After `shutdown` nothing mutates the session any more.
pub struct QuizController {
    context: String,
    session: QuizSession,
    explanations: ExplanationCache,
    banding: Banding,
    timer: QuestionTimer,
    generation: u64,
    requests: mpsc::UnboundedSender<AiRequest>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    worker: JoinHandle<()>,
    closed: bool,
}

impl QuizController {
    /// Must be called inside a tokio runtime.
    pub fn new(
        context: impl Into<String>,
        sources: Sources,
        time_limit: TimeLimit,
        banding: Banding,
    ) -> Self {
        let (event_tx, events) = mpsc::unbounded_channel();
        let (requests, request_rx) = mpsc::unbounded_channel();
        let worker = spawn_ai_worker(sources, request_rx, event_tx.clone());

        Self {
            context: context.into(),
            session: QuizSession::new(time_limit),
            explanations: ExplanationCache::new(),
            banding,
            timer: QuestionTimer::new(event_tx),
            generation: 0,
            requests,
            events,
            worker,
            closed: false,
        }
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn explanations(&self) -> &ExplanationCache {
        &self.explanations
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn timer_armed_epoch(&self) -> Option<u64> {
        self.timer.armed_epoch()
    }

    /// Issue the first load for the context.
    pub fn start(&mut self) {
        if self.closed {
            return;
        }
        self.generation += 1;
        self.request_quiz();
    }

    pub fn submit_answer(&mut self, answer: &str) -> Result<Transition, SessionError> {
        self.ensure_open()?;
        let result = self.session.submit_answer(answer);
        self.sync_timer();
        result
    }

    pub fn retry(&mut self) -> Result<Transition, SessionError> {
        self.ensure_open()?;
        let transition = self.session.retry()?;
        self.sync_timer();
        log::info!("Quiz restarted with the same questions");
        Ok(transition)
    }

    pub fn regenerate(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.session.regenerate()?;
        self.explanations.clear();
        self.generation += 1;
        self.sync_timer();
        log::info!("Regenerating quiz (generation {})", self.generation);
        self.request_quiz();
        Ok(())
    }

    pub fn request_explanation(&mut self, index: usize) -> Result<(), SessionError> {
        self.ensure_open()?;
        if self.session.phase() != Phase::Completed {
            return Err(SessionError::NotCompleted);
        }
        let question = self
            .session
            .questions()
            .get(index)
            .ok_or(SessionError::NoSuchQuestion(index))?;

        self.explanations.begin(index)?;

        let request = AiRequest::Explain {
            generation: self.generation,
            question_index: index,
            question: question.text.clone(),
            correct_answer: question.correct_answer.clone(),
        };
        if self.requests.send(request).is_err() {
            log::error!("Worker is gone, explanation for question {} lost", index + 1);
            self.explanations
                .resolve(index, Err("worker unavailable".to_string().into()));
        }
        Ok(())
    }

    /// Wait for the next timer tick or worker response.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        if self.closed {
            return None;
        }
        self.events.recv().await
    }

    pub fn handle_event(&mut self, event: SessionEvent) {
        if self.closed {
            log::debug!("Dropping event for closed session: {:?}", event);
            return;
        }

        match event {
            SessionEvent::Tick { epoch } => {
                if let TickOutcome::Expired(transition) = self.session.tick(epoch) {
                    log::info!("Time ran out, {:?}", transition);
                }
            }
            SessionEvent::Worker(AiResponse::QuizLoaded {
                generation,
                questions,
            }) => {
                if generation != self.generation {
                    log::debug!("Dropping stale quiz load (generation {})", generation);
                    return;
                }
                self.session.load(questions);
            }
            SessionEvent::Worker(AiResponse::Explanation {
                generation,
                question_index,
                result,
            }) => {
                if generation != self.generation {
                    log::debug!(
                        "Dropping stale explanation for question {}",
                        question_index + 1
                    );
                    return;
                }
                self.explanations.resolve(question_index, result);
            }
        }
        self.sync_timer();
    }

    /// Stop the countdown and the worker. In-flight fetches may still finish
    /// but their results are never applied.
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.timer.cancel();
        self.worker.abort();
        self.events.close();
        log::info!("Quiz session closed");
    }

    pub fn view(&self) -> SessionView<'_> {
        let total = self.session.questions().len();
        let completed = self.session.phase() == Phase::Completed;
        let score_pct = if completed {
            percentage(self.session.score(), total)
        } else {
            None
        };

        let review = if completed {
            self.session
                .questions()
                .iter()
                .enumerate()
                .map(|(index, question)| ReviewRow {
                    index,
                    question,
                    outcome: self.session.answers().get(index),
                    explanation: self.explanations.state(index),
                })
                .collect()
        } else {
            Vec::new()
        };

        SessionView {
            phase: self.session.phase(),
            question: self.session.current_question(),
            index: self.session.current_index(),
            total,
            time_limit: self.session.time_limit(),
            time_remaining: self.session.time_remaining(),
            score: self.session.score(),
            percentage: score_pct,
            tier: score_pct.map(|p| self.banding.tier(p)),
            review,
        }
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.closed {
            Err(SessionError::Closed)
        } else {
            Ok(())
        }
    }

    fn request_quiz(&mut self) {
        let request = AiRequest::LoadQuiz {
            generation: self.generation,
            context: self.context.clone(),
        };
        if self.requests.send(request).is_err() {
            log::error!("Worker is gone, quiz cannot be loaded");
            self.session.load(Vec::new());
        }
    }

    /// Keep exactly one countdown for the active question, or none.
    fn sync_timer(&mut self) {
        if self.session.is_timed() {
            let epoch = self.session.epoch();
            if self.timer.armed_epoch() != Some(epoch) {
                self.timer.arm(epoch);
            }
        } else if self.timer.is_armed() {
            self.timer.cancel();
        }
    }
}

impl Drop for QuizController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
