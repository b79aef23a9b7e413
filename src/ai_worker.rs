use crate::ai::Sources;
use crate::models::{AiRequest, AiResponse, SessionEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Serve quiz and explanation requests until the request channel closes.
///
/// Every request runs in its own task so explanations for different review
/// rows proceed concurrently. Responses sent after the session went away are
/// dropped.
pub fn spawn_ai_worker(
    sources: Sources,
    mut requests: mpsc::UnboundedReceiver<AiRequest>,
    events: mpsc::UnboundedSender<SessionEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(request) = requests.recv().await {
            let sources = sources.clone();
            let events = events.clone();
            tokio::spawn(async move {
                let response = serve(&sources, request).await;
                if events.send(SessionEvent::Worker(response)).is_err() {
                    log::debug!("Worker response dropped, session is gone");
                }
            });
        }
        log::debug!("Worker channel disconnected, exiting");
    })
}

async fn serve(sources: &Sources, request: AiRequest) -> AiResponse {
    match request {
        AiRequest::LoadQuiz {
            generation,
            context,
        } => {
            log::info!("Worker loading quiz (generation {})", generation);
            let questions = match sources.quiz.fetch_quiz(&context).await {
                Ok(questions) => questions,
                Err(e) => {
                    log::error!("Quiz fetch failed: {}", e);
                    Vec::new()
                }
            };
            AiResponse::QuizLoaded {
                generation,
                questions,
            }
        }
        AiRequest::Explain {
            generation,
            question_index,
            question,
            correct_answer,
        } => {
            log::info!("Worker explaining question {}", question_index + 1);
            let result = sources
                .explanations
                .explain(&question, &correct_answer)
                .await;
            AiResponse::Explanation {
                generation,
                question_index,
                result,
            }
        }
    }
}
