use crate::ai::{
    AssistantSource, BackendClient, ExplanationSource, FlashcardSource, ModelConfig,
    OpenRouterClient, QuizSource, Sources,
};
use crate::assistant::AssistantChat;
use crate::auth::{FileTokenStore, StaticToken, TokenProvider};
use crate::config::{Config, SourceKind};
use crate::controller::QuizController;
use crate::error::SourceError;
use crate::flashcards::FlashcardDeck;
use crate::input::{
    handle_assistant_input, handle_flashcard_input, handle_quiz_input, sync_screen,
};
use crate::models::{AppState, QuizScreen};
use crate::ui::{draw_assistant, draw_flashcards, draw_quit_confirmation, draw_quiz};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{backend::Backend, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub const USAGE: &str = "usage: quiz-room [quiz|flashcards|assistant] <context-file>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Quiz,
    Flashcards,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub mode: Mode,
    pub context_path: PathBuf,
}

/// Mode is optional and defaults to a quiz.
pub fn parse_args<I>(args: I) -> Result<Args, String>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();
    let (mode, rest) = match args.first().map(String::as_str) {
        Some("quiz") => (Mode::Quiz, &args[1..]),
        Some("flashcards") => (Mode::Flashcards, &args[1..]),
        Some("assistant") => (Mode::Assistant, &args[1..]),
        _ => (Mode::Quiz, &args[..]),
    };

    match rest {
        [path] => Ok(Args {
            mode,
            context_path: PathBuf::from(path),
        }),
        _ => Err(USAGE.to_string()),
    }
}

/// Everything the three modes talk to, backed by one client.
#[derive(Clone)]
pub struct Clients {
    pub quiz: Sources,
    pub flashcards: Arc<dyn FlashcardSource>,
    pub assistant: Arc<dyn AssistantSource>,
}

impl Clients {
    fn from_client<C>(client: Arc<C>) -> Self
    where
        C: QuizSource + ExplanationSource + FlashcardSource + AssistantSource + 'static,
    {
        let flashcards: Arc<dyn FlashcardSource> = client.clone();
        let assistant: Arc<dyn AssistantSource> = client.clone();
        Self {
            quiz: Sources::from_client(client),
            flashcards,
            assistant,
        }
    }
}

/// Build the clients for the configured backend.
pub fn build_sources(config: &Config) -> Result<Clients, SourceError> {
    match config.source {
        SourceKind::Backend => {
            let tokens: Arc<dyn TokenProvider> = match &config.token {
                Some(token) => Arc::new(StaticToken(token.clone())),
                None => Arc::new(FileTokenStore::new(config.token_file.clone())),
            };
            let client = Arc::new(BackendClient::new(&config.api_url, tokens)?);
            log::info!("Using study backend at {}", config.api_url);
            Ok(Clients::from_client(client))
        }
        SourceKind::OpenRouter => {
            let client = Arc::new(OpenRouterClient::new(ModelConfig {
                model: config.model.clone(),
                ..ModelConfig::default()
            })?);
            log::info!("Using OpenRouter model {}", config.model);
            Ok(Clients::from_client(client))
        }
    }
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// `Some(true)` leaves, `Some(false)` goes back.
fn quit_choice(key: &KeyEvent) -> Option<bool> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => Some(true),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(false),
        _ => None,
    }
}

pub async fn run_quiz<B: Backend>(
    terminal: &mut Terminal<B>,
    context: String,
    sources: Sources,
    config: &Config,
) -> io::Result<()> {
    let mut controller = QuizController::new(context, sources, config.time_limit, config.banding);
    controller.start();

    let mut screen = QuizScreen::default();
    let mut app_state = AppState::Quiz;
    let mut keys = EventStream::new();

    loop {
        sync_screen(&controller, &mut screen);
        terminal.draw(|f| {
            let view = controller.view();
            draw_quiz(f, &view, &screen);
            if app_state == AppState::QuizQuitConfirm {
                draw_quit_confirmation(f);
            }
        })?;

        tokio::select! {
            maybe_event = keys.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if is_ctrl_c(&key) {
                        break;
                    }
                    if app_state == AppState::QuizQuitConfirm {
                        match quit_choice(&key) {
                            Some(true) => break,
                            Some(false) => app_state = AppState::Quiz,
                            None => {}
                        }
                    } else {
                        handle_quiz_input(&mut controller, &mut screen, key, &mut app_state);
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    log::error!("Terminal event stream failed: {}", e);
                    controller.shutdown();
                    return Err(e);
                }
                None => break,
            },
            Some(event) = controller.next_event() => controller.handle_event(event),
            else => break,
        }
    }

    controller.shutdown();
    Ok(())
}

pub async fn run_flashcards<B: Backend>(
    terminal: &mut Terminal<B>,
    context: String,
    source: Arc<dyn FlashcardSource>,
) -> io::Result<()> {
    let mut deck: Option<FlashcardDeck> = None;
    let mut app_state = AppState::Flashcards;
    let mut keys = EventStream::new();
    let mut fetch = Box::pin(async move { source.fetch_flashcards(&context).await });

    loop {
        terminal.draw(|f| {
            draw_flashcards(f, deck.as_ref());
            if app_state == AppState::QuizQuitConfirm {
                draw_quit_confirmation(f);
            }
        })?;

        tokio::select! {
            result = &mut fetch, if deck.is_none() => {
                let cards = result.unwrap_or_else(|e| {
                    log::error!("Failed to fetch flashcards: {}", e);
                    Vec::new()
                });
                log::info!("Loaded {} flashcards", cards.len());
                deck = Some(FlashcardDeck::new(cards));
            }
            maybe_event = keys.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if is_ctrl_c(&key) {
                        break;
                    }
                    if app_state == AppState::QuizQuitConfirm {
                        match quit_choice(&key) {
                            Some(true) => break,
                            Some(false) => app_state = AppState::Flashcards,
                            None => {}
                        }
                    } else if let Some(deck) = deck.as_mut() {
                        handle_flashcard_input(deck, key, &mut app_state);
                    } else if key.code == KeyCode::Esc {
                        app_state = AppState::QuizQuitConfirm;
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e),
                None => break,
            },
        }
    }

    Ok(())
}

pub async fn run_assistant<B: Backend>(
    terminal: &mut Terminal<B>,
    context: String,
    source: Arc<dyn AssistantSource>,
) -> io::Result<()> {
    let context: Arc<str> = Arc::from(context);
    let mut chat = AssistantChat::new();
    let mut app_state = AppState::Assistant;
    let mut keys = EventStream::new();
    let (reply_tx, mut replies) = mpsc::unbounded_channel::<Result<String, SourceError>>();
    let mut in_flight: Option<JoinHandle<()>> = None;

    let result = loop {
        terminal.draw(|f| {
            draw_assistant(f, &mut chat);
            if app_state == AppState::QuizQuitConfirm {
                draw_quit_confirmation(f);
            }
        })?;

        tokio::select! {
            Some(reply) = replies.recv() => {
                chat.resolve(reply);
                in_flight = None;
            }
            maybe_event = keys.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if is_ctrl_c(&key) {
                        break Ok(());
                    }
                    if app_state == AppState::QuizQuitConfirm {
                        match quit_choice(&key) {
                            Some(true) => break Ok(()),
                            Some(false) => app_state = AppState::Assistant,
                            None => {}
                        }
                    } else if let Some(query) = handle_assistant_input(&mut chat, key, &mut app_state) {
                        log::info!("Asking assistant: {}", query);
                        let source = source.clone();
                        let context = context.clone();
                        let tx = reply_tx.clone();
                        in_flight = Some(tokio::spawn(async move {
                            let _ = tx.send(source.ask(&query, &context).await);
                        }));
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => break Err(e),
                None => break Ok(()),
            },
        }
    };

    if let Some(task) = in_flight {
        task.abort();
    }
    result
}
