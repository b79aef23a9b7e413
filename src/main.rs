use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use quiz_room::app::{self, Mode};
use quiz_room::{logger, Config};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

fn invalid_input(message: impl ToString) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message.to_string())
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = app::parse_args(std::env::args().skip(1)).map_err(invalid_input)?;
    let config = Config::from_env().map_err(invalid_input)?;
    logger::init(&config.log_file, config.log_level)?;

    let context = std::fs::read_to_string(&args.context_path)?;
    if context.trim().is_empty() {
        return Err(invalid_input(format!(
            "{} is empty",
            args.context_path.display()
        )));
    }
    let clients = app::build_sources(&config).map_err(invalid_input)?;
    log::info!(
        "Starting {:?} session from {}",
        args.mode,
        args.context_path.display()
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = match args.mode {
        Mode::Quiz => app::run_quiz(&mut terminal, context, clients.quiz, &config).await,
        Mode::Flashcards => app::run_flashcards(&mut terminal, context, clients.flashcards).await,
        Mode::Assistant => app::run_assistant(&mut terminal, context, clients.assistant).await,
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        log::error!("Session ended with error: {}", e);
    }
    log::logger().flush();
    result
}
