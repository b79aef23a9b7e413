use crate::controller::SessionView;
use crate::models::{Question, QuizScreen};
use crate::session::{Phase, TimeLimit};
use crate::ui::layout::{calculate_quiz_chunks, centered_rect};
use crate::utils::format_countdown;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

fn key_span(key: &str) -> Span<'_> {
    Span::styled(
        key,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
}

pub fn draw_quiz(f: &mut Frame, view: &SessionView, screen: &QuizScreen) {
    match view.phase {
        Phase::Loading => draw_status(f, "Generating questions...", Color::Cyan),
        Phase::Unavailable => draw_status(f, "No questions available.", Color::Yellow),
        Phase::InProgress => draw_question(f, view, screen),
        Phase::Completed => super::summary::draw_summary(f, view, screen),
    }
}

fn draw_status(f: &mut Frame, message: &str, color: Color) {
    let area = centered_rect(60, 20, f.area());
    let status = Paragraph::new(message)
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Quiz"));
    f.render_widget(status, area);
}

fn draw_question(f: &mut Frame, view: &SessionView, screen: &QuizScreen) {
    let Some(question) = view.question else {
        return;
    };
    let layout = calculate_quiz_chunks(f.area());

    let progress = format!("Question {} / {}", view.index + 1, view.total);
    let header = Paragraph::new(progress)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, layout.header_area);

    draw_timer(f, view, layout.timer_area);

    let question_text = Paragraph::new(Text::from(question.text.as_str()))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Question"));
    f.render_widget(question_text, layout.question_area);

    if question.takes_free_text() {
        draw_text_input(f, screen, layout.answer_area);
    } else {
        draw_choices(f, question, screen, layout.answer_area);
    }

    let mut help_text = Vec::new();
    if let Some(error) = &screen.last_error {
        help_text.push(Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(Color::Red),
        )));
    }
    let mut spans = vec![key_span("Enter"), Span::from(" Submit  ")];
    if !question.takes_free_text() {
        spans.extend([key_span("↑/↓"), Span::from(" Select  ")]);
    }
    spans.extend([
        key_span("Esc"),
        Span::from(" Quit  "),
        key_span("Ctrl+C"),
        Span::from(" Exit App"),
    ]);
    help_text.push(Line::from(spans));

    let help = Paragraph::new(help_text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, layout.help_area);
}

fn draw_timer(f: &mut Frame, view: &SessionView, area: ratatui::layout::Rect) {
    let (TimeLimit::Seconds(limit), Some(remaining)) = (view.time_limit, view.time_remaining) else {
        let untimed = Paragraph::new("No time limit")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Time"));
        f.render_widget(untimed, area);
        return;
    };

    let ratio = if limit == 0 {
        0.0
    } else {
        (remaining as f64 / limit as f64).clamp(0.0, 1.0)
    };
    let color = if remaining <= 5 {
        Color::Red
    } else if remaining <= limit / 2 {
        Color::Yellow
    } else {
        Color::Green
    };

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Time"))
        .gauge_style(Style::default().fg(color))
        .ratio(ratio)
        .label(format_countdown(remaining));
    f.render_widget(gauge, area);
}

fn draw_choices(f: &mut Frame, question: &Question, screen: &QuizScreen, area: ratatui::layout::Rect) {
    let options = question.answer_options();
    let items: Vec<ListItem> = options
        .iter()
        .enumerate()
        .map(|(i, option)| ListItem::new(format!("{}. {}", i + 1, option)))
        .collect();

    let title = if options.len() == 2 && options[0] == "true" {
        "True or False (t / f)"
    } else {
        "Choices"
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !options.is_empty() {
        state.select(Some(screen.selected_choice.min(options.len() - 1)));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_text_input(f: &mut Frame, screen: &QuizScreen, area: ratatui::layout::Rect) {
    let content = if screen.input_buffer.is_empty() {
        Text::from(Span::styled(
            "[Type your answer here...]",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Text::from(screen.input_buffer.as_str())
    };

    let input = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL).title("Your Answer"));
    f.render_widget(input, area);

    // Single line input; column is the display width before the cursor.
    let before = &screen.input_buffer[..screen.cursor_position.min(screen.input_buffer.len())];
    let max_col = area.width.saturating_sub(3);
    let cursor_x = area.x + 1 + (before.width() as u16).min(max_col);
    f.set_cursor_position((cursor_x, area.y + 1));
}

pub fn draw_quit_confirmation(f: &mut Frame) {
    let area = centered_rect(70, 60, f.area());
    f.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
        ])
        .split(area);

    let title = Paragraph::new("Quit")
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let message = Paragraph::new("Leave this session? Progress is not saved.")
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(message, chunks[1]);

    let help_text = vec![Line::from(vec![
        Span::styled(
            "y",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::from(" Yes  "),
        Span::styled(
            "n",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::from(" No (Continue)  "),
        key_span("Ctrl+C"),
        Span::from(" Exit App"),
    ])];
    let help = Paragraph::new(help_text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}
