use crate::controller::{ReviewRow, SessionView};
use crate::explanations::ExplanationState;
use crate::models::QuizScreen;
use crate::scoring::Tier;
use crate::ui::layout::calculate_summary_chunks;
use crate::utils::{truncate_string, wrap_text};
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

pub fn tier_color(tier: Tier) -> Color {
    match tier {
        Tier::Positive => Color::Green,
        Tier::Encouraging => Color::Yellow,
        Tier::Supportive => Color::Red,
    }
}

pub fn draw_summary(f: &mut Frame, view: &SessionView, screen: &QuizScreen) {
    let layout = calculate_summary_chunks(f.area());

    let title = Paragraph::new("Quiz Results")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, layout.header_area);

    let percentage = view.percentage.unwrap_or(0.0);
    let color = view.tier.map(tier_color).unwrap_or(Color::White);
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Score"))
        .gauge_style(Style::default().fg(color))
        .ratio((percentage / 100.0).clamp(0.0, 1.0))
        .label(format!("{:.0}%", percentage));
    f.render_widget(gauge, layout.score_area);

    let mut message = Text::default();
    message.push_line(Line::from(Span::styled(
        format!("Your Score: {} / {}", view.score, view.total),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    if let Some(tier) = view.tier {
        message.push_line(Line::from(Span::styled(
            tier.message(),
            Style::default().fg(tier_color(tier)),
        )));
    }
    let message = Paragraph::new(message)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(message, layout.message_area);

    // Lines are wrapped here so the scroll offset counts rendered rows.
    let width = layout.review_area.width.saturating_sub(2) as usize;
    let mut review = Text::default();
    let mut selected_rows = 0..0;
    for row in &view.review {
        let start = review.lines.len();
        let selected = row.index == screen.selected_review_row;
        push_review_row(&mut review, row, selected, width);
        if selected {
            selected_rows = start..review.lines.len();
        }
    }

    // Show the whole selected row when it fits, otherwise its header.
    let visible = layout.review_area.height.saturating_sub(2) as usize;
    let scroll = if selected_rows.end > visible {
        selected_rows.start.min(selected_rows.end - visible)
    } else {
        0
    };

    let review = Paragraph::new(review)
        .scroll((scroll as u16, 0))
        .block(Block::default().borders(Borders::ALL).title("Review"));
    f.render_widget(review, layout.review_area);

    let mut help_text = Vec::new();
    if let Some(error) = &screen.last_error {
        help_text.push(Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(Color::Red),
        )));
    }
    let key = |k: &'static str| {
        Span::styled(
            k,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
    };
    help_text.push(Line::from(vec![
        key("↑/↓"),
        Span::from(" Select  "),
        key("e"),
        Span::from(" Explain  "),
        key("r"),
        Span::from(" Retry  "),
        key("g"),
        Span::from(" New Questions  "),
        key("Esc"),
        Span::from(" Quit"),
    ]));
    let help = Paragraph::new(help_text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, layout.footer_area);
}

fn push_review_row(text: &mut Text<'_>, row: &ReviewRow, selected: bool, width: usize) {
    let correct = row.outcome.map(|o| o.correct).unwrap_or(false);
    let (mark, mark_color) = if correct {
        ("[✓]", Color::Green)
    } else {
        ("[✗]", Color::Red)
    };

    let mut header_style = Style::default().add_modifier(Modifier::BOLD);
    if selected {
        header_style = header_style.fg(Color::Yellow);
    }
    text.push_line(Line::from(vec![
        Span::from(if selected { "> " } else { "  " }),
        Span::styled(mark, Style::default().fg(mark_color)),
        Span::styled(
            format!(
                " {}. {}",
                row.index + 1,
                truncate_string(&row.question.text, width.saturating_sub(12))
            ),
            header_style,
        ),
    ]));

    let plain = Style::default();
    push_indented(
        text,
        &format!("Correct answer: {}", row.question.correct_answer),
        width,
        plain,
    );

    let given = match row.outcome.and_then(|o| o.given.as_deref()) {
        Some(answer) => answer.to_string(),
        None => "(timed out)".to_string(),
    };
    push_indented(text, &format!("Your answer: {}", given), width, plain);

    match row.explanation {
        ExplanationState::NotRequested => {
            if selected {
                push_indented(
                    text,
                    "I don't understand? Press e for an explanation.",
                    width,
                    Style::default().fg(Color::DarkGray),
                );
            }
        }
        ExplanationState::Loading => {
            text.push_line(Line::from(Span::styled(
                "    Loading explanation...",
                Style::default().fg(Color::Cyan),
            )));
        }
        ExplanationState::Ready(explanation) => {
            text.push_line(Line::from(Span::styled(
                "    Explanation:",
                Style::default().add_modifier(Modifier::BOLD),
            )));
            push_indented(text, explanation, width, plain);
        }
    }
    text.push_line(Line::from(""));
}

fn push_indented(text: &mut Text<'_>, content: &str, width: usize, style: Style) {
    for line in wrap_text(content, width.saturating_sub(4)) {
        text.push_line(Line::from(Span::styled(format!("    {}", line), style)));
    }
}
