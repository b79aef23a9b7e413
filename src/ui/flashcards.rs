use crate::flashcards::FlashcardDeck;
use crate::ui::layout::{calculate_flashcard_chunks, centered_rect};
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

/// `None` means the deck is still being fetched.
pub fn draw_flashcards(f: &mut Frame, deck: Option<&FlashcardDeck>) {
    let Some(deck) = deck else {
        let area = centered_rect(60, 20, f.area());
        let loading = Paragraph::new("Generating flashcards...")
            .style(Style::default().fg(Color::Cyan))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Flashcards"));
        f.render_widget(loading, area);
        return;
    };

    let layout = calculate_flashcard_chunks(f.area());

    let header = Paragraph::new("Flashcards")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, layout.header_area);

    let progress = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(deck.progress_ratio())
        .label(deck.progress_label());
    f.render_widget(progress, layout.progress_area);

    let (title, body, color) = match deck.visible_text() {
        None => ("Flashcards", "No flashcards available.", Color::Yellow),
        Some(text) if deck.is_flipped() => ("Definition", text, Color::Green),
        Some(text) => ("Term", text, Color::White),
    };
    let card = Paragraph::new(body)
        .style(Style::default().fg(color))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(card, layout.card_area);

    let key = |k: &'static str| {
        Span::styled(
            k,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
    };
    let help = Paragraph::new(Line::from(vec![
        key("Space"),
        Span::from(" Flip  "),
        key("←/→"),
        Span::from(" Previous/Next  "),
        key("Esc"),
        Span::from(" Quit"),
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, layout.help_area);
}
