use crate::assistant::{AssistantChat, ChatRole};
use crate::ui::layout::calculate_assistant_chunks;
use crate::utils::wrap_text;
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

fn message_lines(chat: &AssistantChat, width: usize) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    for msg in chat.messages() {
        let (label, color) = match msg.role {
            ChatRole::User => ("You:", Color::Cyan),
            ChatRole::Assistant => ("AI:", Color::Green),
        };
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        for line in wrap_text(&msg.content, width.saturating_sub(2)) {
            lines.push(Line::from(format!("  {}", line)));
        }
        lines.push(Line::from(""));
    }

    if chat.is_pending() {
        lines.push(Line::from(Span::styled(
            "Assistant is thinking...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "Ask anything about the material you loaded.",
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines
}

/// Clamps `chat.scroll_from_bottom` to the rendered conversation.
pub fn draw_assistant(f: &mut Frame, chat: &mut AssistantChat) {
    let layout = calculate_assistant_chunks(f.area());

    let header = Paragraph::new("Let's discuss the uploaded file")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, layout.header_area);

    // Lines are pre-wrapped so the scroll range is exact.
    let width = layout.messages_area.width.saturating_sub(2) as usize;
    let lines = message_lines(chat, width);
    let visible = layout.messages_area.height.saturating_sub(2) as usize;
    let max_scroll = lines.len().saturating_sub(visible) as u16;
    chat.scroll_from_bottom = chat.scroll_from_bottom.min(max_scroll);
    let scroll = max_scroll - chat.scroll_from_bottom;

    let messages = Paragraph::new(Text::from(lines))
        .scroll((scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Assistant ")
                .border_style(Style::default().fg(Color::Cyan)),
        );
    f.render_widget(messages, layout.messages_area);

    let input_text = if chat.input_buffer.is_empty() {
        Text::from(Span::styled(
            "Ask me anything about this topic...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Text::from(chat.input_buffer.as_str())
    };
    let input = Paragraph::new(input_text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Message ")
            .border_style(if chat.is_pending() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Yellow)
            }),
    );
    f.render_widget(input, layout.input_area);

    if !chat.is_pending() {
        let before = &chat.input_buffer[..chat.cursor_position.min(chat.input_buffer.len())];
        let max_col = layout.input_area.width.saturating_sub(3);
        let cursor_x = layout.input_area.x + 1 + (before.width() as u16).min(max_col);
        f.set_cursor_position((cursor_x, layout.input_area.y + 1));
    }

    let key = |k: &'static str| {
        Span::styled(
            k,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
    };
    let help = Paragraph::new(Line::from(vec![
        key("Enter"),
        Span::from(" Send  "),
        key("↑/↓"),
        Span::from(" Scroll  "),
        key("Esc"),
        Span::from(" Quit"),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(help, layout.help_area);
}
