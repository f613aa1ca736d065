use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use tutor_core::{AppViewModel, ChatMessage, LiveState, MessageBody, Role, StatusKind};

use super::constants::*;
use super::layout;

pub fn render(frame: &mut Frame, view: &AppViewModel) {
    let areas = layout::split(frame.area());
    render_status(frame, areas.status, view);
    render_chat(frame, areas.chat, view);
    render_input(frame, areas.input, view);
    render_footer(frame, areas.footer, view);
}

pub fn status_color(status: &StatusKind) -> ratatui::style::Color {
    match status {
        StatusKind::Online => COLOR_ONLINE,
        StatusKind::Busy => COLOR_BUSY,
        StatusKind::Offline => COLOR_OFFLINE,
        StatusKind::Unknown(_) => COLOR_UNKNOWN,
    }
}

fn render_status(frame: &mut Frame, area: Rect, view: &AppViewModel) {
    let mut spans = Vec::new();
    for row in &view.agents {
        if !spans.is_empty() {
            spans.push(Span::raw("  "));
        }
        let color = status_color(&row.status);
        spans.push(Span::styled("● ", Style::default().fg(color)));
        spans.push(Span::styled(row.name.clone(), Style::default().fg(color)));
        let detail = match &row.message {
            Some(message) => format!(" {} ({message})", row.status.label()),
            None => format!(" {}", row.status.label()),
        };
        spans.push(Span::styled(detail, Style::default().fg(COLOR_UNKNOWN)));
    }
    if spans.is_empty() {
        spans.push(Span::styled(NO_STATUS_YET, Style::default().fg(COLOR_UNKNOWN)));
    }

    let block = Block::default().borders(Borders::ALL).title(TITLE_AGENTS);
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_chat(frame: &mut Frame, area: Rect, view: &AppViewModel) {
    let lines: Vec<Line> = view.messages.iter().flat_map(message_lines).collect();
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });

    // Scroll counts wrapped rows, so measure at the inner width.
    let inner_width = area.width.saturating_sub(2);
    let visible = area.height.saturating_sub(2) as usize;
    let offset = paragraph.line_count(inner_width).saturating_sub(visible);
    let offset = u16::try_from(offset).unwrap_or(u16::MAX);

    let block = Block::default().borders(Borders::ALL).title(TITLE_CHAT);
    frame.render_widget(paragraph.block(block).scroll((offset, 0)), area);
}

fn message_lines(message: &ChatMessage) -> Vec<Line<'static>> {
    let style = match (&message.role, &message.body) {
        (_, MessageBody::Notice(_)) => Style::default().fg(COLOR_NOTICE),
        (Role::User, _) => Style::default().fg(COLOR_USER),
        (Role::Assistant, _) => Style::default().fg(COLOR_ASSISTANT),
        (Role::System, _) => Style::default().fg(COLOR_SYSTEM),
    };
    let time = message
        .timestamp
        .as_deref()
        .map(|ts| ts.get(11..19).unwrap_or(ts))
        .map(|ts| format!("[{ts}] "))
        .unwrap_or_default();
    let header = format!("{time}{}: ", message.sender);

    let text = body_text(&message.body);
    let mut lines = Vec::new();
    for (index, part) in text.split('\n').enumerate() {
        let lead = if index == 0 {
            Span::styled(header.clone(), style.add_modifier(Modifier::BOLD))
        } else {
            Span::raw(" ".repeat(header.chars().count()))
        };
        lines.push(Line::from(vec![lead, Span::styled(part.to_string(), style)]));
    }
    lines
}

pub fn body_text(body: &MessageBody) -> String {
    match body {
        MessageBody::Text(text) => text.clone(),
        MessageBody::File {
            name,
            bytes: Some(bytes),
        } => format!("[file] {name} ({bytes} bytes)"),
        MessageBody::File { name, bytes: None } => format!("[file] {name}"),
        MessageBody::Image { source, question } => {
            format!("[image: {}] {question}", source.describe())
        }
        MessageBody::Audio { path, transcript } => {
            format!("[audio: {}] {transcript}", path.display())
        }
        MessageBody::Notice(text) => format!("! {text}"),
    }
}

fn render_input(frame: &mut Frame, area: Rect, view: &AppViewModel) {
    let title = match &view.topic {
        Some(topic) => format!(" Ask {} about {topic} ", view.agent_label),
        None => format!(" Ask {} ", view.agent_label),
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let text = format!("{INPUT_PROMPT}{}", view.input);
    frame.render_widget(Paragraph::new(text).block(block), area);

    let typed = (INPUT_PROMPT.chars().count() + view.input.chars().count()) as u16;
    let max_x = area.right().saturating_sub(2);
    let x = area.x.saturating_add(1).saturating_add(typed).min(max_x);
    frame.set_cursor_position(Position::new(x, area.y + 1));
}

fn render_footer(frame: &mut Frame, area: Rect, view: &AppViewModel) {
    let (live, live_color) = match view.live {
        LiveState::Connecting => ("connecting", COLOR_BUSY),
        LiveState::Connected => ("live", COLOR_ONLINE),
        LiveState::Disconnected => ("offline", COLOR_OFFLINE),
    };
    let mut spans = vec![
        Span::styled(live, Style::default().fg(live_color)),
        Span::raw(format!(" | {} | agent: {}", view.student_id, view.selected_agent)),
        Span::raw(format!(
            " | topic: {}",
            view.topic.as_deref().unwrap_or("none")
        )),
    ];
    if view.pending_requests > 0 {
        spans.push(Span::raw(format!(" | pending: {}", view.pending_requests)));
    }
    match &view.last_error {
        Some(error) => spans.push(Span::styled(
            format!(" | {error}"),
            Style::default().fg(COLOR_NOTICE),
        )),
        None => spans.push(Span::styled(
            format!(" | {KEY_HINT}"),
            Style::default().fg(COLOR_SYSTEM),
        )),
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
