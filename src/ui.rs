use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use invoice_chat::state::ChatRole;

use crate::app::{App, FocusPane, InputMode, Screen};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Login => render_login_screen(app, frame, body_area),
        Screen::Chat => render_chat_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let customer_indicator = if app.session.is_authenticated() {
        vec![
            Span::styled("● ", Style::default().fg(Color::Green)),
            Span::styled(
                app.session.customer_name().to_string(),
                Style::default().fg(Color::White),
            ),
            Span::raw(" "),
        ]
    } else {
        Vec::new()
    };

    let mut title = vec![Span::styled(
        " Invoice Assistant ",
        Style::default().fg(Color::Cyan).bold(),
    )];
    title.extend(customer_indicator);
    title.push(Span::styled(
        format!("v{}", env!("CARGO_PKG_VERSION")),
        Style::default().fg(Color::Gray),
    ));

    let header = Paragraph::new(Line::from(title)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.screen {
        Screen::Login => " LOGIN ",
        Screen::Chat => " CHAT ",
    };

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match (app.screen, app.input_mode) {
        (Screen::Login, _) => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" start chat ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" quit ", label_style),
        ],
        (Screen::Chat, InputMode::Editing) => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Tab ", key_style),
            Span::styled(" suggestions ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" done ", label_style),
        ],
        (Screen::Chat, InputMode::Normal) => {
            let mut hints = vec![
                Span::styled(" Tab ", key_style),
                Span::styled(" focus ", label_style),
                Span::styled(" j/k ", key_style),
            ];
            match app.focus {
                FocusPane::Suggestions => {
                    hints.push(Span::styled(" pick ", label_style));
                    hints.push(Span::styled(" Enter ", key_style));
                    hints.push(Span::styled(" use ", label_style));
                }
                _ => {
                    hints.push(Span::styled(" scroll ", label_style));
                }
            }
            hints.extend(vec![
                Span::styled(" i ", key_style),
                Span::styled(" compose ", label_style),
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ]);
            hints
        }
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    spans.extend(hints);

    let footer = Paragraph::new(Line::from(spans));
    frame.render_widget(footer, area);
}

fn render_login_screen(app: &App, frame: &mut Frame, area: Rect) {
    // Centered card, like a login form
    let card_width = 44.min(area.width.saturating_sub(4));
    let card_height = 7;

    let card_x = area.x + (area.width.saturating_sub(card_width)) / 2;
    let card_y = area.y + (area.height.saturating_sub(card_height)) / 2;

    let card_area = Rect::new(card_x, card_y, card_width, card_height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Invoice Assistant ");

    let inner = block.inner(card_area);
    frame.render_widget(block, card_area);

    let prompt = Paragraph::new("Enter your name to start chatting.")
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(prompt, Rect::new(inner.x, inner.y, inner.width, 1));

    // Name field
    let input_area = Rect::new(inner.x, inner.y + 2, inner.width, 1);
    let input = Paragraph::new(app.name_input.as_str()).style(Style::default().fg(Color::Cyan));
    frame.render_widget(input, input_area);

    // Status line: connection progress or the last failure notice
    let status_area = Rect::new(inner.x, inner.y + 4, inner.width, 1);
    if app.session.is_authenticating() {
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        let status = Paragraph::new(format!("Connecting{}", dots))
            .style(Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC));
        frame.render_widget(status, status_area);
    } else if let Some(notice) = app.conversation.messages().last() {
        let status =
            Paragraph::new(notice.content.as_str()).style(Style::default().fg(Color::Red));
        frame.render_widget(status, status_area);
    }

    // Cursor in the name field while the form accepts input
    if !app.session.is_authenticating() {
        let cursor_x = app.name_cursor.min(input_area.width as usize) as u16;
        frame.set_cursor_position((input_area.x + cursor_x, input_area.y));
    }
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    // Suggestion chips collapse entirely when the set is empty
    let suggestions_height = if app.conversation.suggestions().is_empty() {
        0
    } else {
        (app.conversation.suggestions().len().min(4) + 2) as u16
    };

    let [log_area, suggestions_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(suggestions_height),
        Constraint::Length(3),
    ])
    .areas(area);

    // Store log dimensions for scroll calculations (inner size minus borders)
    app.chat_height = log_area.height.saturating_sub(2);
    app.chat_width = log_area.width.saturating_sub(2);

    render_log(app, frame, log_area);

    if suggestions_height > 0 {
        render_suggestions(app, frame, suggestions_area);
    }

    render_input(app, frame, input_area);
}

fn render_log(app: &App, frame: &mut Frame, area: Rect) {
    let log_focused = app.focus == FocusPane::History;
    let border_color = if log_focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Conversation ");

    let mut lines: Vec<Line> = Vec::new();

    for msg in app.conversation.messages() {
        match msg.role {
            ChatRole::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
            }
            ChatRole::Assistant => {
                lines.push(Line::from(Span::styled(
                    "Assistant:",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
            }
        }
        for line in msg.content.lines() {
            lines.push(Line::from(line.to_string()));
        }
        lines.push(Line::default());
    }

    if app.conversation.in_flight() {
        lines.push(Line::from(Span::styled(
            "Assistant:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        )));
    }

    let log = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(log, area);
}

fn render_suggestions(app: &mut App, frame: &mut Frame, area: Rect) {
    let suggestions_focused = app.focus == FocusPane::Suggestions;
    let border_color = if suggestions_focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(
            " Suggestions ({}) ",
            app.conversation.suggestions().len()
        ));

    let items: Vec<ListItem> = app
        .conversation
        .suggestions()
        .iter()
        .map(|s| ListItem::new(format!(" {} ", s)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.suggestion_state);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let input_focused = app.focus == FocusPane::Input;
    let border_color = if input_focused && app.input_mode == InputMode::Editing {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let title = if app.conversation.in_flight() {
        " Message (waiting for reply) "
    } else {
        " Message "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scrolling keeps the cursor visible in a single-line field
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;

    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .conversation
        .input()
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);

    frame.render_widget(input, area);

    if input_focused && app.input_mode == InputMode::Editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}
