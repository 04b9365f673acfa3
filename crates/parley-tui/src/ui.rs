use parley_core::{ChatRole, SettingsSection};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, FocusPane, InputMode, SettingsFocus};

const SIDEBAR_WIDTH: u16 = 32;
const MAX_INPUT_LINES: usize = 5;

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

    if app.sidebar_collapsed {
        app.sidebar_area = None;
        render_chat(app, frame, body_area);
    } else {
        let [sidebar_area, chat_area] =
            Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)]).areas(body_area);
        render_sidebar(app, frame, sidebar_area);
        render_chat(app, frame, chat_area);
    }

    render_footer(app, frame, footer_area);

    // Render popups (in order of priority)
    if app.show_settings {
        render_settings(app, frame, area);
    } else if app.show_attach_prompt {
        render_attach_prompt(app, frame, area);
    }

    if app.notification.is_some() {
        render_notification(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Parley ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("  "),
        Span::styled(
            format!("[{}]", app.store.selected_model()),
            Style::default().fg(Color::Green),
        ),
    ]);

    frame.render_widget(Paragraph::new(title), area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" NORMAL ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" INSERT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
        InputMode::Searching => (" SEARCH ", Style::default().bg(Color::Magenta).fg(Color::White)),
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let pairs: Vec<(&str, &str)> = if app.show_settings {
        vec![
            ("j/k", "nav"),
            ("Tab", "pane"),
            ("h/l", "change"),
            ("p", "voice sample"),
            ("Esc", "close"),
        ]
    } else if app.show_attach_prompt {
        vec![("Enter", "attach"), ("Esc", "cancel")]
    } else {
        match app.input_mode {
            InputMode::Editing if app.chat.is_pending() => vec![("Esc", "normal")],
            InputMode::Editing => {
                let mut pairs = vec![("Alt+Enter", "newline"), ("Esc", "normal")];
                if app.chat.can_send() {
                    pairs.insert(0, ("Enter", "send"));
                }
                pairs
            }
            InputMode::Searching => vec![
                ("type", "filter"),
                ("Enter", "open"),
                ("Esc", "clear"),
            ],
            InputMode::Normal => {
                let mut pairs = match app.focus {
                    FocusPane::Sidebar => vec![("j/k", "nav"), ("Enter", "open"), ("d", "delete")],
                    FocusPane::Chat => vec![("j/k", "message"), ("c", "copy")],
                    FocusPane::Input => vec![("i", "type")],
                };
                if app.chat.can_regenerate(&app.store) {
                    pairs.push(("r", "regenerate"));
                }
                pairs.extend([
                    ("n", "new"),
                    ("/", "search"),
                    ("a", "attach"),
                    ("s", "settings"),
                    ("Tab", "focus"),
                    ("q", "quit"),
                ]);
                pairs
            }
        }
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    for (key, label) in pairs {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(format!(" {} ", label), label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_sidebar(app: &mut App, frame: &mut Frame, area: Rect) {
    app.sidebar_area = Some(area);

    let focused = app.focus == FocusPane::Sidebar;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let [search_area, list_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);

    // Search box
    let searching = app.input_mode == InputMode::Searching;
    let search_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if searching { Color::Yellow } else { border_color }));
    let search_text = if app.sidebar_search.is_empty() && !searching {
        Span::styled("Search chats...", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(app.sidebar_search.as_str())
    };
    frame.render_widget(Paragraph::new(search_text).block(search_block), search_area);
    if searching {
        let cursor_x = (app.sidebar_search.chars().count() as u16).min(search_area.width.saturating_sub(3));
        frame.set_cursor_position((search_area.x + cursor_x + 1, search_area.y + 1));
    }

    // Conversation list
    let active_id = app.store.active_conversation_id().map(str::to_owned);
    let items: Vec<ListItem> = app
        .visible_conversations()
        .iter()
        .map(|c| {
            let style = if Some(&c.id) == active_id.as_ref() {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!(" {} ", c.title)).style(style)
        })
        .collect();

    let list_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" Chats ({}) ", items.len()));

    if items.is_empty() {
        let message = if app.sidebar_search.is_empty() {
            "No conversations yet"
        } else {
            "No matching chats"
        };
        let empty = Paragraph::new(Span::styled(message, Style::default().fg(Color::DarkGray)))
            .block(list_block);
        frame.render_widget(empty, list_area);
        return;
    }

    let list = List::new(items)
        .block(list_block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, list_area, &mut app.sidebar_state);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let input_height = input_height(app);
    let [messages_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(input_height)]).areas(area);

    // Store areas for mouse hit-testing and scroll calculations (inner size minus borders)
    app.messages_area = Some(messages_area);
    app.chat_height = messages_area.height.saturating_sub(2);
    app.chat_width = messages_area.width.saturating_sub(2);

    let focused = app.focus == FocusPane::Chat;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let Some(conversation) = app.store.active_conversation() else {
        let welcome = Text::from(vec![
            Line::default(),
            Line::from(Span::styled("Welcome to Parley", Style::default().fg(Color::Cyan).bold())),
            Line::default(),
            Line::from(Span::styled(
                "Select a conversation or start a new one to begin chatting.",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(Span::styled("Press n for a new chat.", Style::default().fg(Color::DarkGray))),
        ]);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color));
        frame.render_widget(Paragraph::new(welcome).centered().block(block), messages_area);
        return;
    };

    let title = Line::from(vec![
        Span::raw(format!(" {} ", conversation.title)),
        Span::styled(
            format!(" {} ", app.store.selected_model()),
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        Span::raw(" "),
    ]);
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let pending = app.chat.pending_conversation() == Some(conversation.id.as_str());

    let chat_text = if conversation.messages.is_empty() && !pending {
        Text::from(vec![
            Line::default(),
            Line::from(Span::styled("How can I help you today?", Style::default().bold())),
            Line::from(Span::styled(
                "Start a conversation by typing a message below.",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .centered()
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for (i, msg) in conversation.messages.iter().enumerate() {
            let selected = focused && app.selected_message == Some(i);
            let role_style = match msg.role {
                ChatRole::User => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ChatRole::Assistant => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            };

            let mut header = vec![
                Span::styled(if selected { "> " } else { "" }, Style::default().fg(Color::Blue)),
                Span::styled(format!("{}:", msg.role.label()), role_style),
                Span::styled(
                    format!(" {}", msg.timestamp.format("%H:%M")),
                    Style::default().fg(Color::DarkGray),
                ),
            ];
            if let Some(model) = &msg.model {
                header.push(Span::styled(format!(" · {}", model), Style::default().fg(Color::DarkGray)));
            }
            lines.push(Line::from(header));

            let body_style = if selected {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            for line in msg.content.lines() {
                lines.push(Line::styled(line.to_string(), body_style));
            }
            lines.push(Line::default());
        }

        if pending {
            lines.push(Line::from(Span::styled(
                "AI:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, messages_area);

    render_input(app, frame, input_area);
}

fn input_height(app: &App) -> u16 {
    let lines = app.chat.input().split('\n').count().clamp(1, MAX_INPUT_LINES);
    let attachment = usize::from(app.chat.selected_file().is_some());
    (lines + attachment + 2) as u16
}

/// Line and column (in characters) of a character cursor inside multi-line text.
fn cursor_line_col(text: &str, cursor: usize) -> (usize, usize) {
    let mut line = 0;
    let mut col = 0;
    for c in text.chars().take(cursor) {
        if c == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
    }
    (line, col)
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let focused = app.focus == FocusPane::Input;
    let pending = app.chat.is_pending();

    let border_color = if pending {
        Color::DarkGray
    } else if focused || editing {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title_bottom(Line::from(Span::styled(
            " AI can make mistakes. Check important info. ",
            Style::default().fg(Color::DarkGray),
        )));

    let inner = input_block.inner(area);
    frame.render_widget(input_block, area);

    let mut text_area = inner;
    if let Some(file) = app.chat.selected_file() {
        let attachment = Line::from(vec![
            Span::styled(" 📎 ", Style::default().fg(Color::Magenta)),
            Span::raw(file.name.as_str()),
            Span::styled(format!(" ({})", file.display_size()), Style::default().fg(Color::DarkGray)),
            Span::styled("  x to remove", Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(Paragraph::new(attachment), Rect::new(inner.x, inner.y, inner.width, 1));
        text_area = Rect::new(inner.x, inner.y + 1, inner.width, inner.height.saturating_sub(1));
    }

    let input = app.chat.input();
    let (cursor_line, cursor_col) = cursor_line_col(input, app.chat.cursor());

    // Keep the cursor line visible, then scroll horizontally within it
    let height = text_area.height.max(1) as usize;
    let width = text_area.width as usize;
    let line_offset = (cursor_line + 1).saturating_sub(height);
    let col_offset = if width == 0 { 0 } else { (cursor_col + 1).saturating_sub(width) };

    let content = if input.is_empty() {
        let placeholder = if pending { "Waiting for reply..." } else { "Message Parley..." };
        Text::from(Span::styled(placeholder, Style::default().fg(Color::DarkGray)))
    } else {
        let lines: Vec<Line> = input
            .split('\n')
            .skip(line_offset)
            .take(height)
            .map(|l| Line::from(l.chars().skip(col_offset).take(width).collect::<String>()))
            .collect();
        Text::from(lines)
    };

    // Use cyan text to match the "You:" style - visible in both light and dark terminals
    frame.render_widget(Paragraph::new(content).style(Style::default().fg(Color::Cyan)), text_area);

    // Show cursor when editing
    if editing && !pending && !app.show_settings && !app.show_attach_prompt {
        let x = (cursor_col - col_offset) as u16;
        let y = (cursor_line - line_offset) as u16;
        frame.set_cursor_position((text_area.x + x, text_area.y + y));
    }
}

/// Centered popup of at most `width` x `height` cells.
fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let popup_width = width.min(area.width.saturating_sub(4));
    let popup_height = height.min(area.height.saturating_sub(4));

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    Rect::new(popup_x, popup_y, popup_width, popup_height)
}

fn section_placeholder(section: SettingsSection) -> &'static str {
    match section {
        SettingsSection::Personalization => "Personalization settings coming soon",
        SettingsSection::ConnectedApps => "No connected apps yet",
        SettingsSection::Account => "Account management coming soon",
        _ => "",
    }
}

fn render_settings(app: &mut App, frame: &mut Frame, area: Rect) {
    let popup = popup_area(area, 80, 20);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Settings ");
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let [sections_area, fields_area] =
        Layout::horizontal([Constraint::Length(22), Constraint::Min(0)]).areas(inner);

    let sections_focused = app.settings_focus == SettingsFocus::Sections;
    let items: Vec<ListItem> = SettingsSection::all()
        .into_iter()
        .map(|s| ListItem::new(format!(" {} ", s)))
        .collect();
    let sections = List::new(items)
        .block(
            Block::default()
                .borders(Borders::RIGHT)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .highlight_style(if sections_focused {
            Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        })
        .highlight_symbol("> ");
    frame.render_stateful_widget(sections, sections_area, &mut app.section_state);

    let section = app.current_section();
    let fields = section.fields();
    let fields_area = Rect::new(
        fields_area.x + 1,
        fields_area.y,
        fields_area.width.saturating_sub(1),
        fields_area.height,
    );

    if fields.is_empty() {
        let placeholder = Paragraph::new(Span::styled(
            section_placeholder(section),
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(placeholder, fields_area);
        return;
    }

    let items: Vec<ListItem> = fields
        .iter()
        .map(|field| {
            let value = app.settings.value_label(*field);
            let value_style = if field.is_toggle() {
                if value == "On" {
                    Style::default().fg(Color::Green).bold()
                } else {
                    Style::default().fg(Color::DarkGray)
                }
            } else {
                Style::default().fg(Color::Cyan)
            };
            let mut lines = vec![Line::from(vec![
                Span::raw(format!("{}: ", field.label())),
                Span::styled(format!("‹ {} ›", value), value_style),
            ])];
            if !field.description().is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("  {}", field.description()),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, fields_area, &mut app.field_state);
}

fn render_attach_prompt(app: &App, frame: &mut Frame, area: Rect) {
    let popup = popup_area(area, 60, 6);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Attach File ");
    let inner = block.inner(popup);
    frame.render_widget(block, popup);
    if inner.is_empty() {
        return;
    }

    // Short terminals drop the instructions and keep only the input row
    let input_y = if inner.height >= 3 {
        let instructions = Paragraph::new("Path to an image, .pdf, .doc, .docx or .txt file")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(instructions, Rect::new(inner.x, inner.y, inner.width, 1));
        inner.y + 2
    } else {
        inner.y
    };

    let input_area = Rect::new(inner.x, input_y, inner.width, 1);
    let len = app.attach_input.chars().count();
    let offset = (len + 1).saturating_sub(input_area.width as usize);
    let visible: String = app.attach_input.chars().skip(offset).collect();
    frame.render_widget(Paragraph::new(visible).style(Style::default().fg(Color::Cyan)), input_area);

    let cursor_x = (len - offset) as u16;
    frame.set_cursor_position((input_area.x + cursor_x, input_area.y));
}

fn render_notification(app: &App, frame: &mut Frame, area: Rect) {
    let Some(notification) = &app.notification else {
        return;
    };

    let width = (notification.description.chars().count().max(notification.title.chars().count()) + 4)
        .min(area.width.saturating_sub(2) as usize) as u16;
    let height = 4;
    let toast = Rect::new(
        area.width.saturating_sub(width + 1),
        area.height.saturating_sub(height + 1),
        width,
        height.min(area.height),
    );

    frame.render_widget(Clear, toast);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    let text = Text::from(vec![
        Line::from(Span::styled(notification.title.as_str(), Style::default().bold())),
        Line::from(Span::styled(
            notification.description.as_str(),
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    frame.render_widget(Paragraph::new(text).block(block), toast);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::app;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(app: &mut App, width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();

        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| (0..width).map(|x| buffer[(x, y)].symbol()).collect())
            .collect()
    }

    #[test]
    fn test_attach_prompt_fits_short_terminals() {
        let mut app = app();
        app.open_attach_prompt();
        app.attach_input.push_str("~/notes/todo.txt");

        for height in 1..=12 {
            draw(&mut app, 40, height);
        }
    }

    #[test]
    fn test_attach_prompt_shows_instructions_when_there_is_room() {
        let mut app = app();
        app.open_attach_prompt();
        app.attach_input.push_str("report.pdf");

        let rows = draw(&mut app, 80, 24);
        assert!(rows.iter().any(|r| r.contains("Attach File")));
        assert!(rows.iter().any(|r| r.contains("Path to an image")));
        assert!(rows.iter().any(|r| r.contains("report.pdf")));

        // Without room for the instructions the typed path still shows
        let rows = draw(&mut app, 80, 7);
        assert!(!rows.iter().any(|r| r.contains("Path to an image")));
        assert!(rows.iter().any(|r| r.contains("report.pdf")));
    }

    #[test]
    fn test_empty_conversation_placeholder() {
        let mut app = app();
        let rows = draw(&mut app, 100, 30);
        assert!(rows.iter().any(|r| r.contains("How can I help you today?")));
        assert!(rows.iter().any(|r| r.contains("New Chat")));
    }

    #[test]
    fn test_cursor_line_col() {
        assert_eq!(cursor_line_col("", 0), (0, 0));
        assert_eq!(cursor_line_col("hello", 3), (0, 3));
        assert_eq!(cursor_line_col("ab\ncd", 3), (1, 0));
        assert_eq!(cursor_line_col("ab\ncdé", 6), (1, 3));
    }

    #[test]
    fn test_popup_area_is_centered_and_clamped() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(popup_area(area, 60, 6), Rect::new(20, 17, 60, 6));

        let small = Rect::new(0, 0, 30, 10);
        let popup = popup_area(small, 60, 20);
        assert_eq!((popup.width, popup.height), (26, 6));
    }
}
