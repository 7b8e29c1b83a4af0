use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use parley_core::{ChatRole, MessageType, SaveStatus};

use crate::app::{App, InputMode, Screen};

const ACCENT: Color = Color::Rgb(29, 191, 115);

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
    render_conversation(app, frame, body_area);

    if app.panel.is_expanded() {
        render_panel(app, frame, body_area);
    } else {
        render_launcher(frame, body_area);
    }

    render_footer(app, frame, footer_area);

    // Overlays (in order of priority)
    if app.screen == Screen::Settings {
        render_settings(app, frame, area);
    }
    if let Some(alert) = &app.alert {
        render_alert(alert, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let source = app
        .page_source
        .as_ref()
        .map(|s| format!(" {} ", s))
        .unwrap_or_else(|| " no page loaded ".to_string());

    let title = Line::from(vec![
        Span::styled(" Parley ", Style::default().fg(ACCENT).bold()),
        Span::styled(source, Style::default().fg(Color::Gray)),
        Span::styled(
            format!("[{} messages] ", app.context.len()),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(format!("{} ", app.client.model()), Style::default().fg(Color::Cyan)),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

/// The host conversation, shown behind the floating panel.
fn render_conversation(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");

    let text = if app.context.is_empty() {
        Text::from(Span::styled(
            "No conversation extracted. Pass --page <file|url> and press r to refresh.",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let lines: Vec<Line> = app
            .context
            .iter()
            .flat_map(|message| [Line::from(message.as_str()), Line::default()])
            .collect();
        Text::from(lines)
    };

    frame.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: true }), area);
}

/// Bottom-right rectangle for the floating panel or launcher.
fn corner_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + area.width - width,
        area.y + area.height - height,
        width,
        height,
    )
}

fn render_launcher(frame: &mut Frame, area: Rect) {
    let launcher_area = corner_rect(area, 34, 3);
    frame.render_widget(Clear, launcher_area);

    let launcher = Paragraph::new(Line::from(vec![
        Span::styled(" ✦ ", Style::default().fg(ACCENT)),
        Span::raw("Open assistant "),
        Span::styled("[Enter]", Style::default().fg(Color::DarkGray)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT)),
    );
    frame.render_widget(launcher, launcher_area);
}

fn render_panel(app: &mut App, frame: &mut Frame, area: Rect) {
    let width = (area.width * 3 / 5).max(50);
    let height = if app.panel.is_minimized() { 3 } else { area.height };
    let panel_area = corner_rect(area, width, height);
    frame.render_widget(Clear, panel_area);

    let status = if app.is_loading() {
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        format!(" working{} ", dots)
    } else {
        String::new()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(Line::from(vec![
            Span::styled(" ✦ Message Assistant ", Style::default().fg(ACCENT).bold()),
            Span::styled(status, Style::default().fg(Color::Yellow).italic()),
        ]))
        .title_bottom(Line::from(" m minimize · x close ").right_aligned());

    let inner = block.inner(panel_area);
    frame.render_widget(block, panel_area);

    if !app.panel.shows_body() {
        return;
    }

    let [types_area, chat_area, input_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(inner);

    render_message_types(app, frame, types_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
}

fn render_message_types(app: &App, frame: &mut Frame, area: Rect) {
    let disabled = app.category_loading.is_some();
    let mut spans = Vec::new();

    for (i, message_type) in MessageType::all().iter().enumerate() {
        let active = *message_type == app.active_type;
        let style = if disabled {
            Style::default().fg(Color::DarkGray)
        } else if active {
            Style::default().bg(ACCENT).fg(Color::Black).bold()
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(
            format!(" {} {} {} ", i + 1, message_type.icon(), message_type.label()),
            style,
        ));
        spans.push(Span::raw(" "));
    }

    let title = if disabled {
        " Quick suggestions (loading) "
    } else {
        " Quick suggestions (1-5) "
    };
    let row = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::BOTTOM).title(title))
        .wrap(Wrap { trim: true });
    frame.render_widget(row, area);
}

fn role_header(role: ChatRole) -> Span<'static> {
    match role {
        ChatRole::User => Span::styled("You:", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        ChatRole::Assistant => Span::styled("Assistant:", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        ChatRole::Suggestion => Span::styled(
            "Suggestions:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
    }
}

/// Greedy word wrap measured in terminal cells. Words wider than a row are
/// split across rows.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let fits = |candidate: &str| Span::raw(candidate).width() <= width;

    let mut rows = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if fits(&candidate) {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            rows.push(std::mem::take(&mut current));
        }
        for c in word.chars() {
            current.push(c);
            if !fits(&current) && current.chars().count() > 1 {
                current.pop();
                rows.push(std::mem::take(&mut current));
                current.push(c);
            }
        }
    }
    if !current.is_empty() || rows.is_empty() {
        rows.push(current);
    }
    rows
}

/// Push `text` wrapped to `width`, with `first` before the first row and
/// matching blank indentation before the rest.
fn push_wrapped(lines: &mut Vec<Line<'static>>, first: &str, text: &str, style: Style, width: u16) {
    let indent = Span::raw(first).width();
    let rest = " ".repeat(indent);
    let rows = wrap_text(text, (width as usize).saturating_sub(indent));
    for (i, row) in rows.into_iter().enumerate() {
        let prefix = if i == 0 { first.to_string() } else { rest.clone() };
        lines.push(Line::from(vec![Span::raw(prefix), Span::styled(row, style)]));
    }
}

/// Rows of the chat log wrapped to `width`, one block per entry. The
/// result is exactly what `render_chat` draws, so its length is the
/// scrollable height.
pub fn chat_lines(app: &App, width: u16) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let plain = Style::default();
    let heading = Style::default().fg(Color::Yellow);

    for (index, entry) in app.chat_log.entries().iter().enumerate() {
        let selected = app.selected_entry == Some(index);
        let mut header = vec![
            Span::raw(if selected { "> " } else { "  " }),
            role_header(entry.role),
        ];
        if entry.copy_text().is_some() {
            let marker = if app.copy.is_confirmed(index) { " ✔ copied" } else { " [c] copy" };
            header.push(Span::styled(marker, Style::default().fg(Color::DarkGray)));
        }
        lines.push(Line::from(header));

        match (&entry.role, &entry.response) {
            (ChatRole::User, _) | (_, None) => {
                for line in entry.message.lines() {
                    push_wrapped(&mut lines, "  ", line, plain, width);
                }
            }
            (_, Some(response)) => {
                if let Some(feedback) = &response.feedback {
                    push_wrapped(&mut lines, "  ", feedback, plain.add_modifier(Modifier::BOLD), width);
                }
                if let Some(original) = &response.original_input {
                    let quoted = format!("\"{}\"", original);
                    push_wrapped(&mut lines, "  ", &quoted, Style::default().fg(Color::Gray).italic(), width);
                }
                if !response.suggestions.is_empty() {
                    lines.push(Line::from(Span::styled("  Suggestions", heading)));
                    for suggestion in &response.suggestions {
                        push_wrapped(&mut lines, "   • ", suggestion, plain, width);
                    }
                }
                if !response.communication_tips.is_empty() {
                    lines.push(Line::from(Span::styled("  Tips", heading)));
                    for tip in &response.communication_tips {
                        push_wrapped(&mut lines, "   • ", tip, plain, width);
                    }
                }
                if let Some(rewrite) = &response.message_rewrite {
                    lines.push(Line::from(Span::styled("  Suggested message", Style::default().fg(ACCENT))));
                    for line in rewrite.lines() {
                        push_wrapped(&mut lines, "   ", line, plain, width);
                    }
                }
            }
        }
        lines.push(Line::default());
    }

    lines
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_height = area.height;
    app.chat_width = area.width;

    let text = if app.chat_log.is_empty() {
        Text::from(vec![
            Line::from(Span::styled(
                "Pick a quick suggestion (1-5) or press i and type a draft.",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(Span::styled(
                format!("Active type: {} {}", app.active_type.icon(), app.active_type.label()),
                Style::default().fg(Color::DarkGray),
            )),
        ])
    } else {
        Text::from(chat_lines(app, area.width))
    };

    // Rows are pre-wrapped so the scroll offset counts real rows
    let chat = Paragraph::new(text).scroll((app.chat_scroll, 0));
    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let (border, title) = if app.is_generating() {
        (Color::DarkGray, " Generating... ")
    } else if editing {
        (Color::Yellow, " Type your message (Enter to send) ")
    } else {
        (Color::DarkGray, " Type your message ")
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title);

    let input = Paragraph::new(app.input.as_str()).block(block);
    frame.render_widget(input, area);

    if editing && app.screen == Screen::Panel && app.alert.is_none() {
        let cursor_x = (app.cursor as u16).min(area.width.saturating_sub(3));
        frame.set_cursor_position((area.x + 1 + cursor_x, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match (app.screen, app.input_mode) {
        (Screen::Settings, _) => " SETTINGS ",
        (Screen::Panel, InputMode::Editing) => " TYPING ",
        (Screen::Panel, InputMode::Normal) => " PANEL ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let pairs: Vec<(&str, &str)> = match (app.screen, app.input_mode) {
        (Screen::Settings, _) => vec![("Enter", "save"), ("Tab", "show/hide"), ("Esc", "back")],
        (Screen::Panel, InputMode::Editing) => vec![("Enter", "send"), ("Esc", "stop typing")],
        (Screen::Panel, InputMode::Normal) if !app.panel.is_expanded() => {
            vec![("Enter", "open"), ("s", "api key"), ("q", "quit")]
        }
        (Screen::Panel, InputMode::Normal) if app.panel.is_minimized() => {
            vec![("m", "restore"), ("x", "close"), ("q", "quit")]
        }
        (Screen::Panel, InputMode::Normal) => vec![
            ("i", "type"),
            ("1-5", "suggest"),
            ("j/k", "select"),
            ("c", "copy"),
            ("r", "refresh"),
            ("s", "api key"),
            ("q", "quit"),
        ],
    };

    let hints = pairs.into_iter().flat_map(|(key, label)| {
        [
            Span::styled(format!(" {} ", key), key_style),
            Span::styled(format!(" {} ", label), label_style),
        ]
    });

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn render_settings(app: &App, frame: &mut Frame, area: Rect) {
    let form = &app.api_key_form;
    let popup_area = centered_rect(area, 64, 11);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(" Enter Your OpenAI API Key ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    if !form.loaded {
        return;
    }

    let instructions = Paragraph::new("Type or paste the key. Enter saves, Tab shows/hides it.")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(instructions, Rect::new(inner.x, inner.y, inner.width, 1));

    let input_area = Rect::new(inner.x, inner.y + 2, inner.width, 1);
    let display = if form.input.is_empty() {
        Span::styled("sk-...", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(form.display_input(), Style::default().fg(Color::Cyan))
    };
    frame.render_widget(Paragraph::new(Line::from(display)), input_area);

    let cursor_x = form.cursor.min(input_area.width as usize) as u16;
    frame.set_cursor_position((input_area.x + cursor_x, input_area.y));

    if let Some(saved) = &form.saved_display {
        let saved_line = Line::from(vec![
            Span::styled("Saved Key: ", Style::default().fg(Color::Gray)),
            Span::styled(saved.clone(), Style::default().fg(Color::White)),
        ]);
        frame.render_widget(Paragraph::new(saved_line), Rect::new(inner.x, inner.y + 4, inner.width, 1));
    }

    let status = match form.status() {
        SaveStatus::Idle => None,
        SaveStatus::Success => Some(Span::styled("✔ API Key saved successfully", Style::default().fg(Color::Green))),
        SaveStatus::Error => Some(Span::styled("✖ Failed to save API Key", Style::default().fg(Color::Red))),
    };
    if let Some(status) = status {
        frame.render_widget(
            Paragraph::new(Line::from(status)),
            Rect::new(inner.x, inner.y + 6, inner.width, 1),
        );
    }
}

fn render_alert(message: &str, frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(area, 56, 5);
    frame.render_widget(Clear, popup_area);

    let alert = Paragraph::new(vec![
        Line::from(message.to_string()),
        Line::default(),
        Line::from(Span::styled("Press any key to continue", Style::default().fg(Color::DarkGray))),
    ])
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(" Alert "),
    );
    frame.render_widget(alert, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::{AssistantResponse, ChatLogEntry, Config, MemoryClipboard, MemorySettingsStore};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;
    use std::time::Instant;

    fn app() -> App {
        App::new(
            &Config::default(),
            Arc::new(MemorySettingsStore::with_api_key("sk-ABCDEFGHIJ1234567890")),
            Arc::new(MemoryClipboard::new()),
            None,
        )
        .unwrap()
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_chat_lines_show_copy_confirmation() {
        let mut app = app();
        app.chat_log.push(ChatLogEntry::user("hello"));
        app.chat_log.push(ChatLogEntry::assistant(
            "Generated Professional Inquiry Message",
            AssistantResponse {
                feedback: Some("Generated Professional Inquiry Message".to_string()),
                message_rewrite: Some("Hello, thanks for reaching out.".to_string()),
                ..Default::default()
            },
        ));

        let text: String = chat_lines(&app, 60)
            .iter()
            .map(|line| line.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        assert!(text.contains("[c] copy"));
        assert!(text.contains("Hello, thanks for reaching out."));

        app.copy.confirm(1, Instant::now());
        let text: String = chat_lines(&app, 60).iter().map(|line| line.to_string()).collect();
        assert!(text.contains("copied"));
    }

    #[test]
    fn test_render_collapsed_and_expanded() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        terminal.draw(|frame| render(&mut app, frame)).unwrap();
        assert!(screen_text(&terminal).contains("Open assistant"));

        app.panel.toggle();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("Message Assistant"));
        assert!(text.contains("Quick suggestions"));
    }

    #[test]
    fn test_render_settings_shows_masked_key() {
        let mut app = app();
        app.screen = Screen::Settings;
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("sk-ABC...7890"));
        assert!(!text.contains("DEFGHIJ123456"));
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("alpha beta gamma", 10), vec!["alpha beta", "gamma"]);
        assert_eq!(wrap_text("abcdefghijkl", 5), vec!["abcde", "fghij", "kl"]);
        assert_eq!(wrap_text("", 5), vec![""]);
    }

    #[test]
    fn test_scroll_to_bottom_reaches_newest_wrapped_entry() {
        let mut app = app();
        app.panel.toggle();
        let long = "please confirm the scope ".repeat(12);
        for _ in 0..4 {
            app.chat_log.push(ChatLogEntry::suggestion(
                "Suggestions for Professional Inquiry",
                AssistantResponse {
                    suggestions: vec![long.clone()],
                    ..Default::default()
                },
            ));
        }
        app.chat_log.push(ChatLogEntry::assistant(
            "Generated Professional Inquiry Message",
            AssistantResponse {
                message_rewrite: Some("FINALREWRITE".to_string()),
                ..Default::default()
            },
        ));

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();
        app.scroll_chat_to_bottom();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        assert!(chat_lines(&app, app.chat_width)
            .iter()
            .all(|line| line.width() <= app.chat_width as usize));
        assert!(screen_text(&terminal).contains("FINALREWRITE"));
    }

    #[test]
    fn test_input_shows_generating_state() {
        let mut app = app();
        app.panel.toggle();
        app.message_loading = 2;
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();
        assert!(screen_text(&terminal).contains("Generating..."));
    }
}
