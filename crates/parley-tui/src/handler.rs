use std::time::Instant;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use parley_core::MessageType;

use crate::app::{App, InputMode, Screen};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key).await,
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Tick => app.tick(Instant::now()),
    }
    app.poll_tasks().await;
    Ok(())
}

async fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // Alerts block everything until dismissed
    if app.alert.is_some() {
        app.alert = None;
        return;
    }

    match app.screen {
        Screen::Settings => handle_settings(app, key),
        Screen::Panel => match app.input_mode {
            InputMode::Normal => handle_panel_normal(app, key).await,
            InputMode::Editing => handle_panel_editing(app, key),
        },
    }
}

fn handle_settings(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.screen = Screen::Panel;
            return;
        }
        KeyCode::Enter => {
            app.save_api_key(Instant::now());
            return;
        }
        _ => {}
    }

    let form = &mut app.api_key_form;
    match key.code {
        KeyCode::Tab => {
            form.toggle_visibility();
        }
        KeyCode::Backspace => {
            if form.cursor > 0 {
                form.cursor -= 1;
                let byte_pos = char_to_byte_index(&form.input, form.cursor);
                form.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            if form.cursor < form.input.chars().count() {
                let byte_pos = char_to_byte_index(&form.input, form.cursor);
                form.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            form.cursor = form.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            form.cursor = (form.cursor + 1).min(form.input.chars().count());
        }
        KeyCode::Home => form.cursor = 0,
        KeyCode::End => form.cursor = form.input.chars().count(),
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&form.input, form.cursor);
            form.input.insert(byte_pos, c);
            form.cursor += 1;
        }
        _ => {}
    }
}

async fn handle_panel_normal(app: &mut App, key: KeyEvent) {
    // Keys shared by every panel state
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('s') => {
            app.open_settings();
            return;
        }
        _ => {}
    }

    if !app.panel.is_expanded() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('o')) {
            app.panel.toggle();
        }
        return;
    }

    match key.code {
        KeyCode::Char('x') | KeyCode::Esc => app.panel.close(),
        KeyCode::Char('m') => app.panel.toggle_minimized(),
        _ if app.panel.is_minimized() => {}

        KeyCode::Char('i') | KeyCode::Char('/') => {
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char(c @ '1'..='5') => {
            let index = (c as usize) - ('1' as usize);
            if let Some(&message_type) = MessageType::all().get(index) {
                app.select_message_type(message_type);
            }
        }
        KeyCode::Char('r') => app.refresh_context().await,
        KeyCode::Char('j') | KeyCode::Down => app.select_next_entry(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev_entry(),
        KeyCode::Char('c') => app.copy_selected(Instant::now()),
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.chat_scroll = app.chat_scroll.saturating_add(app.chat_height / 2);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.chat_scroll = app.chat_scroll.saturating_sub(app.chat_height / 2);
        }
        _ => {}
    }
}

fn handle_panel_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.send_message();
        }
        KeyCode::Backspace => {
            if app.cursor > 0 {
                app.cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.cursor = (app.cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.cursor = 0;
        }
        KeyCode::End => {
            app.cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.cursor);
            app.input.insert(byte_pos, c);
            app.cursor += 1;
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if !app.panel.shows_body() || app.screen != Screen::Panel {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            app.chat_scroll = app.chat_scroll.saturating_add(3);
        }
        MouseEventKind::ScrollUp => {
            app.chat_scroll = app.chat_scroll.saturating_sub(3);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::{Config, MemoryClipboard, MemorySettingsStore, PanelView, SaveStatus, SettingsStore};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app_with_store(store: Arc<MemorySettingsStore>) -> App {
        let config = Config {
            api_url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
            ..Config::default()
        };
        App::new(&config, store, Arc::new(MemoryClipboard::new()), None).unwrap()
    }

    fn app() -> App {
        app_with_store(Arc::new(MemorySettingsStore::new()))
    }

    fn press(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, press(KeyCode::Char(c))).await.unwrap();
        }
    }

    #[test]
    fn test_char_to_byte_index() {
        assert_eq!(char_to_byte_index("héllo", 2), 3);
        assert_eq!(char_to_byte_index("abc", 10), 3);
    }

    #[tokio::test]
    async fn test_open_minimize_close() {
        let mut app = app();
        handle_event(&mut app, press(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.panel, PanelView::Expanded { minimized: false });

        handle_event(&mut app, press(KeyCode::Char('m'))).await.unwrap();
        assert!(app.panel.is_minimized());

        // Body keys are inert while minimized
        handle_event(&mut app, press(KeyCode::Char('i'))).await.unwrap();
        assert_eq!(app.input_mode, InputMode::Normal);

        handle_event(&mut app, press(KeyCode::Char('x'))).await.unwrap();
        assert_eq!(app.panel, PanelView::Collapsed);
    }

    #[tokio::test]
    async fn test_editing_keeps_utf8_cursor() {
        let mut app = app();
        app.panel.toggle();
        handle_event(&mut app, press(KeyCode::Char('i'))).await.unwrap();
        type_text(&mut app, "añb").await;
        handle_event(&mut app, press(KeyCode::Left)).await.unwrap();
        handle_event(&mut app, press(KeyCode::Backspace)).await.unwrap();
        assert_eq!(app.input, "ab");
        assert_eq!(app.cursor, 1);
    }

    #[tokio::test]
    async fn test_settings_save_round_trip() {
        let store = Arc::new(MemorySettingsStore::new());
        let mut app = app_with_store(store.clone());

        handle_event(&mut app, press(KeyCode::Char('s'))).await.unwrap();
        assert_eq!(app.screen, Screen::Settings);

        // Blank save is rejected
        handle_event(&mut app, press(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.api_key_form.status(), SaveStatus::Error);
        assert_eq!(store.get("apiKey").unwrap(), None);

        // Typing 'q' or 's' here is text, not a command
        type_text(&mut app, "sk-ABCDEFGHIJ1234567890").await;
        handle_event(&mut app, press(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.api_key_form.status(), SaveStatus::Success);
        assert_eq!(app.api_key_form.saved_display.as_deref(), Some("sk-ABC...7890"));
        assert_eq!(store.get("apiKey").unwrap().as_deref(), Some("sk-ABCDEFGHIJ1234567890"));
        assert!(!app.should_quit);

        handle_event(&mut app, press(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.screen, Screen::Panel);
    }

    #[tokio::test]
    async fn test_alert_swallows_next_key() {
        let mut app = app();
        app.alert = Some("Failed to generate suggestions. Please try again.".to_string());
        handle_event(&mut app, press(KeyCode::Char('q'))).await.unwrap();
        assert!(app.alert.is_none());
        assert!(!app.should_quit);
    }

    #[tokio::test]
    async fn test_number_keys_select_category() {
        let mut app = app();
        app.panel.toggle();
        handle_event(&mut app, press(KeyCode::Char('3'))).await.unwrap();
        assert_eq!(app.active_type, MessageType::PriceNegotiation);
        assert_eq!(app.category_loading, Some(MessageType::PriceNegotiation));
    }

    #[tokio::test]
    async fn test_enter_while_generating_keeps_draft() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({
                        "choices": [{ "message": { "role": "assistant", "content": "{\"output\":{}}" } }]
                    }))
                    .set_delay(Duration::from_millis(300)),
            )
            .expect(2)
            .mount(&mock_server)
            .await;

        let config = Config {
            api_url: mock_server.uri(),
            ..Config::default()
        };
        let store = Arc::new(MemorySettingsStore::with_api_key("sk-test"));
        let mut app = App::new(&config, store, Arc::new(MemoryClipboard::new()), None).unwrap();
        app.panel.toggle();
        handle_event(&mut app, press(KeyCode::Char('i'))).await.unwrap();

        type_text(&mut app, "hi").await;
        handle_event(&mut app, press(KeyCode::Enter)).await.unwrap();
        assert!(app.input.is_empty());

        type_text(&mut app, "again").await;
        handle_event(&mut app, press(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.input, "again");
        assert_eq!(app.cursor, 5);
        assert_eq!(app.chat_log.len(), 1);
        assert_eq!(app.message_loading, 2);

        for _ in 0..200 {
            if !app.has_pending() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
            app.poll_tasks().await;
        }
        assert!(!app.is_generating());
    }
}
