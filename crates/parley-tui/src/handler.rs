use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, FocusPane, InputMode, SettingsFocus};
use crate::tui::AppEvent;
use parley_core::SettingField;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => handle_paste(app, &text),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick().await,
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // Overlays take every key while open
    if app.show_settings {
        handle_settings(app, key);
        return;
    }
    if app.show_attach_prompt {
        handle_attach_prompt(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
        InputMode::Searching => handle_search_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        // Quit
        KeyCode::Char('q') => app.should_quit = true,

        // Tab cycles Sidebar -> Chat -> Input, skipping a collapsed sidebar
        KeyCode::Tab => {
            app.focus = match app.focus {
                FocusPane::Sidebar => FocusPane::Chat,
                FocusPane::Chat => FocusPane::Input,
                FocusPane::Input if app.sidebar_collapsed => FocusPane::Chat,
                FocusPane::Input => FocusPane::Sidebar,
            };
        }

        // Conversation actions
        KeyCode::Char('n') => app.new_conversation(),
        KeyCode::Char('r') => app.regenerate(),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_chat_down(app.chat_height / 2);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_chat_up(app.chat_height / 2);
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            if app.focus == FocusPane::Sidebar {
                app.delete_highlighted();
            }
        }

        // Panels
        KeyCode::Char('s') | KeyCode::Char(',') => app.open_settings(),
        KeyCode::Char('b') => app.toggle_sidebar(),
        KeyCode::Char('/') => {
            app.sidebar_collapsed = false;
            app.focus = FocusPane::Sidebar;
            app.input_mode = InputMode::Searching;
        }

        // Attachment
        KeyCode::Char('a') => app.open_attach_prompt(),
        KeyCode::Char('x') => app.chat.clear_attachment(),

        // Start typing
        KeyCode::Char('i') => {
            app.focus = FocusPane::Input;
            app.input_mode = InputMode::Editing;
        }

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => match app.focus {
            FocusPane::Sidebar => app.sidebar_nav_down(),
            FocusPane::Chat => app.message_nav_down(),
            FocusPane::Input => {}
        },
        KeyCode::Char('k') | KeyCode::Up => match app.focus {
            FocusPane::Sidebar => app.sidebar_nav_up(),
            FocusPane::Chat => app.message_nav_up(),
            FocusPane::Input => {}
        },
        KeyCode::Char('g') => {
            if app.focus == FocusPane::Chat && !app.active_messages().is_empty() {
                app.selected_message = Some(0);
            }
            app.chat_scroll = 0;
        }
        KeyCode::Char('G') => {
            let len = app.active_messages().len();
            if app.focus == FocusPane::Chat && len > 0 {
                app.selected_message = Some(len - 1);
            }
            app.scroll_chat_to_bottom();
        }
        KeyCode::Enter => match app.focus {
            FocusPane::Sidebar => {
                app.select_highlighted();
                app.focus = FocusPane::Input;
                app.input_mode = InputMode::Editing;
            }
            FocusPane::Input => app.input_mode = InputMode::Editing,
            FocusPane::Chat => {}
        },

        // Message actions (only when Chat is focused)
        KeyCode::Char('c') | KeyCode::Char('y') => {
            if app.focus == FocusPane::Chat {
                app.copy_selected_message();
            }
        }

        KeyCode::Esc => app.selected_message = None,
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        app.input_mode = InputMode::Normal;
        return;
    }

    // The input is read-only until the pending reply lands
    if app.chat.is_pending() {
        return;
    }

    match key.code {
        KeyCode::Enter
            if key.modifiers.contains(KeyModifiers::SHIFT)
                || key.modifiers.contains(KeyModifiers::ALT) =>
        {
            app.chat.insert_newline();
        }
        KeyCode::Enter => app.send_message(),
        KeyCode::Backspace => app.chat.backspace(),
        KeyCode::Delete => app.chat.delete(),
        KeyCode::Left => app.chat.move_left(),
        KeyCode::Right => app.chat.move_right(),
        KeyCode::Home => app.chat.move_home(),
        KeyCode::End => app.chat.move_end(),
        KeyCode::Char(c) => app.chat.insert_char(c),
        _ => {}
    }
}

fn handle_search_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.clear_search();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.select_highlighted();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Down => app.sidebar_nav_down(),
        KeyCode::Up => app.sidebar_nav_up(),
        KeyCode::Backspace => app.search_pop(),
        KeyCode::Char(c) => app.search_push(c),
        _ => {}
    }
}

fn handle_attach_prompt(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.show_attach_prompt = false;
            app.attach_input.clear();
        }
        KeyCode::Enter => app.confirm_attach(),
        KeyCode::Backspace => {
            app.attach_input.pop();
        }
        KeyCode::Char(c) => app.attach_input.push(c),
        _ => {}
    }
}

fn handle_settings(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('s') | KeyCode::Char(',') => {
            app.show_settings = false;
        }
        KeyCode::Char('j') | KeyCode::Down => app.settings_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.settings_nav_up(),
        KeyCode::Tab => app.toggle_settings_focus(),
        KeyCode::Enter | KeyCode::Char(' ') => match app.settings_focus {
            SettingsFocus::Sections => app.toggle_settings_focus(),
            SettingsFocus::Fields => app.adjust_setting(true),
        },
        KeyCode::Char('l') | KeyCode::Right => match app.settings_focus {
            SettingsFocus::Sections => app.toggle_settings_focus(),
            SettingsFocus::Fields => app.adjust_setting(true),
        },
        KeyCode::Char('h') | KeyCode::Left => match app.settings_focus {
            SettingsFocus::Sections => {}
            SettingsFocus::Fields if app.field_state.selected() == Some(0) => {
                app.toggle_settings_focus();
            }
            SettingsFocus::Fields => app.adjust_setting(false),
        },
        KeyCode::Char('p') => {
            if app.current_field() == Some(SettingField::Voice) {
                app.play_voice_sample();
            }
        }
        _ => {}
    }
}

fn handle_paste(app: &mut App, text: &str) {
    if app.show_attach_prompt {
        app.attach_input.push_str(text.trim_end_matches(['\r', '\n']));
        return;
    }
    match app.input_mode {
        InputMode::Editing if !app.chat.is_pending() => app.chat.insert_str(text),
        InputMode::Searching => {
            for c in text.chars().filter(|c| !c.is_control()) {
                app.search_push(c);
            }
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    // Position-based scrolling
    let in_sidebar = app.sidebar_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_messages = app.messages_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if in_messages {
                app.scroll_chat_down(3);
            } else if in_sidebar {
                app.sidebar_nav_down();
            }
        }
        MouseEventKind::ScrollUp => {
            if in_messages {
                app.scroll_chat_up(3);
            } else if in_sidebar {
                app.sidebar_nav_up();
            }
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::app;
    use parley_core::ChatRole;

    fn press(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
        handle_key(app, KeyEvent::new(code, modifiers));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    #[tokio::test]
    async fn test_enter_sends_message() {
        let mut app = app();
        assert_eq!(app.input_mode, InputMode::Editing);
        type_text(&mut app, "Hello");

        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);

        let messages = app.active_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, ChatRole::User);
        assert_eq!(messages[0].content, "Hello");
        assert!(app.chat.is_pending());
        assert_eq!(app.chat.input(), "");
    }

    #[tokio::test]
    async fn test_shift_or_alt_enter_inserts_newline() {
        for modifier in [KeyModifiers::SHIFT, KeyModifiers::ALT] {
            let mut app = app();
            type_text(&mut app, "Hello");
            press(&mut app, KeyCode::Enter, modifier);
            type_text(&mut app, "there");

            assert_eq!(app.chat.input(), "Hello\nthere");
            assert!(app.active_messages().is_empty());
            assert!(!app.chat.is_pending());
        }
    }

    #[tokio::test]
    async fn test_input_is_read_only_while_reply_pending() {
        let mut app = app();
        type_text(&mut app, "Hello");
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert!(app.chat.is_pending());

        type_text(&mut app, "more");
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        press(&mut app, KeyCode::Enter, KeyModifiers::ALT);
        handle_paste(&mut app, "pasted");

        assert_eq!(app.chat.input(), "");
        assert_eq!(app.active_messages().len(), 1);

        // Esc still leaves insert mode
        press(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_blank_enter_does_nothing() {
        let mut app = app();
        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert!(app.active_messages().is_empty());
        assert!(app.notification.is_none());
    }

    #[test]
    fn test_ctrl_c_quits_from_any_mode() {
        let mut app = app();
        app.open_settings();
        press(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }

    #[test]
    fn test_point_in_rect() {
        let rect = Rect::new(2, 3, 10, 5);
        assert!(point_in_rect(2, 3, rect));
        assert!(point_in_rect(11, 7, rect));
        assert!(!point_in_rect(12, 7, rect));
        assert!(!point_in_rect(5, 8, rect));
    }
}
