use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use invoice_chat::conversation::char_to_byte_index;

use crate::app::{App, FocusPane, InputMode, Screen};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global quit, works in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.screen {
        Screen::Login => handle_login_key(app, key),
        Screen::Chat => match app.input_mode {
            InputMode::Normal => handle_chat_normal(app, key),
            InputMode::Editing => handle_chat_editing(app, key),
        },
    }
}

/// The login form is a single text field; it is always in editing mode.
fn handle_login_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.should_quit = true,

        KeyCode::Enter => {
            // Empty submissions are rejected by the widget, and the send
            // affordance stays disabled while a request is outstanding
            if !app.name_input.trim().is_empty() && app.auth_task.is_none() {
                app.session.begin_authentication();

                let client = app.client.clone();
                let name = app.name_input.trim().to_string();
                app.auth_task = Some(tokio::spawn(async move {
                    let result = client.authenticate(&name).await;
                    (name, result)
                }));
            }
        }

        KeyCode::Backspace => {
            if app.name_cursor > 0 {
                app.name_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.name_input, app.name_cursor);
                app.name_input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.name_input.chars().count();
            if app.name_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.name_input, app.name_cursor);
                app.name_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.name_cursor = app.name_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.name_input.chars().count();
            app.name_cursor = (app.name_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.name_cursor = 0;
        }
        KeyCode::End => {
            app.name_cursor = app.name_input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.name_input, app.name_cursor);
            app.name_input.insert(byte_pos, c);
            app.name_cursor += 1;
        }
        _ => {}
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Cycle focus: History -> Suggestions (when present) -> Input
        KeyCode::Tab => {
            app.focus = match app.focus {
                FocusPane::History => {
                    if app.conversation.suggestions().is_empty() {
                        FocusPane::Input
                    } else {
                        if app.suggestion_state.selected().is_none() {
                            app.suggestion_state.select(Some(0));
                        }
                        FocusPane::Suggestions
                    }
                }
                FocusPane::Suggestions => FocusPane::Input,
                FocusPane::Input => FocusPane::History,
            };

            if app.focus == FocusPane::Input {
                app.input_mode = InputMode::Editing;
                app.input_cursor = app.conversation.input_char_count();
            }
        }

        KeyCode::Char('i') => {
            app.focus = FocusPane::Input;
            app.input_mode = InputMode::Editing;
            app.input_cursor = app.conversation.input_char_count();
        }

        KeyCode::Char('j') | KeyCode::Down => match app.focus {
            FocusPane::History => app.scroll_chat_down(1),
            FocusPane::Suggestions => app.suggestions_nav_down(),
            FocusPane::Input => {}
        },
        KeyCode::Char('k') | KeyCode::Up => match app.focus {
            FocusPane::History => app.scroll_chat_up(1),
            FocusPane::Suggestions => app.suggestions_nav_up(),
            FocusPane::Input => {}
        },

        // Half-page scroll
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_chat_down(app.chat_height / 2);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_chat_up(app.chat_height / 2);
        }

        KeyCode::Char('g') => app.chat_scroll = 0,
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),

        KeyCode::Enter => {
            if app.focus == FocusPane::Suggestions {
                app.pick_selected_suggestion();
            }
        }

        _ => {}
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }

        // Leave the input toward the suggestion chips (or the log)
        KeyCode::Tab => {
            app.input_mode = InputMode::Normal;
            app.focus = if app.conversation.suggestions().is_empty() {
                FocusPane::History
            } else {
                if app.suggestion_state.selected().is_none() {
                    app.suggestion_state.select(Some(0));
                }
                FocusPane::Suggestions
            };
        }

        KeyCode::Enter => {
            // View-layer guard: the controller itself does not prevent
            // overlapping requests
            if app.chat_task.is_none() {
                if let Some(text) = app.conversation.submit_message() {
                    app.input_cursor = 0;

                    let client = app.client.clone();
                    let customer_name = app.session.customer_name().to_string();
                    app.chat_task = Some(tokio::spawn(async move {
                        client.chat(&customer_name, &text).await
                    }));

                    // Keep the optimistic echo and the thinking indicator
                    // in view
                    app.scroll_chat_to_bottom();
                }
            }
        }

        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                app.conversation.remove_char(app.input_cursor);
            }
        }
        KeyCode::Delete => {
            if app.input_cursor < app.conversation.input_char_count() {
                app.conversation.remove_char(app.input_cursor);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            app.input_cursor = (app.input_cursor + 1).min(app.conversation.input_char_count());
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.conversation.input_char_count();
        }
        KeyCode::Char(c) => {
            app.conversation.insert_char(app.input_cursor, c);
            app.input_cursor += 1;
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.screen != Screen::Chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_chat_down(3),
        MouseEventKind::ScrollUp => app.scroll_chat_up(3),
        _ => {}
    }
}
