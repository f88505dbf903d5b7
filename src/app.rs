use anyhow::Result;
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;

use invoice_chat::client::{AssistantClient, AuthResponse, ChatResponse};
use invoice_chat::config::Config;
use invoice_chat::conversation::ConversationController;
use invoice_chat::session::SessionController;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    History,
    Suggestions,
    Input,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Controllers: all session state lives here, the view only reads it
    pub session: SessionController,
    pub conversation: ConversationController,

    // Login form state
    pub name_input: String,
    pub name_cursor: usize,

    // Compose cursor (the buffer itself belongs to the conversation)
    pub input_cursor: usize,

    // Chat log viewport
    pub chat_scroll: u16,
    pub chat_height: u16, // Inner height of the log area, set during render
    pub chat_width: u16,  // Inner width of the log area, for wrap calculations

    // Suggestion chip selection
    pub suggestion_state: ListState,

    // Animation state (0-2 for ellipsis animation)
    pub animation_frame: u8,

    // Outstanding network tasks; their results are always applied, there
    // is no cancellation
    pub auth_task: Option<JoinHandle<(String, Result<AuthResponse>)>>,
    pub chat_task: Option<JoinHandle<Result<ChatResponse>>>,

    pub client: AssistantClient,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let client = AssistantClient::new(&config.api_url(), &config.api_key());

        Self {
            should_quit: false,
            screen: Screen::Login,
            input_mode: InputMode::Editing,
            focus: FocusPane::Input,

            session: SessionController::new(),
            conversation: ConversationController::new(),

            name_input: String::new(),
            name_cursor: 0,

            input_cursor: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            suggestion_state: ListState::default(),

            animation_frame: 0,

            auth_task: None,
            chat_task: None,

            client,
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.is_authenticating() || self.conversation.in_flight() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Apply any finished network task back onto the controllers. Called by
    /// the event loop before every draw; tick events guarantee it runs even
    /// while the user is idle.
    pub async fn poll_requests(&mut self) {
        if self.auth_task.as_ref().map(|t| t.is_finished()).unwrap_or(false) {
            if let Some(task) = self.auth_task.take() {
                match task.await {
                    Ok((name, Ok(auth))) => self.finish_authentication(name, auth),
                    Ok((name, Err(err))) => {
                        tracing::error!("Authentication request for {} failed: {:#}", name, err);
                        self.session.fail_authentication();
                        self.conversation.note_auth_failure();
                    }
                    Err(err) => {
                        tracing::error!("Authentication task aborted: {}", err);
                        self.session.fail_authentication();
                        self.conversation.note_auth_failure();
                    }
                }
            }
        }

        if self.chat_task.as_ref().map(|t| t.is_finished()).unwrap_or(false) {
            if let Some(task) = self.chat_task.take() {
                match task.await {
                    Ok(Ok(chat)) => {
                        self.conversation
                            .complete_exchange(chat.response, chat.suggestions.unwrap_or_default());
                    }
                    Ok(Err(err)) => {
                        tracing::error!("Chat request failed: {:#}", err);
                        self.conversation.fail_exchange();
                    }
                    Err(err) => {
                        tracing::error!("Chat task aborted: {}", err);
                        self.conversation.fail_exchange();
                    }
                }
                self.suggestion_state.select(None);
                self.scroll_chat_to_bottom();
            }
        }
    }

    fn finish_authentication(&mut self, name: String, auth: AuthResponse) {
        if !auth.success {
            // Declined without a transport error: the form stays put and
            // nothing user-visible changes
            tracing::warn!("Authentication declined for {}", name);
            self.session.fail_authentication();
            return;
        }

        self.session.complete_authentication(name);
        self.conversation
            .begin_session(auth.message, auth.suggestions.unwrap_or_default());

        self.screen = Screen::Chat;
        self.focus = FocusPane::Input;
        self.input_mode = InputMode::Editing;
        self.input_cursor = 0;
        self.suggestion_state.select(None);
        self.chat_scroll = 0;
    }

    // Chat log scrolling

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        let max_scroll = self.chat_line_count().saturating_sub(self.chat_height);
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max_scroll);
    }

    /// Scroll so the latest turn (or the thinking indicator) is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        let total_lines = self.chat_line_count();
        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        } else {
            self.chat_scroll = 0;
        }
    }

    /// Number of rendered lines in the chat log, accounting for wrapping.
    /// Mirrors the layout produced by the render path.
    fn chat_line_count(&self) -> u16 {
        // Use the actual log width for wrap calculation, default until the
        // first render has measured it
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in self.conversation.messages() {
            total_lines += 1; // Role line ("You:" or "Assistant:")
            for line in msg.content.lines() {
                // Character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // Blank line after message
        }

        if self.conversation.in_flight() {
            total_lines += 2; // "Assistant:" + "Thinking..."
        }

        total_lines
    }

    // Suggestion chip navigation

    pub fn suggestions_nav_down(&mut self) {
        let len = self.conversation.suggestions().len();
        if len > 0 {
            let i = self.suggestion_state.selected().unwrap_or(0);
            self.suggestion_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn suggestions_nav_up(&mut self) {
        let i = self.suggestion_state.selected().unwrap_or(0);
        self.suggestion_state.select(Some(i.saturating_sub(1)));
    }

    /// Copy the highlighted suggestion into the compose buffer and hand
    /// focus to the input so Enter sends it.
    pub fn pick_selected_suggestion(&mut self) {
        if let Some(i) = self.suggestion_state.selected() {
            if let Some(text) = self.conversation.suggestions().get(i).cloned() {
                self.conversation.select_suggestion(&text);
                self.input_cursor = self.conversation.input_char_count();
                self.focus = FocusPane::Input;
                self.input_mode = InputMode::Editing;
            }
        }
    }
}
