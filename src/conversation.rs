//! Conversation controller
//!
//! Owns the message log, the suggestion set, the pending-input buffer, and
//! the in-flight flag for the authenticated part of a session. Like the
//! session controller it is pure state: the event loop issues the network
//! call with whatever `submit_message` hands back and reports the outcome
//! through `complete_exchange` / `fail_exchange`.
//!
//! The log is append-only. The first entry of an authenticated session is
//! always the greeting installed by `begin_session`; after that, entries
//! alternate user/assistant for every exchange that resolves.
//!
//! There is deliberately no mutual-exclusion guard here: calling
//! `submit_message` while a request is outstanding starts another exchange.
//! The only duplicate-submission guard lives in the view layer, which
//! refuses to spawn a second task while one is in flight.

use crate::state::{ChatMessage, ChatRole};

pub const AUTH_ERROR_NOTICE: &str = "Authentication failed. Please try again.";
pub const CHAT_ERROR_NOTICE: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Default)]
pub struct ConversationController {
    messages: Vec<ChatMessage>,
    suggestions: Vec<String>,
    input: String,
    in_flight: bool,
}

impl ConversationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// True while a chat round trip is outstanding.
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Start the authenticated session: the log is replaced with the
    /// greeting returned by authentication, and the suggestion set with
    /// whatever came alongside it.
    pub fn begin_session(&mut self, greeting: String, suggestions: Vec<String>) {
        self.messages = vec![ChatMessage::assistant(greeting)];
        self.suggestions = suggestions;
    }

    /// Record a failed authentication attempt in the log. Suggestions are
    /// left as they were.
    pub fn note_auth_failure(&mut self) {
        self.messages.push(ChatMessage::assistant(AUTH_ERROR_NOTICE));
    }

    /// Submit the pending input. Blank (after trimming) input is a no-op
    /// and returns `None`. Otherwise the buffer is cleared, the user turn
    /// is appended before any network traffic happens, the in-flight flag
    /// is raised, and the trimmed text is returned for the caller to send.
    pub fn submit_message(&mut self) -> Option<String> {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return None;
        }

        self.input.clear();
        self.messages.push(ChatMessage::user(text.clone()));
        self.in_flight = true;
        Some(text)
    }

    /// A chat request resolved successfully: append the assistant turn and
    /// replace the suggestion set.
    pub fn complete_exchange(&mut self, response: String, suggestions: Vec<String>) {
        self.messages.push(ChatMessage::assistant(response));
        self.suggestions = suggestions;
        self.in_flight = false;
    }

    /// A chat request failed: append the fixed error notice and leave the
    /// suggestion set untouched.
    pub fn fail_exchange(&mut self) {
        self.messages.push(ChatMessage::assistant(CHAT_ERROR_NOTICE));
        self.in_flight = false;
    }

    /// Copy a suggestion into the pending-input buffer. No request is
    /// issued and the suggestion set is not consumed.
    pub fn select_suggestion(&mut self, text: &str) {
        self.input = text.to_string();
    }

    // Pending-input buffer editing. Indices are in characters; callers keep
    // their own cursor.

    pub fn insert_char(&mut self, char_idx: usize, c: char) {
        let byte_pos = char_to_byte_index(&self.input, char_idx);
        self.input.insert(byte_pos, c);
    }

    pub fn remove_char(&mut self, char_idx: usize) {
        let byte_pos = char_to_byte_index(&self.input, char_idx);
        if byte_pos < self.input.len() {
            self.input.remove(byte_pos);
        }
    }

    pub fn input_char_count(&self) -> usize {
        self.input.chars().count()
    }
}

/// Convert a character index to a byte index for UTF-8 safe string edits
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticated() -> ConversationController {
        let mut conversation = ConversationController::new();
        conversation.begin_session(
            "Hi Alice".to_string(),
            vec!["Show invoice #1".to_string()],
        );
        conversation
    }

    #[test]
    fn test_greeting_scenario() {
        let conversation = authenticated();

        assert_eq!(conversation.messages().len(), 1);
        assert_eq!(conversation.messages()[0].role, ChatRole::Assistant);
        assert_eq!(conversation.messages()[0].content, "Hi Alice");
        assert_eq!(conversation.suggestions(), ["Show invoice #1"]);
    }

    #[test]
    fn test_exchange_scenario() {
        let mut conversation = authenticated();

        conversation.select_suggestion("Show invoice #1");
        let sent = conversation.submit_message().unwrap();
        assert_eq!(sent, "Show invoice #1");

        conversation.complete_exchange("Here it is".to_string(), Vec::new());

        let log: Vec<(ChatRole, &str)> = conversation
            .messages()
            .iter()
            .map(|m| (m.role, m.content.as_str()))
            .collect();
        assert_eq!(
            log,
            vec![
                (ChatRole::Assistant, "Hi Alice"),
                (ChatRole::User, "Show invoice #1"),
                (ChatRole::Assistant, "Here it is"),
            ]
        );
        assert!(conversation.suggestions().is_empty());
    }

    #[test]
    fn test_log_alternates_over_many_exchanges() {
        let mut conversation = authenticated();

        for i in 0..5 {
            conversation.select_suggestion(&format!("question {i}"));
            conversation.submit_message().unwrap();
            conversation.complete_exchange(format!("answer {i}"), Vec::new());
        }

        // 1 greeting + 2 per successful submission
        assert_eq!(conversation.messages().len(), 1 + 2 * 5);
        for (i, message) in conversation.messages().iter().enumerate() {
            let expected = if i % 2 == 0 {
                ChatRole::Assistant
            } else {
                ChatRole::User
            };
            assert_eq!(message.role, expected, "message {i}");
        }
    }

    #[test]
    fn test_blank_input_is_a_no_op() {
        let mut conversation = authenticated();

        conversation.select_suggestion("   ");
        assert!(conversation.submit_message().is_none());

        assert_eq!(conversation.messages().len(), 1);
        assert_eq!(conversation.suggestions(), ["Show invoice #1"]);
        assert!(!conversation.in_flight());
    }

    #[test]
    fn test_submission_trims_and_clears_buffer() {
        let mut conversation = authenticated();

        conversation.select_suggestion("  how much do I owe?  ");
        let sent = conversation.submit_message().unwrap();

        assert_eq!(sent, "how much do I owe?");
        assert_eq!(conversation.input(), "");
        // Optimistic echo: the user turn is in the log before any response
        assert_eq!(conversation.messages().last().unwrap().content, "how much do I owe?");
        assert_eq!(conversation.messages().last().unwrap().role, ChatRole::User);
    }

    #[test]
    fn test_failure_appends_notice_and_keeps_suggestions() {
        let mut conversation = authenticated();

        conversation.select_suggestion("Show invoice #1");
        conversation.submit_message().unwrap();
        let before = conversation.messages().len();

        conversation.fail_exchange();

        assert_eq!(conversation.messages().len(), before + 1);
        assert_eq!(
            conversation.messages().last().unwrap().content,
            CHAT_ERROR_NOTICE
        );
        assert_eq!(conversation.suggestions(), ["Show invoice #1"]);
        assert!(!conversation.in_flight());
    }

    #[test]
    fn test_in_flight_only_during_pendency() {
        let mut conversation = authenticated();
        assert!(!conversation.in_flight());

        conversation.select_suggestion("hello");
        conversation.submit_message().unwrap();
        assert!(conversation.in_flight());

        conversation.complete_exchange("hi".to_string(), Vec::new());
        assert!(!conversation.in_flight());

        conversation.select_suggestion("again");
        conversation.submit_message().unwrap();
        assert!(conversation.in_flight());

        conversation.fail_exchange();
        assert!(!conversation.in_flight());
    }

    #[test]
    fn test_select_suggestion_touches_only_the_buffer() {
        let mut conversation = authenticated();

        conversation.select_suggestion("Show invoice #1");

        assert_eq!(conversation.input(), "Show invoice #1");
        assert_eq!(conversation.messages().len(), 1);
        assert_eq!(conversation.suggestions(), ["Show invoice #1"]);
    }

    #[test]
    fn test_auth_failure_notice() {
        let mut conversation = ConversationController::new();

        conversation.note_auth_failure();

        assert_eq!(conversation.messages().len(), 1);
        assert_eq!(conversation.messages()[0].role, ChatRole::Assistant);
        assert_eq!(conversation.messages()[0].content, AUTH_ERROR_NOTICE);
        assert!(conversation.suggestions().is_empty());
    }

    #[test]
    fn test_begin_session_replaces_prior_failure_notices() {
        let mut conversation = ConversationController::new();
        conversation.note_auth_failure();

        conversation.begin_session("Welcome Bob!".to_string(), Vec::new());

        assert_eq!(conversation.messages().len(), 1);
        assert_eq!(conversation.messages()[0].content, "Welcome Bob!");
    }

    #[test]
    fn test_buffer_editing_is_utf8_safe() {
        let mut conversation = ConversationController::new();

        conversation.insert_char(0, 'é');
        conversation.insert_char(1, '1');
        conversation.insert_char(1, '€');
        assert_eq!(conversation.input(), "é€1");

        conversation.remove_char(1);
        assert_eq!(conversation.input(), "é1");
        assert_eq!(conversation.input_char_count(), 2);

        // Out-of-range removal is ignored
        conversation.remove_char(10);
        assert_eq!(conversation.input(), "é1");
    }
}
