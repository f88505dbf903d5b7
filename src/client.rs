use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::ChatMessage;

/// Static pre-shared application credential, sent on every request.
pub const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Serialize)]
struct ChatRequest<'a> {
    customer_name: &'a str,
    message: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub context: Option<Value>,
    #[serde(default)]
    pub suggestions: Option<Vec<String>>,
}

/// Chat response as the backend sends it. The `sql`, `row_count`, `data`,
/// and `error` fields are part of the wire shape but are not surfaced by
/// the terminal UI.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub sql: Option<String>,
    #[serde(default)]
    pub row_count: Option<i64>,
    #[serde(default)]
    pub data: Option<Vec<Value>>,
    #[serde(default)]
    pub suggestions: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Deserialize)]
struct HistoryResponse {
    history: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ClearResponse {
    message: String,
}

#[derive(Clone)]
pub struct AssistantClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AssistantClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Authenticate a customer by name. The backend expects the same request
    /// body as `chat`, with an empty initial message.
    pub async fn authenticate(&self, customer_name: &str) -> Result<AuthResponse> {
        let url = format!("{}/authenticate", self.base_url);

        let request = ChatRequest {
            customer_name,
            message: "",
        };

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "authenticate failed with status: {}",
                response.status()
            ));
        }

        Ok(response.json().await?)
    }

    pub async fn chat(&self, customer_name: &str, message: &str) -> Result<ChatResponse> {
        let url = format!("{}/chat", self.base_url);

        let request = ChatRequest {
            customer_name,
            message,
        };

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("chat failed with status: {}", response.status()));
        }

        Ok(response.json().await?)
    }

    /// Fetch the server-side transcript for a customer. The local log is
    /// never rehydrated from this; it exists for diagnostics and tooling.
    pub async fn history(&self, customer_name: &str) -> Result<Vec<ChatMessage>> {
        let url = format!("{}/history/{}", self.base_url, customer_name);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "history fetch failed with status: {}",
                response.status()
            ));
        }

        let history: HistoryResponse = response.json().await?;
        Ok(history.history)
    }

    /// Ask the backend to drop its conversation memory for a customer.
    pub async fn clear_history(&self, customer_name: &str) -> Result<String> {
        let url = format!("{}/clear/{}", self.base_url, customer_name);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "clear history failed with status: {}",
                response.status()
            ));
        }

        let cleared: ClearResponse = response.json().await?;
        Ok(cleared.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ChatRole;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_authenticate_sends_key_and_parses_response() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/authenticate")
            .match_header("x-api-key", "test-key")
            .match_body(Matcher::Json(serde_json::json!({
                "customer_name": "Alice",
                "message": "",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"success": true, "message": "Welcome Alice!", "suggestions": ["Show invoice #1"]}"#,
            )
            .create_async()
            .await;

        let client = AssistantClient::new(&server.url(), "test-key");
        let auth = client.authenticate("Alice").await.unwrap();

        mock.assert_async().await;
        assert!(auth.success);
        assert_eq!(auth.message, "Welcome Alice!");
        assert_eq!(auth.suggestions.unwrap(), vec!["Show invoice #1"]);
        assert!(auth.context.is_none());
    }

    #[tokio::test]
    async fn test_authenticate_error_status() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/authenticate")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail": "Invalid API key"}"#)
            .create_async()
            .await;

        let client = AssistantClient::new(&server.url(), "wrong-key");
        let err = client.authenticate("Alice").await.unwrap_err();
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn test_chat_parses_full_response_shape() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/chat")
            .match_header("x-api-key", "test-key")
            .match_body(Matcher::Json(serde_json::json!({
                "customer_name": "Alice",
                "message": "Show invoice #1",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "response": "Here it is",
                    "sql": "SELECT * FROM invoices WHERE id = 1",
                    "row_count": 1,
                    "data": [{"id": 1, "amount": 120.5}],
                    "suggestions": []
                }"#,
            )
            .create_async()
            .await;

        let client = AssistantClient::new(&server.url(), "test-key");
        let chat = client.chat("Alice", "Show invoice #1").await.unwrap();

        assert_eq!(chat.response, "Here it is");
        assert_eq!(chat.row_count, Some(1));
        assert_eq!(chat.suggestions.unwrap(), Vec::<String>::new());
        assert!(chat.error.is_none());
    }

    #[tokio::test]
    async fn test_chat_minimal_response_body() {
        let mut server = mockito::Server::new_async().await;

        // Optional fields absent entirely
        let _mock = server
            .mock("POST", "/chat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"response": "Hello"}"#)
            .create_async()
            .await;

        let client = AssistantClient::new(&server.url(), "test-key");
        let chat = client.chat("Alice", "Hi").await.unwrap();

        assert_eq!(chat.response, "Hello");
        assert!(chat.suggestions.is_none());
        assert!(chat.sql.is_none());
        assert!(chat.data.is_none());
    }

    #[tokio::test]
    async fn test_history_decodes_transcript() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("GET", "/history/Alice")
            .match_header("x-api-key", "test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"history": [
                    {"role": "assistant", "content": "Welcome Alice!"},
                    {"role": "user", "content": "Show invoice #1"}
                ]}"#,
            )
            .create_async()
            .await;

        let client = AssistantClient::new(&server.url(), "test-key");
        let history = client.history("Alice").await.unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, ChatRole::Assistant);
        assert_eq!(history[1].content, "Show invoice #1");
    }

    #[tokio::test]
    async fn test_clear_history() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/clear/Alice")
            .match_header("x-api-key", "test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "Chat history cleared successfully"}"#)
            .create_async()
            .await;

        let client = AssistantClient::new(&server.url(), "test-key");
        let message = client.clear_history("Alice").await.unwrap();

        mock.assert_async().await;
        assert_eq!(message, "Chat history cleared successfully");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = AssistantClient::new("http://localhost:8000/api/", "k");
        assert_eq!(client.base_url, "http://localhost:8000/api");
    }
}
