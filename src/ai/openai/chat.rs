use super::client::OpenAiHttpClient;
use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ResponseFormat};
use crate::ai::ChatService;
use crate::models::Message;
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

pub struct OpenAiChatClient {
    http: OpenAiHttpClient,
    model: String,
    json_model: String,
}

impl OpenAiChatClient {
    pub fn new_with_client(
        api_key: String,
        model: String,
        json_model: String,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: OpenAiHttpClient::new_with_client(api_key, Duration::from_secs(30), client),
            model,
            json_model,
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    async fn chat_completion(
        &self,
        model: &str,
        messages: &[Message],
        response_format: Option<ResponseFormat>,
    ) -> Result<String> {
        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages: messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.as_str().to_string(),
                    content: Some(m.content.clone()),
                })
                .collect(),
            max_completion_tokens: 3000,
            response_format,
        };

        let response: ChatCompletionResponse =
            self.http.post("/v1/chat/completions", &request).await?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| Error::AiProvider("No response from OpenAI chat API".to_string()))
    }
}

#[async_trait]
impl ChatService for OpenAiChatClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        tracing::debug!("Sending chat completion request ({} messages)", messages.len());
        self.chat_completion(&self.model, messages, None).await
    }

    async fn complete_json(&self, messages: &[Message]) -> Result<String> {
        tracing::debug!(
            "Sending JSON-mode chat completion request ({} messages)",
            messages.len()
        );
        self.chat_completion(&self.json_model, messages, Some(ResponseFormat::json_object()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> OpenAiChatClient {
        OpenAiChatClient::new_with_client(
            "test-key".to_string(),
            "gpt-3.5-turbo".to_string(),
            "gpt-4-1106-preview".to_string(),
            reqwest::Client::new(),
        )
        .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_complete_parses_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": "You stand before a mossy cave entrance."
                    },
                    "finish_reason": "stop"
                }]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let text = client
            .complete(&[Message::user("Begin the quest")])
            .await
            .unwrap();
        assert_eq!(text, "You stand before a mossy cave entrance.");
    }

    #[tokio::test]
    async fn test_complete_sends_configured_model() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains("\"model\":\"gpt-3.5-turbo\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": { "role": "assistant", "content": "onward" },
                    "finish_reason": "stop"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        client.complete(&[Message::user("go")]).await.unwrap();
    }

    #[tokio::test]
    async fn test_complete_json_switches_model_and_format() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_string_contains("\"model\":\"gpt-4-1106-preview\""))
            .and(body_string_contains("\"response_format\":{\"type\":\"json_object\"}"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": "{\"scenario\":\"A cave\",\"question\":\"Enter?\",\"choices\":[\"Yes\",\"No\"]}"
                    },
                    "finish_reason": "stop"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let raw = client.complete_json(&[Message::user("next")]).await.unwrap();
        assert!(raw.contains("\"scenario\""));
    }

    #[tokio::test]
    async fn test_api_error_returns_ai_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.complete(&[Message::user("go")]).await.unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[tokio::test]
    async fn test_empty_choices_is_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let client = test_client(&server);
        let err = client.complete(&[Message::user("go")]).await.unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }
}
