use serde::Serialize;
use std::fmt;

use super::message::Message;
use crate::error::{ChatError, ChatResult};

/// A single streaming chat-completion request.
///
/// Built once and sent once. The body always carries `"stream": true`;
/// optional sampling fields are only serialized when set.
#[derive(Clone)]
pub struct ChatRequest {
    endpoint: String,
    api_key: String,
    model: String,
    messages: Vec<Message>,
    options: ChatOptions,
}

impl ChatRequest {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        messages: Vec<Message>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            messages,
            options: ChatOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn options(&self) -> &ChatOptions {
        &self.options
    }

    /// Check the preconditions for sending: endpoint, key and messages present
    pub fn validate(&self) -> ChatResult<()> {
        if self.endpoint.trim().is_empty() {
            return Err(ChatError::InvalidRequest("endpoint URL is empty".to_string()));
        }
        if self.api_key.is_empty() {
            return Err(ChatError::InvalidRequest("API key is empty".to_string()));
        }
        if self.messages.is_empty() {
            return Err(ChatError::InvalidRequest("message list is empty".to_string()));
        }
        Ok(())
    }

    /// JSON body sent to the endpoint
    pub fn body(&self) -> ChatCompletionBody<'_> {
        ChatCompletionBody {
            messages: &self.messages,
            model: &self.model,
            stream: true,
            temperature: self.options.temperature,
            max_tokens: self.options.max_tokens,
        }
    }
}

impl fmt::Debug for ChatRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatRequest")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("messages", &self.messages)
            .field("options", &self.options)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionBody<'a> {
    pub messages: &'a [Message],
    pub model: &'a str,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ChatRequest {
        ChatRequest::new(
            "http://localhost:3000/v1/chat/completions",
            "sk-test",
            "gpt-4",
            vec![Message::user("hello")],
        )
    }

    #[test]
    fn test_body_minimal_shape() {
        let json = serde_json::to_value(request().body()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "messages": [{"role": "user", "content": "hello"}],
                "model": "gpt-4",
                "stream": true,
            })
        );
    }

    #[test]
    fn test_body_with_options() {
        let req = request().with_options(ChatOptions::new().max_tokens(256));
        let json = serde_json::to_value(req.body()).unwrap();
        assert_eq!(json["max_tokens"], 256);
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_validate_rejects_empty_messages() {
        let req = ChatRequest::new("http://x", "key", "m", vec![]);
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("message list"));
    }

    #[test]
    fn test_validate_rejects_empty_key() {
        let req = ChatRequest::new("http://x", "", "m", vec![Message::user("hi")]);
        assert!(matches!(req.validate(), Err(ChatError::InvalidRequest(_))));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let debug = format!("{:?}", request());
        assert!(!debug.contains("sk-test"));
        assert!(debug.contains("<redacted>"));
    }
}
