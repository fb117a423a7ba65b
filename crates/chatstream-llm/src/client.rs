// HTTP client for OpenAI-compatible chat completion endpoints

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use std::time::Duration;

use crate::buffer_utils::parse_delta_stream;
use crate::error::{ChatError, ChatResult};
use crate::streaming::DeltaStream;
use crate::traits::StreamingChat;
use crate::types::ChatRequest;

/// Upper bound on how much of a rejected response body is kept
const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;

/// Time allowed for reading a rejected response body
const DEFAULT_ERROR_BODY_TIMEOUT: Duration = Duration::from_secs(5);

/// Streaming chat client (HTTP direct, no SDK)
///
/// Endpoint and credentials travel with each [`ChatRequest`], so one
/// client can be reused for any number of independent calls.
#[derive(Debug, Clone)]
pub struct StreamingChatClient {
    http_client: reqwest::Client,
    error_body_timeout: Duration,
}

impl StreamingChatClient {
    /// Client with no timeouts
    pub fn new() -> ChatResult<Self> {
        Self::builder().build()
    }

    pub fn builder() -> StreamingChatClientBuilder {
        StreamingChatClientBuilder::default()
    }

    fn build_headers(api_key: &str) -> ChatResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|_| ChatError::InvalidRequest("Invalid API key format".to_string()))?,
        );
        Ok(headers)
    }
}

#[async_trait]
impl StreamingChat for StreamingChatClient {
    async fn send_streaming_chat(&self, request: ChatRequest) -> ChatResult<DeltaStream> {
        request.validate()?;
        let headers = Self::build_headers(request.api_key())?;

        tracing::debug!(
            endpoint = request.endpoint(),
            model = request.model(),
            messages = request.messages().len(),
            "Sending streaming chat request"
        );

        let response = self
            .http_client
            .post(request.endpoint())
            .headers(headers)
            .json(&request.body())
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = read_error_body(response, self.error_body_timeout).await;
            return Err(ChatError::HttpStatus { status, body });
        }

        Ok(parse_delta_stream(response.bytes_stream()))
    }
}

/// Collect what the server sends with a rejection, up to a size and time limit.
///
/// A server may keep the connection open after an error status; whatever
/// arrived before the deadline is returned.
async fn read_error_body(mut response: reqwest::Response, limit: Duration) -> String {
    let mut body = Vec::new();

    let read = async {
        while let Ok(Some(chunk)) = response.chunk().await {
            body.extend_from_slice(&chunk);
            if body.len() >= MAX_ERROR_BODY_BYTES {
                break;
            }
        }
    };

    if tokio::time::timeout(limit, read).await.is_err() {
        tracing::debug!(bytes = body.len(), "Error body still open after deadline, truncating");
    }

    body.truncate(MAX_ERROR_BODY_BYTES);
    String::from_utf8_lossy(&body).into_owned()
}

/// Builder for StreamingChatClient
#[derive(Debug, Default)]
pub struct StreamingChatClientBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    error_body_timeout: Option<Duration>,
}

impl StreamingChatClientBuilder {
    /// Total time allowed for a call, body included
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// How long to wait for the body of a non-200 response (default 5s)
    pub fn error_body_timeout(mut self, timeout: Duration) -> Self {
        self.error_body_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> ChatResult<StreamingChatClient> {
        let mut builder = reqwest::Client::builder();

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        Ok(StreamingChatClient {
            http_client: builder.build()?,
            error_body_timeout: self.error_body_timeout.unwrap_or(DEFAULT_ERROR_BODY_TIMEOUT),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;

    #[test]
    fn test_builder_defaults() {
        assert!(StreamingChatClient::new().is_ok());
    }

    #[test]
    fn test_builder_with_timeouts() {
        let client = StreamingChatClient::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build();
        assert!(client.is_ok());
    }

    #[test]
    fn test_bearer_header() {
        let headers = StreamingChatClient::build_headers("sk-abc").unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer sk-abc");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_invalid_api_key_rejected() {
        let err = StreamingChatClient::build_headers("bad\nkey").unwrap_err();
        assert!(matches!(err, ChatError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_invalid_request_not_sent() {
        let client = StreamingChatClient::new().unwrap();
        let request = ChatRequest::new("", "key", "model", vec![Message::user("hi")]);

        let result = client.send_streaming_chat(request).await;
        assert!(matches!(result, Err(ChatError::InvalidRequest(_))));
    }
}
