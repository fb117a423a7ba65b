use async_trait::async_trait;

use crate::error::ChatResult;
use crate::streaming::DeltaStream;
use crate::types::ChatRequest;

/// Anything that can run a streaming chat completion
///
/// Resolves once the response headers are in. A non-200 status is an
/// error here; everything after that arrives through the stream.
#[async_trait]
pub trait StreamingChat: Send + Sync {
    async fn send_streaming_chat(&self, request: ChatRequest) -> ChatResult<DeltaStream>;
}
