pub mod types;
pub mod traits;
pub mod error;
pub mod streaming;
pub mod buffer_utils;
pub mod client;
pub mod output;

pub use traits::StreamingChat;
pub use client::{StreamingChatClient, StreamingChatClientBuilder};
pub use error::{ChatError, ChatResult, StreamError};
pub use streaming::{interpret_line, DeltaStream, LineOutcome, DONE_SENTINEL};
pub use buffer_utils::{parse_delta_stream, LineBuffer};
pub use output::{write_fragments, StreamSummary};
pub use types::{ChatOptions, ChatRequest, Message, Role};

pub use reqwest::StatusCode;
