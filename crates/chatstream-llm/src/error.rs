use reqwest::StatusCode;
use thiserror::Error;

/// Errors that end a streaming chat call before any fragment is produced
#[derive(Debug, Error)]
pub enum ChatError {
    /// The endpoint answered with something other than 200 OK
    #[error("HTTP status error ({status}): {body}")]
    HttpStatus { status: StatusCode, body: String },

    /// The request could not be built or sent
    #[error("Failed to send request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ChatError {
    /// Status code for `HttpStatus`, `None` otherwise
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ChatError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors yielded inside the fragment stream.
///
/// `Decode` and `Parse` concern a single line and the stream keeps going
/// after them. `Transport` is the last item the stream produces.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Invalid UTF-8 in line: {0}")]
    Decode(#[from] std::str::Utf8Error),

    #[error("Failed to parse chunk: {source} (line: {line})")]
    Parse {
        #[source]
        source: serde_json::Error,
        line: String,
    },

    #[error("Stream error: {0}")]
    Transport(String),
}

impl StreamError {
    /// Whether the stream continues after this error
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, StreamError::Transport(_))
    }
}

pub type ChatResult<T> = Result<T, ChatError>;
