use futures::Stream;
use serde::Deserialize;
use std::pin::Pin;

use crate::error::StreamError;

/// Line that ends the stream
pub const DONE_SENTINEL: &str = "data: [DONE]";

/// Number of characters dropped from the front of every data line (`data: `)
pub const DATA_PREFIX_CHARS: usize = 6;

/// Lazy sequence of delta fragments; per-line errors are interleaved as `Err` items
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<String, StreamError>> + Send>>;

#[derive(Debug, Clone, Deserialize)]
pub struct ChatStreamChunk {
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub delta: Delta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatStreamChunk {
    /// `choices[0].delta.content`; `None` when `choices` is empty
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .map(|c| c.delta.content.as_deref().unwrap_or_default())
    }
}

/// What a single decoded line contributes to the stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Sentinel seen; nothing after it is read
    Done,
    Fragment(String),
    /// Blank line, empty `choices` or empty content
    Skip,
}

/// Interpret one decoded line of the response body.
///
/// Parse failures carry the raw line so the caller can report it.
pub fn interpret_line(line: &str) -> Result<LineOutcome, StreamError> {
    if line.is_empty() {
        return Ok(LineOutcome::Skip);
    }

    if line == DONE_SENTINEL {
        return Ok(LineOutcome::Done);
    }

    let payload = strip_data_prefix(line);
    let chunk: ChatStreamChunk =
        serde_json::from_str(payload).map_err(|source| StreamError::Parse {
            source,
            line: line.to_string(),
        })?;

    match chunk.content() {
        Some(content) if !content.is_empty() => Ok(LineOutcome::Fragment(content.to_string())),
        _ => Ok(LineOutcome::Skip),
    }
}

// Drops the first six characters whether or not they spell `data: `.
fn strip_data_prefix(line: &str) -> &str {
    match line.char_indices().nth(DATA_PREFIX_CHARS) {
        Some((idx, _)) => &line[idx..],
        None => "",
    }
}
