use futures::{Stream, StreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::StreamError;

/// What a consumed stream produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamSummary {
    /// All fragments concatenated
    pub text: String,
    pub fragments: usize,
    /// Decode and parse errors reported along the way
    pub line_errors: usize,
    /// Set when the stream ended on a transport failure
    pub transport_error: Option<String>,
}

/// Write each fragment to `writer` as it arrives.
///
/// Per-line errors are logged and counted, then reading continues. Only
/// I/O errors on `writer` are returned.
pub async fn write_fragments<S, W>(mut stream: S, writer: &mut W) -> std::io::Result<StreamSummary>
where
    S: Stream<Item = Result<String, StreamError>> + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut summary = StreamSummary::default();

    while let Some(item) = stream.next().await {
        match item {
            Ok(fragment) => {
                writer.write_all(fragment.as_bytes()).await?;
                writer.flush().await?;
                summary.fragments += 1;
                summary.text.push_str(&fragment);
            }
            Err(StreamError::Parse { source, line }) => {
                tracing::error!(error = %source, line = %line, "Failed to parse stream line");
                summary.line_errors += 1;
            }
            Err(StreamError::Decode(e)) => {
                tracing::error!(error = %e, "Failed to decode stream line");
                summary.line_errors += 1;
            }
            Err(StreamError::Transport(e)) => {
                tracing::error!(error = %e, "Response stream failed");
                summary.transport_error = Some(e);
            }
        }
    }

    Ok(summary)
}
