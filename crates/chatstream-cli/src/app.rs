use anyhow::{Context, Result};
use chatstream_llm::{write_fragments, ChatError, ChatRequest, StreamSummary, StreamingChat};
use std::future::Future;
use std::process::ExitCode;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Printed on its own line once the stream has ended
pub const COMPLETION_MARKER: &str = "Done";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(StreamSummary),
    /// Shutdown fired before the stream finished; the connection was dropped
    Interrupted,
    /// Non-200 response; nothing was written to the output
    Rejected { status: u16, body: String },
}

impl RunOutcome {
    /// Stream ran to its end without a transport failure
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Completed(summary) if summary.transport_error.is_none())
    }

    pub fn exit_code(&self) -> ExitCode {
        match self {
            RunOutcome::Interrupted => ExitCode::from(130),
            _ if self.is_success() => ExitCode::SUCCESS,
            _ => ExitCode::FAILURE,
        }
    }
}

/// Send `request`, copy fragments to `out` until the stream ends or
/// `shutdown` resolves, then write the completion marker.
pub async fn run<C, W, F>(client: &C, request: ChatRequest, out: &mut W, shutdown: F) -> Result<RunOutcome>
where
    C: StreamingChat + ?Sized,
    W: AsyncWrite + Unpin,
    F: Future<Output = ()>,
{
    let stream = match client.send_streaming_chat(request).await {
        Ok(stream) => stream,
        Err(ChatError::HttpStatus { status, body }) => {
            return Ok(RunOutcome::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Err(e) => return Err(e).context("Failed to start chat stream"),
    };

    let outcome = tokio::select! {
        summary = write_fragments(stream, out) => {
            let summary = summary.context("Failed to write output")?;
            tracing::debug!(
                fragments = summary.fragments,
                line_errors = summary.line_errors,
                "Stream finished"
            );
            RunOutcome::Completed(summary)
        }
        _ = shutdown => {
            tracing::warn!("Interrupted, closing stream");
            RunOutcome::Interrupted
        }
    };

    out.write_all(format!("\n{}\n", COMPLETION_MARKER).as_bytes())
        .await
        .context("Failed to write output")?;
    out.flush().await.context("Failed to write output")?;

    Ok(outcome)
}
