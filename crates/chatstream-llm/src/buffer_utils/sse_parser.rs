use futures::{Stream, StreamExt};
use std::fmt::Display;

use super::buffering::LineBuffer;
use crate::error::StreamError;
use crate::streaming::{interpret_line, DeltaStream, LineOutcome};

enum Step {
    Emit(Result<String, StreamError>),
    Stop,
    Skip,
}

fn step(line_result: Result<String, StreamError>) -> Step {
    let line = match line_result {
        Ok(line) => line,
        Err(e) => return Step::Emit(Err(e)),
    };

    match interpret_line(&line) {
        Ok(LineOutcome::Fragment(content)) => Step::Emit(Ok(content)),
        Ok(LineOutcome::Done) => Step::Stop,
        Ok(LineOutcome::Skip) => Step::Skip,
        Err(e) => Step::Emit(Err(e)),
    }
}

/// Turn a chunked response body into a stream of delta fragments.
///
/// Ends on the `data: [DONE]` line or when the body ends. A transport
/// error is yielded once and ends the stream.
pub fn parse_delta_stream<S, B, E>(byte_stream: S) -> DeltaStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(byte_stream);
        let mut buffer = LineBuffer::with_capacity(4096);

        while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    buffer.extend(bytes.as_ref());

                    while let Some(line_result) = buffer.next_line() {
                        match step(line_result) {
                            Step::Emit(item) => yield item,
                            Step::Stop => {
                                tracing::debug!("Received [DONE] sentinel");
                                return;
                            }
                            Step::Skip => {}
                        }
                    }
                }
                Err(e) => {
                    yield Err(StreamError::Transport(e.to_string()));
                    return;
                }
            }
        }

        if let Some(line_result) = buffer.take_remainder() {
            match step(line_result) {
                Step::Emit(item) => yield item,
                Step::Stop => {
                    tracing::debug!("Received [DONE] sentinel");
                    return;
                }
                Step::Skip => {}
            }
        }

        tracing::warn!("Stream closed without [DONE] sentinel, treating response as complete");
    })
}
