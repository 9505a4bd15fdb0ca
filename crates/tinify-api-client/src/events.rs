//! Completion event stream
//!
//! Wraps the `text/event-stream` body of the status endpoint. Framing is handled
//! by `eventsource-stream`; this module maps the named `complete`, `error` and
//! `timeout` events into [`ChannelEvent`]s and skips everything else.

use async_trait::async_trait;
use bytes::Bytes;
use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use reqwest::Response;
use serde::Deserialize;
use tinify_core::models::CompletionEvent;
use tinify_core::{ChannelEvent, NotificationChannel};

/// Upper bound on bytes read from one completion stream.
pub const MAX_STREAM_BYTES: usize = 1024 * 1024;

type SseStream = BoxStream<'static, Result<Event, EventStreamError<reqwest::Error>>>;

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    message: Option<String>,
}

/// Push subscription for a single job's completion.
pub struct EventStream {
    job_id: String,
    events: Option<SseStream>,
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream")
            .field("job_id", &self.job_id)
            .finish_non_exhaustive()
    }
}

impl EventStream {
    pub fn from_response(job_id: &str, response: Response) -> Self {
        Self::from_stream(job_id, response.bytes_stream())
    }

    pub fn from_stream<S>(job_id: &str, stream: S) -> Self
    where
        S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
    {
        let owner = job_id.to_string();
        let mut received = 0usize;
        let bounded = stream.take_while(move |chunk| {
            if let Ok(bytes) = chunk {
                received += bytes.len();
            }
            let within = received <= MAX_STREAM_BYTES;
            if !within {
                tracing::warn!(job_id = %owner, limit = MAX_STREAM_BYTES, "Completion stream exceeded size limit");
            }
            futures::future::ready(within)
        });

        Self {
            job_id: job_id.to_string(),
            events: Some(bounded.eventsource().boxed()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.events.is_none()
    }

    fn decode(&self, event: Event) -> Option<ChannelEvent> {
        match event.event.as_str() {
            "complete" => match serde_json::from_str::<CompletionEvent>(&event.data) {
                Ok(payload) => Some(ChannelEvent::Complete(payload)),
                Err(e) => {
                    tracing::warn!(job_id = %self.job_id, error = %e, "Malformed completion payload");
                    Some(ChannelEvent::Error(Some(format!(
                        "Malformed completion payload: {}",
                        e
                    ))))
                }
            },
            "error" => {
                if event.data.trim().is_empty() {
                    return Some(ChannelEvent::Error(None));
                }
                let message = match serde_json::from_str::<ErrorPayload>(&event.data) {
                    Ok(payload) => payload.message,
                    Err(_) => Some(event.data),
                };
                Some(ChannelEvent::Error(message))
            }
            "timeout" => Some(ChannelEvent::Timeout),
            other => {
                tracing::trace!(job_id = %self.job_id, event = %other, "Skipping event");
                None
            }
        }
    }
}

#[async_trait]
impl NotificationChannel for EventStream {
    async fn next_event(&mut self) -> Option<ChannelEvent> {
        loop {
            let events = self.events.as_mut()?;
            match events.next().await {
                Some(Ok(event)) => {
                    if let Some(decoded) = self.decode(event) {
                        return Some(decoded);
                    }
                }
                Some(Err(e)) => {
                    tracing::warn!(job_id = %self.job_id, error = %e, "Completion stream interrupted");
                    return None;
                }
                None => return None,
            }
        }
    }

    fn close(&mut self) {
        if self.events.take().is_some() {
            tracing::debug!(job_id = %self.job_id, "Completion stream closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinify_core::models::JobStatus;

    fn stream_of(chunks: &[&str]) -> EventStream {
        let items: Vec<reqwest::Result<Bytes>> = chunks
            .iter()
            .map(|c| Ok(Bytes::from(c.to_string())))
            .collect();
        EventStream::from_stream("j1", futures::stream::iter(items))
    }

    #[tokio::test]
    async fn test_complete_event_split_across_chunks() {
        let mut stream = stream_of(&[
            ": keep-alive\n\n",
            "event: progress\ndata: {\"pct\":50}\n\n",
            "event: complete\r\ndata: {\"job_id\":\"j1\",",
            "\"status\":\"completed\",\"processed_size\":30000}\r\n\r\n",
        ]);

        match stream.next_event().await {
            Some(ChannelEvent::Complete(event)) => {
                assert_eq!(event.job_id, "j1");
                assert_eq!(event.status, JobStatus::Completed);
                assert_eq!(event.processed_size, Some(30000));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_and_timeout_events() {
        let mut stream = stream_of(&["event: error\ndata: {\"message\":\"worker died\"}\n\n"]);
        assert_eq!(
            stream.next_event().await,
            Some(ChannelEvent::Error(Some("worker died".to_string())))
        );

        let mut stream = stream_of(&["event: error\ndata:\n\n"]);
        assert_eq!(stream.next_event().await, Some(ChannelEvent::Error(None)));

        let mut stream = stream_of(&["event: error\ndata: upstream reset\n\n"]);
        assert_eq!(
            stream.next_event().await,
            Some(ChannelEvent::Error(Some("upstream reset".to_string())))
        );

        let mut stream = stream_of(&["event: timeout\ndata:\n\n"]);
        assert_eq!(stream.next_event().await, Some(ChannelEvent::Timeout));
    }

    #[tokio::test]
    async fn test_stream_end_without_terminal_event() {
        let mut stream = stream_of(&["event: progress\ndata: {}\n\n", "event: complete\ndata: {"]);
        assert_eq!(stream.next_event().await, None);
    }

    #[tokio::test]
    async fn test_oversized_stream_ends() {
        let unterminated = "x".repeat(MAX_STREAM_BYTES + 1);
        let mut stream = stream_of(&["event: complete\ndata: ", &unterminated]);
        assert_eq!(stream.next_event().await, None);
    }

    #[tokio::test]
    async fn test_close_stops_delivery() {
        let mut stream = stream_of(&["event: timeout\ndata:\n\n"]);
        stream.close();
        assert!(stream.is_closed());
        assert_eq!(stream.next_event().await, None);
    }
}
