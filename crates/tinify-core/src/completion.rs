//! Completion notification handling
//!
//! A [`CompletionListener`] owns the push subscription for a single job and races
//! it against a local timer. The first terminal signal wins; the subscription is
//! closed exactly once on every exit path, including when the waiting future is
//! dropped before it resolves.
//!
//! [`subscribe_and_wait`] arms the timer before the subscription is opened, so
//! time spent connecting counts against the same budget.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::{TinifyError, TinifyResult};
use crate::models::{CompletionEvent, JobStatus};

/// Default budget for a completion wait.
pub const DEFAULT_COMPLETION_TIMEOUT: Duration = Duration::from_millis(60_000);

const UNKNOWN_FAILURE: &str = "Unknown error";
const CONNECTION_LOST: &str = "Connection lost";

/// Named events a completion channel can deliver.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// `complete`: terminal status with processed metadata
    Complete(CompletionEvent),
    /// `error`: optional service message
    Error(Option<String>),
    /// `timeout`: the service gave up waiting on the job
    Timeout,
}

/// A per-job push subscription.
#[async_trait]
pub trait NotificationChannel: Send {
    /// Wait for the next named event. `None` means the channel ended.
    async fn next_event(&mut self) -> Option<ChannelEvent>;

    /// Release the subscription. Called exactly once by the listener.
    fn close(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Listening,
    Completed,
    Failed,
    TimedOut,
}

impl ListenerState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ListenerState::Listening)
    }
}

/// Closes the wrapped channel when dropped unless already closed.
struct ChannelGuard<C: NotificationChannel> {
    channel: Option<C>,
}

impl<C: NotificationChannel> ChannelGuard<C> {
    fn close(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            channel.close();
        }
    }
}

impl<C: NotificationChannel> Drop for ChannelGuard<C> {
    fn drop(&mut self) {
        self.close();
    }
}

pub struct CompletionListener<C: NotificationChannel> {
    job_id: String,
    timeout: Duration,
    deadline: Instant,
    state: ListenerState,
    channel: Option<C>,
}

impl<C: NotificationChannel> CompletionListener<C> {
    /// Take ownership of an open subscription for `job_id`. The timer is armed here.
    pub fn new(job_id: impl Into<String>, channel: C, timeout: Duration) -> Self {
        Self::armed_until(job_id, channel, timeout, Instant::now() + timeout)
    }

    fn armed_until(
        job_id: impl Into<String>,
        channel: C,
        timeout: Duration,
        deadline: Instant,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            timeout,
            deadline,
            state: ListenerState::Listening,
            channel: Some(channel),
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    /// Wait for the first terminal signal. Resolves once; later calls fail.
    pub async fn wait(&mut self) -> TinifyResult<CompletionEvent> {
        if self.state.is_terminal() {
            return Err(TinifyError::Unrecoverable(format!(
                "Completion listener for job {} already resolved",
                self.job_id
            )));
        }
        let channel = self.channel.take().ok_or_else(|| {
            TinifyError::Unrecoverable(format!(
                "Completion subscription for job {} is closed",
                self.job_id
            ))
        })?;
        let mut guard = ChannelGuard {
            channel: Some(channel),
        };

        let timer = tokio::time::sleep_until(self.deadline);
        tokio::pin!(timer);

        let signal = match guard.channel.as_mut() {
            Some(channel) => {
                tokio::select! {
                    biased;
                    event = channel.next_event() => Signal::Channel(event),
                    _ = &mut timer => Signal::TimerExpired,
                }
            }
            None => Signal::Channel(None),
        };
        guard.close();

        let (state, outcome) = self.classify(signal);
        self.state = state;

        match &outcome {
            Ok(_) => tracing::debug!(job_id = %self.job_id, "Job completed"),
            Err(e) => tracing::warn!(job_id = %self.job_id, state = ?state, error = %e, "Job did not complete"),
        }
        outcome
    }

    fn classify(&self, signal: Signal) -> (ListenerState, TinifyResult<CompletionEvent>) {
        match signal {
            Signal::Channel(Some(ChannelEvent::Complete(event))) => match event.status {
                JobStatus::Completed => (ListenerState::Completed, Ok(event)),
                JobStatus::Failed | JobStatus::Expired => (
                    ListenerState::Failed,
                    Err(TinifyError::ProcessingFailed(
                        event.error.unwrap_or_else(|| UNKNOWN_FAILURE.to_string()),
                    )),
                ),
            },
            Signal::Channel(Some(ChannelEvent::Error(message))) => (
                ListenerState::Failed,
                Err(TinifyError::ProcessingError(
                    message.unwrap_or_else(|| CONNECTION_LOST.to_string()),
                )),
            ),
            Signal::Channel(None) => (
                ListenerState::Failed,
                Err(TinifyError::ProcessingError(CONNECTION_LOST.to_string())),
            ),
            Signal::Channel(Some(ChannelEvent::Timeout)) | Signal::TimerExpired => (
                ListenerState::TimedOut,
                Err(TinifyError::ProcessingTimedOut {
                    timeout: self.timeout,
                }),
            ),
        }
    }
}

impl<C: NotificationChannel> Drop for CompletionListener<C> {
    fn drop(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            channel.close();
        }
    }
}

enum Signal {
    Channel(Option<ChannelEvent>),
    TimerExpired,
}

/// Wait on an already open subscription.
pub async fn wait_for_completion<C: NotificationChannel>(
    job_id: &str,
    channel: C,
    timeout: Duration,
) -> TinifyResult<CompletionEvent> {
    CompletionListener::new(job_id, channel, timeout).wait().await
}

/// Open the subscription and wait on it under one budget.
///
/// The deadline is fixed before `subscribe` is polled. If it passes while the
/// subscription is still opening, the pending request is dropped and the wait
/// ends with [`TinifyError::ProcessingTimedOut`].
pub async fn subscribe_and_wait<C, F>(
    job_id: &str,
    subscribe: F,
    timeout: Duration,
) -> TinifyResult<CompletionEvent>
where
    C: NotificationChannel,
    F: Future<Output = TinifyResult<C>>,
{
    let deadline = Instant::now() + timeout;
    let channel = match tokio::time::timeout_at(deadline, subscribe).await {
        Ok(channel) => channel?,
        Err(_) => {
            tracing::warn!(job_id = %job_id, "Completion subscription did not open in time");
            return Err(TinifyError::ProcessingTimedOut { timeout });
        }
    };
    CompletionListener::armed_until(job_id, channel, timeout, deadline)
        .wait()
        .await
}
