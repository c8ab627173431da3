//! The per-topic poll loop.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{error, info, trace, warn};

use super::RetryPolicy;
use crate::bus::{BusError, Consumer, Message};
use crate::handlers::{EventHandler, Processed, SkipReason};

/// Default bound on a single poll.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(1);

/// Upper bound on the pause after a transport error.
const TRANSPORT_ERROR_PAUSE: Duration = Duration::from_millis(100);

/// Counters collected over the lifetime of a runtime.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Poll cycles completed.
    pub polls: usize,
    /// Polls that timed out with nothing to deliver.
    pub empty_polls: usize,
    /// Messages whose handler produced its side effect.
    pub handled: usize,
    /// Messages skipped for any [`SkipReason`].
    pub skipped: usize,
    /// Extra handler attempts made under the retry policy.
    pub retries: usize,
    /// Errors surfaced by the poll itself.
    pub transport_errors: usize,
    /// Offset commits the broker refused.
    pub commit_errors: usize,
}

impl RuntimeStats {
    /// Messages taken off the topic, whatever their outcome.
    pub fn processed(&self) -> usize {
        self.handled + self.skipped
    }
}

/// What one poll cycle did.
#[derive(Debug)]
pub enum Step {
    /// The poll timed out.
    Idle,
    /// A message was handled and committed.
    Handled(Processed),
    /// A message was skipped and committed.
    Skipped(SkipReason),
    /// The poll failed; the loop keeps going.
    TransportError,
    /// The consumer was closed underneath the loop.
    Closed,
}

/// Owns one consumer and turns every message it delivers into exactly one
/// handler invocation.
///
/// Lifecycle: `Polling -> Processing -> commit -> Polling`, until stopped.
/// Nothing a message or handler does can end the loop; only a stop signal
/// or a closed consumer can. The consumer is closed exactly once on the way
/// out, including when the runtime is dropped without being run.
///
/// Offsets are committed explicitly after the handler returns, for skips
/// as well as successes, so a crash mid-handler leads to redelivery rather
/// than loss.
pub struct ConsumerRuntime<C: Consumer> {
    consumer: C,
    handler: Arc<dyn EventHandler>,
    poll_timeout: Duration,
    retry: RetryPolicy,
    stats: RuntimeStats,
    closed: bool,
}

impl<C: Consumer> ConsumerRuntime<C> {
    pub fn new<H>(consumer: C, handler: H) -> Self
    where
        H: EventHandler + 'static,
    {
        Self::with_shared_handler(consumer, Arc::new(handler))
    }

    /// Build a runtime around a handler that other runtimes also use.
    pub fn with_shared_handler(consumer: C, handler: Arc<dyn EventHandler>) -> Self {
        Self {
            consumer,
            handler,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            retry: RetryPolicy::default(),
            stats: RuntimeStats::default(),
            closed: false,
        }
    }

    pub fn with_poll_timeout(mut self, poll_timeout: Duration) -> Self {
        self.poll_timeout = poll_timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn consumer(&self) -> &C {
        &self.consumer
    }

    pub fn stats(&self) -> &RuntimeStats {
        &self.stats
    }

    /// Run one poll cycle: receive, dispatch, commit.
    pub fn poll_once(&mut self) -> Step {
        self.stats.polls += 1;

        let message = match self.consumer.poll(self.poll_timeout) {
            Ok(Some(message)) => message,
            Ok(None) => {
                self.stats.empty_polls += 1;
                trace!(group = %self.consumer.group(), "poll timed out");
                return Step::Idle;
            }
            Err(BusError::Closed) => return Step::Closed,
            Err(err) => {
                self.stats.transport_errors += 1;
                error!(group = %self.consumer.group(), error = %err, "poll failed");
                thread::sleep(self.poll_timeout.min(TRANSPORT_ERROR_PAUSE));
                return Step::TransportError;
            }
        };

        let outcome = self.dispatch(&message);
        self.log_outcome(&message, &outcome);
        self.commit(&message);

        match outcome {
            Ok(processed) => {
                self.stats.handled += 1;
                Step::Handled(processed)
            }
            Err(reason) => {
                self.stats.skipped += 1;
                Step::Skipped(reason)
            }
        }
    }

    /// Poll until `keep_running` returns false or the consumer is closed,
    /// then close the consumer and return the collected stats.
    pub fn run_while<F>(mut self, mut keep_running: F) -> RuntimeStats
    where
        F: FnMut() -> bool,
    {
        info!(
            group = %self.consumer.group(),
            poll_timeout_ms = self.poll_timeout.as_millis() as u64,
            "consumer started"
        );

        while keep_running() {
            if let Step::Closed = self.poll_once() {
                warn!(group = %self.consumer.group(), "consumer closed, stopping");
                break;
            }
        }

        self.shutdown();
        std::mem::take(&mut self.stats)
    }

    /// Poll until a stop signal arrives on `stop` (or its sender is dropped).
    pub fn run_until(self, stop: &Receiver<()>) -> RuntimeStats {
        self.run_while(|| matches!(stop.try_recv(), Err(TryRecvError::Empty)))
    }

    /// Close the consumer. Later calls do nothing.
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.consumer.close();
        info!(
            group = %self.consumer.group(),
            handled = self.stats.handled,
            skipped = self.stats.skipped,
            transport_errors = self.stats.transport_errors,
            "consumer stopped"
        );
    }

    fn dispatch(&mut self, message: &Message) -> Result<Processed, SkipReason> {
        let mut attempt = 1;
        loop {
            let handler = &self.handler;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler.handle(message)))
                .unwrap_or_else(|payload| Err(SkipReason::Panicked(panic_message(&*payload))));

            match outcome {
                Err(reason) if reason.is_retryable() && self.retry.allows_another(attempt) => {
                    warn!(
                        topic = %message.topic,
                        partition = message.partition,
                        offset = message.offset,
                        attempt,
                        error = %reason,
                        "handler failed, retrying"
                    );
                    self.stats.retries += 1;
                    attempt += 1;
                    thread::sleep(self.retry.backoff());
                }
                other => return other,
            }
        }
    }

    fn log_outcome(&self, message: &Message, outcome: &Result<Processed, SkipReason>) {
        let topic = message.topic.as_str();
        let partition = message.partition;
        let offset = message.offset;

        let reason = match outcome {
            Ok(processed) => {
                info!(topic, partition, offset, outcome = ?processed, "message handled");
                return;
            }
            Err(reason) => reason,
        };

        match reason {
            SkipReason::Decode(err) => warn!(
                topic,
                partition,
                offset,
                reason = reason.category(),
                error = %err,
                payload = %message.payload_lossy(),
                "skipping poison message"
            ),
            SkipReason::Unhandled(event_type) => info!(
                topic,
                partition,
                offset,
                reason = reason.category(),
                event_type = %event_type,
                "unhandled event type"
            ),
            SkipReason::LookupMiss(user_id) => warn!(
                topic,
                partition,
                offset,
                reason = reason.category(),
                user_id = %user_id,
                "user not found, skipping"
            ),
            SkipReason::Sink(err) => error!(
                topic,
                partition,
                offset,
                reason = reason.category(),
                error = %err,
                payload = %message.payload_lossy(),
                "collaborator failed, message skipped"
            ),
            SkipReason::Panicked(panic) => error!(
                topic,
                partition,
                offset,
                reason = reason.category(),
                panic = %panic,
                payload = %message.payload_lossy(),
                "handler panicked, message skipped"
            ),
        }
    }

    fn commit(&mut self, message: &Message) {
        if let Err(err) = self.consumer.commit(message) {
            self.stats.commit_errors += 1;
            error!(
                topic = %message.topic,
                partition = message.partition,
                offset = message.offset,
                error = %err,
                "offset commit failed"
            );
        }
    }
}

impl<C: Consumer> Drop for ConsumerRuntime<C> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
