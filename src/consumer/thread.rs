//! Background thread running a consumer runtime.

use std::sync::mpsc::{channel, Sender};
use std::thread::{self, JoinHandle};

use super::{ConsumerRuntime, RuntimeStats};
use crate::bus::Consumer;

/// A [`ConsumerRuntime`] running on its own thread.
///
/// Spawn, let it consume, then stop it and collect its stats. The loop
/// finishes the message in hand before exiting, and the consumer is closed
/// on the way out.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use workforce_events::bus::InMemoryBroker;
/// use workforce_events::consumer::{ConsumerRuntime, ConsumerThread};
/// use workforce_events::handlers::Router;
/// use workforce_events::ports::RecordingMailer;
///
/// let broker = InMemoryBroker::new();
/// let mailer = RecordingMailer::new();
/// let runtime = ConsumerRuntime::new(
///     broker.consumer("employee-group", "employee-events"),
///     Router::employee_events(Arc::new(mailer.clone())),
/// )
/// .with_poll_timeout(Duration::from_millis(5));
///
/// let worker = ConsumerThread::spawn(runtime);
/// broker.inject("employee-events", r#"{"event_type":"employee_updated","email":"u@x.com"}"#);
/// std::thread::sleep(Duration::from_millis(100));
///
/// let stats = worker.stop();
/// assert_eq!(stats.handled, 1);
/// assert_eq!(mailer.sent_to("u@x.com").len(), 1);
/// ```
pub struct ConsumerThread {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<RuntimeStats>>,
}

impl ConsumerThread {
    pub fn spawn<C>(runtime: ConsumerRuntime<C>) -> Self
    where
        C: Consumer + 'static,
    {
        let (stop_tx, stop_rx) = channel();
        let handle = thread::spawn(move || runtime.run_until(&stop_rx));

        Self {
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Signal the loop to stop and wait for it to finish.
    /// Returns the runtime statistics.
    pub fn stop(mut self) -> RuntimeStats {
        let _ = self.stop_tx.send(());
        self.join()
    }

    /// Signal the loop to stop without waiting.
    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(());
    }

    /// Wait for the loop to exit on its own (after [`signal_stop`](Self::signal_stop)
    /// or a closed consumer).
    pub fn join(&mut self) -> RuntimeStats {
        match self.handle.take() {
            Some(handle) => handle.join().unwrap_or_default(),
            None => RuntimeStats::default(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle
            .as_ref()
            .map_or(true, |handle| handle.is_finished())
    }
}

impl Drop for ConsumerThread {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
    }
}
