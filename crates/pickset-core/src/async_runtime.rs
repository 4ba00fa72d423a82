//! Fetch runtime for Pickset.
//!
//! Item sources are asynchronous, but widgets live on a single event-loop
//! thread. [`AsyncRuntime`] drives a current-thread Tokio runtime on one
//! background thread. Fetch futures run there and their results land in a
//! [`CompletionReceiver`] that the loop drains whenever it pumps.
//!
//! ```
//! use pickset_core::{completion_channel, AsyncRuntime};
//! use std::time::Duration;
//!
//! let runtime = AsyncRuntime::new().unwrap();
//! let (tx, mut rx) = completion_channel::<i32>();
//!
//! runtime.spawn_posting(async { 6 * 7 }, tx);
//! assert_eq!(runtime.wait_for(&mut rx, Duration::from_secs(1)), Some(42));
//! ```

use std::future::Future;
use std::thread::JoinHandle;
use std::time::Duration;

use tokio::runtime::{Builder, Handle};
use tokio::sync::{mpsc, oneshot};

use crate::error::AsyncRuntimeError;
use crate::logging::targets;

const THREAD_NAME: &str = "pickset-fetch";

/// Owns the background thread that drives fetch futures.
///
/// The thread stops and is joined when the runtime is dropped. Tasks still
/// pending at that point are cancelled and post nothing.
pub struct AsyncRuntime {
    handle: Handle,
    stop: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl AsyncRuntime {
    /// Start the runtime thread.
    pub fn new() -> Result<Self, AsyncRuntimeError> {
        let runtime = Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| AsyncRuntimeError::CreationFailed(e.to_string()))?;
        let handle = runtime.handle().clone();
        let (stop, stopped) = oneshot::channel::<()>();

        let thread = std::thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || {
                runtime.block_on(async {
                    let _ = stopped.await;
                });
            })
            .map_err(|e| AsyncRuntimeError::CreationFailed(e.to_string()))?;

        tracing::debug!(target: targets::RUNTIME, "fetch runtime started");
        Ok(Self {
            handle,
            stop: Some(stop),
            thread: Some(thread),
        })
    }

    /// Run `future` on the runtime thread and post its output to `sender`.
    ///
    /// A dropped receiver discards the output.
    pub fn spawn_posting<F, T>(&self, future: F, sender: CompletionSender<T>)
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.handle.spawn(async move {
            let output = future.await;
            if sender.post(output).is_err() {
                tracing::trace!(target: targets::RUNTIME, "completion receiver gone");
            }
        });
    }

    /// Drive `future` to completion on the calling thread.
    ///
    /// Tokio timers inside it still work because the runtime thread keeps
    /// the time driver running. Never call this from async code.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.handle.block_on(future)
    }

    /// Block until the next posted value arrives or `timeout` elapses.
    ///
    /// Returns `None` on timeout or when every sender is gone.
    pub fn wait_for<T>(&self, receiver: &mut CompletionReceiver<T>, timeout: Duration) -> Option<T> {
        self.block_on(tokio::time::timeout(timeout, receiver.inner.recv()))
            .ok()
            .flatten()
    }
}

impl Drop for AsyncRuntime {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!(target: targets::RUNTIME, "fetch runtime thread panicked");
            }
        }
        tracing::debug!(target: targets::RUNTIME, "fetch runtime stopped");
    }
}

impl std::fmt::Debug for AsyncRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncRuntime")
            .field("running", &self.thread.is_some())
            .finish()
    }
}

/// Create an unbounded channel carrying task outputs to the event loop.
///
/// Posting never blocks, so it is safe from async tasks and slots alike.
pub fn completion_channel<T: Send + 'static>() -> (CompletionSender<T>, CompletionReceiver<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CompletionSender { inner: tx }, CompletionReceiver { inner: rx })
}

/// Sending half of a completion channel.
#[derive(Debug)]
pub struct CompletionSender<T> {
    inner: mpsc::UnboundedSender<T>,
}

impl<T> Clone for CompletionSender<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> CompletionSender<T> {
    /// Post a value without blocking.
    pub fn post(&self, value: T) -> Result<(), AsyncRuntimeError> {
        self.inner
            .send(value)
            .map_err(|_| AsyncRuntimeError::ReceiverDropped)
    }
}

/// Receiving half of a completion channel, owned by the event loop.
#[derive(Debug)]
pub struct CompletionReceiver<T> {
    inner: mpsc::UnboundedReceiver<T>,
}

impl<T> CompletionReceiver<T> {
    /// Take every value that is ready right now, oldest first.
    pub fn drain(&mut self) -> Vec<T> {
        let mut ready = Vec::new();
        while let Ok(value) = self.inner.try_recv() {
            ready.push(value);
        }
        ready
    }
}

static_assertions::assert_impl_all!(AsyncRuntime: Send, Sync);
static_assertions::assert_impl_all!(CompletionSender<String>: Send, Sync);
