use std::{future::Future, thread};

use anyhow::Context;
use tokio::{runtime::Runtime, sync::oneshot};

/// A dedicated thread driving a single-threaded tokio runtime until its
/// task returns or [`stop`](Worker::stop) is called.
pub(crate) struct Worker {
    name: &'static str,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<thread::JoinHandle<()>>,
}

pub(crate) fn runtime() -> anyhow::Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build bridge runtime")
}

impl Worker {
    /// Runs `task` on `runtime`. The task receives the shutdown signal and is
    /// expected to return soon after it fires.
    pub(crate) fn spawn<F, Fut>(name: &'static str, runtime: Runtime, task: F) -> anyhow::Result<Self>
    where
        F: FnOnce(oneshot::Receiver<()>) -> Fut + Send + 'static,
        Fut: Future<Output = ()>,
    {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let thread = thread::Builder::new()
            .name(name.into())
            .spawn(move || {
                runtime.block_on(task(shutdown_rx));
                tracing::debug!(worker = name, "bridge worker finished");
            })
            .with_context(|| format!("failed to spawn {name} thread"))?;

        Ok(Self {
            name,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            // The task may already be gone, in which case nobody listens.
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!(worker = self.name, "bridge worker panicked");
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.stop();
    }
}
