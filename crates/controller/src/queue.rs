//! Multi-producer, single-consumer event queue.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Instant,
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use shared::event::Event;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueItem {
    Signal(Event),
    /// Raw text (click commands, stdin lines) resolved by the controller itself.
    Input(String),
}

/// Consumer side of the queue, owned by the controller.
pub struct EventQueue {
    tx: Sender<QueueItem>,
    rx: Receiver<QueueItem>,
    open: Arc<AtomicBool>,
}

impl EventQueue {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            tx,
            rx,
            open: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn handle(&self) -> QueueHandle {
        QueueHandle {
            tx: self.tx.clone(),
            open: Arc::clone(&self.open),
        }
    }

    /// Rejects every later enqueue. Items already queued stay poppable.
    pub fn close(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            tracing::debug!(pending = self.rx.len(), "event queue closed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Blocks until an item arrives.
    pub fn pop(&self) -> Option<QueueItem> {
        // The queue holds a sender of its own, so this only fails if the
        // channel is torn down underneath us.
        self.rx.recv().ok()
    }

    /// Blocks until an item arrives or `deadline` passes.
    pub fn pop_deadline(&self, deadline: Instant) -> Option<QueueItem> {
        match self.rx.recv_deadline(deadline) {
            Ok(item) => Some(item),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn try_pop(&self) -> Option<QueueItem> {
        self.rx.try_recv().ok()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer side of the queue. Clone one per producer thread.
#[derive(Clone)]
pub struct QueueHandle {
    tx: Sender<QueueItem>,
    open: Arc<AtomicBool>,
}

impl QueueHandle {
    pub fn enqueue(&self, event: Event) -> bool {
        let kind = event.kind();
        let accepted = self.push(QueueItem::Signal(event));
        if !accepted {
            tracing::trace!(signal = %kind, "event rejected, queue closed");
        }
        accepted
    }

    pub fn enqueue_input(&self, input: String) -> bool {
        if input.trim().is_empty() {
            return false;
        }
        let accepted = self.push(QueueItem::Input(input));
        if !accepted {
            tracing::trace!("input rejected, queue closed");
        }
        accepted
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn push(&self, item: QueueItem) -> bool {
        self.is_open() && self.tx.send(item).is_ok()
    }
}

#[cfg(test)]
#[path = "tests/queue_tests.rs"]
mod tests;
