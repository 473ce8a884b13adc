//! Priority-ordered signal dispatch.
//!
//! Receivers declare the signal kinds they care about and a static priority.
//! [`Dispatcher::register`] keeps, for every kind, the list of subscribed
//! receivers sorted by ascending priority (registration order breaks ties), so
//! dispatching an event is a table lookup followed by an ordered walk.

use std::collections::HashMap;

use shared::event::{Event, SignalKind};

use crate::error::DispatchError;

/// Dispatch rank; lower ranks run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(pub u8);

impl Priority {
    pub const EVENTQUEUE: Priority = Priority(1);
    pub const CONTROLLER: Priority = Priority(2);
    pub const SCREEN: Priority = Priority(3);
    pub const BAR: Priority = Priority(4);
    pub const RENDERER: Priority = Priority(5);
    pub const TRAY: Priority = Priority(6);
}

/// A subscriber to one or more signal kinds.
///
/// `on` runs on the event thread with exclusive access to the dispatch
/// context. Returning `Ok(true)` consumes the event; receivers further down
/// the priority list do not see it. An `Err` is a handler fault and ends the
/// run loop.
pub trait SignalReceiver<C>: Send {
    fn name(&self) -> &str;
    fn priority(&self) -> Priority;
    fn subscriptions(&self) -> &[SignalKind];
    fn on(&mut self, ctx: &mut C, event: &Event) -> anyhow::Result<bool>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Nobody subscribes to the event's kind.
    Dropped,
    Consumed { receiver: String },
    /// Every subscriber ran and none consumed the event.
    Delivered { receivers: usize },
}

pub struct Dispatcher<C> {
    receivers: Vec<Box<dyn SignalReceiver<C>>>,
    table: HashMap<SignalKind, Vec<usize>>,
}

impl<C> Dispatcher<C> {
    pub fn new() -> Self {
        Self {
            receivers: Vec::new(),
            table: HashMap::new(),
        }
    }

    pub fn register(&mut self, receiver: Box<dyn SignalReceiver<C>>) {
        let index = self.receivers.len();
        let mut kinds = receiver.subscriptions().to_vec();
        kinds.sort();
        kinds.dedup();

        tracing::debug!(
            receiver = receiver.name(),
            priority = receiver.priority().0,
            signals = kinds.len(),
            "registered signal receiver"
        );
        self.receivers.push(receiver);

        let receivers = &self.receivers;
        for kind in kinds {
            let entry = self.table.entry(kind).or_default();
            entry.push(index);
            entry.sort_by_key(|&i| receivers[i].priority());
        }
    }

    /// Receiver names subscribed to `kind`, in dispatch order.
    pub fn subscribers(&self, kind: SignalKind) -> Vec<&str> {
        self.table
            .get(&kind)
            .map(|indices| {
                indices
                    .iter()
                    .map(|&i| self.receivers[i].name())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.receivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receivers.is_empty()
    }

    pub fn dispatch(&mut self, ctx: &mut C, event: &Event) -> Result<Delivery, DispatchError> {
        let kind = event.kind();
        let Some(indices) = self.table.get(&kind) else {
            tracing::trace!(signal = %kind, "no receiver for signal, dropping");
            return Ok(Delivery::Dropped);
        };

        let mut delivered = 0;
        for &index in indices {
            let receiver = &mut self.receivers[index];
            match receiver.on(ctx, event) {
                Ok(true) => {
                    tracing::trace!(signal = %kind, receiver = receiver.name(), "signal consumed");
                    return Ok(Delivery::Consumed {
                        receiver: receiver.name().to_string(),
                    });
                }
                Ok(false) => delivered += 1,
                Err(source) => {
                    return Err(DispatchError::Handler {
                        receiver: receiver.name().to_string(),
                        kind,
                        source,
                    });
                }
            }
        }

        Ok(Delivery::Delivered {
            receivers: delivered,
        })
    }
}

impl<C> Default for Dispatcher<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/dispatch_tests.rs"]
mod tests;
