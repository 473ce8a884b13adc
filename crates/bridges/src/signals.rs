//! OS signals mapped onto controller events.

use anyhow::Context;
use controller::{EventSource, QueueHandle};
use shared::event::Event;
use tokio::signal::unix::{signal, Signal, SignalKind as UnixSignal};

use crate::worker::{self, Worker};

/// Signals the bar reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsSignal {
    Interrupt,
    Terminate,
    /// `SIGUSR1`
    User1,
}

impl OsSignal {
    pub fn event(self) -> Event {
        match self {
            OsSignal::Interrupt | OsSignal::Terminate => Event::ExitTerminate,
            OsSignal::User1 => Event::ExitReload,
        }
    }

    fn kind(self) -> UnixSignal {
        match self {
            OsSignal::Interrupt => UnixSignal::interrupt(),
            OsSignal::Terminate => UnixSignal::terminate(),
            OsSignal::User1 => UnixSignal::user_defined1(),
        }
    }
}

pub struct SignalBridge {
    worker: Worker,
}

impl SignalBridge {
    pub fn spawn(events: QueueHandle) -> anyhow::Result<Self> {
        let runtime = worker::runtime()?;
        let (mut interrupt, mut terminate, mut user1) = {
            let _guard = runtime.enter();
            (
                listen(OsSignal::Interrupt)?,
                listen(OsSignal::Terminate)?,
                listen(OsSignal::User1)?,
            )
        };

        let worker = Worker::spawn("signals", runtime, move |mut shutdown| async move {
            loop {
                let received = tokio::select! {
                    _ = &mut shutdown => break,
                    Some(()) = interrupt.recv() => OsSignal::Interrupt,
                    Some(()) = terminate.recv() => OsSignal::Terminate,
                    Some(()) = user1.recv() => OsSignal::User1,
                    else => break,
                };
                tracing::info!(signal = ?received, "received signal");
                if !events.enqueue(received.event()) {
                    tracing::debug!("controller gone, ignoring signal");
                }
            }
        })?;

        Ok(Self { worker })
    }
}

fn listen(which: OsSignal) -> anyhow::Result<Signal> {
    signal(which.kind()).with_context(|| format!("failed to install {which:?} handler"))
}

impl EventSource for SignalBridge {
    fn name(&self) -> &str {
        self.worker.name()
    }

    fn stop(&mut self) {
        self.worker.stop();
    }
}
