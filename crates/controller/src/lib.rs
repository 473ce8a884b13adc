//! Event-driven bar controller.
//!
//! Producers (config watcher, ipc listener, the bar, modules) push events
//! through a [`QueueHandle`]. One event thread pops them in arrival order,
//! coalesces redraw notifications and hands everything else to the
//! [`Dispatcher`]. An optional input thread feeds raw text lines into the
//! same queue. [`Controller::run`] blocks until a terminate, reload or fault
//! ends the loop, and both threads are joined before it returns.

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Instant,
};

use crossbeam_channel::{select, Receiver};
use shared::{domain::Alignment, event::Event};

pub mod bar;
mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod module;
pub mod queue;
pub mod registry;
mod state;
pub mod swallow;

pub use bar::{Bar, Frame};
pub use config::ControllerConfig;
pub use dispatch::{Delivery, Dispatcher, Priority, SignalReceiver};
pub use error::{CommandError, DispatchError, RegistryError};
pub use module::{Module, ModuleFlags, ModuleHandle};
pub use queue::{EventQueue, QueueHandle, QueueItem};
pub use registry::ModuleRegistry;
pub use state::{ControllerSignals, ControllerState};
pub use swallow::{Decision, SwallowPolicy, SwallowState};

/// How a call to [`Controller::run`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Terminate,
    /// The owner should build a fresh controller and run again.
    Reload,
    Fault(String),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, RunOutcome::Fault(_))
    }
}

/// Something outside the controller that produces events and has to be shut
/// down with it (watchers, listeners).
pub trait EventSource: Send {
    fn name(&self) -> &str;
    fn stop(&mut self);
}

/// Cheap, clonable remote control for a running controller.
#[derive(Clone)]
pub struct ControllerHandle {
    events: QueueHandle,
    processing: Arc<AtomicBool>,
}

impl ControllerHandle {
    pub fn queue(&self) -> &QueueHandle {
        &self.events
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    /// Orderly exit after everything already queued.
    pub fn terminate(&self) -> bool {
        self.events.enqueue(Event::ExitTerminate)
    }

    pub fn reload(&self) -> bool {
        self.events.enqueue(Event::ExitReload)
    }

    /// Stops processing right after the event in flight; queued events are
    /// dropped.
    pub fn shutdown(&self) {
        self.processing.store(false, Ordering::SeqCst);
        // Wake the event thread if it is parked on an empty queue.
        self.events.enqueue(Event::ExitTerminate);
    }
}

pub struct Controller {
    queue: EventQueue,
    dispatcher: Dispatcher<ControllerState>,
    state: ControllerState,
    swallow: SwallowPolicy,
    processing: Arc<AtomicBool>,
    input: Option<Receiver<String>>,
    sources: Vec<Box<dyn EventSource>>,
    has_run: bool,
}

impl Controller {
    pub fn new(config: ControllerConfig, mut bar: Box<dyn Bar>) -> Self {
        let queue = EventQueue::new();
        let processing = Arc::new(AtomicBool::new(false));
        let swallow = SwallowPolicy::new(config.swallow_limit, config.swallow_window());

        bar.attach(queue.handle());
        let state = ControllerState::new(config, bar, queue.handle(), Arc::clone(&processing));

        let mut dispatcher = Dispatcher::new();
        dispatcher.register(Box::new(ControllerSignals));

        Self {
            queue,
            dispatcher,
            state,
            swallow,
            processing,
            input: None,
            sources: Vec::new(),
            has_run: false,
        }
    }

    pub fn handle(&self) -> ControllerHandle {
        ControllerHandle {
            events: self.queue.handle(),
            processing: Arc::clone(&self.processing),
        }
    }

    pub fn queue(&self) -> QueueHandle {
        self.queue.handle()
    }

    pub fn enqueue(&self, event: Event) -> bool {
        self.queue.handle().enqueue(event)
    }

    pub fn enqueue_input(&self, input: String) -> bool {
        self.queue.handle().enqueue_input(input)
    }

    pub fn register_module(&mut self, module: ModuleHandle, alignment: Alignment) {
        self.state.registry.register(module, alignment);
    }

    pub fn modules(&self) -> &ModuleRegistry {
        &self.state.registry
    }

    /// Adds a receiver next to the controller's own one. Receivers are fixed
    /// once [`run`](Self::run) starts.
    pub fn register_receiver(&mut self, receiver: Box<dyn SignalReceiver<ControllerState>>) {
        self.dispatcher.register(receiver);
    }

    pub fn attach_source(&mut self, source: Box<dyn EventSource>) {
        tracing::debug!(source = source.name(), "attached event source");
        self.sources.push(source);
    }

    /// Raw text lines to read on the input thread.
    pub fn attach_input(&mut self, lines: Receiver<String>) {
        self.input = Some(lines);
    }

    pub fn run(&mut self, writeback: bool, snapshot_destination: Option<PathBuf>) -> RunOutcome {
        if self.has_run {
            tracing::error!("controller has already run; build a new one to restart");
            return RunOutcome::Fault("controller has already run".into());
        }
        self.has_run = true;

        tracing::info!(
            writeback,
            snapshot = ?snapshot_destination,
            modules = self.state.registry.len(),
            "starting controller"
        );
        self.state.prepare(writeback, snapshot_destination);
        let failed = self.start_modules();
        if failed > 0 {
            // Lets the controller give up if nothing is left running.
            self.queue.handle().enqueue(Event::CheckState);
        }
        self.processing.store(true, Ordering::SeqCst);

        let outcome = self.run_threads();

        self.processing.store(false, Ordering::SeqCst);
        self.queue.close();
        for source in &mut self.sources {
            tracing::debug!(source = source.name(), "stopping event source");
            source.stop();
        }
        self.stop_modules();

        match &outcome {
            RunOutcome::Fault(reason) => tracing::error!(reason, "controller stopped on fault"),
            other => tracing::info!(outcome = ?other, "controller stopped"),
        }
        outcome
    }

    /// Returns how many modules failed to start.
    fn start_modules(&self) -> usize {
        let mut failed = 0;
        for module in self.state.registry.all() {
            match module.start(self.queue.handle()) {
                Ok(()) => tracing::debug!(module = module.name(), "module started"),
                Err(err) => {
                    failed += 1;
                    tracing::error!(
                        module = module.name(),
                        error = format!("{err:#}"),
                        "failed to start module, leaving it disabled"
                    );
                }
            }
        }
        failed
    }

    fn stop_modules(&self) {
        for module in self.state.registry.all() {
            if module.running() {
                module.stop();
            }
        }
    }

    /// Runs the event thread and the optional input thread. Both are scoped
    /// to this call, so neither can outlive the controller's collaborators.
    fn run_threads(&mut self) -> RunOutcome {
        let queue = &self.queue;
        let dispatcher = &mut self.dispatcher;
        let state = &mut self.state;
        let swallow = &mut self.swallow;
        let processing = self.processing.as_ref();
        let input = self.input.take();
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);

        let joined = thread::scope(|scope| {
            let reader = input.and_then(|lines| {
                let events = queue.handle();
                thread::Builder::new()
                    .name("inputreader".into())
                    .spawn_scoped(scope, move || read_input(&lines, &stop_rx, &events))
                    .map_err(|err| tracing::error!(error = %err, "failed to spawn input thread"))
                    .ok()
            });

            let consumer = thread::Builder::new()
                .name("eventqueue".into())
                .spawn_scoped(scope, move || {
                    process_eventqueue(queue, dispatcher, state, swallow, processing)
                });

            let result = match consumer {
                Ok(consumer) => consumer.join().map_err(|_| "event thread panicked".to_string()),
                Err(err) => Err(format!("failed to spawn event thread: {err}")),
            };

            processing.store(false, Ordering::SeqCst);
            queue.close();
            drop(stop_tx);
            if let Some(reader) = reader {
                if reader.join().is_err() {
                    tracing::warn!("input thread panicked");
                }
            }
            result
        });

        match joined {
            Ok(Ok(())) => self.state.take_outcome().unwrap_or(RunOutcome::Terminate),
            Ok(Err(err)) => RunOutcome::Fault(format!("{:#}", anyhow::Error::from(err))),
            Err(reason) => RunOutcome::Fault(reason),
        }
    }
}

/// Event thread body.
fn process_eventqueue(
    queue: &EventQueue,
    dispatcher: &mut Dispatcher<ControllerState>,
    state: &mut ControllerState,
    swallow: &mut SwallowPolicy,
    processing: &AtomicBool,
) -> Result<(), DispatchError> {
    tracing::debug!("event queue worker started");

    while processing.load(Ordering::SeqCst) {
        let next = match swallow.deadline() {
            Some(deadline) => queue.pop_deadline(deadline),
            None => queue.pop(),
        };

        let Some(item) = next else {
            if swallow.on_timeout(Instant::now()) == Decision::Update
                && processing.load(Ordering::SeqCst)
            {
                tracing::trace!("swallow window elapsed, flushing deferred update");
                dispatcher.dispatch(state, &Event::NotifyChange)?;
            }
            continue;
        };

        if !processing.load(Ordering::SeqCst) {
            tracing::debug!(pending = queue.len(), "processing disabled, dropping pending events");
            break;
        }

        match item {
            QueueItem::Signal(event) => {
                let decision = match event {
                    Event::NotifyChange => swallow.on_change(Instant::now()),
                    Event::NotifyForceChange => swallow.on_force_change(Instant::now()),
                    _ => Decision::Update,
                };
                if decision == Decision::Suppress {
                    tracing::trace!(count = swallow.counter(), "swallowed change notification");
                    continue;
                }
                dispatcher.dispatch(state, &event)?;
            }
            QueueItem::Input(text) => state
                .process_input(&text)
                .map_err(|source| DispatchError::Input { source })?,
        }
    }

    tracing::debug!("event queue worker stopped");
    Ok(())
}

/// Input thread body: forwards lines until the channel closes, the queue
/// rejects input or the controller signals shutdown.
fn read_input(lines: &Receiver<String>, stop: &Receiver<()>, events: &QueueHandle) {
    tracing::debug!("input reader started");
    loop {
        let line = select! {
            recv(lines) -> line => line.ok(),
            recv(stop) -> _ => None,
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        if !events.enqueue_input(line) {
            break;
        }
    }
    tracing::debug!("input reader stopped");
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
