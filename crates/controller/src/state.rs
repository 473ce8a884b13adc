//! Everything the event thread mutates, and the controller's own receiver.

use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use anyhow::Context;
use shared::{
    domain::{Alignment, ButtonPress},
    event::{Event, SignalKind},
};

use crate::{
    bar::{Bar, Frame},
    config::ControllerConfig,
    dispatch::{Priority, SignalReceiver},
    queue::QueueHandle,
    registry::ModuleRegistry,
    RunOutcome,
};

/// Dispatch context handed to every [`SignalReceiver`].
///
/// Only the event thread touches it while the controller runs.
pub struct ControllerState {
    pub(crate) config: ControllerConfig,
    pub(crate) registry: ModuleRegistry,
    pub(crate) bar: Box<dyn Bar>,
    pub(crate) events: QueueHandle,
    processing: Arc<AtomicBool>,
    outcome: Option<RunOutcome>,
    writeback: bool,
    snapshot: Option<PathBuf>,
    bar_ready: bool,
    last_frame: Option<Frame>,
}

impl ControllerState {
    pub(crate) fn new(
        config: ControllerConfig,
        bar: Box<dyn Bar>,
        events: QueueHandle,
        processing: Arc<AtomicBool>,
    ) -> Self {
        let bar_ready = !bar.waits_for_ready();
        Self {
            config,
            registry: ModuleRegistry::new(),
            bar,
            events,
            processing,
            outcome: None,
            writeback: false,
            snapshot: None,
            bar_ready,
            last_frame: None,
        }
    }

    pub(crate) fn prepare(&mut self, writeback: bool, snapshot: Option<PathBuf>) {
        self.writeback = writeback;
        self.snapshot = snapshot;
        if writeback {
            // Nothing to wait for when output bypasses the surface.
            self.bar_ready = true;
        }
    }

    pub(crate) fn take_outcome(&mut self) -> Option<RunOutcome> {
        self.outcome.take()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn modules(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn modules_mut(&mut self) -> &mut ModuleRegistry {
        &mut self.registry
    }

    pub fn events(&self) -> &QueueHandle {
        &self.events
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    /// Stops the event loop after the current event.
    pub fn stop(&mut self, outcome: RunOutcome) {
        tracing::info!(?outcome, "stopping event processing");
        self.processing.store(false, Ordering::SeqCst);
        self.outcome.get_or_insert(outcome);
    }

    /// Builds a frame from running, visible modules.
    pub fn compose_frame(&self) -> Frame {
        let mut frame = Frame::new();
        for alignment in Alignment::ALL {
            for module in self.registry.iter(alignment) {
                if !module.running() || !module.visible() {
                    continue;
                }
                let contents = module.contents();
                if contents.is_empty() {
                    continue;
                }
                frame.push(alignment, contents);
            }
        }
        frame
    }

    /// Pushes fresh module output to the bar or the writeback target.
    ///
    /// Returns whether anything was drawn. Unforced updates are skipped when
    /// the output did not change.
    pub fn process_update(&mut self, force: bool) -> anyhow::Result<bool> {
        if !self.bar_ready {
            tracing::trace!("bar not ready, skipping update");
            return Ok(false);
        }

        let frame = self.compose_frame();
        if !force && self.last_frame.as_ref() == Some(&frame) {
            tracing::trace!("contents unchanged, skipping update");
            return Ok(false);
        }

        if self.writeback {
            self.write_frame(&frame)?;
        } else {
            self.bar
                .render(&frame, force)
                .context("bar failed to render")?;
        }
        self.last_frame = Some(frame);
        Ok(true)
    }

    fn write_frame(&self, frame: &Frame) -> anyhow::Result<()> {
        let line = frame.to_markup(&self.config.separator);
        match &self.snapshot {
            Some(path) => fs::write(path, format!("{line}\n"))
                .with_context(|| format!("failed to write snapshot '{}'", path.display())),
            None => {
                let mut out = io::stdout().lock();
                writeln!(out, "{line}").context("failed to write to stdout")?;
                out.flush().context("failed to flush stdout")
            }
        }
    }

    fn on_check_state(&mut self) -> anyhow::Result<()> {
        let total = self.registry.len();
        let running = self.registry.all().filter(|m| m.running()).count();

        if running == 0 {
            tracing::warn!(modules = total, "no running modules, terminating");
            self.stop(RunOutcome::Terminate);
        } else if running < total {
            tracing::debug!(running, total, "some modules stopped, forcing update");
            self.process_update(true)?;
        }
        Ok(())
    }

    fn on_ui_ready(&mut self) -> anyhow::Result<()> {
        tracing::debug!("bar reported ready");
        self.bar_ready = true;
        self.process_update(true)?;
        Ok(())
    }

    fn on_button_press(&mut self, press: &ButtonPress) {
        let Some(command) = press.command.as_deref() else {
            tracing::debug!(x = press.x, y = press.y, button = ?press.button, "no input area at click position");
            return;
        };
        if !self.events.enqueue_input(command.to_string()) {
            tracing::warn!(command, "dropping click command, event queue closed");
        }
    }
}

const CONTROLLER_SIGNALS: [SignalKind; 11] = SignalKind::ALL;

/// The controller's own receiver, subscribed to every signal.
pub struct ControllerSignals;

impl SignalReceiver<ControllerState> for ControllerSignals {
    fn name(&self) -> &str {
        "controller"
    }

    fn priority(&self) -> Priority {
        Priority::CONTROLLER
    }

    fn subscriptions(&self) -> &[SignalKind] {
        &CONTROLLER_SIGNALS
    }

    /// Lifecycle and ipc signals are consumed here. Redraw, state and UI
    /// signals pass through so bar-level receivers see them too.
    fn on(&mut self, state: &mut ControllerState, event: &Event) -> anyhow::Result<bool> {
        match event {
            Event::ExitTerminate => state.stop(RunOutcome::Terminate),
            Event::ExitReload => state.stop(RunOutcome::Reload),
            Event::IpcAction(raw) => state.on_ipc_action(raw)?,
            Event::IpcCommand(raw) => state.on_ipc_command(raw)?,
            Event::IpcHook(raw) => state.on_ipc_hook(raw)?,
            Event::NotifyChange => {
                state.process_update(false)?;
                return Ok(false);
            }
            Event::NotifyForceChange | Event::UiUpdateBackground => {
                state.process_update(true)?;
                return Ok(false);
            }
            Event::CheckState => {
                state.on_check_state()?;
                return Ok(false);
            }
            Event::UiReady => {
                state.on_ui_ready()?;
                return Ok(false);
            }
            Event::UiButtonPress(press) => {
                state.on_button_press(press);
                return Ok(false);
            }
        }
        Ok(true)
    }
}
