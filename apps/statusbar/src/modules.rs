//! Modules shipped with the daemon.

use std::{
    fmt::Write,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread,
    time::Duration,
};

use anyhow::Context;
use chrono::Local;
use controller::{Module, ModuleFlags, ModuleHandle, QueueHandle};
use crossbeam_channel::{RecvTimeoutError, Sender};
use shared::{action::HOOK_ACTION, domain::Alignment, event::Event};

use crate::settings::{ModuleSettings, Settings};

pub const TEXT_TYPE: &str = "custom/text";
pub const DATE_TYPE: &str = "internal/date";

/// Instantiates the modules listed in `[bar]`, in bar order.
pub fn build_modules(settings: &Settings) -> anyhow::Result<Vec<(ModuleHandle, Alignment)>> {
    let mut modules = Vec::new();
    for alignment in Alignment::ALL {
        for name in settings.bar.modules(alignment) {
            let module_settings = settings.module.get(name).with_context(|| {
                format!("module '{name}' is listed in [bar] but has no [module.{name}] section")
            })?;
            modules.push((build_module(name, module_settings), alignment));
        }
    }
    Ok(modules)
}

fn build_module(name: &str, settings: &ModuleSettings) -> ModuleHandle {
    match settings {
        ModuleSettings::Text { text, hooks } => {
            Arc::new(TextModule::new(name, text.clone(), hooks.clone()))
        }
        ModuleSettings::Date {
            format,
            format_alt,
            interval_ms,
        } => Arc::new(DateModule::new(
            name,
            format.clone(),
            format_alt.clone(),
            Duration::from_millis(*interval_ms),
        )),
    }
}

/// Static text, optionally replaced by one of its hooks.
pub struct TextModule {
    name: String,
    text: String,
    hooks: Vec<String>,
    active_hook: Mutex<Option<usize>>,
    events: Mutex<Option<QueueHandle>>,
    flags: ModuleFlags,
}

impl TextModule {
    pub fn new(name: impl Into<String>, text: String, hooks: Vec<String>) -> Self {
        Self {
            name: name.into(),
            text,
            hooks,
            active_hook: Mutex::new(None),
            events: Mutex::new(None),
            flags: ModuleFlags::new(),
        }
    }
}

impl Module for TextModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn module_type(&self) -> &str {
        TEXT_TYPE
    }

    fn start(&self, events: QueueHandle) -> anyhow::Result<()> {
        if let Ok(mut slot) = self.events.lock() {
            *slot = Some(events);
        }
        self.flags.set_running(true);
        Ok(())
    }

    fn stop(&self) {
        self.flags.set_running(false);
        if let Ok(mut slot) = self.events.lock() {
            slot.take();
        }
    }

    fn running(&self) -> bool {
        self.flags.running()
    }

    fn visible(&self) -> bool {
        self.flags.visible()
    }

    fn set_visible(&self, visible: bool) {
        self.flags.set_visible(visible);
    }

    fn contents(&self) -> String {
        let active = self.active_hook.lock().ok().and_then(|hook| *hook);
        match active.and_then(|index| self.hooks.get(index)) {
            Some(hook) => hook.clone(),
            None => self.text.clone(),
        }
    }

    fn input(&self, action: &str, data: &str) -> bool {
        if action != HOOK_ACTION {
            return false;
        }
        let Some(index) = data.parse::<usize>().ok().filter(|&i| i < self.hooks.len()) else {
            tracing::warn!(module = %self.name, hook = data, "no such hook");
            return false;
        };
        if let Ok(mut active) = self.active_hook.lock() {
            *active = Some(index);
        }
        notify_change(&self.events);
        true
    }
}

struct Ticker {
    stop: Sender<()>,
    thread: thread::JoinHandle<()>,
}

/// Local clock, redrawn every `interval`. `toggle` swaps in `format_alt`.
pub struct DateModule {
    name: String,
    format: String,
    format_alt: Option<String>,
    interval: Duration,
    toggled: AtomicBool,
    events: Mutex<Option<QueueHandle>>,
    ticker: Mutex<Option<Ticker>>,
    flags: Arc<ModuleFlags>,
}

impl DateModule {
    pub fn new(
        name: impl Into<String>,
        format: String,
        format_alt: Option<String>,
        interval: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            format,
            format_alt,
            interval,
            toggled: AtomicBool::new(false),
            events: Mutex::new(None),
            ticker: Mutex::new(None),
            flags: Arc::new(ModuleFlags::new()),
        }
    }

    fn active_format(&self) -> &str {
        match &self.format_alt {
            Some(alt) if self.toggled.load(Ordering::SeqCst) => alt,
            _ => &self.format,
        }
    }
}

impl Module for DateModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn module_type(&self) -> &str {
        DATE_TYPE
    }

    fn start(&self, events: QueueHandle) -> anyhow::Result<()> {
        if self.flags.set_running(true) {
            return Ok(());
        }

        let (stop, stopped) = crossbeam_channel::bounded::<()>(1);
        let interval = self.interval;
        let ticks = events.clone();
        let flags = self.flags.clone();
        let spawned = thread::Builder::new()
            .name(format!("module-{}", self.name))
            .spawn(move || loop {
                match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        if !ticks.enqueue(Event::NotifyChange) {
                            // Queue closed.
                            flags.set_running(false);
                            break;
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            });
        let thread = match spawned {
            Ok(thread) => thread,
            Err(err) => {
                self.flags.set_running(false);
                return Err(err).with_context(|| format!("failed to start clock for '{}'", self.name));
            }
        };

        if let Ok(mut slot) = self.ticker.lock() {
            *slot = Some(Ticker { stop, thread });
        }
        if let Ok(mut slot) = self.events.lock() {
            *slot = Some(events);
        }
        Ok(())
    }

    fn stop(&self) {
        // The clock may have stopped itself, its thread still needs joining.
        self.flags.set_running(false);
        let ticker = self.ticker.lock().ok().and_then(|mut slot| slot.take());
        if let Some(ticker) = ticker {
            drop(ticker.stop);
            if ticker.thread.join().is_err() {
                tracing::warn!(module = %self.name, "clock thread panicked");
            }
        }
        if let Ok(mut slot) = self.events.lock() {
            slot.take();
        }
    }

    fn running(&self) -> bool {
        self.flags.running()
    }

    fn visible(&self) -> bool {
        self.flags.visible()
    }

    fn set_visible(&self, visible: bool) {
        self.flags.set_visible(visible);
    }

    fn contents(&self) -> String {
        let mut out = String::new();
        if write!(out, "{}", Local::now().format(self.active_format())).is_err() {
            tracing::warn!(module = %self.name, format = self.active_format(), "invalid date format");
            out.clear();
        }
        out
    }

    fn input(&self, action: &str, _data: &str) -> bool {
        if action != "toggle" || self.format_alt.is_none() {
            return false;
        }
        self.toggled.fetch_xor(true, Ordering::SeqCst);
        notify_change(&self.events);
        true
    }
}

fn notify_change(events: &Mutex<Option<QueueHandle>>) {
    if let Some(events) = events.lock().ok().and_then(|slot| slot.clone()) {
        events.enqueue(Event::NotifyChange);
    }
}

#[cfg(test)]
#[path = "tests/modules_tests.rs"]
mod tests;
