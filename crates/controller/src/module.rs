use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::queue::QueueHandle;

/// A renderable unit on the bar.
///
/// Handles are shared between the registry and whoever renders them, so all
/// state changes go through `&self`.
pub trait Module: Send + Sync {
    /// Unique name, as referenced by action strings (`#NAME.ACTION`).
    fn name(&self) -> &str;
    /// Type tag such as `internal/date`, used to route legacy actions.
    fn module_type(&self) -> &str;
    /// Starts any background work. `events` is the way to request redraws.
    fn start(&self, events: QueueHandle) -> anyhow::Result<()>;
    fn stop(&self);
    fn running(&self) -> bool;
    fn visible(&self) -> bool;
    fn set_visible(&self, visible: bool);
    fn contents(&self) -> String;
    /// Handles a module action. Returns `false` if the action is unknown.
    fn input(&self, action: &str, data: &str) -> bool;
}

pub type ModuleHandle = Arc<dyn Module>;

/// Running/visible flags most modules need.
#[derive(Debug)]
pub struct ModuleFlags {
    running: AtomicBool,
    visible: AtomicBool,
}

impl ModuleFlags {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            visible: AtomicBool::new(true),
        }
    }

    pub fn running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Returns the previous value.
    pub fn set_running(&self, running: bool) -> bool {
        self.running.swap(running, Ordering::SeqCst)
    }

    pub fn visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }
}

impl Default for ModuleFlags {
    fn default() -> Self {
        Self::new()
    }
}
