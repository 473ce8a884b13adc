use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use controller::{
    Bar, Controller, ControllerConfig, ControllerState, Frame, Module, ModuleFlags, Priority,
    QueueHandle, RunOutcome, SignalReceiver,
};
use shared::{
    domain::{Alignment, Visibility},
    event::{Event, SignalKind},
    protocol::IpcMessage,
};

#[derive(Clone, Default)]
struct Screen {
    lines: Arc<Mutex<Vec<String>>>,
}

impl Bar for Screen {
    fn render(&mut self, frame: &Frame, _force: bool) -> anyhow::Result<()> {
        self.lines
            .lock()
            .expect("lines")
            .push(frame.to_markup(" | "));
        Ok(())
    }

    fn set_visibility(&mut self, _visibility: Visibility) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Shows one of its hooks; `hook` actions pick which.
struct Hooks {
    name: &'static str,
    hooks: Vec<&'static str>,
    current: AtomicUsize,
    flags: ModuleFlags,
}

impl Module for Hooks {
    fn name(&self) -> &str {
        self.name
    }

    fn module_type(&self) -> &str {
        "custom/text"
    }

    fn start(&self, _events: QueueHandle) -> anyhow::Result<()> {
        self.flags.set_running(true);
        Ok(())
    }

    fn stop(&self) {
        self.flags.set_running(false);
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
        self.hooks[self.current.load(Ordering::SeqCst)].to_string()
    }

    fn input(&self, action: &str, data: &str) -> bool {
        if action != "hook" {
            return false;
        }
        match data.parse::<usize>() {
            Ok(index) if index < self.hooks.len() => {
                self.current.store(index, Ordering::SeqCst);
                true
            }
            _ => false,
        }
    }
}

/// Redraws after every successful hook, like a bar-level receiver would.
struct RedrawOnIpc {
    seen: Arc<AtomicUsize>,
}

impl SignalReceiver<ControllerState> for RedrawOnIpc {
    fn name(&self) -> &str {
        "redraw-on-change"
    }

    fn priority(&self) -> Priority {
        Priority::BAR
    }

    fn subscriptions(&self) -> &[SignalKind] {
        &[SignalKind::NotifyChange, SignalKind::NotifyForceChange]
    }

    fn on(&mut self, _state: &mut ControllerState, _event: &Event) -> anyhow::Result<bool> {
        self.seen.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }
}

#[test]
fn ipc_messages_drive_modules_and_lifecycle() {
    let screen = Screen::default();
    let seen = Arc::new(AtomicUsize::new(0));
    let config = ControllerConfig {
        swallow_limit: 5,
        swallow_window_ms: 5_000,
        exec_unmatched_input: false,
        ..ControllerConfig::default()
    };

    let mut controller = Controller::new(config, Box::new(screen.clone()));
    controller.register_module(
        Arc::new(Hooks {
            name: "mode",
            hooks: vec!["normal", "resize"],
            current: AtomicUsize::new(0),
            flags: ModuleFlags::new(),
        }),
        Alignment::Left,
    );
    controller.register_receiver(Box::new(RedrawOnIpc {
        seen: Arc::clone(&seen),
    }));

    for line in [
        "hook:module/mode1",
        "action:#mode.module_hide",
        "action:#mode.module_show",
        "cmd:restart",
        "cmd:quit",
    ] {
        let message: IpcMessage = line.parse().expect("ipc message");
        assert!(controller.enqueue(message.into_event()));
    }
    controller.enqueue(Event::NotifyForceChange);

    assert_eq!(controller.run(false, None), RunOutcome::Reload);

    // Hide and show each force one redraw; the hook itself does not redraw.
    let lines = screen.lines.lock().expect("lines");
    assert_eq!(*lines, vec!["".to_string(), "%{l}resize".to_string()]);
    // Nothing after the restart command was dispatched.
    assert_eq!(seen.load(Ordering::SeqCst), 0);
    assert!(!controller.modules().find("mode").expect("mode").running());
}
