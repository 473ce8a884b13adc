//! The signal vocabulary every event producer has to speak.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::ButtonPress;

/// A unit of work for the controller's event queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Event {
    ExitTerminate,
    ExitReload,
    NotifyChange,
    NotifyForceChange,
    CheckState,
    IpcAction(String),
    IpcCommand(String),
    IpcHook(String),
    UiReady,
    UiButtonPress(ButtonPress),
    UiUpdateBackground,
}

impl Event {
    pub fn kind(&self) -> SignalKind {
        match self {
            Event::ExitTerminate => SignalKind::ExitTerminate,
            Event::ExitReload => SignalKind::ExitReload,
            Event::NotifyChange => SignalKind::NotifyChange,
            Event::NotifyForceChange => SignalKind::NotifyForceChange,
            Event::CheckState => SignalKind::CheckState,
            Event::IpcAction(_) => SignalKind::IpcAction,
            Event::IpcCommand(_) => SignalKind::IpcCommand,
            Event::IpcHook(_) => SignalKind::IpcHook,
            Event::UiReady => SignalKind::UiReady,
            Event::UiButtonPress(_) => SignalKind::UiButtonPress,
            Event::UiUpdateBackground => SignalKind::UiUpdateBackground,
        }
    }

    /// Redraw-class events are subject to update coalescing.
    pub fn is_redraw(&self) -> bool {
        matches!(self, Event::NotifyChange | Event::NotifyForceChange)
    }
}

/// Discriminant of [`Event`], used as the routing key for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SignalKind {
    ExitTerminate,
    ExitReload,
    NotifyChange,
    NotifyForceChange,
    CheckState,
    IpcAction,
    IpcCommand,
    IpcHook,
    UiReady,
    UiButtonPress,
    UiUpdateBackground,
}

impl SignalKind {
    pub const ALL: [SignalKind; 11] = [
        SignalKind::ExitTerminate,
        SignalKind::ExitReload,
        SignalKind::NotifyChange,
        SignalKind::NotifyForceChange,
        SignalKind::CheckState,
        SignalKind::IpcAction,
        SignalKind::IpcCommand,
        SignalKind::IpcHook,
        SignalKind::UiReady,
        SignalKind::UiButtonPress,
        SignalKind::UiUpdateBackground,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SignalKind::ExitTerminate => "exit_terminate",
            SignalKind::ExitReload => "exit_reload",
            SignalKind::NotifyChange => "notify_change",
            SignalKind::NotifyForceChange => "notify_forcechange",
            SignalKind::CheckState => "check_state",
            SignalKind::IpcAction => "ipc_action",
            SignalKind::IpcCommand => "ipc_command",
            SignalKind::IpcHook => "ipc_hook",
            SignalKind::UiReady => "ui_ready",
            SignalKind::UiButtonPress => "ui_button_press",
            SignalKind::UiUpdateBackground => "ui_update_background",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
