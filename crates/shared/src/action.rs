//! Control strings understood by the controller.
//!
//! Three syntaxes reach the controller as plain strings:
//!
//! - action strings, `#NAME.ACTION` or `#NAME.ACTION.DATA`, addressed to one module
//! - legacy action names such as `datetoggle` or `menu-open-1`, addressed to every
//!   module of a type
//! - ipc command verbs such as `quit` or `module-toggle NAME`

use std::{fmt, str::FromStr};

use crate::{domain::Visibility, error::ActionError};

pub const ACTION_PREFIX: char = '#';

pub const MODULE_SHOW: &str = "module_show";
pub const MODULE_HIDE: &str = "module_hide";
pub const MODULE_TOGGLE: &str = "module_toggle";

pub const HOOK_ACTION: &str = "hook";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionString {
    pub module: String,
    pub action: String,
    pub data: Option<String>,
}

impl ActionString {
    pub fn new(module: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            action: action.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Returns the visibility change requested by the built-in module actions.
    pub fn visibility(&self) -> Option<Visibility> {
        match self.action.as_str() {
            MODULE_SHOW => Some(Visibility::Show),
            MODULE_HIDE => Some(Visibility::Hide),
            MODULE_TOGGLE => Some(Visibility::Toggle),
            _ => None,
        }
    }

    pub fn data(&self) -> &str {
        self.data.as_deref().unwrap_or_default()
    }
}

impl FromStr for ActionString {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let Some(body) = raw.strip_prefix(ACTION_PREFIX) else {
            return Err(ActionError::MissingPrefix(raw.to_string()));
        };

        // Data is everything after the second dot and may contain dots itself.
        let mut parts = body.splitn(3, '.');
        let module = parts.next().unwrap_or_default();
        if module.is_empty() {
            return Err(ActionError::MissingModule(raw.to_string()));
        }
        let action = parts.next().unwrap_or_default();
        if action.is_empty() {
            return Err(ActionError::MissingAction(raw.to_string()));
        }
        let data = parts.next().map(str::to_string);

        Ok(Self {
            module: module.to_string(),
            action: action.to_string(),
            data,
        })
    }
}

impl fmt::Display for ActionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ACTION_PREFIX}{}.{}", self.module, self.action)?;
        if let Some(data) = &self.data {
            write!(f, ".{data}")?;
        }
        Ok(())
    }
}

/// A pre-action-string command resolved to a module type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyAction {
    pub module_type: &'static str,
    pub action: &'static str,
    pub data: Option<String>,
}

struct LegacyEntry {
    name: &'static str,
    module_type: &'static str,
    action: &'static str,
    /// The name is a prefix and the remainder becomes the action data.
    takes_data: bool,
}

const fn legacy(
    name: &'static str,
    module_type: &'static str,
    action: &'static str,
    takes_data: bool,
) -> LegacyEntry {
    LegacyEntry {
        name,
        module_type,
        action,
        takes_data,
    }
}

const LEGACY_ACTIONS: &[LegacyEntry] = &[
    legacy("datetoggle", "internal/date", "toggle", false),
    legacy("menu-open-", "custom/menu", "open", true),
    legacy("menu-close", "custom/menu", "close", false),
    legacy("volup", "internal/alsa", "inc", false),
    legacy("voldown", "internal/alsa", "dec", false),
    legacy("volmute", "internal/alsa", "toggle", false),
    legacy("pa_volup", "internal/pulseaudio", "inc", false),
    legacy("pa_voldown", "internal/pulseaudio", "dec", false),
    legacy("pa_volmute", "internal/pulseaudio", "toggle", false),
    legacy("xbacklight+", "internal/xbacklight", "inc", false),
    legacy("xbacklight-", "internal/xbacklight", "dec", false),
    legacy("backlight+", "internal/backlight", "inc", false),
    legacy("backlight-", "internal/backlight", "dec", false),
    legacy("mpdplay", "internal/mpd", "play", false),
    legacy("mpdpause", "internal/mpd", "pause", false),
    legacy("mpdstop", "internal/mpd", "stop", false),
    legacy("mpdprev", "internal/mpd", "prev", false),
    legacy("mpdnext", "internal/mpd", "next", false),
    legacy("mpdseek", "internal/mpd", "seek", true),
    legacy("i3wm-wsnext", "internal/i3", "next", false),
    legacy("i3wm-wsprev", "internal/i3", "prev", false),
    legacy("i3wm-wsfocus-", "internal/i3", "focus", true),
];

/// Looks `raw` up in the legacy action table.
pub fn parse_legacy_action(raw: &str) -> Option<LegacyAction> {
    let raw = raw.trim();
    LEGACY_ACTIONS.iter().find_map(|entry| {
        if entry.takes_data {
            let data = raw.strip_prefix(entry.name)?;
            if data.is_empty() {
                return None;
            }
            Some(LegacyAction {
                module_type: entry.module_type,
                action: entry.action,
                data: Some(data.to_string()),
            })
        } else if raw == entry.name {
            Some(LegacyAction {
                module_type: entry.module_type,
                action: entry.action,
                data: None,
            })
        } else {
            None
        }
    })
}

/// IPC command verbs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Restart,
    Hide,
    Show,
    Toggle,
    Module { name: String, visibility: Visibility },
}

impl FromStr for Command {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(ActionError::EmptyCommand);
        };
        let normalized = verb.to_ascii_lowercase().replace('_', "-");

        let visibility = match normalized.as_str() {
            "quit" => return Ok(Command::Quit),
            "restart" => return Ok(Command::Restart),
            "hide" => return Ok(Command::Hide),
            "show" => return Ok(Command::Show),
            "toggle" => return Ok(Command::Toggle),
            "module-show" => Visibility::Show,
            "module-hide" => Visibility::Hide,
            "module-toggle" => Visibility::Toggle,
            _ => return Err(ActionError::UnknownCommand(verb.to_string())),
        };

        let Some(name) = words.next() else {
            return Err(ActionError::MissingModuleArgument {
                verb: verb.to_string(),
            });
        };
        Ok(Command::Module {
            name: name.to_string(),
            visibility,
        })
    }
}

/// An ipc hook, `module/NAME INDEX` or `module/NAMEINDEX`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hook {
    pub module: String,
    pub index: String,
}

impl Hook {
    pub fn into_action(self) -> ActionString {
        ActionString::new(self.module, HOOK_ACTION).with_data(self.index)
    }
}

impl FromStr for Hook {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let body = raw.strip_prefix("module/").unwrap_or(raw);
        let malformed = || ActionError::MalformedHook(raw.to_string());

        let (module, index) = match body.split_once(char::is_whitespace) {
            Some((module, index)) => (module.trim(), index.trim()),
            None => {
                let split = body.trim_end_matches(|c: char| c.is_ascii_digit()).len();
                body.split_at(split)
            }
        };

        if module.is_empty() || index.is_empty() || !index.chars().all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }

        Ok(Hook {
            module: module.to_string(),
            index: index.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "tests/action_tests.rs"]
mod tests;
