use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use controller::ControllerConfig;
use serde::Deserialize;
use shared::domain::Alignment;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bar: BarSettings,
    pub controller: ControllerConfig,
    pub ipc: IpcSettings,
    pub module: BTreeMap<String, ModuleSettings>,
    /// File the settings were read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BarSettings {
    /// Overrides `controller.separator` when set.
    pub separator: Option<String>,
    pub modules_left: Vec<String>,
    pub modules_center: Vec<String>,
    pub modules_right: Vec<String>,
}

impl BarSettings {
    pub fn modules(&self, alignment: Alignment) -> &[String] {
        match alignment {
            Alignment::Left => &self.modules_left,
            Alignment::Center => &self.modules_center,
            Alignment::Right => &self.modules_right,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IpcSettings {
    pub enabled: bool,
    pub socket: Option<PathBuf>,
}

impl Default for IpcSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            socket: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum ModuleSettings {
    #[serde(rename = "custom/text")]
    Text {
        #[serde(default)]
        text: String,
        #[serde(default)]
        hooks: Vec<String>,
    },
    #[serde(rename = "internal/date")]
    Date {
        #[serde(default = "default_date_format")]
        format: String,
        #[serde(default)]
        format_alt: Option<String>,
        #[serde(default = "default_interval_ms")]
        interval_ms: u64,
    },
}

fn default_date_format() -> String {
    "%H:%M".into()
}

fn default_interval_ms() -> u64 {
    1_000
}

impl Settings {
    pub fn controller_config(&self) -> ControllerConfig {
        let mut config = self.controller.clone();
        if let Some(separator) = &self.bar.separator {
            config.separator = separator.clone();
        }
        config
    }
}

/// `$XDG_CONFIG_HOME/statusbar/config.toml`, falling back to `~/.config`.
pub fn default_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("statusbar").join("config.toml"))
}

/// Reads the settings file and applies `STATUSBAR__*` overrides.
///
/// An explicit `path` must exist. Without one, a missing default file just
/// means default settings.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = match path {
        Some(path) => read_settings(path)?,
        None => match default_config_path() {
            Some(path) if path.exists() => read_settings(&path)?,
            other => {
                tracing::warn!(path = ?other, "no config file found, using defaults");
                Settings::default()
            }
        },
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn read_settings(path: &Path) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config '{}'", path.display()))?;
    let mut settings: Settings = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config '{}'", path.display()))?;
    settings.source = Some(path.to_path_buf());
    Ok(settings)
}

pub fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("STATUSBAR__SEPARATOR") {
        settings.bar.separator = Some(v);
    }

    if let Some(v) = var("STATUSBAR__SWALLOW_LIMIT") {
        match v.parse() {
            Ok(parsed) => settings.controller.swallow_limit = parsed,
            Err(_) => tracing::warn!(value = v, "ignoring invalid STATUSBAR__SWALLOW_LIMIT"),
        }
    }
    if let Some(v) = var("STATUSBAR__SWALLOW_WINDOW_MS") {
        match v.parse() {
            Ok(parsed) => settings.controller.swallow_window_ms = parsed,
            Err(_) => tracing::warn!(value = v, "ignoring invalid STATUSBAR__SWALLOW_WINDOW_MS"),
        }
    }
    if let Some(v) = var("STATUSBAR__EXEC_UNMATCHED_INPUT") {
        settings.controller.exec_unmatched_input = parse_flag(&v);
    }
    if let Some(v) = var("STATUSBAR__SHELL") {
        settings.controller.shell = v;
    }

    if let Some(v) = var("STATUSBAR__IPC_ENABLED") {
        settings.ipc.enabled = parse_flag(&v);
    }
    if let Some(v) = var("STATUSBAR__IPC_SOCKET") {
        settings.ipc.socket = Some(PathBuf::from(v));
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
